//! ヘルスチェック
//!
//! 監視対象へのHTTPプローブと、それを定期実行するスケジューラー。

pub mod prober;
pub mod scheduler;

pub use prober::{HttpProber, Probe};
pub use scheduler::{CycleReport, PollingScheduler};
