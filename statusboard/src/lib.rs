//! ステータスボード
//!
//! マイクロサービス群のヘルスチェックを定期実行し、結果をクエリAPIと
//! WebSocketでダッシュボードに配信する。

#![warn(missing_docs)]

/// HTTP/WebSocket API
pub mod api;

/// CLIインターフェース
pub mod cli;

/// 環境変数・設定ファイルの読み込み
pub mod config;

/// エラー型定義
pub mod error;

/// ブロードキャストハブ
pub mod events;

/// ヘルスチェック
pub mod health;

/// ログ初期化
pub mod logging;

/// 監視対象レジストリ
pub mod registry;

/// サーバー起動とシャットダウン
pub mod server;

/// Cooperative shutdown signal
pub mod shutdown;

/// ステータスストア
pub mod store;

use statusboard_common::config::MonitorConfig;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::MonitorResult;
use crate::events::BroadcastHub;
use crate::health::{HttpProber, PollingScheduler};
use crate::registry::ServiceRegistry;
use crate::store::StatusStore;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// 監視対象レジストリ
    pub registry: ServiceRegistry,
    /// ステータスストア
    pub store: StatusStore,
    /// ブロードキャストハブ
    pub hub: BroadcastHub,
    /// プロセス起動時刻
    pub started_at: Instant,
}

impl AppState {
    /// 新しいアプリケーション状態を作成
    pub fn new(registry: ServiceRegistry, store: StatusStore, hub: BroadcastHub) -> Self {
        Self {
            registry,
            store,
            hub,
            started_at: Instant::now(),
        }
    }
}

/// 設定から監視コンポーネント一式を組み立てる
///
/// 戻り値のスケジューラーは未起動。`start` するか `run_cycle` を呼ぶ。
pub fn build_monitor(config: &MonitorConfig) -> MonitorResult<(AppState, PollingScheduler)> {
    let registry = ServiceRegistry::new(config.services.clone())?;
    let prober = HttpProber::new(Duration::from_millis(config.probe_timeout_ms))?;
    let store = StatusStore::new();
    let hub = BroadcastHub::new(store.clone());

    let scheduler = PollingScheduler::new(
        registry.clone(),
        Arc::new(prober),
        store.clone(),
        hub.clone(),
    )
    .with_interval(Duration::from_millis(config.poll_interval_ms));

    Ok((AppState::new(registry, store, hub), scheduler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use statusboard_common::types::ServiceTarget;

    #[test]
    fn test_build_monitor_from_default_config() {
        let config = MonitorConfig::default();
        let (state, scheduler) = build_monitor(&config).unwrap();

        assert_eq!(state.registry.len(), 6);
        assert_eq!(scheduler.poll_interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_build_monitor_rejects_duplicate_targets() {
        let config = MonitorConfig {
            services: vec![
                ServiceTarget::new("api", "http://a/health"),
                ServiceTarget::new("api", "http://b/health"),
            ],
            ..MonitorConfig::default()
        };

        assert!(build_monitor(&config).is_err());
    }
}
