//! check サブコマンド
//!
//! ヘルスチェックを1サイクルだけ実行し、結果を表示します。
//! 1件でもhealthyでないサービスがあれば終了コード1。

use clap::Args;
use statusboard_common::protocol::StatusSummary;
use statusboard_common::types::ServiceStatus;
use std::fmt::Write as _;
use std::path::PathBuf;

/// check サブコマンドの引数
#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Config file path (TOML/JSON/YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// check を実行
///
/// 全サービスがhealthyなら `true`。
pub async fn execute(args: &CheckArgs) -> anyhow::Result<bool> {
    let config = crate::config::load_monitor_config(args.config.as_deref())?;
    let (_state, scheduler) = crate::build_monitor(&config)?;

    let report = scheduler.run_cycle().await;
    let all_healthy = report.all_healthy();

    if args.json {
        let summary = StatusSummary::from_statuses(report.statuses);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render_table(&report.statuses));
    }

    Ok(all_healthy)
}

/// 結果を表形式の文字列にする
pub fn render_table(statuses: &[ServiceStatus]) -> String {
    let name_width = statuses
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(0)
        .max("SERVICE".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<name_width$}  {:<9}  {:>8}  {:>6}  ERROR",
        "SERVICE", "STATUS", "TIME", "UPTIME"
    );
    for status in statuses {
        let _ = writeln!(
            out,
            "{:<name_width$}  {:<9}  {:>6}ms  {:>5.0}%  {}",
            status.name,
            status.status.as_str(),
            status.response_time_ms,
            status.uptime,
            status.error.as_deref().unwrap_or("-")
        );
    }
    out
}
