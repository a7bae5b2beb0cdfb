//! serve サブコマンド
//!
//! ダッシュボードサーバーを起動します。

use clap::Args;
use statusboard_common::config::MonitorConfig;
use std::path::PathBuf;

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Config file path (TOML/JSON/YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen port (overrides config)
    #[arg(short, long, env = "STATUSBOARD_PORT")]
    pub port: Option<u16>,

    /// Bind address (overrides config)
    #[arg(short = 'H', long, env = "STATUSBOARD_HOST")]
    pub host: Option<String>,
}

impl ServeArgs {
    /// CLIで指定された値で設定を上書き
    pub fn apply(&self, config: &mut MonitorConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(ref host) = self.host {
            config.host = host.clone();
        }
    }
}

/// serve を実行
pub async fn execute(args: &ServeArgs) -> anyhow::Result<()> {
    let mut config = crate::config::load_monitor_config(args.config.as_deref())?;
    args.apply(&mut config);
    crate::server::run(config).await
}
