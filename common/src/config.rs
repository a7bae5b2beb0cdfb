//! 設定管理
//!
//! MonitorConfig（待受アドレス・ポーリング間隔・監視対象一覧）

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::CommonError;
use crate::types::ServiceTarget;

/// 環境変数プレフィックス（例: `STATUSBOARD_PORT`）
pub const ENV_PREFIX: &str = "STATUSBOARD";

/// 監視サーバー設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorConfig {
    /// ホストアドレス (デフォルト: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// ポート番号 (デフォルト: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// ポーリング間隔（ミリ秒）(デフォルト: 30000)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// 1回のヘルスチェックのタイムアウト（ミリ秒）(デフォルト: 5000)
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// 監視対象サービス
    #[serde(default = "default_services")]
    pub services: Vec<ServiceTarget>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_poll_interval_ms() -> u64 {
    30_000
}

fn default_probe_timeout_ms() -> u64 {
    5_000
}

fn default_services() -> Vec<ServiceTarget> {
    [
        ("api-gateway", "http://localhost:8080/health"),
        ("auth-service", "http://localhost:8081/health"),
        ("user-service", "http://localhost:8082/health"),
        ("order-service", "http://localhost:8083/health"),
        ("payment-service", "http://localhost:8084/health"),
        ("notification-service", "http://localhost:8085/health"),
    ]
    .into_iter()
    .map(|(name, url)| ServiceTarget::new(name, url))
    .collect()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            poll_interval_ms: default_poll_interval_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            services: default_services(),
        }
    }
}

impl MonitorConfig {
    /// 設定を読み込む
    ///
    /// デフォルト値 → 設定ファイル（指定時のみ、拡張子で形式判定）→ 環境変数
    /// の順に上書きし、最後に検証する。
    pub fn load(path: Option<&Path>) -> Result<Self, CommonError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let loaded: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| CommonError::Config(e.to_string()))?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// 設定値を検証
    pub fn validate(&self) -> Result<(), CommonError> {
        if self.poll_interval_ms == 0 {
            return Err(CommonError::Validation(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.probe_timeout_ms == 0 {
            return Err(CommonError::Validation(
                "probe_timeout_ms must be greater than 0".to_string(),
            ));
        }
        validate_targets(&self.services)
    }

    /// 待受アドレス ("host:port")
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 監視対象一覧を検証（空の名前・重複名を拒否）
///
/// URLの形式はここでは検証しない。不正なURLはヘルスチェック時に
/// unhealthy として扱われる。
pub fn validate_targets(targets: &[ServiceTarget]) -> Result<(), CommonError> {
    let mut seen = HashSet::with_capacity(targets.len());
    for target in targets {
        if target.name.trim().is_empty() {
            return Err(CommonError::Validation(
                "service name must not be empty".to_string(),
            ));
        }
        if !seen.insert(target.name.as_str()) {
            return Err(CommonError::Validation(format!(
                "duplicate service name: {}",
                target.name
            )));
        }
    }
    Ok(())
}
