//! サービスヘルスプローバー
//!
//! 1つの監視対象に対してタイムアウト付きのGETを1回だけ送り、
//! 結果を `ServiceStatus` に正規化する。
//!
//! - ステータスコード < 500 → healthy（200なら稼働スコア100、それ以外は90）
//! - 5xx・接続失敗・タイムアウト・不正URL → unhealthy（稼働スコア0、エラー文言付き）

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use statusboard_common::types::{ServiceStatus, ServiceTarget};
use std::error::Error as StdError;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::MonitorResult;

/// ヘルスチェックのデフォルトタイムアウト（ミリ秒）
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

/// HTTP 200 のときの稼働スコア
const UPTIME_OK: f64 = 100.0;

/// 200以外の応答（< 500）のときの稼働スコア
const UPTIME_DEGRADED: f64 = 90.0;

/// 1つの監視対象をチェックする
///
/// 実装は全域関数であること。失敗はすべて戻り値の `ServiceStatus` に
/// 表現し、エラーとして呼び出し元に返さない。
#[async_trait]
pub trait Probe: Send + Sync {
    /// 監視対象を1回チェックする
    async fn probe(&self, target: &ServiceTarget) -> ServiceStatus;
}

/// HTTPヘルスプローバー
#[derive(Clone)]
pub struct HttpProber {
    /// HTTPクライアント
    client: Client,
    /// 1回のチェックの上限時間
    timeout: Duration,
}

impl HttpProber {
    /// 新しいプローバーを作成
    pub fn new(timeout: Duration) -> MonitorResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("statusboard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, timeout })
    }

    /// 既存のクライアントを使ってプローバーを作成
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// タイムアウト
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 単一サービスのヘルスチェック
    pub async fn check(&self, target: &ServiceTarget) -> ServiceStatus {
        let start = Instant::now();

        // クライアント側のタイムアウトに加え、外側でも打ち切って
        // 送信中のリクエストを確実に破棄する
        let outcome =
            tokio::time::timeout(self.timeout, self.client.get(&target.url).send()).await;
        let response_time_ms = start.elapsed().as_millis() as u64;

        let status = match outcome {
            Ok(Ok(response)) => classify_status(&target.name, response.status(), response_time_ms),
            Ok(Err(e)) => ServiceStatus::unhealthy(
                &target.name,
                response_time_ms,
                describe_error(&e, &target.url, self.timeout),
            ),
            Err(_) => {
                ServiceStatus::unhealthy(&target.name, response_time_ms, timeout_message(self.timeout))
            }
        };

        if status.is_healthy() {
            debug!(
                service = %target.name,
                response_time_ms = status.response_time_ms,
                uptime = status.uptime,
                "Health check succeeded"
            );
        } else {
            warn!(
                service = %target.name,
                url = %target.url,
                response_time_ms = status.response_time_ms,
                error = ?status.error,
                "Health check failed"
            );
        }

        status
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self, target: &ServiceTarget) -> ServiceStatus {
        self.check(target).await
    }
}

/// HTTPステータスコードから結果を決定
pub fn classify_status(name: &str, code: StatusCode, response_time_ms: u64) -> ServiceStatus {
    if code.as_u16() >= 500 {
        return ServiceStatus::unhealthy(name, response_time_ms, format!("HTTP {}", code));
    }

    let uptime = if code == StatusCode::OK {
        UPTIME_OK
    } else {
        UPTIME_DEGRADED
    };
    ServiceStatus::healthy(name, response_time_ms, uptime)
}

fn timeout_message(timeout: Duration) -> String {
    format!("Request timed out after {}ms", timeout.as_millis())
}

/// reqwestのエラーを短い説明文に変換
fn describe_error(err: &reqwest::Error, url: &str, timeout: Duration) -> String {
    if err.is_timeout() {
        timeout_message(timeout)
    } else if err.is_builder() {
        format!("Invalid URL: {}", url)
    } else if err.is_connect() {
        format!("Connection failed: {}", root_cause(err))
    } else {
        format!("Request failed: {}", root_cause(err))
    }
}

/// エラーチェーンの最も内側のメッセージ
fn root_cause(err: &(dyn StdError + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
