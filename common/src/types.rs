//! 共通型定義
//!
//! 監視対象サービスとヘルスチェック結果のコアデータ型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 監視対象サービス
///
/// 起動時に設定から読み込まれ、プロセス終了まで変更されない。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceTarget {
    /// サービス名（一意キー）
    pub name: String,
    /// ヘルスチェック先URL
    pub url: String,
}

impl ServiceTarget {
    /// 新しい監視対象を作成
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// ヘルス状態
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// 応答あり（ステータスコード < 500）
    Healthy,
    /// 応答なし・タイムアウト・5xx
    Unhealthy,
    /// チェック自体が結果を返さなかった
    Unknown,
}

impl HealthState {
    /// HealthStateを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for HealthState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "healthy" => Self::Healthy,
            "unhealthy" => Self::Unhealthy,
            _ => Self::Unknown,
        })
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 1サービス分のヘルスチェック結果
///
/// サイクルごとに丸ごと置き換えられる（既存レコードを書き換えない）。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    /// サービス名（`ServiceTarget::name`）
    pub name: String,
    /// ヘルス状態
    pub status: HealthState,
    /// 応答時間（ミリ秒）
    pub response_time_ms: u64,
    /// チェック完了時刻
    pub last_check: DateTime<Utc>,
    /// 瞬間的な稼働スコア (0-100)
    pub uptime: f64,
    /// エラー内容（healthy以外のときのみ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceStatus {
    /// 正常な結果を作成
    pub fn healthy(name: impl Into<String>, response_time_ms: u64, uptime: f64) -> Self {
        Self {
            name: name.into(),
            status: HealthState::Healthy,
            response_time_ms,
            last_check: Utc::now(),
            uptime: uptime.clamp(0.0, 100.0),
            error: None,
        }
    }

    /// 異常な結果を作成（稼働スコアは常に0）
    pub fn unhealthy(
        name: impl Into<String>,
        response_time_ms: u64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status: HealthState::Unhealthy,
            response_time_ms,
            last_check: Utc::now(),
            uptime: 0.0,
            error: Some(error.into()),
        }
    }

    /// 結果を得られなかったチェックの代替レコードを作成
    pub fn unknown(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: HealthState::Unknown,
            response_time_ms: 0,
            last_check: Utc::now(),
            uptime: 0.0,
            error: Some(error.into()),
        }
    }

    /// healthyかどうか
    pub fn is_healthy(&self) -> bool {
        self.status == HealthState::Healthy
    }
}
