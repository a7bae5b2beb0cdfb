//! 通信プロトコル定義
//!
//! ダッシュボード（WebSocket）とクエリAPIで送受信するメッセージ

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{HealthState, ServiceStatus};

/// ライブクライアントへのプッシュメッセージ
///
/// `{"type":"status","data":[...],"timestamp":"..."}` の形でシリアライズされる。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LiveMessage {
    /// 全サービスのスナップショット
    Status {
        /// 現在のステータス一覧
        data: Vec<ServiceStatus>,
        /// ブロードキャスト時刻（接続直後の初回送信では省略）
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<DateTime<Utc>>,
    },
}

impl LiveMessage {
    /// 接続直後に送る初回スナップショット
    pub fn initial(data: Vec<ServiceStatus>) -> Self {
        Self::Status {
            data,
            timestamp: None,
        }
    }

    /// サイクル完了後のブロードキャスト
    pub fn broadcast(data: Vec<ServiceStatus>) -> Self {
        Self::Status {
            data,
            timestamp: Some(Utc::now()),
        }
    }

    /// 含まれるステータス一覧
    pub fn data(&self) -> &[ServiceStatus] {
        match self {
            Self::Status { data, .. } => data,
        }
    }
}

/// `GET /api/status` のレスポンス
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusSummary {
    /// 登録サービス数（結果があるもの）
    pub total: usize,
    /// healthy数
    pub healthy: usize,
    /// unhealthy数
    pub unhealthy: usize,
    /// unknown数
    pub unknown: usize,
    /// 全サービスのステータス
    pub services: Vec<ServiceStatus>,
    /// 集計時刻
    pub timestamp: DateTime<Utc>,
}

impl StatusSummary {
    /// ステータス一覧から集計を作成
    pub fn from_statuses(services: Vec<ServiceStatus>) -> Self {
        let count = |state: HealthState| services.iter().filter(|s| s.status == state).count();

        Self {
            total: services.len(),
            healthy: count(HealthState::Healthy),
            unhealthy: count(HealthState::Unhealthy),
            unknown: count(HealthState::Unknown),
            timestamp: Utc::now(),
            services,
        }
    }
}

/// `GET /health` のレスポンス（プロセス生存確認）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LivenessResponse {
    /// 常に "ok"
    pub status: String,
    /// 応答時刻
    pub timestamp: DateTime<Utc>,
    /// プロセス起動からの経過秒数
    pub uptime_secs: u64,
    /// 監視対象サービス数
    pub services: usize,
}
