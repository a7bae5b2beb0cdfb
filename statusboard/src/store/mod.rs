//! ステータスストア
//!
//! サービス名 → 最新の `ServiceStatus` を保持する。書き込みはサイクルごとに
//! 1回（バッチ）、読み出しは任意のタイミングで多数。

use statusboard_common::protocol::StatusSummary;
use statusboard_common::types::ServiceStatus;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// ステータスストア
#[derive(Clone, Default)]
pub struct StatusStore {
    statuses: Arc<RwLock<BTreeMap<String, ServiceStatus>>>,
}

impl StatusStore {
    /// 空のストアを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定されたエントリをまとめて置き換える
    ///
    /// 1回の書き込みロック内で反映するため、読み手が同じサイクルの
    /// 一部だけを観測することはない。
    pub async fn upsert_all(&self, statuses: impl IntoIterator<Item = ServiceStatus>) {
        let mut map = self.statuses.write().await;
        for status in statuses {
            map.insert(status.name.clone(), status);
        }
    }

    /// 全エントリのスナップショット（名前順）
    pub async fn get_all(&self) -> Vec<ServiceStatus> {
        self.statuses.read().await.values().cloned().collect()
    }

    /// 1サービス分のエントリ
    pub async fn get(&self, name: &str) -> Option<ServiceStatus> {
        self.statuses.read().await.get(name).cloned()
    }

    /// 集計付きスナップショット
    pub async fn summary(&self) -> StatusSummary {
        StatusSummary::from_statuses(self.get_all().await)
    }

    /// エントリ数
    pub async fn len(&self) -> usize {
        self.statuses.read().await.len()
    }

    /// 空か
    pub async fn is_empty(&self) -> bool {
        self.statuses.read().await.is_empty()
    }
}
