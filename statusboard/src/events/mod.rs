//! ブロードキャストハブ
//!
//! ライブクライアント（ダッシュボードのWebSocket接続）の集合を管理し、
//! ステータスストアが更新されるたびに全件スナップショットを配信する。
//!
//! - 接続直後に現在のスナップショットを1件送る
//! - 配信はペイロードを1回だけシリアライズし、接続集合のコピーに対して行う
//! - 送信に失敗した接続（クローズ済み）は集合から除外する
//! - 受信が追いつかないクライアントへのメッセージは破棄する（他を待たせない）

use serde::Serialize;
use statusboard_common::protocol::LiveMessage;
use statusboard_common::types::ServiceStatus;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::store::StatusStore;

/// クライアントごとの送信バッファ容量
///
/// 受け渡し用のスロットであり、バックプレッシャー用のキューではない。
pub const CLIENT_BUFFER_CAPACITY: usize = 16;

/// 接続ID（匿名・プロセス内でのみ有効）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 登録済み接続の受信側
///
/// WebSocketセッションはここからシリアライズ済みのペイロードを受け取り、
/// そのままテキストフレームとして送信する。
pub struct ClientHandle {
    /// 接続ID
    pub id: ConnectionId,
    /// ペイロード受信口（ハブ側で接続が外されると閉じる）
    pub receiver: mpsc::Receiver<Arc<str>>,
}

/// 1回の配信結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// 送信キューに載せた接続数
    pub delivered: usize,
    /// バッファが一杯で破棄した接続数
    pub dropped: usize,
    /// クローズ済みとして除外した接続数
    pub removed: usize,
}

/// ブロードキャストハブ
#[derive(Clone)]
pub struct BroadcastHub {
    store: StatusStore,
    clients: Arc<Mutex<HashMap<ConnectionId, mpsc::Sender<Arc<str>>>>>,
}

impl BroadcastHub {
    /// 新しいハブを作成
    pub fn new(store: StatusStore) -> Self {
        Self {
            store,
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 新しい接続を登録し、現在のスナップショットを即座に送る
    ///
    /// 登録と初回送信は接続集合のロック内で行う。並行する配信が初回
    /// スナップショットより先に届いて古い内容で上書きされることはない。
    pub async fn connect(&self) -> ClientHandle {
        let (sender, receiver) = mpsc::channel(CLIENT_BUFFER_CAPACITY);
        let id = ConnectionId::new();

        let mut clients = self.clients.lock().await;
        clients.insert(id, sender.clone());

        let snapshot = self.store.get_all().await;
        match encode(&LiveMessage::initial(snapshot)) {
            Ok(payload) => {
                if let Err(e) = sender.try_send(payload) {
                    warn!(connection_id = %id, error = %e, "Failed to queue initial snapshot");
                }
            }
            Err(e) => warn!(connection_id = %id, error = %e, "Failed to serialize snapshot"),
        }
        let connections = clients.len();
        drop(clients);

        debug!(connection_id = %id, connections, "Live client connected");
        ClientHandle { id, receiver }
    }

    /// 全接続にスナップショットを配信
    pub async fn broadcast(&self, snapshot: Vec<ServiceStatus>) -> BroadcastReport {
        let services = snapshot.len();
        let payload = match encode(&LiveMessage::broadcast(snapshot)) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to serialize broadcast snapshot");
                return BroadcastReport::default();
            }
        };

        // コピーしてから送るので、配信中の接続・切断で反復が壊れない
        let targets: Vec<(ConnectionId, mpsc::Sender<Arc<str>>)> = {
            let clients = self.clients.lock().await;
            clients
                .iter()
                .map(|(id, sender)| (*id, sender.clone()))
                .collect()
        };

        let mut report = BroadcastReport::default();
        let mut closed = Vec::new();

        for (id, sender) in targets {
            match sender.try_send(Arc::clone(&payload)) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    report.dropped += 1;
                    warn!(connection_id = %id, "Live client is not keeping up, dropping snapshot");
                }
                Err(TrySendError::Closed(_)) => closed.push(id),
            }
        }

        if !closed.is_empty() {
            let mut clients = self.clients.lock().await;
            for id in &closed {
                clients.remove(id);
                debug!(connection_id = %id, "Removed closed live client");
            }
        }
        report.removed = closed.len();

        debug!(
            services,
            delivered = report.delivered,
            dropped = report.dropped,
            removed = report.removed,
            "Snapshot broadcast"
        );
        report
    }

    /// 接続を集合から外す
    ///
    /// 既に外れていた場合は `false`。
    pub async fn disconnect(&self, id: ConnectionId) -> bool {
        let removed = self.clients.lock().await.remove(&id).is_some();
        if removed {
            debug!(connection_id = %id, "Live client disconnected");
        }
        removed
    }

    /// 全接続を閉じる（シャットダウン時）
    pub async fn close_all(&self) -> usize {
        let mut clients = self.clients.lock().await;
        let count = clients.len();
        clients.clear();
        if count > 0 {
            info!(connections = count, "Closed all live clients");
        }
        count
    }

    /// 現在の接続数
    pub async fn connection_count(&self) -> usize {
        self.clients.lock().await.len()
    }
}

fn encode<T: Serialize>(message: &T) -> Result<Arc<str>, serde_json::Error> {
    serde_json::to_string(message).map(Arc::from)
}
