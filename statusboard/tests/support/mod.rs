//! 統合テスト用ユーティリティ

use std::net::SocketAddr;
use std::time::Duration;

use serde_json::Value;
use statusboard::shutdown::ShutdownController;
use statusboard_common::config::MonitorConfig;
use statusboard_common::types::ServiceTarget;
use tokio::{net::TcpListener, task::JoinHandle};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// テスト用に起動したstatusboardサーバー
#[allow(dead_code)]
pub struct TestServer {
    addr: SocketAddr,
    shutdown: ShutdownController,
    handle: JoinHandle<anyhow::Result<()>>,
}

#[allow(dead_code)]
impl TestServer {
    /// サーバーがバインドしているアドレスを返す
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://` のベースURL
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// `ws://` のURL
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// サーバーを停止し、バックグラウンドタスクの終了を待つ
    pub async fn stop(self) {
        self.shutdown.request_shutdown();
        let result = tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop in time")
            .expect("server task panicked");
        result.expect("server returned an error");
    }
}

/// 127.0.0.1の空きポートでサーバーを起動する
#[allow(dead_code)]
pub async fn spawn_statusboard(config: MonitorConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("local_addr");
    let shutdown = ShutdownController::default();
    let handle = tokio::spawn(statusboard::server::serve(
        listener,
        config,
        shutdown.clone(),
    ));

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// 固定ステータスを返すモックサービスを起動する
#[allow(dead_code)]
pub async fn mock_service(status: u16, delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(status).set_delay(delay))
        .mount(&server)
        .await;
    server
}

/// 監視対象とポーリング間隔からテスト用設定を作る
#[allow(dead_code)]
pub fn test_config(targets: &[(&str, &MockServer)], poll_interval_ms: u64) -> MonitorConfig {
    MonitorConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        poll_interval_ms,
        probe_timeout_ms: 500,
        services: targets
            .iter()
            .map(|(name, server)| ServiceTarget::new(*name, format!("{}/health", server.uri())))
            .collect(),
    }
}

/// `/api/status` が `expected` 件の結果を返すまで待つ
#[allow(dead_code)]
pub async fn wait_for_statuses(server: &TestServer, expected: u64) -> Value {
    let client = reqwest::Client::new();
    for _ in 0..100 {
        if let Ok(response) = client.get(server.url("/api/status")).send().await {
            if let Ok(json) = response.json::<Value>().await {
                if json["total"] == expected {
                    return json;
                }
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("status store never reached {expected} entries");
}
