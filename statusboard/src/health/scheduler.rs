//! ポーリングスケジューラー
//!
//! 起動直後に1サイクル、その後はポーリング間隔ごとに全監視対象を並列チェックし、
//! 結果をストアへ一括反映してからライブクライアントへ配信する。

use statusboard_common::types::{HealthState, ServiceStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::events::{BroadcastHub, BroadcastReport};
use crate::health::prober::Probe;
use crate::registry::ServiceRegistry;
use crate::shutdown::ShutdownController;
use crate::store::StatusStore;

/// デフォルトのポーリング間隔（ミリ秒）
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 30_000;

/// チェックタスク自体が失敗したときのエラー文言
pub const UNKNOWN_CHECK_ERROR: &str = "health check failed";

/// 1サイクルの結果
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// 今回のチェック結果（設定順）
    pub statuses: Vec<ServiceStatus>,
    /// healthy件数
    pub healthy: usize,
    /// unhealthy件数
    pub unhealthy: usize,
    /// unknown件数
    pub unknown: usize,
    /// サイクル所要時間
    pub duration: Duration,
    /// 配信結果
    pub broadcast: BroadcastReport,
}

impl CycleReport {
    fn new(statuses: Vec<ServiceStatus>, duration: Duration, broadcast: BroadcastReport) -> Self {
        let count = |state: HealthState| statuses.iter().filter(|s| s.status == state).count();
        let healthy = count(HealthState::Healthy);
        let unhealthy = count(HealthState::Unhealthy);
        let unknown = count(HealthState::Unknown);
        Self {
            statuses,
            healthy,
            unhealthy,
            unknown,
            duration,
            broadcast,
        }
    }

    /// 全サービスがhealthyか
    pub fn all_healthy(&self) -> bool {
        self.healthy == self.statuses.len()
    }
}

/// ポーリングスケジューラー
#[derive(Clone)]
pub struct PollingScheduler {
    registry: ServiceRegistry,
    probe: Arc<dyn Probe>,
    store: StatusStore,
    hub: BroadcastHub,
    poll_interval: Duration,
}

impl PollingScheduler {
    /// 新しいスケジューラーを作成
    pub fn new(
        registry: ServiceRegistry,
        probe: Arc<dyn Probe>,
        store: StatusStore,
        hub: BroadcastHub,
    ) -> Self {
        Self {
            registry,
            probe,
            store,
            hub,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// ポーリング間隔を設定
    pub fn with_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// ポーリング間隔
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// バックグラウンドでポーリングを開始
    ///
    /// `shutdown` が要求されるとループを抜けてタスクが終了する。
    /// 実行中のサイクルは最後まで走らせる。
    pub fn start(self, shutdown: ShutdownController) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run_cycle().await;
            self.poll_loop(shutdown).await;
        })
    }

    async fn poll_loop(&self, shutdown: ShutdownController) {
        let mut timer = interval(self.poll_interval);
        // サイクルが間隔を超えても追いつき実行はしない
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_ms = self.poll_interval.as_millis() as u64,
            services = self.registry.len(),
            "Polling scheduler started"
        );

        // 最初のtickは即座に返る。起動時のサイクルは済んでいるので読み捨てる
        timer.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.wait() => break,
                _ = timer.tick() => {
                    self.run_cycle().await;
                }
            }
        }

        info!("Polling scheduler stopped");
    }

    /// 1サイクル実行
    ///
    /// 全監視対象を並列にチェックし、全タスクの完了を待ってから
    /// ストアへ一括反映し、最新スナップショットを配信する。
    pub async fn run_cycle(&self) -> CycleReport {
        let started = Instant::now();

        let mut handles = Vec::with_capacity(self.registry.len());
        for target in self.registry.iter() {
            let probe = Arc::clone(&self.probe);
            let target = target.clone();
            handles.push(tokio::spawn(async move { probe.probe(&target).await }));
        }

        let mut statuses = Vec::with_capacity(handles.len());
        for (target, handle) in self.registry.iter().zip(handles) {
            match handle.await {
                Ok(status) => statuses.push(status),
                Err(e) => {
                    error!(service = %target.name, error = %e, "Health check task failed");
                    statuses.push(ServiceStatus::unknown(&target.name, UNKNOWN_CHECK_ERROR));
                }
            }
        }

        self.store.upsert_all(statuses.iter().cloned()).await;
        let snapshot = self.store.get_all().await;
        let broadcast = self.hub.broadcast(snapshot).await;

        let report = CycleReport::new(statuses, started.elapsed(), broadcast);
        info!(
            healthy = report.healthy,
            unhealthy = report.unhealthy,
            unknown = report.unknown,
            duration_ms = report.duration.as_millis() as u64,
            clients = report.broadcast.delivered,
            "Health check cycle completed"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::prober::HttpProber;
    use async_trait::async_trait;
    use serde_json::Value;
    use statusboard_common::types::ServiceTarget;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// 呼び出し回数を数え、常にhealthyを返す
    #[derive(Default)]
    struct CountingProbe {
        calls: AtomicUsize,
    }

    impl CountingProbe {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Probe for CountingProbe {
        async fn probe(&self, target: &ServiceTarget) -> ServiceStatus {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ServiceStatus::healthy(&target.name, 1, 100.0)
        }
    }

    /// 一定時間待ってから応答する
    struct SlowProbe(Duration);

    #[async_trait]
    impl Probe for SlowProbe {
        async fn probe(&self, target: &ServiceTarget) -> ServiceStatus {
            tokio::time::sleep(self.0).await;
            ServiceStatus::healthy(&target.name, self.0.as_millis() as u64, 100.0)
        }
    }

    /// 名前が "bad" の対象でpanicする
    struct PanickingProbe;

    #[async_trait]
    impl Probe for PanickingProbe {
        async fn probe(&self, target: &ServiceTarget) -> ServiceStatus {
            if target.name == "bad" {
                panic!("probe blew up");
            }
            ServiceStatus::healthy(&target.name, 1, 100.0)
        }
    }

    fn registry(names: &[&str]) -> ServiceRegistry {
        ServiceRegistry::new(
            names
                .iter()
                .map(|n| ServiceTarget::new(*n, format!("http://{n}.invalid/health")))
                .collect(),
        )
        .unwrap()
    }

    fn build(
        registry: ServiceRegistry,
        probe: Arc<dyn Probe>,
    ) -> (PollingScheduler, StatusStore, BroadcastHub) {
        let store = StatusStore::new();
        let hub = BroadcastHub::new(store.clone());
        let scheduler = PollingScheduler::new(registry, probe, store.clone(), hub.clone());
        (scheduler, store, hub)
    }

    #[test]
    fn test_default_interval() {
        let (scheduler, _, _) = build(registry(&["a"]), Arc::new(CountingProbe::default()));
        assert_eq!(scheduler.poll_interval(), Duration::from_secs(30));

        let scheduler = scheduler.with_interval(Duration::from_secs(5));
        assert_eq!(scheduler.poll_interval(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_cycle_writes_one_entry_per_target() {
        let probe = Arc::new(CountingProbe::default());
        let (scheduler, store, _) = build(registry(&["a", "b", "c"]), probe.clone());

        let report = scheduler.run_cycle().await;
        assert_eq!(report.statuses.len(), 3);
        assert_eq!(report.healthy, 3);
        assert!(report.all_healthy());
        assert_eq!(store.len().await, 3);

        scheduler.run_cycle().await;
        assert_eq!(store.len().await, 3);
        assert_eq!(probe.calls(), 6);
    }

    #[tokio::test]
    async fn test_cycle_with_empty_registry() {
        let (scheduler, store, _) = build(registry(&[]), Arc::new(CountingProbe::default()));

        let report = scheduler.run_cycle().await;

        assert!(report.statuses.is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_panicking_probe_yields_unknown_without_affecting_others() {
        let (scheduler, store, _) = build(registry(&["good", "bad", "other"]), Arc::new(PanickingProbe));

        let report = scheduler.run_cycle().await;

        assert_eq!(report.healthy, 2);
        assert_eq!(report.unknown, 1);
        assert!(!report.all_healthy());

        let bad = store.get("bad").await.unwrap();
        assert_eq!(bad.status, HealthState::Unknown);
        assert_eq!(bad.uptime, 0.0);
        assert_eq!(bad.error.as_deref(), Some(UNKNOWN_CHECK_ERROR));
        assert!(store.get("good").await.unwrap().is_healthy());
        assert!(store.get("other").await.unwrap().is_healthy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_probes_concurrently() {
        let names = ["a", "b", "c", "d", "e"];
        let (scheduler, _, _) = build(registry(&names), Arc::new(SlowProbe(Duration::from_millis(200))));

        let start = Instant::now();
        let report = scheduler.run_cycle().await;

        assert_eq!(report.healthy, names.len());
        // 直列なら1000ms
        assert!(start.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_cycle_broadcasts_once_per_client() {
        let (scheduler, _, hub) = build(registry(&["a", "b"]), Arc::new(CountingProbe::default()));
        let mut client = hub.connect().await;
        let initial: Value = serde_json::from_str(&client.receiver.recv().await.unwrap()).unwrap();
        assert_eq!(initial["data"].as_array().unwrap().len(), 0);

        let report = scheduler.run_cycle().await;
        assert_eq!(report.broadcast.delivered, 1);

        let update: Value = serde_json::from_str(&client.receiver.recv().await.unwrap()).unwrap();
        assert_eq!(update["type"], "status");
        assert_eq!(update["data"].as_array().unwrap().len(), 2);
        assert!(update["timestamp"].is_string());
        assert!(client.receiver.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_runs_immediately_then_every_interval() {
        let probe = Arc::new(CountingProbe::default());
        let (scheduler, store, _) = build(registry(&["a", "b"]), probe.clone());
        let shutdown = ShutdownController::default();

        let handle = scheduler
            .with_interval(Duration::from_secs(30))
            .start(shutdown.clone());

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(probe.calls(), 2);
        assert_eq!(store.len().await, 2);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(probe.calls(), 4);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(probe.calls(), 8);

        shutdown.request_shutdown();
        handle.await.unwrap();

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(probe.calls(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_stops_when_already_shut_down() {
        let probe = Arc::new(CountingProbe::default());
        let (scheduler, _, _) = build(registry(&["a"]), probe.clone());
        let shutdown = ShutdownController::default();
        shutdown.request_shutdown();

        scheduler.start(shutdown).await.unwrap();

        // 起動時のサイクルだけは実行される
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn test_cycle_with_healthy_and_timed_out_targets() {
        let fast = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(10)))
            .mount(&fast)
            .await;
        let slow = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&slow)
            .await;

        let registry = ServiceRegistry::new(vec![
            ServiceTarget::new("a", format!("{}/health", fast.uri())),
            ServiceTarget::new("b", format!("{}/health", slow.uri())),
        ])
        .unwrap();
        let prober = HttpProber::new(Duration::from_millis(300)).unwrap();
        let (scheduler, store, hub) = build(registry, Arc::new(prober));
        let mut client = hub.connect().await;
        client.receiver.recv().await.unwrap();

        let report = scheduler.run_cycle().await;
        assert_eq!(report.healthy, 1);
        assert_eq!(report.unhealthy, 1);

        let a = store.get("a").await.unwrap();
        assert_eq!(a.status, HealthState::Healthy);
        assert_eq!(a.uptime, 100.0);
        let b = store.get("b").await.unwrap();
        assert_eq!(b.status, HealthState::Unhealthy);
        assert_eq!(b.uptime, 0.0);
        assert_eq!(b.error.as_deref(), Some("Request timed out after 300ms"));

        let update: Value = serde_json::from_str(&client.receiver.recv().await.unwrap()).unwrap();
        let names: Vec<&str> = update["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(client.receiver.try_recv().is_err());
    }
}
