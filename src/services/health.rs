//! 健康检查服务
//!
//! 独立于主流程探测后端是否存活；探测失败只改变状态指示，不打断提交流程。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::clients::LoanApi;

/// 服务状态指示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// 尚未完成第一次探测
    Unknown,
    Active,
    Inactive,
}

impl HealthStatus {
    pub fn label(self) -> &'static str {
        match self {
            HealthStatus::Unknown => "Vérification des services...",
            HealthStatus::Active => "Services Actifs",
            HealthStatus::Inactive => "Services Indisponibles",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dot = match self {
            HealthStatus::Unknown => "○",
            HealthStatus::Active => "🟢",
            HealthStatus::Inactive => "🔴",
        };
        write!(f, "{} {}", dot, self.label())
    }
}

/// 健康检查
pub struct HealthMonitor<A> {
    api: Arc<A>,
    tx: watch::Sender<HealthStatus>,
}

impl<A: LoanApi> HealthMonitor<A> {
    pub fn new(api: Arc<A>) -> Self {
        let (tx, _rx) = watch::channel(HealthStatus::Unknown);
        Self { api, tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<HealthStatus> {
        self.tx.subscribe()
    }

    pub fn status(&self) -> HealthStatus {
        *self.tx.borrow()
    }

    /// 探测一次并更新状态，返回新的状态
    pub async fn probe(&self) -> HealthStatus {
        let status = match self.api.health().await {
            Ok(()) => {
                debug!("💓 健康检查通过");
                HealthStatus::Active
            }
            Err(e) => {
                warn!("⚠️ 健康检查失败: {}", e);
                HealthStatus::Inactive
            }
        };
        self.tx.send_replace(status);
        status
    }

    /// 在后台探测一次，不等待结果
    pub fn probe_detached(self: &Arc<Self>) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            monitor.probe().await;
        })
    }

    /// 启动周期性探测：立即探测一次，之后每隔 `every` 探测一次
    ///
    /// 任务随会话存在，需要结束时 abort 返回的句柄。
    pub fn spawn_polling(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                monitor.probe().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ApiResponse;
    use crate::error::{AppError, AppResult};
    use crate::models::LoanApplicationPayload;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// 可切换健康状态的测试后端
    struct FlakyApi {
        healthy: AtomicBool,
        probes: AtomicUsize,
    }

    impl FlakyApi {
        fn new(healthy: bool) -> Self {
            Self {
                healthy: AtomicBool::new(healthy),
                probes: AtomicUsize::new(0),
            }
        }
    }

    impl LoanApi for FlakyApi {
        async fn apply(&self, _payload: &LoanApplicationPayload<'_>) -> AppResult<ApiResponse> {
            Err(AppError::Other("not used".to_string()))
        }

        async fn health(&self) -> AppResult<()> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            if self.healthy.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(AppError::bad_status("/api/health", 503))
            }
        }
    }

    #[tokio::test]
    async fn test_probe_sets_active_then_inactive() {
        let api = Arc::new(FlakyApi::new(true));
        let monitor = HealthMonitor::new(Arc::clone(&api));
        assert_eq!(monitor.status(), HealthStatus::Unknown);

        assert_eq!(monitor.probe().await, HealthStatus::Active);
        assert_eq!(monitor.status(), HealthStatus::Active);

        api.healthy.store(false, Ordering::SeqCst);
        assert_eq!(monitor.probe().await, HealthStatus::Inactive);
        assert_eq!(monitor.status(), HealthStatus::Inactive);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_probes_immediately_and_periodically() {
        let api = Arc::new(FlakyApi::new(true));
        let monitor = Arc::new(HealthMonitor::new(Arc::clone(&api)));

        let handle = monitor.spawn_polling(Duration::from_secs(15));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(api.probes.load(Ordering::SeqCst), 1);
        assert_eq!(monitor.status(), HealthStatus::Active);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(api.probes.load(Ordering::SeqCst), 3);

        handle.abort();
    }

    #[tokio::test]
    async fn test_detached_probe_updates_status() {
        let api = Arc::new(FlakyApi::new(false));
        let monitor = Arc::new(HealthMonitor::new(api));
        let mut rx = monitor.subscribe();

        monitor.probe_detached().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), HealthStatus::Inactive);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(HealthStatus::Active.to_string(), "🟢 Services Actifs");
        assert_eq!(HealthStatus::Inactive.label(), "Services Indisponibles");
    }
}
