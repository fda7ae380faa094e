//! 进度动画服务
//!
//! 纯展示用的阶段序列，与后端真实进度无关，可能早于或晚于真实响应结束。
//! 收到响应时必须立即调用 [`ProgressAnimator::stop`]，避免隐藏的进度条继续被更新。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// 六个固定阶段
pub const STAGES: [&str; 6] = [
    "Extraction des informations",
    "Validation du client",
    "Analyse financière",
    "Évaluation de propriété",
    "Décision d'approbation",
    "Envoi de notification",
];

/// 进度帧
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressFrame {
    /// 阶段索引（从 0 开始）
    pub index: usize,
    pub label: &'static str,
    /// `(index + 1) / 6 * 100`
    pub percent: f64,
}

impl std::fmt::Display for ProgressFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:>3.0}%] {}...", self.percent, self.label)
    }
}

/// 有限阶段序列，每次 `new()` 都从头开始
#[derive(Debug, Clone, Default)]
pub struct ProgressSequence {
    next: usize,
}

impl ProgressSequence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Iterator for ProgressSequence {
    type Item = ProgressFrame;

    fn next(&mut self) -> Option<Self::Item> {
        let label = STAGES.get(self.next)?;
        let index = self.next;
        self.next += 1;
        Some(ProgressFrame {
            index,
            label,
            percent: (index + 1) as f64 / STAGES.len() as f64 * 100.0,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = STAGES.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ProgressSequence {}

/// 进度动画
///
/// 后台任务按固定间隔推进阶段，通过 `watch` 通道发布当前帧（`None` 表示进度条隐藏）。
/// 每次 `start()`/`stop()` 都会递增代号，旧任务发现代号不一致后不再发布任何帧。
pub struct ProgressAnimator {
    step: Duration,
    tx: watch::Sender<Option<ProgressFrame>>,
    generation: Arc<AtomicU64>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ProgressAnimator {
    pub fn new(step: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            step,
            tx,
            generation: Arc::new(AtomicU64::new(0)),
            handle: Mutex::new(None),
        }
    }

    /// 订阅进度帧
    pub fn subscribe(&self) -> watch::Receiver<Option<ProgressFrame>> {
        self.tx.subscribe()
    }

    /// 当前帧
    pub fn current(&self) -> Option<ProgressFrame> {
        *self.tx.borrow()
    }

    /// 后台任务是否仍在推进
    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// 从第一个阶段重新开始；已有的动画会先被取消
    ///
    /// 必须在 tokio 运行时内调用。
    pub fn start(&self) {
        self.stop();

        let my_generation = self.generation.load(Ordering::SeqCst);
        let generation = Arc::clone(&self.generation);
        let tx = self.tx.clone();
        let step = self.step;

        let handle = tokio::spawn(async move {
            for frame in ProgressSequence::new() {
                tokio::time::sleep(step).await;
                let published = tx.send_if_modified(|current| {
                    if generation.load(Ordering::SeqCst) != my_generation {
                        return false;
                    }
                    *current = Some(frame);
                    true
                });
                if !published {
                    return;
                }
            }
            debug!("进度动画已走完全部阶段");
        });

        *self.handle.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// 立即取消动画并隐藏进度条
    ///
    /// 返回后不会再有任何帧被发布，不论动画走到了哪个阶段。
    pub fn stop(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
        self.tx.send_replace(None);
    }
}

impl Drop for ProgressAnimator {
    fn drop(&mut self) {
        self.stop();
    }
}
