//! 申请生命周期控制器 - 流程层
//!
//! 核心职责：校验 → 提交 → 成功/失败分发
//!
//! 状态流转：
//! 1. Idle → Submitting（`submit`）
//! 2. Submitting → Result / Error（响应到达）
//! 3. Result / Error → Idle（`reset`）或 → Submitting（`retry`，复用缓存的请求）
//!
//! 会话状态只由控制器写入。所有失败（HTTP 错误、业务失败、网络/解析异常）
//! 都汇聚到同一个出口：一条翻译后的提示信息 + 错误视图。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{error, info, warn};

use crate::clients::{ApiResponse, LoanApi};
use crate::config::Config;
use crate::models::response::is_success_payload;
use crate::models::{ApplicationResult, ErrorEnvelope, LoanRequest};
use crate::services::error_taxonomy::{resolve_code, translate, translate_with_fault_code};
use crate::services::{render, HealthMonitor, ProgressAnimator, ResultView};
use crate::utils::logging::truncate_text;
use crate::workflow::session::SessionState;
use crate::workflow::view::{ErrorView, PageView};

/// 申请文本（去除首尾空白后）的最少字符数
pub const MIN_REQUEST_CHARS: usize = 20;

pub const VALIDATION_MESSAGE: &str = "Veuillez entrer les informations de demande complètes";
/// 非 2xx 响应但没有 `error` 字段
pub const UNKNOWN_ERROR: &str = "Erreur inconnue";
/// 2xx 响应但 `status` 不是 success，且没有 `error` 字段
pub const UNKNOWN_PROCESSING_ERROR: &str = "Erreur de traitement inconnue";
/// 网络失败、响应体无法解析等通信层错误
pub const COMMUNICATION_ERROR: &str =
    "Impossible de joindre le service de traitement. Veuillez réessayer.";

/// 控制器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    Result,
    Error,
}

/// 一次提交的结果
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// 本地校验未通过，没有发出请求
    Invalid(ErrorView),
    /// 已有提交在进行中，本次被拒绝
    Busy,
    Result(ResultView),
    Error(ErrorView),
}

/// 重试结果
#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome {
    /// 还没有任何可重试的提交
    NothingToRetry,
    Submitted(SubmitOutcome),
}

struct ControllerState {
    phase: Phase,
    session: SessionState,
    page: PageView,
}

/// 申请生命周期控制器
pub struct LoanController<A> {
    api: Arc<A>,
    health: Arc<HealthMonitor<A>>,
    progress: ProgressAnimator,
    state: Mutex<ControllerState>,
    in_flight: AtomicBool,
}

impl<A: LoanApi> LoanController<A> {
    pub fn new(api: Arc<A>, progress_step: Duration) -> Self {
        let health = Arc::new(HealthMonitor::new(Arc::clone(&api)));
        Self {
            api,
            health,
            progress: ProgressAnimator::new(progress_step),
            state: Mutex::new(ControllerState {
                phase: Phase::Idle,
                session: SessionState::new(),
                page: PageView::default(),
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn from_config(api: Arc<A>, config: &Config) -> Self {
        Self::new(api, config.progress_step())
    }

    pub fn health(&self) -> &Arc<HealthMonitor<A>> {
        &self.health
    }

    pub fn progress(&self) -> &ProgressAnimator {
        &self.progress
    }

    pub fn phase(&self) -> Phase {
        self.lock_state().phase
    }

    /// 当前页面状态快照
    pub fn page(&self) -> PageView {
        self.lock_state().page.clone()
    }

    /// 当前会话状态快照
    pub fn session(&self) -> SessionState {
        self.lock_state().session.clone()
    }

    /// 提交申请文本
    pub async fn submit(&self, raw_text: &str) -> SubmitOutcome {
        if self.in_flight.load(Ordering::SeqCst) {
            warn!("⚠️ 已有申请正在处理，忽略重复提交");
            return SubmitOutcome::Busy;
        }

        if raw_text.trim().chars().count() < MIN_REQUEST_CHARS {
            warn!("⚠️ 申请内容过短，未提交");
            let view = ErrorView::new(VALIDATION_MESSAGE);
            let mut state = self.lock_state();
            state.phase = Phase::Error;
            state.page.show_error(view.clone());
            return SubmitOutcome::Invalid(view);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("⚠️ 已有申请正在处理，忽略重复提交");
            return SubmitOutcome::Busy;
        }

        let request = LoanRequest::new(raw_text);
        info!(
            "📨 提交贷款申请 (客户: {}, {}): {}",
            request.client_id(),
            request.submitted_at().format("%H:%M:%S"),
            truncate_text(raw_text.trim(), 60)
        );

        {
            let mut state = self.lock_state();
            state.session.record_submission(request.clone());
            state.phase = Phase::Submitting;
            state.page.begin_loading();
        }
        let _guard = SubmittingGuard { controller: self };

        self.progress.start();
        self.health.probe_detached();

        let resolution = self.dispatch(&request).await;
        self.progress.stop();

        {
            let mut state = self.lock_state();
            state.page.end_loading();
            match resolution {
                Ok(result) => {
                    let view = render(&result);
                    info!(
                        "✅ 申请处理完成: Demande N° {} → {}",
                        result.correlation_id,
                        view.title()
                    );
                    state.session.record_result(result.correlation_id);
                    state.phase = Phase::Result;
                    state.page.show_result(view.clone());
                    SubmitOutcome::Result(view)
                }
                Err(view) => {
                    warn!("❌ 申请失败 ({:?}): {}", view.code(), view.headline());
                    state.phase = Phase::Error;
                    state.page.show_error(view.clone());
                    SubmitOutcome::Error(view)
                }
            }
        }
    }

    /// 用上一次提交的原始文本重新提交
    pub async fn retry(&self) -> RetryOutcome {
        let cached = self
            .lock_state()
            .session
            .last_submitted()
            .map(|request| request.raw_text().to_string());

        match cached {
            Some(raw_text) => {
                info!("🔁 重试上一次申请");
                RetryOutcome::Submitted(self.submit(&raw_text).await)
            }
            None => {
                info!("没有可重试的申请");
                RetryOutcome::NothingToRetry
            }
        }
    }

    /// 回到初始表单，清空结果区和错误区；会话状态保留
    ///
    /// 提交进行中时不做任何事，返回 `false`。
    pub fn reset(&self) -> bool {
        if self.in_flight.load(Ordering::SeqCst) {
            warn!("⚠️ 申请处理中，暂不能重置");
            return false;
        }
        let mut state = self.lock_state();
        state.phase = Phase::Idle;
        state.page.reset();
        true
    }

    /// 展开/收起详细分析，返回新的按钮文字；当前没有结果时返回 `None`
    pub fn toggle_analysis(&self) -> Option<&'static str> {
        self.lock_state()
            .page
            .result
            .as_mut()
            .map(ResultView::toggle_analysis)
    }

    /// 发出请求并把所有失败归并为一条提示信息
    async fn dispatch(&self, request: &LoanRequest) -> Result<ApplicationResult, ErrorView> {
        match self.api.apply(&request.to_payload()).await {
            Ok(response) => interpret_response(response),
            Err(e) => {
                error!("❌ 请求贷款处理服务失败: {}", e);
                Err(ErrorView::new(translate(COMMUNICATION_ERROR)))
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 解释一次 HTTP 往返的结果
///
/// - 非 2xx：响应体按错误信封处理，缺少 `error` 时为 [`UNKNOWN_ERROR`]
/// - 2xx 但 `status != "success"`：同样按错误信封处理，缺省为 [`UNKNOWN_PROCESSING_ERROR`]
/// - 2xx 成功：反序列化为 [`ApplicationResult`]，失败时为 [`COMMUNICATION_ERROR`]
///
/// 失败时错误视图会附上识别出的错误码。
pub fn interpret_response(response: ApiResponse) -> Result<ApplicationResult, ErrorView> {
    if !response.is_success() || !is_success_payload(&response.body) {
        let envelope = ErrorEnvelope::from_body(&response.body);
        let fallback = if response.is_success() {
            UNKNOWN_PROCESSING_ERROR
        } else {
            UNKNOWN_ERROR
        };
        warn!(
            "后端返回失败: status={}, error={:?}, fault_code={:?}",
            response.status, envelope.error, envelope.fault_code
        );
        return Err(match envelope.error.as_deref().filter(|e| !e.is_empty()) {
            Some(error) => {
                let fault_code = envelope.fault_code.as_deref();
                ErrorView::new(translate_with_fault_code(error, fault_code))
                    .with_code(resolve_code(error, fault_code))
            }
            None => ErrorView::new(fallback),
        });
    }

    serde_json::from_value(response.body).map_err(|e| {
        error!("❌ 成功响应结构无法解析: {}", e);
        ErrorView::new(translate(COMMUNICATION_ERROR))
    })
}

/// 提交中的收尾保证
///
/// 无论正常返回还是提交 future 被中途丢弃，都会停止进度动画、恢复非加载状态、
/// 清除进行中标记。
struct SubmittingGuard<'a, A: LoanApi> {
    controller: &'a LoanController<A>,
}

impl<A: LoanApi> Drop for SubmittingGuard<'_, A> {
    fn drop(&mut self) {
        self.controller.progress.stop();
        {
            let mut state = self.controller.lock_state();
            state.page.end_loading();
            if state.phase == Phase::Submitting {
                state.phase = Phase::Idle;
            }
        }
        self.controller.in_flight.store(false, Ordering::SeqCst);
    }
}
