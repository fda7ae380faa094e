//! 会话状态
//!
//! 只由控制器写入；重试路径只读。页面重新加载（进程重启）即清空。

use crate::models::LoanRequest;

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    last_submitted: Option<LoanRequest>,
    current_correlation_id: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 最近一次通过校验的提交，用于重试
    pub fn last_submitted(&self) -> Option<&LoanRequest> {
        self.last_submitted.as_ref()
    }

    /// 最近一次成功展示的申请编号
    pub fn current_correlation_id(&self) -> Option<&str> {
        self.current_correlation_id.as_deref()
    }

    pub(crate) fn record_submission(&mut self, request: LoanRequest) {
        self.last_submitted = Some(request);
    }

    pub(crate) fn record_result(&mut self, correlation_id: impl Into<String>) {
        self.current_correlation_id = Some(correlation_id.into());
    }
}
