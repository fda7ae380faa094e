//! 页面视图状态
//!
//! 描述表单、加载区、结果区和错误区当前应如何显示；只由控制器修改。

use std::fmt;

use crate::services::{ErrorCode, ErrorOrigin, ResultView};

/// 错误区视图：第一行为标题，其余非空行为列表项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    message: String,
    code: Option<ErrorCode>,
}

impl ErrorView {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// 附上识别出的后端错误码
    pub fn with_code(mut self, code: Option<ErrorCode>) -> Self {
        self.code = code;
        self
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn origin(&self) -> Option<ErrorOrigin> {
        self.code.map(ErrorCode::origin)
    }

    /// 转人工评估，不是失败
    pub fn is_soft_failure(&self) -> bool {
        self.code.is_some_and(ErrorCode::is_soft_failure)
    }

    /// 原样重新提交可能成功：通信失败、未识别的错误或后端处理故障
    pub fn is_retryable(&self) -> bool {
        matches!(self.origin(), None | Some(ErrorOrigin::Backend))
    }

    /// 按错误来源给出的下一步提示
    pub fn hint(&self) -> Option<&'static str> {
        if self.is_soft_failure() {
            return None;
        }
        match self.origin()? {
            ErrorOrigin::ClientInput => {
                Some("Corrigez l'identifiant client puis renvoyez la demande.")
            }
            ErrorOrigin::PropertyData => {
                Some("Complétez les informations de la propriété puis renvoyez la demande.")
            }
            ErrorOrigin::Backend => Some("Vous pouvez renvoyer la demande telle quelle."),
        }
    }

    /// 完整的提示信息
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn headline(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    pub fn details(&self) -> Vec<&str> {
        self.message
            .lines()
            .skip(1)
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

impl fmt::Display for ErrorView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let icon = if self.is_soft_failure() { "ℹ️" } else { "⚠️" };
        write!(f, "{} {}", icon, self.headline())?;
        for detail in self.details() {
            write!(f, "\n  • {}", detail)?;
        }
        if let Some(hint) = self.hint() {
            write!(f, "\n→ {}", hint)?;
        }
        Ok(())
    }
}

/// 页面各区域的显示状态
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub form_visible: bool,
    pub form_enabled: bool,
    pub loading: bool,
    pub result: Option<ResultView>,
    pub error: Option<ErrorView>,
}

impl Default for PageView {
    fn default() -> Self {
        Self {
            form_visible: true,
            form_enabled: true,
            loading: false,
            result: None,
            error: None,
        }
    }
}

impl PageView {
    /// 进入提交中：锁定表单、显示加载区、清空上次的结果和错误
    pub(crate) fn begin_loading(&mut self) {
        self.form_enabled = false;
        self.loading = true;
        self.result = None;
        self.error = None;
    }

    /// 恢复非加载状态；无论成功失败都会执行
    pub(crate) fn end_loading(&mut self) {
        self.form_enabled = true;
        self.loading = false;
    }

    pub(crate) fn show_result(&mut self, view: ResultView) {
        self.form_visible = false;
        self.error = None;
        self.result = Some(view);
    }

    pub(crate) fn show_error(&mut self, view: ErrorView) {
        self.result = None;
        self.error = Some(view);
    }

    /// 回到初始表单，清空结果区和错误区
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
