use std::sync::LazyLock;

use chrono::{DateTime, Local};
use regex::Regex;
use serde::Serialize;

/// 文本中找不到 `CLIENT_ID` 字段时使用的客户ID
pub const UNKNOWN_CLIENT_ID: &str = "unknown";

static CLIENT_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)CLIENT_ID\s*:\s*([^\n]+)").expect("CLIENT_ID 正则表达式无效")
});

/// 贷款申请请求
///
/// 提交时创建，之后不可变；会话中缓存最近一次提交，用于重试。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanRequest {
    raw_text: String,
    client_id: String,
    submitted_at: DateTime<Local>,
}

impl LoanRequest {
    pub fn new(raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let client_id = extract_client_id(&raw_text);
        Self {
            raw_text,
            client_id,
            submitted_at: Local::now(),
        }
    }

    /// 用户输入的原始文本（逐字节保留）
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn submitted_at(&self) -> DateTime<Local> {
        self.submitted_at
    }

    /// 构建 `POST /api/loan/apply` 请求体
    pub fn to_payload(&self) -> LoanApplicationPayload<'_> {
        LoanApplicationPayload {
            client_id: &self.client_id,
            request_text: &self.raw_text,
        }
    }
}

/// `POST /api/loan/apply` 请求体
#[derive(Debug, Clone, Serialize)]
pub struct LoanApplicationPayload<'a> {
    pub client_id: &'a str,
    pub request_text: &'a str,
}

/// 从申请文本中提取客户ID
///
/// 匹配第一处 `CLIENT_ID: <值>`（标签不区分大小写），取该行剩余部分并去除首尾空白。
pub fn extract_client_id(text: &str) -> String {
    CLIENT_ID_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT_ID.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_client_id_first_line_match() {
        assert_eq!(extract_client_id("CLIENT_ID: abc-123\nrest"), "abc-123");
    }

    #[test]
    fn test_extract_client_id_case_insensitive_label() {
        assert_eq!(
            extract_client_id("Bonjour\nclient_id :   client-042  \nMontant: 200000"),
            "client-042"
        );
    }

    #[test]
    fn test_extract_client_id_takes_first_match() {
        assert_eq!(
            extract_client_id("CLIENT_ID: client-001\nCLIENT_ID: client-002"),
            "client-001"
        );
    }

    #[test]
    fn test_extract_client_id_missing() {
        assert_eq!(extract_client_id("Je souhaite emprunter 200000 euros"), "unknown");
    }

    #[test]
    fn test_payload_shape() {
        let request = LoanRequest::new("CLIENT_ID: client-042\nMaison à Lyon");
        let json = serde_json::to_value(request.to_payload()).unwrap();
        assert_eq!(json["client_id"], "client-042");
        assert_eq!(json["request_text"], "CLIENT_ID: client-042\nMaison à Lyon");
    }
}
