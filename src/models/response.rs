//! 贷款处理 API 的响应结构
//!
//! 所有嵌套字段在线上都可能缺失，统一用 `Option` + `#[serde(default)]` 兜底，
//! 缺失时由渲染层决定占位文本。

use serde::Deserialize;
use serde_json::Value as JsonValue;

/// 成功响应中 `status` 字段的取值
pub const SUCCESS_STATUS: &str = "success";

/// 贷款申请处理结果
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplicationResult {
    /// 后端生成的申请编号，原样回显，不做解析
    pub correlation_id: String,
    pub final_decision: Decision,
    pub credit_assessment: CreditAssessment,
    pub property_evaluation: PropertyEvaluation,
    pub client_email: Option<String>,
    /// 后端处理完成时间（ISO 8601，无时区）
    pub timestamp: Option<String>,
    /// 面向客户的简短说明
    pub simple_explanation: Option<String>,
}

/// 最终审批决定
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Decision {
    pub approved: Option<bool>,
    pub decision: Option<String>,
    pub justification: Option<String>,
    pub risk_level: Option<String>,
    pub interest_rate: Option<f64>,
}

/// 信用评估
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreditAssessment {
    pub score: Option<f64>,
    pub grade: Option<String>,
    /// `"solvent"` 表示有偿付能力，其余取值均视为无
    pub status: Option<String>,
    pub explanations: Explanations,
}

/// 信用评估的文字说明
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Explanations {
    pub credit: Option<String>,
    pub income: Option<String>,
    pub history: Option<String>,
}

/// 房产估值
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PropertyEvaluation {
    pub estimated_value: Option<f64>,
    pub reason: Option<String>,
    /// `COMPLETED` 或 `EXPERT_REVIEW`
    pub status: Option<String>,
    pub is_compliant: Option<bool>,
}

/// 失败响应体
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub error: Option<String>,
    pub status: Option<String>,
    /// REST 适配器附带的原始故障码，例如 `Client.NotFound`
    pub fault_code: Option<String>,
}

impl ErrorEnvelope {
    /// 从任意 JSON 响应体中按字段名读取错误信息
    ///
    /// 每个字段独立读取：不是字符串的字段视为缺失，不影响其他字段；
    /// 响应体不是 JSON 对象时得到空信封。
    pub fn from_body(body: &JsonValue) -> Self {
        let text = |key: &str| body.get(key).and_then(JsonValue::as_str).map(str::to_string);
        Self {
            error: text("error"),
            status: text("status"),
            fault_code: text("fault_code"),
        }
    }
}

/// 判断 2xx 响应体是否为成功结果
pub fn is_success_payload(body: &JsonValue) -> bool {
    body.get("status").and_then(JsonValue::as_str) == Some(SUCCESS_STATUS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_payload_defaults() {
        let result: ApplicationResult = serde_json::from_value(json!({
            "status": "success",
            "correlation_id": "A1B2C3D4",
            "final_decision": { "approved": true }
        }))
        .unwrap();

        assert_eq!(result.correlation_id, "A1B2C3D4");
        assert_eq!(result.final_decision.approved, Some(true));
        assert!(result.credit_assessment.score.is_none());
        assert!(result.credit_assessment.explanations.credit.is_none());
        assert!(result.property_evaluation.estimated_value.is_none());
    }

    #[test]
    fn test_error_envelope_tolerates_foreign_shapes() {
        let envelope = ErrorEnvelope::from_body(&json!(["not", "an", "object"]));
        assert_eq!(envelope, ErrorEnvelope::default());

        let envelope = ErrorEnvelope::from_body(&json!("Client.NotFound"));
        assert_eq!(envelope, ErrorEnvelope::default());

        let envelope = ErrorEnvelope::from_body(&json!({
            "error": "Champs manquants : adresse",
            "status": "error",
            "fault_code": "Property.IncompleteData"
        }));
        assert_eq!(envelope.fault_code.as_deref(), Some("Property.IncompleteData"));
    }

    #[test]
    fn test_error_envelope_keeps_error_when_sibling_has_wrong_type() {
        let envelope = ErrorEnvelope::from_body(&json!({
            "error": "Client.NotFound",
            "status": 404,
            "fault_code": ["Client.NotFound"]
        }));
        assert_eq!(envelope.error.as_deref(), Some("Client.NotFound"));
        assert!(envelope.status.is_none());
        assert!(envelope.fault_code.is_none());

        let envelope = ErrorEnvelope::from_body(&json!({ "error": { "code": 7 } }));
        assert!(envelope.error.is_none());
    }

    #[test]
    fn test_is_success_payload() {
        assert!(is_success_payload(&json!({ "status": "success" })));
        assert!(!is_success_payload(&json!({ "status": "SUCCESS" })));
        assert!(!is_success_payload(&json!({ "error": "x" })));
    }
}
