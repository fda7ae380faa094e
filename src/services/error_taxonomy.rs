//! 错误码翻译服务 - 业务能力层
//!
//! 把后端返回的错误字符串翻译为面向用户的提示信息。
//! 纯函数，不会失败：匹配不到任何规则时原样返回输入。

use phf::phf_ordered_map;

/// 错误来源分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOrigin {
    /// 客户输入有误，需要修改后重新提交
    ClientInput,
    /// 房产数据问题
    PropertyData,
    /// 后端数据/处理故障，建议重试
    Backend,
}

/// 后端错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ClientNotFound,
    ClientValidationError,
    PropertyIncompleteData,
    PropertyValidationError,
    PropertyRegionNotFound,
    ClientDataError,
    BusinessScoringError,
    BusinessDecisionError,
    ApprovalDecisionError,
    PropertyAppraisalError,
    ServerOrchestrationError,
}

/// 错误码表，按匹配顺序排列（先匹配者优先）
static TAXONOMY: phf::OrderedMap<&'static str, ErrorCode> = phf_ordered_map! {
    "Client.NotFound" => ErrorCode::ClientNotFound,
    "Client.ValidationError" => ErrorCode::ClientValidationError,
    "Property.IncompleteData" => ErrorCode::PropertyIncompleteData,
    "Property.ValidationError" => ErrorCode::PropertyValidationError,
    "Property.RegionNotFound" => ErrorCode::PropertyRegionNotFound,
    "Client.DataError" => ErrorCode::ClientDataError,
    "Business.ScoringError" => ErrorCode::BusinessScoringError,
    "Business.DecisionError" => ErrorCode::BusinessDecisionError,
    "Approval.DecisionError" => ErrorCode::ApprovalDecisionError,
    "Property.AppraisalError" => ErrorCode::PropertyAppraisalError,
    "Server.OrchestrationError" => ErrorCode::ServerOrchestrationError,
};

/// 错误码表未命中时的粗粒度分类检查（区分大小写，按顺序）
const FALLBACK_RULES: [(&str, &str); 4] = [
    (
        "NotFound",
        "La ressource demandée n'existe pas dans notre système.",
    ),
    (
        "ValidationError",
        "Les données fournies ne sont pas au bon format.",
    ),
    (
        "IncompleteData",
        "Informations incomplètes. Tous les champs sont obligatoires.",
    ),
    (
        "RegionNotFound",
        "La région de la propriété n'est pas reconnue. Une évaluation experte sera nécessaire.",
    ),
];

impl ErrorCode {
    /// 所有错误码，按匹配顺序
    pub fn all() -> impl Iterator<Item = ErrorCode> {
        TAXONOMY.values().copied()
    }

    /// 精确解析错误码（不区分大小写）
    pub fn from_code(code: &str) -> Option<Self> {
        TAXONOMY
            .entries()
            .find(|(key, _)| key.eq_ignore_ascii_case(code.trim()))
            .map(|(_, value)| *value)
    }

    /// 线上使用的错误码字符串，取自错误码表
    pub fn as_str(self) -> &'static str {
        TAXONOMY
            .entries()
            .find(|(_, code)| **code == self)
            .map(|(key, _)| *key)
            .unwrap_or_default()
    }

    /// 面向用户的提示信息
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::ClientNotFound => {
                "Client non trouvé dans notre système. Veuillez vérifier l'identifiant client."
            }
            ErrorCode::ClientValidationError => {
                "Format d'identifiant client invalide. Utilisez le format 'client-XXX'."
            }
            ErrorCode::PropertyIncompleteData => {
                "Champs manquants ou invalides. Veuillez vérifier :"
            }
            ErrorCode::PropertyValidationError => {
                "Adresse de propriété invalide. Elle est trop courte ou vide."
            }
            ErrorCode::PropertyRegionNotFound => {
                "La région de la propriété n'est pas dans notre base de données standard. \
                 Votre demande sera traitée par nos experts spécialisés."
            }
            ErrorCode::ClientDataError => {
                "Impossible de récupérer les données client. Erreur base de données."
            }
            ErrorCode::BusinessScoringError => "Erreur lors du calcul du score de crédit.",
            ErrorCode::BusinessDecisionError => "Erreur lors de l'évaluation de solvabilité.",
            ErrorCode::ApprovalDecisionError => {
                "Erreur lors de la prise de décision. Veuillez réessayer."
            }
            ErrorCode::PropertyAppraisalError => "Erreur lors de l'évaluation de la propriété.",
            ErrorCode::ServerOrchestrationError => {
                "Erreur de traitement global. Le système n'a pas pu compléter l'évaluation."
            }
        }
    }

    pub fn origin(self) -> ErrorOrigin {
        match self {
            ErrorCode::ClientNotFound | ErrorCode::ClientValidationError => {
                ErrorOrigin::ClientInput
            }
            ErrorCode::PropertyIncompleteData
            | ErrorCode::PropertyValidationError
            | ErrorCode::PropertyRegionNotFound => ErrorOrigin::PropertyData,
            ErrorCode::ClientDataError
            | ErrorCode::BusinessScoringError
            | ErrorCode::BusinessDecisionError
            | ErrorCode::ApprovalDecisionError
            | ErrorCode::PropertyAppraisalError
            | ErrorCode::ServerOrchestrationError => ErrorOrigin::Backend,
        }
    }

    /// 软失败：转人工评估，不是硬拒绝
    pub fn is_soft_failure(self) -> bool {
        self == ErrorCode::PropertyRegionNotFound
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 在错误字符串中查找第一个出现的错误码（不区分大小写的子串匹配）
pub fn find_code(error: &str) -> Option<ErrorCode> {
    let lowered = error.to_lowercase();
    TAXONOMY
        .entries()
        .find(|(code, _)| error.contains(*code) || lowered.contains(&code.to_lowercase()))
        .map(|(_, value)| *value)
}

/// 翻译后端错误字符串
///
/// 1. 按错误码表顺序做子串匹配；错误字符串比错误码长时，把第一个冒号之后的内容
///    作为详情，空一行附在提示信息后面
/// 2. 表中没有命中时，按 `NotFound` / `ValidationError` / `IncompleteData` /
///    `RegionNotFound` 的顺序做粗粒度匹配
/// 3. 都没有命中则原样返回
pub fn translate(error: &str) -> String {
    if let Some(code) = find_code(error) {
        let message = code.message();
        if error.len() > code.as_str().len() {
            if let Some(detail) = detail_after_colon(error) {
                return format!("{}\n\n{}", message, detail);
            }
        }
        return message.to_string();
    }

    FALLBACK_RULES
        .iter()
        .find(|(needle, _)| error.contains(needle))
        .map(|(_, message)| message.to_string())
        .unwrap_or_else(|| error.to_string())
}

/// 确定错误字符串对应的错误码：先看 `error` 本身，再看 `fault_code`
pub fn resolve_code(error: &str, fault_code: Option<&str>) -> Option<ErrorCode> {
    find_code(error).or_else(|| fault_code.and_then(ErrorCode::from_code))
}

/// 带故障码的翻译
///
/// REST 适配器返回的 `error` 通常是一段说明文字，真正的错误码在 `fault_code` 里。
/// 只有 `error` 本身匹配不到错误码、而 `fault_code` 是已知错误码时，才按
/// `"<fault_code>: <error>"` 翻译。
pub fn translate_with_fault_code(error: &str, fault_code: Option<&str>) -> String {
    match fault_code.and_then(ErrorCode::from_code) {
        Some(code) if find_code(error).is_none() => {
            translate(&format!("{}: {}", code.as_str(), error))
        }
        _ => translate(error),
    }
}

fn detail_after_colon(error: &str) -> Option<&str> {
    let (_, rest) = error.split_once(':')?;
    let detail = rest.trim();
    (!detail.is_empty()).then_some(detail)
}
