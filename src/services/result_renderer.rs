//! 结果渲染服务 - 业务能力层
//!
//! 把后端的结构化结果分类、格式化为视图模型。
//! 不持有任何界面资源，只负责"结果应该怎么展示"。

use std::fmt;

use chrono::NaiveDateTime;

use crate::models::ApplicationResult;
use crate::models::PropertyEvaluation;
use crate::utils::format::{
    first_non_empty, format_eur, format_number, format_percent, PLACEHOLDER,
};

/// 待定决定的字面值（精确匹配）
pub const PENDING_DECISION: &str = "EN ATTENTE";
/// 缺少任何理由时的占位文本
pub const NO_REASON: &str = "Pas de motif disponible";
/// 缺少说明文字时的占位文本
pub const NOT_AVAILABLE: &str = "N/A";
/// 后端未返回邮箱时的占位文本
pub const EMAIL_PLACEHOLDER: &str = "adresse-email@domaine.com";

/// 房产估值转人工评估时的 `status` 取值
pub const EXPERT_REVIEW_STATUS: &str = "EXPERT_REVIEW";
pub const EXPERT_REVIEW_NOTE: &str = "🔎 Évaluation experte de la propriété en cours";
pub const NON_COMPLIANT_NOTE: &str = "⚠️ Propriété non conforme aux critères standard";

pub const SHOW_ANALYSIS_LABEL: &str = "📖 Afficher l'analyse détaillée";
pub const HIDE_ANALYSIS_LABEL: &str = "📖 Masquer l'analyse détaillée";

/// 决定分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionCategory {
    Approved,
    Pending,
    Rejected,
}

impl DecisionCategory {
    /// 分类优先级：`approved == true` 优先于任何决定文字，
    /// 其次才检查字面值 `EN ATTENTE`，其余一律视为拒绝
    pub fn classify(approved: Option<bool>, decision: Option<&str>) -> Self {
        if approved == Some(true) {
            DecisionCategory::Approved
        } else if decision == Some(PENDING_DECISION) {
            DecisionCategory::Pending
        } else {
            DecisionCategory::Rejected
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            DecisionCategory::Approved => "✅ APPROUVÉE",
            DecisionCategory::Pending => "⏳ EN ATTENTE",
            DecisionCategory::Rejected => "❌ REJETÉE",
        }
    }

    /// 语义样式标签
    pub fn style_tag(self) -> &'static str {
        match self {
            DecisionCategory::Approved => "approved",
            DecisionCategory::Pending => "pending",
            DecisionCategory::Rejected => "rejected",
        }
    }
}

/// 详细分析中的四段说明，各自独立兜底
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplanationsView {
    pub credit: String,
    pub income: String,
    pub history: String,
    pub appraisal: String,
}

/// 结果视图
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub category: DecisionCategory,
    pub correlation_id: String,
    pub reason: String,
    pub credit_score: String,
    pub solvency: String,
    pub property_value: String,
    pub risk_level: String,
    /// 仅在后端给出利率时显示
    pub interest_rate: Option<String>,
    /// 房产估值的附加提示（人工评估、不合规）
    pub property_notes: Vec<&'static str>,
    pub explanations: ExplanationsView,
    pub client_email: String,
    pub summary: Option<String>,
    pub processed_at: Option<String>,
    analysis_expanded: bool,
}

impl ResultView {
    pub fn title(&self) -> &'static str {
        self.category.title()
    }

    pub fn style_tag(&self) -> &'static str {
        self.category.style_tag()
    }

    /// 申请编号行，原样回显 correlation id
    pub fn reference(&self) -> String {
        format!("Demande N° {}", self.correlation_id)
    }

    pub fn analysis_expanded(&self) -> bool {
        self.analysis_expanded
    }

    /// 切换按钮当前应显示的文字
    pub fn toggle_label(&self) -> &'static str {
        if self.analysis_expanded {
            HIDE_ANALYSIS_LABEL
        } else {
            SHOW_ANALYSIS_LABEL
        }
    }

    /// 展开/收起详细分析，返回新的按钮文字
    pub fn toggle_analysis(&mut self) -> &'static str {
        self.analysis_expanded = !self.analysis_expanded;
        self.toggle_label()
    }
}

/// 渲染处理结果；详细分析默认收起
pub fn render(result: &ApplicationResult) -> ResultView {
    let decision = &result.final_decision;
    let credit = &result.credit_assessment;
    let property = &result.property_evaluation;

    let category = DecisionCategory::classify(decision.approved, decision.decision.as_deref());

    let reason = first_non_empty([
        decision.justification.as_deref(),
        decision.decision.as_deref(),
    ])
    .unwrap_or(NO_REASON)
    .to_string();

    ResultView {
        category,
        correlation_id: result.correlation_id.clone(),
        reason,
        credit_score: format_credit_score(credit.score, credit.grade.as_deref()),
        solvency: format_solvency(credit.status.as_deref()).to_string(),
        property_value: present(property.estimated_value)
            .map(format_eur)
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        risk_level: text_or(decision.risk_level.as_deref(), PLACEHOLDER),
        interest_rate: decision
            .interest_rate
            .filter(|rate| rate.is_finite())
            .map(format_percent),
        property_notes: property_notes(property),
        explanations: ExplanationsView {
            credit: text_or(credit.explanations.credit.as_deref(), NOT_AVAILABLE),
            income: text_or(credit.explanations.income.as_deref(), NOT_AVAILABLE),
            history: text_or(credit.explanations.history.as_deref(), NOT_AVAILABLE),
            appraisal: text_or(property.reason.as_deref(), NOT_AVAILABLE),
        },
        client_email: text_or(result.client_email.as_deref(), EMAIL_PLACEHOLDER),
        summary: first_non_empty([result.simple_explanation.as_deref()]).map(str::to_string),
        processed_at: result.timestamp.as_deref().and_then(format_timestamp),
        analysis_expanded: false,
    }
}

/// `742/1000 (B)`；分数缺失或为 0 时显示占位符
fn format_credit_score(score: Option<f64>, grade: Option<&str>) -> String {
    match present(score) {
        Some(score) => format!(
            "{}/1000 ({})",
            format_number(score),
            first_non_empty([grade]).unwrap_or(NOT_AVAILABLE)
        ),
        None => PLACEHOLDER.to_string(),
    }
}

fn property_notes(property: &PropertyEvaluation) -> Vec<&'static str> {
    let mut notes = Vec::new();
    if property.status.as_deref() == Some(EXPERT_REVIEW_STATUS) {
        notes.push(EXPERT_REVIEW_NOTE);
    }
    if property.is_compliant == Some(false) {
        notes.push(NON_COMPLIANT_NOTE);
    }
    notes
}

fn format_solvency(status: Option<&str>) -> &'static str {
    if status == Some("solvent") {
        "✓ Solvable"
    } else {
        "✗ Non solvable"
    }
}

/// 数值为 0 视同缺失
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && v.is_finite())
}

fn text_or(value: Option<&str>, fallback: &str) -> String {
    first_non_empty([value]).unwrap_or(fallback).to_string()
}

/// 后端时间戳为不带时区的 ISO 8601，例如 `2024-05-02T14:03:11.482913`
fn format_timestamp(raw: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ts| ts.format("%d/%m/%Y %H:%M").to_string())
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.style_tag(), self.title())?;
        writeln!(f, "{}", self.reference())?;
        writeln!(f, "{}", self.reason)?;
        writeln!(f)?;
        writeln!(f, "Score de crédit    : {}", self.credit_score)?;
        writeln!(f, "Solvabilité        : {}", self.solvency)?;
        writeln!(f, "Valeur estimée     : {}", self.property_value)?;
        for note in &self.property_notes {
            writeln!(f, "  {}", note)?;
        }
        writeln!(f, "Niveau de risque   : {}", self.risk_level)?;
        if let Some(rate) = &self.interest_rate {
            writeln!(f, "Taux d'intérêt     : {}", rate)?;
        }
        if let Some(summary) = &self.summary {
            writeln!(f)?;
            writeln!(f, "{}", summary)?;
        }
        writeln!(f)?;
        writeln!(f, "Notification envoyée à : {}", self.client_email)?;
        if let Some(processed_at) = &self.processed_at {
            writeln!(f, "Traitée le : {}", processed_at)?;
        }

        if self.analysis_expanded {
            writeln!(f)?;
            writeln!(f, "💰 Analyse Financière")?;
            writeln!(f, "  Score de crédit : {}", self.explanations.credit)?;
            writeln!(f, "  Revenus vs Dépenses : {}", self.explanations.income)?;
            writeln!(f, "  Historique de crédit : {}", self.explanations.history)?;
            writeln!(f, "🏘️ Évaluation de Propriété")?;
            writeln!(f, "  Analyse appraisal : {}", self.explanations.appraisal)?;
        }

        write!(f, "{}", self.toggle_label())
    }
}
