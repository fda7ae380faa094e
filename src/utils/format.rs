//! 展示格式化工具
//!
//! 界面固定使用 fr-FR 区域与欧元

/// 千分位分隔符（窄不换行空格，与浏览器 fr-FR 输出一致）
const GROUP_SEPARATOR: char = '\u{202F}';

/// 货币符号前的不换行空格
const CURRENCY_SPACING: char = '\u{A0}';

/// 缺失数值的占位符
pub const PLACEHOLDER: &str = "-";

/// 按 fr-FR 格式输出欧元金额，例如 `1 234 567,89 €`
pub fn format_eur(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let units = cents / 100;
    let fraction = cents % 100;

    let digits = units.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(ch);
    }

    format!(
        "{}{},{:02}{}€",
        if negative { "-" } else { "" },
        grouped,
        fraction,
        CURRENCY_SPACING
    )
}

/// 输出数字：整数不带小数位，否则保留原始精度
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

/// 按 fr-FR 格式输出百分比，保留两位小数，例如 `3,45 %`
pub fn format_percent(rate: f64) -> String {
    format!("{:.2}{}%", rate, CURRENCY_SPACING).replace('.', ",")
}

/// 返回第一个非空字符串；只含空白的字符串视为有值
pub fn first_non_empty<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<&'a str> {
    candidates.into_iter().flatten().find(|s| !s.is_empty())
}
