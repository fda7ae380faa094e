use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppResult, ConfigError};

/// 未指定配置文件时尝试读取的默认路径
pub const DEFAULT_CONFIG_FILE: &str = "loan_portal.toml";

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 贷款处理 API 地址（REST 适配器）
    pub api_base_url: String,
    /// 健康检查轮询间隔（秒）
    pub health_poll_interval_secs: u64,
    /// 进度动画每个阶段的间隔（毫秒）
    pub progress_step_millis: u64,
    /// 提交请求超时（秒），不设置则一直等待
    pub request_timeout_secs: Option<u64>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5001".to_string(),
            health_poll_interval_secs: 15,
            progress_step_millis: 600,
            request_timeout_secs: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载配置：TOML 文件（可选）+ 环境变量覆盖
    ///
    /// 文件路径取自 `LOAN_PORTAL_CONFIG`，否则尝试 [`DEFAULT_CONFIG_FILE`]。
    /// 显式指定的文件不存在时报错，默认文件不存在时使用默认值。
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var("LOAN_PORTAL_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            Err(_) => Self::default(),
        };
        base.with_env_overrides()
    }

    /// 从 TOML 文件读取配置，缺省字段使用默认值
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: display.clone(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| {
            ConfigError::TomlParseFailed {
                path: display,
                source,
            }
            .into()
        })
    }

    fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 只从环境变量读取（基于默认值）
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(self) -> AppResult<Self> {
        Ok(Self {
            api_base_url: std::env::var("LOAN_API_BASE_URL").unwrap_or(self.api_base_url),
            health_poll_interval_secs: env_parse("HEALTH_POLL_INTERVAL_SECS", "u64")?
                .unwrap_or(self.health_poll_interval_secs),
            progress_step_millis: env_parse("PROGRESS_STEP_MILLIS", "u64")?
                .unwrap_or(self.progress_step_millis),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", "u64")?
                .or(self.request_timeout_secs),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?
                .unwrap_or(self.verbose_logging),
        })
    }

    pub fn health_poll_interval(&self) -> Duration {
        Duration::from_secs(self.health_poll_interval_secs)
    }

    pub fn progress_step(&self) -> Duration {
        Duration::from_millis(self.progress_step_millis)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// 读取并解析环境变量；未设置返回 `None`，格式错误返回 [`ConfigError::EnvVarParseFailed`]
fn env_parse<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse().map(Some).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://localhost:5001");
        assert_eq!(config.health_poll_interval(), Duration::from_secs(15));
        assert_eq!(config.progress_step(), Duration::from_millis(600));
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            api_base_url = "http://loan-adapter:5001"
            request_timeout_secs = 45
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "http://loan-adapter:5001");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(45)));
        assert_eq!(config.health_poll_interval_secs, 15);
        assert!(!config.verbose_logging);
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(Config::from_toml_str("health_poll_interval_secs = \"often\"").is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Config::from_file(Path::new("/nonexistent/loan_portal.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/loan_portal.toml"));
    }
}
