//! 贷款处理 API 客户端
//!
//! 封装与 REST 适配器之间的全部 HTTP 调用

use std::future::Future;

use reqwest::Client;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError};
use crate::models::LoanApplicationPayload;

/// 贷款申请接口路径
pub const APPLY_ENDPOINT: &str = "/api/loan/apply";
/// 健康检查接口路径
pub const HEALTH_ENDPOINT: &str = "/api/health";

/// 一次 HTTP 往返的结果：状态码 + 已解析的 JSON 响应体
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: JsonValue,
}

impl ApiResponse {
    pub fn new(status: u16, body: JsonValue) -> Self {
        Self { status, body }
    }

    /// 状态码是否为 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 贷款处理后端
///
/// 控制器和健康检查只依赖这个 trait，测试中可以替换为内存实现。
pub trait LoanApi: Send + Sync + 'static {
    /// 提交贷款申请
    ///
    /// 只要拿到了 JSON 响应体就返回 `Ok`，无论状态码；
    /// 网络失败或响应体不是 JSON 时返回 `Err`。
    fn apply(
        &self,
        payload: &LoanApplicationPayload<'_>,
    ) -> impl Future<Output = AppResult<ApiResponse>> + Send;

    /// 健康检查：2xx 且响应体可解析为 JSON 时返回 `Ok`
    fn health(&self) -> impl Future<Output = AppResult<()>> + Send;
}

/// 基于 reqwest 的实现
#[derive(Clone)]
pub struct ReqwestLoanApi {
    client: Client,
    base_url: String,
}

impl ReqwestLoanApi {
    /// 创建新的 API 客户端
    ///
    /// 配置了 `request_timeout_secs` 时，请求超时会作为网络失败返回。
    pub fn new(config: &Config) -> AppResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ConfigError::HttpClientBuildFailed)?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// 读取响应体并解析为 JSON
    async fn read_json(endpoint: &str, response: reqwest::Response) -> AppResult<JsonValue> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;
        serde_json::from_slice(&bytes).map_err(|e| AppError::json_parse_failed(endpoint, e))
    }
}

impl LoanApi for ReqwestLoanApi {
    async fn apply(&self, payload: &LoanApplicationPayload<'_>) -> AppResult<ApiResponse> {
        let url = self.url(APPLY_ENDPOINT);
        debug!("提交贷款申请 Payload: client_id={}", payload.client_id);

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(APPLY_ENDPOINT, e))?;

        let status = response.status().as_u16();
        let body = Self::read_json(APPLY_ENDPOINT, response).await?;

        debug!("贷款申请响应: status={}, body={}", status, body);

        Ok(ApiResponse::new(status, body))
    }

    async fn health(&self) -> AppResult<()> {
        let response = self
            .client
            .get(self.url(HEALTH_ENDPOINT))
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(HEALTH_ENDPOINT, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::bad_status(HEALTH_ENDPOINT, status.as_u16()));
        }

        // 响应内容不做解释，只要求是合法 JSON
        Self::read_json(HEALTH_ENDPOINT, response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_success_response() {
        assert!(ApiResponse::new(200, json!({})).is_success());
        assert!(ApiResponse::new(202, json!({})).is_success());
        assert!(!ApiResponse::new(404, json!({})).is_success());
        assert!(!ApiResponse::new(503, json!({})).is_success());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = Config {
            api_base_url: "http://localhost:5001/".to_string(),
            ..Config::default()
        };
        let api = ReqwestLoanApi::new(&config).unwrap();
        assert_eq!(api.url(APPLY_ENDPOINT), "http://localhost:5001/api/loan/apply");
    }
}
