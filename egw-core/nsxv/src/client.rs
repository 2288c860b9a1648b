//! 边缘网关客户端核心实现
//!
//! 只负责把编码后的文档发送到平台并取回响应体。会话令牌由调用方获取后通过
//! [`EdgeClient::set_token`] 注入；请求失败不做重试，由上层决定是否重新读取配置后再提交。

use std::env;
use std::sync::Arc;
use std::time::Duration;

use egw_xmlcodec::{decode_str, encode_to_string, XmlRoot};
use reqwest::{header, Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use crate::api::{EdgeGatewayApi, IpSetApi};
use crate::error::{NsxvError, Result};

/// 客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeConfig {
    /// 连接超时（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// 请求超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// 是否验证 SSL 证书
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,

    /// `Accept` 头中声明的 API 版本
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_connect_timeout() -> u64 {
    10
}
fn default_request_timeout() -> u64 {
    30
}
fn default_verify_ssl() -> bool {
    true
}
fn default_api_version() -> String {
    "31.0".to_string()
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            verify_ssl: default_verify_ssl(),
            api_version: default_api_version(),
        }
    }
}

impl EdgeConfig {
    /// 从环境变量覆盖配置
    pub fn apply_env_vars(&mut self) -> Result<()> {
        if let Ok(timeout) = env::var("EGW_CONNECT_TIMEOUT") {
            self.connect_timeout = timeout
                .parse()
                .map_err(|_| NsxvError::ConfigError(format!("无效的 EGW_CONNECT_TIMEOUT: {}", timeout)))?;
        }
        if let Ok(timeout) = env::var("EGW_REQUEST_TIMEOUT") {
            self.request_timeout = timeout
                .parse()
                .map_err(|_| NsxvError::ConfigError(format!("无效的 EGW_REQUEST_TIMEOUT: {}", timeout)))?;
        }
        if let Ok(verify_ssl) = env::var("EGW_VERIFY_SSL") {
            self.verify_ssl = verify_ssl
                .parse()
                .map_err(|_| NsxvError::ConfigError(format!("无效的 EGW_VERIFY_SSL: {}", verify_ssl)))?;
        }
        if let Ok(version) = env::var("EGW_API_VERSION") {
            self.api_version = version;
        }
        Ok(())
    }
}

/// 原始响应
#[derive(Debug, Clone)]
pub(crate) struct XmlResponse {
    pub status: u16,
    pub location: Option<String>,
    pub body: String,
}

/// 边缘网关客户端
pub struct EdgeClient {
    /// 平台基础 URL
    base_url: String,

    /// HTTP 客户端
    http_client: Client,

    /// 会话令牌
    access_token: Arc<RwLock<Option<String>>>,

    config: EdgeConfig,
}

impl EdgeClient {
    /// 创建新的客户端
    pub fn new(base_url: &str, config: EdgeConfig) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| NsxvError::ConfigError(format!("无效的平台地址 {}: {}", base_url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(NsxvError::ConfigError(format!(
                "不支持的协议: {}",
                parsed.scheme()
            )));
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| NsxvError::HttpError(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
            access_token: Arc::new(RwLock::new(None)),
            config,
        })
    }

    /// 设置会话令牌
    pub async fn set_token(&self, token: impl Into<String>) {
        *self.access_token.write().await = Some(token.into());
    }

    /// 清除会话令牌
    pub async fn clear_token(&self) {
        *self.access_token.write().await = None;
    }

    /// 获取指定边缘网关的 API
    pub fn edge(&self, edge_id: &str) -> EdgeGatewayApi<'_> {
        EdgeGatewayApi::new(self, edge_id)
    }

    /// 获取指定 VDC 作用域下的 IP 集合 API
    pub fn ip_set(&self, vdc_id: &str) -> IpSetApi<'_> {
        IpSetApi::new(self, vdc_id)
    }

    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 发送 HTTP 请求
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<XmlResponse> {
        let url = format!("{}{}", self.base_url, path);
        debug!("边缘网关 API 请求: {} {}", method, url);

        let token = self.access_token.read().await;
        let token_str = token
            .as_ref()
            .ok_or_else(|| NsxvError::AuthError("未设置会话令牌".to_string()))?;

        let mut request = self
            .http_client
            .request(method, &url)
            .bearer_auth(token_str)
            .header(
                header::ACCEPT,
                format!("application/*+xml;version={}", self.config.api_version),
            );

        if let Some(body) = body {
            request = request
                .header(header::CONTENT_TYPE, "application/xml")
                .body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NsxvError::HttpError(e.to_string()))?;

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let text = response
            .text()
            .await
            .map_err(|e| NsxvError::HttpError(e.to_string()))?;

        if status == StatusCode::NOT_FOUND {
            return Err(NsxvError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            warn!("API 请求失败: {} - {}", status, text);
            return Err(NsxvError::ApiError(status.as_u16(), text));
        }

        Ok(XmlResponse {
            status: status.as_u16(),
            location,
            body: text,
        })
    }

    /// 读取并解码资源
    pub(crate) async fn get_xml<T: XmlRoot + Default>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path, None).await?;
        Ok(decode_str(&response.body)?)
    }

    /// 整体替换资源
    pub(crate) async fn put_xml<T: XmlRoot>(&self, path: &str, value: &T) -> Result<()> {
        self.request(Method::PUT, path, Some(encode_to_string(value)))
            .await?;
        Ok(())
    }

    /// 创建资源，返回平台分配的 ID
    pub(crate) async fn post_xml<T: XmlRoot>(&self, path: &str, value: &T) -> Result<String> {
        let response = self
            .request(Method::POST, path, Some(encode_to_string(value)))
            .await?;
        response
            .location
            .as_deref()
            .and_then(id_from_location)
            .ok_or_else(|| {
                NsxvError::ApiError(response.status, "响应缺少 Location 头".to_string())
            })
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.request(Method::DELETE, path, None).await?;
        Ok(())
    }
}

/// 从 `Location` 头提取新资源 ID (最后一个路径段)
pub(crate) fn id_from_location(location: &str) -> Option<String> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
