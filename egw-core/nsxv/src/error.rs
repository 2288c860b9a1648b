//! NSX-V 边缘网关错误定义

use egw_xmlcodec::XmlError;
use thiserror::Error;

/// 边缘网关错误类型
#[derive(Error, Debug)]
pub enum NsxvError {
    /// 调用方校验失败，请求不会发出
    #[error("校验错误: {0}")]
    Validation(String),

    /// 请求体或响应体编解码失败
    #[error("XML 错误: {0}")]
    Xml(#[from] XmlError),

    #[error("HTTP 错误: {0}")]
    HttpError(String),

    #[error("认证错误: {0}")]
    AuthError(String),

    #[error("API 错误 [{0}]: {1}")]
    ApiError(u16, String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("资源不存在: {0}")]
    NotFound(String),
}

/// 边缘网关结果类型
pub type Result<T> = std::result::Result<T, NsxvError>;
