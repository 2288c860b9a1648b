//! EGW XML 编解码
//!
//! 边缘网关管理接口以 XML 文档收发配置。其中防火墙、负载均衡等"整体配置"资源在更新时
//! 必须携带全部子对象，否则缺失的子对象会被平台删除。本 crate 提供两类节点的统一编解码:
//!
//! - **已建模字段**: 通过 [`XmlFields`] 声明标签映射，编码时按 schema 顺序输出，
//!   并遵循省略规则 (零值省略 / 存在标记)
//! - **不透明片段** ([`InnerXml`]): 解码时截取原文，编码时逐字节写回
//!
//! # 示例
//!
//! ```ignore
//! use egw_xmlcodec::{decode, encode};
//!
//! let config: LoadBalancerConfig = decode(&response_body)?;
//! let body = encode(&config);
//! assert_eq!(body, response_body);
//! ```
//!
//! 编解码器是无状态的纯函数，可在任意线程并发调用。

pub mod element;
pub mod error;
pub mod inner;
pub mod reader;
pub mod writer;

pub use element::{XmlFields, XmlRoot};
pub use error::{Result, XmlError};
pub use inner::InnerXml;
pub use reader::{decode, decode_str, Node};
pub use writer::{encode, encode_to_string, XmlWriter};
