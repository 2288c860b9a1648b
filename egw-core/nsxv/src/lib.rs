//! NSX-V 边缘网关模块
//!
//! 提供边缘网关网络配置资源的 XML 模型，以及与管理平台代理接口交互的客户端实现。
//!
//! # 功能
//!
//! - **防火墙**: 整体开关 (保留全部规则)、规则增删改查
//! - **负载均衡**: 整体开关 (保留全部组件)、服务器池/监控器/应用配置/应用规则/虚拟服务器
//! - **NAT**: SNAT/DNAT 规则增删改查
//! - **IP 集合** (`IpSetApi`): 按 VDC 作用域管理
//!
//! 防火墙与负载均衡的整体配置接口会把请求中缺失的子对象当作删除，因此整体配置中
//! 的子对象以 [`InnerXml`] 片段原样保留，只修改需要修改的字段后整体提交。
//!
//! # 示例
//!
//! ```ignore
//! use egw_nsxv::{EdgeClient, EdgeConfig};
//!
//! let client = EdgeClient::new("https://vcd.example.com", EdgeConfig::default())?;
//! client.set_token(token).await;
//!
//! // 关闭负载均衡，服务器池等组件原样保留
//! let edge = client.edge("edge-3");
//! edge.set_load_balancer_enabled(false, false, None).await?;
//!
//! // 创建 IP 集合
//! let ip_set = IpSet {
//!     name: "web".into(),
//!     ip_addresses: "10.0.0.10-10.0.0.20".into(),
//!     ..Default::default()
//! };
//! client.ip_set(vdc_id).create(&ip_set).await?;
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod models;

pub use client::{EdgeClient, EdgeConfig};
pub use error::{NsxvError, Result};

pub use api::{EdgeGatewayApi, IpSetApi};

pub use models::{
    // 防火墙
    FirewallApplication, FirewallConfig, FirewallDefaultPolicy, FirewallEndpoint, FirewallRule,
    FirewallRules, FirewallService,

    // IP 集合
    IpSet, IpSetList,

    // 负载均衡
    LbAppProfile, LbAppProfileHttpRedirect, LbAppProfilePersistence, LbAppRule, LbComponent,
    LbLogging, LbMonitor, LbPool, LbPoolMember, LbVirtualServer, LoadBalancerConfig,

    // NAT
    NatRule, NatRules,
};

pub use egw_xmlcodec::{decode, decode_str, encode, encode_to_string, InnerXml, XmlError};
