//! 边缘网关 API 模块
//!
//! 提供 NSX-V 代理接口的封装，包括：
//! - 防火墙 (整体开关、规则增删改查)
//! - 负载均衡 (整体开关、服务器池/监控器/应用配置/应用规则/虚拟服务器)
//! - NAT 规则
//! - IP 集合 (`IpSetApi`，按 VDC 作用域)

pub mod edge;
pub mod firewall;
pub mod ipset;
pub mod load_balancer;
pub mod nat;

pub use edge::EdgeGatewayApi;
pub use ipset::IpSetApi;
