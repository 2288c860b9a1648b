//! 边缘网关数据模型
//!
//! 每个资源都是独立的纯数据记录，通过 `XmlFields` 实现声明字段到标签的映射。
//! 客户端侧的对象只是平台状态的一次快照，不做本地持久化。
//!
//! 省略规则与平台 schema 保持一致:
//! - 字符串/整数的"零值省略"字段直接使用 `String` / `i64`
//! - 需要区分"未设置"与"显式零值"的字段使用 `Option<T>`

pub mod firewall;
pub mod ipset;
pub mod load_balancer;
pub mod nat;

pub use firewall::{
    FirewallApplication, FirewallConfig, FirewallDefaultPolicy, FirewallEndpoint, FirewallRule,
    FirewallRules, FirewallService,
};
pub use ipset::{IpSet, IpSetList};
pub use load_balancer::{
    LbAppProfile, LbAppProfileHttpRedirect, LbAppProfilePersistence, LbAppRule, LbComponent,
    LbLogging, LbMonitor, LbPool, LbPoolMember, LbVirtualServer, LoadBalancerConfig,
};
pub use nat::{NatRule, NatRules};
