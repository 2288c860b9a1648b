//! 负载均衡资源模型

use egw_xmlcodec::{InnerXml, Node, XmlFields, XmlRoot, XmlWriter};
use serde::{Deserialize, Serialize};

use crate::error::{NsxvError, Result};

/// 负载均衡整体配置
///
/// 用于启用/禁用负载均衡能力。平台要求更新时携带全部组件 (监控器、服务器池、
/// 应用配置、应用规则、虚拟服务器)，否则会清空现有配置，因此这些组件以不透明片段
/// 原样保留并写回。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadBalancerConfig {
    pub enabled: bool,
    pub acceleration_enabled: bool,
    pub logging: Option<LbLogging>,

    /// 客户端不使用该字段，只负责透传
    pub enable_service_insertion: bool,

    /// 配置版本号，每次变更递增，更新时原样带回
    pub version: String,

    pub virtual_servers: Vec<InnerXml>,
    pub pools: Vec<InnerXml>,
    pub app_profiles: Vec<InnerXml>,
    pub monitors: Vec<InnerXml>,
    pub app_rules: Vec<InnerXml>,

    /// 根元素上的原始属性 (命名空间声明等)，原样写回
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub root_attributes: String,
}

impl XmlFields for LoadBalancerConfig {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.value("enabled", self.enabled);
        w.value("accelerationEnabled", self.acceleration_enabled);
        w.optional_child("logging", self.logging.as_ref());
        w.value("enableServiceInsertion", self.enable_service_insertion);
        w.text_nonempty("version", &self.version);
        w.fragments(&self.virtual_servers);
        w.fragments(&self.pools);
        w.fragments(&self.app_profiles);
        w.fragments(&self.monitors);
        w.fragments(&self.app_rules);
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        match tag {
            "enabled" => self.enabled = node.bool()?,
            "accelerationEnabled" => self.acceleration_enabled = node.bool()?,
            "logging" => self.logging = Some(node.decode()?),
            "enableServiceInsertion" => self.enable_service_insertion = node.bool()?,
            "version" => self.version = node.text()?,
            "virtualServer" => self.virtual_servers.push(node.inner_xml()?),
            "pool" => self.pools.push(node.inner_xml()?),
            "applicationProfile" => self.app_profiles.push(node.inner_xml()?),
            "monitor" => self.monitors.push(node.inner_xml()?),
            "applicationRule" => self.app_rules.push(node.inner_xml()?),
            _ => {}
        }
        Ok(())
    }
}

impl XmlRoot for LoadBalancerConfig {
    const TAG: &'static str = "loadBalancer";

    fn root_attributes(&self) -> &str {
        &self.root_attributes
    }

    fn set_root_attributes(&mut self, attributes: String) {
        self.root_attributes = attributes;
    }
}

impl LoadBalancerConfig {
    /// 按需解码保留的服务器池片段
    pub fn decode_pools(&self) -> Result<Vec<LbPool>> {
        decode_fragments(&self.pools)
    }

    pub fn decode_monitors(&self) -> Result<Vec<LbMonitor>> {
        decode_fragments(&self.monitors)
    }

    pub fn decode_app_profiles(&self) -> Result<Vec<LbAppProfile>> {
        decode_fragments(&self.app_profiles)
    }

    pub fn decode_app_rules(&self) -> Result<Vec<LbAppRule>> {
        decode_fragments(&self.app_rules)
    }

    pub fn decode_virtual_servers(&self) -> Result<Vec<LbVirtualServer>> {
        decode_fragments(&self.virtual_servers)
    }

    /// 用修改后的组件替换同 ID 的片段，其余片段不解析、不改动
    ///
    /// 被替换片段中未建模的子元素与开始标签属性保留。返回是否找到并替换了目标，
    /// 组件 ID 为空时不做任何替换。
    pub fn replace_component<T: LbComponent>(&mut self, component: &T) -> bool {
        let id = component.id();
        if id.is_empty() {
            return false;
        }
        let fragments = T::fragments_mut(self);
        let found = fragments.iter_mut().find(|fragment| {
            fragment.tag() == T::TAG
                && matches!(fragment.child_text(T::ID_TAG), Ok(Some(current)) if current == id)
        });
        match found {
            Some(fragment) => {
                *fragment = fragment.replaced_by(component);
                true
            }
            None => false,
        }
    }
}

/// 整体配置中可按 ID 定位的负载均衡组件
pub trait LbComponent: XmlRoot + Default {
    /// ID 所在子元素的标签
    const ID_TAG: &'static str;

    fn id(&self) -> &str;

    /// 整体配置中保存该类组件的片段列表
    fn fragments_mut(config: &mut LoadBalancerConfig) -> &mut Vec<InnerXml>;
}

macro_rules! lb_component {
    ($ty:ty, $id_tag:literal, $field:ident) => {
        impl LbComponent for $ty {
            const ID_TAG: &'static str = $id_tag;

            fn id(&self) -> &str {
                &self.id
            }

            fn fragments_mut(config: &mut LoadBalancerConfig) -> &mut Vec<InnerXml> {
                &mut config.$field
            }
        }
    };
}

lb_component!(LbMonitor, "monitorId", monitors);
lb_component!(LbPool, "poolId", pools);
lb_component!(LbAppProfile, "applicationProfileId", app_profiles);
lb_component!(LbAppRule, "applicationRuleId", app_rules);
lb_component!(LbVirtualServer, "virtualServerId", virtual_servers);

fn decode_fragments<T: XmlRoot + Default>(fragments: &[InnerXml]) -> Result<Vec<T>> {
    fragments
        .iter()
        .map(|f| f.decode_as::<T>().map_err(NsxvError::from))
        .collect()
}

/// 负载均衡日志配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LbLogging {
    pub enable: bool,
    pub log_level: String,
}

impl XmlFields for LbLogging {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.value("enable", self.enable);
        w.text("logLevel", &self.log_level);
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        match tag {
            "enable" => self.enable = node.bool()?,
            "logLevel" => self.log_level = node.text()?,
            _ => {}
        }
        Ok(())
    }
}

/// 健康检查监控器
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LbMonitor {
    pub id: String,

    /// 监控类型: `http` / `https` / `tcp` / `icmp` / `udp`
    pub monitor_type: String,

    /// 检查间隔 (秒)
    pub interval: i64,

    /// 超时时间 (秒)
    pub timeout: i64,

    pub max_retries: i64,
    pub method: String,
    pub url: String,
    pub expected: String,
    pub name: String,
    pub send: String,
    pub receive: String,
    pub extension: String,
}

impl XmlFields for LbMonitor {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.text_nonempty("monitorId", &self.id);
        w.text("type", &self.monitor_type);
        w.value_nonzero("interval", self.interval);
        w.value_nonzero("timeout", self.timeout);
        w.value_nonzero("maxRetries", self.max_retries);
        w.text_nonempty("method", &self.method);
        w.text_nonempty("url", &self.url);
        w.text_nonempty("expected", &self.expected);
        w.text_nonempty("name", &self.name);
        w.text_nonempty("send", &self.send);
        w.text_nonempty("receive", &self.receive);
        w.text_nonempty("extension", &self.extension);
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        match tag {
            "monitorId" => self.id = node.text()?,
            "type" => self.monitor_type = node.text()?,
            "interval" => self.interval = node.parse()?,
            "timeout" => self.timeout = node.parse()?,
            "maxRetries" => self.max_retries = node.parse()?,
            "method" => self.method = node.text()?,
            "url" => self.url = node.text()?,
            "expected" => self.expected = node.text()?,
            "name" => self.name = node.text()?,
            "send" => self.send = node.text()?,
            "receive" => self.receive = node.text()?,
            "extension" => self.extension = node.text()?,
            _ => {}
        }
        Ok(())
    }
}

impl XmlRoot for LbMonitor {
    const TAG: &'static str = "monitor";
}

impl LbMonitor {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(NsxvError::Validation("监控器名称不能为空".to_string()));
        }
        if self.monitor_type.is_empty() {
            return Err(NsxvError::Validation("监控器类型不能为空".to_string()));
        }
        if self.interval == 0 || self.timeout == 0 || self.max_retries == 0 {
            return Err(NsxvError::Validation(
                "监控器的 interval、timeout、maxRetries 必须设置".to_string(),
            ));
        }
        Ok(())
    }
}

/// 服务器池
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LbPool {
    pub id: String,
    pub name: String,
    pub description: String,

    /// 调度算法: `round-robin` / `ip-hash` / `uri` / `leastconn` / `url` / `httpheader`
    pub algorithm: String,

    pub algorithm_parameters: String,
    pub transparent: bool,
    pub monitor_id: String,
    pub members: Vec<LbPoolMember>,
}

impl XmlFields for LbPool {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.text_nonempty("poolId", &self.id);
        w.text("name", &self.name);
        w.text_nonempty("description", &self.description);
        w.text("algorithm", &self.algorithm);
        w.text_nonempty("algorithmParameters", &self.algorithm_parameters);
        w.value("transparent", self.transparent);
        w.text_nonempty("monitorId", &self.monitor_id);
        w.children("member", &self.members);
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        match tag {
            "poolId" => self.id = node.text()?,
            "name" => self.name = node.text()?,
            "description" => self.description = node.text()?,
            "algorithm" => self.algorithm = node.text()?,
            "algorithmParameters" => self.algorithm_parameters = node.text()?,
            "transparent" => self.transparent = node.bool()?,
            "monitorId" => self.monitor_id = node.text()?,
            "member" => self.members.push(node.decode()?),
            _ => {}
        }
        Ok(())
    }
}

impl XmlRoot for LbPool {
    const TAG: &'static str = "pool";
}

impl LbPool {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(NsxvError::Validation("服务器池名称不能为空".to_string()));
        }
        if self.algorithm.is_empty() {
            return Err(NsxvError::Validation("服务器池调度算法不能为空".to_string()));
        }
        for member in &self.members {
            member.validate()?;
        }
        Ok(())
    }
}

/// 服务器池成员
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LbPoolMember {
    pub id: String,
    pub name: String,
    pub ip_address: String,
    pub weight: i64,
    pub monitor_port: i64,
    pub port: i64,
    pub max_conn: i64,
    pub min_conn: i64,

    /// `enabled` 或 `disabled`
    pub condition: String,
}

impl XmlFields for LbPoolMember {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.text_nonempty("memberId", &self.id);
        w.text("name", &self.name);
        w.text("ipAddress", &self.ip_address);
        w.value_nonzero("weight", self.weight);
        w.value_nonzero("monitorPort", self.monitor_port);
        w.value("port", self.port);
        w.value_nonzero("maxConn", self.max_conn);
        w.value_nonzero("minConn", self.min_conn);
        w.text_nonempty("condition", &self.condition);
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        match tag {
            "memberId" => self.id = node.text()?,
            "name" => self.name = node.text()?,
            "ipAddress" => self.ip_address = node.text()?,
            "weight" => self.weight = node.parse()?,
            "monitorPort" => self.monitor_port = node.parse()?,
            "port" => self.port = node.parse()?,
            "maxConn" => self.max_conn = node.parse()?,
            "minConn" => self.min_conn = node.parse()?,
            "condition" => self.condition = node.text()?,
            _ => {}
        }
        Ok(())
    }
}

impl LbPoolMember {
    fn validate(&self) -> Result<()> {
        if self.name.is_empty() || self.ip_address.is_empty() || self.port == 0 {
            return Err(NsxvError::Validation(format!(
                "服务器池成员缺少 name/ipAddress/port: {:?}",
                self.name
            )));
        }
        Ok(())
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LbAppProfile {
    pub id: String,
    pub name: String,
    pub ssl_passthrough: bool,

    /// 协议模板: `TCP` / `UDP` / `HTTP` / `HTTPS`
    pub template: String,

    pub http_redirect: Option<LbAppProfileHttpRedirect>,
    pub persistence: Option<LbAppProfilePersistence>,
    pub insert_x_forwarded_for: bool,
    pub server_ssl_enabled: bool,
}

impl XmlFields for LbAppProfile {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.text_nonempty("applicationProfileId", &self.id);
        w.text_nonempty("name", &self.name);
        w.value("sslPassthrough", self.ssl_passthrough);
        w.text_nonempty("template", &self.template);
        w.optional_child("httpRedirect", self.http_redirect.as_ref());
        w.optional_child("persistence", self.persistence.as_ref());
        w.value("insertXForwardedFor", self.insert_x_forwarded_for);
        w.value("serverSslEnabled", self.server_ssl_enabled);
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        match tag {
            "applicationProfileId" => self.id = node.text()?,
            "name" => self.name = node.text()?,
            "sslPassthrough" => self.ssl_passthrough = node.bool()?,
            "template" => self.template = node.text()?,
            "httpRedirect" => self.http_redirect = Some(node.decode()?),
            "persistence" => self.persistence = Some(node.decode()?),
            "insertXForwardedFor" => self.insert_x_forwarded_for = node.bool()?,
            "serverSslEnabled" => self.server_ssl_enabled = node.bool()?,
            _ => {}
        }
        Ok(())
    }
}

impl XmlRoot for LbAppProfile {
    const TAG: &'static str = "applicationProfile";
}

impl LbAppProfile {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(NsxvError::Validation("应用配置名称不能为空".to_string()));
        }
        if self.template.is_empty() {
            return Err(NsxvError::Validation("应用配置模板不能为空".to_string()));
        }
        Ok(())
    }
}

/// 会话保持设置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LbAppProfilePersistence {
    /// `cookie` / `ssl_sessionid` / `sourceip` / `msrdp`
    pub method: String,
    pub cookie_name: String,
    pub cookie_mode: String,
    pub expire: i64,
}

impl XmlFields for LbAppProfilePersistence {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.text_nonempty("method", &self.method);
        w.text_nonempty("cookieName", &self.cookie_name);
        w.text_nonempty("cookieMode", &self.cookie_mode);
        w.value_nonzero("expire", self.expire);
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        match tag {
            "method" => self.method = node.text()?,
            "cookieName" => self.cookie_name = node.text()?,
            "cookieMode" => self.cookie_mode = node.text()?,
            "expire" => self.expire = node.parse()?,
            _ => {}
        }
        Ok(())
    }
}

/// HTTP 重定向设置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LbAppProfileHttpRedirect {
    pub to: String,
}

impl XmlFields for LbAppProfileHttpRedirect {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.text_nonempty("to", &self.to);
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        if tag == "to" {
            self.to = node.text()?;
        }
        Ok(())
    }
}

/// 应用规则 (HAProxy 脚本)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LbAppRule {
    pub id: String,
    pub name: String,
    pub script: String,
}

impl XmlFields for LbAppRule {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.text_nonempty("applicationRuleId", &self.id);
        w.text_nonempty("name", &self.name);
        w.text_nonempty("script", &self.script);
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        match tag {
            "applicationRuleId" => self.id = node.text()?,
            "name" => self.name = node.text()?,
            "script" => self.script = node.text()?,
            _ => {}
        }
        Ok(())
    }
}

impl XmlRoot for LbAppRule {
    const TAG: &'static str = "applicationRule";
}

impl LbAppRule {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(NsxvError::Validation("应用规则名称不能为空".to_string()));
        }
        Ok(())
    }
}

/// 虚拟服务器
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LbVirtualServer {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub ip_address: String,
    pub protocol: String,
    pub port: i64,
    pub acceleration_enabled: bool,
    pub connection_limit: i64,
    pub connection_rate_limit: i64,
    pub application_profile_id: String,
    pub default_pool_id: String,
    pub application_rule_ids: Vec<String>,
}

impl XmlFields for LbVirtualServer {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.text_nonempty("virtualServerId", &self.id);
        w.text_nonempty("name", &self.name);
        w.text_nonempty("description", &self.description);
        w.value("enabled", self.enabled);
        w.text("ipAddress", &self.ip_address);
        w.text("protocol", &self.protocol);
        w.value("port", self.port);
        w.value("accelerationEnabled", self.acceleration_enabled);
        w.value_nonzero("connectionLimit", self.connection_limit);
        w.value_nonzero("connectionRateLimit", self.connection_rate_limit);
        w.text_nonempty("applicationProfileId", &self.application_profile_id);
        w.text_nonempty("defaultPoolId", &self.default_pool_id);
        w.texts("applicationRuleId", &self.application_rule_ids);
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        match tag {
            "virtualServerId" => self.id = node.text()?,
            "name" => self.name = node.text()?,
            "description" => self.description = node.text()?,
            "enabled" => self.enabled = node.bool()?,
            "ipAddress" => self.ip_address = node.text()?,
            "protocol" => self.protocol = node.text()?,
            "port" => self.port = node.parse()?,
            "accelerationEnabled" => self.acceleration_enabled = node.bool()?,
            "connectionLimit" => self.connection_limit = node.parse()?,
            "connectionRateLimit" => self.connection_rate_limit = node.parse()?,
            "applicationProfileId" => self.application_profile_id = node.text()?,
            "defaultPoolId" => self.default_pool_id = node.text()?,
            "applicationRuleId" => self.application_rule_ids.push(node.text()?),
            _ => {}
        }
        Ok(())
    }
}

impl XmlRoot for LbVirtualServer {
    const TAG: &'static str = "virtualServer";
}

impl LbVirtualServer {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(NsxvError::Validation("虚拟服务器名称不能为空".to_string()));
        }
        if self.ip_address.is_empty() || self.protocol.is_empty() || self.port == 0 {
            return Err(NsxvError::Validation(
                "虚拟服务器必须设置 ipAddress、protocol 和 port".to_string(),
            ));
        }
        Ok(())
    }
}
