//! 防火墙资源模型

use egw_xmlcodec::{InnerXml, Node, XmlFields, XmlRoot, XmlWriter};
use serde::{Deserialize, Serialize};

use crate::error::{NsxvError, Result};

/// 防火墙整体配置
///
/// 用于启用/禁用边缘网关防火墙。平台要求更新时携带全部规则，否则会清空现有规则，
/// 因此 `firewallRules` 与 `globalConfig` 以不透明片段原样保留并写回。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirewallConfig {
    pub enabled: bool,

    pub default_policy: FirewallDefaultPolicy,

    /// 配置版本号，每次变更递增，更新时原样带回
    pub version: String,

    pub firewall_rules: Option<InnerXml>,

    pub global_config: Option<InnerXml>,

    /// 根元素上的原始属性 (命名空间声明等)，原样写回
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub root_attributes: String,
}

impl XmlFields for FirewallConfig {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.value("enabled", self.enabled);
        w.child("defaultPolicy", &self.default_policy);
        w.text_nonempty("version", &self.version);
        w.optional_fragment(self.firewall_rules.as_ref());
        w.optional_fragment(self.global_config.as_ref());
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        match tag {
            "enabled" => self.enabled = node.bool()?,
            "defaultPolicy" => node.read_into(&mut self.default_policy)?,
            "version" => self.version = node.text()?,
            "firewallRules" => self.firewall_rules = Some(node.inner_xml()?),
            "globalConfig" => self.global_config = Some(node.inner_xml()?),
            _ => {}
        }
        Ok(())
    }
}

impl XmlRoot for FirewallConfig {
    const TAG: &'static str = "firewall";

    fn root_attributes(&self) -> &str {
        &self.root_attributes
    }

    fn set_root_attributes(&mut self, attributes: String) {
        self.root_attributes = attributes;
    }
}

impl FirewallConfig {
    /// 解码保留的规则片段
    pub fn rules(&self) -> Result<Vec<FirewallRule>> {
        match &self.firewall_rules {
            Some(fragment) => Ok(fragment.decode_as::<FirewallRules>()?.rules),
            None => Ok(Vec::new()),
        }
    }
}

/// 默认规则
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirewallDefaultPolicy {
    pub logging_enabled: bool,
    pub action: String,
}

impl XmlFields for FirewallDefaultPolicy {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.value("loggingEnabled", self.logging_enabled);
        w.text("action", &self.action);
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        match tag {
            "loggingEnabled" => self.logging_enabled = node.bool()?,
            "action" => self.action = node.text()?,
            _ => {}
        }
        Ok(())
    }
}

/// 防火墙规则
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirewallRule {
    pub id: String,
    pub name: String,
    pub rule_type: String,
    pub rule_tag: String,
    pub source: FirewallEndpoint,
    pub destination: FirewallEndpoint,
    pub application: FirewallApplication,

    /// 是否匹配 NAT 转换后的地址。显式的 `false` 与未设置含义不同，需要原样保留
    pub match_translated: Option<bool>,

    pub direction: String,

    /// `accept` 或 `deny`
    pub action: String,

    pub enabled: bool,
    pub logging_enabled: bool,
}

impl XmlFields for FirewallRule {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.text_nonempty("id", &self.id);
        w.text_nonempty("name", &self.name);
        w.text_nonempty("ruleType", &self.rule_type);
        w.text_nonempty("ruleTag", &self.rule_tag);
        w.child("source", &self.source);
        w.child("destination", &self.destination);
        w.child("application", &self.application);
        w.optional("matchTranslated", self.match_translated);
        w.text_nonempty("direction", &self.direction);
        w.text_nonempty("action", &self.action);
        w.value("enabled", self.enabled);
        w.value("loggingEnabled", self.logging_enabled);
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        match tag {
            "id" => self.id = node.text()?,
            "name" => self.name = node.text()?,
            "ruleType" => self.rule_type = node.text()?,
            "ruleTag" => self.rule_tag = node.text()?,
            "source" => node.read_into(&mut self.source)?,
            "destination" => node.read_into(&mut self.destination)?,
            "application" => node.read_into(&mut self.application)?,
            "matchTranslated" => self.match_translated = Some(node.bool()?),
            "direction" => self.direction = node.text()?,
            "action" => self.action = node.text()?,
            "enabled" => self.enabled = node.bool()?,
            "loggingEnabled" => self.logging_enabled = node.bool()?,
            _ => {}
        }
        Ok(())
    }
}

impl XmlRoot for FirewallRule {
    const TAG: &'static str = "firewallRule";
}

impl FirewallRule {
    pub fn validate(&self) -> Result<()> {
        if !self.action.is_empty() && self.action != "accept" && self.action != "deny" {
            return Err(NsxvError::Validation(format!(
                "防火墙规则动作必须为 accept 或 deny: {}",
                self.action
            )));
        }
        Ok(())
    }
}

/// 规则的源或目的
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirewallEndpoint {
    pub exclude: bool,
    pub vnic_group_ids: Vec<String>,
    pub grouping_object_ids: Vec<String>,
    pub ip_addresses: Vec<String>,
}

impl XmlFields for FirewallEndpoint {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.value("exclude", self.exclude);
        w.texts("vnicGroupId", &self.vnic_group_ids);
        w.texts("groupingObjectId", &self.grouping_object_ids);
        w.texts("ipAddress", &self.ip_addresses);
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        match tag {
            "exclude" => self.exclude = node.bool()?,
            "vnicGroupId" => self.vnic_group_ids.push(node.text()?),
            "groupingObjectId" => self.grouping_object_ids.push(node.text()?),
            "ipAddress" => self.ip_addresses.push(node.text()?),
            _ => {}
        }
        Ok(())
    }
}

/// 规则匹配的服务，可包含多组协议/端口
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirewallApplication {
    pub id: String,
    pub services: Vec<FirewallService>,
}

impl XmlFields for FirewallApplication {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.text_nonempty("applicationId", &self.id);
        w.children("service", &self.services);
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        match tag {
            "applicationId" => self.id = node.text()?,
            "service" => self.services.push(node.decode()?),
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirewallService {
    pub protocol: String,
    pub port: String,
    pub source_port: String,
}

impl XmlFields for FirewallService {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.text_nonempty("protocol", &self.protocol);
        w.text_nonempty("port", &self.port);
        w.text_nonempty("sourcePort", &self.source_port);
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        match tag {
            "protocol" => self.protocol = node.text()?,
            "port" => self.port = node.text()?,
            "sourcePort" => self.source_port = node.text()?,
            _ => {}
        }
        Ok(())
    }
}

/// 规则列表 (创建请求的外层包装，也是整体配置中 `firewallRules` 片段的结构)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirewallRules {
    pub rules: Vec<FirewallRule>,
}

impl XmlFields for FirewallRules {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.children("firewallRule", &self.rules);
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        if tag == "firewallRule" {
            self.rules.push(node.decode()?);
        }
        Ok(())
    }
}

impl XmlRoot for FirewallRules {
    const TAG: &'static str = "firewallRules";
}

#[cfg(test)]
mod tests {
    use super::*;
    use egw_xmlcodec::{decode_str, encode_to_string};

    #[test]
    fn test_match_translated_false_is_kept() {
        let src = "<firewallRule><id>131074</id><name>allow-web</name>\
                   <source><exclude>false</exclude></source>\
                   <destination><exclude>false</exclude><ipAddress>10.10.10.2</ipAddress></destination>\
                   <application><service><protocol>tcp</protocol><port>443</port></service></application>\
                   <matchTranslated>false</matchTranslated><direction>in</direction>\
                   <action>accept</action><enabled>true</enabled><loggingEnabled>false</loggingEnabled>\
                   </firewallRule>";
        let rule: FirewallRule = decode_str(src).unwrap();
        assert_eq!(rule.match_translated, Some(false));

        let out = encode_to_string(&rule);
        assert!(out.contains("<matchTranslated>false</matchTranslated>"));
        assert_eq!(out, src);
    }

    #[test]
    fn test_match_translated_absent_is_omitted() {
        let rule = FirewallRule {
            name: "deny-all".to_string(),
            action: "deny".to_string(),
            ..Default::default()
        };
        let out = encode_to_string(&rule);
        assert!(!out.contains("matchTranslated"));
        assert_eq!(
            out,
            "<firewallRule><name>deny-all</name>\
             <source><exclude>false</exclude></source>\
             <destination><exclude>false</exclude></destination>\
             <application></application>\
             <action>deny</action><enabled>false</enabled><loggingEnabled>false</loggingEnabled>\
             </firewallRule>"
        );
    }

    #[test]
    fn test_config_keeps_rules_verbatim() {
        let src = "<firewall><enabled>true</enabled>\
                   <defaultPolicy><loggingEnabled>false</loggingEnabled><action>deny</action></defaultPolicy>\
                   <version>9</version>\
                   <firewallRules><firewallRule><id>131073</id><ruleType>internal_high</ruleType>\
                   <source><exclude>false</exclude><vnicGroupId>vse</vnicGroupId></source>\
                   <destination><exclude>false</exclude></destination><application></application>\
                   <action>accept</action><enabled>true</enabled><loggingEnabled>false</loggingEnabled>\
                   <statistics><packets>0</packets></statistics></firewallRule></firewallRules>\
                   <globalConfig><tcpPickOngoingConnections>false</tcpPickOngoingConnections></globalConfig>\
                   </firewall>";
        let mut config: FirewallConfig = decode_str(src).unwrap();
        assert_eq!(config.version, "9");
        assert_eq!(encode_to_string(&config), src);

        let rules = config.rules().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].rule_type, "internal_high");
        assert_eq!(rules[0].source.vnic_group_ids, vec!["vse".to_string()]);

        // 只修改开关，规则片段保持不变
        config.enabled = false;
        let out = encode_to_string(&config);
        assert!(out.starts_with("<firewall><enabled>false</enabled>"));
        assert!(out.contains("<statistics><packets>0</packets></statistics>"));
    }

    #[test]
    fn test_validate_action() {
        let mut rule = FirewallRule::default();
        assert!(rule.validate().is_ok());
        rule.action = "allow".to_string();
        assert!(matches!(rule.validate(), Err(NsxvError::Validation(_))));
        rule.action = "accept".to_string();
        assert!(rule.validate().is_ok());
    }
}
