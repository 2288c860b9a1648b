//! NAT 规则模型
//!
//! SNAT 与 DNAT 共用同一结构，通过 `action` 区分。

use egw_xmlcodec::{Node, XmlFields, XmlRoot, XmlWriter};
use serde::{Deserialize, Serialize};

use crate::error::{NsxvError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NatRule {
    pub id: String,
    pub rule_type: String,
    pub rule_tag: String,

    /// `snat` 或 `dnat`
    pub action: String,

    /// 网卡编号，`Some(0)` 表示第一块网卡，与未指定不同
    pub vnic: Option<i64>,

    pub original_address: String,
    pub translated_address: String,
    pub logging_enabled: bool,
    pub enabled: bool,
    pub description: String,
    pub protocol: String,
    pub original_port: String,
    pub translated_port: String,
    pub icmp_type: String,
}

impl XmlFields for NatRule {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.text_nonempty("ruleId", &self.id);
        w.text_nonempty("ruleType", &self.rule_type);
        w.text_nonempty("ruleTag", &self.rule_tag);
        w.text("action", &self.action);
        w.optional("vnic", self.vnic);
        w.text("originalAddress", &self.original_address);
        w.text("translatedAddress", &self.translated_address);
        w.value("loggingEnabled", self.logging_enabled);
        w.value("enabled", self.enabled);
        w.text_nonempty("description", &self.description);
        w.text_nonempty("protocol", &self.protocol);
        w.text_nonempty("originalPort", &self.original_port);
        w.text_nonempty("translatedPort", &self.translated_port);
        w.text_nonempty("icmpType", &self.icmp_type);
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        match tag {
            "ruleId" => self.id = node.text()?,
            "ruleType" => self.rule_type = node.text()?,
            "ruleTag" => self.rule_tag = node.text()?,
            "action" => self.action = node.text()?,
            "vnic" => self.vnic = Some(node.parse()?),
            "originalAddress" => self.original_address = node.text()?,
            "translatedAddress" => self.translated_address = node.text()?,
            "loggingEnabled" => self.logging_enabled = node.bool()?,
            "enabled" => self.enabled = node.bool()?,
            "description" => self.description = node.text()?,
            "protocol" => self.protocol = node.text()?,
            "originalPort" => self.original_port = node.text()?,
            "translatedPort" => self.translated_port = node.text()?,
            "icmpType" => self.icmp_type = node.text()?,
            _ => {}
        }
        Ok(())
    }
}

impl XmlRoot for NatRule {
    const TAG: &'static str = "natRule";
}

impl NatRule {
    pub fn validate(&self) -> Result<()> {
        if self.action != "snat" && self.action != "dnat" {
            return Err(NsxvError::Validation(format!(
                "NAT 规则动作必须为 snat 或 dnat: {:?}",
                self.action
            )));
        }
        if self.original_address.is_empty() || self.translated_address.is_empty() {
            return Err(NsxvError::Validation(
                "NAT 规则必须设置 originalAddress 和 translatedAddress".to_string(),
            ));
        }
        Ok(())
    }
}

/// 规则列表 (创建请求的外层包装)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NatRules {
    pub rules: Vec<NatRule>,
}

impl XmlFields for NatRules {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.children("natRule", &self.rules);
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        if tag == "natRule" {
            self.rules.push(node.decode()?);
        }
        Ok(())
    }
}

impl XmlRoot for NatRules {
    const TAG: &'static str = "natRules";
}

#[cfg(test)]
mod tests {
    use super::*;
    use egw_xmlcodec::{decode_str, encode_to_string};

    fn dnat() -> NatRule {
        NatRule {
            action: "dnat".to_string(),
            original_address: "203.0.113.10".to_string(),
            translated_address: "10.0.0.10".to_string(),
            protocol: "tcp".to_string(),
            original_port: "443".to_string(),
            translated_port: "8443".to_string(),
            enabled: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_vnic_zero_is_emitted() {
        let rule = NatRule {
            vnic: Some(0),
            ..dnat()
        };
        let out = encode_to_string(&rule);
        assert!(out.contains("<vnic>0</vnic>"));

        let decoded: NatRule = decode_str(&out).unwrap();
        assert_eq!(decoded.vnic, Some(0));
    }

    #[test]
    fn test_vnic_unset_is_omitted() {
        let out = encode_to_string(&dnat());
        assert_eq!(
            out,
            "<natRule><action>dnat</action><originalAddress>203.0.113.10</originalAddress>\
             <translatedAddress>10.0.0.10</translatedAddress>\
             <loggingEnabled>false</loggingEnabled><enabled>true</enabled>\
             <protocol>tcp</protocol><originalPort>443</originalPort>\
             <translatedPort>8443</translatedPort></natRule>"
        );
        let decoded: NatRule = decode_str(&out).unwrap();
        assert_eq!(decoded.vnic, None);
        assert_eq!(decoded, dnat());
    }

    #[test]
    fn test_rules_wrapper() {
        let rules = NatRules {
            rules: vec![dnat(), NatRule { action: "snat".to_string(), ..dnat() }],
        };
        let out = encode_to_string(&rules);
        assert!(out.starts_with("<natRules><natRule><action>dnat</action>"));

        let decoded: NatRules = decode_str(&out).unwrap();
        assert_eq!(decoded.rules.len(), 2);
        assert_eq!(decoded.rules[1].action, "snat");
    }

    #[test]
    fn test_validate() {
        assert!(dnat().validate().is_ok());
        assert!(NatRule { action: "nat".to_string(), ..dnat() }.validate().is_err());
        assert!(NatRule { translated_address: String::new(), ..dnat() }.validate().is_err());
    }
}
