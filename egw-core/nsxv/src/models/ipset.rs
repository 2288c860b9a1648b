//! IP 集合模型
//!
//! IP 集合可作为防火墙规则或 DHCP 中继配置的源/目的。接口响应中还有更多字段，
//! 它们由平台内部使用并原样回传，这里只建模管理端用到的部分。
//!
//! 仅高级边缘网关支持 IP 集合。

use egw_xmlcodec::{Node, XmlFields, XmlRoot, XmlWriter};
use serde::{Deserialize, Serialize};

use crate::error::{NsxvError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpSet {
    /// 复合 ID，格式为 `<vdc id>:ipset-<n>`
    pub id: String,

    /// 名称，必填且唯一
    pub name: String,

    pub description: String,

    /// 逗号分隔的地址、网段或范围，例如 `192.168.200.1,192.168.200.1/24,192.168.200.1-192.168.200.24`。
    /// 平台可能在提交后重新排序
    pub ip_addresses: String,

    /// 下级作用域是否可见
    pub inheritance_allowed: Option<bool>,

    /// 配置修订号。读取时返回当前值，更新时必须带回最新值，否则平台以版本过旧拒绝
    pub revision: Option<i64>,
}

impl XmlFields for IpSet {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.text_nonempty("objectId", &self.id);
        w.text("name", &self.name);
        w.text_nonempty("description", &self.description);
        w.text("value", &self.ip_addresses);
        w.optional("inheritanceAllowed", self.inheritance_allowed);
        w.optional("revision", self.revision);
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        match tag {
            "objectId" => self.id = node.text()?,
            "name" => self.name = node.text()?,
            "description" => self.description = node.text()?,
            "value" => self.ip_addresses = node.text()?,
            "inheritanceAllowed" => self.inheritance_allowed = Some(node.bool()?),
            "revision" => self.revision = Some(node.parse()?),
            _ => {}
        }
        Ok(())
    }
}

impl XmlRoot for IpSet {
    const TAG: &'static str = "ipset";
}

impl IpSet {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(NsxvError::Validation("IP 集合名称不能为空".to_string()));
        }
        if self.ip_addresses.is_empty() {
            return Err(NsxvError::Validation("IP 集合地址不能为空".to_string()));
        }
        Ok(())
    }
}

/// IP 集合列表响应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpSetList {
    pub ip_sets: Vec<IpSet>,
}

impl XmlFields for IpSetList {
    fn write_fields(&self, w: &mut XmlWriter) {
        w.children("ipset", &self.ip_sets);
    }

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> egw_xmlcodec::Result<()> {
        if tag == "ipset" {
            self.ip_sets.push(node.decode()?);
        }
        Ok(())
    }
}

impl XmlRoot for IpSetList {
    const TAG: &'static str = "list";
}

#[cfg(test)]
mod tests {
    use super::*;
    use egw_xmlcodec::{decode_str, encode_to_string};

    #[test]
    fn test_unset_markers_are_omitted() {
        let ipset = IpSet {
            name: "test-ipset".to_string(),
            ip_addresses: "192.168.1.0/24".to_string(),
            ..Default::default()
        };
        let out = encode_to_string(&ipset);
        assert!(!out.contains("inheritanceAllowed"));
        assert!(!out.contains("revision"));
        assert_eq!(
            out,
            "<ipset><name>test-ipset</name><value>192.168.1.0/24</value></ipset>"
        );
    }

    #[test]
    fn test_zero_markers_are_emitted() {
        let ipset = IpSet {
            name: "test-ipset".to_string(),
            ip_addresses: "192.168.1.0/24".to_string(),
            inheritance_allowed: Some(false),
            revision: Some(0),
            ..Default::default()
        };
        let out = encode_to_string(&ipset);
        assert!(out.contains("<inheritanceAllowed>false</inheritanceAllowed>"));
        assert!(out.contains("<revision>0</revision>"));

        let decoded: IpSet = decode_str(&out).unwrap();
        assert_eq!(decoded, ipset);
    }

    #[test]
    fn test_list_response() {
        let src = r#"<?xml version="1.0" encoding="UTF-8"?>
<list>
  <ipset>
    <objectId>f9daf2da-b4f9-4921-a2f4-d77a943a381c:ipset-4</objectId>
    <objectTypeName>IPSet</objectTypeName>
    <vsmUuid>4201C3A2-3F55-4E2C-A2D2-6FC4F4BF5F7D</vsmUuid>
    <revision>2</revision>
    <name>web-servers</name>
    <value>10.0.0.10-10.0.0.20</value>
    <inheritanceAllowed>true</inheritanceAllowed>
  </ipset>
  <ipset>
    <objectId>f9daf2da-b4f9-4921-a2f4-d77a943a381c:ipset-5</objectId>
    <revision>0</revision>
    <name>db</name>
    <value>10.0.1.5</value>
  </ipset>
</list>"#;
        let list: IpSetList = decode_str(src).unwrap();
        assert_eq!(list.ip_sets.len(), 2);
        assert_eq!(list.ip_sets[0].revision, Some(2));
        assert_eq!(list.ip_sets[0].inheritance_allowed, Some(true));
        assert_eq!(list.ip_sets[1].revision, Some(0));
        assert_eq!(list.ip_sets[1].inheritance_allowed, None);
    }

    #[test]
    fn test_validate() {
        assert!(IpSet::default().validate().is_err());
        let ipset = IpSet {
            name: "a".to_string(),
            ip_addresses: "10.0.0.1".to_string(),
            ..Default::default()
        };
        assert!(ipset.validate().is_ok());
    }

    #[test]
    fn test_json_snapshot_keeps_markers() {
        let ipset = IpSet {
            name: "a".to_string(),
            revision: Some(3),
            ..Default::default()
        };
        let json = serde_json::to_value(&ipset).unwrap();
        assert_eq!(json["revision"], 3);
        assert!(json["inheritance_allowed"].is_null());
    }
}
