//! 不透明片段
//!
//! 平台的"整体配置"接口在更新时会把请求中缺失的子对象视为删除，因此客户端必须把读到的
//! 全部子对象原样发回。对于不需要理解的子树，解码时只截取开始标签与结束标签之间的原始
//! 文本，编码时逐字节写回，不经过任何解析或格式化。

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::element::{XmlFields, XmlRoot};
use crate::error::{Result, XmlError};
use crate::reader::{decode_str, read_document, Node};
use crate::writer::XmlWriter;

/// 原样保留的子树
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerXml {
    /// 元素标签名
    tag: String,

    /// 开始标签中标签名之后的原始属性文本 (包括前导空白)
    attributes: String,

    /// 开始标签与结束标签之间的原始文本
    text: String,
}

impl InnerXml {
    pub fn new(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_attributes(tag, "", text)
    }

    pub fn with_attributes(
        tag: impl Into<String>,
        attributes: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            attributes: attributes.into(),
            text: text.into(),
        }
    }

    /// 将已建模的资源编码为片段，用于替换整体配置中的某个子对象
    pub fn from_element<T: XmlRoot>(value: &T) -> Self {
        let mut w = XmlWriter::new();
        value.write_fields(&mut w);
        Self::with_attributes(T::TAG, value.root_attributes(), w.into_string())
    }

    /// 用修改后的资源替换片段内容
    ///
    /// 原片段的开始标签属性与资源未建模的子元素会保留，未建模子元素追加在已建模字段之后。
    /// 原片段中已建模字段的值无法解析时，只写出新资源。
    pub fn replaced_by<T: XmlRoot + Default>(&self, value: &T) -> Self {
        if self.tag != T::TAG {
            return Self::from_element(value);
        }

        let mut w = XmlWriter::new();
        value.write_fields(&mut w);

        let mut unmodeled = Unmodeled {
            record: T::default(),
            rest: Vec::new(),
        };
        match read_document(&self.to_xml(), &self.tag, &mut unmodeled) {
            Ok(_) => w.fragments(&unmodeled.rest),
            Err(e) => warn!("片段 <{}> 无法解析，未建模内容不再保留: {}", self.tag, e),
        }

        Self::with_attributes(self.tag.clone(), self.attributes.clone(), w.into_string())
    }

    /// 读取某个直接子元素的文本，其余子元素不做解析
    ///
    /// 常用于按 ID 定位片段。子元素不存在时返回 `None`。
    pub fn child_text(&self, tag: &str) -> Result<Option<String>> {
        let mut lookup = ChildText { tag, value: None };
        read_document(&self.to_xml(), &self.tag, &mut lookup)?;
        Ok(lookup.value)
    }

    /// 按需把片段解码为已建模的资源
    pub fn decode_as<T: XmlRoot + Default>(&self) -> Result<T> {
        if self.tag != T::TAG {
            return Err(XmlError::UnexpectedRoot {
                expected: T::TAG.to_string(),
                found: self.tag.clone(),
            });
        }
        decode_str(&self.to_xml())
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attributes(&self) -> &str {
        &self.attributes
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 片段的完整 XML 表示 (包括外层标签)
    pub fn to_xml(&self) -> String {
        let mut w = XmlWriter::new();
        w.fragment(self);
        w.into_string()
    }
}

/// 收集资源未建模的子元素
struct Unmodeled<T> {
    record: T,
    rest: Vec<InnerXml>,
}

impl<T: XmlFields> XmlFields for Unmodeled<T> {
    fn write_fields(&self, _w: &mut XmlWriter) {}

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> Result<()> {
        self.record.read_field(tag, node)?;
        if !node.is_consumed() {
            self.rest.push(node.inner_xml()?);
        }
        Ok(())
    }
}

struct ChildText<'t> {
    tag: &'t str,
    value: Option<String>,
}

impl XmlFields for ChildText<'_> {
    fn write_fields(&self, _w: &mut XmlWriter) {}

    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> Result<()> {
        if tag == self.tag && self.value.is_none() {
            self.value = Some(node.text()?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Rule {
        id: String,
        script: String,
    }

    impl XmlFields for Rule {
        fn write_fields(&self, w: &mut XmlWriter) {
            w.text_nonempty("applicationRuleId", &self.id);
            w.text_nonempty("script", &self.script);
        }

        fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> Result<()> {
            match tag {
                "applicationRuleId" => self.id = node.text()?,
                "script" => self.script = node.text()?,
                _ => {}
            }
            Ok(())
        }
    }

    impl XmlRoot for Rule {
        const TAG: &'static str = "applicationRule";
    }

    #[test]
    fn test_from_element_and_back() {
        let rule = Rule {
            id: "applicationRule-1".to_string(),
            script: "acl is_foo hdr_dom(host) -i foo".to_string(),
        };
        let fragment = InnerXml::from_element(&rule);
        assert_eq!(fragment.tag(), "applicationRule");
        assert_eq!(
            fragment.text(),
            "<applicationRuleId>applicationRule-1</applicationRuleId>\
             <script>acl is_foo hdr_dom(host) -i foo</script>"
        );
        assert_eq!(fragment.decode_as::<Rule>().unwrap(), rule);
    }

    #[test]
    fn test_decode_as_rejects_other_tag() {
        let fragment = InnerXml::new("pool", "<poolId>pool-1</poolId>");
        let err = fragment.decode_as::<Rule>().unwrap_err();
        assert!(matches!(err, XmlError::UnexpectedRoot { .. }));
    }

    #[test]
    fn test_to_xml_keeps_attributes() {
        let fragment = InnerXml::with_attributes("monitor", " a='1'", "<type>http</type>");
        assert_eq!(fragment.to_xml(), "<monitor a='1'><type>http</type></monitor>");
    }

    #[test]
    fn test_child_text_skips_other_content() {
        let fragment = InnerXml::new(
            "pool",
            "<poolId>pool-2</poolId><maxConn>99999999999999999999</maxConn><x><poolId>no</poolId></x>",
        );
        assert_eq!(fragment.child_text("poolId").unwrap(), Some("pool-2".to_string()));
        assert_eq!(fragment.child_text("name").unwrap(), None);
    }

    #[test]
    fn test_replaced_by_keeps_unmodeled_content() {
        let fragment = InnerXml::with_attributes(
            "applicationRule",
            " a=\"1\"",
            "<applicationRuleId>applicationRule-1</applicationRuleId>\
             <vendorTuning>x</vendorTuning><script>old</script><extra/>",
        );
        let rule = Rule {
            id: "applicationRule-1".to_string(),
            script: "new".to_string(),
        };
        let replaced = fragment.replaced_by(&rule);
        assert_eq!(
            replaced.to_xml(),
            "<applicationRule a=\"1\"><applicationRuleId>applicationRule-1</applicationRuleId>\
             <script>new</script><vendorTuning>x</vendorTuning><extra></extra></applicationRule>"
        );
    }

    #[test]
    fn test_replaced_by_other_tag_uses_element() {
        let fragment = InnerXml::new("pool", "<poolId>pool-1</poolId>");
        let rule = Rule {
            id: "applicationRule-1".to_string(),
            script: String::new(),
        };
        assert_eq!(fragment.replaced_by(&rule), InnerXml::from_element(&rule));
    }
}
