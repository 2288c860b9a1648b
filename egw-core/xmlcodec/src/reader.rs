//! 文档解码
//!
//! 基于 quick-xml 的拉取式解析。解码器按外层结构逐个把子元素交给 [`XmlFields::read_field`]，
//! 字段实现通过 [`Node`] 决定如何消费该元素: 读取标量、递归解码嵌套结构，或者截取原文作为
//! 不透明片段。未被消费的元素整体跳过。

use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;
use tracing::debug;

use crate::element::{XmlFields, XmlRoot};
use crate::error::{Result, XmlError};
use crate::inner::InnerXml;

/// 正在解码的子元素
pub struct Node<'r, 'a> {
    reader: &'r mut Reader<&'a [u8]>,
    src: &'a str,
    tag: String,
    attributes: String,
    empty: bool,
    consumed: bool,
}

impl<'r, 'a> Node<'r, 'a> {
    fn open(
        reader: &'r mut Reader<&'a [u8]>,
        src: &'a str,
        start: &BytesStart<'_>,
        empty: bool,
    ) -> Result<Self> {
        Ok(Self {
            reader,
            src,
            tag: utf8(start.name().as_ref())?.to_string(),
            attributes: utf8(start.attributes_raw())?.to_string(),
            empty,
            consumed: false,
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// 元素是否已被字段实现消费
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// 读取元素的文本内容
    ///
    /// 嵌套的子元素被忽略，空元素返回空串。
    pub fn text(&mut self) -> Result<String> {
        self.consumed = true;
        let mut out = String::new();
        if self.empty {
            return Ok(out);
        }
        loop {
            match self.reader.read_event()? {
                Event::Text(t) => out.push_str(&t.unescape()?),
                Event::CData(c) => out.push_str(&String::from_utf8_lossy(&c)),
                Event::Start(e) => {
                    self.reader.read_to_end(e.name())?;
                }
                Event::End(_) => return Ok(out),
                Event::Eof => return Err(unclosed(&self.tag)),
                _ => {}
            }
        }
    }

    /// 解析标量值，空文本视为类型零值
    pub fn parse<T: FromStr + Default>(&mut self) -> Result<T> {
        let raw = self.text()?;
        let value = raw.trim();
        if value.is_empty() {
            return Ok(T::default());
        }
        value.parse().map_err(|_| self.invalid(&raw))
    }

    /// 解析布尔值，接受 `true`/`false`/`1`/`0`
    pub fn bool(&mut self) -> Result<bool> {
        let raw = self.text()?;
        match raw.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            _ => Err(self.invalid(&raw)),
        }
    }

    /// 递归解码嵌套结构到已有对象
    pub fn read_into<F: XmlFields>(&mut self, target: &mut F) -> Result<()> {
        self.consumed = true;
        if self.empty {
            return Ok(());
        }
        read_children(self.reader, self.src, &self.tag, target)
    }

    /// 递归解码嵌套结构
    pub fn decode<F: XmlFields + Default>(&mut self) -> Result<F> {
        let mut value = F::default();
        self.read_into(&mut value)?;
        Ok(value)
    }

    /// 截取元素内部原文，不做任何解析
    pub fn inner_xml(&mut self) -> Result<InnerXml> {
        self.consumed = true;
        if self.empty {
            return Ok(InnerXml::with_attributes(
                self.tag.clone(),
                self.attributes.trim_end().to_string(),
                "",
            ));
        }

        let start = self.reader.buffer_position();
        self.reader.read_to_end(QName(self.tag.as_bytes()))?;
        let after_end = self.reader.buffer_position();

        // 结束标签可能带有空白 (`</pool >`)，从末尾回找 `</`
        let end = self.src[start..after_end]
            .rfind("</")
            .map(|offset| start + offset)
            .ok_or_else(|| unclosed(&self.tag))?;

        Ok(InnerXml::with_attributes(
            self.tag.clone(),
            self.attributes.clone(),
            &self.src[start..end],
        ))
    }

    /// 跳过未被字段实现消费的元素
    fn finish(self) -> Result<()> {
        if !self.consumed && !self.empty {
            self.reader.read_to_end(QName(self.tag.as_bytes()))?;
        }
        Ok(())
    }

    fn invalid(&self, raw: &str) -> XmlError {
        XmlError::InvalidValue {
            field: self.tag.clone(),
            value: raw.to_string(),
        }
    }
}

/// 从请求/响应字节解码资源
pub fn decode<T: XmlRoot + Default>(input: &[u8]) -> Result<T> {
    let src = std::str::from_utf8(input)
        .map_err(|e| XmlError::MalformedInput(format!("输入不是有效的 UTF-8: {}", e)))?;
    decode_str(src)
}

/// 从字符串解码资源
pub fn decode_str<T: XmlRoot + Default>(src: &str) -> Result<T> {
    debug!("解码 <{}>: {} 字节", T::TAG, src.len());

    let mut doc = T::default();
    let attributes = read_document(src, T::TAG, &mut doc)?;
    doc.set_root_attributes(attributes);
    Ok(doc)
}

/// 解码以 `root` 为根的文档到 `target`，返回根元素的原始属性文本
pub(crate) fn read_document<F: XmlFields>(
    src: &str,
    root: &str,
    target: &mut F,
) -> Result<String> {
    let mut reader = Reader::from_str(src);
    let mut attributes = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                check_root(root, &e, attributes.is_some())?;
                attributes = Some(utf8(e.attributes_raw())?.to_string());
                read_children(&mut reader, src, root, target)?;
            }
            Event::Empty(e) => {
                check_root(root, &e, attributes.is_some())?;
                attributes = Some(utf8(e.attributes_raw())?.trim_end().to_string());
            }
            Event::Text(t) => {
                if !t.iter().all(|b| b.is_ascii_whitespace()) {
                    return Err(XmlError::MalformedInput(
                        "根元素之外存在文本内容".to_string(),
                    ));
                }
            }
            Event::CData(_) | Event::End(_) => {
                return Err(XmlError::MalformedInput(
                    "根元素之外存在非法内容".to_string(),
                ));
            }
            Event::Eof => break,
            // XML 声明、注释、处理指令、DOCTYPE
            _ => {}
        }
    }

    attributes.ok_or_else(|| XmlError::MalformedInput(format!("文档为空，缺少根元素 <{}>", root)))
}

fn check_root(root: &str, start: &BytesStart<'_>, seen_root: bool) -> Result<()> {
    let name = start.name();
    let found = utf8(name.as_ref())?;
    if seen_root {
        return Err(XmlError::MalformedInput(format!(
            "根元素 <{}> 之后存在多余元素 <{}>",
            root, found
        )));
    }
    if found != root {
        return Err(XmlError::UnexpectedRoot {
            expected: root.to_string(),
            found: found.to_string(),
        });
    }
    Ok(())
}

/// 读取父元素的全部子元素直到其结束标签
fn read_children<'a, F: XmlFields>(
    reader: &mut Reader<&'a [u8]>,
    src: &'a str,
    parent: &str,
    target: &mut F,
) -> Result<()> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let mut node = Node::open(reader, src, &e, false)?;
                let tag = node.tag.clone();
                target.read_field(&tag, &mut node)?;
                node.finish()?;
            }
            Event::Empty(e) => {
                let mut node = Node::open(reader, src, &e, true)?;
                let tag = node.tag.clone();
                target.read_field(&tag, &mut node)?;
            }
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(unclosed(parent)),
            // 字段之间的空白、注释
            _ => {}
        }
    }
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes)
        .map_err(|e| XmlError::MalformedInput(format!("标签不是有效的 UTF-8: {}", e)))
}

fn unclosed(tag: &str) -> XmlError {
    XmlError::MalformedInput(format!("元素 <{}> 未闭合", tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{encode_to_string, XmlWriter};

    #[derive(Debug, Default, PartialEq)]
    struct Policy {
        logging_enabled: bool,
        action: String,
    }

    impl XmlFields for Policy {
        fn write_fields(&self, w: &mut XmlWriter) {
            w.value("loggingEnabled", self.logging_enabled);
            w.text("action", &self.action);
        }

        fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> Result<()> {
            match tag {
                "loggingEnabled" => self.logging_enabled = node.bool()?,
                "action" => self.action = node.text()?,
                _ => {}
            }
            Ok(())
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Config {
        enabled: bool,
        policy: Policy,
        version: String,
        limit: i32,
        rules: Option<InnerXml>,
    }

    impl XmlFields for Config {
        fn write_fields(&self, w: &mut XmlWriter) {
            w.value("enabled", self.enabled);
            w.child("defaultPolicy", &self.policy);
            w.text_nonempty("version", &self.version);
            w.value_nonzero("limit", self.limit);
            w.optional_fragment(self.rules.as_ref());
        }

        fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> Result<()> {
            match tag {
                "enabled" => self.enabled = node.bool()?,
                "defaultPolicy" => node.read_into(&mut self.policy)?,
                "version" => self.version = node.text()?,
                "limit" => self.limit = node.parse()?,
                "rules" => self.rules = Some(node.inner_xml()?),
                _ => {}
            }
            Ok(())
        }
    }

    impl XmlRoot for Config {
        const TAG: &'static str = "firewall";
    }

    #[derive(Debug, Default, PartialEq)]
    struct Namespaced {
        attributes: String,
        enabled: bool,
    }

    impl XmlFields for Namespaced {
        fn write_fields(&self, w: &mut XmlWriter) {
            w.value("enabled", self.enabled);
        }

        fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> Result<()> {
            if tag == "enabled" {
                self.enabled = node.bool()?;
            }
            Ok(())
        }
    }

    impl XmlRoot for Namespaced {
        const TAG: &'static str = "loadBalancer";

        fn root_attributes(&self) -> &str {
            &self.attributes
        }

        fn set_root_attributes(&mut self, attributes: String) {
            self.attributes = attributes;
        }
    }

    #[test]
    fn test_root_attributes_roundtrip() {
        let src = "<loadBalancer xmlns=\"urn:x\" version=\"2\">\
                   <enabled>true</enabled></loadBalancer>";
        let doc: Namespaced = decode_str(src).unwrap();
        assert_eq!(doc.attributes, " xmlns=\"urn:x\" version=\"2\"");
        assert_eq!(encode_to_string(&doc), src);

        let doc: Namespaced = decode_str("<loadBalancer a=\"1\" />").unwrap();
        assert_eq!(doc.attributes, " a=\"1\"");
        assert_eq!(
            encode_to_string(&doc),
            "<loadBalancer a=\"1\"><enabled>false</enabled></loadBalancer>"
        );
    }

    #[test]
    fn test_root_attributes_dropped_by_default() {
        let src = "<firewall xmlns=\"urn:x\"><enabled>true</enabled></firewall>";
        let doc: Config = decode_str(src).unwrap();
        assert!(encode_to_string(&doc).starts_with("<firewall><enabled>true</enabled>"));
    }

    #[test]
    fn test_decode_modeled_and_opaque() {
        let src = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                   <firewall>\n  <enabled>true</enabled>\n  \
                   <defaultPolicy><loggingEnabled>false</loggingEnabled><action>deny</action></defaultPolicy>\n  \
                   <version>12</version>\n  \
                   <rules>\n    <rule a=\"b\"><x/><y>&amp;</y></rule>\n  </rules >\n\
                   </firewall>\n";
        let doc: Config = decode_str(src).unwrap();
        assert!(doc.enabled);
        assert_eq!(doc.policy.action, "deny");
        assert_eq!(doc.version, "12");
        assert_eq!(
            doc.rules.as_ref().map(InnerXml::text),
            Some("\n    <rule a=\"b\"><x/><y>&amp;</y></rule>\n  ")
        );
    }

    #[test]
    fn test_compact_roundtrip_is_byte_identical() {
        let src = "<firewall><enabled>false</enabled>\
                   <defaultPolicy><loggingEnabled>true</loggingEnabled><action>accept</action></defaultPolicy>\
                   <version>3</version><limit>5</limit>\
                   <rules><unknown><deep k=\"v\">t</deep></unknown><!-- kept --></rules></firewall>";
        let doc: Config = decode_str(src).unwrap();
        assert_eq!(encode_to_string(&doc), src);
    }

    #[test]
    fn test_unknown_elements_are_skipped() {
        let src = "<firewall><future><a><b/></a></future><enabled>1</enabled><empty/></firewall>";
        let doc: Config = decode_str(src).unwrap();
        assert!(doc.enabled);
        assert_eq!(doc.rules, None);
    }

    #[test]
    fn test_empty_elements() {
        let doc: Config = decode_str("<firewall/>").unwrap();
        assert_eq!(doc, Config::default());

        let doc: Config = decode_str("<firewall><limit/><rules/></firewall>").unwrap();
        assert_eq!(doc.limit, 0);
        assert_eq!(doc.rules.as_ref().map(InnerXml::text), Some(""));
    }

    #[test]
    fn test_malformed_input() {
        let cases = [
            "",
            "<firewall><enabled>true</enabled>",
            "<firewall><enabled>true</version></firewall>",
            "<firewall></firewall><firewall></firewall>",
            "text<firewall></firewall>",
        ];
        for src in cases {
            assert!(decode_str::<Config>(src).is_err(), "应当失败: {:?}", src);
        }
    }

    #[test]
    fn test_wrong_root() {
        let err = decode_str::<Config>("<loadBalancer></loadBalancer>").unwrap_err();
        assert!(matches!(err, XmlError::UnexpectedRoot { ref found, .. } if found == "loadBalancer"));
    }

    #[test]
    fn test_invalid_scalar() {
        let err = decode_str::<Config>("<firewall><limit>many</limit></firewall>").unwrap_err();
        assert!(matches!(err, XmlError::InvalidValue { ref field, .. } if field == "limit"));

        let err = decode_str::<Config>("<firewall><enabled>yes</enabled></firewall>").unwrap_err();
        assert!(matches!(err, XmlError::InvalidValue { .. }));
    }

    #[test]
    fn test_opaque_content_never_fails() {
        let src = "<firewall><rules>free text &unknown; <b>bold</b> ]]&gt;</rules></firewall>";
        let doc: Config = decode_str(src).unwrap();
        assert_eq!(
            doc.rules.unwrap().text(),
            "free text &unknown; <b>bold</b> ]]&gt;"
        );
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let err = decode::<Config>(&[0x3c, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, XmlError::MalformedInput(_)));
    }
}
