//! 文档编码
//!
//! 编码不会失败: 写出器只负责结构，不做任何语义校验。
//! 省略规则:
//! - `text` / `value`: 总是输出
//! - `text_nonempty` / `value_nonzero`: 零值时省略
//! - `optional`: 仅在 `None` 时省略，`Some(0)` / `Some(false)` 照常输出

use std::fmt::Display;

use quick_xml::escape::partial_escape;

use crate::element::{XmlFields, XmlRoot};
use crate::inner::InnerXml;

/// XML 写出器
#[derive(Debug, Default)]
pub struct XmlWriter {
    buf: String,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 文本元素，总是输出 (空串输出为 `<tag></tag>`)
    pub fn text(&mut self, tag: &str, value: &str) {
        self.open(tag, "");
        self.buf.push_str(&partial_escape(value));
        self.close(tag);
    }

    /// 文本元素，空串时省略
    pub fn text_nonempty(&mut self, tag: &str, value: &str) {
        if !value.is_empty() {
            self.text(tag, value);
        }
    }

    /// 重复的文本元素，每个值一个标签
    pub fn texts(&mut self, tag: &str, values: &[String]) {
        for value in values {
            self.text(tag, value);
        }
    }

    /// 标量元素 (布尔、整数)，总是输出
    pub fn value<T: Display>(&mut self, tag: &str, value: T) {
        self.text(tag, &value.to_string());
    }

    /// 标量元素，等于类型零值时省略
    pub fn value_nonzero<T: Display + Default + PartialEq>(&mut self, tag: &str, value: T) {
        if value != T::default() {
            self.value(tag, value);
        }
    }

    /// 带存在标记的标量元素，仅在未设置时省略
    pub fn optional<T: Display>(&mut self, tag: &str, value: Option<T>) {
        if let Some(value) = value {
            self.value(tag, value);
        }
    }

    /// 嵌套的已建模结构，总是输出
    pub fn child<F: XmlFields>(&mut self, tag: &str, value: &F) {
        self.open(tag, "");
        value.write_fields(self);
        self.close(tag);
    }

    /// 带存在标记的嵌套结构
    pub fn optional_child<F: XmlFields>(&mut self, tag: &str, value: Option<&F>) {
        if let Some(value) = value {
            self.child(tag, value);
        }
    }

    /// 有序的嵌套结构序列
    pub fn children<F: XmlFields>(&mut self, tag: &str, values: &[F]) {
        for value in values {
            self.child(tag, value);
        }
    }

    /// 原样写回不透明片段
    pub fn fragment(&mut self, fragment: &InnerXml) {
        self.open(fragment.tag(), fragment.attributes());
        self.buf.push_str(fragment.text());
        self.close(fragment.tag());
    }

    /// 可选的不透明片段
    pub fn optional_fragment(&mut self, fragment: Option<&InnerXml>) {
        if let Some(fragment) = fragment {
            self.fragment(fragment);
        }
    }

    pub fn fragments(&mut self, fragments: &[InnerXml]) {
        for fragment in fragments {
            self.fragment(fragment);
        }
    }

    pub fn into_string(self) -> String {
        self.buf
    }

    fn open(&mut self, tag: &str, attributes: &str) {
        self.buf.push('<');
        self.buf.push_str(tag);
        self.buf.push_str(attributes);
        self.buf.push('>');
    }

    fn close(&mut self, tag: &str) {
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push('>');
    }
}

/// 将资源编码为 XML 字符串 (不带 XML 声明)
pub fn encode_to_string<T: XmlRoot>(value: &T) -> String {
    let mut w = XmlWriter::new();
    w.open(T::TAG, value.root_attributes());
    value.write_fields(&mut w);
    w.close(T::TAG);
    w.into_string()
}

/// 将资源编码为请求体字节
pub fn encode<T: XmlRoot>(value: &T) -> Vec<u8> {
    encode_to_string(value).into_bytes()
}
