//! 资源文档的字段映射约定
//!
//! 每个资源记录通过实现 [`XmlFields`] 声明自己的字段到标签的映射:
//! `write_fields` 按 schema 顺序输出字段，`read_field` 在解码时逐个接收子元素。
//! 可以独立收发的资源再实现 [`XmlRoot`] 给出根标签。需要逐字节写回根元素属性
//! (例如命名空间声明) 的资源覆盖 `root_attributes` / `set_root_attributes`。

use crate::error::Result;
use crate::reader::Node;
use crate::writer::XmlWriter;

/// 已建模字段的编解码
pub trait XmlFields {
    /// 按 schema 顺序写出所有子元素
    fn write_fields(&self, w: &mut XmlWriter);

    /// 处理一个子元素
    ///
    /// 未识别的标签直接返回 `Ok(())`，解码器会跳过该子树。
    fn read_field(&mut self, tag: &str, node: &mut Node<'_, '_>) -> Result<()>;
}

/// 以独立文档形式收发的资源
pub trait XmlRoot: XmlFields {
    /// 根元素标签名
    const TAG: &'static str;

    /// 编码时写入根开始标签的原始属性文本 (包括前导空白)
    fn root_attributes(&self) -> &str {
        ""
    }

    /// 解码时收到的根元素原始属性文本，默认丢弃
    fn set_root_attributes(&mut self, _attributes: String) {}
}
