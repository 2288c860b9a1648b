//! XML 编解码错误定义

use thiserror::Error;

/// 编解码结果类型
pub type Result<T> = std::result::Result<T, XmlError>;

/// 编解码错误类型
///
/// 所有变体都表示输入文档的外层结构不合法。不透明片段内部的内容永远不会产生错误。
#[derive(Error, Debug)]
pub enum XmlError {
    /// 标记语法错误 (未闭合、标签不匹配、非 UTF-8 等)
    #[error("XML 格式错误: {0}")]
    MalformedInput(String),

    /// 根元素不是期望的资源类型
    #[error("根元素不匹配: 期望 <{expected}>, 实际 <{found}>")]
    UnexpectedRoot { expected: String, found: String },

    /// 已建模字段的值无法解析
    #[error("字段 <{field}> 的值无效: {value:?}")]
    InvalidValue { field: String, value: String },

    /// 底层解析器错误
    #[error("XML 解析错误: {0}")]
    Parser(#[from] quick_xml::Error),
}

impl XmlError {
    /// 是否属于"输入格式不合法"
    ///
    /// 当前所有变体都属于这一类。新增变体时需要在这里显式归类。
    pub fn is_malformed(&self) -> bool {
        match self {
            XmlError::MalformedInput(_)
            | XmlError::UnexpectedRoot { .. }
            | XmlError::InvalidValue { .. }
            | XmlError::Parser(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = XmlError::UnexpectedRoot {
            expected: "pool".to_string(),
            found: "monitor".to_string(),
        };
        assert_eq!(err.to_string(), "根元素不匹配: 期望 <pool>, 实际 <monitor>");

        let err = XmlError::InvalidValue {
            field: "port".to_string(),
            value: "http".to_string(),
        };
        assert!(err.to_string().contains("<port>"));
    }

    #[test]
    fn test_every_error_is_malformed() {
        let errors = [
            XmlError::MalformedInput("未闭合".to_string()),
            XmlError::UnexpectedRoot {
                expected: "pool".to_string(),
                found: "monitor".to_string(),
            },
            XmlError::InvalidValue {
                field: "port".to_string(),
                value: "http".to_string(),
            },
            XmlError::Parser(quick_xml::Error::UnexpectedEof("pool".to_string())),
        ];
        for err in &errors {
            assert!(err.is_malformed(), "{}", err);
        }
    }
}
