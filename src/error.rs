//! 错误类型
//!
//! 所有错误都携带足够的上下文（类型名、版本号、出错的词法单元），便于向用户报告。

use itertools::Itertools;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// 配置文本格式错误，或者出现了不认识的参数
    #[error("配置解析错误：{message}（词法单元 `{token}`，位置 {position}）")]
    ConfigParse {
        message: String,
        token: String,
        position: usize,
    },

    /// 二进制流中的版本号比当前程序支持的更新
    #[error("{type_name} 的版本 {found} 不受支持，当前最多支持到版本 {supported}")]
    UnsupportedVersion {
        type_name: String,
        found: u16,
        supported: u16,
    },

    #[error("未知的代价函数类型 {type_name}，已注册的类型有：{}", .known.iter().join("、"))]
    UnknownVariant { type_name: String, known: Vec<String> },

    /// 调用方违反了接口约定，例如对不支持方差的代价函数调用 cost_from_variance
    #[error("{type_name} 不支持操作 {operation}")]
    UnsupportedOperation {
        type_name: String,
        operation: &'static str,
    },

    #[error("{type_name} 的参数 {name} = {value} 不合法：{reason}")]
    InvalidParameter {
        type_name: String,
        name: String,
        value: f64,
        reason: &'static str,
    },

    #[error("向量不合法：{0}")]
    InvalidVector(String),

    #[error("二进制数据损坏：{0}")]
    Corrupt(String),

    #[error("读写失败：{0}")]
    Io(#[from] std::io::Error),

    #[error("YAML 解析失败：{0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("表格读取失败：{0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Message(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Self::Message(value.to_string())
    }
}

impl Error {
    pub(crate) fn parse(message: impl Into<String>, token: impl Into<String>, position: usize) -> Self {
        Self::ConfigParse {
            message: message.into(),
            token: token.into(),
            position,
        }
    }
}
