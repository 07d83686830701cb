//! libmcal 是统计形状模型中基向量代价函数的 Rust 实现。
//!
//! 模型构建时，每个候选基向量都需要一个代价来衡量是否值得保留。本库提供：
//!
//! - 代价函数接口 [`costs::BasisCost`] 以及基于方差的实现；
//! - 按类型名构造代价函数的工厂 [`costs::registry`]；
//! - `{ key: value }` 形式的参数块解析 [`properties`]；
//! - 带版本号的二进制存储 [`costs::persist`]，保证模型读回后代价函数完全一致。
//!
//! mcal 是使用 libmcal 实现的命令行程序，可以对投影表评测代价，也可以保存、检查二进制代价函数文件。

pub mod cli;
pub mod config;
pub mod costs;
pub mod error;
pub mod io;
pub mod metric;
pub mod properties;
pub mod vector;

pub use cli::{Command, CommandLine, CommandLineArgs};
pub use costs::BasisCost;
pub use error::{Error, Result};
pub use vector::Vector;
