//! 基向量代价函数接口
//!
//! 模型构建过程中，对每个候选基向量都要计算一个代价，用来判断这个方向是否值得保留。
//! 代价可以直接由样本在该方向上的投影计算，也可以（对于支持的代价函数）由投影的方差计算，
//! 后者在投影已经被丢弃、只保留了统计量的时候更省事。

use crate::error::{Error, Result};
use crate::io::{BinaryReader, BinaryWriter};
use crate::properties::{CostConfig, ParameterSpec};
use crate::vector::Vector;
use std::fmt::{self, Debug, Display};
use std::io::{Read, Write};

pub mod persist;
pub mod registry;
pub mod variance;

pub trait BasisCost: Debug + Send + Sync {
    /// 是否可以只用方差来计算代价。调用 cost_from_variance 之前必须先检查这一项
    fn can_use_variance(&self) -> bool;

    /// 由单位基向量和数据集在其上的投影计算代价
    ///
    /// 对任意长度的投影（包括空投影）都有定义
    fn cost(&self, unit_basis: &Vector, projections: &Vector) -> f64;

    /// 由单位基向量和投影的方差计算代价
    fn cost_from_variance(&self, _unit_basis: &Vector, _variance: f64) -> Result<f64> {
        Err(Error::UnsupportedOperation {
            type_name: self.type_name().to_string(),
            operation: "cost_from_variance",
        })
    }

    /// 类型名，用于日志和工厂查找，发布后不能更改
    fn type_name(&self) -> &'static str;

    /// 当前的二进制格式版本号，和类型名相互独立
    fn version_no(&self) -> u16;

    fn clone_box(&self) -> Box<dyn BasisCost>;

    /// 允许的参数及其默认值
    fn parameter_specs(&self) -> &'static [ParameterSpec];

    /// 当前的参数取值
    fn parameters(&self) -> CostConfig;

    /// 应用一组已经通过语法校验的参数
    fn configure(&mut self, config: &CostConfig) -> Result<()>;

    /// 按当前版本的布局写出参数
    fn write_parameters(&self, writer: &mut BinaryWriter<&mut dyn Write>) -> Result<()>;

    /// 按给定版本的布局读入参数，旧版本中没有的参数取默认值
    fn read_parameters(
        &mut self,
        version: u16,
        reader: &mut BinaryReader<&mut dyn Read>,
    ) -> Result<()>;

    /// 从参数块文本中读取配置
    fn config_from_text(&mut self, text: &str) -> Result<()> {
        let config = CostConfig::parse(text, self.parameter_specs())?;
        self.configure(&config)
    }

    /// 输出一份便于阅读的摘要，不保证可以再解析回来
    fn describe(&self, sink: &mut dyn fmt::Write) -> fmt::Result {
        write!(sink, "{} {}", self.type_name(), self.parameters())
    }

    /// 类型名和所有参数都相同
    fn is_equal(&self, other: &dyn BasisCost) -> bool {
        self.type_name() == other.type_name() && self.parameters() == other.parameters()
    }
}

impl Clone for Box<dyn BasisCost> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl Display for dyn BasisCost + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.describe(f)
    }
}

impl PartialEq for dyn BasisCost + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other)
    }
}

/// 样本方差（分母为 n - 1），少于两个样本时没有离散程度，记为 0
pub fn sample_variance(projections: &Vector) -> f64 {
    let n = projections.len();
    if n < 2 {
        return 0.0;
    }
    let mean = projections.iter().sum::<f64>() / n as f64;
    let squares: f64 = projections.iter().map(|x| (x - mean) * (x - mean)).sum();
    squares / (n - 1) as f64
}
