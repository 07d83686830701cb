//! 命令行程序的配置文件格式
//!
//! ```yaml
//! version: "1"
//! info:
//!   name: 手部轮廓模型
//! cost:
//!   type: mcal_var_basis_cost
//!   config: "{ alpha: 2.0 }"
//! evaluation:
//!   use_variance: true
//!   threads: 4
//! ```

use crate::costs::{registry, BasisCost};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Info {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostFunctionConfig {
    pub r#type: String,
    /// 参数块，形如 `{ alpha: 2.0 }`，省略时全部取默认值
    pub config: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub use_variance: Option<bool>,
    pub threads: Option<usize>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: Option<String>,
    pub info: Option<Info>,
    pub cost: CostFunctionConfig,
    pub evaluation: Option<EvaluationConfig>,
}

impl Config {
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// 按配置构造代价函数
    pub fn build_cost(&self) -> Result<Box<dyn BasisCost>> {
        let mut cost = registry::create(&self.cost.r#type)?;
        cost.config_from_text(self.cost.config.as_deref().unwrap_or_default())?;
        Ok(cost)
    }

    pub fn use_variance(&self) -> bool {
        self.evaluation
            .as_ref()
            .and_then(|x| x.use_variance)
            .unwrap_or(true)
    }

    pub fn threads(&self) -> usize {
        self.evaluation
            .as_ref()
            .and_then(|x| x.threads)
            .unwrap_or(1)
    }

    /// 用一个代价函数的当前参数覆盖配置中的代价函数部分
    pub fn set_cost(&mut self, cost: &dyn BasisCost) {
        self.cost = CostFunctionConfig {
            r#type: cost.type_name().to_string(),
            config: Some(cost.parameters().to_string()),
        };
    }
}
