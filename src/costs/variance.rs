//! 方差代价：代价正比于投影在基向量方向上的方差

use super::{sample_variance, BasisCost};
use crate::error::{Error, Result};
use crate::io::{BinaryReader, BinaryWriter};
use crate::properties::{CostConfig, ParameterSpec};
use crate::vector::Vector;
use std::io::{Read, Write};

pub const TYPE_NAME: &str = "mcal_var_basis_cost";

/// 版本 1 没有任何参数；版本 2 增加了 alpha
const VERSION: u16 = 2;

const SPECS: &[ParameterSpec] = &[ParameterSpec {
    name: "alpha",
    default: 1.0,
}];

#[derive(Debug, Clone, PartialEq)]
pub struct VarianceBasisCost {
    alpha: f64,
}

impl Default for VarianceBasisCost {
    fn default() -> Self {
        Self::new()
    }
}

impl VarianceBasisCost {
    pub fn new() -> Self {
        Self {
            alpha: SPECS[0].default,
        }
    }

    pub fn with_alpha(alpha: f64) -> Result<Self> {
        let mut cost = Self::new();
        cost.set_alpha(alpha)?;
        Ok(cost)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f64) -> Result<()> {
        let reason = if !alpha.is_finite() {
            "必须是有限数"
        } else if alpha < 0.0 {
            "不能为负"
        } else {
            self.alpha = alpha;
            return Ok(());
        };
        Err(Error::InvalidParameter {
            type_name: TYPE_NAME.to_string(),
            name: "alpha".to_string(),
            value: alpha,
            reason,
        })
    }

    // 基向量本身不参与计算，两条路径共用这一步
    fn scaled(&self, variance: f64) -> f64 {
        self.alpha * variance
    }

    pub fn create() -> Box<dyn BasisCost> {
        Box::new(Self::new())
    }
}

impl BasisCost for VarianceBasisCost {
    fn can_use_variance(&self) -> bool {
        true
    }

    fn cost(&self, _unit_basis: &Vector, projections: &Vector) -> f64 {
        self.scaled(sample_variance(projections))
    }

    fn cost_from_variance(&self, _unit_basis: &Vector, variance: f64) -> Result<f64> {
        Ok(self.scaled(variance))
    }

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn version_no(&self) -> u16 {
        VERSION
    }

    fn clone_box(&self) -> Box<dyn BasisCost> {
        Box::new(self.clone())
    }

    fn parameter_specs(&self) -> &'static [ParameterSpec] {
        SPECS
    }

    fn parameters(&self) -> CostConfig {
        let mut config = CostConfig::defaults(SPECS);
        config.set("alpha", self.alpha);
        config
    }

    fn configure(&mut self, config: &CostConfig) -> Result<()> {
        self.set_alpha(config.get("alpha").unwrap_or(SPECS[0].default))
    }

    fn write_parameters(&self, writer: &mut BinaryWriter<&mut dyn Write>) -> Result<()> {
        writer.write_f64(self.alpha)
    }

    fn read_parameters(
        &mut self,
        version: u16,
        reader: &mut BinaryReader<&mut dyn Read>,
    ) -> Result<()> {
        match version {
            1 => self.alpha = SPECS[0].default,
            2 => {
                let alpha = reader.read_f64()?;
                self.set_alpha(alpha).map_err(|e| Error::Corrupt(e.to_string()))?;
            }
            found => {
                return Err(Error::UnsupportedVersion {
                    type_name: TYPE_NAME.to_string(),
                    found,
                    supported: VERSION,
                })
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn basis() -> Vector {
        Vector::unit(vec![1.0, 1.0]).unwrap()
    }

    #[test]
    fn scaled_variance() {
        let cost = VarianceBasisCost::with_alpha(2.0).unwrap();
        let projections = Vector::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(cost.cost(&basis(), &projections), 2.0);
        assert_eq!(cost.cost_from_variance(&basis(), 1.0).unwrap(), 2.0);
    }

    #[test]
    fn empty_projections_cost_nothing() {
        let cost = VarianceBasisCost::new();
        assert_eq!(cost.cost(&basis(), &Vector::default()), 0.0);
    }

    #[test]
    fn alpha_must_be_finite_and_non_negative() {
        assert!(VarianceBasisCost::with_alpha(0.0).is_ok());
        for alpha in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                VarianceBasisCost::with_alpha(alpha),
                Err(Error::InvalidParameter { .. })
            ));
        }
        let mut cost = VarianceBasisCost::new();
        assert!(cost.config_from_text("{ alpha: -2 }").is_err());
        assert_eq!(cost.alpha(), 1.0);
    }

    #[test]
    fn configuration_text() {
        let mut cost = VarianceBasisCost::new();
        cost.config_from_text("{ alpha: 0.5 }").unwrap();
        assert_eq!(cost.alpha(), 0.5);
        cost.config_from_text("{}").unwrap();
        assert_eq!(cost.alpha(), 1.0);
        let mut text = String::new();
        cost.describe(&mut text).unwrap();
        assert_eq!(text, "mcal_var_basis_cost { alpha: 1 }");
    }

    proptest! {
        #[test]
        fn variance_path_matches_projection_path(
            alpha in 0.0f64..100.0,
            projections in prop::collection::vec(-1e3f64..1e3, 0..64),
        ) {
            let cost = VarianceBasisCost::with_alpha(alpha).unwrap();
            let projections = Vector::new(projections);
            let direct = cost.cost(&basis(), &projections);
            let summarized = cost
                .cost_from_variance(&basis(), sample_variance(&projections))
                .unwrap();
            prop_assert!((direct - summarized).abs() <= 1e-9 * direct.abs().max(1.0));
        }
    }
}
