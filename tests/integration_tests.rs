use mcal::costs::persist::{self, from_bytes, read_basis_cost, to_bytes, write_basis_cost};
use mcal::costs::registry;
use mcal::costs::sample_variance;
use mcal::costs::variance::VarianceBasisCost;
use mcal::io::{BinaryReader, BinaryWriter};
use mcal::properties::{CostConfig, ParameterSpec};
use mcal::{BasisCost, Error, Result, Vector};
use std::io::{Read, Write};
use std::sync::Arc;
use std::thread;

/// 只依赖基向量方向的代价：第一个分量的绝对值乘以权重，不能由方差计算
#[derive(Debug, Clone)]
struct AxisPenalty {
    weight: f64,
}

const AXIS_SPECS: &[ParameterSpec] = &[ParameterSpec {
    name: "weight",
    default: 0.5,
}];

impl AxisPenalty {
    fn create() -> Box<dyn BasisCost> {
        Box::new(AxisPenalty { weight: 0.5 })
    }
}

impl BasisCost for AxisPenalty {
    fn can_use_variance(&self) -> bool {
        false
    }

    fn cost(&self, unit_basis: &Vector, _projections: &Vector) -> f64 {
        self.weight * unit_basis.get(0).unwrap_or(0.0).abs()
    }

    fn type_name(&self) -> &'static str {
        "test_axis_penalty"
    }

    fn version_no(&self) -> u16 {
        1
    }

    fn clone_box(&self) -> Box<dyn BasisCost> {
        Box::new(self.clone())
    }

    fn parameter_specs(&self) -> &'static [ParameterSpec] {
        AXIS_SPECS
    }

    fn parameters(&self) -> CostConfig {
        let mut config = CostConfig::defaults(AXIS_SPECS);
        config.set("weight", self.weight);
        config
    }

    fn configure(&mut self, config: &CostConfig) -> Result<()> {
        self.weight = config.get("weight").unwrap_or(0.5);
        Ok(())
    }

    fn write_parameters(&self, writer: &mut BinaryWriter<&mut dyn Write>) -> Result<()> {
        writer.write_f64(self.weight)
    }

    fn read_parameters(
        &mut self,
        _version: u16,
        reader: &mut BinaryReader<&mut dyn Read>,
    ) -> Result<()> {
        self.weight = reader.read_f64()?;
        Ok(())
    }
}

fn basis() -> Vector {
    Vector::unit(vec![0.6, 0.8]).unwrap()
}

#[test]
fn end_to_end_variance_cost() {
    registry::register_defaults();
    let cost = VarianceBasisCost::with_alpha(2.0).unwrap();
    let projections = Vector::new(vec![1.0, 2.0, 3.0]);
    assert_eq!(sample_variance(&projections), 1.0);
    assert_eq!(cost.cost(&basis(), &projections), 2.0);

    let restored = from_bytes(&to_bytes(&cost).unwrap()).unwrap();
    assert_eq!(restored.type_name(), "mcal_var_basis_cost");
    assert_eq!(restored.parameters().get("alpha"), Some(2.0));
    assert_eq!(restored.cost(&basis(), &projections), 2.0);
    assert!(restored.is_equal(&cost));
}

#[test]
fn factory_round_trip_reproduces_instance() {
    let mut original = registry::create("mcal_var_basis_cost").unwrap();
    original.config_from_text("{ alpha: 0.125 }").unwrap();

    let mut fresh = registry::create(original.type_name()).unwrap();
    fresh.configure(&original.parameters()).unwrap();
    assert!(fresh.is_equal(original.as_ref()));

    let restored = from_bytes(&to_bytes(fresh.as_ref()).unwrap()).unwrap();
    assert!(*restored == *original);
}

#[test]
fn parsing_is_deterministic_and_defaults_apply() {
    let text = "{ alpha: 3.75 }";
    let first = registry::create_from_text(&format!("mcal_var_basis_cost {text}")).unwrap();
    let second = registry::create_from_text(&format!("mcal_var_basis_cost {text}")).unwrap();
    assert!(*first == *second);

    let mut defaults = VarianceBasisCost::new();
    defaults.config_from_text("{}").unwrap();
    assert_eq!(defaults.alpha(), 1.0);
}

#[test]
fn unknown_key_names_the_key() {
    let mut cost = VarianceBasisCost::new();
    match cost.config_from_text("{ bogus: 3.0 }") {
        Err(error @ Error::ConfigParse { .. }) => assert!(error.to_string().contains("bogus")),
        other => panic!("期望 ConfigParse，得到 {other:?}"),
    }
}

#[test]
fn old_streams_stay_readable_and_new_ones_are_rejected() {
    let mut writer = BinaryWriter::new(Vec::new());
    writer.write_str("mcal_var_basis_cost").unwrap();
    writer.write_u16(persist::FORMAT_VERSION).unwrap();
    writer.write_u16(1).unwrap();
    let version_one = writer.into_inner();
    let cost = from_bytes(&version_one).unwrap();
    assert_eq!(cost.parameters().get("alpha"), Some(1.0));

    let mut writer = BinaryWriter::new(Vec::new());
    writer.write_str("mcal_var_basis_cost").unwrap();
    writer.write_u16(persist::FORMAT_VERSION).unwrap();
    writer.write_u16(3).unwrap();
    writer.write_f64(2.0).unwrap();
    assert!(matches!(
        from_bytes(&writer.into_inner()),
        Err(Error::UnsupportedVersion { found: 3, supported: 2, .. })
    ));
}

#[test]
fn registered_variants_round_trip_through_the_factory() {
    registry::register("test_axis_penalty", AxisPenalty::create);
    assert!(registry::known_variants().contains(&"test_axis_penalty".to_string()));

    let mut cost = registry::create_from_text("test_axis_penalty { weight: 2 }").unwrap();
    assert_eq!(cost.cost(&basis(), &Vector::default()), 2.0 * basis()[0]);
    assert!(!cost.can_use_variance());
    assert!(matches!(
        cost.cost_from_variance(&basis(), 1.0),
        Err(Error::UnsupportedOperation { .. })
    ));

    let mut writer = BinaryWriter::new(Vec::new());
    write_basis_cost(&mut writer, cost.as_ref()).unwrap();
    write_basis_cost(&mut writer, &VarianceBasisCost::with_alpha(5.0).unwrap()).unwrap();
    let bytes = writer.into_inner();
    let mut reader = BinaryReader::new(bytes.as_slice());
    let first = read_basis_cost(&mut reader).unwrap();
    let second = read_basis_cost(&mut reader).unwrap();
    assert!(*first == *cost);
    assert_eq!(second.parameters().get("alpha"), Some(5.0));

    cost.config_from_text("{}").unwrap();
    assert_eq!(cost.parameters().get("weight"), Some(0.5));
}

#[test]
fn clones_are_independent() {
    let original = registry::create_from_text("mcal_var_basis_cost { alpha: 2 }").unwrap();
    let mut copy = original.clone();
    copy.config_from_text("{ alpha: 7 }").unwrap();
    assert_eq!(original.parameters().get("alpha"), Some(2.0));
    assert_eq!(copy.parameters().get("alpha"), Some(7.0));
}

#[test]
fn shared_instance_is_usable_from_many_threads() {
    let cost: Arc<dyn BasisCost> = Arc::new(VarianceBasisCost::with_alpha(3.0).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let cost = Arc::clone(&cost);
            thread::spawn(move || {
                let projections = Vector::new(vec![0.0, i as f64]);
                cost.cost(&basis(), &projections)
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let expected = 3.0 * (i as f64 * i as f64) / 2.0;
        assert!((handle.join().unwrap() - expected).abs() < 1e-12);
    }
}

#[test]
fn files_carry_a_header() {
    let path = std::env::temp_dir().join(format!("mcal-{}.bin", std::process::id()));
    let cost = VarianceBasisCost::with_alpha(0.75).unwrap();
    persist::save(&path, &cost).unwrap();
    let loaded = persist::load(&path).unwrap();
    assert!(loaded.is_equal(&cost));

    // 没有流头的裸记录不能当作文件读取
    std::fs::write(&path, to_bytes(&cost).unwrap()).unwrap();
    assert!(persist::load(&path).is_err());
    std::fs::remove_file(&path).unwrap();
}
