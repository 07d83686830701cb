//! 代价函数工厂
//!
//! 全进程共享一张“类型名 → 构造函数”的表。反序列化时只知道流中记录的类型名，
//! 需要通过这张表构造出正确的代价函数。内置的代价函数通过 [`register_defaults`] 显式注册，
//! 该函数可以重复调用；工厂的各个入口在查表前都会先调用它。

use super::variance::{self, VarianceBasisCost};
use super::BasisCost;
use crate::error::{Error, Result};
use crate::properties::split_named;
use rustc_hash::FxHashMap;
use std::sync::{Once, OnceLock, PoisonError, RwLock};
use tracing::{debug, info, warn};

pub type Constructor = fn() -> Box<dyn BasisCost>;

type Table = RwLock<FxHashMap<String, Constructor>>;

static TABLE: OnceLock<Table> = OnceLock::new();
static DEFAULTS: Once = Once::new();

fn table() -> &'static Table {
    TABLE.get_or_init(|| RwLock::new(FxHashMap::default()))
}

fn same_constructor(a: Constructor, b: Constructor) -> bool {
    a as usize == b as usize
}

/// 注册一种代价函数；同名的再次注册会覆盖之前的构造函数
pub fn register(type_name: &str, constructor: Constructor) {
    let mut table = table().write().unwrap_or_else(PoisonError::into_inner);
    match table.insert(type_name.to_string(), constructor) {
        None => debug!("注册代价函数 {}", type_name),
        Some(previous) if same_constructor(previous, constructor) => {
            debug!("代价函数 {} 已经注册过", type_name)
        }
        Some(_) => warn!("代价函数 {} 的构造函数被替换", type_name),
    }
}

/// 注册所有内置的代价函数
pub fn register_defaults() {
    DEFAULTS.call_once(|| {
        register(variance::TYPE_NAME, VarianceBasisCost::create);
        info!("内置代价函数注册完成：{}", variance::TYPE_NAME);
    });
}

pub fn is_registered(type_name: &str) -> bool {
    register_defaults();
    let table = table().read().unwrap_or_else(PoisonError::into_inner);
    table.contains_key(type_name)
}

/// 所有已注册的类型名，按字母序排列
pub fn known_variants() -> Vec<String> {
    register_defaults();
    let table = table().read().unwrap_or_else(PoisonError::into_inner);
    let mut names: Vec<String> = table.keys().cloned().collect();
    names.sort();
    names
}

/// 构造一个取默认参数的代价函数
pub fn create(type_name: &str) -> Result<Box<dyn BasisCost>> {
    register_defaults();
    let constructor = {
        let table = table().read().unwrap_or_else(PoisonError::into_inner);
        table.get(type_name).copied()
    };
    match constructor {
        Some(constructor) => Ok(constructor()),
        None => Err(Error::UnknownVariant {
            type_name: type_name.to_string(),
            known: known_variants(),
        }),
    }
}

/// 由 `type_name { key: value }` 形式的文本构造并配置一个代价函数
pub fn create_from_text(text: &str) -> Result<Box<dyn BasisCost>> {
    let (type_name, block) = split_named(text)?;
    let mut cost = create(&type_name)?;
    cost.config_from_text(&block)?;
    debug!("由文本构造代价函数：{}", cost);
    Ok(cost)
}
