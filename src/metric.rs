// 代价评测结果的数据结构，以及它们输出到命令行的方式

use crate::costs::{sample_variance, BasisCost};
use crate::error::{Error, Result};
use crate::vector::Vector;
use serde::Serialize;
use std::fmt::Display;
use std::thread;

/// 一行投影数据：标签和各个样本的投影值
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionRow {
    pub label: String,
    pub projections: Vector,
}

#[derive(Debug, Clone, Serialize)]
pub struct BasisMetric {
    pub label: String,
    pub samples: usize,
    pub variance: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Metric {
    pub cost_function: String,
    pub via_variance: bool,
    pub bases: Vec<BasisMetric>,
    pub total: f64,
}

impl Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path = if self.via_variance { "方差" } else { "投影" };
        writeln!(f, "代价函数：{}（由{}计算）", self.cost_function, path)?;
        for BasisMetric {
            label,
            samples,
            variance,
            cost,
        } in &self.bases
        {
            writeln!(
                f,
                "{label}：样本 {samples} 个；方差 {variance:.6}；代价 {cost:.6}"
            )?;
        }
        writeln!(f, "总代价：{:.6}", self.total)
    }
}

fn evaluate_row(
    cost: &dyn BasisCost,
    unit_basis: &Vector,
    row: &ProjectionRow,
    via_variance: bool,
) -> Result<BasisMetric> {
    let variance = sample_variance(&row.projections);
    let value = if via_variance {
        cost.cost_from_variance(unit_basis, variance)?
    } else {
        cost.cost(unit_basis, &row.projections)
    };
    Ok(BasisMetric {
        label: row.label.clone(),
        samples: row.projections.len(),
        variance,
        cost: value,
    })
}

fn check_bases(rows: &[ProjectionRow], bases: Option<&[Vector]>) -> Result<()> {
    match bases {
        Some(bases) if bases.len() != rows.len() => Err(format!(
            "基向量有 {} 个，投影却有 {} 行",
            bases.len(),
            rows.len()
        )
        .into()),
        _ => Ok(()),
    }
}

/// 计算每一行投影对应基向量的代价
///
/// 没有给出基向量时，统一使用一维的单位向量。只有代价函数声明可以使用方差时，
/// 才会走方差的路径。
pub fn evaluate(
    cost: &dyn BasisCost,
    rows: &[ProjectionRow],
    bases: Option<&[Vector]>,
    use_variance: bool,
) -> Result<Metric> {
    check_bases(rows, bases)?;
    let via_variance = use_variance && cost.can_use_variance();
    let default_basis = Vector::axis(1, 0)?;
    let mut metrics = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let basis = bases.map_or(&default_basis, |b| &b[index]);
        metrics.push(evaluate_row(cost, basis, row, via_variance)?);
    }
    let total = metrics.iter().map(|m| m.cost).sum();
    Ok(Metric {
        cost_function: cost.to_string(),
        via_variance,
        bases: metrics,
        total,
    })
}

/// 把投影按行切分给多个线程计算，每个线程使用代价函数的一个独立副本
pub fn evaluate_parallel(
    cost: &dyn BasisCost,
    rows: &[ProjectionRow],
    bases: Option<&[Vector]>,
    use_variance: bool,
    threads: usize,
) -> Result<Metric> {
    // 切分基向量之前必须确认数目一致
    check_bases(rows, bases)?;
    if threads <= 1 || rows.len() <= 1 {
        return evaluate(cost, rows, bases, use_variance);
    }
    let chunk = rows.len().div_ceil(threads);
    let partials: Vec<Result<Metric>> = thread::scope(|scope| {
        let handles: Vec<_> = rows
            .chunks(chunk)
            .enumerate()
            .map(|(index, part)| {
                let local = cost.clone_box();
                let part_bases = bases.map(|b| &b[index * chunk..index * chunk + part.len()]);
                scope.spawn(move || evaluate(local.as_ref(), part, part_bases, use_variance))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(Error::from("评测线程崩溃")))
            })
            .collect()
    });
    let mut merged = Metric {
        cost_function: cost.to_string(),
        via_variance: use_variance && cost.can_use_variance(),
        bases: Vec::with_capacity(rows.len()),
        total: 0.0,
    };
    for partial in partials {
        merged.bases.extend(partial?.bases);
    }
    merged.total = merged.bases.iter().map(|m| m.cost).sum();
    Ok(merged)
}
