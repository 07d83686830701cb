use crate::config::Config;
use crate::error::{Error, Result};
use crate::metric::{Metric, ProjectionRow};
use crate::vector::Vector;
use chrono::Local;
use clap::{Parser, Subcommand};
use csv::ReaderBuilder;
use std::fs::{create_dir_all, read_to_string, write};
use std::path::{Path, PathBuf};
use tracing::info;

/// 命令行参数的定义
#[derive(Parser, Clone)]
#[command(name = "基向量代价评测")]
#[command(author, version, about, long_about)]
#[command(propagate_version = true)]
pub struct CommandLineArgs {
    #[command(subcommand)]
    pub command: Command,
    /// 配置文件，默认为 config.yaml
    pub config: Option<PathBuf>,
    /// 以 JSON 格式输出评测结果
    #[arg(long)]
    pub json: bool,
    /// 输出调试日志
    #[arg(short, long)]
    pub verbose: bool,
}

/// 命令行中所有可用的子命令
#[derive(Subcommand, Clone)]
pub enum Command {
    /// 计算投影表中每个基向量的代价
    Evaluate {
        /// 投影表，每行为标签和若干投影值，以制表符分隔
        #[arg(short, long, value_name = "FILE")]
        projections: PathBuf,
        /// 基向量表，每行为标签和基向量的各个分量；省略时使用一维单位向量
        #[arg(short, long, value_name = "FILE")]
        bases: Option<PathBuf>,
        /// 线程数，默认取配置文件中的值
        #[arg(short, long)]
        threads: Option<usize>,
        /// 输出目录，默认为 output- 加上当前时间
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },
    /// 把配置的代价函数保存为二进制文件
    Save {
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
    /// 读取二进制代价函数文件并输出摘要
    Inspect { file: PathBuf },
    /// 检查配置文件并输出规范化后的配置
    Validate,
    /// 列出所有已注册的代价函数
    Variants,
}

pub struct CommandLine {
    pub args: CommandLineArgs,
}

impl CommandLine {
    pub fn new(args: CommandLineArgs) -> Self {
        Self { args }
    }

    pub fn read_config(&self) -> Result<Config> {
        let path = self
            .args
            .config
            .clone()
            .unwrap_or(PathBuf::from("config.yaml"));
        let content = read_to_string(&path)
            .map_err(|e| Error::from(format!("无法读取配置文件 {}：{e}", path.display())))?;
        info!("读取配置文件 {}", path.display());
        Config::from_yaml(&content)
    }

    /// 读取以制表符分隔的表格，第一列为标签，其余各列为数值
    pub fn read_table(path: &Path) -> Result<Vec<(String, Vector)>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .from_path(path)?;
        let mut rows = vec![];
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let mut fields = record.iter();
            let label = fields.next().unwrap_or_default().to_string();
            let values = fields
                .filter(|x| !x.trim().is_empty())
                .map(|x| {
                    x.trim().parse::<f64>().map_err(|_| {
                        Error::from(format!(
                            "{} 第 {} 行：{x} 不是数",
                            path.display(),
                            line + 1
                        ))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            rows.push((label, Vector::new(values)));
        }
        Ok(rows)
    }

    pub fn read_projections(path: &Path) -> Result<Vec<ProjectionRow>> {
        let rows = Self::read_table(path)?;
        info!("读取了 {} 行投影", rows.len());
        Ok(rows
            .into_iter()
            .map(|(label, projections)| ProjectionRow { label, projections })
            .collect())
    }

    /// 读取基向量，并归一化为单位向量
    pub fn read_bases(path: &Path) -> Result<Vec<Vector>> {
        Self::read_table(path)?
            .into_iter()
            .map(|(_, v)| Vector::unit(v.as_slice().to_vec()))
            .collect()
    }

    pub fn output_dir(maybe_output_dir: Option<PathBuf>) -> Result<PathBuf> {
        let output_dir = maybe_output_dir.unwrap_or_else(|| {
            let time = Local::now().format("%m-%d+%H_%M_%S").to_string();
            PathBuf::from(format!("output-{time}"))
        });
        create_dir_all(&output_dir)?;
        Ok(output_dir)
    }

    /// 输出评测结果，并在输出目录中保存一份 YAML
    pub fn report_metric(&self, metric: &Metric, output_dir: &Path) -> Result<()> {
        if self.args.json {
            let text = serde_json::to_string_pretty(metric)
                .map_err(|e| Error::from(format!("JSON 序列化失败：{e}")))?;
            println!("{text}");
        } else {
            print!("{metric}");
        }
        let path = output_dir.join("metric.yaml");
        write(&path, serde_yaml::to_string(metric)?)?;
        println!("评测结果保存在 {} 中", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_are_labelled() {
        let dir = std::env::temp_dir().join(format!("mcal-cli-{}", std::process::id()));
        create_dir_all(&dir).unwrap();
        let path = dir.join("projections.tsv");
        write(&path, "# 注释\nb0\t1\t2\t3\nb1\t0.5\t-0.5\n").unwrap();
        let rows = CommandLine::read_projections(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "b0");
        assert_eq!(rows[0].projections, Vector::new(vec![1.0, 2.0, 3.0]));
        assert_eq!(rows[1].projections.len(), 2);

        write(&path, "b0\t1\tx\n").unwrap();
        assert!(CommandLine::read_projections(&path).is_err());
    }
}
