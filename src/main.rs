//! mcal: 基向量代价评测［命令行版］
//!
//! 用户提供配置文件（指定代价函数及其参数）和投影表，本程序计算每个基向量的代价，
//! 也可以把代价函数保存为二进制文件，或者检查已有的文件。

use clap::Parser;
use mcal::costs::{persist, registry};
use mcal::metric::evaluate_parallel;
use mcal::{Command, CommandLine, CommandLineArgs, Error};
use tracing::{info, Level};

fn main() -> Result<(), Error> {
    let args = CommandLineArgs::parse();
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    registry::register_defaults();
    let cli = CommandLine::new(args.clone());
    match args.command {
        Command::Evaluate {
            projections,
            bases,
            threads,
            output,
        } => {
            let config = cli.read_config()?;
            let cost = config.build_cost()?;
            let rows = CommandLine::read_projections(&projections)?;
            let bases = bases
                .map(|path| CommandLine::read_bases(&path))
                .transpose()?;
            let threads = threads.unwrap_or_else(|| config.threads());
            info!("使用 {} 计算 {} 个基向量的代价", cost, rows.len());
            let metric = evaluate_parallel(
                cost.as_ref(),
                &rows,
                bases.as_deref(),
                config.use_variance(),
                threads,
            )?;
            let output_dir = CommandLine::output_dir(output)?;
            cli.report_metric(&metric, &output_dir)?;
        }
        Command::Save { output } => {
            let config = cli.read_config()?;
            let cost = config.build_cost()?;
            persist::save(&output, cost.as_ref())?;
            println!("已将 {} 保存到 {} 中", cost, output.display());
        }
        Command::Inspect { file } => {
            let (header, cost) = persist::load_record(&file)?;
            println!("{cost}");
            println!(
                "类型：{}；文件中的版本：{}（当前版本 {}）；记录格式版本：{}；可使用方差：{}",
                header.type_name,
                header.version,
                cost.version_no(),
                header.format_version,
                cost.can_use_variance()
            );
        }
        Command::Validate => {
            let mut config = cli.read_config()?;
            let cost = config.build_cost()?;
            config.set_cost(cost.as_ref());
            println!("配置正确，代价函数为 {cost}");
            print!("{}", config.to_yaml()?);
        }
        Command::Variants => {
            for name in registry::known_variants() {
                println!("{name}");
            }
        }
    }
    Ok(())
}
