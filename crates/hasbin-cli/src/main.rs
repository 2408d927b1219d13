use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hasbin_core::{load_profile, locate_binary, parse_json, scan_and_write, Environment, ScanOptions, DEFAULT_NAME_PATTERN};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "hasbin", version, about = "检测 JSON 文档中是否含有二进制数据")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 扫描目录下的文档并生成结果 JSON
    Scan {
        /// 输入目录
        #[arg(long)]
        input: PathBuf,

        /// 输出文件（JSON 数组）
        #[arg(long, default_value = "./result.json")]
        output: PathBuf,

        /// 线程数（"auto"=CPU 核心数）
        #[arg(long, default_value = "auto")]
        threads: String,

        /// 最大扫描文件大小（单位字节）
        #[arg(long)]
        max_file_size: Option<u64>,

        /// 文件名过滤正则
        #[arg(long, default_value = DEFAULT_NAME_PATTERN)]
        pattern: String,

        /// 运行环境配置（TOML），缺省为具备全部能力的宿主
        #[arg(long)]
        env: Option<PathBuf>,
    },
    /// 检测单个文档，打印 true / false 及首个命中路径
    Check {
        /// 文档路径
        file: PathBuf,

        /// 运行环境配置（TOML）
        #[arg(long)]
        env: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { input, output, threads, max_file_size, pattern, env } => {
            info!(?input, ?output, "starting scan");

            let environment = load_environment(env.as_deref())?;
            let mut out = BufWriter::new(File::create(&output).context("create output file")?);

            let opts = ScanOptions { max_file_size, name_pattern: pattern, environment, threads: parse_threads(&threads) };
            let stats = scan_and_write(&input, &mut out, &opts).context("scan and write failed")?;
            out.flush().context("flush output file")?;

            info!(
                files_scanned = stats.files_scanned,
                files_with_binary = stats.files_with_binary,
                files_skipped = stats.files_skipped,
                files_failed = stats.files_failed,
                "scan finished"
            );
        }
        Commands::Check { file, env } => {
            let environment = load_environment(env.as_deref())?;
            let text = std::fs::read_to_string(&file).with_context(|| format!("read {}", file.display()))?;
            let value = parse_json(&text).with_context(|| format!("decode {}", file.display()))?;
            match locate_binary(&value, &environment) {
                Some(m) => println!("true\t{m}"),
                None => println!("false"),
            }
        }
    }

    Ok(())
}

fn load_environment(path: Option<&Path>) -> Result<Environment> {
    match path {
        Some(p) => load_profile(p).context("load environment profile"),
        None => Ok(Environment::default()),
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 日志写 stderr，避免混入 check 的标准输出
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).with_writer(std::io::stderr).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 解析线程参数
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") { return None; }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}
