//! 日志关联
//!
//! 把实验日志转换成数据包收发表和节点统计表。不给日志路径时转换数据目录下
//! 所有符合命名约定的日志。

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use mesh_trace_rs::net::{AddressPrefixes, DEFAULT_GLOBAL_PREFIX};
use mesh_trace_rs::trace::{
    self, DEFAULT_EXP_PREFIX, LogNamePattern, Mode, RunInfo, TraceConfig, TraceError,
};
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "correlate", about = "把实验日志转换为 *.times.csv 和 *.stats.csv")]
struct Args {
    /// 要转换的日志；为空时转换数据目录下所有日志
    logs: Vec<PathBuf>,
    /// 拓扑、地址表所在目录
    #[arg(long, env = "DATA_PATH", default_value = "results")]
    data_path: PathBuf,
    /// 实验使用的全局地址前缀
    #[arg(long, env = "GLOBAL_PREFIX", default_value = DEFAULT_GLOBAL_PREFIX)]
    global_prefix: String,
    /// 日志文件名前缀
    #[arg(long, default_value = DEFAULT_EXP_PREFIX)]
    exp_prefix: String,
    /// 覆盖文件名中的网络名
    #[arg(long)]
    network: Option<String>,
    /// 覆盖文件名中的模式（reass 或 fwd）
    #[arg(long)]
    mode: Option<Mode>,
    /// 覆盖文件名中的负载长度
    #[arg(long)]
    data_len: Option<u32>,
}

fn main() -> ExitCode {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        warn!("收到中断信号，清理未完成的输出");
        flag.store(true, Ordering::Relaxed);
    }) {
        warn!(%err, "无法安装中断处理");
    }

    match run(&args, &cancel) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!(%err, "日志转换失败");
            ExitCode::FAILURE
        }
    }
}

/// 返回是否所有日志都转换成功
fn run(args: &Args, cancel: &AtomicBool) -> Result<bool, TraceError> {
    let config = TraceConfig {
        data_path: args.data_path.clone(),
        prefixes: AddressPrefixes::new(args.global_prefix.as_str()),
    };
    let pattern = match LogNamePattern::new(&args.exp_prefix) {
        Ok(pattern) => pattern,
        Err(err) => {
            error!(%err, prefix = %args.exp_prefix, "无效的日志名前缀");
            return Ok(false);
        }
    };

    if args.logs.is_empty() {
        let summary = trace::logs_to_csvs(&config, &pattern, cancel)?;
        for (log, err) in &summary.failed {
            println!("failed {}: {err}", log.display());
        }
        for outputs in &summary.converted {
            println!("{} {}", outputs.times.display(), outputs.stats.display());
        }
        return Ok(summary.failed.is_empty());
    }

    let mut ok = true;
    for log in &args.logs {
        let parsed = log
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| pattern.parse(name));
        let network = args
            .network
            .clone()
            .or_else(|| parsed.as_ref().map(|p| p.network.clone()));
        let mode = args.mode.or(parsed.as_ref().map(|p| p.mode));
        let data_len = args.data_len.or(parsed.as_ref().map(|p| p.data_len));
        let (Some(network), Some(mode), Some(data_len)) = (network, mode, data_len) else {
            error!(log = %log.display(), "无法从文件名确定网络/模式/负载长度，请显式指定");
            ok = false;
            continue;
        };

        let run = RunInfo {
            mode: mode.to_string(),
            data_len,
        };
        match trace::log_to_csvs(log, &network, run, &config, cancel) {
            Ok(outputs) => {
                info!(log = %log.display(), "转换完成");
                println!("{} {}", outputs.times.display(), outputs.stats.display());
            }
            Err(err) if err.is_interrupted() => return Err(err),
            Err(_) => ok = false,
        }
    }
    Ok(ok)
}
