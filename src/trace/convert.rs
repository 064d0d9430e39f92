//! 日志 → CSV 转换
//!
//! 检查前置文件、打开输出、关联、写出；任何失败（包括中断）都会删除本次日志的输出文件。

use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use tracing::{error, info, warn};

use super::correlate::{RunInfo, correlate};
use super::error::{PreconditionError, TraceError};
use super::log_name::LogNamePattern;
use super::output::{OutputFiles, write_stats, write_times};
use crate::net::{AddressPrefixes, AddressTable, address_table_path, edgelist_path, sink_of_network};
use crate::topo::load_network;

/// 关联所需的共享配置
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// 拓扑、地址表和日志所在目录
    pub data_path: PathBuf,
    pub prefixes: AddressPrefixes,
}

/// 批量转换结果
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub converted: Vec<OutputFiles>,
    pub failed: Vec<(PathBuf, TraceError)>,
}

fn require(path: PathBuf) -> Result<PathBuf, PreconditionError> {
    if path.exists() {
        Ok(path)
    } else {
        Err(PreconditionError::MissingArtifact { path })
    }
}

/// 把一份日志转换成 `*.times.csv` 和 `*.stats.csv`
#[tracing::instrument(skip(config, run, cancel), fields(log = %log.display()))]
pub fn log_to_csvs(
    log: &Path,
    network: &str,
    run: RunInfo,
    config: &TraceConfig,
    cancel: &AtomicBool,
) -> Result<OutputFiles, TraceError> {
    let edgelist = require(edgelist_path(&config.data_path, network))?;
    let table = require(address_table_path(&config.data_path, network))?;

    let outputs = OutputFiles::for_log(log);
    info!(
        times = %outputs.times.display(),
        stats = %outputs.stats.display(),
        "converting log"
    );
    match convert(log, network, run, &edgelist, &table, &outputs, config, cancel) {
        Ok(()) => Ok(outputs),
        Err(err) => {
            outputs.discard();
            error!(%err, "conversion aborted");
            Err(err)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn convert(
    log: &Path,
    network: &str,
    run: RunInfo,
    edgelist: &Path,
    table: &Path,
    outputs: &OutputFiles,
    config: &TraceConfig,
    cancel: &AtomicBool,
) -> Result<(), TraceError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| TraceError::Io { path, source }
    };
    let reader = BufReader::new(fs::File::open(log).map_err(io_err(log))?);
    let times_file = fs::File::create(&outputs.times).map_err(io_err(&outputs.times))?;
    let stats_file = fs::File::create(&outputs.stats).map_err(io_err(&outputs.stats))?;

    let graph = load_network(sink_of_network(network), edgelist)?;
    let addresses = AddressTable::load(table)?;
    let result = correlate(reader, &graph, &addresses, &config.prefixes, run, cancel)?;

    write_times(BufWriter::new(times_file), &result.packets).map_err(io_err(&outputs.times))?;
    write_stats(BufWriter::new(stats_file), &result.stats).map_err(io_err(&outputs.stats))?;
    Ok(())
}

/// 转换数据目录下所有符合命名约定的日志
///
/// 单个日志失败只记录并跳过；中断会终止整个批次。
pub fn logs_to_csvs(
    config: &TraceConfig,
    pattern: &LogNamePattern,
    cancel: &AtomicBool,
) -> Result<BatchSummary, TraceError> {
    let dir = &config.data_path;
    let entries = fs::read_dir(dir).map_err(|source| TraceError::Io {
        path: dir.clone(),
        source,
    })?;
    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    names.sort();

    let mut summary = BatchSummary::default();
    for name in names {
        let Some(log_name) = pattern.parse(&name) else {
            continue;
        };
        let path = dir.join(&name);
        match log_to_csvs(&path, &log_name.network, log_name.run_info(), config, cancel) {
            Ok(outputs) => summary.converted.push(outputs),
            Err(err) if err.is_interrupted() => return Err(err),
            Err(err) => {
                warn!(log = %path.display(), %err, "skipping log");
                summary.failed.push((path, err));
            }
        }
    }
    info!(
        converted = summary.converted.len(),
        failed = summary.failed.len(),
        "batch finished"
    );
    Ok(summary)
}
