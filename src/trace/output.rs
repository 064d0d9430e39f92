//! 关联结果输出
//!
//! 两张以 `;` 分隔的表，文件名由日志名派生：`foo.log` → `foo.times.csv` / `foo.stats.csv`。
//! 缺失的字段写成空串。

use std::fmt::Display;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::record::{NodeStats, PacketRecord};

pub const TIMES_FIELDS: [&str; 10] = [
    "mode",
    "data_len",
    "src",
    "dst",
    "hops_to_sink",
    "pkt_id",
    "src_addr",
    "send_time",
    "recv_time",
    "send_errno",
];

pub const STATS_FIELDS: [&str; 8] = [
    "node",
    "hops_to_sink",
    "successors",
    "l2_retrans",
    "pktbuf_usage",
    "pktbuf_size",
    "rbuf_full",
    "vrb_full",
];

const DELIMITER: &str = ";";

/// 一份日志对应的两个输出文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub times: PathBuf,
    pub stats: PathBuf,
}

impl OutputFiles {
    pub fn for_log(log: &Path) -> Self {
        let log = log.to_string_lossy();
        let stem = log.strip_suffix("log").unwrap_or(&log);
        let stem = if stem.ends_with('.') {
            stem.to_string()
        } else {
            format!("{stem}.")
        };
        Self {
            times: PathBuf::from(format!("{stem}times.csv")),
            stats: PathBuf::from(format!("{stem}stats.csv")),
        }
    }

    /// 删除（可能只写了一半的）输出文件
    pub fn discard(&self) {
        for path in [&self.times, &self.stats] {
            match fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "removed partial output"),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => warn!(path = %path.display(), %err, "failed to remove partial output"),
            }
        }
    }

    pub fn exist(&self) -> bool {
        self.times.exists() || self.stats.exists()
    }
}

fn opt<T: Display>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// 时间戳按浮点数写出，整数值保留 `.0`
fn time(value: &Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 && v.is_finite() => format!("{v:.1}"),
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

fn write_row<W: Write>(w: &mut W, fields: &[String]) -> io::Result<()> {
    writeln!(w, "{}", fields.join(DELIMITER))
}

pub fn write_times<W: Write>(mut w: W, packets: &[PacketRecord]) -> io::Result<()> {
    writeln!(w, "{}", TIMES_FIELDS.join(DELIMITER))?;
    for p in packets {
        write_row(
            &mut w,
            &[
                p.mode.clone(),
                p.data_len.to_string(),
                p.src.clone(),
                opt(&p.dst),
                opt(&p.hops_to_sink),
                p.pkt_id.to_string(),
                opt(&p.src_addr),
                time(&p.send_time),
                time(&p.recv_time),
                opt(&p.send_errno),
            ],
        )?;
    }
    w.flush()
}

pub fn write_stats<W: Write>(mut w: W, stats: &[NodeStats]) -> io::Result<()> {
    writeln!(w, "{}", STATS_FIELDS.join(DELIMITER))?;
    for s in stats {
        write_row(
            &mut w,
            &[
                s.node.clone(),
                opt(&s.hops_to_sink),
                opt(&s.successors),
                opt(&s.l2_retrans),
                opt(&s.pktbuf_usage),
                opt(&s.pktbuf_size),
                opt(&s.rbuf_full),
                opt(&s.vrb_full),
            ],
        )?;
    }
    w.flush()
}
