//! 实验日志命名约定
//!
//! `{prefix}_n{network}_c{channel}__m{mode}_r{data_len}Bx{count}x{delay}ms_{timestamp}.log`，
//! 例如 `lcn19_nm3-12x1f3a_c26__mfwd_r16Bx100x10000ms_1556530712.log`。

use std::fmt;
use std::str::FromStr;

use regex::Regex;

use super::correlate::RunInfo;

pub const DEFAULT_EXP_PREFIX: &str = "lcn19";

/// 分片处理模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// 逐跳重组
    Reass,
    /// 分片转发
    Fwd,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Reass => "reass",
            Mode::Fwd => "fwd",
        })
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reass" => Ok(Mode::Reass),
            "fwd" => Ok(Mode::Fwd),
            other => Err(format!("unknown mode `{other}` (expected reass or fwd)")),
        }
    }
}

/// 从日志文件名中解析出的实验参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogName {
    pub network: String,
    pub channel: u32,
    pub mode: Mode,
    pub data_len: u32,
    pub count: u32,
    pub delay_ms: u32,
    pub timestamp: u64,
}

impl LogName {
    pub fn run_info(&self) -> RunInfo {
        RunInfo {
            mode: self.mode.to_string(),
            data_len: self.data_len,
        }
    }

    /// 不带 `.log` 后缀的文件名
    pub fn file_stem(&self, prefix: &str) -> String {
        format!(
            "{prefix}_n{}_c{}__m{}_r{}Bx{}x{}ms_{}",
            self.network,
            self.channel,
            self.mode,
            self.data_len,
            self.count,
            self.delay_ms,
            self.timestamp
        )
    }
}

pub struct LogNamePattern {
    re: Regex,
}

impl LogNamePattern {
    pub fn new(prefix: &str) -> Result<Self, regex::Error> {
        let re = Regex::new(&format!(
            r"^{}_n(?P<network>[a-z0-9]+-\d+x[0-9a-f]+)_c(?P<channel>\d+)__m(?P<mode>reass|fwd)_r(?P<data_len>\d+)Bx(?P<count>\d+)x(?P<delay>\d+)ms_(?P<timestamp>\d+)\.log$",
            regex::escape(prefix)
        ))?;
        Ok(Self { re })
    }

    /// 文件名不符合约定时返回 `None`
    pub fn parse(&self, file_name: &str) -> Option<LogName> {
        let caps = self.re.captures(file_name)?;
        let field = |name: &str| caps.name(name).map(|m| m.as_str());
        Some(LogName {
            network: field("network")?.to_string(),
            channel: field("channel")?.parse().ok()?,
            mode: field("mode")?.parse().ok()?,
            data_len: field("data_len")?.parse().ok()?,
            count: field("count")?.parse().ok()?,
            delay_ms: field("delay")?.parse().ok()?,
            timestamp: field("timestamp")?.parse().ok()?,
        })
    }
}
