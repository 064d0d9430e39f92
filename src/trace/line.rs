//! 日志行分类
//!
//! 按固定优先级依次尝试每一种行格式，第一个匹配的格式消费该行。
//! 每种格式把正则捕获转换成带类型的 [`LineEvent`]。

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use super::record::Direction;

/// 实验开始标记，之前的行全部忽略
pub const EXPERIMENT_STARTED: &str = "starting experiment";

const NODE: &str = r"[a-z0-9]+-\d+";

/// 一行日志解析出的事件
#[derive(Debug, Clone, PartialEq)]
pub enum LineEvent<'a> {
    Data(DataEvent<'a>),
    Retransmissions { node: &'a str, count: u64 },
    PktbufSize { node: &'a str, size: u64 },
    PktbufUsage { node: &'a str, usage: u64 },
    RbufFull { node: &'a str, count: u64 },
    VrbFull { node: &'a str, count: u64 },
}

/// `out`/`err`/`in` 数据行
#[derive(Debug, Clone, PartialEq)]
pub struct DataEvent<'a> {
    pub time: f64,
    /// 打印该行的节点（`in` 时为 sink）
    pub node: &'a str,
    pub dir: Direction,
    pub pkt_id: u64,
    /// `in` 行携带的源地址（全局地址）
    pub addr: Option<&'a str>,
    /// `err` 行携带的错误码
    pub errno: Option<i32>,
}

type Parse = for<'t> fn(&Captures<'t>) -> Option<LineEvent<'t>>;

/// 一种行格式：正则 + 类型化解析
pub struct LinePattern {
    pub name: &'static str,
    re: Regex,
    parse: Parse,
}

impl LinePattern {
    fn new(name: &'static str, pattern: &str, parse: Parse) -> Self {
        Self {
            name,
            re: Regex::new(pattern).expect("static line pattern"),
            parse,
        }
    }

    pub fn matches<'t>(&self, line: &'t str) -> Option<LineEvent<'t>> {
        let caps = self.re.captures(line)?;
        (self.parse)(&caps)
    }
}

static PATTERNS: LazyLock<Vec<LinePattern>> = LazyLock::new(|| {
    vec![
        LinePattern::new(
            "data",
            &format!(
                r"^(?P<time>\d+\.\d+);(?P<node>{NODE});(?:> ?)?(?P<dir>in|out|err);(?P<pkt_id>[0-9a-f]+)(?:;(?P<addr>[0-9a-f:]+);\d+|;(?P<errno>-?\d+))?"
            ),
            parse_data,
        ),
        LinePattern::new(
            "retransmissions",
            &format!(
                r"(?P<node>{NODE});\s+TX succeeded \d+ errors \d+ retransmissions (?P<n>\d+)"
            ),
            parse_retrans,
        ),
        LinePattern::new(
            "pktbuf_size",
            &format!(
                r"(?P<node>{NODE});packet buffer: first byte: 0x[0-9a-f]+, last byte: 0x[0-9a-f]+ \(size: (?P<n>\d+)\)"
            ),
            parse_pktbuf_size,
        ),
        LinePattern::new(
            "pktbuf_usage",
            &format!(r"(?P<node>{NODE});  position of last byte used: (?P<n>\d+)"),
            parse_pktbuf_usage,
        ),
        LinePattern::new(
            "rbuf_full",
            &format!(r"(?P<node>{NODE});rbuf full: (?P<n>\d+)"),
            parse_rbuf_full,
        ),
        LinePattern::new(
            "vrb_full",
            &format!(r"(?P<node>{NODE});VRB full: (?P<n>\d+)"),
            parse_vrb_full,
        ),
    ]
});

/// 所有行格式（按优先级排列）
pub fn patterns() -> &'static [LinePattern] {
    &PATTERNS
}

/// 按优先级分类一行；都不匹配时返回 `None`
pub fn classify(line: &str) -> Option<LineEvent<'_>> {
    patterns().iter().find_map(|p| p.matches(line))
}

pub fn is_experiment_start(line: &str) -> bool {
    line.contains(EXPERIMENT_STARTED)
}

fn node<'t>(caps: &Captures<'t>) -> Option<&'t str> {
    caps.name("node").map(|m| m.as_str())
}

fn number<T: std::str::FromStr>(caps: &Captures<'_>, name: &str) -> Option<T> {
    caps.name(name)?.as_str().parse().ok()
}

fn parse_data<'t>(caps: &Captures<'t>) -> Option<LineEvent<'t>> {
    let raw_id = caps.name("pkt_id")?.as_str();
    let Ok(pkt_id) = u64::from_str_radix(raw_id, 16) else {
        debug!(line = &caps[0], pkt_id = raw_id, "包号超出范围，丢弃该行");
        return None;
    };
    Some(LineEvent::Data(DataEvent {
        time: number(caps, "time")?,
        node: node(caps)?,
        dir: Direction::parse(caps.name("dir")?.as_str())?,
        pkt_id,
        addr: caps.name("addr").map(|m| m.as_str()),
        errno: match caps.name("errno") {
            Some(m) => Some(m.as_str().parse().ok()?),
            None => None,
        },
    }))
}

fn parse_retrans<'t>(caps: &Captures<'t>) -> Option<LineEvent<'t>> {
    Some(LineEvent::Retransmissions {
        node: node(caps)?,
        count: number(caps, "n")?,
    })
}

fn parse_pktbuf_size<'t>(caps: &Captures<'t>) -> Option<LineEvent<'t>> {
    Some(LineEvent::PktbufSize {
        node: node(caps)?,
        size: number(caps, "n")?,
    })
}

fn parse_pktbuf_usage<'t>(caps: &Captures<'t>) -> Option<LineEvent<'t>> {
    Some(LineEvent::PktbufUsage {
        node: node(caps)?,
        usage: number(caps, "n")?,
    })
}

fn parse_rbuf_full<'t>(caps: &Captures<'t>) -> Option<LineEvent<'t>> {
    Some(LineEvent::RbufFull {
        node: node(caps)?,
        count: number(caps, "n")?,
    })
}

fn parse_vrb_full<'t>(caps: &Captures<'t>) -> Option<LineEvent<'t>> {
    Some(LineEvent::VrbFull {
        node: node(caps)?,
        count: number(caps, "n")?,
    })
}
