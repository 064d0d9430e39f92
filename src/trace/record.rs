//! 日志关联的输出记录

use std::fmt;

/// 数据事件方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// 源节点成功发出
    Out,
    /// 源节点发送失败（带错误码）
    Err,
    /// sink 收到
    In,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "out" => Some(Direction::Out),
            "err" => Some(Direction::Err),
            "in" => Some(Direction::In),
            _ => None,
        }
    }

    pub fn is_send(self) -> bool {
        matches!(self, Direction::Out | Direction::Err)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Out => "out",
            Direction::Err => "err",
            Direction::In => "in",
        })
    }
}

/// 一个数据包（源节点, 包号）的收发记录
#[derive(Debug, Clone, PartialEq)]
pub struct PacketRecord {
    pub mode: String,
    pub data_len: u32,
    pub src: String,
    /// 收包节点；收尾阶段统一改写为 sink
    pub dst: Option<String>,
    pub hops_to_sink: Option<usize>,
    pub pkt_id: u64,
    /// sink 看到的源地址（全局地址）
    pub src_addr: Option<String>,
    pub send_time: Option<f64>,
    pub recv_time: Option<f64>,
    pub send_errno: Option<i32>,
}

impl PacketRecord {
    pub fn new(mode: impl Into<String>, data_len: u32, src: impl Into<String>, pkt_id: u64) -> Self {
        Self {
            mode: mode.into(),
            data_len,
            src: src.into(),
            dst: None,
            hops_to_sink: None,
            pkt_id,
            src_addr: None,
            send_time: None,
            recv_time: None,
            send_errno: None,
        }
    }

    pub fn is_received(&self) -> bool {
        self.recv_time.is_some()
    }
}

/// 单个节点的运行计数
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeStats {
    pub node: String,
    pub hops_to_sink: Option<usize>,
    pub successors: Option<usize>,
    /// 所有快照中的最大值
    pub l2_retrans: Option<u64>,
    pub pktbuf_usage: Option<u64>,
    pub pktbuf_size: Option<u64>,
    pub rbuf_full: Option<u64>,
    pub vrb_full: Option<u64>,
}

impl NodeStats {
    pub fn new(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            ..Self::default()
        }
    }

    /// 记录一次重传计数快照（快照可能乱序到达，只保留最大值）
    pub fn record_retrans(&mut self, count: u64) {
        self.l2_retrans = Some(self.l2_retrans.map_or(count, |cur| cur.max(count)));
    }
}
