//! 单遍日志关联
//!
//! 顺序读取一次日志：`out`/`err` 行登记待匹配的发送，`in` 行通过地址表找到源节点
//! 并与对应的发送合并；状态行累积到各节点的计数中。扫描结束后再根据拓扑补上
//! 跳数和子节点数。

use std::collections::HashMap;
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, trace, warn};

use super::error::{CorrelationError, TraceError};
use super::line::{self, DataEvent, LineEvent};
use super::record::{Direction, NodeStats, PacketRecord};
use crate::net::{AddressPrefixes, AddressTable, NetworkGraph};

/// 本次运行的实验参数（来自日志文件名）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInfo {
    pub mode: String,
    pub data_len: u32,
}

/// 关联结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Correlation {
    /// 按第一次出现的顺序排列
    pub packets: Vec<PacketRecord>,
    /// 每个拓扑节点一行，顺序与图中节点顺序一致
    pub stats: Vec<NodeStats>,
}

pub struct Correlator<'a> {
    graph: &'a NetworkGraph,
    addresses: &'a AddressTable,
    prefixes: &'a AddressPrefixes,
    run: RunInfo,
    started: bool,
    line_no: usize,
    packets: Vec<PacketRecord>,
    /// (源节点, 包号) → `packets` 下标
    pending: HashMap<(String, u64), usize>,
    /// 下标为图中的 NodeId
    stats: Vec<NodeStats>,
}

impl<'a> Correlator<'a> {
    pub fn new(
        graph: &'a NetworkGraph,
        addresses: &'a AddressTable,
        prefixes: &'a AddressPrefixes,
        run: RunInfo,
    ) -> Self {
        Self {
            graph,
            addresses,
            prefixes,
            run,
            started: false,
            line_no: 0,
            packets: Vec::new(),
            pending: HashMap::new(),
            stats: graph.names().iter().map(NodeStats::new).collect(),
        }
    }

    pub fn started(&self) -> bool {
        self.started
    }

    /// 处理一行日志
    pub fn feed(&mut self, line: &str) -> Result<(), CorrelationError> {
        self.line_no += 1;
        if !self.started {
            if line::is_experiment_start(line) {
                info!(line = self.line_no, "▶️  实验开始");
                self.started = true;
            }
            return Ok(());
        }

        let Some(event) = line::classify(line) else {
            return Ok(());
        };
        trace!(line = self.line_no, ?event, "匹配日志行");
        match event {
            LineEvent::Data(ev) => self.on_data(ev, line)?,
            LineEvent::Retransmissions { node, count } => {
                if let Some(stats) = self.stats_mut(node) {
                    stats.record_retrans(count);
                }
            }
            LineEvent::PktbufSize { node, size } => {
                if let Some(stats) = self.stats_mut(node) {
                    stats.pktbuf_size = Some(size);
                }
            }
            LineEvent::PktbufUsage { node, usage } => {
                if let Some(stats) = self.stats_mut(node) {
                    stats.pktbuf_usage = Some(usage);
                }
            }
            LineEvent::RbufFull { node, count } => {
                if let Some(stats) = self.stats_mut(node) {
                    stats.rbuf_full = Some(count);
                }
            }
            LineEvent::VrbFull { node, count } => {
                if let Some(stats) = self.stats_mut(node) {
                    stats.vrb_full = Some(count);
                }
            }
        }
        Ok(())
    }

    fn on_data(&mut self, ev: DataEvent<'_>, line: &str) -> Result<(), CorrelationError> {
        match ev.dir {
            Direction::Out | Direction::Err => {
                let key = (ev.node.to_string(), ev.pkt_id);
                let idx = match self.pending.get(&key) {
                    Some(&idx) => idx,
                    None => {
                        let idx = self.packets.len();
                        self.packets.push(PacketRecord::new(
                            self.run.mode.clone(),
                            self.run.data_len,
                            ev.node,
                            ev.pkt_id,
                        ));
                        self.pending.insert(key, idx);
                        idx
                    }
                };
                let errno = match ev.dir {
                    Direction::Err => ev.errno.unwrap_or(0),
                    _ => 0,
                };
                let record = &mut self.packets[idx];
                record.send_time = Some(ev.time);
                record.send_errno = Some(errno);
            }
            Direction::In => {
                let addr = ev.addr.ok_or(CorrelationError::MissingAddress { line: self.line_no })?;
                let addresses = self.addresses;
                let src = addresses.node_by_global(addr, self.prefixes).ok_or_else(|| {
                    CorrelationError::UnknownAddress {
                        line: self.line_no,
                        addr: addr.to_string(),
                    }
                })?;
                let Some(&idx) = self.pending.get(&(src.to_string(), ev.pkt_id)) else {
                    return Err(CorrelationError::NoPendingSend {
                        line: self.line_no,
                        content: line.trim().to_string(),
                        node: src.to_string(),
                        pkt_id: ev.pkt_id,
                    });
                };
                let record = &mut self.packets[idx];
                if record.recv_time.is_some() {
                    debug!(src, pkt_id = ev.pkt_id, "重复接收，保留最新一次");
                }
                record.dst = Some(ev.node.to_string());
                record.src_addr = Some(addr.to_string());
                record.recv_time = Some(ev.time);
            }
        }
        Ok(())
    }

    fn stats_mut(&mut self, node: &str) -> Option<&mut NodeStats> {
        match self.graph.id(node) {
            Some(id) => Some(&mut self.stats[id.0]),
            None => {
                debug!(node, line = self.line_no, "节点不在拓扑中，忽略");
                None
            }
        }
    }

    /// 扫描结束：目的地统一为 sink，补上跳数和子节点数
    pub fn finish(mut self) -> Result<Correlation, CorrelationError> {
        if !self.started {
            warn!("未找到实验开始标记，日志中没有可用的行");
        }
        let graph = self.graph;
        let hops = graph.hops_to_sink();
        let sink = graph.sink_name();

        for record in &mut self.packets {
            let id = graph.id(&record.src).ok_or_else(|| CorrelationError::UnknownNode {
                node: record.src.clone(),
            })?;
            record.dst = Some(sink.to_string());
            record.hops_to_sink = hops[id.0];
        }

        let successors = graph.successor_counts();
        for id in graph.nodes() {
            let stats = &mut self.stats[id.0];
            stats.hops_to_sink = hops[id.0];
            stats.successors = Some(successors[id.0]);
        }

        let received = self.packets.iter().filter(|p| p.is_received()).count();
        info!(
            packets = self.packets.len(),
            received,
            nodes = self.stats.len(),
            "关联完成"
        );
        Ok(Correlation {
            packets: self.packets,
            stats: self.stats,
        })
    }
}

/// 关联一份完整日志
///
/// 每读一行检查一次 `cancel`，被置位时以 [`CorrelationError::Interrupted`] 结束。
#[tracing::instrument(skip_all, fields(sink = graph.sink_name(), mode = %run.mode, data_len = run.data_len))]
pub fn correlate<R: BufRead>(
    reader: R,
    graph: &NetworkGraph,
    addresses: &AddressTable,
    prefixes: &AddressPrefixes,
    run: RunInfo,
    cancel: &AtomicBool,
) -> Result<Correlation, TraceError> {
    let mut correlator = Correlator::new(graph, addresses, prefixes, run);
    for raw in reader.split(b'\n') {
        if cancel.load(Ordering::Relaxed) {
            return Err(CorrelationError::Interrupted.into());
        }
        let raw = raw.map_err(TraceError::Read)?;
        let line = String::from_utf8_lossy(&raw);
        correlator.feed(line.trim_end_matches('\r'))?;
    }
    Ok(correlator.finish()?)
}
