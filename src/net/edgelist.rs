//! 拓扑持久化
//!
//! 每行一条带权边：`<a> <b> {'weight': <w>}`。读取时也接受 `<a> <b> <w>`
//! 和不带权重的 `<a> <b>`。文件名由网络名决定：`{network}.edgelist`，
//! 网络名为 `{sink}x{digest}`，digest 由节点数和排序后的边集计算。

use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::graph::NetworkGraph;

pub const EDGELIST_SUFFIX: &str = ".edgelist";

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("failed to access edge list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path}:{line}: malformed edge `{content}`")]
    Malformed {
        path: PathBuf,
        line: usize,
        content: String,
    },
}

impl NetworkGraph {
    /// 网络名：`{sink}x{digest}`
    pub fn network_name(&self) -> String {
        format!("{}x{}", self.sink_name(), self.digest())
    }

    /// 与节点数和边集相关、与加边顺序无关的稳定摘要
    pub fn digest(&self) -> String {
        let mut lines: Vec<String> = self
            .edges()
            .iter()
            .map(|e| {
                let (a, b) = (self.name(e.a), self.name(e.b));
                let (a, b) = if a <= b { (a, b) } else { (b, a) };
                format!("{a} {b} {}", e.weight)
            })
            .collect();
        lines.sort();

        let mut h = mix64(self.len() as u64);
        for line in &lines {
            for byte in line.bytes().chain(std::iter::once(b'\n')) {
                h = mix64(h ^ u64::from(byte));
            }
        }
        format!("{h:x}")
    }

    /// 写出带权边表
    pub fn write_edgelist<W: Write>(&self, mut w: W) -> io::Result<()> {
        for e in self.edges() {
            writeln!(
                w,
                "{} {} {{'weight': {}}}",
                self.name(e.a),
                self.name(e.b),
                e.weight
            )?;
        }
        w.flush()
    }

    /// 保存到 `dir/{network}.edgelist`，返回文件路径
    pub fn save_edgelist(&self, dir: &Path) -> Result<PathBuf, GraphError> {
        let path = edgelist_path(dir, &self.network_name());
        let io_err = |source| GraphError::Io {
            path: path.clone(),
            source,
        };
        let file = fs::File::create(&path).map_err(io_err)?;
        self.write_edgelist(io::BufWriter::new(file)).map_err(io_err)?;
        info!(path = %path.display(), edges = self.edges().len(), "saved edge list");
        Ok(path)
    }

    /// 从边表读回拓扑；`sink` 只决定根节点，不检查是否出现在边表中
    pub fn read_edgelist<R: BufRead>(
        sink: &str,
        reader: R,
        path: &Path,
    ) -> Result<Self, GraphError> {
        let mut graph = NetworkGraph::new(sink);
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| GraphError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let content = line.trim();
            if content.is_empty() || content.starts_with('#') {
                continue;
            }
            let malformed = || GraphError::Malformed {
                path: path.to_path_buf(),
                line: idx + 1,
                content: content.to_string(),
            };
            let (a, b, weight) = parse_edge(content).ok_or_else(malformed)?;
            graph.add_edge(a, b, weight);
        }
        debug!(nodes = graph.len(), edges = graph.edges().len(), "edge list parsed");
        Ok(graph)
    }

    /// 读取 `path` 指向的边表
    pub fn load_edgelist(sink: &str, path: &Path) -> Result<Self, GraphError> {
        let file = fs::File::open(path).map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::read_edgelist(sink, BufReader::new(file), path)
    }
}

/// `dir/{network}.edgelist`
pub fn edgelist_path(dir: &Path, network: &str) -> PathBuf {
    dir.join(format!("{network}{EDGELIST_SUFFIX}"))
}

/// 从网络名中取出 sink 名（`m3-12xdeadbeef` → `m3-12`）
pub fn sink_of_network(network: &str) -> &str {
    network.split_once('x').map_or(network, |(sink, _)| sink)
}

fn parse_edge(content: &str) -> Option<(&str, &str, f64)> {
    let mut parts = content.splitn(3, char::is_whitespace);
    let a = parts.next()?;
    let b = parts.next()?.trim();
    if b.is_empty() {
        return None;
    }
    let weight = match parts.next().map(str::trim) {
        None | Some("") | Some("{}") => 1.0,
        Some(rest) => parse_weight(rest)?,
    };
    Some((a, b, weight))
}

fn parse_weight(rest: &str) -> Option<f64> {
    if let Ok(w) = rest.parse() {
        return Some(w);
    }
    let body = rest.strip_prefix('{')?.strip_suffix('}')?;
    let (key, value) = body.split_once(':')?;
    let key = key.trim().trim_matches(|c| c == '\'' || c == '"');
    if key != "weight" {
        return None;
    }
    value.trim().parse().ok()
}

/// splitmix64
fn mix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
