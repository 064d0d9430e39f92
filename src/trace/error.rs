use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::net::AddressTableError;
use crate::topo::TopologyError;

/// 必需的输入文件不存在（在解析日志之前检查）
#[derive(Debug, Error)]
pub enum PreconditionError {
    #[error("required artifact {path} does not exist")]
    MissingArtifact { path: PathBuf },
}

/// 日志内部不一致，整个关联过程中止
#[derive(Debug, Error)]
pub enum CorrelationError {
    #[error("line {line}: `{content}` has no out from {node}")]
    NoPendingSend {
        line: usize,
        content: String,
        node: String,
        pkt_id: u64,
    },
    #[error("line {line}: source address {addr} is not in the address table")]
    UnknownAddress { line: usize, addr: String },
    #[error("line {line}: receive event without source address")]
    MissingAddress { line: usize },
    #[error("node {node} is not part of the topology")]
    UnknownNode { node: String },
    #[error("interrupted")]
    Interrupted,
}

/// 单个日志处理失败的原因
#[derive(Debug, Error)]
pub enum TraceError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error(transparent)]
    Correlation(#[from] CorrelationError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    AddressTable(#[from] AddressTableError),
    #[error("failed to read log: {0}")]
    Read(#[source] io::Error),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TraceError {
    pub fn is_interrupted(&self) -> bool {
        matches!(self, TraceError::Correlation(CorrelationError::Interrupted))
    }
}
