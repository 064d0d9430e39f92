//! 节点地址表
//!
//! 实验期间为每个节点记录的接口号和 link-local 地址，CSV 格式：
//!
//! ```text
//! node,iface,lla
//! m3-12,7,fe80::1711:6b10:65fd:bd36
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub const LINK_LOCAL_PREFIX: &str = "fe80::";
pub const DEFAULT_GLOBAL_PREFIX: &str = "2001:db8:0:1:";
pub const ADDRESS_TABLE_SUFFIX: &str = ".link_local.csv";

#[derive(Debug, Error)]
pub enum AddressTableError {
    #[error("failed to read address table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("address table {path} has no `{column}` column")]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("{path}:{line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

/// 全局前缀与 link-local 前缀之间的固定替换
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressPrefixes {
    pub global: String,
    pub link_local: String,
}

impl Default for AddressPrefixes {
    fn default() -> Self {
        Self::new(DEFAULT_GLOBAL_PREFIX)
    }
}

impl AddressPrefixes {
    pub fn new(global: impl Into<String>) -> Self {
        Self {
            global: global.into(),
            link_local: LINK_LOCAL_PREFIX.to_string(),
        }
    }

    /// 全局地址 → link-local 地址
    pub fn to_link_local(&self, addr: &str) -> String {
        addr.replace(&self.global, &self.link_local)
    }

    /// link-local 地址 → 全局地址
    pub fn to_global(&self, addr: &str) -> String {
        addr.replace(&self.link_local, &self.global)
    }
}

/// 地址表中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressEntry {
    pub node: String,
    pub iface: u32,
    pub lla: String,
}

#[derive(Debug, Clone, Default)]
pub struct AddressTable {
    entries: Vec<AddressEntry>,
    by_lla: HashMap<String, usize>,
}

impl AddressTable {
    pub fn from_entries(entries: impl IntoIterator<Item = AddressEntry>) -> Self {
        let mut table = Self::default();
        for entry in entries {
            table.insert(entry);
        }
        table
    }

    /// 同一 link-local 地址出现多次时保留第一行
    pub fn insert(&mut self, entry: AddressEntry) {
        let idx = self.entries.len();
        self.by_lla.entry(entry.lla.clone()).or_insert(idx);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[AddressEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按 link-local 地址查节点名
    pub fn node_by_lla(&self, lla: &str) -> Option<&str> {
        self.by_lla
            .get(lla)
            .map(|&idx| self.entries[idx].node.as_str())
    }

    /// 按全局地址查节点名（先转换成 link-local 形式）
    pub fn node_by_global(&self, addr: &str, prefixes: &AddressPrefixes) -> Option<&str> {
        self.node_by_lla(&prefixes.to_link_local(addr))
    }

    pub fn parse<R: BufRead>(reader: R, path: &Path) -> Result<Self, AddressTableError> {
        let io_err = |source| AddressTableError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut lines = reader.lines().enumerate();
        let header = match lines.next() {
            Some((_, line)) => line.map_err(io_err)?,
            None => String::new(),
        };
        let columns: Vec<&str> = header.trim().split(',').map(str::trim).collect();
        let column = |name: &'static str| {
            columns
                .iter()
                .position(|c| *c == name)
                .ok_or(AddressTableError::MissingColumn {
                    path: path.to_path_buf(),
                    column: name,
                })
        };
        let (node_col, iface_col, lla_col) = (column("node")?, column("iface")?, column("lla")?);

        let mut table = Self::default();
        for (idx, line) in lines {
            let line = line.map_err(io_err)?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
            let malformed = |reason: String| AddressTableError::Malformed {
                path: path.to_path_buf(),
                line: idx + 1,
                reason,
            };
            let field = |col: usize| {
                fields
                    .get(col)
                    .copied()
                    .ok_or_else(|| malformed(format!("missing column {col}")))
            };
            let iface = field(iface_col)?;
            let iface = iface
                .parse()
                .map_err(|_| malformed(format!("invalid interface `{iface}`")))?;
            table.insert(AddressEntry {
                node: field(node_col)?.to_string(),
                iface,
                lla: field(lla_col)?.to_string(),
            });
        }
        debug!(path = %path.display(), rows = table.len(), "address table loaded");
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self, AddressTableError> {
        let file = fs::File::open(path).map_err(|source| AddressTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(BufReader::new(file), path)
    }
}

/// `dir/{network}.link_local.csv`
pub fn address_table_path(dir: &Path, network: &str) -> PathBuf {
    dir.join(format!("{network}{ADDRESS_TABLE_SUFFIX}"))
}
