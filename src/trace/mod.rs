//! 日志关联模块
//!
//! 把实验期间串口汇总的原始日志还原成两张表：
//! - 每个数据包的发送/接收时间（`*.times.csv`）
//! - 每个节点的运行计数（`*.stats.csv`）

mod convert;
mod correlate;
mod error;
pub mod line;
mod log_name;
mod output;
mod record;

pub use convert::{BatchSummary, TraceConfig, log_to_csvs, logs_to_csvs};
pub use correlate::{Correlation, Correlator, RunInfo, correlate};
pub use error::{CorrelationError, PreconditionError, TraceError};
pub use line::{DataEvent, LineEvent};
pub use log_name::{DEFAULT_EXP_PREFIX, LogName, LogNamePattern, Mode};
pub use output::{OutputFiles, STATS_FIELDS, TIMES_FIELDS, write_stats, write_times};
pub use record::{Direction, NodeStats, PacketRecord};
