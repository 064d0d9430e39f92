//! 拓扑构建
//!
//! 从节点清单中以指定 sink 为根随机构建一个多跳网络，保存边表和布局图。

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mesh_trace_rs::topo::{self, ARCHI_FULL, ARCHI_SHORT, Roster, SynthOpts};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "synthesize", about = "从节点清单构建以 sink 为根的受约束多跳拓扑")]
struct Args {
    /// sink 节点编号（例如 12 表示 m3-12）
    sink: u32,
    /// 节点清单（JSON）
    #[arg(long)]
    roster: PathBuf,
    /// 参与构建的节点架构
    #[arg(long, default_value = ARCHI_FULL)]
    archi: String,
    /// 节点名前缀
    #[arg(long, default_value = ARCHI_SHORT)]
    archi_short: String,
    #[arg(long = "min-distance", default_value_t = 2.2)]
    min_distance: f64,
    #[arg(long = "max-distance", default_value_t = 6.5)]
    max_distance: f64,
    /// 每个节点的下游邻居数下限
    #[arg(long = "min-neighbors", default_value_t = 1)]
    min_neighbors: usize,
    /// 每个节点的下游邻居数上限
    #[arg(long = "max-neighbors", default_value_t = 3)]
    max_neighbors: usize,
    #[arg(short = 'N', long, default_value_t = 50)]
    max_nodes: usize,
    /// 随机种子；不指定时随机生成并打印
    #[arg(long)]
    seed: Option<u64>,
    /// 输出目录
    #[arg(long, env = "DATA_PATH", default_value = "results")]
    data_path: PathBuf,
}

fn main() -> ExitCode {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "拓扑构建失败");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), topo::TopologyError> {
    let roster = Roster::load(&args.roster)?.with_archi(&args.archi);
    let sink = topo::node_name(&args.archi_short, args.sink);
    let opts = SynthOpts {
        min_distance: args.min_distance,
        max_distance: args.max_distance,
        min_neighbors: args.min_neighbors,
        max_neighbors: args.max_neighbors,
        max_nodes: args.max_nodes,
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, sink = %sink, "使用随机种子");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    std::fs::create_dir_all(&args.data_path).map_err(|source| topo::TopologyError::Io {
        path: args.data_path.clone(),
        source,
    })?;
    let (graph, path) = topo::construct_network(&roster, &sink, &opts, &mut rng, &args.data_path)?;

    println!(
        "network={} nodes={} edges={} seed={} edgelist={}",
        graph.network_name(),
        graph.len(),
        graph.edges().len(),
        seed,
        path.display()
    );
    Ok(())
}
