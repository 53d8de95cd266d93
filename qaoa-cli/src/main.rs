//! `qaoa-maxcut`: solve weighted Max-Cut on a generated or given graph.
//!
//! # Usage
//!
//! ```bash
//! qaoa-maxcut --nodes 6 --edge-prob 0.5 --depth 2
//! qaoa-maxcut --edges "0-1:2.5,1-2,2-3:0.7" --top-k 3 --json
//! qaoa-maxcut --config solver.json --optimizer spsa --log-level debug
//! qaoa-maxcut --nodes 8 --qasm optimized.qasm
//! ```
//!
//! Solver settings come from the defaults, then `--config`, then `QAOA_*`
//! environment variables (`.env` included), then the flags below.
//! `RUST_LOG`, when set, takes precedence over `--log-level`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use qaoa_core::{
    parse_edge_list, split_params, CircuitSpec, GraphGenerator, MaxCutSolver, OptimizerKind, RankedCut,
    SolveReport, SolverConfig, StateVectorSampler, WeightedGraph, DEFAULT_MAX_WEIGHT,
};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "qaoa-maxcut",
    version,
    about = "QAOA solver for weighted Max-Cut",
    long_about = None
)]
struct Args {
    /// Number of nodes of the random graph.
    #[arg(short, long, default_value_t = 5)]
    nodes: usize,

    /// Edge probability of the random graph.
    #[arg(short = 'p', long, default_value_t = 0.5)]
    edge_prob: f64,

    /// Give every edge weight 1.0.
    #[arg(long, default_value_t = false)]
    unweighted: bool,

    /// Upper bound for random edge weights.
    #[arg(long, default_value_t = DEFAULT_MAX_WEIGHT)]
    max_weight: f64,

    /// Explicit edge list, e.g. "0-1:2.5,1-2". Replaces the random graph.
    #[arg(short, long, value_name = "EDGES")]
    edges: Option<String>,

    /// Seed for graph generation and sampling.
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Solver configuration file (JSON).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of QAOA layers.
    #[arg(short, long)]
    depth: Option<usize>,

    /// Optimizer iteration budget.
    #[arg(long)]
    max_iter: Option<usize>,

    /// Shots per objective evaluation.
    #[arg(long)]
    training_shots: Option<u64>,

    /// Shots for the final distribution.
    #[arg(long)]
    eval_shots: Option<u64>,

    /// Minimizer (nelder-mead, spsa).
    #[arg(long)]
    optimizer: Option<OptimizerKind>,

    /// Number of ranked cuts to print.
    #[arg(short = 'k', long, default_value_t = 5)]
    top_k: usize,

    /// Print the report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Write the optimized circuit as OpenQASM 3 to this file.
    #[arg(long, value_name = "FILE")]
    qasm: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // stdout is reserved for the report
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args)?;
    let graph = build_graph(&args)?;

    info!(
        n_nodes = graph.n_nodes(),
        n_edges = graph.n_edges(),
        total_weight = graph.total_weight(),
        "graph ready"
    );

    let solver = MaxCutSolver::new(&graph, config).context("invalid solver configuration")?;
    let mut sampler = StateVectorSampler::new(args.seed);
    let report = solver.solve(&mut sampler).context("QAOA solve failed")?;
    let top = report.top_k(&graph, args.top_k)?;

    if let Some(path) = &args.qasm {
        write_qasm(path, &graph, solver.config().depth, &report.optimal_params)?;
        info!(path = %path.display(), "wrote optimized circuit");
    }

    if args.json {
        let out = json!({
            "graph": graph,
            "config": solver.config(),
            "report": report,
            "top_k": top,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_text(&graph, solver.config(), &report, &top)?;
    }

    Ok(())
}

/// Defaults, then file, then environment, then flags
fn load_config(args: &Args) -> Result<SolverConfig> {
    let mut config = match &args.config {
        Some(path) => SolverConfig::from_json_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => SolverConfig::default(),
    };
    config = config.apply_env().context("bad QAOA_* environment override")?;

    if let Some(depth) = args.depth {
        config.depth = depth;
    }
    if let Some(max_iter) = args.max_iter {
        config.max_iterations = max_iter;
    }
    if let Some(shots) = args.training_shots {
        config.training_shots = shots;
    }
    if let Some(shots) = args.eval_shots {
        config.evaluation_shots = shots;
    }
    if let Some(optimizer) = args.optimizer {
        config.optimizer = optimizer;
    }

    Ok(config)
}

fn build_graph(args: &Args) -> Result<WeightedGraph> {
    let generator = if args.unweighted {
        GraphGenerator::unweighted()
    } else {
        GraphGenerator::default().with_max_weight(args.max_weight)
    };
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    let graph = match &args.edges {
        Some(list) => {
            let edges = parse_edge_list(list).context("could not parse --edges")?;
            generator.from_edge_list(&edges, None, &mut rng)?
        }
        None => generator
            .erdos_renyi(args.nodes, args.edge_prob, &mut rng)
            .context("could not generate random graph")?,
    };

    Ok(graph)
}

/// Render the circuit at `params` and write it to `path`
fn write_qasm(path: &Path, graph: &WeightedGraph, depth: usize, params: &[f64]) -> Result<()> {
    let circuit = CircuitSpec::build(graph, depth, params)?;
    std::fs::write(path, circuit.to_qasm())
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn print_text(
    graph: &WeightedGraph,
    config: &SolverConfig,
    report: &SolveReport,
    top: &[RankedCut],
) -> Result<()> {
    println!(
        "Graph: {} nodes, {} edges, total weight {:.1}",
        graph.n_nodes(),
        graph.n_edges(),
        graph.total_weight()
    );
    for e in graph.edges() {
        println!("  {:>3} - {:<3} w = {:.1}", e.u, e.v, e.weight);
    }

    let (gammas, betas) = split_params(&report.optimal_params, config.depth)?;
    println!();
    println!(
        "Optimizer: {} ({}), {} iterations, {} evaluations",
        config.optimizer, report.termination, report.iterations, report.evaluations
    );
    println!("  best objective: {:.4}", report.best_objective);
    println!("  gamma: {gammas:.4?}");
    println!("  beta:  {betas:.4?}");

    println!();
    println!("{:>4}  {:<width$}  {:>11}  {:>10}", "Rank", "Cut", "Probability", "Weight", width = graph.n_nodes().max(3));
    for cut in top {
        println!(
            "{:>4}  {:<width$}  {:>11.4}  {:>10.1}",
            cut.rank,
            cut.bitstring.to_string(),
            cut.probability,
            cut.cut_weight,
            width = graph.n_nodes().max(3)
        );
    }

    if let (Some(opt), Some(ratio)) = (&report.optimum, report.approximation_ratio) {
        println!();
        println!(
            "Exact optimum: {} (weight {:.1}), approximation ratio {:.3}",
            opt.bitstring, opt.cut_weight, ratio
        );
    }

    Ok(())
}
