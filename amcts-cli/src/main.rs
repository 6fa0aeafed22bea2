//! AMCTS CLI - command-line front end for the lock-free parallel MCTS core.
//!
//! Commands:
//! - demo: run the engine against an in-process toy evaluator
//! - run: run the engine against a real evaluator subprocess, one per worker

mod demo_evaluator;
mod process_channel;

use std::sync::atomic::Ordering;

use amcts_core::{channel_pair, Engine, TreeConfig, WorkerConfig};
use clap::{Parser, Subcommand};
use process_channel::ProcessChannel;

#[derive(Parser)]
#[command(name = "amcts")]
#[command(about = "Lock-free parallel MCTS core for an external combinatorial solver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the engine against an in-process toy evaluator (no real solver).
    Demo {
        #[arg(long, default_value_t = 4)]
        workers: usize,
        #[arg(long, default_value_t = 50)]
        rollouts_per_worker: usize,
        #[arg(long, default_value_t = -1)]
        max_depth: i64,
        #[arg(long, default_value_t = 1.41421356)]
        exploration_c: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 3)]
        branching_factor: i64,
        #[arg(long, default_value_t = 200)]
        max_expansions: usize,
    },
    /// Run the engine against a real evaluator subprocess, one per worker.
    Run {
        /// Evaluator command line, e.g. "./evaluator --flag"
        #[arg(long)]
        evaluator_cmd: String,
        #[arg(long, default_value_t = 4)]
        workers: usize,
        #[arg(long, default_value_t = 50)]
        rollouts_per_worker: usize,
        #[arg(long, default_value_t = -1)]
        max_depth: i64,
        #[arg(long, default_value_t = 1.41421356)]
        exploration_c: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { workers, rollouts_per_worker, max_depth, exploration_c, seed, branching_factor, max_expansions } => {
            run_demo(workers, rollouts_per_worker, max_depth, exploration_c, seed, branching_factor, max_expansions)
        }
        Commands::Run { evaluator_cmd, workers, rollouts_per_worker, max_depth, exploration_c, seed } => {
            run_against_processes(&evaluator_cmd, workers, rollouts_per_worker, max_depth, exploration_c, seed)
        }
    }
}

fn run_demo(
    workers: usize,
    rollouts_per_worker: usize,
    max_depth: i64,
    exploration_c: f64,
    seed: u64,
    branching_factor: i64,
    max_expansions: usize,
) -> anyhow::Result<()> {
    let engine = Engine::new(TreeConfig { max_depth });

    let mut worker_channels = Vec::with_capacity(workers);
    let mut evaluator_handles = Vec::with_capacity(workers);
    for i in 0..workers {
        let (worker_side, evaluator_side) = channel_pair();
        let worker_seed = seed.wrapping_add(i as u64);
        worker_channels.push((WorkerConfig { exploration_c, seed: worker_seed }, worker_side));

        let evaluator_seed = worker_seed;
        evaluator_handles.push(std::thread::spawn(move || {
            demo_evaluator::run_demo_evaluator(evaluator_side, evaluator_seed, branching_factor, max_expansions / workers.max(1));
        }));
    }

    tracing::info!(workers, rollouts_per_worker, max_depth, exploration_c, "starting demo search");
    engine.run_rollouts(worker_channels, rollouts_per_worker)?;

    for handle in evaluator_handles {
        let _ = handle.join();
    }

    report(&engine);
    Ok(())
}

fn run_against_processes(
    evaluator_cmd: &str,
    workers: usize,
    rollouts_per_worker: usize,
    max_depth: i64,
    exploration_c: f64,
    seed: u64,
) -> anyhow::Result<()> {
    let engine = Engine::new(TreeConfig { max_depth });

    let mut worker_channels = Vec::with_capacity(workers);
    for i in 0..workers {
        let mut parts = evaluator_cmd.split_whitespace();
        let program = parts.next().ok_or_else(|| anyhow::anyhow!("empty evaluator command"))?;
        let mut command = std::process::Command::new(program);
        command.args(parts);

        let channel = ProcessChannel::spawn(command)?;
        worker_channels.push((WorkerConfig { exploration_c, seed: seed.wrapping_add(i as u64) }, channel));
    }

    tracing::info!(workers, rollouts_per_worker, max_depth, exploration_c, "starting search against external evaluators");
    engine.run_rollouts(worker_channels, rollouts_per_worker)?;

    report(&engine);
    Ok(())
}

fn report(engine: &Engine) {
    let root = &engine.tree().root;
    println!("root visits: {}", root.visits.load(Ordering::Relaxed));
    println!("root score:  {:.4}", root.score());

    let state = root.state();
    if state.is_null() {
        println!("(root never expanded)");
        return;
    }
    let node = unsafe { &*state };
    println!("root children ({}):", node.n_actions());
    for edge in node.actions.iter() {
        println!(
            "  var {:>6}: visits={:<6} score={:.4}",
            node.action_vars[edge.id as usize],
            edge.visits.load(Ordering::Relaxed),
            edge.score()
        );
    }
}
