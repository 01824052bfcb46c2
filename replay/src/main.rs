//! Replay a load trace and a transaction trace against the index and report
//! per-phase timing.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use radix_index::{Config, Index};
use tracing::error;
use tracing_subscriber::EnvFilter;
use trace_replay::{replay::DEFAULT_PROGRESS_EVERY, ReplayError, Replayer, Summary, Workload};

#[derive(Parser, Debug)]
#[command(name = "trace-replay")]
#[command(about = "Replay INSERT/READ/UPDATE/SCAN traces against a digit trie index")]
struct Args {
    /// Trace whose INSERT records populate the index
    load_trace: PathBuf,

    /// Trace replayed after loading
    txn_trace: PathBuf,

    /// Records to read from the load trace
    load_count: usize,

    /// Records to read from the transaction trace
    txn_count: usize,

    /// Key bits consumed per trie level (1, 2, 4, 8 or 16)
    #[arg(short = 'w', long, default_value_t = 4)]
    segment_width: u32,

    /// Nodes to reserve up front
    #[arg(long, default_value_t = Config::default().initial_capacity)]
    initial_capacity: usize,

    /// Log progress every N records (0 disables)
    #[arg(long, default_value_t = DEFAULT_PROGRESS_EVERY)]
    progress_every: usize,
}

fn run(args: Args) -> Result<(), ReplayError> {
    let index = Index::with_config(Config {
        segment_width: args.segment_width,
        initial_capacity: args.initial_capacity,
    })?;
    let workload = Workload {
        load_trace: args.load_trace,
        txn_trace: args.txn_trace,
        load_count: args.load_count,
        txn_count: args.txn_count,
    };

    let mut replayer = Replayer::new(index).with_progress_every(args.progress_every);
    let summary = replayer.replay(&workload)?;
    print_report(&workload, &summary, replayer.index());
    Ok(())
}

fn print_report(workload: &Workload, summary: &Summary, index: &Index) {
    println!("load trace:  {}", workload.load_trace.display());
    println!("txn trace:   {}", workload.txn_trace.display());
    println!(
        "segment width: {} bits ({}-way, depth {})",
        index.segment_width().bits(),
        index.segment_width().fanout(),
        index.max_depth()
    );
    println!();

    println!(
        "{:<6} {:>12} {:>10} {:>10} {:>12} {:>12}",
        "Phase", "Executed", "Ignored", "Missing", "Parse ms", "Exec ms"
    );
    println!("{}", "─".repeat(67));
    for (name, parse, report) in [
        ("load", summary.load_parse, &summary.load),
        ("txns", summary.txn_parse, &summary.transactions),
    ] {
        println!(
            "{:<6} {:>12} {:>10} {:>10} {:>12.3} {:>12.3}",
            name,
            report.executed,
            report.ignored,
            report.missing,
            parse.as_secs_f64() * 1e3,
            report.elapsed_ms()
        );
    }
    println!();

    println!("sum of values of read entries:    {}", summary.transactions.read_sum);
    println!("sum of values of scanned entries: {}", summary.transactions.scan_sum);
    println!();

    println!("keys:        {}", index.len());
    println!("nodes:       {}", index.node_count());
    println!("arena MB:    {:.1}", index.memory_usage() as f64 / 1e6);
    match memory_stats::memory_stats() {
        Some(usage) => println!("resident MB: {:.1}", usage.physical_mem as f64 / 1e6),
        None => println!("resident MB: -"),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "replay failed");
            ExitCode::FAILURE
        }
    }
}
