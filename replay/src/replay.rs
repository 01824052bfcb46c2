//! Load and transaction phases over a [`radix_index::Index`].

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use radix_index::{Index, IndexError};
use tracing::{debug, info};

use crate::error::ReplayError;
use crate::trace::{load_trace, Operation};

/// Value written by INSERT records.
pub const INSERT_VALUE: i8 = 1;
/// Value written by UPDATE records.
pub const UPDATE_VALUE: i8 = 2;

/// Default interval between progress log lines.
pub const DEFAULT_PROGRESS_EVERY: usize = 1_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Only INSERT records run.
    Load,
    /// Every record kind runs.
    Transactions,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Load => "load",
            Phase::Transactions => "txns",
        })
    }
}

/// Counters and timing for one phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseReport {
    /// Records executed against the index.
    pub executed: usize,
    /// Records the phase does not run (non-INSERT records while loading).
    pub ignored: usize,
    /// READ/UPDATE records whose key was never inserted.
    pub missing: usize,
    /// Sum of values returned by READ records.
    pub read_sum: i64,
    /// Sum of values visited by SCAN records.
    pub scan_sum: i64,
    /// Entries visited by SCAN records.
    pub scanned: usize,
    pub elapsed: Duration,
}

impl PhaseReport {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1e3
    }
}

/// Trace files and record limits for a full run.
#[derive(Debug, Clone)]
pub struct Workload {
    pub load_trace: PathBuf,
    pub txn_trace: PathBuf,
    pub load_count: usize,
    pub txn_count: usize,
}

/// Results of [`Replayer::replay`].
#[derive(Debug, Clone)]
pub struct Summary {
    pub load_parse: Duration,
    pub load: PhaseReport,
    pub txn_parse: Duration,
    pub transactions: PhaseReport,
}

/// Drives an index through trace phases.
pub struct Replayer {
    index: Index,
    progress_every: usize,
}

impl Replayer {
    pub fn new(index: Index) -> Self {
        Self {
            index,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }

    /// Log progress every `n` records. `0` disables progress lines.
    pub fn with_progress_every(mut self, n: usize) -> Self {
        self.progress_every = n;
        self
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn into_index(self) -> Index {
        self.index
    }

    /// Load the traces named by `workload` and run both phases.
    pub fn replay(&mut self, workload: &Workload) -> Result<Summary, ReplayError> {
        let started = Instant::now();
        let ops = load_trace(&workload.load_trace, workload.load_count)?;
        let load_parse = started.elapsed();
        let load = self.run_load(&ops)?;
        drop(ops);

        let started = Instant::now();
        let ops = load_trace(&workload.txn_trace, workload.txn_count)?;
        let txn_parse = started.elapsed();
        let transactions = self.run_transactions(&ops)?;

        Ok(Summary {
            load_parse,
            load,
            txn_parse,
            transactions,
        })
    }

    pub fn run_load(&mut self, ops: &[Operation]) -> Result<PhaseReport, ReplayError> {
        self.run(Phase::Load, ops)
    }

    pub fn run_transactions(&mut self, ops: &[Operation]) -> Result<PhaseReport, ReplayError> {
        self.run(Phase::Transactions, ops)
    }

    fn run(&mut self, phase: Phase, ops: &[Operation]) -> Result<PhaseReport, ReplayError> {
        info!(%phase, records = ops.len(), "phase started");
        let mut report = PhaseReport::default();
        let started = Instant::now();

        for (i, op) in ops.iter().enumerate() {
            if self.progress_every != 0 && i != 0 && i % self.progress_every == 0 {
                info!(%phase, done = i, "progress");
            }
            match (phase, op) {
                (Phase::Load, Operation::Insert(_)) | (Phase::Transactions, _) => {
                    self.apply(op, &mut report)?;
                }
                (Phase::Load, _) => report.ignored += 1,
            }
        }

        report.elapsed = started.elapsed();
        info!(
            %phase,
            executed = report.executed,
            missing = report.missing,
            elapsed_ms = report.elapsed_ms(),
            "phase finished"
        );
        Ok(report)
    }

    fn apply(&mut self, op: &Operation, report: &mut PhaseReport) -> Result<(), IndexError> {
        report.executed += 1;
        let result = match *op {
            Operation::Insert(key) => self.index.insert(key, INSERT_VALUE).map(drop),
            Operation::Read(key) => self
                .index
                .read(key)
                .map(|value| report.read_sum += i64::from(value)),
            Operation::Update(key) => self.index.update(key, UPDATE_VALUE).map(drop),
            Operation::Scan { key, count } => {
                let mut sum = 0i64;
                report.scanned += self.index.scan_with(key, count, |_, v| sum += i64::from(v));
                report.scan_sum += sum;
                Ok(())
            }
        };

        match result {
            Err(IndexError::KeyNotFound(key)) => {
                debug!(%op, key, "key not found");
                report.missing += 1;
                Ok(())
            }
            other => other,
        }
    }
}
