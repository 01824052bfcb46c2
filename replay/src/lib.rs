//! # trace-replay
//!
//! Replays operation traces against a [`radix_index::Index`] and times each
//! phase.
//!
//! A run has two phases:
//!
//! 1. **Load**: INSERT records from the load trace populate the index.
//! 2. **Transactions**: INSERT, READ, UPDATE and SCAN records from the
//!    transaction trace run in order. READ and SCAN results are summed so the
//!    work cannot be optimized away and runs can be cross-checked.
//!
//! ## Example
//!
//! ```rust
//! use radix_index::Index;
//! use trace_replay::{parse_trace, Replayer};
//!
//! let load = parse_trace(b"INSERT 1\nINSERT 17\nINSERT 33\n", 10);
//! let txns = parse_trace(b"READ 17\nSCAN 1 3\n", 10);
//!
//! let mut replayer = Replayer::new(Index::new());
//! replayer.run_load(&load).unwrap();
//! let report = replayer.run_transactions(&txns).unwrap();
//! assert_eq!(report.read_sum, 1);
//! assert_eq!(report.scan_sum, 3);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

pub mod error;
pub mod replay;
pub mod trace;

pub use error::{ReplayError, TraceError};
pub use replay::{Phase, PhaseReport, Replayer, Summary, Workload};
pub use trace::{load_trace, parse_trace, Operation};
