//! Trace records and their text format.
//!
//! One record per line, fields separated by whitespace:
//!
//! ```text
//! INSERT <key>
//! READ <key>
//! UPDATE <key>
//! SCAN <key> <count>
//! ```
//!
//! `<key>` is a decimal `u64`, `<count>` a decimal signed integer.

use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use memmap2::Mmap;
use tracing::{debug, warn};

use crate::error::{ReplayError, TraceError};

/// A single trace record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Insert(u64),
    Read(u64),
    Update(u64),
    Scan { key: u64, count: i64 },
}

impl Operation {
    pub fn key(&self) -> u64 {
        match *self {
            Operation::Insert(key) | Operation::Read(key) | Operation::Update(key) => key,
            Operation::Scan { key, .. } => key,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Operation::Insert(_) => "INSERT",
            Operation::Read(_) => "READ",
            Operation::Update(_) => "UPDATE",
            Operation::Scan { .. } => "SCAN",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Scan { key, count } => write!(f, "SCAN {key} {count}"),
            op => write!(f, "{} {}", op.keyword(), op.key()),
        }
    }
}

fn parse_field<T>(
    fields: &mut std::str::SplitWhitespace<'_>,
    keyword: &'static str,
    field: &'static str,
) -> Result<T, TraceError>
where
    T: FromStr<Err = std::num::ParseIntError>,
{
    let raw = fields
        .next()
        .ok_or(TraceError::MissingField { keyword, field })?;
    raw.parse().map_err(|source| TraceError::InvalidNumber {
        field,
        value: raw.to_owned(),
        source,
    })
}

impl FromStr for Operation {
    type Err = TraceError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.split_whitespace();
        let keyword = fields.next().unwrap_or_default();
        match keyword {
            "INSERT" => Ok(Operation::Insert(parse_field(&mut fields, "INSERT", "key")?)),
            "READ" => Ok(Operation::Read(parse_field(&mut fields, "READ", "key")?)),
            "UPDATE" => Ok(Operation::Update(parse_field(&mut fields, "UPDATE", "key")?)),
            "SCAN" => {
                let key = parse_field(&mut fields, "SCAN", "key")?;
                let count = parse_field(&mut fields, "SCAN", "count")?;
                Ok(Operation::Scan { key, count })
            }
            other => Err(TraceError::UnknownKeyword(other.to_owned())),
        }
    }
}

/// Parse up to `limit` records from trace text.
///
/// Blank lines are ignored and do not count toward `limit`. A malformed record
/// does count: it is logged and skipped, and parsing continues.
pub fn parse_trace(data: &[u8], limit: usize) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(limit.min(1 << 20));
    let mut consumed = 0usize;

    for (idx, raw) in data.split(|&b| b == b'\n').enumerate() {
        if consumed == limit {
            break;
        }
        let line = match std::str::from_utf8(raw) {
            Ok(line) => line.trim(),
            Err(_) => {
                consumed += 1;
                warn!(line = idx + 1, error = %TraceError::Encoding, "skipping malformed trace record");
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        consumed += 1;

        match line.parse::<Operation>() {
            Ok(op) => ops.push(op),
            Err(error) => {
                warn!(line = idx + 1, %error, "skipping malformed trace record");
            }
        }
    }

    ops
}

/// Map the trace at `path` and parse up to `limit` records from it.
pub fn load_trace(path: &Path, limit: usize) -> Result<Vec<Operation>, ReplayError> {
    let io_err = |source: std::io::Error| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    let len = file.metadata().map_err(io_err)?.len();
    if len == 0 {
        debug!(path = %path.display(), "trace is empty");
        return Ok(Vec::new());
    }

    // SAFETY: the trace is an input file that is not written while mapped.
    let map = unsafe { Mmap::map(&file) }.map_err(io_err)?;
    let ops = parse_trace(&map, limit);
    debug!(path = %path.display(), bytes = len, records = ops.len(), "trace loaded");
    Ok(ops)
}
