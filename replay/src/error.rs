use std::io;
use std::num::ParseIntError;
use std::path::PathBuf;

use radix_index::IndexError;
use thiserror::Error;

/// Why a single trace record was rejected. Never fatal to a replay.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    #[error("unrecognized operation `{0}`")]
    UnknownKeyword(String),
    #[error("`{keyword}` record is missing its {field}")]
    MissingField {
        keyword: &'static str,
        field: &'static str,
    },
    #[error("invalid {field} `{value}`: {source}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("record is not valid UTF-8")]
    Encoding,
}

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("cannot read trace `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Index(#[from] IndexError),
}
