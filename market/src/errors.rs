use std::fmt;
use std::time::Duration;

use corelib::Quantity;
use thiserror::Error;

/// A single adapter failed to produce a value.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("field not found: {0}")]
    MissingField(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Every adapter in a chain failed; no value exists for this run.
#[derive(Error, Debug)]
#[error("{quantity} price unavailable ({})", FailureList(.failures))]
pub struct Unavailable {
    pub quantity: Quantity,

    /// `(source label, error)` in the order the sources were tried.
    pub failures: Vec<(String, SourceError)>,
}

struct FailureList<'a>(&'a [(String, SourceError)]);

impl fmt::Display for FailureList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("no sources configured");
        }
        for (i, (label, err)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{label}: {err}")?;
        }
        Ok(())
    }
}

/// A source specification string could not be understood.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SpecError {
    #[error("empty source spec")]
    Empty,

    #[error("unknown source kind `{0}`")]
    UnknownKind(String),

    #[error("source `{kind}` needs an argument: {hint}")]
    MissingArgument { kind: String, hint: &'static str },

    #[error("invalid argument `{arg}` for source `{kind}`")]
    InvalidArgument { kind: String, arg: String },
}
