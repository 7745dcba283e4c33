use std::fmt;

use crate::layout::{Region, StubWord};

#[derive(Debug)]
pub enum DedupError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad merge condition, unknown format, etc.).
    ConfigValidation(String),
    /// Missing required column in a candidate CSV.
    MissingColumn(String),
    /// A candidate field could not be parsed.
    FieldParse { line: u64, column: String, value: String },
    /// Layer or slot index outside the detector geometry.
    OutOfRange { candidate: String, what: &'static str, value: usize, max: usize },
    /// Stub word wider than its region's layout.
    WordTooWide { candidate: String, region: Region, word: StubWord },
    /// Same candidate id listed twice in one epoch.
    DuplicateCandidate { epoch: u32, id: String },
    /// Two CSV rows fill the same slot of one candidate.
    DuplicateSlot { line: u64, candidate: String, region: Region, layer: usize, slot: usize },
    /// Malformed CSV record (ragged row, bad quoting).
    Csv(String),
    /// JSON candidate file error.
    Json(String),
}

impl fmt::Display for DedupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn(column) => write!(f, "missing column '{column}'"),
            Self::FieldParse { line, column, value } => {
                write!(f, "line {line}: cannot parse {column} '{value}'")
            }
            Self::OutOfRange { candidate, what, value, max } => {
                write!(f, "candidate '{candidate}': {what} {value} out of range (max {max})")
            }
            Self::WordTooWide { candidate, region, word } => {
                write!(
                    f,
                    "candidate '{candidate}': {region} stub {word:#x} exceeds {} bits",
                    region.layout().word_bits
                )
            }
            Self::DuplicateCandidate { epoch, id } => {
                write!(f, "epoch {epoch}: duplicate candidate '{id}'")
            }
            Self::DuplicateSlot { line, candidate, region, layer, slot } => {
                write!(
                    f,
                    "line {line}: candidate '{candidate}' {region} layer {layer} slot {slot} already set"
                )
            }
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Json(msg) => write!(f, "JSON error: {msg}"),
        }
    }
}

impl std::error::Error for DedupError {}
