//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract. Scripts rely on them.
//!
//! | Code | Description                                   |
//! |------|-----------------------------------------------|
//! | 0    | Success                                       |
//! | 1    | General error (unspecified)                   |
//! | 2    | CLI usage error (bad args, missing file)      |
//! | 3    | Invalid config (parse or validation failure)  |
//! | 4    | Candidate input could not be loaded           |
//! | 5    | Requested candidate not present in the epoch  |

use tkmerge_dedup::DedupError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Config TOML failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Candidate file unreadable or malformed (bad column, out-of-range slot, wide word).
pub const EXIT_INPUT: u8 = 4;

/// `compare` named a candidate id that the epoch does not contain.
pub const EXIT_UNKNOWN_CANDIDATE: u8 = 5;

/// Map an engine error to its exit code.
pub fn dedup_exit_code(err: &DedupError) -> u8 {
    match err {
        DedupError::ConfigParse(_) | DedupError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        DedupError::MissingColumn(_)
        | DedupError::FieldParse { .. }
        | DedupError::OutOfRange { .. }
        | DedupError::WordTooWide { .. }
        | DedupError::DuplicateCandidate { .. }
        | DedupError::DuplicateSlot { .. }
        | DedupError::Csv(_)
        | DedupError::Json(_) => EXIT_INPUT,
    }
}
