//! `tkmerge-dedup`: track-candidate comparison and merge engine.
//!
//! Pure engine crate: compares fixed-shape track candidates layer by layer and
//! merges duplicates within an epoch. Loading helpers parse candidate dumps from
//! strings; no CLI or file IO.

pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod layout;
pub mod merge;
pub mod model;

pub use compare::compare;
pub use config::DedupConfig;
pub use engine::{deduplicate, run};
pub use error::DedupError;
pub use layout::{extract_token, Region, StubWord};
pub use merge::{compare_and_merge, merge};
pub use model::{CandidateRecord, DedupInput, DedupResult, LayerMatches, MergeOutcome, TrackCandidate};
