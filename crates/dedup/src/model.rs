use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::layout::{Region, StubWord, LAYER_COUNT, SLOTS_PER_LAYER};

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// Stub slots of one region: `[layer][slot]`.
pub type StubArray = [[StubWord; SLOTS_PER_LAYER]; LAYER_COUNT];

/// Fixed-shape track candidate as emitted by the matching engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackCandidate {
    #[serde(default)]
    pub barrel: StubArray,
    #[serde(default)]
    pub disk: StubArray,
}

impl TrackCandidate {
    pub fn stubs(&self, region: Region) -> &StubArray {
        match region {
            Region::Barrel => &self.barrel,
            Region::Disk => &self.disk,
        }
    }

    pub fn stubs_mut(&mut self, region: Region) -> &mut StubArray {
        match region {
            Region::Barrel => &mut self.barrel,
            Region::Disk => &mut self.disk,
        }
    }

    pub fn primary(&self, region: Region, layer: usize) -> StubWord {
        self.stubs(region)[layer][0]
    }

    /// Builder-style slot assignment for tests and hand-built candidates.
    pub fn with_stub(mut self, region: Region, layer: usize, slot: usize, word: StubWord) -> Self {
        self.stubs_mut(region)[layer][slot] = word;
        self
    }
}

/// A candidate tagged with the upstream identifier it was loaded under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateRecord {
    pub id: String,
    #[serde(flatten)]
    pub track: TrackCandidate,
}

// ---------------------------------------------------------------------------
// Comparison + merge
// ---------------------------------------------------------------------------

/// Per-layer primary-stub matches between a master and one other candidate.
///
/// Only meaningful for the pair it was computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LayerMatches {
    pub barrel: [bool; LAYER_COUNT],
    pub disk: [bool; LAYER_COUNT],
}

impl LayerMatches {
    pub fn flags(&self, region: Region) -> &[bool; LAYER_COUNT] {
        match region {
            Region::Barrel => &self.barrel,
            Region::Disk => &self.disk,
        }
    }

    /// Sum of all flags, 0..=8.
    pub fn count(&self) -> u32 {
        let mut count = 0;
        for layer in 0..LAYER_COUNT {
            count += self.barrel[layer] as u32 + self.disk[layer] as u32;
        }
        count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    /// The master after reconciliation, or the master unchanged if no match.
    pub merged: TrackCandidate,
    pub match_found: bool,
    pub match_count: u32,
    /// Primary slots taken over from the other candidate.
    pub adopted_primaries: u32,
    /// Secondary slots overwritten with the conflict sentinel.
    pub invalidated_slots: u32,
}

// ---------------------------------------------------------------------------
// Epoch input / output
// ---------------------------------------------------------------------------

/// Candidates grouped by epoch number, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct DedupInput {
    pub epochs: BTreeMap<u32, Vec<CandidateRecord>>,
}

/// A surviving track after deduplication.
#[derive(Debug, Clone, Serialize)]
pub struct DedupTrack {
    /// Id of the candidate that became master.
    pub id: String,
    /// Ids of candidates merged into this track, in merge order.
    pub merged_ids: Vec<String>,
    pub track: TrackCandidate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DedupSummary {
    pub candidates_in: usize,
    pub tracks_out: usize,
    pub merges: usize,
    pub adopted_primaries: u64,
    pub invalidated_slots: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EpochResult {
    pub epoch: u32,
    pub summary: DedupSummary,
    pub tracks: Vec<DedupTrack>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DedupMeta {
    pub config_name: String,
    pub merge_condition: u32,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DedupResult {
    pub meta: DedupMeta,
    pub summary: DedupSummary,
    pub epochs: Vec<EpochResult>,
}
