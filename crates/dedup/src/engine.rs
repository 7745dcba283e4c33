use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Deserialize;

use crate::config::{CandidateFormat, DedupConfig};
use crate::error::DedupError;
use crate::evidence::compute_summary;
use crate::layout::{Region, StubWord, LAYER_COUNT, SLOTS_PER_LAYER};
use crate::merge::compare_and_merge;
use crate::model::{
    CandidateRecord, DedupInput, DedupMeta, DedupResult, DedupSummary, DedupTrack, EpochResult,
    StubArray, TrackCandidate,
};

/// Deduplicate every epoch independently. Returns surviving tracks + summaries.
pub fn run(config: &DedupConfig, input: &DedupInput) -> DedupResult {
    let epochs: Vec<EpochResult> = input
        .epochs
        .iter()
        .map(|(epoch, candidates)| deduplicate(*epoch, candidates, config.merge_condition))
        .collect();

    let summary = compute_summary(&epochs);

    DedupResult {
        meta: DedupMeta {
            config_name: config.name.clone(),
            merge_condition: config.merge_condition,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        epochs,
    }
}

/// Fold one epoch's candidates into a set of surviving tracks.
///
/// Candidates are visited in arrival order. Each is offered to the surviving
/// tracks in order and absorbed by the first one whose merge threshold is met;
/// otherwise it becomes a new surviving track.
pub fn deduplicate(epoch: u32, candidates: &[CandidateRecord], merge_condition: u32) -> EpochResult {
    let mut tracks: Vec<DedupTrack> = Vec::new();
    let mut summary = DedupSummary {
        candidates_in: candidates.len(),
        ..DedupSummary::default()
    };

    for record in candidates {
        let master = tracks.iter_mut().find_map(|master| {
            let outcome = compare_and_merge(&master.track, &record.track, merge_condition);
            outcome.match_found.then_some((master, outcome))
        });

        match master {
            Some((master, outcome)) => {
                log::debug!(
                    "epoch {epoch}: candidate '{}' merged into '{}' ({} layer matches)",
                    record.id,
                    master.id,
                    outcome.match_count
                );
                master.track = outcome.merged;
                master.merged_ids.push(record.id.clone());
                summary.merges += 1;
                summary.adopted_primaries += u64::from(outcome.adopted_primaries);
                summary.invalidated_slots += u64::from(outcome.invalidated_slots);
            }
            None => tracks.push(DedupTrack {
                id: record.id.clone(),
                merged_ids: Vec::new(),
                track: record.track,
            }),
        }
    }

    summary.tracks_out = tracks.len();
    log::info!(
        "epoch {epoch}: {} candidates -> {} tracks ({} merges)",
        summary.candidates_in,
        summary.tracks_out,
        summary.merges
    );

    EpochResult {
        epoch,
        summary,
        tracks,
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load candidates from file contents in the given format.
pub fn load_candidates(data: &str, format: CandidateFormat) -> Result<DedupInput, DedupError> {
    match format {
        CandidateFormat::Csv => load_csv_candidates(data),
        CandidateFormat::Json => load_json_candidates(data),
    }
}

/// Load CSV rows of `epoch,candidate,region,layer,slot,word`, one row per occupied slot.
///
/// Slots without a row stay empty; a slot named by two rows is an error.
/// Candidate order within an epoch is the order of first appearance.
pub fn load_csv_candidates(csv_data: &str) -> Result<DedupInput, DedupError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DedupError::Csv(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let idx = |name: &str| -> Result<usize, DedupError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DedupError::MissingColumn(name.into()))
    };

    let epoch_idx = idx("epoch")?;
    let candidate_idx = idx("candidate")?;
    let region_idx = idx("region")?;
    let layer_idx = idx("layer")?;
    let slot_idx = idx("slot")?;
    let word_idx = idx("word")?;

    let mut epochs: BTreeMap<u32, Vec<CandidateRecord>> = BTreeMap::new();
    let mut positions: HashMap<(u32, String), usize> = HashMap::new();
    let mut filled: HashSet<(u32, String, Region, usize, usize)> = HashSet::new();

    for record in reader.records() {
        let record = record.map_err(|e| DedupError::Csv(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let field = |i: usize| record.get(i).unwrap_or("");
        let parse_err = |column: &str, value: &str| DedupError::FieldParse {
            line,
            column: column.into(),
            value: value.into(),
        };

        let epoch: u32 = field(epoch_idx)
            .parse()
            .map_err(|_| parse_err("epoch", field(epoch_idx)))?;
        let candidate = field(candidate_idx).to_string();
        if candidate.is_empty() {
            return Err(parse_err("candidate", ""));
        }
        let region: Region = field(region_idx)
            .parse()
            .map_err(|_| parse_err("region", field(region_idx)))?;
        let layer: usize = field(layer_idx)
            .parse()
            .map_err(|_| parse_err("layer", field(layer_idx)))?;
        let slot: usize = field(slot_idx)
            .parse()
            .map_err(|_| parse_err("slot", field(slot_idx)))?;
        let word = parse_word(field(word_idx)).ok_or_else(|| parse_err("word", field(word_idx)))?;

        check_index(&candidate, "layer", layer, LAYER_COUNT)?;
        check_index(&candidate, "slot", slot, SLOTS_PER_LAYER)?;
        check_width(&candidate, region, word)?;

        if !filled.insert((epoch, candidate.clone(), region, layer, slot)) {
            return Err(DedupError::DuplicateSlot {
                line,
                candidate,
                region,
                layer,
                slot,
            });
        }

        let records = epochs.entry(epoch).or_default();
        let pos = *positions
            .entry((epoch, candidate.clone()))
            .or_insert_with(|| {
                records.push(CandidateRecord {
                    id: candidate.clone(),
                    track: TrackCandidate::default(),
                });
                records.len() - 1
            });
        records[pos].track.stubs_mut(region)[layer][slot] = word;
    }

    Ok(DedupInput { epochs })
}

#[derive(Deserialize)]
struct JsonCandidates {
    epochs: Vec<JsonEpoch>,
}

#[derive(Deserialize)]
struct JsonEpoch {
    epoch: u32,
    candidates: Vec<JsonCandidate>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonCandidate {
    id: String,
    #[serde(default)]
    barrel: StubArray,
    #[serde(default)]
    disk: StubArray,
}

impl From<JsonCandidate> for CandidateRecord {
    fn from(c: JsonCandidate) -> Self {
        CandidateRecord {
            id: c.id,
            track: TrackCandidate {
                barrel: c.barrel,
                disk: c.disk,
            },
        }
    }
}

/// Load `{ "epochs": [ { "epoch": n, "candidates": [ { "id", "barrel", "disk" } ] } ] }`.
pub fn load_json_candidates(json_data: &str) -> Result<DedupInput, DedupError> {
    let parsed: JsonCandidates =
        serde_json::from_str(json_data).map_err(|e| DedupError::Json(e.to_string()))?;

    let mut epochs: BTreeMap<u32, Vec<CandidateRecord>> = BTreeMap::new();
    for JsonEpoch { epoch, candidates } in parsed.epochs {
        let records = epochs.entry(epoch).or_default();
        for candidate in candidates.into_iter().map(CandidateRecord::from) {
            if records.iter().any(|r| r.id == candidate.id) {
                return Err(DedupError::DuplicateCandidate {
                    epoch,
                    id: candidate.id,
                });
            }
            for region in Region::ALL {
                for layer in candidate.track.stubs(region) {
                    for &word in layer {
                        check_width(&candidate.id, region, word)?;
                    }
                }
            }
            records.push(candidate);
        }
    }

    Ok(DedupInput { epochs })
}

/// Decimal or `0x`-prefixed hexadecimal.
fn parse_word(s: &str) -> Option<StubWord> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => StubWord::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

fn check_index(candidate: &str, what: &'static str, value: usize, len: usize) -> Result<(), DedupError> {
    if value >= len {
        return Err(DedupError::OutOfRange {
            candidate: candidate.into(),
            what,
            value,
            max: len - 1,
        });
    }
    Ok(())
}

fn check_width(candidate: &str, region: Region, word: StubWord) -> Result<(), DedupError> {
    if !region.layout().fits(word) {
        return Err(DedupError::WordTooWide {
            candidate: candidate.into(),
            region,
            word,
        });
    }
    Ok(())
}
