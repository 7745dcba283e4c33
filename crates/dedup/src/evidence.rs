use crate::model::{DedupSummary, EpochResult};

/// Sum per-epoch summaries into a run-wide summary.
pub fn compute_summary(epochs: &[EpochResult]) -> DedupSummary {
    let mut total = DedupSummary::default();

    for epoch in epochs {
        let s = &epoch.summary;
        total.candidates_in += s.candidates_in;
        total.tracks_out += s.tracks_out;
        total.merges += s.merges;
        total.adopted_primaries += s.adopted_primaries;
        total.invalidated_slots += s.invalidated_slots;
    }

    total
}
