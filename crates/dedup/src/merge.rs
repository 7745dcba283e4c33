//! Threshold decision and slot reconciliation for a compared pair.
//!
//! Merging is asymmetric: the master survives and is returned (possibly
//! updated), the other candidate is only read. Reconciliation, when the
//! threshold is met:
//! - Primary slot: adopted from the other candidate on layers where the
//!   master had no match and the other candidate has a stub.
//! - Secondary slots: copied when the master slot is empty and the other is
//!   not; in every other case the slot is OR-ed with a full-width padding
//!   pattern, leaving the conflict sentinel (all word bits set).

use crate::compare::compare;
use crate::layout::{Region, StubWord, LAYER_COUNT, SLOTS_PER_LAYER};
use crate::model::{LayerMatches, MergeOutcome, TrackCandidate};

/// Padding bit OR-ed into every position of an invalidated secondary slot.
const STUB_PADDING: StubWord = 1;

/// Merge `other` into `master` using the flags from `compare(master, other)`.
pub fn merge(
    master: &TrackCandidate,
    other: &TrackCandidate,
    matches: &LayerMatches,
    merge_condition: u32,
) -> MergeOutcome {
    let match_count = matches.count();

    if match_count < merge_condition {
        return MergeOutcome {
            merged: *master,
            match_found: false,
            match_count,
            adopted_primaries: 0,
            invalidated_slots: 0,
        };
    }

    log::debug!("merge accepted: {match_count} layer match(es), condition {merge_condition}");

    let mut merged = *master;
    let mut adopted_primaries = 0;
    let mut invalidated_slots = 0;

    for region in Region::ALL {
        let flags = matches.flags(region);
        let word_bits = region.layout().word_bits;
        let theirs = other.stubs(region);
        let ours = merged.stubs_mut(region);

        for layer in 0..LAYER_COUNT {
            if !flags[layer] && theirs[layer][0] != 0 {
                ours[layer][0] = theirs[layer][0];
                adopted_primaries += 1;
            }

            for slot in 1..SLOTS_PER_LAYER {
                if ours[layer][slot] == 0 && theirs[layer][slot] != 0 {
                    ours[layer][slot] = theirs[layer][slot];
                } else {
                    for bit in 0..word_bits {
                        ours[layer][slot] |= STUB_PADDING << bit;
                    }
                    invalidated_slots += 1;
                }
            }
        }
    }

    MergeOutcome {
        merged,
        match_found: true,
        match_count,
        adopted_primaries,
        invalidated_slots,
    }
}

/// Compare then merge one `(master, other)` pair.
pub fn compare_and_merge(
    master: &TrackCandidate,
    other: &TrackCandidate,
    merge_condition: u32,
) -> MergeOutcome {
    let matches = compare(master, other);
    merge(master, other, &matches, merge_condition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{BARREL_LAYOUT, DISK_LAYOUT, MAX_LAYER_MATCHES};

    fn barrel(token: u32) -> StubWord {
        BARREL_LAYOUT.stub_word(token)
    }

    fn disk(token: u32) -> StubWord {
        DISK_LAYOUT.stub_word(token)
    }

    #[test]
    fn scenario_existing_match_keeps_primary() {
        let master = TrackCandidate::default().with_stub(Region::Barrel, 0, 0, barrel(5));
        let other = TrackCandidate::default().with_stub(Region::Barrel, 0, 0, barrel(5) | 0x3);
        let out = compare_and_merge(&master, &other, 1);
        assert!(out.match_found);
        assert_eq!(out.match_count, 1);
        assert_eq!(out.merged.barrel[0][0], barrel(5));
        assert_eq!(out.adopted_primaries, 0);
    }

    #[test]
    fn scenario_missing_primary_adopted() {
        let master = TrackCandidate::default().with_stub(Region::Barrel, 0, 0, barrel(5));
        let other = TrackCandidate::default()
            .with_stub(Region::Barrel, 0, 0, barrel(5))
            .with_stub(Region::Barrel, 2, 0, barrel(7));
        let out = compare_and_merge(&master, &other, 1);
        assert!(out.match_found);
        assert_eq!(out.merged.barrel[2][0], other.barrel[2][0]);
        assert_eq!(BARREL_LAYOUT.token(out.merged.barrel[2][0]), 7);
        assert_eq!(out.adopted_primaries, 1);
    }

    #[test]
    fn scenario_occupied_secondary_becomes_sentinel() {
        let master = TrackCandidate::default()
            .with_stub(Region::Barrel, 0, 0, barrel(5))
            .with_stub(Region::Barrel, 1, 1, barrel(11));
        let other = TrackCandidate::default()
            .with_stub(Region::Barrel, 0, 0, barrel(5))
            .with_stub(Region::Barrel, 1, 1, barrel(12));
        let out = compare_and_merge(&master, &other, 1);
        let slot = out.merged.barrel[1][1];
        assert_eq!(slot, BARREL_LAYOUT.word_mask());
        assert_ne!(slot, master.barrel[1][1]);
        assert_ne!(slot, other.barrel[1][1]);
    }

    #[test]
    fn empty_secondary_filled_from_other() {
        let master = TrackCandidate::default().with_stub(Region::Disk, 0, 0, disk(2));
        let other = TrackCandidate::default()
            .with_stub(Region::Disk, 0, 0, disk(2))
            .with_stub(Region::Disk, 3, 2, disk(99));
        let out = compare_and_merge(&master, &other, 1);
        assert_eq!(out.merged.disk[3][2], disk(99));
    }

    #[test]
    fn disk_sentinel_uses_disk_width() {
        let master = TrackCandidate::default()
            .with_stub(Region::Disk, 0, 0, disk(2))
            .with_stub(Region::Disk, 0, 1, disk(1));
        let out = compare_and_merge(&master, &master, 1);
        assert_eq!(out.merged.disk[0][1], DISK_LAYOUT.word_mask());
    }

    #[test]
    fn both_empty_secondary_is_also_padded() {
        let master = TrackCandidate::default().with_stub(Region::Barrel, 0, 0, barrel(5));
        let out = compare_and_merge(&master, &master, 1);
        // Every secondary slot of both regions: 2 regions * 4 layers * 3 slots.
        assert_eq!(out.invalidated_slots, 24);
        assert_eq!(out.merged.barrel[3][3], BARREL_LAYOUT.word_mask());
        assert_eq!(out.merged.disk[3][3], DISK_LAYOUT.word_mask());
    }

    #[test]
    fn threshold_not_met_returns_master_unchanged() {
        let master = TrackCandidate::default()
            .with_stub(Region::Barrel, 0, 0, barrel(5))
            .with_stub(Region::Barrel, 1, 1, barrel(8));
        let other = TrackCandidate::default()
            .with_stub(Region::Barrel, 0, 0, barrel(5))
            .with_stub(Region::Barrel, 2, 0, barrel(7));
        let out = compare_and_merge(&master, &other, 2);
        assert!(!out.match_found);
        assert_eq!(out.match_count, 1);
        assert_eq!(out.merged, master);
        assert_eq!(out.invalidated_slots, 0);
    }

    #[test]
    fn zero_condition_always_merges() {
        let out = compare_and_merge(&TrackCandidate::default(), &TrackCandidate::default(), 0);
        assert!(out.match_found);
        assert_eq!(out.match_count, 0);
    }

    #[test]
    fn condition_above_max_never_merges() {
        let mut track = TrackCandidate::default();
        for layer in 0..LAYER_COUNT {
            track = track
                .with_stub(Region::Barrel, layer, 0, barrel(layer as u32 + 1))
                .with_stub(Region::Disk, layer, 0, disk(layer as u32 + 1));
        }
        let out = compare_and_merge(&track, &track, MAX_LAYER_MATCHES + 1);
        assert_eq!(out.match_count, MAX_LAYER_MATCHES);
        assert!(!out.match_found);
        assert_eq!(out.merged, track);
    }

    #[test]
    fn mismatched_primary_is_overwritten_by_other() {
        // Flag false because tokens differ; the other candidate's stub wins.
        let master = TrackCandidate::default()
            .with_stub(Region::Barrel, 0, 0, barrel(5))
            .with_stub(Region::Disk, 1, 0, disk(20));
        let other = TrackCandidate::default()
            .with_stub(Region::Barrel, 0, 0, barrel(5))
            .with_stub(Region::Disk, 1, 0, disk(21));
        let out = compare_and_merge(&master, &other, 1);
        assert_eq!(out.merged.disk[1][0], disk(21));
    }

    #[test]
    fn empty_other_primary_is_not_adopted() {
        let master = TrackCandidate::default()
            .with_stub(Region::Barrel, 0, 0, barrel(5))
            .with_stub(Region::Barrel, 3, 0, barrel(6));
        let other = TrackCandidate::default().with_stub(Region::Barrel, 0, 0, barrel(5));
        let out = compare_and_merge(&master, &other, 1);
        assert_eq!(out.merged.barrel[3][0], barrel(6));
    }
}
