//! Layer-by-layer comparison of two candidates' primary stubs.

use crate::layout::{extract_token, Region, LAYER_COUNT};
use crate::model::{LayerMatches, TrackCandidate};

/// Compare the primary stubs of `master` and `other` on every layer.
///
/// A layer matches when both tokens are equal and the master's token is
/// nonzero, so two empty layers never match. All layers are visited.
pub fn compare(master: &TrackCandidate, other: &TrackCandidate) -> LayerMatches {
    let mut matches = LayerMatches::default();

    for layer in 0..LAYER_COUNT {
        matches.barrel[layer] = primary_matches(master, other, Region::Barrel, layer);
        matches.disk[layer] = primary_matches(master, other, Region::Disk, layer);
    }

    matches
}

#[inline]
fn primary_matches(
    master: &TrackCandidate,
    other: &TrackCandidate,
    region: Region,
    layer: usize,
) -> bool {
    let master_token = extract_token(master.primary(region, layer), region);
    let other_token = extract_token(other.primary(region, layer), region);
    let matched = master_token == other_token && master_token > 0;
    if matched {
        log::trace!("{region} layer {layer}: stub {master_token} shared");
    }
    matched
}
