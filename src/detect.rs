//! The exact-matching engine: sequence validation, reverse complement, and
//! exhaustive overlapping-occurrence search.
//!
//! The scan is a naive cursor walk over the target using the standard
//! substring primitive; probes are tens of bases and targets moderate
//! genomic fragments, so O(n*m) is fine here. Swapping in a linear-time
//! search would be a performance substitution, not a semantic one.
//!
//! # Examples
//! ```
//! use probematch::detect::{is_valid_sequence, reverse_complement};
//! assert!(is_valid_sequence("ACGTacgt"));
//! assert_eq!(reverse_complement("ATGC").unwrap(), "GCAT");
//! ```
use crate::probe::{MatchRecord, Orientation, Probe, ProbeError};

/// Return `true` iff every character, after case-folding, is one of
/// A, T, G or C. The empty string is vacuously valid; callers that need
/// content must gate emptiness separately.
#[inline]
pub fn is_valid_sequence(sequence: &str) -> bool {
    sequence
        .chars()
        .all(|c| matches!(c.to_ascii_uppercase(), 'A' | 'T' | 'G' | 'C'))
}

/// Watson-Crick pairing for a single uppercase base.
#[inline]
fn complement(base: char) -> Option<char> {
    match base {
        'A' => Some('T'),
        'T' => Some('A'),
        'G' => Some('C'),
        'C' => Some('G'),
        _ => None,
    }
}

/// Compute the reverse complement of a DNA string.
///
/// The input is uppercased, each base mapped via A<->T / G<->C, and the
/// order reversed. Any out-of-alphabet character fails with
/// [`ProbeError::InvalidBase`] naming the offending character and its
/// position in the (forward) input.
///
/// # Examples
/// ```
/// assert_eq!(probematch::reverse_complement("ATGC").unwrap(), "GCAT");
/// assert!(probematch::reverse_complement("ATNG").is_err());
/// ```
pub fn reverse_complement(sequence: &str) -> Result<String, ProbeError> {
    let upper: Vec<char> = sequence.to_ascii_uppercase().chars().collect();
    let mut out = String::with_capacity(upper.len());
    for i in (0..upper.len()).rev() {
        match complement(upper[i]) {
            Some(p) => out.push(p),
            None => return Err(ProbeError::InvalidBase { base: upper[i], position: i }),
        }
    }
    Ok(out)
}

/// Scan `target` for every occurrence of `needle`, including overlapping
/// ones: after a hit at 0-based position `p` the cursor advances to `p + 1`,
/// not past the match. Emits 1-based inclusive spans.
fn scan_overlapping(
    target: &str,
    needle: &str,
    probe_name: &str,
    orientation: Orientation,
    out: &mut Vec<MatchRecord>,
) {
    if needle.is_empty() {
        return;
    }
    let mut cursor = 0usize;
    while let Some(rel) = target[cursor..].find(needle) {
        let p = cursor + rel;
        out.push(MatchRecord {
            probe_name: probe_name.to_string(),
            orientation,
            start: p + 1,
            end: p + needle.len(),
            matched_text: target[p..p + needle.len()].to_string(),
        });
        cursor = p + 1;
    }
}

/// Find every exact occurrence of `probe` in `target`, on both strands.
///
/// Forward matches come first in ascending position order, followed by
/// reverse-complement matches in ascending position order. A probe that
/// equals its own reverse complement reports the same positions under both
/// orientations; orientation is part of a record's identity and the engine
/// does not deduplicate across strands.
///
/// The target is uppercased defensively (callers should already have
/// normalized it). An empty probe sequence yields no matches, and a probe
/// whose reverse complement cannot be computed simply produces no
/// reverse-complement matches. This function never fails.
pub fn find_matches(probe: &Probe, target: &str) -> Vec<MatchRecord> {
    let mut matches = Vec::new();
    let needle = probe.sequence().to_ascii_uppercase();
    if needle.is_empty() {
        return matches;
    }
    let hay = target.to_ascii_uppercase();

    scan_overlapping(&hay, &needle, probe.name(), Orientation::Forward, &mut matches);
    if let Ok(rc) = reverse_complement(&needle) {
        scan_overlapping(&hay, &rc, probe.name(), Orientation::ReverseComplement, &mut matches);
    }
    matches
}
