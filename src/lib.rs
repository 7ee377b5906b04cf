#![forbid(unsafe_code)]
//! # probematch
//!
//! Exact matching of short **probe** nucleotide sequences within a longer
//! **target** sequence, in both the probe's literal orientation and its
//! **reverse complement**, with 1-based inclusive match coordinates.
//!
//! ## Highlights
//! - **Overlapping matches are found**: the scan cursor advances one base
//!   past each hit, so `AA` in `AAAA` reports starts 1, 2 and 3.
//! - **Pure engine**: [`find_matches`] is a function of (probe, target) to a
//!   record list, with no retained state across calls.
//! - **Resilient batches**: invalid probe rows are collected into a side
//!   list at the CSV boundary; the valid subset is still searched.
//!
//! ## Examples
//! ```rust
//! let probe = probematch::Probe::new("bamhi", "GGATCC").unwrap();
//! let hits = probematch::find_matches(&probe, "AAGGATCCTT");
//! assert_eq!(hits.len(), 2); // the BamHI site is palindromic
//! assert_eq!((hits[0].start, hits[0].end), (3, 8));
//! ```

pub mod detect;
pub mod probe;
pub mod scan;
pub mod seqio;

pub use detect::{find_matches, is_valid_sequence, reverse_complement};
pub use probe::{InvalidProbe, MatchRecord, Orientation, Probe, ProbeError};
pub use scan::{search_probes, search_probes_parallel};

/// Crate version string (from `CARGO_PKG_VERSION`).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convert an [`Orientation`] into a stable, human-readable &str.
#[doc = "This returns one of: `5'->3'` (forward) or `3'->5'` (reverse complement)."]
pub fn orientation_to_str(o: Orientation) -> &'static str {
    o.label()
}

/// Convenience: flatten match records into display rows for CLI/UX.
/// Each row is `(probe_name, orientation_label, start, end, matched_text)`.
pub fn match_rows(matches: &[MatchRecord]) -> Vec<(String, String, u64, u64, String)> {
    matches
        .iter()
        .map(|m| {
            (
                m.probe_name.clone(),
                m.orientation.label().to_string(),
                m.start as u64,
                m.end as u64,
                m.matched_text.clone(),
            )
        })
        .collect()
}

#[cfg(test)]
mod cli_support_tests {
    use super::*;

    #[test]
    fn match_rows_keep_order_and_labels() {
        let p = Probe::new("at", "AT").unwrap();
        let rows = match_rows(&find_matches(&p, "ATAT"));
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], ("at".to_string(), "5'->3'".to_string(), 1, 2, "AT".to_string()));
        assert_eq!(rows[2].1, "3'->5'");
    }

    #[test]
    fn orientation_labels_round_trip() {
        assert_eq!(orientation_to_str(Orientation::Forward), "5'->3'");
        assert_eq!(orientation_to_str(Orientation::ReverseComplement), "3'->5'");
    }
}

#[cfg(test)]
mod exactness_tests {
    use super::*;

    // Every record's matched_text must equal the target slice at its span.
    #[test]
    fn records_are_exact_against_the_target() {
        let target = "ACGTACGTTTGGATCCAA";
        for seq in ["ACGT", "GGATCC", "TT", "A"] {
            let p = Probe::new(seq, seq).unwrap();
            for r in find_matches(&p, target) {
                assert_eq!(r.matched_text, &target[r.start - 1..r.end]);
                assert_eq!(r.end - r.start + 1, p.len());
            }
        }
    }

    // Every literal occurrence must be reported exactly once per orientation.
    #[test]
    fn completeness_of_the_forward_scan() {
        let target = "AAGAAGAA";
        let p = Probe::new("p", "AAG").unwrap();
        let expected: Vec<usize> = (0..=target.len() - 3)
            .filter(|&i| &target[i..i + 3] == "AAG")
            .map(|i| i + 1)
            .collect();
        let got: Vec<usize> = find_matches(&p, target)
            .into_iter()
            .filter(|m| m.orientation == Orientation::Forward)
            .map(|m| m.start)
            .collect();
        assert_eq!(got, expected);
    }
}
