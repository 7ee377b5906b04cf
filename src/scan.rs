//! Batch search of a probe list against one shared target.
//!
//! Each [`find_matches`] call is a pure function of (probe, target), so a
//! batch is embarrassingly parallel: the parallel path fans probes out over a
//! dedicated Rayon pool and concatenates the per-probe buffers in upload
//! order, making its output byte-identical to the sequential path.
//!
//! For large probe lists there is also an Aho-Corasick prefilter that scans
//! all needles (forward and reverse-complement) in a single overlapping pass
//! and re-buckets hits per probe. It produces the same record set and order
//! as the per-probe engine.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, AhoCorasickKind};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::detect::{find_matches, reverse_complement};
use crate::probe::{MatchRecord, Orientation, Probe};

/// Search every probe against `target` sequentially, in upload order.
///
/// Each probe contributes its forward matches (ascending) followed by its
/// reverse-complement matches (ascending), as [`find_matches`] emits them.
pub fn search_probes(probes: &[Probe], target: &str) -> Vec<MatchRecord> {
    let mut out = Vec::new();
    for p in probes {
        out.extend(find_matches(p, target));
    }
    out
}

/// Search every probe against `target` across a dedicated Rayon pool.
///
/// `threads = None` uses all logical cores. Output order is identical to
/// [`search_probes`]: per-probe result buffers are collected and concatenated
/// in upload order, so parallelism never reorders records.
pub fn search_probes_parallel(
    probes: &[Probe],
    target: &str,
    threads: Option<usize>,
) -> anyhow::Result<Vec<MatchRecord>> {
    let n = threads.unwrap_or_else(num_cpus::get).max(1);
    let pool = ThreadPoolBuilder::new().num_threads(n).build()?;
    let per_probe: Vec<Vec<MatchRecord>> =
        pool.install(|| probes.par_iter().map(|p| find_matches(p, target)).collect());
    Ok(per_probe.into_iter().flatten().collect())
}

/// One automaton pattern mapped back to its probe and strand.
struct NeedleRef {
    probe_idx: usize,
    orientation: Orientation,
}

/// An Aho-Corasick automaton over all probe needles, immutable and free to
/// share across threads once built.
pub struct Prebuilt {
    ac: AhoCorasick,
    needles: Vec<NeedleRef>,
}

/// Build an automaton across every probe's forward sequence and (where it
/// exists) reverse complement. Probes whose reverse complement cannot be
/// computed simply contribute no reverse-complement needle.
pub fn prebuild_for(probes: &[Probe]) -> anyhow::Result<Prebuilt> {
    let mut patterns: Vec<String> = Vec::with_capacity(probes.len() * 2);
    let mut needles: Vec<NeedleRef> = Vec::with_capacity(probes.len() * 2);
    for (i, p) in probes.iter().enumerate() {
        if p.is_empty() {
            continue;
        }
        patterns.push(p.sequence().to_string());
        needles.push(NeedleRef { probe_idx: i, orientation: Orientation::Forward });
        if let Ok(rc) = reverse_complement(p.sequence()) {
            patterns.push(rc);
            needles.push(NeedleRef { probe_idx: i, orientation: Orientation::ReverseComplement });
        }
    }
    let ac = AhoCorasickBuilder::new()
        .kind(Some(AhoCorasickKind::DFA)) // prefer DFA for short needles
        .build(patterns.iter().map(|s| s.as_bytes()))?;
    Ok(Prebuilt { ac, needles })
}

/// Scan `target` once with the prebuilt automaton, then re-bucket hits into
/// the per-probe engine order: probes in upload order, forward before
/// reverse-complement, positions ascending within each strand.
///
/// `pre` must have been built from the same `probes` slice.
pub fn scan_prebuilt(pre: &Prebuilt, probes: &[Probe], target: &str) -> Vec<MatchRecord> {
    let hay = target.to_ascii_uppercase();
    // (forward starts, reverse-complement starts) per probe, 0-based.
    let mut buckets: Vec<(Vec<usize>, Vec<usize>)> = vec![(Vec::new(), Vec::new()); probes.len()];
    for m in pre.ac.find_overlapping_iter(hay.as_bytes()) {
        let nr = &pre.needles[m.pattern().as_usize()];
        match nr.orientation {
            Orientation::Forward => buckets[nr.probe_idx].0.push(m.start()),
            Orientation::ReverseComplement => buckets[nr.probe_idx].1.push(m.start()),
        }
    }

    let mut out = Vec::new();
    for (i, (mut fwd, mut rev)) in buckets.into_iter().enumerate() {
        fwd.sort_unstable();
        rev.sort_unstable();
        let len = probes[i].len();
        for p in fwd {
            out.push(record_at(&hay, probes[i].name(), Orientation::Forward, p, len));
        }
        for p in rev {
            out.push(record_at(&hay, probes[i].name(), Orientation::ReverseComplement, p, len));
        }
    }
    out
}

fn record_at(hay: &str, name: &str, orientation: Orientation, p: usize, len: usize) -> MatchRecord {
    MatchRecord {
        probe_name: name.to_string(),
        orientation,
        start: p + 1,
        end: p + len,
        matched_text: hay[p..p + len].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probes() -> Vec<Probe> {
        vec![
            Probe::new("aa", "AA").unwrap(),
            Probe::new("at", "AT").unwrap(),
            Probe::new("bamhi", "GGATCC").unwrap(),
            Probe::new("miss", "GGGG").unwrap(),
        ]
    }

    const TARGET: &str = "AAATATGGATCCATAAGGATCC";

    #[test]
    fn sequential_preserves_upload_order() {
        let ps = probes();
        let m = search_probes(&ps, TARGET);
        let first_aa = m.iter().position(|r| r.probe_name == "aa").unwrap();
        let first_at = m.iter().position(|r| r.probe_name == "at").unwrap();
        assert!(first_aa < first_at);
        assert!(m.iter().all(|r| r.probe_name != "miss"));
    }

    #[test]
    fn parallel_matches_sequential_exactly() {
        let ps = probes();
        let seq = search_probes(&ps, TARGET);
        let par = search_probes_parallel(&ps, TARGET, Some(4)).unwrap();
        assert_eq!(par, seq);
        let one = search_probes_parallel(&ps, TARGET, Some(1)).unwrap();
        assert_eq!(one, seq);
    }

    #[test]
    fn prebuilt_scan_matches_sequential_exactly() {
        let ps = probes();
        let seq = search_probes(&ps, TARGET);
        let pre = prebuild_for(&ps).unwrap();
        let ac = scan_prebuilt(&pre, &ps, TARGET);
        assert_eq!(ac, seq);
    }

    #[test]
    fn prebuilt_scan_keeps_overlaps_and_palindromes() {
        let ps = vec![Probe::new("at", "AT").unwrap(), Probe::new("aa", "AA").unwrap()];
        let pre = prebuild_for(&ps).unwrap();
        let m = scan_prebuilt(&pre, &ps, "ATAT");
        assert_eq!(m, search_probes(&ps, "ATAT"));
        // Palindromic probe still duplicated across orientations.
        assert_eq!(m.iter().filter(|r| r.probe_name == "at").count(), 4);
    }

    #[test]
    fn prebuilt_scan_is_case_insensitive() {
        let ps = vec![Probe::new("p", "ATGC").unwrap()];
        let pre = prebuild_for(&ps).unwrap();
        let m = scan_prebuilt(&pre, &ps, "ttatgctt");
        assert_eq!(m, search_probes(&ps, "ttatgctt"));
        assert_eq!(m[0].matched_text, "ATGC");
    }
}
