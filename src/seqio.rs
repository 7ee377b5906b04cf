//! Boundary IO: probe CSV intake, target sequence loading, and result export.
//!
//! ### Design
//! - **Probe lists** are CSV `name,sequence` rows parsed with the `csv`
//!   crate. A leading header row is sniffed by keyword, and rows that fail
//!   alphabet validation are returned in a side list instead of aborting the
//!   parse, so a batch can continue with its valid subset.
//! - **Targets** come from plain-text files (all whitespace stripped) or from
//!   FASTA/FASTQ files parsed with `needletail` (first record's sequence).
//! - **Exports**: CSV via the `csv` crate, JSON via `serde_json`.
//!
//! ### Errors
//! Parsing/IO errors are bubbled via `anyhow::Result` to the caller;
//! validation failures carry the offending character and position.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::Result;
use csv::{ReaderBuilder, Trim};
use needletail::parse_fastx_file;

use crate::probe::{InvalidProbe, MatchRecord, Orientation, Probe, ProbeError};

/// Result of parsing a probe CSV: the valid probes in file order plus the
/// rejected rows, reported as a batch rather than per-row errors.
#[derive(Debug)]
pub struct ProbeSet {
    /// Probes that passed validation, in upload order.
    pub probes: Vec<Probe>,
    /// Rows whose sequence failed alphabet validation.
    pub invalid: Vec<InvalidProbe>,
}

/// Header keywords recognized in the first CSV row, as in common probe-list
/// exports (`probe,name`, `id,sequence`, ...).
const HEADER_KEYWORDS: &[&str] = &["probe", "name", "sequence", "id", "label"];

fn looks_like_header(first: &csv::StringRecord) -> bool {
    let f0 = first.get(0).unwrap_or("").to_lowercase();
    let f1 = first.get(1).unwrap_or("").to_lowercase();
    HEADER_KEYWORDS.iter().any(|k| f0.contains(k) || f1.contains(k))
}

/// Parse probe rows from any reader. See [`read_probe_csv`] for the
/// file-path wrapper.
///
/// Rows with fewer than two non-empty fields are skipped. A completely empty
/// input, or one yielding neither valid nor invalid rows, is an error.
pub fn parse_probe_csv<R: Read>(rdr: R) -> Result<ProbeSet> {
    let mut csv = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(rdr);

    let mut probes = Vec::new();
    let mut invalid = Vec::new();
    let mut first_row = true;

    for (idx, rec) in csv.records().enumerate() {
        let rec = rec?;
        let line = idx + 1;
        if first_row {
            first_row = false;
            if looks_like_header(&rec) {
                continue;
            }
        }
        // Strip a UTF-8 BOM that spreadsheet exports leave on the first cell.
        let name = rec.get(0).unwrap_or("").trim_start_matches('\u{feff}').trim();
        let seq = rec.get(1).unwrap_or("").trim();
        if name.is_empty() || seq.is_empty() {
            continue;
        }
        match Probe::new(name, seq) {
            Ok(p) => probes.push(p),
            Err(_) => invalid.push(InvalidProbe {
                name: name.to_string(),
                sequence: seq.to_ascii_uppercase(),
                line,
            }),
        }
    }

    if probes.is_empty() && invalid.is_empty() {
        anyhow::bail!("no probe data found (expected CSV rows of name,sequence)");
    }
    Ok(ProbeSet { probes, invalid })
}

/// Read a probe CSV file from disk.
pub fn read_probe_csv<P: AsRef<Path>>(path: P) -> Result<ProbeSet> {
    let p = path.as_ref();
    let f = std::fs::File::open(p)
        .map_err(|e| anyhow::anyhow!("cannot open probe CSV {}: {}", p.display(), e))?;
    parse_probe_csv(f)
}

/// Strip all whitespace and uppercase a raw target string.
pub fn normalize_target(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Check a normalized target: non-empty and restricted to {A, T, G, C}.
pub fn validate_target(seq: &str) -> Result<(), ProbeError> {
    if seq.is_empty() {
        return Err(ProbeError::EmptyInput("target sequence"));
    }
    if let Some((i, c)) = seq.chars().enumerate().find(|&(_, c)| !matches!(c, 'A' | 'T' | 'G' | 'C')) {
        return Err(ProbeError::InvalidAlphabet { base: c, position: i });
    }
    Ok(())
}

fn is_fastx_path(p: &Path) -> bool {
    let name = p.file_name().and_then(|s| s.to_str()).unwrap_or("").to_ascii_lowercase();
    name.ends_with(".fa")
        || name.ends_with(".fasta")
        || name.ends_with(".fna")
        || name.ends_with(".fq")
        || name.ends_with(".fastq")
        || name.ends_with(".gz")
}

/// Load, normalize and validate a target sequence from a file.
///
/// FASTA/FASTQ files (by extension, gzipped included) are parsed with
/// `needletail` and the **first** record's sequence is taken; anything else
/// is read as plain text. Whitespace is stripped and the result uppercased
/// before validation.
pub fn read_target<P: AsRef<Path>>(path: P) -> Result<String> {
    let p = path.as_ref();
    let raw = if is_fastx_path(p) {
        let mut reader = parse_fastx_file(p)?;
        match reader.next() {
            Some(rec) => {
                let rec = rec?;
                String::from_utf8_lossy(&rec.seq()).to_string()
            }
            None => anyhow::bail!("no sequence records in {}", p.display()),
        }
    } else {
        std::fs::read_to_string(p)
            .map_err(|e| anyhow::anyhow!("cannot read target {}: {}", p.display(), e))?
    };
    let target = normalize_target(&raw);
    validate_target(&target)?;
    Ok(target)
}

/// Write match records as CSV with the canonical five-column header.
pub fn write_matches_csv<W: Write>(w: W, matches: &[MatchRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(w);
    wtr.write_record([
        "Probe Name",
        "Match Type",
        "Start Position",
        "End Position",
        "Matched Sequence",
    ])?;
    for m in matches {
        let start = m.start.to_string();
        let end = m.end.to_string();
        wtr.write_record([
            m.probe_name.as_str(),
            m.orientation.label(),
            start.as_str(),
            end.as_str(),
            m.matched_text.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write match records plus a count summary as pretty-printed JSON.
pub fn write_matches_json<W: Write>(w: W, matches: &[MatchRecord]) -> Result<()> {
    let rows: Vec<serde_json::Value> = matches
        .iter()
        .map(|m| {
            serde_json::json!({
                "probe": m.probe_name,
                "orientation": m.orientation.label(),
                "start": m.start,
                "end": m.end,
                "matched": m.matched_text,
            })
        })
        .collect();
    let forward = matches.iter().filter(|m| m.orientation == Orientation::Forward).count();
    let combined = serde_json::json!({
        "matches": rows,
        "summary": {
            "total": matches.len(),
            "forward": forward,
            "reverse_complement": matches.len() - forward,
        }
    });
    serde_json::to_writer_pretty(w, &combined)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_csv_with_header_row() {
        let data = "Probe Name,Sequence\np1,ATGC\np2,ggaa\n";
        let set = parse_probe_csv(data.as_bytes()).unwrap();
        assert_eq!(set.probes.len(), 2);
        assert!(set.invalid.is_empty());
        assert_eq!(set.probes[0].name(), "p1");
        assert_eq!(set.probes[1].sequence(), "GGAA");
    }

    #[test]
    fn first_row_without_header_keywords_is_data() {
        let data = "x1,ATGC\nx2,TTAA\n";
        let set = parse_probe_csv(data.as_bytes()).unwrap();
        assert_eq!(set.probes.len(), 2);
        assert_eq!(set.probes[0].name(), "x1");
    }

    #[test]
    fn invalid_rows_go_to_side_list_with_line_numbers() {
        let data = "name,sequence\nok,ATGC\nbad,ATXG\nworse,atgn\n";
        let set = parse_probe_csv(data.as_bytes()).unwrap();
        assert_eq!(set.probes.len(), 1);
        assert_eq!(set.invalid.len(), 2);
        assert_eq!(set.invalid[0].name, "bad");
        assert_eq!(set.invalid[0].sequence, "ATXG");
        assert_eq!(set.invalid[0].line, 3);
        assert_eq!(set.invalid[1].line, 4);
    }

    #[test]
    fn short_and_blank_rows_are_skipped() {
        let data = "name,sequence\np1,ATGC\nonlyname\n,\n";
        let set = parse_probe_csv(data.as_bytes()).unwrap();
        assert_eq!(set.probes.len(), 1);
        assert!(set.invalid.is_empty());
    }

    #[test]
    fn bom_on_first_cell_is_stripped() {
        let data = "\u{feff}p1,ATGC\n";
        let set = parse_probe_csv(data.as_bytes()).unwrap();
        assert_eq!(set.probes[0].name(), "p1");
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(parse_probe_csv("".as_bytes()).is_err());
    }

    #[test]
    fn target_normalization_and_validation() {
        assert_eq!(normalize_target(" at gc\nTT \t"), "ATGCTT");
        assert!(validate_target("ATGC").is_ok());
        assert_eq!(
            validate_target("ATXG").unwrap_err(),
            ProbeError::InvalidAlphabet { base: 'X', position: 2 }
        );
        assert_eq!(
            validate_target("").unwrap_err(),
            ProbeError::EmptyInput("target sequence")
        );
    }

    #[test]
    fn csv_export_has_canonical_columns() {
        let m = vec![MatchRecord {
            probe_name: "p1".to_string(),
            orientation: Orientation::Forward,
            start: 1,
            end: 4,
            matched_text: "ATGC".to_string(),
        }];
        let mut buf = Vec::new();
        write_matches_csv(&mut buf, &m).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert!(s.starts_with("Probe Name,Match Type,Start Position,End Position,Matched Sequence"));
        assert!(s.contains("p1,5'->3',1,4,ATGC"));
    }

    #[test]
    fn json_export_round_trips_and_counts() {
        let m = vec![
            MatchRecord {
                probe_name: "p1".to_string(),
                orientation: Orientation::Forward,
                start: 1,
                end: 2,
                matched_text: "AT".to_string(),
            },
            MatchRecord {
                probe_name: "p1".to_string(),
                orientation: Orientation::ReverseComplement,
                start: 3,
                end: 4,
                matched_text: "AT".to_string(),
            },
        ];
        let mut buf = Vec::new();
        write_matches_json(&mut buf, &m).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(v["summary"]["total"], 2);
        assert_eq!(v["summary"]["forward"], 1);
        assert_eq!(v["summary"]["reverse_complement"], 1);
        assert_eq!(v["matches"][1]["orientation"], "3'->5'");
    }
}
