//! Core types for **probes**, **match records** and the error taxonomy.
//!
//! This module holds the data model used across the crate. It is intentionally
//! simple: a probe is a named, validated, uppercase DNA string, and a match
//! record is a self-contained value tying a probe name to a 1-based span in
//! the target. Records carry no back-reference beyond the probe's name.
use core::fmt;

use thiserror::Error;

/// Errors raised by probe construction, target validation and
/// reverse-complement computation.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ProbeError {
    /// A sequence contains a character outside {A, T, G, C} (case-insensitive).
    /// Raised at the validation boundary, before any matching happens.
    #[error("invalid base '{base}' at position {position} (only A, T, G, C allowed)")]
    InvalidAlphabet { base: char, position: usize },
    /// An out-of-alphabet character was hit while complementing a sequence.
    /// The engine absorbs this as "no reverse-complement matches"; it is only
    /// surfaced by direct calls to [`crate::detect::reverse_complement`].
    #[error("cannot complement base '{base}' at position {position}")]
    InvalidBase { base: char, position: usize },
    /// An empty probe sequence or empty target where content is required.
    #[error("empty {0}")]
    EmptyInput(&'static str),
}

/// Strand orientation of a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Orientation {
    /// The probe's literal sequence occurs in the target (same strand).
    Forward,
    /// The probe's reverse complement occurs in the target, i.e. the probe
    /// would hybridize to the opposite strand.
    ReverseComplement,
}

impl Orientation {
    /// Stable, unambiguous display label: `5'->3'` for forward matches and
    /// `3'->5'` for reverse-complement matches.
    pub fn label(self) -> &'static str {
        match self {
            Orientation::Forward => "5'->3'",
            Orientation::ReverseComplement => "3'->5'",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named probe sequence. Immutable once constructed: the sequence is
/// trimmed, uppercased and alphabet-checked by [`Probe::new`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Probe {
    name: String,
    sequence: String,
}

impl Probe {
    /// Build a probe from a caller-defined name and a raw sequence string.
    ///
    /// The sequence is trimmed and uppercased before validation. Fails on an
    /// empty name, an empty sequence, or any character outside {A, T, G, C}.
    ///
    /// # Examples
    /// ```
    /// let p = probematch::Probe::new("p1", "atgc").unwrap();
    /// assert_eq!(p.sequence(), "ATGC");
    /// assert!(probematch::Probe::new("p2", "ATXG").is_err());
    /// ```
    pub fn new(name: &str, sequence: &str) -> Result<Self, ProbeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProbeError::EmptyInput("probe name"));
        }
        let seq = sequence.trim().to_ascii_uppercase();
        if seq.is_empty() {
            return Err(ProbeError::EmptyInput("probe sequence"));
        }
        if let Some((i, c)) = seq.chars().enumerate().find(|&(_, c)| !matches!(c, 'A' | 'T' | 'G' | 'C')) {
            return Err(ProbeError::InvalidAlphabet { base: c, position: i });
        }
        Ok(Probe { name: name.to_string(), sequence: seq })
    }

    /// The caller-defined identifier (not required to be unique).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The uppercase, validated sequence.
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Probe length in bases.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Always false for a constructed probe; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// A single exact occurrence of a probe (or its reverse complement) in the
/// target. Positions are 1-based and inclusive, relative to the
/// whitespace-stripped target; `end - start + 1` equals the probe length.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MatchRecord {
    /// Name of the probe that produced this match.
    pub probe_name: String,
    /// Which strand the probe matched on.
    pub orientation: Orientation,
    /// 1-based start position in the target (inclusive).
    pub start: usize,
    /// 1-based end position in the target (inclusive).
    pub end: usize,
    /// The target substring at `[start, end]`; equals the probe sequence for
    /// forward matches and its reverse complement otherwise.
    pub matched_text: String,
}

/// A probe row rejected at the intake boundary, reported alongside the valid
/// subset rather than raised per row, so callers can batch-report rejects.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvalidProbe {
    /// Name field as read from the input.
    pub name: String,
    /// Raw sequence field (uppercased) that failed validation.
    pub sequence: String,
    /// 1-based source line of the offending row.
    pub line: usize,
}
