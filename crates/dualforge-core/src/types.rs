//! Token addresses and source locations.
//!
//! These types are the common currency between the analyzer passes (which
//! produce them while walking a parse tree) and the rewriter (which
//! consumes them to locate the bytes an edit replaces).

use serde::{Deserialize, Serialize};

/// An inclusive `[start, stop]` range over the token stream of a single file,
/// plus line/column of the first token for diagnostics.
///
/// Per spec: "Used to locate every construct that might be edited or
/// removed." `start` and `stop` are token indices, not byte offsets; the
/// rewriter resolves a `TokenAddress` to a byte [`crate::rewrite::Span`] via
/// the file's token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAddress {
    /// Index of the first token in the range (inclusive).
    pub start: u32,
    /// Index of the last token in the range (inclusive).
    pub stop: u32,
    /// 1-indexed line of the first token.
    pub line: u32,
    /// 1-indexed column of the first token.
    pub col: u32,
}

impl TokenAddress {
    pub fn new(start: u32, stop: u32, line: u32, col: u32) -> Self {
        assert!(start <= stop, "TokenAddress start ({start}) must be <= stop ({stop})");
        TokenAddress { start, stop, line, col }
    }

    /// Number of tokens spanned (inclusive on both ends).
    pub fn token_count(&self) -> u32 {
        self.stop - self.start + 1
    }

    /// Whether `self` strictly contains `other` (equal bounds count as containing).
    pub fn contains(&self, other: &TokenAddress) -> bool {
        self.start <= other.start && other.stop <= self.stop
    }

    /// Whether two ranges overlap without one strictly containing the other.
    ///
    /// Per spec invariant: "ranges do not overlap except by strict
    /// containment." This is the predicate used to detect violations of
    /// that invariant.
    pub fn overlaps_improperly(&self, other: &TokenAddress) -> bool {
        let disjoint = self.stop < other.start || other.stop < self.start;
        if disjoint {
            return false;
        }
        !(self.contains(other) || other.contains(self))
    }
}

/// A location in a source file, used in diagnostics and `CompilationException`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub col: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, col: u32) -> Self {
        Location { file: file.into(), line, col }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}
