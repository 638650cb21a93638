//! Vote symbols, tallies, and canonical model pairs
//!
//! A rater answers each criterion with one of four symbols. Each symbol maps
//! to a one-hot increment over (win1, tie, win2) relative to the models as
//! they were displayed. Before storage the displayed pair is canonicalized so
//! that (win_a, win_b) always refer to the case-insensitively smaller model
//! first, regardless of which side it was shown on.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

// ========================================
// Vote Symbols
// ========================================

/// One rater answer for one criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteSymbol {
    /// Left (first displayed) response wins, wire form `"1"`
    LeftWins,
    /// Tie, wire form `"t"`
    Tie,
    /// Both responses missed the criterion, wire form `"b"`
    BothMissed,
    /// Right (second displayed) response wins, wire form `"2"`
    RightWins,
}

impl VoteSymbol {
    /// All accepted symbols in display order
    pub const ALL: [VoteSymbol; 4] = [
        VoteSymbol::LeftWins,
        VoteSymbol::Tie,
        VoteSymbol::BothMissed,
        VoteSymbol::RightWins,
    ];

    /// Wire encoding
    pub fn as_str(self) -> &'static str {
        match self {
            VoteSymbol::LeftWins => "1",
            VoteSymbol::Tie => "t",
            VoteSymbol::BothMissed => "b",
            VoteSymbol::RightWins => "2",
        }
    }

    /// Increment vector relative to the displayed (left, right) order
    ///
    /// Both-missed shares the tie bucket; there is no fourth counter.
    pub fn increment(self) -> Tally {
        match self {
            VoteSymbol::LeftWins => Tally::new(1, 0, 0),
            VoteSymbol::Tie | VoteSymbol::BothMissed => Tally::new(0, 1, 0),
            VoteSymbol::RightWins => Tally::new(0, 0, 1),
        }
    }

    /// The symbol a rater would give if the two sides were swapped
    pub fn mirrored(self) -> Self {
        match self {
            VoteSymbol::LeftWins => VoteSymbol::RightWins,
            VoteSymbol::RightWins => VoteSymbol::LeftWins,
            other => other,
        }
    }
}

impl FromStr for VoteSymbol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1" => Ok(VoteSymbol::LeftWins),
            "t" => Ok(VoteSymbol::Tie),
            "b" => Ok(VoteSymbol::BothMissed),
            "2" => Ok(VoteSymbol::RightWins),
            other => Err(Error::InvalidInput(format!("Invalid vote value: {:?}", other))),
        }
    }
}

impl fmt::Display for VoteSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for VoteSymbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for VoteSymbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ========================================
// Tallies
// ========================================

/// Win/tie counters for one model pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub win1: i64,
    pub tie: i64,
    pub win2: i64,
}

impl Tally {
    pub fn new(win1: i64, tie: i64, win2: i64) -> Self {
        Self { win1, tie, win2 }
    }

    /// Swap the win counters when the pair was flipped during canonicalization
    pub fn oriented(self, flipped: bool) -> Self {
        if flipped {
            Self::new(self.win2, self.tie, self.win1)
        } else {
            self
        }
    }

    /// Total number of vote batches accumulated
    pub fn total(&self) -> i64 {
        self.win1 + self.tie + self.win2
    }
}

impl std::ops::Add for Tally {
    type Output = Tally;

    fn add(self, rhs: Tally) -> Tally {
        Tally::new(self.win1 + rhs.win1, self.tie + rhs.tie, self.win2 + rhs.win2)
    }
}

// ========================================
// Canonical Pairs
// ========================================

/// Model pair in storage order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPair {
    pub model_a: String,
    pub model_b: String,
    /// True when the displayed order was (model_b, model_a)
    pub flipped: bool,
}

/// Order two model names case-insensitively
///
/// Names equal ignoring case are ordered by their exact bytes, so the
/// result never depends on display order.
///
/// # Examples
///
/// ```
/// use judge_common::vote::normalize_pair;
///
/// let pair = normalize_pair("gpt-4", "Claude");
/// assert_eq!(pair.model_a, "Claude");
/// assert_eq!(pair.model_b, "gpt-4");
/// assert!(pair.flipped);
/// ```
pub fn normalize_pair(a: &str, b: &str) -> CanonicalPair {
    if (a.to_lowercase(), a) <= (b.to_lowercase(), b) {
        CanonicalPair {
            model_a: a.to_string(),
            model_b: b.to_string(),
            flipped: false,
        }
    } else {
        CanonicalPair {
            model_a: b.to_string(),
            model_b: a.to_string(),
            flipped: true,
        }
    }
}
