//! Debate outcomes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Label shown for outcomes that are not recognised.
pub const UNKNOWN_RESULT_LABEL: &str = "Unknown";

/// Outcome of a debate from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebateResult {
    /// The player won.
    Win,
    /// The player lost.
    Loss,
    /// Neither side won.
    Draw,
    /// The debate has not finished.
    Ongoing,
}

impl DebateResult {
    /// Display label for the outcome.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Win => "Victory",
            Self::Loss => "Defeat",
            Self::Draw => "Draw",
            Self::Ongoing => "In Progress",
        }
    }

    /// Wire name of the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Loss => "loss",
            Self::Draw => "draw",
            Self::Ongoing => "ongoing",
        }
    }
}

impl FromStr for DebateResult {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(Self::Win),
            "loss" => Ok(Self::Loss),
            "draw" => Ok(Self::Draw),
            "ongoing" => Ok(Self::Ongoing),
            other => Err(DomainError::UnknownDebateResult(other.to_string())),
        }
    }
}

impl fmt::Display for DebateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps a raw outcome string to its display label.
///
/// Anything that is not `win`, `loss`, `draw` or `ongoing` maps to
/// [`UNKNOWN_RESULT_LABEL`].
#[must_use]
pub fn format_debate_result(result: &str) -> &'static str {
    result
        .parse::<DebateResult>()
        .map_or(UNKNOWN_RESULT_LABEL, DebateResult::label)
}
