//! Round pairing engine.
//!
//! Given a roster, the locked round history and a tournament configuration,
//! the engine picks the applicable rule variant and proposes the next round.
//! It performs no I/O and keeps no state between calls: everything it needs is
//! passed in by value, and randomness comes from a caller-supplied RNG.

mod dispatch;
mod engine;
mod lifecycle;
mod retry;
pub mod strategies;
pub mod streak;
mod teams;

pub use dispatch::*;
pub use engine::*;
pub use lifecycle::*;
pub use retry::*;
pub use teams::*;

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::models::{PlayerId, Round, RoundStatus};

/// Players on court per round.
pub const SEATS: usize = 4;

/// Errors that can occur while pairing or transitioning rounds.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PairingError {
    #[error("Insufficient players: need at least {required}, found {found}")]
    InsufficientPlayers { required: usize, found: usize },

    #[error("Roster has {found} players but the tournament is configured for {expected}")]
    RosterSizeMismatch { expected: usize, found: usize },

    #[error("Player listed more than once: {0}")]
    DuplicatePlayer(PlayerId),

    #[error("Player {0} is not on the roster")]
    UnknownPlayer(PlayerId),

    #[error("Invalid history: {0}")]
    InvalidHistory(String),

    #[error("Round {0} not found")]
    RoundNotFound(u32),

    #[error("Cannot {action} round {round} while it is {status}")]
    InvalidTransition {
        round: u32,
        status: RoundStatus,
        action: &'static str,
    },

    #[error("Round {0} already has a different outcome; revise it first")]
    OutcomeConflict(u32),

    #[error("Invalid outcome: {0}")]
    InvalidOutcome(String),

    #[error("Cannot revise round {round}: round {later} has already been derived from it")]
    InvalidRevision { round: u32, later: u32 },

    #[error("Round {0} is already pending; redraw or start it first")]
    PendingRoundExists(u32),

    #[error("No pending round")]
    NoPendingRound,
}

/// A round cannot be generated yet because earlier outcomes are missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Blocked {
    /// Round that was requested
    pub round: u32,

    /// Rounds whose decisive outcome is still needed
    pub awaiting: Vec<u32>,
}

impl fmt::Display for Blocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let awaiting: Vec<String> = self.awaiting.iter().map(|n| n.to_string()).collect();
        write!(
            f,
            "round {} is waiting for a decisive result in round(s) {}",
            self.round,
            awaiting.join(", ")
        )
    }
}

/// A soft failure the engine recovered from locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Degradation {
    /// No random draw met the consecutive limit; roster order was used
    ConstraintUnsatisfiable { attempts: u32 },
    /// Fewer than four of the last round's players are on the roster
    ShortLastRound,
    /// Last round had no decisive result; side A was treated as the winners
    WinnerDefaulted,
    /// Balanced assembly failed; teams were cut from the selection in order
    SliceFallback,
    /// The roster was too small to rest everyone at the consecutive cap
    CapExceeded { players: u32 },
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::ConstraintUnsatisfiable { attempts } => write!(
                f,
                "no valid draw after {} attempts, fell back to roster order",
                attempts
            ),
            Degradation::ShortLastRound => write!(f, "last round incomplete, reshuffled"),
            Degradation::WinnerDefaulted => write!(f, "no winner recorded, side A stays"),
            Degradation::SliceFallback => write!(f, "teams cut from selection in order"),
            Degradation::CapExceeded { players } => write!(
                f,
                "{} player(s) past the consecutive cap had to play",
                players
            ),
        }
    }
}

/// A generated pending round plus how it was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Draft {
    pub round: Round,
    pub strategy: StrategyKind,
    pub degradation: Option<Degradation>,
}

/// Result of asking for the next round.
#[derive(Debug, Clone, PartialEq)]
pub enum NextRound {
    Ready(Draft),
    Blocked(Blocked),
}

impl NextRound {
    pub fn draft(&self) -> Option<&Draft> {
        match self {
            NextRound::Ready(draft) => Some(draft),
            NextRound::Blocked(_) => None,
        }
    }

    pub fn into_round(self) -> Option<Round> {
        match self {
            NextRound::Ready(draft) => Some(draft.round),
            NextRound::Blocked(_) => None,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, NextRound::Blocked(_))
    }
}
