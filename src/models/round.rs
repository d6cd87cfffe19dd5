//! Round model: one doubles game between two teams of two.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::PlayerId;
use crate::pairing::PairingError;

/// Court side. Strategies treat side A and side B positionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// Recorded result of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WinnerSide {
    A,
    B,
    Tie,
}

impl WinnerSide {
    /// The winning side, or `None` for a tie.
    pub fn side(self) -> Option<Side> {
        match self {
            WinnerSide::A => Some(Side::A),
            WinnerSide::B => Some(Side::B),
            WinnerSide::Tie => None,
        }
    }
}

impl fmt::Display for WinnerSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WinnerSide::A => write!(f, "A"),
            WinnerSide::B => write!(f, "B"),
            WinnerSide::Tie => write!(f, "TIE"),
        }
    }
}

impl FromStr for WinnerSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "a" => Ok(WinnerSide::A),
            "b" => Ok(WinnerSide::B),
            "tie" | "t" | "draw" => Ok(WinnerSide::Tie),
            other => Err(format!("unknown winner side: {} (expected a, b or tie)", other)),
        }
    }
}

/// Final result attached to a locked round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub winner: WinnerSide,
    pub score_a: u32,
    pub score_b: u32,
}

impl Outcome {
    /// Build an outcome, checking that the declared winner agrees with the scores.
    pub fn new(winner: WinnerSide, score_a: u32, score_b: u32) -> Result<Self, PairingError> {
        let consistent = match winner {
            WinnerSide::A => score_a > score_b,
            WinnerSide::B => score_b > score_a,
            WinnerSide::Tie => score_a == score_b,
        };
        if !consistent {
            return Err(PairingError::InvalidOutcome(format!(
                "winner {} does not match score {}-{}",
                winner, score_a, score_b
            )));
        }

        Ok(Self {
            winner,
            score_a,
            score_b,
        })
    }
}

/// Two distinct players. Order within the team is not significant.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Team([PlayerId; 2]);

impl Team {
    pub fn new(first: PlayerId, second: PlayerId) -> Result<Self, PairingError> {
        if first == second {
            return Err(PairingError::DuplicatePlayer(first));
        }
        Ok(Self([first, second]))
    }

    /// Build a team from the first two entries of a slice.
    pub fn from_slice(players: &[PlayerId]) -> Result<Self, PairingError> {
        match players {
            [first, second, ..] => Self::new(first.clone(), second.clone()),
            _ => Err(PairingError::InsufficientPlayers {
                required: 2,
                found: players.len(),
            }),
        }
    }

    pub fn players(&self) -> &[PlayerId; 2] {
        &self.0
    }

    pub fn first(&self) -> &PlayerId {
        &self.0[0]
    }

    pub fn second(&self) -> &PlayerId {
        &self.0[1]
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.0.contains(id)
    }
}

impl PartialEq for Team {
    fn eq(&self, other: &Self) -> bool {
        let [a, b] = &self.0;
        let [c, d] = &other.0;
        (a == c && b == d) || (a == d && b == c)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} & {}", self.0[0], self.0[1])
    }
}

/// Lifecycle status of a round slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    /// Generated, replaceable via redraw
    Pending,
    /// Locked and being played, no result yet
    Active,
    /// Locked with an outcome attached
    Completed,
}

impl fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundStatus::Pending => write!(f, "pending"),
            RoundStatus::Active => write!(f, "active"),
            RoundStatus::Completed => write!(f, "completed"),
        }
    }
}

/// One round: four distinct players split into side A and side B.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// Round number, contiguous from 1
    pub number: u32,

    pub team_a: Team,

    pub team_b: Team,

    /// Roster members sitting this round out
    #[serde(default)]
    pub bench: Vec<PlayerId>,

    pub status: RoundStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

impl Round {
    /// Create a pending round.
    pub fn pending(number: u32, team_a: Team, team_b: Team, bench: Vec<PlayerId>) -> Self {
        Self {
            number,
            team_a,
            team_b,
            bench,
            status: RoundStatus::Pending,
            outcome: None,
        }
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::A => &self.team_a,
            Side::B => &self.team_b,
        }
    }

    /// All four participants, side A first.
    pub fn participants(&self) -> Vec<&PlayerId> {
        self.team_a
            .players()
            .iter()
            .chain(self.team_b.players().iter())
            .collect()
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.team_a.contains(id) || self.team_b.contains(id)
    }

    pub fn is_locked(&self) -> bool {
        self.status != RoundStatus::Pending
    }

    /// Side that won, if a decisive outcome was recorded.
    pub fn winning_side(&self) -> Option<Side> {
        self.outcome.and_then(|o| o.winner.side())
    }

    pub fn winners(&self) -> Option<&Team> {
        self.winning_side().map(|side| self.team(side))
    }

    pub fn losers(&self) -> Option<&Team> {
        self.winning_side().map(|side| self.team(side.other()))
    }

    /// Check that the four participants are pairwise distinct.
    pub fn validate(&self) -> Result<(), PairingError> {
        let mut seen = HashSet::new();
        for id in self.participants() {
            if !seen.insert(id) {
                return Err(PairingError::InvalidHistory(format!(
                    "round {} lists player {} twice",
                    self.number, id
                )));
            }
        }
        if self.status == RoundStatus::Completed && self.outcome.is_none() {
            return Err(PairingError::InvalidHistory(format!(
                "round {} is completed without an outcome",
                self.number
            )));
        }
        Ok(())
    }
}
