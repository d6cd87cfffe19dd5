//! Interchangeable rule variants that propose the next round.

mod constrained_random;
mod intro;
mod partner_switch;
mod winner_stay;

pub use constrained_random::ConstrainedRandom;
pub use intro::IntroRound;
pub use partner_switch::{PartnerSwitch, SwitchPool};
pub use winner_stay::WinnerStayBench;

use rand::seq::SliceRandom;
use rand::RngCore;

use super::{Blocked, Degradation, PairingError, RetryPolicy, StrategyKind, TeamAssembler};
use crate::models::{History, PlayerId, Team};

/// Everything a strategy may look at when proposing a round.
#[derive(Debug, Clone, Copy)]
pub struct RoundContext<'a> {
    /// Number the proposed round will carry
    pub number: u32,
    pub roster: &'a [PlayerId],
    pub history: &'a History,
    pub consecutive_cap: u32,
    pub retry: RetryPolicy,
}

/// What a strategy produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Proposal {
    Teams {
        team_a: Team,
        team_b: Team,
        degradation: Option<Degradation>,
    },
    Blocked(Blocked),
}

impl Proposal {
    pub(crate) fn teams((team_a, team_b): (Team, Team)) -> Self {
        Proposal::Teams {
            team_a,
            team_b,
            degradation: None,
        }
    }

    pub(crate) fn degraded((team_a, team_b): (Team, Team), degradation: Degradation) -> Self {
        Proposal::Teams {
            team_a,
            team_b,
            degradation: Some(degradation),
        }
    }
}

/// A rule variant.
pub trait RoundStrategy {
    fn kind(&self) -> StrategyKind;

    /// Propose teams for `ctx.number`.
    fn propose(
        &self,
        ctx: &RoundContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Proposal, PairingError>;
}

/// Uniformly shuffled copy of the roster.
pub(crate) fn shuffled(roster: &[PlayerId], rng: &mut dyn RngCore) -> Vec<PlayerId> {
    let mut players = roster.to_vec();
    players.shuffle(rng);
    players
}

/// First four of a fresh shuffle, split [0:2] / [2:4].
pub(crate) fn shuffle_pair(
    roster: &[PlayerId],
    rng: &mut dyn RngCore,
) -> Result<(Team, Team), PairingError> {
    TeamAssembler::split_in_order(&shuffled(roster, rng))
}
