//! Partner switch: cross the winners (or losers) of rounds 1 and 2.

use rand::RngCore;

use super::{Proposal, RoundContext, RoundStrategy};
use crate::models::{History, Team};
use crate::pairing::{Blocked, PairingError, StrategyKind};

/// Which team of each source round is switched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchPool {
    Winners,
    Losers,
}

/// Pairs `[X1a, X2a]` against `[X1b, X2b]`, where X1/X2 are the chosen
/// teams of the two source rounds. Deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartnerSwitch {
    pub pool: SwitchPool,
    pub sources: [u32; 2],
}

impl PartnerSwitch {
    /// Switch over rounds 1 and 2.
    pub fn new(pool: SwitchPool) -> Self {
        Self {
            pool,
            sources: [1, 2],
        }
    }

    fn source_team<'h>(&self, history: &'h History, number: u32) -> Option<&'h Team> {
        let round = history.get(number)?;
        match self.pool {
            SwitchPool::Winners => round.winners(),
            SwitchPool::Losers => round.losers(),
        }
    }
}

impl RoundStrategy for PartnerSwitch {
    fn kind(&self) -> StrategyKind {
        match self.pool {
            SwitchPool::Winners => StrategyKind::PartnerSwitchWinners,
            SwitchPool::Losers => StrategyKind::PartnerSwitchLosers,
        }
    }

    fn propose(
        &self,
        ctx: &RoundContext<'_>,
        _rng: &mut dyn RngCore,
    ) -> Result<Proposal, PairingError> {
        let [first, second] = self.sources;
        let (x1, x2) = match (
            self.source_team(ctx.history, first),
            self.source_team(ctx.history, second),
        ) {
            (Some(x1), Some(x2)) => (x1, x2),
            (x1, x2) => {
                let awaiting = [(first, x1.is_none()), (second, x2.is_none())]
                    .into_iter()
                    .filter_map(|(n, missing)| missing.then_some(n))
                    .collect();
                return Ok(Proposal::Blocked(Blocked {
                    round: ctx.number,
                    awaiting,
                }));
            }
        };

        let overlap = |e: PairingError| {
            PairingError::InvalidHistory(format!(
                "rounds {} and {} share a player: {}",
                first, second, e
            ))
        };
        let team_a = Team::new(x1.first().clone(), x2.first().clone()).map_err(overlap)?;
        let team_b = Team::new(x1.second().clone(), x2.second().clone()).map_err(overlap)?;

        Ok(Proposal::teams((team_a, team_b)))
    }
}
