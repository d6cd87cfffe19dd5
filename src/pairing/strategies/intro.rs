//! Intro rounds: fresh groups of four for the opening rounds.

use rand::RngCore;
use tracing::debug;

use super::{shuffled, Proposal, RoundContext, RoundStrategy};
use crate::pairing::dispatch::INTRO_MIN_PLAYERS;
use crate::pairing::{PairingError, StrategyKind, TeamAssembler};

/// Shuffles the roster and seats four players who have not played yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntroRound;

impl RoundStrategy for IntroRound {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Intro
    }

    fn propose(
        &self,
        ctx: &RoundContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Proposal, PairingError> {
        if ctx.roster.len() < INTRO_MIN_PLAYERS {
            return Err(PairingError::InsufficientPlayers {
                required: INTRO_MIN_PLAYERS,
                found: ctx.roster.len(),
            });
        }

        // Unused players first, then already-used ones if the roster forces reuse
        let (fresh, used): (Vec<_>, Vec<_>) = shuffled(ctx.roster, rng)
            .into_iter()
            .partition(|p| !ctx.history.rounds().iter().any(|r| r.contains(p)));

        if fresh.len() < crate::pairing::SEATS {
            debug!(
                "Round {}: only {} unused players, reusing earlier players",
                ctx.number,
                fresh.len()
            );
        }

        let order: Vec<_> = fresh.into_iter().chain(used).collect();
        Ok(Proposal::teams(TeamAssembler::split_in_order(&order)?))
    }
}
