//! Winner-stay with bench rotation, for small rosters on one court.
//!
//! Winners of the last round stay on (split across the net) unless they have
//! hit the consecutive cap; the bench rotates in ahead of the losers.

use rand::RngCore;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::{shuffle_pair, Proposal, RoundContext, RoundStrategy};
use crate::models::PlayerId;
use crate::pairing::streak::{consecutive_counts, StreakMode};
use crate::pairing::{Degradation, PairingError, StrategyKind, TeamAssembler, SEATS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WinnerStayBench;

/// Candidate pools scanned in order when filling the court.
struct Selection<'a> {
    chosen: Vec<PlayerId>,
    streaks: &'a HashMap<PlayerId, u32>,
    cap: u32,
}

impl Selection<'_> {
    fn is_full(&self) -> bool {
        self.chosen.len() >= SEATS
    }

    fn under_cap(&self, player: &PlayerId) -> bool {
        self.streaks.get(player).copied().unwrap_or(0) < self.cap
    }

    /// Take players from `pool` in order until the court is full.
    fn fill(&mut self, pool: &[PlayerId], respect_cap: bool) {
        for player in pool {
            if self.is_full() {
                return;
            }
            if self.chosen.contains(player) {
                continue;
            }
            if respect_cap && !self.under_cap(player) {
                continue;
            }
            self.chosen.push(player.clone());
        }
    }
}

impl RoundStrategy for WinnerStayBench {
    fn kind(&self) -> StrategyKind {
        StrategyKind::WinnerStayBench
    }

    fn propose(
        &self,
        ctx: &RoundContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Proposal, PairingError> {
        let roster = ctx.roster;
        if roster.len() < SEATS {
            return Err(PairingError::InsufficientPlayers {
                required: SEATS,
                found: roster.len(),
            });
        }

        let Some(last) = ctx.history.last() else {
            return Ok(Proposal::teams(shuffle_pair(roster, rng)?));
        };

        let last_players: Vec<PlayerId> = last
            .participants()
            .into_iter()
            .filter(|p| roster.contains(p))
            .cloned()
            .collect();
        if last_players.len() < SEATS {
            warn!(
                "Round {}: round {} has only {} roster players, reshuffling",
                ctx.number,
                last.number,
                last_players.len()
            );
            return Ok(Proposal::degraded(
                shuffle_pair(roster, rng)?,
                Degradation::ShortLastRound,
            ));
        }

        let mut degradation = None;
        let winners = match last.winners() {
            Some(team) => team,
            None => {
                warn!(
                    "Round {}: round {} has no decisive result, treating side A as winners",
                    ctx.number, last.number
                );
                degradation = Some(Degradation::WinnerDefaulted);
                &last.team_a
            }
        };
        let winners: Vec<PlayerId> = winners.players().to_vec();
        let losers: Vec<PlayerId> = last_players
            .iter()
            .filter(|p| !winners.contains(p))
            .cloned()
            .collect();
        let bench: Vec<PlayerId> = roster
            .iter()
            .filter(|p| !last_players.contains(p))
            .cloned()
            .collect();

        let streaks = consecutive_counts(roster, ctx.history.rounds(), StreakMode::Trailing);
        let mut selection = Selection {
            chosen: Vec::with_capacity(SEATS),
            streaks: &streaks,
            cap: ctx.consecutive_cap,
        };

        // Winners at the cap rest even though they won
        let stay: Vec<PlayerId> = winners
            .iter()
            .filter(|p| selection.under_cap(p))
            .cloned()
            .collect();
        if stay.len() < winners.len() {
            debug!(
                "Round {}: {} winner(s) resting at cap {}",
                ctx.number,
                winners.len() - stay.len(),
                ctx.consecutive_cap
            );
        }

        selection.fill(&stay, true);
        selection.fill(&bench, true);
        selection.fill(&bench, false);
        selection.fill(&losers, true);
        selection.fill(&losers, false);
        selection.fill(roster, false);

        let over_cap = selection
            .chosen
            .iter()
            .filter(|p| !selection.under_cap(p))
            .count() as u32;
        if over_cap > 0 {
            warn!(
                "Round {}: {} player(s) past the consecutive cap of {} had to play",
                ctx.number, over_cap, ctx.consecutive_cap
            );
            degradation = degradation.or(Some(Degradation::CapExceeded { players: over_cap }));
        }

        let assembly = TeamAssembler::assemble(&selection.chosen, &stay, rng)?;
        if assembly.sliced {
            warn!("Round {}: balanced assembly failed, cutting teams in order", ctx.number);
            degradation = Some(Degradation::SliceFallback);
        }

        Ok(Proposal::Teams {
            team_a: assembly.team_a,
            team_b: assembly.team_b,
            degradation,
        })
    }
}
