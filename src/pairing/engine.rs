//! Pairing engine: validates inputs, dispatches to a strategy, builds the round.

use rand::RngCore;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::strategies::{Proposal, RoundContext};
use super::{Draft, NextRound, PairingError, RetryPolicy, Ruleset, Strategy, SEATS};
use crate::config::{ConfigError, TournamentConfig};
use crate::models::{History, PlayerId, Round, RoundStatus};

/// Stateless round generator for one tournament configuration.
#[derive(Debug, Clone)]
pub struct PairingEngine {
    config: TournamentConfig,
    ruleset: Ruleset,
}

impl PairingEngine {
    /// Validate the configuration up front; unsupported combinations fail here.
    pub fn new(config: TournamentConfig) -> Result<Self, ConfigError> {
        let ruleset = config.validate()?;
        Ok(Self { config, ruleset })
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    pub fn select_strategy(&self, round_index: u32) -> Strategy {
        self.ruleset.select(round_index)
    }

    /// Propose the next round for `history`.
    ///
    /// `force_no` overrides the round number verbatim; the strategy is still
    /// chosen by the slot following the last locked round.
    pub fn next_round(
        &self,
        roster: &[PlayerId],
        history: &History,
        force_no: Option<u32>,
        rng: &mut dyn RngCore,
    ) -> Result<NextRound, PairingError> {
        self.check_roster(roster)?;
        check_history(roster, history)?;

        let slot = history.next_number();
        let number = force_no.unwrap_or(slot);
        let strategy = self.select_strategy(slot);
        debug!("Round {}: using {} strategy", number, strategy.kind());

        let ctx = RoundContext {
            number,
            roster,
            history,
            consecutive_cap: self.config.consecutive_cap,
            retry: RetryPolicy::new(self.config.max_retries),
        };

        match strategy.as_strategy().propose(&ctx, rng)? {
            Proposal::Blocked(blocked) => {
                info!("{}", blocked);
                Ok(NextRound::Blocked(blocked))
            }
            Proposal::Teams {
                team_a,
                team_b,
                degradation,
            } => {
                let bench = roster
                    .iter()
                    .filter(|p| !team_a.contains(p) && !team_b.contains(p))
                    .cloned()
                    .collect();
                let round = Round::pending(number, team_a, team_b, bench);
                round.validate()?;

                if let Some(degradation) = degradation {
                    warn!("Round {} degraded: {}", number, degradation);
                }

                Ok(NextRound::Ready(Draft {
                    round,
                    strategy: strategy.kind(),
                    degradation,
                }))
            }
        }
    }

    /// Regenerate the pending round with fresh randomness, keeping its number.
    pub fn redraw(
        &self,
        roster: &[PlayerId],
        history: &History,
        pending: &Round,
        rng: &mut dyn RngCore,
    ) -> Result<NextRound, PairingError> {
        if pending.status != RoundStatus::Pending {
            return Err(PairingError::InvalidTransition {
                round: pending.number,
                status: pending.status,
                action: "redraw",
            });
        }
        let expected = history.next_number();
        if pending.number != expected {
            return Err(PairingError::InvalidHistory(format!(
                "pending round {} does not follow locked round {}",
                pending.number,
                expected - 1
            )));
        }

        info!("Redrawing round {}", pending.number);
        self.next_round(roster, history, Some(pending.number), rng)
    }

    fn check_roster(&self, roster: &[PlayerId]) -> Result<(), PairingError> {
        if roster.len() < SEATS {
            return Err(PairingError::InsufficientPlayers {
                required: SEATS,
                found: roster.len(),
            });
        }
        if roster.len() != self.config.player_count {
            return Err(PairingError::RosterSizeMismatch {
                expected: self.config.player_count,
                found: roster.len(),
            });
        }

        let mut seen = HashSet::new();
        for id in roster {
            if !seen.insert(id) {
                return Err(PairingError::DuplicatePlayer(id.clone()));
            }
        }
        Ok(())
    }
}

fn check_history(roster: &[PlayerId], history: &History) -> Result<(), PairingError> {
    for round in history.rounds() {
        if let Some(unknown) = round.participants().into_iter().find(|p| !roster.contains(p)) {
            return Err(PairingError::UnknownPlayer(unknown.clone()));
        }
    }
    Ok(())
}
