//! Random draws that respect a windowed consecutive-play limit.

use rand::RngCore;
use tracing::warn;

use super::{shuffle_pair, Proposal, RoundContext, RoundStrategy};
use crate::models::Team;
use crate::pairing::streak::{consecutive_counts, StreakMode};
use crate::pairing::{Attempt, Degradation, PairingError, StrategyKind, TeamAssembler, SEATS};

/// Draws random foursomes until none of the four has played in every one of
/// the last `consecutive_cap` rounds. Falls back to the first four roster
/// players when no draw qualifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConstrainedRandom;

impl RoundStrategy for ConstrainedRandom {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ConstrainedRandom
    }

    fn propose(
        &self,
        ctx: &RoundContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Proposal, PairingError> {
        if ctx.roster.len() < SEATS {
            return Err(PairingError::InsufficientPlayers {
                required: SEATS,
                found: ctx.roster.len(),
            });
        }

        let cap = ctx.consecutive_cap;
        let recent = consecutive_counts(
            ctx.roster,
            ctx.history.rounds(),
            StreakMode::Window(cap),
        );
        let within_limit = |(a, b): &(Team, Team)| {
            a.players()
                .iter()
                .chain(b.players())
                .all(|p| recent.get(p).copied().unwrap_or(0) < cap)
        };

        let attempt = ctx.retry.run(
            || shuffle_pair(ctx.roster, rng),
            within_limit,
            || TeamAssembler::split_in_order(ctx.roster),
        )?;

        Ok(match attempt {
            Attempt::Accepted { value, .. } => Proposal::teams(value),
            Attempt::Fallback { value, attempts } => {
                warn!(
                    "Round {}: no draw within the limit of {} after {} attempts, using roster order",
                    ctx.number, cap, attempts
                );
                Proposal::degraded(value, Degradation::ConstraintUnsatisfiable { attempts })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityId, History, PlayerId, Round, RoundStatus};
    use crate::pairing::RetryPolicy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn roster(names: &[&str]) -> Vec<PlayerId> {
        names.iter().map(|n| EntityId::from(*n)).collect()
    }

    fn active(number: u32, players: [&str; 4]) -> Round {
        let [a, b, c, d] = players.map(EntityId::from);
        let mut round = Round::pending(
            number,
            Team::new(a, b).unwrap(),
            Team::new(c, d).unwrap(),
            vec![],
        );
        round.status = RoundStatus::Active;
        round
    }

    fn propose(roster: &[PlayerId], history: &History, retries: u32, seed: u64) -> Proposal {
        let ctx = RoundContext {
            number: history.next_number(),
            roster,
            history,
            consecutive_cap: 2,
            retry: RetryPolicy::new(retries),
        };
        ConstrainedRandom
            .propose(&ctx, &mut StdRng::seed_from_u64(seed))
            .unwrap()
    }

    #[test]
    fn test_players_in_both_recent_rounds_are_rested() {
        let roster = roster(&["A", "B", "C", "D", "E", "F", "G", "H"]);
        let history = History::from_rounds(vec![
            active(1, ["A", "B", "C", "D"]),
            active(2, ["A", "B", "E", "F"]),
        ])
        .unwrap();

        for seed in 0..25 {
            let Proposal::Teams {
                team_a,
                team_b,
                degradation,
            } = propose(&roster, &history, 200, seed)
            else {
                panic!("constrained random never blocks");
            };
            assert!(degradation.is_none());
            for rested in ["A", "B"].map(EntityId::from) {
                assert!(!team_a.contains(&rested) && !team_b.contains(&rested));
            }
        }
    }

    #[test]
    fn test_falls_back_to_roster_order_when_unsatisfiable() {
        let roster = roster(&["A", "B", "C", "D"]);
        let history = History::from_rounds(vec![
            active(1, ["A", "B", "C", "D"]),
            active(2, ["A", "C", "B", "D"]),
        ])
        .unwrap();

        let proposal = propose(&roster, &history, 20, 9);
        assert_eq!(
            proposal,
            Proposal::Teams {
                team_a: Team::new(EntityId::from("A"), EntityId::from("B")).unwrap(),
                team_b: Team::new(EntityId::from("C"), EntityId::from("D")).unwrap(),
                degradation: Some(Degradation::ConstraintUnsatisfiable { attempts: 20 }),
            }
        );
    }

    #[test]
    fn test_short_history_is_unconstrained() {
        let roster = roster(&["A", "B", "C", "D"]);
        let history = History::from_rounds(vec![active(1, ["A", "B", "C", "D"])]).unwrap();

        let Proposal::Teams { degradation, .. } = propose(&roster, &history, 20, 4) else {
            panic!("constrained random never blocks");
        };
        assert!(degradation.is_none());
    }
}
