//! Splitting four selected players into two teams.

use rand::seq::SliceRandom;
use rand::RngCore;

use super::{PairingError, SEATS};
use crate::models::{PlayerId, Team};

/// Two assembled teams.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub team_a: Team,
    pub team_b: Team,
    /// Balanced assembly failed and the selection was cut in order
    pub sliced: bool,
}

pub struct TeamAssembler;

impl TeamAssembler {
    /// Teams from fixed slices `[0:2]` and `[2:4]`.
    pub fn split_in_order(pool: &[PlayerId]) -> Result<(Team, Team), PairingError> {
        if pool.len() < SEATS {
            return Err(PairingError::InsufficientPlayers {
                required: SEATS,
                found: pool.len(),
            });
        }
        Ok((Team::from_slice(&pool[0..2])?, Team::from_slice(&pool[2..4])?))
    }

    /// Balanced teams from the first four selected players.
    ///
    /// Up to two `must_split` players are placed one per side; the rest are
    /// shuffled and fill side A, then side B.
    pub fn assemble(
        selected: &[PlayerId],
        must_split: &[PlayerId],
        rng: &mut dyn RngCore,
    ) -> Result<Assembly, PairingError> {
        if selected.len() < SEATS {
            return Err(PairingError::InsufficientPlayers {
                required: SEATS,
                found: selected.len(),
            });
        }
        let selected = &selected[..SEATS];

        let mut side_a: Vec<PlayerId> = Vec::with_capacity(2);
        let mut side_b: Vec<PlayerId> = Vec::with_capacity(2);

        for player in must_split.iter().filter(|p| selected.contains(p)).take(2) {
            if side_a.is_empty() {
                side_a.push(player.clone());
            } else if side_b.is_empty() {
                side_b.push(player.clone());
            }
        }

        let mut others: Vec<PlayerId> = selected
            .iter()
            .filter(|p| !side_a.contains(p) && !side_b.contains(p))
            .cloned()
            .collect();
        others.shuffle(rng);

        for player in others {
            if side_a.len() < 2 {
                side_a.push(player);
            } else {
                side_b.push(player);
            }
        }

        while side_b.len() < 2 && side_a.len() > 1 {
            if let Some(player) = side_a.pop() {
                side_b.push(player);
            }
        }

        if side_a.len() == 2 && side_b.len() == 2 {
            return Ok(Assembly {
                team_a: Team::from_slice(&side_a)?,
                team_b: Team::from_slice(&side_b)?,
                sliced: false,
            });
        }

        let (team_a, team_b) = Self::split_in_order(selected)?;
        Ok(Assembly {
            team_a,
            team_b,
            sliced: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ids(names: &[&str]) -> Vec<PlayerId> {
        names.iter().map(|n| EntityId::from(*n)).collect()
    }

    #[test]
    fn test_split_in_order() {
        let (a, b) = TeamAssembler::split_in_order(&ids(&["A", "B", "C", "D", "E"])).unwrap();
        assert_eq!(a.players(), &ids(&["A", "B"])[..]);
        assert_eq!(b.players(), &ids(&["C", "D"])[..]);
    }

    #[test]
    fn test_must_split_players_on_opposite_sides() {
        let selected = ids(&["A", "B", "E", "F"]);
        let stay = ids(&["A", "B"]);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let assembly = TeamAssembler::assemble(&selected, &stay, &mut rng).unwrap();

            assert!(assembly.team_a.contains(&stay[0]));
            assert!(assembly.team_b.contains(&stay[1]));
            assert!(!assembly.sliced);
        }
    }

    #[test]
    fn test_single_must_split_player_anchors_side_a() {
        let selected = ids(&["C", "A", "E", "F"]);
        let stay = ids(&["A"]);
        let mut rng = StdRng::seed_from_u64(7);

        let assembly = TeamAssembler::assemble(&selected, &stay, &mut rng).unwrap();
        assert_eq!(assembly.team_a.first(), &stay[0]);
    }

    #[test]
    fn test_all_four_players_used_once() {
        let selected = ids(&["A", "B", "C", "D"]);
        let mut rng = StdRng::seed_from_u64(3);
        let assembly = TeamAssembler::assemble(&selected, &[], &mut rng).unwrap();

        let mut seated: Vec<PlayerId> = assembly
            .team_a
            .players()
            .iter()
            .chain(assembly.team_b.players().iter())
            .cloned()
            .collect();
        seated.sort();
        assert_eq!(seated, selected);
    }

    #[test]
    fn test_must_split_outside_selection_ignored() {
        let selected = ids(&["A", "B", "C", "D"]);
        let mut rng = StdRng::seed_from_u64(1);
        let assembly = TeamAssembler::assemble(&selected, &ids(&["Z"]), &mut rng).unwrap();
        assert!(!assembly.team_a.contains(&EntityId::from("Z")));
        assert!(!assembly.team_b.contains(&EntityId::from("Z")));
    }

    #[test]
    fn test_too_few_players() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = TeamAssembler::assemble(&ids(&["A", "B", "C"]), &[], &mut rng).unwrap_err();
        assert!(matches!(
            err,
            PairingError::InsufficientPlayers { required: 4, found: 3 }
        ));
    }
}
