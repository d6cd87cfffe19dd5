//! Player and roster models.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{EntityId, PlayerId, TournamentId};
use crate::pairing::PairingError;

/// A registered player. Immutable once added to a roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Stable identifier (derived from tournament + code + name)
    pub id: PlayerId,

    /// Short display code, e.g. "P-01"
    pub code: String,

    /// Display name
    pub name: String,
}

impl Player {
    /// Create a player at the given 1-based roster position.
    pub fn new(tournament_id: &TournamentId, position: usize, name: &str) -> Self {
        let code = format!("P-{:02}", position);
        let id = EntityId::generate(&[tournament_id.as_str(), &code, name]);

        Self {
            id,
            code,
            name: name.to_string(),
        }
    }
}

/// The full player set for a tournament, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    /// Build a roster from display names. Blank names are skipped.
    pub fn from_names<S: AsRef<str>>(
        tournament_id: &TournamentId,
        names: &[S],
    ) -> Result<Self, PairingError> {
        let mut seen = HashSet::new();
        let mut players = Vec::new();

        for name in names.iter().map(|n| n.as_ref().trim()) {
            if name.is_empty() {
                continue;
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(PairingError::DuplicatePlayer(EntityId::from(name)));
            }
            players.push(Player::new(tournament_id, players.len() + 1, name));
        }

        Ok(Self { players })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Player IDs in roster order, as consumed by the pairing engine.
    pub fn ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id.clone()).collect()
    }

    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// Display name for an ID, falling back to the raw ID.
    pub fn display_name(&self, id: &PlayerId) -> String {
        self.get(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}
