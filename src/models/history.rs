//! Locked round history.

use serde::{Deserialize, Serialize};

use super::{Round, RoundStatus};
use crate::pairing::PairingError;

/// Ordered sequence of locked rounds, numbered contiguously from 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Round>", into = "Vec<Round>")]
pub struct History {
    rounds: Vec<Round>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history, validating numbering, lock status and distinct players.
    pub fn from_rounds(rounds: Vec<Round>) -> Result<Self, PairingError> {
        let mut history = Self::new();
        for round in rounds {
            history.push(round)?;
        }
        Ok(history)
    }

    /// Append a locked round. Its number must be the next in sequence.
    pub fn push(&mut self, round: Round) -> Result<(), PairingError> {
        let expected = self.next_number();
        if round.number != expected {
            return Err(PairingError::InvalidHistory(format!(
                "expected round {}, got round {}",
                expected, round.number
            )));
        }
        if !round.is_locked() {
            return Err(PairingError::InvalidHistory(format!(
                "round {} is still pending",
                round.number
            )));
        }
        round.validate()?;
        self.rounds.push(round);
        Ok(())
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn last(&self) -> Option<&Round> {
        self.rounds.last()
    }

    pub fn get(&self, number: u32) -> Option<&Round> {
        self.rounds.iter().find(|r| r.number == number)
    }

    /// Number the next generated round receives.
    pub fn next_number(&self) -> u32 {
        self.rounds.last().map(|r| r.number + 1).unwrap_or(1)
    }

    /// Replace a round in place, keeping its number and lock status.
    pub(crate) fn replace(&mut self, round: Round) -> Result<(), PairingError> {
        let slot = self
            .rounds
            .iter_mut()
            .find(|r| r.number == round.number)
            .ok_or(PairingError::RoundNotFound(round.number))?;
        if round.status == RoundStatus::Pending {
            return Err(PairingError::InvalidHistory(format!(
                "round {} cannot return to pending",
                round.number
            )));
        }
        round.validate()?;
        *slot = round;
        Ok(())
    }
}

impl TryFrom<Vec<Round>> for History {
    type Error = PairingError;

    fn try_from(rounds: Vec<Round>) -> Result<Self, Self::Error> {
        Self::from_rounds(rounds)
    }
}

impl From<History> for Vec<Round> {
    fn from(history: History) -> Self {
        history.rounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityId, Outcome, Team, WinnerSide};

    fn locked(number: u32, players: [&str; 4]) -> Round {
        let [a, b, c, d] = players.map(EntityId::from);
        let mut round = Round::pending(
            number,
            Team::new(a, b).unwrap(),
            Team::new(c, d).unwrap(),
            vec![],
        );
        round.status = RoundStatus::Completed;
        round.outcome = Some(Outcome::new(WinnerSide::A, 21, 10).unwrap());
        round
    }

    #[test]
    fn test_next_number() {
        let mut history = History::new();
        assert_eq!(history.next_number(), 1);

        history.push(locked(1, ["A", "B", "C", "D"])).unwrap();
        assert_eq!(history.next_number(), 2);
    }

    #[test]
    fn test_push_rejects_gaps() {
        let mut history = History::new();
        let err = history.push(locked(2, ["A", "B", "C", "D"])).unwrap_err();
        assert!(matches!(err, PairingError::InvalidHistory(_)));
    }

    #[test]
    fn test_push_rejects_pending_round() {
        let mut round = locked(1, ["A", "B", "C", "D"]);
        round.status = RoundStatus::Pending;
        round.outcome = None;

        assert!(History::new().push(round).is_err());
    }

    #[test]
    fn test_deserialization_validates() {
        let good = vec![locked(1, ["A", "B", "C", "D"]), locked(2, ["A", "E", "C", "F"])];
        let json = serde_json::to_string(&good).unwrap();
        let history: History = serde_json::from_str(&json).unwrap();
        assert_eq!(history.len(), 2);

        let bad = vec![locked(1, ["A", "B", "C", "D"]), locked(3, ["A", "E", "C", "F"])];
        let json = serde_json::to_string(&bad).unwrap();
        assert!(serde_json::from_str::<History>(&json).is_err());
    }

    #[test]
    fn test_replace_keeps_numbering() {
        let mut history =
            History::from_rounds(vec![locked(1, ["A", "B", "C", "D"])]).unwrap();
        let mut revised = history.rounds()[0].clone();
        revised.status = RoundStatus::Active;
        revised.outcome = None;

        history.replace(revised).unwrap();
        assert_eq!(history.rounds()[0].status, RoundStatus::Active);

        assert!(matches!(
            history.replace(locked(5, ["A", "B", "C", "D"])),
            Err(PairingError::RoundNotFound(5))
        ));
    }
}
