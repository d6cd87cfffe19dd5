//! Caller-owned tournament session.
//!
//! Bundles roster, configuration, locked history and the single pending
//! round. Every pairing decision is delegated to [`PairingEngine`]; the
//! session only enforces slot ordering and applies the returned values.

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, TournamentConfig};
use crate::models::{EntityId, History, Roster, Round, RoundStatus, TournamentId, WinnerSide};
use crate::pairing::{self, NextRound, PairingEngine, PairingError};

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pairing(#[from] PairingError),
}

/// Descriptive tournament metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentInfo {
    pub id: TournamentId,
    pub name: String,
    pub place: String,
    pub created_at: DateTime<Utc>,
}

impl TournamentInfo {
    pub fn new(name: &str, place: &str) -> Self {
        let created_at = Utc::now();
        let id = EntityId::generate(&[name, place, &created_at.to_rfc3339()]);

        Self {
            id,
            name: name.to_string(),
            place: place.to_string(),
            created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TournamentSession {
    pub info: TournamentInfo,
    pub roster: Roster,
    config: TournamentConfig,
    engine: PairingEngine,
    history: History,
    pending: Option<Round>,
}

impl TournamentSession {
    /// Start a tournament. `player_count` is taken from the roster.
    pub fn new<S: AsRef<str>>(
        info: TournamentInfo,
        names: &[S],
        config: TournamentConfig,
    ) -> Result<Self, SessionError> {
        let roster = Roster::from_names(&info.id, names)?;
        let config = TournamentConfig {
            player_count: roster.len(),
            ..config
        };
        Self::restore(info, roster, config, History::new(), None)
    }

    /// Rebuild a session from stored parts.
    pub fn restore(
        info: TournamentInfo,
        roster: Roster,
        config: TournamentConfig,
        history: History,
        pending: Option<Round>,
    ) -> Result<Self, SessionError> {
        let engine = PairingEngine::new(config.clone())?;

        if let Some(round) = &pending {
            if round.status != RoundStatus::Pending || round.number != history.next_number() {
                return Err(PairingError::InvalidHistory(format!(
                    "stored pending round {} does not follow the history",
                    round.number
                ))
                .into());
            }
            round.validate()?;
        }

        let ids = roster.ids();
        for round in history.rounds().iter().chain(&pending) {
            if let Some(unknown) = round
                .participants()
                .into_iter()
                .chain(&round.bench)
                .find(|p| !ids.contains(p))
            {
                return Err(PairingError::UnknownPlayer(unknown.clone()).into());
            }
        }

        Ok(Self {
            info,
            roster,
            config,
            engine,
            history,
            pending,
        })
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn pending(&self) -> Option<&Round> {
        self.pending.as_ref()
    }

    /// Generate the pending round. Blocked results leave the session unchanged.
    pub fn draw(&mut self, rng: &mut dyn RngCore) -> Result<NextRound, SessionError> {
        if let Some(round) = &self.pending {
            return Err(PairingError::PendingRoundExists(round.number).into());
        }

        let next = self
            .engine
            .next_round(&self.roster.ids(), &self.history, None, rng)?;
        if let Some(draft) = next.draft() {
            self.pending = Some(draft.round.clone());
        }
        Ok(next)
    }

    /// Replace the pending round with a fresh draw of the same number.
    pub fn redraw(&mut self, rng: &mut dyn RngCore) -> Result<NextRound, SessionError> {
        let pending = self.pending.as_ref().ok_or(PairingError::NoPendingRound)?;

        let next = self
            .engine
            .redraw(&self.roster.ids(), &self.history, pending, rng)?;
        if let Some(draft) = next.draft() {
            self.pending = Some(draft.round.clone());
        }
        Ok(next)
    }

    /// Lock the pending round and move it into history.
    pub fn start(&mut self) -> Result<&Round, SessionError> {
        let pending = self.pending.as_ref().ok_or(PairingError::NoPendingRound)?;
        let locked = pairing::lock(pending)?;

        self.history.push(locked)?;
        self.pending = None;
        self.history
            .last()
            .ok_or_else(|| PairingError::NoPendingRound.into())
    }

    /// Record the result of a locked round.
    pub fn record_outcome(
        &mut self,
        number: u32,
        winner: WinnerSide,
        score_a: u32,
        score_b: u32,
    ) -> Result<&Round, SessionError> {
        let limit = self.config.point_limit;
        if score_a > limit || score_b > limit {
            return Err(PairingError::InvalidOutcome(format!(
                "score {}-{} exceeds the point limit of {}",
                score_a, score_b, limit
            ))
            .into());
        }

        let round = match self.history.get(number) {
            Some(round) => round,
            None => match &self.pending {
                Some(p) if p.number == number => {
                    return Err(PairingError::InvalidTransition {
                        round: number,
                        status: p.status,
                        action: "record an outcome for",
                    }
                    .into())
                }
                _ => return Err(PairingError::RoundNotFound(number).into()),
            },
        };

        if round.status == RoundStatus::Active {
            let ruleset = self.engine.ruleset();
            if let Some(later) =
                pairing::derived_from(ruleset, &self.history, self.pending.as_ref(), number)
            {
                return Err(PairingError::InvalidRevision {
                    round: number,
                    later,
                }
                .into());
            }
        }

        let updated = pairing::record_outcome(round, winner, score_a, score_b)?;
        self.history.replace(updated)?;
        self.history
            .get(number)
            .ok_or_else(|| PairingError::RoundNotFound(number).into())
    }

    /// Reopen a completed round so its result can be corrected.
    pub fn revise(&mut self, number: u32) -> Result<&Round, SessionError> {
        self.history = pairing::revise(
            self.engine.ruleset(),
            &self.history,
            self.pending.as_ref(),
            number,
        )?;
        info!("Tournament {}: round {} revised", self.info.id, number);
        self.history
            .get(number)
            .ok_or_else(|| PairingError::RoundNotFound(number).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Format;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const NAMES: [&str; 6] = ["Dimas", "Ryan", "Kenny", "Steven", "Yulius", "Amin"];

    fn session(format: Format) -> TournamentSession {
        let info = TournamentInfo::new("Friday Night", "Court 7");
        TournamentSession::new(info, &NAMES, TournamentConfig::new(0, format)).unwrap()
    }

    #[test]
    fn test_player_count_follows_roster() {
        let session = session(Format::WinnerStay6p1c);
        assert_eq!(session.config().player_count, 6);
        assert_eq!(session.roster.len(), 6);
    }

    #[test]
    fn test_only_one_pending_round() {
        let mut session = session(Format::WinnerStay6p1c);
        let mut rng = StdRng::seed_from_u64(1);

        session.draw(&mut rng).unwrap();
        let err = session.draw(&mut rng).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Pairing(PairingError::PendingRoundExists(1))
        ));
    }

    #[test]
    fn test_full_cycle() {
        let mut session = session(Format::WinnerStay6p1c);
        let mut rng = StdRng::seed_from_u64(4);

        session.draw(&mut rng).unwrap();
        session.redraw(&mut rng).unwrap();
        assert_eq!(session.pending().map(|r| r.number), Some(1));

        let started = session.start().unwrap().clone();
        assert_eq!(started.status, RoundStatus::Active);
        assert!(session.pending().is_none());

        let done = session.record_outcome(1, WinnerSide::A, 21, 18).unwrap();
        assert_eq!(done.status, RoundStatus::Completed);

        let next = session.draw(&mut rng).unwrap();
        assert_eq!(next.draft().map(|d| d.round.number), Some(2));
    }

    #[test]
    fn test_result_before_start_rejected() {
        let mut session = session(Format::WinnerStay6p1c);
        let mut rng = StdRng::seed_from_u64(4);
        session.draw(&mut rng).unwrap();

        assert!(matches!(
            session.record_outcome(1, WinnerSide::A, 21, 10),
            Err(SessionError::Pairing(PairingError::InvalidTransition { .. }))
        ));
    }

    #[test]
    fn test_point_limit_enforced() {
        let mut session = session(Format::WinnerStay6p1c);
        let mut rng = StdRng::seed_from_u64(4);
        session.draw(&mut rng).unwrap();
        session.start().unwrap();

        assert!(matches!(
            session.record_outcome(1, WinnerSide::A, 30, 10),
            Err(SessionError::Pairing(PairingError::InvalidOutcome(_)))
        ));
    }

    #[test]
    fn test_revise_blocked_by_pending_round() {
        let mut session = session(Format::WinnerStay6p1c);
        let mut rng = StdRng::seed_from_u64(4);
        session.draw(&mut rng).unwrap();
        session.start().unwrap();
        session.record_outcome(1, WinnerSide::B, 15, 21).unwrap();

        session.draw(&mut rng).unwrap();
        assert!(matches!(
            session.revise(1),
            Err(SessionError::Pairing(PairingError::InvalidRevision { round: 1, later: 2 }))
        ));
    }

    #[test]
    fn test_revise_then_rerecord() {
        let mut session = session(Format::WinnerStay6p1c);
        let mut rng = StdRng::seed_from_u64(4);
        session.draw(&mut rng).unwrap();
        session.start().unwrap();
        session.record_outcome(1, WinnerSide::B, 15, 21).unwrap();

        let reopened = session.revise(1).unwrap();
        assert_eq!(reopened.status, RoundStatus::Active);

        let corrected = session.record_outcome(1, WinnerSide::A, 21, 15).unwrap();
        assert_eq!(corrected.winning_side(), Some(crate::models::Side::A));
    }

    #[test]
    fn test_blocked_draw_leaves_session_unchanged() {
        let names: Vec<String> = (1..=8).map(|i| format!("Player {}", i)).collect();
        let info = TournamentInfo::new("Eights", "Hall");
        let mut session =
            TournamentSession::new(info, &names, TournamentConfig::new(8, Format::Generic))
                .unwrap();
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..2 {
            session.draw(&mut rng).unwrap();
            session.start().unwrap();
        }

        let next = session.draw(&mut rng).unwrap();
        assert!(next.is_blocked());
        assert!(session.pending().is_none());
    }

    #[test]
    fn test_restore_rejects_misnumbered_pending() {
        let session = session(Format::WinnerStay6p1c);
        let mut stray = Round::pending(
            5,
            crate::models::Team::from_slice(&session.roster.ids()[0..2]).unwrap(),
            crate::models::Team::from_slice(&session.roster.ids()[2..4]).unwrap(),
            vec![],
        );
        stray.bench = session.roster.ids()[4..].to_vec();

        assert!(TournamentSession::restore(
            session.info.clone(),
            session.roster.clone(),
            session.config().clone(),
            History::new(),
            Some(stray),
        )
        .is_err());
    }

    #[test]
    fn test_tied_intro_round_can_be_corrected() {
        let names: Vec<String> = (1..=8).map(|i| format!("Player {}", i)).collect();
        let info = TournamentInfo::new("Eights", "Hall");
        let mut session =
            TournamentSession::new(info, &names, TournamentConfig::new(8, Format::Generic))
                .unwrap();
        let mut rng = StdRng::seed_from_u64(21);

        for _ in 0..2 {
            session.draw(&mut rng).unwrap();
            session.start().unwrap();
        }
        session.record_outcome(1, WinnerSide::Tie, 20, 20).unwrap();
        session.record_outcome(2, WinnerSide::A, 21, 16).unwrap();

        let next = session.draw(&mut rng).unwrap();
        assert!(next.is_blocked());

        // round 2 was an intro draw and never read round 1's result
        session.revise(1).unwrap();
        session.record_outcome(1, WinnerSide::A, 21, 19).unwrap();
        assert!(!session.draw(&mut rng).unwrap().is_blocked());
    }

    #[test]
    fn test_result_rejected_once_next_round_drawn_from_it() {
        let mut session = session(Format::WinnerStay6p1c);
        let mut rng = StdRng::seed_from_u64(6);
        session.draw(&mut rng).unwrap();
        session.start().unwrap();

        let next = session.draw(&mut rng).unwrap();
        assert_eq!(
            next.draft().and_then(|d| d.degradation),
            Some(crate::pairing::Degradation::WinnerDefaulted)
        );

        assert!(matches!(
            session.record_outcome(1, WinnerSide::B, 15, 21),
            Err(SessionError::Pairing(PairingError::InvalidRevision { round: 1, later: 2 }))
        ));
        assert!(session.history().get(1).and_then(|r| r.outcome).is_none());
    }

    #[test]
    fn test_restore_rejects_pending_round_with_stranger() {
        let session = session(Format::WinnerStay6p1c);
        let ids = session.roster.ids();
        let stranger = Round::pending(
            1,
            crate::models::Team::from_slice(&ids[0..2]).unwrap(),
            crate::models::Team::new(ids[2].clone(), EntityId::from("ghost")).unwrap(),
            ids[3..].to_vec(),
        );

        assert!(matches!(
            TournamentSession::restore(
                session.info.clone(),
                session.roster.clone(),
                session.config().clone(),
                History::new(),
                Some(stranger),
            ),
            Err(SessionError::Pairing(PairingError::UnknownPlayer(_)))
        ));
    }
}
