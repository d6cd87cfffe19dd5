//! Round lifecycle transitions.
//!
//! ```text
//! EMPTY -> PENDING -> ACTIVE -> COMPLETED
//!          PENDING -> PENDING      (redraw)
//!                     ACTIVE <- COMPLETED  (revise, only while no later round used it)
//! ```

use tracing::info;

use super::{PairingError, Ruleset};
use crate::models::{History, Outcome, Round, RoundStatus, WinnerSide};

/// Lock a pending round: it is now being played and becomes history.
pub fn lock(round: &Round) -> Result<Round, PairingError> {
    if round.status != RoundStatus::Pending {
        return Err(PairingError::InvalidTransition {
            round: round.number,
            status: round.status,
            action: "lock",
        });
    }

    let mut locked = round.clone();
    locked.status = RoundStatus::Active;
    info!("Round {} locked", locked.number);
    Ok(locked)
}

/// Attach an outcome to a locked round.
///
/// Re-recording the identical outcome returns the same round; a different
/// outcome on a completed round must go through [`revise`] first.
pub fn record_outcome(
    round: &Round,
    winner: WinnerSide,
    score_a: u32,
    score_b: u32,
) -> Result<Round, PairingError> {
    let outcome = Outcome::new(winner, score_a, score_b)?;

    match round.status {
        RoundStatus::Pending => Err(PairingError::InvalidTransition {
            round: round.number,
            status: round.status,
            action: "record an outcome for",
        }),
        RoundStatus::Completed if round.outcome == Some(outcome) => Ok(round.clone()),
        RoundStatus::Completed => Err(PairingError::OutcomeConflict(round.number)),
        RoundStatus::Active => {
            let mut completed = round.clone();
            completed.status = RoundStatus::Completed;
            completed.outcome = Some(outcome);
            info!(
                "Round {} result: {} ({}-{})",
                completed.number, winner, score_a, score_b
            );
            Ok(completed)
        }
    }
}

/// The first later round, locked or pending, that was drawn from the
/// outcome of round `number`.
pub fn derived_from(
    ruleset: &Ruleset,
    history: &History,
    pending: Option<&Round>,
    number: u32,
) -> Option<u32> {
    history
        .rounds()
        .iter()
        .chain(pending)
        .map(|r| r.number)
        .filter(|&n| n > number)
        .find(|&n| ruleset.select(n).outcome_sources(n).contains(&number))
}

/// Clear the outcome of round `number`, returning the updated history.
///
/// Rejected once a later round, locked or pending, was drawn from it.
pub fn revise(
    ruleset: &Ruleset,
    history: &History,
    pending: Option<&Round>,
    number: u32,
) -> Result<History, PairingError> {
    let round = history
        .get(number)
        .ok_or(PairingError::RoundNotFound(number))?;

    if round.status != RoundStatus::Completed {
        return Err(PairingError::InvalidTransition {
            round: number,
            status: round.status,
            action: "revise",
        });
    }

    if let Some(later) = derived_from(ruleset, history, pending, number) {
        return Err(PairingError::InvalidRevision {
            round: number,
            later,
        });
    }

    let mut reopened = round.clone();
    reopened.status = RoundStatus::Active;
    reopened.outcome = None;

    let mut revised = history.clone();
    revised.replace(reopened)?;
    info!("Round {} reopened for a corrected result", number);
    Ok(revised)
}
