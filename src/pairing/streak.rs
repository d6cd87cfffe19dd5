//! Consecutive play tracking.
//!
//! Two non-equivalent measures are offered:
//! - [`StreakMode::Trailing`]: rounds played back-to-back, counted from the
//!   most recent round and stopping at the first round the player sat out.
//! - [`StreakMode::Window`]: appearances within the last `n` rounds, gaps allowed.
//!
//! Winner-stay uses the trailing streak; constrained random uses the window.

use std::collections::HashMap;

use crate::models::{PlayerId, Round};

/// How "consecutive" is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakMode {
    Trailing,
    Window(u32),
}

/// Rounds played in an unbroken run ending at the last round.
pub fn trailing_streak(player: &PlayerId, rounds: &[Round]) -> u32 {
    rounds
        .iter()
        .rev()
        .take_while(|round| round.contains(player))
        .count() as u32
}

/// Appearances within the last `window` rounds.
pub fn window_count(player: &PlayerId, rounds: &[Round], window: u32) -> u32 {
    let start = rounds.len().saturating_sub(window as usize);
    rounds[start..]
        .iter()
        .filter(|round| round.contains(player))
        .count() as u32
}

/// Per-player count under the given mode. Every roster member gets an entry.
pub fn consecutive_counts(
    players: &[PlayerId],
    rounds: &[Round],
    mode: StreakMode,
) -> HashMap<PlayerId, u32> {
    players
        .iter()
        .map(|p| {
            let count = match mode {
                StreakMode::Trailing => trailing_streak(p, rounds),
                StreakMode::Window(n) => window_count(p, rounds, n),
            };
            (p.clone(), count)
        })
        .collect()
}

/// Longest back-to-back run any player had anywhere in the rounds.
pub fn longest_streak(rounds: &[Round]) -> u32 {
    let mut current: HashMap<&PlayerId, u32> = HashMap::new();
    let mut longest = 0;

    for round in rounds {
        let playing = round.participants();
        current.retain(|p, _| playing.contains(p));
        for p in playing {
            let run = current.entry(p).or_insert(0);
            *run += 1;
            longest = longest.max(*run);
        }
    }

    longest
}
