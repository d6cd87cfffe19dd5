//! Typed rule table: (format, players, courts) -> strategy per round.

use serde::Serialize;
use std::fmt;

use super::strategies::{
    ConstrainedRandom, IntroRound, PartnerSwitch, RoundStrategy, SwitchPool, WinnerStayBench,
};
use crate::config::{ConfigError, Format, TournamentConfig};

/// Minimum roster for the intro / partner-switch opening.
pub const INTRO_MIN_PLAYERS: usize = 8;

/// Largest roster the winner-stay bench rotation is offered for.
pub const WINNER_STAY_MAX_PLAYERS: usize = 8;

/// Label of the rule variant that produced a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Intro,
    PartnerSwitchWinners,
    PartnerSwitchLosers,
    ConstrainedRandom,
    WinnerStayBench,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Intro => write!(f, "intro"),
            StrategyKind::PartnerSwitchWinners => write!(f, "partner_switch(winners)"),
            StrategyKind::PartnerSwitchLosers => write!(f, "partner_switch(losers)"),
            StrategyKind::ConstrainedRandom => write!(f, "constrained_random"),
            StrategyKind::WinnerStayBench => write!(f, "winner_stay_bench"),
        }
    }
}

/// The selected rule variant for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Intro(IntroRound),
    PartnerSwitch(PartnerSwitch),
    ConstrainedRandom(ConstrainedRandom),
    WinnerStayBench(WinnerStayBench),
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        self.as_strategy().kind()
    }

    /// Earlier rounds whose outcome is read when drawing round `number`.
    pub fn outcome_sources(&self, number: u32) -> Vec<u32> {
        match self {
            Strategy::PartnerSwitch(s) => s.sources.to_vec(),
            Strategy::WinnerStayBench(_) if number > 1 => vec![number - 1],
            _ => Vec::new(),
        }
    }

    pub fn as_strategy(&self) -> &dyn RoundStrategy {
        match self {
            Strategy::Intro(s) => s,
            Strategy::PartnerSwitch(s) => s,
            Strategy::ConstrainedRandom(s) => s,
            Strategy::WinnerStayBench(s) => s,
        }
    }
}

/// Validated rule table entry for a tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ruleset {
    pub format: Format,
    /// Rounds 1-4 use intro draws and partner switches
    pub intro_phase: bool,
}

impl Ruleset {
    /// Look up the table entry, or `None` if the combination is unsupported.
    pub fn resolve(format: Format, player_count: usize, court_count: u32) -> Option<Self> {
        match format {
            Format::Generic if player_count >= super::SEATS && court_count >= 1 => Some(Self {
                format,
                intro_phase: player_count >= INTRO_MIN_PLAYERS,
            }),
            Format::WinnerStay6p1c
                if court_count == 1
                    && (super::SEATS..=WINNER_STAY_MAX_PLAYERS).contains(&player_count) =>
            {
                Some(Self {
                    format,
                    intro_phase: false,
                })
            }
            _ => None,
        }
    }

    /// Strategy for the 1-based round index.
    pub fn select(&self, round_index: u32) -> Strategy {
        if self.intro_phase {
            match round_index {
                1 | 2 => return Strategy::Intro(IntroRound),
                3 => return Strategy::PartnerSwitch(PartnerSwitch::new(SwitchPool::Winners)),
                4 => return Strategy::PartnerSwitch(PartnerSwitch::new(SwitchPool::Losers)),
                _ => {}
            }
        }

        match self.format {
            Format::Generic => Strategy::ConstrainedRandom(ConstrainedRandom),
            Format::WinnerStay6p1c => Strategy::WinnerStayBench(WinnerStayBench),
        }
    }
}

/// Resolve the strategy for a round straight from configuration.
pub fn select_strategy(round_index: u32, config: &TournamentConfig) -> Result<Strategy, ConfigError> {
    Ok(config.validate()?.select(round_index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(config: &TournamentConfig, rounds: u32) -> Vec<StrategyKind> {
        (1..=rounds)
            .map(|n| select_strategy(n, config).unwrap().kind())
            .collect()
    }

    #[test]
    fn test_eight_player_generic_opening() {
        let config = TournamentConfig::new(8, Format::Generic);

        assert_eq!(
            kinds(&config, 6),
            vec![
                StrategyKind::Intro,
                StrategyKind::Intro,
                StrategyKind::PartnerSwitchWinners,
                StrategyKind::PartnerSwitchLosers,
                StrategyKind::ConstrainedRandom,
                StrategyKind::ConstrainedRandom,
            ]
        );
    }

    #[test]
    fn test_small_generic_roster_skips_intro() {
        let config = TournamentConfig::new(6, Format::Generic);
        assert!(kinds(&config, 5)
            .iter()
            .all(|k| *k == StrategyKind::ConstrainedRandom));
    }

    #[test]
    fn test_winner_stay_every_round() {
        let config = TournamentConfig::new(6, Format::WinnerStay6p1c);
        assert!(kinds(&config, 5)
            .iter()
            .all(|k| *k == StrategyKind::WinnerStayBench));
    }

    #[test]
    fn test_unsupported_combinations() {
        assert!(Ruleset::resolve(Format::Generic, 3, 1).is_none());
        assert!(Ruleset::resolve(Format::Generic, 8, 0).is_none());
        assert!(Ruleset::resolve(Format::WinnerStay6p1c, 6, 2).is_none());
        assert!(Ruleset::resolve(Format::WinnerStay6p1c, 10, 1).is_none());

        let mut config = TournamentConfig::new(10, Format::WinnerStay6p1c);
        config.court_count = 1;
        assert!(matches!(
            select_strategy(1, &config),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_generic_allows_extra_courts() {
        let ruleset = Ruleset::resolve(Format::Generic, 12, 3).unwrap();
        assert!(ruleset.intro_phase);
    }
}
