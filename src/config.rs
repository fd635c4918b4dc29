//! Rule set and game configuration.
//!
//! Several rule variants of the game have been played over time: a turn limit
//! or unlimited turns, 50 or 100 points per match, pairs keyed by equal words
//! or any two words the player can link. Each is a field here with one
//! default, instead of being baked into the reducer.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::state::DEFAULT_MAX_TURNS;

pub const DEFAULT_POINTS_PER_MATCH: u32 = 50;
pub const DEFAULT_DECK_SIZE: usize = 16;
/// Seconds a mismatched pair stays face up.
pub const DEFAULT_FLIP_BACK_DELAY: f64 = 1.0;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TurnLimit {
    /// Running out of turns ends the game.
    #[default]
    Limited,
    Unlimited,
}

/// Which two cards may be matched, given a valid association.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Pairing {
    #[default]
    SameWord,
    AnyWords,
}

/// The parts of the configuration the reducer needs.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct RuleSet {
    pub max_turns: u32,
    pub points_per_match: u32,
    pub turn_limit: TurnLimit,
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet {
            max_turns: DEFAULT_MAX_TURNS,
            points_per_match: DEFAULT_POINTS_PER_MATCH,
            turn_limit: TurnLimit::Limited,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    #[serde(flatten)]
    pub rules: RuleSet,
    pub pairing: Pairing,
    pub deck_size: usize,
    pub flip_back_delay: f64,
    /// Accept every non-empty sentence. Meant for local play-testing only.
    pub bypass_validation: bool,
    /// Accept any sentence containing "test association".
    pub accept_test_phrase: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            rules: RuleSet::default(),
            pairing: Pairing::SameWord,
            deck_size: DEFAULT_DECK_SIZE,
            flip_back_delay: DEFAULT_FLIP_BACK_DELAY,
            bypass_validation: false,
            accept_test_phrase: true,
        }
    }
}

impl GameConfig {
    /// Parses and validates a JSON config. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<GameConfig, ConfigError> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rules.max_turns == 0 {
            return Err(ConfigError::Invalid("max_turns must be at least 1".to_string()));
        }
        if self.deck_size == 0 || self.deck_size % 2 != 0 {
            return Err(ConfigError::Invalid(format!(
                "deck_size must be a positive even number, got {}",
                self.deck_size
            )));
        }
        if !self.flip_back_delay.is_finite() || self.flip_back_delay < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "flip_back_delay must be a non-negative number of seconds, got {}",
                self.flip_back_delay
            )));
        }
        Ok(())
    }
}
