use serde::{Deserialize, Serialize};

use crate::card::Card;

pub const DEFAULT_MAX_TURNS: u32 = 40;
pub const HIGH_SCORE_LIMIT: usize = 10;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HighScore {
    pub name: String,
    pub score: u32,
}

/// Everything the page renders. Only the reducer produces new values.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub cards: Vec<Card>,
    /// Face-up ids of the attempt in progress.
    pub flipped_cards: Vec<String>,
    /// Ids waiting on an association check.
    pub selected_cards: Vec<String>,
    /// Matched card ids, two per pair.
    pub matched_pairs: Vec<String>,
    pub is_checking: bool,
    pub current_association: String,

    pub turns: u32,
    pub turns_left: u32,
    pub max_turns: u32,
    pub game_started: bool,
    pub game_over: bool,
    pub game_won: bool,

    pub sound_enabled: bool,
    pub music_enabled: bool,

    pub high_scores: Vec<HighScore>,
    pub current_score: u32,
}

impl GameState {
    pub fn new(max_turns: u32) -> GameState {
        GameState {
            cards: vec![],
            flipped_cards: vec![],
            selected_cards: vec![],
            matched_pairs: vec![],
            is_checking: false,
            current_association: String::new(),
            turns: 0,
            turns_left: max_turns,
            max_turns,
            game_started: false,
            game_over: false,
            game_won: false,
            sound_enabled: true,
            music_enabled: true,
            high_scores: vec![],
            current_score: 0,
        }
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    /// An empty deck is never won.
    pub fn all_matched(&self) -> bool {
        !self.cards.is_empty() && self.matched_pairs.len() == self.cards.len()
    }

    /// The two selected cards, in selection order.
    pub fn selected_pair(&self) -> Option<(&Card, &Card)> {
        match self.selected_cards.as_slice() {
            [first, second] => Some((self.card(first)?, self.card(second)?)),
            _ => None,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new(DEFAULT_MAX_TURNS)
    }
}

/// A discrete event fed to the reducer.
///
/// On the JS side actions look like `{ type: "FLIP_CARD", payload: "card-3" }`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    InitializeCards(Vec<Card>),
    FlipCard(String),
    SelectCard(String),
    ResetFlippedCards,
    ResetSelectedCards,
    SetMatchedPair(Vec<String>),
    SetChecking(bool),
    SetAssociation(String),
    StartGame,
    /// Payload is whether the game was won.
    EndGame(bool),
    IncrementTurns,
    ResetGame(Vec<Card>),
    ToggleSound,
    ToggleMusic,
    UpdateScore(u32),
    AddHighScore(HighScore),
}
