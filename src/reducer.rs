//! The game state reducer.
//!
//! `GameReducer::reduce` is a pure function `(GameState, Action) -> GameState`.
//! It never fails and never checks whether a move is legal: flipping a matched
//! card, or the same card twice, is applied as asked. Legality belongs to the
//! caller, see [`crate::session::Session`].

use tracing::{debug, info};

use crate::card::Card;
use crate::config::{RuleSet, TurnLimit};
use crate::state::{Action, GameState, HighScore, HIGH_SCORE_LIMIT};

#[derive(Clone, Debug, Default)]
pub struct GameReducer {
    rules: RuleSet,
}

impl GameReducer {
    pub fn new(rules: RuleSet) -> GameReducer {
        GameReducer { rules }
    }

    pub fn reduce(&self, mut state: GameState, action: Action) -> GameState {
        match action {
            Action::InitializeCards(cards) => {
                info!(cards = cards.len(), "dealing new deck");
                deal(&mut state, cards);
            }
            Action::FlipCard(id) => {
                for_card(&mut state.cards, &id, |card| card.is_flipped = true);
                state.flipped_cards.push(id);
            }
            Action::SelectCard(id) => {
                if let Some(pos) = state.selected_cards.iter().position(|selected| *selected == id) {
                    state.selected_cards.remove(pos);
                    for_card(&mut state.cards, &id, |card| card.is_selected = false);
                } else if state.selected_cards.len() < 2 {
                    for_card(&mut state.cards, &id, |card| card.is_selected = true);
                    state.selected_cards.push(id);
                } else {
                    debug!(%id, "two cards already selected, ignoring selection");
                }
            }
            Action::ResetFlippedCards => {
                let flipped = std::mem::take(&mut state.flipped_cards);
                for card in state.cards.iter_mut() {
                    // Matched cards stay face up for good.
                    if !card.is_matched && flipped.contains(&card.id) {
                        card.is_flipped = false;
                    }
                }
            }
            Action::ResetSelectedCards => {
                let selected = std::mem::take(&mut state.selected_cards);
                for card in state.cards.iter_mut() {
                    if selected.contains(&card.id) {
                        card.is_selected = false;
                    }
                }
                state.current_association.clear();
            }
            Action::SetMatchedPair(ids) => {
                let selected = std::mem::take(&mut state.selected_cards);
                for card in state.cards.iter_mut() {
                    if ids.contains(&card.id) {
                        card.is_matched = true;
                        card.is_flipped = true;
                    }
                    if ids.contains(&card.id) || selected.contains(&card.id) {
                        card.is_selected = false;
                    }
                }
                state.matched_pairs.extend(ids);
                state.flipped_cards.clear();
                state.current_association.clear();
                let points = state.turns_left.saturating_mul(self.rules.points_per_match);
                state.current_score = state.current_score.saturating_add(points);

                let won = state.all_matched();
                state.game_won = won;
                state.game_over = won;
                if won {
                    info!(score = state.current_score, turns = state.turns, "all cards matched");
                }
            }
            Action::SetChecking(checking) => state.is_checking = checking,
            Action::SetAssociation(text) => state.current_association = text,
            Action::StartGame => {
                state.game_started = true;
                state.game_over = false;
                state.game_won = false;
            }
            Action::EndGame(won) => {
                state.game_over = true;
                state.game_won = won;
            }
            Action::IncrementTurns => {
                let last_turn = state.turns_left <= 1;
                state.turns = state.turns.saturating_add(1);
                state.turns_left = state.turns_left.saturating_sub(1);
                if self.rules.turn_limit == TurnLimit::Limited && last_turn && !state.game_won {
                    info!(turns = state.turns, "out of turns");
                    state.game_over = true;
                }
            }
            Action::ResetGame(cards) => {
                let mut fresh = GameState::new(self.rules.max_turns);
                fresh.high_scores = std::mem::take(&mut state.high_scores);
                fresh.sound_enabled = state.sound_enabled;
                fresh.music_enabled = state.music_enabled;
                info!(cards = cards.len(), "restarting game");
                deal(&mut fresh, cards);
                state = fresh;
            }
            Action::ToggleSound => state.sound_enabled = !state.sound_enabled,
            Action::ToggleMusic => state.music_enabled = !state.music_enabled,
            Action::UpdateScore(score) => state.current_score = score,
            Action::AddHighScore(entry) => add_high_score(&mut state.high_scores, entry),
        }
        state
    }
}

fn deal(state: &mut GameState, cards: Vec<Card>) {
    state.cards = cards;
    state.flipped_cards.clear();
    state.selected_cards.clear();
    state.matched_pairs.clear();
    state.is_checking = false;
    state.current_association.clear();
    state.turns = 0;
    state.turns_left = state.max_turns;
    state.game_over = false;
    state.game_won = false;
    state.game_started = true;
    state.current_score = 0;
}

/// Unknown ids are skipped.
fn for_card(cards: &mut [Card], id: &str, update: impl FnOnce(&mut Card)) {
    if let Some(card) = cards.iter_mut().find(|card| card.id == id) {
        update(card);
    }
}

fn add_high_score(scores: &mut Vec<HighScore>, entry: HighScore) {
    scores.push(entry);
    scores.sort_by(|a, b| b.score.cmp(&a.score));
    scores.truncate(HIGH_SCORE_LIMIT);
}

/// Owns the authoritative state and applies actions to it one at a time.
#[derive(Clone, Debug)]
pub struct Store {
    reducer: GameReducer,
    state: GameState,
}

impl Store {
    pub fn new(rules: RuleSet) -> Store {
        Store {
            reducer: GameReducer::new(rules),
            state: GameState::new(rules.max_turns),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) -> &GameState {
        let state = std::mem::take(&mut self.state);
        self.state = self.reducer.reduce(state, action);
        &self.state
    }
}
