//! A memory-matching game where a pair only counts once the player writes a
//! sentence linking its two words.
//!
//! The game logic is plain Rust: [`reducer`] holds the state transitions,
//! [`validator`] judges sentences, and [`session::Session`] decides which
//! moves are legal. [`Game`] wraps a session for the page's JavaScript.

use js_sys::Math;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod card;
pub mod config;
pub mod deck;
pub mod error;
pub mod reducer;
pub mod session;
pub mod state;
pub mod timer;
pub mod validator;

pub use card::Card;
pub use config::GameConfig;
pub use error::GameError;
pub use session::Session;
pub use state::{Action, GameState};

use deck::WordRecord;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    Ok(serde_wasm_bindgen::to_value(value)?)
}

fn random_seed() -> u64 {
    (Math::random() * u64::MAX as f64) as u64
}

#[wasm_bindgen]
pub struct Game {
    session: Session,
    config: GameConfig,
    words: Vec<WordRecord>,
    letters: bool,
    rng: ChaCha8Rng,
}

#[wasm_bindgen]
impl Game {
    /// `config` may be `undefined` for the default rules.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<Game, JsError> {
        let config: GameConfig = if config.is_undefined() || config.is_null() {
            GameConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|err| JsError::new(&err.to_string()))?
        };
        config.validate()?;

        Ok(Game {
            session: Session::new(&config),
            config,
            words: vec![],
            letters: false,
            rng: ChaCha8Rng::seed_from_u64(random_seed()),
        })
    }

    /// Deals from the word database JSON. Returns the number of cards dealt,
    /// zero when the database is unusable.
    pub fn load_words(&mut self, json: &str) -> usize {
        self.words = deck::load_word_database(json);
        self.letters = false;
        log(&format!("Loaded {} words.", self.words.len()));
        let cards = self.deal();
        self.session.start(cards);
        self.session.state().cards.len()
    }

    /// Deals the sixteen-card letter deck instead of words.
    pub fn deal_letters(&mut self) {
        self.letters = true;
        let cards = self.deal();
        self.session.start(cards);
    }

    pub fn restart(&mut self) {
        let cards = self.deal();
        self.session.restart(cards);
    }

    fn deal(&mut self) -> Vec<Card> {
        if self.letters {
            deck::letter_deck(&mut self.rng)
        } else {
            deck::build_deck(&self.words, self.config.deck_size, self.config.pairing, &mut self.rng)
        }
    }

    pub fn click_card(&mut self, id: &str) -> Result<JsValue, JsValue> {
        to_js(&self.session.click_card(id))
    }

    pub fn stage_association(&mut self, text: &str) {
        self.session.stage_association(text);
    }

    /// Anything but a string counts as an invalid sentence.
    pub fn submit_association(&mut self, sentence: JsValue) -> Result<JsValue, JsValue> {
        let sentence = sentence.as_string().unwrap_or_default();
        log(&format!("submit_association called with: '{}'", sentence));
        let outcome = self
            .session
            .submit_association(&sentence)
            .map_err(|err| JsValue::from(JsError::from(err)))?;
        log(&format!("Association outcome: {:?}", outcome));
        to_js(&outcome)
    }

    /// Returns the attempt id whose flip-back was scheduled.
    pub fn cancel_association(&mut self) -> Result<u32, JsError> {
        Ok(self.session.cancel_association()?)
    }

    /// Advances the flip-back clock; `dt` is in seconds.
    pub fn tick(&mut self, dt: f64) -> Option<u32> {
        self.session.tick(dt)
    }

    pub fn fire_flip_back(&mut self, attempt: u32) -> bool {
        self.session.fire_flip_back(attempt)
    }

    pub fn pending_flip_back(&self) -> Option<u32> {
        self.session.pending_flip_back()
    }

    /// Applies a raw `{ type, payload }` action. Actions that do not parse
    /// leave the state as it was.
    pub fn dispatch(&mut self, action: JsValue) -> Result<JsValue, JsValue> {
        match serde_wasm_bindgen::from_value::<Action>(action) {
            Ok(action) => to_js(self.session.dispatch(action)),
            Err(err) => {
                log(&format!("Ignoring unknown action: {}", err));
                to_js(self.session.state())
            }
        }
    }

    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        to_js(self.session.state())
    }

    pub fn get_cards(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.state().cards)
    }

    pub fn get_score(&self) -> u32 {
        self.session.state().current_score
    }

    pub fn get_turns_left(&self) -> u32 {
        self.session.state().turns_left
    }

    pub fn is_game_over(&self) -> bool {
        self.session.state().game_over
    }

    pub fn is_game_won(&self) -> bool {
        self.session.state().game_won
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.session.toggle_sound()
    }

    pub fn toggle_music(&mut self) -> bool {
        self.session.toggle_music()
    }

    pub fn add_high_score(&mut self, name: &str) -> Result<(), JsError> {
        Ok(self.session.record_high_score(name)?)
    }
}

/// Default-rules sentence check for pages that validate before submitting.
#[wasm_bindgen]
pub fn validate_association(sentence: JsValue, word1: &str, word2: &str) -> bool {
    validator::validate_maybe_text(sentence.as_string().as_deref(), word1, word2)
}
