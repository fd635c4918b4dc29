//! Move handling in front of the reducer.
//!
//! The reducer applies whatever it is given. `Session` decides what the
//! player is allowed to do: it refuses clicks on matched, face-up or unknown
//! cards, runs the association check once two cards are up, and flips a
//! failed pair back after the grace period.

use serde::Serialize;
use tracing::debug;

use crate::card::Card;
use crate::config::{GameConfig, Pairing};
use crate::error::GameError;
use crate::reducer::Store;
use crate::state::{Action, GameState, HighScore};
use crate::timer::FlipBackTimer;
use crate::validator::{AssociationValidator, SentenceCheck};

/// Why a click did not flip anything.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Refusal {
    NotStarted,
    GameOver,
    Checking,
    UnknownCard,
    AlreadyMatched,
    AlreadyFlipped,
    PairShowing,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClickOutcome {
    Flipped,
    /// Two cards are up and selected; a sentence is needed.
    AwaitingAssociation { first: String, second: String },
    Ignored { reason: Refusal },
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Mismatch {
    /// The sentence failed the validator.
    Sentence,
    /// The sentence was fine but the cards are not a pair.
    Cards,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AssociationOutcome {
    Matched,
    /// The pair flips back when `attempt` comes due.
    Rejected { reason: Mismatch, attempt: u32 },
}

pub struct Session<V: SentenceCheck = AssociationValidator> {
    store: Store,
    validator: V,
    pairing: Pairing,
    flip_back: FlipBackTimer,
    attempts: u32,
}

impl Session<AssociationValidator> {
    pub fn new(config: &GameConfig) -> Session<AssociationValidator> {
        Session::with_validator(config, AssociationValidator::from_config(config))
    }
}

impl<V: SentenceCheck> Session<V> {
    pub fn with_validator(config: &GameConfig, validator: V) -> Session<V> {
        Session {
            store: Store::new(config.rules),
            validator,
            pairing: config.pairing,
            flip_back: FlipBackTimer::new(config.flip_back_delay),
            attempts: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        self.store.state()
    }

    pub fn pending_flip_back(&self) -> Option<u32> {
        self.flip_back.pending()
    }

    /// Raw dispatch, no legality checks.
    pub fn dispatch(&mut self, action: Action) -> &GameState {
        self.store.dispatch(action)
    }

    pub fn start(&mut self, deck: Vec<Card>) {
        self.cancel_flip_back();
        self.store.dispatch(Action::InitializeCards(deck));
    }

    /// New deck, keeping high scores and audio settings.
    pub fn restart(&mut self, deck: Vec<Card>) {
        self.cancel_flip_back();
        self.store.dispatch(Action::ResetGame(deck));
    }

    pub fn click_card(&mut self, id: &str) -> ClickOutcome {
        if let Err(reason) = self.check_click(id) {
            debug!(%id, ?reason, "click refused");
            return ClickOutcome::Ignored { reason };
        }

        let state = self.store.dispatch(Action::FlipCard(id.to_string()));
        let [first, second] = match state.flipped_cards.as_slice() {
            [first, second] => [first.clone(), second.clone()],
            _ => return ClickOutcome::Flipped,
        };

        self.store.dispatch(Action::SelectCard(first.clone()));
        self.store.dispatch(Action::SelectCard(second.clone()));
        self.store.dispatch(Action::SetChecking(true));
        ClickOutcome::AwaitingAssociation { first, second }
    }

    fn check_click(&self, id: &str) -> Result<(), Refusal> {
        let state = self.store.state();
        if !state.game_started {
            return Err(Refusal::NotStarted);
        }
        if state.game_over {
            return Err(Refusal::GameOver);
        }
        if state.is_checking {
            return Err(Refusal::Checking);
        }
        let card = state.card(id).ok_or(Refusal::UnknownCard)?;
        if card.is_matched {
            return Err(Refusal::AlreadyMatched);
        }
        if card.is_flipped {
            return Err(Refusal::AlreadyFlipped);
        }
        if state.flipped_cards.len() >= 2 {
            return Err(Refusal::PairShowing);
        }
        Ok(())
    }

    pub fn stage_association(&mut self, text: &str) {
        self.store.dispatch(Action::SetAssociation(text.to_string()));
    }

    /// Judges `sentence` for the selected pair and ends the attempt.
    pub fn submit_association(&mut self, sentence: &str) -> Result<AssociationOutcome, GameError> {
        let state = self.store.state();
        let (first, second) = state.selected_pair().ok_or(GameError::NoPendingPair)?;
        let ids = vec![first.id.clone(), second.id.clone()];

        let verdict = if !self.validator.is_valid_sentence(sentence, &first.word, &second.word) {
            Err(Mismatch::Sentence)
        } else if self.pairing == Pairing::SameWord && !first.pairs_with(second) {
            Err(Mismatch::Cards)
        } else {
            Ok(())
        };

        match verdict {
            Ok(()) => {
                debug!(?ids, "association accepted");
                self.store.dispatch(Action::SetMatchedPair(ids));
                self.store.dispatch(Action::IncrementTurns);
                self.store.dispatch(Action::SetChecking(false));
                Ok(AssociationOutcome::Matched)
            }
            Err(reason) => {
                debug!(?ids, ?reason, "association rejected");
                self.store.dispatch(Action::IncrementTurns);
                let attempt = self.end_attempt();
                Ok(AssociationOutcome::Rejected { reason, attempt })
            }
        }
    }

    /// Gives up on the selected pair without spending a turn.
    pub fn cancel_association(&mut self) -> Result<u32, GameError> {
        if self.store.state().selected_pair().is_none() {
            return Err(GameError::NoPendingPair);
        }
        Ok(self.end_attempt())
    }

    fn end_attempt(&mut self) -> u32 {
        self.store.dispatch(Action::ResetSelectedCards);
        self.store.dispatch(Action::SetChecking(false));
        self.attempts += 1;
        self.flip_back.schedule(self.attempts);
        self.attempts
    }

    /// Advances the flip-back clock by `dt` seconds.
    pub fn tick(&mut self, dt: f64) -> Option<u32> {
        let attempt = self.flip_back.advance(dt)?;
        self.store.dispatch(Action::ResetFlippedCards);
        Some(attempt)
    }

    /// Flips `attempt` back now, unless it is no longer pending.
    pub fn fire_flip_back(&mut self, attempt: u32) -> bool {
        if !self.flip_back.fire(attempt) {
            debug!(attempt, "stale flip-back ignored");
            return false;
        }
        self.store.dispatch(Action::ResetFlippedCards);
        true
    }

    fn cancel_flip_back(&mut self) {
        if let Some(attempt) = self.flip_back.cancel() {
            debug!(attempt, "pending flip-back cancelled");
        }
    }

    pub fn record_high_score(&mut self, name: &str) -> Result<(), GameError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::EmptyPlayerName);
        }
        let score = self.store.state().current_score;
        self.store.dispatch(Action::AddHighScore(HighScore {
            name: name.to_string(),
            score,
        }));
        Ok(())
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.store.dispatch(Action::ToggleSound).sound_enabled
    }

    pub fn toggle_music(&mut self) -> bool {
        self.store.dispatch(Action::ToggleMusic).music_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RuleSet, TurnLimit};
    use crate::deck::letter_deck;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::cell::RefCell;

    const GOOD: &str = "The cat is friends with the dog.";

    fn deck() -> Vec<Card> {
        vec![
            Card::new("cat-a", "cat", ""),
            Card::new("cat-b", "cat", ""),
            Card::new("dog-a", "dog", ""),
            Card::new("dog-b", "dog", ""),
        ]
    }

    fn started(config: GameConfig) -> Session {
        let mut session = Session::new(&config);
        session.start(deck());
        session
    }

    fn flipped(session: &Session, id: &str) -> bool {
        session.state().card(id).unwrap().is_flipped
    }

    #[test]
    fn test_clicks_before_start_are_refused() {
        let mut session = Session::new(&GameConfig::default());
        assert_eq!(session.click_card("cat-a"), ClickOutcome::Ignored { reason: Refusal::NotStarted });
    }

    #[test]
    fn test_second_click_awaits_association() {
        let mut session = started(GameConfig::default());
        assert_eq!(session.click_card("cat-a"), ClickOutcome::Flipped);
        assert_eq!(
            session.click_card("dog-a"),
            ClickOutcome::AwaitingAssociation { first: "cat-a".to_string(), second: "dog-a".to_string() }
        );
        let state = session.state();
        assert!(state.is_checking);
        assert_eq!(state.selected_cards, vec!["cat-a".to_string(), "dog-a".to_string()]);
    }

    #[test]
    fn test_illegal_clicks_never_reach_the_reducer() {
        let mut session = started(GameConfig::default());
        session.click_card("cat-a");
        assert_eq!(session.click_card("cat-a"), ClickOutcome::Ignored { reason: Refusal::AlreadyFlipped });
        assert_eq!(session.click_card("nope"), ClickOutcome::Ignored { reason: Refusal::UnknownCard });
        assert_eq!(session.state().flipped_cards, vec!["cat-a".to_string()]);

        session.click_card("cat-b");
        assert_eq!(session.click_card("dog-a"), ClickOutcome::Ignored { reason: Refusal::Checking });

        session.submit_association(GOOD).unwrap();
        assert_eq!(session.click_card("cat-b"), ClickOutcome::Ignored { reason: Refusal::AlreadyMatched });
    }

    #[test]
    fn test_pair_showing_blocks_clicks_until_flip_back() {
        let mut session = started(GameConfig::default());
        session.click_card("cat-a");
        session.click_card("dog-a");
        session.submit_association("nope").unwrap();
        assert_eq!(session.click_card("cat-b"), ClickOutcome::Ignored { reason: Refusal::PairShowing });

        session.tick(1.0);
        assert_eq!(session.click_card("cat-b"), ClickOutcome::Flipped);
    }

    #[test]
    fn test_matching_pair_scores_and_spends_a_turn() {
        let mut session = started(GameConfig::default());
        session.click_card("cat-a");
        session.click_card("cat-b");
        assert_eq!(session.submit_association(GOOD).unwrap(), AssociationOutcome::Matched);

        let state = session.state();
        assert_eq!(state.matched_pairs, vec!["cat-a".to_string(), "cat-b".to_string()]);
        assert_eq!(state.current_score, 40 * 50);
        assert_eq!(state.turns, 1);
        assert_eq!(state.turns_left, 39);
        assert!(!state.is_checking);
        assert_eq!(session.pending_flip_back(), None);
    }

    #[test]
    fn test_bad_sentence_flips_back_after_delay() {
        let mut session = started(GameConfig::default());
        session.click_card("cat-a");
        session.click_card("cat-b");
        let outcome = session.submit_association("cat dog").unwrap();
        assert_eq!(outcome, AssociationOutcome::Rejected { reason: Mismatch::Sentence, attempt: 1 });
        assert_eq!(session.state().turns, 1);
        assert!(session.state().selected_cards.is_empty());

        assert_eq!(session.tick(0.5), None);
        assert!(flipped(&session, "cat-a"));
        assert_eq!(session.tick(0.5), Some(1));
        assert!(!flipped(&session, "cat-a"));
        assert!(!flipped(&session, "cat-b"));
        assert!(session.state().flipped_cards.is_empty());
    }

    #[test]
    fn test_good_sentence_on_different_words_is_refused_when_words_must_match() {
        let mut session = started(GameConfig::default());
        session.click_card("cat-a");
        session.click_card("dog-a");
        let outcome = session.submit_association(GOOD).unwrap();
        assert_eq!(outcome, AssociationOutcome::Rejected { reason: Mismatch::Cards, attempt: 1 });
    }

    #[test]
    fn test_any_words_pairing_matches_linked_words() {
        let mut session = started(GameConfig { pairing: Pairing::AnyWords, ..GameConfig::default() });
        session.click_card("cat-a");
        session.click_card("dog-b");
        assert_eq!(session.submit_association(GOOD).unwrap(), AssociationOutcome::Matched);
    }

    #[test]
    fn test_submit_without_pair_is_an_error() {
        let mut session = started(GameConfig::default());
        assert!(matches!(session.submit_association(GOOD), Err(GameError::NoPendingPair)));
        session.click_card("cat-a");
        assert!(matches!(session.submit_association(GOOD), Err(GameError::NoPendingPair)));
        assert!(matches!(session.cancel_association(), Err(GameError::NoPendingPair)));
    }

    #[test]
    fn test_cancel_keeps_the_turn() {
        let mut session = started(GameConfig::default());
        session.click_card("cat-a");
        session.click_card("dog-a");
        session.stage_association("The cat");
        assert_eq!(session.cancel_association().unwrap(), 1);
        assert_eq!(session.state().turns, 0);
        assert!(session.state().current_association.is_empty());
        assert!(session.fire_flip_back(1));
        assert!(!flipped(&session, "cat-a"));
    }

    #[test]
    fn test_restart_cancels_stale_flip_back() {
        let mut session = started(GameConfig::default());
        session.click_card("cat-a");
        session.click_card("dog-a");
        session.submit_association("nope").unwrap();

        session.restart(deck());
        session.click_card("cat-b");
        assert_eq!(session.tick(5.0), None);
        assert!(!session.fire_flip_back(1));
        assert!(flipped(&session, "cat-b"));
    }

    #[test]
    fn test_winning_game() {
        let mut session = started(GameConfig::default());
        for (first, second) in [("cat-a", "cat-b"), ("dog-a", "dog-b")] {
            session.click_card(first);
            session.click_card(second);
            assert_eq!(session.submit_association(GOOD).unwrap(), AssociationOutcome::Matched);
        }
        let state = session.state();
        assert!(state.game_won);
        assert!(state.game_over);
        assert_eq!(state.current_score, 40 * 50 + 39 * 50);
        assert_eq!(session.click_card("cat-a"), ClickOutcome::Ignored { reason: Refusal::GameOver });
    }

    #[test]
    fn test_running_out_of_turns() {
        let config = GameConfig {
            rules: RuleSet { max_turns: 1, turn_limit: TurnLimit::Limited, ..RuleSet::default() },
            ..GameConfig::default()
        };
        let mut session = started(config);
        session.click_card("cat-a");
        session.click_card("dog-a");
        session.submit_association("nope").unwrap();
        assert!(session.state().game_over);
        assert!(!session.state().game_won);
    }

    #[test]
    fn test_high_score_uses_current_score() {
        let mut session = started(GameConfig::default());
        session.click_card("cat-a");
        session.click_card("cat-b");
        session.submit_association("test association").unwrap();
        session.record_high_score("  ana ").unwrap();
        assert!(matches!(session.record_high_score(" "), Err(GameError::EmptyPlayerName)));

        let state = session.state();
        assert_eq!(state.high_scores, vec![HighScore { name: "ana".to_string(), score: 2000 }]);
    }

    #[test]
    fn test_toggles_report_new_value() {
        let mut session = started(GameConfig::default());
        assert!(!session.toggle_sound());
        assert!(session.toggle_sound());
        assert!(!session.toggle_music());
    }

    /// Gives a fixed answer and remembers what it was asked.
    struct Scripted {
        answer: bool,
        asked: RefCell<Vec<(String, String, String)>>,
    }

    impl Scripted {
        fn new(answer: bool) -> Scripted {
            Scripted { answer, asked: RefCell::new(vec![]) }
        }
    }

    impl SentenceCheck for Scripted {
        fn is_valid_sentence(&self, sentence: &str, first: &str, second: &str) -> bool {
            self.asked.borrow_mut().push((sentence.to_string(), first.to_string(), second.to_string()));
            self.answer
        }
    }

    #[test]
    fn test_custom_checker_decides_matches() {
        let mut session = Session::with_validator(&GameConfig::default(), Scripted::new(true));
        session.start(deck());
        session.click_card("cat-a");
        session.click_card("cat-b");
        assert_eq!(session.submit_association("meow").unwrap(), AssociationOutcome::Matched);
        assert_eq!(
            session.validator.asked.borrow().as_slice(),
            &[("meow".to_string(), "cat".to_string(), "cat".to_string())]
        );

        let mut session = Session::with_validator(&GameConfig::default(), Scripted::new(false));
        session.start(deck());
        session.click_card("dog-a");
        session.click_card("dog-b");
        let outcome = session.submit_association(GOOD).unwrap();
        assert_eq!(outcome, AssociationOutcome::Rejected { reason: Mismatch::Sentence, attempt: 1 });
        assert_eq!(session.validator.asked.borrow().len(), 1);
    }

    #[test]
    fn test_huge_rules_do_not_overflow_score() {
        let config = GameConfig::from_json(r#"{"max_turns": 100000, "points_per_match": 100000}"#).unwrap();
        let mut session = started(config);
        session.click_card("cat-a");
        session.click_card("cat-b");
        assert_eq!(session.submit_association(GOOD).unwrap(), AssociationOutcome::Matched);
        assert_eq!(session.state().current_score, u32::MAX);
    }

    #[derive(Clone, Debug)]
    enum Step {
        Click(usize),
        Submit(bool),
        Cancel,
        Tick(f64),
        Restart,
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            4 => (0usize..16).prop_map(Step::Click),
            2 => any::<bool>().prop_map(Step::Submit),
            1 => Just(Step::Cancel),
            2 => (0.0f64..1.5).prop_map(Step::Tick),
            1 => Just(Step::Restart),
        ]
    }

    proptest! {
        #[test]
        fn prop_reachable_states_hold_invariants(seed in any::<u64>(), steps in prop::collection::vec(step(), 0..80)) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut session = Session::new(&GameConfig::default());
            session.start(letter_deck(&mut rng));

            for step in steps {
                match step {
                    Step::Click(index) => {
                        let id = session.state().cards[index].id.clone();
                        session.click_card(&id);
                    }
                    Step::Submit(valid) => {
                        let sentence = if valid { "test association" } else { "" };
                        let _ = session.submit_association(sentence);
                    }
                    Step::Cancel => {
                        let _ = session.cancel_association();
                    }
                    Step::Tick(dt) => {
                        session.tick(dt);
                    }
                    Step::Restart => session.restart(letter_deck(&mut rng)),
                }

                let state = session.state();
                prop_assert!(state.flipped_cards.len() <= 2);
                prop_assert!(state.selected_cards.len() <= 2);
                for card in &state.cards {
                    prop_assert!(!card.is_matched || card.is_flipped);
                }
                prop_assert_eq!(state.game_won, state.matched_pairs.len() == state.cards.len());
            }
        }
    }
}
