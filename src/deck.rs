//! Building shuffled decks from the word database.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::card::{Card, PhotoCredit};
use crate::config::Pairing;
use crate::error::DeckError;

const LETTERS: [&str; 8] = ["A", "B", "C", "D", "E", "F", "G", "H"];

/// One entry of the word database: a word and the photo that illustrates it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WordRecord {
    pub id: u64,
    pub word: String,
    pub img: String,
    #[serde(default)]
    pub photographer: Option<String>,
    #[serde(default)]
    pub photographer_url: Option<String>,
    #[serde(default)]
    pub pexels_url: Option<String>,
}

impl WordRecord {
    fn card(&self, id: String) -> Card {
        let card = Card::new(id, self.word.clone(), self.img.clone());
        match (&self.photographer, &self.photographer_url, &self.pexels_url) {
            (Some(photographer), Some(photographer_url), Some(pexels_url)) => card.with_credit(PhotoCredit {
                photographer: photographer.clone(),
                photographer_url: photographer_url.clone(),
                pexels_url: pexels_url.clone(),
            }),
            _ => card,
        }
    }
}

pub fn parse_word_database(json: &str) -> Result<Vec<WordRecord>, DeckError> {
    Ok(serde_json::from_str(json)?)
}

/// Like [`parse_word_database`], but a broken database just means no words.
pub fn load_word_database(json: &str) -> Vec<WordRecord> {
    parse_word_database(json).unwrap_or_else(|err| {
        warn!(%err, "word database unusable, dealing no cards");
        vec![]
    })
}

/// Deals `size` cards from a random selection of `records`.
///
/// With [`Pairing::SameWord`] each chosen word yields two cards; with
/// [`Pairing::AnyWords`] each yields one. A short database gives a short deck.
pub fn build_deck<R: Rng + ?Sized>(records: &[WordRecord], size: usize, pairing: Pairing, rng: &mut R) -> Vec<Card> {
    let words_needed = match pairing {
        Pairing::SameWord => size / 2,
        Pairing::AnyWords => size,
    };
    if records.len() < words_needed {
        warn!(available = records.len(), words_needed, "not enough words for a full deck");
    }

    let mut pool: Vec<&WordRecord> = records.iter().collect();
    pool.shuffle(rng);
    pool.truncate(words_needed);

    let mut deck: Vec<Card> = match pairing {
        Pairing::SameWord => pool
            .iter()
            .flat_map(|record| {
                [
                    record.card(format!("card-{}-a", record.id)),
                    record.card(format!("card-{}-b", record.id)),
                ]
            })
            .collect(),
        Pairing::AnyWords => pool.iter().map(|record| record.card(format!("card-{}", record.id))).collect(),
    };
    deck.shuffle(rng);
    deck
}

/// Sixteen picture-less cards, two of each letter A to H.
pub fn letter_deck<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    let mut deck: Vec<Card> = LETTERS
        .iter()
        .flat_map(|letter| [Card::new(format!("{letter}-1"), *letter, ""), Card::new(format!("{letter}-2"), *letter, "")])
        .collect();
    deck.shuffle(rng);
    deck
}
