use serde::{Deserialize, Serialize};

/// Attribution carried through from the word database.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoCredit {
    pub photographer: String,
    pub photographer_url: String,
    pub pexels_url: String,
}

/// One face of a matchable pair.
///
/// Two cards pair up when their `word`s are equal. `is_matched` is terminal:
/// once set, the reducer never clears it and keeps `is_flipped` set with it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub word: String,
    #[serde(default)]
    pub image_path: String,
    #[serde(default)]
    pub is_flipped: bool,
    #[serde(default)]
    pub is_matched: bool,
    #[serde(default)]
    pub is_selected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit: Option<PhotoCredit>,
}

impl Card {
    pub fn new(id: impl Into<String>, word: impl Into<String>, image_path: impl Into<String>) -> Card {
        Card {
            id: id.into(),
            word: word.into(),
            image_path: image_path.into(),
            is_flipped: false,
            is_matched: false,
            is_selected: false,
            credit: None,
        }
    }

    pub fn with_credit(mut self, credit: PhotoCredit) -> Card {
        self.credit = Some(credit);
        self
    }

    /// True for a distinct card sharing this card's match key.
    pub fn pairs_with(&self, other: &Card) -> bool {
        self.id != other.id && self.word == other.word
    }
}
