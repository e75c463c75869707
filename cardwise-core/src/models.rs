use chrono::{DateTime, Utc};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::scheduler::NextReview;

pub type DeckId = Uuid;
pub type CardId = Uuid;
pub type ReviewId = Uuid;

pub const EASE_MIN: f64 = 1.3;
pub const EASE_MAX: f64 = 2.5;
pub const EASE_DEFAULT: f64 = 2.5;

pub const MIN_INTERVAL_DAYS: u32 = 1;
pub const MAX_INTERVAL_DAYS: u32 = 365;

/// Recall quality reported by the user, ordered from worst to best.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Again,
    Hard,
    Medium,
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Medium, Rating::Easy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Medium => "medium",
            Rating::Easy => "easy",
        }
    }

    /// Button label shown to the user. Medium is presented as "Good".
    pub fn label(&self) -> &'static str {
        match self {
            Rating::Again => "Again",
            Rating::Hard => "Hard",
            Rating::Medium => "Good",
            Rating::Easy => "Easy",
        }
    }

    /// 1-based key used by the review prompts.
    pub fn key(&self) -> char {
        match self {
            Rating::Again => '1',
            Rating::Hard => '2',
            Rating::Medium => '3',
            Rating::Easy => '4',
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rating {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "a" | "again" => Ok(Rating::Again),
            "2" | "h" | "hard" => Ok(Rating::Hard),
            "3" | "m" | "med" | "medium" | "g" | "good" => Ok(Rating::Medium),
            "4" | "e" | "easy" => Ok(Rating::Easy),
            _ => Err(crate::CoreError::Invalid("rating")),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: DeckId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub card_count: u32,
}

impl Deck {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            created_at: now,
            updated_at: now,
            card_count: 0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub deck_id: DeckId,
    pub front: String,
    pub back: String,

    pub due_date: DateTime<Utc>,
    #[serde(deserialize_with = "de_interval")]
    pub interval: u32,
    pub ease: f64,
    #[serde(default)]
    pub reviews: u32,
    #[serde(default)]
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

impl Card {
    pub fn new(deck_id: DeckId, front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            deck_id,
            front: front.into(),
            back: back.into(),
            due_date: Utc::now(),
            interval: 0,
            ease: EASE_DEFAULT,
            reviews: 0,
            last_reviewed_at: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.reviews == 0
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_date <= now
    }

    pub fn schedule(&self) -> crate::Schedule {
        crate::Schedule {
            interval: self.interval,
            ease: self.ease,
        }
    }

    /// Writes a scheduler result back onto the card and counts the review.
    pub fn apply(&mut self, next: &NextReview, reviewed_at: DateTime<Utc>) {
        self.due_date = next.due_date;
        self.interval = next.interval;
        self.ease = next.ease;
        self.reviews = self.reviews.saturating_add(1);
        self.last_reviewed_at = Some(reviewed_at);
    }
}

// Older files stored the raw first-review factor (e.g. 1.8) as the interval.
fn de_interval<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Err(D::Error::custom("interval must be a finite number"));
    }
    Ok(raw.round().clamp(0.0, MAX_INTERVAL_DAYS as f64) as u32)
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLog {
    pub id: ReviewId,
    pub card_id: CardId,
    pub rating: Rating,
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewLog {
    pub fn new(card_id: CardId, rating: Rating, reviewed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            card_id,
            rating,
            reviewed_at,
        }
    }
}
