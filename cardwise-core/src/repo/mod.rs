use crate::{Card, CardId, CoreError, Deck, DeckId, ReviewLog};
use async_trait::async_trait;

pub mod memory;

#[async_trait]
pub trait Repository: Send + Sync {
    // Decks
    async fn create_deck(&self, name: &str, description: &str) -> Result<Deck, CoreError>;
    async fn get_deck(&self, id: DeckId) -> Result<Deck, CoreError>;
    async fn list_decks(&self) -> Result<Vec<Deck>, CoreError>;
    async fn update_deck(&self, deck: &Deck) -> Result<Deck, CoreError>;
    /// Removes the deck, its cards, and the review logs of those cards.
    async fn delete_deck(&self, id: DeckId) -> Result<(), CoreError>;

    // Cards
    async fn add_card(&self, deck_id: DeckId, front: &str, back: &str) -> Result<Card, CoreError>;
    async fn get_card(&self, id: CardId) -> Result<Card, CoreError>;
    async fn list_cards(&self, deck_id: Option<DeckId>) -> Result<Vec<Card>, CoreError>;
    async fn update_card(&self, card: &Card) -> Result<Card, CoreError>;
    /// Removes the card. Its review logs stay in the log.
    async fn delete_card(&self, id: CardId) -> Result<(), CoreError>;

    // Reviews
    /// Stores the reviewed card and appends its log entry as one write.
    /// Fails with `NotFound` and writes nothing if the card is gone.
    async fn record_review(&self, card: &Card, log: &ReviewLog) -> Result<(), CoreError>;
    async fn list_reviews(&self) -> Result<Vec<ReviewLog>, CoreError>;
    async fn list_reviews_for_card(&self, card_id: CardId) -> Result<Vec<ReviewLog>, CoreError>;
}

/// Number of cards in `deck_id`, used to keep `Deck::card_count` in sync.
pub fn count_cards<'a>(cards: impl Iterator<Item = &'a Card>, deck_id: DeckId) -> u32 {
    cards.filter(|c| c.deck_id == deck_id).count() as u32
}
