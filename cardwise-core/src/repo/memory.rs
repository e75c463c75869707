use crate::repo::count_cards;
use crate::{Card, CardId, CoreError, Deck, DeckId, ReviewLog};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

// Locks are always taken in the order decks, cards, reviews.
#[derive(Default)]
pub struct MemoryRepo {
    decks: RwLock<HashMap<DeckId, Deck>>,
    cards: RwLock<HashMap<CardId, Card>>,
    reviews: RwLock<Vec<ReviewLog>>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

fn refresh_card_count(decks: &mut HashMap<DeckId, Deck>, cards: &HashMap<CardId, Card>, deck_id: DeckId) {
    if let Some(deck) = decks.get_mut(&deck_id) {
        deck.card_count = count_cards(cards.values(), deck_id);
        deck.updated_at = Utc::now();
    }
}

#[async_trait]
impl crate::repo::Repository for MemoryRepo {
    async fn create_deck(&self, name: &str, description: &str) -> Result<Deck, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Invalid("deck name is empty"));
        }
        let deck = Deck::new(name, description.trim());
        let mut m = self.decks.write();
        if m.values().any(|d| d.name.eq_ignore_ascii_case(name)) {
            return Err(CoreError::Conflict("deck name already exists"));
        }
        m.insert(deck.id, deck.clone());
        tracing::info!(deck_id = %deck.id, name = %deck.name, "deck created");
        Ok(deck)
    }

    async fn get_deck(&self, id: DeckId) -> Result<Deck, CoreError> {
        self.decks
            .read()
            .get(&id)
            .cloned()
            .ok_or(CoreError::NotFound("deck"))
    }

    async fn list_decks(&self) -> Result<Vec<Deck>, CoreError> {
        Ok(self.decks.read().values().cloned().collect())
    }

    async fn update_deck(&self, deck: &Deck) -> Result<Deck, CoreError> {
        if deck.name.trim().is_empty() {
            return Err(CoreError::Invalid("deck name is empty"));
        }
        let mut m = self.decks.write();
        if m.values().any(|d| d.id != deck.id && d.name.eq_ignore_ascii_case(&deck.name)) {
            return Err(CoreError::Conflict("deck name already exists"));
        }
        let Some(existing) = m.get_mut(&deck.id) else {
            return Err(CoreError::NotFound("deck"));
        };
        existing.name = deck.name.trim().to_string();
        existing.description = deck.description.trim().to_string();
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn delete_deck(&self, id: DeckId) -> Result<(), CoreError> {
        let mut decks = self.decks.write();
        decks.remove(&id).ok_or(CoreError::NotFound("deck"))?;
        let mut cards = self.cards.write();
        let ids: Vec<CardId> = cards
            .values()
            .filter(|c| c.deck_id == id)
            .map(|c| c.id)
            .collect();
        for cid in &ids {
            cards.remove(cid);
        }
        self.reviews.write().retain(|r| !ids.contains(&r.card_id));
        tracing::info!(deck_id = %id, cards = ids.len(), "deck deleted");
        Ok(())
    }

    async fn add_card(&self, deck_id: DeckId, front: &str, back: &str) -> Result<Card, CoreError> {
        let mut decks = self.decks.write();
        if !decks.contains_key(&deck_id) {
            return Err(CoreError::NotFound("deck"));
        }
        let card = Card::new(deck_id, front, back);
        let mut cards = self.cards.write();
        cards.insert(card.id, card.clone());
        refresh_card_count(&mut decks, &cards, deck_id);
        Ok(card)
    }

    async fn get_card(&self, id: CardId) -> Result<Card, CoreError> {
        self.cards
            .read()
            .get(&id)
            .cloned()
            .ok_or(CoreError::NotFound("card"))
    }

    async fn list_cards(&self, deck_id: Option<DeckId>) -> Result<Vec<Card>, CoreError> {
        let cards = self.cards.read();
        let mut v: Vec<Card> = cards.values().cloned().collect();
        if let Some(did) = deck_id {
            v.retain(|c| c.deck_id == did);
        }
        Ok(v)
    }

    async fn update_card(&self, card: &Card) -> Result<Card, CoreError> {
        let mut m = self.cards.write();
        let Some(existing) = m.get_mut(&card.id) else {
            return Err(CoreError::NotFound("card"));
        };
        if existing.deck_id != card.deck_id {
            return Err(CoreError::Invalid("card cannot move between decks"));
        }
        *existing = card.clone();
        Ok(card.clone())
    }

    async fn delete_card(&self, id: CardId) -> Result<(), CoreError> {
        let mut decks = self.decks.write();
        let mut cards = self.cards.write();
        let card = cards.remove(&id).ok_or(CoreError::NotFound("card"))?;
        refresh_card_count(&mut decks, &cards, card.deck_id);
        Ok(())
    }

    async fn record_review(&self, card: &Card, log: &ReviewLog) -> Result<(), CoreError> {
        let mut cards = self.cards.write();
        let mut reviews = self.reviews.write();
        let Some(slot) = cards.get_mut(&card.id) else {
            return Err(CoreError::NotFound("card"));
        };
        *slot = card.clone();
        reviews.push(log.clone());
        Ok(())
    }

    async fn list_reviews(&self) -> Result<Vec<ReviewLog>, CoreError> {
        Ok(self.reviews.read().clone())
    }

    async fn list_reviews_for_card(&self, card_id: CardId) -> Result<Vec<ReviewLog>, CoreError> {
        Ok(self
            .reviews
            .read()
            .iter()
            .filter(|r| r.card_id == card_id)
            .cloned()
            .collect())
    }
}
