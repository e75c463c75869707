use crate::{Card, DeckId};
use chrono::{DateTime, Utc};

pub fn filter_by_text(cards: &[Card], query: &str) -> Vec<Card> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return cards.to_vec();
    }
    cards
        .iter()
        .filter(|c| c.front.to_lowercase().contains(&q) || c.back.to_lowercase().contains(&q))
        .cloned()
        .collect()
}

pub fn cards_in_deck(cards: &[Card], deck_id: DeckId) -> Vec<Card> {
    cards.iter().filter(|c| c.deck_id == deck_id).cloned().collect()
}

/// Cards eligible for review: due date at or before `now`.
pub fn due_cards(cards: &[Card], now: DateTime<Utc>) -> Vec<Card> {
    cards.iter().filter(|c| c.is_due(now)).cloned().collect()
}
