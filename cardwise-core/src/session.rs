use crate::{filters::due_cards, Card, CardId, DeckId};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

/// Queue of due cards for one deck, worked through front to back.
#[derive(Clone, Debug)]
pub struct StudySession {
    deck_id: DeckId,
    queue: VecDeque<Card>,
    reviewed: usize,
}

impl StudySession {
    pub fn start<R: Rng + ?Sized>(deck_id: DeckId, cards: &[Card], now: DateTime<Utc>, rng: &mut R) -> Self {
        let mut due: Vec<Card> = due_cards(cards, now)
            .into_iter()
            .filter(|c| c.deck_id == deck_id)
            .collect();
        due.shuffle(rng);
        Self {
            deck_id,
            queue: due.into(),
            reviewed: 0,
        }
    }

    pub fn deck_id(&self) -> DeckId {
        self.deck_id
    }

    pub fn current(&self) -> Option<&Card> {
        self.queue.front()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn reviewed(&self) -> usize {
        self.reviewed
    }

    pub fn is_finished(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drops a reviewed card from the queue, whatever its rating was.
    pub fn complete(&mut self, card_id: CardId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|c| c.id != card_id);
        let removed = self.queue.len() < before;
        if removed {
            self.reviewed += 1;
        }
        removed
    }

    /// Moves the current card to the back of the queue.
    pub fn skip(&mut self) {
        if let Some(card) = self.queue.pop_front() {
            self.queue.push_back(card);
        }
    }
}
