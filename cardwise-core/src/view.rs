use crate::DeckId;
use serde::{Deserialize, Serialize};

/// Screen the presentation layer is showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", content = "deckId", rename_all = "camelCase")]
pub enum View {
    #[default]
    Dashboard,
    DeckList,
    DeckDetail(DeckId),
    Study(DeckId),
    Stats,
}

impl View {
    pub fn deck_id(&self) -> Option<DeckId> {
        match self {
            View::DeckDetail(id) | View::Study(id) => Some(*id),
            _ => None,
        }
    }

    pub fn back(&self) -> View {
        match self {
            View::Study(id) => View::DeckDetail(*id),
            View::DeckDetail(_) => View::DeckList,
            View::DeckList | View::Stats | View::Dashboard => View::Dashboard,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::DeckList => "Decks",
            View::DeckDetail(_) => "Deck",
            View::Study(_) => "Study",
            View::Stats => "Statistics",
        }
    }

    /// Tabs reachable from the top-level navigation.
    pub fn is_top_level(&self) -> bool {
        matches!(self, View::Dashboard | View::DeckList | View::Stats)
    }
}
