//! JSON-file repository.
//!
//! The data directory holds one flat JSON array per collection
//! (`decks.json`, `cards.json`, `review_logs.json`). Every save stages the
//! touched collections in temp files and renames them into place, then
//! drops a timestamped copy into `backups/`, keeping the newest
//! `max_backups` per collection.

use anyhow::Context;
use cardwise_core::{
    repo::{count_cards, Repository},
    Card, CardId, CoreError, Deck, DeckId, ReviewLog, EASE_MAX, EASE_MIN,
};
use chrono::Utc;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tokio::task;

pub mod paths;

pub const DEFAULT_MAX_BACKUPS: usize = 10;

#[derive(Clone, Debug)]
pub struct StoreOptions {
    pub root: PathBuf,
    pub max_backups: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            root: paths::data_root(),
            max_backups: DEFAULT_MAX_BACKUPS,
        }
    }
}

impl StoreOptions {
    pub fn in_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Collection {
    Decks,
    Cards,
    ReviewLogs,
}

impl Collection {
    fn stem(self) -> &'static str {
        match self {
            Collection::Decks => "decks",
            Collection::Cards => "cards",
            Collection::ReviewLogs => "review_logs",
        }
    }

    fn file_name(self) -> String {
        format!("{}.json", self.stem())
    }
}

#[derive(Clone, Default)]
struct State {
    decks: HashMap<DeckId, Deck>,
    cards: HashMap<CardId, Card>,
    reviews: Vec<ReviewLog>,
}

impl State {
    fn encode(&self, collection: Collection) -> serde_json::Result<Vec<u8>> {
        match collection {
            Collection::Decks => {
                let mut v: Vec<&Deck> = self.decks.values().collect();
                v.sort_by_key(|d| (d.created_at, d.id));
                serde_json::to_vec_pretty(&v)
            }
            Collection::Cards => {
                let mut v: Vec<&Card> = self.cards.values().collect();
                v.sort_by_key(|c| (c.deck_id, c.id));
                serde_json::to_vec_pretty(&v)
            }
            Collection::ReviewLogs => serde_json::to_vec_pretty(&self.reviews),
        }
    }

    fn refresh_card_count(&mut self, deck_id: DeckId) {
        let count = count_cards(self.cards.values(), deck_id);
        if let Some(deck) = self.decks.get_mut(&deck_id) {
            deck.card_count = count;
            deck.updated_at = Utc::now();
        }
    }
}

pub struct JsonStore {
    root: PathBuf,
    backups_dir: PathBuf,
    max_backups: usize,
    state: RwLock<State>,
    // Serializes saves so files are written in mutation order.
    write_lock: Mutex<()>,
}

impl JsonStore {
    pub async fn open_default() -> Result<Self, CoreError> {
        Self::open(StoreOptions::default()).await
    }

    pub async fn open(options: StoreOptions) -> Result<Self, CoreError> {
        let root = options.root;
        let backups_dir = paths::backups_dir(&root);
        let dir = root.clone();
        let state = task::spawn_blocking(move || load_state(&dir))
            .await
            .map_err(CoreError::storage)?
            .map_err(|e| CoreError::storage(format!("{e:#}")))?;
        tracing::info!(
            root = %root.display(),
            decks = state.decks.len(),
            cards = state.cards.len(),
            reviews = state.reviews.len(),
            "json store opened"
        );
        Ok(Self {
            root,
            backups_dir,
            max_backups: options.max_backups.max(1),
            state: RwLock::new(state),
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Runs `change` on a copy of the state, writes the touched collections,
    /// and installs the copy only once the files are in place. A rejected
    /// change or a failed write leaves memory and disk as they were.
    async fn commit<T, F>(&self, collections: &[Collection], change: F) -> Result<T, CoreError>
    where
        T: Send,
        F: FnOnce(&mut State) -> Result<T, CoreError> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut next = self.state.read().clone();
        let out = change(&mut next)?;
        let images = collections
            .iter()
            .map(|c| next.encode(*c).map(|bytes| (*c, bytes)))
            .collect::<serde_json::Result<Vec<_>>>()
            .map_err(CoreError::storage)?;
        let root = self.root.clone();
        let backups = self.backups_dir.clone();
        let keep = self.max_backups;

        task::spawn_blocking(move || write_collections(&root, &backups, keep, &images))
            .await
            .map_err(CoreError::storage)?
            .map_err(|e| CoreError::storage(format!("{e:#}")))?;
        *self.state.write() = next;
        tracing::debug!(?collections, "json store saved");
        Ok(out)
    }
}

fn load_state(root: &Path) -> anyhow::Result<State> {
    fs::create_dir_all(root).with_context(|| format!("creating {}", root.display()))?;

    let decks: Vec<Deck> = read_collection(root, Collection::Decks)?;
    let cards: Vec<Card> = read_collection(root, Collection::Cards)?;
    let reviews: Vec<ReviewLog> = read_collection(root, Collection::ReviewLogs)?;

    let mut state = State {
        decks: decks.into_iter().map(|d| (d.id, d)).collect(),
        cards: cards.into_iter().map(|c| (c.id, c)).collect(),
        reviews,
    };

    // card_count is derived; trust the card file over the stored figure.
    let deck_ids: Vec<DeckId> = state.decks.keys().copied().collect();
    for id in deck_ids {
        let count = count_cards(state.cards.values(), id);
        if let Some(deck) = state.decks.get_mut(&id) {
            deck.card_count = count;
        }
    }

    let bad_ease = state
        .cards
        .values()
        .filter(|c| !(EASE_MIN..=EASE_MAX).contains(&c.ease))
        .count();
    if bad_ease > 0 {
        tracing::warn!(cards = bad_ease, "cards with ease out of range; clamped on next review");
    }
    let orphans = state
        .cards
        .values()
        .filter(|c| !state.decks.contains_key(&c.deck_id))
        .count();
    if orphans > 0 {
        tracing::warn!(cards = orphans, "cards reference a missing deck");
    }

    Ok(state)
}

fn read_collection<T: DeserializeOwned>(root: &Path, collection: Collection) -> anyhow::Result<Vec<T>> {
    let path = root.join(collection.file_name());
    if !path.exists() {
        return Ok(Vec::new());
    }
    let buf = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    if buf.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&buf).with_context(|| format!("parsing {}", path.display()))
}

fn write_collections(
    root: &Path,
    backups_dir: &Path,
    max_backups: usize,
    images: &[(Collection, Vec<u8>)],
) -> anyhow::Result<()> {
    fs::create_dir_all(root)?;
    fs::create_dir_all(backups_dir)?;

    // Stage everything first so a failed write leaves the old files intact.
    let mut staged = Vec::with_capacity(images.len());
    for (collection, bytes) in images {
        let mut tmp = NamedTempFile::new_in(root)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        let path = root.join(collection.file_name());
        let previous = match fs::read(&path) {
            Ok(b) => Some(b),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        staged.push((path, previous, tmp));
    }
    let mut replaced: Vec<(PathBuf, Option<Vec<u8>>)> = Vec::with_capacity(staged.len());
    for (path, previous, tmp) in staged {
        if let Err(e) = tmp.persist(&path) {
            restore_files(root, &replaced);
            return Err(e.error).with_context(|| format!("replacing {}", path.display()));
        }
        replaced.push((path, previous));
    }

    // The live files are committed; a failed backup must not fail the save.
    if let Err(e) = write_backups(backups_dir, max_backups, images) {
        tracing::warn!(error = %e, "backup failed");
    }
    Ok(())
}

fn write_backups(backups_dir: &Path, max_backups: usize, images: &[(Collection, Vec<u8>)]) -> std::io::Result<()> {
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S%3f");
    for (collection, bytes) in images {
        let backup_path = backups_dir.join(format!("{}-{ts}.json", collection.stem()));
        let mut btmp = NamedTempFile::new_in(backups_dir)?;
        btmp.write_all(bytes)?;
        btmp.flush()?;
        btmp.persist(&backup_path)?;
        rotate_backups(backups_dir, collection.stem(), max_backups)?;
    }
    Ok(())
}

/// Puts back files replaced earlier in a save that failed part way.
fn restore_files(root: &Path, replaced: &[(PathBuf, Option<Vec<u8>>)]) {
    for (path, previous) in replaced {
        let restored = match previous {
            Some(bytes) => NamedTempFile::new_in(root)
                .and_then(|mut tmp| tmp.write_all(bytes).map(|_| tmp))
                .and_then(|tmp| tmp.persist(path).map(|_| ()).map_err(|e| e.error)),
            None => fs::remove_file(path),
        };
        if let Err(e) = restored {
            tracing::error!(path = %path.display(), error = %e, "could not roll back partial save");
        }
    }
}

fn rotate_backups(dir: &Path, stem: &str, keep: usize) -> std::io::Result<()> {
    let prefix = format!("{stem}-");
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|n| n.starts_with(&prefix) && n.ends_with(".json"))
        .collect();
    // Timestamps in the name sort chronologically.
    names.sort();
    if names.len() > keep {
        for n in &names[..names.len() - keep] {
            let _ = fs::remove_file(dir.join(n));
        }
    }
    Ok(())
}

use async_trait::async_trait;

#[async_trait]
impl Repository for JsonStore {
    async fn create_deck(&self, name: &str, description: &str) -> Result<Deck, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Invalid("deck name is empty"));
        }
        let deck = Deck::new(name, description.trim());
        self.commit(&[Collection::Decks], |s| {
            if s.decks.values().any(|d| d.name.eq_ignore_ascii_case(name)) {
                return Err(CoreError::Conflict("deck name already exists"));
            }
            s.decks.insert(deck.id, deck.clone());
            Ok(())
        })
        .await?;
        tracing::info!(deck_id = %deck.id, name = %deck.name, "deck created");
        Ok(deck)
    }

    async fn get_deck(&self, id: DeckId) -> Result<Deck, CoreError> {
        let s = self.state.read();
        s.decks.get(&id).cloned().ok_or(CoreError::NotFound("deck"))
    }

    async fn list_decks(&self) -> Result<Vec<Deck>, CoreError> {
        let s = self.state.read();
        Ok(s.decks.values().cloned().collect())
    }

    async fn update_deck(&self, deck: &Deck) -> Result<Deck, CoreError> {
        if deck.name.trim().is_empty() {
            return Err(CoreError::Invalid("deck name is empty"));
        }
        let updated = self.commit(&[Collection::Decks], |s| {
            if s.decks.values().any(|d| d.id != deck.id && d.name.eq_ignore_ascii_case(deck.name.trim())) {
                return Err(CoreError::Conflict("deck name already exists"));
            }
            let Some(existing) = s.decks.get_mut(&deck.id) else {
                return Err(CoreError::NotFound("deck"));
            };
            existing.name = deck.name.trim().to_string();
            existing.description = deck.description.trim().to_string();
            existing.updated_at = Utc::now();
            Ok(existing.clone())
        })
        .await?;
        Ok(updated)
    }

    async fn delete_deck(&self, id: DeckId) -> Result<(), CoreError> {
        let collections = [Collection::Decks, Collection::Cards, Collection::ReviewLogs];
        let removed = self.commit(&collections, |s| {
            if s.decks.remove(&id).is_none() {
                return Err(CoreError::NotFound("deck"));
            }
            let to_remove: Vec<CardId> = s.cards.values().filter(|c| c.deck_id == id).map(|c| c.id).collect();
            for cid in &to_remove {
                s.cards.remove(cid);
            }
            s.reviews.retain(|r| !to_remove.contains(&r.card_id));
            Ok(to_remove.len())
        })
        .await?;
        tracing::info!(deck_id = %id, cards = removed, "deck deleted");
        Ok(())
    }

    async fn add_card(&self, deck_id: DeckId, front: &str, back: &str) -> Result<Card, CoreError> {
        let card = self
            .commit(&[Collection::Decks, Collection::Cards], |s| {
                if !s.decks.contains_key(&deck_id) {
                    return Err(CoreError::NotFound("deck"));
                }
                let c = Card::new(deck_id, front, back);
                s.cards.insert(c.id, c.clone());
                s.refresh_card_count(deck_id);
                Ok(c)
            })
            .await?;
        tracing::debug!(card_id = %card.id, deck_id = %deck_id, "card added");
        Ok(card)
    }

    async fn get_card(&self, id: CardId) -> Result<Card, CoreError> {
        let s = self.state.read();
        s.cards.get(&id).cloned().ok_or(CoreError::NotFound("card"))
    }

    async fn list_cards(&self, deck_id: Option<DeckId>) -> Result<Vec<Card>, CoreError> {
        let s = self.state.read();
        let mut v: Vec<Card> = s.cards.values().cloned().collect();
        if let Some(did) = deck_id {
            v.retain(|c| c.deck_id == did);
        }
        Ok(v)
    }

    async fn update_card(&self, card: &Card) -> Result<Card, CoreError> {
        self.commit(&[Collection::Cards], |s| {
            let Some(existing) = s.cards.get_mut(&card.id) else {
                return Err(CoreError::NotFound("card"));
            };
            if existing.deck_id != card.deck_id {
                return Err(CoreError::Invalid("card cannot move between decks"));
            }
            *existing = card.clone();
            Ok(())
        })
        .await?;
        Ok(card.clone())
    }

    async fn delete_card(&self, id: CardId) -> Result<(), CoreError> {
        self.commit(&[Collection::Decks, Collection::Cards], |s| {
            let Some(card) = s.cards.remove(&id) else {
                return Err(CoreError::NotFound("card"));
            };
            s.refresh_card_count(card.deck_id);
            Ok(())
        })
        .await?;
        tracing::debug!(card_id = %id, "card deleted");
        Ok(())
    }

    async fn record_review(&self, card: &Card, log: &ReviewLog) -> Result<(), CoreError> {
        self.commit(&[Collection::Cards, Collection::ReviewLogs], |s| {
            let Some(slot) = s.cards.get_mut(&card.id) else {
                return Err(CoreError::NotFound("card"));
            };
            *slot = card.clone();
            s.reviews.push(log.clone());
            Ok(())
        })
        .await
    }

    async fn list_reviews(&self) -> Result<Vec<ReviewLog>, CoreError> {
        let s = self.state.read();
        Ok(s.reviews.clone())
    }

    async fn list_reviews_for_card(&self, card_id: CardId) -> Result<Vec<ReviewLog>, CoreError> {
        let s = self.state.read();
        Ok(s.reviews.iter().filter(|r| r.card_id == card_id).cloned().collect())
    }
}
