use cardwise_core::{
    memory::MemoryRepo, review_card, CoreError, Rating, Repository, ReviewLog, StudySession, View,
};
use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

#[tokio::test]
async fn deck_names_are_unique_ignoring_case() {
    let repo = MemoryRepo::new();
    repo.create_deck("Spanish", "verbs").await.unwrap();
    let err = repo.create_deck("spanish", "").await.unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
    let err = repo.create_deck("   ", "").await.unwrap_err();
    assert!(matches!(err, CoreError::Invalid(_)));
}

#[tokio::test]
async fn card_count_tracks_adds_and_deletes() {
    let repo = MemoryRepo::new();
    let deck = repo.create_deck("Lang", "").await.unwrap();
    let a = repo.add_card(deck.id, "hola", "hello").await.unwrap();
    repo.add_card(deck.id, "adios", "goodbye").await.unwrap();
    assert_eq!(repo.get_deck(deck.id).await.unwrap().card_count, 2);

    repo.delete_card(a.id).await.unwrap();
    assert_eq!(repo.get_deck(deck.id).await.unwrap().card_count, 1);
}

#[tokio::test]
async fn new_card_starts_due_with_default_schedule() {
    let repo = MemoryRepo::new();
    let deck = repo.create_deck("Lang", "").await.unwrap();
    let card = repo.add_card(deck.id, "hola", "hello").await.unwrap();
    assert_eq!(card.interval, 0);
    assert_eq!(card.ease, 2.5);
    assert_eq!(card.reviews, 0);
    assert!(card.last_reviewed_at.is_none());
    assert!(card.is_due(Utc::now()));
}

#[tokio::test]
async fn review_updates_card_and_appends_log() {
    let repo = MemoryRepo::new();
    let deck = repo.create_deck("Lang", "").await.unwrap();
    let card = repo.add_card(deck.id, "hola", "hello").await.unwrap();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();

    let out = review_card(&repo, card.id, Rating::Easy, &now).await.unwrap();
    assert_eq!(out.updated_card.interval, 3);

    let stored = repo.get_card(card.id).await.unwrap();
    assert_eq!(stored.reviews, 1);
    assert_eq!(stored.due_date, now + Duration::days(3));
    assert_eq!(stored.last_reviewed_at, Some(now));

    let logs = repo.list_reviews_for_card(card.id).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].rating, Rating::Easy);
}

#[tokio::test]
async fn review_of_missing_card_writes_nothing() {
    let repo = MemoryRepo::new();
    let err = review_card(&repo, Uuid::new_v4(), Rating::Medium, &Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound("card")));
    assert!(repo.list_reviews().await.unwrap().is_empty());
}

#[tokio::test]
async fn record_review_rejects_deleted_card() {
    let repo = MemoryRepo::new();
    let deck = repo.create_deck("Lang", "").await.unwrap();
    let card = repo.add_card(deck.id, "hola", "hello").await.unwrap();
    repo.delete_card(card.id).await.unwrap();

    let log = ReviewLog::new(card.id, Rating::Hard, Utc::now());
    assert!(repo.record_review(&card, &log).await.is_err());
    assert!(repo.list_reviews().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_card_keeps_its_logs_but_deck_cascade_removes_them() {
    let repo = MemoryRepo::new();
    let deck = repo.create_deck("Lang", "").await.unwrap();
    let other = repo.create_deck("Math", "").await.unwrap();
    let a = repo.add_card(deck.id, "hola", "hello").await.unwrap();
    let b = repo.add_card(deck.id, "adios", "goodbye").await.unwrap();
    let c = repo.add_card(other.id, "2+2", "4").await.unwrap();
    let now = Utc::now();
    for id in [a.id, b.id, c.id] {
        review_card(&repo, id, Rating::Medium, &now).await.unwrap();
    }

    repo.delete_card(a.id).await.unwrap();
    assert_eq!(repo.list_reviews().await.unwrap().len(), 3);

    repo.delete_deck(deck.id).await.unwrap();
    let remaining = repo.list_reviews().await.unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|r| r.card_id != b.id));
    assert!(repo.get_card(b.id).await.is_err());
    assert_eq!(repo.list_cards(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_deck_renames_and_rejects_duplicates() {
    let repo = MemoryRepo::new();
    let mut deck = repo.create_deck("Lang", "").await.unwrap();
    repo.create_deck("Math", "").await.unwrap();

    deck.name = "Languages".into();
    deck.description = "spoken ones".into();
    let updated = repo.update_deck(&deck).await.unwrap();
    assert_eq!(updated.name, "Languages");
    assert!(updated.updated_at >= updated.created_at);

    deck.name = "MATH".into();
    assert!(matches!(repo.update_deck(&deck).await, Err(CoreError::Conflict(_))));
}

#[tokio::test]
async fn update_card_keeps_deck() {
    let repo = MemoryRepo::new();
    let deck = repo.create_deck("Lang", "").await.unwrap();
    let other = repo.create_deck("Math", "").await.unwrap();
    let mut card = repo.add_card(deck.id, "hola", "hello").await.unwrap();

    card.back = "hi".into();
    assert_eq!(repo.update_card(&card).await.unwrap().back, "hi");

    card.deck_id = other.id;
    assert!(matches!(repo.update_card(&card).await, Err(CoreError::Invalid(_))));
}

#[tokio::test]
async fn study_session_holds_only_due_cards_of_deck() {
    let repo = MemoryRepo::new();
    let deck = repo.create_deck("Lang", "").await.unwrap();
    let other = repo.create_deck("Math", "").await.unwrap();
    for i in 0..5 {
        repo.add_card(deck.id, &format!("q{i}"), "a").await.unwrap();
    }
    repo.add_card(other.id, "2+2", "4").await.unwrap();
    let now = Utc::now() + Duration::seconds(1);
    let mut later = repo.add_card(deck.id, "later", "x").await.unwrap();
    later.due_date = now + Duration::days(4);
    repo.update_card(&later).await.unwrap();

    let cards = repo.list_cards(None).await.unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let mut session = StudySession::start(deck.id, &cards, now, &mut rng);
    assert_eq!(session.remaining(), 5);
    assert!(session.current().is_some_and(|c| c.deck_id == deck.id && c.id != later.id));

    let first = session.current().map(|c| c.id).unwrap();
    session.skip();
    assert_ne!(session.current().map(|c| c.id), Some(first));
    assert_eq!(session.remaining(), 5);

    while let Some(id) = session.current().map(|c| c.id) {
        let out = review_card(&repo, id, Rating::Again, &now).await.unwrap();
        assert!(session.complete(out.updated_card.id));
    }
    assert!(session.is_finished());
    assert_eq!(session.reviewed(), 5);
    assert!(!session.complete(first));
}

#[test]
fn view_back_navigation() {
    let id = Uuid::new_v4();
    assert_eq!(View::Study(id).back(), View::DeckDetail(id));
    assert_eq!(View::DeckDetail(id).back(), View::DeckList);
    assert_eq!(View::DeckList.back(), View::Dashboard);
    assert_eq!(View::Stats.back(), View::Dashboard);
    assert_eq!(View::Study(id).deck_id(), Some(id));
    assert_eq!(View::Stats.deck_id(), None);
    assert!(View::default().is_top_level());
}

#[test]
fn wire_format_uses_camel_case_and_heals_fractional_interval() {
    let json = r#"{
        "id": "6f1c0a52-2a43-4c8f-9a8f-0c2b0f3d9a11",
        "deckId": "0b7d4e1e-3c3a-4b61-8f0e-5b0e7f3a2c10",
        "front": "hola",
        "back": "hello",
        "dueDate": "2024-06-01T09:00:00.000Z",
        "interval": 1.8,
        "ease": 2.5,
        "reviews": 1,
        "lastReviewedAt": null
    }"#;
    let card: cardwise_core::Card = serde_json::from_str(json).unwrap();
    assert_eq!(card.interval, 2);
    assert_eq!(card.due_date, Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap());

    let out = serde_json::to_value(&card).unwrap();
    assert!(out.get("dueDate").is_some());
    assert!(out.get("lastReviewedAt").is_some());

    let log = ReviewLog::new(card.id, Rating::Medium, Utc::now());
    let v = serde_json::to_value(&log).unwrap();
    assert_eq!(v["rating"], "medium");
    assert!(v.get("cardId").is_some());
}

#[test]
fn rating_parses_keys_and_names() {
    assert_eq!("1".parse::<Rating>().unwrap(), Rating::Again);
    assert_eq!("good".parse::<Rating>().unwrap(), Rating::Medium);
    assert_eq!("Easy".parse::<Rating>().unwrap(), Rating::Easy);
    assert!("5".parse::<Rating>().is_err());
    assert!(Rating::Again < Rating::Easy);
}
