use cardwise_core::{
    cards_in_deck, compute_stats, daily_reviews, daily_streak, deck_summary, due_cards, filter_by_text, overdue_count,
    start_of_day, Card, DateRange, Deck, Rating, RatingCounts, ReviewLog,
};
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};

fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn card_due(deck: &Deck, front: &str, due: DateTime<Utc>) -> Card {
    let mut c = Card::new(deck.id, front, "back");
    c.due_date = due;
    c
}

#[test]
fn filters_text_and_deck() {
    let lang = Deck::new("Lang", "");
    let math = Deck::new("Math", "");
    let c1 = Card::new(lang.id, "hola", "hello");
    let c2 = Card::new(lang.id, "adios", "goodbye");
    let c3 = Card::new(math.id, "2+2", "four");
    let v = vec![c1, c2, c3];

    let by_text = filter_by_text(&v, "HOL");
    assert_eq!(by_text.len(), 1);
    assert_eq!(by_text[0].front, "hola");

    let by_back = filter_by_text(&v, "good");
    assert_eq!(by_back.len(), 1);
    assert_eq!(filter_by_text(&v, "   ").len(), 3);

    assert_eq!(cards_in_deck(&v, lang.id).len(), 2);
    assert_eq!(cards_in_deck(&v, math.id).len(), 1);
}

#[test]
fn due_includes_exact_now_and_overdue_excludes_it() {
    let deck = Deck::new("Lang", "");
    let now = noon(2024, 5, 1);
    let cards = vec![
        card_due(&deck, "past", now - Duration::hours(3)),
        card_due(&deck, "now", now),
        card_due(&deck, "future", now + Duration::days(2)),
    ];
    assert_eq!(due_cards(&cards, now).len(), 2);
    assert_eq!(overdue_count(&cards, now), 1);
}

#[test]
fn no_events_today_gives_zeroed_stats() {
    let deck = Deck::new("Lang", "");
    let now = noon(2024, 5, 1);
    let card = card_due(&deck, "a", now + Duration::days(1));
    let yesterday = ReviewLog::new(card.id, Rating::Easy, now - Duration::days(1));

    let stats = compute_stats(&[card], &[yesterday], &now);
    assert_eq!(stats.cards_reviewed, 0);
    assert_eq!(stats.cards_to_review, 0);
    assert_eq!(stats.streak, 0);
    assert_eq!(stats.reviews_by_rating, RatingCounts::default());
}

#[test]
fn todays_events_are_partitioned_by_rating() {
    let deck = Deck::new("Lang", "");
    let now = noon(2024, 5, 1);
    let cards = vec![
        card_due(&deck, "due", now - Duration::minutes(1)),
        card_due(&deck, "later", now + Duration::days(3)),
    ];
    let id = cards[0].id;
    let midnight = start_of_day(&now);
    let events = vec![
        ReviewLog::new(id, Rating::Again, midnight),
        ReviewLog::new(id, Rating::Again, now - Duration::hours(1)),
        ReviewLog::new(id, Rating::Medium, now),
        ReviewLog::new(id, Rating::Easy, midnight - Duration::seconds(1)),
    ];

    let stats = compute_stats(&cards, &events, &now);
    assert_eq!(stats.cards_to_review, 1);
    assert_eq!(stats.cards_reviewed, 3);
    assert_eq!(stats.reviews_by_rating.again, 2);
    assert_eq!(stats.reviews_by_rating.hard, 0);
    assert_eq!(stats.reviews_by_rating.medium, 1);
    assert_eq!(stats.reviews_by_rating.easy, 0);
    assert_eq!(stats.reviews_by_rating.total(), stats.cards_reviewed);
    assert_eq!(stats.streak, 1);
}

#[test]
fn stats_are_pure() {
    let deck = Deck::new("Lang", "");
    let now = noon(2024, 5, 1);
    let cards = vec![card_due(&deck, "a", now)];
    let events = vec![ReviewLog::new(cards[0].id, Rating::Hard, now)];
    assert_eq!(compute_stats(&cards, &events, &now), compute_stats(&cards, &events, &now));
}

#[test]
fn today_boundary_follows_callers_zone() {
    // 01:00 at UTC+3 is 22:00 UTC the previous day.
    let tz = FixedOffset::east_opt(3 * 3600).unwrap();
    let now = tz.with_ymd_and_hms(2024, 5, 2, 1, 0, 0).unwrap();
    let midnight = start_of_day(&now);
    assert_eq!(midnight, Utc.with_ymd_and_hms(2024, 5, 1, 21, 0, 0).unwrap());

    let deck = Deck::new("Lang", "");
    let card = Card::new(deck.id, "a", "b");
    let events = vec![
        ReviewLog::new(card.id, Rating::Easy, Utc.with_ymd_and_hms(2024, 5, 1, 21, 30, 0).unwrap()),
        ReviewLog::new(card.id, Rating::Easy, Utc.with_ymd_and_hms(2024, 5, 1, 20, 30, 0).unwrap()),
    ];
    assert_eq!(compute_stats(&[card], &events, &now).cards_reviewed, 1);
}

#[test]
fn daily_series_is_zero_filled_oldest_first() {
    let deck = Deck::new("Lang", "");
    let card = Card::new(deck.id, "a", "b");
    let now = noon(2024, 5, 10);
    let events = vec![
        ReviewLog::new(card.id, Rating::Easy, now),
        ReviewLog::new(card.id, Rating::Hard, now - Duration::hours(2)),
        ReviewLog::new(card.id, Rating::Medium, now - Duration::days(3)),
        ReviewLog::new(card.id, Rating::Medium, now - Duration::days(40)),
    ];

    let week = daily_reviews(&events, &now, DateRange::Week);
    assert_eq!(week.len(), 7);
    assert_eq!(week[0].date, now.date_naive() - Duration::days(6));
    assert_eq!(week[6].date, now.date_naive());
    assert_eq!(week[6].reviews, 2);
    assert_eq!(week[3].reviews, 1);
    assert_eq!(week.iter().map(|d| d.reviews).sum::<u32>(), 3);

    let month = daily_reviews(&events, &now, DateRange::Month);
    assert_eq!(month.len(), 30);
    let year = daily_reviews(&events, &now, DateRange::Year);
    assert_eq!(year.iter().map(|d| d.reviews).sum::<u32>(), 4);
}

#[test]
fn consecutive_streak_stops_at_first_gap() {
    let deck = Deck::new("Lang", "");
    let card = Card::new(deck.id, "a", "b");
    let now = noon(2024, 5, 10);
    let events = vec![
        ReviewLog::new(card.id, Rating::Easy, now - Duration::days(4)),
        ReviewLog::new(card.id, Rating::Easy, now - Duration::days(2)),
        ReviewLog::new(card.id, Rating::Medium, now - Duration::days(1)),
        ReviewLog::new(card.id, Rating::Hard, now),
    ];
    assert_eq!(daily_streak(&events, &now), 3);
    assert_eq!(daily_streak(&events[..3], &now), 0);
}

#[test]
fn deck_summary_counts_only_that_deck() {
    let lang = Deck::new("Lang", "");
    let math = Deck::new("Math", "");
    let now = noon(2024, 5, 1);
    let cards = vec![
        card_due(&lang, "a", now - Duration::days(1)),
        card_due(&lang, "b", now + Duration::days(1)),
        card_due(&math, "c", now - Duration::days(1)),
    ];
    let s = deck_summary(lang.id, &cards, now);
    assert_eq!((s.total, s.due), (2, 1));
}

#[test]
fn date_range_parses_names() {
    assert_eq!("month".parse::<DateRange>().unwrap(), DateRange::Month);
    assert_eq!(" Year ".parse::<DateRange>().unwrap().days(), 365);
    assert!("decade".parse::<DateRange>().is_err());
}
