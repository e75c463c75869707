use crate::{Card, DeckId, Rating, ReviewLog};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingCounts {
    pub again: u32,
    pub hard: u32,
    pub medium: u32,
    pub easy: u32,
}

impl RatingCounts {
    pub fn record(&mut self, rating: Rating) {
        match rating {
            Rating::Again => self.again += 1,
            Rating::Hard => self.hard += 1,
            Rating::Medium => self.medium += 1,
            Rating::Easy => self.easy += 1,
        }
    }

    pub fn get(&self, rating: Rating) -> u32 {
        match rating {
            Rating::Again => self.again,
            Rating::Hard => self.hard,
            Rating::Medium => self.medium,
            Rating::Easy => self.easy,
        }
    }

    pub fn total(&self) -> u32 {
        self.again + self.hard + self.medium + self.easy
    }
}

/// Derived study figures. Always recomputed from cards and review logs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStats {
    pub cards_reviewed: u32,
    pub cards_to_review: u32,
    pub reviews_by_rating: RatingCounts,
    /// 1 when something was reviewed today, else 0. See [`daily_streak`]
    /// for the consecutive-day count.
    pub streak: u32,
}

/// Local midnight of the day containing `now`, in `now`'s time zone.
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(chrono::NaiveTime::MIN);
    crate::scheduler::local_to_utc(now, midnight)
}

pub fn compute_stats<Tz: TimeZone>(cards: &[Card], events: &[ReviewLog], now: &DateTime<Tz>) -> StudyStats {
    let now_utc = now.with_timezone(&Utc);
    let today = start_of_day(now);

    let cards_to_review = cards.iter().filter(|c| c.is_due(now_utc)).count() as u32;

    let mut reviews_by_rating = RatingCounts::default();
    for e in events.iter().filter(|e| e.reviewed_at >= today) {
        reviews_by_rating.record(e.rating);
    }
    let cards_reviewed = reviews_by_rating.total();

    StudyStats {
        cards_reviewed,
        cards_to_review,
        reviews_by_rating,
        streak: u32::from(cards_reviewed > 0),
    }
}

/// Cards whose due date has strictly passed.
pub fn overdue_count(cards: &[Card], now: DateTime<Utc>) -> usize {
    cards.iter().filter(|c| c.due_date < now).count()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    #[default]
    Week,
    Month,
    Year,
}

impl DateRange {
    pub fn days(&self) -> u32 {
        match self {
            DateRange::Week => 7,
            DateRange::Month => 30,
            DateRange::Year => 365,
        }
    }
}

impl FromStr for DateRange {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" | "7" => Ok(DateRange::Week),
            "month" | "30" => Ok(DateRange::Month),
            "year" | "365" => Ok(DateRange::Year),
            _ => Err(crate::CoreError::Invalid("date range")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReviews {
    pub date: NaiveDate,
    pub reviews: u32,
}

fn reviews_per_day<Tz: TimeZone>(events: &[ReviewLog], tz: &Tz) -> BTreeMap<NaiveDate, u32> {
    let mut per_day = BTreeMap::new();
    for e in events {
        let d = e.reviewed_at.with_timezone(tz).date_naive();
        *per_day.entry(d).or_insert(0) += 1;
    }
    per_day
}

/// Review counts for each day of `range` ending today, oldest first.
pub fn daily_reviews<Tz: TimeZone>(events: &[ReviewLog], now: &DateTime<Tz>, range: DateRange) -> Vec<DailyReviews> {
    let per_day = reviews_per_day(events, &now.timezone());
    let today = now.date_naive();
    (0..range.days())
        .rev()
        .map(|back| {
            let date = today - Duration::days(back as i64);
            DailyReviews {
                date,
                reviews: per_day.get(&date).copied().unwrap_or(0),
            }
        })
        .collect()
}

/// Consecutive days, ending today, with at least one review.
pub fn daily_streak<Tz: TimeZone>(events: &[ReviewLog], now: &DateTime<Tz>) -> u32 {
    let per_day = reviews_per_day(events, &now.timezone());
    let mut streak = 0u32;
    let mut day = now.date_naive();
    while per_day.get(&day).is_some_and(|n| *n > 0) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSummary {
    pub deck_id: DeckId,
    pub total: u32,
    pub due: u32,
}

pub fn deck_summary(deck_id: DeckId, cards: &[Card], now: DateTime<Utc>) -> DeckSummary {
    let mut summary = DeckSummary { deck_id, total: 0, due: 0 };
    for c in cards.iter().filter(|c| c.deck_id == deck_id) {
        summary.total += 1;
        if c.is_due(now) {
            summary.due += 1;
        }
    }
    summary
}
