//! Spaced-repetition scheduling.
//!
//! The ease factor is updated first; the interval update then uses the new
//! ease. A card whose current interval is at most one day is treated as a
//! first review (or a review right after an `again` reset) and receives the
//! rating factor itself as its interval. Intervals are rounded half-up.

use crate::{Card, Rating, ReviewLog, EASE_DEFAULT, EASE_MAX, EASE_MIN, MAX_INTERVAL_DAYS, MIN_INTERVAL_DAYS};
use chrono::{DateTime, Days, Duration, Local, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

const AGAIN_PENALTY: f64 = 0.30;
const HARD_PENALTY: f64 = 0.15;
const EASY_BONUS: f64 = 1.3;

/// Scheduling state the algorithm reads from a card.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub interval: u32,
    pub ease: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextReview {
    pub due_date: DateTime<Utc>,
    pub interval: u32,
    pub ease: f64,
}

#[derive(Debug)]
pub struct ReviewOutcome {
    pub updated_card: Card,
    pub review: ReviewLog,
}

fn rating_factor(rating: Rating) -> f64 {
    match rating {
        Rating::Again => 0.0,
        Rating::Hard => 1.2,
        Rating::Medium => 1.8,
        Rating::Easy => 2.5,
    }
}

fn clamp_ease(x: f64) -> f64 {
    x.clamp(EASE_MIN, EASE_MAX)
}

fn next_ease(ease: f64, rating: Rating) -> f64 {
    // Corrupted records heal here instead of poisoning every later review.
    let ease = if ease.is_finite() { ease } else { EASE_DEFAULT };
    let updated = match rating {
        Rating::Again => ease - AGAIN_PENALTY,
        Rating::Hard => ease - HARD_PENALTY,
        Rating::Medium => ease,
        Rating::Easy => ease + EASY_BONUS,
    };
    clamp_ease(updated)
}

fn next_interval(interval: u32, rating: Rating, new_ease: f64) -> u32 {
    let days = match rating {
        Rating::Again => MIN_INTERVAL_DAYS as f64,
        _ if interval <= MIN_INTERVAL_DAYS => rating_factor(rating).round(),
        _ => (interval as f64 * rating_factor(rating) * new_ease).round(),
    };
    days.clamp(MIN_INTERVAL_DAYS as f64, MAX_INTERVAL_DAYS as f64) as u32
}

/// Resolves a wall-clock time in `now`'s zone. A time skipped by a DST jump
/// is read with `now`'s offset, which lands it after the gap.
pub(crate) fn local_to_utc<Tz: TimeZone>(now: &DateTime<Tz>, local: NaiveDateTime) -> DateTime<Utc> {
    match now.timezone().from_local_datetime(&local).earliest() {
        Some(t) => t.with_timezone(&Utc),
        None => {
            let offset = now.offset().fix().local_minus_utc() as i64;
            local.and_utc() - Duration::seconds(offset)
        }
    }
}

/// Adds whole calendar days in the caller's time zone, so the wall-clock
/// time of day is kept across month, year and DST boundaries.
fn add_days<Tz: TimeZone>(now: &DateTime<Tz>, days: u32) -> DateTime<Utc> {
    match now.naive_local().checked_add_days(Days::new(days as u64)) {
        Some(local) => local_to_utc(now, local),
        None => DateTime::<Utc>::MAX_UTC,
    }
}

/// Computes the next due date, interval, and ease for a review at `now`.
pub fn compute_next_review_at<Tz: TimeZone>(current: Schedule, rating: Rating, now: &DateTime<Tz>) -> NextReview {
    let ease = next_ease(current.ease, rating);
    let interval = next_interval(current.interval, rating, ease);
    NextReview {
        due_date: add_days(now, interval),
        interval,
        ease,
    }
}

/// Same as [`compute_next_review_at`] using the local clock.
pub fn compute_next_review(current: Schedule, rating: Rating) -> NextReview {
    compute_next_review_at(current, rating, &Local::now())
}

/// Interval each rating would produce, in `Rating::ALL` order.
pub fn preview_intervals(current: Schedule) -> [(Rating, u32); 4] {
    Rating::ALL.map(|r| {
        let ease = next_ease(current.ease, r);
        (r, next_interval(current.interval, r, ease))
    })
}

/// Applies a rating to a card and produces the review-log entry for it.
pub fn apply_rating<Tz: TimeZone>(mut card: Card, rating: Rating, now: &DateTime<Tz>) -> ReviewOutcome {
    let next = compute_next_review_at(card.schedule(), rating, now);
    let reviewed_at = now.with_timezone(&Utc);
    card.apply(&next, reviewed_at);
    let review = ReviewLog::new(card.id, rating, reviewed_at);
    ReviewOutcome { updated_card: card, review }
}
