//! Review operation shared by every front end.

use crate::repo::Repository;
use crate::scheduler::{apply_rating, ReviewOutcome};
use crate::{CardId, CoreError, Rating};
use chrono::{DateTime, TimeZone};

/// Reviews one card: read it, schedule it, then store the card together
/// with its log entry. A missing card fails before anything is written.
pub async fn review_card<R, Tz>(
    repo: &R,
    card_id: CardId,
    rating: Rating,
    now: &DateTime<Tz>,
) -> Result<ReviewOutcome, CoreError>
where
    R: Repository + ?Sized,
    Tz: TimeZone,
{
    let card = repo.get_card(card_id).await?;
    let outcome = apply_rating(card, rating, now);
    repo.record_review(&outcome.updated_card, &outcome.review).await?;
    tracing::debug!(
        card_id = %card_id,
        rating = %rating,
        interval = outcome.updated_card.interval,
        ease = outcome.updated_card.ease,
        "card reviewed"
    );
    Ok(outcome)
}
