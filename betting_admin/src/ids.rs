//! Public identifier generation.
//!
//! Users, bettings and catalog documents carry a six-digit numeric id next to
//! their storage id. Ids are drawn at random and the store's uniqueness
//! constraint decides whether the draw is kept; on collision a new id is drawn,
//! up to [`MAX_ID_ATTEMPTS`] times.

use crate::error::{AdminError, AdminResult};
use rand::{Rng, distr::Alphanumeric};
use std::future::Future;

/// Smallest six-digit id
pub const MIN_PUBLIC_ID: i64 = 100_000;

/// Largest six-digit id
pub const MAX_PUBLIC_ID: i64 = 999_999;

/// Attempts before giving up on a colliding id
pub const MAX_ID_ATTEMPTS: u32 = 5;

/// Length of generated promo codes
pub const PROMO_CODE_LEN: usize = 8;

/// Draw a random six-digit id
pub fn random_public_id() -> i64 {
    rand::rng().random_range(MIN_PUBLIC_ID..=MAX_PUBLIC_ID)
}

/// Draw a random uppercase alphanumeric promo code
pub fn random_promo_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(PROMO_CODE_LEN)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect()
}

/// Whether `id` is a well-formed six-digit public id
pub fn is_public_id(id: i64) -> bool {
    (MIN_PUBLIC_ID..=MAX_PUBLIC_ID).contains(&id)
}

/// Run `attempt` with fresh ids until it stops failing with
/// [`AdminError::Duplicate`] on `field`.
///
/// Any other error is returned as-is. After [`MAX_ID_ATTEMPTS`] collisions the
/// result is [`AdminError::IdExhausted`].
pub async fn with_unique_id<T, F, Fut>(field: &'static str, mut attempt: F) -> AdminResult<T>
where
    F: FnMut(i64) -> Fut,
    Fut: Future<Output = AdminResult<T>>,
{
    retry_on_duplicate(&[field], || attempt(random_public_id())).await
}

/// Re-run `attempt` while it fails with [`AdminError::Duplicate`] on one of
/// `fields`. The closure draws its own random keys on every call.
pub async fn retry_on_duplicate<T, F, Fut>(
    fields: &[&'static str],
    mut attempt: F,
) -> AdminResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AdminResult<T>>,
{
    for _ in 0..MAX_ID_ATTEMPTS {
        match attempt().await {
            Err(AdminError::Duplicate(ref f)) if fields.iter().any(|name| *name == f.as_str()) => {
                log::debug!("Generated {f} collided, drawing again");
            }
            other => return other,
        }
    }

    Err(AdminError::IdExhausted {
        field: fields.first().copied().unwrap_or("id"),
        attempts: MAX_ID_ATTEMPTS,
    })
}
