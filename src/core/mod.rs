//! Core business logic - framework-agnostic marketplace operations.
//!
//! Every mutation in this layer runs inside a database transaction and is the
//! only place the counter fields (points, deals_count, upvotes,
//! interested_investors_count, unread counts) are allowed to change. The HTTP
//! layer is a thin shell over these functions.

/// Content item submission and reads
pub mod content;
/// Deal creation, lookup, and status transitions
pub mod deal;
/// Membership upgrades from the payment webhook
pub mod membership;
/// Deal chat messages and unread counters
pub mod message;
/// Append-only notification sink
pub mod notify;
/// Fixed point values per item type
pub mod points;
/// User profile upsert and reads
pub mod profile;
/// Upvote toggling with point adjustments
pub mod upvote;

use std::time::Duration;

use crate::errors::{Error, Result};

/// Time limit for a single transactional operation. The store either answers
/// within this window or the caller gets a retryable timeout; the dropped
/// transaction rolls back, so nothing partial is left behind.
pub(crate) const OP_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs `fut` under [`OP_TIMEOUT`], converting expiry into [`Error::Timeout`].
pub(crate) async fn with_op_timeout<F, T>(fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    with_timeout(OP_TIMEOUT, fut).await
}

async fn with_timeout<F, T>(limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout {
            seconds: limit.as_secs(),
        }),
    }
}
