//! Unified error types and result handling.
//!
//! Every fallible operation in the crate returns [`Result`], so precondition
//! failures, transactional failures, and storage errors all propagate as a
//! tagged value rather than a silent no-op. Side-effect failures in the
//! post-commit phase of a deal (notifications, chat seeding, unread counters)
//! are deliberately *not* represented here as a propagating variant: they are
//! logged at the call site and the primary operation still succeeds.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("User profile '{user_id}' not found")]
    UserNotFound { user_id: String },

    #[error("Content item {item_id} not found")]
    ItemNotFound { item_id: i64 },

    #[error("Deal {deal_id} not found")]
    DealNotFound { deal_id: i64 },

    #[error("Notification {notification_id} not found")]
    NotificationNotFound { notification_id: i64 },

    #[error("User '{user_id}' cannot upvote their own content")]
    SelfAction { user_id: String },

    #[error("Illegal deal status transition: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("User '{user_id}' is not the investor of deal {deal_id}")]
    NotDealInvestor { deal_id: i64, user_id: String },

    #[error("User '{user_id}' is not a participant of deal {deal_id}")]
    NotDealParticipant { deal_id: i64, user_id: String },

    #[error("Write contention: {message}")]
    Conflict { message: String },

    #[error("Operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: i64 },

    #[error("Item type '{item_type}' is not eligible for this operation")]
    UnsupportedItemType { item_type: String },

    #[error("Missing caller identity: {message}")]
    Unauthenticated { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[source] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the caller may safely retry the whole operation. Conflicts and
    /// timeouts leave no partial state behind, so a retry re-runs the entire
    /// transaction from scratch.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::Timeout { .. })
    }
}

// SQLite reports writer contention as a locked/busy database. Those errors
// convert to the retryable `Conflict` wherever they surface, statement and
// commit alike; everything else stays `Database`.
impl From<sea_orm::DbErr> for Error {
    fn from(err: sea_orm::DbErr) -> Self {
        let message = err.to_string();
        if message.contains("database is locked") || message.contains("database table is locked") {
            return Self::Conflict { message };
        }
        Self::Database(err)
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
