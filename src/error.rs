//! Error types shared by the store, the sync layer and the CLI

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum BillError {
    /// Input rejected before anything was written
    #[error("Invalid bill: {0}")]
    Validation(String),

    #[error("Bill not found: {0}")]
    NotFound(String),

    #[error("Bill id '{query}' is ambiguous ({matches} matches); use more characters")]
    AmbiguousId { query: String, matches: usize },

    /// The configured database could not be opened at startup
    #[error("Bill store unavailable: {0}")]
    StoreUnavailable(String),
}

/// A local change was applied but the store did not accept it.
///
/// Local state is kept as-is; the two sides stay diverged until the
/// next reload from the store.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to sync selection of item {item_id}: {source}")]
    Selection {
        item_id: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to sync payment of {amount:.2}: {source}")]
    Payment {
        amount: f64,
        #[source]
        source: BoxError,
    },
}
