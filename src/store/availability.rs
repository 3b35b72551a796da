//! Store capability resolved once at startup
//!
//! Commands ask this object for the store instead of probing the database
//! themselves. When the database cannot be opened, everything that needs it
//! fails with the same configuration error, while store-free commands keep working.

use tracing::{info, warn};

use super::BillStore;
use crate::error::BillError;
use crate::Config;

pub enum StoreAvailability {
    Available(BillStore),
    Unavailable { reason: String },
}

impl StoreAvailability {
    pub fn probe(config: &Config) -> Self {
        let path = config.database_path();
        match BillStore::open(&path) {
            Ok(store) => {
                info!(path = %path.display(), "bill store opened");
                StoreAvailability::Available(store)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %format!("{:#}", e), "bill store unavailable");
                StoreAvailability::Unavailable {
                    reason: format!("{:#}", e),
                }
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, StoreAvailability::Available(_))
    }

    pub fn require(&self) -> Result<&BillStore, BillError> {
        match self {
            StoreAvailability::Available(store) => Ok(store),
            StoreAvailability::Unavailable { reason } => {
                Err(BillError::StoreUnavailable(reason.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_opens_configured_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.database.path = dir.path().join("bills.db").to_string_lossy().to_string();

        let availability = StoreAvailability::probe(&config);
        assert!(availability.is_available());
        assert!(availability.require().is_ok());
    }

    #[test]
    fn test_probe_reports_unusable_path() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the database directory should be
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut config = Config::default();
        config.database.path = blocker.join("bills.db").to_string_lossy().to_string();

        let availability = StoreAvailability::probe(&config);
        assert!(!availability.is_available());
        assert!(matches!(
            availability.require(),
            Err(BillError::StoreUnavailable(_))
        ));
    }
}
