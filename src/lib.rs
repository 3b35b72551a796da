pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod selection;
pub mod session;
pub mod split;
pub mod store;
pub mod sync;

pub use config::Config;
pub use error::{BillError, SyncError};
pub use model::{Bill, BillItem, BillStatus, NewBill, NewItem};
pub use selection::SelectionSet;
pub use session::Session;
pub use store::{BillStore, StoreAvailability};
pub use sync::{BillSession, RemoteSync};
