pub mod store;

pub use store::{next_midnight_utc, QuotaStore, QuotaStoreStats};
