//! Data module - loading, cleaning, filtering and caching of transactions

mod cache;
mod filter;
mod loader;
mod model;
mod processor;
pub mod schema;

pub use cache::{SourceKey, TableCache};
pub use filter::{DashboardFilter, DateRange};
pub use loader::{load_and_clean, DataLoader, FailureKind, LoadError, RawTable, SourceFormat};
pub use model::{CleanTable, Transaction};
pub use processor::{CleanOutcome, CleaningReport, DataProcessor};
pub use schema::Schema;
