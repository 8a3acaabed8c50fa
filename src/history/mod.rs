//! Recent search history
//!
//! Persists a short list of past queries per search domain.

mod recent;
mod storage;

pub use recent::RecentHistory;
pub use storage::{FileStorage, HistoryStorage, MemoryStorage};
