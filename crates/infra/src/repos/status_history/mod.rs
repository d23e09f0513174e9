mod inmemory;
mod postgres;

use consultation_booking_domain::{StatusHistory, ID};
pub use inmemory::InMemoryStatusHistoryRepo;
pub(crate) use postgres::insert_history;
pub use postgres::PostgresStatusHistoryRepo;

/// Append only, entries are never updated or removed
#[async_trait::async_trait]
pub trait IStatusHistoryRepo: Send + Sync {
    async fn insert(&self, history: &StatusHistory) -> anyhow::Result<()>;
    /// Oldest first
    async fn find_by_booking(&self, booking_id: &ID) -> anyhow::Result<Vec<StatusHistory>>;
}
