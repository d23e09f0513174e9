mod inmemory;
mod postgres;

use consultation_booking_domain::{Expert, ID};
pub use inmemory::InMemoryExpertRepo;
pub use postgres::PostgresExpertRepo;

#[async_trait::async_trait]
pub trait IExpertRepo: Send + Sync {
    async fn insert(&self, expert: &Expert) -> anyhow::Result<()>;
    async fn save(&self, expert: &Expert) -> anyhow::Result<()>;
    async fn find(&self, expert_id: &ID) -> anyhow::Result<Option<Expert>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Expert>>;
    /// Ordered by creation, oldest first
    async fn find_many(&self, skip: usize, limit: usize) -> anyhow::Result<Vec<Expert>>;
    async fn find_by_expertise(&self, expertise: &str) -> anyhow::Result<Vec<Expert>>;
    async fn delete(&self, expert_id: &ID) -> anyhow::Result<Option<Expert>>;
}
