use super::IExpertRepo;
use crate::repos::shared::inmemory_repo::*;
use consultation_booking_domain::{Expert, ID};

pub struct InMemoryExpertRepo {
    experts: std::sync::Mutex<Vec<Expert>>,
}

impl InMemoryExpertRepo {
    pub fn new() -> Self {
        Self {
            experts: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IExpertRepo for InMemoryExpertRepo {
    async fn insert(&self, expert: &Expert) -> anyhow::Result<()> {
        insert(expert, &self.experts);
        Ok(())
    }

    async fn save(&self, expert: &Expert) -> anyhow::Result<()> {
        save(expert, &self.experts);
        Ok(())
    }

    async fn find(&self, expert_id: &ID) -> anyhow::Result<Option<Expert>> {
        Ok(find(expert_id, &self.experts))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Expert>> {
        Ok(find_by(&self.experts, |e| e.email == email).into_iter().next())
    }

    async fn find_many(&self, skip: usize, limit: usize) -> anyhow::Result<Vec<Expert>> {
        let mut experts = find_by(&self.experts, |_| true);
        experts.sort_by_key(|e| e.created);
        Ok(paginate(experts, skip, limit))
    }

    async fn find_by_expertise(&self, expertise: &str) -> anyhow::Result<Vec<Expert>> {
        Ok(find_by(&self.experts, |e| e.expertise == expertise))
    }

    async fn delete(&self, expert_id: &ID) -> anyhow::Result<Option<Expert>> {
        Ok(delete(expert_id, &self.experts))
    }
}
