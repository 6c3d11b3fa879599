use super::{FieldSetter, InMemoryRepository, Repository};
use crate::error::Result;
use crate::model::Entity;
use crate::query_builder::Criteria;
use async_trait::async_trait;

/// Async counterpart of [`Repository`] for backends that perform I/O
#[async_trait]
pub trait AsyncRepository<E: Entity>: Send + Sync {
    async fn find_one_using(&self, criteria: &Criteria<E>) -> Result<Option<E>>;

    async fn find_all_using(&self, criteria: &Criteria<E>) -> Result<Vec<E>>;

    async fn find_top_using(&self, criteria: &Criteria<E>) -> Result<Option<E>> {
        Ok(self.find_all_using(criteria).await?.into_iter().next())
    }

    async fn find_top_n_using(&self, count: usize, criteria: &Criteria<E>) -> Result<Vec<E>> {
        let mut rows = self.find_all_using(criteria).await?;
        rows.truncate(count);
        Ok(rows)
    }

    async fn delete_using(&self, criteria: &Criteria<E>) -> Result<u64>;

    async fn update_using(&self, criteria: &Criteria<E>, setters: &[FieldSetter<E>]) -> Result<u64>;

    async fn count(&self) -> Result<u64>;

    async fn checkpoint(&self) -> Result<i64>;
}

#[async_trait]
impl<E: Entity> AsyncRepository<E> for InMemoryRepository<E> {
    async fn find_one_using(&self, criteria: &Criteria<E>) -> Result<Option<E>> {
        Repository::find_one_using(self, criteria)
    }

    async fn find_all_using(&self, criteria: &Criteria<E>) -> Result<Vec<E>> {
        Repository::find_all_using(self, criteria)
    }

    async fn find_top_using(&self, criteria: &Criteria<E>) -> Result<Option<E>> {
        Repository::find_top_using(self, criteria)
    }

    async fn find_top_n_using(&self, count: usize, criteria: &Criteria<E>) -> Result<Vec<E>> {
        Repository::find_top_n_using(self, count, criteria)
    }

    async fn delete_using(&self, criteria: &Criteria<E>) -> Result<u64> {
        Repository::delete_using(self, criteria)
    }

    async fn update_using(&self, criteria: &Criteria<E>, setters: &[FieldSetter<E>]) -> Result<u64> {
        Repository::update_using(self, criteria, setters)
    }

    async fn count(&self) -> Result<u64> {
        Repository::count(self)
    }

    async fn checkpoint(&self) -> Result<i64> {
        Repository::checkpoint(self)
    }
}
