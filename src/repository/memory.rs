use super::evaluator;
use super::{FieldSetter, Repository};
use crate::config::{CriteriaConfig, FindOnePolicy};
use crate::error::{CriteriaError, Result};
use crate::logging::{log_error, log_repository_operation};
use crate::model::Entity;
use crate::query_builder::{Criteria, QueryContext};
use parking_lot::RwLock;
use std::collections::HashSet;

/// Reference backend holding its rows in memory
///
/// Rows keep insertion order, which is the result order of criteria without orderings.
/// Each operation runs under a single lock, so readers never observe a partial update.
pub struct InMemoryRepository<E: Entity> {
    rows: RwLock<Vec<E>>,
    ctx: QueryContext,
    find_one: FindOnePolicy,
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self::with_config(&CriteriaConfig::default())
    }

    pub fn with_config(config: &CriteriaConfig) -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            ctx: QueryContext::from(config),
            find_one: config.find_one,
        }
    }

    /// Replace the stored rows
    pub fn with_rows(self, rows: impl IntoIterator<Item = E>) -> Self {
        *self.rows.write() = rows.into_iter().collect();
        self
    }

    pub fn insert(&self, entity: E) {
        self.rows.write().push(entity);
    }

    /// Copy of every stored row
    pub fn snapshot(&self) -> Vec<E> {
        self.rows.read().clone()
    }

    pub fn context(&self) -> &QueryContext {
        &self.ctx
    }

    fn select(&self, rows: &[E], criteria: &Criteria<E>) -> Result<Vec<usize>> {
        let compiled = criteria.compile(&self.ctx)?;
        evaluator::select(rows, &compiled, &self.ctx)
    }

    fn find(&self, criteria: &Criteria<E>) -> Result<Vec<E>> {
        let rows = self.rows.read();
        let selected = self.select(&rows, criteria)?;
        Ok(selected.into_iter().map(|index| rows[index].clone()).collect())
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    fn find_one_using(&self, criteria: &Criteria<E>) -> Result<Option<E>> {
        let mut found = self.find(criteria)?;
        log_repository_operation("find_one", E::NAME, found.len() as u64, "completed");

        match (self.find_one, found.len()) {
            (_, 0) => Ok(None),
            (FindOnePolicy::Strict, count) if count > 1 => Err(CriteriaError::NonUniqueResult {
                entity: E::NAME,
                count,
            }),
            _ => Ok(Some(found.swap_remove(0))),
        }
    }

    fn find_all_using(&self, criteria: &Criteria<E>) -> Result<Vec<E>> {
        let found = self.find(criteria)?;
        log_repository_operation("find_all", E::NAME, found.len() as u64, "completed");
        Ok(found)
    }

    fn delete_using(&self, criteria: &Criteria<E>) -> Result<u64> {
        let mut rows = self.rows.write();
        let selected: HashSet<usize> = self.select(&rows, criteria)?.into_iter().collect();

        let mut index = 0;
        rows.retain(|_| {
            let keep = !selected.contains(&index);
            index += 1;
            keep
        });

        let deleted = selected.len() as u64;
        log_repository_operation("delete", E::NAME, deleted, "completed");
        Ok(deleted)
    }

    fn update_using(&self, criteria: &Criteria<E>, setters: &[FieldSetter<E>]) -> Result<u64> {
        if setters.is_empty() {
            return Err(CriteriaError::NoUpdatesSpecified);
        }

        let mut rows = self.rows.write();
        let selected = self.select(&rows, criteria)?;

        // Stage every change first so a failing assignment leaves all rows untouched
        let mut staged = Vec::with_capacity(selected.len());
        for index in selected {
            let mut row = rows[index].clone();
            for setter in setters {
                if let Err(error) = setter.apply(&mut row) {
                    log_error("in_memory_repository", "update", &error.to_string(), Some(E::NAME));
                    return Err(error);
                }
            }
            staged.push((index, row));
        }

        let updated = staged.len() as u64;
        for (index, row) in staged {
            rows[index] = row;
        }

        log_repository_operation("update", E::NAME, updated, "completed");
        Ok(updated)
    }

    fn count(&self) -> Result<u64> {
        Ok(self.rows.read().len() as u64)
    }

    fn checkpoint(&self) -> Result<i64> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter_map(|row| row.field(E::ID_FIELD).and_then(|id| id.as_int()))
            .max()
            .unwrap_or(0))
    }
}
