use super::{EntityUpdater, Repository};
use crate::error::Result;
use crate::model::Entity;
use crate::query_builder::{Criteria, CriteriaBuilder, Submit};
use std::marker::PhantomData;

/// Builder-first facade over a repository
///
/// The `find_*` and `delete` methods return builders in submit mode: describe the query,
/// then `submit()` runs it.
///
/// ```rust,ignore
/// let manager = ResourceManager::new(InMemoryRepository::<Book>::new());
/// let books = manager
///     .find_all()
///     .predicate()?
///     .attribute(Book::ELECTRONIC)
///     .is_true()
///     .apply()
///     .ascending(Book::NAME)
///     .submit()?;
/// ```
pub struct ResourceManager<E: Entity, R: Repository<E>> {
    repository: R,
    _entity: PhantomData<fn() -> E>,
}

/// A builder that executes against a manager's repository on `submit()`
pub type Submitter<'a, E, T> = CriteriaBuilder<E, Submit<'a, E, Result<T>>>;

impl<E: Entity, R: Repository<E>> ResourceManager<E, R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            _entity: PhantomData,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn criteria_builder(&self) -> CriteriaBuilder<E> {
        CriteriaBuilder::new()
    }

    pub fn find_one(&self) -> Submitter<'_, E, Option<E>> {
        CriteriaBuilder::with_action(move |criteria: Criteria<E>| {
            self.repository.find_one_using(&criteria)
        })
    }

    pub fn find_all(&self) -> Submitter<'_, E, Vec<E>> {
        CriteriaBuilder::with_action(move |criteria: Criteria<E>| {
            self.repository.find_all_using(&criteria)
        })
    }

    pub fn find_top(&self) -> Submitter<'_, E, Option<E>> {
        CriteriaBuilder::with_action(move |criteria: Criteria<E>| {
            self.repository.find_top_using(&criteria)
        })
    }

    pub fn find_top_n(&self, count: usize) -> Submitter<'_, E, Vec<E>> {
        CriteriaBuilder::with_action(move |criteria: Criteria<E>| {
            self.repository.find_top_n_using(count, &criteria)
        })
    }

    pub fn delete(&self) -> Submitter<'_, E, u64> {
        CriteriaBuilder::with_action(move |criteria: Criteria<E>| {
            self.repository.delete_using(&criteria)
        })
    }

    /// Start a bulk update of the rows matching `criteria`.
    pub fn update(&self, criteria: Criteria<E>) -> EntityUpdater<'_, E, R> {
        EntityUpdater::new(&self.repository, criteria)
    }

    pub fn find_one_with(&self, criteria: &Criteria<E>) -> Result<Option<E>> {
        self.repository.find_one_using(criteria)
    }

    pub fn find_all_with(&self, criteria: &Criteria<E>) -> Result<Vec<E>> {
        self.repository.find_all_using(criteria)
    }

    pub fn delete_with(&self, criteria: &Criteria<E>) -> Result<u64> {
        self.repository.delete_using(criteria)
    }
}
