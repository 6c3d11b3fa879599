//! # Repository Boundary
//!
//! Execution of finished [`Criteria`] against a storage backend.
//!
//! [`Repository`] is the synchronous boundary; [`AsyncRepository`] is its async counterpart.
//! Two backends are provided:
//!
//! - [`InMemoryRepository`] - evaluates compiled criteria over rows held in memory
//! - [`PgRepository`] - renders [`SqlStatement`](crate::query_builder::SqlStatement)s and
//!   runs them with sqlx (feature `postgres`)
//!
//! [`ResourceManager`] wraps a repository with builder-first entry points, and
//! [`EntityUpdater`] accumulates field assignments for a bulk update.

pub mod asynchronous;
pub mod evaluator;
pub mod manager;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod updater;

pub use asynchronous::AsyncRepository;
pub use manager::ResourceManager;
pub use memory::InMemoryRepository;
#[cfg(feature = "postgres")]
pub use postgres::PgRepository;
pub use updater::EntityUpdater;

use crate::error::Result;
use crate::model::{Attribute, AttributeValue, Entity, Value};
use crate::query_builder::Criteria;
use std::fmt;
use std::marker::PhantomData;

/// Select, delete and update entities of type `E` using criteria
pub trait Repository<E: Entity> {
    /// The single matching row, if any.
    ///
    /// What happens when several rows match is backend policy, see
    /// [`FindOnePolicy`](crate::config::FindOnePolicy).
    fn find_one_using(&self, criteria: &Criteria<E>) -> Result<Option<E>>;

    /// All matching rows in criteria order; each root row appears once.
    fn find_all_using(&self, criteria: &Criteria<E>) -> Result<Vec<E>>;

    /// The first matching row
    fn find_top_using(&self, criteria: &Criteria<E>) -> Result<Option<E>> {
        Ok(self.find_all_using(criteria)?.into_iter().next())
    }

    /// The first `count` matching rows, or fewer when fewer match
    fn find_top_n_using(&self, count: usize, criteria: &Criteria<E>) -> Result<Vec<E>> {
        let mut rows = self.find_all_using(criteria)?;
        rows.truncate(count);
        Ok(rows)
    }

    /// Remove matching rows; returns the number removed
    fn delete_using(&self, criteria: &Criteria<E>) -> Result<u64>;

    /// Apply `setters` to matching rows; returns the number updated
    fn update_using(&self, criteria: &Criteria<E>, setters: &[FieldSetter<E>]) -> Result<u64>;

    /// Number of rows of the entity
    fn count(&self) -> Result<u64>;

    /// Largest identifier in use, or 0 when there are no rows
    fn checkpoint(&self) -> Result<i64>;
}

/// Assignment of a literal to one field, used by bulk updates
pub struct FieldSetter<E> {
    field: &'static str,
    value: Value,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> FieldSetter<E> {
    pub fn new<V: AttributeValue>(attribute: Attribute<E, V>, value: impl Into<V>) -> Self {
        Self {
            field: attribute.name(),
            value: value.into().to_value(),
            _marker: PhantomData,
        }
    }

    /// Set the field to NULL
    pub fn null<V: AttributeValue>(attribute: Attribute<E, V>) -> Self {
        Self {
            field: attribute.name(),
            value: Value::Null,
            _marker: PhantomData,
        }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn apply(&self, entity: &mut E) -> Result<()> {
        entity.set_field(self.field, self.value.clone())
    }
}

impl<E> Clone for FieldSetter<E> {
    fn clone(&self) -> Self {
        Self {
            field: self.field,
            value: self.value.clone(),
            _marker: PhantomData,
        }
    }
}

impl<E> PartialEq for FieldSetter<E> {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field && self.value == other.value
    }
}

impl<E: Entity> fmt::Debug for FieldSetter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} = {}", E::NAME, self.field, self.value)
    }
}
