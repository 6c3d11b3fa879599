use super::{FieldSetter, Repository};
use crate::error::{CriteriaError, Result};
use crate::model::{Attribute, AttributeValue, Entity};
use crate::query_builder::Criteria;
use tracing::debug;

/// Accumulates field assignments for one bulk update
///
/// The updater is owned by a single caller; `submit` consumes it.
pub struct EntityUpdater<'r, E: Entity, R: Repository<E> + ?Sized> {
    repository: &'r R,
    criteria: Criteria<E>,
    setters: Vec<FieldSetter<E>>,
}

impl<'r, E: Entity, R: Repository<E> + ?Sized> EntityUpdater<'r, E, R> {
    pub fn new(repository: &'r R, criteria: Criteria<E>) -> Self {
        Self {
            repository,
            criteria,
            setters: Vec::new(),
        }
    }

    pub fn set<V: AttributeValue>(mut self, attribute: Attribute<E, V>, value: impl Into<V>) -> Self {
        self.setters.push(FieldSetter::new(attribute, value));
        self
    }

    pub fn set_null<V: AttributeValue>(mut self, attribute: Attribute<E, V>) -> Self {
        self.setters.push(FieldSetter::null(attribute));
        self
    }

    pub fn setters(&self) -> &[FieldSetter<E>] {
        &self.setters
    }

    /// Run the update; returns the number of rows changed.
    pub fn submit(self) -> Result<u64> {
        if self.setters.is_empty() {
            return Err(CriteriaError::NoUpdatesSpecified);
        }
        debug!(
            entity = E::NAME,
            setters = self.setters.len(),
            "Submitting update"
        );
        self.repository.update_using(&self.criteria, &self.setters)
    }
}
