use super::conditions::{Column, Source, ROOT_ALIAS};
use crate::error::{CriteriaError, Result};
use crate::model::{Association, Cardinality, Entity};
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

/// Represents the supported kinds of JOIN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinType {
    Inner,
    Left,
    /// Results are root entities, so a RIGHT join selects the same roots as an
    /// INNER join. Rendered statements emit `INNER JOIN` for it.
    Right,
}

impl JoinType {
    pub fn to_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_sql())
    }
}

/// One join registered on a query root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinEntry {
    pub association: &'static str,
    pub target: &'static str,
    pub join_type: JoinType,
    pub fetch: bool,
    pub local_key: &'static str,
    pub target_key: &'static str,
    pub cardinality: Cardinality,
}

impl JoinEntry {
    fn new<E, J: Entity>(association: &Association<E, J>, join_type: JoinType, fetch: bool) -> Self {
        Self {
            association: association.name(),
            target: J::NAME,
            join_type,
            fetch,
            local_key: association.local_key(),
            target_key: association.target_key(),
            cardinality: association.cardinality(),
        }
    }

    /// Source that columns of the joined entity are read from
    pub fn source(&self) -> Source {
        Source::Join {
            association: self.association,
            entity: self.target,
        }
    }

    /// Convert to SQL string
    pub fn to_sql(&self) -> String {
        self.render(self.join_type)
    }

    /// Join clause used when selecting root rows. Unmatched right-hand rows carry no
    /// root, so `Right` narrows to `INNER JOIN`.
    pub fn root_sql(&self) -> String {
        match self.join_type {
            JoinType::Right => self.render(JoinType::Inner),
            join_type => self.render(join_type),
        }
    }

    fn render(&self, join_type: JoinType) -> String {
        format!(
            "{} {} {} ON {}.{} = {}.{}",
            join_type.to_sql(),
            self.target,
            self.association,
            self.association,
            self.target_key,
            ROOT_ALIAS,
            self.local_key
        )
    }

    /// Name of the result column carrying this join's fetched rows
    pub fn fetch_column(&self) -> String {
        format!("{}{FETCH_SUFFIX}", self.association)
    }

    /// Select-list expression loading the related rows as JSON.
    ///
    /// To-one fetches yield the related row as a `jsonb` object (NULL when absent);
    /// to-many fetches yield a `jsonb` array of every related row, so deduplicated
    /// roots still see their whole collection.
    pub fn fetch_sql(&self) -> String {
        let value = match self.cardinality {
            Cardinality::ToOne => "to_jsonb(fetched)",
            Cardinality::ToMany => "COALESCE(jsonb_agg(fetched), '[]'::jsonb)",
        };
        format!(
            "(SELECT {value} FROM {} fetched WHERE fetched.{} = {ROOT_ALIAS}.{}) AS {}",
            self.target,
            self.target_key,
            self.local_key,
            self.fetch_column()
        )
    }
}

/// Suffix of the columns that fetch joins add to a select
pub const FETCH_SUFFIX: &str = "__fetch";

/// The resolved source of a query: the root entity plus its registered joins
///
/// At most one entry exists per association. A path is produced fresh from the
/// root each time a criteria is compiled, so sharing a criteria never shares a path.
pub struct FromPath<E> {
    joins: Vec<JoinEntry>,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> FromPath<E> {
    /// A bare root with no joins
    pub fn root() -> Self {
        Self {
            joins: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Reuse, upgrade or create the join for `association`.
    ///
    /// - no entry yet: a new join (or fetch join) of the requested kind is added
    /// - entry exists and the request is `Inner` or the same kind: the entry is reused,
    ///   only gaining the fetch flag if a fetch was requested
    /// - entry exists with a different kind and a non-`Inner` kind is requested: the
    ///   entry is replaced in place by one of the requested kind
    pub fn resolve_or_create<J: Entity>(
        mut self,
        association: &Association<E, J>,
        join_type: JoinType,
        fetch: bool,
    ) -> Self {
        let position = self
            .joins
            .iter()
            .position(|entry| entry.association == association.name());

        match position {
            None => {
                debug!(
                    root = E::NAME,
                    association = association.name(),
                    join_type = %join_type,
                    fetch = fetch,
                    "Registering join"
                );
                self.joins.push(JoinEntry::new(association, join_type, fetch));
            }
            Some(index) => {
                let existing = &mut self.joins[index];
                if join_type == JoinType::Inner || existing.join_type == join_type {
                    existing.fetch |= fetch;
                } else {
                    debug!(
                        root = E::NAME,
                        association = association.name(),
                        from = %existing.join_type,
                        to = %join_type,
                        "Upgrading join"
                    );
                    let fetch = fetch || existing.fetch;
                    *existing = JoinEntry::new(association, join_type, fetch);
                }
            }
        }

        self
    }

    /// Source of an established join, or `UnresolvedJoin` naming both entities.
    pub fn source_for(&self, association: &str, target: &'static str) -> Result<Source> {
        self.joins
            .iter()
            .find(|entry| entry.association == association)
            .map(JoinEntry::source)
            .ok_or(CriteriaError::UnresolvedJoin {
                root: E::NAME,
                joined: target,
            })
    }

    /// Column of a joined entity's attribute, resolved through this path.
    pub fn column<J: Entity, V>(
        &self,
        association: &Association<E, J>,
        attribute: &crate::model::Attribute<J, V>,
    ) -> Result<Column> {
        let source = self.source_for(association.name(), J::NAME)?;
        Ok(Column::new(source, attribute.name()))
    }

    pub fn joins(&self) -> &[JoinEntry] {
        &self.joins
    }

    /// Joins whose related rows are loaded alongside the root
    pub fn fetches(&self) -> impl Iterator<Item = &JoinEntry> {
        self.joins.iter().filter(|entry| entry.fetch)
    }

    pub fn is_joined(&self, association: &str) -> bool {
        self.joins.iter().any(|entry| entry.association == association)
    }

    /// True when any join can multiply root rows
    pub fn has_to_many(&self) -> bool {
        self.joins
            .iter()
            .any(|entry| entry.cardinality == Cardinality::ToMany)
    }
}

impl<E> Clone for FromPath<E> {
    fn clone(&self) -> Self {
        Self {
            joins: self.joins.clone(),
            _marker: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Debug for FromPath<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromPath")
            .field("root", &E::NAME)
            .field("joins", &self.joins)
            .finish()
    }
}

impl<E: Entity> PartialEq for FromPath<E> {
    fn eq(&self, other: &Self) -> bool {
        self.joins == other.joins
    }
}
