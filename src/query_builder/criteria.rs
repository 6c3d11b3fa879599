use super::conditions::Condition;
use super::joins::FromPath;
use super::ordering::{OrderEntry, OrderFn};
use super::predicate::{Connector, PredicateFn};
use crate::config::CriteriaConfig;
use crate::error::{CriteriaError, Result};
use crate::logging::log_criteria_operation;
use crate::model::Entity;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Maps a bare root to the final query path
pub type PathFn<E> = Arc<dyn Fn(FromPath<E>) -> FromPath<E> + Send + Sync>;

/// Backend settings visible to predicates while a criteria is compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryContext {
    wildcard: char,
    single_wildcard: char,
}

impl QueryContext {
    pub fn new(wildcard: char, single_wildcard: char) -> Self {
        Self {
            wildcard,
            single_wildcard,
        }
    }

    /// Multi-character wildcard used by `starts_with`, `ends_with` and `contains`
    pub fn wildcard(&self) -> char {
        self.wildcard
    }

    pub fn single_wildcard(&self) -> char {
        self.single_wildcard
    }
}

impl Default for QueryContext {
    fn default() -> Self {
        Self::new('%', '_')
    }
}

impl From<&CriteriaConfig> for QueryContext {
    fn from(config: &CriteriaConfig) -> Self {
        Self::new(config.wildcard, config.single_wildcard)
    }
}

/// An immutable, reusable query description: join path, predicate and orderings
///
/// Cloning is cheap and clones share their functions. Combinators never modify the
/// receiver; they return a new criteria.
pub struct Criteria<E> {
    path: PathFn<E>,
    predicate: PredicateFn<E>,
    orders: Vec<OrderFn<E>>,
}

impl<E: Entity> Criteria<E> {
    pub(crate) fn new(path: PathFn<E>, predicate: PredicateFn<E>, orders: Vec<OrderFn<E>>) -> Self {
        Self {
            path,
            predicate,
            orders,
        }
    }

    /// Both criteria must match. Joins of both are applied, this one's first, and
    /// orderings are concatenated.
    pub fn and(&self, other: &Criteria<E>) -> Criteria<E> {
        self.combine(other, Connector::And)
    }

    /// Either criteria may match. Joins and orderings combine exactly as for [`and`](Self::and).
    pub fn or(&self, other: &Criteria<E>) -> Criteria<E> {
        self.combine(other, Connector::Or)
    }

    /// Extend the predicate with an ad hoc test, keeping path and orderings.
    pub fn and_predicate<F>(&self, predicate: F) -> Criteria<E>
    where
        F: Fn(&QueryContext, &FromPath<E>) -> Result<Condition> + Send + Sync + 'static,
    {
        self.extend(Arc::new(predicate), Connector::And)
    }

    /// Widen the predicate with an ad hoc test, keeping path and orderings.
    pub fn or_predicate<F>(&self, predicate: F) -> Criteria<E>
    where
        F: Fn(&QueryContext, &FromPath<E>) -> Result<Condition> + Send + Sync + 'static,
    {
        self.extend(Arc::new(predicate), Connector::Or)
    }

    /// Reduce criteria with [`and`](Self::and), left to right.
    pub fn where_all<I>(criteria: I) -> Result<Criteria<E>>
    where
        I: IntoIterator<Item = Criteria<E>>,
    {
        let mut iter = criteria.into_iter();
        let first = iter.next().ok_or(CriteriaError::EmptyComposition)?;
        let mut count = 1;
        let combined = iter.fold(first, |combined, next| {
            count += 1;
            combined.and(&next)
        });
        log_criteria_operation("where_all", E::NAME, Some(&format!("{count} criteria")));
        Ok(combined)
    }

    /// Resolve path, predicate and orderings against a fresh root.
    pub fn compile(&self, ctx: &QueryContext) -> Result<CompiledCriteria<E>> {
        let path = (self.path)(FromPath::root());
        let condition = (self.predicate)(ctx, &path)?;
        let order = self
            .orders
            .iter()
            .map(|order| order(&path))
            .collect::<Result<Vec<_>>>()?;

        Ok(CompiledCriteria {
            path,
            condition,
            order,
        })
    }

    /// Number of ordering directives
    pub fn order_len(&self) -> usize {
        self.orders.len()
    }

    fn combine(&self, other: &Criteria<E>, connector: Connector) -> Criteria<E> {
        debug!(
            root = E::NAME,
            connector = ?connector,
            orders = self.orders.len() + other.orders.len(),
            "Combining criteria"
        );

        let first = Arc::clone(&self.path);
        let second = Arc::clone(&other.path);
        let path: PathFn<E> = Arc::new(move |root: FromPath<E>| second(first(root)));

        let predicate = connector.combine(Some(Arc::clone(&self.predicate)), Arc::clone(&other.predicate));

        let mut orders = self.orders.clone();
        orders.extend(other.orders.iter().cloned());

        Criteria::new(path, predicate, orders)
    }

    fn extend(&self, predicate: PredicateFn<E>, connector: Connector) -> Criteria<E> {
        Criteria::new(
            Arc::clone(&self.path),
            connector.combine(Some(Arc::clone(&self.predicate)), predicate),
            self.orders.clone(),
        )
    }
}

impl<E> Clone for Criteria<E> {
    fn clone(&self) -> Self {
        Self {
            path: Arc::clone(&self.path),
            predicate: Arc::clone(&self.predicate),
            orders: self.orders.clone(),
        }
    }
}

impl<E: Entity> fmt::Debug for Criteria<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Criteria")
            .field("root", &E::NAME)
            .field("orders", &self.orders.len())
            .finish_non_exhaustive()
    }
}

/// A criteria resolved against a root, ready to be rendered or evaluated
pub struct CompiledCriteria<E> {
    pub path: FromPath<E>,
    pub condition: Condition,
    pub order: Vec<OrderEntry>,
}

impl<E> Clone for CompiledCriteria<E> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            condition: self.condition.clone(),
            order: self.order.clone(),
        }
    }
}

impl<E: Entity> fmt::Debug for CompiledCriteria<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledCriteria")
            .field("path", &self.path)
            .field("condition", &self.condition)
            .field("order", &self.order)
            .finish()
    }
}

impl<E: Entity> PartialEq for CompiledCriteria<E> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.condition == other.condition && self.order == other.order
    }
}
