use super::conditions::Column;
use super::criteria::{Criteria, PathFn};
use super::joins::{FromPath, JoinType};
use super::ordering::{Direction, OrderEntry, OrderFn};
use super::predicate::{always_true, Connector, PredicateApplier, PredicateFn};
use crate::error::{CriteriaError, Result};
use crate::model::{Association, Attribute, AttributeValue, Entity};
use std::sync::Arc;
use tracing::debug;

/// Terminal mode of a builder that only produces a [`Criteria`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Build;

/// Terminal mode of a builder that hands its [`Criteria`] straight to an action
pub struct Submit<'a, E, R> {
    action: Box<dyn FnOnce(Criteria<E>) -> R + 'a>,
}

/// Single-use builder that accumulates joins, one predicate tree and orderings
///
/// Every method takes the builder by value, so a consumed builder cannot be touched again.
/// `A` selects the terminal operation: [`CriteriaBuilder::build`] in [`Build`] mode or
/// [`CriteriaBuilder::submit`] in [`Submit`] mode.
///
/// ```rust,ignore
/// let criteria = CriteriaBuilder::<Book>::new()
///     .join(Book::AUTHOR)
///     .predicate()?
///     .attribute(Book::ELECTRONIC)
///     .is_true()
///     .and()
///     .joined_attribute(Book::AUTHOR, Author::NAME)?
///     .starts_with("A")
///     .apply()
///     .ascending(Book::NAME)
///     .build();
/// ```
pub struct CriteriaBuilder<E: Entity, A = Build> {
    path: PathFn<E>,
    joined: Vec<&'static str>,
    predicate: Option<PredicateFn<E>>,
    predicate_started: bool,
    connector: Connector,
    orders: Vec<OrderFn<E>>,
    mode: A,
}

impl<E: Entity, A> CriteriaBuilder<E, A> {
    fn with_mode(mode: A) -> Self {
        Self {
            path: Arc::new(|path: FromPath<E>| path),
            joined: Vec::new(),
            predicate: None,
            predicate_started: false,
            connector: Connector::default(),
            orders: Vec::new(),
            mode,
        }
    }

    /// Inner join an association
    pub fn join<J: Entity>(self, association: Association<E, J>) -> Self {
        self.join_with(association, JoinType::Inner, false)
    }

    /// Inner fetch join an association
    pub fn fetch<J: Entity>(self, association: Association<E, J>) -> Self {
        self.join_with(association, JoinType::Inner, true)
    }

    /// Left join an association
    pub fn left_join<J: Entity>(self, association: Association<E, J>) -> Self {
        self.join_with(association, JoinType::Left, false)
    }

    /// Left fetch join an association
    pub fn left_fetch<J: Entity>(self, association: Association<E, J>) -> Self {
        self.join_with(association, JoinType::Left, true)
    }

    /// Join an association with an explicit kind; repeated requests are deduplicated
    /// or upgraded when the criteria path is resolved.
    pub fn join_with<J: Entity>(
        mut self,
        association: Association<E, J>,
        join_type: JoinType,
        fetch: bool,
    ) -> Self {
        debug!(
            root = E::NAME,
            association = association.name(),
            join_type = %join_type,
            fetch = fetch,
            "Join requested"
        );

        let previous = self.path;
        self.path = Arc::new(move |path: FromPath<E>| {
            previous(path).resolve_or_create(&association, join_type, fetch)
        });

        if !self.joined.contains(&association.name()) {
            self.joined.push(association.name());
        }
        self
    }

    /// Begin the predicate chain. Allowed once per builder.
    pub fn predicate(mut self) -> Result<PredicateApplier<E, A>> {
        if self.predicate_started {
            return Err(CriteriaError::DuplicatePredicate);
        }
        self.predicate_started = true;
        Ok(PredicateApplier::new(self))
    }

    pub fn ascending<V: AttributeValue>(self, attribute: Attribute<E, V>) -> Self {
        self.order_root(attribute.name(), Direction::Asc)
    }

    pub fn descending<V: AttributeValue>(self, attribute: Attribute<E, V>) -> Self {
        self.order_root(attribute.name(), Direction::Desc)
    }

    /// Order by an attribute of a joined or fetched association.
    pub fn ascending_by<J: Entity, V: AttributeValue>(
        self,
        association: Association<E, J>,
        attribute: Attribute<J, V>,
    ) -> Result<Self> {
        self.order_joined(association, attribute, Direction::Asc)
    }

    /// Order by an attribute of a joined or fetched association.
    pub fn descending_by<J: Entity, V: AttributeValue>(
        self,
        association: Association<E, J>,
        attribute: Attribute<J, V>,
    ) -> Result<Self> {
        self.order_joined(association, attribute, Direction::Desc)
    }

    fn order_root(mut self, field: &'static str, direction: Direction) -> Self {
        let order: OrderFn<E> = Arc::new(move |_: &FromPath<E>| -> Result<OrderEntry> {
            Ok(OrderEntry::new(Column::root(field), direction))
        });
        self.orders.push(order);
        self
    }

    fn order_joined<J: Entity, V: AttributeValue>(
        mut self,
        association: Association<E, J>,
        attribute: Attribute<J, V>,
        direction: Direction,
    ) -> Result<Self> {
        self.ensure_joined(&association)?;
        let order: OrderFn<E> = Arc::new(move |path: &FromPath<E>| -> Result<OrderEntry> {
            Ok(OrderEntry::new(path.column(&association, &attribute)?, direction))
        });
        self.orders.push(order);
        Ok(self)
    }

    pub(crate) fn ensure_joined<J: Entity>(&self, association: &Association<E, J>) -> Result<()> {
        if self.joined.contains(&association.name()) {
            Ok(())
        } else {
            Err(CriteriaError::UnresolvedJoin {
                root: E::NAME,
                joined: J::NAME,
            })
        }
    }

    pub(crate) fn commit_predicate(mut self, attribute: &'static str, predicate: PredicateFn<E>) -> Self {
        debug!(
            root = E::NAME,
            attribute = attribute,
            connector = ?self.connector,
            "Committing predicate"
        );
        self.predicate = Some(self.connector.combine(self.predicate.take(), predicate));
        self
    }

    pub(crate) fn connect(mut self, connector: Connector) -> Self {
        self.connector = connector;
        self
    }

    fn freeze(self) -> (Criteria<E>, A) {
        debug!(
            root = E::NAME,
            joins = self.joined.len(),
            has_predicate = self.predicate.is_some(),
            orders = self.orders.len(),
            "Building criteria"
        );
        let predicate = self.predicate.unwrap_or_else(always_true);
        (Criteria::new(self.path, predicate, self.orders), self.mode)
    }
}

impl<E: Entity> CriteriaBuilder<E, Build> {
    pub fn new() -> Self {
        Self::with_mode(Build)
    }

    /// Freeze the accumulated state into an immutable criteria.
    ///
    /// A builder that never set a predicate matches every row.
    pub fn build(self) -> Criteria<E> {
        self.freeze().0
    }
}

impl<E: Entity> Default for CriteriaBuilder<E, Build> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, E: Entity, R> CriteriaBuilder<E, Submit<'a, E, R>> {
    /// A builder whose criteria is passed to `action` on [`submit`](Self::submit).
    pub fn with_action(action: impl FnOnce(Criteria<E>) -> R + 'a) -> Self {
        Self::with_mode(Submit {
            action: Box::new(action),
        })
    }

    /// Freeze the accumulated state and run the action with the resulting criteria.
    pub fn submit(self) -> R {
        let (criteria, mode) = self.freeze();
        (mode.action)(criteria)
    }
}
