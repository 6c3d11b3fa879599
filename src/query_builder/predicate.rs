//! # Predicate Algebra
//!
//! Predicates are functions from a [`QueryContext`] and the resolved [`FromPath`] to a
//! [`Condition`]. A builder accumulates exactly one predicate tree: every terminal operator
//! on a [`PredicateGenerator`] commits a leaf into it using the builder's current
//! [`Connector`], and hands back an [`AndOrConnector`] to pick the connector for the next
//! leaf.
//!
//! Operator families are gated on the attribute's value type:
//!
//! | Value type | Operators |
//! |---|---|
//! | any | `is_equal_to`, `is_in`, `is_null`, `is_not_null` |
//! | [`ComparableValue`] | `is_less_than`, `is_less_than_or_equal_to`, `is_greater_than`, `is_greater_than_or_equal_to` |
//! | [`NumericValue`] | `is_zero`, `is_not_zero`, `is_positive`, `is_negative` |
//! | `bool` | `is_true`, `is_false` |
//! | `String` | `is_like`, `starts_with`, `ends_with`, `contains` |

use super::builder::CriteriaBuilder;
use super::conditions::{Column, CompareOp, Condition};
use super::criteria::QueryContext;
use super::joins::FromPath;
use crate::error::{CriteriaError, Result};
use crate::model::{
    Association, Attribute, AttributeValue, ComparableValue, Entity, NumericValue, Value,
};
use std::marker::PhantomData;
use std::sync::Arc;

/// A boolean test over the final query path
pub type PredicateFn<E> =
    Arc<dyn Fn(&QueryContext, &FromPath<E>) -> Result<Condition> + Send + Sync>;

type ColumnFn<E> = Arc<dyn Fn(&FromPath<E>) -> Result<Column> + Send + Sync>;

/// How the next predicate fuses with the ones already accumulated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl Connector {
    /// Fuse `next` onto `existing`; the existing tree is always the left operand.
    pub fn combine<E: Entity>(
        self,
        existing: Option<PredicateFn<E>>,
        next: PredicateFn<E>,
    ) -> PredicateFn<E> {
        match self {
            Connector::And => and_all(vec![existing, Some(next)]),
            Connector::Or => or_all(vec![existing, Some(next)]),
        }
    }
}

/// Null-skipping conjunction.
///
/// Absent operands are ignored. Evaluating the result fails with
/// [`CriteriaError::EmptyPredicate`] when every operand was absent.
pub fn and_all<E: Entity>(operands: Vec<Option<PredicateFn<E>>>) -> PredicateFn<E> {
    combine(operands, Connector::And)
}

/// Null-skipping disjunction; see [`and_all`].
pub fn or_all<E: Entity>(operands: Vec<Option<PredicateFn<E>>>) -> PredicateFn<E> {
    combine(operands, Connector::Or)
}

fn combine<E: Entity>(operands: Vec<Option<PredicateFn<E>>>, connector: Connector) -> PredicateFn<E> {
    let operands: Vec<PredicateFn<E>> = operands.into_iter().flatten().collect();

    Arc::new(move |ctx: &QueryContext, path: &FromPath<E>| -> Result<Condition> {
        if operands.is_empty() {
            return Err(CriteriaError::EmptyPredicate);
        }

        let mut conditions = Vec::with_capacity(operands.len());
        for operand in &operands {
            // Same-kind children are flattened so chains render without redundant nesting
            match (connector, operand(ctx, path)?) {
                (Connector::And, Condition::And(children)) => conditions.extend(children),
                (Connector::Or, Condition::Or(children)) => conditions.extend(children),
                (_, condition) => conditions.push(condition),
            }
        }

        Ok(match connector {
            Connector::And => Condition::all(conditions),
            Connector::Or => Condition::any(conditions),
        })
    })
}

/// Predicate that matches every row
pub fn always_true<E: Entity>() -> PredicateFn<E> {
    Arc::new(|_: &QueryContext, _: &FromPath<E>| -> Result<Condition> { Ok(Condition::True) })
}

/// Entry point of a builder's predicate chain
pub struct PredicateApplier<E: Entity, A> {
    builder: CriteriaBuilder<E, A>,
}

impl<E: Entity, A> PredicateApplier<E, A> {
    pub(crate) fn new(builder: CriteriaBuilder<E, A>) -> Self {
        Self { builder }
    }

    /// Start a predicate on an attribute of the root entity.
    pub fn attribute<V: AttributeValue>(self, attribute: Attribute<E, V>) -> PredicateGenerator<E, A, V> {
        let name = attribute.name();
        let column: ColumnFn<E> = Arc::new(move |_: &FromPath<E>| -> Result<Column> { Ok(Column::root(name)) });
        PredicateGenerator::new(self.builder, name, column)
    }

    /// Start a predicate on an attribute of a joined entity.
    ///
    /// The association must already have been joined or fetched on this builder.
    pub fn joined_attribute<J: Entity, V: AttributeValue>(
        self,
        association: Association<E, J>,
        attribute: Attribute<J, V>,
    ) -> Result<PredicateGenerator<E, A, V>> {
        self.builder.ensure_joined(&association)?;
        let column: ColumnFn<E> =
            Arc::new(move |path: &FromPath<E>| path.column(&association, &attribute));
        Ok(PredicateGenerator::new(self.builder, attribute.name(), column))
    }

    /// Return to the builder without adding a predicate.
    pub fn apply(self) -> CriteriaBuilder<E, A> {
        self.builder
    }
}

/// Terminal operators for one attribute, restricted by the attribute's value type
pub struct PredicateGenerator<E: Entity, A, V> {
    builder: CriteriaBuilder<E, A>,
    attribute: &'static str,
    column: ColumnFn<E>,
    _value: PhantomData<fn() -> V>,
}

impl<E: Entity, A, V: AttributeValue> PredicateGenerator<E, A, V> {
    fn new(builder: CriteriaBuilder<E, A>, attribute: &'static str, column: ColumnFn<E>) -> Self {
        Self {
            builder,
            attribute,
            column,
            _value: PhantomData,
        }
    }

    fn commit<F>(self, leaf: F) -> AndOrConnector<E, A>
    where
        F: Fn(&QueryContext, Column) -> Condition + Send + Sync + 'static,
    {
        let column = self.column;
        let predicate: PredicateFn<E> =
            Arc::new(move |ctx: &QueryContext, path: &FromPath<E>| -> Result<Condition> {
                Ok(leaf(ctx, column(path)?))
            });
        AndOrConnector {
            builder: self.builder.commit_predicate(self.attribute, predicate),
        }
    }

    fn compare(self, op: CompareOp, value: Value) -> AndOrConnector<E, A> {
        self.commit(move |_, column| Condition::compare(column, op, value.clone()))
    }

    pub fn is_equal_to(self, value: impl Into<V>) -> AndOrConnector<E, A> {
        let value = value.into().to_value();
        self.compare(CompareOp::Eq, value)
    }

    /// Matches any of `values`; an empty list matches nothing.
    pub fn is_in<I>(self, values: I) -> AndOrConnector<E, A>
    where
        I: IntoIterator,
        I::Item: Into<V>,
    {
        let values: Vec<Value> = values.into_iter().map(|v| v.into().to_value()).collect();
        self.commit(move |_, column| Condition::In {
            column,
            values: values.clone(),
        })
    }

    pub fn is_null(self) -> AndOrConnector<E, A> {
        self.commit(|_, column| Condition::IsNull { column })
    }

    pub fn is_not_null(self) -> AndOrConnector<E, A> {
        self.commit(|_, column| Condition::IsNotNull { column })
    }
}

impl<E: Entity, A, V: ComparableValue> PredicateGenerator<E, A, V> {
    pub fn is_less_than(self, value: impl Into<V>) -> AndOrConnector<E, A> {
        let value = value.into().to_value();
        self.compare(CompareOp::Lt, value)
    }

    pub fn is_less_than_or_equal_to(self, value: impl Into<V>) -> AndOrConnector<E, A> {
        let value = value.into().to_value();
        self.compare(CompareOp::Lte, value)
    }

    pub fn is_greater_than(self, value: impl Into<V>) -> AndOrConnector<E, A> {
        let value = value.into().to_value();
        self.compare(CompareOp::Gt, value)
    }

    pub fn is_greater_than_or_equal_to(self, value: impl Into<V>) -> AndOrConnector<E, A> {
        let value = value.into().to_value();
        self.compare(CompareOp::Gte, value)
    }
}

impl<E: Entity, A, V: NumericValue> PredicateGenerator<E, A, V> {
    pub fn is_zero(self) -> AndOrConnector<E, A> {
        self.compare(CompareOp::Eq, V::zero().to_value())
    }

    pub fn is_not_zero(self) -> AndOrConnector<E, A> {
        self.compare(CompareOp::Ne, V::zero().to_value())
    }

    /// Strictly greater than zero
    pub fn is_positive(self) -> AndOrConnector<E, A> {
        self.compare(CompareOp::Gt, V::zero().to_value())
    }

    /// Strictly less than zero
    pub fn is_negative(self) -> AndOrConnector<E, A> {
        self.compare(CompareOp::Lt, V::zero().to_value())
    }
}

impl<E: Entity, A> PredicateGenerator<E, A, bool> {
    pub fn is_true(self) -> AndOrConnector<E, A> {
        self.compare(CompareOp::Eq, Value::Bool(true))
    }

    pub fn is_false(self) -> AndOrConnector<E, A> {
        self.compare(CompareOp::Eq, Value::Bool(false))
    }
}

impl<E: Entity, A> PredicateGenerator<E, A, String> {
    /// Pattern match; the pattern is used exactly as given.
    pub fn is_like(self, pattern: impl Into<String>) -> AndOrConnector<E, A> {
        let pattern = pattern.into();
        self.commit(move |_, column| Condition::like(column, pattern.clone()))
    }

    pub fn starts_with(self, prefix: impl Into<String>) -> AndOrConnector<E, A> {
        let prefix = prefix.into();
        self.commit(move |ctx, column| {
            Condition::like(column, format!("{prefix}{}", ctx.wildcard()))
        })
    }

    pub fn ends_with(self, suffix: impl Into<String>) -> AndOrConnector<E, A> {
        let suffix = suffix.into();
        self.commit(move |ctx, column| {
            Condition::like(column, format!("{}{suffix}", ctx.wildcard()))
        })
    }

    pub fn contains(self, infix: impl Into<String>) -> AndOrConnector<E, A> {
        let infix = infix.into();
        self.commit(move |ctx, column| {
            let wildcard = ctx.wildcard();
            Condition::like(column, format!("{wildcard}{infix}{wildcard}"))
        })
    }
}

/// Returned by every terminal operator; chooses how the next predicate is connected.
pub struct AndOrConnector<E: Entity, A> {
    builder: CriteriaBuilder<E, A>,
}

impl<E: Entity, A> AndOrConnector<E, A> {
    pub fn and(self) -> PredicateApplier<E, A> {
        PredicateApplier::new(self.builder.connect(Connector::And))
    }

    pub fn or(self) -> PredicateApplier<E, A> {
        PredicateApplier::new(self.builder.connect(Connector::Or))
    }

    pub fn apply(self) -> CriteriaBuilder<E, A> {
        self.builder
    }
}
