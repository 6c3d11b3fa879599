//! In-memory evaluation of compiled criteria.
//!
//! Each root row is expanded into one binding per combination of joined rows. INNER and
//! RIGHT joins drop roots without related rows; LEFT joins keep them with the joined side
//! bound to nothing, so its columns read as NULL. A root matches when any of its bindings
//! satisfies the condition, and is ordered by the values of its first matching binding.
//!
//! Comparisons involving NULL or values of different kinds are unknown and never match.

use crate::error::{CriteriaError, Result};
use crate::model::{Entity, Record, Value};
use crate::query_builder::{
    Column, CompareOp, CompiledCriteria, Condition, Direction, JoinType, OrderEntry, QueryContext,
    Source,
};
use std::cmp::Ordering;

struct Binding<'r, E> {
    root: &'r E,
    joined: Vec<(&'static str, Option<&'r dyn Record>)>,
}

impl<'r, E: Entity> Binding<'r, E> {
    fn read(&self, column: &Column) -> Result<Value> {
        match column.source {
            Source::Root => self
                .root
                .field(column.field)
                .ok_or_else(|| CriteriaError::unknown_field(E::NAME, column.field)),
            Source::Join {
                association,
                entity,
            } => {
                let bound = self
                    .joined
                    .iter()
                    .find(|(name, _)| *name == association)
                    .and_then(|(_, record)| *record);
                match bound {
                    Some(record) => record
                        .field(column.field)
                        .ok_or_else(|| CriteriaError::unknown_field(entity, column.field)),
                    None => Ok(Value::Null),
                }
            }
        }
    }
}

fn expand<'r, E: Entity>(root: &'r E, compiled: &CompiledCriteria<E>) -> Vec<Binding<'r, E>> {
    let mut bindings = vec![Binding {
        root,
        joined: Vec::new(),
    }];

    for join in compiled.path.joins() {
        let related = root.related(join.association);
        let mut expanded = Vec::with_capacity(bindings.len() * related.len().max(1));
        for binding in bindings {
            if related.is_empty() {
                if join.join_type == JoinType::Left {
                    let mut joined = binding.joined;
                    joined.push((join.association, None));
                    expanded.push(Binding { root, joined });
                }
                continue;
            }
            for record in &related {
                let mut joined = binding.joined.clone();
                joined.push((join.association, Some(*record)));
                expanded.push(Binding { root, joined });
            }
        }
        bindings = expanded;
    }

    bindings
}

fn matches<E: Entity>(binding: &Binding<'_, E>, condition: &Condition, ctx: &QueryContext) -> Result<bool> {
    Ok(match condition {
        Condition::True => true,
        Condition::Compare { column, op, value } => {
            let ordering = binding.read(column)?.compare(value);
            match (ordering, op) {
                (None, _) => false,
                (Some(ordering), CompareOp::Eq) => ordering == Ordering::Equal,
                (Some(ordering), CompareOp::Ne) => ordering != Ordering::Equal,
                (Some(ordering), CompareOp::Lt) => ordering == Ordering::Less,
                (Some(ordering), CompareOp::Lte) => ordering != Ordering::Greater,
                (Some(ordering), CompareOp::Gt) => ordering == Ordering::Greater,
                (Some(ordering), CompareOp::Gte) => ordering != Ordering::Less,
            }
        }
        Condition::In { column, values } => {
            let current = binding.read(column)?;
            values
                .iter()
                .any(|value| current.compare(value) == Some(Ordering::Equal))
        }
        Condition::IsNull { column } => binding.read(column)?.is_null(),
        Condition::IsNotNull { column } => !binding.read(column)?.is_null(),
        Condition::Like { column, pattern } => match binding.read(column)? {
            Value::Text(text) => like_matches(&text, pattern, ctx),
            _ => false,
        },
        Condition::And(conditions) => {
            for condition in conditions {
                if !matches(binding, condition, ctx)? {
                    return Ok(false);
                }
            }
            true
        }
        Condition::Or(conditions) => {
            for condition in conditions {
                if matches(binding, condition, ctx)? {
                    return Ok(true);
                }
            }
            false
        }
    })
}

/// SQL LIKE over characters, using the context's wildcards; there is no escape character.
pub fn like_matches(text: &str, pattern: &str, ctx: &QueryContext) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let (mut t, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == ctx.wildcard() {
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len() && (pattern[p] == ctx.single_wildcard() || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if let Some((star, consumed)) = backtrack {
            p = star + 1;
            t = consumed + 1;
            backtrack = Some((star, consumed + 1));
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == ctx.wildcard() {
        p += 1;
    }
    p == pattern.len()
}

fn compare_keys(left: &[Value], right: &[Value], order: &[OrderEntry]) -> Ordering {
    for ((a, b), entry) in left.iter().zip(right).zip(order) {
        let ordering = match entry.direction {
            Direction::Asc => a.sort_cmp(b),
            Direction::Desc => b.sort_cmp(a),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Indices of the rows selected by `compiled`, in result order.
pub fn select<E: Entity>(
    rows: &[E],
    compiled: &CompiledCriteria<E>,
    ctx: &QueryContext,
) -> Result<Vec<usize>> {
    let mut selected: Vec<(usize, Vec<Value>)> = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        // A root sorts by its best matching binding, as if joined rows were ordered
        // and then reduced to the first occurrence of each root.
        let mut best: Option<Vec<Value>> = None;
        for binding in expand(row, compiled) {
            if !matches(&binding, &compiled.condition, ctx)? {
                continue;
            }
            let keys = compiled
                .order
                .iter()
                .map(|entry| binding.read(&entry.column))
                .collect::<Result<Vec<_>>>()?;
            best = match best {
                Some(current)
                    if compare_keys(&current, &keys, &compiled.order) != Ordering::Greater =>
                {
                    Some(current)
                }
                _ => Some(keys),
            };
            if compiled.order.is_empty() {
                break;
            }
        }
        if let Some(keys) = best {
            selected.push((index, keys));
        }
    }

    if !compiled.order.is_empty() {
        selected.sort_by(|(_, left), (_, right)| compare_keys(left, right, &compiled.order));
    }

    Ok(selected.into_iter().map(|(index, _)| index).collect())
}
