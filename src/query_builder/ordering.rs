use super::conditions::Column;
use super::joins::FromPath;
use crate::error::Result;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Resolves one ordering directive against the final query path
pub type OrderFn<E> = Arc<dyn Fn(&FromPath<E>) -> Result<OrderEntry> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn to_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// A resolved ORDER BY item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OrderEntry {
    pub column: Column,
    pub direction: Direction,
}

impl OrderEntry {
    pub fn new(column: Column, direction: Direction) -> Self {
        Self { column, direction }
    }

    pub fn asc(column: Column) -> Self {
        Self::new(column, Direction::Asc)
    }

    pub fn desc(column: Column) -> Self {
        Self::new(column, Direction::Desc)
    }

    pub fn to_sql(&self) -> String {
        format!("{} {}", self.column.to_sql(), self.direction.to_sql())
    }
}

impl fmt::Display for OrderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Render an ORDER BY clause; empty when there is nothing to order by.
pub fn order_by_sql(entries: &[OrderEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let items: Vec<String> = entries.iter().map(OrderEntry::to_sql).collect();
    format!(" ORDER BY {}", items.join(", "))
}
