//! SQL rendering of compiled criteria.
//!
//! Statements use PostgreSQL `$n` placeholders and alias the root as `t0`. Deletes and
//! updates select their targets through an id subquery so joins and predicates on joined
//! entities behave exactly as they do for selects.

use super::conditions::ROOT_ALIAS;
use super::criteria::CompiledCriteria;
use super::ordering::order_by_sql;
use crate::error::{CriteriaError, Result};
use crate::model::{Entity, Value};
use crate::repository::FieldSetter;

/// A rendered statement and its bound parameters, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl SqlStatement {
    /// `SELECT COUNT(*)` over the whole entity
    pub fn count_all<E: Entity>() -> Self {
        Self {
            sql: format!("SELECT COUNT(*) FROM {}", E::NAME),
            params: Vec::new(),
        }
    }

    /// Largest identifier of the entity, or 0 when it has no rows
    pub fn checkpoint<E: Entity>() -> Self {
        Self {
            sql: format!(
                "SELECT CAST(COALESCE(MAX({}), 0) AS BIGINT) FROM {}",
                E::ID_FIELD,
                E::NAME
            ),
            params: Vec::new(),
        }
    }
}

impl<E: Entity> CompiledCriteria<E> {
    fn from_where(&self, params: &mut Vec<Value>) -> String {
        let mut sql = format!("FROM {} {ROOT_ALIAS}", E::NAME);
        for join in self.path.joins() {
            sql.push(' ');
            sql.push_str(&join.root_sql());
        }
        sql.push_str(" WHERE ");
        sql.push_str(&self.condition.to_sql(params));
        sql
    }

    fn id_subquery(&self, params: &mut Vec<Value>) -> String {
        format!(
            "{} IN (SELECT {ROOT_ALIAS}.{} {})",
            E::ID_FIELD,
            E::ID_FIELD,
            self.from_where(params)
        )
    }

    /// Root columns, then one JSON column per fetch join (see [`JoinEntry::fetch_sql`]).
    ///
    /// [`JoinEntry::fetch_sql`]: super::JoinEntry::fetch_sql
    pub fn select_statement(&self) -> SqlStatement {
        let mut params = Vec::new();
        let mut columns = format!("{ROOT_ALIAS}.*");
        for join in self.path.fetches() {
            columns.push_str(", ");
            columns.push_str(&join.fetch_sql());
        }
        let sql = format!(
            "SELECT {columns} {}{}",
            self.from_where(&mut params),
            order_by_sql(&self.order)
        );
        SqlStatement { sql, params }
    }

    pub fn select_top_statement(&self, limit: usize) -> SqlStatement {
        let mut statement = self.select_statement();
        statement.sql.push_str(&format!(" LIMIT {limit}"));
        statement
    }

    /// Delete every matching row; orderings are ignored.
    pub fn delete_statement(&self) -> SqlStatement {
        let mut params = Vec::new();
        let sql = format!("DELETE FROM {} WHERE {}", E::NAME, self.id_subquery(&mut params));
        SqlStatement { sql, params }
    }

    /// Apply `setters` to every matching row; at least one setter is required.
    pub fn update_statement(&self, setters: &[FieldSetter<E>]) -> Result<SqlStatement> {
        if setters.is_empty() {
            return Err(CriteriaError::NoUpdatesSpecified);
        }

        let mut params = Vec::new();
        let assignments: Vec<String> = setters
            .iter()
            .map(|setter| match setter.value() {
                // An untyped NULL lets the server take the column's type
                Value::Null => format!("{} = NULL", setter.field()),
                value => {
                    params.push(value.clone());
                    format!("{} = ${}", setter.field(), params.len())
                }
            })
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            E::NAME,
            assignments.join(", "),
            self.id_subquery(&mut params)
        );
        Ok(SqlStatement { sql, params })
    }
}
