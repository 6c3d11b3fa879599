//! PostgreSQL backend executing rendered statements through sqlx.

use super::{AsyncRepository, FieldSetter};
use crate::config::{CriteriaConfig, FindOnePolicy};
use crate::error::{CriteriaError, Result};
use crate::logging::log_repository_operation;
use crate::model::{Entity, Value};
use crate::query_builder::{Criteria, QueryContext, SqlStatement};
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPool, PgRow};
use sqlx::{Arguments, FromRow};
use std::collections::HashSet;
use std::marker::PhantomData;
use std::time::Instant;
use tracing::debug;

/// Executes criteria against the table named by `E::NAME`
///
/// Rows are decoded with `E`'s `FromRow`. A fetch join adds a `jsonb` column named
/// `<association>__fetch` holding the related row (to-one) or an array of every related
/// row (to-many); `FromRow` implementations read it to populate related entities.
pub struct PgRepository<E> {
    pool: PgPool,
    ctx: QueryContext,
    find_one: FindOnePolicy,
    _entity: PhantomData<fn() -> E>,
}

impl<E> PgRepository<E>
where
    E: Entity + for<'r> FromRow<'r, PgRow> + Unpin,
{
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            ctx: QueryContext::default(),
            find_one: FindOnePolicy::default(),
            _entity: PhantomData,
        }
    }

    /// Fails with `ConfigurationError` unless the configured wildcards are the ones
    /// PostgreSQL `LIKE` understands.
    pub fn with_config(pool: PgPool, config: &CriteriaConfig) -> Result<Self> {
        check_wildcards(config)?;
        Ok(Self {
            pool,
            ctx: QueryContext::from(config),
            find_one: config.find_one,
            _entity: PhantomData,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch(&self, statement: SqlStatement) -> Result<Vec<E>> {
        debug!(entity = E::NAME, sql = %statement.sql, params = statement.params.len(), "Executing select");
        let started = Instant::now();
        let rows = sqlx::query_as_with::<_, E, _>(&statement.sql, arguments(&statement.params)?)
            .fetch_all(&self.pool)
            .await?;
        debug!(entity = E::NAME, rows = rows.len(), duration_ms = started.elapsed().as_millis() as u64, "Select completed");
        Ok(distinct_roots(rows))
    }

    async fn execute(&self, statement: SqlStatement) -> Result<u64> {
        debug!(entity = E::NAME, sql = %statement.sql, params = statement.params.len(), "Executing statement");
        let result = sqlx::query_with(&statement.sql, arguments(&statement.params)?)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn check_wildcards(config: &CriteriaConfig) -> Result<()> {
    if config.wildcard != '%' || config.single_wildcard != '_' {
        return Err(CriteriaError::ConfigurationError(format!(
            "PostgreSQL LIKE requires wildcards '%' and '_', got '{}' and '{}'",
            config.wildcard, config.single_wildcard
        )));
    }
    Ok(())
}

/// Bind values in placeholder order
fn arguments(params: &[Value]) -> Result<PgArguments> {
    let mut args = PgArguments::default();
    for value in params {
        let added = match value {
            Value::Null => args.add(None::<String>),
            Value::Bool(value) => args.add(*value),
            Value::Int(value) => args.add(*value),
            Value::Float(value) => args.add(*value),
            Value::Text(value) => args.add(value.clone()),
            Value::Uuid(value) => args.add(*value),
            Value::Timestamp(value) => args.add(*value),
        };
        added.map_err(|e| CriteriaError::DatabaseError(format!("Failed to bind {value}: {e}")))?;
    }
    Ok(args)
}

/// Joins can repeat a root row; keep the first occurrence of each id.
fn distinct_roots<E: Entity>(rows: Vec<E>) -> Vec<E> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| match row.field(E::ID_FIELD) {
            Some(id) => seen.insert(id.to_string()),
            None => true,
        })
        .collect()
}

#[async_trait]
impl<E> AsyncRepository<E> for PgRepository<E>
where
    E: Entity + for<'r> FromRow<'r, PgRow> + Unpin,
{
    async fn find_one_using(&self, criteria: &Criteria<E>) -> Result<Option<E>> {
        let compiled = criteria.compile(&self.ctx)?;
        let mut found = self.fetch(compiled.select_statement()).await?;
        log_repository_operation("find_one", E::NAME, found.len() as u64, "completed");

        match (self.find_one, found.len()) {
            (_, 0) => Ok(None),
            (FindOnePolicy::Strict, count) if count > 1 => Err(CriteriaError::NonUniqueResult {
                entity: E::NAME,
                count,
            }),
            _ => Ok(Some(found.swap_remove(0))),
        }
    }

    async fn find_all_using(&self, criteria: &Criteria<E>) -> Result<Vec<E>> {
        let compiled = criteria.compile(&self.ctx)?;
        let found = self.fetch(compiled.select_statement()).await?;
        log_repository_operation("find_all", E::NAME, found.len() as u64, "completed");
        Ok(found)
    }

    async fn find_top_n_using(&self, count: usize, criteria: &Criteria<E>) -> Result<Vec<E>> {
        let compiled = criteria.compile(&self.ctx)?;
        // LIMIT counts joined rows, so it is only pushed down when no join can repeat a root
        let mut found = if compiled.path.has_to_many() {
            self.fetch(compiled.select_statement()).await?
        } else {
            self.fetch(compiled.select_top_statement(count)).await?
        };
        found.truncate(count);
        log_repository_operation("find_top", E::NAME, found.len() as u64, "completed");
        Ok(found)
    }

    async fn delete_using(&self, criteria: &Criteria<E>) -> Result<u64> {
        let compiled = criteria.compile(&self.ctx)?;
        let deleted = self.execute(compiled.delete_statement()).await?;
        log_repository_operation("delete", E::NAME, deleted, "completed");
        Ok(deleted)
    }

    async fn update_using(&self, criteria: &Criteria<E>, setters: &[FieldSetter<E>]) -> Result<u64> {
        let compiled = criteria.compile(&self.ctx)?;
        let updated = self.execute(compiled.update_statement(setters)?).await?;
        log_repository_operation("update", E::NAME, updated, "completed");
        Ok(updated)
    }

    async fn count(&self) -> Result<u64> {
        let statement = SqlStatement::count_all::<E>();
        let count = sqlx::query_scalar::<_, i64>(&statement.sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn checkpoint(&self) -> Result<i64> {
        let statement = SqlStatement::checkpoint::<E>();
        let checkpoint = sqlx::query_scalar::<_, i64>(&statement.sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(checkpoint)
    }
}
