use crate::model::Value;
use serde::Serialize;
use std::fmt;

/// SQL alias of the query root
pub const ROOT_ALIAS: &str = "t0";

/// Where a column is read from: the query root or an established join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Source {
    Root,
    Join {
        association: &'static str,
        entity: &'static str,
    },
}

impl Source {
    pub fn alias(&self) -> &'static str {
        match self {
            Source::Root => ROOT_ALIAS,
            Source::Join { association, .. } => association,
        }
    }
}

/// A fully resolved column reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Column {
    pub source: Source,
    pub field: &'static str,
}

impl Column {
    pub fn new(source: Source, field: &'static str) -> Self {
        Self { source, field }
    }

    pub fn root(field: &'static str) -> Self {
        Self::new(Source::Root, field)
    }

    pub fn to_sql(&self) -> String {
        format!("{}.{}", self.source.alias(), self.field)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.source.alias(), self.field)
    }
}

/// Binary comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    pub fn to_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
        }
    }
}

/// Represents a boolean test over the columns of a query path
///
/// There is deliberately no negation node; every operator the builder offers has a
/// positive form (`Ne`, `IsNotNull`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Condition {
    True,
    Compare {
        column: Column,
        op: CompareOp,
        value: Value,
    },
    In {
        column: Column,
        values: Vec<Value>,
    },
    IsNull {
        column: Column,
    },
    IsNotNull {
        column: Column,
    },
    Like {
        column: Column,
        pattern: String,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

impl Condition {
    pub fn compare(column: Column, op: CompareOp, value: Value) -> Self {
        Condition::Compare { column, op, value }
    }

    pub fn like(column: Column, pattern: impl Into<String>) -> Self {
        Condition::Like {
            column,
            pattern: pattern.into(),
        }
    }

    /// Conjunction that collapses a single operand to itself
    pub fn all(mut conditions: Vec<Condition>) -> Self {
        if conditions.len() == 1 {
            conditions.remove(0)
        } else {
            Condition::And(conditions)
        }
    }

    /// Disjunction that collapses a single operand to itself
    pub fn any(mut conditions: Vec<Condition>) -> Self {
        if conditions.len() == 1 {
            conditions.remove(0)
        } else {
            Condition::Or(conditions)
        }
    }

    /// Convert condition to SQL, appending bound values to `params`.
    ///
    /// Placeholders are numbered from the current length of `params`, so a statement can
    /// render several conditions into one parameter list.
    pub fn to_sql(&self, params: &mut Vec<Value>) -> String {
        match self {
            Condition::True => "1=1".to_string(),
            Condition::Compare { column, op, value } => {
                format!("{} {} {}", column.to_sql(), op.to_sql(), bind(params, value))
            }
            Condition::In { column, values } => {
                if values.is_empty() {
                    return "1=0".to_string();
                }
                let value_list = values
                    .iter()
                    .map(|value| bind(params, value))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{} IN ({value_list})", column.to_sql())
            }
            Condition::IsNull { column } => format!("{} IS NULL", column.to_sql()),
            Condition::IsNotNull { column } => format!("{} IS NOT NULL", column.to_sql()),
            Condition::Like { column, pattern } => {
                let placeholder = bind(params, &Value::Text(pattern.clone()));
                format!("{} LIKE {placeholder}", column.to_sql())
            }
            Condition::And(conditions) => join_sql(conditions, " AND ", "1=1", params),
            Condition::Or(conditions) => join_sql(conditions, " OR ", "1=0", params),
        }
    }

    /// Columns referenced anywhere in this condition
    pub fn columns(&self) -> Vec<Column> {
        let mut columns = Vec::new();
        self.collect_columns(&mut columns);
        columns
    }

    fn collect_columns(&self, columns: &mut Vec<Column>) {
        match self {
            Condition::True => {}
            Condition::Compare { column, .. }
            | Condition::In { column, .. }
            | Condition::IsNull { column }
            | Condition::IsNotNull { column }
            | Condition::Like { column, .. } => columns.push(*column),
            Condition::And(conditions) | Condition::Or(conditions) => {
                for condition in conditions {
                    condition.collect_columns(columns);
                }
            }
        }
    }
}

fn bind(params: &mut Vec<Value>, value: &Value) -> String {
    params.push(value.clone());
    format!("${}", params.len())
}

fn join_sql(
    conditions: &[Condition],
    operator: &str,
    empty: &str,
    params: &mut Vec<Value>,
) -> String {
    match conditions {
        [] => empty.to_string(),
        [single] => single.to_sql(params),
        _ => {
            let parts: Vec<String> = conditions
                .iter()
                .map(|condition| condition.to_sql(params))
                .collect();
            format!("({})", parts.join(operator))
        }
    }
}
