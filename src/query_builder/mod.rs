//! # Criteria Query Builder
//!
//! Type-checked construction of reusable query criteria.
//!
//! ## Overview
//!
//! A [`CriteriaBuilder`] accumulates join requests, a single predicate tree and ordering
//! directives, then freezes them into an immutable [`Criteria`]. Criteria can be combined
//! with other criteria, compiled against a [`QueryContext`], and handed to a repository for
//! selects, deletes and bulk updates.
//!
//! ## Key Components
//!
//! - [`builder`] - single-use fluent builder with `build` and `submit` terminal modes
//! - [`predicate`] - value-type gated predicate generators and the AND/OR connector protocol
//! - [`joins`] - join path registry with deduplication and join upgrades
//! - [`conditions`] - condition expression tree and SQL fragment rendering
//! - [`ordering`] - ORDER BY directives
//! - [`criteria`] - the immutable criteria and its combinators
//! - [`statement`] - SQL statements for compiled criteria
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use criteria_core::query_builder::{Criteria, CriteriaBuilder, QueryContext};
//!
//! let electronic = CriteriaBuilder::<Book>::new()
//!     .predicate()?
//!     .attribute(Book::ELECTRONIC)
//!     .is_true()
//!     .apply()
//!     .build();
//!
//! let named = CriteriaBuilder::<Book>::new()
//!     .predicate()?
//!     .attribute(Book::NAME)
//!     .starts_with("A")
//!     .apply()
//!     .ascending(Book::NAME)
//!     .build();
//!
//! let criteria = Criteria::where_all([electronic, named])?;
//! let sql = criteria.compile(&QueryContext::default())?.select_statement();
//! ```

pub mod builder;
pub mod conditions;
pub mod criteria;
pub mod joins;
pub mod ordering;
pub mod predicate;
pub mod statement;

pub use builder::{Build, CriteriaBuilder, Submit};
pub use conditions::{Column, CompareOp, Condition, Source, ROOT_ALIAS};
pub use criteria::{CompiledCriteria, Criteria, PathFn, QueryContext};
pub use joins::{FromPath, JoinEntry, JoinType, FETCH_SUFFIX};
pub use ordering::{Direction, OrderEntry, OrderFn};
pub use predicate::{
    and_all, or_all, AndOrConnector, Connector, PredicateApplier, PredicateFn, PredicateGenerator,
};
pub use statement::SqlStatement;
