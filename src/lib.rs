#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Criteria Core
//!
//! Composable, type-checked query criteria for entity repositories.
//!
//! ## Overview
//!
//! Callers describe filters, join paths and orderings over an entity through typed
//! attribute handles instead of query strings. The description is frozen into an
//! immutable, reusable [`Criteria`] that a repository executes for selects, deletes and
//! bulk updates.
//!
//! ## Key Features
//!
//! - **Typed operators**: the predicate operators an attribute offers follow from its value
//!   type, so `is_positive()` on a string attribute does not compile
//! - **Join deduplication**: repeated joins on one association collapse into a single join,
//!   widened in place when a broader join kind is requested
//! - **Criteria algebra**: criteria combine with `and`/`or`, and `where_all` reduces many
//! - **Two backends**: an in-memory reference repository and a PostgreSQL repository
//!
//! ## Module Organization
//!
//! - [`model`] - attribute and association handles, values, entity traits
//! - [`query_builder`] - builder, predicate algebra, join registry, criteria, SQL rendering
//! - [`repository`] - repository boundary, backends, updater and resource manager
//! - [`config`] - configuration management
//! - [`error`] - structured error handling
//! - [`logging`] - structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use criteria_core::prelude::*;
//!
//! let repository = InMemoryRepository::<Book>::new().with_rows(books);
//!
//! let criteria = CriteriaBuilder::<Book>::new()
//!     .predicate()?
//!     .attribute(Book::ELECTRONIC)
//!     .is_true()
//!     .and()
//!     .attribute(Book::NAME)
//!     .starts_with("A")
//!     .apply()
//!     .ascending(Book::NAME)
//!     .build();
//!
//! let found = repository.find_all_using(&criteria)?;
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod query_builder;
pub mod repository;

pub use crate::config::{CriteriaConfig, FindOnePolicy};
pub use error::{CriteriaError, Result};
pub use model::{Association, Attribute, Entity, Record, Value};
pub use query_builder::{Criteria, CriteriaBuilder, JoinType, QueryContext};
pub use repository::{FieldSetter, InMemoryRepository, Repository, ResourceManager};

/// Commonly used types for describing and executing criteria
pub mod prelude {
    pub use crate::config::{CriteriaConfig, FindOnePolicy};
    pub use crate::error::{CriteriaError, Result};
    pub use crate::model::{
        Association, Attribute, AttributeValue, ComparableValue, Entity, NumericValue, Record,
        Value,
    };
    pub use crate::query_builder::{
        Condition, Criteria, CriteriaBuilder, FromPath, JoinType, QueryContext,
    };
    pub use crate::repository::{
        EntityUpdater, FieldSetter, InMemoryRepository, Repository, ResourceManager,
    };
}
