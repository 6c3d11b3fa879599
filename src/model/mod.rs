//! # Attribute Reference Model
//!
//! Typed handles used to describe criteria without query strings:
//!
//! - [`Attribute`] - a single-valued property of an entity, typed by its value
//! - [`Association`] - a to-one or to-many link from one entity to another
//! - [`Value`] - the literal values predicates compare against
//! - [`Entity`] / [`Record`] - what a repository needs to read and mutate rows
//!
//! The value capability traits ([`ComparableValue`], [`NumericValue`]) restrict at compile
//! time which predicate operators an attribute offers.

pub mod attribute;
pub mod entity;
pub mod value;

pub use attribute::{Association, Attribute, Cardinality};
pub use entity::{Entity, Record};
pub use value::{AttributeValue, ComparableValue, NumericValue, Value};
