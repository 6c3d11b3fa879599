use super::Value;
use crate::error::Result;

/// Read access to a row-like value by field and association name.
///
/// This is object safe so that joined rows of different entity types can be walked
/// together during in-memory evaluation.
pub trait Record {
    /// Current value of a field; `None` when the entity has no such field.
    fn field(&self, name: &str) -> Option<Value>;

    /// Rows reachable through an association. Unknown associations yield nothing.
    fn related(&self, association: &str) -> Vec<&dyn Record> {
        let _ = association;
        Vec::new()
    }
}

/// A named, persistable entity
pub trait Entity: Record + Clone + Send + Sync + 'static {
    /// Entity (table) name
    const NAME: &'static str;

    /// Name of the generated identifier field
    const ID_FIELD: &'static str = "id";

    /// Assign a field; fails for unknown fields or values of the wrong kind.
    fn set_field(&mut self, name: &str, value: Value) -> Result<()>;
}
