use super::{AttributeValue, Entity};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Typed handle to a single-valued property `V` of entity `E`
///
/// Two handles naming the same property compare equal, which is what join and
/// ordering deduplication relies on.
pub struct Attribute<E, V> {
    name: &'static str,
    _marker: PhantomData<fn() -> (E, V)>,
}

impl<E, V> Attribute<E, V> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<E: Entity, V: AttributeValue> Attribute<E, V> {
    /// Read this attribute from an entity instance.
    pub fn read(&self, entity: &E) -> Option<super::Value> {
        entity.field(self.name)
    }
}

impl<E, V> Clone for Attribute<E, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, V> Copy for Attribute<E, V> {}

impl<E, V> PartialEq for Attribute<E, V> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<E, V> Eq for Attribute<E, V> {}

impl<E, V> Hash for Attribute<E, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<E: Entity, V> fmt::Debug for Attribute<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", E::NAME, self.name)
    }
}

/// How many target rows an association can yield per source row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    ToOne,
    ToMany,
}

/// Typed handle to an association from entity `E` to entity `J`
///
/// `local_key` is the column on `E` and `target_key` the column on `J` that the
/// association is joined on.
pub struct Association<E, J> {
    name: &'static str,
    local_key: &'static str,
    target_key: &'static str,
    cardinality: Cardinality,
    _marker: PhantomData<fn() -> (E, J)>,
}

impl<E, J> Association<E, J> {
    /// A to-one association, e.g. `book.author_id -> author.id`
    pub const fn to_one(name: &'static str, local_key: &'static str, target_key: &'static str) -> Self {
        Self {
            name,
            local_key,
            target_key,
            cardinality: Cardinality::ToOne,
            _marker: PhantomData,
        }
    }

    /// A to-many association, e.g. `book.id -> review.book_id`
    pub const fn to_many(name: &'static str, local_key: &'static str, target_key: &'static str) -> Self {
        Self {
            name,
            local_key,
            target_key,
            cardinality: Cardinality::ToMany,
            _marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn local_key(&self) -> &'static str {
        self.local_key
    }

    pub const fn target_key(&self) -> &'static str {
        self.target_key
    }

    pub const fn cardinality(&self) -> Cardinality {
        self.cardinality
    }
}

impl<E, J: Entity> Association<E, J> {
    /// Name of the joined entity
    pub fn target(&self) -> &'static str {
        J::NAME
    }
}

impl<E, J> Clone for Association<E, J> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, J> Copy for Association<E, J> {}

impl<E, J> PartialEq for Association<E, J> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<E, J> Eq for Association<E, J> {}

impl<E, J> Hash for Association<E, J> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<E: Entity, J: Entity> fmt::Debug for Association<E, J> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} -> {}", E::NAME, self.name, J::NAME)
    }
}
