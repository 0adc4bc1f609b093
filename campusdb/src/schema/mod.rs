mod types;

pub use types::*;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// Marker stored in a denormalized reference whose target was deleted.
pub const NOT_APPLICABLE: &str = "N/A";

/// The three tables managed by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Student,
    College,
    Program,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::Student => "Student",
            Entity::College => "College",
            Entity::Program => "Program",
        })
    }
}

/// Declared format of a field, used by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `NNNN-NNNN`
    StudentId,
    /// A person's first or last name.
    PersonName,
    /// A college or program name typed into a management form.
    EntityName,
    /// A college or program code typed into a management form.
    Code,
    Gender,
    Year,
    /// A denormalized copy of another table's name or code.
    /// `nullable` references may hold [`NOT_APPLICABLE`].
    Reference { nullable: bool },
}

/// A named column of a table, in header order.
#[derive(Debug, Clone, Copy)]
pub struct FieldDefinition {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDefinition {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        FieldDefinition { name, kind }
    }
}

/// A row type stored in its own table file.
///
/// `FIELDS` fixes the header order, and `values` must return the field
/// values in that same order.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const ENTITY: Entity;
    const FIELDS: &'static [FieldDefinition];

    /// The value of the primary key field.
    fn key(&self) -> &str;

    fn values(&self) -> Vec<&str>;

    fn header() -> Vec<&'static str> {
        Self::FIELDS.iter().map(|f| f.name).collect()
    }

    /// Field definitions paired with this record's values.
    fn fields(&self) -> Vec<(&'static FieldDefinition, &str)> {
        Self::FIELDS.iter().zip(self.values()).collect()
    }
}

/// Case-insensitive equality used for uniqueness and lookups by name.
pub(crate) fn same_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
