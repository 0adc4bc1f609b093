use crate::schema::Entity;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CampusDbError {
    #[error("Validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),

    #[error("Duplicate {entity} {field}: '{value}' already exists")]
    DuplicateKey {
        entity: Entity,
        field: &'static str,
        value: String,
    },

    #[error("{entity} not found: {key}")]
    NotFound { entity: Entity, key: String },

    #[error("Storage error in {}: {message}", .path.display())]
    Storage { path: PathBuf, message: String },

    #[error("Referential integrity violation: {0}")]
    ReferentialIntegrity(String),

    /// The primary table (and possibly some dependents) were written before
    /// a later table failed. Nothing is rolled back.
    #[error(
        "Partial commit: wrote {} but failed to write {failed}: {source}",
        .committed.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )]
    PartialCommit {
        committed: Vec<Entity>,
        failed: Entity,
        #[source]
        source: Box<CampusDbError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CampusDbError {
    /// True for errors raised before anything was written.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CampusDbError::Validation(_)
                | CampusDbError::DuplicateKey { .. }
                | CampusDbError::NotFound { .. }
                | CampusDbError::ReferentialIntegrity(_)
        )
    }

    /// The individual messages carried by this error, one per violation.
    pub fn messages(&self) -> Vec<String> {
        match self {
            CampusDbError::Validation(errors) => errors.clone(),
            other => vec![other.to_string()],
        }
    }
}

pub type Result<T> = std::result::Result<T, CampusDbError>;
