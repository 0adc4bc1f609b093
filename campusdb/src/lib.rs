pub mod catalog;
pub mod config;
pub mod error;
pub mod integrity;
pub mod query;
pub mod schema;
pub mod stats;
pub mod store;
pub mod table;
pub mod validation;

pub use config::Config;
pub use error::{CampusDbError, Result};
pub use integrity::IntegrityReport;
pub use query::{Filter, SortKey, StudentQuery};
pub use schema::{College, Entity, Program, Student, NOT_APPLICABLE};
pub use stats::Summary;
pub use store::{Commit, Store};
