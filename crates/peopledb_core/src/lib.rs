//! Metadata-driven CRUD over SQLite.
//!
//! A single generic engine ([`CrudRepository`]) runs save, find, count,
//! delete and update for any entity type. Each type contributes an
//! [`EntityMapper`] with its statements and column binding, and declares its
//! identity field through [`Identifiable`].

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{ConfigError, CoreConfig, DatabaseConfig, LoggingConfig};
pub use logging::{
    default_log_level, flush_logs, init_from_config, init_logging, logging_status,
};
pub use model::person::{Person, PersonId};
pub use repo::crud::{CrudRepository, EntityMapper};
pub use repo::error::{RepoError, RepoResult};
pub use repo::identity::{IdentityAccessor, IdentityField, Identifiable};
pub use repo::people_repo::{PeopleRepository, PersonMapper};
pub use repo::statement::{
    Directive, DirectiveSet, MapperHook, OperationKind, StatementResolver, IDS_PLACEHOLDER,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
