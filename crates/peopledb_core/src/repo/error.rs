//! Repository error taxonomy.

use crate::db::DbError;
use crate::repo::statement::OperationKind;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure raised by the generic CRUD engine or a mapper hook.
#[derive(Debug)]
pub enum RepoError {
    /// Entity type declares no identity field.
    Configuration(String),
    /// `save` failed while binding or executing; wraps the underlying fault.
    Save {
        entity: &'static str,
        source: Box<RepoError>,
    },
    /// Store-level failure for any operation.
    Db(DbError),
    /// The resolved statement for the operation was empty.
    MissingStatement(OperationKind),
    /// Bound values disagree with the statement's placeholders.
    ParameterMismatch {
        kind: OperationKind,
        expected: usize,
        actual: usize,
    },
    /// Entity has no identity yet; it was never saved.
    UnsavedEntity(&'static str),
    /// A persisted row could not be mapped to an entity.
    InvalidData(String),
    /// The connection lacks the table the mapper targets.
    MissingRequiredTable(&'static str),
}

impl RepoError {
    /// Wraps `source` as a save failure of `entity`.
    pub fn save(entity: &'static str, source: RepoError) -> Self {
        Self::Save {
            entity,
            source: Box::new(source),
        }
    }

    /// Stable, content-free code for log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Save { .. } => "save_failed",
            Self::Db(_) => "db_failed",
            Self::MissingStatement(_) => "missing_statement",
            Self::ParameterMismatch { .. } => "parameter_mismatch",
            Self::UnsavedEntity(_) => "unsaved_entity",
            Self::InvalidData(_) => "invalid_data",
            Self::MissingRequiredTable(_) => "missing_required_table",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(message) => write!(f, "repository misconfigured: {message}"),
            Self::Save { entity, source } => write!(f, "unable to save {entity}: {source}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingStatement(kind) => {
                write!(f, "no statement available for operation `{kind}`")
            }
            Self::ParameterMismatch {
                kind,
                expected,
                actual,
            } => write!(
                f,
                "statement for `{kind}` expects {expected} parameters, {actual} bound"
            ),
            Self::UnsavedEntity(entity) => write!(f, "{entity} has no identity; save it first"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Save { source, .. } => Some(source.as_ref()),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
