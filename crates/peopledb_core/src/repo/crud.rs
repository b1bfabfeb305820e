//! Generic CRUD engine shared by every entity repository.
//!
//! # Responsibility
//! - Run save/find/find-all/count/delete/delete-many/update for any entity
//!   type described by an [`EntityMapper`].
//! - Resolve statement text per operation, binding and row mapping stay in
//!   the mapper.
//! - Write the store-generated identity back into saved entities.
//!
//! # Invariants
//! - The engine never retains entities between calls.
//! - Statement handles and row cursors are dropped on every exit path.
//! - Every prepared statement is checked against the bound value count
//!   before it runs.
//! - `update` binds the identity as the last parameter, after the mapper's
//!   values.

use crate::repo::error::{RepoError, RepoResult};
use crate::repo::identity::{IdentityAccessor, Identifiable};
use crate::repo::statement::{
    substitute_ids, DirectiveSet, OperationKind, StatementResolver, IDS_PLACEHOLDER,
};
use log::{debug, error, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row, Statement};
use std::time::Instant;

/// Entity-specific half of a repository: statements, binding and mapping.
pub trait EntityMapper {
    type Entity: Identifiable;

    /// Table the mapper's statements target.
    const TABLE: &'static str;

    /// Statement overrides, consulted before [`EntityMapper::default_statement`].
    fn directives(&self) -> DirectiveSet {
        DirectiveSet::new()
    }

    /// Statement used when no directive covers `kind`.
    ///
    /// The empty default means "not available" and fails when executed.
    fn default_statement(&self, kind: OperationKind) -> String {
        warn!(
            "event=statement_resolve module=repo status=fallback op={} table={} reason=no_statement_declared",
            kind,
            Self::TABLE
        );
        String::new()
    }

    /// Positional values for the `Save` statement.
    fn bind_for_save(&self, entity: &Self::Entity) -> RepoResult<Vec<Value>>;

    /// Positional values for every non-identity `Update` placeholder.
    fn bind_for_update(&self, entity: &Self::Entity) -> RepoResult<Vec<Value>>;

    /// Materializes one entity from a result row.
    fn extract_entity(&self, row: &Row<'_>) -> RepoResult<Self::Entity>;
}

/// CRUD engine bound to one caller-owned connection.
///
/// Works on a plain `Connection` or on a `Transaction` through deref.
pub struct CrudRepository<'conn, M: EntityMapper> {
    conn: &'conn Connection,
    mapper: M,
    resolver: StatementResolver,
}

impl<'conn, M: EntityMapper> CrudRepository<'conn, M> {
    pub fn new(conn: &'conn Connection, mapper: M) -> Self {
        let resolver = StatementResolver::new(mapper.directives());
        Self {
            conn,
            mapper,
            resolver,
        }
    }

    /// Like [`CrudRepository::new`], but first checks that the mapper's table
    /// exists on `conn`.
    pub fn try_new(conn: &'conn Connection, mapper: M) -> RepoResult<Self> {
        if !table_exists(conn, M::TABLE)? {
            return Err(RepoError::MissingRequiredTable(M::TABLE));
        }
        Ok(Self::new(conn, mapper))
    }

    /// Statement text for `kind`: declared directive first, mapper default
    /// otherwise.
    pub fn statement_for(&self, kind: OperationKind) -> String {
        self.resolver.resolve(kind, || self.mapper.default_statement(kind))
    }

    /// Inserts `entity`, assigns its generated identity in place and returns
    /// the same instance.
    ///
    /// # Errors
    /// - `RepoError::Configuration` when the entity type has no identity field.
    /// - `RepoError::Save` wrapping any bind or execution failure.
    pub fn save<'e>(&self, entity: &'e mut M::Entity) -> RepoResult<&'e mut M::Entity> {
        let started_at = Instant::now();
        let kind = OperationKind::Save;
        IdentityAccessor::field::<M::Entity>()?;

        let id = self
            .finish(kind, started_at, self.insert(entity))
            .map_err(|err| RepoError::save(M::Entity::ENTITY_NAME, err))?;
        IdentityAccessor::set_identity(entity, id)?;
        debug!(
            "event=repo_identity module=repo status=ok entity={} id={}",
            M::Entity::ENTITY_NAME,
            id
        );
        Ok(entity)
    }

    /// Loads the entity stored under `id`; `None` when nothing matches.
    pub fn find_by_id(&self, id: i64) -> RepoResult<Option<M::Entity>> {
        let started_at = Instant::now();
        let kind = OperationKind::FindById;
        let result = self.prepare(kind, 1).and_then(|mut stmt| {
            let mut rows = stmt.query([id])?;
            let found = match rows.next()? {
                Some(row) => Some(self.mapper.extract_entity(row)?),
                None => None,
            };
            Ok(found)
        });
        self.finish(kind, started_at, result)
    }

    /// Loads every entity in the order the store returns them.
    pub fn find_all(&self) -> RepoResult<Vec<M::Entity>> {
        let started_at = Instant::now();
        let kind = OperationKind::FindAll;
        let result = self.prepare(kind, 0).and_then(|mut stmt| {
            let mut rows = stmt.query([])?;
            let mut entities = Vec::new();
            while let Some(row) = rows.next()? {
                entities.push(self.mapper.extract_entity(row)?);
            }
            Ok(entities)
        });
        self.finish(kind, started_at, result)
    }

    /// First column of the first row of the `Count` statement, `0` when the
    /// statement yields no rows.
    pub fn count(&self) -> RepoResult<i64> {
        let started_at = Instant::now();
        let kind = OperationKind::Count;
        let result = self.prepare(kind, 0).and_then(|mut stmt| {
            let mut rows = stmt.query([])?;
            let count = match rows.next()? {
                Some(row) => row.get::<_, i64>(0)?,
                None => 0,
            };
            Ok(count)
        });
        self.finish(kind, started_at, result)
    }

    /// Deletes `entity` by identity and returns the affected row count.
    pub fn delete(&self, entity: &M::Entity) -> RepoResult<usize> {
        let started_at = Instant::now();
        let kind = OperationKind::DeleteOne;
        let result = IdentityAccessor::get_identity(entity).and_then(|id| {
            let mut stmt = self.prepare(kind, 1)?;
            Ok(stmt.execute([id])?)
        });
        self.finish(kind, started_at, result)
    }

    /// Deletes all `entities` with one statement and returns the affected
    /// row count.
    ///
    /// The `:ids` placeholder is replaced by the comma-joined identities.
    /// An empty slice executes nothing.
    pub fn delete_many(&self, entities: &[M::Entity]) -> RepoResult<usize> {
        if entities.is_empty() {
            return Ok(0);
        }

        let started_at = Instant::now();
        let kind = OperationKind::DeleteMany;
        let result = entities
            .iter()
            .map(IdentityAccessor::get_identity::<M::Entity>)
            .collect::<RepoResult<Vec<i64>>>()
            .and_then(|ids| {
                let template = self.executable_statement(kind)?;
                if !template.contains(IDS_PLACEHOLDER) {
                    return Err(RepoError::Configuration(format!(
                        "`{kind}` statement for `{}` lacks the `{IDS_PLACEHOLDER}` placeholder",
                        M::TABLE
                    )));
                }
                let sql = substitute_ids(&template, &ids);
                Ok(self.conn.execute(&sql, [])?)
            });
        self.finish(kind, started_at, result)
    }

    /// Rewrites every non-identity column of `entity` and returns the
    /// affected row count. Zero rows (stale identity) is not an error.
    pub fn update(&self, entity: &M::Entity) -> RepoResult<usize> {
        let started_at = Instant::now();
        let kind = OperationKind::Update;
        let result = IdentityAccessor::get_identity(entity).and_then(|id| {
            let mut values = self.mapper.bind_for_update(entity)?;
            values.push(Value::Integer(id));
            let mut stmt = self.prepare(kind, values.len())?;
            Ok(stmt.execute(params_from_iter(values))?)
        });
        self.finish(kind, started_at, result)
    }

    fn insert(&self, entity: &M::Entity) -> RepoResult<i64> {
        let values = self.mapper.bind_for_save(entity)?;
        let mut stmt = self.prepare(OperationKind::Save, values.len())?;
        Ok(stmt.insert(params_from_iter(values))?)
    }

    fn executable_statement(&self, kind: OperationKind) -> RepoResult<String> {
        let statement = self.statement_for(kind);
        if statement.trim().is_empty() {
            return Err(RepoError::MissingStatement(kind));
        }
        Ok(statement)
    }

    fn prepare(
        &self,
        kind: OperationKind,
        bound: usize,
    ) -> RepoResult<rusqlite::CachedStatement<'conn>> {
        let sql = self.executable_statement(kind)?;
        let stmt = self.conn.prepare_cached(&sql)?;
        ensure_parameter_count(&stmt, kind, bound)?;
        Ok(stmt)
    }

    fn finish<T>(
        &self,
        kind: OperationKind,
        started_at: Instant,
        result: RepoResult<T>,
    ) -> RepoResult<T> {
        match &result {
            Ok(_) => debug!(
                "event=repo_op module=repo status=ok op={} table={} duration_ms={}",
                kind,
                M::TABLE,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=repo_op module=repo status=error op={} table={} duration_ms={} error_code={}",
                kind,
                M::TABLE,
                started_at.elapsed().as_millis(),
                err.code()
            ),
        }
        result
    }
}

fn ensure_parameter_count(
    stmt: &Statement<'_>,
    kind: OperationKind,
    bound: usize,
) -> RepoResult<()> {
    let expected = stmt.parameter_count();
    if expected != bound {
        return Err(RepoError::ParameterMismatch {
            kind,
            expected,
            actual: bound,
        });
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
