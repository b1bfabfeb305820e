//! `people` table mapping for the generic CRUD engine.
//!
//! # Responsibility
//! - Declare the statement text for every operation on `people`.
//! - Bind `Person` fields to positional parameters and read rows back.
//!
//! # Invariants
//! - `dob` is persisted as RFC 3339 in UTC and read back at offset `+00:00`.
//! - `salary` is persisted as decimal text so no precision is lost.
//! - `bind_for_update` binds exactly the four columns before `WHERE id = ?`.

use crate::model::person::Person;
use crate::repo::crud::{CrudRepository, EntityMapper};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::statement::{Directive, DirectiveSet, MapperHook, OperationKind};
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::Row;
use rust_decimal::Decimal;
use std::str::FromStr;

pub const SAVE_PERSON_SQL: &str =
    "INSERT INTO people (first_name, last_name, dob, salary) VALUES (?, ?, ?, ?)";
pub const FIND_BY_ID_SQL: &str =
    "SELECT id, first_name, last_name, dob, salary FROM people WHERE id = ?";
pub const FIND_ALL_SQL: &str = "SELECT id, first_name, last_name, dob, salary FROM people";
pub const SELECT_COUNT_SQL: &str = "SELECT COUNT(*) FROM people";
pub const DELETE_BY_ID_SQL: &str = "DELETE FROM people WHERE id = ?";
pub const DELETE_BY_ID_IN_SQL: &str = "DELETE FROM people WHERE id IN (:ids)";
pub const UPDATE_BY_ID_SQL: &str =
    "UPDATE people SET first_name = ?, last_name = ?, dob = ?, salary = ? WHERE id = ?";

/// CRUD engine specialised for `people`.
pub type PeopleRepository<'conn> = CrudRepository<'conn, PersonMapper>;

/// Column mapping between `Person` and the `people` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonMapper;

impl PersonMapper {
    /// Opens a people repository on a migrated connection.
    pub fn repository(conn: &rusqlite::Connection) -> RepoResult<PeopleRepository<'_>> {
        CrudRepository::try_new(conn, Self)
    }
}

impl EntityMapper for PersonMapper {
    type Entity = Person;

    const TABLE: &'static str = "people";

    fn directives(&self) -> DirectiveSet {
        DirectiveSet::new()
            .attach(MapperHook::BindForSave, OperationKind::Save, SAVE_PERSON_SQL)
            .attach(
                MapperHook::BindForUpdate,
                OperationKind::Update,
                UPDATE_BY_ID_SQL,
            )
            .attach_all(
                MapperHook::ExtractEntity,
                [
                    Directive::new(OperationKind::FindById, FIND_BY_ID_SQL),
                    Directive::new(OperationKind::FindAll, FIND_ALL_SQL),
                    Directive::new(OperationKind::Count, SELECT_COUNT_SQL),
                    Directive::new(OperationKind::DeleteOne, DELETE_BY_ID_SQL),
                    Directive::new(OperationKind::DeleteMany, DELETE_BY_ID_IN_SQL),
                ],
            )
    }

    fn bind_for_save(&self, person: &Person) -> RepoResult<Vec<Value>> {
        Ok(column_values(person))
    }

    fn bind_for_update(&self, person: &Person) -> RepoResult<Vec<Value>> {
        Ok(column_values(person))
    }

    fn extract_entity(&self, row: &Row<'_>) -> RepoResult<Person> {
        let dob_text: String = row.get("dob")?;
        let salary_text: String = row.get("salary")?;

        Ok(Person {
            id: Some(row.get("id")?),
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            dob: parse_dob(&dob_text)?,
            salary: Decimal::from_str(&salary_text).map_err(|_| {
                RepoError::InvalidData("unparseable decimal in people.salary".to_string())
            })?,
        })
    }
}

fn column_values(person: &Person) -> Vec<Value> {
    vec![
        Value::Text(person.first_name.clone()),
        Value::Text(person.last_name.clone()),
        Value::Text(dob_to_db(person.dob)),
        Value::Text(person.salary.to_string()),
    ]
}

fn dob_to_db(dob: DateTime<FixedOffset>) -> String {
    dob.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

fn parse_dob(value: &str) -> RepoResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).map_err(|_| {
        RepoError::InvalidData("unparseable RFC 3339 timestamp in people.dob".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::{dob_to_db, parse_dob};
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn dob_is_stored_in_utc() {
        let dob = FixedOffset::west_opt(6 * 3600)
            .unwrap()
            .with_ymd_and_hms(1980, 11, 15, 15, 0, 0)
            .unwrap();
        assert_eq!(dob_to_db(dob), "1980-11-15T21:00:00+00:00");
        assert_eq!(parse_dob(&dob_to_db(dob)).unwrap(), dob);
    }

    #[test]
    fn malformed_dob_is_invalid_data() {
        let err = parse_dob("15/11/1980").unwrap_err();
        assert!(err.to_string().contains("people.dob"));
        assert!(!err.to_string().contains("15/11/1980"));
        assert_eq!(err.code(), "invalid_data");
    }
}
