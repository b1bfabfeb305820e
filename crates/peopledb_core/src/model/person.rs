//! Person domain model.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one on save.
//! - Equality compares `dob` as an instant, so the same moment expressed in
//!   different offsets is equal.

use crate::repo::identity::{Identifiable, IdentityField};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use std::fmt::{Display, Formatter};

/// Row id assigned by the store.
pub type PersonId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: Option<PersonId>,
    pub first_name: String,
    pub last_name: String,
    pub dob: DateTime<FixedOffset>,
    pub salary: Decimal,
}

impl Person {
    /// Creates an unsaved person with zero salary.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        dob: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            dob,
            salary: Decimal::ZERO,
        }
    }

    pub fn with_salary(mut self, salary: Decimal) -> Self {
        self.salary = salary;
        self
    }

    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }
}

impl Display for Person {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "{} {} (id {id})", self.first_name, self.last_name),
            None => write!(f, "{} {} (unsaved)", self.first_name, self.last_name),
        }
    }
}

impl Identifiable for Person {
    const ENTITY_NAME: &'static str = "person";

    fn identity_field() -> Option<IdentityField<Self>> {
        Some(IdentityField::<Self>::new(
            "id",
            |person| person.id,
            |person, id| person.id = Some(id),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::Person;
    use chrono::{DateTime, FixedOffset, TimeZone};

    fn dob(offset_hours: i32, hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(offset_hours * 3600)
            .unwrap()
            .with_ymd_and_hms(1980, 11, 15, hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn same_instant_in_other_offset_is_equal() {
        let local = Person::new("john", "smith", dob(-6, 15));
        let utc = Person::new("john", "smith", dob(0, 21));
        assert_eq!(local, utc);
    }

    #[test]
    fn display_marks_unsaved_people() {
        let mut person = Person::new("john", "smith", dob(0, 12));
        assert_eq!(person.to_string(), "john smith (unsaved)");
        person.id = Some(7);
        assert_eq!(person.to_string(), "john smith (id 7)");
        assert!(person.is_saved());
    }
}
