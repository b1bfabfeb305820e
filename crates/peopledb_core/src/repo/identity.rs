//! Identity field declaration and access.
//!
//! An entity type names its surrogate key once, through [`Identifiable`].
//! The CRUD engine reads it to bind deletes/updates and writes it after an
//! insert; nothing else about the entity is visible here.

use crate::repo::error::{RepoError, RepoResult};
use std::fmt::{Debug, Formatter};

/// Getter/setter pair for the integer identity field of `T`.
pub struct IdentityField<T> {
    pub name: &'static str,
    pub get: fn(&T) -> Option<i64>,
    pub set: fn(&mut T, i64),
}

impl<T> IdentityField<T> {
    pub const fn new(
        name: &'static str,
        get: fn(&T) -> Option<i64>,
        set: fn(&mut T, i64),
    ) -> Self {
        Self { name, get, set }
    }
}

impl<T> Clone for IdentityField<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for IdentityField<T> {}

impl<T> Debug for IdentityField<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityField")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Entity types persisted by the CRUD engine.
pub trait Identifiable {
    /// Short type name used in errors and logs.
    const ENTITY_NAME: &'static str;

    /// The single identity field, or `None` when the type declares none.
    fn identity_field() -> Option<IdentityField<Self>>
    where
        Self: Sized;
}

/// Reads and writes the identity of `T` through its declared field.
pub struct IdentityAccessor;

impl IdentityAccessor {
    /// Returns the declared field or a configuration error.
    pub fn field<T: Identifiable>() -> RepoResult<IdentityField<T>> {
        T::identity_field().ok_or_else(|| {
            RepoError::Configuration(format!(
                "entity `{}` declares no identity field",
                T::ENTITY_NAME
            ))
        })
    }

    /// Returns the stored identity.
    ///
    /// # Errors
    /// - `RepoError::Configuration` when `T` declares no identity field.
    /// - `RepoError::UnsavedEntity` when the field holds no value yet.
    pub fn get_identity<T: Identifiable>(entity: &T) -> RepoResult<i64> {
        let field = Self::field::<T>()?;
        (field.get)(entity).ok_or(RepoError::UnsavedEntity(T::ENTITY_NAME))
    }

    /// Writes `id` into the entity in place.
    ///
    /// # Errors
    /// - `RepoError::Configuration` when `T` declares no identity field.
    pub fn set_identity<T: Identifiable>(entity: &mut T, id: i64) -> RepoResult<()> {
        let field = Self::field::<T>()?;
        (field.set)(entity, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{IdentityAccessor, IdentityField, Identifiable};
    use crate::repo::error::RepoError;

    #[derive(Debug, Default)]
    struct Tagged {
        key: Option<i64>,
    }

    impl Identifiable for Tagged {
        const ENTITY_NAME: &'static str = "tagged";

        fn identity_field() -> Option<IdentityField<Self>> {
            Some(IdentityField::<Self>::new(
                "key",
                |entity| entity.key,
                |entity, id| entity.key = Some(id),
            ))
        }
    }

    struct Untagged;

    impl Identifiable for Untagged {
        const ENTITY_NAME: &'static str = "untagged";

        fn identity_field() -> Option<IdentityField<Self>> {
            None
        }
    }

    #[test]
    fn set_then_get_round_trips_in_place() {
        let mut entity = Tagged::default();
        IdentityAccessor::set_identity(&mut entity, 41).unwrap();
        assert_eq!(entity.key, Some(41));
        assert_eq!(IdentityAccessor::get_identity(&entity).unwrap(), 41);
    }

    #[test]
    fn unset_identity_is_reported() {
        let err = IdentityAccessor::get_identity(&Tagged::default()).unwrap_err();
        assert!(matches!(err, RepoError::UnsavedEntity("tagged")));
    }

    #[test]
    fn missing_field_fails_for_get_and_set_alike() {
        let get_err = IdentityAccessor::get_identity(&Untagged).unwrap_err();
        let set_err = IdentityAccessor::set_identity(&mut Untagged, 1).unwrap_err();
        assert!(matches!(get_err, RepoError::Configuration(ref m) if m.contains("untagged")));
        assert!(matches!(set_err, RepoError::Configuration(ref m) if m.contains("untagged")));
    }
}
