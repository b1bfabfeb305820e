//! Generic repository engine and its per-entity mappers.
//!
//! # Responsibility
//! - Share one CRUD implementation across entity types.
//! - Keep statement text and column mapping inside per-entity mappers.
//!
//! # Invariants
//! - Statement text resolves from declared directives before mapper
//!   defaults.
//! - Store failures surface as `RepoError`; nothing is retried or swallowed.

pub mod crud;
pub mod error;
pub mod identity;
pub mod people_repo;
pub mod statement;
