//! Entity types persisted through the CRUD engine.
//!
//! # Invariants
//! - Every entity declares exactly one integer identity field.
//! - Entities are caller-owned; repositories never hold on to them.

pub mod person;
