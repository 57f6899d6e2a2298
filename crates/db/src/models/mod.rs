//! Row structs and DTOs.
//!
//! Each submodule contains `FromRow` structs matching database rows and
//! `Deserialize` DTOs for writes. Catalog rows are assembled into the
//! `learnhub_core::catalog` tree by the repositories.

pub mod catalog;
pub mod entitlement;
pub mod learner;
