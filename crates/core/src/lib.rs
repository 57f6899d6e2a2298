//! Domain logic for the learnhub platform.
//!
//! Pure types and functions: the course catalog tree, pricing, learner
//! entitlements and progress. No I/O; persistence lives in `learnhub-db`.

pub mod catalog;
pub mod entitlement;
pub mod error;
pub mod pricing;
pub mod progress;
pub mod roles;
pub mod types;
