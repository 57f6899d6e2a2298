//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod course_repo;
pub mod entitlement_repo;
pub mod learner_repo;

pub use course_repo::CourseRepo;
pub use entitlement_repo::EntitlementRepo;
pub use learner_repo::LearnerRepo;
