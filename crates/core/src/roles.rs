//! Well-known role name constants and the coarse ownership check.
//!
//! These must match the `CHECK` constraint on `learners.role` in
//! `20260301000001_create_learners.sql`.

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_INSTRUCTOR: &str = "instructor";
pub const ROLE_STUDENT: &str = "student";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_INSTRUCTOR, ROLE_STUDENT];

/// Validate that a role string is one of the known roles.
pub fn validate_role(role: &str) -> Result<(), CoreError> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        )))
    }
}

/// Allow the call when the caller is the learner themselves or an admin.
///
/// Entitlement and progress records are owned by the learner; only the
/// learner and administrators may read or mutate them.
pub fn ensure_self_or_admin(
    caller_id: &str,
    caller_role: &str,
    learner_id: &str,
) -> Result<(), CoreError> {
    if caller_role == ROLE_ADMIN || caller_id == learner_id {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only the learner or an admin may access these records".into(),
        ))
    }
}
