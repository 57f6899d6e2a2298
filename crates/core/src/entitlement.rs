//! Learner entitlements: whole-course and single-chapter access grants.
//!
//! A learner's grants live in one aggregate, [`LearnerEntitlements`], that
//! is loaded, mutated in memory and written back as a unit. Grants are a
//! set keyed by `course_id` (course grants) and by `(course_id, chapter_id)`
//! (chapter grants); enrolling twice under the same key is a conflict.
//!
//! Expiry is evaluated at read time against a caller-supplied `now`. There
//! is no background expiry sweep and nothing is cached.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{ContentId, Timestamp};

// ---------------------------------------------------------------------------
// Access type
// ---------------------------------------------------------------------------

pub const ACCESS_TEMPORARY: &str = "temporary";
pub const ACCESS_LIFETIME: &str = "lifetime";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    /// Valid until the grant's `end_at`.
    Temporary,
    /// Never expires; `end_at` is ignored.
    Lifetime,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temporary => ACCESS_TEMPORARY,
            Self::Lifetime => ACCESS_LIFETIME,
        }
    }
}

/// The validity rule shared by every grant.
///
/// Lifetime grants are always valid. Temporary grants are valid while
/// `now <= end_at`; a temporary grant without `end_at` is never valid.
pub fn grant_is_valid(access_type: AccessType, end_at: Option<Timestamp>, now: Timestamp) -> bool {
    match access_type {
        AccessType::Lifetime => true,
        AccessType::Temporary => end_at.is_some_and(|end| now <= end),
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Watched lessons for one chapter, nested under a course grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterProgress {
    pub chapter_id: ContentId,
    #[serde(default)]
    pub watched_lessons: Vec<ContentId>,
}

impl ChapterProgress {
    pub fn new(chapter_id: &str) -> Self {
        Self {
            chapter_id: chapter_id.to_string(),
            watched_lessons: Vec::new(),
        }
    }
}

/// Access to every chapter of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrolledCourse {
    pub course_id: ContentId,
    pub access_type: AccessType,
    pub enrolled_at: Timestamp,
    pub end_at: Option<Timestamp>,
    #[serde(default)]
    pub progress: Vec<ChapterProgress>,
}

impl EnrolledCourse {
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        grant_is_valid(self.access_type, self.end_at, now)
    }
}

/// Access to a single chapter bought on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrolledChapter {
    pub course_id: ContentId,
    pub chapter_id: ContentId,
    pub access_type: AccessType,
    pub enrolled_at: Timestamp,
    pub end_at: Option<Timestamp>,
    #[serde(default)]
    pub watched_lessons: Vec<ContentId>,
}

impl EnrolledChapter {
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        grant_is_valid(self.access_type, self.end_at, now)
    }
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Every grant held by one learner, persisted as a single document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerEntitlements {
    #[serde(default)]
    pub courses: Vec<EnrolledCourse>,
    #[serde(default)]
    pub chapters: Vec<EnrolledChapter>,
}

impl LearnerEntitlements {
    pub fn course_grant(&self, course_id: &str) -> Option<&EnrolledCourse> {
        self.courses.iter().find(|c| c.course_id == course_id)
    }

    pub fn chapter_grant(&self, course_id: &str, chapter_id: &str) -> Option<&EnrolledChapter> {
        self.chapters
            .iter()
            .find(|c| c.course_id == course_id && c.chapter_id == chapter_id)
    }

    /// Whether the learner may access the course, or one chapter of it, at `now`.
    ///
    /// Without `chapter_id` only course grants count. With `chapter_id` the
    /// result is the union of the course grant and a matching chapter grant.
    pub fn has_access(&self, course_id: &str, chapter_id: Option<&str>, now: Timestamp) -> bool {
        let course_level = self
            .courses
            .iter()
            .any(|c| c.course_id == course_id && c.is_valid_at(now));

        match chapter_id {
            None => course_level,
            Some(chapter_id) => {
                course_level
                    || self.chapters.iter().any(|c| {
                        c.course_id == course_id && c.chapter_id == chapter_id && c.is_valid_at(now)
                    })
            }
        }
    }

    /// Add a whole-course grant.
    ///
    /// Rejects a second grant for the same course and a temporary grant
    /// without `end_at`.
    pub fn enroll_in_course(
        &mut self,
        course_id: &str,
        access_type: AccessType,
        end_at: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<&EnrolledCourse, CoreError> {
        require_id("course_id", course_id)?;
        require_end_at(access_type, end_at)?;

        if self.course_grant(course_id).is_some() {
            return Err(CoreError::Conflict(format!(
                "Already enrolled in course {course_id}"
            )));
        }

        self.courses.push(EnrolledCourse {
            course_id: course_id.to_string(),
            access_type,
            enrolled_at: now,
            end_at,
            progress: Vec::new(),
        });
        Ok(&self.courses[self.courses.len() - 1])
    }

    /// Add a single-chapter grant.
    ///
    /// Independent of any course grant: holding both is allowed.
    pub fn enroll_in_chapter(
        &mut self,
        course_id: &str,
        chapter_id: &str,
        access_type: AccessType,
        end_at: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<&EnrolledChapter, CoreError> {
        require_id("course_id", course_id)?;
        require_id("chapter_id", chapter_id)?;
        require_end_at(access_type, end_at)?;

        if self.chapter_grant(course_id, chapter_id).is_some() {
            return Err(CoreError::Conflict(format!(
                "Already enrolled in chapter {chapter_id} of course {course_id}"
            )));
        }

        self.chapters.push(EnrolledChapter {
            course_id: course_id.to_string(),
            chapter_id: chapter_id.to_string(),
            access_type,
            enrolled_at: now,
            end_at,
            watched_lessons: Vec::new(),
        });
        Ok(&self.chapters[self.chapters.len() - 1])
    }
}

fn require_end_at(access_type: AccessType, end_at: Option<Timestamp>) -> Result<(), CoreError> {
    if access_type == AccessType::Temporary && end_at.is_none() {
        return Err(CoreError::Validation(
            "Temporary access requires an end_at timestamp".into(),
        ));
    }
    Ok(())
}

fn require_id(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    // -- AccessType -----------------------------------------------------------

    #[test]
    fn access_type_serializes_snake_case() {
        let json = serde_json::to_value(AccessType::Temporary).unwrap();
        assert_eq!(json, "temporary");
    }

    // -- grant_is_valid -------------------------------------------------------

    #[test]
    fn lifetime_ignores_end_at() {
        let past = now() - Duration::days(30);
        assert!(grant_is_valid(AccessType::Lifetime, None, now()));
        assert!(grant_is_valid(AccessType::Lifetime, Some(past), now()));
    }

    #[test]
    fn temporary_valid_until_end_inclusive() {
        let end = now();
        assert!(grant_is_valid(AccessType::Temporary, Some(end), now()));
        assert!(!grant_is_valid(
            AccessType::Temporary,
            Some(end),
            now() + Duration::seconds(1)
        ));
    }

    #[test]
    fn temporary_without_end_is_never_valid() {
        assert!(!grant_is_valid(AccessType::Temporary, None, now()));
    }

    // -- has_access: course level ---------------------------------------------

    #[test]
    fn no_grant_means_no_access() {
        let ent = LearnerEntitlements::default();
        assert!(!ent.has_access("c1", None, now()));
        assert!(!ent.has_access("c1", Some("ch1"), now()));
    }

    #[test]
    fn lifetime_enrollment_grants_access_immediately() {
        let mut ent = LearnerEntitlements::default();
        assert!(!ent.has_access("c1", None, now()));
        ent.enroll_in_course("c1", AccessType::Lifetime, None, now())
            .unwrap();
        assert!(ent.has_access("c1", None, now()));
    }

    #[test]
    fn expired_temporary_grant_denies() {
        let mut ent = LearnerEntitlements::default();
        ent.enroll_in_course(
            "c1",
            AccessType::Temporary,
            Some(now() - Duration::seconds(1)),
            now() - Duration::days(1),
        )
        .unwrap();
        assert!(!ent.has_access("c1", None, now()));
    }

    #[test]
    fn unexpired_temporary_grant_allows() {
        let mut ent = LearnerEntitlements::default();
        ent.enroll_in_course(
            "c1",
            AccessType::Temporary,
            Some(now() + Duration::hours(1)),
            now(),
        )
        .unwrap();
        assert!(ent.has_access("c1", None, now()));
    }

    #[test]
    fn grant_for_other_course_does_not_apply() {
        let mut ent = LearnerEntitlements::default();
        ent.enroll_in_course("c1", AccessType::Lifetime, None, now())
            .unwrap();
        assert!(!ent.has_access("c2", None, now()));
    }

    #[test]
    fn access_expires_when_clock_advances() {
        let mut ent = LearnerEntitlements::default();
        let tomorrow = now() + Duration::days(1);
        ent.enroll_in_course("c1", AccessType::Temporary, Some(tomorrow), now())
            .unwrap();

        assert!(ent.has_access("c1", None, now()));
        assert!(!ent.has_access("c1", None, tomorrow + Duration::seconds(1)));
    }

    // -- has_access: chapter level --------------------------------------------

    #[test]
    fn course_grant_covers_every_chapter() {
        let mut ent = LearnerEntitlements::default();
        ent.enroll_in_course("c1", AccessType::Lifetime, None, now())
            .unwrap();
        assert!(ent.has_access("c1", Some("ch1"), now()));
        assert!(ent.has_access("c1", Some("ch9"), now()));
    }

    #[test]
    fn chapter_grant_alone_does_not_open_course() {
        let mut ent = LearnerEntitlements::default();
        ent.enroll_in_chapter("c1", "ch1", AccessType::Lifetime, None, now())
            .unwrap();

        assert!(ent.has_access("c1", Some("ch1"), now()));
        assert!(!ent.has_access("c1", None, now()));
        assert!(!ent.has_access("c1", Some("ch2"), now()));
    }

    #[test]
    fn overlapping_grants_union() {
        let mut ent = LearnerEntitlements::default();
        ent.enroll_in_course(
            "c1",
            AccessType::Temporary,
            Some(now() - Duration::days(1)),
            now() - Duration::days(30),
        )
        .unwrap();
        ent.enroll_in_chapter("c1", "ch1", AccessType::Lifetime, None, now())
            .unwrap();

        assert!(!ent.has_access("c1", None, now()));
        assert!(ent.has_access("c1", Some("ch1"), now()));
        assert!(!ent.has_access("c1", Some("ch2"), now()));
    }

    #[test]
    fn expired_chapter_grant_falls_back_to_course_grant() {
        let mut ent = LearnerEntitlements::default();
        ent.enroll_in_course("c1", AccessType::Lifetime, None, now())
            .unwrap();
        ent.enroll_in_chapter(
            "c1",
            "ch1",
            AccessType::Temporary,
            Some(now() - Duration::hours(2)),
            now() - Duration::days(3),
        )
        .unwrap();
        assert!(ent.has_access("c1", Some("ch1"), now()));
    }

    // -- enrollment -----------------------------------------------------------

    #[test]
    fn enroll_sets_enrolled_at_and_empty_progress() {
        let mut ent = LearnerEntitlements::default();
        let grant = ent
            .enroll_in_course("c1", AccessType::Lifetime, None, now())
            .unwrap();
        assert_eq!(grant.enrolled_at, now());
        assert!(grant.progress.is_empty());

        let chapter = ent
            .enroll_in_chapter("c1", "ch1", AccessType::Lifetime, None, now())
            .unwrap();
        assert_eq!(chapter.enrolled_at, now());
        assert!(chapter.watched_lessons.is_empty());
    }

    #[test]
    fn duplicate_course_enrollment_conflicts() {
        let mut ent = LearnerEntitlements::default();
        ent.enroll_in_course("c1", AccessType::Lifetime, None, now())
            .unwrap();
        let second = ent.enroll_in_course("c1", AccessType::Lifetime, None, now());
        assert_matches!(second, Err(CoreError::Conflict(_)));
        assert_eq!(
            ent.courses.iter().filter(|c| c.course_id == "c1").count(),
            1
        );
    }

    #[test]
    fn duplicate_course_enrollment_conflicts_even_when_expired() {
        let mut ent = LearnerEntitlements::default();
        ent.enroll_in_course(
            "c1",
            AccessType::Temporary,
            Some(now() - Duration::days(1)),
            now() - Duration::days(31),
        )
        .unwrap();
        assert_matches!(
            ent.enroll_in_course("c1", AccessType::Lifetime, None, now()),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn duplicate_chapter_enrollment_conflicts() {
        let mut ent = LearnerEntitlements::default();
        ent.enroll_in_chapter("c1", "ch1", AccessType::Lifetime, None, now())
            .unwrap();
        assert_matches!(
            ent.enroll_in_chapter("c1", "ch1", AccessType::Lifetime, None, now()),
            Err(CoreError::Conflict(_))
        );
        // Same chapter id under a different course is a different key.
        assert!(ent
            .enroll_in_chapter("c2", "ch1", AccessType::Lifetime, None, now())
            .is_ok());
        assert_eq!(ent.chapters.len(), 2);
    }

    #[test]
    fn course_and_chapter_grants_coexist() {
        let mut ent = LearnerEntitlements::default();
        ent.enroll_in_course("c1", AccessType::Lifetime, None, now())
            .unwrap();
        assert!(ent
            .enroll_in_chapter("c1", "ch1", AccessType::Lifetime, None, now())
            .is_ok());
    }

    #[test]
    fn temporary_without_end_at_is_invalid_input() {
        let mut ent = LearnerEntitlements::default();
        assert_matches!(
            ent.enroll_in_course("c2", AccessType::Temporary, None, now()),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            ent.enroll_in_chapter("c2", "ch1", AccessType::Temporary, None, now()),
            Err(CoreError::Validation(_))
        );
        assert!(ent.courses.is_empty());
        assert!(ent.chapters.is_empty());
    }

    #[test]
    fn empty_ids_rejected() {
        let mut ent = LearnerEntitlements::default();
        assert_matches!(
            ent.enroll_in_course(" ", AccessType::Lifetime, None, now()),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            ent.enroll_in_chapter("c1", "", AccessType::Lifetime, None, now()),
            Err(CoreError::Validation(_))
        );
    }

    // -- persistence shape ----------------------------------------------------

    #[test]
    fn aggregate_deserializes_with_missing_lists() {
        let ent: LearnerEntitlements = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(ent, LearnerEntitlements::default());
    }
}
