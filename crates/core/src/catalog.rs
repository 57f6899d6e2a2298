//! Course catalog tree: Course → Chapter → Section → VideoLesson.
//!
//! The catalog is read-mostly and owned by instructors and admins. This
//! module holds the assembled tree (as loaded by the `db` crate), the
//! input shapes used to create one, and the lookups needed by the
//! content-serving boundary. It has no database dependencies.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::pricing::{validate_pricing, Pricing};
use crate::types::ContentId;

/// Maximum length of a course, chapter, section or lesson title.
pub const MAX_TITLE_LENGTH: u64 = 200;

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: ContentId,
    pub title: String,
    pub description: Option<String>,
    pub pricing: Option<Pricing>,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ContentId,
    pub title: String,
    pub position: i32,
    /// Overrides the course price list when buying this chapter alone.
    pub pricing: Option<Pricing>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: ContentId,
    pub title: String,
    pub position: i32,
    pub lessons: Vec<VideoLesson>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoLesson {
    pub id: ContentId,
    pub title: String,
    pub position: i32,
    /// Preview lessons are visible without any entitlement.
    pub preview: bool,
    pub duration_secs: Option<i32>,
}

impl Course {
    pub fn find_chapter(&self, chapter_id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == chapter_id)
    }

    /// Find a lesson inside a specific chapter, searching all of its sections.
    pub fn find_lesson(&self, chapter_id: &str, lesson_id: &str) -> Option<&VideoLesson> {
        self.find_chapter(chapter_id)?.find_lesson(lesson_id)
    }

    /// Sort chapters, sections and lessons by `position` for display.
    ///
    /// Positions need not be contiguous; ties keep their existing order.
    pub fn sort_by_position(&mut self) {
        self.chapters.sort_by_key(|c| c.position);
        for chapter in &mut self.chapters {
            chapter.sections.sort_by_key(|s| s.position);
            for section in &mut chapter.sections {
                section.lessons.sort_by_key(|l| l.position);
            }
        }
    }

    pub fn lesson_count(&self) -> usize {
        self.chapters.iter().map(Chapter::lesson_count).sum()
    }
}

impl Chapter {
    pub fn find_lesson(&self, lesson_id: &str) -> Option<&VideoLesson> {
        self.lessons().find(|l| l.id == lesson_id)
    }

    /// All lessons of the chapter in section order.
    pub fn lessons(&self) -> impl Iterator<Item = &VideoLesson> {
        self.sections.iter().flat_map(|s| s.lessons.iter())
    }

    pub fn lesson_count(&self) -> usize {
        self.sections.iter().map(|s| s.lessons.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Content gate
// ---------------------------------------------------------------------------

/// Why a lesson may (or may not) be served to a learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonGate {
    /// Preview lesson, visible to everyone.
    Preview,
    /// The learner holds a valid course or chapter grant.
    Entitled,
    /// Neither preview nor entitled.
    Locked,
}

impl LessonGate {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Locked)
    }
}

/// Decide whether a lesson may be served.
///
/// Preview lessons short-circuit: `has_access` is only evaluated for
/// non-preview lessons.
pub fn lesson_gate(lesson: &VideoLesson, has_access: impl FnOnce() -> bool) -> LessonGate {
    if lesson.preview {
        LessonGate::Preview
    } else if has_access() {
        LessonGate::Entitled
    } else {
        LessonGate::Locked
    }
}

// ---------------------------------------------------------------------------
// Input shapes
// ---------------------------------------------------------------------------

/// A complete course tree to create in one call.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCourse {
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH))]
    pub title: String,
    pub description: Option<String>,
    pub pricing: Option<Pricing>,
    #[serde(default)]
    #[validate(nested)]
    pub chapters: Vec<NewChapter>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewChapter {
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH))]
    pub title: String,
    /// Defaults to the chapter's index in the list.
    #[validate(range(min = 0))]
    pub position: Option<i32>,
    pub pricing: Option<Pricing>,
    #[serde(default)]
    #[validate(nested)]
    pub sections: Vec<NewSection>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewSection {
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH))]
    pub title: String,
    #[validate(range(min = 0))]
    pub position: Option<i32>,
    #[serde(default)]
    #[validate(nested)]
    pub lessons: Vec<NewLesson>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewLesson {
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH))]
    pub title: String,
    #[validate(range(min = 0))]
    pub position: Option<i32>,
    #[serde(default)]
    pub preview: bool,
    #[validate(range(min = 0))]
    pub duration_secs: Option<i32>,
}

/// Validate a new course tree: field constraints plus every price list.
pub fn validate_new_course(input: &NewCourse) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;

    if let Some(pricing) = &input.pricing {
        validate_pricing(pricing)?;
    }
    for chapter in &input.chapters {
        if let Some(pricing) = &chapter.pricing {
            validate_pricing(pricing).map_err(|e| match e {
                CoreError::Validation(msg) => {
                    CoreError::Validation(format!("Chapter '{}': {msg}", chapter.title))
                }
                other => other,
            })?;
        }
    }
    Ok(())
}

/// Resolve an optional explicit position against the item's list index.
pub fn resolve_position(explicit: Option<i32>, index: usize) -> i32 {
    explicit.unwrap_or_else(|| i32::try_from(index).unwrap_or(i32::MAX))
}
