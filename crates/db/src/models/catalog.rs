//! Catalog row structs: one per level of the course tree.

use learnhub_core::catalog::{Chapter, Course, Section, VideoLesson};
use learnhub_core::pricing::Pricing;
use learnhub_core::types::{ContentId, LearnerId, Timestamp};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `courses` table.
#[derive(Debug, Clone, FromRow)]
pub struct CourseRow {
    pub id: ContentId,
    pub title: String,
    pub description: Option<String>,
    pub pricing: Option<Json<Pricing>>,
    pub created_by: Option<LearnerId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `chapters` table.
#[derive(Debug, Clone, FromRow)]
pub struct ChapterRow {
    pub id: ContentId,
    pub course_id: ContentId,
    pub title: String,
    pub position: i32,
    pub pricing: Option<Json<Pricing>>,
}

/// A row from the `sections` table.
#[derive(Debug, Clone, FromRow)]
pub struct SectionRow {
    pub id: ContentId,
    pub chapter_id: ContentId,
    pub title: String,
    pub position: i32,
}

/// A row from the `video_lessons` table.
#[derive(Debug, Clone, FromRow)]
pub struct LessonRow {
    pub id: ContentId,
    pub section_id: ContentId,
    pub title: String,
    pub position: i32,
    pub preview: bool,
    pub duration_secs: Option<i32>,
}

impl From<LessonRow> for VideoLesson {
    fn from(row: LessonRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            position: row.position,
            preview: row.preview,
            duration_secs: row.duration_secs,
        }
    }
}

/// Assemble a course tree from flat rows, sorted by `position` at every level.
///
/// Rows whose parent is missing from the given slices are dropped.
pub fn assemble_course(
    course: CourseRow,
    chapters: Vec<ChapterRow>,
    sections: Vec<SectionRow>,
    lessons: Vec<LessonRow>,
) -> Course {
    let mut lessons = lessons;
    let mut sections: Vec<(ContentId, Section)> = sections
        .into_iter()
        .map(|s| {
            let section_lessons = drain_where(&mut lessons, |l| l.section_id == s.id);
            (
                s.chapter_id,
                Section {
                    id: s.id,
                    title: s.title,
                    position: s.position,
                    lessons: section_lessons.into_iter().map(VideoLesson::from).collect(),
                },
            )
        })
        .collect();

    let chapters = chapters
        .into_iter()
        .map(|c| {
            let chapter_sections = drain_where(&mut sections, |(chapter_id, _)| *chapter_id == c.id);
            Chapter {
                id: c.id,
                title: c.title,
                position: c.position,
                pricing: c.pricing.map(|Json(p)| p),
                sections: chapter_sections.into_iter().map(|(_, s)| s).collect(),
            }
        })
        .collect();

    let mut course = Course {
        id: course.id,
        title: course.title,
        description: course.description,
        pricing: course.pricing.map(|Json(p)| p),
        chapters,
    };
    course.sort_by_position();
    course
}

/// Remove and return the items matching `pred`, keeping relative order.
fn drain_where<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> Vec<T> {
    let (matched, rest): (Vec<T>, Vec<T>) = items.drain(..).partition(|item| pred(item));
    *items = rest;
    matched
}
