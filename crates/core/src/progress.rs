//! Watched-lesson tracking on top of [`LearnerEntitlements`].
//!
//! Progress lives in two places: a `ChapterProgress` list nested under a
//! course grant, and the `watched_lessons` list of a chapter grant. Marking
//! a lesson writes to every applicable list; reading prefers the chapter
//! grant and falls back to the course grant.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::catalog::Course;
use crate::entitlement::{AccessType, ChapterProgress, LearnerEntitlements};
use crate::types::{ContentId, Timestamp};

// ---------------------------------------------------------------------------
// Marking
// ---------------------------------------------------------------------------

/// Result of [`LearnerEntitlements::mark_lesson_watched`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchOutcome {
    /// Newly added to at least one watched list.
    Recorded,
    /// Already present in every applicable list.
    AlreadyWatched,
    /// No currently valid course or chapter grant applies.
    NotEnrolled,
}

impl WatchOutcome {
    /// `true` iff the lesson was newly added somewhere.
    pub fn is_newly_recorded(&self) -> bool {
        matches!(self, Self::Recorded)
    }
}

/// Where a chapter's progress was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressSource {
    ChapterGrant,
    CourseGrant,
}

/// Progress and grant details for one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterProgressView {
    pub watched_lessons: Vec<ContentId>,
    pub access_type: AccessType,
    pub enrolled_at: Timestamp,
    pub end_at: Option<Timestamp>,
    /// Derived from the grant's validity at read time, never stored.
    pub has_valid_access: bool,
    pub source: ProgressSource,
}

fn insert_unique(list: &mut Vec<ContentId>, lesson_id: &str) -> bool {
    if list.iter().any(|l| l == lesson_id) {
        false
    } else {
        list.push(lesson_id.to_string());
        true
    }
}

impl LearnerEntitlements {
    /// Record a lesson as watched in every currently valid grant that covers it.
    ///
    /// Writes to the course grant's per-chapter progress (creating the
    /// chapter entry on first watch) and to a matching chapter grant. Expired
    /// grants are left untouched.
    pub fn mark_lesson_watched(
        &mut self,
        course_id: &str,
        chapter_id: &str,
        lesson_id: &str,
        now: Timestamp,
    ) -> WatchOutcome {
        let mut applicable = false;
        let mut added = false;

        if let Some(course) = self
            .courses
            .iter_mut()
            .find(|c| c.course_id == course_id && c.is_valid_at(now))
        {
            applicable = true;
            let index = match course
                .progress
                .iter()
                .position(|p| p.chapter_id == chapter_id)
            {
                Some(index) => index,
                None => {
                    course.progress.push(ChapterProgress::new(chapter_id));
                    course.progress.len() - 1
                }
            };
            added |= insert_unique(&mut course.progress[index].watched_lessons, lesson_id);
        }

        if let Some(chapter) = self.chapters.iter_mut().find(|c| {
            c.course_id == course_id && c.chapter_id == chapter_id && c.is_valid_at(now)
        }) {
            applicable = true;
            added |= insert_unique(&mut chapter.watched_lessons, lesson_id);
        }

        match (applicable, added) {
            (false, _) => WatchOutcome::NotEnrolled,
            (true, true) => WatchOutcome::Recorded,
            (true, false) => WatchOutcome::AlreadyWatched,
        }
    }

    /// Per-chapter progress of a course grant, or `None` when not enrolled.
    pub fn course_progress(&self, course_id: &str) -> Option<&[ChapterProgress]> {
        self.course_grant(course_id).map(|c| c.progress.as_slice())
    }

    /// Progress for one chapter, or `None` when neither grant exists.
    ///
    /// Grant details come from the chapter grant unless it has expired while
    /// the course grant is still valid. Watched lessons are the union of the
    /// chapter grant's list and the course grant's nested entry, and
    /// `has_valid_access` holds if either grant is valid at `now`.
    pub fn chapter_progress(
        &self,
        course_id: &str,
        chapter_id: &str,
        now: Timestamp,
    ) -> Option<ChapterProgressView> {
        let chapter = self.chapter_grant(course_id, chapter_id);
        let course = self.course_grant(course_id);

        let course_watched: &[ContentId] = course
            .and_then(|c| c.progress.iter().find(|p| p.chapter_id == chapter_id))
            .map(|p| p.watched_lessons.as_slice())
            .unwrap_or_default();
        let has_valid_access = chapter.is_some_and(|c| c.is_valid_at(now))
            || course.is_some_and(|c| c.is_valid_at(now));

        let (source, access_type, enrolled_at, end_at, primary, secondary) = match (chapter, course)
        {
            (None, None) => return None,
            (Some(ch), Some(co)) if !ch.is_valid_at(now) && co.is_valid_at(now) => (
                ProgressSource::CourseGrant,
                co.access_type,
                co.enrolled_at,
                co.end_at,
                course_watched,
                ch.watched_lessons.as_slice(),
            ),
            (Some(ch), _) => (
                ProgressSource::ChapterGrant,
                ch.access_type,
                ch.enrolled_at,
                ch.end_at,
                ch.watched_lessons.as_slice(),
                course_watched,
            ),
            (None, Some(co)) => (
                ProgressSource::CourseGrant,
                co.access_type,
                co.enrolled_at,
                co.end_at,
                course_watched,
                &[][..],
            ),
        };

        let mut watched_lessons = primary.to_vec();
        for lesson_id in secondary {
            if !watched_lessons.contains(lesson_id) {
                watched_lessons.push(lesson_id.clone());
            }
        }

        Some(ChapterProgressView {
            watched_lessons,
            access_type,
            enrolled_at,
            end_at,
            has_valid_access,
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// Completion summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterCompletion {
    pub chapter_id: ContentId,
    pub watched: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseCompletion {
    pub course_id: ContentId,
    pub chapters: Vec<ChapterCompletion>,
    pub watched: usize,
    pub total: usize,
    pub percent: u8,
}

/// Compute a completion percentage, returning 0 when `total` is 0.
pub fn compute_completion_pct(total: usize, watched: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (watched as f64 / total as f64 * 100.0).round() as u8;
    pct.min(100)
}

/// Summarise watched vs. total lessons per chapter of `course`.
///
/// Watched lessons are the union of both progress locations. Ids that no
/// longer exist in the catalog are not counted.
pub fn course_completion(course: &Course, entitlements: &LearnerEntitlements) -> CourseCompletion {
    let course_grant = entitlements.course_grant(&course.id);

    let chapters: Vec<ChapterCompletion> = course
        .chapters
        .iter()
        .map(|chapter| {
            let mut watched_ids: BTreeSet<&str> = BTreeSet::new();
            if let Some(entry) = course_grant
                .and_then(|g| g.progress.iter().find(|p| p.chapter_id == chapter.id))
            {
                watched_ids.extend(entry.watched_lessons.iter().map(String::as_str));
            }
            if let Some(grant) = entitlements.chapter_grant(&course.id, &chapter.id) {
                watched_ids.extend(grant.watched_lessons.iter().map(String::as_str));
            }

            let watched = chapter
                .lessons()
                .filter(|l| watched_ids.contains(l.id.as_str()))
                .count();

            ChapterCompletion {
                chapter_id: chapter.id.clone(),
                watched,
                total: chapter.lesson_count(),
            }
        })
        .collect();

    let watched = chapters.iter().map(|c| c.watched).sum();
    let total = chapters.iter().map(|c| c.total).sum();

    CourseCompletion {
        course_id: course.id.clone(),
        chapters,
        watched,
        total,
        percent: compute_completion_pct(total, watched),
    }
}
