//! Repository for the catalog tables: `courses`, `chapters`, `sections`
//! and `video_lessons`.

use learnhub_core::catalog::{resolve_position, Course, NewCourse};
use learnhub_core::types::ContentId;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::catalog::{assemble_course, ChapterRow, CourseRow, LessonRow, SectionRow};

const COURSE_COLUMNS: &str =
    "id, title, description, pricing, created_by, created_at, updated_at";
const CHAPTER_COLUMNS: &str = "id, course_id, title, position, pricing";
const SECTION_COLUMNS: &str = "id, chapter_id, title, position";
const LESSON_COLUMNS: &str = "id, section_id, title, position, preview, duration_secs";

/// Mint a new catalog id.
fn new_id() -> ContentId {
    Uuid::now_v7().to_string()
}

/// Provides creation and tree lookups for courses.
pub struct CourseRepo;

impl CourseRepo {
    /// Insert a complete course tree in one transaction, returning it assembled.
    ///
    /// Omitted positions default to the item's index within its parent.
    pub async fn create(
        pool: &PgPool,
        input: &NewCourse,
        created_by: Option<&str>,
    ) -> Result<Course, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let course_id = new_id();
        sqlx::query(
            "INSERT INTO courses (id, title, description, pricing, created_by)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&course_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.pricing.as_ref().map(Json))
        .bind(created_by)
        .execute(&mut *tx)
        .await?;

        for (chapter_index, chapter) in input.chapters.iter().enumerate() {
            let chapter_id = new_id();
            sqlx::query(
                "INSERT INTO chapters (id, course_id, title, position, pricing)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&chapter_id)
            .bind(&course_id)
            .bind(&chapter.title)
            .bind(resolve_position(chapter.position, chapter_index))
            .bind(chapter.pricing.as_ref().map(Json))
            .execute(&mut *tx)
            .await?;

            for (section_index, section) in chapter.sections.iter().enumerate() {
                let section_id = new_id();
                sqlx::query(
                    "INSERT INTO sections (id, chapter_id, title, position)
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(&section_id)
                .bind(&chapter_id)
                .bind(&section.title)
                .bind(resolve_position(section.position, section_index))
                .execute(&mut *tx)
                .await?;

                for (lesson_index, lesson) in section.lessons.iter().enumerate() {
                    sqlx::query(
                        "INSERT INTO video_lessons
                            (id, section_id, title, position, preview, duration_secs)
                         VALUES ($1, $2, $3, $4, $5, $6)",
                    )
                    .bind(new_id())
                    .bind(&section_id)
                    .bind(&lesson.title)
                    .bind(resolve_position(lesson.position, lesson_index))
                    .bind(lesson.preview)
                    .bind(lesson.duration_secs)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        let course = Self::load_tree(&mut tx, &course_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        tx.commit().await?;
        tracing::info!(course_id = %course.id, lessons = course.lesson_count(), "Course created");
        Ok(course)
    }

    /// Load a course with its full chapter/section/lesson tree.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Course>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let course = Self::load_tree(&mut tx, id).await?;
        tx.commit().await?;
        Ok(course)
    }

    /// Whether a course with the given id exists.
    pub async fn exists(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    async fn load_tree(
        tx: &mut Transaction<'_, Postgres>,
        id: &str,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1");
        let Some(course) = sqlx::query_as::<_, CourseRow>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
        else {
            return Ok(None);
        };

        let query = format!(
            "SELECT {CHAPTER_COLUMNS} FROM chapters WHERE course_id = $1 ORDER BY position, id"
        );
        let chapters = sqlx::query_as::<_, ChapterRow>(&query)
            .bind(id)
            .fetch_all(&mut **tx)
            .await?;
        let chapter_ids: Vec<ContentId> = chapters.iter().map(|c| c.id.clone()).collect();

        let query = format!(
            "SELECT {SECTION_COLUMNS} FROM sections WHERE chapter_id = ANY($1) ORDER BY position, id"
        );
        let sections = sqlx::query_as::<_, SectionRow>(&query)
            .bind(&chapter_ids)
            .fetch_all(&mut **tx)
            .await?;
        let section_ids: Vec<ContentId> = sections.iter().map(|s| s.id.clone()).collect();

        let query = format!(
            "SELECT {LESSON_COLUMNS} FROM video_lessons WHERE section_id = ANY($1) ORDER BY position, id"
        );
        let lessons = sqlx::query_as::<_, LessonRow>(&query)
            .bind(&section_ids)
            .fetch_all(&mut **tx)
            .await?;

        Ok(Some(assemble_course(course, chapters, sections, lessons)))
    }
}
