//! SQLite-backed course, lesson, enrollment and lesson-progress repository.
//!
//! `enroll` runs as a transaction so the enrollment insert and the course
//! student-counter increment land as one unit; the UNIQUE(user_id,
//! course_id) index plus `INSERT OR IGNORE` make it idempotent under
//! concurrency. `update_lesson_progress` is a single `ON CONFLICT DO
//! UPDATE` upsert whose `COALESCE(completed_at, ..)` keeps the completion
//! stamp from ever being rewritten.

use chrono::{DateTime, Utc};
use entities::{
    Course, CourseUpdate, Enrollment, EnrollmentStatus, Lesson, LessonKind, LessonProgress,
    LessonQuizItem, NewCourse, NewLesson,
};

use super::helpers::{
    decode_course_level, decode_difficulty, decode_enrollment_status, decode_json,
    decode_lesson_kind, encode_json, is_foreign_key_violation,
};
use super::SqliteStore;
use crate::persistence::traits::CourseRepository;
use crate::persistence::{clamp_progress, new_id, now, StoreError};

type CourseRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    String,
    Option<f64>,
    i64,
    f64,
    bool,
    DateTime<Utc>,
);

fn course_from_row(row: CourseRow) -> Result<Course, StoreError> {
    let (
        id,
        title,
        description,
        level,
        difficulty,
        topics,
        prerequisites,
        instructor,
        rating,
        students,
        price,
        is_active,
        created_at,
    ) = row;
    Ok(Course {
        id,
        title,
        description,
        level: decode_course_level(&level),
        difficulty: decode_difficulty(&difficulty),
        topics: decode_json(&topics)?,
        prerequisites,
        instructor,
        rating,
        students,
        price,
        is_active,
        created_at,
    })
}

type LessonRow = (
    String,
    String,
    String,
    Option<String>,
    String,
    i64,
    Option<i64>,
    Option<String>,
    String,
    Option<String>,
    bool,
);

fn lesson_from_row(row: LessonRow) -> Result<Lesson, StoreError> {
    let (
        id,
        course_id,
        title,
        description,
        content,
        position,
        duration_minutes,
        video_url,
        kind,
        quiz_data,
        is_active,
    ) = row;
    let quiz_data: Option<Vec<LessonQuizItem>> = match quiz_data {
        Some(json) => Some(decode_json(&json)?),
        None => None,
    };
    Ok(Lesson {
        id,
        course_id,
        title,
        description,
        content,
        order: position,
        duration_minutes,
        video_url,
        kind: decode_lesson_kind(&kind),
        quiz_data,
        is_active,
    })
}

type EnrollmentRow = (
    String,
    String,
    String,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
    i64,
    i64,
    String,
    DateTime<Utc>,
);

fn enrollment_from_row(row: EnrollmentRow) -> Enrollment {
    let (
        id,
        user_id,
        course_id,
        enrolled_at,
        completed_at,
        progress,
        time_spent_minutes,
        status,
        last_accessed_at,
    ) = row;
    Enrollment {
        id,
        user_id,
        course_id,
        enrolled_at,
        completed_at,
        progress,
        time_spent_minutes,
        status: decode_enrollment_status(&status),
        last_accessed_at,
    }
}

type LessonProgressRow = (
    String,
    String,
    String,
    String,
    bool,
    Option<DateTime<Utc>>,
    i64,
    DateTime<Utc>,
);

fn lesson_progress_from_row(row: LessonProgressRow) -> LessonProgress {
    let (
        id,
        enrollment_id,
        lesson_id,
        user_id,
        completed,
        completed_at,
        time_spent_minutes,
        last_accessed_at,
    ) = row;
    LessonProgress {
        id,
        enrollment_id,
        lesson_id,
        user_id,
        completed,
        completed_at,
        time_spent_minutes,
        last_accessed_at,
    }
}

const COURSE_COLUMNS: &str = "id, title, description, level, difficulty, topics, prerequisites, \
                              instructor, rating, students, price, is_active, created_at";
const LESSON_COLUMNS: &str = "id, course_id, title, description, content, position, \
                              duration_minutes, video_url, kind, quiz_data, is_active";
const ENROLLMENT_COLUMNS: &str = "id, user_id, course_id, enrolled_at, completed_at, progress, \
                                  time_spent_minutes, status, last_accessed_at";
const LESSON_PROGRESS_COLUMNS: &str = "id, enrollment_id, lesson_id, user_id, completed, \
                                       completed_at, time_spent_minutes, last_accessed_at";

impl SqliteStore {
    async fn fetch_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>, StoreError> {
        let row: Option<EnrollmentRow> = sqlx::query_as(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE user_id = ? AND course_id = ?"
        ))
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(enrollment_from_row))
    }
}

impl CourseRepository for SqliteStore {
    async fn create_course(&self, new_course: NewCourse) -> Result<Course, StoreError> {
        let course = Course {
            id: new_id(),
            title: new_course.title,
            description: new_course.description,
            level: new_course.level,
            difficulty: new_course.difficulty,
            topics: new_course.topics,
            prerequisites: new_course.prerequisites,
            instructor: new_course.instructor,
            rating: new_course.rating,
            students: 0,
            price: new_course.price,
            is_active: true,
            created_at: now(),
        };

        sqlx::query(
            r#"
            INSERT INTO courses (id, title, description, level, difficulty, topics,
                                 prerequisites, instructor, rating, students, price,
                                 is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&course.id)
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.level.as_str())
        .bind(course.difficulty.as_str())
        .bind(encode_json(&course.topics)?)
        .bind(&course.prerequisites)
        .bind(&course.instructor)
        .bind(course.rating)
        .bind(course.students)
        .bind(course.price)
        .bind(course.is_active)
        .bind(course.created_at)
        .execute(self.pool())
        .await?;

        Ok(course)
    }

    async fn get_course(&self, id: &str) -> Result<Option<Course>, StoreError> {
        let row: Option<CourseRow> =
            sqlx::query_as(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?"))
                .bind(id)
                .fetch_optional(self.pool())
                .await?;
        row.map(course_from_row).transpose()
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        let rows: Vec<CourseRow> = sqlx::query_as(&format!(
            r#"
            SELECT {COURSE_COLUMNS} FROM courses
            WHERE is_active = 1
            ORDER BY CASE level
                         WHEN 'beginner' THEN 0
                         WHEN 'intermediate' THEN 1
                         WHEN 'advanced' THEN 2
                         ELSE 3
                     END,
                     title ASC
            "#
        ))
        .fetch_all(self.pool())
        .await?;
        rows.into_iter().map(course_from_row).collect()
    }

    async fn update_course(
        &self,
        id: &str,
        update: CourseUpdate,
    ) -> Result<Option<Course>, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE courses
            SET title = COALESCE(?, title),
                description = COALESCE(?, description),
                level = COALESCE(?, level),
                rating = COALESCE(?, rating),
                price = COALESCE(?, price),
                is_active = COALESCE(?, is_active)
            WHERE id = ?
            "#,
        )
        .bind(update.title)
        .bind(update.description)
        .bind(update.level.map(|l| l.as_str()))
        .bind(update.rating)
        .bind(update.price)
        .bind(update.is_active)
        .bind(id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_course(id).await
    }

    async fn create_lesson(&self, new_lesson: NewLesson) -> Result<Lesson, StoreError> {
        let lesson = Lesson {
            id: new_id(),
            course_id: new_lesson.course_id,
            title: new_lesson.title,
            description: new_lesson.description,
            content: new_lesson.content,
            order: new_lesson.order,
            duration_minutes: new_lesson.duration_minutes,
            video_url: new_lesson.video_url,
            kind: new_lesson.kind.unwrap_or(LessonKind::Theory),
            quiz_data: new_lesson.quiz_data,
            is_active: true,
        };

        let quiz_data = match &lesson.quiz_data {
            Some(items) => Some(encode_json(items)?),
            None => None,
        };

        sqlx::query(
            r#"
            INSERT INTO lessons (id, course_id, title, description, content, position,
                                 duration_minutes, video_url, kind, quiz_data, is_active)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&lesson.id)
        .bind(&lesson.course_id)
        .bind(&lesson.title)
        .bind(&lesson.description)
        .bind(&lesson.content)
        .bind(lesson.order)
        .bind(lesson.duration_minutes)
        .bind(&lesson.video_url)
        .bind(lesson.kind.as_str())
        .bind(quiz_data)
        .bind(lesson.is_active)
        .execute(self.pool())
        .await?;

        Ok(lesson)
    }

    async fn get_lesson(&self, id: &str) -> Result<Option<Lesson>, StoreError> {
        let row: Option<LessonRow> =
            sqlx::query_as(&format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = ?"))
                .bind(id)
                .fetch_optional(self.pool())
                .await?;
        row.map(lesson_from_row).transpose()
    }

    async fn list_lessons(&self, course_id: &str) -> Result<Vec<Lesson>, StoreError> {
        let rows: Vec<LessonRow> = sqlx::query_as(&format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE course_id = ? AND is_active = 1 ORDER BY position ASC"
        ))
        .bind(course_id)
        .fetch_all(self.pool())
        .await?;
        rows.into_iter().map(lesson_from_row).collect()
    }

    async fn enroll(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>, StoreError> {
        if let Some(existing) = self.fetch_enrollment(user_id, course_id).await? {
            return Ok(Some(existing));
        }

        let timestamp = now();
        let enrollment = Enrollment {
            id: new_id(),
            user_id: user_id.to_string(),
            course_id: course_id.to_string(),
            enrolled_at: timestamp,
            completed_at: None,
            progress: 0,
            time_spent_minutes: 0,
            status: EnrollmentStatus::Active,
            last_accessed_at: timestamp,
        };

        let mut tx = self.pool().begin().await?;

        // OR IGNORE makes a lost race against a concurrent enroll fall
        // through to re-reading the winner's row; the foreign keys turn a
        // missing user or course into ordinary absence.
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO enrollments
                (id, user_id, course_id, enrolled_at, completed_at, progress,
                 time_spent_minutes, status, last_accessed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&enrollment.id)
        .bind(&enrollment.user_id)
        .bind(&enrollment.course_id)
        .bind(enrollment.enrolled_at)
        .bind(enrollment.completed_at)
        .bind(enrollment.progress)
        .bind(enrollment.time_spent_minutes)
        .bind(enrollment.status.as_str())
        .bind(enrollment.last_accessed_at)
        .execute(&mut *tx)
        .await;

        let inserted = match result {
            Ok(r) => r.rows_affected() == 1,
            Err(e) if is_foreign_key_violation(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if inserted {
            sqlx::query("UPDATE courses SET students = students + 1 WHERE id = ?")
                .bind(course_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        if inserted {
            Ok(Some(enrollment))
        } else {
            self.fetch_enrollment(user_id, course_id).await
        }
    }

    async fn get_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>, StoreError> {
        self.fetch_enrollment(user_id, course_id).await
    }

    async fn list_enrollments(&self, user_id: &str) -> Result<Vec<Enrollment>, StoreError> {
        let rows: Vec<EnrollmentRow> = sqlx::query_as(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE user_id = ? ORDER BY enrolled_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(enrollment_from_row).collect())
    }

    async fn update_enrollment_progress(
        &self,
        user_id: &str,
        course_id: &str,
        progress: i64,
        time_spent_delta: Option<i64>,
    ) -> Result<Option<Enrollment>, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE enrollments
            SET progress = ?,
                time_spent_minutes = time_spent_minutes + MAX(COALESCE(?, 0), 0),
                last_accessed_at = ?
            WHERE user_id = ? AND course_id = ?
            "#,
        )
        .bind(clamp_progress(progress))
        .bind(time_spent_delta)
        .bind(now())
        .bind(user_id)
        .bind(course_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_enrollment(user_id, course_id).await
    }

    async fn complete_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>, StoreError> {
        let timestamp = now();
        let result = sqlx::query(
            r#"
            UPDATE enrollments
            SET progress = 100,
                status = 'completed',
                completed_at = COALESCE(completed_at, ?),
                last_accessed_at = ?
            WHERE user_id = ? AND course_id = ?
            "#,
        )
        .bind(timestamp)
        .bind(timestamp)
        .bind(user_id)
        .bind(course_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_enrollment(user_id, course_id).await
    }

    async fn update_lesson_progress(
        &self,
        enrollment_id: &str,
        lesson_id: &str,
        user_id: &str,
        completed: bool,
        time_spent_delta: Option<i64>,
    ) -> Result<Option<LessonProgress>, StoreError> {
        let timestamp = now();
        let completed_at = completed.then_some(timestamp);

        let mut tx = self.pool().begin().await?;

        // The single upsert statement both accumulates time and keeps
        // completed/completed_at one-way, so two concurrent calls cannot
        // double-stamp or drop a delta.
        let result = sqlx::query(
            r#"
            INSERT INTO lesson_progress
                (id, enrollment_id, lesson_id, user_id, completed, completed_at,
                 time_spent_minutes, last_accessed_at)
            VALUES (?, ?, ?, ?, ?, ?, MAX(COALESCE(?, 0), 0), ?)
            ON CONFLICT (enrollment_id, lesson_id, user_id) DO UPDATE SET
                completed = lesson_progress.completed OR excluded.completed,
                completed_at = COALESCE(lesson_progress.completed_at, excluded.completed_at),
                time_spent_minutes = lesson_progress.time_spent_minutes + excluded.time_spent_minutes,
                last_accessed_at = excluded.last_accessed_at
            "#,
        )
        .bind(new_id())
        .bind(enrollment_id)
        .bind(lesson_id)
        .bind(user_id)
        .bind(completed)
        .bind(completed_at)
        .bind(time_spent_delta)
        .bind(timestamp)
        .execute(&mut *tx)
        .await;

        if let Err(e) = result {
            // Missing parent enrollment.
            if is_foreign_key_violation(&e) {
                return Ok(None);
            }
            return Err(e.into());
        }

        sqlx::query("UPDATE enrollments SET last_accessed_at = ? WHERE id = ?")
            .bind(timestamp)
            .bind(enrollment_id)
            .execute(&mut *tx)
            .await?;

        let row: Option<LessonProgressRow> = sqlx::query_as(&format!(
            r#"
            SELECT {LESSON_PROGRESS_COLUMNS} FROM lesson_progress
            WHERE enrollment_id = ? AND lesson_id = ? AND user_id = ?
            "#
        ))
        .bind(enrollment_id)
        .bind(lesson_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.map(lesson_progress_from_row))
    }

    async fn list_lesson_progress(
        &self,
        enrollment_id: &str,
    ) -> Result<Vec<LessonProgress>, StoreError> {
        let rows: Vec<LessonProgressRow> = sqlx::query_as(&format!(
            "SELECT {LESSON_PROGRESS_COLUMNS} FROM lesson_progress WHERE enrollment_id = ?"
        ))
        .bind(enrollment_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(lesson_progress_from_row).collect())
    }
}
