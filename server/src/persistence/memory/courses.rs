use entities::{
    Course, CourseUpdate, Enrollment, EnrollmentStatus, Lesson, LessonKind, LessonProgress,
    NewCourse, NewLesson,
};

use super::MemoryStore;
use crate::persistence::traits::CourseRepository;
use crate::persistence::{clamp_progress, new_id, now, StoreError};

impl CourseRepository for MemoryStore {
    async fn create_course(&self, new_course: NewCourse) -> Result<Course, StoreError> {
        let mut state = self.state.write().await;
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
        state.courses.insert(course.id.clone(), course.clone());
        Ok(course)
    }

    async fn get_course(&self, id: &str) -> Result<Option<Course>, StoreError> {
        let state = self.state.read().await;
        Ok(state.courses.get(id).cloned())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        let state = self.state.read().await;
        let mut courses: Vec<Course> = state
            .courses
            .values()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        courses.sort_by(|a, b| {
            a.level
                .rank()
                .cmp(&b.level.rank())
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(courses)
    }

    async fn update_course(
        &self,
        id: &str,
        update: CourseUpdate,
    ) -> Result<Option<Course>, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.courses.get_mut(id).map(|course| {
            if let Some(title) = update.title {
                course.title = title;
            }
            if let Some(description) = update.description {
                course.description = description;
            }
            if let Some(level) = update.level {
                course.level = level;
            }
            if let Some(rating) = update.rating {
                course.rating = Some(rating);
            }
            if let Some(price) = update.price {
                course.price = price;
            }
            if let Some(is_active) = update.is_active {
                course.is_active = is_active;
            }
            course.clone()
        }))
    }

    async fn create_lesson(&self, new_lesson: NewLesson) -> Result<Lesson, StoreError> {
        let mut state = self.state.write().await;
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
        state.lessons.insert(lesson.id.clone(), lesson.clone());
        Ok(lesson)
    }

    async fn get_lesson(&self, id: &str) -> Result<Option<Lesson>, StoreError> {
        let state = self.state.read().await;
        Ok(state.lessons.get(id).cloned())
    }

    async fn list_lessons(&self, course_id: &str) -> Result<Vec<Lesson>, StoreError> {
        let state = self.state.read().await;
        let mut lessons: Vec<Lesson> = state
            .lessons
            .values()
            .filter(|l| l.course_id == course_id && l.is_active)
            .cloned()
            .collect();
        lessons.sort_by_key(|l| l.order);
        Ok(lessons)
    }

    async fn enroll(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>, StoreError> {
        // One write guard covers the existence checks, the insert and the
        // student-counter increment, so a concurrent second enroll observes
        // the first one's record instead of double-counting.
        let mut state = self.state.write().await;

        if !state.users.contains_key(user_id) {
            return Ok(None);
        }
        if !state.courses.contains_key(course_id) {
            return Ok(None);
        }

        let key = (user_id.to_string(), course_id.to_string());
        if let Some(existing) = state.enrollments.get(&key) {
            return Ok(Some(existing.clone()));
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
        state.enrollments.insert(key, enrollment.clone());
        if let Some(course) = state.courses.get_mut(course_id) {
            course.students += 1;
        }
        Ok(Some(enrollment))
    }

    async fn get_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>, StoreError> {
        let state = self.state.read().await;
        let key = (user_id.to_string(), course_id.to_string());
        Ok(state.enrollments.get(&key).cloned())
    }

    async fn list_enrollments(&self, user_id: &str) -> Result<Vec<Enrollment>, StoreError> {
        let state = self.state.read().await;
        let mut enrollments: Vec<Enrollment> = state
            .enrollments
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        enrollments.sort_by(|a, b| b.enrolled_at.cmp(&a.enrolled_at));
        Ok(enrollments)
    }

    async fn update_enrollment_progress(
        &self,
        user_id: &str,
        course_id: &str,
        progress: i64,
        time_spent_delta: Option<i64>,
    ) -> Result<Option<Enrollment>, StoreError> {
        let mut state = self.state.write().await;
        let key = (user_id.to_string(), course_id.to_string());
        Ok(state.enrollments.get_mut(&key).map(|enrollment| {
            enrollment.progress = clamp_progress(progress);
            if let Some(delta) = time_spent_delta {
                enrollment.time_spent_minutes += delta.max(0);
            }
            enrollment.last_accessed_at = now();
            enrollment.clone()
        }))
    }

    async fn complete_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>, StoreError> {
        let mut state = self.state.write().await;
        let key = (user_id.to_string(), course_id.to_string());
        Ok(state.enrollments.get_mut(&key).map(|enrollment| {
            let timestamp = now();
            enrollment.progress = 100;
            enrollment.status = EnrollmentStatus::Completed;
            if enrollment.completed_at.is_none() {
                enrollment.completed_at = Some(timestamp);
            }
            enrollment.last_accessed_at = timestamp;
            enrollment.clone()
        }))
    }

    async fn update_lesson_progress(
        &self,
        enrollment_id: &str,
        lesson_id: &str,
        user_id: &str,
        completed: bool,
        time_spent_delta: Option<i64>,
    ) -> Result<Option<LessonProgress>, StoreError> {
        let mut state = self.state.write().await;

        // A missing parent enrollment is ordinary absence.
        if !state.enrollments.values().any(|e| e.id == enrollment_id) {
            return Ok(None);
        }

        let timestamp = now();
        let key = (
            enrollment_id.to_string(),
            lesson_id.to_string(),
            user_id.to_string(),
        );
        let record = state
            .lesson_progress
            .entry(key)
            .or_insert_with(|| LessonProgress {
                id: new_id(),
                enrollment_id: enrollment_id.to_string(),
                lesson_id: lesson_id.to_string(),
                user_id: user_id.to_string(),
                completed: false,
                completed_at: None,
                time_spent_minutes: 0,
                last_accessed_at: timestamp,
            });

        if completed && !record.completed {
            // The one-way false→true edge: completed_at is stamped here and
            // never re-stamped or cleared.
            record.completed = true;
            record.completed_at = Some(timestamp);
        }
        if let Some(delta) = time_spent_delta {
            record.time_spent_minutes += delta.max(0);
        }
        record.last_accessed_at = timestamp;
        let record = record.clone();

        if let Some(enrollment) = state
            .enrollments
            .values_mut()
            .find(|e| e.id == enrollment_id)
        {
            enrollment.last_accessed_at = timestamp;
        }

        Ok(Some(record))
    }

    async fn list_lesson_progress(
        &self,
        enrollment_id: &str,
    ) -> Result<Vec<LessonProgress>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .lesson_progress
            .values()
            .filter(|p| p.enrollment_id == enrollment_id)
            .cloned()
            .collect())
    }
}
