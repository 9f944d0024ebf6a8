use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Difficulty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }

    /// Display rank used by course listing: beginner < intermediate <
    /// advanced. Unknown levels sort last at the storage layer.
    pub fn rank(self) -> u8 {
        match self {
            Self::Beginner => 0,
            Self::Intermediate => 1,
            Self::Advanced => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonKind {
    Video,
    Theory,
    Quiz,
}

impl LessonKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Theory => "theory",
            Self::Quiz => "quiz",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "video" => Some(Self::Video),
            "theory" => Some(Self::Theory),
            "quiz" => Some(Self::Quiz),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Active,
    Completed,
}

impl EnrollmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// A course. `students` counts first-time enrollments only; `is_active`
/// is the soft-delete flag — inactive courses drop out of listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub level: CourseLevel,
    pub difficulty: Difficulty,
    pub topics: Vec<String>,
    pub prerequisites: Option<String>,
    pub instructor: String,
    pub rating: Option<f64>,
    pub students: i64,
    pub price: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub level: CourseLevel,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub prerequisites: Option<String>,
    pub instructor: String,
    #[serde(default)]
    pub rating: Option<f64>,
    pub price: f64,
}

/// Partial update for a course; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub level: Option<CourseLevel>,
    pub rating: Option<f64>,
    pub price: Option<f64>,
    pub is_active: Option<bool>,
}

/// One quiz item embedded in a quiz lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonQuizItem {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: i64,
}

/// A lesson within a course. `order` defines the display sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub order: i64,
    pub duration_minutes: Option<i64>,
    pub video_url: Option<String>,
    pub kind: LessonKind,
    pub quiz_data: Option<Vec<LessonQuizItem>>,
    pub is_active: bool,
}

/// Input for creating a lesson. `kind` defaults to `Theory`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLesson {
    pub course_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub content: String,
    pub order: i64,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub kind: Option<LessonKind>,
    #[serde(default)]
    pub quiz_data: Option<Vec<LessonQuizItem>>,
}

/// The relationship record linking a user to a course they have joined.
/// Unique per (user_id, course_id); creating it is idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub progress: i64,
    pub time_spent_minutes: i64,
    pub status: EnrollmentStatus,
    pub last_accessed_at: DateTime<Utc>,
}

/// Per-user, per-lesson completion tracking scoped to one enrollment.
/// Unique per (enrollment_id, lesson_id, user_id); `completed` is a one-way
/// false→true transition and `completed_at` is stamped exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonProgress {
    pub id: String,
    pub enrollment_id: String,
    pub lesson_id: String,
    pub user_id: String,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub time_spent_minutes: i64,
    pub last_accessed_at: DateTime<Utc>,
}
