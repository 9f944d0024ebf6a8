//! In-memory storage backend.
//!
//! All records live in maps keyed by their generated identifiers (or their
//! natural unique tuple, for the upserted families) behind a single
//! `tokio::sync::RwLock`. Every compound operation — enroll, activity
//! tracking, lesson-progress and teaser-attempt upserts — runs under one
//! write guard, which is what gives this backend the same atomicity
//! guarantees the sqlite backend gets from transactions and
//! `ON CONFLICT` upserts.
//!
//! The backend is process-local; it is the startup fallback when the sqlite
//! database cannot be opened, and the substitution point for tests.

mod activity;
mod challenges;
mod contests;
mod courses;
mod users;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use entities::{
    BrainTeaser, BrainTeaserAttempt, Contest, Course, Enrollment, Lesson, LessonProgress,
    Marathon, MarathonParticipant, Problem, QuizAttempt, QuizQuestion, Submission,
    TypingChallenge, TypingScore, User, UserActivity,
};
use tokio::sync::RwLock;

#[derive(Default)]
pub(super) struct State {
    pub(super) users: HashMap<String, User>,
    pub(super) contests: HashMap<String, Contest>,
    pub(super) problems: HashMap<String, Problem>,
    pub(super) submissions: HashMap<String, Submission>,
    pub(super) courses: HashMap<String, Course>,
    pub(super) lessons: HashMap<String, Lesson>,
    /// Keyed by (user_id, course_id) — the natural unique tuple.
    pub(super) enrollments: HashMap<(String, String), Enrollment>,
    /// Keyed by (enrollment_id, lesson_id, user_id).
    pub(super) lesson_progress: HashMap<(String, String, String), LessonProgress>,
    /// Keyed by (user_id, day). Exactly one record per user per day.
    pub(super) activity: HashMap<(String, NaiveDate), UserActivity>,
    pub(super) typing_challenges: HashMap<String, TypingChallenge>,
    /// Append-only, in recording order.
    pub(super) typing_scores: Vec<TypingScore>,
    pub(super) quiz_questions: HashMap<String, QuizQuestion>,
    /// Append-only, in recording order.
    pub(super) quiz_attempts: Vec<QuizAttempt>,
    pub(super) brain_teasers: HashMap<String, BrainTeaser>,
    /// Keyed by (user_id, teaser_id).
    pub(super) teaser_attempts: HashMap<(String, String), BrainTeaserAttempt>,
    pub(super) marathons: HashMap<String, Marathon>,
    /// Keyed by (marathon_id, user_id).
    pub(super) marathon_participants: HashMap<(String, String), MarathonParticipant>,
}

/// Process-memory implementation of the storage contract.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub(super) state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}
