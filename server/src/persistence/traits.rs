//! Async repository trait definitions for the storage engine.
//!
//! Each trait abstracts over one entity family, allowing the in-memory and
//! sqlite backends to be used interchangeably. Methods return
//! `impl Future + Send` rather than using `async fn` so that the futures
//! are guaranteed `Send` — required by `tokio::spawn` in callers.
//!
//! Conventions shared by every method:
//! - point lookups and partial updates return `Ok(None)` for a missing id
//!   or key, never an error;
//! - `create_*` assigns a fresh id, fills defaulted fields and returns the
//!   full stored record;
//! - operations that touch a missing parent record resolve to `Ok(None)`
//!   instead of failing.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use entities::{
    BrainTeaser, BrainTeaserAttempt, ChallengeStats, Contest, ContestUpdate, Course, CourseUpdate,
    Enrollment, Lesson, LessonProgress, Marathon, MarathonParticipant, MarathonStatus,
    NewContest, NewCourse, NewLesson, NewMarathon, NewProblem, NewQuizAttempt, NewSubmission,
    NewTypingScore, NewUser, Problem, QuizAttempt, QuizQuestion, Submission, SubmissionStatus,
    TeaserCalendarEntry, TeaserHintOutcome, TeaserSubmissionOutcome, TypingChallenge,
    TypingLeaderboardEntry, TypingScore, User, UserActivity,
};

use super::StoreError;

/// Repository for user accounts.
///
/// Implementations must enforce username uniqueness and external-key
/// uniqueness (independently of each other) at write time, reporting
/// violations as [`StoreError::Conflict`].
pub trait UserRepository: Send + Sync {
    fn create_user(
        &self,
        new_user: NewUser,
    ) -> impl Future<Output = Result<User, StoreError>> + Send;
    fn get_user(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;
    fn get_user_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;
    fn get_user_by_external_key(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;
    fn update_user_streak(
        &self,
        id: &str,
        streak: i64,
        last_daily_solve: Option<DateTime<Utc>>,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;
}

/// Repository for contests, their problems and submissions.
pub trait ContestRepository: Send + Sync {
    fn create_contest(
        &self,
        new_contest: NewContest,
    ) -> impl Future<Output = Result<Contest, StoreError>> + Send;
    fn get_contest(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Contest>, StoreError>> + Send;
    /// All contests, ordered by start time ascending.
    fn list_contests(
        &self,
    ) -> impl Future<Output = Result<Vec<Contest>, StoreError>> + Send;
    fn update_contest(
        &self,
        id: &str,
        update: ContestUpdate,
    ) -> impl Future<Output = Result<Option<Contest>, StoreError>> + Send;

    fn create_problem(
        &self,
        new_problem: NewProblem,
    ) -> impl Future<Output = Result<Problem, StoreError>> + Send;
    fn get_problem(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Problem>, StoreError>> + Send;
    fn list_problems(
        &self,
        contest_id: &str,
    ) -> impl Future<Output = Result<Vec<Problem>, StoreError>> + Send;

    fn create_submission(
        &self,
        new_submission: NewSubmission,
    ) -> impl Future<Output = Result<Submission, StoreError>> + Send;
    fn get_submission(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Submission>, StoreError>> + Send;
    /// A user's submissions, most recent first.
    fn list_submissions(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Submission>, StoreError>> + Send;
    /// Set the verdict (and score, when given) of a submission. Logically a
    /// one-time transition; retrying the same terminal status is a no-op
    /// that yields the same final state.
    fn update_submission_status(
        &self,
        id: &str,
        status: SubmissionStatus,
        score: Option<i64>,
    ) -> impl Future<Output = Result<Option<Submission>, StoreError>> + Send;
}

/// Repository for the learning-management entities: courses, lessons,
/// enrollments and per-lesson progress.
///
/// Implementations must keep `enroll` idempotent per (user, course) and
/// atomic with the course student counter, and must stamp
/// `LessonProgress.completed_at` exactly once on the false→true edge.
pub trait CourseRepository: Send + Sync {
    fn create_course(
        &self,
        new_course: NewCourse,
    ) -> impl Future<Output = Result<Course, StoreError>> + Send;
    fn get_course(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Course>, StoreError>> + Send;
    /// Active courses only, ordered by level rank (beginner < intermediate
    /// < advanced) then title. The UI groups on this exact order.
    fn list_courses(
        &self,
    ) -> impl Future<Output = Result<Vec<Course>, StoreError>> + Send;
    fn update_course(
        &self,
        id: &str,
        update: CourseUpdate,
    ) -> impl Future<Output = Result<Option<Course>, StoreError>> + Send;

    fn create_lesson(
        &self,
        new_lesson: NewLesson,
    ) -> impl Future<Output = Result<Lesson, StoreError>> + Send;
    fn get_lesson(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Lesson>, StoreError>> + Send;
    /// Active lessons of a course, ordered by their sequence number.
    fn list_lessons(
        &self,
        course_id: &str,
    ) -> impl Future<Output = Result<Vec<Lesson>, StoreError>> + Send;

    /// Idempotent enroll: an existing (user, course) enrollment is returned
    /// unchanged; otherwise the enrollment is created and the course's
    /// student counter incremented by one, as a single logical unit.
    /// Missing user or course resolves to `Ok(None)`.
    fn enroll(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> impl Future<Output = Result<Option<Enrollment>, StoreError>> + Send;
    fn get_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> impl Future<Output = Result<Option<Enrollment>, StoreError>> + Send;
    /// A user's enrollments, most recently enrolled first.
    fn list_enrollments(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Enrollment>, StoreError>> + Send;
    /// Store a progress value (clamped to [0, 100]) and accumulate time
    /// spent. Bumps `last_accessed_at`. Does not change status; completion
    /// happens only through [`CourseRepository::complete_enrollment`].
    fn update_enrollment_progress(
        &self,
        user_id: &str,
        course_id: &str,
        progress: i64,
        time_spent_delta: Option<i64>,
    ) -> impl Future<Output = Result<Option<Enrollment>, StoreError>> + Send;
    /// Transition the enrollment to `completed` (terminal) with progress
    /// 100. Idempotent: `completed_at` is stamped once.
    fn complete_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> impl Future<Output = Result<Option<Enrollment>, StoreError>> + Send;

    /// Find-or-create upsert of the per-(enrollment, lesson, user) progress
    /// record. Time accumulates; `completed` is one-way and `completed_at`
    /// is stamped only on the false→true transition. Missing enrollment
    /// resolves to `Ok(None)`.
    fn update_lesson_progress(
        &self,
        enrollment_id: &str,
        lesson_id: &str,
        user_id: &str,
        completed: bool,
        time_spent_delta: Option<i64>,
    ) -> impl Future<Output = Result<Option<LessonProgress>, StoreError>> + Send;
    fn list_lesson_progress(
        &self,
        enrollment_id: &str,
    ) -> impl Future<Output = Result<Vec<LessonProgress>, StoreError>> + Send;
}

/// Repository for per-day user activity accumulators.
pub trait ActivityRepository: Send + Sync {
    /// Additive upsert of today's record for the user. Concurrent calls for
    /// the same (user, day) must all be reflected — the counters only ever
    /// grow and are never overwritten.
    fn track_activity(
        &self,
        user_id: &str,
        minutes_delta: i64,
        questions_delta: i64,
    ) -> impl Future<Output = Result<UserActivity, StoreError>> + Send;
    fn get_activity(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> impl Future<Output = Result<Option<UserActivity>, StoreError>> + Send;
    /// A user's activity records, newest day first.
    fn list_activity(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<UserActivity>, StoreError>> + Send;
}

/// Repository for the gamified challenges: typing races, quiz rounds,
/// daily brain teasers and marathons, plus their aggregation views.
pub trait ChallengeRepository: Send + Sync {
    /// Insert-if-absent by the caller-supplied id (seed pools are
    /// re-seedable without duplication). Returns whether a row was inserted.
    fn put_typing_challenge(
        &self,
        challenge: TypingChallenge,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;
    fn list_typing_challenges(
        &self,
    ) -> impl Future<Output = Result<Vec<TypingChallenge>, StoreError>> + Send;
    /// Any one challenge of the pool (optionally filtered by language),
    /// picked uniformly. `Ok(None)` on an empty pool.
    fn random_typing_challenge(
        &self,
        language: Option<&str>,
    ) -> impl Future<Output = Result<Option<TypingChallenge>, StoreError>> + Send;
    fn record_typing_score(
        &self,
        new_score: NewTypingScore,
    ) -> impl Future<Output = Result<TypingScore, StoreError>> + Send;
    /// Top 10 scores by wpm descending, joined with the submitting user's
    /// name. Ties break toward the earliest recorded score.
    fn typing_leaderboard(
        &self,
    ) -> impl Future<Output = Result<Vec<TypingLeaderboardEntry>, StoreError>> + Send;

    /// Insert-if-absent by the caller-supplied id.
    fn put_quiz_question(
        &self,
        question: QuizQuestion,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;
    /// A random sample (without replacement) of the questions matching the
    /// exact topic and difficulty. Returns the whole pool when it is
    /// smaller than `count`.
    fn quiz_questions(
        &self,
        topic: &str,
        difficulty: entities::Difficulty,
        count: usize,
    ) -> impl Future<Output = Result<Vec<QuizQuestion>, StoreError>> + Send;
    fn record_quiz_attempt(
        &self,
        new_attempt: NewQuizAttempt,
    ) -> impl Future<Output = Result<QuizAttempt, StoreError>> + Send;

    /// Insert-if-absent by the caller-supplied id.
    fn put_brain_teaser(
        &self,
        teaser: BrainTeaser,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;
    fn get_teaser_for_date(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Option<BrainTeaser>, StoreError>> + Send;
    /// Record a submit against the (user, teaser) attempt: the attempt
    /// counter always increments, `solved` turns true on a correct answer
    /// and stays true afterwards. `Ok(None)` when the teaser is missing.
    fn submit_teaser_answer(
        &self,
        user_id: &str,
        teaser_id: &str,
        answer: &str,
    ) -> impl Future<Output = Result<Option<TeaserSubmissionOutcome>, StoreError>> + Send;
    /// Reveal the next progressive hint, bumping the attempt's hint counter
    /// monotonically (capped at the teaser's hint count).
    fn use_teaser_hint(
        &self,
        user_id: &str,
        teaser_id: &str,
    ) -> impl Future<Output = Result<Option<TeaserHintOutcome>, StoreError>> + Send;
    fn get_teaser_attempt(
        &self,
        user_id: &str,
        teaser_id: &str,
    ) -> impl Future<Output = Result<Option<BrainTeaserAttempt>, StoreError>> + Send;
    /// A user's attempts projected to {date, solved}, newest date first.
    fn teaser_calendar(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<TeaserCalendarEntry>, StoreError>> + Send;

    /// Rollup of all typing/quiz/teaser records for a user. Empty sets
    /// report zeroed stats, never an error.
    fn challenge_stats(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<ChallengeStats, StoreError>> + Send;

    fn create_marathon(
        &self,
        new_marathon: NewMarathon,
    ) -> impl Future<Output = Result<Marathon, StoreError>> + Send;
    fn get_marathon(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Marathon>, StoreError>> + Send;
    /// All marathons, ordered by start time ascending.
    fn list_marathons(
        &self,
    ) -> impl Future<Output = Result<Vec<Marathon>, StoreError>> + Send;
    fn update_marathon_status(
        &self,
        id: &str,
        status: MarathonStatus,
    ) -> impl Future<Output = Result<Option<Marathon>, StoreError>> + Send;
    /// Idempotent join keyed by (marathon, user). `Ok(None)` when the
    /// marathon is missing.
    fn join_marathon(
        &self,
        marathon_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<MarathonParticipant>, StoreError>> + Send;
    fn update_marathon_participant(
        &self,
        marathon_id: &str,
        user_id: &str,
        score: i64,
        rank: Option<i64>,
    ) -> impl Future<Output = Result<Option<MarathonParticipant>, StoreError>> + Send;
    /// Participants of a marathon, highest score first.
    fn list_marathon_participants(
        &self,
        marathon_id: &str,
    ) -> impl Future<Output = Result<Vec<MarathonParticipant>, StoreError>> + Send;
}

/// The full storage contract: what the route layer programs against.
pub trait Store:
    UserRepository + ContestRepository + CourseRepository + ActivityRepository + ChallengeRepository
{
}

impl<T> Store for T where
    T: UserRepository
        + ContestRepository
        + CourseRepository
        + ActivityRepository
        + ChallengeRepository
{
}
