//! Backend selection wrapper.
//!
//! The repository traits return `impl Future`, which rules out `dyn Store`;
//! [`Storage`] is the enum alternative. Callers hold a `Storage` and stay
//! oblivious to which backend was picked at startup.

use chrono::{DateTime, NaiveDate, Utc};
use entities::{
    BrainTeaser, BrainTeaserAttempt, ChallengeStats, Contest, ContestUpdate, Course, CourseUpdate,
    Difficulty, Enrollment, Lesson, LessonProgress, Marathon, MarathonParticipant, MarathonStatus,
    NewContest, NewCourse, NewLesson, NewMarathon, NewProblem, NewQuizAttempt, NewSubmission,
    NewTypingScore, NewUser, Problem, QuizAttempt, QuizQuestion, Submission, SubmissionStatus,
    TeaserCalendarEntry, TeaserHintOutcome, TeaserSubmissionOutcome, TypingChallenge,
    TypingLeaderboardEntry, TypingScore, User, UserActivity,
};

use super::memory::MemoryStore;
use super::sqlite::{Database, SqliteStore};
use super::traits::{
    ActivityRepository, ChallengeRepository, ContestRepository, CourseRepository, UserRepository,
};
use super::StoreError;
use crate::config::{self, BackendKind};

/// The storage backend selected at startup.
#[derive(Clone)]
pub enum Storage {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Storage {
    /// Select and initialize the backend from configuration. A sqlite
    /// database that cannot be opened degrades to the in-memory backend
    /// with a warning instead of aborting startup.
    pub async fn init() -> Self {
        if config::get_backend_kind() == BackendKind::Memory {
            tracing::info!("using in-memory storage backend");
            return Self::Memory(MemoryStore::new());
        }

        let path = config::get_database_path();
        match Database::open(&path).await {
            Ok(db) => {
                tracing::info!(path = %path.display(), "sqlite storage ready");
                Self::Sqlite(SqliteStore::new(&db))
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %path.display(),
                    "could not open sqlite database, falling back to in-memory storage"
                );
                Self::Memory(MemoryStore::new())
            }
        }
    }
}

macro_rules! delegate {
    ($self:ident . $method:ident ( $($arg:expr),* )) => {
        match $self {
            Storage::Memory(store) => store.$method($($arg),*).await,
            Storage::Sqlite(store) => store.$method($($arg),*).await,
        }
    };
}

impl UserRepository for Storage {
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        delegate!(self.create_user(new_user))
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        delegate!(self.get_user(id))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        delegate!(self.get_user_by_username(username))
    }

    async fn get_user_by_external_key(&self, key: &str) -> Result<Option<User>, StoreError> {
        delegate!(self.get_user_by_external_key(key))
    }

    async fn update_user_streak(
        &self,
        id: &str,
        streak: i64,
        last_daily_solve: Option<DateTime<Utc>>,
    ) -> Result<Option<User>, StoreError> {
        delegate!(self.update_user_streak(id, streak, last_daily_solve))
    }
}

impl ContestRepository for Storage {
    async fn create_contest(&self, new_contest: NewContest) -> Result<Contest, StoreError> {
        delegate!(self.create_contest(new_contest))
    }

    async fn get_contest(&self, id: &str) -> Result<Option<Contest>, StoreError> {
        delegate!(self.get_contest(id))
    }

    async fn list_contests(&self) -> Result<Vec<Contest>, StoreError> {
        delegate!(self.list_contests())
    }

    async fn update_contest(
        &self,
        id: &str,
        update: ContestUpdate,
    ) -> Result<Option<Contest>, StoreError> {
        delegate!(self.update_contest(id, update))
    }

    async fn create_problem(&self, new_problem: NewProblem) -> Result<Problem, StoreError> {
        delegate!(self.create_problem(new_problem))
    }

    async fn get_problem(&self, id: &str) -> Result<Option<Problem>, StoreError> {
        delegate!(self.get_problem(id))
    }

    async fn list_problems(&self, contest_id: &str) -> Result<Vec<Problem>, StoreError> {
        delegate!(self.list_problems(contest_id))
    }

    async fn create_submission(
        &self,
        new_submission: NewSubmission,
    ) -> Result<Submission, StoreError> {
        delegate!(self.create_submission(new_submission))
    }

    async fn get_submission(&self, id: &str) -> Result<Option<Submission>, StoreError> {
        delegate!(self.get_submission(id))
    }

    async fn list_submissions(&self, user_id: &str) -> Result<Vec<Submission>, StoreError> {
        delegate!(self.list_submissions(user_id))
    }

    async fn update_submission_status(
        &self,
        id: &str,
        status: SubmissionStatus,
        score: Option<i64>,
    ) -> Result<Option<Submission>, StoreError> {
        delegate!(self.update_submission_status(id, status, score))
    }
}

impl CourseRepository for Storage {
    async fn create_course(&self, new_course: NewCourse) -> Result<Course, StoreError> {
        delegate!(self.create_course(new_course))
    }

    async fn get_course(&self, id: &str) -> Result<Option<Course>, StoreError> {
        delegate!(self.get_course(id))
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        delegate!(self.list_courses())
    }

    async fn update_course(
        &self,
        id: &str,
        update: CourseUpdate,
    ) -> Result<Option<Course>, StoreError> {
        delegate!(self.update_course(id, update))
    }

    async fn create_lesson(&self, new_lesson: NewLesson) -> Result<Lesson, StoreError> {
        delegate!(self.create_lesson(new_lesson))
    }

    async fn get_lesson(&self, id: &str) -> Result<Option<Lesson>, StoreError> {
        delegate!(self.get_lesson(id))
    }

    async fn list_lessons(&self, course_id: &str) -> Result<Vec<Lesson>, StoreError> {
        delegate!(self.list_lessons(course_id))
    }

    async fn enroll(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>, StoreError> {
        delegate!(self.enroll(user_id, course_id))
    }

    async fn get_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>, StoreError> {
        delegate!(self.get_enrollment(user_id, course_id))
    }

    async fn list_enrollments(&self, user_id: &str) -> Result<Vec<Enrollment>, StoreError> {
        delegate!(self.list_enrollments(user_id))
    }

    async fn update_enrollment_progress(
        &self,
        user_id: &str,
        course_id: &str,
        progress: i64,
        time_spent_delta: Option<i64>,
    ) -> Result<Option<Enrollment>, StoreError> {
        delegate!(self.update_enrollment_progress(user_id, course_id, progress, time_spent_delta))
    }

    async fn complete_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>, StoreError> {
        delegate!(self.complete_enrollment(user_id, course_id))
    }

    async fn update_lesson_progress(
        &self,
        enrollment_id: &str,
        lesson_id: &str,
        user_id: &str,
        completed: bool,
        time_spent_delta: Option<i64>,
    ) -> Result<Option<LessonProgress>, StoreError> {
        delegate!(self.update_lesson_progress(
            enrollment_id,
            lesson_id,
            user_id,
            completed,
            time_spent_delta
        ))
    }

    async fn list_lesson_progress(
        &self,
        enrollment_id: &str,
    ) -> Result<Vec<LessonProgress>, StoreError> {
        delegate!(self.list_lesson_progress(enrollment_id))
    }
}

impl ActivityRepository for Storage {
    async fn track_activity(
        &self,
        user_id: &str,
        minutes_delta: i64,
        questions_delta: i64,
    ) -> Result<UserActivity, StoreError> {
        delegate!(self.track_activity(user_id, minutes_delta, questions_delta))
    }

    async fn get_activity(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Option<UserActivity>, StoreError> {
        delegate!(self.get_activity(user_id, day))
    }

    async fn list_activity(&self, user_id: &str) -> Result<Vec<UserActivity>, StoreError> {
        delegate!(self.list_activity(user_id))
    }
}

impl ChallengeRepository for Storage {
    async fn put_typing_challenge(
        &self,
        challenge: TypingChallenge,
    ) -> Result<bool, StoreError> {
        delegate!(self.put_typing_challenge(challenge))
    }

    async fn list_typing_challenges(&self) -> Result<Vec<TypingChallenge>, StoreError> {
        delegate!(self.list_typing_challenges())
    }

    async fn random_typing_challenge(
        &self,
        language: Option<&str>,
    ) -> Result<Option<TypingChallenge>, StoreError> {
        delegate!(self.random_typing_challenge(language))
    }

    async fn record_typing_score(
        &self,
        new_score: NewTypingScore,
    ) -> Result<TypingScore, StoreError> {
        delegate!(self.record_typing_score(new_score))
    }

    async fn typing_leaderboard(&self) -> Result<Vec<TypingLeaderboardEntry>, StoreError> {
        delegate!(self.typing_leaderboard())
    }

    async fn put_quiz_question(&self, question: QuizQuestion) -> Result<bool, StoreError> {
        delegate!(self.put_quiz_question(question))
    }

    async fn quiz_questions(
        &self,
        topic: &str,
        difficulty: Difficulty,
        count: usize,
    ) -> Result<Vec<QuizQuestion>, StoreError> {
        delegate!(self.quiz_questions(topic, difficulty, count))
    }

    async fn record_quiz_attempt(
        &self,
        new_attempt: NewQuizAttempt,
    ) -> Result<QuizAttempt, StoreError> {
        delegate!(self.record_quiz_attempt(new_attempt))
    }

    async fn put_brain_teaser(&self, teaser: BrainTeaser) -> Result<bool, StoreError> {
        delegate!(self.put_brain_teaser(teaser))
    }

    async fn get_teaser_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<BrainTeaser>, StoreError> {
        delegate!(self.get_teaser_for_date(date))
    }

    async fn submit_teaser_answer(
        &self,
        user_id: &str,
        teaser_id: &str,
        answer: &str,
    ) -> Result<Option<TeaserSubmissionOutcome>, StoreError> {
        delegate!(self.submit_teaser_answer(user_id, teaser_id, answer))
    }

    async fn use_teaser_hint(
        &self,
        user_id: &str,
        teaser_id: &str,
    ) -> Result<Option<TeaserHintOutcome>, StoreError> {
        delegate!(self.use_teaser_hint(user_id, teaser_id))
    }

    async fn get_teaser_attempt(
        &self,
        user_id: &str,
        teaser_id: &str,
    ) -> Result<Option<BrainTeaserAttempt>, StoreError> {
        delegate!(self.get_teaser_attempt(user_id, teaser_id))
    }

    async fn teaser_calendar(
        &self,
        user_id: &str,
    ) -> Result<Vec<TeaserCalendarEntry>, StoreError> {
        delegate!(self.teaser_calendar(user_id))
    }

    async fn challenge_stats(&self, user_id: &str) -> Result<ChallengeStats, StoreError> {
        delegate!(self.challenge_stats(user_id))
    }

    async fn create_marathon(&self, new_marathon: NewMarathon) -> Result<Marathon, StoreError> {
        delegate!(self.create_marathon(new_marathon))
    }

    async fn get_marathon(&self, id: &str) -> Result<Option<Marathon>, StoreError> {
        delegate!(self.get_marathon(id))
    }

    async fn list_marathons(&self) -> Result<Vec<Marathon>, StoreError> {
        delegate!(self.list_marathons())
    }

    async fn update_marathon_status(
        &self,
        id: &str,
        status: MarathonStatus,
    ) -> Result<Option<Marathon>, StoreError> {
        delegate!(self.update_marathon_status(id, status))
    }

    async fn join_marathon(
        &self,
        marathon_id: &str,
        user_id: &str,
    ) -> Result<Option<MarathonParticipant>, StoreError> {
        delegate!(self.join_marathon(marathon_id, user_id))
    }

    async fn update_marathon_participant(
        &self,
        marathon_id: &str,
        user_id: &str,
        score: i64,
        rank: Option<i64>,
    ) -> Result<Option<MarathonParticipant>, StoreError> {
        delegate!(self.update_marathon_participant(marathon_id, user_id, score, rank))
    }

    async fn list_marathon_participants(
        &self,
        marathon_id: &str,
    ) -> Result<Vec<MarathonParticipant>, StoreError> {
        delegate!(self.list_marathon_participants(marathon_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entities::Role;

    #[tokio::test]
    async fn storage_delegates_to_wrapped_backend() {
        let storage = Storage::Memory(MemoryStore::new());
        let user = storage
            .create_user(NewUser {
                username: "ada".into(),
                password: "hash".into(),
                role: Some(Role::Admin),
                external_key: None,
            })
            .await
            .unwrap();

        let found = storage.get_user(&user.id).await.unwrap();
        assert_eq!(found, Some(user));
    }
}
