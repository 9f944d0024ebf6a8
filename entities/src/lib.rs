//! Record definitions for the codearena storage core.
//!
//! Everything in this crate is plain data: the entity records owned by the
//! storage engine, the `New*` inputs used to create them, and the derived
//! view records returned by the aggregation operations. Relationships are
//! by id only; no record holds a live reference to another.

mod activity;
mod challenge;
mod contest;
mod course;
mod user;
mod views;

pub use activity::UserActivity;
pub use challenge::{
    BrainTeaser, BrainTeaserAttempt, Marathon, MarathonParticipant, MarathonStatus,
    NewMarathon, NewQuizAttempt, NewTypingScore, QuizAttempt, QuizQuestion, TypingChallenge,
    TypingScore,
};
pub use contest::{
    Contest, ContestStatus, ContestUpdate, Difficulty, NewContest, NewProblem, NewSubmission,
    Problem, Submission, SubmissionStatus,
};
pub use course::{
    Course, CourseLevel, CourseUpdate, Enrollment, EnrollmentStatus, Lesson, LessonKind,
    LessonProgress, LessonQuizItem, NewCourse, NewLesson,
};
pub use user::{NewUser, Role, User};
pub use views::{
    ChallengeStats, QuizStats, TeaserCalendarEntry, TeaserHintOutcome, TeaserStats,
    TeaserSubmissionOutcome, TypingLeaderboardEntry, TypingStats,
};
