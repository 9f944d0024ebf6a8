use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::Difficulty;

/// Static typing-race content, seeded at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingChallenge {
    pub id: String,
    pub title: String,
    pub language: String,
    pub difficulty: Difficulty,
    pub snippet: String,
}

/// One finished typing race. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingScore {
    pub id: String,
    pub user_id: String,
    pub challenge_id: String,
    pub wpm: f64,
    pub accuracy: f64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTypingScore {
    pub user_id: String,
    pub challenge_id: String,
    pub wpm: f64,
    pub accuracy: f64,
}

/// Static quiz-pool content, seeded at startup. `correct_answer` indexes
/// into `options`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: i64,
}

/// One finished quiz round. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: String,
    pub user_id: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub score: i64,
    pub total: i64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuizAttempt {
    pub user_id: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub score: i64,
    pub total: i64,
}

/// The daily brain teaser. One per calendar date, with up to three
/// progressive hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainTeaser {
    pub id: String,
    pub date: NaiveDate,
    pub question: String,
    pub hints: Vec<String>,
    pub solution: String,
    pub explanation: Option<String>,
}

/// Per-(user, teaser) attempt tracking. `attempts` increments on every
/// submit; `solved` is sticky — a later wrong answer never clears it;
/// `solved_at` is stamped once on the first correct submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainTeaserAttempt {
    pub id: String,
    pub user_id: String,
    pub teaser_id: String,
    pub hints_used: i64,
    pub attempts: i64,
    pub solved: bool,
    pub solved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarathonStatus {
    Upcoming,
    Live,
    Completed,
}

impl MarathonStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Live => "live",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "upcoming" => Some(Self::Upcoming),
            "live" => Some(Self::Live),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// A time-boxed multi-problem event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marathon {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub problem_ids: Vec<String>,
    pub status: MarathonStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMarathon {
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub problem_ids: Vec<String>,
}

/// Per-user standing within a marathon. Unique per (marathon_id, user_id);
/// joining is idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarathonParticipant {
    pub id: String,
    pub marathon_id: String,
    pub user_id: String,
    pub score: i64,
    pub rank: Option<i64>,
    pub joined_at: DateTime<Utc>,
}
