//! Derived view records returned by the aggregation operations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::BrainTeaserAttempt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TypingStats {
    pub completed: i64,
    /// Average wpm across all recorded races, rounded. 0 when no races.
    pub average_wpm: i64,
    pub best_wpm: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizStats {
    pub completed: i64,
    /// Average score across all attempts, rounded. 0 when no attempts.
    pub average_score: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TeaserStats {
    pub solved: i64,
}

/// Per-user rollup of all challenge activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChallengeStats {
    pub typing: TypingStats,
    pub quiz: QuizStats,
    pub brain_teasers: TeaserStats,
}

/// One row of the typing leaderboard: a score joined with the submitting
/// user's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingLeaderboardEntry {
    pub user_id: String,
    pub username: String,
    pub wpm: f64,
    pub accuracy: f64,
    pub recorded_at: DateTime<Utc>,
}

/// One calendar cell of a user's brain-teaser history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeaserCalendarEntry {
    pub date: NaiveDate,
    pub solved: bool,
}

/// Result of submitting a brain-teaser answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeaserSubmissionOutcome {
    pub correct: bool,
    pub attempt: BrainTeaserAttempt,
}

/// Result of requesting a brain-teaser hint. `hint` is `None` once the
/// teaser's hints are exhausted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeaserHintOutcome {
    pub hint: Option<String>,
    pub attempt: BrainTeaserAttempt,
}
