use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContestStatus {
    Upcoming,
    Live,
    Completed,
}

impl ContestStatus {
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Accepted,
    WrongAnswer,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::WrongAnswer => "wrong_answer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "wrong_answer" => Some(Self::WrongAnswer),
            _ => None,
        }
    }
}

/// A contest. `start_time < end_time` is expected but not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contest {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ContestStatus,
    pub participants: i64,
    pub created_by: String,
}

/// Input for creating a contest. `status` defaults to `Upcoming`,
/// `participants` to 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub status: Option<ContestStatus>,
    pub created_by: String,
}

/// Partial update for a contest; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContestUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: Option<ContestStatus>,
    pub participants: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub contest_id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub points: i64,
    pub time_limit_ms: Option<i64>,
    pub memory_limit_kb: Option<i64>,
}

/// Input for creating a problem. `points` defaults to 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProblem {
    pub contest_id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub points: Option<i64>,
    #[serde(default)]
    pub time_limit_ms: Option<i64>,
    #[serde(default)]
    pub memory_limit_kb: Option<i64>,
}

/// A code submission. Created `Pending` with score 0; transitions exactly
/// once to a terminal status via the status-update operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub problem_id: String,
    pub user_id: String,
    pub contest_id: Option<String>,
    pub code: String,
    pub language: String,
    pub status: SubmissionStatus,
    pub score: i64,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubmission {
    pub problem_id: String,
    pub user_id: String,
    #[serde(default)]
    pub contest_id: Option<String>,
    pub code: String,
    pub language: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_match_serde_representation() {
        // The string codec and the serde rename must agree; the storage
        // layer writes as_str() and the boundary layer serializes with serde.
        for status in [
            SubmissionStatus::Pending,
            SubmissionStatus::Accepted,
            SubmissionStatus::WrongAnswer,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(SubmissionStatus::parse(status.as_str()), Some(status));
        }
        for status in [
            ContestStatus::Upcoming,
            ContestStatus::Live,
            ContestStatus::Completed,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn new_submission_defaults_optional_fields() {
        let input: NewSubmission = serde_json::from_str(
            r#"{"problem_id":"p1","user_id":"u1","code":"print(1)","language":"python"}"#,
        )
        .unwrap();
        assert_eq!(input.contest_id, None);
    }
}
