//! Shared decode helpers for SQLite ↔ domain type conversions.
//!
//! Enum columns are stored as the strings enforced by the schema's CHECK
//! constraints; decoding falls back to the entity's default-ish variant
//! rather than failing, matching the write-side guarantee that only valid
//! strings are ever inserted. List-valued fields are JSON TEXT.

use entities::{
    ContestStatus, CourseLevel, Difficulty, EnrollmentStatus, LessonKind, MarathonStatus, Role,
    SubmissionStatus,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::persistence::StoreError;

pub fn decode_role(s: &str) -> Role {
    Role::parse(s).unwrap_or(Role::User)
}

pub fn decode_contest_status(s: &str) -> ContestStatus {
    ContestStatus::parse(s).unwrap_or(ContestStatus::Upcoming)
}

pub fn decode_difficulty(s: &str) -> Difficulty {
    Difficulty::parse(s).unwrap_or(Difficulty::Easy)
}

pub fn decode_submission_status(s: &str) -> SubmissionStatus {
    SubmissionStatus::parse(s).unwrap_or(SubmissionStatus::Pending)
}

pub fn decode_course_level(s: &str) -> CourseLevel {
    CourseLevel::parse(s).unwrap_or(CourseLevel::Beginner)
}

pub fn decode_lesson_kind(s: &str) -> LessonKind {
    LessonKind::parse(s).unwrap_or(LessonKind::Theory)
}

pub fn decode_enrollment_status(s: &str) -> EnrollmentStatus {
    EnrollmentStatus::parse(s).unwrap_or(EnrollmentStatus::Active)
}

pub fn decode_marathon_status(s: &str) -> MarathonStatus {
    MarathonStatus::parse(s).unwrap_or(MarathonStatus::Upcoming)
}

/// Encode a list-valued field as a JSON TEXT column.
pub fn encode_json<T: Serialize>(value: &T) -> Result<String, StoreError> {
    Ok(serde_json::to_string(value)?)
}

/// Decode a JSON TEXT column back into its list value.
pub fn decode_json<T: DeserializeOwned>(s: &str) -> Result<T, StoreError> {
    Ok(serde_json::from_str(s)?)
}

/// True when the error is a violated UNIQUE constraint; `message` narrows
/// it to a specific index (sqlite reports "UNIQUE constraint failed:
/// table.column").
pub fn is_unique_violation(err: &sqlx::Error, message: &str) -> bool {
    match err.as_database_error() {
        Some(db_err) => {
            db_err.is_unique_violation() && db_err.message().contains(message)
        }
        None => false,
    }
}

/// True when the error is a violated foreign key — a missing parent row,
/// surfaced to callers as ordinary absence.
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map_or(false, |db_err| db_err.is_foreign_key_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_codecs_roundtrip() {
        for status in [
            ContestStatus::Upcoming,
            ContestStatus::Live,
            ContestStatus::Completed,
        ] {
            assert_eq!(decode_contest_status(status.as_str()), status);
        }
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(decode_difficulty(difficulty.as_str()), difficulty);
        }
        for status in [
            SubmissionStatus::Pending,
            SubmissionStatus::Accepted,
            SubmissionStatus::WrongAnswer,
        ] {
            assert_eq!(decode_submission_status(status.as_str()), status);
        }
        for level in [
            CourseLevel::Beginner,
            CourseLevel::Intermediate,
            CourseLevel::Advanced,
        ] {
            assert_eq!(decode_course_level(level.as_str()), level);
        }
        for kind in [LessonKind::Video, LessonKind::Theory, LessonKind::Quiz] {
            assert_eq!(decode_lesson_kind(kind.as_str()), kind);
        }
        for role in [Role::User, Role::Admin] {
            assert_eq!(decode_role(role.as_str()), role);
        }
    }

    #[test]
    fn unknown_strings_fall_back() {
        assert_eq!(decode_role("root"), Role::User);
        assert_eq!(decode_contest_status("paused"), ContestStatus::Upcoming);
        assert_eq!(decode_enrollment_status(""), EnrollmentStatus::Active);
        assert_eq!(decode_marathon_status("done"), MarathonStatus::Upcoming);
    }

    #[test]
    fn json_roundtrip() {
        let topics = vec!["arrays".to_string(), "graphs".to_string()];
        let encoded = encode_json(&topics).unwrap();
        let decoded: Vec<String> = decode_json(&encoded).unwrap();
        assert_eq!(decoded, topics);
    }
}
