//! SQLite-backed contest, problem and submission repository.

use chrono::{DateTime, Utc};
use entities::{
    Contest, ContestStatus, ContestUpdate, NewContest, NewProblem, NewSubmission, Problem,
    Submission, SubmissionStatus,
};

use super::helpers::{decode_contest_status, decode_difficulty, decode_submission_status};
use super::SqliteStore;
use crate::persistence::traits::ContestRepository;
use crate::persistence::{new_id, now, StoreError};

type ContestRow = (
    String,
    String,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
    String,
    i64,
    String,
);

fn contest_from_row(row: ContestRow) -> Contest {
    let (id, title, description, start_time, end_time, status, participants, created_by) = row;
    Contest {
        id,
        title,
        description,
        start_time,
        end_time,
        status: decode_contest_status(&status),
        participants,
        created_by,
    }
}

type ProblemRow = (
    String,
    String,
    String,
    String,
    String,
    i64,
    Option<i64>,
    Option<i64>,
);

fn problem_from_row(row: ProblemRow) -> Problem {
    let (id, contest_id, title, description, difficulty, points, time_limit_ms, memory_limit_kb) =
        row;
    Problem {
        id,
        contest_id,
        title,
        description,
        difficulty: decode_difficulty(&difficulty),
        points,
        time_limit_ms,
        memory_limit_kb,
    }
}

type SubmissionRow = (
    String,
    String,
    String,
    Option<String>,
    String,
    String,
    String,
    i64,
    DateTime<Utc>,
);

fn submission_from_row(row: SubmissionRow) -> Submission {
    let (id, problem_id, user_id, contest_id, code, language, status, score, submitted_at) = row;
    Submission {
        id,
        problem_id,
        user_id,
        contest_id,
        code,
        language,
        status: decode_submission_status(&status),
        score,
        submitted_at,
    }
}

const CONTEST_COLUMNS: &str =
    "id, title, description, start_time, end_time, status, participants, created_by";
const PROBLEM_COLUMNS: &str =
    "id, contest_id, title, description, difficulty, points, time_limit_ms, memory_limit_kb";
const SUBMISSION_COLUMNS: &str =
    "id, problem_id, user_id, contest_id, code, language, status, score, submitted_at";

impl ContestRepository for SqliteStore {
    async fn create_contest(&self, new_contest: NewContest) -> Result<Contest, StoreError> {
        let contest = Contest {
            id: new_id(),
            title: new_contest.title,
            description: new_contest.description,
            start_time: new_contest.start_time,
            end_time: new_contest.end_time,
            status: new_contest.status.unwrap_or(ContestStatus::Upcoming),
            participants: 0,
            created_by: new_contest.created_by,
        };

        sqlx::query(
            r#"
            INSERT INTO contests (id, title, description, start_time, end_time, status, participants, created_by)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&contest.id)
        .bind(&contest.title)
        .bind(&contest.description)
        .bind(contest.start_time)
        .bind(contest.end_time)
        .bind(contest.status.as_str())
        .bind(contest.participants)
        .bind(&contest.created_by)
        .execute(self.pool())
        .await?;

        Ok(contest)
    }

    async fn get_contest(&self, id: &str) -> Result<Option<Contest>, StoreError> {
        let row: Option<ContestRow> =
            sqlx::query_as(&format!("SELECT {CONTEST_COLUMNS} FROM contests WHERE id = ?"))
                .bind(id)
                .fetch_optional(self.pool())
                .await?;
        Ok(row.map(contest_from_row))
    }

    async fn list_contests(&self) -> Result<Vec<Contest>, StoreError> {
        let rows: Vec<ContestRow> = sqlx::query_as(&format!(
            "SELECT {CONTEST_COLUMNS} FROM contests ORDER BY start_time ASC"
        ))
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(contest_from_row).collect())
    }

    async fn update_contest(
        &self,
        id: &str,
        update: ContestUpdate,
    ) -> Result<Option<Contest>, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE contests
            SET title = COALESCE(?, title),
                description = COALESCE(?, description),
                start_time = COALESCE(?, start_time),
                end_time = COALESCE(?, end_time),
                status = COALESCE(?, status),
                participants = MAX(COALESCE(?, participants), 0)
            WHERE id = ?
            "#,
        )
        .bind(update.title)
        .bind(update.description)
        .bind(update.start_time)
        .bind(update.end_time)
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.participants)
        .bind(id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_contest(id).await
    }

    async fn create_problem(&self, new_problem: NewProblem) -> Result<Problem, StoreError> {
        let problem = Problem {
            id: new_id(),
            contest_id: new_problem.contest_id,
            title: new_problem.title,
            description: new_problem.description,
            difficulty: new_problem.difficulty,
            points: new_problem.points.unwrap_or(100),
            time_limit_ms: new_problem.time_limit_ms,
            memory_limit_kb: new_problem.memory_limit_kb,
        };

        sqlx::query(
            r#"
            INSERT INTO problems (id, contest_id, title, description, difficulty, points, time_limit_ms, memory_limit_kb)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&problem.id)
        .bind(&problem.contest_id)
        .bind(&problem.title)
        .bind(&problem.description)
        .bind(problem.difficulty.as_str())
        .bind(problem.points)
        .bind(problem.time_limit_ms)
        .bind(problem.memory_limit_kb)
        .execute(self.pool())
        .await?;

        Ok(problem)
    }

    async fn get_problem(&self, id: &str) -> Result<Option<Problem>, StoreError> {
        let row: Option<ProblemRow> =
            sqlx::query_as(&format!("SELECT {PROBLEM_COLUMNS} FROM problems WHERE id = ?"))
                .bind(id)
                .fetch_optional(self.pool())
                .await?;
        Ok(row.map(problem_from_row))
    }

    async fn list_problems(&self, contest_id: &str) -> Result<Vec<Problem>, StoreError> {
        let rows: Vec<ProblemRow> = sqlx::query_as(&format!(
            "SELECT {PROBLEM_COLUMNS} FROM problems WHERE contest_id = ?"
        ))
        .bind(contest_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(problem_from_row).collect())
    }

    async fn create_submission(
        &self,
        new_submission: NewSubmission,
    ) -> Result<Submission, StoreError> {
        let submission = Submission {
            id: new_id(),
            problem_id: new_submission.problem_id,
            user_id: new_submission.user_id,
            contest_id: new_submission.contest_id,
            code: new_submission.code,
            language: new_submission.language,
            status: SubmissionStatus::Pending,
            score: 0,
            submitted_at: now(),
        };

        sqlx::query(
            r#"
            INSERT INTO submissions (id, problem_id, user_id, contest_id, code, language, status, score, submitted_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&submission.id)
        .bind(&submission.problem_id)
        .bind(&submission.user_id)
        .bind(&submission.contest_id)
        .bind(&submission.code)
        .bind(&submission.language)
        .bind(submission.status.as_str())
        .bind(submission.score)
        .bind(submission.submitted_at)
        .execute(self.pool())
        .await?;

        Ok(submission)
    }

    async fn get_submission(&self, id: &str) -> Result<Option<Submission>, StoreError> {
        let row: Option<SubmissionRow> = sqlx::query_as(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(submission_from_row))
    }

    async fn list_submissions(&self, user_id: &str) -> Result<Vec<Submission>, StoreError> {
        let rows: Vec<SubmissionRow> = sqlx::query_as(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE user_id = ? ORDER BY submitted_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(submission_from_row).collect())
    }

    async fn update_submission_status(
        &self,
        id: &str,
        status: SubmissionStatus,
        score: Option<i64>,
    ) -> Result<Option<Submission>, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE submissions
            SET status = ?,
                score = COALESCE(?, score)
            WHERE id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(score)
        .bind(id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_submission(id).await
    }
}
