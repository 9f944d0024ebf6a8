//! SQLite-backed challenge repository: typing races, quiz rounds, daily
//! brain teasers and marathons.
//!
//! Seed pools (`put_*`) are written with `INSERT OR IGNORE` keyed on the
//! caller-supplied id, so re-seeding is a no-op. Teaser attempt updates go
//! through `ON CONFLICT DO UPDATE` upserts keyed on the UNIQUE(user_id,
//! teaser_id) index, which keeps `solved` sticky and `solved_at`
//! stamped-once even under concurrent submits.

use chrono::{DateTime, NaiveDate, Utc};
use entities::{
    BrainTeaser, BrainTeaserAttempt, ChallengeStats, Difficulty, Marathon, MarathonParticipant,
    MarathonStatus, NewMarathon, NewQuizAttempt, NewTypingScore, QuizAttempt, QuizQuestion,
    TeaserCalendarEntry, TeaserHintOutcome, TeaserSubmissionOutcome, TypingChallenge,
    TypingLeaderboardEntry, TypingScore,
};

use super::helpers::{
    decode_difficulty, decode_json, decode_marathon_status, encode_json, is_foreign_key_violation,
};
use super::SqliteStore;
use crate::persistence::traits::ChallengeRepository;
use crate::persistence::{new_id, now, teaser_answer_matches, StoreError};
use crate::stats;

type TypingChallengeRow = (String, String, String, String, String);

fn typing_challenge_from_row(row: TypingChallengeRow) -> TypingChallenge {
    let (id, title, language, difficulty, snippet) = row;
    TypingChallenge {
        id,
        title,
        language,
        difficulty: decode_difficulty(&difficulty),
        snippet,
    }
}

type QuizQuestionRow = (String, String, String, String, String, i64);

fn quiz_question_from_row(row: QuizQuestionRow) -> Result<QuizQuestion, StoreError> {
    let (id, topic, difficulty, question, options, correct_answer) = row;
    Ok(QuizQuestion {
        id,
        topic,
        difficulty: decode_difficulty(&difficulty),
        question,
        options: decode_json(&options)?,
        correct_answer,
    })
}

type BrainTeaserRow = (String, NaiveDate, String, String, String, Option<String>);

fn brain_teaser_from_row(row: BrainTeaserRow) -> Result<BrainTeaser, StoreError> {
    let (id, date, question, hints, solution, explanation) = row;
    Ok(BrainTeaser {
        id,
        date,
        question,
        hints: decode_json(&hints)?,
        solution,
        explanation,
    })
}

type TeaserAttemptRow = (
    String,
    String,
    String,
    i64,
    i64,
    bool,
    Option<DateTime<Utc>>,
);

fn teaser_attempt_from_row(row: TeaserAttemptRow) -> BrainTeaserAttempt {
    let (id, user_id, teaser_id, hints_used, attempts, solved, solved_at) = row;
    BrainTeaserAttempt {
        id,
        user_id,
        teaser_id,
        hints_used,
        attempts,
        solved,
        solved_at,
    }
}

type MarathonRow = (
    String,
    String,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
    String,
    String,
);

fn marathon_from_row(row: MarathonRow) -> Result<Marathon, StoreError> {
    let (id, title, description, start_time, end_time, problem_ids, status) = row;
    Ok(Marathon {
        id,
        title,
        description,
        start_time,
        end_time,
        problem_ids: decode_json(&problem_ids)?,
        status: decode_marathon_status(&status),
    })
}

type ParticipantRow = (String, String, String, i64, Option<i64>, DateTime<Utc>);

fn participant_from_row(row: ParticipantRow) -> MarathonParticipant {
    let (id, marathon_id, user_id, score, rank, joined_at) = row;
    MarathonParticipant {
        id,
        marathon_id,
        user_id,
        score,
        rank,
        joined_at,
    }
}

const TYPING_CHALLENGE_COLUMNS: &str = "id, title, language, difficulty, snippet";
const QUIZ_QUESTION_COLUMNS: &str = "id, topic, difficulty, question, options, correct_answer";
const BRAIN_TEASER_COLUMNS: &str = "id, date, question, hints, solution, explanation";
const TEASER_ATTEMPT_COLUMNS: &str =
    "id, user_id, teaser_id, hints_used, attempts, solved, solved_at";
const MARATHON_COLUMNS: &str =
    "id, title, description, start_time, end_time, problem_ids, status";
const PARTICIPANT_COLUMNS: &str = "id, marathon_id, user_id, score, \"rank\", joined_at";

impl ChallengeRepository for SqliteStore {
    async fn put_typing_challenge(
        &self,
        challenge: TypingChallenge,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO typing_challenges (id, title, language, difficulty, snippet)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&challenge.id)
        .bind(&challenge.title)
        .bind(&challenge.language)
        .bind(challenge.difficulty.as_str())
        .bind(&challenge.snippet)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_typing_challenges(&self) -> Result<Vec<TypingChallenge>, StoreError> {
        let rows: Vec<TypingChallengeRow> = sqlx::query_as(&format!(
            "SELECT {TYPING_CHALLENGE_COLUMNS} FROM typing_challenges"
        ))
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(typing_challenge_from_row).collect())
    }

    async fn random_typing_challenge(
        &self,
        language: Option<&str>,
    ) -> Result<Option<TypingChallenge>, StoreError> {
        let rows: Vec<TypingChallengeRow> = match language {
            Some(lang) => {
                sqlx::query_as(&format!(
                    "SELECT {TYPING_CHALLENGE_COLUMNS} FROM typing_challenges WHERE language = ?"
                ))
                .bind(lang)
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {TYPING_CHALLENGE_COLUMNS} FROM typing_challenges"
                ))
                .fetch_all(self.pool())
                .await?
            }
        };
        Ok(stats::pick_one(&rows)
            .cloned()
            .map(typing_challenge_from_row))
    }

    async fn record_typing_score(
        &self,
        new_score: NewTypingScore,
    ) -> Result<TypingScore, StoreError> {
        let score = TypingScore {
            id: new_id(),
            user_id: new_score.user_id,
            challenge_id: new_score.challenge_id,
            wpm: new_score.wpm,
            accuracy: new_score.accuracy,
            recorded_at: now(),
        };

        sqlx::query(
            r#"
            INSERT INTO typing_scores (id, user_id, challenge_id, wpm, accuracy, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&score.id)
        .bind(&score.user_id)
        .bind(&score.challenge_id)
        .bind(score.wpm)
        .bind(score.accuracy)
        .bind(score.recorded_at)
        .execute(self.pool())
        .await?;

        Ok(score)
    }

    async fn typing_leaderboard(&self) -> Result<Vec<TypingLeaderboardEntry>, StoreError> {
        let rows: Vec<(String, String, f64, f64, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT s.user_id, u.username, s.wpm, s.accuracy, s.recorded_at
            FROM typing_scores s
            JOIN users u ON u.id = s.user_id
            ORDER BY s.wpm DESC, s.recorded_at ASC, s.id ASC
            LIMIT 10
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(user_id, username, wpm, accuracy, recorded_at)| TypingLeaderboardEntry {
                    user_id,
                    username,
                    wpm,
                    accuracy,
                    recorded_at,
                },
            )
            .collect())
    }

    async fn put_quiz_question(&self, question: QuizQuestion) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO quiz_questions (id, topic, difficulty, question, options, correct_answer)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&question.id)
        .bind(&question.topic)
        .bind(question.difficulty.as_str())
        .bind(&question.question)
        .bind(encode_json(&question.options)?)
        .bind(question.correct_answer)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn quiz_questions(
        &self,
        topic: &str,
        difficulty: Difficulty,
        count: usize,
    ) -> Result<Vec<QuizQuestion>, StoreError> {
        let rows: Vec<QuizQuestionRow> = sqlx::query_as(&format!(
            "SELECT {QUIZ_QUESTION_COLUMNS} FROM quiz_questions WHERE topic = ? AND difficulty = ?"
        ))
        .bind(topic)
        .bind(difficulty.as_str())
        .fetch_all(self.pool())
        .await?;

        stats::sample(&rows, count)
            .into_iter()
            .map(quiz_question_from_row)
            .collect()
    }

    async fn record_quiz_attempt(
        &self,
        new_attempt: NewQuizAttempt,
    ) -> Result<QuizAttempt, StoreError> {
        let attempt = QuizAttempt {
            id: new_id(),
            user_id: new_attempt.user_id,
            topic: new_attempt.topic,
            difficulty: new_attempt.difficulty,
            score: new_attempt.score,
            total: new_attempt.total,
            recorded_at: now(),
        };

        sqlx::query(
            r#"
            INSERT INTO quiz_attempts (id, user_id, topic, difficulty, score, total, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&attempt.id)
        .bind(&attempt.user_id)
        .bind(&attempt.topic)
        .bind(attempt.difficulty.as_str())
        .bind(attempt.score)
        .bind(attempt.total)
        .bind(attempt.recorded_at)
        .execute(self.pool())
        .await?;

        Ok(attempt)
    }

    async fn put_brain_teaser(&self, teaser: BrainTeaser) -> Result<bool, StoreError> {
        // OR IGNORE also covers the UNIQUE(date) index, so a second teaser
        // for an already-seeded date is skipped like a duplicate id.
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO brain_teasers (id, date, question, hints, solution, explanation)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&teaser.id)
        .bind(teaser.date)
        .bind(&teaser.question)
        .bind(encode_json(&teaser.hints)?)
        .bind(&teaser.solution)
        .bind(&teaser.explanation)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn get_teaser_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<BrainTeaser>, StoreError> {
        let row: Option<BrainTeaserRow> = sqlx::query_as(&format!(
            "SELECT {BRAIN_TEASER_COLUMNS} FROM brain_teasers WHERE date = ?"
        ))
        .bind(date)
        .fetch_optional(self.pool())
        .await?;
        row.map(brain_teaser_from_row).transpose()
    }

    async fn submit_teaser_answer(
        &self,
        user_id: &str,
        teaser_id: &str,
        answer: &str,
    ) -> Result<Option<TeaserSubmissionOutcome>, StoreError> {
        let mut tx = self.pool().begin().await?;

        let solution: Option<(String,)> =
            sqlx::query_as("SELECT solution FROM brain_teasers WHERE id = ?")
                .bind(teaser_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((solution,)) = solution else {
            return Ok(None);
        };

        let correct = teaser_answer_matches(&solution, answer);
        let solved_at = correct.then(now);

        let row: TeaserAttemptRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO teaser_attempts (id, user_id, teaser_id, hints_used, attempts, solved, solved_at)
            VALUES (?, ?, ?, 0, 1, ?, ?)
            ON CONFLICT (user_id, teaser_id) DO UPDATE SET
                attempts = attempts + 1,
                solved = teaser_attempts.solved OR excluded.solved,
                solved_at = COALESCE(teaser_attempts.solved_at, excluded.solved_at)
            RETURNING {TEASER_ATTEMPT_COLUMNS}
            "#
        ))
        .bind(new_id())
        .bind(user_id)
        .bind(teaser_id)
        .bind(correct)
        .bind(solved_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(TeaserSubmissionOutcome {
            correct,
            attempt: teaser_attempt_from_row(row),
        }))
    }

    async fn use_teaser_hint(
        &self,
        user_id: &str,
        teaser_id: &str,
    ) -> Result<Option<TeaserHintOutcome>, StoreError> {
        let mut tx = self.pool().begin().await?;

        let hints: Option<(String,)> =
            sqlx::query_as("SELECT hints FROM brain_teasers WHERE id = ?")
                .bind(teaser_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((hints,)) = hints else {
            return Ok(None);
        };
        let hints: Vec<String> = decode_json(&hints)?;

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO teaser_attempts (id, user_id, teaser_id, hints_used, attempts, solved, solved_at)
            VALUES (?, ?, ?, 0, 0, 0, NULL)
            "#,
        )
        .bind(new_id())
        .bind(user_id)
        .bind(teaser_id)
        .execute(&mut *tx)
        .await?;

        let row: TeaserAttemptRow = sqlx::query_as(&format!(
            "SELECT {TEASER_ATTEMPT_COLUMNS} FROM teaser_attempts WHERE user_id = ? AND teaser_id = ?"
        ))
        .bind(user_id)
        .bind(teaser_id)
        .fetch_one(&mut *tx)
        .await?;
        let mut attempt = teaser_attempt_from_row(row);

        // No more hints once the teaser is solved or the pool is exhausted.
        let hint = if !attempt.solved && (attempt.hints_used as usize) < hints.len() {
            attempt.hints_used += 1;
            sqlx::query(
                "UPDATE teaser_attempts SET hints_used = ? WHERE user_id = ? AND teaser_id = ?",
            )
            .bind(attempt.hints_used)
            .bind(user_id)
            .bind(teaser_id)
            .execute(&mut *tx)
            .await?;
            Some(hints[attempt.hints_used as usize - 1].clone())
        } else {
            None
        };

        tx.commit().await?;
        Ok(Some(TeaserHintOutcome { hint, attempt }))
    }

    async fn get_teaser_attempt(
        &self,
        user_id: &str,
        teaser_id: &str,
    ) -> Result<Option<BrainTeaserAttempt>, StoreError> {
        let row: Option<TeaserAttemptRow> = sqlx::query_as(&format!(
            "SELECT {TEASER_ATTEMPT_COLUMNS} FROM teaser_attempts WHERE user_id = ? AND teaser_id = ?"
        ))
        .bind(user_id)
        .bind(teaser_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(teaser_attempt_from_row))
    }

    async fn teaser_calendar(
        &self,
        user_id: &str,
    ) -> Result<Vec<TeaserCalendarEntry>, StoreError> {
        let rows: Vec<(NaiveDate, bool)> = sqlx::query_as(
            r#"
            SELECT t.date, a.solved
            FROM teaser_attempts a
            JOIN brain_teasers t ON t.id = a.teaser_id
            WHERE a.user_id = ?
            ORDER BY t.date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(date, solved)| TeaserCalendarEntry { date, solved })
            .collect())
    }

    async fn challenge_stats(&self, user_id: &str) -> Result<ChallengeStats, StoreError> {
        let wpms: Vec<(f64,)> = sqlx::query_as("SELECT wpm FROM typing_scores WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(self.pool())
            .await?;
        let quiz_scores: Vec<(i64,)> =
            sqlx::query_as("SELECT score FROM quiz_attempts WHERE user_id = ?")
                .bind(user_id)
                .fetch_all(self.pool())
                .await?;
        let (teasers_solved,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM teaser_attempts WHERE user_id = ? AND solved = 1",
        )
        .bind(user_id)
        .fetch_one(self.pool())
        .await?;

        let wpms: Vec<f64> = wpms.into_iter().map(|(w,)| w).collect();
        let quiz_scores: Vec<i64> = quiz_scores.into_iter().map(|(s,)| s).collect();
        Ok(stats::reduce_challenge_stats(
            &wpms,
            &quiz_scores,
            teasers_solved,
        ))
    }

    async fn create_marathon(&self, new_marathon: NewMarathon) -> Result<Marathon, StoreError> {
        let marathon = Marathon {
            id: new_id(),
            title: new_marathon.title,
            description: new_marathon.description,
            start_time: new_marathon.start_time,
            end_time: new_marathon.end_time,
            problem_ids: new_marathon.problem_ids,
            status: MarathonStatus::Upcoming,
        };

        sqlx::query(
            r#"
            INSERT INTO marathons (id, title, description, start_time, end_time, problem_ids, status)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&marathon.id)
        .bind(&marathon.title)
        .bind(&marathon.description)
        .bind(marathon.start_time)
        .bind(marathon.end_time)
        .bind(encode_json(&marathon.problem_ids)?)
        .bind(marathon.status.as_str())
        .execute(self.pool())
        .await?;

        Ok(marathon)
    }

    async fn get_marathon(&self, id: &str) -> Result<Option<Marathon>, StoreError> {
        let row: Option<MarathonRow> = sqlx::query_as(&format!(
            "SELECT {MARATHON_COLUMNS} FROM marathons WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        row.map(marathon_from_row).transpose()
    }

    async fn list_marathons(&self) -> Result<Vec<Marathon>, StoreError> {
        let rows: Vec<MarathonRow> = sqlx::query_as(&format!(
            "SELECT {MARATHON_COLUMNS} FROM marathons ORDER BY start_time ASC"
        ))
        .fetch_all(self.pool())
        .await?;
        rows.into_iter().map(marathon_from_row).collect()
    }

    async fn update_marathon_status(
        &self,
        id: &str,
        status: MarathonStatus,
    ) -> Result<Option<Marathon>, StoreError> {
        let result = sqlx::query("UPDATE marathons SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_marathon(id).await
    }

    async fn join_marathon(
        &self,
        marathon_id: &str,
        user_id: &str,
    ) -> Result<Option<MarathonParticipant>, StoreError> {
        let participant = MarathonParticipant {
            id: new_id(),
            marathon_id: marathon_id.to_string(),
            user_id: user_id.to_string(),
            score: 0,
            rank: None,
            joined_at: now(),
        };

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO marathon_participants (id, marathon_id, user_id, score, "rank", joined_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&participant.id)
        .bind(&participant.marathon_id)
        .bind(&participant.user_id)
        .bind(participant.score)
        .bind(participant.rank)
        .bind(participant.joined_at)
        .execute(self.pool())
        .await;

        match result {
            Ok(r) if r.rows_affected() == 1 => Ok(Some(participant)),
            Ok(_) => {
                // Already joined; hand back the existing row.
                let row: Option<ParticipantRow> = sqlx::query_as(&format!(
                    "SELECT {PARTICIPANT_COLUMNS} FROM marathon_participants WHERE marathon_id = ? AND user_id = ?"
                ))
                .bind(marathon_id)
                .bind(user_id)
                .fetch_optional(self.pool())
                .await?;
                Ok(row.map(participant_from_row))
            }
            Err(e) if is_foreign_key_violation(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_marathon_participant(
        &self,
        marathon_id: &str,
        user_id: &str,
        score: i64,
        rank: Option<i64>,
    ) -> Result<Option<MarathonParticipant>, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE marathon_participants
            SET score = ?,
                "rank" = COALESCE(?, "rank")
            WHERE marathon_id = ? AND user_id = ?
            "#,
        )
        .bind(score)
        .bind(rank)
        .bind(marathon_id)
        .bind(user_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let row: Option<ParticipantRow> = sqlx::query_as(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM marathon_participants WHERE marathon_id = ? AND user_id = ?"
        ))
        .bind(marathon_id)
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(participant_from_row))
    }

    async fn list_marathon_participants(
        &self,
        marathon_id: &str,
    ) -> Result<Vec<MarathonParticipant>, StoreError> {
        let rows: Vec<ParticipantRow> = sqlx::query_as(&format!(
            r#"
            SELECT {PARTICIPANT_COLUMNS} FROM marathon_participants
            WHERE marathon_id = ?
            ORDER BY score DESC, joined_at ASC
            "#
        ))
        .bind(marathon_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(participant_from_row).collect())
    }
}
