use chrono::NaiveDate;
use entities::{
    BrainTeaser, BrainTeaserAttempt, ChallengeStats, Difficulty, Marathon, MarathonParticipant,
    MarathonStatus, NewMarathon, NewQuizAttempt, NewTypingScore, QuizAttempt, QuizQuestion,
    TeaserCalendarEntry, TeaserHintOutcome, TeaserSubmissionOutcome, TypingChallenge,
    TypingLeaderboardEntry, TypingScore,
};

use super::MemoryStore;
use crate::persistence::traits::ChallengeRepository;
use crate::persistence::{new_id, now, teaser_answer_matches, StoreError};
use crate::stats;

const LEADERBOARD_SIZE: usize = 10;

impl ChallengeRepository for MemoryStore {
    async fn put_typing_challenge(&self, challenge: TypingChallenge) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if state.typing_challenges.contains_key(&challenge.id) {
            return Ok(false);
        }
        state
            .typing_challenges
            .insert(challenge.id.clone(), challenge);
        Ok(true)
    }

    async fn list_typing_challenges(&self) -> Result<Vec<TypingChallenge>, StoreError> {
        let state = self.state.read().await;
        Ok(state.typing_challenges.values().cloned().collect())
    }

    async fn random_typing_challenge(
        &self,
        language: Option<&str>,
    ) -> Result<Option<TypingChallenge>, StoreError> {
        let state = self.state.read().await;
        let pool: Vec<&TypingChallenge> = state
            .typing_challenges
            .values()
            .filter(|c| language.map_or(true, |lang| c.language == lang))
            .collect();
        Ok(stats::pick_one(&pool).map(|c| (*c).clone()))
    }

    async fn record_typing_score(
        &self,
        new_score: NewTypingScore,
    ) -> Result<TypingScore, StoreError> {
        let mut state = self.state.write().await;
        let score = TypingScore {
            id: new_id(),
            user_id: new_score.user_id,
            challenge_id: new_score.challenge_id,
            wpm: new_score.wpm,
            accuracy: new_score.accuracy,
            recorded_at: now(),
        };
        state.typing_scores.push(score.clone());
        Ok(score)
    }

    async fn typing_leaderboard(&self) -> Result<Vec<TypingLeaderboardEntry>, StoreError> {
        let state = self.state.read().await;
        let mut scores: Vec<&TypingScore> = state.typing_scores.iter().collect();
        // typing_scores is kept in recording order and the sort is stable,
        // so wpm ties break toward the earliest score.
        scores.sort_by(|a, b| b.wpm.total_cmp(&a.wpm));
        Ok(scores
            .into_iter()
            .filter_map(|score| {
                // Orphaned scores (user gone) drop out of the board.
                let user = state.users.get(&score.user_id)?;
                Some(TypingLeaderboardEntry {
                    user_id: score.user_id.clone(),
                    username: user.username.clone(),
                    wpm: score.wpm,
                    accuracy: score.accuracy,
                    recorded_at: score.recorded_at,
                })
            })
            .take(LEADERBOARD_SIZE)
            .collect())
    }

    async fn put_quiz_question(&self, question: QuizQuestion) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if state.quiz_questions.contains_key(&question.id) {
            return Ok(false);
        }
        state.quiz_questions.insert(question.id.clone(), question);
        Ok(true)
    }

    async fn quiz_questions(
        &self,
        topic: &str,
        difficulty: Difficulty,
        count: usize,
    ) -> Result<Vec<QuizQuestion>, StoreError> {
        let state = self.state.read().await;
        let pool: Vec<QuizQuestion> = state
            .quiz_questions
            .values()
            .filter(|q| q.topic == topic && q.difficulty == difficulty)
            .cloned()
            .collect();
        Ok(stats::sample(&pool, count))
    }

    async fn record_quiz_attempt(
        &self,
        new_attempt: NewQuizAttempt,
    ) -> Result<QuizAttempt, StoreError> {
        let mut state = self.state.write().await;
        let attempt = QuizAttempt {
            id: new_id(),
            user_id: new_attempt.user_id,
            topic: new_attempt.topic,
            difficulty: new_attempt.difficulty,
            score: new_attempt.score,
            total: new_attempt.total,
            recorded_at: now(),
        };
        state.quiz_attempts.push(attempt.clone());
        Ok(attempt)
    }

    async fn put_brain_teaser(&self, teaser: BrainTeaser) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if state.brain_teasers.contains_key(&teaser.id)
            || state.brain_teasers.values().any(|t| t.date == teaser.date)
        {
            return Ok(false);
        }
        state.brain_teasers.insert(teaser.id.clone(), teaser);
        Ok(true)
    }

    async fn get_teaser_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<BrainTeaser>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .brain_teasers
            .values()
            .find(|t| t.date == date)
            .cloned())
    }

    async fn submit_teaser_answer(
        &self,
        user_id: &str,
        teaser_id: &str,
        answer: &str,
    ) -> Result<Option<TeaserSubmissionOutcome>, StoreError> {
        let mut state = self.state.write().await;
        let Some(teaser) = state.brain_teasers.get(teaser_id) else {
            return Ok(None);
        };
        let correct = teaser_answer_matches(&teaser.solution, answer);

        let key = (user_id.to_string(), teaser_id.to_string());
        let attempt = state
            .teaser_attempts
            .entry(key)
            .or_insert_with(|| BrainTeaserAttempt {
                id: new_id(),
                user_id: user_id.to_string(),
                teaser_id: teaser_id.to_string(),
                hints_used: 0,
                attempts: 0,
                solved: false,
                solved_at: None,
            });

        attempt.attempts += 1;
        // solved is sticky: a later wrong answer never clears it.
        if correct && !attempt.solved {
            attempt.solved = true;
            attempt.solved_at = Some(now());
        }

        Ok(Some(TeaserSubmissionOutcome {
            correct,
            attempt: attempt.clone(),
        }))
    }

    async fn use_teaser_hint(
        &self,
        user_id: &str,
        teaser_id: &str,
    ) -> Result<Option<TeaserHintOutcome>, StoreError> {
        let mut state = self.state.write().await;
        let Some(teaser) = state.brain_teasers.get(teaser_id).cloned() else {
            return Ok(None);
        };

        let key = (user_id.to_string(), teaser_id.to_string());
        let attempt = state
            .teaser_attempts
            .entry(key)
            .or_insert_with(|| BrainTeaserAttempt {
                id: new_id(),
                user_id: user_id.to_string(),
                teaser_id: teaser_id.to_string(),
                hints_used: 0,
                attempts: 0,
                solved: false,
                solved_at: None,
            });

        // Hints only accrue before the teaser is solved, and never beyond
        // the teaser's hint count.
        let hint = if !attempt.solved && (attempt.hints_used as usize) < teaser.hints.len() {
            attempt.hints_used += 1;
            teaser.hints.get(attempt.hints_used as usize - 1).cloned()
        } else {
            None
        };

        Ok(Some(TeaserHintOutcome {
            hint,
            attempt: attempt.clone(),
        }))
    }

    async fn get_teaser_attempt(
        &self,
        user_id: &str,
        teaser_id: &str,
    ) -> Result<Option<BrainTeaserAttempt>, StoreError> {
        let state = self.state.read().await;
        let key = (user_id.to_string(), teaser_id.to_string());
        Ok(state.teaser_attempts.get(&key).cloned())
    }

    async fn teaser_calendar(&self, user_id: &str) -> Result<Vec<TeaserCalendarEntry>, StoreError> {
        let state = self.state.read().await;
        let mut entries: Vec<TeaserCalendarEntry> = state
            .teaser_attempts
            .values()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| {
                let teaser = state.brain_teasers.get(&a.teaser_id)?;
                Some(TeaserCalendarEntry {
                    date: teaser.date,
                    solved: a.solved,
                })
            })
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }

    async fn challenge_stats(&self, user_id: &str) -> Result<ChallengeStats, StoreError> {
        let state = self.state.read().await;
        let wpms: Vec<f64> = state
            .typing_scores
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.wpm)
            .collect();
        let quiz_scores: Vec<i64> = state
            .quiz_attempts
            .iter()
            .filter(|a| a.user_id == user_id)
            .map(|a| a.score)
            .collect();
        let teasers_solved = state
            .teaser_attempts
            .values()
            .filter(|a| a.user_id == user_id && a.solved)
            .count() as i64;
        Ok(stats::reduce_challenge_stats(
            &wpms,
            &quiz_scores,
            teasers_solved,
        ))
    }

    async fn create_marathon(&self, new_marathon: NewMarathon) -> Result<Marathon, StoreError> {
        let mut state = self.state.write().await;
        let marathon = Marathon {
            id: new_id(),
            title: new_marathon.title,
            description: new_marathon.description,
            start_time: new_marathon.start_time,
            end_time: new_marathon.end_time,
            problem_ids: new_marathon.problem_ids,
            status: MarathonStatus::Upcoming,
        };
        state.marathons.insert(marathon.id.clone(), marathon.clone());
        Ok(marathon)
    }

    async fn get_marathon(&self, id: &str) -> Result<Option<Marathon>, StoreError> {
        let state = self.state.read().await;
        Ok(state.marathons.get(id).cloned())
    }

    async fn list_marathons(&self) -> Result<Vec<Marathon>, StoreError> {
        let state = self.state.read().await;
        let mut marathons: Vec<Marathon> = state.marathons.values().cloned().collect();
        marathons.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(marathons)
    }

    async fn update_marathon_status(
        &self,
        id: &str,
        status: MarathonStatus,
    ) -> Result<Option<Marathon>, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.marathons.get_mut(id).map(|marathon| {
            marathon.status = status;
            marathon.clone()
        }))
    }

    async fn join_marathon(
        &self,
        marathon_id: &str,
        user_id: &str,
    ) -> Result<Option<MarathonParticipant>, StoreError> {
        let mut state = self.state.write().await;
        if !state.marathons.contains_key(marathon_id) {
            return Ok(None);
        }
        let key = (marathon_id.to_string(), user_id.to_string());
        if let Some(existing) = state.marathon_participants.get(&key) {
            return Ok(Some(existing.clone()));
        }
        let participant = MarathonParticipant {
            id: new_id(),
            marathon_id: marathon_id.to_string(),
            user_id: user_id.to_string(),
            score: 0,
            rank: None,
            joined_at: now(),
        };
        state.marathon_participants.insert(key, participant.clone());
        Ok(Some(participant))
    }

    async fn update_marathon_participant(
        &self,
        marathon_id: &str,
        user_id: &str,
        score: i64,
        rank: Option<i64>,
    ) -> Result<Option<MarathonParticipant>, StoreError> {
        let mut state = self.state.write().await;
        let key = (marathon_id.to_string(), user_id.to_string());
        Ok(state.marathon_participants.get_mut(&key).map(|p| {
            p.score = score;
            if rank.is_some() {
                p.rank = rank;
            }
            p.clone()
        }))
    }

    async fn list_marathon_participants(
        &self,
        marathon_id: &str,
    ) -> Result<Vec<MarathonParticipant>, StoreError> {
        let state = self.state.read().await;
        let mut participants: Vec<MarathonParticipant> = state
            .marathon_participants
            .values()
            .filter(|p| p.marathon_id == marathon_id)
            .cloned()
            .collect();
        participants.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(participants)
    }
}
