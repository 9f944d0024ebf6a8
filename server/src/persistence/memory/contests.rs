use entities::{
    Contest, ContestStatus, ContestUpdate, NewContest, NewProblem, NewSubmission, Problem,
    Submission, SubmissionStatus,
};

use super::MemoryStore;
use crate::persistence::traits::ContestRepository;
use crate::persistence::{new_id, now, StoreError};

impl ContestRepository for MemoryStore {
    async fn create_contest(&self, new_contest: NewContest) -> Result<Contest, StoreError> {
        let mut state = self.state.write().await;
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
        state.contests.insert(contest.id.clone(), contest.clone());
        Ok(contest)
    }

    async fn get_contest(&self, id: &str) -> Result<Option<Contest>, StoreError> {
        let state = self.state.read().await;
        Ok(state.contests.get(id).cloned())
    }

    async fn list_contests(&self) -> Result<Vec<Contest>, StoreError> {
        let state = self.state.read().await;
        let mut contests: Vec<Contest> = state.contests.values().cloned().collect();
        contests.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(contests)
    }

    async fn update_contest(
        &self,
        id: &str,
        update: ContestUpdate,
    ) -> Result<Option<Contest>, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.contests.get_mut(id).map(|contest| {
            if let Some(title) = update.title {
                contest.title = title;
            }
            if let Some(description) = update.description {
                contest.description = Some(description);
            }
            if let Some(start_time) = update.start_time {
                contest.start_time = start_time;
            }
            if let Some(end_time) = update.end_time {
                contest.end_time = end_time;
            }
            if let Some(status) = update.status {
                contest.status = status;
            }
            if let Some(participants) = update.participants {
                contest.participants = participants.max(0);
            }
            contest.clone()
        }))
    }

    async fn create_problem(&self, new_problem: NewProblem) -> Result<Problem, StoreError> {
        let mut state = self.state.write().await;
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
        state.problems.insert(problem.id.clone(), problem.clone());
        Ok(problem)
    }

    async fn get_problem(&self, id: &str) -> Result<Option<Problem>, StoreError> {
        let state = self.state.read().await;
        Ok(state.problems.get(id).cloned())
    }

    async fn list_problems(&self, contest_id: &str) -> Result<Vec<Problem>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .problems
            .values()
            .filter(|p| p.contest_id == contest_id)
            .cloned()
            .collect())
    }

    async fn create_submission(
        &self,
        new_submission: NewSubmission,
    ) -> Result<Submission, StoreError> {
        let mut state = self.state.write().await;
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
        state
            .submissions
            .insert(submission.id.clone(), submission.clone());
        Ok(submission)
    }

    async fn get_submission(&self, id: &str) -> Result<Option<Submission>, StoreError> {
        let state = self.state.read().await;
        Ok(state.submissions.get(id).cloned())
    }

    async fn list_submissions(&self, user_id: &str) -> Result<Vec<Submission>, StoreError> {
        let state = self.state.read().await;
        let mut submissions: Vec<Submission> = state
            .submissions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        submissions.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(submissions)
    }

    async fn update_submission_status(
        &self,
        id: &str,
        status: SubmissionStatus,
        score: Option<i64>,
    ) -> Result<Option<Submission>, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.submissions.get_mut(id).map(|submission| {
            submission.status = status;
            if let Some(score) = score {
                submission.score = score;
            }
            submission.clone()
        }))
    }
}
