//! Backend-agnostic behavior suite, run by both backends' test modules.
//!
//! Every helper takes a fresh store and drives it through one entity
//! family's operations, asserting the shared semantics: absence as
//! `Ok(None)`, idempotent upserts, one-way completion stamps, additive
//! counters and the documented list orderings. The memory and sqlite test
//! modules call the same functions, so a behavioral gap between the
//! backends shows up as a failure on exactly one side.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use entities::{
    BrainTeaser, ContestStatus, ContestUpdate, CourseLevel, CourseUpdate, Difficulty,
    EnrollmentStatus, MarathonStatus, NewContest, NewCourse, NewLesson, NewMarathon,
    NewProblem, NewQuizAttempt, NewSubmission, NewTypingScore, NewUser, QuizQuestion, Role,
    SubmissionStatus, TypingChallenge,
};

use super::today;
use super::traits::Store;

fn ts(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 1, hour, 0, 0).unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
}

fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        password: "hashed-credential".to_string(),
        role: None,
        external_key: None,
    }
}

fn new_course(title: &str, level: CourseLevel) -> NewCourse {
    NewCourse {
        title: title.to_string(),
        description: "intro".to_string(),
        level,
        difficulty: Difficulty::Easy,
        topics: vec!["arrays".to_string()],
        prerequisites: None,
        instructor: "ada".to_string(),
        rating: None,
        price: 0.0,
    }
}

fn new_contest(title: &str, start: DateTime<Utc>) -> NewContest {
    NewContest {
        title: title.to_string(),
        description: None,
        start_time: start,
        end_time: start + chrono::Duration::hours(2),
        status: None,
        created_by: "admin".to_string(),
    }
}

fn typing_challenge(id: &str, language: &str) -> TypingChallenge {
    TypingChallenge {
        id: id.to_string(),
        title: format!("snippet {id}"),
        language: language.to_string(),
        difficulty: Difficulty::Easy,
        snippet: "fn main() {}".to_string(),
    }
}

fn quiz_question(id: &str) -> QuizQuestion {
    QuizQuestion {
        id: id.to_string(),
        topic: "arrays".to_string(),
        difficulty: Difficulty::Easy,
        question: "complexity of binary search?".to_string(),
        options: vec!["O(n)".to_string(), "O(log n)".to_string()],
        correct_answer: 1,
    }
}

fn teaser(id: &str, date: NaiveDate, solution: &str, hints: Vec<&str>) -> BrainTeaser {
    BrainTeaser {
        id: id.to_string(),
        date,
        question: "how many?".to_string(),
        hints: hints.into_iter().map(str::to_string).collect(),
        solution: solution.to_string(),
        explanation: None,
    }
}

pub(crate) async fn users<S: Store>(store: &S) {
    let user = store.create_user(new_user("alice")).await.unwrap();
    assert_eq!(user.role, Role::User);
    assert_eq!(user.streak, 0);
    assert!(user.last_daily_solve.is_none());

    // Duplicate username is a conflict, not a silent overwrite.
    let err = store.create_user(new_user("alice")).await.unwrap_err();
    assert!(matches!(err, super::StoreError::Conflict(_)));

    let linked = store
        .create_user(NewUser {
            external_key: Some("oauth|123".to_string()),
            role: Some(Role::Admin),
            ..new_user("bob")
        })
        .await
        .unwrap();
    assert_eq!(linked.role, Role::Admin);

    // External key uniqueness is independent of username uniqueness.
    let err = store
        .create_user(NewUser {
            external_key: Some("oauth|123".to_string()),
            ..new_user("carol")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, super::StoreError::Conflict(_)));

    assert_eq!(store.get_user(&user.id).await.unwrap(), Some(user.clone()));
    assert_eq!(store.get_user("nope").await.unwrap(), None);
    assert_eq!(
        store.get_user_by_username("alice").await.unwrap(),
        Some(user.clone())
    );
    assert_eq!(
        store
            .get_user_by_external_key("oauth|123")
            .await
            .unwrap()
            .map(|u| u.id),
        Some(linked.id)
    );

    let solve_time = ts(9);
    let updated = store
        .update_user_streak(&user.id, 3, Some(solve_time))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.streak, 3);
    assert_eq!(updated.last_daily_solve, Some(solve_time));

    // A None solve time leaves the existing one in place; negative streaks
    // clamp to zero.
    let updated = store
        .update_user_streak(&user.id, -1, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.streak, 0);
    assert_eq!(updated.last_daily_solve, Some(solve_time));

    assert_eq!(store.update_user_streak("nope", 1, None).await.unwrap(), None);
}

pub(crate) async fn contests_and_problems<S: Store>(store: &S) {
    let later = store
        .create_contest(new_contest("weekly 2", ts(12)))
        .await
        .unwrap();
    let earlier = store
        .create_contest(new_contest("weekly 1", ts(8)))
        .await
        .unwrap();
    assert_eq!(later.status, ContestStatus::Upcoming);
    assert_eq!(later.participants, 0);

    let listed = store.list_contests().await.unwrap();
    assert_eq!(
        listed.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
        vec![earlier.id.as_str(), later.id.as_str()]
    );

    let updated = store
        .update_contest(
            &later.id,
            ContestUpdate {
                status: Some(ContestStatus::Live),
                participants: Some(40),
                ..ContestUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, ContestStatus::Live);
    assert_eq!(updated.participants, 40);
    // Untouched fields survive a partial update.
    assert_eq!(updated.title, "weekly 2");

    assert_eq!(
        store
            .update_contest("nope", ContestUpdate::default())
            .await
            .unwrap(),
        None
    );

    let problem = store
        .create_problem(NewProblem {
            contest_id: earlier.id.clone(),
            title: "two sum".to_string(),
            description: "classic".to_string(),
            difficulty: Difficulty::Easy,
            points: None,
            time_limit_ms: Some(2000),
            memory_limit_kb: None,
        })
        .await
        .unwrap();
    assert_eq!(problem.points, 100);

    assert_eq!(
        store.get_problem(&problem.id).await.unwrap(),
        Some(problem.clone())
    );
    let problems = store.list_problems(&earlier.id).await.unwrap();
    assert_eq!(problems, vec![problem]);
    assert!(store.list_problems(&later.id).await.unwrap().is_empty());
}

pub(crate) async fn submissions<S: Store>(store: &S) {
    let contest = store
        .create_contest(new_contest("weekly", ts(8)))
        .await
        .unwrap();
    let problem = store
        .create_problem(NewProblem {
            contest_id: contest.id.clone(),
            title: "two sum".to_string(),
            description: "classic".to_string(),
            difficulty: Difficulty::Easy,
            points: None,
            time_limit_ms: None,
            memory_limit_kb: None,
        })
        .await
        .unwrap();

    let first = store
        .create_submission(NewSubmission {
            problem_id: problem.id.clone(),
            user_id: "u1".to_string(),
            contest_id: Some(contest.id.clone()),
            code: "print(1)".to_string(),
            language: "python".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(first.status, SubmissionStatus::Pending);
    assert_eq!(first.score, 0);

    let second = store
        .create_submission(NewSubmission {
            problem_id: problem.id.clone(),
            user_id: "u1".to_string(),
            contest_id: None,
            code: "print(2)".to_string(),
            language: "python".to_string(),
        })
        .await
        .unwrap();

    // Most recent first.
    let listed = store.list_submissions("u1").await.unwrap();
    assert_eq!(
        listed.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
        vec![second.id.as_str(), first.id.as_str()]
    );

    let judged = store
        .update_submission_status(&first.id, SubmissionStatus::Accepted, Some(100))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(judged.status, SubmissionStatus::Accepted);
    assert_eq!(judged.score, 100);

    // A verdict without a score keeps the existing score.
    let rejudged = store
        .update_submission_status(&first.id, SubmissionStatus::Accepted, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rejudged.score, 100);

    assert_eq!(
        store
            .update_submission_status("nope", SubmissionStatus::Accepted, None)
            .await
            .unwrap(),
        None
    );
}

pub(crate) async fn courses_and_lessons<S: Store>(store: &S) {
    let advanced = store
        .create_course(new_course("graph theory", CourseLevel::Advanced))
        .await
        .unwrap();
    let beginner_b = store
        .create_course(new_course("basics B", CourseLevel::Beginner))
        .await
        .unwrap();
    let beginner_a = store
        .create_course(new_course("basics A", CourseLevel::Beginner))
        .await
        .unwrap();
    assert_eq!(advanced.students, 0);
    assert!(advanced.is_active);

    // Level rank first, then title.
    let listed = store.list_courses().await.unwrap();
    assert_eq!(
        listed.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
        vec![
            beginner_a.id.as_str(),
            beginner_b.id.as_str(),
            advanced.id.as_str()
        ]
    );

    // Deactivated courses drop out of the listing but remain fetchable.
    store
        .update_course(
            &beginner_b.id,
            CourseUpdate {
                is_active: Some(false),
                ..CourseUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    let listed = store.list_courses().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(store.get_course(&beginner_b.id).await.unwrap().is_some());

    assert_eq!(
        store
            .update_course("nope", CourseUpdate::default())
            .await
            .unwrap(),
        None
    );

    let second = store
        .create_lesson(NewLesson {
            course_id: beginner_a.id.clone(),
            title: "loops".to_string(),
            description: None,
            content: "for and while".to_string(),
            order: 2,
            duration_minutes: Some(10),
            video_url: None,
            kind: None,
            quiz_data: None,
        })
        .await
        .unwrap();
    let first = store
        .create_lesson(NewLesson {
            course_id: beginner_a.id.clone(),
            title: "variables".to_string(),
            description: None,
            content: "let bindings".to_string(),
            order: 1,
            duration_minutes: None,
            video_url: None,
            kind: None,
            quiz_data: None,
        })
        .await
        .unwrap();
    assert_eq!(first.kind, entities::LessonKind::Theory);

    let lessons = store.list_lessons(&beginner_a.id).await.unwrap();
    assert_eq!(
        lessons.iter().map(|l| l.id.as_str()).collect::<Vec<_>>(),
        vec![first.id.as_str(), second.id.as_str()]
    );
    assert_eq!(
        store.get_lesson(&second.id).await.unwrap(),
        Some(second.clone())
    );
}

pub(crate) async fn enrollment<S: Store>(store: &S) {
    let user = store.create_user(new_user("dana")).await.unwrap();
    let course = store
        .create_course(new_course("basics", CourseLevel::Beginner))
        .await
        .unwrap();

    let enrollment = store.enroll(&user.id, &course.id).await.unwrap().unwrap();
    assert_eq!(enrollment.progress, 0);
    assert_eq!(enrollment.status, EnrollmentStatus::Active);
    assert_eq!(
        store.get_course(&course.id).await.unwrap().unwrap().students,
        1
    );

    // Re-enrolling returns the same record and does not recount the student.
    let again = store.enroll(&user.id, &course.id).await.unwrap().unwrap();
    assert_eq!(again.id, enrollment.id);
    assert_eq!(
        store.get_course(&course.id).await.unwrap().unwrap().students,
        1
    );

    assert_eq!(store.enroll("nope", &course.id).await.unwrap(), None);
    assert_eq!(store.enroll(&user.id, "nope").await.unwrap(), None);

    assert_eq!(
        store
            .get_enrollment(&user.id, &course.id)
            .await
            .unwrap()
            .map(|e| e.id),
        Some(enrollment.id.clone())
    );
    assert_eq!(store.list_enrollments(&user.id).await.unwrap().len(), 1);

    // Progress clamps to [0, 100] and time accumulates.
    let updated = store
        .update_enrollment_progress(&user.id, &course.id, 150, Some(30))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.progress, 100);
    assert_eq!(updated.time_spent_minutes, 30);
    let updated = store
        .update_enrollment_progress(&user.id, &course.id, -5, Some(15))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.progress, 0);
    assert_eq!(updated.time_spent_minutes, 45);
    // Progress writes never flip the status.
    assert_eq!(updated.status, EnrollmentStatus::Active);

    assert_eq!(
        store
            .update_enrollment_progress(&user.id, "nope", 10, None)
            .await
            .unwrap(),
        None
    );

    let completed = store
        .complete_enrollment(&user.id, &course.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(completed.status, EnrollmentStatus::Completed);
    assert_eq!(completed.progress, 100);
    let stamp = completed.completed_at.unwrap();

    // Completing again keeps the original stamp.
    let completed = store
        .complete_enrollment(&user.id, &course.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(completed.completed_at, Some(stamp));
}

pub(crate) async fn lesson_progress<S: Store>(store: &S) {
    let user = store.create_user(new_user("eve")).await.unwrap();
    let course = store
        .create_course(new_course("basics", CourseLevel::Beginner))
        .await
        .unwrap();
    let lesson = store
        .create_lesson(NewLesson {
            course_id: course.id.clone(),
            title: "variables".to_string(),
            description: None,
            content: "let bindings".to_string(),
            order: 1,
            duration_minutes: None,
            video_url: None,
            kind: None,
            quiz_data: None,
        })
        .await
        .unwrap();
    let enrollment = store.enroll(&user.id, &course.id).await.unwrap().unwrap();

    let record = store
        .update_lesson_progress(&enrollment.id, &lesson.id, &user.id, false, Some(5))
        .await
        .unwrap()
        .unwrap();
    assert!(!record.completed);
    assert!(record.completed_at.is_none());
    assert_eq!(record.time_spent_minutes, 5);

    let record = store
        .update_lesson_progress(&enrollment.id, &lesson.id, &user.id, true, Some(10))
        .await
        .unwrap()
        .unwrap();
    assert!(record.completed);
    assert_eq!(record.time_spent_minutes, 15);
    let stamp = record.completed_at.unwrap();

    // Completion is one-way: a later `false` neither clears the flag nor
    // re-stamps completed_at.
    let record = store
        .update_lesson_progress(&enrollment.id, &lesson.id, &user.id, false, Some(5))
        .await
        .unwrap()
        .unwrap();
    assert!(record.completed);
    assert_eq!(record.completed_at, Some(stamp));
    assert_eq!(record.time_spent_minutes, 20);

    let record = store
        .update_lesson_progress(&enrollment.id, &lesson.id, &user.id, true, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.completed_at, Some(stamp));

    assert_eq!(
        store
            .update_lesson_progress("nope", &lesson.id, &user.id, true, None)
            .await
            .unwrap(),
        None
    );

    let listed = store.list_lesson_progress(&enrollment.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(store.list_lesson_progress("nope").await.unwrap().is_empty());
}

pub(crate) async fn activity<S: Store>(store: &S) {
    let first = store.track_activity("u1", 10, 2).await.unwrap();
    assert_eq!(first.minutes_active, 10);
    assert_eq!(first.questions_solved, 2);
    assert_eq!(first.day, today());

    // Deltas accumulate into the same per-day record.
    let second = store.track_activity("u1", 5, 0).await.unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.minutes_active, 15);
    assert_eq!(second.questions_solved, 2);

    // Negative deltas are treated as zero, the counters never shrink.
    let third = store.track_activity("u1", -100, -1).await.unwrap();
    assert_eq!(third.minutes_active, 15);
    assert_eq!(third.questions_solved, 2);

    assert_eq!(
        store
            .get_activity("u1", today())
            .await
            .unwrap()
            .map(|a| a.minutes_active),
        Some(15)
    );
    assert_eq!(store.get_activity("u1", day(1)).await.unwrap(), None);
    assert_eq!(store.get_activity("ghost", today()).await.unwrap(), None);

    let listed = store.list_activity("u1").await.unwrap();
    assert_eq!(listed.len(), 1);
}

pub(crate) async fn challenges<S: Store>(store: &S) {
    // Seed pools are insert-if-absent by id.
    assert!(store
        .put_typing_challenge(typing_challenge("tc-1", "rust"))
        .await
        .unwrap());
    assert!(!store
        .put_typing_challenge(typing_challenge("tc-1", "rust"))
        .await
        .unwrap());
    assert!(store
        .put_typing_challenge(typing_challenge("tc-2", "python"))
        .await
        .unwrap());
    assert_eq!(store.list_typing_challenges().await.unwrap().len(), 2);

    let picked = store
        .random_typing_challenge(Some("rust"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(picked.id, "tc-1");
    assert!(store.random_typing_challenge(None).await.unwrap().is_some());
    assert_eq!(
        store.random_typing_challenge(Some("cobol")).await.unwrap(),
        None
    );

    let alice = store.create_user(new_user("alice")).await.unwrap();
    let bob = store.create_user(new_user("bob")).await.unwrap();

    let score = store
        .record_typing_score(NewTypingScore {
            user_id: alice.id.clone(),
            challenge_id: "tc-1".to_string(),
            wpm: 100.0,
            accuracy: 0.97,
        })
        .await
        .unwrap();
    assert_eq!(score.wpm, 100.0);
    store
        .record_typing_score(NewTypingScore {
            user_id: bob.id.clone(),
            challenge_id: "tc-1".to_string(),
            wpm: 100.0,
            accuracy: 0.95,
        })
        .await
        .unwrap();
    store
        .record_typing_score(NewTypingScore {
            user_id: bob.id.clone(),
            challenge_id: "tc-2".to_string(),
            wpm: 90.0,
            accuracy: 0.99,
        })
        .await
        .unwrap();

    // Descending wpm; the tie goes to the earliest recorded score.
    let board = store.typing_leaderboard().await.unwrap();
    assert_eq!(board.len(), 3);
    assert_eq!(board[0].username, "alice");
    assert_eq!(board[1].username, "bob");
    assert_eq!(board[2].wpm, 90.0);

    // The board is capped at ten entries.
    for i in 0..12 {
        store
            .record_typing_score(NewTypingScore {
                user_id: alice.id.clone(),
                challenge_id: "tc-1".to_string(),
                wpm: 50.0 + f64::from(i),
                accuracy: 0.9,
            })
            .await
            .unwrap();
    }
    let board = store.typing_leaderboard().await.unwrap();
    assert_eq!(board.len(), 10);
    assert!(board.windows(2).all(|w| w[0].wpm >= w[1].wpm));

    for i in 0..5 {
        assert!(store
            .put_quiz_question(quiz_question(&format!("qq-{i}")))
            .await
            .unwrap());
    }
    assert!(!store.put_quiz_question(quiz_question("qq-0")).await.unwrap());

    let drawn = store
        .quiz_questions("arrays", Difficulty::Easy, 3)
        .await
        .unwrap();
    assert_eq!(drawn.len(), 3);
    let ids: std::collections::HashSet<_> = drawn.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids.len(), 3);
    assert!(drawn
        .iter()
        .all(|q| q.topic == "arrays" && q.difficulty == Difficulty::Easy));

    // Asking for more than the pool holds returns the whole pool.
    let drawn = store
        .quiz_questions("arrays", Difficulty::Easy, 50)
        .await
        .unwrap();
    assert_eq!(drawn.len(), 5);
    assert!(store
        .quiz_questions("graphs", Difficulty::Easy, 3)
        .await
        .unwrap()
        .is_empty());

    store
        .record_quiz_attempt(NewQuizAttempt {
            user_id: alice.id.clone(),
            topic: "arrays".to_string(),
            difficulty: Difficulty::Easy,
            score: 3,
            total: 5,
        })
        .await
        .unwrap();
    store
        .record_quiz_attempt(NewQuizAttempt {
            user_id: alice.id.clone(),
            topic: "arrays".to_string(),
            difficulty: Difficulty::Easy,
            score: 4,
            total: 5,
        })
        .await
        .unwrap();

    let stats = store.challenge_stats(&bob.id).await.unwrap();
    assert_eq!(stats.typing.completed, 2);
    assert_eq!(stats.typing.average_wpm, 95);
    assert_eq!(stats.typing.best_wpm, 100.0);
    assert_eq!(stats.quiz.completed, 0);
    assert_eq!(stats.brain_teasers.solved, 0);

    let stats = store.challenge_stats(&alice.id).await.unwrap();
    assert_eq!(stats.quiz.completed, 2);
    assert_eq!(stats.quiz.average_score, 4); // 3.5 rounds up

    // A user with no records gets zeroed stats, not an error.
    let stats = store.challenge_stats("ghost").await.unwrap();
    assert_eq!(stats.typing.completed, 0);
    assert_eq!(stats.typing.average_wpm, 0);
}

pub(crate) async fn teasers<S: Store>(store: &S) {
    assert!(store
        .put_brain_teaser(teaser("bt-1", day(1), "14", vec!["think small", "even"]))
        .await
        .unwrap());
    assert!(!store
        .put_brain_teaser(teaser("bt-1", day(1), "14", vec![]))
        .await
        .unwrap());
    // One teaser per calendar date.
    assert!(!store
        .put_brain_teaser(teaser("bt-other", day(1), "15", vec![]))
        .await
        .unwrap());
    assert!(store
        .put_brain_teaser(teaser("bt-2", day(2), "fibonacci", vec![]))
        .await
        .unwrap());

    assert_eq!(
        store
            .get_teaser_for_date(day(1))
            .await
            .unwrap()
            .map(|t| t.id),
        Some("bt-1".to_string())
    );
    assert_eq!(store.get_teaser_for_date(day(9)).await.unwrap(), None);

    let outcome = store
        .submit_teaser_answer("u1", "bt-1", "13")
        .await
        .unwrap()
        .unwrap();
    assert!(!outcome.correct);
    assert_eq!(outcome.attempt.attempts, 1);
    assert!(!outcome.attempt.solved);

    // Answer comparison trims whitespace and ignores ASCII case.
    let outcome = store
        .submit_teaser_answer("u1", "bt-1", " 14 ")
        .await
        .unwrap()
        .unwrap();
    assert!(outcome.correct);
    assert!(outcome.attempt.solved);
    assert_eq!(outcome.attempt.attempts, 2);
    let stamp = outcome.attempt.solved_at.unwrap();

    // Solved is sticky and the solve stamp never moves.
    let outcome = store
        .submit_teaser_answer("u1", "bt-1", "wrong")
        .await
        .unwrap()
        .unwrap();
    assert!(!outcome.correct);
    assert!(outcome.attempt.solved);
    assert_eq!(outcome.attempt.attempts, 3);
    assert_eq!(outcome.attempt.solved_at, Some(stamp));

    assert_eq!(
        store.submit_teaser_answer("u1", "nope", "14").await.unwrap(),
        None
    );

    // Hints reveal progressively and cap at the teaser's hint count.
    let outcome = store.use_teaser_hint("u2", "bt-1").await.unwrap().unwrap();
    assert_eq!(outcome.hint.as_deref(), Some("think small"));
    assert_eq!(outcome.attempt.hints_used, 1);
    let outcome = store.use_teaser_hint("u2", "bt-1").await.unwrap().unwrap();
    assert_eq!(outcome.hint.as_deref(), Some("even"));
    assert_eq!(outcome.attempt.hints_used, 2);
    let outcome = store.use_teaser_hint("u2", "bt-1").await.unwrap().unwrap();
    assert_eq!(outcome.hint, None);
    assert_eq!(outcome.attempt.hints_used, 2);

    // No hints after solving.
    let outcome = store.use_teaser_hint("u1", "bt-1").await.unwrap().unwrap();
    assert_eq!(outcome.hint, None);
    assert_eq!(outcome.attempt.hints_used, 0);

    assert_eq!(store.use_teaser_hint("u1", "nope").await.unwrap(), None);

    let attempt = store
        .get_teaser_attempt("u1", "bt-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(attempt.attempts, 3);
    assert_eq!(store.get_teaser_attempt("u9", "bt-1").await.unwrap(), None);

    store
        .submit_teaser_answer("u1", "bt-2", "FIBONACCI")
        .await
        .unwrap()
        .unwrap();

    // Newest date first, one cell per attempted teaser.
    let calendar = store.teaser_calendar("u1").await.unwrap();
    assert_eq!(calendar.len(), 2);
    assert_eq!(calendar[0].date, day(2));
    assert!(calendar[0].solved);
    assert_eq!(calendar[1].date, day(1));
    assert!(calendar[1].solved);

    let stats = store.challenge_stats("u1").await.unwrap();
    assert_eq!(stats.brain_teasers.solved, 2);
}

pub(crate) async fn marathons<S: Store>(store: &S) {
    let later = store
        .create_marathon(NewMarathon {
            title: "autumn run".to_string(),
            description: "long haul".to_string(),
            start_time: ts(12),
            end_time: ts(18),
            problem_ids: vec!["p1".to_string()],
        })
        .await
        .unwrap();
    let earlier = store
        .create_marathon(NewMarathon {
            title: "summer run".to_string(),
            description: "short haul".to_string(),
            start_time: ts(6),
            end_time: ts(10),
            problem_ids: vec![],
        })
        .await
        .unwrap();
    assert_eq!(later.status, MarathonStatus::Upcoming);

    let listed = store.list_marathons().await.unwrap();
    assert_eq!(
        listed.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
        vec![earlier.id.as_str(), later.id.as_str()]
    );
    assert_eq!(
        store.get_marathon(&later.id).await.unwrap(),
        Some(later.clone())
    );

    let live = store
        .update_marathon_status(&later.id, MarathonStatus::Live)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(live.status, MarathonStatus::Live);
    assert_eq!(live.problem_ids, vec!["p1".to_string()]);
    assert_eq!(
        store
            .update_marathon_status("nope", MarathonStatus::Live)
            .await
            .unwrap(),
        None
    );

    let joined = store
        .join_marathon(&later.id, "u1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(joined.score, 0);
    assert_eq!(joined.rank, None);

    // Joining twice hands back the original record.
    let again = store
        .join_marathon(&later.id, "u1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again.id, joined.id);
    assert_eq!(store.join_marathon("nope", "u1").await.unwrap(), None);

    store.join_marathon(&later.id, "u2").await.unwrap().unwrap();
    let updated = store
        .update_marathon_participant(&later.id, "u2", 50, Some(1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.score, 50);
    assert_eq!(updated.rank, Some(1));
    // A rank-less score update keeps the existing rank.
    let updated = store
        .update_marathon_participant(&later.id, "u2", 60, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.rank, Some(1));
    assert_eq!(
        store
            .update_marathon_participant(&later.id, "ghost", 10, None)
            .await
            .unwrap(),
        None
    );

    // Highest score first.
    let standings = store.list_marathon_participants(&later.id).await.unwrap();
    assert_eq!(
        standings
            .iter()
            .map(|p| p.user_id.as_str())
            .collect::<Vec<_>>(),
        vec!["u2", "u1"]
    );
    assert!(store
        .list_marathon_participants(&earlier.id)
        .await
        .unwrap()
        .is_empty());
}

pub(crate) async fn concurrent_activity<S>(store: S)
where
    S: Store + Clone + Send + Sync + 'static,
{
    let mut handles = Vec::new();
    for _ in 0..10 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.track_activity("u1", 5, 1).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // All ten deltas land; none overwrite each other.
    let record = store.get_activity("u1", today()).await.unwrap().unwrap();
    assert_eq!(record.minutes_active, 50);
    assert_eq!(record.questions_solved, 10);
}

pub(crate) async fn concurrent_lesson_progress<S>(store: S)
where
    S: Store + Clone + Send + Sync + 'static,
{
    let user = store.create_user(new_user("gus")).await.unwrap();
    let course = store
        .create_course(new_course("basics", CourseLevel::Beginner))
        .await
        .unwrap();
    let lesson = store
        .create_lesson(NewLesson {
            course_id: course.id.clone(),
            title: "variables".to_string(),
            description: None,
            content: "let bindings".to_string(),
            order: 1,
            duration_minutes: None,
            video_url: None,
            kind: None,
            quiz_data: None,
        })
        .await
        .unwrap();
    let enrollment = store.enroll(&user.id, &course.id).await.unwrap().unwrap();

    // Half the writers mark the lesson completed, half only add time.
    let mut handles = Vec::new();
    for i in 0..10 {
        let store = store.clone();
        let enrollment_id = enrollment.id.clone();
        let lesson_id = lesson.id.clone();
        let user_id = user.id.clone();
        let completed = i % 2 == 0;
        handles.push(tokio::spawn(async move {
            store
                .update_lesson_progress(&enrollment_id, &lesson_id, &user_id, completed, Some(5))
                .await
                .unwrap()
                .unwrap()
        }));
    }
    let mut stamps = std::collections::HashSet::new();
    for handle in handles {
        if let Some(stamp) = handle.await.unwrap().completed_at {
            stamps.insert(stamp);
        }
    }

    // completed_at was stamped exactly once: every writer that observed a
    // stamp observed the same one.
    assert_eq!(stamps.len(), 1);

    // No time delta was lost and the completion stuck.
    let records = store.list_lesson_progress(&enrollment.id).await.unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert!(record.completed);
    assert_eq!(record.completed_at, stamps.into_iter().next());
    assert_eq!(record.time_spent_minutes, 50);
}

pub(crate) async fn concurrent_enroll<S>(store: S)
where
    S: Store + Clone + Send + Sync + 'static,
{
    let user = store.create_user(new_user("flora")).await.unwrap();
    let course = store
        .create_course(new_course("basics", CourseLevel::Beginner))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let store = store.clone();
        let user_id = user.id.clone();
        let course_id = course.id.clone();
        handles.push(tokio::spawn(async move {
            store.enroll(&user_id, &course_id).await.unwrap().unwrap()
        }));
    }
    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap().id);
    }

    // Exactly one enrollment record, counted exactly once.
    assert_eq!(ids.len(), 1);
    assert_eq!(
        store.get_course(&course.id).await.unwrap().unwrap().students,
        1
    );
}
