//! Startup seeding: the bootstrap admin account and the static challenge
//! pools.
//!
//! Everything here is idempotent — the admin is created only when absent
//! and the pool writes are insert-if-absent keyed on stable ids, so the
//! seed runs on every startup without duplicating content. The daily brain
//! teasers are keyed `teaser-{date}` and rotate over a fixed question set,
//! giving each calendar day exactly one teaser.

use chrono::Days;
use entities::{BrainTeaser, Difficulty, NewUser, QuizQuestion, Role, TypingChallenge};

use crate::persistence::traits::Store;
use crate::persistence::{today, StoreError};

const ADMIN_USERNAME: &str = "admin";

/// How many days of brain teasers to seed ahead, starting today.
const TEASER_HORIZON_DAYS: u64 = 7;

/// Seed the bootstrap admin and all static pools. `admin_credential` is the
/// already-hashed credential for the admin account; it is only used when
/// the account does not exist yet.
pub async fn seed_all<S: Store>(store: &S, admin_credential: &str) -> Result<(), StoreError> {
    seed_admin(store, admin_credential).await?;
    let typing = seed_typing_challenges(store).await?;
    let quiz = seed_quiz_questions(store).await?;
    let teasers = seed_brain_teasers(store).await?;
    tracing::info!(typing, quiz, teasers, "seeding complete");
    Ok(())
}

async fn seed_admin<S: Store>(store: &S, admin_credential: &str) -> Result<(), StoreError> {
    if store.get_user_by_username(ADMIN_USERNAME).await?.is_some() {
        return Ok(());
    }
    store
        .create_user(NewUser {
            username: ADMIN_USERNAME.to_string(),
            password: admin_credential.to_string(),
            role: Some(Role::Admin),
            external_key: None,
        })
        .await?;
    tracing::info!("created bootstrap admin account");
    Ok(())
}

async fn seed_typing_challenges<S: Store>(store: &S) -> Result<usize, StoreError> {
    let pool = [
        (
            "typing-rust-hello",
            "hello world",
            "rust",
            Difficulty::Easy,
            "fn main() {\n    println!(\"Hello, world!\");\n}",
        ),
        (
            "typing-rust-fib",
            "fibonacci",
            "rust",
            Difficulty::Medium,
            "fn fib(n: u64) -> u64 {\n    match n {\n        0 | 1 => n,\n        _ => fib(n - 1) + fib(n - 2),\n    }\n}",
        ),
        (
            "typing-python-sort",
            "quicksort",
            "python",
            Difficulty::Medium,
            "def quicksort(xs):\n    if len(xs) <= 1:\n        return xs\n    pivot = xs[0]\n    rest = xs[1:]\n    return quicksort([x for x in rest if x < pivot]) + [pivot] + quicksort([x for x in rest if x >= pivot])",
        ),
        (
            "typing-python-swap",
            "swap",
            "python",
            Difficulty::Easy,
            "a, b = b, a",
        ),
        (
            "typing-js-debounce",
            "debounce",
            "javascript",
            Difficulty::Hard,
            "function debounce(fn, ms) {\n  let timer;\n  return (...args) => {\n    clearTimeout(timer);\n    timer = setTimeout(() => fn(...args), ms);\n  };\n}",
        ),
    ];

    let mut inserted = 0;
    for (id, title, language, difficulty, snippet) in pool {
        if store
            .put_typing_challenge(TypingChallenge {
                id: id.to_string(),
                title: title.to_string(),
                language: language.to_string(),
                difficulty,
                snippet: snippet.to_string(),
            })
            .await?
        {
            inserted += 1;
        }
    }
    Ok(inserted)
}

async fn seed_quiz_questions<S: Store>(store: &S) -> Result<usize, StoreError> {
    let pool = [
        (
            "quiz-arrays-1",
            "arrays",
            Difficulty::Easy,
            "What is the time complexity of accessing an array element by index?",
            vec!["O(1)", "O(log n)", "O(n)", "O(n log n)"],
            0,
        ),
        (
            "quiz-arrays-2",
            "arrays",
            Difficulty::Easy,
            "What is the time complexity of binary search on a sorted array?",
            vec!["O(1)", "O(log n)", "O(n)", "O(n^2)"],
            1,
        ),
        (
            "quiz-arrays-3",
            "arrays",
            Difficulty::Medium,
            "Which technique finds a pair summing to a target in a sorted array in O(n)?",
            vec!["Binary search", "Two pointers", "Backtracking", "Hashing only"],
            1,
        ),
        (
            "quiz-graphs-1",
            "graphs",
            Difficulty::Easy,
            "Which traversal explores neighbors level by level?",
            vec!["DFS", "BFS", "Dijkstra", "Topological sort"],
            1,
        ),
        (
            "quiz-graphs-2",
            "graphs",
            Difficulty::Medium,
            "Which algorithm computes shortest paths with non-negative edge weights?",
            vec!["Bellman-Ford", "Dijkstra", "Kruskal", "Prim"],
            1,
        ),
        (
            "quiz-dp-1",
            "dynamic-programming",
            Difficulty::Hard,
            "What is the time complexity of the classic longest-common-subsequence table?",
            vec!["O(n)", "O(n log n)", "O(n * m)", "O(2^n)"],
            2,
        ),
    ];

    let mut inserted = 0;
    for (id, topic, difficulty, question, options, correct_answer) in pool {
        if store
            .put_quiz_question(QuizQuestion {
                id: id.to_string(),
                topic: topic.to_string(),
                difficulty,
                question: question.to_string(),
                options: options.into_iter().map(str::to_string).collect(),
                correct_answer,
            })
            .await?
        {
            inserted += 1;
        }
    }
    Ok(inserted)
}

async fn seed_brain_teasers<S: Store>(store: &S) -> Result<usize, StoreError> {
    let rotation = [
        (
            "A bat and a ball cost $1.10 together. The bat costs $1.00 more than the ball. How many cents does the ball cost?",
            "5",
            vec!["It is not 10.", "Write it as an equation.", "b + (b + 100) = 110"],
            Some("Let b be the ball's price in cents: b + (b + 100) = 110, so b = 5."),
        ),
        (
            "How many times can you subtract 10 from 100?",
            "1",
            vec!["Read the question literally.", "After the first subtraction it is no longer 100."],
            Some("Once — after that you are subtracting from 90."),
        ),
        (
            "What is the minimum number of comparisons to find both min and max of 4 distinct numbers?",
            "4",
            vec!["Pair the elements first.", "Compare winners with winners and losers with losers."],
            Some("Two comparisons to split into pair winners/losers, then one each for max and min."),
        ),
        (
            "In how many ways can you climb 4 stairs taking 1 or 2 steps at a time?",
            "5",
            vec!["Small cases: 1 stair is 1 way, 2 stairs are 2 ways.", "Each count is the sum of the previous two."],
            Some("The counts follow Fibonacci: 1, 2, 3, 5."),
        ),
        (
            "What is the only number whose English spelling has its letters in alphabetical order?",
            "forty",
            vec!["It is below one hundred.", "f-o-r-t-y"],
            None,
        ),
        (
            "A binary tree has 10 leaves and every internal node has exactly two children. How many internal nodes does it have?",
            "9",
            vec!["Count edges two ways.", "A full binary tree with L leaves has L - 1 internal nodes."],
            Some("In a full binary tree, internal nodes = leaves - 1."),
        ),
        (
            "What is 2^10?",
            "1024",
            vec!["It is just above one thousand."],
            None,
        ),
    ];

    let start = today();
    let mut inserted = 0;
    for offset in 0..TEASER_HORIZON_DAYS {
        let Some(date) = start.checked_add_days(Days::new(offset)) else {
            break;
        };
        let (question, solution, hints, explanation) = &rotation[offset as usize % rotation.len()];
        if store
            .put_brain_teaser(BrainTeaser {
                id: format!("teaser-{date}"),
                date,
                question: (*question).to_string(),
                hints: hints.iter().map(|h| (*h).to_string()).collect(),
                solution: (*solution).to_string(),
                explanation: explanation.map(str::to_string),
            })
            .await?
        {
            inserted += 1;
        }
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::traits::{ChallengeRepository, UserRepository};
    use crate::persistence::MemoryStore;

    #[tokio::test]
    async fn seeds_admin_and_pools() {
        let store = MemoryStore::new();
        seed_all(&store, "hashed-admin-credential").await.unwrap();

        let admin = store
            .get_user_by_username("admin")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, Role::Admin);

        assert!(!store.list_typing_challenges().await.unwrap().is_empty());
        assert!(!store
            .quiz_questions("arrays", Difficulty::Easy, 10)
            .await
            .unwrap()
            .is_empty());
        assert!(store
            .get_teaser_for_date(today())
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn reseeding_does_not_duplicate() {
        let store = MemoryStore::new();
        seed_all(&store, "hashed-admin-credential").await.unwrap();

        let challenges = store.list_typing_challenges().await.unwrap().len();
        let questions = store
            .quiz_questions("arrays", Difficulty::Easy, 100)
            .await
            .unwrap()
            .len();

        seed_all(&store, "other-credential").await.unwrap();

        assert_eq!(store.list_typing_challenges().await.unwrap().len(), challenges);
        assert_eq!(
            store
                .quiz_questions("arrays", Difficulty::Easy, 100)
                .await
                .unwrap()
                .len(),
            questions
        );

        // The existing admin's credential is left alone.
        let admin = store
            .get_user_by_username("admin")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.password, "hashed-admin-credential");
    }

    #[tokio::test]
    async fn teasers_cover_the_horizon() {
        let store = MemoryStore::new();
        seed_all(&store, "hashed-admin-credential").await.unwrap();

        for offset in 0..super::TEASER_HORIZON_DAYS {
            let date = today().checked_add_days(Days::new(offset)).unwrap();
            let teaser = store.get_teaser_for_date(date).await.unwrap().unwrap();
            assert_eq!(teaser.id, format!("teaser-{date}"));
        }
    }
}
