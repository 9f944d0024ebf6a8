//! Pure derivation helpers shared by both storage backends and by
//! consumers of the calendar view.

use chrono::Days;
use entities::{ChallengeStats, QuizStats, TeaserCalendarEntry, TeaserStats, TypingStats};
use rand::seq::SliceRandom;

/// Reduce raw per-user challenge records into the stats rollup. Both
/// backends fetch the raw rows and share this reduction so the
/// average-of-empty-set behavior (0, never NaN) cannot diverge.
pub fn reduce_challenge_stats(wpms: &[f64], quiz_scores: &[i64], teasers_solved: i64) -> ChallengeStats {
    let typing = if wpms.is_empty() {
        TypingStats::default()
    } else {
        let sum: f64 = wpms.iter().sum();
        let best = wpms.iter().copied().fold(f64::MIN, f64::max);
        TypingStats {
            completed: wpms.len() as i64,
            average_wpm: (sum / wpms.len() as f64).round() as i64,
            best_wpm: best,
        }
    };

    let quiz = if quiz_scores.is_empty() {
        QuizStats::default()
    } else {
        let sum: i64 = quiz_scores.iter().sum();
        QuizStats {
            completed: quiz_scores.len() as i64,
            average_score: (sum as f64 / quiz_scores.len() as f64).round() as i64,
        }
    };

    ChallengeStats {
        typing,
        quiz,
        brain_teasers: TeaserStats {
            solved: teasers_solved,
        },
    }
}

/// Current brain-teaser streak, derived from a calendar ordered newest
/// date first: consecutive solved days walking backward from the most
/// recent entry, stopping at the first unsolved day or calendar gap.
pub fn current_streak(calendar: &[TeaserCalendarEntry]) -> u32 {
    let mut streak = 0;
    let mut expected = match calendar.first() {
        Some(entry) => entry.date,
        None => return 0,
    };

    for entry in calendar {
        if entry.date != expected || !entry.solved {
            break;
        }
        streak += 1;
        expected = match expected.checked_sub_days(Days::new(1)) {
            Some(day) => day,
            None => break,
        };
    }

    streak
}

/// Random sample of `count` elements without replacement. Returns the whole
/// pool (shuffled) when it is smaller than `count`; never errors, never
/// duplicates. Selection policy is uniform, nothing more is guaranteed.
pub fn sample<T: Clone>(pool: &[T], count: usize) -> Vec<T> {
    let mut rng = rand::thread_rng();
    pool.choose_multiple(&mut rng, count).cloned().collect()
}

/// Uniform pick of one element, `None` on an empty pool.
pub fn pick_one<T>(pool: &[T]) -> Option<&T> {
    let mut rng = rand::thread_rng();
    pool.choose(&mut rng)
}
