/// Base score for a winning game.
pub const BASE_SCORE: u32 = 1000;

/// Points deducted per wrong guess.
pub const PENALTY_PER_WRONG: u32 = 150;

/// Solves faster than this earn a time bonus.
pub const TIME_BONUS_THRESHOLD_MS: u64 = 30_000;

/// Bonus points per full second remaining under the threshold.
pub const TIME_BONUS_MULTIPLIER: u64 = 2;

/// Calculate the player's score for a won game.
///
/// The final guess is the correct one and is not penalized. Only called
/// for wins; a loss always scores 0 at the call site.
pub fn calculate_score(guesses_used: u32, _max_guesses: u32, time_ms: u64) -> u32 {
    let wrong_guesses = guesses_used.saturating_sub(1);
    let base = BASE_SCORE as i64 - (wrong_guesses * PENALTY_PER_WRONG) as i64;

    let time_bonus = if time_ms < TIME_BONUS_THRESHOLD_MS {
        let remaining_seconds = (TIME_BONUS_THRESHOLD_MS - time_ms) / 1000;
        (remaining_seconds * TIME_BONUS_MULTIPLIER) as i64
    } else {
        0
    };

    (base + time_bonus).max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_GUESSES;

    #[test]
    fn test_first_guess_with_time_bonus() {
        // 1000 base + floor((30000 - 5000) / 1000) * 2 = 1050
        assert_eq!(calculate_score(1, MAX_GUESSES, 5_000), 1_050);
    }

    #[test]
    fn test_no_bonus_at_or_over_threshold() {
        assert_eq!(calculate_score(1, MAX_GUESSES, 30_000), 1_000);
        assert_eq!(calculate_score(1, MAX_GUESSES, 600_000), 1_000);
    }

    #[test]
    fn test_wrong_guess_penalty() {
        assert_eq!(calculate_score(2, MAX_GUESSES, 60_000), 850);
        assert_eq!(calculate_score(6, MAX_GUESSES, 60_000), 250);
    }

    #[test]
    fn test_score_never_negative() {
        // 9 wrong guesses would be -350 before clamping
        assert_eq!(calculate_score(10, MAX_GUESSES, 60_000), 0);
        assert_eq!(calculate_score(100, MAX_GUESSES, 0), 0);
    }

    #[test]
    fn test_monotonic_in_guesses_used() {
        for time_ms in [0, 10_000, 45_000] {
            let mut last = u32::MAX;
            for guesses in 1..=10 {
                let score = calculate_score(guesses, MAX_GUESSES, time_ms);
                assert!(score <= last, "score increased at {guesses} guesses");
                last = score;
            }
        }
    }

    #[test]
    fn test_monotonic_in_elapsed_time() {
        for guesses in 1..=6 {
            let mut last = u32::MAX;
            for time_ms in (0..60_000).step_by(1_500) {
                let score = calculate_score(guesses, MAX_GUESSES, time_ms);
                assert!(score <= last, "score increased at {time_ms}ms");
                last = score;
            }
        }
    }

    #[test]
    fn test_bonus_uses_whole_seconds() {
        // 29999ms elapsed leaves 1ms under the threshold: floor to 0 seconds
        assert_eq!(calculate_score(1, MAX_GUESSES, 29_999), 1_000);
        // 28999ms leaves 1001ms: floor to 1 second, +2
        assert_eq!(calculate_score(1, MAX_GUESSES, 28_999), 1_002);
    }
}
