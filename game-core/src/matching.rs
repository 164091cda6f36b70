use serde::{Deserialize, Serialize};

/// Title similarity at or above this is reported to the client as-is.
pub const SIMILARITY_REPORT_THRESHOLD: f64 = 0.4;

/// Title similarity at or above this counts as a correct guess.
pub const FUZZY_WIN_THRESHOLD: f64 = 0.85;

/// Channel-name similarity is a weaker signal and is down-weighted.
pub const CHANNEL_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuessValidation {
    pub correct: bool,
    pub similarity: f64,
}

/// Normalize a title for comparison: lowercase, strip punctuation, collapse whitespace.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Check if a guess exactly matches the answer (after normalization).
pub fn is_exact_match(guess: &str, answer: &str) -> bool {
    normalize(guess) == normalize(answer)
}

/// Classic dynamic-programming Levenshtein distance, two-row variant.
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j]
            } else {
                1 + prev[j].min(prev[j + 1]).min(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Similarity between guess and answer in [0, 1], rounded to two decimals.
///
/// Identical normalized strings score 1.0; if exactly one side normalizes
/// to the empty string the score is 0.
pub fn similarity(guess: &str, answer: &str) -> f64 {
    let a = normalize(guess);
    let b = normalize(answer);

    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let distance = levenshtein_distance(&a, &b) as f64;
    let max_len = a.chars().count().max(b.chars().count()) as f64;

    ((1.0 - distance / max_len) * 100.0).round() / 100.0
}

/// Validate a guess against the target video's title and channel name.
///
/// Exact title matches always win. High title similarity (>= 0.85) also
/// counts as a win. Below the reporting threshold, the channel name is
/// blended in as a down-weighted signal but can never produce a win.
pub fn validate_guess(guess: &str, video_title: &str, channel_name: &str) -> GuessValidation {
    if is_exact_match(guess, video_title) {
        return GuessValidation {
            correct: true,
            similarity: 1.0,
        };
    }

    let title_similarity = similarity(guess, video_title);
    if title_similarity >= SIMILARITY_REPORT_THRESHOLD {
        if title_similarity >= FUZZY_WIN_THRESHOLD {
            return GuessValidation {
                correct: true,
                similarity: title_similarity,
            };
        }
        return GuessValidation {
            correct: false,
            similarity: title_similarity,
        };
    }

    let channel_similarity = similarity(guess, channel_name);

    GuessValidation {
        correct: false,
        similarity: title_similarity.max(channel_similarity * CHANNEL_WEIGHT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(normalize("The Title!!"), "the title");
        assert_eq!(normalize("  MR BEAST:  $1  vs  $500,000  "), "mr beast 1 vs 500000");
        assert_eq!(normalize("---"), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for s in ["Hello, World!", "  a   b\tc  ", "ALLCAPS", "", "é à ü", "123-456"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_exact_match_after_normalization() {
        assert!(is_exact_match("The Title", "the title!!"));
        assert!(is_exact_match("hello", "hello"));
        assert!(!is_exact_match("hello", "world"));
    }

    #[test]
    fn test_similarity_identity_and_symmetry() {
        assert_eq!(similarity("same words", "same words"), 1.0);

        let pairs = [("kitten", "sitting"), ("video title", "video titles"), ("a", "b")];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a));
        }
    }

    #[test]
    fn test_similarity_empty_edge_cases() {
        // One side normalizes to empty: 0. Both empty: equal, so 1.
        assert_eq!(similarity("", "something"), 0.0);
        assert_eq!(similarity("!!!", "something"), 0.0);
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("!!!", "..."), 1.0);
    }

    #[test]
    fn test_similarity_known_distances() {
        // kitten -> sitting: distance 3 over max length 7
        assert_eq!(similarity("kitten", "sitting"), 0.57);
        // one edit over length 5
        assert_eq!(similarity("hello", "hallo"), 0.8);
    }

    #[test]
    fn test_similarity_bounded() {
        for (a, b) in [("abc", "xyz"), ("short", "a much longer string"), ("x", "")] {
            let s = similarity(a, b);
            assert!((0.0..=1.0).contains(&s), "similarity {s} out of range");
        }
    }

    #[test]
    fn test_validate_exact_title_match_wins() {
        let v = validate_guess("The Title", "the title!!", "Some Channel");
        assert!(v.correct);
        assert_eq!(v.similarity, 1.0);
    }

    #[test]
    fn test_validate_fuzzy_title_match_wins() {
        // One character off a 20-char title clears the 0.85 threshold.
        let v = validate_guess(
            "i spent 50 hours in solitary confinment",
            "I Spent 50 Hours In Solitary Confinement",
            "MrBeast",
        );
        assert!(v.correct, "similarity {} should win", v.similarity);
        assert!(v.similarity >= FUZZY_WIN_THRESHOLD);
    }

    #[test]
    fn test_validate_near_miss_is_reported_not_won() {
        // Between the reporting and win thresholds: surfaced, not a win.
        let v = validate_guess("video titles here", "video title goes here", "Channel");
        assert!(!v.correct);
        assert!(v.similarity >= SIMILARITY_REPORT_THRESHOLD);
        assert!(v.similarity < FUZZY_WIN_THRESHOLD);
    }

    #[test]
    fn test_validate_channel_similarity_is_half_weighted() {
        // Guessing the channel name never wins, and the signal is halved.
        let v = validate_guess("PewDiePie", "Minecraft Part 1", "PewDiePie");
        assert!(!v.correct);
        assert_eq!(v.similarity, 0.5);
    }

    #[test]
    fn test_validate_unrelated_guess() {
        let v = validate_guess("zzzzzz", "Completely Different Title", "Other Channel");
        assert!(!v.correct);
        assert!(v.similarity < SIMILARITY_REPORT_THRESHOLD);
    }
}
