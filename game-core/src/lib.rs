pub mod matching;
pub mod scoring;

pub use matching::{GuessValidation, is_exact_match, normalize, similarity, validate_guess};
pub use scoring::calculate_score;

/// Maximum number of guesses per game.
pub const MAX_GUESSES: u32 = 6;

/// Number of frames revealed over the course of a game.
pub const FRAMES_PER_GAME: u32 = 6;
