use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// One submitted guess inside a game result, in submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Guess {
    pub id: String,
    pub text: String,
    pub correct: bool,
    pub similarity: f64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Outcome of a single guess submission.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GuessOutcome {
    pub correct: bool,
    pub similarity: f64,
    pub guess: Guess,
    pub game_over: bool,
    pub won: bool,
    pub score: u32,
    /// The video title, revealed only once the game is over.
    pub answer: Option<String>,
    /// Presigned URL for the next frame to reveal, absent when the game is over.
    pub next_frame_url: Option<String>,
}

/// Today's scheduled game as served to the client.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyGame {
    pub id: Uuid,
    pub game_number: i32,
    pub mode: String,
    pub date: String, // YYYY-MM-DD
    pub max_guesses: u32,
    pub frames: Vec<String>,
}

/// A player's stored result for one daily game.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameResultView {
    pub id: Uuid,
    pub daily_game_id: Uuid,
    pub guesses: Vec<Guess>,
    pub score: u32,
    pub won: Option<bool>,
    pub completed: bool,
    pub answer: Option<String>,
}
