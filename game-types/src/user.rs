use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserView {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    pub xp: i64,
    pub level: i32,
    pub title: String,
    pub streak_current: i32,
    pub streak_best: i32,
    pub created_at: String, // ISO 8601 string for simplicity
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserStats {
    pub xp: i64,
    pub level: i32,
    pub title: String,
    pub streak_current: i32,
    pub streak_best: i32,
    pub games_played: u64,
    pub games_won: u64,
    pub win_rate: f64,
}

/// One page of a user's per-game history.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameHistoryPage {
    pub results: Vec<GameHistoryEntry>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameHistoryEntry {
    pub id: Uuid,
    pub daily_game_id: Uuid,
    pub score: u32,
    pub max_score: u32,
    pub guesses_used: u32,
    pub completed: bool,
    pub won: Option<bool>,
    pub completed_at: Option<String>,
    pub game_date: String,
    pub mode: String,
}

/// Counts reported by a successful anonymous-identity claim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MergeResult {
    pub merged: u64,
    pub skipped: u64,
    pub conflicts: u64,
    pub achievements_merged: u64,
    pub duel_matches_updated: u64,
    pub xp_transferred: i64,
}
