pub mod prelude;

pub mod achievements;
pub mod daily_games;
pub mod duel_matches;
pub mod frames;
pub mod game_results;
pub mod user_achievements;
pub mod users;
pub mod videos;
