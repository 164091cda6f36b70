pub use super::achievements::Entity as Achievements;
pub use super::daily_games::Entity as DailyGames;
pub use super::duel_matches::Entity as DuelMatches;
pub use super::frames::Entity as Frames;
pub use super::game_results::Entity as GameResults;
pub use super::user_achievements::Entity as UserAchievements;
pub use super::users::Entity as Users;
pub use super::videos::Entity as Videos;
