pub mod game;
pub mod user;

// Re-export all types
pub use game::*;
pub use user::*;
