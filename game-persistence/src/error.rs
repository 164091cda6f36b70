use sea_orm::DbErr;
use thiserror::Error;

/// Everything that can go wrong while submitting guesses or claiming an
/// anonymous identity. Matching and scoring themselves never fail; all
/// failures originate at persistence boundaries or precondition checks.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("game not found")]
    GameNotFound,
    #[error("video not found")]
    VideoNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("game already completed")]
    AlreadyCompleted,
    #[error("cannot merge a user with itself")]
    SelfMergeRejected,
    /// The merge transaction rolled back; nothing was persisted.
    #[error("merge aborted: {0}")]
    MergeAborted(DbErr),
    #[error("invalid guess payload: {0}")]
    InvalidGuessData(#[from] serde_json::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
}
