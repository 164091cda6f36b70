pub mod connection;
pub mod entities;
pub mod error;
pub mod frames;
pub mod repositories;

pub use error::GameError;
pub use frames::FrameUrlSigner;
