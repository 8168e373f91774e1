//! Domain layer of tomodachi: characters, prompts, transcripts and the
//! collaborator interfaces the interaction layer implements.

pub mod completion;
pub mod config;
pub mod error;
pub mod persona;
pub mod prompt;
pub mod quiz;
pub mod search;
pub mod secret;
pub mod session;
pub mod transcript;
pub mod vision;

// Re-export common error type
pub use error::TomodachiError;
