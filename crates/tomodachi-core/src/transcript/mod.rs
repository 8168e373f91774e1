//! Transcript domain module.
//!
//! - `model`: `Turn`, `TurnKind`, `Transcript` and the fixed speaker labels
//! - `parser`: turns raw completion text into dialogue turns

mod model;
mod parser;

pub use model::{
    IMAGE_ANALYSIS_SPEAKER, QUIZ_SPEAKER, SUMMARY_SPEAKER, SYSTEM_SPEAKER, Transcript, Turn,
    TurnKind, USER_SPEAKER,
};
pub use parser::{parse_completion, split_line};
