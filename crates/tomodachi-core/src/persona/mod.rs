//! Persona domain module.
//!
//! # Module Structure
//!
//! - `model`: `CharacterStyle`, `PersonaParams`, `WildcardPersona`
//! - `preset`: fixed character names and wildcard candidates
//! - `scorer`: keyword scoring of questions
//! - `params`: per-turn style selection
//! - `wildcard`: wildcard character selection and memoization mode

mod model;
mod params;
mod preset;
mod scorer;
mod wildcard;

pub use model::{CharacterStyle, PersonaParams, WildcardPersona};
pub use params::{AgeBracket, adjust_parameters};
pub use preset::{
    FIXED_CHARACTERS, MINORU_NAME, NEW_CHARACTER_LABEL, SHINYA_NAME, YUKARI_NAME,
    default_wildcard_candidates,
};
pub use scorer::{analyze_question, is_emotional};
pub use wildcard::{WildcardGenerator, WildcardMode};
