//! Persona domain models.
//!
//! Characters are identified by their display name; the name is also the
//! speaker label the model is asked to use in its answer.

use serde::{Deserialize, Serialize};

/// Tone register for one character during one user turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStyle {
    /// Short descriptor, e.g. `共感的`.
    pub style: String,
    /// Longer description of how the character answers.
    pub detail: String,
}

impl CharacterStyle {
    pub fn new(style: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            detail: detail.into(),
        }
    }
}

/// Per-turn style mapping for the fixed characters.
///
/// Insertion order is the order characters are introduced in the prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaParams {
    entries: Vec<(String, CharacterStyle)>,
}

impl PersonaParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the style for `name`, replacing an existing entry in place.
    pub fn insert(&mut self, name: impl Into<String>, style: CharacterStyle) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = style,
            None => self.entries.push((name, style)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CharacterStyle> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, style)| style)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CharacterStyle)> {
        self.entries.iter().map(|(name, style)| (name.as_str(), style))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The extra character that joins the fixed members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WildcardPersona {
    pub name: String,
    /// Personality description inserted into the prompt.
    pub description: String,
}

impl WildcardPersona {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Builds a persona from user-supplied text.
    ///
    /// Both fields must be non-blank; they are used trimmed.
    pub fn custom(name: &str, description: &str) -> Option<Self> {
        let name = name.trim();
        let description = description.trim();
        if name.is_empty() || description.is_empty() {
            return None;
        }
        Some(Self::new(name, description))
    }
}
