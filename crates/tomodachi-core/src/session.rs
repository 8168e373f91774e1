//! Session-scoped conversation state.
//!
//! Everything that lives for one chat session (transcript, memoized wildcard
//! character, active quiz, last analysed image) is held by a single
//! [`SessionContext`] that is passed by `&mut` to the code that changes it.

use rand::Rng;

use crate::config::ChatSettings;
use crate::persona::{
    FIXED_CHARACTERS, NEW_CHARACTER_LABEL, WildcardGenerator, WildcardMode, WildcardPersona,
};
use crate::quiz::QuizItem;
use crate::transcript::Transcript;

#[derive(Debug, Clone)]
pub struct SessionContext {
    id: String,
    user_name: String,
    ai_age: u32,
    transcript: Transcript,
    wildcard_mode: WildcardMode,
    generator: WildcardGenerator,
    wildcard: Option<WildcardPersona>,
    active_quiz: Option<QuizItem>,
    last_image_digest: Option<u64>,
}

impl SessionContext {
    pub fn new(user_name: impl Into<String>, ai_age: u32, wildcard_mode: WildcardMode) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_name: user_name.into(),
            ai_age: ai_age.max(1),
            transcript: Transcript::new(),
            wildcard_mode,
            generator: WildcardGenerator::default(),
            wildcard: None,
            active_quiz: None,
            last_image_digest: None,
        }
    }

    /// Creates a session from the `[chat]` settings.
    pub fn from_settings(settings: &ChatSettings) -> Self {
        Self::new(
            settings.user_name.clone(),
            settings.ai_age,
            settings.wildcard_mode,
        )
        .with_generator(WildcardGenerator::new(settings.custom_wildcard()))
    }

    pub fn with_generator(mut self, generator: WildcardGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Blank names are ignored; the name is stored trimmed.
    pub fn set_user_name(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.user_name = name.to_string();
        }
    }

    pub fn ai_age(&self) -> u32 {
        self.ai_age
    }

    pub fn set_ai_age(&mut self, age: u32) {
        self.ai_age = age.max(1);
    }

    pub fn wildcard_mode(&self) -> WildcardMode {
        self.wildcard_mode
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    /// The wildcard character of the most recent prompt, if any.
    pub fn current_wildcard(&self) -> Option<&WildcardPersona> {
        self.wildcard.as_ref()
    }

    /// Returns the wildcard character for the prompt being built.
    ///
    /// In [`WildcardMode::FixedPerSession`] the first pick is kept; in
    /// [`WildcardMode::RegeneratedPerTurn`] a new one is drawn every call.
    pub fn wildcard_for_turn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> WildcardPersona {
        let persona = match (&self.wildcard, self.wildcard_mode) {
            (Some(existing), WildcardMode::FixedPerSession) => existing.clone(),
            _ => self.generator.pick(rng),
        };
        self.wildcard = Some(persona.clone());
        persona
    }

    /// Speakers whose turns are replayed as history.
    ///
    /// Includes the fixed members, the generic wildcard label, and every
    /// wildcard name that may have spoken in this session.
    pub fn character_names(&self) -> Vec<String> {
        let mut names: Vec<String> = FIXED_CHARACTERS.iter().map(|s| s.to_string()).collect();
        names.push(NEW_CHARACTER_LABEL.to_string());

        let wildcard_names = match self.wildcard_mode {
            WildcardMode::FixedPerSession => self
                .wildcard
                .iter()
                .map(|w| w.name.clone())
                .collect::<Vec<_>>(),
            WildcardMode::RegeneratedPerTurn => self
                .generator
                .custom()
                .into_iter()
                .chain(self.generator.candidates())
                .map(|w| w.name.clone())
                .collect(),
        };
        for name in wildcard_names {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    pub fn active_quiz(&self) -> Option<&QuizItem> {
        self.active_quiz.as_ref()
    }

    pub fn start_quiz(&mut self, quiz: QuizItem) {
        self.active_quiz = Some(quiz);
    }

    /// Removes and returns the active quiz.
    pub fn take_quiz(&mut self) -> Option<QuizItem> {
        self.active_quiz.take()
    }

    /// Returns true if `digest` is the last image that was fully discussed.
    pub fn is_last_image(&self, digest: u64) -> bool {
        self.last_image_digest == Some(digest)
    }

    /// Marks `digest` as discussed. Call only once the discussion succeeded.
    pub fn record_image(&mut self, digest: u64) {
        self.last_image_digest = Some(digest);
    }

    /// Clears the transcript and every memoized value.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.wildcard = None;
        self.active_quiz = None;
        self.last_image_digest = None;
        self.id = uuid::Uuid::new_v4().to_string();
    }
}
