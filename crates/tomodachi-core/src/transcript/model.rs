//! Turn and transcript models.
//!
//! A transcript is the ordered record of everything said in one session. Its
//! order is replayed verbatim into later prompts, so turns are only ever
//! appended.

use serde::{Deserialize, Serialize};

/// Speaker label used for turns typed by the user.
pub const USER_SPEAKER: &str = "user";
/// Speaker label for quiz questions and results.
pub const QUIZ_SPEAKER: &str = "クイズ";
/// Speaker label for image classification results.
pub const IMAGE_ANALYSIS_SPEAKER: &str = "画像解析";
/// Speaker label for conversation summaries.
pub const SUMMARY_SPEAKER: &str = "まとめ";
/// Speaker label for error turns.
pub const SYSTEM_SPEAKER: &str = "システム";

/// What produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    /// Typed by the user.
    User,
    /// A character line parsed from a completion.
    Dialogue,
    /// A failure surfaced as readable text.
    Error,
    /// Quiz question or grading result.
    Quiz,
    /// Image classification result.
    ImageAnalysis,
    /// Model-written summary of the conversation.
    Summary,
}

/// A single utterance in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who said it. Empty when a completion line had no speaker prefix.
    pub speaker: String,
    /// What was said.
    pub utterance: String,
    pub kind: TurnKind,
    /// Timestamp when the turn was created (ISO 8601 format).
    pub created_at: String,
}

impl Turn {
    pub fn new(speaker: impl Into<String>, utterance: impl Into<String>, kind: TurnKind) -> Self {
        Self {
            speaker: speaker.into(),
            utterance: utterance.into(),
            kind,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn user(utterance: impl Into<String>) -> Self {
        Self::new(USER_SPEAKER, utterance, TurnKind::User)
    }

    pub fn dialogue(speaker: impl Into<String>, utterance: impl Into<String>) -> Self {
        Self::new(speaker, utterance, TurnKind::Dialogue)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(SYSTEM_SPEAKER, message, TurnKind::Error)
    }

    pub fn quiz(message: impl Into<String>) -> Self {
        Self::new(QUIZ_SPEAKER, message, TurnKind::Quiz)
    }

    pub fn image_analysis(message: impl Into<String>) -> Self {
        Self::new(IMAGE_ANALYSIS_SPEAKER, message, TurnKind::ImageAnalysis)
    }

    pub fn summary(message: impl Into<String>) -> Self {
        Self::new(SUMMARY_SPEAKER, message, TurnKind::Summary)
    }

    /// Returns true if this turn was produced by the user.
    pub fn is_user(&self) -> bool {
        self.kind == TurnKind::User
    }

    /// Formats the turn in the `name: utterance` line grammar.
    pub fn as_line(&self) -> String {
        format!("{}: {}", self.speaker, self.utterance)
    }
}

/// Ordered, append-only sequence of turns owned by one session.
///
/// There is no way to obtain a mutable reference to a stored turn; the only
/// mutation besides appending is [`Transcript::clear`], used on session reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one turn.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Appends turns in iteration order.
    pub fn extend<I>(&mut self, turns: I)
    where
        I: IntoIterator<Item = Turn>,
    {
        self.turns.extend(turns);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Returns the turns appended at or after `start`.
    pub fn since(&self, start: usize) -> &[Turn] {
        &self.turns[start.min(self.turns.len())..]
    }

    /// Returns true if the user has spoken before in this session.
    pub fn has_user_turns(&self) -> bool {
        self.turns.iter().any(Turn::is_user)
    }

    /// Dialogue turns whose speaker is one of `names`, in order.
    pub fn character_history<S: AsRef<str>>(&self, names: &[S]) -> Vec<&Turn> {
        self.turns
            .iter()
            .filter(|turn| turn.kind == TurnKind::Dialogue)
            .filter(|turn| names.iter().any(|name| name.as_ref() == turn.speaker))
            .collect()
    }

    /// Character history joined into `name: utterance` lines.
    pub fn render_history<S: AsRef<str>>(&self, names: &[S]) -> String {
        self.character_history(names)
            .into_iter()
            .map(Turn::as_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub(crate) fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("こんにちは"));
        transcript.push(Turn::dialogue("ゆかり", "やっほー！"));
        transcript.push(Turn::dialogue("しんや", "こんにちは。"));

        let speakers: Vec<&str> = transcript.turns().iter().map(|t| t.speaker.as_str()).collect();
        assert_eq!(speakers, vec!["user", "ゆかり", "しんや"]);
    }

    #[test]
    fn test_character_history_filters_non_characters() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("質問です"));
        transcript.push(Turn::dialogue("ゆかり", "なになに？"));
        transcript.push(Turn::dialogue("だれか", "知らない人"));
        transcript.push(Turn::error("エラー: ステータスコード 500 -> boom"));
        transcript.push(Turn::dialogue("みのる", "聞こう。"));

        let history = transcript.render_history(&["ゆかり", "しんや", "みのる"]);
        assert_eq!(history, "ゆかり: なになに？\nみのる: 聞こう。");
    }

    #[test]
    fn test_since_returns_tail() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("a"));
        let mark = transcript.len();
        transcript.push(Turn::dialogue("ゆかり", "b"));

        assert_eq!(transcript.since(mark).len(), 1);
        assert_eq!(transcript.since(99).len(), 0);
    }
}
