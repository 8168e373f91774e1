//! Text completion boundary.
//!
//! Defines the interface to the generative-language endpoint and the typed
//! errors it can produce. Each error's `Display` is the text shown to the
//! user, so callers can render it as a transcript line while tests match on
//! [`CompletionErrorKind`].

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Failure reported by a [`CompletionClient`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// The request could not be sent or the connection failed.
    #[error("エラー: リクエスト送信時に例外が発生しました -> {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    #[error("エラー: ステータスコード {status} -> {body}")]
    HttpStatus { status: u16, body: String },

    /// The response had no candidates.
    #[error("回答が見つかりませんでした。(candidatesが空)")]
    NoCandidates,

    /// The first candidate's content was empty.
    #[error("回答が見つかりませんでした。(contentが空)")]
    EmptyContent,

    /// The response body could not be decoded.
    #[error("エラー: レスポンス解析に失敗しました -> {0}")]
    Parse(String),
}

/// Discriminant of [`CompletionError`] without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionErrorKind {
    Transport,
    HttpStatus,
    EmptyResponse,
    Parse,
}

impl CompletionError {
    pub fn kind(&self) -> CompletionErrorKind {
        match self {
            Self::Transport(_) => CompletionErrorKind::Transport,
            Self::HttpStatus { .. } => CompletionErrorKind::HttpStatus,
            Self::NoCandidates | Self::EmptyContent => CompletionErrorKind::EmptyResponse,
            Self::Parse(_) => CompletionErrorKind::Parse,
        }
    }

    /// HTTP status code, if the endpoint returned one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Sends a prompt to a text-generation endpoint.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the cleaned completion text for `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

static JSON_ARTIFACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)'parts': \[\{'text':.*?\}\], 'role': 'model'")
        .expect("artifact pattern is a valid regex")
});

/// Strips stringified response fragments the model sometimes echoes back.
pub fn remove_json_artifacts(text: &str) -> String {
    JSON_ARTIFACT.replace_all(text, "").trim().to_string()
}
