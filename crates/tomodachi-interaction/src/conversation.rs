//! Conversation orchestration.
//!
//! [`ConversationService`] runs one user interaction from input to appended
//! turns: scoring, style selection, optional search, prompt assembly,
//! completion, and parsing. It holds no conversation state itself; every
//! operation takes the session it works on by `&mut`.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Mutex;
use tomodachi_core::TomodachiError;
use tomodachi_core::completion::{CompletionClient, CompletionError};
use tomodachi_core::persona::{FIXED_CHARACTERS, adjust_parameters};
use tomodachi_core::prompt::{DiscussionPrompt, Topic, summary_prompt};
use tomodachi_core::quiz::pick_quiz;
use tomodachi_core::search::SearchClient;
use tomodachi_core::session::SessionContext;
use tomodachi_core::transcript::{Turn, parse_completion};
use tomodachi_core::vision::{ImageClassifier, describe};

/// Text the image prompt is scored with.
const IMAGE_SCORING_TEXT: &str = "image analysis";

pub struct ConversationService {
    completion: Arc<dyn CompletionClient>,
    search: Option<Arc<dyn SearchClient>>,
    classifier: Option<Arc<dyn ImageClassifier>>,
    rng: Mutex<StdRng>,
}

impl ConversationService {
    pub fn new(completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            completion,
            search: None,
            classifier: None,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_search(mut self, search: Arc<dyn SearchClient>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ImageClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Makes wildcard and quiz picks reproducible.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Handles one line of user text and returns the turns it appended.
    ///
    /// While a quiz is active the text is graded as the answer instead of
    /// being sent to the model.
    pub async fn handle_input(&self, session: &mut SessionContext, input: &str) -> Vec<Turn> {
        let input = input.trim();
        if input.is_empty() {
            return Vec::new();
        }
        let start = session.transcript().len();

        if let Some(quiz) = session.take_quiz() {
            let outcome = quiz.grade(input);
            tracing::info!(?outcome, "Quiz answered");
            session.transcript_mut().push(Turn::quiz(outcome.message()));
            return session.transcript().since(start).to_vec();
        }

        let names = session.character_names();
        let history: Vec<Turn> = session
            .transcript()
            .character_history(&names)
            .into_iter()
            .cloned()
            .collect();

        session.transcript_mut().push(Turn::user(input));

        let params = adjust_parameters(input, session.ai_age());
        let snippet = self.lookup(input).await;
        let wildcard = {
            let mut rng = self.rng.lock().await;
            session.wildcard_for_turn(&mut *rng)
        };

        let history_refs: Vec<&Turn> = history.iter().collect();
        let prompt = DiscussionPrompt {
            user_name: session.user_name(),
            topic: Topic::Question(input),
            ai_age: session.ai_age(),
            params: &params,
            wildcard: &wildcard,
            history: &history_refs,
            search_snippet: snippet.as_deref(),
        }
        .render();

        tracing::info!(
            session_id = %session.id(),
            history_turns = history.len(),
            wildcard = %wildcard.name,
            "Requesting discussion"
        );
        self.complete_into(session, &prompt).await;
        session.transcript().since(start).to_vec()
    }

    /// Classifies an uploaded image and lets the characters discuss it.
    ///
    /// An image whose discussion already succeeded is not handled again
    /// while it is the most recent one; failed attempts can be retried.
    pub async fn handle_image(&self, session: &mut SessionContext, image_bytes: Vec<u8>) -> Vec<Turn> {
        let start = session.transcript().len();
        let digest = image_digest(&image_bytes);

        if session.is_last_image(digest) {
            tracing::debug!("Image already analysed in this session, skipping");
            return Vec::new();
        }

        let Some(classifier) = self.classifier.clone() else {
            session
                .transcript_mut()
                .push(Turn::error("画像解析モデルが設定されていません。"));
            return session.transcript().since(start).to_vec();
        };

        let classified = tokio::task::spawn_blocking(move || classifier.classify(&image_bytes))
            .await
            .map_err(|e| TomodachiError::internal(format!("Classification task failed: {e}")))
            .and_then(|result| result);

        let results = match classified {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("Image analysis failed: {}", e);
                session
                    .transcript_mut()
                    .push(Turn::error(format!("画像解析中にエラーが発生しました: {e}")));
                return session.transcript().since(start).to_vec();
            }
        };

        let analysis = format!("アップロードされた画像の推定結果: {}", describe(&results));
        session
            .transcript_mut()
            .push(Turn::image_analysis(analysis.clone()));

        let params = adjust_parameters(IMAGE_SCORING_TEXT, session.ai_age());
        let wildcard = {
            let mut rng = self.rng.lock().await;
            session.wildcard_for_turn(&mut *rng)
        };
        let prompt = DiscussionPrompt {
            user_name: session.user_name(),
            topic: Topic::ImageAnalysis(&analysis),
            ai_age: session.ai_age(),
            params: &params,
            wildcard: &wildcard,
            history: &[],
            search_snippet: None,
        }
        .render();

        if self.complete_into(session, &prompt).await {
            session.record_image(digest);
        }
        session.transcript().since(start).to_vec()
    }

    /// Asks a quiz question; the next input is graded as its answer.
    pub async fn start_quiz(&self, session: &mut SessionContext) -> Vec<Turn> {
        let start = session.transcript().len();
        let quiz = {
            let mut rng = self.rng.lock().await;
            pick_quiz(&mut *rng)
        };
        session.transcript_mut().push(Turn::quiz(quiz.announcement()));
        session.start_quiz(quiz);
        session.transcript().since(start).to_vec()
    }

    /// Requests a wrap-up of the characters' discussion so far.
    pub async fn summarize(&self, session: &mut SessionContext) -> Vec<Turn> {
        let start = session.transcript().len();
        let discussion = session.transcript().render_history(&session.character_names());

        if discussion.is_empty() {
            session
                .transcript_mut()
                .push(Turn::error("まとめる会話がまだありません。"));
            return session.transcript().since(start).to_vec();
        }

        let prompt = summary_prompt(&discussion, FIXED_CHARACTERS.len() + 1);
        let turn = match self.completion.complete(&prompt).await {
            Ok(text) => Turn::summary(text),
            Err(e) => {
                tracing::warn!(kind = ?e.kind(), "Summary request failed");
                Turn::error(e.to_string())
            }
        };
        session.transcript_mut().push(turn);
        session.transcript().since(start).to_vec()
    }

    /// Sends `prompt` and appends either the parsed dialogue or one error turn.
    ///
    /// Returns true when dialogue was appended.
    async fn complete_into(&self, session: &mut SessionContext, prompt: &str) -> bool {
        let outcome = self
            .completion
            .complete(prompt)
            .await
            .map(|text| parse_completion(&text))
            .and_then(|turns| {
                if turns.is_empty() {
                    Err(CompletionError::EmptyContent)
                } else {
                    Ok(turns)
                }
            });

        match outcome {
            Ok(turns) => {
                tracing::info!(turns = turns.len(), "Discussion received");
                session.transcript_mut().extend(turns);
                true
            }
            Err(e) => {
                tracing::warn!(kind = ?e.kind(), status = ?e.status(), "Completion failed");
                session.transcript_mut().push(Turn::error(e.to_string()));
                false
            }
        }
    }

    /// Returns a non-empty search snippet, or `None` if search is off or failed.
    async fn lookup(&self, query: &str) -> Option<String> {
        let search = self.search.as_ref()?;
        match search.search(query).await {
            Ok(snippet) if !snippet.trim().is_empty() => Some(snippet),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Search lookup failed, continuing without it: {}", e);
                None
            }
        }
    }
}

fn image_digest(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}
