//! Interaction layer of tomodachi: HTTP clients for the completion and
//! search APIs, the image classifier adapter with its ResNet backend, and
//! the conversation service that ties them to a session.

pub mod conversation;
pub mod gemini_api_agent;
pub mod image_classifier;
pub mod resnet_model;
pub mod web_search_agent;

pub use conversation::ConversationService;
pub use gemini_api_agent::GeminiApiAgent;
pub use image_classifier::{Augmentation, LogitsModel, TtaClassifier};
pub use resnet_model::ResNetModel;
pub use web_search_agent::WebSearchAgent;
