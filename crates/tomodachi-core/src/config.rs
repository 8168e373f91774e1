//! Configuration models.
//!
//! `config.toml` holds appearance and chat settings, `secret.json` holds API
//! keys. Every field has a default so a missing or partial file still yields
//! a usable configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::persona::{WildcardMode, WildcardPersona};

pub const DEFAULT_MODEL_NAME: &str = "gemini-2.0-flash-001";
pub const DEFAULT_USER_NAME: &str = "ユーザー";
pub const DEFAULT_AI_AGE: u32 = 30;

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub theme: ThemeConfig,
    pub chat: ChatSettings,
    pub search: SearchSettings,
    /// Image analysis is off unless this section is present.
    pub vision: Option<VisionSettings>,
}

/// Colors and font used when rendering the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeConfig {
    pub primary_color: String,
    pub background_color: String,
    pub secondary_background_color: String,
    pub text_color: String,
    pub font: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            primary_color: "#729075".to_string(),
            background_color: "#f1ece3".to_string(),
            secondary_background_color: "#fff8ef".to_string(),
            text_color: "#5e796a".to_string(),
            font: "monospace".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub user_name: String,
    /// Age the characters act as. Values below 1 are raised to 1.
    pub ai_age: u32,
    pub model_name: String,
    pub wildcard_mode: WildcardMode,
    pub custom_character: Option<CustomCharacter>,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            user_name: DEFAULT_USER_NAME.to_string(),
            ai_age: DEFAULT_AI_AGE,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            wildcard_mode: WildcardMode::default(),
            custom_character: None,
        }
    }
}

impl ChatSettings {
    /// The configured custom wildcard, if both fields are filled in.
    pub fn custom_wildcard(&self) -> Option<WildcardPersona> {
        self.custom_character
            .as_ref()
            .and_then(|c| WildcardPersona::custom(&c.name, &c.description))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomCharacter {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMethod {
    #[default]
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub enabled: bool,
    pub endpoint: String,
    pub method: SearchMethod,
    /// JSON field holding the short answer.
    pub answer_field: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://api.duckduckgo.com/".to_string(),
            method: SearchMethod::Get,
            answer_field: "AbstractText".to_string(),
        }
    }
}

/// Network layout of the safetensors checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResNetArchitecture {
    #[default]
    Resnet18,
    Resnet34,
    Resnet50,
}

/// `[vision]`: a ResNet checkpoint plus its class names.
///
/// Relative paths are resolved against the config directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionSettings {
    pub model_path: PathBuf,
    /// Text file with one class name per line, in logit order.
    pub labels_path: PathBuf,
    #[serde(default)]
    pub architecture: ResNetArchitecture,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    crate::vision::DEFAULT_TOP_K
}

/// Root of `secret.json`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
    #[serde(default)]
    pub search: Option<SearchSecret>,
}

/// Gemini API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchSecret {
    pub api_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r##"
            [theme]
            primaryColor = "#112233"

            [chat]
            ai_age = 55
            wildcard_mode = "regenerated_per_turn"
            "##,
        )
        .unwrap();

        assert_eq!(config.theme.primary_color, "#112233");
        assert_eq!(config.theme.background_color, "#f1ece3");
        assert_eq!(config.chat.ai_age, 55);
        assert_eq!(config.chat.user_name, DEFAULT_USER_NAME);
        assert_eq!(config.chat.wildcard_mode, WildcardMode::RegeneratedPerTurn);
        assert!(!config.search.enabled);
        assert!(config.vision.is_none());
    }

    #[test]
    fn test_vision_section() {
        let config: AppConfig = toml::from_str(
            r#"
            [vision]
            model_path = "models/resnet50.safetensors"
            labels_path = "models/imagenet_classes.txt"
            architecture = "resnet50"
            "#,
        )
        .unwrap();

        let vision = config.vision.unwrap();
        assert_eq!(vision.model_path, PathBuf::from("models/resnet50.safetensors"));
        assert_eq!(vision.labels_path, PathBuf::from("models/imagenet_classes.txt"));
        assert_eq!(vision.architecture, ResNetArchitecture::Resnet50);
        assert_eq!(vision.top_k, crate::vision::DEFAULT_TOP_K);
    }

    #[test]
    fn test_vision_section_needs_both_paths() {
        let result: std::result::Result<AppConfig, _> = toml::from_str(
            r#"
            [vision]
            model_path = "resnet18.safetensors"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_character_needs_both_fields() {
        let mut chat = ChatSettings::default();
        chat.custom_character = Some(CustomCharacter {
            name: "はると".to_string(),
            description: " ".to_string(),
        });
        assert!(chat.custom_wildcard().is_none());

        chat.custom_character = Some(CustomCharacter {
            name: "はると".to_string(),
            description: "陽気".to_string(),
        });
        assert_eq!(chat.custom_wildcard().unwrap().name, "はると");
    }

    #[test]
    fn test_secret_json() {
        let secret: SecretConfig =
            serde_json::from_str(r#"{"gemini": {"api_key": "k"}}"#).unwrap();
        assert_eq!(secret.gemini.unwrap().api_key, "k");
        assert!(secret.search.is_none());
    }
}
