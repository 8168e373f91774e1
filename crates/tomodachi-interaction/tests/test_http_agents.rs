use std::sync::Arc;

use serde_json::json;
use tomodachi_core::completion::{CompletionClient, CompletionErrorKind};
use tomodachi_core::config::{SearchMethod, SearchSettings};
use tomodachi_core::persona::WildcardMode;
use tomodachi_core::search::{SearchClient, SearchError};
use tomodachi_core::session::SessionContext;
use tomodachi_core::transcript::TurnKind;
use tomodachi_interaction::{ConversationService, GeminiApiAgent, WebSearchAgent};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-test:generateContent";

fn gemini_agent(server: &MockServer) -> GeminiApiAgent {
    GeminiApiAgent::new("test-key", "gemini-test")
        .with_base_url(format!("{}/v1beta/models/", server.uri()))
}

fn search_settings(server: &MockServer, method: SearchMethod) -> SearchSettings {
    SearchSettings {
        enabled: true,
        endpoint: format!("{}/search", server.uri()),
        method,
        answer_field: "AbstractText".to_string(),
    }
}

#[tokio::test]
async fn test_gemini_returns_first_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "test-key"))
        .and(body_json(json!({"contents": [{"parts": [{"text": "こんにちは"}]}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"parts": [{"text": "ゆかり: やっほー！\nしんや: こんにちは。"}], "role": "model"}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let agent = gemini_agent(&server);
    let text = agent.complete("こんにちは").await.unwrap();

    assert_eq!(text, "ゆかり: やっほー！\nしんや: こんにちは。");
}

#[tokio::test]
async fn test_gemini_strips_echoed_response_fragments() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"parts": [{"text": "みのる: ふむ。'parts': [{'text': 'x'}], 'role': 'model'"}]}
            }]
        })))
        .mount(&server)
        .await;

    let agent = gemini_agent(&server);
    assert_eq!(agent.complete("prompt").await.unwrap(), "みのる: ふむ。");
}

#[tokio::test]
async fn test_gemini_empty_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let agent = gemini_agent(&server);
    let err = agent.complete("prompt").await.unwrap_err();

    assert_eq!(err.kind(), CompletionErrorKind::EmptyResponse);
    assert_eq!(err.to_string(), "回答が見つかりませんでした。(candidatesが空)");
}

#[tokio::test]
async fn test_gemini_invalid_json_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let agent = gemini_agent(&server);
    let err = agent.complete("prompt").await.unwrap_err();
    assert_eq!(err.kind(), CompletionErrorKind::Parse);
}

#[tokio::test]
async fn test_gemini_server_error_becomes_single_error_turn() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let service = ConversationService::new(Arc::new(gemini_agent(&server)));
    let mut session = SessionContext::new("ユーザー", 30, WildcardMode::FixedPerSession);

    let turns = service.handle_input(&mut session, "今日の天気は？").await;

    let produced: Vec<_> = turns.iter().filter(|t| !t.is_user()).collect();
    assert_eq!(produced.len(), 1);
    assert_eq!(produced[0].kind, TurnKind::Error);
    assert!(produced[0].utterance.starts_with("エラー:"));
    assert!(produced[0].utterance.contains("500"));
    assert!(!produced[0].utterance.contains("test-key"));
}

#[tokio::test]
async fn test_gemini_unreachable_is_transport_error() {
    let agent = GeminiApiAgent::new("test-key", "gemini-test").with_base_url("http://127.0.0.1:1");
    let err = agent.complete("prompt").await.unwrap_err();

    assert_eq!(err.kind(), CompletionErrorKind::Transport);
    assert!(err.to_string().starts_with("エラー: リクエスト送信時に例外が発生しました"));
    assert!(!err.to_string().contains("test-key"));
}

#[tokio::test]
async fn test_search_get_reads_answer_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "東京"))
        .and(query_param("format", "json"))
        .and(query_param("no_html", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AbstractText": "東京は日本の首都です。",
            "Heading": "東京"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let agent = WebSearchAgent::new(&search_settings(&server, SearchMethod::Get));
    assert_eq!(agent.search("東京").await.unwrap(), "東京は日本の首都です。");
}

#[tokio::test]
async fn test_search_post_sends_query_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_json(json!({"query": "富士山", "key": "search-key"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AbstractText": "富士山は日本一高い山です。"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let agent = WebSearchAgent::new(&search_settings(&server, SearchMethod::Post))
        .with_api_key(Some("search-key".to_string()));
    assert_eq!(
        agent.search("富士山").await.unwrap(),
        "富士山は日本一高い山です。"
    );
}

#[tokio::test]
async fn test_search_missing_field_is_empty_answer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Heading": "x"})))
        .mount(&server)
        .await;

    let agent = WebSearchAgent::new(&search_settings(&server, SearchMethod::Get));
    assert_eq!(agent.search("なにか").await.unwrap(), "");
}

#[tokio::test]
async fn test_search_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let agent = WebSearchAgent::new(&search_settings(&server, SearchMethod::Get));
    let err = agent.search("なにか").await.unwrap_err();
    assert_eq!(
        err,
        SearchError::HttpStatus {
            status: 403,
            body: "forbidden".to_string()
        }
    );
}

#[tokio::test]
async fn test_blank_search_query_skips_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let agent = WebSearchAgent::new(&search_settings(&server, SearchMethod::Get));
    assert_eq!(agent.search("  ").await.unwrap(), "");
}
