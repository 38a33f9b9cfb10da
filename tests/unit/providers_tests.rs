/*!
 * Tests for the provider clients and the mock provider
 */

use serde_json::json;
use std::time::Duration;

use pdf_chunk_translator::errors::ProviderError;
use pdf_chunk_translator::providers::anthropic::{Anthropic, AnthropicRequest, AnthropicResponse};
use pdf_chunk_translator::providers::google::Google;
use pdf_chunk_translator::providers::mock::{MockBehavior, MockProvider, MockRequest};
use pdf_chunk_translator::providers::ollama::{GenerationRequest, GenerationResponse, Ollama};
use pdf_chunk_translator::providers::openai::{OpenAIRequest, OpenAIResponse, OpenAI};
use pdf_chunk_translator::providers::Provider;

fn mock_request(text: &str) -> MockRequest {
    MockRequest {
        text: text.to_string(),
        source_language: "en".to_string(),
        target_language: "pt".to_string(),
    }
}

/// Google payloads without a sentence array are rejected
#[test]
fn test_googleParseResponse_withUnexpectedShape_shouldFail() {
    let result = Google::parse_response(&json!({"error": "nope"}));
    assert!(matches!(result, Err(ProviderError::ParseError(_))));
}

/// Google sentences with a null translation are skipped, the rest kept in order
#[test]
fn test_googleParseResponse_withNullSentence_shouldKeepOthers() {
    let payload = json!([[["Bom dia.", "Good morning."], [null, "???"], [" Adeus.", " Bye."]], null, null]);
    let response = Google::parse_response(&payload).unwrap();
    assert_eq!(Google::extract_text(&response), "Bom dia. Adeus.");
    assert!(response.detected_source_language.is_none());
}

/// OpenAI requests carry the messages and only the options that were set
#[test]
fn test_openAIRequest_serialization_shouldSkipUnsetOptions() {
    let request = OpenAIRequest::new("gpt-4o-mini")
        .add_message("system", "Translate to Portuguese")
        .add_message("user", "Hello");
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["model"], "gpt-4o-mini");
    assert_eq!(value["messages"][1]["content"], "Hello");
    assert!(value.get("temperature").is_none());
    assert!(value.get("max_tokens").is_none());

    let value = serde_json::to_value(OpenAIRequest::new("m").temperature(0.5).max_tokens(256)).unwrap();
    assert_eq!(value["max_tokens"], 256);
    assert_eq!(value["temperature"], 0.5);
}

/// OpenAI responses yield the trimmed first choice and the token usage
#[test]
fn test_openAIResponse_shouldExtractFirstChoice() {
    let response: OpenAIResponse = serde_json::from_value(json!({
        "choices": [
            {"message": {"role": "assistant", "content": "  Olá  "}},
            {"message": {"role": "assistant", "content": "ignored"}}
        ],
        "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
    }))
    .unwrap();
    assert_eq!(OpenAI::extract_text(&response), "Olá");
    assert_eq!(response.usage.unwrap().total_tokens, 15);
}

/// Anthropic responses join their text blocks and ignore other block types
#[test]
fn test_anthropicResponse_shouldJoinTextBlocks() {
    let response: AnthropicResponse = serde_json::from_value(json!({
        "content": [
            {"type": "text", "text": "Primeira parte, "},
            {"type": "tool_use", "id": "x"},
            {"type": "text", "text": "segunda parte.\n"}
        ],
        "usage": {"input_tokens": 20, "output_tokens": 7}
    }))
    .unwrap();
    assert_eq!(Anthropic::extract_text(&response), "Primeira parte, segunda parte.");
    assert_eq!(response.usage.output_tokens, 7);
}

/// Anthropic requests put the system prompt at the top level
#[test]
fn test_anthropicRequest_serialization_shouldCarrySystemPrompt() {
    let request = AnthropicRequest::new("claude-3-haiku-20240307", 1024)
        .system("You translate documents")
        .add_message("user", "Hello");
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["system"], "You translate documents");
    assert_eq!(value["max_tokens"], 1024);
    assert_eq!(value["messages"][0]["role"], "user");
    assert!(value.get("temperature").is_none());
}

/// Ollama requests never stream, and responses tolerate missing counters
#[test]
fn test_ollamaMessages_shouldSerializeAndParse() {
    let value = serde_json::to_value(GenerationRequest::new("llama3.2:3b", "Hi").system("Be brief")).unwrap();
    assert_eq!(value["stream"], false);
    assert_eq!(value["system"], "Be brief");

    let response: GenerationResponse =
        serde_json::from_value(json!({"model": "llama3.2:3b", "response": " Oi\n", "done": true})).unwrap();
    assert_eq!(Ollama::extract_text(&response), "Oi");
    assert!(response.eval_count.is_none());
}

/// An unreachable local server surfaces as an error from the connection test
#[tokio::test]
async fn test_ollamaTestConnection_withUnreachableServer_shouldFail() {
    let client = Ollama::new("http://127.0.0.1:9", 2);
    assert!(client.test_connection().await.is_err());
}

/// The empty mock returns no text but still counts the request
#[tokio::test]
async fn test_emptyMock_shouldReturnEmptyText() {
    let provider = MockProvider::empty();
    let response = provider.complete(mock_request("Hello")).await.unwrap();
    assert!(MockProvider::extract_text(&response).is_empty());
    assert_eq!(provider.request_count(), 1);
}

/// The failing mock returns an API error for every request
#[tokio::test]
async fn test_failingMock_shouldAlwaysFail() {
    let provider = MockProvider::failing();
    for _ in 0..3 {
        let result = provider.complete(mock_request("Hello")).await;
        assert!(matches!(result, Err(ProviderError::ApiError { status_code: 500, .. })));
    }
    assert_eq!(provider.request_count(), 3);
}

/// The slow mock can be cut short by a timeout
#[tokio::test]
async fn test_slowMock_shouldRespectTimeout() {
    let provider = MockProvider::new(MockBehavior::Slow { delay_ms: 500 });
    let result = tokio::time::timeout(Duration::from_millis(20), provider.complete(mock_request("Hi"))).await;
    assert!(result.is_err());

    let fast = MockProvider::new(MockBehavior::Slow { delay_ms: 5 });
    let response = fast.complete(mock_request("Hi")).await.unwrap();
    assert_eq!(response.text, MockProvider::expected_translation("Hi", "pt"));
}

/// Token estimates follow the word count of the request
#[tokio::test]
async fn test_workingMock_shouldReportTokenEstimates() {
    let provider = MockProvider::working();
    let response = provider.complete(mock_request("one two three")).await.unwrap();
    assert_eq!(response.prompt_tokens, Some(3));
    assert_eq!(response.completion_tokens, Some(4));
}
