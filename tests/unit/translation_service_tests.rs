/*!
 * Tests for the translation service and the page translator
 */

use pdf_chunk_translator::app_config::{Config, TranslationConfig, TranslationProvider};
use pdf_chunk_translator::errors::{ProviderError, TranslationError};
use pdf_chunk_translator::pdf::SourcePage;
use pdf_chunk_translator::providers::mock::MockProvider;
use pdf_chunk_translator::translation::{PageTranslator, TranslationService};

fn mock_service(mock: MockProvider) -> TranslationService {
    TranslationService::with_mock(Config::default().translation, mock)
}

fn page(number: u32, text: &str) -> SourcePage {
    SourcePage {
        number,
        text: text.to_string(),
    }
}

/// The working mock prefixes the target language
#[tokio::test]
async fn test_translateText_withWorkingMock_shouldTranslate() {
    let mock = MockProvider::working();
    let service = mock_service(mock.clone());

    let translated = service.translate_text("Hello world", "en", "pt").await.unwrap();
    assert_eq!(translated, "[pt] Hello world");
    assert_eq!(mock.requests()[0].source_language, "en");
    assert_eq!(mock.requests()[0].target_language, "pt");
}

/// Whitespace-only text never reaches the provider
#[tokio::test]
async fn test_translateText_withWhitespace_shouldSkipProvider() {
    let mock = MockProvider::working();
    let service = mock_service(mock.clone());

    let (translated, usage) = service
        .translate_text_with_usage(" \n\t ", "en", "pt")
        .await
        .unwrap();
    assert!(translated.is_empty());
    assert_eq!(usage.requests, 0);
    assert_eq!(mock.request_count(), 0);
}

/// Text above the request limit is sent in several requests and joined with newlines
#[tokio::test]
async fn test_translateText_withLongText_shouldSplitRequests() {
    let mock = MockProvider::working();
    let mut config = Config::default().translation;
    config.active_provider_config_mut().max_chars_per_request = 12;
    let service = TranslationService::with_mock(config, mock.clone());

    let (translated, usage) = service
        .translate_text_with_usage("first line\nsecond line\nthird", "en", "pt")
        .await
        .unwrap();

    assert_eq!(mock.request_count(), 3);
    assert_eq!(usage.requests, 3);
    assert_eq!(translated, "[pt] first line\n[pt] second line\n[pt] third");
    assert!(mock.requests().iter().all(|r| r.text.chars().count() <= 12));
}

/// A paragraph break that falls between two requests survives in the joined translation
#[tokio::test]
async fn test_translateText_withBlankLineAtRequestBoundary_shouldKeepParagraphs() {
    let mock = MockProvider::working();
    let mut config = Config::default().translation;
    config.active_provider_config_mut().max_chars_per_request = 12;
    let service = TranslationService::with_mock(config, mock.clone());

    let translated = service
        .translate_text("first line\n\nsecond line", "en", "pt")
        .await
        .unwrap();

    assert_eq!(translated, "[pt] first line\n\n[pt] second line");
    let sent: Vec<String> = mock.requests().into_iter().map(|r| r.text).collect();
    assert_eq!(sent, vec!["first line".to_string(), "second line".to_string()]);
}

/// An empty provider answer is an error, not an empty page
#[tokio::test]
async fn test_translateText_withEmptyResponse_shouldFail() {
    let service = mock_service(MockProvider::empty());
    let result = service.translate_text("Hello", "en", "pt").await;
    assert!(matches!(result, Err(TranslationError::EmptyResponse(_))));
}

/// Provider failures come back wrapped in TranslationError::Provider
#[tokio::test]
async fn test_translateText_withFailingMock_shouldReturnProviderError() {
    let service = mock_service(MockProvider::failing());
    let result = service.translate_text("Hello", "en", "pt").await;
    assert!(matches!(
        result,
        Err(TranslationError::Provider(ProviderError::ApiError { status_code: 500, .. }))
    ));
}

/// Token counts reported by the provider are accumulated per call
#[tokio::test]
async fn test_translateTextWithUsage_shouldReportTokens() {
    let service = mock_service(MockProvider::working());
    let (_, usage) = service
        .translate_text_with_usage("one two three four", "en", "pt")
        .await
        .unwrap();
    assert_eq!(usage.prompt_tokens, Some(4));
    assert_eq!(usage.completion_tokens, Some(5));
    assert_eq!(usage.requests, 1);
}

/// The system prompt is filled with language names
#[test]
fn test_systemPrompt_shouldFillLanguageNames() {
    let service = mock_service(MockProvider::working());
    let prompt = service.system_prompt("en", "pt");
    assert!(prompt.contains("from English to Portuguese"));
    assert!(!prompt.contains('{'));

    let prompt = service.system_prompt("auto", "fr");
    assert!(prompt.contains("the detected source language"));
    assert!(prompt.contains("French"));
}

/// A service can be built for every configured provider
#[test]
fn test_new_withEachProvider_shouldBuildService() {
    let cases = [
        (TranslationProvider::Google, "Google Translate"),
        (TranslationProvider::Ollama, "Ollama"),
        (TranslationProvider::OpenAI, "OpenAI"),
        (TranslationProvider::LMStudio, "LM Studio"),
        (TranslationProvider::Anthropic, "Anthropic"),
    ];
    for (provider, name) in cases {
        let mut config = TranslationConfig::default();
        config.provider = provider;
        let service = TranslationService::new(config).unwrap();
        assert_eq!(service.provider_name(), name);
    }
}

/// Endpoints without a usable host are rejected
#[test]
fn test_new_withInvalidEndpoint_shouldFail() {
    let mut config = TranslationConfig::default();
    config.provider = TranslationProvider::Ollama;
    config.active_provider_config_mut().endpoint = "not a url".to_string();
    assert!(TranslationService::new(config.clone()).is_err());

    config.active_provider_config_mut().endpoint = "http://".to_string();
    assert!(TranslationService::new(config).is_err());
}

/// Usage stats only name a model for LLM providers
#[test]
fn test_newUsageStats_shouldLabelProviderAndModel() {
    let mut config = TranslationConfig::default();
    config.provider = TranslationProvider::Ollama;
    let stats = TranslationService::new(config).unwrap().new_usage_stats();
    assert_eq!(stats.provider, "Ollama");
    assert_eq!(stats.model, "llama3.2:3b");

    let stats = TranslationService::new(TranslationConfig::default()).unwrap().new_usage_stats();
    assert_eq!(stats.provider, "Google Translate");
    assert!(stats.model.is_empty());
}

/// The connection check follows the provider's health
#[tokio::test]
async fn test_testConnection_shouldReflectProvider() {
    assert!(mock_service(MockProvider::working()).test_connection().await.is_ok());
    assert!(mock_service(MockProvider::failing()).test_connection().await.is_err());

    let translated = mock_service(MockProvider::working())
        .test_translation("en", "pt")
        .await
        .unwrap();
    assert!(translated.starts_with("[pt] "));
}

/// Pages are translated in order and blank pages are kept without a request
#[tokio::test]
async fn test_translatePages_shouldKeepOrderAndBlankPages() {
    let mock = MockProvider::working();
    let service = mock_service(mock.clone());
    let translator = PageTranslator::new(&service, "en", "pt");
    let pages = vec![page(1, "alpha"), page(2, "  "), page(3, "gamma")];

    let progress = std::cell::RefCell::new(Vec::new());
    let chunk = translator
        .translate_pages(&pages, |done, total| progress.borrow_mut().push((done, total)))
        .await
        .unwrap();

    assert_eq!(chunk.texts, vec!["[pt] alpha".to_string(), String::new(), "[pt] gamma".to_string()]);
    assert_eq!(mock.request_count(), 2);
    assert_eq!(chunk.usage.requests, 2);
    assert_eq!(progress.into_inner(), vec![(1, 3), (2, 3), (3, 3)]);
}

/// The first failing page aborts the chunk
#[tokio::test]
async fn test_translatePages_withFailure_shouldStopAtFailingPage() {
    let mock = MockProvider::fail_on_request(2);
    let service = mock_service(mock.clone());
    let translator = PageTranslator::new(&service, "en", "pt");
    let pages = vec![page(1, "one"), page(2, "two"), page(3, "three")];

    let result = translator.translate_pages(&pages, |_, _| {}).await;
    assert!(result.is_err());
    assert_eq!(mock.request_count(), 2);
}
