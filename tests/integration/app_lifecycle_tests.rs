/*!
 * Tests for controller construction and the provider check
 */

use anyhow::Result;

use pdf_chunk_translator::app_config::{Config, TranslationProvider};
use pdf_chunk_translator::providers::mock::MockProvider;
use pdf_chunk_translator::Controller;
use crate::common;

/// The default configuration builds a controller without touching the network
#[test]
fn test_withConfig_withDefaults_shouldBuildController() -> Result<()> {
    let controller = Controller::with_config(Config::default())?;
    assert_eq!(controller.config().pipeline.max_pages_per_chunk, 10);
    assert_eq!(controller.config().translation.provider, TranslationProvider::Google);
    Ok(())
}

/// An unusable endpoint is reported when the controller is built
#[test]
fn test_withConfig_withInvalidEndpoint_shouldFail() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;
    config.translation.active_provider_config_mut().endpoint = "http://".to_string();
    assert!(Controller::with_config(config).is_err());
}

/// A healthy provider passes the check and returns its sample translation
#[tokio::test]
async fn test_checkConnection_withWorkingProvider_shouldReturnSample() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mock = MockProvider::working();
    let controller = common::mock_controller(common::test_config(temp_dir.path()), mock.clone());

    let sample = controller.check_connection().await?;
    assert!(sample.starts_with("[pt] "));
    assert_eq!(mock.request_count(), 1);
    Ok(())
}

/// An unreachable provider fails the check before any translation request
#[tokio::test]
async fn test_checkConnection_withFailingProvider_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mock = MockProvider::failing();
    let controller = common::mock_controller(common::test_config(temp_dir.path()), mock.clone());

    let error = controller.check_connection().await.unwrap_err();
    assert!(error.to_string().contains("Failed to connect"));
    assert_eq!(mock.request_count(), 0);
    Ok(())
}

/// A provider that answers with nothing fails the sample translation
#[test]
fn test_checkConnection_withEmptyProvider_shouldFailSample() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = common::mock_controller(common::test_config(temp_dir.path()), MockProvider::empty());

    let result = tokio_test::block_on(async { controller.check_connection().await });
    let error = result.unwrap_err();
    assert!(error.to_string().contains("Test translation failed"));
    Ok(())
}
