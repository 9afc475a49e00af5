use std::sync::Arc;

use chat_provider::ChatProvider;
use chat_provider_mock::{MockProvider, MOCK_PROVIDER_ID};
use chat_provider_ollama::{
    OllamaProvider, OllamaProviderConfig, DEFAULT_OLLAMA_BASE_URL, OLLAMA_PROVIDER_ID,
};

use crate::config::EnvConfig;

pub const DEFAULT_PROVIDER_ID: &str = MOCK_PROVIDER_ID;
pub const DEFAULT_MODEL_ID: &str = "mixtral";

/// Resolves the generation provider from environment configuration.
pub fn provider_from_config(config: &EnvConfig) -> Result<Arc<dyn ChatProvider>, String> {
    let provider_id = config.provider.as_deref().unwrap_or(DEFAULT_PROVIDER_ID);

    match provider_id {
        MOCK_PROVIDER_ID => Ok(Arc::new(MockProvider::default())),
        OLLAMA_PROVIDER_ID => {
            let host = config
                .ollama_host
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string());
            let model = config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());

            let mut provider_config = OllamaProviderConfig::new(host, model);
            if let Some(temperature) = config.temperature {
                provider_config = provider_config.with_temperature(temperature);
            }
            if let Some(timeout) = config.timeout {
                provider_config = provider_config.with_timeout(timeout);
            }

            let provider = OllamaProvider::new(provider_config)
                .map_err(|error| format!("Failed to initialize Ollama provider: {error}"))?;
            Ok(Arc::new(provider))
        }
        unknown => Err(format!(
            "Unsupported provider '{unknown}'. Available providers: {MOCK_PROVIDER_ID}, {OLLAMA_PROVIDER_ID}"
        )),
    }
}
