//! Provider selection — builds the configured language model.

use agentura_config::{AppConfig, ProviderConfig};
use agentura_core::error::Error;
use agentura_core::provider::LanguageModel;
use std::sync::Arc;
use tracing::info;

use crate::ollama::OllamaProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Build the provider named by `config.default_provider`.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn LanguageModel>, Error> {
    let provider = config.active_provider().ok_or_else(|| Error::Config {
        message: format!("Unknown provider '{}'", config.default_provider),
    })?;
    let model = build_provider(&config.default_provider, provider)?;
    info!(
        provider = %config.default_provider,
        engine = %provider.engine,
        model = %model.model_name(),
        "Language model ready"
    );
    Ok(model)
}

/// Build one provider from its config entry.
pub fn build_provider(
    name: &str,
    provider: &ProviderConfig,
) -> Result<Arc<dyn LanguageModel>, Error> {
    let base_url = if provider.base_url.is_empty() {
        default_base_url(&provider.engine).to_string()
    } else {
        provider.base_url.clone()
    };

    let model: Arc<dyn LanguageModel> = match provider.engine.as_str() {
        "openai" => {
            let api_key = provider
                .api_key
                .as_deref()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| Error::Config {
                    message: format!(
                        "Provider '{name}' uses the openai engine and requires an api_key (or AGENTURA_API_KEY)"
                    ),
                })?;
            Arc::new(OpenAiCompatProvider::with_headers(
                name,
                base_url,
                api_key,
                &provider.model,
                &provider.headers,
            )?)
        }
        "ollama" => Arc::new(OllamaProvider::new(
            base_url,
            &provider.model,
            &provider.headers,
        )?),
        other => {
            return Err(Error::Config {
                message: format!("Provider '{name}' has unknown engine '{other}'"),
            });
        }
    };

    Ok(model)
}

/// Get the default base URL for an engine.
pub fn default_base_url(engine: &str) -> &'static str {
    match engine {
        "openai" => "https://api.openai.com/v1",
        _ => "http://localhost:11434",
    }
}
