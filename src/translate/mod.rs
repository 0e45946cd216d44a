// Translation providers
//
// Each provider implements the same capability set:
// - translate: build the provider-specific request, execute it, parse the response
// - render: turn the parsed response into a markdown document plus copy payload
//
// Only providers with an implementation are registered. A configured id
// without one is simply absent from the registry, and invoking it reports
// `UnknownProvider`.
//
// To add a provider:
// 1. Create a module with the provider's request/response types
// 2. Implement `Provider` for it
// 3. Construct it in `ProviderRegistry::from_config`

pub mod common;
pub mod youdao;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub use common::*;
pub use youdao::YoudaoProvider;
use crate::config::{Config, DisplayStyle};
use crate::error::{Result, TranslatorError};

/// Markdown document shown to the user and the plain-text payload used by
/// copy, insert and replace.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResult {
    pub markdown: String,
    /// Present iff the document contains a translation section
    pub result_text: Option<String>,
}

/// Main trait for translation backends
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider id as used in the configuration
    fn id(&self) -> &str;

    /// How results of this provider are presented
    fn style(&self) -> DisplayStyle;

    /// Send `words` to the backend and return the parsed response document
    async fn translate(&self, words: &str) -> Result<serde_json::Value>;

    /// Build the markdown result for a parsed response
    fn render(&self, words: &str, response: &serde_json::Value) -> Result<RenderedResult>;
}

/// Registry of implemented providers keyed by id
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create a provider instance for every configured id that has an implementation
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = Self::default();

        for (id, provider_config) in &config.providers {
            match id.as_str() {
                "youdao" => {
                    registry.register(Arc::new(YoudaoProvider::new(provider_config.clone())?));
                }
                other => {
                    debug!("No translator implementation for `{}`, skipping", other);
                }
            }
        }

        Ok(registry)
    }

    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.id().to_string(), provider);
    }

    pub fn get(&self, id: &str) -> Result<Arc<dyn Provider>> {
        self.providers
            .get(id)
            .cloned()
            .ok_or_else(|| TranslatorError::UnknownProvider(id.to_string()))
    }
}
