use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use crate::error::{Result, TranslatorError};

/// Characters stripped from selection boundaries before translating.
pub const DEFAULT_SEPARATOR: &str = concat!(
    "|\\\n\u{c}/:,;<>.+=-_~`'\"!@#$%^&*",
    "({[（《：；·，。—￥？！……‘’“”、》）]})"
);

/// Public Youdao endpoint used when no credentials are configured.
pub const DEFAULT_FALLBACK_URL: &str = "http://fanyi.youdao.com/openapi.do?keyfrom=divinites&key=1583185521&type=data&doctype=json&version=1.1";

fn default_caption() -> String {
    "Translator".to_string()
}

fn default_auto_select() -> bool {
    true
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_from() -> String {
    "auto".to_string()
}

fn default_to() -> String {
    "zh-CHS".to_string()
}

fn default_fallback_url() -> String {
    DEFAULT_FALLBACK_URL.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Caption of the folded context menu when several providers are enabled
    #[serde(default = "default_caption")]
    pub caption: String,
    /// Resolve the word under the pointer when nothing is selected
    #[serde(default = "default_auto_select")]
    pub auto_select: bool,
    /// Character set stripped from selection boundaries
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Provider configurations keyed by provider id
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Signed API endpoint
    #[serde(default)]
    pub api_url: String,
    /// Application id used in the request signature
    #[serde(default)]
    pub app_id: String,
    /// Application secret used in the request signature
    #[serde(default)]
    pub app_key: String,
    /// Source language code
    #[serde(default = "default_from")]
    pub from: String,
    /// Target language code
    #[serde(default = "default_to")]
    pub to: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Menu caption; the title-cased provider id when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// How results are presented
    #[serde(default)]
    pub style: DisplayStyle,
    /// Unauthenticated endpoint used when credentials are missing
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStyle {
    /// Transient popup anchored at the middle of the translated region
    #[default]
    Popup,
    /// Inline block below the translated region
    Phantom,
    /// Scratch buffer holding the raw response
    View,
}

impl ProviderConfig {
    /// Whether the signed endpoint can be used.
    pub fn has_credentials(&self) -> bool {
        !self.api_url.is_empty() && !self.app_id.is_empty() && !self.app_key.is_empty()
    }

    pub fn caption_for(&self, id: &str) -> String {
        self.caption.clone().unwrap_or_else(|| title_case(id))
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            app_id: String::new(),
            app_key: String::new(),
            from: default_from(),
            to: default_to(),
            enabled: true,
            caption: None,
            style: DisplayStyle::default(),
            fallback_url: default_fallback_url(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut providers = BTreeMap::new();
        providers.insert(
            "youdao".to_string(),
            ProviderConfig {
                api_url: "https://openapi.youdao.com/api".to_string(),
                ..ProviderConfig::default()
            },
        );

        Self {
            caption: default_caption(),
            auto_select: default_auto_select(),
            separator: default_separator(),
            providers,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TranslatorError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Uppercase the first letter of every alphabetic run: `my_api` becomes `My_Api`.
fn title_case(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    let mut at_word_start = true;
    for c in id.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_defaults_from_toml() {
        let config = Config::from_toml(
            r#"
            auto_select = false

            [providers.youdao]
            app_id = "id"

            [providers.google]
            enabled = false
            caption = "Google Translate"
            style = "phantom"
            "#,
        )
        .unwrap();

        assert!(!config.auto_select);
        assert_eq!(config.caption, "Translator");
        assert_eq!(config.separator, DEFAULT_SEPARATOR);

        let youdao = &config.providers["youdao"];
        assert!(youdao.enabled);
        assert_eq!(youdao.caption_for("youdao"), "Youdao");
        assert_eq!(youdao.style, DisplayStyle::Popup);
        assert_eq!(youdao.fallback_url, DEFAULT_FALLBACK_URL);
        assert!(!youdao.has_credentials());

        let google = &config.providers["google"];
        assert!(!google.enabled);
        assert_eq!(google.caption_for("google"), "Google Translate");
        assert_eq!(google.style, DisplayStyle::Phantom);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("youdao"), "Youdao");
        assert_eq!(title_case("my_api"), "My_Api");
        assert_eq!(title_case("DEEPL"), "Deepl");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seltrans.toml");

        let config = Config::default();
        config.save_to_file(&path).unwrap();
        let reloaded = Config::from_file(&path).unwrap();

        assert_eq!(reloaded.separator, config.separator);
        assert_eq!(
            reloaded.providers["youdao"].api_url,
            "https://openapi.youdao.com/api"
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Config::from_file("/nonexistent/seltrans.toml").unwrap_err();
        assert!(matches!(err, TranslatorError::Io(_)));
    }

    #[test]
    fn test_invalid_toml_is_toml_error() {
        let err = Config::from_toml("auto_select = \"maybe\"").unwrap_err();
        assert!(matches!(err, TranslatorError::Toml(_)));
        assert!(err.to_string().starts_with("TOML parsing error"));
    }
}
