// Youdao translation API
// Signed v3 requests when credentials are configured, the public endpoint otherwise.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::config::{DisplayStyle, ProviderConfig};
use crate::error::{Result, TranslatorError};
use super::{Provider, RenderedResult, common::{http_client, post_form, wrap_columns}};

/// Display width of one line in the translation section
pub const WRAP_WIDTH: usize = 24;

const TEMPLATE_HEADER: &str = "\n---\nallow_code_wrap: true\n---\n!!! Youdao\n";

const ACTION_BAR: &str = "\n<span class=\"copy\"><a href=copy>Copy</a></span>&nbsp;&nbsp;&nbsp;&nbsp;<span class=\"insert\"><a href=insert>Insert</a></span>&nbsp;&nbsp;&nbsp;&nbsp;<span class=\"replace\"><a href=replace>Replace</a></span>\n";

const RULE: &str = "\n------------------------\n";

const FOOTER: &str = "<div class=\"footer\"><span class=\"hide\"><a href=hide>×</a></span></div>";

/// Youdao response document; every section is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YoudaoResponse {
    #[serde(rename = "errorCode", default)]
    pub error_code: Option<serde_json::Value>,
    #[serde(default)]
    pub basic: Option<YoudaoBasic>,
    #[serde(default)]
    pub translation: Option<Vec<String>>,
    #[serde(default)]
    pub web: Option<Vec<YoudaoWebEntry>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct YoudaoBasic {
    #[serde(default)]
    pub explains: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YoudaoWebEntry {
    pub key: String,
    #[serde(default)]
    pub value: Vec<String>,
}

/// Endpoint and form fields of one request
#[derive(Debug, Clone, PartialEq)]
pub struct YoudaoRequest {
    pub url: String,
    pub form: Vec<(&'static str, String)>,
}

impl YoudaoRequest {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Shorten `q` for signing: unchanged up to 20 characters, otherwise the
/// first 10 characters, the character count and the last 10 characters.
pub fn truncate(q: &str) -> String {
    let chars: Vec<char> = q.chars().collect();
    let size = chars.len();
    if size <= 20 {
        return q.to_string();
    }

    let head: String = chars[..10].iter().collect();
    let tail: String = chars[size - 10..].iter().collect();
    format!("{}{}{}", head, size, tail)
}

/// v3 signature: lowercase hex SHA-256 of `app_id + truncate(q) + salt + curtime + secret`
pub fn sign(app_id: &str, q: &str, salt: &str, curtime: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(app_id.as_bytes());
    hasher.update(truncate(q).as_bytes());
    hasher.update(salt.as_bytes());
    hasher.update(curtime.as_bytes());
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub struct YoudaoProvider {
    client: Client,
    config: ProviderConfig,
}

impl YoudaoProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            config,
        })
    }

    /// Build the request for `q` with a fresh salt and the current time
    pub fn build_request(&self, q: &str) -> YoudaoRequest {
        let salt = uuid::Uuid::new_v4().to_string();
        let curtime = chrono::Utc::now().timestamp().to_string();
        self.build_request_with(q, &salt, &curtime)
    }

    pub fn build_request_with(&self, q: &str, salt: &str, curtime: &str) -> YoudaoRequest {
        if !self.config.has_credentials() {
            return YoudaoRequest {
                url: self.config.fallback_url.clone(),
                form: vec![("q", q.to_string())],
            };
        }

        let sign = sign(&self.config.app_id, q, salt, curtime, &self.config.app_key);
        YoudaoRequest {
            url: self.config.api_url.clone(),
            form: vec![
                ("q", q.to_string()),
                ("from", self.config.from.clone()),
                ("to", self.config.to.clone()),
                ("appKey", self.config.app_id.clone()),
                ("salt", salt.to_string()),
                ("sign", sign),
                ("signType", "v3".to_string()),
                ("curtime", curtime.to_string()),
            ],
        }
    }

    /// Markdown document for a parsed response. Sections appear in a fixed
    /// order; all but the source section depend on the response content.
    pub fn render_response(&self, words: &str, response: &YoudaoResponse) -> RenderedResult {
        let mut body = String::from(TEMPLATE_HEADER);
        let mut result_text = None;

        body.push_str("## 原文：\n");
        body.push_str(words);
        body.push('\n');

        if let Some(basic) = response.basic.as_ref().filter(|b| !b.explains.is_empty()) {
            body.push_str("## 解释：\n");
            for explain in &basic.explains {
                body.push_str(&format!("- {}\n", explain));
            }
        }

        if let Some(translation) = &response.translation {
            body.push_str("## 翻译：\n");
            for candidate in translation {
                body.push_str(&format!("- {}\n", wrap_columns(candidate, WRAP_WIDTH)));
            }
            result_text = Some(translation.join("\n"));
            body.push_str(ACTION_BAR);
        }

        if let Some(web) = &response.web {
            body.push_str(RULE);
            body.push_str("## 网络释义:\n");
            for entry in web {
                body.push_str(&format!("`{}`: {}\n", entry.key, entry.value.join(",")));
            }
        }

        body.push_str(RULE);
        body.push_str(FOOTER);

        RenderedResult {
            markdown: body,
            result_text,
        }
    }
}

#[async_trait]
impl Provider for YoudaoProvider {
    fn id(&self) -> &str {
        "youdao"
    }

    fn style(&self) -> DisplayStyle {
        self.config.style
    }

    async fn translate(&self, words: &str) -> Result<serde_json::Value> {
        let request = self.build_request(words);
        info!("youdao translator: begin request ({} chars)", words.chars().count());
        let response = post_form(&self.client, &request.url, &request.form).await?;
        info!("youdao translator: end request");
        Ok(response)
    }

    fn render(&self, words: &str, response: &serde_json::Value) -> Result<RenderedResult> {
        let parsed: YoudaoResponse = serde_json::from_value(response.clone())
            .map_err(|e| TranslatorError::RequestFailure(format!("Unexpected response shape: {}", e)))?;

        if let Some(code) = &parsed.error_code {
            let ok = match code {
                serde_json::Value::String(s) => s == "0",
                serde_json::Value::Number(n) => n.as_i64() == Some(0),
                _ => false,
            };
            if !ok {
                warn!("Youdao returned error code {}", code);
            }
        }

        Ok(self.render_response(words, &parsed))
    }
}
