use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslatorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("No words to be translate.")]
    NoInput,

    #[error("连接失败，请检查你的网络状态")]
    Connection(String),

    #[error("连接超时，请检查你的网络状态")]
    Timeout(String),

    #[error("数据请求失败！")]
    RequestFailure(String),

    #[error("No translation to {0}.")]
    EmptyResult(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("No translator registered for `{0}`")]
    UnknownProvider(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TranslatorError {
    /// Classify a transport failure into one of the three provider error categories.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::RequestFailure(err.to_string())
        }
    }

    /// Whether this error ends a translation cycle started by a provider.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Timeout(_) | Self::RequestFailure(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TranslatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        assert_eq!(TranslatorError::NoInput.to_string(), "No words to be translate.");
        assert_eq!(
            TranslatorError::Connection("refused".into()).to_string(),
            "连接失败，请检查你的网络状态"
        );
        assert_eq!(
            TranslatorError::EmptyResult("copy".into()).to_string(),
            "No translation to copy."
        );
        assert!(TranslatorError::Timeout(String::new()).is_provider_failure());
        assert!(!TranslatorError::NoInput.is_provider_failure());
    }
}
