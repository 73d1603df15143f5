use std::path::PathBuf;
use url::Url;

/// Base endpoint the original deployment served the API under.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/api/v1";

pub const DEFAULT_EXPORT_DIR: &str = "exports";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid endpoint {0:?}: {1}")]
    InvalidEndpoint(String, String),
}

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the summarization API, without a trailing slash.
    pub base_url: String,
    pub export_dir: PathBuf,
}

impl Config {
    /// Resolves configuration from explicit flag values, falling back to the
    /// `BOOK_RETELLER_URL` / `BOOK_RETELLER_EXPORT_DIR` environment
    /// variables, then to the defaults.
    pub fn resolve(
        endpoint: Option<String>,
        export_dir: Option<String>,
    ) -> Result<Self, ConfigError> {
        let endpoint = endpoint
            .or_else(|| std::env::var("BOOK_RETELLER_URL").ok())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let parsed = Url::parse(&endpoint)
            .map_err(|e| ConfigError::InvalidEndpoint(endpoint.clone(), e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint(
                endpoint,
                "expected an http or https URL".to_string(),
            ));
        }

        let export_dir = export_dir
            .or_else(|| std::env::var("BOOK_RETELLER_EXPORT_DIR").ok())
            .unwrap_or_else(|| DEFAULT_EXPORT_DIR.to_string());

        Ok(Self {
            base_url: endpoint.trim_end_matches('/').to_string(),
            export_dir: PathBuf::from(export_dir),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_endpoint_wins() {
        let config = Config::resolve(Some("https://reteller.example/api/v1".to_string()), None)
            .unwrap();
        assert_eq!(config.base_url, "https://reteller.example/api/v1");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config =
            Config::resolve(Some("http://localhost:8000/api/v1/".to_string()), None).unwrap();
        assert_eq!(config.base_url, "http://localhost:8000/api/v1");
    }

    #[test]
    fn garbage_endpoint_is_rejected() {
        let err = Config::resolve(Some("not a url".to_string()), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint(..)));
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let err = Config::resolve(Some("ftp://reteller.example".to_string()), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint(..)));
    }

    #[test]
    fn explicit_export_dir_is_used() {
        let config = Config::resolve(None, Some("/tmp/summaries".to_string())).unwrap();
        assert_eq!(config.export_dir, PathBuf::from("/tmp/summaries"));
    }
}
