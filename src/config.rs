//! Client configuration.
//!
//! All behaviour is controlled through [`ClientConfig`], built via its
//! [`ClientConfigBuilder`]. The defaults target a translation server running
//! on the same host (`http://localhost:8000`).

use crate::error::TranslateError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default origin of the translation service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Path of the translation endpoint, appended to the base URL.
pub const DEFAULT_ENDPOINT_PATH: &str = "/translate";

/// Name every downloaded document is saved under.
pub const DEFAULT_DOWNLOAD_FILENAME: &str = "translated.docx";

/// Configuration for the translation client.
///
/// # Example
/// ```rust
/// use pdf_translate::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("https://translate.example.com")
///     .output_dir("/tmp/out")
///     .build()
///     .unwrap();
/// assert_eq!(config.endpoint_url(), "https://translate.example.com/translate");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Origin of the translation service, without a trailing slash.
    pub base_url: String,

    /// Endpoint path. Default: `/translate`.
    pub endpoint_path: String,

    /// File name the translated document is saved as. Default:
    /// `translated.docx`, whatever the server's content type.
    pub download_filename: String,

    /// Directory downloads are written to. Default: current directory.
    pub output_dir: PathBuf,

    /// Replace an existing file instead of picking `name (N).ext`. Default: false.
    pub overwrite: bool,

    /// Overall request timeout. Default: None (wait for the network layer).
    ///
    /// Large documents routinely take several minutes on the server side.
    pub request_timeout_secs: Option<u64>,

    /// `User-Agent` header sent with each request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
            download_filename: DEFAULT_DOWNLOAD_FILENAME.to_string(),
            output_dir: PathBuf::from("."),
            overwrite: false,
            request_timeout_secs: None,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full URL the submission is posted to.
    pub fn endpoint_url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoint_path)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn endpoint_path(mut self, path: impl Into<String>) -> Self {
        self.config.endpoint_path = path.into();
        self
    }

    pub fn download_filename(mut self, name: impl Into<String>) -> Self {
        self.config.download_filename = name.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn overwrite(mut self, v: bool) -> Self {
        self.config.overwrite = v;
        self
    }

    pub fn request_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.config.request_timeout_secs = secs.filter(|s| *s > 0);
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, TranslateError> {
        let c = &self.config;

        let url = reqwest::Url::parse(&c.base_url).map_err(|e| {
            TranslateError::InvalidConfig(format!("base URL '{}' is not valid: {}", c.base_url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(TranslateError::InvalidConfig(format!(
                "base URL must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if !c.endpoint_path.starts_with('/') {
            return Err(TranslateError::InvalidConfig(format!(
                "endpoint path must start with '/', got '{}'",
                c.endpoint_path
            )));
        }
        if c.download_filename.trim().is_empty()
            || c.download_filename.contains(['/', '\\'])
        {
            return Err(TranslateError::InvalidConfig(format!(
                "download filename must be a bare file name, got '{}'",
                c.download_filename
            )));
        }
        Ok(self.config)
    }
}
