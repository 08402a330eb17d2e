//! The remote translation service.
//!
//! [`TranslationService`] is the seam between the controller and the
//! network. [`HttpTranslationService`] posts a multipart form to
//! `<base_url>/translate` with two fields:
//!
//! | Field       | Content |
//! |-------------|---------|
//! | `file`      | the selected file's bytes, name and MIME type |
//! | `direction` | `en-km` or `km-en` |
//!
//! A 2xx response body is returned untouched as the translated document.
//! Anything else becomes [`TranslateError::ServerRejected`] carrying the
//! server's `detail` field when the body has one.

use crate::config::ClientConfig;
use crate::direction::TranslationDirection;
use crate::error::TranslateError;
use crate::input::SelectedFile;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Detail used when an error body is not JSON at all.
pub const UNPARSEABLE_DETAIL: &str = "Translation failed";

/// Detail used when an error body is JSON but has no usable `detail`.
pub const MISSING_DETAIL: &str = "Translation failed. Please try again.";

/// Sends one file for translation and returns the translated document.
#[async_trait]
pub trait TranslationService: Send + Sync {
    async fn translate(
        &self,
        file: &SelectedFile,
        direction: TranslationDirection,
    ) -> Result<Vec<u8>, TranslateError>;
}

/// [`TranslationService`] over HTTP using `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTranslationService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTranslationService {
    pub fn new(config: &ClientConfig) -> Result<Self, TranslateError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| TranslateError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint_url(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn form(file: &SelectedFile, direction: TranslationDirection) -> Result<Form, TranslateError> {
        let part = Part::bytes(file.content().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.mime())
            .map_err(|e| {
                TranslateError::Unexpected(format!("invalid MIME type '{}': {e}", file.mime()))
            })?;

        Ok(Form::new()
            .part("file", part)
            .text("direction", direction.as_str()))
    }
}

#[async_trait]
impl TranslationService for HttpTranslationService {
    async fn translate(
        &self,
        file: &SelectedFile,
        direction: TranslationDirection,
    ) -> Result<Vec<u8>, TranslateError> {
        info!(
            "POST {} ({}, {} bytes, {})",
            self.endpoint,
            file.name(),
            file.len(),
            direction
        );

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(Self::form(file, direction)?)
            .send()
            .await
            .map_err(|e| TranslateError::network(&e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TranslateError::network(&e))?;

        if !status.is_success() {
            debug!("Server answered {} with {} byte body", status, body.len());
            return Err(TranslateError::ServerRejected {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        debug!("Received {} byte document", body.len());
        Ok(body.to_vec())
    }
}

/// Extract the most specific explanation from an error response body.
pub fn error_detail(body: &[u8]) -> String {
    let Ok(json) = serde_json::from_slice::<Value>(body) else {
        return UNPARSEABLE_DETAIL.to_string();
    };
    match json.get("detail") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Null) | Some(Value::String(_)) | Some(Value::Bool(false)) | None => {
            MISSING_DETAIL.to_string()
        }
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => MISSING_DETAIL.to_string(),
        Some(other) => other.to_string(),
    }
}
