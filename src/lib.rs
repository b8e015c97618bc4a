//! Drives a hosted assistant through one stock-analysis conversation.
//!
//! The assistant is provisioned once by name, sent a fixed prompt, and its
//! run is polled until it finishes. Whenever the run asks for stock data the
//! request is served from the market-data provider and the output submitted
//! back. The chart the assistant produces is downloaded at the end.

use serde::Deserialize;
use std::env::{self, VarError};

pub mod assistants;
pub mod backend;
pub mod client;
pub mod config;
pub mod driver;
pub mod error;
pub mod extractor;
pub mod market_data;
pub mod mock;
pub mod provisioner;
pub mod tools;

pub use error::{Error, Result};

const BASE_URL: &str = "https://api.openai.com/v1/";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OpenAiError {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub param: Option<String>,
    pub code: Option<String>,
}

impl OpenAiError {
    pub fn new(message: String, error_type: String) -> OpenAiError {
        OpenAiError {
            message,
            error_type,
            param: None,
            code: None,
        }
    }
}

impl std::fmt::Display for OpenAiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for OpenAiError {}

impl From<reqwest::Error> for OpenAiError {
    fn from(value: reqwest::Error) -> Self {
        OpenAiError::new(value.to_string(), "reqwest".to_string())
    }
}

pub type ApiResponseOrError<T> = Result<T, OpenAiError>;

/// Key and endpoint used to reach the assistant service.
#[derive(Clone, Eq, PartialEq)]
pub struct Credentials {
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Credentials {
    /// Creates credentials with the given API key and base URL.
    ///
    /// A trailing slash is appended to the base URL when missing so that
    /// routes can be joined onto it directly.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let api_key = api_key.into();
        let base_url = parse_base_url(base_url.into());
        Self { api_key, base_url }
    }

    /// Reads `OPENAI_API_KEY` and the optional `OPENAI_BASE_URL` override.
    pub fn from_env() -> error::Result<Credentials> {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(Error::Configuration {
                name: "OPENAI_API_KEY",
            })?;
        let base_url = match env::var("OPENAI_BASE_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            Ok(_) | Err(VarError::NotPresent) => BASE_URL.to_string(),
            Err(VarError::NotUnicode(_)) => {
                return Err(Error::Configuration {
                    name: "OPENAI_BASE_URL",
                })
            }
        };
        Ok(Credentials::new(api_key, base_url))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn parse_base_url(mut value: String) -> String {
    let trimmed = value.trim_end().len();
    value.truncate(trimmed);
    if !value.ends_with('/') {
        value += "/";
    }
    value
}
