use std::env;
use std::path::PathBuf;

use crate::{Credentials, Error, Result};

pub const ASSISTANT_NAME: &str = "stock_analyzer_assistant";
pub const ASSISTANT_INSTRUCTIONS: &str = "You're an experienced stock analyzer assistant tasked with analyzing \
     and visualizing stock market data.";
pub const ASSISTANT_MODEL: &str = "gpt-4o-mini";
pub const PROMPT: &str = "Retrieve the monthly time series data for AAPL and plot the closing \
     prices over the last 12 months as a line chart. Summarize the trend in two sentences.";
pub const OUTPUT_FILE: &str = "stock_chart.png";

/// The fixed definition of the assistant and the conversation it is asked
/// to have. Built once at startup and shared by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    pub assistant_name: String,
    pub instructions: String,
    pub model: String,
    pub prompt: String,
    /// How many existing assistants are searched for a name match.
    pub lookup_limit: u32,
    /// Where the downloaded image is written, overwriting any existing file.
    pub output_path: PathBuf,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            assistant_name: ASSISTANT_NAME.to_string(),
            instructions: ASSISTANT_INSTRUCTIONS.to_string(),
            model: ASSISTANT_MODEL.to_string(),
            prompt: PROMPT.to_string(),
            lookup_limit: 20,
            output_path: PathBuf::from(OUTPUT_FILE),
        }
    }
}

impl AnalyzerConfig {
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }
}

/// Secrets read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub market_data_key: String,
}

impl Settings {
    /// Reads every required key up front so a missing one fails before any
    /// network call is made.
    pub fn from_env() -> Result<Self> {
        let credentials = Credentials::from_env()?;
        let market_data_key = env::var("ALPHA_VANTAGE_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(Error::Configuration {
                name: "ALPHA_VANTAGE_API_KEY",
            })?;

        Ok(Self {
            credentials,
            market_data_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_stock_assistant() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.assistant_name, "stock_analyzer_assistant");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.lookup_limit, 20);
        assert_eq!(config.output_path, PathBuf::from("stock_chart.png"));
    }

    #[test]
    fn overrides_leave_the_definition_alone() {
        let config = AnalyzerConfig::default()
            .with_prompt("Plot MSFT.")
            .with_output_path("/tmp/msft.png");
        assert_eq!(config.prompt, "Plot MSFT.");
        assert_eq!(config.output_path, PathBuf::from("/tmp/msft.png"));
        assert_eq!(config.assistant_name, ASSISTANT_NAME);
    }

    #[test]
    fn environment_keys_are_checked_up_front() {
        env::remove_var("OPENAI_API_KEY");
        env::remove_var("OPENAI_BASE_URL");
        env::set_var("ALPHA_VANTAGE_API_KEY", "av-key");
        assert!(matches!(
            Settings::from_env(),
            Err(Error::Configuration {
                name: "OPENAI_API_KEY"
            })
        ));

        env::set_var("OPENAI_API_KEY", "  ");
        assert!(matches!(
            Settings::from_env(),
            Err(Error::Configuration {
                name: "OPENAI_API_KEY"
            })
        ));

        env::set_var("OPENAI_API_KEY", "sk-test");
        env::remove_var("ALPHA_VANTAGE_API_KEY");
        assert!(matches!(
            Settings::from_env(),
            Err(Error::Configuration {
                name: "ALPHA_VANTAGE_API_KEY"
            })
        ));

        env::set_var("ALPHA_VANTAGE_API_KEY", "av-key");
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.market_data_key, "av-key");
        assert_eq!(settings.credentials.api_key(), "sk-test");
        assert_eq!(settings.credentials.base_url(), crate::BASE_URL);

        env::set_var("OPENAI_BASE_URL", "http://localhost:8080/v1");
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.credentials.base_url(), "http://localhost:8080/v1/");

        env::remove_var("OPENAI_API_KEY");
        env::remove_var("OPENAI_BASE_URL");
        env::remove_var("ALPHA_VANTAGE_API_KEY");
    }
}
