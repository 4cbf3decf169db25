//! Process configuration, read once at startup.
//!
//! - `OPENAI_API_KEY` - Required. Key for the LLM provider.
//! - `SERPAPI_KEY` - Required. Key for the shopping search provider.
//! - `PORT` - Optional. HTTP port. Defaults to `5000`.
//! - `HOST` - Optional. Bind address. Defaults to `0.0.0.0`.
//! - `OPENAI_MODEL` - Optional. Completion model. Defaults to `gpt-4o-mini`.
//!
//! A `.env` file in the working directory is loaded first if present.

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub serpapi_key: String,
    pub host: String,
    pub port: u16,
    pub model: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("openai_api_key", &"<redacted>")
            .field("serpapi_key", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("model", &self.model)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()));

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), e.to_string()))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            openai_api_key: require("OPENAI_API_KEY")?,
            serpapi_key: require("SERPAPI_KEY")?,
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
