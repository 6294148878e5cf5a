use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    pub allowed_origins: Vec<String>,
    /// Daily request ceiling for the free tier, enforced per device token
    pub daily_free_limit: u32,
    /// When true, requests to metered endpoints without a usable device token
    /// are rejected with 401 instead of passing through unmetered.
    pub require_device_token: bool,
    // Moderation thresholds are policy parameters, not architectural
    // constants. Defaults preserve the reference behavior.
    pub harassment_threshold: f32,
    pub sexual_threshold: f32,
    pub violence_threshold: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .unwrap_or_else(|_| {
                    "http://localhost:3000,http://localhost:8080".to_string()
                })
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            daily_free_limit: env::var("DAILY_FREE_LIMIT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            require_device_token: env::var("REQUIRE_DEVICE_TOKEN")
                .unwrap_or_else(|_| "false".to_string())
                .parse::<String>()
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(false),
            harassment_threshold: env::var("MODERATION_HARASSMENT_THRESHOLD")
                .unwrap_or_else(|_| "0.9".to_string())
                .parse()?,
            sexual_threshold: env::var("MODERATION_SEXUAL_THRESHOLD")
                .unwrap_or_else(|_| "0.9".to_string())
                .parse()?,
            violence_threshold: env::var("MODERATION_VIOLENCE_THRESHOLD")
                .unwrap_or_else(|_| "0.95".to_string())
                .parse()?,
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
