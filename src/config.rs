use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::services::llm::{GatewaySettings, GenerationOptions};
use crate::utils::Locale;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of tokens minted by `JwtUtil::generate_token`
    #[serde(deserialize_with = "deserialize_duration_secs")]
    pub jwt_expires_in: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

/// Model server connection and generation settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    /// Model active at startup; switchable at runtime
    pub model: String,
    /// Bound for a single generation request (default: 600s)
    #[serde(deserialize_with = "deserialize_duration_secs")]
    pub timeout_secs: u64,
    /// Bound for health checks and catalog fetches (default: 5s)
    #[serde(deserialize_with = "deserialize_duration_secs")]
    pub health_timeout_secs: u64,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
    /// Language of prompts and user-facing messages
    pub locale: Locale,
}

impl LlmConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            health_timeout: Duration::from_secs(self.health_timeout_secs),
            generation: GenerationOptions {
                temperature: self.temperature,
                top_p: self.top_p,
                max_tokens: self.max_tokens,
            },
            locale: self.locale,
        }
    }
}

/// Command line arguments for configuration overrides
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "topology-advisor")]
#[command(version, about = "Topology Advisor - AI review of network topology diagrams")]
pub struct CommandLineArgs {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Server host (overrides config file)
    #[arg(long, value_name = "HOST")]
    pub server_host: Option<String>,

    /// Server port (overrides config file)
    #[arg(long, value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Database URL (overrides config file)
    #[arg(long, value_name = "URL")]
    pub database_url: Option<String>,

    /// JWT secret key (overrides config file)
    #[arg(long, value_name = "SECRET")]
    pub jwt_secret: Option<String>,

    /// Logging level (overrides config file, e.g., "info,topology_advisor=debug")
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Model server base URL (overrides config file)
    #[arg(long, value_name = "URL")]
    pub llm_base_url: Option<String>,

    /// Initial model (overrides config file)
    #[arg(long, value_name = "MODEL")]
    pub llm_model: Option<String>,

    /// Generation timeout (overrides config file, e.g., "600", "10m")
    #[arg(long, value_name = "DURATION")]
    pub llm_timeout: Option<String>,

    /// Prompt and message language: "th" or "en"
    #[arg(long, value_name = "LOCALE")]
    pub locale: Option<String>,
}

impl Config {
    /// Load configuration with command line, environment variable, and file support
    ///
    /// Loading order (priority from highest to lowest):
    /// 1. Command line arguments
    /// 2. Environment variables (prefixed with APP_, `.env` honoured)
    /// 3. Configuration file (config.toml)
    /// 4. Default values
    pub fn load() -> Result<Self, anyhow::Error> {
        let cli_args = CommandLineArgs::parse();

        // 1. Load from config file (use CLI --config if provided, otherwise find default)
        let config_path = cli_args.config.clone().or_else(Self::find_config_file);
        let mut config = if let Some(config_path) = config_path {
            Self::from_toml(&config_path)?
        } else {
            tracing::warn!("Configuration file not found, using defaults");
            Config::default()
        };

        // 2. Override with environment variables
        if let Ok(path) = dotenvy::dotenv() {
            tracing::info!("Loaded environment from {}", path.display());
        }
        config.apply_env_overrides();

        // 3. Override with command line arguments (highest priority)
        config.apply_cli_overrides(&cli_args);

        // 4. Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - APP_SERVER_HOST / APP_SERVER_PORT
    /// - APP_DATABASE_URL: Database URL (default: sqlite://data/topology_advisor.db)
    /// - APP_JWT_SECRET / APP_JWT_EXPIRES_IN
    /// - APP_LOG_LEVEL: Logging level
    /// - APP_LLM_BASE_URL (or OLLAMA_BASE_URL): Model server URL
    /// - APP_LLM_MODEL (or OLLAMA_MODEL): Initial model
    /// - APP_LLM_TIMEOUT: Generation timeout (accepts "600", "600s", "10m")
    /// - APP_LLM_HEALTH_TIMEOUT: Health/catalog timeout
    /// - APP_LLM_TEMPERATURE / APP_LLM_TOP_P / APP_LLM_MAX_TOKENS
    /// - APP_LOCALE: "th" or "en"
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("APP_SERVER_HOST") {
            self.server.host = host;
            tracing::info!("Override server.host from env: {}", self.server.host);
        }

        if let Ok(port) = std::env::var("APP_SERVER_PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
            tracing::info!("Override server.port from env: {}", self.server.port);
        }

        if let Ok(db_url) = std::env::var("APP_DATABASE_URL") {
            self.database.url = db_url;
            tracing::info!("Override database.url from env");
        }

        if let Ok(secret) = std::env::var("APP_JWT_SECRET") {
            self.auth.jwt_secret = secret;
            tracing::info!("Override auth.jwt_secret from env");
        }

        if let Ok(expires) = std::env::var("APP_JWT_EXPIRES_IN") {
            match parse_duration_to_secs(&expires) {
                Ok(val) => {
                    self.auth.jwt_expires_in = val;
                    tracing::info!("Override auth.jwt_expires_in from env: {}s", val);
                },
                Err(e) => tracing::warn!("Invalid APP_JWT_EXPIRES_IN '{}': {}", expires, e),
            }
        }

        if let Ok(level) = std::env::var("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }

        if let Ok(url) = std::env::var("APP_LLM_BASE_URL").or_else(|_| std::env::var("OLLAMA_BASE_URL"))
        {
            self.llm.base_url = url;
            tracing::info!("Override llm.base_url from env: {}", self.llm.base_url);
        }

        if let Ok(model) = std::env::var("APP_LLM_MODEL").or_else(|_| std::env::var("OLLAMA_MODEL")) {
            self.llm.model = model;
            tracing::info!("Override llm.model from env: {}", self.llm.model);
        }

        if let Ok(timeout) = std::env::var("APP_LLM_TIMEOUT") {
            match parse_duration_to_secs(&timeout) {
                Ok(val) => {
                    self.llm.timeout_secs = val;
                    tracing::info!("Override llm.timeout_secs from env: {}", val);
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_LLM_TIMEOUT '{}': {} (keep {})",
                    timeout,
                    e,
                    self.llm.timeout_secs
                ),
            }
        }

        if let Ok(timeout) = std::env::var("APP_LLM_HEALTH_TIMEOUT") {
            match parse_duration_to_secs(&timeout) {
                Ok(val) => {
                    self.llm.health_timeout_secs = val;
                    tracing::info!("Override llm.health_timeout_secs from env: {}", val);
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_LLM_HEALTH_TIMEOUT '{}': {} (keep {})",
                    timeout,
                    e,
                    self.llm.health_timeout_secs
                ),
            }
        }

        if let Ok(temperature) = std::env::var("APP_LLM_TEMPERATURE")
            && let Ok(val) = temperature.parse()
        {
            self.llm.temperature = val;
            tracing::info!("Override llm.temperature from env: {}", self.llm.temperature);
        }

        if let Ok(top_p) = std::env::var("APP_LLM_TOP_P")
            && let Ok(val) = top_p.parse()
        {
            self.llm.top_p = val;
            tracing::info!("Override llm.top_p from env: {}", self.llm.top_p);
        }

        if let Ok(max_tokens) = std::env::var("APP_LLM_MAX_TOKENS")
            && let Ok(val) = max_tokens.parse()
        {
            self.llm.max_tokens = val;
            tracing::info!("Override llm.max_tokens from env: {}", self.llm.max_tokens);
        }

        if let Ok(locale) = std::env::var("APP_LOCALE") {
            match locale.parse() {
                Ok(val) => {
                    self.llm.locale = val;
                    tracing::info!("Override llm.locale from env: {}", self.llm.locale);
                },
                Err(e) => tracing::warn!("Invalid APP_LOCALE: {}", e),
            }
        }
    }

    /// Apply command line argument overrides (highest priority)
    fn apply_cli_overrides(&mut self, args: &CommandLineArgs) {
        if let Some(host) = &args.server_host {
            self.server.host = host.clone();
            tracing::info!("Override server.host from CLI: {}", self.server.host);
        }

        if let Some(port) = args.server_port {
            self.server.port = port;
            tracing::info!("Override server.port from CLI: {}", self.server.port);
        }

        if let Some(db_url) = &args.database_url {
            self.database.url = db_url.clone();
            tracing::info!("Override database.url from CLI");
        }

        if let Some(secret) = &args.jwt_secret {
            self.auth.jwt_secret = secret.clone();
            tracing::info!("Override auth.jwt_secret from CLI");
        }

        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
            tracing::info!("Override logging.level from CLI: {}", self.logging.level);
        }

        if let Some(url) = &args.llm_base_url {
            self.llm.base_url = url.clone();
            tracing::info!("Override llm.base_url from CLI: {}", self.llm.base_url);
        }

        if let Some(model) = &args.llm_model {
            self.llm.model = model.clone();
            tracing::info!("Override llm.model from CLI: {}", self.llm.model);
        }

        if let Some(timeout) = &args.llm_timeout {
            match parse_duration_to_secs(timeout) {
                Ok(val) => {
                    self.llm.timeout_secs = val;
                    tracing::info!("Override llm.timeout_secs from CLI: {}", val);
                },
                Err(e) => tracing::warn!(
                    "Invalid --llm-timeout '{}': {} (keep {})",
                    timeout,
                    e,
                    self.llm.timeout_secs
                ),
            }
        }

        if let Some(locale) = &args.locale {
            match locale.parse() {
                Ok(val) => {
                    self.llm.locale = val;
                    tracing::info!("Override llm.locale from CLI: {}", self.llm.locale);
                },
                Err(e) => tracing::warn!("Invalid --locale: {}", e),
            }
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.auth.jwt_secret == "dev-secret-key-change-in-production" {
            tracing::warn!("Using default JWT secret, set APP_JWT_SECRET for production use");
        }

        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        let base_url = self.llm.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            anyhow::bail!("llm.base_url must be an http(s) URL, got '{}'", self.llm.base_url);
        }
        if self.llm.model.trim().is_empty() {
            anyhow::bail!("llm.model cannot be empty");
        }
        if self.llm.timeout_secs == 0 || self.llm.health_timeout_secs == 0 {
            anyhow::bail!("llm timeouts must be > 0");
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            anyhow::bail!("llm.temperature must be within 0.0..=2.0");
        }
        if !(0.0..=1.0).contains(&self.llm.top_p) {
            anyhow::bail!("llm.top_p must be within 0.0..=1.0");
        }
        if self.llm.max_tokens == 0 {
            anyhow::bail!("llm.max_tokens must be > 0");
        }

        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let possible_paths =
            ["conf/config.toml", "config.toml", "./conf/config.toml", "./config.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }
        None
    }

    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8000 }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: "sqlite://data/topology_advisor.db".to_string() }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "dev-secret-key-change-in-production".to_string(),
            jwt_expires_in: 24 * 60 * 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info,topology_advisor=debug".to_string(),
            file: Some("logs/topology-advisor.log".to_string()),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "deepseek-r1:14b".to_string(),
            timeout_secs: 600,
            health_timeout_secs: 5,
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 1000,
            locale: Locale::Th,
        }
    }
}

// =========================
// Helpers for parsing values
// =========================

fn parse_duration_to_secs(input: &str) -> Result<u64, String> {
    // Accept plain numbers (treated as seconds)
    if let Ok(val) = input.parse::<u64>() {
        return Ok(val);
    }

    let s = input.trim().to_lowercase();
    let (num_str, unit) = s.split_at(s.chars().take_while(|c| c.is_ascii_digit()).count());
    if num_str.is_empty() || unit.is_empty() {
        return Err("missing number or unit".into());
    }
    let n: u64 = num_str.parse().map_err(|_| "invalid number".to_string())?;
    match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => Ok(n),
        "m" | "min" | "mins" | "minute" | "minutes" => Ok(n * 60),
        "h" | "hr" | "hour" | "hours" => Ok(n * 60 * 60),
        "d" | "day" | "days" => Ok(n * 60 * 60 * 24),
        _ => Err(format!("unsupported unit: {}", unit)),
    }
}

// Accepts numeric seconds or human-friendly strings
fn deserialize_duration_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct Visitor;
    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = u64;
        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a number of seconds or a string like '30s', '5m', '1h'")
        }
        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v)
        }
        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            u64::try_from(v).map_err(|_| E::custom("negative not allowed"))
        }
        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            parse_duration_to_secs(v).map_err(E::custom)
        }
    }
    deserializer.deserialize_any(Visitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_model_server_conventions() {
        let config = Config::default();
        assert_eq!(config.llm.base_url, "http://localhost:11434");
        assert_eq!(config.llm.model, "deepseek-r1:14b");
        assert_eq!(config.llm.request_timeout(), Duration::from_secs(600));
        assert_eq!(config.llm.locale, Locale::Th);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_accepts_human_durations() {
        let config: Config = toml::from_str(
            r#"
            [llm]
            model = "llama3.2"
            timeout_secs = "10m"
            health_timeout_secs = 3
            locale = "en"

            [auth]
            jwt_secret = "s3cret"
            jwt_expires_in = "2h"
            "#,
        )
        .unwrap();

        assert_eq!(config.llm.model, "llama3.2");
        assert_eq!(config.llm.timeout_secs, 600);
        assert_eq!(config.llm.health_timeout_secs, 3);
        assert_eq!(config.llm.locale, Locale::En);
        assert_eq!(config.auth.jwt_expires_in, 7200);
        // untouched sections keep defaults
        assert_eq!(config.llm.max_tokens, 1000);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_gateway_settings_carry_generation_options() {
        let settings = LlmConfig::default().gateway_settings();
        assert_eq!(settings.health_timeout, Duration::from_secs(5));
        assert_eq!(settings.generation, GenerationOptions::default());
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = Config::default();
        let args = CommandLineArgs {
            llm_model: Some("mistral:latest".to_string()),
            llm_timeout: Some("2m".to_string()),
            locale: Some("english".to_string()),
            ..Default::default()
        };

        config.apply_cli_overrides(&args);

        assert_eq!(config.llm.model, "mistral:latest");
        assert_eq!(config.llm.timeout_secs, 120);
        assert_eq!(config.llm.locale, Locale::En);
    }

    #[test]
    fn test_validate_rejects_bad_llm_settings() {
        let mut config = Config::default();
        config.llm.base_url = "localhost:11434".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.top_p = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.model = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration_to_secs("45"), Ok(45));
        assert_eq!(parse_duration_to_secs("10m"), Ok(600));
        assert_eq!(parse_duration_to_secs("1h"), Ok(3600));
        assert!(parse_duration_to_secs("10x").is_err());
        assert!(parse_duration_to_secs("m").is_err());
    }
}
