//! Configuration management for support-desk.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::agent::{CourseCatalog, RunnerConfig, DEFAULT_INSTRUCTION};
use crate::chat::ChatSettings;
use crate::cli::Args;
use crate::session::SessionState;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Session identity and initial state.
    pub session: SessionSection,
    /// Agent backend configuration.
    pub agent: AgentSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Session configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Application name the session is filed under.
    pub app_name: String,
    /// User id owning the session.
    pub user_id: String,
    /// Customer name placed in the initial state.
    pub user_name: String,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            app_name: "Customer Support".to_string(),
            user_id: "aiwithsid".to_string(),
            user_name: "Siddharth Sen".to_string(),
        }
    }
}

/// Agent backend configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    /// Base URL of the chat-completions API.
    pub api_base: String,
    /// API key (bearer token).
    pub api_key: Option<String>,
    /// Model name.
    pub model: String,
    /// Maximum tokens per reply.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Tool rounds allowed per turn.
    pub max_tool_rounds: usize,
    /// Instruction template overriding the built-in one.
    pub instruction: Option<String>,
    /// Courses on offer.
    pub courses: CourseCatalog,
}

impl Default for AgentSection {
    fn default() -> Self {
        let runner = RunnerConfig::default();
        Self {
            api_base: runner.api_base,
            api_key: None,
            model: runner.model,
            max_tokens: runner.max_tokens,
            temperature: runner.temperature,
            timeout_secs: runner.timeout.as_secs(),
            max_tool_rounds: runner.max_tool_rounds,
            instruction: None,
            courses: runner.catalog,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log filter (error, warn, info, debug, trace, or target directives).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Read the first non-empty variable among `names`.
fn first_var<F>(lookup: &F, names: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .filter_map(|name| lookup(*name))
        .find(|value| !value.is_empty())
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable source (for testing).
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(app_name) = first_var(&lookup, &["SUPPORT_DESK_APP_NAME"]) {
            self.session.app_name = app_name;
        }
        if let Some(user_id) = first_var(&lookup, &["SUPPORT_DESK_USER_ID"]) {
            self.session.user_id = user_id;
        }
        if let Some(user_name) = first_var(&lookup, &["SUPPORT_DESK_USER_NAME"]) {
            self.session.user_name = user_name;
        }

        if let Some(api_base) = first_var(&lookup, &["SUPPORT_DESK_API_BASE", "OPENAI_BASE_URL"]) {
            self.agent.api_base = api_base;
        }
        if let Some(api_key) = first_var(&lookup, &["SUPPORT_DESK_API_KEY", "OPENAI_API_KEY"]) {
            self.agent.api_key = Some(api_key);
        }
        if let Some(model) = first_var(&lookup, &["SUPPORT_DESK_MODEL", "OPENAI_MODEL"]) {
            self.agent.model = model;
        }

        if let Some(level) = first_var(&lookup, &["SUPPORT_DESK_LOG_LEVEL", "RUST_LOG"]) {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref app_name) = args.app_name {
            self.session.app_name = app_name.clone();
        }
        if let Some(ref user_id) = args.user_id {
            self.session.user_id = user_id.clone();
        }
        if let Some(ref user_name) = args.user_name {
            self.session.user_name = user_name.clone();
        }
        if let Some(ref model) = args.model {
            self.agent.model = model.clone();
        }
        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(ref path) = args.config {
            config = Config::from_file(path)?;
        }

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// Convert to the agent runner configuration.
    pub fn to_runner_config(&self) -> Result<RunnerConfig, ConfigError> {
        let agent = &self.agent;

        if agent.api_base.trim().is_empty() {
            return Err(ConfigError::Invalid("agent.api_base", "must not be empty"));
        }
        if agent.model.trim().is_empty() {
            return Err(ConfigError::Invalid("agent.model", "must not be empty"));
        }
        if agent.timeout_secs == 0 {
            return Err(ConfigError::Invalid("agent.timeout_secs", "must be positive"));
        }
        if agent.max_tool_rounds == 0 {
            return Err(ConfigError::Invalid("agent.max_tool_rounds", "must be positive"));
        }

        Ok(RunnerConfig {
            api_base: agent.api_base.clone(),
            api_key: agent.api_key.clone().filter(|k| !k.is_empty()),
            model: agent.model.clone(),
            max_tokens: agent.max_tokens,
            temperature: agent.temperature,
            timeout: Duration::from_secs(agent.timeout_secs),
            max_tool_rounds: agent.max_tool_rounds,
            instruction: agent
                .instruction
                .clone()
                .unwrap_or_else(|| DEFAULT_INSTRUCTION.to_string()),
            catalog: agent.courses.clone(),
        })
    }

    /// Initial state of the session the chat loop creates.
    pub fn initial_state(&self) -> SessionState {
        SessionState::customer(self.session.user_name.clone())
    }

    /// Settings for the chat loop.
    pub fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            app_name: self.session.app_name.clone(),
            user_id: self.session.user_id.clone(),
            initial_state: self.initial_state(),
        }
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// A field holds an unusable value.
    Invalid(&'static str, &'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::Invalid(field, reason) => write!(f, "invalid {}: {}", field, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.session.app_name, "Customer Support");
        assert_eq!(config.session.user_id, "aiwithsid");
        assert_eq!(config.session.user_name, "Siddharth Sen");
        assert_eq!(config.agent.timeout_secs, 60);
        assert!(config.agent.api_key.is_none());
        assert_eq!(config.log_filter(), "warn");
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "session": {
                "app_name": "Course Helpdesk",
                "user_name": "Ada"
            },
            "agent": {
                "model": "gpt-4.1",
                "max_tool_rounds": 2,
                "courses": [
                    {"id": "rust_basics", "name": "Rust Basics", "price": 49.0}
                ]
            }
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.session.app_name, "Course Helpdesk");
        assert_eq!(config.session.user_id, "aiwithsid"); // Default
        assert_eq!(config.session.user_name, "Ada");
        assert_eq!(config.agent.model, "gpt-4.1");
        assert_eq!(config.agent.max_tool_rounds, 2);
        assert!(config.agent.courses.find("rust_basics").is_some());
        assert!(config.agent.courses.find("ai_marketing_platform").is_none());
    }

    #[test]
    fn test_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let result = Config::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file(Path::new("/nonexistent/support-desk.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_apply_env() {
        let mut config = Config::default();
        config.apply_env_from(env(&[
            ("SUPPORT_DESK_USER_NAME", "Grace"),
            ("OPENAI_API_KEY", "sk-openai"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("RUST_LOG", "debug"),
        ]));

        assert_eq!(config.session.user_name, "Grace");
        assert_eq!(config.agent.api_key.as_deref(), Some("sk-openai"));
        assert_eq!(config.agent.model, "gpt-4o");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_env_prefers_own_variables() {
        let mut config = Config::default();
        config.apply_env_from(env(&[
            ("SUPPORT_DESK_API_KEY", "sk-desk"),
            ("OPENAI_API_KEY", "sk-openai"),
            ("SUPPORT_DESK_API_BASE", ""),
            ("OPENAI_BASE_URL", "http://localhost:11434/v1"),
        ]));

        assert_eq!(config.agent.api_key.as_deref(), Some("sk-desk"));
        // Empty values are skipped
        assert_eq!(config.agent.api_base, "http://localhost:11434/v1");
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        let args = Args {
            user_id: Some("u-42".to_string()),
            model: Some("gpt-4.1-mini".to_string()),
            log_level: Some("info".to_string()),
            ..Args::default()
        };

        config.apply_args(&args);

        assert_eq!(config.session.user_id, "u-42");
        assert_eq!(config.session.app_name, "Customer Support");
        assert_eq!(config.agent.model, "gpt-4.1-mini");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_to_runner_config() {
        let mut config = Config::default();
        config.agent.api_key = Some(String::new());
        let runner = config.to_runner_config().unwrap();

        assert_eq!(runner.timeout, Duration::from_secs(60));
        assert!(runner.api_key.is_none());
        assert_eq!(runner.instruction, DEFAULT_INSTRUCTION);
    }

    #[test]
    fn test_custom_instruction() {
        let mut config = Config::default();
        config.agent.instruction = Some("Be brief, {user_name}.".to_string());
        let runner = config.to_runner_config().unwrap();
        assert_eq!(runner.instruction, "Be brief, {user_name}.");
    }

    #[test]
    fn test_invalid_runner_config() {
        let mut config = Config::default();
        config.agent.timeout_secs = 0;
        assert!(config.to_runner_config().is_err());

        let mut config = Config::default();
        config.agent.max_tool_rounds = 0;
        assert!(config.to_runner_config().is_err());

        let mut config = Config::default();
        config.agent.api_base = " ".to_string();
        let err = config.to_runner_config().unwrap_err();
        assert!(err.to_string().contains("agent.api_base"));
    }

    #[test]
    fn test_chat_settings() {
        let config = Config::default();
        let settings = config.chat_settings();
        assert_eq!(settings.app_name, "Customer Support");
        assert_eq!(settings.initial_state, SessionState::customer("Siddharth Sen"));
    }
}
