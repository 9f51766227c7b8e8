use serde::Deserialize;
use std::path::{Path, PathBuf};
use teloxide::types::ChatId;

use crate::dialogue::BotMode;

/// Environment variable that supplies (or overrides) the bot token.
pub const TOKEN_ENV: &str = "TOKEN";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("failed to read config file '{}': {source}", .path.display())]
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    #[error("failed to parse config file '{}': {source}", .path.display())]
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Validation error.
    #[error("config validation error: {0}")]
    Validation(String),
}

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    telegram_bot_token: String,
    /// Directory for state files (sessions, logs). Defaults to current directory.
    data_dir: Option<String>,
    #[serde(default)]
    mode: BotMode,
    /// Chat that receives WARN/ERROR log lines.
    developer_chat_id: Option<i64>,
    /// Reply for messages no transition handles. Silent when unset.
    unmatched_reply: Option<String>,
}

pub struct Config {
    pub telegram_bot_token: String,
    /// Directory for state files (sessions, logs).
    pub data_dir: PathBuf,
    pub mode: BotMode,
    pub developer_chat_id: Option<ChatId>,
    pub unmatched_reply: Option<String>,
}

impl Config {
    /// Load `path` and take the token from `$TOKEN` when set.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let env_token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());
        Self::load_with_token(path, env_token)
    }

    /// A missing file means "all defaults"; the token must then come from `env_token`.
    pub fn load_with_token<P: AsRef<Path>>(path: P, env_token: Option<String>) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let file: ConfigFile = match std::fs::read_to_string(&config_path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ConfigFile::default(),
            Err(e) => return Err(ConfigError::ReadFile { path: config_path, source: e }),
        };

        let telegram_bot_token = env_token.unwrap_or(file.telegram_bot_token);
        if telegram_bot_token.is_empty() {
            return Err(ConfigError::Validation(format!(
                "bot token not found; set {TOKEN_ENV} or telegram_bot_token to get access to the Telegram API"
            )));
        }
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = telegram_bot_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Validation(
                "telegram_bot_token appears invalid (expected format: 123456789:ABCdefGHI...)".into()
            ));
        }

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            telegram_bot_token,
            data_dir,
            mode: file.mode,
            developer_chat_id: file.developer_chat_id.map(ChatId),
            unmatched_reply: file.unmatched_reply.filter(|r| !r.trim().is_empty()),
        })
    }

    pub fn sessions_path(&self) -> PathBuf {
        self.data_dir.join("sessions.db")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}
