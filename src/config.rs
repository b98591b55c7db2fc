use std::net::SocketAddr;
use std::path::PathBuf;

use teloxide::types::UserId;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

/// Runtime settings, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub admin_id: u64,
    pub questions_file: PathBuf,
    pub users_file: PathBuf,
    pub ngrok_url: Option<Url>,
    pub ngrok_addr: Option<SocketAddr>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let admin_id = std::env::var("ADMIN_ID")
            .map_err(|_| ConfigError::MissingVar("ADMIN_ID"))?
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue("ADMIN_ID", e.to_string()))?;

        let questions_file = std::env::var("QUESTIONS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("questions.json"));

        let users_file = std::env::var("USERS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("users.json"));

        let ngrok_url = match std::env::var("NGROK_URL") {
            Ok(raw) => Some(
                raw.parse::<Url>()
                    .map_err(|e| ConfigError::InvalidValue("NGROK_URL", e.to_string()))?,
            ),
            Err(_) => None,
        };

        let ngrok_addr = match std::env::var("NGROK_ADDR") {
            Ok(raw) => Some(
                raw.parse::<SocketAddr>()
                    .map_err(|e| ConfigError::InvalidValue("NGROK_ADDR", e.to_string()))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            admin_id,
            questions_file,
            users_file,
            ngrok_url,
            ngrok_addr,
        })
    }

    pub fn is_admin(&self, id: UserId) -> bool {
        id.0 == self.admin_id
    }
}
