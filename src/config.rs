//! Configuration for the annotation engine

use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    pub review: ReviewConfig,
}

/// Where the review server lives and how long to wait for it.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Which file of which project this session reviews.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewConfig {
    pub project_directory: String,
    pub file_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store: StoreConfig {
                base_url: "http://localhost:4779".to_string(),
                timeout_secs: 10,
            },
            review: ReviewConfig {
                project_directory: ".".to_string(),
                file_path: "README.md".to_string(),
            },
        }
    }
}

impl Config {
    /// Read configuration from the environment, falling back to
    /// defaults for anything unset. A `.env` file is honored when
    /// present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Config {
            store: StoreConfig {
                base_url: env::var("MARGINALIA_API_URL")
                    .unwrap_or_else(|_| "http://localhost:4779".to_string()),
                timeout_secs: env::var("MARGINALIA_HTTP_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            },
            review: ReviewConfig {
                project_directory: env::var("MARGINALIA_PROJECT_DIR")
                    .unwrap_or_else(|_| ".".to_string()),
                file_path: env::var("MARGINALIA_FILE_PATH")
                    .unwrap_or_else(|_| "README.md".to_string()),
            },
        }
    }
}
