use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub mongodb: MongoConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub summarizer: SummarizerConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub local_path: String,
    /// Total blob usage allowed before uploads are rejected.
    pub quota_bytes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizerConfig {
    pub provider: SummarizerProvider,
    pub api_url: String,
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerProvider {
    HuggingFace,
    Mock,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        // Base layer (port) comes from the optional configuration file plus
        // APP__-prefixed env vars; everything else is plain env vars with
        // dev defaults that become required in production.
        let base = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;
        let server: ServerConfig = base.try_deserialize()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(AppConfig {
            server,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some("mongodb://localhost:27017"), is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("docflow"), is_prod)?,
            },
            storage: StorageConfig {
                local_path: get_env("STORAGE_LOCAL_PATH", Some("storage"), is_prod)?,
                quota_bytes: get_env("STORAGE_QUOTA_MB", Some("100"), is_prod)?
                    .parse::<u64>()
                    .map_err(|e| {
                        AppError::ConfigError(anyhow::anyhow!("Invalid STORAGE_QUOTA_MB: {}", e))
                    })?
                    * 1024
                    * 1024,
            },
            auth: AuthConfig {
                jwt_secret: get_env("JWT_SECRET", Some("dev-secret-change-me"), is_prod)?,
            },
            summarizer: SummarizerConfig {
                provider: get_env("SUMMARIZER_PROVIDER", Some("mock"), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
                api_url: get_env(
                    "SUMMARIZER_API_URL",
                    Some("https://api-inference.huggingface.co/models/sshleifer/distilbart-cnn-12-6"),
                    is_prod,
                )?,
                api_token: env::var("SUMMARIZER_API_TOKEN").ok(),
            },
            cors: CorsConfig {
                allowed_origins: get_env(
                    "CORS_ALLOWED_ORIGINS",
                    Some("http://localhost:5173"),
                    is_prod,
                )?
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            },
        })
    }
}

impl std::str::FromStr for SummarizerProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "huggingface" => Ok(SummarizerProvider::HuggingFace),
            "mock" => Ok(SummarizerProvider::Mock),
            _ => Err(format!("Invalid summarizer provider: {}", s)),
        }
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}
