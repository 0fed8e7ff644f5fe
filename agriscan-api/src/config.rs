/// Configuration management for the web server
///
/// This module loads configuration from environment variables (and an
/// optional `.env` file) into a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT` or `PORT`: Port to bind to (default: 5000)
/// - `DATABASE_URL`: SQLite URL (default: sqlite://agriscan_users.db)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
/// - `SESSION_SECRET`: Session signing key, at least 32 characters (required)
/// - `SESSION_TTL_HOURS`: Session lifetime (default: 24)
/// - `MODEL_PATH`: ONNX model file (default: plant_disease_model.onnx)
/// - `LABELS_PATH`: Label file (default: label_map.txt)
/// - `RESIZE_FILTER`: `bilinear` or `nearest` (default: bilinear)
/// - `MAX_UPLOAD_BYTES`: Request body limit (default: 10 MiB)
/// - `OPENAI_API_KEY`: Chat completion key (optional, chat degrades without it)
/// - `OPENAI_BASE_URL`: Chat completion API base (default: https://api.openai.com/v1)
/// - `OPENAI_MODEL`: Chat completion model (default: gpt-3.5-turbo)
/// - `PRODUCTION`: `true` enables Secure cookies and HSTS
///
/// # Example
///
/// ```no_run
/// use agriscan_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use agriscan_shared::classifier::ResizeFilter;
use agriscan_shared::clients::chat::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Session configuration
    pub session: SessionConfig,

    /// Classifier model files
    pub classifier: ClassifierConfig,

    /// Chat completion service
    pub chat: ChatConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Production mode (Secure cookies, HSTS)
    pub production: bool,

    /// Maximum request body size, which bounds uploads
    pub max_upload_bytes: usize,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// Key used to sign session cookies
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Session lifetime in hours
    pub ttl_hours: i64,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"[REDACTED]")
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

/// Classifier configuration
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Model file
    pub model_path: PathBuf,

    /// Newline-delimited label file
    pub labels_path: PathBuf,

    /// Resampling filter for the input resize
    pub resize_filter: ResizeFilter,
}

/// Chat completion configuration
#[derive(Clone)]
pub struct ChatConfig {
    /// API key; chat is disabled when absent
    pub api_key: Option<String>,

    /// API base URL
    pub base_url: String,

    /// Completion model
    pub model: String,
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `SESSION_SECRET` is missing or shorter than 32 characters
    /// - A numeric or enumerated variable has an invalid value
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(var("API_PORT").or_else(|| var("PORT")), "API_PORT", 5000u16)?;
        let production = var("PRODUCTION")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let max_upload_bytes = parse_or(
            var("MAX_UPLOAD_BYTES"),
            "MAX_UPLOAD_BYTES",
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;

        let database_url =
            var("DATABASE_URL").unwrap_or_else(|| "sqlite://agriscan_users.db".to_string());
        let max_connections = parse_or(
            var("DATABASE_MAX_CONNECTIONS"),
            "DATABASE_MAX_CONNECTIONS",
            5u32,
        )?;

        let secret = var("SESSION_SECRET")
            .ok_or_else(|| anyhow::anyhow!("SESSION_SECRET environment variable is required"))?;

        if secret.len() < 32 {
            anyhow::bail!("SESSION_SECRET must be at least 32 characters long");
        }

        let ttl_hours = parse_or(var("SESSION_TTL_HOURS"), "SESSION_TTL_HOURS", 24i64)?;
        if ttl_hours <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS must be positive");
        }

        let resize_filter = match var("RESIZE_FILTER") {
            Some(raw) => ResizeFilter::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("RESIZE_FILTER: {}", e))?,
            None => ResizeFilter::default(),
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                production,
                max_upload_bytes,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            session: SessionConfig { secret, ttl_hours },
            classifier: ClassifierConfig {
                model_path: var("MODEL_PATH")
                    .unwrap_or_else(|| "plant_disease_model.onnx".to_string())
                    .into(),
                labels_path: var("LABELS_PATH")
                    .unwrap_or_else(|| "label_map.txt".to_string())
                    .into(),
                resize_filter,
            },
            chat: ChatConfig {
                api_key: var("OPENAI_API_KEY"),
                base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_or<T>(raw: Option<String>, name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value '{}': {}", name, value, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("SESSION_SECRET", SECRET)]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert!(!config.api.production);
        assert_eq!(config.api.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.database.url, "sqlite://agriscan_users.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.session.ttl_hours, 24);
        assert_eq!(
            config.classifier.model_path,
            PathBuf::from("plant_disease_model.onnx")
        );
        assert_eq!(config.classifier.labels_path, PathBuf::from("label_map.txt"));
        assert_eq!(config.classifier.resize_filter, ResizeFilter::Bilinear);
        assert!(config.chat.api_key.is_none());
        assert_eq!(config.chat.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_port_falls_back_to_port_variable() {
        let config = load(&[("SESSION_SECRET", SECRET), ("PORT", "8080")]).unwrap();
        assert_eq!(config.api.port, 8080);

        let config = load(&[
            ("SESSION_SECRET", SECRET),
            ("PORT", "8080"),
            ("API_PORT", "9090"),
        ])
        .unwrap();
        assert_eq!(config.api.port, 9090);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SESSION_SECRET", SECRET),
            ("API_HOST", "127.0.0.1"),
            ("PRODUCTION", "true"),
            ("RESIZE_FILTER", "nearest"),
            ("OPENAI_API_KEY", "sk-test"),
            ("SESSION_TTL_HOURS", "2"),
        ])
        .unwrap();

        assert_eq!(config.api.host, "127.0.0.1");
        assert!(config.api.production);
        assert_eq!(config.classifier.resize_filter, ResizeFilter::Nearest);
        assert_eq!(config.chat.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.session.ttl_hours, 2);
    }

    #[test]
    fn test_session_secret_is_required() {
        assert!(load(&[]).is_err());
        assert!(load(&[("SESSION_SECRET", "short")]).is_err());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(load(&[("SESSION_SECRET", SECRET), ("API_PORT", "eighty")]).is_err());
        assert!(load(&[("SESSION_SECRET", SECRET), ("RESIZE_FILTER", "lanczos")]).is_err());
        assert!(load(&[("SESSION_SECRET", SECRET), ("SESSION_TTL_HOURS", "0")]).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&[("SESSION_SECRET", SECRET), ("OPENAI_API_KEY", "sk-test")]).unwrap();
        let debug = format!("{:?}", config);

        assert!(!debug.contains(SECRET));
        assert!(!debug.contains("sk-test"));
    }
}
