use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub recommendation: RecommendationConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StoreBackend,
    pub upload_dir: String,
    pub public_base_url: String,
    pub max_image_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    pub url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),
}

/// Images larger than this are rejected at upload time
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

const DEV_JWT_SECRET: &str = "development-only-secret-change-me";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    /// Refuse to run production with missing secrets.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment == Environment::Production && self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if self.storage.backend == StoreBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        Ok(())
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("PORT").ok().and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Storage overrides
        if let Ok(v) = env::var("STORE_BACKEND") {
            self.storage.backend = match v.to_lowercase().as_str() {
                "postgres" | "pg" => StoreBackend::Postgres,
                "memory" | "mem" => StoreBackend::Memory,
                _ => self.storage.backend,
            };
        }
        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.storage.upload_dir = v;
        }
        if let Ok(v) = env::var("PUBLIC_BASE_URL") {
            self.storage.public_base_url = v;
        }
        if let Ok(v) = env::var("UPLOAD_MAX_IMAGE_BYTES") {
            self.storage.max_image_bytes = v.parse().unwrap_or(self.storage.max_image_bytes);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            let hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
            self.security.jwt_expiry_hours = hours.min(crate::auth::MAX_TOKEN_EXPIRY_HOURS);
        }

        // Recommendation service
        if let Ok(v) = env::var("RECOMMENDATION_URL") {
            if !v.trim().is_empty() {
                self.recommendation.url = Some(v);
            }
        }
        if let Ok(v) = env::var("RECOMMENDATION_TIMEOUT_SECS") {
            self.recommendation.timeout_secs = v.parse().unwrap_or(self.recommendation.timeout_secs);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            storage: StorageConfig {
                backend: StoreBackend::Memory,
                upload_dir: "uploads".to_string(),
                public_base_url: "http://localhost:3000".to_string(),
                max_image_bytes: MAX_IMAGE_BYTES,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 4 * 1024 * 1024, // 4MB, multipart envelope around a 2MB image
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: DEV_JWT_SECRET.to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            recommendation: RecommendationConfig {
                url: None,
                timeout_secs: 10,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            storage: StorageConfig {
                backend: StoreBackend::Postgres,
                upload_dir: "/var/lib/ticketing/uploads".to_string(),
                public_base_url: "https://staging.example.com".to_string(),
                max_image_bytes: MAX_IMAGE_BYTES,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 4 * 1024 * 1024,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: DEV_JWT_SECRET.to_string(),
                jwt_expiry_hours: 24,
            },
            recommendation: RecommendationConfig {
                url: None,
                timeout_secs: 10,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            storage: StorageConfig {
                backend: StoreBackend::Postgres,
                upload_dir: "/var/lib/ticketing/uploads".to_string(),
                public_base_url: "https://app.example.com".to_string(),
                max_image_bytes: MAX_IMAGE_BYTES,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 3 * 1024 * 1024,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://app.example.com".to_string()],
                // Must come from JWT_SECRET
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
            },
            recommendation: RecommendationConfig {
                url: None,
                timeout_secs: 5,
            },
        }
    }
}
