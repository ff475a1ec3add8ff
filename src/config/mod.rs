use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Authorization header scheme, e.g. "Bearer".
    pub prefix: String,
    pub secret: String,
    pub expiration_minutes: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout_secs =
                v.parse().unwrap_or(self.database.connection_timeout_secs);
        }

        if let Ok(v) = env::var("JWT_PREFIX") {
            self.jwt.prefix = v;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRATION_MINUTES") {
            self.jwt.expiration_minutes = v.parse().unwrap_or(self.jwt.expiration_minutes);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout_secs: 30,
            },
            jwt: JwtConfig {
                prefix: "Bearer".to_string(),
                // Development fallback only; production requires JWT_SECRET.
                secret: "board-api-development-secret".to_string(),
                expiration_minutes: 30,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout_secs: 10,
            },
            jwt: JwtConfig {
                prefix: "Bearer".to_string(),
                secret: String::new(),
                expiration_minutes: 30,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout_secs: 5,
            },
            jwt: JwtConfig {
                prefix: "Bearer".to_string(),
                secret: String::new(),
                expiration_minutes: 30,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
