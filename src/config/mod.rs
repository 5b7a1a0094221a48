use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub cache: CacheConfig,
    pub postal: PostalConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    /// `memory` or `postgres`/`postgresql`, any case.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(StoreBackend::Memory),
            "postgres" | "postgresql" => Some(StoreBackend::Postgres),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub session_secret: String,
    pub session_expiry_hours: u64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub list_max_age_secs: u64,
    pub list_stale_while_revalidate_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostalConfig {
    pub api_url: String,
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Defaults per environment, then specific env vars on top
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server
        if let Some(port) = env::var("GENBA_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse().ok())
        {
            self.server.port = port;
        }

        // Database
        if let Ok(v) = env::var("GENBA_STORE") {
            match StoreBackend::parse(&v) {
                Some(backend) => self.database.backend = backend,
                None => tracing::warn!(
                    "Unrecognised GENBA_STORE '{}'; keeping {:?} store",
                    v,
                    self.database.backend
                ),
            }
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security
        if let Ok(v) = env::var("SESSION_SECRET") {
            self.security.session_secret = v;
        }
        if let Ok(v) = env::var("SESSION_EXPIRY_HOURS") {
            self.security.session_expiry_hours = v.parse().unwrap_or(self.security.session_expiry_hours);
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Cache
        if let Ok(v) = env::var("CACHE_LIST_MAX_AGE_SECS") {
            self.cache.list_max_age_secs = v.parse().unwrap_or(self.cache.list_max_age_secs);
        }
        if let Ok(v) = env::var("CACHE_LIST_SWR_SECS") {
            self.cache.list_stale_while_revalidate_secs =
                v.parse().unwrap_or(self.cache.list_stale_while_revalidate_secs);
        }

        // Postal lookup
        if let Ok(v) = env::var("POSTAL_API_URL") {
            self.postal.api_url = v;
        }
        if let Ok(v) = env::var("POSTAL_TIMEOUT_SECS") {
            self.postal.timeout_secs = v.parse().unwrap_or(self.postal.timeout_secs);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 5,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                session_secret: "genba-dev-secret".to_string(),
                session_expiry_hours: 24 * 7, // 1 week
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            cache: CacheConfig {
                list_max_age_secs: 60,
                list_stale_while_revalidate_secs: 300,
            },
            postal: PostalConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 10,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                session_secret: String::new(),
                session_expiry_hours: 24,
                cors_origins: vec![],
            },
            cache: CacheConfig {
                list_max_age_secs: 60,
                list_stale_while_revalidate_secs: 300,
            },
            postal: PostalConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 20,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                // Must come from SESSION_SECRET; an empty secret rejects every session
                session_secret: String::new(),
                session_expiry_hours: 12,
                cors_origins: vec![],
            },
            cache: CacheConfig {
                list_max_age_secs: 120,
                list_stale_while_revalidate_secs: 600,
            },
            postal: PostalConfig::default(),
        }
    }

    /// Cache policy for list-type endpoints.
    pub fn list_cache(&self) -> crate::middleware::CachePolicy {
        crate::middleware::CachePolicy::ShortPrivate {
            max_age_secs: self.cache.list_max_age_secs,
            stale_while_revalidate_secs: self.cache.list_stale_while_revalidate_secs,
        }
    }
}

impl Default for PostalConfig {
    fn default() -> Self {
        Self {
            api_url: "https://zipcloud.ibsnet.co.jp/api/search".to_string(),
            timeout_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 3000);
        assert!(!config.security.session_secret.is_empty());
        assert_eq!(config.database.backend, StoreBackend::Postgres);
    }

    #[test]
    fn production_requires_explicit_secret() {
        let config = AppConfig::production();
        assert!(config.security.session_secret.is_empty());
        assert_eq!(config.cache.list_max_age_secs, 120);
    }

    #[test]
    fn store_backend_names_ignore_case() {
        assert_eq!(StoreBackend::parse("memory"), Some(StoreBackend::Memory));
        assert_eq!(StoreBackend::parse(" Memory "), Some(StoreBackend::Memory));
        assert_eq!(StoreBackend::parse("POSTGRES"), Some(StoreBackend::Postgres));
        assert_eq!(StoreBackend::parse("postgresql"), Some(StoreBackend::Postgres));
        assert_eq!(StoreBackend::parse("memroy"), None);
        assert_eq!(StoreBackend::parse(""), None);
    }

    #[test]
    fn list_cache_uses_configured_window() {
        let config = AppConfig::development();
        assert_eq!(
            config.list_cache().header_value(),
            "private, max-age=60, stale-while-revalidate=300"
        );
    }
}
