/// Configuration management for the EdTechID resolver
use crate::error::{ResolverError, ResolverResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub resolver: ResolverConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Externally visible base URL, used to build supersession redirects
    pub public_url: String,
    pub version: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database: PathBuf,
    pub max_connections: u32,
}

/// Resolution engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Canonical namespace prefix without the trailing dot (e.g. `edtechid`)
    pub canonical_prefix: String,
    /// Product token used in the metadata and compact media types
    pub product_name: String,
    /// `Cache-Control: max-age` on redirect responses, in seconds
    pub cache_max_age: u64,
    /// Upper bound for each stats/audit write
    pub storage_timeout_ms: u64,
    /// Dispatch audit appends as detached tasks
    pub audit_background: bool,
}

impl ResolverConfig {
    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }

    pub fn metadata_media_type(&self) -> String {
        format!("application/vnd.{}+json", self.product_name)
    }

    /// Compact payload type, kept apart from plain `application/json`
    pub fn compact_media_type(&self) -> String {
        format!("application/vnd.{}.compact+json", self.product_name)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            canonical_prefix: "edtechid".to_string(),
            product_name: "edtechid".to_string(),
            cache_max_age: 3600,
            storage_timeout_ms: 2000,
            audit_background: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ResolverResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("RESOLVER_HOSTNAME").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("RESOLVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ResolverError::Config("Invalid port number".to_string()))?;
        let public_url = env::var("RESOLVER_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();
        let version = env::var("RESOLVER_VERSION")
            .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

        let data_directory: PathBuf = env::var("RESOLVER_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let database = env::var("RESOLVER_DATABASE_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("resolver.sqlite"));
        let max_connections = env::var("RESOLVER_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        let defaults = ResolverConfig::default();
        let canonical_prefix = env::var("RESOLVER_CANONICAL_PREFIX")
            .map(|p| p.trim().trim_end_matches('.').to_string())
            .unwrap_or(defaults.canonical_prefix);
        let product_name =
            env::var("RESOLVER_PRODUCT_NAME").unwrap_or(defaults.product_name);
        let cache_max_age = env::var("RESOLVER_CACHE_MAX_AGE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.cache_max_age);
        let storage_timeout_ms = env::var("RESOLVER_STORAGE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.storage_timeout_ms);
        let audit_background = env::var("RESOLVER_AUDIT_BACKGROUND")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        let level = env::var("RUST_LOG")
            .unwrap_or_else(|_| "edtechid_resolver=debug,tower_http=debug".to_string());
        let format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                public_url,
                version,
            },
            storage: StorageConfig {
                data_directory,
                database,
                max_connections,
            },
            resolver: ResolverConfig {
                canonical_prefix,
                product_name,
                cache_max_age,
                storage_timeout_ms,
                audit_background,
            },
            logging: LoggingConfig { level, format },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ResolverResult<()> {
        if self.service.port == 0 {
            return Err(ResolverError::Config("Port cannot be zero".to_string()));
        }

        if !(self.service.public_url.starts_with("http://")
            || self.service.public_url.starts_with("https://"))
        {
            return Err(ResolverError::Config(format!(
                "Public URL must start with http:// or https://, got {}",
                self.service.public_url
            )));
        }

        if self.resolver.canonical_prefix.is_empty() {
            return Err(ResolverError::Config(
                "Canonical prefix cannot be empty".to_string(),
            ));
        }

        if self.resolver.product_name.is_empty() {
            return Err(ResolverError::Config("Product name cannot be empty".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ServerConfig {
        ServerConfig {
            service: ServiceConfig {
                hostname: "127.0.0.1".to_string(),
                port: 8080,
                public_url: "https://id.example.org".to_string(),
                version: "0.1.0".to_string(),
            },
            storage: StorageConfig {
                data_directory: PathBuf::from("./data"),
                database: PathBuf::from("./data/resolver.sqlite"),
                max_connections: 4,
            },
            resolver: ResolverConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(sample().validate().is_ok());
        assert!(sample().logging.is_json());
    }

    #[test]
    fn test_rejects_schemeless_public_url() {
        let mut config = sample();
        config.service.public_url = "id.example.org".to_string();
        assert!(matches!(config.validate(), Err(ResolverError::Config(_))));
    }

    #[test]
    fn test_rejects_empty_prefix() {
        let mut config = sample();
        config.resolver.canonical_prefix.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_metadata_media_type() {
        assert_eq!(
            ResolverConfig::default().metadata_media_type(),
            "application/vnd.edtechid+json"
        );
        assert_eq!(
            ResolverConfig::default().compact_media_type(),
            "application/vnd.edtechid.compact+json"
        );
    }
}
