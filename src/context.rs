/// Application context and dependency injection
use crate::{
    config::ServerConfig,
    db,
    error::{ResolverError, ResolverResult},
    resolver::ResolutionEngine,
    store::{
        SqliteAlternateUrlCatalog, SqliteAuditLog, SqliteIdentifierStore,
        SqliteNamespaceDirectory,
    },
};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Instant;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub engine: Arc<ResolutionEngine>,
    pub started_at: Instant,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ResolverResult<Self> {
        // Validate configuration
        config.validate()?;

        // Create data directory if it doesn't exist
        if !config.storage.data_directory.exists() {
            tokio::fs::create_dir_all(&config.storage.data_directory)
                .await
                .map_err(|e| {
                    ResolverError::Internal(format!(
                        "Failed to create directory {:?}: {}",
                        config.storage.data_directory, e
                    ))
                })?;
        }

        let options = db::DatabaseOptions {
            max_connections: config.storage.max_connections,
            ..Default::default()
        };
        let pool = db::create_pool(&config.storage.database, options).await?;

        Self::with_pool(config, pool).await
    }

    /// Build the context on an existing pool; runs migrations
    pub async fn with_pool(config: ServerConfig, pool: SqlitePool) -> ResolverResult<Self> {
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        let engine = ResolutionEngine::new(
            &config.resolver,
            &config.service,
            Arc::new(SqliteNamespaceDirectory::new(pool.clone())),
            Arc::new(SqliteIdentifierStore::new(pool.clone())),
            Arc::new(SqliteAlternateUrlCatalog::new(pool.clone())),
            Arc::new(SqliteAuditLog::new(pool.clone())),
        )?;

        tracing::info!(
            prefix = %config.resolver.canonical_prefix,
            audit_background = config.resolver.audit_background,
            "resolution engine ready"
        );

        Ok(Self {
            config: Arc::new(config),
            db: pool,
            engine: Arc::new(engine),
            started_at: Instant::now(),
        })
    }

    /// Listen address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.config.service.hostname, self.config.service.port)
    }

    /// Public base URL
    pub fn public_url(&self) -> &str {
        &self.config.service.public_url
    }
}
