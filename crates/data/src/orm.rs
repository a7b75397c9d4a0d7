//! sea-orm backed context.
//!
//! A [`SeaOrmContext`] is a unit of work over a pooled `DatabaseConnection`.
//! Releasing it retires the context; the pool itself closes once the last
//! handle to it is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{AppError, AppResult, DatabaseConfig};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use crate::context::{ConnectContext, ContextFactory, DbContext};
use crate::setting::DataSettings;

/// Context wrapping a sea-orm connection
pub struct SeaOrmContext {
    id: Uuid,
    connection: Arc<DatabaseConnection>,
    released: AtomicBool,
}

impl SeaOrmContext {
    /// Open a context over its own connection.
    pub fn new(connection: DatabaseConnection) -> Self {
        Self::from_shared(Arc::new(connection))
    }

    /// Open a context over a connection handle shared with other contexts.
    pub fn from_shared(connection: Arc<DatabaseConnection>) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(context_id = %id, "Context opened");
        Self {
            id,
            connection,
            released: AtomicBool::new(false),
        }
    }

    /// Identifier used to correlate log lines for this context
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether this context was released.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Get the connection, unless the context was released.
    pub fn connection(&self) -> AppResult<&DatabaseConnection> {
        if self.is_released() {
            return Err(AppError::ContextReleased);
        }
        Ok(self.connection.as_ref())
    }

    /// Check database connectivity by executing a simple query.
    pub async fn ping(&self) -> AppResult<()> {
        let connection = self.connection()?;
        connection
            .execute(Statement::from_string(
                connection.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for SeaOrmContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeaOrmContext")
            .field("id", &self.id)
            .field("released", &self.is_released())
            .finish()
    }
}

impl DbContext for SeaOrmContext {
    fn release(&self) -> AppResult<()> {
        if self.released.swap(true, Ordering::AcqRel) {
            return Err(AppError::ContextReleased);
        }
        tracing::debug!(context_id = %self.id, "Context released");
        Ok(())
    }
}

/// Opens a fresh connection pool per context.
#[derive(Debug, Clone)]
pub struct SeaOrmConnector {
    config: DatabaseConfig,
}

impl SeaOrmConnector {
    /// Connector using the given pool settings.
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    /// Build a connector from the connection string the settings name.
    pub fn from_settings(settings: &DataSettings) -> AppResult<Self> {
        Ok(Self::new(settings.database_config()?))
    }

    fn options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.config.url.clone());
        options
            .max_connections(self.config.max_connections)
            .min_connections(self.config.min_connections)
            .connect_timeout(Duration::from_secs(self.config.connect_timeout_secs))
            .sqlx_logging(self.config.sqlx_logging);
        options
    }
}

#[async_trait]
impl ConnectContext<SeaOrmContext> for SeaOrmConnector {
    async fn connect(&self) -> AppResult<SeaOrmContext> {
        let connection = Database::connect(self.options())
            .await
            .map_err(|e| AppError::context_init(e.to_string()))?;
        Ok(SeaOrmContext::new(connection))
    }
}

/// Hands out contexts over an already open pool.
#[derive(Clone)]
pub struct PooledContextFactory {
    connection: Arc<DatabaseConnection>,
}

impl PooledContextFactory {
    /// Factory over an open connection.
    pub fn new(connection: DatabaseConnection) -> Self {
        Self::from_shared(Arc::new(connection))
    }

    /// Factory over a connection handle already shared elsewhere.
    pub fn from_shared(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }
}

impl ContextFactory<SeaOrmContext> for PooledContextFactory {
    fn create(&self) -> AppResult<SeaOrmContext> {
        Ok(SeaOrmContext::from_shared(Arc::clone(&self.connection)))
    }
}
