use std::sync::Arc;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::error::AppResult;
use crate::store::{MemoryStore, RewardsStore, SeaOrmStore};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

pub type DbPool = DatabaseConnection;

pub async fn create_pool(config: &DatabaseConfig) -> AppResult<DbPool> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Ok(Database::connect(options).await?)
}

pub async fn run_migrations(pool: &DbPool) -> AppResult<()> {
    Migrator::up(pool, None).await?;
    Ok(())
}

/// Open the configured backend: `memory://` keeps everything in process,
/// anything else is a PostgreSQL URL that gets migrated on connect.
pub async fn connect_store(config: &DatabaseConfig) -> AppResult<Arc<dyn RewardsStore>> {
    if config.is_memory() {
        log::warn!("Using the in-memory store, data is lost on restart");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = create_pool(config).await?;
    run_migrations(&pool).await?;
    log::info!("Database connected, migrations applied");
    Ok(Arc::new(SeaOrmStore::new(pool)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_url_selects_memory_store() {
        let config = DatabaseConfig {
            url: "memory://".to_string(),
            max_connections: 1,
        };
        let store = connect_store(&config).await.unwrap();
        assert!(store.get_user(1).await.unwrap().is_none());
    }
}
