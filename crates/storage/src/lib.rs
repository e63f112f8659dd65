pub mod error;
pub mod models;
pub mod repository;
pub mod store;

pub use error::{Result, StorageError};
pub use store::{CompetitionStore, MemoryStore, PgStore};

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Connection pool plus the embedded migrations.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn with_max_connections(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn store(&self) -> PgStore {
        PgStore::new(self.pool.clone())
    }
}
