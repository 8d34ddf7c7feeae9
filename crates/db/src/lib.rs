pub mod models;

use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

/// Shared database handle. Cloning is cheap; the pool is reference-counted.
#[derive(Clone)]
pub struct DBService {
    pub pool: PgPool,
}

impl DBService {
    /// Connect to Postgres and bring the schema up to date.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("database connected, migrations applied");

        Ok(Self { pool })
    }
}
