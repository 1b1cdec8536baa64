// src/config.rs

use std::{env, str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{
    db::CrmRepository,
    services::{CrmService, DashboardService},
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub crm_service: CrmService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:crm.db".to_string());

        // Foreign keys must be on: the opportunity->account reference is the
        // only safeguard against racing deletes.
        let options = SqliteConnectOptions::from_str(&database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let db_pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await?;

        tracing::info!("✅ database connection established");

        Ok(Self::from_pool(db_pool))
    }

    /// Wires the service graph around an existing pool. Tests use this with
    /// in-memory databases.
    pub fn from_pool(db_pool: SqlitePool) -> Self {
        let repo = CrmRepository::new();
        let crm_service = CrmService::new(repo.clone());
        let dashboard_service = DashboardService::new(repo);

        Self {
            db_pool,
            crm_service,
            dashboard_service,
        }
    }
}
