//! # Database Module
//!
//! Accès PostgreSQL via sqlx. Chaque agrégat métier possède son
//! repository, construit sur un `PgPool` cloné (le pool est un handle
//! partagé, pas une connexion).

pub mod resumes;
pub mod users;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::infrastructure::error::AppResult;

pub use resumes::ResumeRepository;
pub use users::UserRepository;

/// Point d'entrée de la couche base de données
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Ouvre un pool de connexions vers PostgreSQL
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        tracing::info!("✅ Pool PostgreSQL initialisé");
        Ok(Self { pool })
    }

    /// Handle vers le pool sous-jacent
    pub fn pool(&self) -> PgPool {
        self.pool.clone()
    }

    /// Vérifie que la base répond (endpoint /health)
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
