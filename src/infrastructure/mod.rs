//! # Infrastructure Module
//!
//! Couche d'infrastructure de la plateforme : configuration, erreurs,
//! accès base de données et stockage des fichiers uploadés.

pub mod config;
pub mod database;
pub mod error;
pub mod storage;

pub use config::AppConfig;
pub use database::Database;
pub use error::{AppError, AppResult};
pub use storage::LocalStorage;
