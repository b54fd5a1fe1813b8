//! Configuration de l'application chargée depuis l'environnement.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::extraction::{
    ExtractionConfig, DEFAULT_DIRECT_TEXT_THRESHOLD, DEFAULT_OCR_LANGUAGE,
};
use crate::infrastructure::error::{AppError, AppResult};

/// Configuration globale de la plateforme
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Environnement et serveur
    pub run_mode: String,
    pub server_host: String,
    pub server_port: u16,
    pub workers: usize,

    // Base de données
    pub database_url: String,

    // Sécurité
    pub jwt_secret: String,
    pub jwt_access_token_expiry_hours: i64,
    pub jwt_refresh_token_expiry_days: i64,

    // Upload
    pub upload_dir: PathBuf,
    pub max_upload_size_mb: u64,

    // Extraction
    pub extraction_temp_dir: PathBuf,
    pub direct_text_threshold: usize,
    pub ocr_language: String,
    pub extraction_timeout_seconds: u64,

    // Maintenance
    pub cleanup_interval_seconds: u64,
    pub temp_files_retention_hours: u32,
}

impl AppConfig {
    /// Charge la configuration depuis les variables d'environnement
    pub fn from_env() -> AppResult<Self> {
        // Charger le fichier .env si présent
        let _ = dotenv::dotenv();

        // Variables requises
        for var in ["DATABASE_URL", "JWT_SECRET"] {
            if env::var(var).is_err() {
                return Err(AppError::ConfigurationError(format!(
                    "Variable d'environnement requise manquante: {}",
                    var
                )));
            }
        }

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_default();
        if jwt_secret.len() < 32 {
            tracing::warn!("⚠️  JWT_SECRET trop court (< 32 caractères) - risque de sécurité");
        }

        Ok(Self {
            run_mode: env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: parse_env("SERVER_PORT", 5000),
            workers: parse_env("SERVER_WORKERS", 4),

            database_url: env::var("DATABASE_URL").unwrap_or_default(),

            jwt_secret,
            jwt_access_token_expiry_hours: parse_env("JWT_ACCESS_TOKEN_EXPIRY_HOURS", 2),
            jwt_refresh_token_expiry_days: parse_env("JWT_REFRESH_TOKEN_EXPIRY_DAYS", 30),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./uploads")),
            max_upload_size_mb: parse_env("MAX_UPLOAD_SIZE_MB", 10),

            extraction_temp_dir: env::var("EXTRACTION_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir().join("resume_extraction")),
            direct_text_threshold: parse_env(
                "EXTRACTION_DIRECT_TEXT_THRESHOLD",
                DEFAULT_DIRECT_TEXT_THRESHOLD,
            ),
            ocr_language: env::var("EXTRACTION_OCR_LANGUAGE")
                .unwrap_or_else(|_| DEFAULT_OCR_LANGUAGE.to_string()),
            extraction_timeout_seconds: parse_env("EXTRACTION_TIMEOUT_SECONDS", 120),

            cleanup_interval_seconds: parse_env("CLEANUP_INTERVAL_SECONDS", 300),
            temp_files_retention_hours: parse_env("TEMP_FILES_RETENTION_HOURS", 24),
        })
    }

    /// Taille maximale d'upload en octets
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1_000_000
    }

    /// Configuration du pipeline d'extraction dérivée de l'environnement
    pub fn extraction_config(&self) -> ExtractionConfig {
        ExtractionConfig {
            direct_text_threshold: self.direct_text_threshold,
            ocr_language: self.ocr_language.clone(),
            temp_root: self.extraction_temp_dir.clone(),
            job_timeout: Duration::from_secs(self.extraction_timeout_seconds),
        }
    }
}

fn parse_env<T: std::str::FromStr>(var: &str, default: T) -> T {
    env::var(var)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
