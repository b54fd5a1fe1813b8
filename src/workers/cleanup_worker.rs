//! Worker de nettoyage des répertoires temporaires d'extraction.
//!
//! Chaque job nettoie son propre répertoire en fin de vie, y compris en
//! erreur. Ce worker est le filet de sécurité pour les répertoires
//! orphelins laissés par un arrêt brutal du processus.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::infrastructure::config::AppConfig;

/// Configuration du worker de nettoyage
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// Racine des répertoires temporaires d'extraction
    pub temp_root: PathBuf,
    /// Intervalle entre deux passes
    pub interval: Duration,
    /// Âge minimum d'un répertoire pour être considéré orphelin
    pub retention: Duration,
}

impl CleanupConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            temp_root: config.extraction_temp_dir.clone(),
            interval: Duration::from_secs(config.cleanup_interval_seconds),
            retention: Duration::from_secs(u64::from(config.temp_files_retention_hours) * 3600),
        }
    }
}

/// Démarre le worker de nettoyage en tâche de fond
pub fn start_cleanup_worker(config: CleanupConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(
            "🧹 Worker de nettoyage démarré (intervalle: {:?}, rétention: {:?})",
            config.interval,
            config.retention
        );

        let mut ticker = tokio::time::interval(config.interval);
        // Le premier tick est immédiat : on nettoie au démarrage les
        // restes d'une exécution précédente.
        loop {
            ticker.tick().await;

            match sweep_stale_jobs(&config.temp_root, config.retention) {
                Ok(0) => {}
                Ok(removed) => {
                    tracing::info!("🧹 {} répertoire(s) orphelin(s) supprimé(s)", removed)
                }
                Err(e) => tracing::warn!("❌ Passe de nettoyage échouée: {}", e),
            }
        }
    })
}

/// Supprime les répertoires de job plus vieux que `retention`.
/// Retourne le nombre de répertoires supprimés.
fn sweep_stale_jobs(temp_root: &Path, retention: Duration) -> std::io::Result<usize> {
    if !temp_root.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in std::fs::read_dir(temp_root)? {
        let entry = entry?;
        let path = entry.path();

        // Seuls les répertoires créés par le pipeline sont concernés
        let is_job_dir = path.is_dir()
            && entry
                .file_name()
                .to_str()
                .map(|name| name.starts_with("job-"))
                .unwrap_or(false);
        if !is_job_dir {
            continue;
        }

        let age = entry
            .metadata()?
            .modified()?
            .elapsed()
            .unwrap_or_default();
        if age >= retention {
            std::fs::remove_dir_all(&path)?;
            tracing::debug!("🧹 Supprimé: {}", path.display());
            removed += 1;
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_removes_stale_job_dirs() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("job-abc")).unwrap();
        std::fs::create_dir(root.path().join("job-def")).unwrap();

        // Rétention nulle : tout répertoire de job est orphelin
        let removed = sweep_stale_jobs(root.path(), Duration::ZERO).unwrap();
        assert_eq!(removed, 2);
        assert!(std::fs::read_dir(root.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_sweep_keeps_recent_job_dirs() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("job-abc")).unwrap();

        let removed = sweep_stale_jobs(root.path(), Duration::from_secs(3600)).unwrap();
        assert_eq!(removed, 0);
        assert!(root.path().join("job-abc").exists());
    }

    #[test]
    fn test_sweep_ignores_foreign_entries() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("autre-dossier")).unwrap();
        std::fs::write(root.path().join("job-fichier.txt"), b"pas un dossier").unwrap();

        let removed = sweep_stale_jobs(root.path(), Duration::ZERO).unwrap();
        assert_eq!(removed, 0);
        assert!(root.path().join("autre-dossier").exists());
        assert!(root.path().join("job-fichier.txt").exists());
    }

    #[test]
    fn test_sweep_on_missing_root_is_noop() {
        let removed =
            sweep_stale_jobs(Path::new("/tmp/nexiste-pas-du-tout-xyz"), Duration::ZERO).unwrap();
        assert_eq!(removed, 0);
    }
}
