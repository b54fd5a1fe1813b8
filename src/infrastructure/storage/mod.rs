//! # Storage Module
//!
//! Stockage local des fichiers uploadés. Chaque fichier est rangé sous
//! un sous-dossier par utilisateur, avec un préfixe UUID pour écarter
//! toute collision de noms.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::infrastructure::error::{AppError, AppResult};

/// Stockage des uploads sur le disque local
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Initialise le stockage en créant le répertoire racine si besoin
    pub fn new(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        tracing::info!("📁 Stockage local initialisé: {}", root.display());
        Ok(Self { root })
    }

    /// Écrit un upload sur disque et retourne son chemin de stockage
    pub async fn save_upload(
        &self,
        user_id: Uuid,
        original_name: &str,
        content: &[u8],
    ) -> AppResult<PathBuf> {
        let user_dir = self.root.join(user_id.to_string());
        tokio::fs::create_dir_all(&user_dir).await?;

        let file_name = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(original_name));
        let path = user_dir.join(file_name);
        tokio::fs::write(&path, content).await?;

        tracing::debug!("📁 Fichier stocké: {}", path.display());
        Ok(path)
    }

    /// Supprime un fichier stocké. Un fichier déjà absent n'est pas une
    /// erreur (la suppression est idempotente).
    pub async fn delete_file(&self, path: &Path) -> AppResult<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::from(e)),
        }
    }

    /// Répertoire racine du stockage
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Ne garde que le dernier composant du nom et neutralise les
/// séparateurs de chemin envoyés par le client
fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .trim()
        .to_string();
    if base.is_empty() {
        "document.pdf".to_string()
    } else {
        base
    }
}
