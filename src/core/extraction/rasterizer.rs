//! Rasterisation des pages d'un PDF en images PNG.
//!
//! L'implémentation de production invoque `pdftoppm` (Poppler) en
//! processus externe. Le trait `PageRasterizer` isole cette frontière
//! pour que les tests du pipeline puissent injecter un stub.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::ExtractionError;

/// Frontière de rasterisation : une page du document source devient une
/// image dans le répertoire de sortie (déjà créé par l'appelant).
#[async_trait]
pub trait PageRasterizer: Send + Sync {
    /// Produit une image par page et retourne les chemins produits,
    /// triés par numéro de page.
    async fn rasterize(
        &self,
        source: &Path,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, ExtractionError>;
}

/// Rasterizer basé sur `pdftoppm` de Poppler
#[derive(Debug, Clone)]
pub struct PopplerRasterizer {
    /// Binaire à invoquer (surchargeable pour les environnements sans PATH)
    binary: String,
}

impl PopplerRasterizer {
    pub fn new() -> Self {
        Self {
            binary: "pdftoppm".to_string(),
        }
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for PopplerRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageRasterizer for PopplerRasterizer {
    async fn rasterize(
        &self,
        source: &Path,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, ExtractionError> {
        let prefix = output_dir.join("page");

        // pdftoppm nomme les sorties page-01.png, page-02.png, ... avec
        // un numéro zéro-paddé : le tri lexical restitue l'ordre des pages.
        let output = Command::new(&self.binary)
            .arg("-png")
            .arg(source)
            .arg(&prefix)
            .output()
            .await
            .map_err(|e| {
                ExtractionError::RasterizationFailed(format!(
                    "impossible de lancer {}: {}",
                    self.binary, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::RasterizationFailed(format!(
                "{} a retourné {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        let images = collect_page_images(output_dir)?;
        if images.is_empty() {
            return Err(ExtractionError::RasterizationFailed(
                "aucune page produite".to_string(),
            ));
        }

        debug!("🖼️  {} page(s) rasterisée(s)", images.len());
        Ok(images)
    }
}

/// Redécouvre toutes les images produites dans le répertoire de sortie,
/// triées par nom de fichier (ordre des pages).
fn collect_page_images(output_dir: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
    let entries = std::fs::read_dir(output_dir).map_err(|e| {
        ExtractionError::RasterizationFailed(format!(
            "lecture de {} impossible: {}",
            output_dir.display(),
            e
        ))
    })?;

    let mut images: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                warn!("⚠️  Entrée illisible dans le répertoire de sortie: {}", e);
                None
            }
        })
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("png"))
                .unwrap_or(false)
        })
        .collect();

    images.sort();
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_orders_images_by_filename() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-03.png", "page-01.png", "page-02.png", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let images = collect_page_images(dir.path()).unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["page-01.png", "page-02.png", "page-03.png"]);
    }

    #[test]
    fn test_collect_empty_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_page_images(dir.path()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_binary_fails_as_rasterization_error() {
        let dir = tempfile::tempdir().unwrap();
        let rasterizer = PopplerRasterizer::with_binary("pdftoppm-introuvable-xyz");
        let err = rasterizer
            .rasterize(Path::new("input.pdf"), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::RasterizationFailed(_)));
    }
}
