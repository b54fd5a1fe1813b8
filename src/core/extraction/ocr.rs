//! Reconnaissance optique de caractères sur les images rasterisées.
//!
//! L'implémentation de production invoque `tesseract` en processus
//! externe, image par image. Politique d'échec : l'échec d'une seule
//! image fait échouer tout le job plutôt que de retourner un texte
//! partiel silencieusement.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::ExtractionError;

/// Frontière de reconnaissance : une image raster devient du texte.
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Reconnaît le texte d'une image, avec un indice de langue.
    async fn recognize(&self, image: &Path, language: &str) -> Result<String, ExtractionError>;
}

/// Moteur basé sur le binaire `tesseract`
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: String,
}

impl TesseractEngine {
    pub fn new() -> Self {
        Self {
            binary: "tesseract".to_string(),
        }
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Vérifie que le binaire est invocable (sonde de démarrage)
    pub async fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecognitionEngine for TesseractEngine {
    async fn recognize(&self, image: &Path, language: &str) -> Result<String, ExtractionError> {
        // tesseract écrit <base>.txt à côté de l'image ; le fichier vit
        // dans le répertoire temporaire du job et part avec lui.
        let output_base = image.with_extension("");

        let output = Command::new(&self.binary)
            .arg(image)
            .arg(&output_base)
            .arg("-l")
            .arg(language)
            .arg("--oem")
            .arg("3")
            .arg("--psm")
            .arg("3")
            .output()
            .await
            .map_err(|e| {
                ExtractionError::RecognitionFailed(format!(
                    "impossible de lancer {}: {}",
                    self.binary, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::RecognitionFailed(format!(
                "{} sur {}: {}",
                self.binary,
                image.display(),
                stderr.trim()
            )));
        }

        let text_file = output_base.with_extension("txt");
        let text = tokio::fs::read_to_string(&text_file).await.map_err(|e| {
            ExtractionError::RecognitionFailed(format!(
                "sortie {} illisible: {}",
                text_file.display(),
                e
            ))
        })?;

        debug!(
            "🔤 {} caractères reconnus sur {}",
            text.trim().len(),
            image.display()
        );
        Ok(text.trim().to_string())
    }
}
