//! # Extraction Module
//!
//! Ce module contient le pipeline d'extraction de texte des CV uploadés :
//! - `pdf_text.rs`: Extraction directe du texte embarqué dans les PDF
//! - `rasterizer.rs`: Conversion des pages PDF en images (pdftoppm)
//! - `ocr.rs`: Reconnaissance de caractères sur les images (tesseract)
//! - `pipeline.rs`: Orchestrateur qui enchaîne les trois étapes
//!
//! ## Workflow
//! 1. Tentative d'extraction directe du texte embarqué
//! 2. Si le texte est trop court (PDF scanné), fallback vers l'OCR :
//!    rasterisation de chaque page puis reconnaissance image par image
//! 3. Retour d'un résultat taggé (méthode + texte) ou d'une erreur
//!
//! ## Gestion des erreurs
//! Chaque étape peut échouer et produit une variante dédiée de
//! `ExtractionError`. Le répertoire temporaire du job est supprimé sur
//! tous les chemins de sortie, y compris timeout et annulation.

pub mod ocr;
pub mod pdf_text;
pub mod pipeline;
pub mod rasterizer;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use ocr::{RecognitionEngine, TesseractEngine};
pub use pdf_text::extract_embedded_text;
pub use pipeline::ExtractionPipeline;
pub use rasterizer::{PageRasterizer, PopplerRasterizer};

/// Seuil par défaut (en caractères) au-delà duquel l'extraction directe
/// est considérée comme suffisante. En-dessous, le PDF est probablement
/// un scan sans couche texte et le pipeline bascule vers l'OCR.
pub const DEFAULT_DIRECT_TEXT_THRESHOLD: usize = 100;

/// Langue par défaut pour la reconnaissance de caractères
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

/// Résultat d'une extraction réussie, taggé par la méthode utilisée
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "text", rename_all = "kebab-case")]
pub enum ExtractionOutcome {
    /// Texte lu directement dans la couche texte du PDF
    DirectText(String),
    /// Texte reconstruit par reconnaissance optique de caractères
    Ocr(String),
}

impl ExtractionOutcome {
    /// Tag de la méthode, tel qu'exposé par l'API et stocké en base
    pub fn method(&self) -> &'static str {
        match self {
            ExtractionOutcome::DirectText(_) => "direct-text",
            ExtractionOutcome::Ocr(_) => "ocr",
        }
    }

    /// Texte extrait
    pub fn text(&self) -> &str {
        match self {
            ExtractionOutcome::DirectText(text) => text,
            ExtractionOutcome::Ocr(text) => text,
        }
    }

    /// Consomme le résultat et retourne le texte
    pub fn into_text(self) -> String {
        match self {
            ExtractionOutcome::DirectText(text) => text,
            ExtractionOutcome::Ocr(text) => text,
        }
    }
}

/// Erreurs du pipeline d'extraction
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// Le document n'est pas un PDF lisible (erreur client, non retenté)
    #[error("Document illisible: {0}")]
    MalformedDocument(String),

    /// La rasterisation des pages a échoué (outil externe)
    #[error("Rasterisation échouée: {0}")]
    RasterizationFailed(String),

    /// La reconnaissance de caractères a échoué sur une image
    #[error("Reconnaissance échouée: {0}")]
    RecognitionFailed(String),

    /// Le pipeline est allé au bout mais n'a produit aucun texte
    #[error("L'OCR n'a produit aucun texte exploitable")]
    EmptyOcrResult,

    /// Une étape a dépassé le délai configuré pour le job
    #[error("Extraction interrompue après {0:?}")]
    Timeout(Duration),
}

/// Configuration du pipeline d'extraction
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Longueur minimale du texte direct avant fallback OCR
    pub direct_text_threshold: usize,
    /// Langue passée au moteur de reconnaissance
    pub ocr_language: String,
    /// Racine des répertoires temporaires de job
    pub temp_root: PathBuf,
    /// Délai maximum pour un job complet
    pub job_timeout: Duration,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            direct_text_threshold: DEFAULT_DIRECT_TEXT_THRESHOLD,
            ocr_language: DEFAULT_OCR_LANGUAGE.to_string(),
            temp_root: std::env::temp_dir().join("resume_extraction"),
            job_timeout: Duration::from_secs(120),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serialization_tags() {
        let direct = ExtractionOutcome::DirectText("Bonjour".to_string());
        let json = serde_json::to_value(&direct).unwrap();
        assert_eq!(json["method"], "direct-text");
        assert_eq!(json["text"], "Bonjour");

        let ocr = ExtractionOutcome::Ocr("Hello World".to_string());
        let json = serde_json::to_value(&ocr).unwrap();
        assert_eq!(json["method"], "ocr");
        assert_eq!(json["text"], "Hello World");
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome = ExtractionOutcome::Ocr("texte".to_string());
        assert_eq!(outcome.method(), "ocr");
        assert_eq!(outcome.text(), "texte");
        assert_eq!(outcome.into_text(), "texte");
    }
}
