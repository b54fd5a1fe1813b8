use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::extraction::ExtractionOutcome;

/// Méthode d'extraction ayant produit le texte d'un CV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    DirectText,
    Ocr,
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionMethod::DirectText => write!(f, "direct-text"),
            ExtractionMethod::Ocr => write!(f, "ocr"),
        }
    }
}

impl From<&ExtractionOutcome> for ExtractionMethod {
    fn from(outcome: &ExtractionOutcome) -> Self {
        match outcome {
            ExtractionOutcome::DirectText(_) => ExtractionMethod::DirectText,
            ExtractionOutcome::Ocr(_) => ExtractionMethod::Ocr,
        }
    }
}

/// Représente un CV uploadé et analysé
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Resume {
    /// Identifiant unique du CV
    pub id: Uuid,
    /// ID de l'utilisateur propriétaire
    pub user_id: Uuid,
    /// Nom du fichier original (diagnostic et affichage uniquement)
    pub file_name: String,
    /// Chemin du fichier stocké sur disque
    pub file_path: String,
    /// Empreinte SHA-256 du contenu uploadé
    pub content_hash: String,
    /// Méthode ayant produit le texte
    pub extraction_method: ExtractionMethod,
    /// Texte extrait du document
    pub extracted_text: String,
    /// Score global de l'analyse (0 = pas encore scoré)
    pub overall_score: i32,
    /// Score de compatibilité ATS (0 = pas encore scoré)
    pub ats_score: i32,
    /// Date d'upload
    pub uploaded_at: DateTime<Utc>,
}

/// Données requises pour enregistrer un nouveau CV
#[derive(Debug, Clone)]
pub struct NewResume {
    pub user_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub content_hash: String,
    pub extraction_method: ExtractionMethod,
    pub extracted_text: String,
    pub overall_score: i32,
    pub ats_score: i32,
}

/// Statistiques agrégées des CV d'un utilisateur
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_resumes: i64,
    pub average_score: i32,
    pub avg_ats_score: i32,
}

impl UserStats {
    pub fn empty() -> Self {
        Self {
            total_resumes: 0,
            average_score: 0,
            avg_ats_score: 0,
        }
    }
}

/// Réduit l'historique d'un utilisateur en statistiques agrégées.
///
/// Un score à zéro signifie "pas encore scoré" et n'entre pas dans la
/// moyenne : la moyenne arithmétique est calculée sur les scores non
/// nuls puis arrondie à l'entier le plus proche, et vaut zéro quand
/// aucun score qualifiant n'existe.
pub fn compute_user_stats(resumes: &[Resume]) -> UserStats {
    UserStats {
        total_resumes: resumes.len() as i64,
        average_score: mean_of_nonzero(resumes.iter().map(|r| r.overall_score)),
        avg_ats_score: mean_of_nonzero(resumes.iter().map(|r| r.ats_score)),
    }
}

fn mean_of_nonzero(scores: impl Iterator<Item = i32>) -> i32 {
    let qualifying: Vec<i32> = scores.filter(|&s| s > 0).collect();
    if qualifying.is_empty() {
        return 0;
    }
    let sum: i64 = qualifying.iter().map(|&s| s as i64).sum();
    (sum as f64 / qualifying.len() as f64).round() as i32
}
