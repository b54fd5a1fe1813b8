//! # Core Module
//!
//! Logique métier de la plateforme :
//! - `extraction`: pipeline d'extraction de texte (direct + OCR)
//! - `analysis`: collaborateur d'analyse de CV (scores heuristiques)
//! - `auth`: création/validation des tokens JWT

pub mod analysis;
pub mod auth;
pub mod extraction;

// Ré-exports pour faciliter l'import
pub use analysis::{CvAnalysis, CvAnalyzer};
pub use extraction::{ExtractionConfig, ExtractionError, ExtractionOutcome, ExtractionPipeline};
