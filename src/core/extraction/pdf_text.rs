//! Extraction directe du texte embarqué dans un PDF via lopdf.
//!
//! Aucun effet de bord : le document est parsé en mémoire, le texte de
//! chaque page est concaténé dans l'ordre des pages. Un PDF scanné sans
//! couche texte produit une chaîne vide, ce qui déclenche le fallback
//! OCR côté orchestrateur.

use lopdf::Document;
use tracing::debug;

use super::ExtractionError;

/// Extrait le texte embarqué d'un PDF fourni en mémoire.
///
/// Les pages sont parcourues dans l'ordre 1..N et leurs textes joints
/// par un saut de ligne ; le résultat final est trimé. Un flux d'octets
/// qui n'est pas un PDF valide produit `MalformedDocument`.
pub fn extract_embedded_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| ExtractionError::MalformedDocument(e.to_string()))?;

    let pages = doc.get_pages();
    debug!("📄 Document chargé: {} page(s)", pages.len());

    let mut page_texts = Vec::with_capacity(pages.len());
    for (&page_num, _) in pages.iter() {
        let text = doc
            .extract_text(&[page_num])
            .map_err(|e| {
                ExtractionError::MalformedDocument(format!("page {}: {}", page_num, e))
            })?;
        page_texts.push(normalize_page_text(&text));
    }

    Ok(page_texts.join("\n").trim().to_string())
}

/// Remplace les blancs consécutifs d'une page par des espaces simples.
/// lopdf insère ses propres sauts de ligne entre les objets texte ; on
/// garde une ligne par page pour un résultat reproductible.
fn normalize_page_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
