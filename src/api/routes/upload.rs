//! Route d'upload de CV : réception multipart, extraction du texte
//! (directe ou OCR) puis analyse et enregistrement.

use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::TryStreamExt;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::core::analysis::CvAnalyzer;
use crate::core::auth::get_current_user;
use crate::core::extraction::{ExtractionOutcome, ExtractionPipeline};
use crate::domain::resume::{ExtractionMethod, NewResume};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::database::{ResumeRepository, UserRepository};
use crate::infrastructure::error::{AppError, AppResult};
use crate::infrastructure::storage::LocalStorage;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/ocr").route("/upload", web::post().to(upload_resume)));
}

/// Fichier uploadé, une fois le flux multipart consommé
struct UploadedFile {
    name: String,
    content: Vec<u8>,
}

/// POST /api/ocr/upload - Upload d'un CV PDF et extraction du texte
///
/// Workflow:
/// 1. Authentification de l'utilisateur
/// 2. Lecture du champ multipart `file` (taille bornée)
/// 3. Validation du format PDF (extension + magic bytes)
/// 4. Stockage du fichier puis extraction sur une tâche dédiée
/// 5. Analyse du texte et enregistrement du CV
async fn upload_resume(
    req: HttpRequest,
    payload: Multipart,
    users: web::Data<UserRepository>,
    resumes: web::Data<ResumeRepository>,
    storage: web::Data<LocalStorage>,
    pipeline: web::Data<ExtractionPipeline>,
    analyzer: web::Data<CvAnalyzer>,
    app_config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let user = get_current_user(&req, &users, &app_config.jwt_secret).await?;

    let file = read_file_field(payload, app_config.max_upload_size_bytes()).await?;
    validate_pdf(&file)?;

    let content_hash = hex::encode(Sha256::digest(&file.content));
    let stored_path = storage
        .save_upload(user.id, &file.name, &file.content)
        .await?;

    tracing::info!(
        "🔄 Extraction démarrée: {} ({} octets) pour {}",
        file.name,
        file.content.len(),
        user.email
    );

    // L'extraction (rasterisation + OCR) peut durer : elle tourne sur sa
    // propre tâche tokio pour ne pas bloquer le worker HTTP.
    let outcome = {
        let pipeline = pipeline.clone();
        let source = stored_path.clone();
        let original_name = file.name.clone();
        let handle =
            tokio::spawn(async move { pipeline.run(&source, &original_name).await });

        match handle.await? {
            Ok(outcome) => outcome,
            Err(e) => {
                // Le fichier stocké n'a plus d'intérêt sans texte extrait
                let _ = storage.delete_file(&stored_path).await;
                return Err(e.into());
            }
        }
    };

    let ocr_sourced = matches!(outcome, ExtractionOutcome::Ocr(_));
    let analysis = analyzer.analyze(outcome.text(), ocr_sourced);

    let resume = resumes
        .create(NewResume {
            user_id: user.id,
            file_name: file.name,
            file_path: stored_path.to_string_lossy().into_owned(),
            content_hash,
            extraction_method: ExtractionMethod::from(&outcome),
            extracted_text: outcome.text().to_string(),
            overall_score: analysis.overall_score,
            ats_score: analysis.ats_score,
        })
        .await?;

    tracing::info!(
        "✅ Extraction terminée: {} (méthode: {})",
        resume.id,
        resume.extraction_method
    );

    Ok(HttpResponse::Created().json(json!({
        "resume_id": resume.id,
        "file_name": resume.file_name,
        "extraction": outcome,
        "analysis": analysis,
    })))
}

/// Consomme le flux multipart et retourne le contenu du champ `file`
async fn read_file_field(mut payload: Multipart, max_bytes: u64) -> AppResult<UploadedFile> {
    while let Some(mut field) = payload.try_next().await? {
        let (field_name, file_name) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().unwrap_or_default().to_string(),
                cd.get_filename().unwrap_or("document.pdf").to_string(),
            ),
            None => continue,
        };
        if field_name != "file" {
            continue;
        }

        let mut content = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if (content.len() + chunk.len()) as u64 > max_bytes {
                return Err(AppError::PayloadTooLarge(format!(
                    "limite de {} octets dépassée",
                    max_bytes
                )));
            }
            content.extend_from_slice(&chunk);
        }

        if content.is_empty() {
            return Err(AppError::BadRequest("Fichier vide".to_string()));
        }

        return Ok(UploadedFile {
            name: file_name,
            content,
        });
    }

    Err(AppError::BadRequest(
        "Champ multipart 'file' manquant".to_string(),
    ))
}

/// Seuls les PDF sont acceptés : extension .pdf et en-tête %PDF-
fn validate_pdf(file: &UploadedFile) -> AppResult<()> {
    let has_pdf_extension = file
        .name
        .rsplit('.')
        .next()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    let has_pdf_magic = file.content.starts_with(b"%PDF-");

    if !has_pdf_extension || !has_pdf_magic {
        return Err(AppError::UnsupportedMediaType(format!(
            "'{}' n'est pas un PDF",
            file.name
        )));
    }
    Ok(())
}
