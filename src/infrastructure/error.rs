use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use sqlx::Error as SqlxError;
use validator::ValidationErrors;

use crate::core::extraction::ExtractionError;

/// Type de résultat standard pour l'application
pub type AppResult<T> = Result<T, AppError>;

/// Erreurs principales de l'application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Erreur d'authentification (401 Unauthorized)
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Permissions insuffisantes (403 Forbidden)
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Ressource non trouvée (404 Not Found)
    #[error("{0} not found")]
    NotFound(String),

    /// Conflit de ressources (409 Conflict)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Données invalides (422 Unprocessable Entity)
    #[error("Validation failed: {0}")]
    ValidationError(ValidationErrors),

    /// Requête mal formée (400 Bad Request)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Le pipeline a tourné mais n'a produit aucun texte exploitable
    /// (422 Unprocessable Entity)
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// Erreur interne du serveur (500 Internal Server Error)
    #[error("Internal server error: {0}")]
    InternalError(String),

    /// Erreur de base de données (500 Internal Server Error)
    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    /// Erreur de sérialisation/désérialisation (500 Internal Server Error)
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Erreur d'infrastructure (stockage, processus externe, etc.)
    /// (500 Internal Server Error)
    #[error("Infrastructure error: {0}")]
    InfrastructureError(String),

    /// Erreur de configuration (500 Internal Server Error)
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Timeout d'opération (504 Gateway Timeout)
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// Type de média non supporté (415 Unsupported Media Type)
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Payload trop lourd (413 Payload Too Large)
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
}

impl AppError {
    /// Convertit l'erreur en code HTTP approprié
    pub fn http_status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ExtractionFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InfrastructureError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Convertit l'erreur en message utilisateur-friendly
    /// (à utiliser pour les réponses clients, pas pour le logging)
    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::Unauthorized(_) => {
                "Authentification échouée. Veuillez vérifier vos identifiants.".to_string()
            }
            AppError::Forbidden(_) => {
                "Vous n'avez pas les permissions nécessaires pour cette action.".to_string()
            }
            AppError::NotFound(resource) => format!("{} non trouvé", resource),
            AppError::Conflict(_) => {
                "Conflit: cette ressource existe déjà ou est en cours d'utilisation.".to_string()
            }
            AppError::ValidationError(errors) => {
                let mut messages = Vec::new();
                for field_errors in errors.errors().values() {
                    if let validator::ValidationErrorsKind::Field(errs) = field_errors {
                        for error in errs {
                            if let Some(msg) = error.message.as_ref() {
                                messages.push(msg.to_string());
                            }
                        }
                    }
                }
                if messages.is_empty() {
                    "Données invalides. Veuillez vérifier le format des champs.".to_string()
                } else {
                    messages.join("; ")
                }
            }
            AppError::BadRequest(msg) => format!("Requête incorrecte: {}", msg),
            AppError::ExtractionFailed(_) => {
                "Impossible d'extraire le texte de ce document.".to_string()
            }
            AppError::Timeout(_) => {
                "L'opération a pris trop de temps. Veuillez réessayer plus tard.".to_string()
            }
            AppError::UnsupportedMediaType(_) => {
                "Type de fichier non supporté. Veuillez uploader un PDF.".to_string()
            }
            AppError::PayloadTooLarge(_) => {
                "Fichier trop volumineux. Veuillez réduire la taille.".to_string()
            }
            AppError::InternalError(_)
            | AppError::DatabaseError(_)
            | AppError::SerializationError(_)
            | AppError::InfrastructureError(_)
            | AppError::ConfigurationError(_) => {
                "Une erreur interne est survenue. Notre équipe technique a été notifiée."
                    .to_string()
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.http_status()
    }

    fn error_response(&self) -> HttpResponse {
        let error_response = ErrorResponse {
            error: self.user_friendly_message(),
            code: self.http_status().as_u16(),
        };

        HttpResponse::build(self.http_status()).json(error_response)
    }
}

/// Structure de réponse d'erreur standardisée
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

// Implémentations From pour les conversions automatiques

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::ValidationError(errors)
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        AppError::InfrastructureError(format!("IO error: {}", error))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(error: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("Task join error: {}", error))
    }
}

impl From<actix_multipart::MultipartError> for AppError {
    fn from(error: actix_multipart::MultipartError) -> Self {
        AppError::BadRequest(format!("Multipart invalide: {}", error))
    }
}

impl From<ExtractionError> for AppError {
    fn from(error: ExtractionError) -> Self {
        match error {
            // Entrée illisible : erreur client, jamais retentée
            ExtractionError::MalformedDocument(msg) => {
                AppError::BadRequest(format!("Document illisible: {}", msg))
            }
            ExtractionError::RasterizationFailed(msg) => {
                AppError::InfrastructureError(format!("Rasterisation: {}", msg))
            }
            ExtractionError::RecognitionFailed(msg) => {
                AppError::InfrastructureError(format!("Reconnaissance: {}", msg))
            }
            ExtractionError::EmptyOcrResult => {
                AppError::ExtractionFailed("aucun texte reconnu".to_string())
            }
            ExtractionError::Timeout(duration) => {
                AppError::Timeout(format!("extraction interrompue après {:?}", duration))
            }
        }
    }
}

// Helper functions pour créer des erreurs courantes

pub fn not_found<T: Into<String>>(resource: T) -> AppError {
    AppError::NotFound(resource.into())
}

pub fn internal_error<T: Into<String>>(message: T) -> AppError {
    AppError::InternalError(message.into())
}

pub fn unauthorized<T: Into<String>>(message: T) -> AppError {
    AppError::Unauthorized(message.into())
}

pub fn forbidden<T: Into<String>>(message: T) -> AppError {
    AppError::Forbidden(message.into())
}

pub fn conflict<T: Into<String>>(message: T) -> AppError {
    AppError::Conflict(message.into())
}
