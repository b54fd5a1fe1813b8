//! # API Module
//!
//! Couche HTTP de la plateforme (actix-web). Les handlers sont groupés
//! par ressource dans `routes/` et montés sous le préfixe `/api`.

pub mod routes;

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::infrastructure::database::Database;
use crate::infrastructure::error::AppResult;

/// Enregistre toutes les routes de l'application
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check)).service(
        web::scope("/api")
            .configure(routes::auth::config)
            .configure(routes::upload::config)
            .configure(routes::resumes::config),
    );
}

/// GET /health - Vérification de l'état du service
async fn health_check(database: web::Data<Database>) -> AppResult<HttpResponse> {
    database.ping().await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": crate::NAME,
        "version": crate::VERSION,
    })))
}
