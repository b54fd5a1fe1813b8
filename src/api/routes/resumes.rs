//! Routes de consultation et gestion des CV enregistrés.

use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::core::auth::get_current_user;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::database::{ResumeRepository, UserRepository};
use crate::infrastructure::error::AppResult;
use crate::infrastructure::storage::LocalStorage;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/resumes")
            .route("", web::get().to(list_resumes))
            .route("/stats", web::get().to(user_stats))
            .route("/{id}", web::get().to(get_resume))
            .route("/{id}", web::delete().to(delete_resume)),
    );
}

/// GET /api/resumes - Historique des CV de l'utilisateur
async fn list_resumes(
    req: HttpRequest,
    users: web::Data<UserRepository>,
    resumes: web::Data<ResumeRepository>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let user = get_current_user(&req, &users, &config.jwt_secret).await?;
    let list = resumes.list_for_user(user.id).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /api/resumes/stats - Statistiques agrégées de l'utilisateur
async fn user_stats(
    req: HttpRequest,
    users: web::Data<UserRepository>,
    resumes: web::Data<ResumeRepository>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let user = get_current_user(&req, &users, &config.jwt_secret).await?;
    let stats = resumes.stats_for_user(user.id).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// GET /api/resumes/{id} - Détail d'un CV
async fn get_resume(
    req: HttpRequest,
    path: web::Path<Uuid>,
    users: web::Data<UserRepository>,
    resumes: web::Data<ResumeRepository>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let user = get_current_user(&req, &users, &config.jwt_secret).await?;
    let resume = resumes.get_for_user(path.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(resume))
}

/// DELETE /api/resumes/{id} - Suppression d'un CV et de son fichier
async fn delete_resume(
    req: HttpRequest,
    path: web::Path<Uuid>,
    users: web::Data<UserRepository>,
    resumes: web::Data<ResumeRepository>,
    storage: web::Data<LocalStorage>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let user = get_current_user(&req, &users, &config.jwt_secret).await?;
    let file_path = resumes.delete_for_user(path.into_inner(), user.id).await?;

    storage.delete_file(std::path::Path::new(&file_path)).await?;

    Ok(HttpResponse::NoContent().finish())
}
