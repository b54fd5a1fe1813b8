//! Routes d'authentification (inscription, connexion, rafraîchissement).

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::auth::{create_jwt_token, get_current_user, verify_refresh_token, TokenType};
use crate::domain::user::{NewUser, User, UserLogin};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::database::UserRepository;
use crate::infrastructure::error::AppResult;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh))
            .route("/logout", web::post().to(logout))
            .route("/me", web::get().to(me)),
    );
}

/// Réponse standard après authentification réussie
#[derive(Debug, Serialize)]
struct AuthResponse {
    user: User,
    access_token: String,
    refresh_token: String,
    token_type: &'static str,
    expires_in: i64,
}

impl AuthResponse {
    fn issue(user: User, config: &AppConfig) -> AppResult<Self> {
        let access_validity = Duration::hours(config.jwt_access_token_expiry_hours);
        let refresh_validity = Duration::days(config.jwt_refresh_token_expiry_days);

        let access_token =
            create_jwt_token(&user, TokenType::Access, access_validity, &config.jwt_secret)?;
        let refresh_token = create_jwt_token(
            &user,
            TokenType::Refresh,
            refresh_validity,
            &config.jwt_secret,
        )?;

        Ok(Self {
            user,
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: access_validity.num_seconds(),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
struct RefreshRequest {
    #[validate(length(min = 1, message = "Le refresh token est requis"))]
    refresh_token: String,
}

/// POST /api/auth/register - Création d'un compte
async fn register(
    users: web::Data<UserRepository>,
    config: web::Data<AppConfig>,
    payload: web::Json<NewUser>,
) -> AppResult<HttpResponse> {
    let user = users.create(payload.into_inner()).await?;
    let response = AuthResponse::issue(user, &config)?;

    tracing::info!("🚀 Nouveau compte: {}", response.user.email);
    Ok(HttpResponse::Created().json(response))
}

/// POST /api/auth/login - Connexion par email et mot de passe
async fn login(
    users: web::Data<UserRepository>,
    config: web::Data<AppConfig>,
    payload: web::Json<UserLogin>,
) -> AppResult<HttpResponse> {
    payload.validate()?;

    let user = users.authenticate(&payload.email, &payload.password).await?;
    let response = AuthResponse::issue(user, &config)?;

    tracing::info!("✅ Connexion: {}", response.user.email);
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/auth/refresh - Émet une nouvelle paire de tokens
async fn refresh(
    users: web::Data<UserRepository>,
    config: web::Data<AppConfig>,
    payload: web::Json<RefreshRequest>,
) -> AppResult<HttpResponse> {
    payload.validate()?;

    let user_id = verify_refresh_token(&payload.refresh_token, &config.jwt_secret)?;
    let user = users.get_by_id(user_id).await?;
    let response = AuthResponse::issue(user, &config)?;

    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/auth/logout - Déconnexion côté client.
///
/// Les tokens sont stateless : le client jette simplement les siens.
async fn logout(
    req: HttpRequest,
    users: web::Data<UserRepository>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let user = get_current_user(&req, &users, &config.jwt_secret).await?;
    tracing::info!("👋 Déconnexion: {}", user.email);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Déconnexion réussie"
    })))
}

/// GET /api/auth/me - Profil de l'utilisateur courant
async fn me(
    req: HttpRequest,
    users: web::Data<UserRepository>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let user = get_current_user(&req, &users, &config.jwt_secret).await?;
    Ok(HttpResponse::Ok().json(user))
}
