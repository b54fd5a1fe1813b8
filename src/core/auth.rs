//! Service d'authentification JWT.
//!
//! Création et validation des tokens d'accès et de rafraîchissement,
//! plus la résolution de l'utilisateur courant depuis l'en-tête
//! `Authorization: Bearer ...` d'une requête.

use actix_web::HttpRequest;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::User;
use crate::infrastructure::database::UserRepository;
use crate::infrastructure::error::{AppError, AppResult};

/// Type de token émis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims portés par les tokens JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Identifiant de l'utilisateur (UUID)
    pub sub: String,
    /// Nom affiché
    pub name: String,
    /// Email de l'utilisateur
    pub email: String,
    /// Access ou refresh
    pub token_type: TokenType,
    /// Expiration (timestamp Unix)
    pub exp: i64,
    /// Émission (timestamp Unix)
    pub iat: i64,
}

/// Crée un token JWT signé pour un utilisateur
pub fn create_jwt_token(
    user: &User,
    token_type: TokenType,
    validity: Duration,
    secret: &str,
) -> AppResult<String> {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: user.id.to_string(),
        name: user.name.clone(),
        email: user.email.clone(),
        token_type,
        exp: (now + validity).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalError(format!("Signature JWT impossible: {}", e)))
}

/// Valide un token JWT et retourne ses claims
pub fn validate_jwt_token(token: &str, secret: &str) -> AppResult<JwtClaims> {
    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Unauthorized(format!("Token invalide: {}", e)))?;

    Ok(data.claims)
}

/// Extrait le bearer token de l'en-tête Authorization
pub fn bearer_token(req: &HttpRequest) -> AppResult<&str> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Unauthorized("En-tête Authorization manquant".to_string()))?;

    let value = header
        .to_str()
        .map_err(|_| AppError::Unauthorized("En-tête Authorization illisible".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Schéma Bearer attendu".to_string()))
}

/// Résout l'utilisateur courant d'une requête authentifiée.
///
/// Seuls les tokens d'accès sont acceptés ici ; un refresh token dans
/// l'en-tête Authorization est rejeté.
pub async fn get_current_user(
    req: &HttpRequest,
    users: &UserRepository,
    secret: &str,
) -> AppResult<User> {
    let claims = validate_jwt_token(bearer_token(req)?, secret)?;

    if claims.token_type != TokenType::Access {
        return Err(AppError::Unauthorized(
            "Un token d'accès est requis".to_string(),
        ));
    }

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Identifiant de token invalide".to_string()))?;

    users.get_by_id(user_id).await
}

/// Vérifie un refresh token et retourne l'identifiant utilisateur
pub fn verify_refresh_token(token: &str, secret: &str) -> AppResult<Uuid> {
    let claims = validate_jwt_token(token, secret)?;

    if claims.token_type != TokenType::Refresh {
        return Err(AppError::Unauthorized(
            "Un refresh token est requis".to_string(),
        ));
    }

    Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Identifiant de token invalide".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::User;

    const SECRET: &str = "secret-de-test-suffisamment-long-pour-jwt";

    fn test_user() -> User {
        User::new(
            "Sarah Johnson".to_string(),
            "sarah@example.com".to_string(),
            Some("password123".to_string()),
        )
    }

    #[test]
    fn test_access_token_roundtrip() {
        let user = test_user();
        let token =
            create_jwt_token(&user, TokenType::Access, Duration::hours(2), SECRET).unwrap();

        let claims = validate_jwt_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "sarah@example.com");
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let user = test_user();
        let token =
            create_jwt_token(&user, TokenType::Access, Duration::hours(2), SECRET).unwrap();

        let result = validate_jwt_token(&token, "un-autre-secret-completement-different");
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let user = test_user();
        let token =
            create_jwt_token(&user, TokenType::Access, Duration::hours(-1), SECRET).unwrap();

        let result = validate_jwt_token(&token, SECRET);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_refresh_token_verification() {
        let user = test_user();
        let refresh =
            create_jwt_token(&user, TokenType::Refresh, Duration::days(30), SECRET).unwrap();
        let access =
            create_jwt_token(&user, TokenType::Access, Duration::hours(2), SECRET).unwrap();

        assert_eq!(verify_refresh_token(&refresh, SECRET).unwrap(), user.id);
        assert!(verify_refresh_token(&access, SECRET).is_err());
    }
}
