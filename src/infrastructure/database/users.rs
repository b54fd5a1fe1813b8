//! Repository des utilisateurs.
//!
//! Toutes les requêtes passent par l'API runtime de sqlx afin de rester
//! compilables sans base de données accessible au build.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::domain::user::{NewUser, User};
use crate::infrastructure::error::{AppError, AppResult};

/// Repository gérant la persistance des utilisateurs
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Crée un nouvel utilisateur après validation des données
    ///
    /// Workflow:
    /// 1. Validation des champs (format email, longueur mot de passe)
    /// 2. Vérification d'unicité de l'email
    /// 3. Hash du mot de passe et insertion
    pub async fn create(&self, new_user: NewUser) -> AppResult<User> {
        new_user.validate()?;

        if self.email_exists(&new_user.email).await? {
            return Err(AppError::Conflict(format!(
                "Un compte existe déjà pour {}",
                new_user.email
            )));
        }

        let user = User::new(new_user.name, new_user.email, new_user.password);

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at, updated_at, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.is_active)
        .execute(&self.pool)
        .await?;

        tracing::info!("✅ Utilisateur créé: {} ({})", user.email, user.id);
        Ok(user)
    }

    /// Récupère un utilisateur par son ID
    pub async fn get_by_id(&self, user_id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND is_active = TRUE")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Utilisateur".to_string()))
    }

    /// Récupère un utilisateur par son email
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1 AND is_active = TRUE")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    /// Authentifie un utilisateur par email et mot de passe.
    ///
    /// Retourne la même erreur 401 que l'email soit inconnu ou le mot
    /// de passe faux, pour ne pas révéler l'existence d'un compte.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let invalid = || AppError::Unauthorized("Email ou mot de passe incorrect".to_string());

        let user = self.get_by_email(email).await?.ok_or_else(invalid)?;
        if !user.verify_password(password) {
            tracing::warn!("❌ Tentative de connexion échouée pour {}", email);
            return Err(invalid());
        }

        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }
}
