use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Représente un utilisateur du système
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Identifiant unique de l'utilisateur (UUID)
    pub id: Uuid,
    /// Nom complet de l'utilisateur
    pub name: String,
    /// Email de l'utilisateur (unique)
    pub email: String,
    /// Hash du mot de passe (jamais exposé dans les APIs)
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Date de création du compte
    pub created_at: DateTime<Utc>,
    /// Date de dernière mise à jour
    pub updated_at: DateTime<Utc>,
    /// Statut du compte (actif/désactivé)
    pub is_active: bool,
}

/// Données requises pour créer un nouvel utilisateur
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 2, message = "Le nom doit contenir au moins 2 caractères"))]
    pub name: String,
    #[validate(email(message = "Format d'email invalide"))]
    pub email: String,
    #[validate(length(min = 8, message = "Le mot de passe doit contenir au moins 8 caractères"))]
    pub password: Option<String>,
}

/// Données pour la connexion d'un utilisateur
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserLogin {
    #[validate(email(message = "Format d'email invalide"))]
    pub email: String,
    pub password: String,
}

impl User {
    /// Crée un nouvel utilisateur avec un mot de passe hashé
    pub fn new(name: String, email: String, password: Option<String>) -> Self {
        let password_hash = password.map(|pwd| Self::hash_password(&pwd));

        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_active: true,
        }
    }

    /// Hash un mot de passe avec Argon2
    pub fn hash_password(password: &str) -> String {
        let argon2 = Argon2::default();
        let salt = SaltString::generate(&mut OsRng);
        argon2
            .hash_password(password.as_bytes(), &salt)
            .expect("Paramètres Argon2 par défaut invalides")
            .to_string()
    }

    /// Vérifie si un mot de passe correspond au hash stocké
    pub fn verify_password(&self, password: &str) -> bool {
        let Some(hash) = &self.password_hash else {
            return false;
        };
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Met à jour le mot de passe de l'utilisateur
    pub fn update_password(&mut self, new_password: &str) {
        self.password_hash = Some(Self::hash_password(new_password));
        self.updated_at = Utc::now();
    }
}
