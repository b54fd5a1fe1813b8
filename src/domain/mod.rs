//! # Domain Models Module
//!
//! Ce module contient les modèles de données principaux de l'application.
//! Ces modèles représentent les entités métier et sont utilisés à travers
//! toute l'application (API, services, base de données).
//!
//! ## Structure
//! - `user.rs`: Modèle pour les utilisateurs authentifiés
//! - `resume.rs`: Modèle pour les CV uploadés et leurs statistiques
//!
//! ## Conventions
//! - Tous les modèles implémentent `serde::Serialize` et `serde::Deserialize`
//! - Les champs sensibles sont exclus de la sérialisation JSON
//! - Les identifiants utilisent `uuid::Uuid` pour éviter les conflits
//! - Les timestamps utilisent `chrono::DateTime<chrono::Utc>` pour l'uniformité

pub mod resume;
pub mod user;

// Ré-export des types principaux pour une utilisation facile
pub use resume::{Resume, UserStats};
pub use user::User;
