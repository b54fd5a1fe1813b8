//! Repository des CV analysés.

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::resume::{compute_user_stats, NewResume, Resume, UserStats};
use crate::infrastructure::error::{AppError, AppResult};

/// Repository gérant la persistance des CV
#[derive(Debug, Clone)]
pub struct ResumeRepository {
    pool: PgPool,
}

impl ResumeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Enregistre un CV fraîchement extrait et analysé
    pub async fn create(&self, new_resume: NewResume) -> AppResult<Resume> {
        let resume = sqlx::query_as::<_, Resume>(
            r#"
            INSERT INTO resumes
                (id, user_id, file_name, file_path, content_hash,
                 extraction_method, extracted_text, overall_score, ats_score, uploaded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_resume.user_id)
        .bind(&new_resume.file_name)
        .bind(&new_resume.file_path)
        .bind(&new_resume.content_hash)
        .bind(new_resume.extraction_method)
        .bind(&new_resume.extracted_text)
        .bind(new_resume.overall_score)
        .bind(new_resume.ats_score)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            "✅ CV enregistré: {} (méthode: {})",
            resume.id,
            resume.extraction_method
        );
        Ok(resume)
    }

    /// Récupère un CV appartenant à l'utilisateur donné.
    ///
    /// Le filtre par `user_id` fait office de contrôle d'accès : un CV
    /// d'un autre utilisateur est indistinguable d'un CV inexistant.
    pub async fn get_for_user(&self, resume_id: Uuid, user_id: Uuid) -> AppResult<Resume> {
        sqlx::query_as::<_, Resume>("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
            .bind(resume_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("CV".to_string()))
    }

    /// Liste les CV d'un utilisateur, les plus récents d'abord
    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Resume>> {
        let resumes = sqlx::query_as::<_, Resume>(
            "SELECT * FROM resumes WHERE user_id = $1 ORDER BY uploaded_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(resumes)
    }

    /// Supprime un CV de l'utilisateur et retourne le chemin du fichier
    /// stocké, à charge de l'appelant de le retirer du disque
    pub async fn delete_for_user(&self, resume_id: Uuid, user_id: Uuid) -> AppResult<String> {
        let resume = self.get_for_user(resume_id, user_id).await?;

        sqlx::query("DELETE FROM resumes WHERE id = $1 AND user_id = $2")
            .bind(resume_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::info!("🗑️ CV supprimé: {}", resume_id);
        Ok(resume.file_path)
    }

    /// Statistiques agrégées sur l'historique d'un utilisateur
    pub async fn stats_for_user(&self, user_id: Uuid) -> AppResult<UserStats> {
        let resumes = self.list_for_user(user_id).await?;
        Ok(compute_user_stats(&resumes))
    }
}
