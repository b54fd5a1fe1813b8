//! # Extraction Pipeline
//!
//! Orchestrateur du workflow d'extraction d'un CV uploadé. Il enchaîne
//! les trois étapes et décide du fallback :
//! 1. Extraction directe de la couche texte du PDF
//! 2. Si le texte est trop court : rasterisation des pages dans un
//!    répertoire temporaire propre au job
//! 3. Reconnaissance de caractères image par image, dans l'ordre des pages
//!
//! ## Machine à états
//! `Received → DirectExtractAttempted → {Done(direct) | FallbackTriggered}
//! → Rasterized → Recognized → Done(ocr)`, avec `Failed(reason)` accessible
//! depuis chaque état. États terminaux : `Done(direct)`, `Done(ocr)`,
//! `Failed`. Aucun retry interne : le rejeu appartient à l'appelant et
//! relancer le pipeline sur la même entrée est toujours sûr.
//!
//! ## Ressources
//! Le répertoire temporaire est créé paresseusement (seulement si le
//! fallback se déclenche), nommé par l'identifiant unique du job, et
//! supprimé sur tous les chemins de sortie via `TempDir` — succès, échec,
//! timeout et annulation compris. Un timeout ou une annulation pendant
//! une invocation externe est best-effort : le processus peut finir,
//! son résultat est ignoré.

use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::ocr::{RecognitionEngine, TesseractEngine};
use super::pdf_text::extract_embedded_text;
use super::rasterizer::{PageRasterizer, PopplerRasterizer};
use super::{ExtractionConfig, ExtractionError, ExtractionOutcome};

/// Pipeline d'extraction complet
pub struct ExtractionPipeline {
    config: ExtractionConfig,
    rasterizer: Arc<dyn PageRasterizer>,
    engine: Arc<dyn RecognitionEngine>,
}

impl ExtractionPipeline {
    /// Crée le pipeline de production (pdftoppm + tesseract)
    pub fn new(config: ExtractionConfig) -> io::Result<Self> {
        Self::with_stages(
            config,
            Arc::new(PopplerRasterizer::new()),
            Arc::new(TesseractEngine::new()),
        )
    }

    /// Crée le pipeline avec des étapes injectées (tests, backends alternatifs)
    pub fn with_stages(
        config: ExtractionConfig,
        rasterizer: Arc<dyn PageRasterizer>,
        engine: Arc<dyn RecognitionEngine>,
    ) -> io::Result<Self> {
        std::fs::create_dir_all(&config.temp_root)?;
        Ok(Self {
            config,
            rasterizer,
            engine,
        })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Exécute le pipeline pour un document, borné par le timeout du job.
    ///
    /// Le dépassement du délai interrompt le job entre deux étapes et
    /// abandonne l'étape en cours ; le répertoire temporaire est supprimé
    /// dans tous les cas.
    pub async fn run(
        &self,
        source: &Path,
        original_name: &str,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        let timeout = self.config.job_timeout;
        match tokio::time::timeout(timeout, self.execute(source, original_name)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("⏰ Extraction de {} interrompue après {:?}", original_name, timeout);
                Err(ExtractionError::Timeout(timeout))
            }
        }
    }

    #[instrument(skip_all, fields(file = %original_name))]
    async fn execute(
        &self,
        source: &Path,
        original_name: &str,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        // Identifiant de job : clé du répertoire temporaire, jamais un
        // simple timestamp (collisions possibles entre uploads simultanés).
        let job_id = Uuid::new_v4();
        info!("📥 Fichier reçu: {} (job {})", original_name, job_id);

        let bytes = tokio::fs::read(source).await.map_err(|e| {
            ExtractionError::MalformedDocument(format!(
                "lecture de {} impossible: {}",
                source.display(),
                e
            ))
        })?;

        let direct_text = extract_embedded_text(&bytes)?;
        if direct_text.chars().count() > self.config.direct_text_threshold {
            info!(
                "✅ Couche texte suffisante ({} caractères), pas d'OCR",
                direct_text.chars().count()
            );
            return Ok(ExtractionOutcome::DirectText(direct_text));
        }

        info!(
            "🔄 Couche texte insuffisante ({} ≤ {} caractères), fallback OCR",
            direct_text.chars().count(),
            self.config.direct_text_threshold
        );

        // Créé seulement maintenant : un document lisible en direct ne
        // touche jamais le disque. Supprimé au drop, quel que soit le
        // chemin de sortie.
        let temp_dir = tempfile::Builder::new()
            .prefix(&format!("job-{}-", job_id))
            .tempdir_in(&self.config.temp_root)
            .map_err(|e| {
                ExtractionError::RasterizationFailed(format!(
                    "répertoire temporaire impossible à créer: {}",
                    e
                ))
            })?;

        let images = self.rasterizer.rasterize(source, temp_dir.path()).await?;
        info!("🖼️  {} page(s) rasterisée(s) pour le job {}", images.len(), job_id);

        // Échec d'une image = échec du job : on ne retourne jamais un
        // texte partiel silencieusement.
        let mut blocks = Vec::with_capacity(images.len());
        for image in &images {
            blocks.push(self.engine.recognize(image, &self.config.ocr_language).await?);
        }

        let ocr_text = blocks.join("\n").trim().to_string();
        if ocr_text.is_empty() {
            return Err(ExtractionError::EmptyOcrResult);
        }

        info!(
            "✅ OCR terminé pour le job {}: {} caractères",
            job_id,
            ocr_text.chars().count()
        );
        Ok(ExtractionOutcome::Ocr(ocr_text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extraction::pdf_text::tests::build_pdf;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Rasterizer espion : écrit `pages` images dans le répertoire reçu
    /// et mémorise ce répertoire pour vérifier le nettoyage.
    struct SpyRasterizer {
        pages: usize,
        calls: AtomicUsize,
        last_dir: Mutex<Option<PathBuf>>,
        fail: bool,
    }

    impl SpyRasterizer {
        fn new(pages: usize) -> Self {
            Self {
                pages,
                calls: AtomicUsize::new(0),
                last_dir: Mutex::new(None),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(0)
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_dir(&self) -> Option<PathBuf> {
            self.last_dir.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageRasterizer for SpyRasterizer {
        async fn rasterize(
            &self,
            _source: &Path,
            output_dir: &Path,
        ) -> Result<Vec<PathBuf>, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_dir.lock().unwrap() = Some(output_dir.to_path_buf());

            if self.fail {
                return Err(ExtractionError::RasterizationFailed("boom".to_string()));
            }

            let mut images = Vec::new();
            for page in 1..=self.pages {
                let path = output_dir.join(format!("page-{:02}.png", page));
                // Le contenu encode le répertoire du job : permet de
                // vérifier qu'aucun job ne lit les images d'un autre.
                std::fs::write(&path, output_dir.display().to_string()).unwrap();
                images.push(path);
            }
            Ok(images)
        }
    }

    /// Moteur espion : relit le contenu écrit par le rasterizer, ou
    /// retourne un texte fixe, ou échoue à partir d'un certain appel.
    struct SpyEngine {
        fixed_text: Option<String>,
        calls: AtomicUsize,
        fail_after: Option<usize>,
        delay: Option<Duration>,
    }

    impl SpyEngine {
        fn returning(text: &str) -> Self {
            Self {
                fixed_text: Some(text.to_string()),
                calls: AtomicUsize::new(0),
                fail_after: None,
                delay: None,
            }
        }

        fn echoing() -> Self {
            Self {
                fixed_text: None,
                calls: AtomicUsize::new(0),
                fail_after: None,
                delay: None,
            }
        }

        fn failing_after(successes: usize) -> Self {
            Self {
                fail_after: Some(successes),
                ..Self::returning("page ok")
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::returning("lent")
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RecognitionEngine for SpyEngine {
        async fn recognize(
            &self,
            image: &Path,
            _language: &str,
        ) -> Result<String, ExtractionError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(limit) = self.fail_after {
                if call >= limit {
                    return Err(ExtractionError::RecognitionFailed("image illisible".to_string()));
                }
            }
            match &self.fixed_text {
                Some(text) => Ok(text.clone()),
                None => Ok(std::fs::read_to_string(image).unwrap()),
            }
        }
    }

    struct TestHarness {
        pipeline: ExtractionPipeline,
        rasterizer: Arc<SpyRasterizer>,
        engine: Arc<SpyEngine>,
        temp_root: tempfile::TempDir,
        _sources: tempfile::TempDir,
    }

    fn harness(rasterizer: SpyRasterizer, engine: SpyEngine) -> TestHarness {
        harness_with(rasterizer, engine, |_| {})
    }

    fn harness_with(
        rasterizer: SpyRasterizer,
        engine: SpyEngine,
        tweak: impl FnOnce(&mut ExtractionConfig),
    ) -> TestHarness {
        let temp_root = tempfile::tempdir().unwrap();
        let sources = tempfile::tempdir().unwrap();
        let mut config = ExtractionConfig {
            temp_root: temp_root.path().to_path_buf(),
            ..ExtractionConfig::default()
        };
        tweak(&mut config);

        let rasterizer = Arc::new(rasterizer);
        let engine = Arc::new(engine);
        let pipeline = ExtractionPipeline::with_stages(
            config,
            rasterizer.clone() as Arc<dyn PageRasterizer>,
            engine.clone() as Arc<dyn RecognitionEngine>,
        )
        .unwrap();

        TestHarness {
            pipeline,
            rasterizer,
            engine,
            temp_root,
            _sources: sources,
        }
    }

    fn write_pdf(harness: &TestHarness, pages: &[&str]) -> PathBuf {
        let path = harness._sources.path().join("cv.pdf");
        std::fs::write(&path, build_pdf(pages)).unwrap();
        path
    }

    fn temp_entries(harness: &TestHarness) -> usize {
        std::fs::read_dir(harness.temp_root.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_text_rich_pdf_skips_ocr_stages() {
        let h = harness(SpyRasterizer::new(1), SpyEngine::returning("jamais"));
        let long_line = "experience professionnelle ".repeat(10);
        let source = write_pdf(&h, &[&long_line]);

        let outcome = h.pipeline.run(&source, "cv.pdf").await.unwrap();
        assert_eq!(outcome.method(), "direct-text");
        assert_eq!(h.rasterizer.calls(), 0);
        assert_eq!(h.engine.calls(), 0);
    }

    #[tokio::test]
    async fn test_two_page_text_pdf_returns_direct_text() {
        let h = harness(SpyRasterizer::new(1), SpyEngine::returning("jamais"));
        let page = "curriculum vitae detaille ".repeat(10);
        let source = write_pdf(&h, &[&page, &page]);

        let outcome = h.pipeline.run(&source, "cv.pdf").await.unwrap();
        assert_eq!(outcome.method(), "direct-text");
        assert!(outcome.text().chars().count() >= 500);
        assert_eq!(h.rasterizer.calls(), 0);
    }

    #[tokio::test]
    async fn test_scanned_pdf_falls_back_to_ocr() {
        let h = harness(SpyRasterizer::new(1), SpyEngine::returning("Hello World"));
        let source = write_pdf(&h, &[""]);

        let outcome = h.pipeline.run(&source, "scan.pdf").await.unwrap();
        assert_eq!(outcome, ExtractionOutcome::Ocr("Hello World".to_string()));
        assert_eq!(h.rasterizer.calls(), 1);
        assert_eq!(h.engine.calls(), 1);
    }

    #[tokio::test]
    async fn test_threshold_is_configurable() {
        let h = harness_with(
            SpyRasterizer::new(1),
            SpyEngine::returning("jamais"),
            |config| config.direct_text_threshold = 5,
        );
        let source = write_pdf(&h, &["texte court"]);

        let outcome = h.pipeline.run(&source, "cv.pdf").await.unwrap();
        assert_eq!(outcome.method(), "direct-text");
        assert_eq!(h.rasterizer.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_ocr_output_is_a_failure() {
        let h = harness(SpyRasterizer::new(2), SpyEngine::returning(""));
        let source = write_pdf(&h, &[""]);

        let err = h.pipeline.run(&source, "scan.pdf").await.unwrap_err();
        assert!(matches!(err, ExtractionError::EmptyOcrResult));
        // Répertoire du job supprimé malgré l'échec
        let job_dir = h.rasterizer.last_dir().unwrap();
        assert!(!job_dir.exists());
    }

    #[tokio::test]
    async fn test_ocr_concatenates_pages_in_order() {
        let h = harness(SpyRasterizer::new(3), SpyEngine::echoing());
        let source = write_pdf(&h, &[""]);

        let outcome = h.pipeline.run(&source, "scan.pdf").await.unwrap();
        assert_eq!(h.engine.calls(), 3);
        // Chaque bloc porte le chemin du répertoire du job
        let job_dir = h.rasterizer.last_dir().unwrap();
        for line in outcome.text().lines() {
            assert_eq!(line, job_dir.display().to_string());
        }
    }

    #[tokio::test]
    async fn test_single_page_failure_aborts_job() {
        let h = harness(SpyRasterizer::new(3), SpyEngine::failing_after(1));
        let source = write_pdf(&h, &[""]);

        let err = h.pipeline.run(&source, "scan.pdf").await.unwrap_err();
        assert!(matches!(err, ExtractionError::RecognitionFailed(_)));
        // Échec rapide : la troisième page n'est jamais tentée
        assert_eq!(h.engine.calls(), 2);
        let job_dir = h.rasterizer.last_dir().unwrap();
        assert!(!job_dir.exists());
    }

    #[tokio::test]
    async fn test_rasterization_failure_cleans_up() {
        let h = harness(SpyRasterizer::failing(), SpyEngine::returning("jamais"));
        let source = write_pdf(&h, &[""]);

        let err = h.pipeline.run(&source, "scan.pdf").await.unwrap_err();
        assert!(matches!(err, ExtractionError::RasterizationFailed(_)));
        assert_eq!(h.engine.calls(), 0);
        let job_dir = h.rasterizer.last_dir().unwrap();
        assert!(!job_dir.exists());
        assert_eq!(temp_entries(&h), 0);
    }

    #[tokio::test]
    async fn test_success_cleans_up_job_directory() {
        let h = harness(SpyRasterizer::new(1), SpyEngine::returning("Hello"));
        let source = write_pdf(&h, &[""]);

        h.pipeline.run(&source, "scan.pdf").await.unwrap();
        let job_dir = h.rasterizer.last_dir().unwrap();
        assert!(!job_dir.exists());
        assert_eq!(temp_entries(&h), 0);
    }

    #[tokio::test]
    async fn test_malformed_document_creates_no_temp_dir() {
        let h = harness(SpyRasterizer::new(1), SpyEngine::returning("jamais"));
        let source = h._sources.path().join("corrompu.pdf");
        std::fs::write(&source, b"pas un pdf").unwrap();

        let err = h.pipeline.run(&source, "corrompu.pdf").await.unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedDocument(_)));
        assert_eq!(h.rasterizer.calls(), 0);
        assert_eq!(temp_entries(&h), 0);
    }

    #[tokio::test]
    async fn test_concurrent_jobs_use_distinct_directories() {
        let h = Arc::new(harness(SpyRasterizer::new(1), SpyEngine::echoing()));
        let source_a = write_pdf(&h, &[""]);
        let source_b = h._sources.path().join("autre.pdf");
        std::fs::write(&source_b, build_pdf(&[""])).unwrap();

        let (a, b) = tokio::join!(
            h.pipeline.run(&source_a, "a.pdf"),
            h.pipeline.run(&source_b, "b.pdf"),
        );
        let text_a = a.unwrap().into_text();
        let text_b = b.unwrap().into_text();

        // Chaque job a vu son propre répertoire : aucune image partagée
        assert_ne!(text_a, text_b);
        assert_eq!(h.rasterizer.calls(), 2);
        assert_eq!(temp_entries(&h), 0);
    }

    #[tokio::test]
    async fn test_same_input_yields_same_method() {
        let h = harness(SpyRasterizer::new(1), SpyEngine::returning("Hello"));
        let long_line = "competences techniques variees ".repeat(10);
        let source = write_pdf(&h, &[&long_line]);

        let first = h.pipeline.run(&source, "cv.pdf").await.unwrap();
        let second = h.pipeline.run(&source, "cv.pdf").await.unwrap();
        assert_eq!(first.method(), second.method());
        // Extraction directe exactement reproductible
        assert_eq!(first.text(), second.text());
    }

    #[tokio::test]
    async fn test_job_timeout_fails_and_cleans_up() {
        let h = harness_with(
            SpyRasterizer::new(1),
            SpyEngine::slow(Duration::from_secs(5)),
            |config| config.job_timeout = Duration::from_millis(50),
        );
        let source = write_pdf(&h, &[""]);

        let err = h.pipeline.run(&source, "scan.pdf").await.unwrap_err();
        assert!(matches!(err, ExtractionError::Timeout(_)));
        let job_dir = h.rasterizer.last_dir().unwrap();
        assert!(!job_dir.exists());
    }
}
