use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::env;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resume_platform::api;
use resume_platform::core::analysis::CvAnalyzer;
use resume_platform::core::extraction::ExtractionPipeline;
use resume_platform::infrastructure::config::AppConfig;
use resume_platform::infrastructure::database::{Database, ResumeRepository, UserRepository};
use resume_platform::infrastructure::storage::LocalStorage;
use resume_platform::workers::{start_cleanup_worker, CleanupConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialisation du logging
    setup_tracing();
    info!("🚀 Démarrage de Resume Platform Backend");

    // Chargement de la configuration
    let config = AppConfig::from_env().expect("❌ Impossible de charger la configuration");
    info!("✅ Configuration chargée avec succès");
    info!("🔧 Mode: {}", config.run_mode);

    // Initialisation des services
    let database = Database::new(&config.database_url)
        .await
        .expect("❌ Impossible de se connecter à la base de données");

    let storage = LocalStorage::new(config.upload_dir.clone())
        .expect("❌ Impossible d'initialiser le stockage");

    let pipeline = ExtractionPipeline::new(config.extraction_config())
        .expect("❌ Impossible d'initialiser le pipeline d'extraction");

    let users = UserRepository::new(database.pool());
    let resumes = ResumeRepository::new(database.pool());
    let analyzer = CvAnalyzer::new();

    // Démarrage du worker de nettoyage en tâche de fond
    start_cleanup_worker(CleanupConfig::from_app_config(&config));

    let bind_address = format!("{}:{}", config.server_host, config.server_port);
    let workers = config.workers;

    let database_data = web::Data::new(database);
    let storage_data = web::Data::new(storage);
    let pipeline_data = web::Data::new(pipeline);
    let users_data = web::Data::new(users);
    let resumes_data = web::Data::new(resumes);
    let analyzer_data = web::Data::new(analyzer);
    let config_data = web::Data::new(config);

    // Configuration du serveur Actix-Web
    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .app_data(database_data.clone())
            .app_data(storage_data.clone())
            .app_data(pipeline_data.clone())
            .app_data(users_data.clone())
            .app_data(resumes_data.clone())
            .app_data(analyzer_data.clone())
            .app_data(config_data.clone())
            .configure(api::config)
            .default_service(
                web::route().to(|| async { "🚀 Resume Platform Backend est en cours d'exécution!" }),
            )
    })
    .bind(&bind_address)?
    .workers(workers)
    .shutdown_timeout(10);

    info!("✅ Backend démarré avec succès!");
    info!("🔗 API disponible sur http://{}", bind_address);

    server.run().await
}

/// Configure le tracing pour le logging structuré
fn setup_tracing() {
    let log_level = env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".into())
        .parse()
        .unwrap_or(tracing::Level::INFO);

    let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "json".into());

    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(if log_format == "json" {
            Box::new(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(true),
            ) as Box<dyn tracing_subscriber::Layer<_> + Send + Sync>
        } else {
            Box::new(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_line_number(true)
                    .with_file(true),
            ) as Box<dyn tracing_subscriber::Layer<_> + Send + Sync>
        });

    subscriber.init();
}
