// Modules principaux
pub mod api;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod workers;

// Ré-exports pour faciliter l'utilisation
pub use crate::core::{CvAnalyzer, ExtractionOutcome, ExtractionPipeline};
pub use crate::domain::{Resume, User, UserStats};
pub use crate::infrastructure::{AppConfig, AppError, AppResult, Database, LocalStorage};

// Version de l'application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = "Resume Platform";
