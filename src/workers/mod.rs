//! # Workers Module
//!
//! Tâches de fond tournant en parallèle du serveur HTTP.

pub mod cleanup_worker;

pub use cleanup_worker::{start_cleanup_worker, CleanupConfig};
