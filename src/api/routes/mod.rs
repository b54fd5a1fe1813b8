//! Handlers HTTP groupés par ressource.

pub mod auth;
pub mod resumes;
pub mod upload;
