//! Users and notes: models, domain service, SQL storage and the REST surface.

pub mod api;
pub mod config;
pub mod contract;
pub mod domain;
pub mod infra;
mod module;

pub use config::NotebookConfig;
pub use module::Notebook;
