pub mod error;
pub mod query;
pub mod repo;
pub mod service;
