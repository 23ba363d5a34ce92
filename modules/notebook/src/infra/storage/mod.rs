//! Relational storage for users and notes over sqlx (Postgres or SQLite).

pub mod migrations;
mod notes_repo;
mod rows;
mod sql;
mod users_repo;

pub use notes_repo::SqlNotesRepository;
pub use users_repo::SqlUsersRepository;
