//! Embedded schema. Every statement is idempotent so it runs on each start.

use anyhow::Context;
use notebook_db::{DbEngine, DbHandle};
use tracing::info;

const POSTGRES: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        phone_number TEXT NOT NULL DEFAULT '',
        email TEXT NOT NULL,
        image_url TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ,
        deleted_at TIMESTAMPTZ
    )"#,
    r#"CREATE TABLE IF NOT EXISTS notes (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ,
        deleted_at TIMESTAMPTZ
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_users_created_at ON users (created_at)",
    "CREATE INDEX IF NOT EXISTS idx_notes_created_at ON notes (created_at)",
    "CREATE INDEX IF NOT EXISTS idx_notes_user_id ON notes (user_id)",
];

// Timestamps are stored as fixed-width RFC 3339 text so that text order is time order.
const SQLITE: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        phone_number TEXT NOT NULL DEFAULT '',
        email TEXT NOT NULL,
        image_url TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        updated_at TEXT,
        deleted_at TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS notes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        updated_at TEXT,
        deleted_at TEXT
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_users_created_at ON users (created_at)",
    "CREATE INDEX IF NOT EXISTS idx_notes_created_at ON notes (created_at)",
    "CREATE INDEX IF NOT EXISTS idx_notes_user_id ON notes (user_id)",
];

pub fn statements(engine: DbEngine) -> &'static [&'static str] {
    match engine {
        DbEngine::Postgres => POSTGRES,
        DbEngine::Sqlite => SQLITE,
    }
}

/// Create tables and indexes if they are missing.
pub async fn run(db: &DbHandle) -> anyhow::Result<()> {
    db.execute_batch(statements(db.engine()))
        .await
        .context("failed to apply notebook schema")?;
    info!(engine = ?db.engine(), "notebook schema is up to date");
    Ok(())
}
