use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use notebook_db::DbHandle;
use sqlx::QueryBuilder;

use super::rows::NoteRow;
use super::sql::{push_filters, push_order_and_window, with_pool};
use crate::contract::model::{NewNote, Note, NoteUpdate, Page};
use crate::domain::query::ListQuery;
use crate::domain::repo::NotesRepository;

const COLUMNS: &str = "id, user_id, title, description, created_at, updated_at, deleted_at";

/// sqlx-backed implementation of the `NotesRepository` port.
#[derive(Clone)]
pub struct SqlNotesRepository {
    db: Arc<DbHandle>,
}

impl SqlNotesRepository {
    pub fn new(db: Arc<DbHandle>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotesRepository for SqlNotesRepository {
    async fn create(&self, n: NewNote) -> anyhow::Result<Note> {
        let sql = format!(
            "INSERT INTO notes (user_id, title, description) VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        let row: NoteRow = with_pool!(self.db, |pool, Db| {
            sqlx::query_as(&sql)
                .bind(n.user_id)
                .bind(n.title)
                .bind(n.description)
                .fetch_one(pool)
                .await
                .context("insert note")?
        });
        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Note>> {
        let sql = format!("SELECT {COLUMNS} FROM notes WHERE id = $1");
        let row: Option<NoteRow> = with_pool!(self.db, |pool, Db| {
            sqlx::query_as(&sql)
                .bind(id)
                .fetch_optional(pool)
                .await
                .context("select note by id")?
        });
        Ok(row.map(Into::into))
    }

    async fn list(&self, query: &ListQuery) -> anyhow::Result<Page<Note>> {
        let (rows, count): (Vec<NoteRow>, i64) = with_pool!(self.db, |pool, Db| {
            let mut select = QueryBuilder::<Db>::new(format!("SELECT {COLUMNS} FROM notes"));
            push_filters(&mut select, query);
            push_order_and_window(&mut select, query);
            let rows = select
                .build_query_as()
                .fetch_all(pool)
                .await
                .context("list notes")?;

            let mut total = QueryBuilder::<Db>::new("SELECT COUNT(*) FROM notes");
            push_filters(&mut total, query);
            let count = total
                .build_query_scalar()
                .fetch_one(pool)
                .await
                .context("count notes")?;
            (rows, count)
        });

        Ok(Page {
            items: rows.into_iter().map(Into::into).collect(),
            count,
        })
    }

    // Single statement: no read-modify-write window between concurrent updates.
    async fn update(&self, id: i64, n: NoteUpdate) -> anyhow::Result<Option<Note>> {
        let sql = format!(
            "UPDATE notes SET title = $1, description = $2, updated_at = $3 \
             WHERE id = $4 RETURNING {COLUMNS}"
        );
        let row: Option<NoteRow> = with_pool!(self.db, |pool, Db| {
            sqlx::query_as(&sql)
                .bind(n.title)
                .bind(n.description)
                .bind(Utc::now())
                .bind(id)
                .fetch_optional(pool)
                .await
                .context("update note")?
        });
        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let affected = with_pool!(self.db, |pool, Db| {
            sqlx::query("DELETE FROM notes WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .context("delete note")?
                .rows_affected()
        });
        Ok(affected > 0)
    }
}
