use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use notebook_db::DbHandle;
use sqlx::QueryBuilder;

use super::rows::UserRow;
use super::sql::{push_filters, push_order_and_window, with_pool};
use crate::contract::model::{NewUser, Page, User, UserUpdate};
use crate::domain::query::ListQuery;
use crate::domain::repo::UsersRepository;

const COLUMNS: &str =
    "id, first_name, last_name, phone_number, email, image_url, created_at, updated_at, deleted_at";

/// sqlx-backed implementation of the `UsersRepository` port.
#[derive(Clone)]
pub struct SqlUsersRepository {
    db: Arc<DbHandle>,
}

impl SqlUsersRepository {
    pub fn new(db: Arc<DbHandle>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UsersRepository for SqlUsersRepository {
    async fn create(&self, u: NewUser) -> anyhow::Result<User> {
        let sql = format!(
            "INSERT INTO users (first_name, last_name, phone_number, email, image_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        );
        let row: UserRow = with_pool!(self.db, |pool, Db| {
            sqlx::query_as(&sql)
                .bind(u.first_name)
                .bind(u.last_name)
                .bind(u.phone_number)
                .bind(u.email)
                .bind(u.image_url)
                .fetch_one(pool)
                .await
                .context("insert user")?
        });
        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let row: Option<UserRow> = with_pool!(self.db, |pool, Db| {
            sqlx::query_as(&sql)
                .bind(id)
                .fetch_optional(pool)
                .await
                .context("select user by id")?
        });
        Ok(row.map(Into::into))
    }

    async fn list(&self, query: &ListQuery) -> anyhow::Result<Page<User>> {
        let (rows, count): (Vec<UserRow>, i64) = with_pool!(self.db, |pool, Db| {
            let mut select = QueryBuilder::<Db>::new(format!("SELECT {COLUMNS} FROM users"));
            push_filters(&mut select, query);
            push_order_and_window(&mut select, query);
            let rows = select
                .build_query_as()
                .fetch_all(pool)
                .await
                .context("list users")?;

            let mut total = QueryBuilder::<Db>::new("SELECT COUNT(*) FROM users");
            push_filters(&mut total, query);
            let count = total
                .build_query_scalar()
                .fetch_one(pool)
                .await
                .context("count users")?;
            (rows, count)
        });

        Ok(Page {
            items: rows.into_iter().map(Into::into).collect(),
            count,
        })
    }

    async fn update(&self, id: i64, u: UserUpdate) -> anyhow::Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET first_name = $1, last_name = $2, phone_number = $3, \
             email = $4, image_url = $5, updated_at = $6 WHERE id = $7 RETURNING {COLUMNS}"
        );
        let row: Option<UserRow> = with_pool!(self.db, |pool, Db| {
            sqlx::query_as(&sql)
                .bind(u.first_name)
                .bind(u.last_name)
                .bind(u.phone_number)
                .bind(u.email)
                .bind(u.image_url)
                .bind(Utc::now())
                .bind(id)
                .fetch_optional(pool)
                .await
                .context("update user")?
        });
        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let affected = with_pool!(self.db, |pool, Db| {
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .context("delete user")?
                .rows_affected()
        });
        Ok(affected > 0)
    }
}
