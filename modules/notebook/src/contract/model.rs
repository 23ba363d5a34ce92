use chrono::{DateTime, Utc};

/// A registered person. Transport-agnostic; no serde here.
///
/// `deleted_at` is part of the stored row but never set: deletes remove the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Fields accepted on create; id and timestamps come from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    pub image_url: String,
}

/// Full replacement of every mutable user field.
pub type UserUpdate = NewUser;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    /// Owning user; not enforced as a foreign key.
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub user_id: i64,
    pub title: String,
    pub description: String,
}

/// The only mutable note fields. Owner and creation time are never touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteUpdate {
    pub title: String,
    pub description: String,
}

/// One page of a filtered listing. `count` covers the whole filter, not the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub count: i64,
}

/// Direction of the creation-time ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Lenient parse: anything other than "asc" sorts newest first.
    pub fn parse_lenient(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }
}

/// Listing request as seen by the domain, after transport parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    /// 1-based.
    pub page: i64,
    pub limit: i64,
    pub search: Option<String>,
    /// Owner filter; only meaningful for notes.
    pub user_id: Option<i64>,
    pub sort: SortOrder,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: None,
            user_id: None,
            sort: SortOrder::Desc,
        }
    }
}
