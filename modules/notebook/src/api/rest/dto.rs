use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::contract::model::{NewNote, NewUser, Note, NoteUpdate, User};

/// REST DTO for user representation with serde/utoipa
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
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

/// Body of `POST /v1/users` and `PUT /v1/users/{id}` (full replace).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserReq {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_number: String,
    pub email: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserListDto {
    pub items: Vec<UserDto>,
    /// Total matches for the filter, across all pages.
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteDto {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateNoteReq {
    pub user_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Body of `PUT /v1/notes/{id}`; owner and timestamps are not updatable.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateNoteReq {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteListDto {
    pub items: Vec<NoteDto>,
    pub count: i64,
}

/// Raw listing query string. Values stay strings so that empty and malformed
/// numbers are reported by the handler instead of a generic rejection.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQueryParams {
    /// Page size (default 10).
    pub limit: Option<String>,
    /// 1-based page number (default 1).
    pub page: Option<String>,
    /// Case-insensitive substring filter.
    pub search: Option<String>,
    /// Owner filter (notes only).
    pub user_id: Option<String>,
    /// `asc` or `desc` on creation time (default `desc`).
    pub sort_by_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageDto {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDto {
    pub error: String,
}

// Conversion implementations between REST DTOs and contract models

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            phone_number: u.phone_number,
            email: u.email,
            image_url: u.image_url,
            created_at: u.created_at,
            updated_at: u.updated_at,
            deleted_at: u.deleted_at,
        }
    }
}

impl From<UserReq> for NewUser {
    fn from(req: UserReq) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            phone_number: req.phone_number,
            email: req.email,
            image_url: req.image_url,
        }
    }
}

impl From<Note> for NoteDto {
    fn from(n: Note) -> Self {
        Self {
            id: n.id,
            user_id: n.user_id,
            title: n.title,
            description: n.description,
            created_at: n.created_at,
            updated_at: n.updated_at,
            deleted_at: n.deleted_at,
        }
    }
}

impl From<CreateNoteReq> for NewNote {
    fn from(req: CreateNoteReq) -> Self {
        Self {
            user_id: req.user_id,
            title: req.title,
            description: req.description,
        }
    }
}

impl From<UpdateNoteReq> for NoteUpdate {
    fn from(req: UpdateNoteReq) -> Self {
        Self {
            title: req.title,
            description: req.description,
        }
    }
}
