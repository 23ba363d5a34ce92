use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query,
    },
    http::StatusCode,
    response::Json,
    Extension,
};
use tracing::{error, info};

use crate::api::rest::dto::{
    CreateNoteReq, ErrorDto, ListQueryParams, MessageDto, NoteDto, NoteListDto, UpdateNoteReq,
    UserDto, UserListDto, UserReq,
};
use crate::api::rest::error::ApiError;
use crate::api::rest::params::{list_params, parse_id};
use crate::domain::service::Service;

pub const DELETED_MESSAGE: &str = "Successfully deleted";

fn deleted() -> Json<MessageDto> {
    Json(MessageDto {
        message: DELETED_MESSAGE.to_string(),
    })
}

// ---------------------------------------------------------------- users

/// Create a user
#[utoipa::path(
    post,
    path = "/v1/users",
    tag = "users",
    request_body = UserReq,
    responses(
        (status = 201, description = "Created user", body = UserDto),
        (status = 400, description = "Malformed body", body = ErrorDto),
        (status = 500, description = "Storage failure", body = ErrorDto)
    )
)]
pub async fn create_user(
    Extension(svc): Extension<Arc<Service>>,
    body: Result<Json<UserReq>, JsonRejection>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let Json(req) = body?;
    info!("Creating user");

    match svc.create_user(req.into()).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(UserDto::from(user)))),
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(e.into())
        }
    }
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 400, description = "Malformed id", body = ErrorDto),
        (status = 404, description = "No such user", body = ErrorDto),
        (status = 500, description = "Storage failure", body = ErrorDto)
    )
)]
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
) -> Result<Json<UserDto>, ApiError> {
    let id = parse_id(&raw_id)?;
    info!("Getting user with id: {}", id);

    match svc.get_user(id).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            error!("Failed to get user {}: {}", id, e);
            Err(e.into())
        }
    }
}

/// List users, newest first by default
#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "users",
    params(ListQueryParams),
    responses(
        (status = 200, description = "One page of users", body = UserListDto),
        (status = 400, description = "Malformed query", body = ErrorDto),
        (status = 500, description = "Storage failure", body = ErrorDto)
    )
)]
pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
    query: Result<Query<ListQueryParams>, QueryRejection>,
) -> Result<Json<UserListDto>, ApiError> {
    let Query(query) = query?;
    info!("Listing users with query: {:?}", query);
    let params = list_params(&query, svc.config().default_page_size)?;

    match svc.list_users(params).await {
        Ok(page) => Ok(Json(UserListDto {
            items: page.items.into_iter().map(UserDto::from).collect(),
            count: page.count,
        })),
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(e.into())
        }
    }
}

/// Replace a user's fields
#[utoipa::path(
    put,
    path = "/v1/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    request_body = UserReq,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 400, description = "Malformed id or body", body = ErrorDto),
        (status = 404, description = "No such user", body = ErrorDto),
        (status = 500, description = "Storage failure", body = ErrorDto)
    )
)]
pub async fn update_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
    body: Result<Json<UserReq>, JsonRejection>,
) -> Result<Json<UserDto>, ApiError> {
    let id = parse_id(&raw_id)?;
    let Json(req) = body?;
    info!("Updating user {}", id);

    match svc.update_user(id, req.into()).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            error!("Failed to update user {}: {}", id, e);
            Err(e.into())
        }
    }
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Deleted", body = MessageDto),
        (status = 400, description = "Malformed id", body = ErrorDto),
        (status = 404, description = "No such user", body = ErrorDto),
        (status = 500, description = "Storage failure", body = ErrorDto)
    )
)]
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageDto>, ApiError> {
    let id = parse_id(&raw_id)?;
    info!("Deleting user: {}", id);

    match svc.delete_user(id).await {
        Ok(()) => Ok(deleted()),
        Err(e) => {
            error!("Failed to delete user {}: {}", id, e);
            Err(e.into())
        }
    }
}

// ---------------------------------------------------------------- notes

/// Create a note
#[utoipa::path(
    post,
    path = "/v1/notes",
    tag = "notes",
    request_body = CreateNoteReq,
    responses(
        (status = 201, description = "Created note", body = NoteDto),
        (status = 400, description = "Malformed body", body = ErrorDto),
        (status = 500, description = "Storage failure", body = ErrorDto)
    )
)]
pub async fn create_note(
    Extension(svc): Extension<Arc<Service>>,
    body: Result<Json<CreateNoteReq>, JsonRejection>,
) -> Result<(StatusCode, Json<NoteDto>), ApiError> {
    let Json(req) = body?;
    info!("Creating note for user {}", req.user_id);

    match svc.create_note(req.into()).await {
        Ok(note) => Ok((StatusCode::CREATED, Json(NoteDto::from(note)))),
        Err(e) => {
            error!("Failed to create note: {}", e);
            Err(e.into())
        }
    }
}

/// Get a note by id
#[utoipa::path(
    get,
    path = "/v1/notes/{id}",
    tag = "notes",
    params(("id" = i64, Path, description = "Note id")),
    responses(
        (status = 200, description = "Note found", body = NoteDto),
        (status = 400, description = "Malformed id", body = ErrorDto),
        (status = 404, description = "No such note", body = ErrorDto),
        (status = 500, description = "Storage failure", body = ErrorDto)
    )
)]
pub async fn get_note(
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
) -> Result<Json<NoteDto>, ApiError> {
    let id = parse_id(&raw_id)?;
    info!("Getting note with id: {}", id);

    match svc.get_note(id).await {
        Ok(note) => Ok(Json(NoteDto::from(note))),
        Err(e) => {
            error!("Failed to get note {}: {}", id, e);
            Err(e.into())
        }
    }
}

/// List notes, optionally by owner
#[utoipa::path(
    get,
    path = "/v1/notes",
    tag = "notes",
    params(ListQueryParams),
    responses(
        (status = 200, description = "One page of notes", body = NoteListDto),
        (status = 400, description = "Malformed query", body = ErrorDto),
        (status = 500, description = "Storage failure", body = ErrorDto)
    )
)]
pub async fn list_notes(
    Extension(svc): Extension<Arc<Service>>,
    query: Result<Query<ListQueryParams>, QueryRejection>,
) -> Result<Json<NoteListDto>, ApiError> {
    let Query(query) = query?;
    info!("Listing notes with query: {:?}", query);
    let params = list_params(&query, svc.config().default_page_size)?;

    match svc.list_notes(params).await {
        Ok(page) => Ok(Json(NoteListDto {
            items: page.items.into_iter().map(NoteDto::from).collect(),
            count: page.count,
        })),
        Err(e) => {
            error!("Failed to list notes: {}", e);
            Err(e.into())
        }
    }
}

/// Change a note's title and description
#[utoipa::path(
    put,
    path = "/v1/notes/{id}",
    tag = "notes",
    params(("id" = i64, Path, description = "Note id")),
    request_body = UpdateNoteReq,
    responses(
        (status = 200, description = "Updated note", body = NoteDto),
        (status = 400, description = "Malformed id or body", body = ErrorDto),
        (status = 404, description = "No such note", body = ErrorDto),
        (status = 500, description = "Storage failure", body = ErrorDto)
    )
)]
pub async fn update_note(
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
    body: Result<Json<UpdateNoteReq>, JsonRejection>,
) -> Result<Json<NoteDto>, ApiError> {
    let id = parse_id(&raw_id)?;
    let Json(req) = body?;
    info!("Updating note {}", id);

    match svc.update_note(id, req.into()).await {
        Ok(note) => Ok(Json(NoteDto::from(note))),
        Err(e) => {
            error!("Failed to update note {}: {}", id, e);
            Err(e.into())
        }
    }
}

/// Delete a note
#[utoipa::path(
    delete,
    path = "/v1/notes/{id}",
    tag = "notes",
    params(("id" = i64, Path, description = "Note id")),
    responses(
        (status = 200, description = "Deleted", body = MessageDto),
        (status = 400, description = "Malformed id", body = ErrorDto),
        (status = 404, description = "No such note", body = ErrorDto),
        (status = 500, description = "Storage failure", body = ErrorDto)
    )
)]
pub async fn delete_note(
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageDto>, ApiError> {
    let id = parse_id(&raw_id)?;
    info!("Deleting note: {}", id);

    match svc.delete_note(id).await {
        Ok(()) => Ok(deleted()),
        Err(e) => {
            error!("Failed to delete note {}: {}", id, e);
            Err(e.into())
        }
    }
}
