use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Notebook API",
        version = "1.0",
        description = "Users and their notes: CRUD, paging and search."
    ),
    paths(
        handlers::create_user,
        handlers::get_user,
        handlers::list_users,
        handlers::update_user,
        handlers::delete_user,
        handlers::create_note,
        handlers::get_note,
        handlers::list_notes,
        handlers::update_note,
        handlers::delete_note,
    ),
    components(schemas(
        dto::UserDto,
        dto::UserReq,
        dto::UserListDto,
        dto::NoteDto,
        dto::CreateNoteReq,
        dto::UpdateNoteReq,
        dto::NoteListDto,
        dto::MessageDto,
        dto::ErrorDto,
    )),
    tags(
        (name = "users", description = "User records"),
        (name = "notes", description = "Notes owned by users")
    )
)]
pub struct NotebookApiDoc;
