use std::sync::Arc;

use crate::contract::model::{
    ListParams, NewNote, NewUser, Note, NoteUpdate, Page, User, UserUpdate,
};
use crate::domain::error::DomainError;
use crate::domain::query::{self, ListQuery};
use crate::domain::repo::{NotesRepository, UsersRepository};
use tracing::{debug, info, instrument};

/// Domain service for users and notes.
/// Depends only on the repository ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    users: Arc<dyn UsersRepository>,
    notes: Arc<dyn NotesRepository>,
    config: ServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

fn storage(e: anyhow::Error) -> DomainError {
    DomainError::storage(format!("{e:#}"))
}

impl Service {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        notes: Arc<dyn NotesRepository>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            users,
            notes,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ---- users ----

    #[instrument(name = "notebook.service.create_user", skip(self, new_user))]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");
        let user = self.users.create(new_user).await.map_err(storage)?;
        debug!(user_id = user.id, "User created");
        Ok(user)
    }

    #[instrument(name = "notebook.service.get_user", skip(self), fields(user_id = id))]
    pub async fn get_user(&self, id: i64) -> Result<User, DomainError> {
        debug!("Getting user by id");
        self.users
            .find_by_id(id)
            .await
            .map_err(storage)?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    #[instrument(
        name = "notebook.service.list_users",
        skip(self, params),
        fields(page = params.page, limit = params.limit)
    )]
    pub async fn list_users(&self, params: ListParams) -> Result<Page<User>, DomainError> {
        let query = ListQuery::build(&query::USERS, &params, self.config.max_page_size)?;
        let page = self.users.list(&query).await.map_err(storage)?;
        debug!(returned = page.items.len(), count = page.count, "Listed users");
        Ok(page)
    }

    #[instrument(name = "notebook.service.update_user", skip(self, update), fields(user_id = id))]
    pub async fn update_user(&self, id: i64, update: UserUpdate) -> Result<User, DomainError> {
        info!("Updating user");
        self.users
            .update(id, update)
            .await
            .map_err(storage)?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    #[instrument(name = "notebook.service.delete_user", skip(self), fields(user_id = id))]
    pub async fn delete_user(&self, id: i64) -> Result<(), DomainError> {
        info!("Deleting user");
        if self.users.delete(id).await.map_err(storage)? {
            Ok(())
        } else {
            Err(DomainError::user_not_found(id))
        }
    }

    // ---- notes ----

    #[instrument(
        name = "notebook.service.create_note",
        skip(self, new_note),
        fields(owner = new_note.user_id)
    )]
    pub async fn create_note(&self, new_note: NewNote) -> Result<Note, DomainError> {
        info!("Creating new note");
        let note = self.notes.create(new_note).await.map_err(storage)?;
        debug!(note_id = note.id, "Note created");
        Ok(note)
    }

    #[instrument(name = "notebook.service.get_note", skip(self), fields(note_id = id))]
    pub async fn get_note(&self, id: i64) -> Result<Note, DomainError> {
        debug!("Getting note by id");
        self.notes
            .find_by_id(id)
            .await
            .map_err(storage)?
            .ok_or_else(|| DomainError::note_not_found(id))
    }

    #[instrument(
        name = "notebook.service.list_notes",
        skip(self, params),
        fields(page = params.page, limit = params.limit, owner = ?params.user_id)
    )]
    pub async fn list_notes(&self, params: ListParams) -> Result<Page<Note>, DomainError> {
        let query = ListQuery::build(&query::NOTES, &params, self.config.max_page_size)?;
        let page = self.notes.list(&query).await.map_err(storage)?;
        debug!(returned = page.items.len(), count = page.count, "Listed notes");
        Ok(page)
    }

    /// Title/description only; the store applies it atomically.
    #[instrument(name = "notebook.service.update_note", skip(self, update), fields(note_id = id))]
    pub async fn update_note(&self, id: i64, update: NoteUpdate) -> Result<Note, DomainError> {
        info!("Updating note");
        self.notes
            .update(id, update)
            .await
            .map_err(storage)?
            .ok_or_else(|| DomainError::note_not_found(id))
    }

    #[instrument(name = "notebook.service.delete_note", skip(self), fields(note_id = id))]
    pub async fn delete_note(&self, id: i64) -> Result<(), DomainError> {
        info!("Deleting note");
        if self.notes.delete(id).await.map_err(storage)? {
            Ok(())
        } else {
            Err(DomainError::note_not_found(id))
        }
    }
}
