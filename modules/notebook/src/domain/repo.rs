use crate::contract::model::{NewNote, NewUser, Note, NoteUpdate, Page, User, UserUpdate};
use crate::domain::query::ListQuery;
use async_trait::async_trait;

/// Port for the domain layer: user persistence.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Insert and return the stored row (id and `created_at` filled by the store).
    async fn create(&self, new_user: NewUser) -> anyhow::Result<User>;
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;
    /// One page plus the total count over the same predicates.
    async fn list(&self, query: &ListQuery) -> anyhow::Result<Page<User>>;
    /// Replace all mutable fields. `None` when no row has this id.
    async fn update(&self, id: i64, update: UserUpdate) -> anyhow::Result<Option<User>>;
    /// Returns true if a row was deleted.
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
}

/// Port for the domain layer: note persistence.
#[async_trait]
pub trait NotesRepository: Send + Sync {
    async fn create(&self, new_note: NewNote) -> anyhow::Result<Note>;
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Note>>;
    async fn list(&self, query: &ListQuery) -> anyhow::Result<Page<Note>>;
    /// Set title and description in a single statement; owner and `created_at`
    /// are left as stored. `None` when no row has this id.
    async fn update(&self, id: i64, update: NoteUpdate) -> anyhow::Result<Option<Note>>;
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
}
