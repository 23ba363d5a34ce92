use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Router};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Versioned users/notes routes with the service injected as an extension.
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route(
            "/v1/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/v1/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route(
            "/v1/notes",
            get(handlers::list_notes).post(handlers::create_note),
        )
        .route(
            "/v1/notes/{id}",
            get(handlers::get_note)
                .put(handlers::update_note)
                .delete(handlers::delete_note),
        )
        .layer(Extension(service))
}
