use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder};

/// Empty document carrying the server-wide title and version.
pub fn base_document(title: &str, version: &str) -> OpenApi {
    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title(title)
                .version(version)
                .description(Some("REST API for users and their notes")),
        )
        .build()
}

/// Fold module documents into `base`. Paths and schemas already present win.
pub fn merge_documents(mut base: OpenApi, docs: impl IntoIterator<Item = OpenApi>) -> OpenApi {
    for doc in docs {
        base.merge(doc);
    }
    base
}
