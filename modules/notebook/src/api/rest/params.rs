//! Parsing of path and query strings into domain inputs.

use crate::api::rest::dto::ListQueryParams;
use crate::contract::model::{ListParams, SortOrder};
use crate::domain::error::DomainError;

pub fn parse_id(raw: &str) -> Result<i64, DomainError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| DomainError::validation("id", format!("'{raw}' is not a valid integer")))
}

/// Absent and empty both mean "use the default".
fn optional_i64(raw: Option<&str>, field: &str) -> Result<Option<i64>, DomainError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<i64>()
            .map(Some)
            .map_err(|_| DomainError::validation(field, format!("'{s}' is not a valid integer"))),
    }
}

pub fn list_params(q: &ListQueryParams, default_limit: i64) -> Result<ListParams, DomainError> {
    let limit = optional_i64(q.limit.as_deref(), "limit")?.unwrap_or(default_limit);
    let page = optional_i64(q.page.as_deref(), "page")?.unwrap_or(1);
    let user_id = optional_i64(q.user_id.as_deref(), "user_id")?;
    let sort = q
        .sort_by_date
        .as_deref()
        .map(SortOrder::parse_lenient)
        .unwrap_or_default();
    // Blank means no filter; otherwise the term is matched as given.
    let search = q.search.clone().filter(|s| !s.trim().is_empty());

    Ok(ListParams {
        page,
        limit,
        search,
        user_id,
        sort,
    })
}
