//! Listing query construction.
//!
//! Turns [`ListParams`] into a backend-neutral [`ListQuery`]: a predicate set,
//! one ordering clause and a limit/offset window. Pure and deterministic; the
//! SQL layer renders the result with bound parameters only.

use crate::contract::model::{ListParams, SortOrder};
use crate::domain::error::DomainError;

/// The filterable shape of one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityColumns {
    /// Columns searched by the substring filter (OR-ed together).
    pub search_columns: &'static [&'static str],
    /// Column compared against `ListParams::user_id`, if the kind has an owner.
    pub owner_column: Option<&'static str>,
    pub created_column: &'static str,
    pub id_column: &'static str,
}

pub const USERS: EntityColumns = EntityColumns {
    search_columns: &["first_name", "last_name", "email"],
    owner_column: None,
    created_column: "created_at",
    id_column: "id",
};

pub const NOTES: EntityColumns = EntityColumns {
    search_columns: &["title"],
    owner_column: Some("user_id"),
    created_column: "created_at",
    id_column: "id",
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Case-insensitive substring match on any of `columns`.
    /// `pattern` is LIKE-escaped and wrapped in `%`; case folding of both
    /// sides happens in the store so column and term fold identically.
    Contains {
        columns: &'static [&'static str],
        pattern: String,
    },
    Equals {
        column: &'static str,
        value: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    /// Secondary key so rows with equal timestamps page deterministically.
    pub tie_breaker: &'static str,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub predicates: Vec<Predicate>,
    pub order: OrderBy,
    pub window: Window,
}

/// Escape character used in every generated LIKE clause.
pub const LIKE_ESCAPE: char = '\\';

impl ListQuery {
    pub fn build(
        entity: &EntityColumns,
        params: &ListParams,
        max_limit: i64,
    ) -> Result<Self, DomainError> {
        if params.page < 1 {
            return Err(DomainError::validation("page", "must be at least 1"));
        }
        if params.limit < 1 {
            return Err(DomainError::validation("limit", "must be at least 1"));
        }
        if params.limit > max_limit {
            return Err(DomainError::validation(
                "limit",
                format!("must not exceed {max_limit}"),
            ));
        }
        let offset = (params.page - 1)
            .checked_mul(params.limit)
            .ok_or_else(|| DomainError::validation("page", "is out of range"))?;

        let mut predicates = Vec::new();
        if let Some(term) = params.search.as_deref() {
            if !term.trim().is_empty() && !entity.search_columns.is_empty() {
                predicates.push(Predicate::Contains {
                    columns: entity.search_columns,
                    pattern: like_pattern(term),
                });
            }
        }
        if let (Some(column), Some(value)) = (entity.owner_column, params.user_id) {
            predicates.push(Predicate::Equals { column, value });
        }

        Ok(Self {
            predicates,
            order: OrderBy {
                column: entity.created_column,
                tie_breaker: entity.id_column,
                order: params.sort,
            },
            window: Window {
                limit: params.limit,
                offset,
            },
        })
    }
}

/// `%term%` with LIKE metacharacters escaped.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_') || ch == LIKE_ESCAPE {
            out.push(LIKE_ESCAPE);
        }
        out.push(ch);
    }
    out.push('%');
    out
}
