//! SQL rendering shared by both repositories.

use sqlx::{Database, Encode, QueryBuilder, Type};

use crate::contract::model::SortOrder;
use crate::domain::query::{ListQuery, Predicate, LIKE_ESCAPE};

/// Run `$body` against whichever pool the handle holds. Inside the body `$pool`
/// is the concrete sqlx pool and `$Db` names its `Database` type, so one SQL
/// text serves both engines.
macro_rules! with_pool {
    ($db:expr, |$pool:ident, $Db:ident| $body:block) => {
        match $db.pool() {
            notebook_db::DbPool::Postgres($pool) => {
                #[allow(dead_code)]
                type $Db = sqlx::Postgres;
                $body
            }
            notebook_db::DbPool::Sqlite($pool) => {
                #[allow(dead_code)]
                type $Db = sqlx::Sqlite;
                $body
            }
        }
    };
}
pub(super) use with_pool;

fn direction(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

/// Append ` WHERE ...` for the query's predicates. Every value is bound.
pub(super) fn push_filters<'args, DB>(qb: &mut QueryBuilder<'args, DB>, query: &ListQuery)
where
    DB: Database,
    String: Encode<'args, DB> + Type<DB>,
    i64: Encode<'args, DB> + Type<DB>,
{
    for (i, predicate) in query.predicates.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        match predicate {
            Predicate::Contains { columns, pattern } => {
                qb.push("(");
                for (j, column) in columns.iter().enumerate() {
                    if j > 0 {
                        qb.push(" OR ");
                    }
                    qb.push(format!("LOWER({column}) LIKE LOWER("));
                    qb.push_bind(pattern.clone());
                    qb.push(format!(") ESCAPE '{LIKE_ESCAPE}'"));
                }
                qb.push(")");
            }
            Predicate::Equals { column, value } => {
                qb.push(format!("{column} = "));
                qb.push_bind(*value);
            }
        }
    }
}

/// Append ` ORDER BY ... LIMIT ... OFFSET ...`.
pub(super) fn push_order_and_window<'args, DB>(qb: &mut QueryBuilder<'args, DB>, query: &ListQuery)
where
    DB: Database,
    i64: Encode<'args, DB> + Type<DB>,
{
    let dir = direction(query.order.order);
    qb.push(format!(
        " ORDER BY {} {dir}, {} {dir}",
        query.order.column, query.order.tie_breaker
    ));
    qb.push(" LIMIT ");
    qb.push_bind(query.window.limit);
    qb.push(" OFFSET ");
    qb.push_bind(query.window.offset);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::ListParams;
    use crate::domain::query::{NOTES, USERS};

    fn render<DB>(base: &str, query: &ListQuery) -> String
    where
        DB: Database,
        for<'a> <DB as Database>::Arguments<'a>: Default,
        for<'a> String: Encode<'a, DB> + Type<DB>,
        for<'a> i64: Encode<'a, DB> + Type<DB>,
    {
        let mut qb = QueryBuilder::<DB>::new(base);
        push_filters(&mut qb, query);
        push_order_and_window(&mut qb, query);
        qb.sql().to_owned()
    }

    #[test]
    fn renders_postgres_placeholders() {
        let params = ListParams {
            search: Some("alp".into()),
            user_id: Some(3),
            ..ListParams::default()
        };
        let q = ListQuery::build(&NOTES, &params, 100).unwrap();
        assert_eq!(
            render::<sqlx::Postgres>("SELECT * FROM notes", &q),
            "SELECT * FROM notes WHERE (LOWER(title) LIKE LOWER($1) ESCAPE '\\') \
             AND user_id = $2 ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
        );
    }

    #[test]
    fn renders_sqlite_placeholders_and_or_group() {
        let params = ListParams {
            search: Some("x".into()),
            sort: SortOrder::Asc,
            ..ListParams::default()
        };
        let q = ListQuery::build(&USERS, &params, 100).unwrap();
        assert_eq!(
            render::<sqlx::Sqlite>("SELECT * FROM users", &q),
            "SELECT * FROM users WHERE (LOWER(first_name) LIKE LOWER(?) ESCAPE '\\' OR \
             LOWER(last_name) LIKE LOWER(?) ESCAPE '\\' OR \
             LOWER(email) LIKE LOWER(?) ESCAPE '\\') \
             ORDER BY created_at ASC, id ASC LIMIT ? OFFSET ?"
        );
    }

    #[test]
    fn search_term_never_reaches_sql_text() {
        let params = ListParams {
            search: Some("'; DROP TABLE notes; --".into()),
            ..ListParams::default()
        };
        let q = ListQuery::build(&NOTES, &params, 100).unwrap();
        let sql = render::<sqlx::Postgres>("SELECT * FROM notes", &q);
        assert!(!sql.contains("DROP"));
    }
}
