//! End-to-end REST tests against an in-memory SQLite store.

mod common;

use axum::http::{Method, StatusCode};
use common::{call, call_raw, note_body, sqlite_router, user_body};
use serde_json::{json, Value};

fn ids(list: &Value) -> Vec<i64> {
    list["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn create_then_get_user_returns_same_fields() {
    let app = sqlite_router().await;

    let (status, created) = call(
        &app,
        Method::POST,
        "/v1/users",
        Some(user_body("Ada", "Lovelace", "ada@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["id"].as_i64().unwrap() > 0);
    assert_eq!(created["first_name"], "Ada");
    assert_eq!(created["phone_number"], "+1-555-0100");
    assert!(created["created_at"].is_string());
    assert!(created["updated_at"].is_null());
    assert!(created["deleted_at"].is_null());

    let uri = format!("/v1/users/{}", created["id"]);
    let (status, fetched) = call(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn optional_user_fields_default_to_empty() {
    let app = sqlite_router().await;
    let (status, created) = call(
        &app,
        Method::POST,
        "/v1/users",
        Some(json!({"first_name": "A", "last_name": "B", "email": "ab@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["phone_number"], "");
    assert_eq!(created["image_url"], "");
}

#[tokio::test]
async fn listing_contains_created_user_and_counts_it() {
    let app = sqlite_router().await;
    call(&app, Method::POST, "/v1/users", Some(user_body("Ada", "L", "ada@example.com"))).await;

    let (status, list) = call(&app, Method::GET, "/v1/users?page=1&limit=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(list["count"].as_i64().unwrap() >= 1);
    assert_eq!(list["items"][0]["email"], "ada@example.com");
}

#[tokio::test]
async fn user_search_is_case_insensitive_across_name_and_email() {
    let app = sqlite_router().await;
    for (first, last, email) in [
        ("Grace", "Hopper", "grace@navy.mil"),
        ("Alan", "Turing", "alan@bletchley.uk"),
    ] {
        call(&app, Method::POST, "/v1/users", Some(user_body(first, last, email))).await;
    }

    let (_, by_name) = call(&app, Method::GET, "/v1/users?search=HOPP", None).await;
    assert_eq!(by_name["count"], 1);
    assert_eq!(by_name["items"][0]["first_name"], "Grace");

    let (_, by_email) = call(&app, Method::GET, "/v1/users?search=Bletchley", None).await;
    assert_eq!(by_email["count"], 1);
    assert_eq!(by_email["items"][0]["last_name"], "Turing");

    let (_, none) = call(&app, Method::GET, "/v1/users?search=lovelace", None).await;
    assert_eq!(none["count"], 0);
    assert!(none["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn update_user_replaces_fields_and_stamps_updated_at() {
    let app = sqlite_router().await;
    let body = user_body("Old", "Name", "old@example.com");
    let (_, created) = call(&app, Method::POST, "/v1/users", Some(body)).await;
    let uri = format!("/v1/users/{}", created["id"]);

    let (status, updated) = call(
        &app,
        Method::PUT,
        &uri,
        Some(user_body("New", "Name", "new@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["first_name"], "New");
    assert_eq!(updated["email"], "new@example.com");
    assert!(updated["updated_at"].is_string());

    let (_, fetched) = call(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched["first_name"], "New");
}

#[tokio::test]
async fn update_missing_user_is_not_found() {
    let app = sqlite_router().await;
    let (status, body) = call(
        &app,
        Method::PUT,
        "/v1/users/4242",
        Some(user_body("X", "Y", "x@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found: 4242");
}

#[tokio::test]
async fn delete_user_then_get_is_not_found() {
    let app = sqlite_router().await;
    let body = user_body("Gone", "Soon", "g@example.com");
    let (_, created) = call(&app, Method::POST, "/v1/users", Some(body)).await;
    let uri = format!("/v1/users/{}", created["id"]);

    let (status, body) = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully deleted");

    let (status, _) = call(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn notes_filter_by_owner() {
    let app = sqlite_router().await;
    for (owner, title) in [(1, "groceries"), (3, "first"), (2, "trip"), (1, "bills")] {
        let (status, _) =
            call(&app, Method::POST, "/v1/notes", Some(note_body(owner, title, ""))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, list) = call(&app, Method::GET, "/v1/notes?user_id=3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["count"], 1);
    assert_eq!(list["items"][0]["title"], "first");
    assert_eq!(list["items"][0]["user_id"], 3);

    let (_, ones) = call(&app, Method::GET, "/v1/notes?user_id=1", None).await;
    assert_eq!(ones["count"], 2);
}

#[tokio::test]
async fn note_search_and_owner_filter_combine() {
    let app = sqlite_router().await;
    call(&app, Method::POST, "/v1/notes", Some(note_body(1, "Alpha plan", "x"))).await;
    call(&app, Method::POST, "/v1/notes", Some(note_body(2, "alpha notes", "y"))).await;
    call(&app, Method::POST, "/v1/notes", Some(note_body(1, "Beta", "contains ALPHA too"))).await;

    // Only titles are searched.
    let (_, all) = call(&app, Method::GET, "/v1/notes?search=alpha", None).await;
    assert_eq!(all["count"], 2);

    let (_, owned) = call(&app, Method::GET, "/v1/notes?search=alpha&user_id=1", None).await;
    assert_eq!(owned["count"], 1);
    assert_eq!(owned["items"][0]["title"], "Alpha plan");
}

#[tokio::test]
async fn search_treats_like_wildcards_literally() {
    let app = sqlite_router().await;
    call(&app, Method::POST, "/v1/notes", Some(note_body(1, "100% done", ""))).await;
    call(&app, Method::POST, "/v1/notes", Some(note_body(1, "1000 done", ""))).await;
    call(&app, Method::POST, "/v1/notes", Some(note_body(1, "snake_case", ""))).await;
    call(&app, Method::POST, "/v1/notes", Some(note_body(1, "snakeXcase", ""))).await;

    let (_, percent) = call(&app, Method::GET, "/v1/notes?search=0%25", None).await;
    assert_eq!(percent["count"], 1);
    assert_eq!(percent["items"][0]["title"], "100% done");

    let (_, underscore) = call(&app, Method::GET, "/v1/notes?search=e_c", None).await;
    assert_eq!(underscore["count"], 1);
    assert_eq!(underscore["items"][0]["title"], "snake_case");

    let injection = "/v1/notes?search=%27%3B%20DROP%20TABLE%20notes%3B--";
    let (status, quote) = call(&app, Method::GET, injection, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["count"], 0);

    let (_, still_there) = call(&app, Method::GET, "/v1/notes", None).await;
    assert_eq!(still_there["count"], 4);
}

#[tokio::test]
async fn non_ascii_titles_match_their_stored_casing() {
    let app = sqlite_router().await;
    call(&app, Method::POST, "/v1/notes", Some(note_body(1, "École notes", ""))).await;
    call(&app, Method::POST, "/v1/notes", Some(note_body(1, "Straße plan", ""))).await;

    let (status, exact) = call(&app, Method::GET, "/v1/notes?search=%C3%89cole", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(exact["count"], 1);
    assert_eq!(exact["items"][0]["title"], "École notes");

    // ASCII letters of a non-ASCII title still fold.
    let (_, mixed) = call(&app, Method::GET, "/v1/notes?search=STRA%C3%9F", None).await;
    assert_eq!(mixed["count"], 1);
    assert_eq!(mixed["items"][0]["title"], "Straße plan");
}

#[tokio::test]
async fn search_term_is_matched_untrimmed() {
    let app = sqlite_router().await;
    call(&app, Method::POST, "/v1/notes", Some(note_body(1, "road map", ""))).await;
    call(&app, Method::POST, "/v1/notes", Some(note_body(1, "roadmap", ""))).await;

    let (_, spaced) = call(&app, Method::GET, "/v1/notes?search=%20map", None).await;
    assert_eq!(spaced["count"], 1);
    assert_eq!(spaced["items"][0]["title"], "road map");

    let (_, blank) = call(&app, Method::GET, "/v1/notes?search=%20%20", None).await;
    assert_eq!(blank["count"], 2);
}

#[tokio::test]
async fn notes_sort_by_creation_time() {
    let app = sqlite_router().await;
    let mut created = Vec::new();
    for title in ["one", "two", "three"] {
        let (_, note) = call(&app, Method::POST, "/v1/notes", Some(note_body(1, title, ""))).await;
        created.push(note["id"].as_i64().unwrap());
    }

    let (_, asc) = call(&app, Method::GET, "/v1/notes?sort_by_date=asc", None).await;
    assert_eq!(ids(&asc), created);

    let newest_first: Vec<i64> = created.iter().rev().copied().collect();
    let (_, desc) = call(&app, Method::GET, "/v1/notes?sort_by_date=desc", None).await;
    assert_eq!(ids(&desc), newest_first);

    let (_, default) = call(&app, Method::GET, "/v1/notes", None).await;
    assert_eq!(ids(&default), newest_first);

    let (status, fallback) = call(&app, Method::GET, "/v1/notes?sort_by_date=sideways", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&fallback), newest_first);
}

#[tokio::test]
async fn pages_partition_the_listing() {
    let app = sqlite_router().await;
    for i in 0..5 {
        call(&app, Method::POST, "/v1/notes", Some(note_body(1, &format!("n{i}"), ""))).await;
    }

    let mut seen = Vec::new();
    for page in 1..=3 {
        let uri = format!("/v1/notes?limit=2&page={page}&sort_by_date=asc");
        let (status, list) = call(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["count"], 5);
        seen.extend(ids(&list));
    }
    assert_eq!(seen.len(), 5);
    let mut unique = seen.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), 5);

    let (_, beyond) = call(&app, Method::GET, "/v1/notes?limit=2&page=9", None).await;
    assert!(beyond["items"].as_array().unwrap().is_empty());
    assert_eq!(beyond["count"], 5);
}

#[tokio::test]
async fn empty_paging_values_use_defaults() {
    let app = sqlite_router().await;
    for i in 0..12 {
        call(&app, Method::POST, "/v1/notes", Some(note_body(1, &format!("n{i}"), ""))).await;
    }

    let (status, list) = call(&app, Method::GET, "/v1/notes?limit=&page=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["items"].as_array().unwrap().len(), 10);
    assert_eq!(list["count"], 12);
}

#[tokio::test]
async fn update_note_keeps_owner_and_creation_time() {
    let app = sqlite_router().await;
    let (_, created) =
        call(&app, Method::POST, "/v1/notes", Some(note_body(7, "draft", "v1"))).await;
    let uri = format!("/v1/notes/{}", created["id"]);

    let (status, updated) = call(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"title": "final", "description": "v2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "final");
    assert_eq!(updated["description"], "v2");
    assert_eq!(updated["user_id"], 7);
    assert_eq!(updated["created_at"], created["created_at"]);
    assert!(updated["updated_at"].is_string());

    let (_, fetched) = call(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn note_lifecycle_ends_in_not_found() {
    let app = sqlite_router().await;
    let (_, created) = call(&app, Method::POST, "/v1/notes", Some(note_body(1, "tmp", ""))).await;
    let uri = format!("/v1/notes/{}", created["id"]);

    let (status, body) = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully deleted");

    let (status, body) = call(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().starts_with("Note not found"));

    let (status, _) = call(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"title": "again", "description": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_input_is_rejected_with_400() {
    let app = sqlite_router().await;

    for uri in [
        "/v1/users/abc",
        "/v1/notes/12x",
        "/v1/notes?limit=ten",
        "/v1/notes?page=two",
        "/v1/notes?user_id=me",
        "/v1/notes?page=0",
        "/v1/notes?limit=0",
        "/v1/notes?limit=101",
        "/v1/users?limit=-5",
    ] {
        let (status, body) = call(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }

    let (status, body) = call_raw(&app, Method::POST, "/v1/users", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Validation failed: body"));

    let (status, _) = call_raw(&app, Method::POST, "/v1/notes", r#"{"title": "no owner"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call_raw(&app, Method::PUT, "/v1/notes/1", r#"{"title": 5}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn user_listing_ignores_owner_filter() {
    let app = sqlite_router().await;
    call(&app, Method::POST, "/v1/users", Some(user_body("A", "B", "a@example.com"))).await;

    let (status, list) = call(&app, Method::GET, "/v1/users?user_id=999", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["count"], 1);
}
