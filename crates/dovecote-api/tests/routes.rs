//! Integration tests for the dashboard API. Each test drives the real router
//! against an in-memory database via `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use dovecote_api::routes::{self, AppState};
use dovecote_db::Database;
use dovecote_types::api::Claims;
use dovecote_types::models::MessageTag;

const TEST_SECRET: &str = "integration-test-secret";

fn test_app() -> (Router, Arc<Database>) {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let state = AppState {
        db: db.clone(),
        jwt_secret: TEST_SECRET.into(),
    };
    (routes::router(state), db)
}

fn seed_creator(db: &Database, company_id: &str, handle: &str) -> Uuid {
    let id = Uuid::new_v4();
    db.create_creator(&id.to_string(), company_id, handle).unwrap();
    id
}

fn seed_message(db: &Database, creator: Uuid, text: &str, tag: MessageTag, category: Option<&str>) -> Uuid {
    let id = Uuid::new_v4();
    db.insert_message(&id.to_string(), &creator.to_string(), text, tag, category)
        .unwrap();
    id
}

fn token_for(company_id: &str) -> String {
    let claims = Claims {
        sub: Uuid::new_v4(),
        company_id: company_id.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

/// Send a request and return (status, parsed JSON body). Non-JSON bodies
/// come back as `Value::Null`.
async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

// ---------------------------------------------------------------------------
// Test: GET /health needs no token
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_public() {
    let (app, _db) = test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ok");
}

// ---------------------------------------------------------------------------
// Test: missing or garbage tokens are rejected with 401
// ---------------------------------------------------------------------------

#[tokio::test]
async fn requests_without_valid_token_are_401() {
    let (app, db) = test_app();
    seed_creator(&db, "acme", "ada");

    let (status, body) = send(app.clone(), Method::GET, "/api/feedback", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "authentication required");

    let (status, _) = send(
        app,
        Method::GET,
        "/api/feedback",
        Some("not-a-jwt"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: a valid token whose company has no creator record gets 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn company_without_creator_record_is_404() {
    let (app, _db) = test_app();
    let token = token_for("ghost-company");

    let (status, body) = send(app, Method::GET, "/api/feedback", Some(&token), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "creator not found");
}

// ---------------------------------------------------------------------------
// Test: list returns only this creator's messages, newest first, with
// nested replies and reaction counts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_is_scoped_and_carries_children() {
    let (app, db) = test_app();
    let ada = seed_creator(&db, "acme", "ada");
    let rival = seed_creator(&db, "rival-co", "riva");

    let first = seed_message(&db, ada, "first question", MessageTag::Question, None);
    let second = seed_message(&db, ada, "a confession", MessageTag::Confession, None);
    seed_message(&db, rival, "not yours", MessageTag::Feedback, None);

    db.insert_reply(&Uuid::new_v4().to_string(), &first.to_string(), "thanks!", true)
        .unwrap();
    db.insert_reaction(&Uuid::new_v4().to_string(), &second.to_string(), "hash-1")
        .unwrap();
    db.insert_reaction(&Uuid::new_v4().to_string(), &second.to_string(), "hash-2")
        .unwrap();

    let token = token_for("acme");
    let (status, body) = send(app, Method::GET, "/api/feedback", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);

    // Newest first.
    assert_eq!(list[0]["id"], second.to_string());
    assert_eq!(list[0]["tag"], "confession");
    assert_eq!(list[0]["reactionCount"], 2);
    assert_eq!(list[0]["reviewed"], false);

    assert_eq!(list[1]["id"], first.to_string());
    let replies = list[1]["replies"].as_array().unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["text"], "thanks!");
    assert_eq!(replies[0]["isPublic"], true);
    assert_eq!(replies[0]["messageId"], first.to_string());
}

// ---------------------------------------------------------------------------
// Test: tag and productCategory query params filter the list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_filters_by_tag_and_product_category() {
    let (app, db) = test_app();
    let ada = seed_creator(&db, "acme", "ada");
    seed_message(&db, ada, "q about widgets", MessageTag::Question, Some("widgets"));
    seed_message(&db, ada, "q about gadgets", MessageTag::Question, Some("gadgets"));
    seed_message(&db, ada, "love the widgets", MessageTag::Feedback, Some("widgets"));

    let token = token_for("acme");

    let (status, body) = send(
        app.clone(),
        Method::GET,
        "/api/feedback?tag=question",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = send(
        app,
        Method::GET,
        "/api/feedback?tag=question&productCategory=widgets",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["text"], "q about widgets");
    assert_eq!(list[0]["productCategory"], "widgets");
}

// ---------------------------------------------------------------------------
// Test: asking for another creator's id returns an empty list, not an error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn foreign_creator_id_yields_empty_list() {
    let (app, db) = test_app();
    let ada = seed_creator(&db, "acme", "ada");
    let rival = seed_creator(&db, "rival-co", "riva");
    seed_message(&db, ada, "mine", MessageTag::Question, None);
    seed_message(&db, rival, "theirs", MessageTag::Question, None);

    let token = token_for("acme");
    let uri = format!("/api/feedback?creatorId={}", rival);
    let (status, body) = send(app, Method::GET, &uri, Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

// ---------------------------------------------------------------------------
// Test: an unknown tag value in the query string is a 400
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_tag_value_is_400() {
    let (app, db) = test_app();
    seed_creator(&db, "acme", "ada");

    let token = token_for("acme");
    let (status, _) = send(
        app,
        Method::GET,
        "/api/feedback?tag=rant",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: PATCH /api/feedback/{id} flips the reviewed flag
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reviewed_patch_roundtrip() {
    let (app, db) = test_app();
    let ada = seed_creator(&db, "acme", "ada");
    let message = seed_message(&db, ada, "look at me", MessageTag::Feedback, None);

    let token = token_for("acme");
    let uri = format!("/api/feedback/{}", message);

    let (status, body) = send(
        app.clone(),
        Method::PATCH,
        &uri,
        Some(&token),
        Some(json!({ "reviewed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], message.to_string());
    assert_eq!(body["reviewed"], true);

    let (_, list) = send(app.clone(), Method::GET, "/api/feedback", Some(&token), None).await;
    assert_eq!(list[0]["reviewed"], true);

    // Unknown id is a 404.
    let uri = format!("/api/feedback/{}", Uuid::new_v4());
    let (status, _) = send(
        app,
        Method::PATCH,
        &uri,
        Some(&token),
        Some(json!({ "reviewed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: DELETE removes the message and its children
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_removes_message_and_children() {
    let (app, db) = test_app();
    let ada = seed_creator(&db, "acme", "ada");
    let message = seed_message(&db, ada, "delete me", MessageTag::Confession, None);
    db.insert_reply(&Uuid::new_v4().to_string(), &message.to_string(), "bye", false)
        .unwrap();

    let token = token_for("acme");
    let uri = format!("/api/feedback/{}", message);

    let (status, _) = send(app.clone(), Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Gone now.
    let (status, _) = send(app.clone(), Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(app, Method::GET, "/api/feedback", Some(&token), None).await;
    assert_eq!(list.as_array().unwrap().len(), 0);
}

// ---------------------------------------------------------------------------
// Test: deleting another creator's message is a 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_of_foreign_message_is_404() {
    let (app, db) = test_app();
    seed_creator(&db, "acme", "ada");
    let rival = seed_creator(&db, "rival-co", "riva");
    let message = seed_message(&db, rival, "untouchable", MessageTag::Question, None);

    let token = token_for("acme");
    let uri = format!("/api/feedback/{}", message);
    let (status, _) = send(app, Method::DELETE, &uri, Some(&token), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: POST /api/replies validates text and message ownership
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reply_creation_validates_and_scopes() {
    let (app, db) = test_app();
    let ada = seed_creator(&db, "acme", "ada");
    let rival = seed_creator(&db, "rival-co", "riva");
    let own = seed_message(&db, ada, "q", MessageTag::Question, None);
    let foreign = seed_message(&db, rival, "q", MessageTag::Question, None);

    let token = token_for("acme");

    let (status, body) = send(
        app.clone(),
        Method::POST,
        "/api/replies",
        Some(&token),
        Some(json!({ "messageId": own, "replyText": "   ", "isPublic": true })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "reply text must not be empty");

    let (status, _) = send(
        app.clone(),
        Method::POST,
        "/api/replies",
        Some(&token),
        Some(json!({ "messageId": foreign, "replyText": "hi", "isPublic": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        app.clone(),
        Method::POST,
        "/api/replies",
        Some(&token),
        Some(json!({ "messageId": own, "replyText": "thanks for asking", "isPublic": false })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["messageId"], own.to_string());
    assert_eq!(body["text"], "thanks for asking");
    assert_eq!(body["isPublic"], false);

    let (_, list) = send(app, Method::GET, "/api/feedback", Some(&token), None).await;
    assert_eq!(list[0]["replies"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Test: PATCH /api/replies/{id} flips visibility, scoped to the creator
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reply_visibility_patch() {
    let (app, db) = test_app();
    let ada = seed_creator(&db, "acme", "ada");
    let message = seed_message(&db, ada, "q", MessageTag::Question, None);
    let reply = Uuid::new_v4();
    db.insert_reply(&reply.to_string(), &message.to_string(), "private note", false)
        .unwrap();

    let token = token_for("acme");
    let uri = format!("/api/replies/{}", reply);

    let (status, body) = send(
        app.clone(),
        Method::PATCH,
        &uri,
        Some(&token),
        Some(json!({ "isPublic": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isPublic"], true);

    let (_, list) = send(app.clone(), Method::GET, "/api/feedback", Some(&token), None).await;
    assert_eq!(list[0]["replies"][0]["isPublic"], true);

    let uri = format!("/api/replies/{}", Uuid::new_v4());
    let (status, _) = send(
        app,
        Method::PATCH,
        &uri,
        Some(&token),
        Some(json!({ "isPublic": false })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: GET /api/reactions reports count plus whether this hash reacted
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reaction_summary_counts_and_flags() {
    let (app, db) = test_app();
    let ada = seed_creator(&db, "acme", "ada");
    let message = seed_message(&db, ada, "hot take", MessageTag::Confession, None);
    db.insert_reaction(&Uuid::new_v4().to_string(), &message.to_string(), "hash-a")
        .unwrap();
    db.insert_reaction(&Uuid::new_v4().to_string(), &message.to_string(), "hash-b")
        .unwrap();

    let token = token_for("acme");

    let uri = format!("/api/reactions?messageId={}&userHash=hash-a", message);
    let (status, body) = send(app.clone(), Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messageId"], message.to_string());
    assert_eq!(body["count"], 2);
    assert_eq!(body["reacted"], true);

    let uri = format!("/api/reactions?messageId={}", message);
    let (status, body) = send(app.clone(), Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reacted"], false);

    // Someone else's message is invisible.
    let rival = seed_creator(&db, "rival-co", "riva");
    let foreign = seed_message(&db, rival, "q", MessageTag::Question, None);
    let uri = format!("/api/reactions?messageId={}", foreign);
    let (status, _) = send(app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: creator feedback rejects unknown categories with 400
// ---------------------------------------------------------------------------

#[tokio::test]
async fn creator_feedback_unknown_category_is_400() {
    let (app, db) = test_app();
    seed_creator(&db, "acme", "ada");

    let token = token_for("acme");
    let (status, body) = send(
        app,
        Method::POST,
        "/api/creator-feedback",
        Some(&token),
        Some(json!({ "category": "rant", "message": "listen up" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("unknown category 'rant'"), "got: {error}");
}

// ---------------------------------------------------------------------------
// Test: creator feedback rejects empty or whitespace-only messages with 400
// ---------------------------------------------------------------------------

#[tokio::test]
async fn creator_feedback_empty_message_is_400() {
    let (app, db) = test_app();
    seed_creator(&db, "acme", "ada");

    let token = token_for("acme");

    let (status, body) = send(
        app.clone(),
        Method::POST,
        "/api/creator-feedback",
        Some(&token),
        Some(json!({ "category": "bug", "message": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "message must not be empty");

    let (status, _) = send(
        app,
        Method::POST,
        "/api/creator-feedback",
        Some(&token),
        Some(json!({ "category": "bug", "message": "   \n  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: creator feedback requires a token
// ---------------------------------------------------------------------------

#[tokio::test]
async fn creator_feedback_requires_auth() {
    let (app, _db) = test_app();

    let (status, _) = send(
        app,
        Method::POST,
        "/api/creator-feedback",
        None,
        Some(json!({ "category": "bug", "message": "broken" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: creator feedback from a company with no creator record is 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn creator_feedback_unknown_company_is_404() {
    let (app, _db) = test_app();

    let token = token_for("ghost-company");
    let (status, _) = send(
        app,
        Method::POST,
        "/api/creator-feedback",
        Some(&token),
        Some(json!({ "category": "bug", "message": "broken" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: a valid creator feedback submission is persisted and echoed back
// ---------------------------------------------------------------------------

#[tokio::test]
async fn creator_feedback_accepts_valid_submission() {
    let (app, db) = test_app();
    let ada = seed_creator(&db, "acme", "ada");

    let token = token_for("acme");
    let (status, body) = send(
        app,
        Method::POST,
        "/api/creator-feedback",
        Some(&token),
        Some(json!({ "category": "idea", "subject": "  dark mode  ", "message": "please" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["creatorId"], ada.to_string());
    assert_eq!(body["category"], "idea");
    assert_eq!(body["subject"], "dark mode");
    assert_eq!(body["message"], "please");

    let count: i64 = db
        .with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM creator_feedback", [], |row| row.get(0))?)
        })
        .unwrap();
    assert_eq!(count, 1);
}

// ---------------------------------------------------------------------------
// Test: a storage failure surfaces as a sanitized 500
// ---------------------------------------------------------------------------

#[tokio::test]
async fn creator_feedback_storage_failure_is_500() {
    let (app, db) = test_app();
    seed_creator(&db, "acme", "ada");

    db.with_conn(|conn| {
        conn.execute_batch("DROP TABLE creator_feedback")?;
        Ok(())
    })
    .unwrap();

    let token = token_for("acme");
    let (status, body) = send(
        app,
        Method::POST,
        "/api/creator-feedback",
        Some(&token),
        Some(json!({ "category": "bug", "message": "broken" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    // The client never sees the underlying SQLite error.
    assert_eq!(body["error"], "internal error");
}
