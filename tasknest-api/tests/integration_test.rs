/// Integration tests for the TaskNest API
///
/// These tests verify the full system works end-to-end:
/// - Registration and login flow
/// - Bearer-token authentication on task routes
/// - Owner-scoped task CRUD
/// - Cross-user isolation
///
/// They require a running PostgreSQL database plus DATABASE_URL and
/// JWT_SECRET in the environment.

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::TestContext;
use serde_json::json;
use tasknest_shared::auth::jwt::{create_token, Claims};
use tower::Service as _;

/// The end-to-end acceptance scenario: register, duplicate register, bad
/// login, good login, create a task with the token, reject the bare request.
#[tokio::test]
async fn test_register_login_create_scenario() {
    let ctx = TestContext::new().await.unwrap();
    let username = format!("alice-{}", uuid::Uuid::new_v4());

    // Register → 201 with id + username
    let request = common::json_request(
        "POST",
        "/register",
        None,
        json!({ "username": username, "password": "pw1" }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = common::response_json(response).await;
    assert_eq!(body["username"], username.as_str());
    assert!(body["id"].is_string());
    assert!(body.get("password_hash").is_none());

    // Register the same username again → 409
    let request = common::json_request(
        "POST",
        "/register",
        None,
        json!({ "username": username, "password": "pw2" }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Login with the wrong password → 401
    let request = common::json_request(
        "POST",
        "/login",
        None,
        json!({ "username": username, "password": "wrong" }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Login with the right password → 200 with token
    let request = common::json_request(
        "POST",
        "/login",
        None,
        json!({ "username": username, "password": "pw1" }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::response_json(response).await;
    let token = body["token"].as_str().expect("Login should return a token").to_string();

    // Create a task with the token → 201, incomplete by default
    let request = common::json_request(
        "POST",
        "/tasks",
        Some(&token),
        json!({ "title": "Buy milk" }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let task = common::response_json(response).await;
    assert_eq!(task["title"], "Buy milk");
    assert_eq!(task["is_complete"], false);

    // List without a header → 401
    let request = common::empty_request("GET", "/tasks", None);
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Clean up the registered user (cascades to the task)
    sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(&username)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Unknown username and wrong password are indistinguishable
#[tokio::test]
async fn test_login_unknown_user_is_unauthorized() {
    let ctx = TestContext::new().await.unwrap();

    let request = common::json_request(
        "POST",
        "/login",
        None,
        json!({ "username": format!("nobody-{}", uuid::Uuid::new_v4()), "password": "pw1" }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = common::response_json(response).await;
    assert_eq!(body["error"], "unauthorized");

    ctx.cleanup().await.unwrap();
}

/// Registration with an empty password fails validation
#[tokio::test]
async fn test_register_requires_password() {
    let ctx = TestContext::new().await.unwrap();

    let request = common::json_request(
        "POST",
        "/register",
        None,
        json!({ "username": format!("x-{}", uuid::Uuid::new_v4()), "password": "" }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    ctx.cleanup().await.unwrap();
}

/// Task routes reject garbage and expired tokens identically
#[tokio::test]
async fn test_tasks_reject_bad_tokens() {
    let ctx = TestContext::new().await.unwrap();

    // Garbage token
    let request = common::empty_request("GET", "/tasks", Some("not.a.token"));
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Well-formed but expired token
    let expired_claims = Claims::with_expiration(ctx.user.id, Duration::seconds(-3600));
    let expired = create_token(&expired_claims, &ctx.config.jwt.secret).unwrap();
    let request = common::empty_request("GET", "/tasks", Some(&expired));
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Token signed with the wrong secret
    let forged = create_token(&Claims::new(ctx.user.id), "attacker-controlled-secret!!!!!!").unwrap();
    let request = common::empty_request("GET", "/tasks", Some(&forged));
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

/// Full CRUD roundtrip through the API
#[tokio::test]
async fn test_task_crud_roundtrip() {
    let ctx = TestContext::new().await.unwrap();
    let token = ctx.jwt_token.clone();

    // Create
    let request = common::json_request(
        "POST",
        "/tasks",
        Some(&token),
        json!({ "title": "Write report", "description": "Quarterly numbers" }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = common::response_json(response).await;
    let task_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["owner_id"], ctx.user.id.to_string());

    // List includes the created task with identical field values
    let request = common::empty_request("GET", "/tasks", Some(&token));
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = common::response_json(response).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], task_id.as_str());
    assert_eq!(listed[0]["title"], "Write report");
    assert_eq!(listed[0]["description"], "Quarterly numbers");
    assert_eq!(listed[0]["is_complete"], false);

    // Update
    let request = common::json_request(
        "PUT",
        &format!("/tasks/{}", task_id),
        Some(&token),
        json!({ "title": "Write report v2", "is_complete": true }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = common::response_json(response).await;
    assert_eq!(updated["title"], "Write report v2");
    assert_eq!(updated["description"], "Quarterly numbers");
    assert_eq!(updated["is_complete"], true);

    // Delete → 204
    let request = common::empty_request("DELETE", &format!("/tasks/{}", task_id), Some(&token));
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Deleting again → 404
    let request = common::empty_request("DELETE", &format!("/tasks/{}", task_id), Some(&token));
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

/// Users can never see or mutate each other's tasks
#[tokio::test]
async fn test_owner_isolation() {
    let ctx = TestContext::new().await.unwrap();
    let (other, other_token) = ctx.other_user().await.unwrap();

    // Owner creates a task
    let request = common::json_request(
        "POST",
        "/tasks",
        Some(&ctx.jwt_token),
        json!({ "title": "Private task" }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let task = common::response_json(response).await;
    let task_id = task["id"].as_str().unwrap().to_string();

    // The other user's list is empty
    let request = common::empty_request("GET", "/tasks", Some(&other_token));
    let response = ctx.app.clone().call(request).await.unwrap();
    let listed = common::response_json(response).await;
    assert!(listed.as_array().unwrap().is_empty());

    // Updating the owner's task as the other user → 404, not 403
    let request = common::json_request(
        "PUT",
        &format!("/tasks/{}", task_id),
        Some(&other_token),
        json!({ "title": "hijacked" }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Deleting it as the other user → 404 too
    let request = common::empty_request("DELETE", &format!("/tasks/{}", task_id), Some(&other_token));
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The owner still sees the task, untouched
    let request = common::empty_request("GET", "/tasks", Some(&ctx.jwt_token));
    let response = ctx.app.clone().call(request).await.unwrap();
    let listed = common::response_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["title"], "Private task");

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(other.id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Toggling completion twice returns a task equal to its original state
#[tokio::test]
async fn test_toggle_complete_is_idempotent() {
    let ctx = TestContext::new().await.unwrap();
    let token = ctx.jwt_token.clone();

    let request = common::json_request(
        "POST",
        "/tasks",
        Some(&token),
        json!({ "title": "Toggle me", "description": "back and forth" }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    let original = common::response_json(response).await;
    let task_id = original["id"].as_str().unwrap().to_string();

    // Toggle on, using the legacy camelCase key the web client sends
    let request = common::json_request(
        "PUT",
        &format!("/tasks/{}", task_id),
        Some(&token),
        json!({ "isComplete": true }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    let toggled = common::response_json(response).await;
    assert_eq!(toggled["is_complete"], true);

    // Toggle back off
    let request = common::json_request(
        "PUT",
        &format!("/tasks/{}", task_id),
        Some(&token),
        json!({ "isComplete": false }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    let restored = common::response_json(response).await;

    assert_eq!(restored["id"], original["id"]);
    assert_eq!(restored["title"], original["title"]);
    assert_eq!(restored["description"], original["description"]);
    assert_eq!(restored["is_complete"], original["is_complete"]);

    ctx.cleanup().await.unwrap();
}

/// Health probe is public and reports database connectivity
#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await.unwrap();

    let request = common::empty_request("GET", "/health", None);
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::response_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");

    ctx.cleanup().await.unwrap();
}
