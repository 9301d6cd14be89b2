/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup (migrated on first use)
/// - Test user creation with real password hashes
/// - JWT token generation
/// - Request building and response parsing helpers
///
/// Tests require a running PostgreSQL database plus DATABASE_URL and
/// JWT_SECRET in the environment (a .env file works too).

use axum::body::Body;
use axum::http::Request;
use sqlx::PgPool;
use tasknest_api::app::{build_router, AppState};
use tasknest_api::config::Config;
use tasknest_shared::auth::jwt::{create_token, Claims};
use tasknest_shared::auth::password::hash_password;
use tasknest_shared::db::migrations::ensure_database_exists;
use tasknest_shared::models::user::{CreateUser, User};
use uuid::Uuid;

/// Password used for every test account
pub const TEST_PASSWORD: &str = "pw1";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh user against the test database
    pub async fn new() -> anyhow::Result<Self> {
        // Load test configuration
        let config = Config::from_env()?;

        ensure_database_exists(&config.database.url).await?;

        // Connect to database
        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../migrations").run(&db).await?;

        // Create test user with a real hash so login works end-to-end
        let user = create_user(&db).await?;

        // Generate JWT token
        let claims = Claims::new(user.id);
        let jwt_token = create_token(&claims, &config.jwt.secret)?;

        // Build app
        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            jwt_token,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Creates a second user with their own token (for isolation tests)
    pub async fn other_user(&self) -> anyhow::Result<(User, String)> {
        let user = create_user(&self.db).await?;
        let token = create_token(&Claims::new(user.id), &self.config.jwt.secret)?;
        Ok((user, token))
    }

    /// Cleans up test data; tasks cascade with their owner
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(self.user.id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Creates a user with a unique username and TEST_PASSWORD
pub async fn create_user(db: &PgPool) -> anyhow::Result<User> {
    let password_hash = hash_password(TEST_PASSWORD)?;
    let user = User::create(
        db,
        CreateUser {
            username: format!("test-{}", Uuid::new_v4()),
            password_hash,
        },
    )
    .await?;
    Ok(user)
}

/// Builds a JSON request, optionally with a bearer token
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

/// Builds a bodyless request, optionally with a bearer token
pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    builder.body(Body::empty()).unwrap()
}

/// Reads a response body as JSON
pub async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
