use axum::{
    http::StatusCode,
    routing::{get, post},
    Extension, Router,
};

use crate::{
    ctx::Ctx,
    extract::Json,
    state::AppState,
    Error, Result, DB,
};

use super::{
    model::{AuthResponse, LoginRequest, ProfileResponse, RegisterRequest},
    password, store, tokens,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/profile", get(profile))
        .with_state(state)
}

async fn register(
    Extension(db): Extension<DB>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let new_user = request.validate()?;

    // Friendly duplicate check; the UNIQUE constraints remain the backstop
    // when two registrations race.
    let existing = store::find_by_username_or_email(&db, new_user.username.clone(), new_user.email.clone()).await?;
    if existing.is_some() {
        return Err(Error::Conflict("User already exists".into()));
    }

    let password_hash = password::hash(new_user.password).await?;
    let user = store::create(&db, new_user.username, new_user.email, password_hash).await?;

    let token = tokens::issue(user.id, &user.username).map_err(|e| Error::Unexpected(e.to_string()))?;

    tracing::info!(username = %user.username, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".into(),
            token,
            user: user.into(),
        }),
    ))
}

async fn login(Extension(db): Extension<DB>, Json(request): Json<LoginRequest>) -> Result<Json<AuthResponse>> {
    let credentials = request.validate()?;

    // Same rejection whether the user is unknown or the password is wrong.
    let user = store::find_by_email(&db, credentials.email)
        .await?
        .ok_or_else(|| Error::Unauthorized("Invalid credentials".into()))?;

    let valid = password::verify(credentials.password, user.password_hash.clone()).await?;
    if !valid {
        return Err(Error::Unauthorized("Invalid credentials".into()));
    }

    let token = tokens::issue(user.id, &user.username).map_err(|e| Error::Unexpected(e.to_string()))?;

    tracing::info!(username = %user.username, "user logged in");

    Ok(Json(AuthResponse {
        message: "Login successful".into(),
        token,
        user: user.into(),
    }))
}

async fn profile(ctx: Ctx, Extension(db): Extension<DB>) -> Result<Json<ProfileResponse>> {
    let user = store::find_by_id(&db, ctx.user_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".into()))?;

    Ok(Json(ProfileResponse { user: user.into() }))
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::{
        auth::model::AuthResponse,
        db::{init_test_db, DB},
        errors::Result,
        tests::full_router,
    };

    async fn test_server(db: DB) -> Result<TestServer> {
        crate::tests::test_server(db, full_router).await
    }

    #[tokio::test]
    async fn register_returns_token_and_user() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db).await?;

        let response = server
            .post("/api/auth/register")
            .json(&json!({
                "username": "alice",
                "email": "alice@x.com",
                "password": "secret1"
            }))
            .await;

        assert_eq!(response.status_code(), 201);

        let body = response.json::<Value>();
        assert!(!body["token"].as_str().unwrap().is_empty());
        assert_eq!(body["user"]["username"], "alice");
        assert_eq!(body["user"]["email"], "alice@x.com");
        assert!(body["user"].get("password").is_none());
        assert!(body["user"].get("passwordHash").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email_case_insensitively() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db).await?;

        server
            .post("/api/auth/register")
            .json(&json!({
                "username": "alice",
                "email": "alice@x.com",
                "password": "secret1"
            }))
            .await;

        let response = server
            .post("/api/auth/register")
            .json(&json!({
                "username": "alice2",
                "email": "Alice@X.com",
                "password": "secret1"
            }))
            .expect_failure()
            .await;

        assert_eq!(response.status_code(), 400);
        assert_eq!(response.json::<Value>()["message"], "User already exists");
        Ok(())
    }

    #[tokio::test]
    async fn register_reports_invalid_fields() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db).await?;

        let response = server
            .post("/api/auth/register")
            .json(&json!({
                "username": "al",
                "email": "not-an-email",
                "password": "12345"
            }))
            .expect_failure()
            .await;

        assert_eq!(response.status_code(), 400);

        let body = response.json::<Value>();
        assert_eq!(body["message"], "Validation failed");
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["username", "email", "password"]);
        Ok(())
    }

    #[tokio::test]
    async fn login_roundtrip() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db).await?;

        server
            .post("/api/auth/register")
            .json(&json!({
                "username": "alice",
                "email": "alice@x.com",
                "password": "secret1"
            }))
            .await;

        let response = server
            .post("/api/auth/login")
            .json(&json!({
                "email": "Alice@x.com",
                "password": "secret1"
            }))
            .await;

        assert_eq!(response.status_code(), 200);
        let auth = response.json::<AuthResponse>();
        assert_eq!(auth.user.username, "alice");

        let response = server
            .get("/api/auth/profile")
            .authorization_bearer(&auth.token)
            .await;

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.json::<Value>()["user"]["email"], "alice@x.com");
        Ok(())
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db).await?;

        server
            .post("/api/auth/register")
            .json(&json!({
                "username": "alice",
                "email": "alice@x.com",
                "password": "secret1"
            }))
            .await;

        let response = server
            .post("/api/auth/login")
            .json(&json!({
                "email": "alice@x.com",
                "password": "wrong"
            }))
            .expect_failure()
            .await;

        assert_eq!(response.status_code(), 401);
        assert_eq!(response.json::<Value>()["message"], "Invalid credentials");
        Ok(())
    }

    #[tokio::test]
    async fn profile_requires_token() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db).await?;

        let response = server.get("/api/auth/profile").expect_failure().await;
        assert_eq!(response.status_code(), 401);

        let response = server
            .get("/api/auth/profile")
            .authorization_bearer("not-a-token")
            .expect_failure()
            .await;
        assert_eq!(response.status_code(), 403);
        Ok(())
    }
}
