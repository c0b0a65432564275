use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use crate::{auth::tokens, db::DB, Error};

/// Caller identity resolved from a verified bearer token.
///
/// Extraction is a pure function of the `Authorization` header and the token
/// verification result: a missing or malformed header rejects with 401, a
/// token that fails verification (bad signature, garbage, expired) with 403.
#[derive(Clone, Debug)]
pub struct Ctx {
    pub user_id: Uuid,
    pub username: String,
}

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| Error::Unauthorized("Access token required".into()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| Error::Unauthorized("Access token required".into()))?;

        let claims = tokens::verify(token).map_err(|_| Error::Forbidden("Invalid token".into()))?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| Error::Forbidden("Invalid token".into()))?;

        Ok(Self {
            user_id,
            username: claims.username,
        })
    }
}

#[derive(Clone, Debug)]
pub struct BaseParams {
    pub ctx: Ctx,
    pub db: DB,
}

impl<S> FromRequestParts<S> for BaseParams
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ctx = Ctx::from_request_parts(parts, state).await?;
        let Extension(db) = Extension::<DB>::from_request_parts(parts, state)
            .await
            .map_err(|e| Error::Unexpected(e.to_string()))?;

        Ok(Self { ctx, db })
    }
}
