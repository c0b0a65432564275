//! bcrypt hashing and verification, run on the blocking pool so the
//! CPU-bound work stays off the request-handling threads.

use crate::{Error, Result};

pub async fn hash(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| Error::Unexpected(e.to_string()))?
        .map_err(|e| Error::Unexpected(e.to_string()))
}

pub async fn verify(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| Error::Unexpected(e.to_string()))?
        .map_err(|e| Error::Unexpected(e.to_string()))
}
