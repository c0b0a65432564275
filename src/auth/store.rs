use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::{db, DB};

use super::model::User;

const COLUMNS: &str = "id, username, email, password_hash, created_at";

impl<'a> TryFrom<&Row<'a>> for User {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

pub async fn create(db: &DB, username: String, email: String, password_hash: String) -> db::Result<User> {
    db::call(db, move |conn| {
        let user = conn.query_row(
            &format!("INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?) RETURNING {COLUMNS}"),
            params![username, email, password_hash],
            |row| User::try_from(row),
        )?;
        Ok(user)
    })
    .await
}

pub async fn find_by_username_or_email(db: &DB, username: String, email: String) -> db::Result<Option<User>> {
    db::call(db, move |conn| {
        let user = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM users WHERE username = ? OR email = ?"),
                params![username, email],
                |row| User::try_from(row),
            )
            .optional()?;
        Ok(user)
    })
    .await
}

pub async fn find_by_email(db: &DB, email: String) -> db::Result<Option<User>> {
    db::call(db, move |conn| {
        let user = conn
            .query_row(&format!("SELECT {COLUMNS} FROM users WHERE email = ?"), params![email], |row| {
                User::try_from(row)
            })
            .optional()?;
        Ok(user)
    })
    .await
}

pub async fn find_by_id(db: &DB, id: Uuid) -> db::Result<Option<User>> {
    db::call(db, move |conn| {
        let user = conn
            .query_row(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"), params![id], |row| {
                User::try_from(row)
            })
            .optional()?;
        Ok(user)
    })
    .await
}

/// Full table dump for the offline backup tool.
pub async fn list_all(db: &DB) -> db::Result<Vec<User>> {
    db::call(db, move |conn| {
        let users = conn
            .prepare(&format!("SELECT {COLUMNS} FROM users ORDER BY created_at"))?
            .query_map([], |row| User::try_from(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    })
    .await
}
