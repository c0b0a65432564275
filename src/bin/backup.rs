//! Offline export: dumps both tables to a timestamped JSON snapshot plus a
//! `latest.json` alias, with a short summary block.

use std::fs;
use std::path::Path;

use chrono::Utc;
use serde_json::json;
use tracing_subscriber::prelude::*;

use tubenotes::{auth, config, errors, init_db, notes, Error};

#[tokio::main]
async fn main() -> errors::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().compact().with_target(false))
        .try_init()
        .ok();

    let config = config();
    let db = init_db().await?;

    let users = auth::store::list_all(&db).await.map_err(Error::from)?;
    let notes = notes::store::list_all(&db).await.map_err(Error::from)?;

    let total_users = users.len();
    let total_notes = notes.len();

    let tables = json!({ "users": users, "notes": notes });
    let size = tables.to_string().len();

    let snapshot = json!({
        "timestamp": Utc::now().to_rfc3339(),
        "database": "sqlite",
        "tables": tables,
        "summary": {
            "totalUsers": total_users,
            "totalNotes": total_notes,
            "backupSize": size,
        },
    });

    let dir = Path::new(&config.backup_dir);
    fs::create_dir_all(dir).map_err(|e| Error::Unexpected(e.to_string()))?;

    let contents = serde_json::to_string_pretty(&snapshot).map_err(|e| Error::Unexpected(e.to_string()))?;

    let stamped = dir.join(format!("backup-{}.json", Utc::now().format("%Y-%m-%dT%H-%M-%S")));
    fs::write(&stamped, &contents).map_err(|e| Error::Unexpected(e.to_string()))?;
    fs::write(dir.join("latest.json"), &contents).map_err(|e| Error::Unexpected(e.to_string()))?;

    tracing::info!(
        users = total_users,
        notes = total_notes,
        "backup written to {}",
        stamped.display()
    );

    Ok(())
}
