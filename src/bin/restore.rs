//! Offline restore preview: compares a snapshot produced by the backup tool
//! against the live database and prints a diff report. Never writes.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use uuid::Uuid;

use tubenotes::{auth, auth::model::User, config, errors, init_db, notes, notes::model::Note, Error};

#[derive(Debug, Deserialize)]
struct Snapshot {
    timestamp: String,
    tables: Tables,
}

#[derive(Debug, Deserialize)]
struct Tables {
    users: Vec<User>,
    notes: Vec<Note>,
}

#[tokio::main]
async fn main() -> errors::Result<()> {
    let config = config();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.backup_dir).join("latest.json"));

    let contents = fs::read_to_string(&path).map_err(|e| Error::Unexpected(format!("{}: {e}", path.display())))?;
    let snapshot: Snapshot = serde_json::from_str(&contents).map_err(|e| Error::Unexpected(e.to_string()))?;

    let db = init_db().await?;
    let live_users = auth::store::list_all(&db).await.map_err(Error::from)?;
    let live_notes = notes::store::list_all(&db).await.map_err(Error::from)?;

    println!("Snapshot {} ({})", path.display(), snapshot.timestamp);
    println!(
        "  snapshot: {} users, {} notes",
        snapshot.tables.users.len(),
        snapshot.tables.notes.len()
    );
    println!("  live:     {} users, {} notes", live_users.len(), live_notes.len());
    println!();

    report_users(&snapshot.tables.users, &live_users);
    report_notes(&snapshot.tables.notes, &live_notes);

    println!();
    println!("Dry run only: no changes were applied.");

    Ok(())
}

fn report_users(snapshot: &[User], live: &[User]) {
    let live_ids: HashMap<Uuid, &User> = live.iter().map(|u| (u.id, u)).collect();
    let snapshot_ids: HashMap<Uuid, &User> = snapshot.iter().map(|u| (u.id, u)).collect();

    for user in snapshot {
        if !live_ids.contains_key(&user.id) {
            println!("+ user {} ({}) missing from live database", user.username, user.id);
        }
    }
    for user in live {
        if !snapshot_ids.contains_key(&user.id) {
            println!("- user {} ({}) not present in snapshot", user.username, user.id);
        }
    }
}

fn report_notes(snapshot: &[Note], live: &[Note]) {
    let live_ids: HashMap<Uuid, &Note> = live.iter().map(|n| (n.id, n)).collect();
    let snapshot_ids: HashMap<Uuid, &Note> = snapshot.iter().map(|n| (n.id, n)).collect();

    for note in snapshot {
        match live_ids.get(&note.id) {
            None => println!("+ note {} (video {}) missing from live database", note.id, note.video_id),
            Some(current) => {
                let changed = current.text != note.text
                    || current.start_time != note.start_time
                    || current.end_time != note.end_time
                    || current.video_title != note.video_title;
                if changed {
                    println!("~ note {} differs from snapshot", note.id);
                }
            }
        }
    }
    for note in live {
        if !snapshot_ids.contains_key(&note.id) {
            println!("- note {} not present in snapshot", note.id);
        }
    }
}
