use rusqlite::{params, Row};
use uuid::Uuid;

use crate::{db, DB};

use super::model::{NewNote, Note, NoteChanges};

const COLUMNS: &str = "id, user_id, video_id, video_title, start_time, end_time, text, created_at";

impl<'a> TryFrom<&Row<'a>> for Note {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            video_id: row.get(2)?,
            video_title: row.get(3)?,
            start_time: row.get(4)?,
            end_time: row.get(5)?,
            text: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

pub async fn create(db: &DB, owner_id: Uuid, note: NewNote) -> db::Result<Note> {
    db::call(db, move |conn| {
        let note = conn.query_row(
            &format!(
                "INSERT INTO notes (user_id, video_id, video_title, start_time, end_time, text)
                 VALUES (?, ?, ?, ?, ?, ?)
                 RETURNING {COLUMNS}"
            ),
            params![
                owner_id,
                note.video_id,
                note.video_title,
                note.start_time,
                note.end_time,
                note.text
            ],
            |row| Note::try_from(row),
        )?;
        Ok(note)
    })
    .await
}

/// Newest first; the id (time-ordered) breaks same-second ties.
pub async fn list_by_owner(db: &DB, owner_id: Uuid) -> db::Result<Vec<Note>> {
    db::call(db, move |conn| {
        let notes = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM notes WHERE user_id = ? ORDER BY created_at DESC, id DESC"
            ))?
            .query_map(params![owner_id], |row| Note::try_from(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(notes)
    })
    .await
}

pub async fn list_by_owner_and_video(db: &DB, owner_id: Uuid, video_id: String) -> db::Result<Vec<Note>> {
    db::call(db, move |conn| {
        let notes = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM notes WHERE user_id = ? AND video_id = ? ORDER BY start_time ASC"
            ))?
            .query_map(params![owner_id, video_id], |row| Note::try_from(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(notes)
    })
    .await
}

/// Filtered by `(id, user_id)`; a foreign note is indistinguishable from a
/// missing one.
pub async fn update(db: &DB, note_id: Uuid, owner_id: Uuid, changes: NoteChanges) -> db::Result<Note> {
    db::call(db, move |conn| {
        let note = conn.query_row(
            &format!(
                "UPDATE notes SET text = ?, start_time = ?, end_time = ?
                 WHERE id = ? AND user_id = ?
                 RETURNING {COLUMNS}"
            ),
            params![changes.text, changes.start_time, changes.end_time, note_id, owner_id],
            |row| Note::try_from(row),
        )?;
        Ok(note)
    })
    .await
    .map_err(|e| e.not_found_message("Note not found"))
}

pub async fn delete(db: &DB, note_id: Uuid, owner_id: Uuid) -> db::Result<()> {
    db::call(db, move |conn| {
        conn.query_row(
            "DELETE FROM notes WHERE id = ? AND user_id = ? RETURNING id",
            params![note_id, owner_id],
            |_row| Ok(()),
        )?;
        Ok(())
    })
    .await
    .map_err(|e| e.not_found_message("Note not found"))
}

/// Full table dump for the offline backup tool.
pub async fn list_all(db: &DB) -> db::Result<Vec<Note>> {
    db::call(db, move |conn| {
        let notes = conn
            .prepare(&format!("SELECT {COLUMNS} FROM notes ORDER BY created_at"))?
            .query_map([], |row| Note::try_from(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(notes)
    })
    .await
}
