use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{Error, FieldError};

/// Canonical note shape; column names never leak past the store layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub video_id: String,
    pub video_title: String,
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNote {
    pub video_id: Option<String>,
    pub video_title: Option<String>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub text: Option<String>,
}

#[derive(Debug)]
pub struct NewNote {
    pub video_id: String,
    pub video_title: String,
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
}

impl CreateNote {
    pub fn validate(self) -> crate::Result<NewNote> {
        let mut errors = Vec::new();

        let video_id = self.video_id.unwrap_or_default().trim().to_string();
        if video_id.is_empty() {
            errors.push(FieldError::new("videoId", "videoId is required"));
        }

        let video_title = self.video_title.unwrap_or_default().trim().to_string();
        if video_title.is_empty() {
            errors.push(FieldError::new("videoTitle", "videoTitle is required"));
        }

        let (start_time, end_time) = validate_times(self.start_time, self.end_time, &mut errors);

        let text = self.text.unwrap_or_default().trim().to_string();
        if text.is_empty() {
            errors.push(FieldError::new("text", "text is required"));
        }

        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        Ok(NewNote {
            video_id,
            video_title,
            start_time,
            end_time,
            text,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNote {
    pub text: Option<String>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
}

#[derive(Debug)]
pub struct NoteChanges {
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
}

impl UpdateNote {
    pub fn validate(self) -> crate::Result<NoteChanges> {
        let mut errors = Vec::new();

        let text = self.text.unwrap_or_default().trim().to_string();
        if text.is_empty() {
            errors.push(FieldError::new("text", "text is required"));
        }

        let (start_time, end_time) = validate_times(self.start_time, self.end_time, &mut errors);

        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        Ok(NoteChanges {
            text,
            start_time,
            end_time,
        })
    }
}

fn validate_times(start: Option<f64>, end: Option<f64>, errors: &mut Vec<FieldError>) -> (f64, f64) {
    let start_time = start.unwrap_or(-1.0);
    if !start_time.is_finite() || start_time < 0.0 {
        errors.push(FieldError::new("startTime", "startTime must be a non-negative number"));
    }

    let end_time = end.unwrap_or(-1.0);
    if !end_time.is_finite() || end_time < 0.0 || end_time <= start_time {
        errors.push(FieldError::new("endTime", "endTime must be a number greater than startTime"));
    }

    (start_time, end_time)
}

// Responses

#[derive(Debug, Serialize, Deserialize)]
pub struct NoteResponse {
    pub message: String,
    pub note: Note,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotesResponse {
    pub notes: Vec<Note>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
