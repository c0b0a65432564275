use axum::{
    http::StatusCode,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    ctx::BaseParams,
    extract::{Json, Path},
    state::AppState,
    Result,
};

use super::{
    model::{CreateNote, MessageResponse, NoteResponse, NotesResponse, UpdateNote},
    store,
};

#[derive(Debug, Deserialize)]
struct NoteIdPath {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct VideoIdPath {
    video_id: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/notes/video/{video_id}", get(list_video_notes))
        .route("/api/notes/{id}", put(update_note).delete(delete_note))
        .with_state(state)
}

async fn create_note(
    BaseParams { ctx, db }: BaseParams,
    Json(request): Json<CreateNote>,
) -> Result<(StatusCode, Json<NoteResponse>)> {
    let new_note = request.validate()?;
    let note = store::create(&db, ctx.user_id, new_note).await?;

    Ok((
        StatusCode::CREATED,
        Json(NoteResponse {
            message: "Note created successfully".into(),
            note,
        }),
    ))
}

async fn list_notes(BaseParams { ctx, db }: BaseParams) -> Result<Json<NotesResponse>> {
    let notes = store::list_by_owner(&db, ctx.user_id).await?;
    Ok(Json(NotesResponse { notes }))
}

async fn list_video_notes(
    Path(VideoIdPath { video_id }): Path<VideoIdPath>,
    BaseParams { ctx, db }: BaseParams,
) -> Result<Json<NotesResponse>> {
    let notes = store::list_by_owner_and_video(&db, ctx.user_id, video_id).await?;
    Ok(Json(NotesResponse { notes }))
}

async fn update_note(
    Path(NoteIdPath { id }): Path<NoteIdPath>,
    BaseParams { ctx, db }: BaseParams,
    Json(request): Json<UpdateNote>,
) -> Result<Json<NoteResponse>> {
    let changes = request.validate()?;
    let note = store::update(&db, id, ctx.user_id, changes).await?;

    Ok(Json(NoteResponse {
        message: "Note updated successfully".into(),
        note,
    }))
}

async fn delete_note(
    Path(NoteIdPath { id }): Path<NoteIdPath>,
    BaseParams { ctx, db }: BaseParams,
) -> Result<Json<MessageResponse>> {
    store::delete(&db, id, ctx.user_id).await?;

    Ok(Json(MessageResponse {
        message: "Note deleted successfully".into(),
    }))
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::{
        db::{init_test_db, DB},
        errors::Result,
        notes::model::{NoteResponse, NotesResponse},
        tests::full_router,
    };

    async fn test_server(db: DB) -> Result<TestServer> {
        crate::tests::test_server(db, full_router).await
    }

    async fn register(server: &TestServer, username: &str, email: &str) -> String {
        let response = server
            .post("/api/auth/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": "secret1"
            }))
            .await;
        response.json::<Value>()["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn note_lifecycle() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db).await?;
        let token = register(&server, "alice", "alice@x.com").await;

        // create
        let response = server
            .post("/api/notes")
            .authorization_bearer(&token)
            .json(&json!({
                "videoId": "v1",
                "videoTitle": "T",
                "startTime": 10,
                "endTime": 20,
                "text": "hi"
            }))
            .await;
        assert_eq!(response.status_code(), 201);
        let created = response.json::<NoteResponse>().note;
        assert_eq!(created.text, "hi");

        // list
        let response = server.get("/api/notes").authorization_bearer(&token).await;
        let notes = response.json::<NotesResponse>().notes;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, created.id);

        // update
        let response = server
            .put(&format!("/api/notes/{}", created.id))
            .authorization_bearer(&token)
            .json(&json!({
                "text": "bye",
                "startTime": 10,
                "endTime": 15
            }))
            .await;
        assert_eq!(response.status_code(), 200);
        let updated = response.json::<NoteResponse>().note;
        assert_eq!(updated.text, "bye");
        assert_eq!(updated.end_time, 15.0);
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.user_id, created.user_id);

        // delete
        let response = server
            .delete(&format!("/api/notes/{}", created.id))
            .authorization_bearer(&token)
            .await;
        assert_eq!(response.status_code(), 200);

        let response = server.get("/api/notes").authorization_bearer(&token).await;
        assert!(response.json::<NotesResponse>().notes.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn notes_are_invisible_to_other_users() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db).await?;
        let alice = register(&server, "alice", "alice@x.com").await;
        let bob = register(&server, "bob", "bob@x.com").await;

        let response = server
            .post("/api/notes")
            .authorization_bearer(&alice)
            .json(&json!({
                "videoId": "v1",
                "videoTitle": "T",
                "startTime": 0,
                "endTime": 5,
                "text": "alice's"
            }))
            .await;
        let note_id = response.json::<NoteResponse>().note.id;

        // Bob sees nothing and cannot touch the note; 404, never 403.
        let response = server.get("/api/notes").authorization_bearer(&bob).await;
        assert!(response.json::<NotesResponse>().notes.is_empty());

        let response = server
            .put(&format!("/api/notes/{note_id}"))
            .authorization_bearer(&bob)
            .json(&json!({ "text": "stolen", "startTime": 0, "endTime": 5 }))
            .expect_failure()
            .await;
        assert_eq!(response.status_code(), 404);

        let response = server
            .delete(&format!("/api/notes/{note_id}"))
            .authorization_bearer(&bob)
            .expect_failure()
            .await;
        assert_eq!(response.status_code(), 404);

        // Still there for alice.
        let response = server.get("/api/notes").authorization_bearer(&alice).await;
        assert_eq!(response.json::<NotesResponse>().notes.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_end_before_start_on_create_and_update() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db).await?;
        let token = register(&server, "alice", "alice@x.com").await;

        let response = server
            .post("/api/notes")
            .authorization_bearer(&token)
            .json(&json!({
                "videoId": "v1",
                "videoTitle": "T",
                "startTime": 20,
                "endTime": 10,
                "text": "hi"
            }))
            .expect_failure()
            .await;
        assert_eq!(response.status_code(), 400);

        let response = server
            .post("/api/notes")
            .authorization_bearer(&token)
            .json(&json!({
                "videoId": "v1",
                "videoTitle": "T",
                "startTime": 10,
                "endTime": 20,
                "text": "hi"
            }))
            .await;
        let note_id = response.json::<NoteResponse>().note.id;

        let response = server
            .put(&format!("/api/notes/{note_id}"))
            .authorization_bearer(&token)
            .json(&json!({ "text": "hi", "startTime": 10, "endTime": 10 }))
            .expect_failure()
            .await;
        assert_eq!(response.status_code(), 400);
        Ok(())
    }

    #[tokio::test]
    async fn video_listing_is_scoped_and_ordered_by_start_time() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db).await?;
        let token = register(&server, "alice", "alice@x.com").await;

        for (video, start, end) in [("v1", 30.0, 40.0), ("v1", 10.0, 20.0), ("v2", 0.0, 5.0)] {
            server
                .post("/api/notes")
                .authorization_bearer(&token)
                .json(&json!({
                    "videoId": video,
                    "videoTitle": "T",
                    "startTime": start,
                    "endTime": end,
                    "text": "hi"
                }))
                .await;
        }

        let response = server.get("/api/notes/video/v1").authorization_bearer(&token).await;
        let notes = response.json::<NotesResponse>().notes;
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].start_time, 10.0);
        assert_eq!(notes[1].start_time, 30.0);
        Ok(())
    }

    #[tokio::test]
    async fn listing_is_newest_first() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db.clone()).await?;
        let token = register(&server, "alice", "alice@x.com").await;

        let response = server.get("/api/auth/profile").authorization_bearer(&token).await;
        let user_id = response.json::<Value>()["user"]["id"].as_str().unwrap().to_string();

        db.call(move |conn| {
            conn.execute_batch(&format!(
                r#"
                INSERT INTO notes (user_id, video_id, video_title, start_time, end_time, text, created_at)
                VALUES (uuid_blob('{user_id}'), 'v1', 'T', 0, 1, 'older', '2024-01-01 00:00:00');
                INSERT INTO notes (user_id, video_id, video_title, start_time, end_time, text, created_at)
                VALUES (uuid_blob('{user_id}'), 'v1', 'T', 0, 1, 'newer', '2024-01-02 00:00:00');
                "#
            ))?;
            Ok(())
        })
        .await
        .unwrap();

        let response = server.get("/api/notes").authorization_bearer(&token).await;
        let notes = response.json::<NotesResponse>().notes;
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].text, "newer");
        assert_eq!(notes[1].text, "older");
        Ok(())
    }

    #[tokio::test]
    async fn requires_authentication() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db).await?;

        let response = server.get("/api/notes").expect_failure().await;
        assert_eq!(response.status_code(), 401);
        Ok(())
    }
}
