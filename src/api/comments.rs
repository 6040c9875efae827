use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use myblog_backend::models::{CommentRequest, CommentResponse};
use myblog_backend::Error;

use crate::state::AppState;

fn comment_text(req: &CommentRequest) -> Result<&str, Error> {
    let text = req.text.as_deref().unwrap_or("").trim();
    if text.is_empty() {
        return Err(Error::BadRequest("comment text must not be blank".to_string()));
    }
    Ok(text)
}

async fn ensure_post(state: &AppState, post_id: i64) -> Result<(), Error> {
    if state.posts.exists(post_id).await? {
        Ok(())
    } else {
        Err(Error::post_not_found(post_id))
    }
}

fn comment_not_found(post_id: i64, comment_id: i64) -> Error {
    Error::NotFound(format!("comment {} of post {}", comment_id, post_id))
}

/// GET /api/posts/:post_id/comments
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i64>,
) -> Result<Json<Vec<CommentResponse>>, Error> {
    ensure_post(&state, post_id).await?;
    let comments = state.comments.list_by_post(post_id).await?;
    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}

/// GET /api/posts/:post_id/comments/:comment_id
pub async fn get_comment(
    State(state): State<Arc<AppState>>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<Json<CommentResponse>, Error> {
    ensure_post(&state, post_id).await?;
    let comment = state
        .comments
        .find(post_id, comment_id)
        .await?
        .ok_or_else(|| comment_not_found(post_id, comment_id))?;
    Ok(Json(comment.into()))
}

/// POST /api/posts/:post_id/comments - 添加评论
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i64>,
    Json(req): Json<CommentRequest>,
) -> Result<Json<CommentResponse>, Error> {
    let text = comment_text(&req)?;
    ensure_post(&state, post_id).await?;
    let comment = state.comments.add(post_id, text).await?;
    Ok(Json(comment.into()))
}

/// PUT /api/posts/:post_id/comments/:comment_id - 修改评论
pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    Json(req): Json<CommentRequest>,
) -> Result<Json<CommentResponse>, Error> {
    let text = comment_text(&req)?;
    ensure_post(&state, post_id).await?;
    let comment = state
        .comments
        .update(post_id, comment_id, text)
        .await?
        .ok_or_else(|| comment_not_found(post_id, comment_id))?;
    Ok(Json(comment.into()))
}

/// DELETE /api/posts/:post_id/comments/:comment_id
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<StatusCode, Error> {
    ensure_post(&state, post_id).await?;
    if !state.comments.delete(post_id, comment_id).await? {
        return Err(comment_not_found(post_id, comment_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{app, empty, get, json_request, send_json};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    async fn create_post(app: &axum::Router) -> i64 {
        let (_, body) = send_json(
            app,
            json_request(Method::POST, "/api/posts", json!({ "title": "Commented" })),
        )
        .await;
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_comment_lifecycle_tracks_count() {
        let (app, _) = app().await;
        let post_id = create_post(&app).await;
        let uri = format!("/api/posts/{}/comments", post_id);

        let (status, first) = send_json(
            &app,
            json_request(Method::POST, &uri, json!({ "text": "  nice post  " })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["text"], "nice post");
        assert_eq!(first["postId"], post_id);

        send_json(&app, json_request(Method::POST, &uri, json!({ "text": "second" }))).await;

        let (_, listed) = send_json(&app, get(&uri)).await;
        assert_eq!(listed.as_array().unwrap().len(), 2);
        assert_eq!(listed[0]["id"], first["id"]);

        let (_, post) = send_json(&app, get(&format!("/api/posts/{}", post_id))).await;
        assert_eq!(post["commentsCount"], 2);

        let comment_uri = format!("{}/{}", uri, first["id"]);
        let (status, updated) = send_json(
            &app,
            json_request(Method::PUT, &comment_uri, json!({ "text": "edited" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["text"], "edited");

        let (status, _) = send_json(&app, empty(Method::DELETE, &comment_uri)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send_json(&app, get(&comment_uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, post) = send_json(&app, get(&format!("/api/posts/{}", post_id))).await;
        assert_eq!(post["commentsCount"], 1);
    }

    #[tokio::test]
    async fn test_blank_comment_rejected() {
        let (app, _) = app().await;
        let post_id = create_post(&app).await;
        let uri = format!("/api/posts/{}/comments", post_id);

        let (status, _) = send_json(&app, json_request(Method::POST, &uri, json!({ "text": "   " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send_json(&app, json_request(Method::POST, &uri, json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_post_is_not_found() {
        let (app, _) = app().await;

        let (status, _) = send_json(&app, get("/api/posts/42/comments")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send_json(
            &app,
            json_request(Method::POST, "/api/posts/42/comments", json!({ "text": "hello" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send_json(&app, empty(Method::DELETE, "/api/posts/42/comments/1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
