pub mod comments;
pub mod images;
pub mod posts;
pub mod server;
pub mod tags;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Multipart framing overhead allowed on top of the image limit
const BODY_LIMIT_SLACK: u64 = 1024 * 1024;

/// Build the HTTP router / 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state
        .config
        .images
        .max_upload_bytes
        .saturating_add(BODY_LIMIT_SLACK)
        .min(usize::MAX as u64) as usize;

    Router::new()
        .route("/api/health", get(server::health_check))
        .route("/api/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/api/posts/:post_id",
            get(posts::get_post).put(posts::update_post).delete(posts::delete_post),
        )
        .route("/api/posts/:post_id/likes", post(posts::like_post))
        .route(
            "/api/posts/:post_id/comments",
            get(comments::list_comments).post(comments::add_comment),
        )
        .route(
            "/api/posts/:post_id/comments/:comment_id",
            get(comments::get_comment)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .route(
            "/api/posts/:post_id/image",
            get(images::download_image).put(images::upload_image),
        )
        .route("/api/tags", get(tags::list_tags))
        .route("/api/tags/:name", get(tags::get_tag))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
