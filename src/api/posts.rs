use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use myblog_backend::models::{PostRequest, PostResponse, PostsResponse};
use myblog_backend::search::{parse_search, Pagination};
use myblog_backend::Error;

use crate::state::AppState;

fn default_page_number() -> i64 {
    1
}

/// 文章列表查询参数
#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub search: Option<String>,
    #[serde(rename = "pageNumber", default = "default_page_number")]
    pub page_number: i64,
    /// 0 means "use the configured default"
    #[serde(rename = "pageSize", default)]
    pub page_size: i64,
}

/// GET /api/posts - 搜索并分页
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<PostsResponse>, Error> {
    let criteria = parse_search(query.search.as_deref());
    let pagination = Pagination::from_config(
        query.page_number,
        query.page_size,
        &state.config.pagination,
    );

    let page = state.search.search_page(&criteria, pagination).await?;
    let page = page.map(PostResponse::from);

    Ok(Json(PostsResponse {
        has_prev: page.has_prev(),
        has_next: page.has_next(),
        last_page: page.total_pages(),
        posts: page.content,
    }))
}

/// GET /api/posts/:post_id
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i64>,
) -> Result<Json<PostResponse>, Error> {
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| Error::post_not_found(post_id))?;
    Ok(Json(post.into()))
}

fn validated_title(req: &PostRequest) -> Result<&str, Error> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(Error::BadRequest("title must not be blank".to_string()));
    }
    Ok(title)
}

/// POST /api/posts - 创建文章
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PostRequest>,
) -> Result<Json<PostResponse>, Error> {
    let title = validated_title(&req)?;
    let post = state.posts.create(title, &req.text, &req.tags).await?;
    Ok(Json(post.into()))
}

/// PUT /api/posts/:post_id - 更新文章（标签整体替换）
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i64>,
    Json(req): Json<PostRequest>,
) -> Result<Json<PostResponse>, Error> {
    let title = validated_title(&req)?;
    let post = state.posts.update(post_id, title, &req.text, &req.tags).await?;
    Ok(Json(post.into()))
}

/// DELETE /api/posts/:post_id
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i64>,
) -> Result<StatusCode, Error> {
    state.posts.delete(post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/posts/:post_id/likes - 点赞，返回新的点赞数
pub async fn like_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i64>,
) -> Result<Json<i64>, Error> {
    let likes = state.posts.increment_likes(post_id).await?;
    Ok(Json(likes))
}
