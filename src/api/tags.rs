use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use myblog_backend::models::Tag;
use myblog_backend::Error;

use crate::state::AppState;

/// GET /api/tags - 全部标签
pub async fn list_tags(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Tag>>, Error> {
    let tags = state.tags.find_all().await?;
    Ok(Json(tags))
}

/// GET /api/tags/:name - 按名称查找（忽略大小写）
pub async fn get_tag(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Tag>, Error> {
    let tag = state
        .tags
        .find_by_name(name.trim())
        .await?
        .ok_or_else(|| Error::NotFound(format!("tag {}", name)))?;
    Ok(Json(tag))
}
