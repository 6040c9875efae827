use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use std::sync::Arc;

use myblog_backend::models::PostImage;
use myblog_backend::Error;

use crate::state::AppState;

const IMAGE_FIELD: &str = "image";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

struct UploadedPart {
    data: Bytes,
    content_type: Option<String>,
    filename: Option<String>,
}

async fn read_image_part(multipart: &mut Multipart) -> Result<Option<UploadedPart>, Error> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Multipart(e.to_string()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let filename = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::Multipart(e.to_string()))?;
        return Ok(Some(UploadedPart { data, content_type, filename }));
    }
    Ok(None)
}

/// 未提供类型时按文件名推断
fn resolve_content_type(part: &UploadedPart) -> String {
    part.content_type
        .clone()
        .filter(|ct| !ct.trim().is_empty())
        .or_else(|| {
            part.filename
                .as_deref()
                .and_then(|name| mime_guess::from_path(name).first())
                .map(|mime| mime.to_string())
        })
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}

/// PUT /api/posts/:post_id/image - 上传文章图片
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<StatusCode, Error> {
    let part = read_image_part(&mut multipart)
        .await?
        .filter(|part| !part.data.is_empty())
        .ok_or_else(|| Error::BadRequest("image file is empty".to_string()))?;

    let size = part.data.len() as u64;
    let limit = state.config.images.max_upload_bytes;
    if size > limit {
        return Err(Error::PayloadTooLarge { size, limit });
    }

    if !state.posts.exists(post_id).await? {
        return Err(Error::post_not_found(post_id));
    }

    let content_type = resolve_content_type(&part);
    let image = PostImage {
        post_id,
        size_bytes: size as i64,
        content_type: Some(content_type),
        filename: part.filename,
        data: part.data.to_vec(),
    };
    state.images.save(&image).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/posts/:post_id/image - 下载文章图片
pub async fn download_image(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i64>,
) -> Result<Response, Error> {
    let image = state
        .images
        .find_by_post(post_id)
        .await?
        .filter(|image| !image.data.is_empty())
        .ok_or_else(|| Error::NotFound(format!("image of post {}", post_id)))?;

    let content_type = image
        .content_type
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());
    let length = image.data.len().to_string();

    Ok((
        [(header::CONTENT_TYPE, content_type), (header::CONTENT_LENGTH, length)],
        image.data,
    )
        .into_response())
}
