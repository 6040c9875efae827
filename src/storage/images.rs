use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::PostImage;

/// One binary image per post, stored inline / 文章图片
#[derive(Clone)]
pub struct ImageRepository {
    db: SqlitePool,
}

impl ImageRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn find_by_post(&self, post_id: i64) -> Result<Option<PostImage>> {
        let image = sqlx::query_as::<_, PostImage>(
            "SELECT post_id, data, content_type, size_bytes, filename FROM post_images WHERE post_id = ?"
        )
        .bind(post_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(image)
    }

    /// Insert or replace the post's image
    pub async fn save(&self, image: &PostImage) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO post_images (post_id, data, content_type, size_bytes, filename)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(post_id) DO UPDATE SET
                data = excluded.data,
                content_type = excluded.content_type,
                size_bytes = excluded.size_bytes,
                filename = excluded.filename
            "#,
        )
        .bind(image.post_id)
        .bind(&image.data)
        .bind(&image.content_type)
        .bind(image.size_bytes)
        .bind(&image.filename)
        .execute(&self.db)
        .await?;

        tracing::info!("Saved image for post {} ({} bytes)", image.post_id, image.size_bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::storage::PostRepository;

    #[tokio::test]
    async fn test_save_replaces_existing() {
        let pool = db::connect_with("sqlite::memory:", 1).await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        let post = PostRepository::new(pool.clone()).create("Pic", "", &[]).await.unwrap();
        let images = ImageRepository::new(pool);

        assert!(images.find_by_post(post.id).await.unwrap().is_none());

        let mut image = PostImage {
            post_id: post.id,
            data: vec![1, 2, 3],
            content_type: Some("image/png".to_string()),
            size_bytes: 3,
            filename: Some("a.png".to_string()),
        };
        images.save(&image).await.unwrap();

        image.data = vec![9; 5];
        image.size_bytes = 5;
        image.content_type = Some("image/jpeg".to_string());
        images.save(&image).await.unwrap();

        let stored = images.find_by_post(post.id).await.unwrap().unwrap();
        assert_eq!(stored.data, vec![9; 5]);
        assert_eq!(stored.size_bytes, 5);
        assert_eq!(stored.content_type.as_deref(), Some("image/jpeg"));
    }
}
