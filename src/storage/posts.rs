use sqlx::{Sqlite, SqlitePool, Transaction};
use std::collections::BTreeSet;

use super::{SqlitePostStore, TagRepository};
use crate::error::{Error, Result};
use crate::models::{Post, Tag};
use crate::search::{fold_case, PostAssembler};

/// Post writes and single-post lookups / 文章存储
#[derive(Clone)]
pub struct PostRepository {
    db: SqlitePool,
}

impl PostRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Load one post with its tags
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            "SELECT id, title, text, likes_count, comments_count FROM posts WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        let Some(post) = post else {
            return Ok(None);
        };

        let store = SqlitePostStore::new(self.db.clone());
        let mut posts = [post];
        PostAssembler::new(&store).attach_tags(&mut posts).await?;
        let [post] = posts;
        Ok(Some(post))
    }

    pub async fn exists(&self, id: i64) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(found.is_some())
    }

    /// 创建文章，标签按名称（忽略大小写）复用或新建
    pub async fn create(&self, title: &str, text: &str, tag_names: &[String]) -> Result<Post> {
        let mut tx = self.db.begin().await?;

        let result = sqlx::query(
            "INSERT INTO posts (title, title_key, text, likes_count, comments_count) VALUES (?, ?, ?, 0, 0)"
        )
        .bind(title)
        .bind(fold_case(title))
        .bind(text)
        .execute(&mut *tx)
        .await?;
        let id = result.last_insert_rowid();

        let tags = Self::replace_tags(&mut tx, id, tag_names).await?;
        tx.commit().await?;

        tracing::info!("Created post {} with {} tags", id, tags.len());
        Ok(Post {
            id,
            title: title.to_string(),
            text: text.to_string(),
            likes_count: 0,
            comments_count: 0,
            tags,
        })
    }

    /// Replace title, text and tag set of an existing post
    pub async fn update(&self, id: i64, title: &str, text: &str, tag_names: &[String]) -> Result<Post> {
        let mut tx = self.db.begin().await?;

        let result = sqlx::query("UPDATE posts SET title = ?, title_key = ?, text = ? WHERE id = ?")
            .bind(title)
            .bind(fold_case(title))
            .bind(text)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::post_not_found(id));
        }

        Self::replace_tags(&mut tx, id, tag_names).await?;
        tx.commit().await?;

        tracing::info!("Updated post {}", id);
        self.find_by_id(id).await?.ok_or_else(|| Error::post_not_found(id))
    }

    /// 删除文章及其评论、图片、标签关联
    pub async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.db.begin().await?;

        let comments = sqlx::query("DELETE FROM comments WHERE post_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let images = sqlx::query("DELETE FROM post_images WHERE post_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM posts_tags WHERE post_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Err(Error::post_not_found(id));
        }

        tx.commit().await?;
        tracing::info!("Deleted post {} ({} comments, {} images)", id, comments, images);
        Ok(())
    }

    /// Add one like and return the new count
    pub async fn increment_likes(&self, id: i64) -> Result<i64> {
        let likes: Option<i64> = sqlx::query_scalar(
            "UPDATE posts SET likes_count = likes_count + 1 WHERE id = ? RETURNING likes_count"
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        likes.ok_or_else(|| Error::post_not_found(id))
    }

    async fn replace_tags(tx: &mut Transaction<'_, Sqlite>, post_id: i64, tag_names: &[String]) -> Result<BTreeSet<Tag>> {
        sqlx::query("DELETE FROM posts_tags WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut **tx)
            .await?;

        let mut tags = BTreeSet::new();
        for name in tag_names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            let tag = TagRepository::get_or_create(tx, name).await?;
            if tags.contains(&tag) {
                continue;
            }
            sqlx::query("INSERT INTO posts_tags (post_id, tag_id) VALUES (?, ?)")
                .bind(post_id)
                .bind(tag.id)
                .execute(&mut **tx)
                .await?;
            tags.insert(tag);
        }

        Ok(tags)
    }
}
