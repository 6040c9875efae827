use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::Comment;

/// Comments of a post. Adding/removing keeps `posts.comments_count` in step.
#[derive(Clone)]
pub struct CommentRepository {
    db: SqlitePool,
}

impl CommentRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, text FROM comments WHERE post_id = ? ORDER BY id ASC"
        )
        .bind(post_id)
        .fetch_all(&self.db)
        .await?;
        Ok(comments)
    }

    pub async fn find(&self, post_id: i64, comment_id: i64) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, text FROM comments WHERE post_id = ? AND id = ?"
        )
        .bind(post_id)
        .bind(comment_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(comment)
    }

    /// 添加评论并增加文章评论数
    pub async fn add(&self, post_id: i64, text: &str) -> Result<Comment> {
        let mut tx = self.db.begin().await?;

        let result = sqlx::query("INSERT INTO comments (post_id, text) VALUES (?, ?)")
            .bind(post_id)
            .bind(text)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE posts SET comments_count = comments_count + 1 WHERE id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let id = result.last_insert_rowid();
        tracing::info!("Added comment {} to post {}", id, post_id);
        Ok(Comment {
            id,
            post_id,
            text: text.to_string(),
        })
    }

    /// Returns `None` when the comment does not belong to the post
    pub async fn update(&self, post_id: i64, comment_id: i64, text: &str) -> Result<Option<Comment>> {
        let result = sqlx::query("UPDATE comments SET text = ? WHERE post_id = ? AND id = ?")
            .bind(text)
            .bind(post_id)
            .bind(comment_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        tracing::info!("Updated comment {} for post {}", comment_id, post_id);
        Ok(Some(Comment {
            id: comment_id,
            post_id,
            text: text.to_string(),
        }))
    }

    /// 删除评论并减少文章评论数（不小于0）
    pub async fn delete(&self, post_id: i64, comment_id: i64) -> Result<bool> {
        let mut tx = self.db.begin().await?;

        let deleted = sqlx::query("DELETE FROM comments WHERE post_id = ? AND id = ?")
            .bind(post_id)
            .bind(comment_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("UPDATE posts SET comments_count = MAX(comments_count - 1, 0) WHERE id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!("Deleted comment {} for post {}", comment_id, post_id);
        Ok(true)
    }
}
