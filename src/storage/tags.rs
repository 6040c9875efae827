use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::Result;
use crate::models::Tag;
use crate::search::fold_case;

/// Tag lookups. Names are unique by `fold_case(name)` (`tags.name_key`).
#[derive(Clone)]
pub struct TagRepository {
    db: SqlitePool,
}

impl TagRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// All tags sorted by name ignoring case / 全部标签
    pub async fn find_all(&self) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY name_key, id")
            .fetch_all(&self.db)
            .await?;
        Ok(tags)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE name_key = ?")
            .bind(fold_case(name))
            .fetch_optional(&self.db)
            .await?;
        Ok(tag)
    }

    /// 获取或创建标签（忽略大小写）
    pub async fn get_or_create(tx: &mut Transaction<'_, Sqlite>, name: &str) -> Result<Tag> {
        let key = fold_case(name);
        let existing = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE name_key = ?")
            .bind(&key)
            .fetch_optional(&mut **tx)
            .await?;

        if let Some(tag) = existing {
            return Ok(tag);
        }

        let result = sqlx::query("INSERT INTO tags (name, name_key) VALUES (?, ?)")
            .bind(name)
            .bind(&key)
            .execute(&mut **tx)
            .await?;

        tracing::debug!("Created tag {:?}", name);
        Ok(Tag {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }
}
