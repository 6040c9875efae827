//! SQLite-backed `PostStore`

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{PostStore, PostTags};
use crate::error::Result;
use crate::models::{Post, Tag};
use crate::search::builder::{placeholders, BindValue, PostQueryBuilder};
use crate::search::{group_into_sets, SearchCriteria};

#[derive(Clone)]
pub struct SqlitePostStore {
    db: SqlitePool,
}

impl SqlitePostStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostStore for SqlitePostStore {
    async fn count_matching(&self, criteria: &SearchCriteria) -> Result<u64> {
        let query = PostQueryBuilder::new(criteria).count_query();
        tracing::debug!("Count query: {} ({} binds)", query.sql, query.binds.len());

        let mut count = sqlx::query_scalar::<_, i64>(&query.sql);
        for value in query.binds {
            count = match value {
                BindValue::Text(v) => count.bind(v),
                BindValue::Int(v) => count.bind(v),
            };
        }

        let total = count.fetch_one(&self.db).await?;
        Ok(total.max(0) as u64)
    }

    async fn fetch_page(&self, criteria: &SearchCriteria, offset: u64, limit: u32) -> Result<Vec<Post>> {
        let query = PostQueryBuilder::new(criteria).page_query(offset, limit);
        tracing::debug!("Page query: {} ({} binds)", query.sql, query.binds.len());

        let mut page = sqlx::query_as::<_, Post>(&query.sql);
        for value in query.binds {
            page = match value {
                BindValue::Text(v) => page.bind(v),
                BindValue::Int(v) => page.bind(v),
            };
        }

        Ok(page.fetch_all(&self.db).await?)
    }

    async fn fetch_tags_for_post_ids(&self, ids: &[i64]) -> Result<PostTags> {
        if ids.is_empty() {
            return Ok(PostTags::new());
        }

        let sql = format!(
            "SELECT pt.post_id, t.id, t.name FROM tags t \
             INNER JOIN posts_tags pt ON t.id = pt.tag_id \
             WHERE pt.post_id IN ({})",
            placeholders(ids.len())
        );

        let mut query = sqlx::query_as::<_, (i64, i64, String)>(&sql);
        for id in ids {
            query = query.bind(*id);
        }

        let rows = query.fetch_all(&self.db).await?;
        Ok(group_into_sets(
            rows.into_iter().map(|(post_id, id, name)| (post_id, Tag { id, name })),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::search::parse_search;
    use crate::storage::PostRepository;

    async fn setup() -> (SqlitePool, SqlitePostStore) {
        let pool = db::connect_with("sqlite::memory:", 1).await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        (pool.clone(), SqlitePostStore::new(pool))
    }

    async fn create(pool: &SqlitePool, title: &str, tags: &[&str]) -> i64 {
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        PostRepository::new(pool.clone())
            .create(title, "content", &tags)
            .await
            .unwrap()
            .id
    }

    async fn titles(store: &SqlitePostStore, raw: &str) -> Vec<String> {
        let criteria = parse_search(Some(raw));
        store
            .fetch_page(&criteria, 0, 100)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect()
    }

    #[tokio::test]
    async fn test_all_tags_required() {
        let (pool, store) = setup().await;
        create(&pool, "Post 1", &["Java", "Spring"]).await;
        create(&pool, "Post 2", &["Java"]).await;
        create(&pool, "Post 3", &["Spring"]).await;
        create(&pool, "Post 4", &["Java", "Spring", "Web"]).await;

        assert_eq!(titles(&store, "#java #spring").await, vec!["Post 4", "Post 1"]);
        assert_eq!(titles(&store, "#SPRING").await, vec!["Post 4", "Post 3", "Post 1"]);
        assert_eq!(titles(&store, "#java #spring #web").await, vec!["Post 4"]);
        assert!(titles(&store, "#java #missing").await.is_empty());

        let criteria = parse_search(Some("#java #spring"));
        assert_eq!(store.count_matching(&criteria).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_title_and_tags_combined() {
        let (pool, store) = setup().await;
        create(&pool, "Java Tutorial", &["Java", "Spring"]).await;
        create(&pool, "Java Guide", &["Java"]).await;
        create(&pool, "Spring Tutorial", &["Spring"]).await;

        assert_eq!(
            titles(&store, "tutorial #spring").await,
            vec!["Spring Tutorial", "Java Tutorial"]
        );
        assert_eq!(titles(&store, "TUTORIAL").await.len(), 2);
    }

    #[tokio::test]
    async fn test_like_wildcards_are_literal() {
        let (pool, store) = setup().await;
        create(&pool, "100% Rust", &[]).await;
        create(&pool, "1000 tips", &[]).await;
        create(&pool, "snake_case", &[]).await;
        create(&pool, "snakeXcase", &[]).await;

        assert_eq!(titles(&store, "100%").await, vec!["100% Rust"]);
        assert_eq!(titles(&store, "e_c").await, vec!["snake_case"]);
    }

    #[tokio::test]
    async fn test_non_ascii_title_and_tag_match_any_case() {
        let (pool, store) = setup().await;
        create(&pool, "Über Rust", &["Ärger"]).await;
        create(&pool, "Plain Rust", &["Rust"]).await;

        assert_eq!(titles(&store, "Über").await, vec!["Über Rust"]);
        assert_eq!(titles(&store, "über").await, vec!["Über Rust"]);
        assert_eq!(titles(&store, "ÜBER RUST").await, vec!["Über Rust"]);

        assert_eq!(titles(&store, "#Ärger").await, vec!["Über Rust"]);
        assert_eq!(titles(&store, "#ärger").await, vec!["Über Rust"]);
        assert_eq!(titles(&store, "über #ÄRGER").await, vec!["Über Rust"]);

        let criteria = parse_search(Some("#Ärger"));
        assert_eq!(store.count_matching(&criteria).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_count_ignores_limit() {
        let (pool, store) = setup().await;
        for i in 0..7 {
            create(&pool, &format!("Post {}", i), &["t"]).await;
        }
        let criteria = parse_search(Some("#t"));
        assert_eq!(store.count_matching(&criteria).await.unwrap(), 7);
        assert_eq!(store.fetch_page(&criteria, 5, 5).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_tags_batch() {
        let (pool, store) = setup().await;
        let a = create(&pool, "A", &["Java", "Spring"]).await;
        let b = create(&pool, "B", &[]).await;
        let c = create(&pool, "C", &["java"]).await;

        let tags = store.fetch_tags_for_post_ids(&[a, b, c]).await.unwrap();
        assert_eq!(tags.get(&a).map(|s| s.len()), Some(2));
        assert!(!tags.contains_key(&b));
        let c_tags: Vec<&str> = tags[&c].iter().map(|t| t.name.as_str()).collect();
        assert_eq!(c_tags, vec!["Java"]);

        assert!(store.fetch_tags_for_post_ids(&[]).await.unwrap().is_empty());
    }
}
