use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

use crate::search::fold_case;

/// Open the SQLite pool (WAL mode, foreign keys on) / 打开数据库连接池
pub async fn connect_with(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await?;

    tracing::info!("Database connected: {} (max {} connections)", database_url, max_connections);
    Ok(pool)
}

/// Run database migrations / 运行数据库迁移
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            title_key TEXT NOT NULL DEFAULT '',
            text TEXT NOT NULL DEFAULT '',
            likes_count INTEGER NOT NULL DEFAULT 0,
            comments_count INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    // name_key = fold_case(name)，唯一索引在回填后创建
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            name_key TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts_tags (
            post_id INTEGER NOT NULL,
            tag_id INTEGER NOT NULL,
            PRIMARY KEY (post_id, tag_id),
            FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
            FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id INTEGER NOT NULL,
            text TEXT NOT NULL,
            FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS post_images (
            post_id INTEGER PRIMARY KEY,
            data BLOB NOT NULL,
            content_type TEXT,
            size_bytes INTEGER NOT NULL DEFAULT 0,
            filename TEXT,
            FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    add_column_if_missing(pool, "posts", "title_key", "TEXT NOT NULL DEFAULT ''").await?;
    add_column_if_missing(pool, "tags", "name_key", "TEXT NOT NULL DEFAULT ''").await?;
    backfill_case_keys(pool).await?;

    sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_tags_name_key ON tags(name_key)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_tags_tag ON posts_tags(tag_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id)")
        .execute(pool)
        .await?;

    tracing::info!("Database migration completed");

    Ok(())
}

async fn add_column_if_missing(pool: &SqlitePool, table: &str, column: &str, definition: &str) -> Result<()> {
    let sql = format!("SELECT COUNT(*) FROM pragma_table_info('{}') WHERE name = ?", table);
    let count: i32 = sqlx::query_scalar(&sql)
        .bind(column)
        .fetch_one(pool)
        .await?;

    if count == 0 {
        tracing::info!("Migration: Adding {} column to {}", column, table);
        sqlx::query(&format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, definition))
            .execute(pool)
            .await?;
    }
    Ok(())
}

/// 为旧数据补齐大小写折叠键
async fn backfill_case_keys(pool: &SqlitePool) -> Result<()> {
    let posts: Vec<(i64, String)> =
        sqlx::query_as("SELECT id, title FROM posts WHERE title_key = '' AND title != ''")
            .fetch_all(pool)
            .await?;
    for (id, title) in &posts {
        sqlx::query("UPDATE posts SET title_key = ? WHERE id = ?")
            .bind(fold_case(title))
            .bind(id)
            .execute(pool)
            .await?;
    }

    let tags: Vec<(i64, String)> =
        sqlx::query_as("SELECT id, name FROM tags WHERE name_key = '' AND name != ''")
            .fetch_all(pool)
            .await?;
    for (id, name) in &tags {
        sqlx::query("UPDATE tags SET name_key = ? WHERE id = ?")
            .bind(fold_case(name))
            .bind(id)
            .execute(pool)
            .await?;
    }

    if !posts.is_empty() || !tags.is_empty() {
        tracing::info!("Migration: Backfilled case keys ({} posts, {} tags)", posts.len(), tags.len());
    }
    Ok(())
}
