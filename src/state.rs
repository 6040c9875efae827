use sqlx::SqlitePool;
use myblog_backend::config::AppConfig;
use myblog_backend::search::PostSearchEngine;
use myblog_backend::storage::{CommentRepository, ImageRepository, PostRepository, SqlitePostStore, TagRepository};

/// Shared application state / 应用共享状态
pub struct AppState {
    pub config: AppConfig,
    pub search: PostSearchEngine<SqlitePostStore>,
    pub posts: PostRepository,
    pub tags: TagRepository,
    pub comments: CommentRepository,
    pub images: ImageRepository,
}

impl AppState {
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        Self {
            config,
            search: PostSearchEngine::new(SqlitePostStore::new(db.clone())),
            posts: PostRepository::new(db.clone()),
            tags: TagRepository::new(db.clone()),
            comments: CommentRepository::new(db.clone()),
            images: ImageRepository::new(db),
        }
    }
}
