//! Storage module / 存储模块
//!
//! - `PostStore`: read interface the search engine depends on
//! - `SqlitePostStore`: the SQLite implementation of it
//! - repositories for post/tag/comment/image writes and lookups

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};

use crate::error::Result;
use crate::models::{Post, Tag};
use crate::search::SearchCriteria;

pub mod comments;
pub mod images;
pub mod posts;
pub mod search;
pub mod tags;

pub use comments::CommentRepository;
pub use images::ImageRepository;
pub use posts::PostRepository;
pub use search::SqlitePostStore;
pub use tags::TagRepository;

/// Post rows keyed by id -> their tag sets
pub type PostTags = HashMap<i64, BTreeSet<Tag>>;

/// Read side of post storage used by search / 搜索使用的存储接口
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Number of posts matching the criteria
    async fn count_matching(&self, criteria: &SearchCriteria) -> Result<u64>;

    /// Matching posts, newest id first, without tags
    async fn fetch_page(&self, criteria: &SearchCriteria, offset: u64, limit: u32) -> Result<Vec<Post>>;

    /// Tags of the given posts in one query. Posts without tags are absent.
    async fn fetch_tags_for_post_ids(&self, ids: &[i64]) -> Result<PostTags>;
}
