use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use crate::search::fold_case;

/// Blog post row. `tags` is not a column; it is attached after loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub likes_count: i64,
    pub comments_count: i64,
    #[sqlx(skip)]
    pub tags: BTreeSet<Tag>,
}

/// Tag row. Equality, ordering and hashing go by `id` only.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Tag {}

impl PartialOrd for Tag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub text: String,
}

/// Binary image attached to a post (at most one per post)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostImage {
    pub post_id: i64,
    pub data: Vec<u8>,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostRequest {
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentRequest {
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
    pub likes_count: i64,
    pub comments_count: i64,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        let mut tags: Vec<String> = post.tags.into_iter().map(|t| t.name).collect();
        tags.sort_by_cached_key(|name| fold_case(name));
        Self {
            id: post.id,
            title: post.title,
            text: post.text,
            tags,
            likes_count: post.likes_count,
            comments_count: post.comments_count,
        }
    }
}

/// One page of the post listing / 文章列表分页响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsResponse {
    pub posts: Vec<PostResponse>,
    pub has_prev: bool,
    pub has_next: bool,
    pub last_page: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i64,
    pub post_id: i64,
    pub text: String,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            text: comment.text,
        }
    }
}
