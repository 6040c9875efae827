//! Paginated post search / 文章分页搜索
//!
//! One search = normalize paging, count matches, fetch one page, attach tags.
//! Count and fetch are separate reads; under concurrent writes they may
//! disagree slightly, which callers accept.

use crate::error::Result;
use crate::models::Post;
use crate::storage::PostStore;

use super::assembler::PostAssembler;
use super::page::{PageResult, Pagination};
use super::query::SearchCriteria;

/// Stateless search service over a `PostStore`
#[derive(Clone)]
pub struct PostSearchEngine<S> {
    store: S,
}

impl<S: PostStore> PostSearchEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Search with raw caller paging (normalized before querying)
    pub async fn search(&self, criteria: &SearchCriteria, page_number: i64, page_size: i64) -> Result<PageResult<Post>> {
        self.search_page(criteria, Pagination::normalize(page_number, page_size)).await
    }

    /// Search with an already-normalized page request
    pub async fn search_page(&self, criteria: &SearchCriteria, pagination: Pagination) -> Result<PageResult<Post>> {
        let total = self.store.count_matching(criteria).await?;

        let mut posts = self.store
            .fetch_page(criteria, pagination.offset(), pagination.limit())
            .await?;

        PostAssembler::new(&self.store).attach_tags(&mut posts).await?;

        tracing::debug!(
            "Search query={:?} tags={:?} page={} size={} -> {} of {}",
            criteria.query(),
            criteria.tags(),
            pagination.page_number(),
            pagination.page_size(),
            posts.len(),
            total
        );

        Ok(PageResult::new(posts, total, pagination))
    }
}
