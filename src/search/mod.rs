//! Post search module / 文章搜索模块
//!
//! Flow / 流程：
//! raw string -> `parse_search` -> `SearchCriteria`
//! -> `PostSearchEngine` (count + page query via `PostStore`)
//! -> `PostAssembler` attaches tags -> `PageResult<Post>`
//!
//! Matching semantics / 匹配规则：
//! - free text: case-insensitive substring of the title
//! - `#tag` filters: a post must carry ALL requested tags
//! - order: post id descending (newest first)

pub mod assembler;
pub mod builder;
pub mod engine;
pub mod page;
pub mod query;

pub use assembler::{group_into_sets, PostAssembler};
pub use engine::PostSearchEngine;
pub use page::{PageResult, Pagination};
pub use query::{fold_case, parse_search, SearchCriteria};
