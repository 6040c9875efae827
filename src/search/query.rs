//! Search query parser / 搜索查询解析
//!
//! Splits a raw search string into free text and `#tag` filters:
//! - `"java #Spring"` -> query `"java"`, tags `["spring"]`
//! - tags are lowercased and deduplicated in first-seen order
//! - plain words keep their original case and order

/// Parsed search intent. The presence flags always agree with the content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    query: String,
    tags: Vec<String>,
}

impl SearchCriteria {
    /// Criteria that match every post
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_query(&self) -> bool {
        !self.query.is_empty()
    }

    /// Free text, empty when `has_query()` is false
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn has_tags(&self) -> bool {
        !self.tags.is_empty()
    }

    /// Lowercased tag names without duplicates
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Number of tags a post must carry to match
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }
}

/// Unicode lowercase used for every case-insensitive comparison.
/// Stored keys (`posts.title_key`, `tags.name_key`) are written with it too,
/// so SQL only compares already-folded text.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Parse a raw search string / 解析搜索字符串
pub fn parse_search(raw: Option<&str>) -> SearchCriteria {
    let raw = raw.map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return SearchCriteria::empty();
    }

    let mut words: Vec<&str> = Vec::new();
    let mut tags: Vec<String> = Vec::new();

    // split_whitespace 已经合并连续空白并丢弃空 token
    for token in raw.split_whitespace() {
        match token.strip_prefix('#') {
            Some(name) => {
                let name = fold_case(name);
                if !tags.contains(&name) {
                    tags.push(name);
                }
            }
            None => words.push(token),
        }
    }

    SearchCriteria {
        query: words.join(" "),
        tags,
    }
}
