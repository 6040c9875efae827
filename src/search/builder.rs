//! SQL builder for post searches.
//!
//! Builds one filtered base statement from `SearchCriteria`:
//! - tag filter joins `posts_tags`/`tags`, keeps rows whose folded tag name
//!   (`tags.name_key`) is requested, then groups per post and requires the
//!   number of distinct matched tags to equal the requested count (ALL semantics)
//! - free text filter is a substring test on the folded title (`posts.title_key`)
//!
//! Both sides of each comparison are folded by `fold_case` before they reach SQL.
//!
//! Count and page statements wrap the same base so both see one predicate.
//! Values are always bound, never spliced into the SQL text.

use super::query::{fold_case, SearchCriteria};

const POST_COLUMNS: &str = "p.id, p.title, p.text, p.likes_count, p.comments_count";

/// Bind values for `sqlx` queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    Int(i64),
}

/// SQL text plus positional binds, in placeholder order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlQuery {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

/// Builds count and page statements for one set of criteria
#[derive(Debug)]
pub struct PostQueryBuilder<'a> {
    criteria: &'a SearchCriteria,
}

impl<'a> PostQueryBuilder<'a> {
    pub fn new(criteria: &'a SearchCriteria) -> Self {
        Self { criteria }
    }

    /// `SELECT COUNT(*)` over the filtered base, unaffected by LIMIT/OFFSET
    pub fn count_query(&self) -> SqlQuery {
        let base = self.base_query();
        SqlQuery {
            sql: format!("SELECT COUNT(*) FROM ({}) AS count_query", base.sql),
            binds: base.binds,
        }
    }

    /// Newest-first page of post rows (no tags attached)
    pub fn page_query(&self, offset: u64, limit: u32) -> SqlQuery {
        let mut query = self.base_query();
        query.sql.push_str(" ORDER BY p.id DESC LIMIT ? OFFSET ?");
        query.binds.push(BindValue::Int(limit as i64));
        query.binds.push(BindValue::Int(offset.min(i64::MAX as u64) as i64));
        query
    }

    fn base_query(&self) -> SqlQuery {
        let criteria = self.criteria;
        let mut sql = format!("SELECT {} FROM posts p", POST_COLUMNS);
        let mut binds = Vec::new();
        let mut conditions: Vec<String> = Vec::new();

        if criteria.has_tags() {
            sql.push_str(" INNER JOIN posts_tags pt ON p.id = pt.post_id");
            sql.push_str(" INNER JOIN tags t ON pt.tag_id = t.id");
        }

        if criteria.has_query() {
            conditions.push("p.title_key LIKE ? ESCAPE '\\'".to_string());
            binds.push(BindValue::Text(contains_pattern(criteria.query())));
        }

        if criteria.has_tags() {
            conditions.push(format!("t.name_key IN ({})", placeholders(criteria.tag_count())));
            binds.extend(criteria.tags().iter().map(|t| BindValue::Text(fold_case(t))));
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        if criteria.has_tags() {
            sql.push_str(&format!(" GROUP BY {}", POST_COLUMNS));
            sql.push_str(" HAVING COUNT(DISTINCT t.name_key) = ?");
            binds.push(BindValue::Int(criteria.tag_count() as i64));
        }

        SqlQuery { sql, binds }
    }
}

/// `%text%` with LIKE metacharacters escaped, case folded
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in fold_case(text).chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// `?, ?, ?` for an IN list of `n` values
pub fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
