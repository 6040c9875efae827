//! 1-based pagination / 分页

use crate::config::PaginationConfig;

/// Normalized page request. Page numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page_number: u32,
    page_size: u32,
}

impl Pagination {
    pub const DEFAULT_PAGE_SIZE: u32 = 20;
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Clamp caller input: page < 1 -> 1, size <= 0 -> 20, size > 100 -> 100
    pub fn normalize(page_number: i64, page_size: i64) -> Self {
        Self::normalize_with(page_number, page_size, Self::DEFAULT_PAGE_SIZE, Self::MAX_PAGE_SIZE)
    }

    /// Same rules with limits taken from configuration
    pub fn from_config(page_number: i64, page_size: i64, config: &PaginationConfig) -> Self {
        Self::normalize_with(page_number, page_size, config.default_page_size, config.max_page_size)
    }

    fn normalize_with(page_number: i64, page_size: i64, default_size: u32, max_size: u32) -> Self {
        let max_size = max_size.max(1);
        let page_number = page_number.clamp(1, u32::MAX as i64) as u32;
        let page_size = if page_size <= 0 {
            default_size.clamp(1, max_size)
        } else {
            page_size.min(max_size as i64) as u32
        };
        Self { page_number, page_size }
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Rows to skip: (page - 1) * size
    pub fn offset(&self) -> u64 {
        (self.page_number as u64 - 1) * self.page_size as u64
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }
}

/// One page of results plus the totals needed for page controls
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub page_number: u32,
    pub page_size: u32,
}

impl<T> PageResult<T> {
    pub fn new(content: Vec<T>, total_elements: u64, pagination: Pagination) -> Self {
        Self {
            content,
            total_elements,
            page_number: pagination.page_number(),
            page_size: pagination.page_size(),
        }
    }

    /// ceil(total / size); zero when nothing matched
    pub fn total_pages(&self) -> u64 {
        if self.total_elements == 0 || self.page_size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(self.page_size as u64)
    }

    pub fn has_prev(&self) -> bool {
        self.page_number > 1 && self.total_pages() > 0
    }

    pub fn has_next(&self) -> bool {
        (self.page_number as u64) < self.total_pages()
    }

    pub fn map<U, F>(self, f: F) -> PageResult<U>
    where
        F: FnMut(T) -> U,
    {
        PageResult {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            page_number: self.page_number,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bounds() {
        let p = Pagination::normalize(-3, 500);
        assert_eq!(p.page_number(), 1);
        assert_eq!(p.page_size(), 100);

        let p = Pagination::normalize(0, 0);
        assert_eq!(p.page_number(), 1);
        assert_eq!(p.page_size(), 20);

        let p = Pagination::normalize(4, -1);
        assert_eq!(p.page_number(), 4);
        assert_eq!(p.page_size(), 20);

        let p = Pagination::normalize(2, 100);
        assert_eq!(p.page_size(), 100);
    }

    #[test]
    fn test_offset() {
        assert_eq!(Pagination::normalize(1, 10).offset(), 0);
        assert_eq!(Pagination::normalize(2, 10).offset(), 10);
        assert_eq!(Pagination::normalize(3, 7).offset(), 14);
    }

    #[test]
    fn test_from_config() {
        let config = PaginationConfig { default_page_size: 5, max_page_size: 50 };
        assert_eq!(Pagination::from_config(1, 0, &config).page_size(), 5);
        assert_eq!(Pagination::from_config(1, 80, &config).page_size(), 50);
    }

    #[test]
    fn test_total_pages() {
        let page: PageResult<i64> = PageResult::new(vec![], 15, Pagination::normalize(1, 10));
        assert_eq!(page.total_pages(), 2);

        let page: PageResult<i64> = PageResult::new(vec![], 20, Pagination::normalize(1, 10));
        assert_eq!(page.total_pages(), 2);

        let page: PageResult<i64> = PageResult::new(vec![], 21, Pagination::normalize(1, 10));
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_zero_elements_means_zero_pages() {
        for size in [1, 10, 100] {
            let page: PageResult<i64> = PageResult::new(vec![], 0, Pagination::normalize(1, size));
            assert_eq!(page.total_pages(), 0);
            assert!(!page.has_prev());
            assert!(!page.has_next());
        }
    }

    #[test]
    fn test_prev_next_flags() {
        let first: PageResult<i64> = PageResult::new(vec![], 15, Pagination::normalize(1, 10));
        assert!(!first.has_prev());
        assert!(first.has_next());

        let last: PageResult<i64> = PageResult::new(vec![], 15, Pagination::normalize(2, 10));
        assert!(last.has_prev());
        assert!(!last.has_next());

        let beyond: PageResult<i64> = PageResult::new(vec![], 15, Pagination::normalize(3, 10));
        assert!(beyond.has_prev());
        assert!(!beyond.has_next());
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = PageResult::new(vec![1, 2, 3], 13, Pagination::normalize(2, 3));
        let mapped = page.map(|n| n.to_string());
        assert_eq!(mapped.content, vec!["1", "2", "3"]);
        assert_eq!(mapped.total_elements, 13);
        assert_eq!(mapped.page_number, 2);
        assert_eq!(mapped.total_pages(), 5);
    }
}
