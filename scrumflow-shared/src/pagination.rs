/// Page resolution for list endpoints
///
/// Page numbers arrive as raw query strings. Resolution is lenient:
///
/// - missing or non-numeric input selects the first page
/// - a number outside `1..=total_pages` selects the last page
/// - an empty collection still has one (empty) page
///
/// Counting and fetching happen in separate statements, so a page may be
/// slightly stale relative to the total when rows change concurrently.
///
/// # Example
///
/// ```
/// use scrumflow_shared::pagination::PageRequest;
///
/// let request = PageRequest::parse(Some("3"), 10);
/// let number = request.resolve(25);
/// assert_eq!(number, 3);
/// assert_eq!(request.offset(number), 20);
/// ```

use serde::Serialize;

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// A requested page, before it is clamped against the collection size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    requested: Option<i64>,
    page_size: i64,
}

impl PageRequest {
    /// Parses a raw `page` query value
    pub fn parse(raw: Option<&str>, page_size: i64) -> Self {
        Self {
            requested: raw.and_then(|value| value.trim().parse::<i64>().ok()),
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Total number of pages for a collection of `total_items`
    pub fn total_pages(&self, total_items: i64) -> i64 {
        if total_items <= 0 {
            return 1;
        }
        (total_items + self.page_size - 1) / self.page_size
    }

    /// Resolves the 1-based page number to serve
    pub fn resolve(&self, total_items: i64) -> i64 {
        let last = self.total_pages(total_items);
        match self.requested {
            None => 1,
            Some(n) if n < 1 || n > last => last,
            Some(n) => n,
        }
    }

    /// Row offset of a resolved page
    pub fn offset(&self, number: i64) -> i64 {
        (number - 1) * self.page_size
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, number: i64, total_items: i64) -> Self {
        let total_pages = request.total_pages(total_items);
        Self {
            items,
            page: number,
            page_size: request.page_size(),
            total_items,
            total_pages,
            has_next: number < total_pages,
            has_previous: number > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_or_garbage_page_is_first() {
        assert_eq!(PageRequest::parse(None, 10).resolve(35), 1);
        assert_eq!(PageRequest::parse(Some("abc"), 10).resolve(35), 1);
        assert_eq!(PageRequest::parse(Some(""), 10).resolve(35), 1);
    }

    #[test]
    fn test_out_of_range_page_is_last() {
        assert_eq!(PageRequest::parse(Some("99"), 10).resolve(35), 4);
        assert_eq!(PageRequest::parse(Some("0"), 10).resolve(35), 4);
        assert_eq!(PageRequest::parse(Some("-2"), 10).resolve(35), 4);
    }

    #[test]
    fn test_empty_collection_has_one_page() {
        let request = PageRequest::parse(Some("3"), 10);
        assert_eq!(request.total_pages(0), 1);
        assert_eq!(request.resolve(0), 1);
        assert_eq!(request.offset(1), 0);
    }

    #[test]
    fn test_page_flags() {
        let request = PageRequest::parse(Some("2"), 10);
        let page = Page::new(vec![1, 2, 3], &request, request.resolve(23), 23);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);
        assert!(page.has_previous);

        let last = Page::new(vec![1], &request, 3, 21);
        assert!(!last.has_next);
        assert_eq!(last.items, vec![1]);
    }

    #[test]
    fn test_page_size_is_at_least_one() {
        let request = PageRequest::parse(Some("1"), 0);
        assert_eq!(request.page_size(), 1);
        assert_eq!(request.total_pages(5), 5);
    }
}
