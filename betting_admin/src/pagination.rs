//! Page requests and paginated results.

use serde::{Deserialize, Serialize};

/// Default page number
pub const DEFAULT_PAGE_NUMBER: u32 = 1;

/// Default page size
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Upper bound on page size
pub const MAX_PER_PAGE: u32 = 100;

/// Requested page, as read from the `pageNumber`/`perpage` query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(rename = "pageNumber", default = "default_page_number")]
    pub page_number: u32,
    #[serde(default = "default_per_page")]
    pub perpage: u32,
}

fn default_page_number() -> u32 {
    DEFAULT_PAGE_NUMBER
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: DEFAULT_PAGE_NUMBER,
            perpage: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    pub fn new(page_number: u32, perpage: u32) -> Self {
        Self {
            page_number,
            perpage,
        }
        .normalized()
    }

    /// Clamp out-of-range values: page numbers start at 1 and page sizes lie
    /// in `1..=MAX_PER_PAGE`.
    pub fn normalized(self) -> Self {
        Self {
            page_number: self.page_number.max(1),
            perpage: self.perpage.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Rows to skip
    pub fn offset(&self) -> i64 {
        let page = self.normalized();
        i64::from(page.page_number - 1) * i64::from(page.perpage)
    }

    /// Rows to return
    pub fn limit(&self) -> i64 {
        i64::from(self.normalized().perpage)
    }
}

/// One page of results plus the totals needed to navigate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub perpage: u32,
    pub total_items: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: i64) -> Self {
        let request = request.normalized();
        let per = i64::from(request.perpage);
        Self {
            items,
            page_number: request.page_number,
            perpage: request.perpage,
            total_items,
            total_pages: (total_items + per - 1) / per,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            perpage: self.perpage,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    pub fn has_next(&self) -> bool {
        i64::from(self.page_number) < self.total_pages
    }

    /// Link to the previous page, or `None` on the first page
    pub fn previous_link(&self, path: &str) -> Option<String> {
        self.has_previous()
            .then(|| page_link(path, self.page_number - 1, self.perpage))
    }

    /// Link to the next page, or `None` on the last page
    pub fn next_link(&self, path: &str) -> Option<String> {
        self.has_next()
            .then(|| page_link(path, self.page_number + 1, self.perpage))
    }
}

fn page_link(path: &str, page_number: u32, perpage: u32) -> String {
    format!("{path}?pageNumber={page_number}&perpage={perpage}")
}

/// Cut a page out of an in-memory list
pub fn slice_page<T: Clone>(items: &[T], request: &PageRequest) -> Vec<T> {
    items
        .iter()
        .skip(request.offset() as usize)
        .take(request.limit() as usize)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req: PageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req, PageRequest::default());
        assert_eq!(req.offset(), 0);
        assert_eq!(req.limit(), 10);
    }

    #[test]
    fn test_query_names() {
        let req: PageRequest = serde_json::from_str(r#"{"pageNumber":3,"perpage":20}"#).unwrap();
        assert_eq!(req.page_number, 3);
        assert_eq!(req.offset(), 40);
        assert_eq!(req.limit(), 20);
    }

    #[test]
    fn test_normalization() {
        let req = PageRequest::new(0, 5000);
        assert_eq!(req.page_number, 1);
        assert_eq!(req.perpage, MAX_PER_PAGE);

        let req = PageRequest::new(2, 0);
        assert_eq!(req.perpage, 1);
        assert_eq!(req.offset(), 1);
    }

    #[test]
    fn test_total_pages() {
        let page = Page::new(vec![1, 2, 3], PageRequest::new(1, 3), 7);
        assert_eq!(page.total_pages, 3);

        let page: Page<i32> = Page::new(vec![], PageRequest::default(), 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_links() {
        let page = Page::new(vec![4, 5], PageRequest::new(2, 2), 5);
        assert_eq!(
            page.previous_link("/api/v1/admin/bets").as_deref(),
            Some("/api/v1/admin/bets?pageNumber=1&perpage=2")
        );
        assert_eq!(
            page.next_link("/api/v1/admin/bets").as_deref(),
            Some("/api/v1/admin/bets?pageNumber=3&perpage=2")
        );

        let last = Page::new(vec![5], PageRequest::new(3, 2), 5);
        assert!(last.next_link("/x").is_none());
    }

    #[test]
    fn test_slice_page() {
        let items: Vec<i32> = (1..=25).collect();
        assert_eq!(slice_page(&items, &PageRequest::new(3, 10)), vec![
            21, 22, 23, 24, 25
        ]);
        assert!(slice_page(&items, &PageRequest::new(4, 10)).is_empty());
    }
}
