//! Pagination envelope
//!
//! List endpoints answer with one of two shapes:
//!
//! ```json
//! { "items": [...], "total": 42, "page": 1, "totalPages": 5 }
//! { "content": [...], "totalElements": 42, "number": 1, "totalPages": 5 }
//! ```
//!
//! Both deserialize into [`Page`]. The second shape counts pages from 0;
//! `number` is shifted so [`Page::page`] is always 1-based.

use serde::{Deserialize, Serialize};

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    from = "RawPage<T>",
    bound(deserialize = "T: Deserialize<'de>")
)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    /// 1-based page number
    pub page: u32,
    pub total_pages: u32,
}

/// Wire form accepting either envelope
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPage<T> {
    #[serde(alias = "content")]
    items: Vec<T>,
    #[serde(default, alias = "totalElements")]
    total: u64,
    #[serde(default)]
    page: Option<u32>,
    /// 0-based index
    #[serde(default)]
    number: Option<u32>,
    #[serde(default, alias = "total_pages")]
    total_pages: u32,
}

impl<T> From<RawPage<T>> for Page<T> {
    fn from(raw: RawPage<T>) -> Self {
        let page = raw
            .page
            .or_else(|| raw.number.map(|n| n.saturating_add(1)))
            .unwrap_or(1);
        Self::new(raw.items, raw.total, page, raw.total_pages)
    }
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32, total_pages: u32) -> Self {
        Self {
            items,
            total,
            page,
            total_pages,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, 1, 0)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            total_pages: self.total_pages,
        }
    }
}

/// Query for paged list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, size: 20 }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: page.max(1),
            size: size.max(1),
        }
    }

    pub fn next(&self) -> Self {
        Self::new(self.page + 1, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_shape() {
        let json = r#"{"items": [1, 2], "total": 12, "page": 1, "totalPages": 6}"#;
        let page: Page<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.total_pages, 6);
        assert!(page.has_next());
    }

    #[test]
    fn test_content_shape() {
        let json = r#"{"content": [3], "totalElements": 1, "number": 0, "totalPages": 1}"#;
        let page: Page<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(page.items, vec![3]);
        assert_eq!(page.total, 1);
        assert_eq!(page.page, 1);
        assert!(!page.has_next());
    }

    #[test]
    fn test_content_shape_number_is_zero_based() {
        let json = r#"{"content": [], "totalElements": 45, "number": 1, "totalPages": 3}"#;
        let page: Page<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(page.page, 2);
        assert!(page.has_next());

        let last = r#"{"content": [], "totalElements": 45, "number": 2, "totalPages": 3}"#;
        assert!(!serde_json::from_str::<Page<u32>>(last).unwrap().has_next());
    }

    #[test]
    fn test_missing_page_defaults_to_first() {
        let page: Page<u32> = serde_json::from_str(r#"{"items": [], "totalPages": 2}"#).unwrap();
        assert_eq!(page.page, 1);
        assert!(page.has_next());
    }

    #[test]
    fn test_page_request_clamps() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req, PageRequest { page: 1, size: 1 });
        assert_eq!(req.next().page, 2);
    }
}
