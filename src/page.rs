//! Pagination value types for change-history queries.

use serde::{Deserialize, Serialize};

/// Default page size for change-history listings.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// A request for one page of results. Page numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page_number: usize,
    pub page_size: usize,
}

impl PageRequest {
    /// Build a request, clamping both fields to at least 1.
    pub fn new(page_number: usize, page_size: usize) -> Self {
        Self {
            page_number: page_number.max(1),
            page_size: page_size.max(1),
        }
    }

    /// The first page at the default size.
    pub fn first_page() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first_page()
    }
}

/// One page of results plus enough metadata to render pagination controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub page_number: usize,
    pub page_count: usize,
    pub total_elements: usize,
    pub elements: Vec<T>,
}

impl<T> Page<T> {
    /// An empty first page.
    pub fn empty() -> Self {
        Self {
            page_number: 1,
            page_count: 1,
            total_elements: 0,
            elements: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_fields_are_clamped() {
        let request = PageRequest::new(0, 0);
        assert_eq!(request.page_number, 1);
        assert_eq!(request.page_size, 1);
    }

    #[test]
    fn first_page_uses_default_size() {
        let request = PageRequest::first_page();
        assert_eq!(request.page_number, 1);
        assert_eq!(request.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn empty_page_reports_one_page_of_nothing() {
        let page: Page<u32> = Page::empty();
        assert_eq!(page.page_count, 1);
        assert_eq!(page.total_elements, 0);
        assert!(page.elements.is_empty());
    }
}
