/// Pagination support for list queries
///
/// Standard pagination model used across all bounded contexts. Out-of-range
/// input is coerced at construction time, never propagated to the database.
use serde::{Deserialize, Serialize};

/// Requested page window, already coerced to valid values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Build a page request from untrusted input. `page` below 1 becomes 1;
    /// a missing or non-positive `page_size` becomes `default_size`.
    pub fn from_raw(page: Option<i64>, page_size: Option<i64>, default_size: u32) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p.min(u32::MAX as i64) as u32,
            _ => 1,
        };
        let page_size = match page_size {
            Some(s) if s >= 1 => s.min(u32::MAX as i64) as u32,
            _ => default_size,
        };
        Self { page, page_size }
    }

    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Offset for database queries
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }

    /// Limit for database queries
    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

/// Window metadata returned alongside every page of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
    pub total_items: u64,
    /// 1-based index of the first item on this page; 0 when the set is empty.
    pub start_index: u64,
    /// 1-based index of the last item on this page; 0 when the set is empty.
    pub end_index: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageInfo {
    pub fn new(total_items: u64, request: &PageRequest) -> Self {
        let page = request.page() as u64;
        let size = request.page_size() as u64;
        let total_pages = total_items.div_ceil(size) as u32;

        let (start_index, end_index) = if total_items == 0 || page > total_pages as u64 {
            (0, 0)
        } else {
            ((page - 1) * size + 1, (page * size).min(total_items))
        };

        Self {
            current_page: request.page(),
            total_pages,
            page_size: request.page_size(),
            total_items,
            start_index,
            end_index,
            has_next: request.page() < total_pages,
            has_prev: request.page() > 1 && total_pages > 0,
        }
    }
}

/// One page of an ordered, filtered result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_items: u64, request: &PageRequest) -> Self {
        Self {
            items,
            pagination: PageInfo::new(total_items, request),
        }
    }
}

/// In-memory composer: slice the page window out of a fully filtered and
/// sorted set. Used for the small taxonomy tables; the anime listing pushes
/// the window into SQL instead.
pub fn compose_page<T>(full_set: Vec<T>, request: &PageRequest) -> Page<T> {
    let total_items = full_set.len() as u64;
    let items: Vec<T> = full_set
        .into_iter()
        .skip(request.offset() as usize)
        .take(request.limit() as usize)
        .collect();
    Page::new(items, total_items, request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_below_one_is_coerced_to_one() {
        let req = PageRequest::from_raw(Some(0), Some(10), 10);
        assert_eq!(req.page(), 1);
        let req = PageRequest::from_raw(Some(-3), None, 12);
        assert_eq!(req.page(), 1);
        assert_eq!(req.page_size(), 12);
    }

    #[test]
    fn missing_page_size_takes_the_list_default() {
        let req = PageRequest::from_raw(None, None, 12);
        assert_eq!(req.page_size(), 12);
        let req = PageRequest::from_raw(None, Some(-5), 10);
        assert_eq!(req.page_size(), 10);
    }

    #[test]
    fn offset_and_limit() {
        let req = PageRequest::new(3, 12);
        assert_eq!(req.offset(), 24);
        assert_eq!(req.limit(), 12);
    }

    #[test]
    fn page_info_indices_are_one_based() {
        let info = PageInfo::new(25, &PageRequest::new(2, 10));
        assert_eq!(info.total_pages, 3);
        assert_eq!(info.start_index, 11);
        assert_eq!(info.end_index, 20);
        assert!(info.has_next);
        assert!(info.has_prev);
    }

    #[test]
    fn last_partial_page_ends_at_total() {
        let info = PageInfo::new(25, &PageRequest::new(3, 10));
        assert_eq!(info.start_index, 21);
        assert_eq!(info.end_index, 25);
        assert!(!info.has_next);
    }

    #[test]
    fn empty_set_has_zero_indices() {
        let info = PageInfo::new(0, &PageRequest::new(1, 10));
        assert_eq!(info.total_pages, 0);
        assert_eq!(info.start_index, 0);
        assert_eq!(info.end_index, 0);
        assert!(!info.has_next);
        assert!(!info.has_prev);
    }

    #[test]
    fn page_past_the_end_is_empty_but_keeps_totals() {
        let page = compose_page((1..=5).collect::<Vec<i32>>(), &PageRequest::new(4, 2));
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total_items, 5);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.pagination.start_index, 0);
    }

    #[test]
    fn concatenated_pages_reproduce_the_full_set() {
        let full: Vec<i32> = (1..=23).collect();
        let size = 7u32;
        let total_pages = PageInfo::new(full.len() as u64, &PageRequest::new(1, size)).total_pages;

        let mut rebuilt = Vec::new();
        for page in 1..=total_pages {
            let window = compose_page(full.clone(), &PageRequest::new(page, size));
            rebuilt.extend(window.items);
        }
        assert_eq!(rebuilt, full);
    }
}
