use serde::Deserialize;

use crate::modules::taxonomy::domain::NamedEntitySortBy;
use crate::shared::application::{PageRequest, SortOrder};

pub const TAXONOMY_PAGE_SIZE: u32 = 10;

/// Raw listing parameters as they arrive from the outer surface. Invalid
/// values coerce to defaults instead of erroring.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedEntityListRequest {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl NamedEntityListRequest {
    pub fn into_query(self) -> (Option<String>, NamedEntitySortBy, SortOrder, PageRequest) {
        let search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let sort_by = self
            .sort_by
            .as_deref()
            .map(NamedEntitySortBy::parse)
            .unwrap_or_default();
        let order = self
            .order
            .as_deref()
            .map(SortOrder::parse)
            .unwrap_or_default();
        let page = PageRequest::from_raw(self.page, self.page_size, TAXONOMY_PAGE_SIZE);
        (search, sort_by, order, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_is_dropped() {
        let request = NamedEntityListRequest {
            search: Some("   ".into()),
            ..Default::default()
        };
        let (search, sort_by, order, page) = request.into_query();
        assert_eq!(search, None);
        assert_eq!(sort_by, NamedEntitySortBy::Name);
        assert_eq!(order, SortOrder::Asc);
        assert_eq!(page.page_size(), TAXONOMY_PAGE_SIZE);
    }

    #[test]
    fn invalid_sort_and_order_fall_back() {
        let request = NamedEntityListRequest {
            sort_by: Some("nonsense".into()),
            order: Some("sideways".into()),
            page: Some(-3),
            ..Default::default()
        };
        let (_, sort_by, order, page) = request.into_query();
        assert_eq!(sort_by, NamedEntitySortBy::Name);
        assert_eq!(order, SortOrder::Asc);
        assert_eq!(page.offset(), 0);
    }
}
