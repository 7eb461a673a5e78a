//! Page arithmetic and the listing paginator.

use std::fmt;
use std::sync::Arc;

use tracing::instrument;

use crate::application::ApplicationResult;
use crate::domain::{DomainError, DomainResult, ListingRow, ProductQuery, Window};
use crate::infrastructure::traits::CatalogStore;

/// Window covering the 1-indexed `page` of size `per_page`.
pub fn page_window(page: u32, per_page: u32) -> DomainResult<Window> {
    if page == 0 {
        return Err(DomainError::InvalidPage(page));
    }
    if per_page == 0 {
        return Err(DomainError::InvalidPageSize(0));
    }
    Ok(Window {
        offset: (page as usize - 1) * per_page as usize,
        limit: per_page as usize,
    })
}

/// Number of pages needed for `total` rows; zero rows need zero pages.
pub fn page_count(total: usize, per_page: u32) -> usize {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page as usize)
}

/// Validate a caller-supplied page size.
pub fn checked_page_size(per_page: i64) -> DomainResult<u32> {
    u32::try_from(per_page)
        .ok()
        .filter(|&n| n >= 1)
        .ok_or(DomainError::InvalidPageSize(per_page))
}

/// Lazily evaluated, paged view of a product query.
///
/// Every call goes back to the store, so results reflect the state committed
/// at call time.
#[derive(Clone)]
pub struct Paginator {
    store: Arc<dyn CatalogStore>,
    query: ProductQuery,
    page: u32,
    per_page: u32,
}

impl fmt::Debug for Paginator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginator")
            .field("query", &self.query)
            .field("page", &self.page)
            .field("per_page", &self.per_page)
            .finish()
    }
}

impl Paginator {
    pub(crate) fn new(
        store: Arc<dyn CatalogStore>,
        query: ProductQuery,
        page: u32,
        per_page: u32,
    ) -> DomainResult<Self> {
        // validates both numbers
        page_window(page, per_page)?;
        Ok(Self {
            store,
            query,
            page,
            per_page,
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn query(&self) -> &ProductQuery {
        &self.query
    }

    /// Total rows matching the query in its display mode.
    pub fn count(&self) -> ApplicationResult<usize> {
        self.store.count(&self.query)
    }

    pub fn page_count(&self) -> ApplicationResult<usize> {
        Ok(page_count(self.count()?, self.per_page))
    }

    /// Rows of the given 1-indexed page; past the last page this is empty.
    #[instrument(level = "debug", skip(self))]
    pub fn items(&self, page: u32) -> ApplicationResult<Vec<ListingRow>> {
        let window = page_window(page, self.per_page)?;
        self.store.search(&self.query, Some(window))
    }

    /// Rows of the page this paginator was created for.
    pub fn current_items(&self) -> ApplicationResult<Vec<ListingRow>> {
        self.items(self.page)
    }

    /// Every row in order. Meant for verification, not for walking large sets.
    pub fn all_items(&self) -> ApplicationResult<Vec<ListingRow>> {
        self.store.search(&self.query, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 10, 0)]
    #[case(1, 10, 1)]
    #[case(10, 10, 1)]
    #[case(11, 10, 2)]
    #[case(100, 7, 15)]
    fn given_total_when_counting_pages_then_rounds_up(
        #[case] total: usize,
        #[case] per_page: u32,
        #[case] pages: usize,
    ) {
        assert_eq!(page_count(total, per_page), pages);
    }

    #[test]
    fn given_page_three_when_windowing_then_skips_two_pages() {
        assert_eq!(
            page_window(3, 10).unwrap(),
            Window {
                offset: 20,
                limit: 10
            }
        );
    }

    #[rstest]
    #[case(0)]
    #[case(-5)]
    fn given_non_positive_page_size_when_checking_then_invalid_page_size(#[case] per_page: i64) {
        assert_eq!(
            checked_page_size(per_page),
            Err(DomainError::InvalidPageSize(per_page))
        );
    }

    #[test]
    fn given_page_zero_when_windowing_then_invalid_page() {
        assert_eq!(page_window(0, 10), Err(DomainError::InvalidPage(0)));
    }
}
