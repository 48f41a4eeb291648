use serde::Serialize;

/// Page size used by list pages.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 12;

/// One-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Row offset of the first item on the page.
    pub fn offset(&self) -> usize {
        (self.page.max(1) - 1).saturating_mul(self.per_page)
    }
}

/// A page of items ready to be rendered.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: usize, total_items: usize, per_page: usize) -> Self {
        Self {
            items,
            page: page.max(1),
            total_pages: total_items.div_ceil(per_page.max(1)),
            total_items,
        }
    }

    /// Wraps an unpaginated list as a single page.
    pub fn single(items: Vec<T>) -> Self {
        let total_items = items.len();
        Self {
            items,
            page: 1,
            total_pages: usize::from(total_items > 0),
            total_items,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            total_pages: self.total_pages,
            total_items: self.total_items,
        }
    }
}
