//! Page arithmetic for the visible item sequence.

/// How the page indicator is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginatorKind {
    /// `•○○`, one glyph per page
    Dots,
    /// `2/17`
    Arabic,
}

/// Fixed-size pages over a sequence whose length changes as items arrive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    per_page: usize,
    total_pages: usize,
}

impl Paginator {
    pub const ACTIVE_DOT: &'static str = "•";
    pub const INACTIVE_DOT: &'static str = "○";

    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
            total_pages: 1,
        }
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn set_per_page(&mut self, per_page: usize) {
        self.per_page = per_page.max(1);
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Recompute the page count for `len` items. An empty sequence still has one page.
    pub fn set_total_pages(&mut self, len: usize) {
        self.total_pages = len.div_ceil(self.per_page).max(1);
    }

    /// Page that contains item position `index`.
    pub fn page_of(&self, index: usize) -> usize {
        (index / self.per_page).min(self.total_pages - 1)
    }

    /// `[start, end)` bounds of `page` within a sequence of `len` items.
    pub fn slice_bounds(&self, page: usize, len: usize) -> (usize, usize) {
        let start = (page * self.per_page).min(len);
        let end = (start + self.per_page).min(len);
        (start, end)
    }

    /// Number of items shown on `page`.
    pub fn items_on_page(&self, page: usize, len: usize) -> usize {
        let (start, end) = self.slice_bounds(page, len);
        end - start
    }

    pub fn is_last_page(&self, page: usize) -> bool {
        page + 1 >= self.total_pages
    }

    /// Pick dots when one glyph per page fits in `width` columns.
    pub fn kind_for_width(&self, width: usize) -> PaginatorKind {
        if self.total_pages <= width {
            PaginatorKind::Dots
        } else {
            PaginatorKind::Arabic
        }
    }

    pub fn view(&self, page: usize, kind: PaginatorKind) -> String {
        match kind {
            PaginatorKind::Dots => (0..self.total_pages)
                .map(|p| {
                    if p == page {
                        Self::ACTIVE_DOT
                    } else {
                        Self::INACTIVE_DOT
                    }
                })
                .collect(),
            PaginatorKind::Arabic => format!("{}/{}", page + 1, self.total_pages),
        }
    }
}
