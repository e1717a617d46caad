//! Append-only item store with selection, pagination and the active filter.

use crate::list::filter::{FilterEngine, FilterState, FilteredEntry, MatchOffsets};
use crate::list::item::DisplayItem;
use crate::list::paginator::Paginator;

/// One entry of the visible sequence, borrowed from the store.
#[derive(Debug, Clone, Copy)]
pub struct VisibleRow<'a> {
    /// Position within the visible (possibly filtered) sequence
    pub position: usize,
    /// Index within the store, i.e. arrival order
    pub index: usize,
    pub item: &'a DisplayItem,
    /// Matched offsets when a non-empty query is active
    pub offsets: Option<&'a MatchOffsets>,
}

/// Owns every decoded item for the session plus the view over them.
///
/// Items are stored in arrival order and never removed, reordered or deduplicated.
/// Selection is a position in the visible sequence; the current page is derived from it.
#[derive(Debug)]
pub struct ItemStore {
    items: Vec<DisplayItem>,
    engine: FilterEngine,
    filter: FilterState,
    /// `Some` only while a non-empty query is active
    matches: Option<Vec<FilteredEntry>>,
    selected: usize,
    paginator: Paginator,
    row_height: usize,
    row_spacing: usize,
    width: u16,
}

impl ItemStore {
    pub fn new(engine: FilterEngine, row_height: usize, row_spacing: usize) -> Self {
        Self {
            items: Vec::new(),
            engine,
            filter: FilterState::Inactive,
            matches: None,
            selected: 0,
            paginator: Paginator::new(1),
            row_height: row_height.max(1),
            row_spacing,
            width: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[DisplayItem] {
        &self.items
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    pub fn engine(&self) -> &FilterEngine {
        &self.engine
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn per_page(&self) -> usize {
        self.paginator.per_page()
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    /// Length of the visible sequence.
    pub fn visible_len(&self) -> usize {
        match &self.matches {
            Some(matches) => matches.len(),
            None => self.items.len(),
        }
    }

    pub fn visible_row(&self, position: usize) -> Option<VisibleRow<'_>> {
        match &self.matches {
            Some(matches) => matches.get(position).map(|entry| VisibleRow {
                position,
                index: entry.index,
                item: &self.items[entry.index],
                offsets: Some(&entry.offsets),
            }),
            None => self.items.get(position).map(|item| VisibleRow {
                position,
                index: position,
                item,
                offsets: None,
            }),
        }
    }

    /// Selected position in the visible sequence, `None` when nothing is visible.
    pub fn selected_position(&self) -> Option<usize> {
        (self.visible_len() > 0).then_some(self.selected)
    }

    pub fn selected_row(&self) -> Option<VisibleRow<'_>> {
        self.selected_position()
            .and_then(|position| self.visible_row(position))
    }

    pub fn current_page(&self) -> usize {
        if self.visible_len() == 0 {
            0
        } else {
            self.paginator.page_of(self.selected)
        }
    }

    pub fn total_pages(&self) -> usize {
        self.paginator.total_pages()
    }

    /// Rows of the current page, in visible order.
    pub fn page_rows(&self) -> Vec<VisibleRow<'_>> {
        let (start, end) = self
            .paginator
            .slice_bounds(self.current_page(), self.visible_len());
        (start..end)
            .filter_map(|position| self.visible_row(position))
            .collect()
    }

    pub fn append(&mut self, item: DisplayItem) {
        self.append_batch(std::iter::once(item));
    }

    /// Append a batch in order and jump to the newest visible item.
    ///
    /// While a query is being edited the selection stays put; the new items still join
    /// the filtered view if they match. Returns the number of items appended.
    pub fn append_batch(&mut self, batch: impl IntoIterator<Item = DisplayItem>) -> usize {
        let start = self.items.len();
        self.items.extend(batch);
        let appended = self.items.len() - start;
        if appended == 0 {
            return 0;
        }

        if let (Some(matches), Some(query)) = (self.matches.as_mut(), self.filter.query()) {
            matches.extend(self.engine.filter_from(&self.items, start, query));
        }
        self.refresh_pages();

        if !self.filter.is_editing() {
            self.goto_bottom();
        }
        appended
    }

    /// Move the selection by `delta`, clamped to the visible sequence.
    pub fn move_selection(&mut self, delta: isize) {
        let len = self.visible_len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(len - 1);
    }

    /// Keep the cursor's offset within the page while moving to the next page.
    pub fn next_page(&mut self) {
        let page = self.current_page();
        if self.paginator.is_last_page(page) {
            return;
        }
        self.jump_to_page(page + 1);
    }

    pub fn prev_page(&mut self) {
        let page = self.current_page();
        if page == 0 {
            return;
        }
        self.jump_to_page(page - 1);
    }

    pub fn goto_top(&mut self) {
        self.selected = 0;
    }

    pub fn goto_bottom(&mut self) {
        self.selected = self.visible_len().saturating_sub(1);
    }

    /// Recompute page size for a list area of `width` x `height` cells.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        let per_row = self.row_height + self.row_spacing;
        self.paginator
            .set_per_page((height as usize + self.row_spacing) / per_row);
        self.refresh_pages();
    }

    /// Enter filter editing, keeping any previously applied query.
    pub fn start_filter(&mut self) {
        let query = self.filter.query().unwrap_or_default().to_string();
        self.filter = FilterState::Editing(query);
    }

    /// Replace the query being edited and re-run the filter.
    pub fn set_filter_query(&mut self, query: impl Into<String>) {
        self.filter = FilterState::Editing(query.into());
        self.refilter();
        self.selected = 0;
    }

    /// Commit the edited query. An empty query clears the filter instead.
    pub fn apply_filter(&mut self) {
        match std::mem::take(&mut self.filter) {
            FilterState::Editing(query) if query.is_empty() => self.clear_filter(),
            FilterState::Editing(query) => self.filter = FilterState::Applied(query),
            other => self.filter = other,
        }
    }

    /// Drop the filter and reselect the item that was selected under it.
    pub fn clear_filter(&mut self) {
        let anchor = self.selected_row().map(|row| row.index);
        self.filter = FilterState::Inactive;
        self.matches = None;
        self.refresh_pages();
        match anchor {
            Some(index) => self.selected = index,
            None => self.goto_bottom(),
        }
    }

    fn refilter(&mut self) {
        self.matches = self
            .filter
            .query()
            .filter(|query| !query.is_empty())
            .map(|query| self.engine.filter(&self.items, query));
        self.refresh_pages();
    }

    fn jump_to_page(&mut self, page: usize) {
        let offset = self.selected % self.paginator.per_page();
        let (start, end) = self.paginator.slice_bounds(page, self.visible_len());
        if start < end {
            self.selected = (start + offset).min(end - 1);
        }
    }

    fn refresh_pages(&mut self) {
        self.paginator.set_total_pages(self.visible_len());
        let len = self.visible_len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}
