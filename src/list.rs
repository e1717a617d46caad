//! Live event list: display items, filtering, pagination and selection.
//!
//! The list is append-only for the lifetime of a session. Arrival order is the only
//! ordering; filtering hides items from the visible sequence without touching the store.

pub mod filter;
pub mod item;
pub mod paginator;
pub mod store;

pub use filter::{
    split_offsets, FilterEngine, FilterState, FilteredEntry, MatchOffsets, MatchPolicy,
    SplitOffsets,
};
pub use item::DisplayItem;
pub use paginator::{Paginator, PaginatorKind};
pub use store::{ItemStore, VisibleRow};
