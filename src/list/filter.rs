//! Filter engine: query matching over `title ++ description` and offset splitting.
//!
//! Matching always runs against the concatenation of an item's title and description.
//! The resulting character offsets are then routed back to the field they came from by
//! [`split_offsets`], which is purely arithmetic on the title length.

use crate::list::item::DisplayItem;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::fmt;
use std::str::FromStr;

/// Interactive filter state. Only user input moves between these states.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterState {
    #[default]
    Inactive,
    Editing(String),
    Applied(String),
}

impl FilterState {
    /// Current query, if any filter is in progress or applied.
    pub fn query(&self) -> Option<&str> {
        match self {
            FilterState::Inactive => None,
            FilterState::Editing(query) | FilterState::Applied(query) => Some(query),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, FilterState::Editing(_))
    }

    /// Editing with nothing typed yet (the "type to search" state).
    pub fn is_editing_empty(&self) -> bool {
        matches!(self, FilterState::Editing(query) if query.is_empty())
    }

    /// True while editing or applied, regardless of the query.
    pub fn is_filtered(&self) -> bool {
        !matches!(self, FilterState::Inactive)
    }

    /// True when a non-empty query hides non-matching items.
    pub fn has_query(&self) -> bool {
        self.query().is_some_and(|query| !query.is_empty())
    }
}

/// How a query is matched against an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum MatchPolicy {
    /// Skim-style subsequence matching with smart case.
    #[default]
    Fuzzy,
    /// Case-insensitive contiguous substring; the first occurrence is highlighted.
    Substring,
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fuzzy" => Ok(MatchPolicy::Fuzzy),
            "substring" => Ok(MatchPolicy::Substring),
            other => Err(format!(
                "unknown match policy '{other}' (expected 'fuzzy' or 'substring')"
            )),
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPolicy::Fuzzy => f.write_str("fuzzy"),
            MatchPolicy::Substring => f.write_str("substring"),
        }
    }
}

/// Matched character positions within `title ++ description`, ascending and unique.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchOffsets(Vec<usize>);

impl MatchOffsets {
    pub fn new(mut offsets: Vec<usize>) -> Self {
        offsets.sort_unstable();
        offsets.dedup();
        Self(offsets)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Route each offset to the title or the description.
    pub fn split(&self, title_len: usize) -> SplitOffsets {
        split_offsets(&self.0, title_len)
    }
}

/// Offsets routed to the field they highlight, each relative to that field's start.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitOffsets {
    pub title: Vec<usize>,
    pub description: Vec<usize>,
}

/// Partition concatenation offsets at `title_len`.
///
/// Offsets below `title_len` go to the title unchanged; the rest go to the description
/// after subtracting `title_len`. Holds for empty titles and empty descriptions.
pub fn split_offsets(offsets: &[usize], title_len: usize) -> SplitOffsets {
    let mut split = SplitOffsets::default();
    for &offset in offsets {
        if offset < title_len {
            split.title.push(offset);
        } else {
            split.description.push(offset - title_len);
        }
    }
    split
}

/// One visible item under an active query: its store index and matched offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredEntry {
    pub index: usize,
    pub offsets: MatchOffsets,
}

/// Scores items against a query according to a [`MatchPolicy`].
pub struct FilterEngine {
    policy: MatchPolicy,
    matcher: SkimMatcherV2,
}

impl FilterEngine {
    pub fn new(policy: MatchPolicy) -> Self {
        Self {
            policy,
            matcher: SkimMatcherV2::default().smart_case(),
        }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Match one item. An empty query matches with no offsets.
    pub fn match_item(&self, item: &DisplayItem, query: &str) -> Option<MatchOffsets> {
        if query.is_empty() {
            return Some(MatchOffsets::default());
        }

        let haystack = item.filter_value();
        let offsets = match self.policy {
            MatchPolicy::Fuzzy => self
                .matcher
                .fuzzy_indices(&haystack, query)
                .map(|(_score, indices)| indices),
            MatchPolicy::Substring => substring_offsets(&haystack, query),
        }?;
        Some(MatchOffsets::new(offsets))
    }

    /// Filter `items`, preserving store order.
    pub fn filter(&self, items: &[DisplayItem], query: &str) -> Vec<FilteredEntry> {
        self.filter_from(items, 0, query)
    }

    /// Filter only `items[start..]`, reporting absolute indices. Used when appending.
    pub fn filter_from(&self, items: &[DisplayItem], start: usize, query: &str) -> Vec<FilteredEntry> {
        items
            .iter()
            .enumerate()
            .skip(start)
            .filter_map(|(index, item)| {
                self.match_item(item, query)
                    .map(|offsets| FilteredEntry { index, offsets })
            })
            .collect()
    }
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(MatchPolicy::default())
    }
}

impl fmt::Debug for FilterEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterEngine")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Character offsets of the first case-insensitive occurrence of `needle`.
fn substring_offsets(haystack: &str, needle: &str) -> Option<Vec<usize>> {
    let hay: Vec<char> = haystack.chars().collect();
    let pat: Vec<char> = needle.chars().collect();
    if pat.len() > hay.len() {
        return None;
    }

    let start = (0..=hay.len() - pat.len()).find(|&start| {
        hay[start..start + pat.len()]
            .iter()
            .zip(&pat)
            .all(|(h, p)| chars_eq_ignore_case(*h, *p))
    })?;
    Some((start..start + pat.len()).collect())
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
