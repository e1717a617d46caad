//! Render delegate: styles one display item as one list row.
//!
//! A row is a title line, optionally followed by a description line. Each row gets exactly
//! one tier (dimmed, selected or normal), chosen in that priority order:
//!
//! 1. dimmed while a filter is being edited with nothing typed yet,
//! 2. selected for the cursor row when no filter is being edited,
//! 3. normal otherwise.
//!
//! When a query is active, matched characters are drawn with the theme's match style patched
//! over the tier style, independently in the title and the description.

use crate::config::ViewerConfig;
use crate::list::{DisplayItem, FilterState, MatchOffsets, SplitOffsets};
use crate::render::ui::theme::ColorTheme;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

/// Drawn in front of the selected row.
pub const SELECTED_BAR: &str = "│ ";
/// Drawn in front of every other row, same width as the bar.
pub const ROW_INDENT: &str = "  ";
pub const ELLIPSIS: char = '…';

/// Visual tier of a row before match highlighting. Highlighting is independent of the
/// tier: it applies to editing and applied filters alike once the query is non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Dimmed,
    Selected,
    Normal,
}

impl Tier {
    pub fn resolve(is_selected: bool, filter: &FilterState) -> Self {
        if filter.is_editing_empty() {
            Tier::Dimmed
        } else if is_selected && !filter.is_editing() {
            Tier::Selected
        } else {
            Tier::Normal
        }
    }

    fn styles(self, theme: &ColorTheme) -> (Style, Style) {
        match self {
            Tier::Dimmed => (theme.dimmed_title, theme.dimmed_desc),
            Tier::Selected => (theme.selected_title, theme.selected_desc),
            Tier::Normal => (theme.normal_title, theme.normal_desc),
        }
    }
}

/// Per-row inputs the delegate needs besides the item itself.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    pub is_selected: bool,
    pub filter: &'a FilterState,
    /// Offsets over `title ++ description`, present while a query is active
    pub offsets: Option<&'a MatchOffsets>,
    /// Columns available for the row
    pub width: usize,
}

/// Renders list rows and reports their footprint for pagination.
pub trait ItemDelegate {
    /// Lines per row.
    fn height(&self) -> usize;

    /// Blank lines between rows.
    fn spacing(&self) -> usize;

    /// Exactly [`height`](Self::height) lines for one item.
    ///
    /// Matched characters are highlighted whenever the query is non-empty, including
    /// while it is still being typed, so every keystroke shows what it matched.
    fn render(
        &self,
        item: &DisplayItem,
        row: &RowContext<'_>,
        theme: &ColorTheme,
    ) -> Vec<Line<'static>>;
}

/// Delegate for decoded trace events: event name over its compact payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDelegate {
    show_description: bool,
    spacing: usize,
}

impl EventDelegate {
    pub fn new(show_description: bool, spacing: usize) -> Self {
        Self {
            show_description,
            spacing,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(config.show_description, config.row_spacing)
    }
}

impl Default for EventDelegate {
    fn default() -> Self {
        Self::new(true, 1)
    }
}

impl ItemDelegate for EventDelegate {
    fn height(&self) -> usize {
        if self.show_description {
            2
        } else {
            1
        }
    }

    fn spacing(&self) -> usize {
        self.spacing
    }

    fn render(
        &self,
        item: &DisplayItem,
        row: &RowContext<'_>,
        theme: &ColorTheme,
    ) -> Vec<Line<'static>> {
        let tier = Tier::resolve(row.is_selected, row.filter);
        let (title_style, desc_style) = tier.styles(theme);

        let split = match row.offsets {
            Some(offsets) if row.filter.has_query() => offsets.split(item.title_len()),
            _ => SplitOffsets::default(),
        };

        let prefix = match tier {
            Tier::Selected => Span::styled(SELECTED_BAR, theme.selected_border),
            _ => Span::raw(ROW_INDENT),
        };
        let available = row.width.saturating_sub(prefix.width());

        let mut lines = Vec::with_capacity(self.height());
        let mut title = vec![prefix.clone()];
        title.extend(highlight_field(
            item.title(),
            &split.title,
            title_style,
            title_style.patch(theme.filter_match),
            available,
        ));
        lines.push(Line::from(title));

        if self.show_description {
            let mut description = vec![prefix];
            description.extend(highlight_field(
                item.description(),
                &split.description,
                desc_style,
                desc_style.patch(theme.filter_match),
                available,
            ));
            lines.push(Line::from(description));
        }
        lines
    }
}

/// Style `text` per character, merging neighbours that share a style into one span.
///
/// `offsets` are ascending character positions drawn with `matched`; everything else uses
/// `base`. Text wider than `max_width` columns is cut with an ellipsis and offsets past the
/// cut are dropped.
pub fn highlight_field(
    text: &str,
    offsets: &[usize],
    base: Style,
    matched: Style,
    max_width: usize,
) -> Vec<Span<'static>> {
    let (visible, truncated) = fit_width(text, max_width);

    let mut spans = Vec::new();
    let mut run = String::new();
    let mut run_matched = false;
    for (position, ch) in visible.into_iter().enumerate() {
        let is_match = offsets.binary_search(&position).is_ok();
        if is_match != run_matched && !run.is_empty() {
            let style = if run_matched { matched } else { base };
            spans.push(Span::styled(std::mem::take(&mut run), style));
        }
        run_matched = is_match;
        run.push(ch);
    }
    if !run.is_empty() {
        let style = if run_matched { matched } else { base };
        spans.push(Span::styled(run, style));
    }
    if truncated {
        spans.push(Span::styled(ELLIPSIS.to_string(), base));
    }
    spans
}

/// Characters of `text` that fit in `max_width` columns, leaving room for an ellipsis when
/// the text has to be cut. Control characters become spaces so positions stay aligned.
fn fit_width(text: &str, max_width: usize) -> (Vec<char>, bool) {
    let chars: Vec<(char, usize)> = text
        .chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .map(|ch| (ch, ch.width().unwrap_or(0)))
        .collect();

    let total: usize = chars.iter().map(|(_, width)| width).sum();
    if total <= max_width {
        return (chars.into_iter().map(|(ch, _)| ch).collect(), false);
    }
    if max_width == 0 {
        return (Vec::new(), false);
    }

    let budget = max_width - ELLIPSIS.width().unwrap_or(1);
    let mut used = 0;
    let mut kept = Vec::new();
    for (ch, width) in chars {
        if used + width > budget {
            break;
        }
        used += width;
        kept.push(ch);
    }
    (kept, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::{FilterEngine, MatchPolicy};

    fn theme() -> ColorTheme {
        ColorTheme::default()
    }

    /// (text, style) pairs of a line, prefix included.
    fn runs(line: &Line<'_>) -> Vec<(String, Style)> {
        line.spans
            .iter()
            .map(|span| (span.content.to_string(), span.style))
            .collect()
    }

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    fn offsets_for(item: &DisplayItem, query: &str) -> MatchOffsets {
        FilterEngine::new(MatchPolicy::Substring)
            .match_item(item, query)
            .unwrap()
    }

    #[test]
    fn tier_priority() {
        let editing_empty = FilterState::Editing(String::new());
        let editing = FilterState::Editing("op".into());
        let applied = FilterState::Applied("op".into());

        assert_eq!(Tier::resolve(true, &editing_empty), Tier::Dimmed);
        assert_eq!(Tier::resolve(false, &editing_empty), Tier::Dimmed);
        assert_eq!(Tier::resolve(true, &editing), Tier::Normal);
        assert_eq!(Tier::resolve(true, &applied), Tier::Selected);
        assert_eq!(Tier::resolve(true, &FilterState::Inactive), Tier::Selected);
        assert_eq!(Tier::resolve(false, &applied), Tier::Normal);
    }

    #[test]
    fn height_follows_description_toggle() {
        assert_eq!(EventDelegate::new(true, 1).height(), 2);
        assert_eq!(EventDelegate::new(false, 0).height(), 1);
        assert_eq!(EventDelegate::new(false, 3).spacing(), 3);
    }

    #[test]
    fn empty_query_dims_every_row_including_selection() {
        let theme = theme();
        let delegate = EventDelegate::default();
        let item = DisplayItem::new("open", r#"{"id":1}"#);
        let filter = FilterState::Editing(String::new());
        let row = RowContext {
            is_selected: true,
            filter: &filter,
            offsets: None,
            width: 80,
        };

        let lines = delegate.render(&item, &row, &theme);
        assert_eq!(
            runs(&lines[0]),
            vec![
                (ROW_INDENT.to_string(), Style::default()),
                ("open".to_string(), theme.dimmed_title)
            ]
        );
        assert_eq!(runs(&lines[1])[1], (r#"{"id":1}"#.to_string(), theme.dimmed_desc));
    }

    #[test]
    fn selected_row_highlights_title_matches() {
        let theme = theme();
        let delegate = EventDelegate::default();
        let item = DisplayItem::new("close", r#"{"id":2}"#);
        let offsets = offsets_for(&item, "clo");
        let filter = FilterState::Applied("clo".into());
        let row = RowContext {
            is_selected: true,
            filter: &filter,
            offsets: Some(&offsets),
            width: 80,
        };

        let lines = delegate.render(&item, &row, &theme);
        let matched = theme.selected_title.patch(theme.filter_match);
        assert_eq!(
            runs(&lines[0]),
            vec![
                (SELECTED_BAR.to_string(), theme.selected_border),
                ("clo".to_string(), matched),
                ("se".to_string(), theme.selected_title),
            ]
        );
        assert_eq!(
            runs(&lines[1])[1..],
            [(r#"{"id":2}"#.to_string(), theme.selected_desc)]
        );
    }

    #[test]
    fn query_being_edited_highlights_matches() {
        let theme = theme();
        let delegate = EventDelegate::default();
        let item = DisplayItem::new("close", r#"{"id":2}"#);
        let offsets = offsets_for(&item, "clo");
        let filter = FilterState::Editing("clo".into());
        let row = RowContext {
            is_selected: true,
            filter: &filter,
            offsets: Some(&offsets),
            width: 80,
        };

        let lines = delegate.render(&item, &row, &theme);
        assert_eq!(
            runs(&lines[0]),
            vec![
                (ROW_INDENT.to_string(), Style::default()),
                ("clo".to_string(), theme.normal_title.patch(theme.filter_match)),
                ("se".to_string(), theme.normal_title),
            ]
        );
    }

    #[test]
    fn offsets_past_title_highlight_description_start() {
        let theme = theme();
        let delegate = EventDelegate::default();
        let item = DisplayItem::new("ab", "cd");
        let offsets = MatchOffsets::new(vec![1, 2]);
        let filter = FilterState::Applied("bc".into());
        let row = RowContext {
            is_selected: false,
            filter: &filter,
            offsets: Some(&offsets),
            width: 80,
        };

        let lines = delegate.render(&item, &row, &theme);
        let title_match = theme.normal_title.patch(theme.filter_match);
        let desc_match = theme.normal_desc.patch(theme.filter_match);
        assert_eq!(
            runs(&lines[0])[1..],
            [
                ("a".to_string(), theme.normal_title),
                ("b".to_string(), title_match)
            ]
        );
        assert_eq!(
            runs(&lines[1])[1..],
            [
                ("c".to_string(), desc_match),
                ("d".to_string(), theme.normal_desc)
            ]
        );
    }

    #[test]
    fn empty_title_routes_all_offsets_to_description() {
        let theme = theme();
        let delegate = EventDelegate::default();
        let item = DisplayItem::new("", "xyz");
        let offsets = MatchOffsets::new(vec![0]);
        let filter = FilterState::Applied("x".into());
        let row = RowContext {
            is_selected: false,
            filter: &filter,
            offsets: Some(&offsets),
            width: 80,
        };

        let lines = delegate.render(&item, &row, &theme);
        assert_eq!(text(&lines[0]), ROW_INDENT);
        assert_eq!(
            runs(&lines[1])[1],
            (
                "x".to_string(),
                theme.normal_desc.patch(theme.filter_match)
            )
        );
    }

    #[test]
    fn title_only_when_descriptions_hidden() {
        let delegate = EventDelegate::new(false, 0);
        let item = DisplayItem::new("open", r#"{"id":1}"#);
        let row = RowContext {
            is_selected: false,
            filter: &FilterState::Inactive,
            offsets: None,
            width: 80,
        };
        let lines = delegate.render(&item, &row, &theme());
        assert_eq!(lines.len(), 1);
        assert_eq!(text(&lines[0]), "  open");
    }

    #[test]
    fn truncation_adds_ellipsis_and_drops_hidden_offsets() {
        let base = Style::default();
        let matched = Style::default().patch(theme().filter_match);
        let spans = highlight_field("abcdefgh", &[1, 6], base, matched, 5);
        let rendered: Vec<(String, Style)> = spans
            .iter()
            .map(|span| (span.content.to_string(), span.style))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("a".to_string(), base),
                ("b".to_string(), matched),
                ("cd".to_string(), base),
                ("…".to_string(), base),
            ]
        );
    }

    #[test]
    fn wide_characters_count_by_columns() {
        let spans = highlight_field("日本語テキスト", &[], Style::default(), Style::default(), 7);
        let rendered: String = spans.iter().map(|span| span.content.as_ref()).collect();
        assert_eq!(rendered, "日本語…");
    }

    #[test]
    fn control_characters_keep_offsets_aligned() {
        let base = Style::default();
        let matched = Style::default().patch(theme().filter_match);
        let spans = highlight_field("a\tb", &[2], base, matched, 10);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].content, "a ");
        assert_eq!(spans[1].content, "b");
        assert_eq!(spans[1].style, matched);
    }
}
