//! View composer: lays out one frame from the view state.
//!
//! ```text
//!  lttview   12 events · babeltrace2     title bar
//!  Filter: sch█                         filter line
//!                                       (blank)
//!  │ sched_switch                       list rows for the current page
//!  │ {"prev_comm":"swapper/0",...}
//!
//!    sched_wakeup
//!    {"comm":"kworker/1:0",...}
//!  •○○                                  pagination
//!  2/12 · 16%                           footer
//!  ↑/k up • ↓/j down • / filter • q quit   help
//! ```
//!
//! Composition is a pure function of the state; nothing is cached between frames.

use crate::list::{FilterState, Paginator, PaginatorKind};
use crate::render::ui::delegate::{ItemDelegate, RowContext, ROW_INDENT};
use crate::render::ui::state::ViewState;
use crate::render::ui::theme::ColorTheme;
use ratatui::text::{Line, Span};

/// Title bar, filter line, blank separator.
pub const HEADER_LINES: u16 = 3;
/// Pagination, footer, help.
pub const FOOTER_LINES: u16 = 3;

const FILTER_CURSOR: &str = "█";
const SEPARATOR: &str = " · ";

/// Lines left for list rows in a terminal `height` lines tall.
pub fn list_height(height: u16) -> u16 {
    height.saturating_sub(HEADER_LINES + FOOTER_LINES)
}

/// Selection position as a percentage of the visible sequence.
pub fn selection_percent(position: Option<usize>, visible: usize) -> usize {
    match position {
        Some(position) if visible > 0 => (position + 1) * 100 / visible,
        _ => 0,
    }
}

/// Compose the full frame, top to bottom.
pub fn compose_frame(view: &ViewState, theme: &ColorTheme) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(view.viewport_height as usize);
    lines.push(title_bar(view, theme));
    lines.push(filter_line(view, theme));
    lines.push(Line::default());
    lines.extend(list_rows(view, theme));
    lines.push(pagination(view, theme));
    lines.push(footer(view, theme));
    lines.push(help(view.store.filter_state(), theme));
    lines
}

fn title_bar(view: &ViewState, theme: &ColorTheme) -> Line<'static> {
    let count = view.store.len();
    let noun = if count == 1 { "event" } else { "events" };
    Line::from(vec![
        Span::raw(" "),
        Span::styled(format!(" {} ", view.title), theme.title_bar),
        Span::styled(
            format!("  {count} {noun}{SEPARATOR}{}", view.source_label),
            theme.status,
        ),
    ])
}

fn filter_line(view: &ViewState, theme: &ColorTheme) -> Line<'static> {
    match view.store.filter_state() {
        FilterState::Inactive => Line::default(),
        FilterState::Editing(query) => Line::from(vec![
            Span::raw(ROW_INDENT),
            Span::styled("Filter: ", theme.filter_prompt),
            Span::styled(query.clone(), theme.normal_title),
            Span::styled(FILTER_CURSOR, theme.filter_cursor),
        ]),
        FilterState::Applied(query) => Line::from(vec![
            Span::raw(ROW_INDENT),
            Span::styled(
                format!(
                    "“{}” {}/{}",
                    query,
                    view.store.visible_len(),
                    view.store.len()
                ),
                theme.status,
            ),
        ]),
    }
}

/// Exactly `list_height` lines: the current page's rows, spacing, then padding.
fn list_rows(view: &ViewState, theme: &ColorTheme) -> Vec<Line<'static>> {
    let height = view.list_height() as usize;
    let store = &view.store;
    let mut lines = Vec::with_capacity(height);

    if store.visible_len() == 0 {
        let empty = if store.filter_state().has_query() {
            "No matching events."
        } else if view.status_line.stream_ended {
            "No events."
        } else {
            "Waiting for events…"
        };
        lines.push(Line::from(vec![
            Span::raw(ROW_INDENT),
            Span::styled(empty, theme.status),
        ]));
    } else {
        let selected = store.selected_position();
        let width = view.viewport_width as usize;
        for (n, row) in store.page_rows().into_iter().enumerate() {
            if n > 0 {
                lines.extend((0..view.delegate.spacing()).map(|_| Line::default()));
            }
            let context = RowContext {
                is_selected: selected == Some(row.position),
                filter: store.filter_state(),
                offsets: row.offsets,
                width,
            };
            lines.extend(view.delegate.render(row.item, &context, theme));
        }
    }

    lines.truncate(height);
    lines.resize(height, Line::default());
    lines
}

fn pagination(view: &ViewState, theme: &ColorTheme) -> Line<'static> {
    let paginator = view.store.paginator();
    if paginator.total_pages() <= 1 {
        return Line::default();
    }

    let page = view.store.current_page();
    let width = (view.viewport_width as usize).saturating_sub(ROW_INDENT.len());
    let kind = paginator.kind_for_width(width);
    let mut spans = vec![Span::raw(ROW_INDENT)];
    match kind {
        PaginatorKind::Dots => {
            spans.extend((0..paginator.total_pages()).map(|p| {
                if p == page {
                    Span::styled(Paginator::ACTIVE_DOT, theme.pagination_active)
                } else {
                    Span::styled(
                        Paginator::INACTIVE_DOT,
                        theme.pagination_inactive,
                    )
                }
            }));
        }
        PaginatorKind::Arabic => {
            spans.push(Span::styled(
                paginator.view(page, kind),
                theme.pagination_active,
            ));
        }
    }
    Line::from(spans)
}

fn footer(view: &ViewState, theme: &ColorTheme) -> Line<'static> {
    let store = &view.store;
    let visible = store.visible_len();
    let position = store.selected_position();
    let shown = position.map_or(0, |p| p + 1);

    let mut spans = vec![
        Span::raw(ROW_INDENT),
        Span::styled(
            format!(
                "{shown}/{visible}{SEPARATOR}{}%",
                selection_percent(position, visible)
            ),
            theme.status,
        ),
    ];
    for note in view.status_line.format_notes() {
        let style = if view.status_line.message.as_deref() == Some(note.as_str()) {
            theme.status_alert
        } else {
            theme.status
        };
        spans.push(Span::styled(SEPARATOR, theme.status));
        spans.push(Span::styled(note, style));
    }
    Line::from(spans)
}

fn help(filter: &FilterState, theme: &ColorTheme) -> Line<'static> {
    let text = match filter {
        FilterState::Editing(_) => "enter apply • esc cancel • ↑/↓ move • ctrl+c quit",
        FilterState::Applied(_) => {
            "↑/k up • ↓/j down • ←/h prev • →/l next • / edit filter • esc clear filter • q quit"
        }
        FilterState::Inactive => "↑/k up • ↓/j down • ←/h prev • →/l next • / filter • q quit",
    };
    Line::from(vec![Span::raw(ROW_INDENT), Span::styled(text, theme.help)])
}
