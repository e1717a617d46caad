//! Low-level input collection: crossterm polling, mouse wheel coalescing, and translation
//! into primitive events for the input service.

use crate::error::Result;
use ratatui::crossterm::event::{self, Event, KeyEvent, MouseEvent, MouseEventKind};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Window in which consecutive wheel notches in one direction are merged.
const DEFAULT_COALESCE_WINDOW_MS: u64 = 12;
/// Rows moved by one wheel notch.
pub const WHEEL_ROWS: u64 = 3;
/// Poll timeout used when the caller does not provide one.
const DEFAULT_POLL_TIMEOUT_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    /// Signed selection delta for `rows` rows in this direction.
    pub fn delta(self, rows: u64) -> isize {
        let rows = isize::try_from(rows).unwrap_or(isize::MAX);
        match self {
            ScrollDirection::Up => -rows,
            ScrollDirection::Down => rows,
        }
    }
}

/// Primitive events surfaced by [`RawInputCollector`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawInputEvent {
    Key(KeyEvent),
    Resize {
        width: u16,
        height: u16,
    },
    Scroll {
        direction: ScrollDirection,
        rows: u64,
    },
}

/// Merges bursts of wheel events into one larger scroll.
#[derive(Debug, Clone)]
pub struct WheelCoalescer {
    window: Duration,
    pending: Option<PendingScroll>,
}

#[derive(Debug, Clone)]
struct PendingScroll {
    direction: ScrollDirection,
    rows: u64,
    last_event: Instant,
}

impl WheelCoalescer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Record a wheel notch. A change of direction hands back the scroll accumulated so far.
    pub fn push(
        &mut self,
        direction: ScrollDirection,
        rows: u64,
        now: Instant,
    ) -> Option<(ScrollDirection, u64)> {
        if let Some(pending) = self.pending.as_mut() {
            if pending.direction == direction {
                pending.rows = pending.rows.saturating_add(rows);
                pending.last_event = now;
                return None;
            }
        }
        let flushed = self.flush();
        self.pending = Some(PendingScroll {
            direction,
            rows,
            last_event: now,
        });
        flushed
    }

    /// Hand back the accumulated scroll once no notch arrived for a whole window.
    pub fn flush_if_stale(&mut self, now: Instant) -> Option<(ScrollDirection, u64)> {
        let stale = self
            .pending
            .as_ref()
            .is_some_and(|pending| now.duration_since(pending.last_event) >= self.window);
        if stale {
            self.flush()
        } else {
            None
        }
    }

    pub fn flush(&mut self) -> Option<(ScrollDirection, u64)> {
        self.pending
            .take()
            .map(|pending| (pending.direction, pending.rows))
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }
}

impl Default for WheelCoalescer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_COALESCE_WINDOW_MS))
    }
}

/// Polls crossterm and queues primitive events in arrival order.
#[derive(Debug, Default)]
pub struct RawInputCollector {
    wheel: WheelCoalescer,
    queue: VecDeque<RawInputEvent>,
}

impl RawInputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collector with a custom coalescing window.
    pub fn with_window(window: Duration) -> Self {
        Self {
            wheel: WheelCoalescer::new(window),
            queue: VecDeque::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.wheel.is_empty()
    }

    /// Feed an event directly, bypassing crossterm.
    pub fn process_event(&mut self, event: Event) {
        self.enqueue(event);
    }

    /// Next queued event, including a wheel scroll whose window has closed.
    pub fn next_ready(&mut self) -> Option<RawInputEvent> {
        if let Some(event) = self.queue.pop_front() {
            return Some(event);
        }
        self.wheel
            .flush_if_stale(Instant::now())
            .map(|(direction, rows)| RawInputEvent::Scroll { direction, rows })
    }

    /// Wait up to `timeout` for the next event.
    pub fn poll_event(&mut self, timeout: Option<Duration>) -> Result<Option<RawInputEvent>> {
        if let Some(event) = self.next_ready() {
            return Ok(Some(event));
        }

        let timeout = timeout.unwrap_or(Duration::from_millis(DEFAULT_POLL_TIMEOUT_MS));
        if event::poll(timeout)? {
            let event = event::read()?;
            self.enqueue(event);
        }
        Ok(self.next_ready())
    }

    fn enqueue(&mut self, event: Event) {
        match event {
            Event::Key(key) => {
                self.flush_wheel();
                self.queue.push_back(RawInputEvent::Key(key));
            }
            Event::Resize(width, height) => {
                self.flush_wheel();
                self.queue.push_back(RawInputEvent::Resize { width, height });
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let direction = match mouse.kind {
            MouseEventKind::ScrollUp => ScrollDirection::Up,
            MouseEventKind::ScrollDown => ScrollDirection::Down,
            _ => return,
        };
        if let Some((direction, rows)) = self.wheel.push(direction, WHEEL_ROWS, Instant::now()) {
            self.queue
                .push_back(RawInputEvent::Scroll { direction, rows });
        }
    }

    fn flush_wheel(&mut self) {
        if let Some((direction, rows)) = self.wheel.flush() {
            self.queue
                .push_back(RawInputEvent::Scroll { direction, rows });
        }
    }
}
