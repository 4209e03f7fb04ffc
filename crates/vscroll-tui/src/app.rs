use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::{error, info, warn};
use vscroll_core::scroll::{Orientation, ScrollbarPosition};
use vscroll_core::{
    AppConfig, ScrollRange, ScrollbarDrag, ScrollbarGeometry, TriggerEvent, VirtualScroll,
    WheelEvent,
};

use crate::input::Action;
use crate::keymap::Keymap;
use crate::theme::Theme;

/// Swipe velocity emulated by the fling keys
const FLING_VELOCITY: f64 = 2.0;

type FiredLabels = Rc<RefCell<Vec<String>>>;

/// Application state
pub struct App {
    pub config: AppConfig,
    pub scroll: VirtualScroll,
    pub drag: ScrollbarDrag,
    pub geometry: ScrollbarGeometry,
    pub keymap: Keymap,
    pub theme: Theme,
    /// Content being scrolled
    pub lines: Vec<String>,
    pub pixels_per_row: f64,
    /// Area the content is rendered into
    pub content_area: Rect,
    /// Scrollbar track, empty when the scrollbar is disabled
    pub track_area: Rect,
    /// Pointer coordinate along the scrollbar axis when the drag started
    drag_anchor: Option<u16>,
    hovering: bool,
    fired: FiredLabels,
    pub fired_count: usize,
    pub last_trigger: Option<String>,
    pub status_message: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig, lines: Vec<String>) -> Self {
        let fired: FiredLabels = Rc::new(RefCell::new(Vec::new()));
        let triggers = config.triggers.iter().map(|trigger| {
            let log = fired.clone();
            let label = trigger.display_name();
            trigger.to_trigger(move |event: &TriggerEvent| {
                info!("Trigger '{}' fired at {}", label, event.position);
                log.borrow_mut().push(label.clone());
                Ok(())
            })
        });

        let scroll = VirtualScroll::new(&config.scroll)
            .with_idle_fade(config.scrollbar.fade_out_delay())
            .with_triggers(triggers);
        let geometry = ScrollbarGeometry::from_config(&config.scrollbar);
        let drag = ScrollbarDrag::new(geometry.orientation(), 0.0);
        let keymap = Keymap::from_config(&config.keymap);

        let requested = config.ui.pixels_per_row;
        let pixels_per_row = if requested.is_finite() && requested > 0.0 {
            requested
        } else {
            warn!("Invalid pixels_per_row {}, using 20", requested);
            20.0
        };

        Self {
            config,
            scroll,
            drag,
            geometry,
            keymap,
            theme: Theme::default(),
            lines,
            pixels_per_row,
            content_area: Rect::default(),
            track_area: Rect::default(),
            drag_anchor: None,
            hovering: false,
            fired,
            fired_count: 0,
            last_trigger: None,
            status_message: None,
            should_quit: false,
        }
    }

    /// Lay out content and scrollbar inside `area` and resize the scroll range
    pub fn set_area(&mut self, area: Rect) {
        let (content, track) = split_area(
            area,
            self.geometry.position(),
            self.config.scrollbar.enabled,
        );
        self.content_area = content;
        self.track_area = track;

        let hidden_rows = self.lines.len().saturating_sub(content.height as usize);
        let max = hidden_rows as f64 * self.pixels_per_row;
        self.scroll.set_range(ScrollRange::new(0.0, max));
        self.drag
            .set_extent(self.geometry.travel(self.track_len()) as f64);
    }

    /// First content row shown in the viewport
    pub fn scroll_row(&self) -> usize {
        let row = (self.scroll.current() / self.pixels_per_row).floor();
        if row.is_finite() && row > 0.0 {
            (row as usize).min(self.lines.len())
        } else {
            0
        }
    }

    /// Track length in cells along the scrollbar axis
    pub fn track_len(&self) -> u16 {
        match self.geometry.orientation() {
            Orientation::Vertical => self.track_area.height,
            Orientation::Horizontal => self.track_area.width,
        }
    }

    /// Handle start and length in track cells
    pub fn handle_span(&self) -> (u16, u16) {
        let completion = self.scroll.completion().unwrap_or(0.0);
        self.geometry.handle_span(self.track_len(), completion)
    }

    /// Whether the next frame should come at the animation rate
    pub fn needs_fast_update(&self) -> bool {
        !self.scroll.is_settled() || self.drag.is_dragging()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn handle_action(&mut self, action: Action, now: Instant) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ScrollDown => self.scroll.apply_wheel_delta_at(self.pixels_per_row, now),
            Action::ScrollUp => self.scroll.apply_wheel_delta_at(-self.pixels_per_row, now),
            Action::PageDown => self.scroll.apply_wheel_delta_at(self.page_pixels(), now),
            Action::PageUp => self.scroll.apply_wheel_delta_at(-self.page_pixels(), now),
            // Swiping up scrolls forward
            Action::FlingDown => self.scroll.apply_swipe_velocity_at(-FLING_VELOCITY, now),
            Action::FlingUp => self.scroll.apply_swipe_velocity_at(FLING_VELOCITY, now),
            Action::JumpToTop => {
                let top = self.scroll.range().map_or(0.0, |range| range.min());
                self.scroll.go_to_at(top, true, now);
            }
            Action::JumpToBottom => {
                if let Some(range) = self.scroll.range() {
                    self.scroll.go_to_at(range.max(), true, now);
                }
            }
            Action::SnapToMiddle => {
                if let Some(range) = self.scroll.range() {
                    self.scroll.go_to_at(range.at(0.5), false, now);
                }
            }
            Action::ToggleActive => {
                let active = !self.scroll.is_active();
                if !active && self.drag.is_dragging() {
                    self.drag_anchor = None;
                    self.drag.pan_end_at(&mut self.scroll, now);
                }
                self.scroll.set_active(active);
                self.set_status(if active { "Scrolling enabled" } else { "Scrolling disabled" });
            }
            Action::None => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        let on_track = contains(self.track_area, mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::ScrollDown => self.scroll.on_wheel_at(&WheelEvent::lines(1.0), now),
            MouseEventKind::ScrollUp => self.scroll.on_wheel_at(&WheelEvent::lines(-1.0), now),
            MouseEventKind::Down(MouseButton::Left) if on_track => self.press_track(mouse, now),
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(anchor) = self.drag_anchor {
                    let delta = self.axis_coord(mouse) as f64 - anchor as f64;
                    self.drag.move_by(&mut self.scroll, delta);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.drag_anchor.take().is_some() {
                    self.drag.pan_end_at(&mut self.scroll, now);
                }
            }
            MouseEventKind::Moved => self.hover(on_track, now),
            _ => {}
        }
    }

    /// Press on the track: grab the handle, or jump to the pressed cell
    fn press_track(&mut self, mouse: MouseEvent, now: Instant) {
        let cell = self.axis_coord(mouse).saturating_sub(self.track_origin());
        let (start, len) = self.handle_span();

        if cell >= start && cell < start + len {
            if self.drag.pan_start(&mut self.scroll) {
                self.drag_anchor = Some(self.axis_coord(mouse));
            }
            return;
        }

        let Some(range) = self.scroll.range() else {
            return;
        };
        let travel = self.drag.extent();
        if travel <= 0.0 {
            return;
        }
        // Center the handle on the pressed cell
        let position = (cell as f64 - (len / 2) as f64).clamp(0.0, travel);
        self.scroll.go_to_at(range.at(position / travel), true, now);
    }

    fn hover(&mut self, on_track: bool, now: Instant) {
        if on_track == self.hovering {
            return;
        }
        self.hovering = on_track;
        if on_track {
            self.scroll.hold_idle();
        } else {
            self.scroll.release_idle(now);
        }
    }

    /// Advance one frame and collect fired triggers
    pub fn update(&mut self, now: Instant) {
        if let Err(e) = self.scroll.tick_at(now) {
            error!("Trigger callback failed: {}", e);
            self.set_status(format!("Error: {}", e));
        }

        let fired: Vec<String> = self.fired.borrow_mut().drain(..).collect();
        self.fired_count += fired.len();
        if let Some(label) = fired.into_iter().last() {
            self.set_status(format!("Trigger: {}", label));
            self.last_trigger = Some(label);
        }
    }

    fn page_pixels(&self) -> f64 {
        self.content_area.height.max(1) as f64 * self.pixels_per_row
    }

    fn axis_coord(&self, mouse: MouseEvent) -> u16 {
        match self.geometry.orientation() {
            Orientation::Vertical => mouse.row,
            Orientation::Horizontal => mouse.column,
        }
    }

    fn track_origin(&self) -> u16 {
        match self.geometry.orientation() {
            Orientation::Vertical => self.track_area.y,
            Orientation::Horizontal => self.track_area.x,
        }
    }
}

/// Split `area` into content and a one cell scrollbar track on `position`
fn split_area(area: Rect, position: ScrollbarPosition, enabled: bool) -> (Rect, Rect) {
    if !enabled {
        return (area, Rect::default());
    }
    match position {
        ScrollbarPosition::Right => {
            let width = area.width.saturating_sub(1);
            (
                Rect::new(area.x, area.y, width, area.height),
                Rect::new(area.x + width, area.y, area.width - width, area.height),
            )
        }
        ScrollbarPosition::Left => {
            let bar = area.width.min(1);
            (
                Rect::new(area.x + bar, area.y, area.width - bar, area.height),
                Rect::new(area.x, area.y, bar, area.height),
            )
        }
        ScrollbarPosition::Top => {
            let bar = area.height.min(1);
            (
                Rect::new(area.x, area.y + bar, area.width, area.height - bar),
                Rect::new(area.x, area.y, area.width, bar),
            )
        }
        ScrollbarPosition::Bottom => {
            let height = area.height.saturating_sub(1);
            (
                Rect::new(area.x, area.y, area.width, height),
                Rect::new(area.x, area.y + height, area.width, area.height - height),
            )
        }
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

/// Numbered filler content for the interactive demo
pub fn demo_lines(count: usize) -> Vec<String> {
    (1..=count)
        .map(|i| {
            let marker = match i % 10 {
                0 => " ----------",
                5 => " -----",
                _ => "",
            };
            format!("{:>5} {}", i, marker)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use vscroll_core::TriggerConfig;

    fn app_with_lines(count: usize) -> App {
        let mut app = App::new(AppConfig::default(), demo_lines(count));
        app.set_area(Rect::new(0, 0, 41, 10));
        app
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn settle(app: &mut App, now: Instant) {
        for _ in 0..500 {
            app.update(now);
        }
    }

    #[test]
    fn test_range_follows_content_height() {
        let app = app_with_lines(110);
        assert_eq!(app.content_area, Rect::new(0, 0, 40, 10));
        assert_eq!(app.track_area, Rect::new(40, 0, 1, 10));
        // 100 hidden rows at 20 pixels each
        let range = app.scroll.range().unwrap();
        assert_eq!(range.max(), 2000.0);
        // 10 cell track, 1 cell handle
        assert_eq!(app.drag.extent(), 9.0);
    }

    #[test]
    fn test_short_content_has_degenerate_range() {
        let app = app_with_lines(5);
        let range = app.scroll.range().unwrap();
        assert_eq!(range.span(), 0.0);
    }

    #[test]
    fn test_scroll_row_follows_current() {
        let mut app = app_with_lines(110);
        let now = Instant::now();
        app.handle_action(Action::JumpToBottom, now);
        settle(&mut app, now);
        assert_eq!(app.scroll.current(), 2000.0);
        assert_eq!(app.scroll_row(), 100);
        assert!(!app.needs_fast_update());
    }

    #[test]
    fn test_snap_to_middle_is_immediate() {
        let mut app = app_with_lines(110);
        app.handle_action(Action::SnapToMiddle, Instant::now());
        assert_eq!(app.scroll.current(), 1000.0);
        assert_eq!(app.scroll_row(), 50);
    }

    #[test]
    fn test_fling_down_moves_forward() {
        let mut app = app_with_lines(110);
        app.handle_action(Action::FlingDown, Instant::now());
        assert_eq!(app.scroll.target(), 150.0);
    }

    #[test]
    fn test_toggle_active_ignores_input() {
        let mut app = app_with_lines(110);
        let now = Instant::now();
        app.handle_action(Action::ToggleActive, now);
        app.handle_action(Action::PageDown, now);
        assert_eq!(app.scroll.target(), 0.0);
        assert_eq!(app.status_message.as_deref(), Some("Scrolling disabled"));
    }

    #[test]
    fn test_mouse_wheel_scrolls_by_lines() {
        let mut app = app_with_lines(110);
        app.handle_mouse(mouse(MouseEventKind::ScrollDown, 5, 5), Instant::now());
        assert_eq!(app.scroll.target(), 40.0);
    }

    #[test]
    fn test_handle_drag() {
        let mut app = app_with_lines(110);
        let now = Instant::now();
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 40, 0), now);
        assert!(app.drag.is_dragging());

        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 40, 9), now);
        assert_eq!(app.scroll.current(), 2000.0);
        // Completion is refreshed by the next frame
        app.update(now);
        assert_eq!(app.handle_span(), (9, 1));

        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 40, 9), now);
        assert!(!app.drag.is_dragging());
        assert!(app.scroll.is_animated());
    }

    #[test]
    fn test_track_click_jumps_animated() {
        let mut app = app_with_lines(110);
        app.handle_mouse(
            mouse(MouseEventKind::Down(MouseButton::Left), 40, 9),
            Instant::now(),
        );
        assert!(!app.drag.is_dragging());
        assert_eq!(app.scroll.target(), 2000.0);
        assert_eq!(app.scroll.current(), 0.0);
    }

    #[test]
    fn test_trigger_updates_status() {
        let mut config = AppConfig::default();
        config.triggers.push(TriggerConfig {
            y: 100.0,
            condition: Default::default(),
            once: true,
            label: Some("loaded".to_string()),
        });
        let mut app = App::new(config, demo_lines(110));
        app.set_area(Rect::new(0, 0, 41, 10));

        let now = Instant::now();
        app.handle_action(Action::SnapToMiddle, now);
        app.update(now);
        app.update(now);
        assert_eq!(app.fired_count, 1);
        assert_eq!(app.last_trigger.as_deref(), Some("loaded"));
        assert_eq!(app.status_message.as_deref(), Some("Trigger: loaded"));
    }

    #[test]
    fn test_hover_holds_faded_scrollbar() {
        let mut config = AppConfig::default();
        config.scrollbar.fade_out_delay_ms = Some(100);
        let mut app = App::new(config, demo_lines(110));
        app.set_area(Rect::new(0, 0, 41, 10));

        let now = Instant::now();
        assert!(!app.scroll.is_scrollbar_visible(now));
        app.handle_mouse(mouse(MouseEventKind::Moved, 40, 3), now);
        assert!(app.scroll.is_scrollbar_visible(now + std::time::Duration::from_secs(5)));
    }

    #[test]
    fn test_split_area_positions() {
        let area = Rect::new(0, 0, 20, 10);
        let (content, track) = split_area(area, ScrollbarPosition::Left, true);
        assert_eq!(track, Rect::new(0, 0, 1, 10));
        assert_eq!(content, Rect::new(1, 0, 19, 10));

        let (content, track) = split_area(area, ScrollbarPosition::Bottom, true);
        assert_eq!(track, Rect::new(0, 9, 20, 1));
        assert_eq!(content, Rect::new(0, 0, 20, 9));

        let (content, track) = split_area(area, ScrollbarPosition::Right, false);
        assert_eq!(content, area);
        assert_eq!(track, Rect::default());
    }
}
