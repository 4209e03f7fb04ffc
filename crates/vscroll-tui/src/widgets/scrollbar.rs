use std::time::Instant;

use ratatui::{
    style::Style,
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame,
};
use vscroll_core::scroll::Orientation;

use crate::app::App;

pub struct ScrollbarWidget;

impl ScrollbarWidget {
    /// Draw the track and handle, or a blank track once faded out
    pub fn render(frame: &mut Frame, app: &App, now: Instant) {
        let area = app.track_area;
        if area.width == 0 || area.height == 0 {
            return;
        }
        let theme = &app.theme;
        let blank = Style::default().bg(theme.bg0);

        if !app.scroll.is_scrollbar_visible(now) {
            frame.render_widget(Paragraph::new("").style(blank), area);
            return;
        }

        let (start, len) = app.handle_span();
        let handle_color = if app.drag.is_dragging() {
            theme.handle_dragging
        } else {
            theme.handle
        };
        let (track_char, handle_char) = match app.geometry.orientation() {
            Orientation::Vertical => ("│", "┃"),
            Orientation::Horizontal => ("─", "━"),
        };

        let cell = |i: u16| {
            if i >= start && i < start + len {
                Span::styled(handle_char, Style::default().fg(handle_color).bg(theme.bg0))
            } else {
                Span::styled(track_char, Style::default().fg(theme.track).bg(theme.bg0))
            }
        };

        let text = match app.geometry.orientation() {
            Orientation::Vertical => {
                Text::from((0..area.height).map(|i| Line::from(cell(i))).collect::<Vec<_>>())
            }
            Orientation::Horizontal => {
                Text::from(Line::from((0..area.width).map(cell).collect::<Vec<_>>()))
            }
        };

        frame.render_widget(Paragraph::new(text).style(blank), area);
    }
}
