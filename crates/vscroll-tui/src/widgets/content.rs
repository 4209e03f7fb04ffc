use ratatui::{
    style::Style,
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

pub struct ContentWidget;

impl ContentWidget {
    pub fn render(frame: &mut Frame, app: &App) {
        let area = app.content_area;
        let theme = &app.theme;

        // Slice instead of Paragraph::scroll so long content is not bound to u16 rows
        let first = app.scroll_row();
        let lines: Vec<Line> = app
            .lines
            .iter()
            .skip(first)
            .take(area.height as usize)
            .map(|line| Line::from(Span::styled(line.as_str(), Style::default().fg(theme.fg0))))
            .collect();

        let paragraph = Paragraph::new(Text::from(lines)).style(Style::default().bg(theme.bg0));
        frame.render_widget(paragraph, area);
    }
}
