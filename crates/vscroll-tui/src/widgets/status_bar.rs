use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use vscroll_core::config::KeymapConfig;

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let state = app.scroll.state();

        let (active_str, active_color) = if app.scroll.is_active() {
            (" ACTIVE ", theme.active)
        } else {
            (" PAUSED ", theme.inactive)
        };

        let completion = state
            .completion
            .map(|c| format!("{:>3.0}%", c * 100.0))
            .unwrap_or_else(|| "  -".to_string());

        let status_text = if let Some(msg) = &app.status_message {
            format!(" {}", msg)
        } else {
            format!(
                " target {:.2} | current {:.2} | {} | last trigger: {}",
                state.target,
                state.current,
                completion,
                app.last_trigger.as_deref().unwrap_or("-")
            )
        };

        let hint = help_hint(&app.config.keymap);
        let used = active_str.len() + status_text.chars().count() + hint.chars().count();
        let padding_len = (area.width as usize).saturating_sub(used);

        let line = Line::from(vec![
            Span::styled(
                active_str,
                Style::default().fg(theme.bg0).bg(active_color),
            ),
            Span::styled(
                status_text,
                Style::default().fg(theme.fg0).bg(theme.bg2),
            ),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(
                hint,
                Style::default().fg(theme.grey2).bg(theme.bg2),
            ),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Key hints for the configured bindings
fn help_hint(keymap: &KeymapConfig) -> String {
    format!(
        " {}:quit {}/{}:scroll {}/{}:fling {}/{}:top/bottom {}:pause ",
        keymap.quit,
        keymap.scroll_down,
        keymap.scroll_up,
        keymap.fling_down,
        keymap.fling_up,
        keymap.jump_to_top,
        keymap.jump_to_bottom,
        keymap.toggle_active
    )
}
