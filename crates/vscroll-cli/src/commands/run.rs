use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use tracing::info;

use vscroll_core::AppConfig;
use vscroll_tui::{
    app::{demo_lines, App},
    event::{AppEvent, EventHandler},
    input::{handle_key_event, Action},
    widgets::{ContentWidget, ScrollbarWidget, StatusBarWidget},
};

/// Lines generated when no file is given
const DEMO_LINE_COUNT: usize = 500;

pub async fn run(config: AppConfig, file: Option<PathBuf>) -> Result<()> {
    let lines = match &file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
            .lines()
            .map(str::to_string)
            .collect(),
        None => demo_lines(DEMO_LINE_COUNT),
    };
    info!("Starting terminal demo with {} lines", lines.len());

    let event_handler = EventHandler::new(config.ui.tick_rate())
        .with_animation_tick(config.ui.animation_tick());
    let mut app = App::new(config, lines);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("vscroll"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = main_loop(&mut terminal, &mut app, &event_handler);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!(
        "Terminal demo finished at {} ({} triggers fired)",
        app.scroll.current(),
        app.fired_count
    );
    result
}

fn main_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_handler: &EventHandler,
) -> Result<()> {
    let mut last_area = Rect::default();
    // Checked at the end of each iteration to pick the next poll timeout
    let mut needs_fast_update = false;

    loop {
        let now = Instant::now();
        app.update(now);

        terminal.draw(|frame| {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(frame.area());

            if layout[0] != last_area {
                last_area = layout[0];
                app.set_area(last_area);
            }

            ContentWidget::render(frame, app);
            ScrollbarWidget::render(frame, app, now);
            StatusBarWidget::render(frame, layout[1], app);
        })?;

        let event = if needs_fast_update {
            event_handler.next_animation()?
        } else {
            event_handler.next()?
        };

        match event {
            Some(AppEvent::Key(key)) => {
                let action = handle_key_event(key, &app.keymap);
                if action != Action::None {
                    app.clear_status();
                }
                app.handle_action(action, Instant::now());
            }
            Some(AppEvent::Mouse(mouse)) => app.handle_mouse(mouse, Instant::now()),
            // Layout is recomputed on the next draw
            Some(AppEvent::Resize(_, _)) | Some(AppEvent::Tick) | None => {}
        }

        if app.should_quit {
            return Ok(());
        }
        needs_fast_update = app.needs_fast_update();
    }
}
