use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, MouseEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use inboxtui::app::{App, View};
use inboxtui::config::Config;
use inboxtui::ui;

fn main() -> Result<()> {
    env_logger::init();

    // Load config and build the widget before touching the terminal
    let config = Arc::new(Config::load());
    let mut app = App::new(config);
    app.start();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    // Teardown: stop the poller, then restore the terminal
    app.shutdown();
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| render(app, f))?;

        // Apply finished fetches and fire the periodic trigger when due
        app.drain_fetches();
        app.tick(Instant::now());

        // Poll with timeout so ticks and fetch results land without input
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }

        match event::read()? {
            Event::Key(key) => match app.view {
                View::List => match key.code {
                    KeyCode::Char('q') => app.should_quit = true,
                    KeyCode::Char('j') | KeyCode::Down => app.next(),
                    KeyCode::Char('k') | KeyCode::Up => app.previous(),
                    KeyCode::Char('l') | KeyCode::Enter => app.open_selected(),
                    KeyCode::Char('r') => app.request_refresh(),
                    KeyCode::Char('a') => app.toggle_auto_refresh(),
                    KeyCode::Char('i') => app.cycle_interval(),
                    _ => {}
                },
                View::Reader => match key.code {
                    KeyCode::Esc | KeyCode::Char('q') => app.close_modal(),
                    KeyCode::Tab | KeyCode::BackTab => app.modal_focus_next(),
                    // both focusable controls close the dialog
                    KeyCode::Enter | KeyCode::Char(' ') => app.close_modal(),
                    KeyCode::Char('j') | KeyCode::Down => app.modal_scroll_down(),
                    KeyCode::Char('k') | KeyCode::Up => app.modal_scroll_up(),
                    _ => {}
                },
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(_) => app.handle_click(mouse.column, mouse.row),
                MouseEventKind::ScrollDown => match app.view {
                    View::List => app.next(),
                    View::Reader => app.modal_scroll_down(),
                },
                MouseEventKind::ScrollUp => match app.view {
                    View::List => app.previous(),
                    View::Reader => app.modal_scroll_up(),
                },
                _ => {}
            },
            Event::Resize(_, _) => {
                // Redrawn on the next loop iteration
            }
            _ => {}
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn render(app: &mut App, f: &mut Frame) {
    let area = f.area();
    let config = app.config.clone();
    let theme = &config.theme;

    let banner_height = u16::from(app.banner.is_some());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // stats
            Constraint::Length(banner_height), // error banner
            Constraint::Min(1),                // message table
            Constraint::Length(1),             // help bar
        ])
        .split(area);

    ui::render_stats(
        f,
        chunks[0],
        app.messages.len(),
        app.fresh_count,
        app.last_update.as_deref(),
        app.is_loading(),
        theme,
    );

    if let Some(banner) = app.banner {
        ui::render_banner(f, chunks[1], banner, theme);
    }

    app.list_area = chunks[2];
    let is_loading = app.is_loading();
    ui::render_messages(
        f,
        chunks[2],
        &app.messages,
        &mut app.list_state,
        is_loading,
        &config.layout,
        theme,
    );

    ui::render_help(
        f,
        chunks[3],
        app.view,
        app.auto_refresh,
        app.interval.as_secs(),
        theme,
    );

    if app.view == View::Reader {
        if let Some(message) = app.modal_message().cloned() {
            let areas = ui::render_modal(f, area, &message, app.modal.focus, app.modal.scroll, theme);
            app.modal.set_areas(areas);
        }
    }
}
