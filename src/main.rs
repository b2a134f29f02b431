use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use gas_dash::app::{self, App, Focus};
use gas_dash::data::DashboardData;
use gas_dash::map::Choropleth;
use gas_dash::{export, ui};
use ratatui::DefaultTerminal;
use std::path::Path;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Load everything up front; the dashboard has no function without
    // its data, so any failure aborts before the terminal is entered
    let mut data = DashboardData::load(Path::new("data"))?;
    for name in app::CANDIDATE_COUNTRIES {
        if !data.production.has_country(name) {
            tracing::warn!(country = name, "selectable country has no production column");
        }
    }
    let shapes = std::mem::take(&mut data.shapes);
    let map = Choropleth::build(shapes, &data.cumulative);

    // The map artifact depends only on the loaded data, never on the
    // interaction state, so one write per run covers every rerun
    export::write_map_artifact(&map, Path::new(export::MAP_ARTIFACT_FILE))?;

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, App::new(data, map));

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

fn run(terminal: &mut DefaultTerminal, mut app: App) -> Result<()> {
    info!("entering interactive session");

    loop {
        terminal.draw(|frame| ui::render(frame, &mut app))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key(&mut app, key);
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                // The next draw picks up the new frame size
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // The search prompt swallows everything while open
    if app.search.is_some() {
        match key.code {
            KeyCode::Esc => app.cancel_search(),
            KeyCode::Enter => app.submit_search(),
            KeyCode::Backspace => app.pop_search_char(),
            KeyCode::Char(c) => app.push_search_char(c),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::BackTab => app.focus = app.focus.prev(),
        KeyCode::Char('/') => app.begin_search(),
        _ => match app.focus {
            Focus::Countries => handle_list_key(app, key),
            Focus::Year => handle_year_key(app, key),
            Focus::Map => handle_map_key(app, key),
        },
    }
}

fn handle_list_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up => app.list_up(),
        KeyCode::Down => app.list_down(),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_country(),
        _ => {}
    }
}

fn handle_year_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Left => app.adjust_year(-1),
        KeyCode::Right => app.adjust_year(1),
        KeyCode::PageDown => app.adjust_year(-10),
        KeyCode::PageUp => app.adjust_year(10),
        KeyCode::Home => app.set_year(app::YEAR_MIN),
        KeyCode::End => app.set_year(app::YEAR_MAX),
        _ => {}
    }
}

fn handle_map_key(app: &mut App, key: KeyEvent) {
    match key.code {
        // Pan with hjkl or arrow keys
        KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
        KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
        KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
        KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),
        _ => {}
    }
}

/// Mouse: hover for tooltips, drag to pan, wheel to zoom at the cursor
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) => {
            app.last_mouse = Some((mouse.column, mouse.row));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if app.map_pixel(mouse.column, mouse.row).is_some() {
                app.handle_drag(mouse.column, mouse.row);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.end_drag();
        }
        _ => {}
    }
}
