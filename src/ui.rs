// src/ui.rs

pub mod chat;
pub mod footer;
pub mod header;
pub mod model_selection;
pub mod quit_confirm;
pub mod upload;

use crate::api::BackendClient;
use crate::app::{App, AppEvent, AppState, Command, Focus};
use crate::config::Config;
use crate::constants::TICK_RATE_MS;
use crate::errors::BeautiragResult;
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    Frame, Terminal,
};
use std::{
    io,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;

/// Runs the terminal UI until the user quits.
pub async fn run_ui(config: Config) -> BeautiragResult<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    // Without this, most terminals send Shift+Enter as a plain Enter.
    let keyboard_enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if keyboard_enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }
    log::debug!("keyboard enhancement: {}", keyboard_enhanced);
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let client = BackendClient::from_config(&config);
    let mut app = App::new(&config);
    app.keyboard_enhanced = keyboard_enhanced;
    let res = run_app(&mut terminal, app, client).await;

    // Restore terminal
    if keyboard_enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        log::error!("UI loop ended with an error: {}", err);
    }
    res
}

/// Main loop of the application.
async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    client: BackendClient,
) -> BeautiragResult<()> {
    let (tx, mut rx) = mpsc::channel::<AppEvent>(100);

    spawn_input_reader(tx.clone());
    spawn_health_probe(&client, &tx);

    let mut ticker = tokio::time::interval(Duration::from_millis(TICK_RATE_MS));

    loop {
        terminal.draw(|f| draw(f, &app))?;

        let event = tokio::select! {
            Some(event) = rx.recv() => event,
            _ = ticker.tick() => AppEvent::Tick,
        };

        if let Some(command) = app.handle_event(event, Instant::now()) {
            dispatch(command, &client, &tx);
        }

        if app.should_quit() {
            break;
        }
    }

    log::info!("quitting");
    Ok(())
}

/// Reads terminal events on a blocking thread and forwards them to the loop.
fn spawn_input_reader(tx: mpsc::Sender<AppEvent>) {
    tokio::task::spawn_blocking(move || loop {
        match event::poll(Duration::from_millis(TICK_RATE_MS)) {
            Ok(true) => match event::read() {
                Ok(event) => {
                    if tx.blocking_send(AppEvent::Input(event)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    log::error!("failed to read terminal event: {}", e);
                    return;
                }
            },
            Ok(false) => {
                if tx.is_closed() {
                    return;
                }
            }
            Err(e) => {
                log::error!("failed to poll terminal events: {}", e);
                return;
            }
        }
    });
}

fn spawn_health_probe(client: &BackendClient, tx: &mpsc::Sender<AppEvent>) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client.health().await;
        let _ = tx.send(AppEvent::Health(result)).await;
    });
}

/// Runs a command on its own task; the outcome comes back as an event.
fn dispatch(command: Command, client: &BackendClient, tx: &mpsc::Sender<AppEvent>) {
    let client = client.clone();
    let tx = tx.clone();
    match command {
        Command::Query(pending) => {
            tokio::spawn(async move {
                let result = client.query(&pending.request).await;
                let _ = tx
                    .send(AppEvent::QuerySettled {
                        placeholder_id: pending.placeholder_id,
                        result,
                    })
                    .await;
            });
        }
        Command::Upload(batch) => {
            tokio::spawn(async move {
                let result = batch.send(&client).await;
                let _ = tx.send(AppEvent::UploadSettled(result)).await;
            });
        }
    }
}

/// Renders the whole screen.
pub fn draw(f: &mut Frame, app: &App) {
    let size = f.area();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(size);

    header::draw_header(f, rows[0], app);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(2, 3)])
        .split(rows[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(columns[0]);

    upload::draw_upload(f, left[0], app);
    model_selection::draw_model_selection(f, left[1], app);
    chat::draw_chat(f, columns[1], app);

    app.status_indicator.render(f, rows[2]);
    footer::draw_footer(f, rows[3], app);

    if app.state == AppState::QuitConfirm {
        quit_confirm::draw_quit_confirm(f, centered_rect(50, 25, size));
    }
}

pub(crate) fn pane_border_style(app: &App, pane: Focus) -> Style {
    if app.focus == pane && app.state == AppState::Main {
        Style::default().fg(Color::LightMagenta)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

/// A rectangle of the given percentages centered in `area`.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_draw_initial_screen() {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        let app = App::new(&Config::default());

        terminal.draw(|f| draw(f, &app)).unwrap();
        let text = screen_text(&terminal);

        assert!(text.contains("Upload Documents"));
        assert!(text.contains("AI Model Selection"));
        assert!(text.contains("Chat with BeautiRAG"));
        assert!(text.contains("No messages yet"));
        assert!(text.contains("gpt-4o (OpenAI)"));
    }

    fn config_with_model(model: &str) -> Config {
        Config {
            default_model: model.to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_long_question_wraps_inside_input() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut app = App::new(&Config::default());
        let question = format!("{} ENDMARK", vec!["word"; 30].join(" "));
        app.conversation.set_input(&question);

        terminal.draw(|f| draw(f, &app)).unwrap();
        let text = screen_text(&terminal);

        assert!(text.contains("ENDMARK"));
        let input_rows = text.lines().filter(|l| l.contains("word word")).count();
        assert!(input_rows >= 3);
    }

    #[test]
    fn test_local_model_hides_key_line() {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        let app = App::new(&config_with_model("llama3"));
        terminal.draw(|f| draw(f, &app)).unwrap();
        let text = screen_text(&terminal);
        assert!(!text.contains("API Key:"));
        assert!(text.contains("no API key needed"));

        let app = App::new(&config_with_model("gpt-4o"));
        terminal.draw(|f| draw(f, &app)).unwrap();
        assert!(screen_text(&terminal).contains("API Key:"));
    }

    #[test]
    fn test_footer_fits_eighty_columns() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let mut app = App::new(&Config::default());

        terminal.draw(|f| draw(f, &app)).unwrap();
        assert!(screen_text(&terminal).contains("Alt+Enter: new line"));

        app.keyboard_enhanced = true;
        terminal.draw(|f| draw(f, &app)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Shift+Enter: new line"));
        assert!(text.contains("Esc: quit."));
    }

    #[test]
    fn test_draw_quit_confirm_overlay() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut app = App::new(&Config::default());
        app.state = AppState::QuitConfirm;

        terminal.draw(|f| draw(f, &app)).unwrap();
        assert!(screen_text(&terminal).contains("Confirm Quit"));
    }
}
