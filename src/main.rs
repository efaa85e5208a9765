mod api;
mod app;
mod config;
mod event;
mod session;
mod store;
mod ui;

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing_subscriber::EnvFilter;

use api::dispatch::Dispatcher;
use api::http::HttpBackend;
use app::{App, AppScreen};
use config::Config;
use event::{AppEvent, EventHandler};
use session::validation::ValidationMode;
use store::json_store::JsonStore;
use ui::components::answer_box::AnswerBox;
use ui::components::history_view::HistoryView;
use ui::components::proficiency::ProficiencyLine;
use ui::components::sentence_view::SentenceView;
use ui::components::validation_panel::ValidationPanel;
use ui::layout::{content_column, drill_hints, pack_hint_lines};
use ui::line_input::LineInput;

#[derive(Parser)]
#[command(name = "brick", version, about = "Terminal sentence-translation drill")]
struct Cli {
    #[arg(short, long, help = "Drill backend base URL")]
    server: Option<String>,

    #[arg(long, help = "Translation proxy endpoint")]
    translator: Option<String>,

    #[arg(short, long, value_enum, help = "How answers are judged")]
    mode: Option<ValidationMode>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, value_name = "PATH", help = "Write config and history to a JSON file and exit")]
    export: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "Replace history from an export file and exit")]
    import: Option<PathBuf>,
}

fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    if let Some(translator) = cli.translator {
        config.translation_url = translator;
    }
    if let Some(mode) = cli.mode {
        config.validation_mode = mode;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    config.validate();

    if let Err(err) = init_logging(Path::new(&config.log_file)) {
        eprintln!("Logging disabled: {err:#}");
    }

    let store = match JsonStore::new() {
        Ok(store) => Some(store),
        Err(err) => {
            tracing::warn!("history store unavailable: {err}");
            None
        }
    };

    if let Some(path) = cli.export {
        let store = store.context("no data directory to export from")?;
        store.export_to(&config, &path)?;
        println!("Exported to {}", path.display());
        return Ok(());
    }
    if let Some(path) = cli.import {
        let store = store.context("no data directory to import into")?;
        let data = store.import_from(&path)?;
        println!("Imported {} history entries", data.history.entries.len());
        return Ok(());
    }

    let backend = HttpBackend::new(
        &config.server_url,
        &config.translation_url,
        config.request_timeout_secs,
    )?;
    tracing::info!(
        server = %config.server_url,
        translator = %config.translation_url,
        mode = %config.validation_mode,
        "starting"
    );

    let events = EventHandler::new(Duration::from_millis(100));
    let dispatcher = Dispatcher::new(Arc::new(backend), events.sender());
    let mouse = config.mouse;
    let mut app = App::new(config, dispatcher, store);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if mouse {
        execute!(stdout, EnableMouseCapture)?;
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events);

    if mouse {
        let _ = execute!(terminal.backend_mut(), DisableMouseCapture);
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!("exited with error: {err:?}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        app.viewport = terminal.draw(|frame| render(frame, app))?.area;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Mouse(mouse) => app.handle_mouse(mouse),
            AppEvent::Api(response) => app.on_api(response),
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    let refresh = key.code == KeyCode::F(5)
        || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r'));
    if refresh && app.screen == AppScreen::Drill {
        app.refresh_proficiency();
        return;
    }

    match app.screen {
        AppScreen::Start => app.handle_start_key(key),
        AppScreen::Drill => app.handle_drill_key(key),
        AppScreen::History => app.handle_history_key(key),
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Start => render_start(frame, app),
        AppScreen::Drill => render_drill(frame, app),
        AppScreen::History => render_history(frame, app),
    }
}

fn header_line<'a>(app: &App, info: String) -> Paragraph<'a> {
    let colors = &app.theme.colors;
    Paragraph::new(Line::from(vec![
        Span::styled(
            " brick ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info,
            Style::default().fg(colors.text_dim()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()))
}

fn footer_lines<'a>(app: &App, hints: &[&str], width: u16) -> Paragraph<'a> {
    let colors = &app.theme.colors;
    let lines: Vec<Line> = pack_hint_lines(hints, width as usize)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.text_dim()))))
        .collect();
    Paragraph::new(lines)
}

fn render_start(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let info = format!(
        " | {} | {} results recorded",
        app.config.server_url,
        app.history.entries.len()
    );
    frame.render_widget(header_line(app, info), layout[0]);

    let menu_area = ui::layout::centered_rect(50, 80, layout[1]);
    frame.render_widget(&app.menu, menu_area);

    let hints = ["[s/Enter] Start", "[h] History", "[t] Theme", "[q] Quit"];
    frame.render_widget(footer_lines(app, &hints, area.width), layout[2]);
}

fn render_drill(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let drill = &app.drill;
    let layout = app.drill_layout(area);

    let info = format!(" | {} validation | {}", drill.mode, app.theme.name);
    frame.render_widget(header_line(app, info), layout.header);

    let sentence = drill.current.as_ref().map(|c| &c.data);
    frame.render_widget(
        SentenceView::new(sentence, drill.hovered, drill.sentence_loading, &app.dots, app.theme),
        layout.sentence,
    );

    let answer_title = if drill.awaiting_reference() {
        "Your translation (waiting for reference)"
    } else {
        "Your translation"
    };
    frame.render_widget(AnswerBox::new(&drill.answer, answer_title, app.theme), layout.answer);

    if let (Some(round), Some(reference_area), Some(judgments_area)) =
        (drill.round(), layout.reference, layout.judgments)
    {
        let reference = LineInput::display(&round.reference);
        frame.render_widget(
            AnswerBox::new(&reference, "Reference translation", app.theme),
            reference_area,
        );
        frame.render_widget(
            ValidationPanel::new(
                round,
                drill.focus_words(),
                drill.mode,
                drill.can_submit_validation(),
                app.theme,
            ),
            judgments_area,
        );
    }

    frame.render_widget(
        ProficiencyLine::new(&app.proficiency, &app.dots, app.theme),
        layout.proficiency,
    );

    if let Some(err) = drill.last_error.as_deref() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {err}"),
                Style::default().fg(colors.error()),
            ))),
            layout.status,
        );
    }

    let hints = drill_hints(drill);
    frame.render_widget(footer_lines(app, &hints, area.width), layout.footer);
}

fn render_history(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    frame.render_widget(header_line(app, " | History".to_string()), layout[0]);
    frame.render_widget(
        HistoryView::new(&app.history, app.history_scroll, app.theme),
        content_column(layout[1]),
    );
    let hints = ["[j/k] Scroll", "[Esc] Back"];
    frame.render_widget(footer_lines(app, &hints, area.width), layout[2]);
}
