use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::api::dispatch::Dispatcher;
use crate::api::{ApiRequest, ApiResponse};
use crate::config::Config;
use crate::session::drill::DrillController;
use crate::session::proficiency::ProficiencyState;
use crate::session::result::HistoryEntry;
use crate::store::json_store::JsonStore;
use crate::store::schema::HistoryData;
use crate::ui::components::history_view;
use crate::ui::components::loading::LoadingDots;
use crate::ui::components::menu::{Menu, MenuAction};
use crate::ui::components::sentence_view::{hit_test, layout_tokens, token_origin};
use crate::ui::layout::{DrillLayout, drill_hints, pack_hint_lines};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Start,
    Drill,
    History,
}

pub struct App {
    pub screen: AppScreen,
    pub drill: DrillController,
    pub proficiency: ProficiencyState,
    pub dots: LoadingDots,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    /// Effective settings, including command-line overrides.
    pub config: Config,
    /// File the theme choice is written back to.
    pub config_path: PathBuf,
    pub store: Option<JsonStore>,
    pub history: HistoryData,
    pub history_scroll: usize,
    pub should_quit: bool,
    /// Terminal area of the last frame, for mouse hit-testing.
    pub viewport: Rect,
    dispatcher: Dispatcher,
    /// Result awaiting the backend's ack before it is written to history.
    pending_record: Option<(u64, HistoryEntry)>,
}

impl App {
    pub fn new(config: Config, dispatcher: Dispatcher, store: Option<JsonStore>) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let menu = Menu::new(theme, config.validation_mode);
        let history = store
            .as_ref()
            .map(JsonStore::load_history)
            .unwrap_or_default();

        Self {
            screen: AppScreen::Start,
            drill: DrillController::new(config.validation_mode),
            proficiency: ProficiencyState::default(),
            dots: LoadingDots::new(),
            menu,
            theme,
            config,
            config_path: Config::config_path(),
            store,
            history,
            history_scroll: 0,
            should_quit: false,
            viewport: Rect::default(),
            dispatcher,
            pending_record: None,
        }
    }

    pub fn on_tick(&mut self) {
        self.dots.tick(Instant::now());
    }

    fn send(&mut self, requests: Vec<ApiRequest>) {
        for request in &requests {
            match request {
                ApiRequest::PostResult { generation, result } => {
                    self.pending_record = Some((*generation, HistoryEntry::from_result(result)));
                }
                ApiRequest::FetchSentence { .. } | ApiRequest::TranslateToken { .. } => {
                    self.dots.reset();
                }
                _ => {}
            }
        }
        self.dispatcher.dispatch_all(requests);
    }

    pub fn on_api(&mut self, response: ApiResponse) {
        match &response {
            ApiResponse::Proficiency(result) => {
                match result {
                    Ok(value) => {
                        tracing::info!(value, "proficiency updated");
                        self.proficiency.finish(Some(*value));
                    }
                    Err(err) => {
                        tracing::warn!("proficiency fetch failed: {err}");
                        self.proficiency.finish(None);
                    }
                }
                return;
            }
            ApiResponse::ResultPosted {
                generation,
                result: Ok(()),
            } if *generation == self.drill.generation() => self.record_posted(*generation),
            _ => {}
        }
        let follow = self.drill.apply(response);
        self.send(follow);
    }

    fn record_posted(&mut self, generation: u64) {
        let Some((pending, entry)) = self.pending_record.take() else {
            return;
        };
        if pending != generation || !self.config.record_history {
            return;
        }
        let Some(store) = self.store.as_ref() else {
            self.history.entries.push(entry);
            return;
        };
        match store.append_history(entry) {
            Ok(data) => self.history = data,
            Err(err) => tracing::error!("could not save history: {err}"),
        }
    }

    pub fn refresh_proficiency(&mut self) {
        if self.proficiency.begin_refresh() {
            self.dots.reset();
            self.dispatcher.dispatch(ApiRequest::FetchProficiency);
        }
    }

    pub fn start_drill(&mut self) {
        self.screen = AppScreen::Drill;
        let requests = self.drill.start();
        self.send(requests);
    }

    pub fn go_to_start(&mut self) {
        self.drill.abandon();
        self.pending_record = None;
        self.screen = AppScreen::Start;
    }

    pub fn go_to_history(&mut self) {
        if let Some(store) = self.store.as_ref() {
            self.history = store.load_history();
        }
        self.history_scroll = 0;
        self.screen = AppScreen::History;
    }

    pub fn cycle_theme(&mut self) {
        let Some(name) = Theme::next_name(&self.config.theme) else {
            return;
        };
        let Some(theme) = Theme::load(&name) else {
            tracing::warn!(theme = %name, "bundled theme failed to load");
            return;
        };
        let theme: &'static Theme = Box::leak(Box::new(theme));
        self.theme = theme;
        self.menu.theme = theme;
        if let Err(err) = Config::save_theme(&self.config_path, &name) {
            tracing::warn!("could not save theme choice: {err}");
        }
        self.config.theme = name;
    }

    pub fn handle_start_key(&mut self, key: KeyEvent) {
        let action = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(MenuAction::Quit),
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu.prev();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu.next();
                None
            }
            KeyCode::Enter => Some(self.menu.selected_action()),
            KeyCode::Char(ch) => self.menu.action_for_key(ch),
            _ => None,
        };
        match action {
            Some(MenuAction::StartDrill) => self.start_drill(),
            Some(MenuAction::History) => self.go_to_history(),
            Some(MenuAction::CycleTheme) => self.cycle_theme(),
            Some(MenuAction::Quit) => self.should_quit = true,
            None => {}
        }
    }

    pub fn handle_drill_key(&mut self, key: KeyEvent) {
        let requests = self.drill.handle_key(key);
        if !self.drill.is_started() {
            self.go_to_start();
            return;
        }
        self.send(requests);
    }

    pub fn handle_history_key(&mut self, key: KeyEvent) {
        let page = self.viewport.height.saturating_sub(8);
        let max = history_view::max_scroll(self.history.entries.len(), page);
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.screen = AppScreen::Start,
            KeyCode::Down | KeyCode::Char('j') => {
                self.history_scroll = (self.history_scroll + 1).min(max);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.history_scroll = self.history_scroll.saturating_sub(1);
            }
            _ => {}
        }
    }

    /// Layout of the drill screen for `area`. Rendering and mouse
    /// hit-testing share it so they agree on where tokens are.
    pub fn drill_layout(&self, area: Rect) -> DrillLayout {
        let footer_rows = pack_hint_lines(&drill_hints(&self.drill), area.width as usize).len();
        DrillLayout::new(area, &self.drill, footer_rows as u16)
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.screen != AppScreen::Drill || self.drill.sentence_loading {
            return;
        }
        let id = self.token_id_at(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved => self.drill.hover(id),
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(id) = id {
                    self.drill.hover(Some(id));
                    let requests = self.drill.lookup_token(id);
                    self.send(requests);
                }
            }
            _ => {}
        }
    }

    fn token_id_at(&self, column: u16, row: u16) -> Option<u32> {
        let current = self.drill.current.as_ref()?;
        let inner = token_origin(self.drill_layout(self.viewport).sentence);
        let layout = layout_tokens(&current.data.tokens, inner.width);
        let index = hit_test(&layout, inner, column, row)?;
        current.data.tokens[index].id
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::mpsc;

    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::api::{ApiError, Backend};
    use crate::event::AppEvent;
    use crate::session::result::SentenceResult;
    use crate::session::sentence::SentenceData;
    use crate::session::validation::ValidationMode;

    struct Unreachable;

    impl Backend for Unreachable {
        fn fetch_sentence(&self) -> Result<SentenceData, ApiError> {
            Err(ApiError::Offline)
        }
        fn post_result(&self, _result: &SentenceResult) -> Result<(), ApiError> {
            Err(ApiError::Offline)
        }
        fn fetch_proficiency(&self) -> Result<f64, ApiError> {
            Err(ApiError::Offline)
        }
        fn translate(&self, _message: &str, _context: Option<&str>) -> Result<String, ApiError> {
            Err(ApiError::Offline)
        }
    }

    fn app() -> (App, mpsc::Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel();
        let dispatcher = Dispatcher::new(Arc::new(Unreachable), tx);
        (App::new(Config::default(), dispatcher, None), rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn proficiency_refresh_ignores_repeats_and_keeps_value_on_error() {
        let (mut app, _rx) = app();
        app.proficiency.value = Some(0.25);
        app.refresh_proficiency();
        assert!(app.proficiency.loading);
        app.refresh_proficiency();
        app.on_api(ApiResponse::Proficiency(Err(ApiError::Offline)));
        assert!(!app.proficiency.loading);
        assert_eq!(app.proficiency.display(), "0.2500");
        app.refresh_proficiency();
        app.on_api(ApiResponse::Proficiency(Ok(0.75)));
        assert_eq!(app.proficiency.display(), "0.7500");
    }

    #[test]
    fn escape_from_drill_returns_to_start() {
        let (mut app, _rx) = app();
        app.handle_start_key(key(KeyCode::Char('s')));
        assert_eq!(app.screen, AppScreen::Drill);
        assert!(app.drill.sentence_loading);
        app.handle_drill_key(key(KeyCode::Esc));
        assert_eq!(app.screen, AppScreen::Start);
        assert!(!app.drill.is_started());
    }

    #[test]
    fn theme_cycling_does_not_persist_command_line_overrides() {
        let dir = tempfile::TempDir::new().unwrap();
        let (tx, _rx) = mpsc::channel();
        let dispatcher = Dispatcher::new(Arc::new(Unreachable), tx);
        let mut config = Config::default();
        config.server_url = "http://tmp:1".to_string();
        config.validation_mode = ValidationMode::Binary;
        let mut app = App::new(config, dispatcher, None);
        app.config_path = dir.path().join("config.toml");

        let before = app.config.theme.clone();
        app.cycle_theme();
        assert_ne!(app.config.theme, before);
        assert_eq!(app.config.server_url, "http://tmp:1");

        let saved = Config::load_from(&app.config_path).unwrap();
        assert_eq!(saved.theme, app.config.theme);
        assert_eq!(saved.server_url, "http://localhost:8000");
        assert_eq!(saved.validation_mode, ValidationMode::PerWord);
    }

    #[test]
    fn history_screen_and_quit() {
        let (mut app, _rx) = app();
        app.handle_start_key(key(KeyCode::Char('h')));
        assert_eq!(app.screen, AppScreen::History);
        app.handle_history_key(key(KeyCode::Esc));
        assert_eq!(app.screen, AppScreen::Start);
        app.handle_start_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn failed_fetch_arrives_through_the_channel() {
        let (mut app, rx) = app();
        app.start_drill();
        let event = rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .unwrap();
        match event {
            AppEvent::Api(response) => app.on_api(response),
            _ => panic!("expected an api event"),
        }
        assert!(!app.drill.sentence_loading);
        assert!(app.drill.last_error.is_some());
    }
}
