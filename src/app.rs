use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::config::{Config, ConfigStore};
use crate::controller::{Effect, SessionController, SessionEvent};
use crate::history::{HistoryEntry, HistoryLog};
use crate::passages::{load_passage, PassageLibrary, TextRequest, TextSource};
use crate::results::SessionStats;
use crate::session::SessionState;
use crate::users::{check_credentials, fetch_leaderboard, LeaderboardEntry, UserRecord, UserStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Practice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Username,
    Password,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    /// Inline message under the form
    pub status: Option<String>,
}

impl LoginForm {
    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }
}

/// Everything the terminal front end needs, independent of the terminal.
/// Time only arrives through the `at` stamps on keys and ticks.
pub struct App {
    pub screen: Screen,
    pub login: LoginForm,
    pub user: Option<UserRecord>,
    pub controller: SessionController,
    pub request: TextRequest,
    /// Text in the input field
    pub input: String,
    pub show_results: bool,
    pub leaderboard: Option<Vec<LeaderboardEntry>>,
    pub should_quit: bool,
    library: Option<PassageLibrary>,
    source: Box<dyn TextSource>,
    store: Box<dyn UserStore>,
    history: Option<HistoryLog>,
    config_store: Option<Box<dyn ConfigStore>>,
    config: Config,
    /// Stamp of the most recent key or tick
    last_event_at: Instant,
    rng: StdRng,
}

impl App {
    pub fn new(
        source: Box<dyn TextSource>,
        store: Box<dyn UserStore>,
        config: Config,
    ) -> Self {
        let library = PassageLibrary::embedded()
            .map_err(|err| warn!(error = %err, "category list unavailable"))
            .ok();

        Self {
            screen: Screen::Login,
            login: LoginForm {
                username: config.username.clone().unwrap_or_default(),
                ..LoginForm::default()
            },
            user: None,
            controller: SessionController::new(0),
            request: TextRequest::new(config.category.clone(), config.difficulty),
            input: String::new(),
            show_results: false,
            leaderboard: None,
            should_quit: false,
            library,
            source,
            store,
            history: None,
            config_store: None,
            config,
            last_event_at: Instant::now(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_history(mut self, history: HistoryLog) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_config_store(mut self, store: Box<dyn ConfigStore>) -> Self {
        self.config_store = Some(store);
        self
    }

    pub fn stats(&self) -> Option<&SessionStats> {
        self.controller.stats()
    }

    /// Credential check. On success the practice screen opens with a fresh
    /// passage; on failure the reason goes to the login status line.
    pub fn login(&mut self, username: &str, password: &str) -> bool {
        match check_credentials(self.store.as_mut(), username, password) {
            Ok(user) => {
                info!(username = %user.username, best_wpm = user.best_wpm, "logged in");
                self.controller.set_best_wpm(user.best_wpm);
                self.config.username = Some(user.username.clone());
                self.save_config();
                self.user = Some(user);
                self.login.status = None;
                self.screen = Screen::Practice;
                self.new_passage();
                true
            }
            Err(err) => {
                self.login.status = Some(err.to_string());
                false
            }
        }
    }

    pub fn on_tick(&mut self, at: Instant) {
        self.last_event_at = at;
        let effects = self.controller.handle(SessionEvent::Tick(at), at);
        self.apply_effects(effects);
    }

    pub fn on_key(&mut self, key: KeyEvent, at: Instant) {
        self.last_event_at = at;
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        match self.screen {
            Screen::Login => self.on_login_key(key),
            Screen::Practice => {
                // keys can arrive faster than ticks
                self.on_tick(at);
                self.on_practice_key(key);
            }
        }
    }

    fn on_login_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.login.toggle_focus()
            }
            KeyCode::Enter => {
                let (username, password) = (self.login.username.clone(), self.login.password.clone());
                self.login(&username, &password);
            }
            KeyCode::Backspace => {
                self.login.focused_mut().pop();
            }
            KeyCode::Char(c) => self.login.focused_mut().push(c),
            _ => {}
        }
    }

    fn on_practice_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('n') => self.new_passage(),
                KeyCode::Char('d') => self.cycle_difficulty(),
                KeyCode::Char('t') => self.cycle_category(),
                KeyCode::Char('l') => self.toggle_leaderboard(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                if self.leaderboard.is_some() {
                    self.leaderboard = None;
                } else if self.show_results {
                    self.show_results = false;
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Enter => self.on_enter(),
            KeyCode::Backspace => {
                if self.controller.accepts_input() && self.input.pop().is_some() {
                    self.send_input();
                }
            }
            KeyCode::Char(c) => {
                if self.controller.accepts_input() {
                    self.input.push(c);
                    self.send_input();
                }
            }
            _ => {}
        }
    }

    fn on_enter(&mut self) {
        match self.controller.state() {
            SessionState::Idle => self.start(self.last_event_at),
            SessionState::Active => self.submit(self.last_event_at),
            SessionState::CountingDown { .. } => {}
            SessionState::Finished => {
                if self.show_results {
                    self.show_results = false;
                } else {
                    self.new_passage();
                    self.start(self.last_event_at);
                }
            }
        }
    }

    pub fn start(&mut self, at: Instant) {
        self.last_event_at = at;
        let effects = self.controller.handle(SessionEvent::StartRequested, at);
        self.apply_effects(effects);
    }

    pub fn submit(&mut self, at: Instant) {
        self.last_event_at = at;
        let effects = self.controller.handle(SessionEvent::SubmitRequested, at);
        self.apply_effects(effects);
    }

    /// Replace the whole input field
    pub fn set_input(&mut self, text: &str, at: Instant) {
        self.last_event_at = at;
        if self.controller.accepts_input() {
            self.input = text.to_string();
            self.send_input();
        }
    }

    fn send_input(&mut self) {
        let at = self.last_event_at;
        let effects = self
            .controller
            .handle(SessionEvent::InputChanged(self.input.clone()), at);
        self.apply_effects(effects);
    }

    /// Drop the current attempt (countdown included) and load a new passage
    pub fn new_passage(&mut self) {
        let at = self.last_event_at;
        self.controller.handle(SessionEvent::NewPassageRequested, at);
        self.input.clear();
        self.show_results = false;

        let text = load_passage(self.source.as_ref(), &self.request, &mut self.rng);
        self.controller.handle(SessionEvent::PassageLoaded(text), at);
    }

    pub fn cycle_difficulty(&mut self) {
        self.request.difficulty = self.request.difficulty.next();
        self.config.difficulty = self.request.difficulty;
        self.save_config();
        self.new_passage();
    }

    pub fn cycle_category(&mut self) {
        let Some(library) = &self.library else {
            return;
        };
        let category = library.next_category(&self.request.category);
        self.request.category = category.clone();
        self.config.category = category;
        self.save_config();
        self.new_passage();
    }

    pub fn toggle_leaderboard(&mut self) {
        self.leaderboard = match self.leaderboard {
            Some(_) => None,
            None => Some(fetch_leaderboard(self.store.as_ref())),
        };
    }

    pub fn best_wpm(&self) -> u32 {
        self.controller.best_wpm()
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::CountdownStarted => {
                    self.input.clear();
                    self.show_results = false;
                }
                Effect::SessionStarted => {}
                Effect::SessionFinished(stats) => {
                    self.show_results = true;
                    self.record_history(&stats);
                }
                Effect::BestWpmImproved { wpm } => self.submit_best_wpm(wpm),
            }
        }
    }

    fn submit_best_wpm(&mut self, wpm: u32) {
        let Some(user) = self.user.as_mut() else {
            return;
        };
        // local display is updated regardless of what the store says
        user.best_wpm = wpm;
        if let Err(err) = self.store.update_best_wpm(&user.username, wpm) {
            warn!(error = %err, username = %user.username, "best score update failed");
        }
    }

    fn record_history(&self, stats: &SessionStats) {
        let Some(history) = &self.history else {
            return;
        };
        let username = self.user.as_ref().map_or("", |u| u.username.as_str());
        let entry = HistoryEntry::new(
            username,
            &self.request.category,
            self.request.difficulty,
            stats,
        );
        if let Err(err) = history.append(&entry) {
            warn!(error = %err, path = %history.path().display(), "could not write history");
        }
    }

    fn save_config(&self) {
        if let Some(store) = &self.config_store {
            if let Err(err) = store.save(&self.config) {
                warn!(error = %err, "could not save config");
            }
        }
    }
}
