use std::io::{self, stdin};
use std::path::PathBuf;

use anyhow::Context;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::info;

use wordsprint::{
    app::App,
    app_dirs::AppDirs,
    clock::{Clock, SystemClock},
    config::{Config, ConfigStore, FileConfigStore},
    history::HistoryLog,
    logging::init_file_logging,
    passages::{Difficulty, FixedTextSource, LibraryTextSource, TextSource},
    runtime::{AppEvent, CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker},
    users::SqliteUserStore,
};

/// timed typing practice with per-word timing charts and a local leaderboard
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// passage category (Technology, Sports, Anime, ...)
    #[clap(short = 'c', long)]
    category: Option<String>,

    /// passage difficulty
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// practice on this text instead of the passage library
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// username; with --password, log in straight away
    #[clap(short = 'u', long)]
    user: Option<String>,

    #[clap(long)]
    password: Option<String>,

    /// user database location
    #[clap(long)]
    db: Option<PathBuf>,

    /// log file location (filter with WORDSPRINT_LOG)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Command line values take precedence over the stored config
    fn apply(&self, mut config: Config) -> Config {
        if let Some(category) = &self.category {
            config.category = category.clone();
        }
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(user) = &self.user {
            config.username = Some(user.clone());
        }
        config
    }

    fn text_source(&self) -> anyhow::Result<Box<dyn TextSource>> {
        Ok(match &self.prompt {
            Some(prompt) => Box::new(FixedTextSource(prompt.clone())),
            None => Box::new(LibraryTextSource::embedded().context("loading passage library")?),
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let log_path = cli.log_file.clone().unwrap_or_else(AppDirs::log_path);
    let _log_guard = init_file_logging(&log_path)
        .with_context(|| format!("setting up logging to {}", log_path.display()))?;

    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());
    let ticker = FixedTicker::from_millis(config.tick_rate_ms);

    let db_path = cli.db.clone().unwrap_or_else(AppDirs::users_db_path);
    let users = SqliteUserStore::open(&db_path)
        .with_context(|| format!("opening user database {}", db_path.display()))?;

    let mut app = App::new(cli.text_source()?, Box::new(users), config)
        .with_history(HistoryLog::new(AppDirs::history_path()))
        .with_config_store(Box::new(config_store));

    if let (Some(user), Some(password)) = (&cli.user, &cli.password) {
        app.login(user, password);
    }
    info!(db = %db_path.display(), "starting");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(CrosstermEventSource::new(), ticker, SystemClock);
    let result = run(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("exiting");
    result
}

fn run<B: Backend, E: EventSource, T: Ticker, C: Clock>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T, C>,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            AppEvent::Key { key, at } => app.on_key(key, at),
            AppEvent::Resize => {}
            AppEvent::Tick(at) => app.on_tick(at),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
