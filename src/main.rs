use std::io::{self, stdin};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use typequote::{
    app::App,
    app_dirs::AppDirs,
    clock::SystemClock,
    config::{Config, ConfigStore, FileConfigStore},
    engine::Engine,
    feedback::FeedbackMode,
    history::{self, HistoryLog},
    logging,
    phrases::{BuiltinPool, PhrasePool},
    runtime::{ChannelEventSource, Runner, UI_TICK},
};

/// typing test over a pool of quotes
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal typing test. Type the phrase on screen and watch your speed and accuracy update on every keystroke; a new phrase follows a few seconds after you finish."
)]
pub struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,

    /// custom prompt to type instead of drawing from a phrase pool
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// built-in phrase pool to draw from
    #[clap(short = 'l', long, value_enum)]
    pool: Option<BuiltinPool>,

    /// phrase file: a .json pool or plain text with one phrase per line
    #[clap(short = 'f', long)]
    phrases: Option<PathBuf>,

    /// audible keystroke feedback
    #[clap(long, value_enum)]
    feedback: Option<FeedbackMode>,

    /// seconds before the next phrase appears once one is finished
    #[clap(short = 'd', long)]
    restart_delay: Option<u64>,

    /// don't record finished sessions
    #[clap(long)]
    no_history: bool,

    /// log file (defaults to the data directory)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// debug logging
    #[clap(short, long)]
    verbose: bool,

    /// store the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// print recently finished sessions and a summary
    History {
        /// number of sessions to list
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// history file to read
        #[clap(long)]
        file: Option<PathBuf>,
    },
}

impl Cli {
    /// Layers command line flags over the stored config.
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(pool) = self.pool {
            cfg.pool = pool;
            cfg.phrases_file = None;
        }
        if let Some(path) = &self.phrases {
            cfg.phrases_file = Some(path.clone());
        }
        if let Some(feedback) = self.feedback {
            cfg.feedback = feedback;
        }
        if let Some(secs) = self.restart_delay {
            cfg.restart_delay_secs = secs;
        }
        if self.no_history {
            cfg.history = false;
        }
        cfg
    }

    fn phrase_pool(&self, cfg: &Config) -> Result<PhrasePool> {
        if let Some(prompt) = &self.prompt {
            return PhrasePool::single(prompt.clone());
        }
        match &cfg.phrases_file {
            Some(path) => PhrasePool::from_file(path),
            None => PhrasePool::builtin(cfg.pool),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(AppDirs::log_path);
    if let Err(e) = logging::init(&log_path, cli.verbose) {
        eprintln!("logging disabled: {e:#}");
    }

    let store = FileConfigStore::new();
    let cfg = cli.apply(store.load());

    if let Some(Command::History { limit, file }) = &cli.command {
        let log = HistoryLog::new(file.clone().unwrap_or_else(AppDirs::history_path));
        println!("{}", history::render_table(&log.load()?, *limit));
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let pool = cli.phrase_pool(&cfg)?;
    if cli.save_config {
        store
            .save(&cfg)
            .with_context(|| format!("saving {}", store.path().display()))?;
    }

    let history = cfg.history.then(|| HistoryLog::new(AppDirs::history_path()));
    let engine = Engine::new(pool, SystemClock, cfg.feedback.into_feedback(), cfg.timing());
    let mut app = App::new(engine, cfg.message_timeout(), history);

    enable_raw_mode().context("enabling raw mode")?;
    let mut terminal = undo_on_error(
        || {
            let mut stdout = io::stdout();
            execute!(stdout, EnterAlternateScreen)?;
            Terminal::new(CrosstermBackend::new(stdout))
        },
        restore_terminal,
    )
    .context("setting up the terminal")?;

    let result = start_tui(&mut terminal, &mut app);

    restore_terminal().context("restoring the terminal")?;
    result
}

/// Runs `setup`; if it fails, runs `undo` before handing the error back.
fn undo_on_error<T>(
    setup: impl FnOnce() -> io::Result<T>,
    undo: impl FnOnce() -> io::Result<()>,
) -> io::Result<T> {
    setup().inspect_err(|_| {
        if let Err(e) = undo() {
            log::warn!("terminal left in a bad state: {e}");
        }
    })
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen, Show)
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App<SystemClock>) -> Result<()> {
    let runner = Runner::new(ChannelEventSource::terminal(), UI_TICK);

    while !app.should_quit() {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        app.handle(runner.step());
    }

    log::info!("quitting after {} sessions", app.completed_sessions());
    Ok(())
}
