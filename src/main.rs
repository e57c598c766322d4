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
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use tracing::info;

use typespeed::{
    app::{App, Control},
    app_dirs::AppDirs,
    auth::LocalAuthenticator,
    config::{ConfigStore, FileConfigStore},
    engine::{TypingTestEngine, SAMPLE_TEXT},
    logging,
    runtime::{
        AppEventSource, ChannelEventSource, Clock, IntervalTicker, Runner, SystemClock,
        TickSource, TICK_INTERVAL,
    },
    ui,
};

/// Upper bound on how long the screen goes without a redraw
const FRAME_INTERVAL: Duration = Duration::from_millis(250);

/// sixty second typing test with live wpm and accuracy
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A sixty second typing test: reproduce the sample text while words-per-minute and accuracy update live."
)]
pub struct Cli {
    /// skip the sign-in form and start as a guest
    #[clap(long)]
    no_auth: bool,

    /// config file to use instead of the default location
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// tracing filter for the log file, e.g. "debug" (overrides the config file)
    #[clap(long)]
    log_level: Option<String>,

    /// where to write the log file
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = cli.config_store();
    let config = store.load();

    let log_filter = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    let log_path = cli.log_file.clone().unwrap_or_else(AppDirs::log_path);
    if let Err(err) = logging::init(&log_filter, &log_path) {
        eprintln!("logging disabled: {err}");
    }
    info!(config = %store.path().display(), "starting typespeed");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let source = ChannelEventSource::with_terminal_input();
    let ticker = IntervalTicker::new(source.sender(), TICK_INTERVAL);
    let engine = TypingTestEngine::new(SAMPLE_TEXT, ticker, SystemClock);
    let mut app = App::new(
        engine,
        Box::new(LocalAuthenticator::new()),
        Box::new(store),
        config,
    );
    if cli.no_auth {
        app.continue_as_guest();
    }
    let runner = Runner::new(source, FRAME_INTERVAL);

    let result = run_app(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("exiting typespeed");
    result
}

fn run_app<B: Backend, E: AppEventSource, T: TickSource, C: Clock>(
    terminal: &mut Terminal<B>,
    app: &mut App<T, C>,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        if app.handle_event(runner.step()) == Control::Quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use typespeed::{
        config::Config,
        engine::TestState,
        runtime::{AppEvent, ManualClock, ManualTickSource},
    };

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["typespeed"]);

        assert!(!cli.no_auth);
        assert_eq!(cli.config, None);
        assert_eq!(cli.log_level, None);
        assert_eq!(cli.log_file, None);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "typespeed",
            "--no-auth",
            "-c",
            "/tmp/ts.json",
            "--log-level",
            "debug",
            "--log-file",
            "/tmp/ts.log",
        ]);

        assert!(cli.no_auth);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/ts.json")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/ts.log")));
    }

    #[test]
    fn test_cli_config_store_uses_given_path() {
        let cli = Cli::parse_from(["typespeed", "--config", "/tmp/elsewhere.json"]);
        assert_eq!(
            cli.config_store().path(),
            PathBuf::from("/tmp/elsewhere.json").as_path()
        );
    }

    #[test]
    fn test_cli_rejects_unknown_flag() {
        assert!(Cli::try_parse_from(["typespeed", "--duration", "30"]).is_err());
    }

    #[test]
    fn test_run_app_until_quit() {
        let dir = tempfile::tempdir().unwrap();
        let ticks = ManualTickSource::new();
        let clock = ManualClock::starting_at(1_700_000_000_000);
        let engine = TypingTestEngine::new("hi there", ticks.clone(), clock.clone());
        let mut app = App::new(
            engine,
            Box::new(LocalAuthenticator::new()),
            Box::new(FileConfigStore::with_path(dir.path().join("config.json"))),
            Config {
                require_sign_in: false,
                ..Config::default()
            },
        );

        let source = ChannelEventSource::new();
        let tx = source.sender();
        tx.send(key(KeyCode::Enter)).unwrap();
        tx.send(key(KeyCode::Char('h'))).unwrap();
        tx.send(key(KeyCode::Char('i'))).unwrap();
        tx.send(AppEvent::Tick(ticks.last_generation() + 1)).unwrap();
        tx.send(key(KeyCode::Esc)).unwrap();
        tx.send(key(KeyCode::Char('q'))).unwrap();
        let runner = Runner::new(source, Duration::from_millis(1));

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        run_app(&mut terminal, &mut app, &runner).unwrap();

        assert_eq!(app.engine.state(), TestState::Paused);
        assert_eq!(app.engine.typed_text(), "hi");
        assert_eq!(app.engine.remaining_seconds(), 59);
    }
}
