use activity_timeline::{
    app::{App, AppAction},
    clock::{Clock, SystemClock},
    config::TrackerConfig,
    demo,
    page::Location,
    runtime::{CrosstermEventSource, HostEvent, Runner},
    session::SessionStore,
    storage::{FileStorage, Storage},
};
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
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::EnvFilter;

const TICK_RATE_MS: u64 = 1000;

/// session activity tracker with a collapsible timeline panel
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Mounts an activity timeline widget into a small storefront page, records page views, primary-action clicks and form submissions, and keeps the session in a local store across runs."
)]
pub struct Cli {
    /// document path the page is served from; its last segment names the page
    #[clap(long, default_value = "/index.html")]
    path: String,

    /// directory backing the local session store
    #[clap(long)]
    storage_dir: Option<PathBuf>,

    /// seconds of inactivity after which a new session starts
    #[clap(long, default_value_t = 3600)]
    inactivity_timeout_secs: u64,

    /// write logs here (filtered by RUST_LOG); nothing is logged without it
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig::default().with_inactivity_timeout_secs(self.inactivity_timeout_secs)
    }

    fn storage(&self) -> FileStorage {
        self.storage_dir
            .as_ref()
            .map(FileStorage::with_dir)
            .unwrap_or_default()
    }
}

fn init_logging(path: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| e as Box<dyn Error>)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging(cli.log_file.as_deref())?;

    let config = cli.tracker_config();
    let store = SessionStore::open(cli.storage(), SystemClock, &config, &Location::new(&cli.path));
    let mut app = App::new(demo::storefront(), store, &config);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, S: Storage, C: Clock>(
    terminal: &mut Terminal<B>,
    app: &mut App<S, C>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            HostEvent::Key(key) => {
                if app.on_key(key) == AppAction::Quit {
                    break;
                }
            }
            HostEvent::Resize => {}
            HostEvent::Tick => app.on_tick(),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["activity-timeline"]);

        assert_eq!(cli.path, "/index.html");
        assert_eq!(cli.storage_dir, None);
        assert_eq!(cli.inactivity_timeout_secs, 3600);
        assert_eq!(cli.log_file, None);
        assert_eq!(cli.tracker_config(), TrackerConfig::default());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "activity-timeline",
            "--path",
            "/shop/cart.html",
            "--inactivity-timeout-secs",
            "60",
            "--storage-dir",
            "/tmp/at",
        ]);

        assert_eq!(Location::new(&cli.path).page_name(), "cart.html");
        assert_eq!(cli.tracker_config().inactivity_timeout_ms, 60_000);
        assert_eq!(cli.storage().dir(), Path::new("/tmp/at"));
    }

    #[test]
    fn test_storage_dir_is_used_for_session() {
        let dir = tempdir().unwrap();
        let cli = Cli::parse_from([
            "activity-timeline",
            "--storage-dir",
            dir.path().to_str().unwrap(),
        ]);
        let config = cli.tracker_config();
        let store = SessionStore::open(cli.storage(), SystemClock, &config, &Location::new("/"));

        let raw = cli.storage().get_item(&config.storage_key).unwrap().unwrap();
        assert!(raw.contains(&store.record().session_id));
    }

    #[test]
    fn test_tick_rate_constant() {
        assert_eq!(TICK_RATE_MS, 1000);
    }
}
