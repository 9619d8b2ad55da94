use anyhow::Result;
use clap::{Parser, ValueEnum};
use crossterm::{
    event::{poll, read, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tkino::api::ApiClient;
use tkino::app::App;
use tkino::config::{Config, BASE_URL_ENV};
use tkino::event;
use tkino::resource::get_resource;
use tkino::ui::{
    self,
    splash::{render as render_splash, SplashState},
};
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Resource shown when nothing else is requested
const DEFAULT_RESOURCE: &str = "actor";

/// How long the splash waits for the first list
const FIRST_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Terminal admin console for the movie catalogue
#[derive(Parser, Debug)]
#[command(name = "tkino", version, about, long_about = None)]
struct Args {
    /// Backend base URL (overrides TKINO_BASE_URL and the config file)
    #[arg(short, long)]
    base_url: Option<String>,

    /// Resource to open first (e.g. actor, movie, movie_genre)
    #[arg(short, long)]
    resource: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    /// Run in read-only mode (block create, edit and delete)
    #[arg(long)]
    readonly: bool,

    /// Route requests through the development proxy prefix
    #[arg(long)]
    dev: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file {:?}: {}", log_path, e))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // RUST_LOG narrows further, e.g. RUST_LOG=tkino::api=trace
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::default()
            .add_directive(LevelFilter::from_level(tracing_level).into())
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("tkino started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("tkino").join("tkino.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".tkino").join("tkino.log");
    }
    PathBuf::from("tkino.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    // Resolve everything that can fail before touching the terminal
    let config = Config::load();
    let env_base_url = std::env::var(BASE_URL_ENV).ok();
    let base_url =
        config.effective_base_url(args.base_url.as_deref(), env_base_url.as_deref(), args.dev)?;
    let initial = initial_resource(&args, &config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = initialize_with_splash(&mut terminal, &args, config, base_url, &initial).await;

    match result {
        Ok(Some(mut app)) => {
            let run_result = run_app(&mut terminal, &mut app);
            cleanup_terminal(&mut terminal)?;

            if let Err(err) = run_result {
                eprintln!("Error: {err:?}");
            }
        }
        Ok(None) => {
            cleanup_terminal(&mut terminal)?;
        }
        Err(err) => {
            cleanup_terminal(&mut terminal)?;
            eprintln!("Initialization error: {err:?}");
        }
    }

    Ok(())
}

/// CLI flag, then the last viewed resource, then the default
fn initial_resource(args: &Args, config: &Config) -> String {
    if let Some(key) = &args.resource {
        return key.clone();
    }
    config
        .last_resource
        .as_deref()
        .filter(|key| get_resource(key).is_some())
        .unwrap_or(DEFAULT_RESOURCE)
        .to_string()
}

fn cleanup_terminal<B: Backend + std::io::Write>(terminal: &mut Terminal<B>) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

async fn initialize_with_splash<B: Backend>(
    terminal: &mut Terminal<B>,
    args: &Args,
    config: Config,
    base_url: String,
    initial: &str,
) -> Result<Option<App>>
where
    B::Error: Send + Sync + 'static,
{
    let mut splash = SplashState::new();
    terminal.draw(|f| render_splash(f, &splash))?;

    if check_abort()? {
        return Ok(None);
    }

    // Step 1: configuration
    tracing::info!("Using backend: {}", base_url);
    splash.set_message("Loading config");
    terminal.draw(|f| render_splash(f, &splash))?;
    splash.complete_step();

    if check_abort()? {
        return Ok(None);
    }

    // Step 2: HTTP client
    splash.set_message(&format!("Connecting to {}", base_url));
    terminal.draw(|f| render_splash(f, &splash))?;

    let client = ApiClient::new(&base_url, config.request_timeout())?;
    let mut app = App::new(client, config, args.readonly, initial)?;
    splash.complete_step();

    if check_abort()? {
        return Ok(None);
    }

    // Step 3: first list
    let label = app.current().def().label.clone();
    splash.set_message(&format!("Fetching {}", label));
    terminal.draw(|f| render_splash(f, &splash))?;

    if let Err(e) = app.switch_to(initial) {
        tracing::warn!("Initial fetch not started: {}", e);
    }
    while app.current().is_fetching() {
        match tokio::time::timeout(FIRST_LOAD_TIMEOUT, app.next_response()).await {
            Ok(Some(())) => {}
            Ok(None) => break,
            Err(_) => {
                tracing::warn!("{} still loading after {:?}", label, FIRST_LOAD_TIMEOUT);
                break;
            }
        }
    }

    splash.complete_step();
    splash.set_message("Ready!");
    terminal.draw(|f| render_splash(f, &splash))?;

    tokio::time::sleep(Duration::from_millis(200)).await;

    Ok(Some(app))
}

fn check_abort() -> Result<bool> {
    if poll(Duration::from_millis(50))? {
        if let Event::Key(key) = read()? {
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        app.drain_responses();
        terminal.draw(|f| ui::render(f, app))?;

        if event::handle_events(app)? {
            return Ok(());
        }
    }
}
