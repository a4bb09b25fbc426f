mod app;
mod config;
mod event;
mod games;
mod scheduler;
mod scores;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use app::App;
use config::{load_settings, project_paths, save_settings_atomic, Settings};
use event::{Event, EventHandler};
use games::KeyHold;
use scores::ScoreStore;

#[derive(Parser, Debug, Clone)]
#[command(name = "retrocade")]
#[command(version, about = "Snake, Pong, Tetris and Fruit Ninja in your terminal")]
struct Cli {
    /// Player name offered when saving a score
    #[arg(long)]
    name: Option<String>,

    /// Fixed RNG seed for a reproducible session
    #[arg(long)]
    seed: Option<u64>,

    /// Score database to use instead of the default location
    #[arg(long)]
    scores: Option<PathBuf>,

    /// Milliseconds between frames
    #[arg(long)]
    tick_rate_ms: Option<u64>,
}

fn init_logging(path: &Path) {
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    // stdout belongs to the TUI, so everything goes to the log file
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = project_paths()?;
    init_logging(&paths.log_path);
    log::info!("retrocade {} starting", env!("CARGO_PKG_VERSION"));

    let saved = load_settings(&paths.settings_path);
    let mut settings = saved.clone();
    if let Some(name) = cli.name.as_deref().and_then(config::normalize_name) {
        settings.player_name = name;
    }
    if let Some(seed) = cli.seed {
        settings.seed = Some(seed);
    }
    if let Some(ms) = cli.tick_rate_ms {
        settings.tick_rate_ms = ms;
    }
    if let Some(seed) = settings.seed {
        log::info!("using fixed seed {seed}");
    }

    let scores_path = cli
        .scores
        .clone()
        .or_else(|| settings.scores_path.clone())
        .unwrap_or_else(|| paths.scores_path.clone());
    let (store, status) = match ScoreStore::open(&scores_path) {
        Ok(store) => (store, None),
        Err(e) => {
            log::warn!("{e:#}");
            (
                ScoreStore::in_memory(),
                Some(format!("Score database unreadable, this session's scores will not be kept: {e}")),
            )
        }
    };

    let mut app = App::new(&settings, store);
    app.status = status;

    let result = run(&mut app, settings.tick_rate_ms());

    if !app.player_name().is_empty() && app.player_name() != saved.player_name {
        let updated = Settings {
            player_name: app.player_name().to_string(),
            ..saved
        };
        if let Err(e) = save_settings_atomic(&paths.settings_path, &updated) {
            log::warn!("could not remember player name: {e:#}");
        }
    }
    log::info!("retrocade exiting");
    result
}

fn run(app: &mut App, tick_rate_ms: u64) -> Result<()> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    // Key release events drive the held paddle and soft drop where supported
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    log::debug!("keyboard enhancement: {enhanced}");
    app.set_key_hold(if enhanced { KeyHold::Release } else { KeyHold::Repeat });

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = event_loop(&mut terminal, app, tick_rate_ms);

    // Restore terminal
    if enhanced {
        let _ = execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tick_rate_ms: u64,
) -> Result<()> {
    let event_handler = EventHandler::new(tick_rate_ms);

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        match event_handler.next()? {
            Event::Tick => app.on_tick(),
            Event::Key(key) => app.on_key(key),
            Event::Mouse(mouse) => app.on_mouse(mouse),
            Event::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
