use anyhow::Context;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::gateway::GatewayResolver;

mod event_loop;
mod loader;
mod logging;
mod settings;


pub fn run() -> anyhow::Result<()> {
    let (settings, settings_warning) = settings::load_settings();
    let _log_guard = logging::init(&settings.logging);
    if let Some(msg) = settings_warning {
        warn!("{msg}");
    }
    info!(version = env!("CARGO_PKG_VERSION"), "ipfs-radio starting");

    let gateway = GatewayResolver::from_settings(&settings.gateway);
    let mut audio_player = AudioPlayer::new(settings.audio.clone());
    let catalog_rx = loader::start_catalog_load(&settings)?;
    let mut app = App::new();

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::default();
    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut audio_player,
        &gateway,
        &catalog_rx,
        &mut state,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("ipfs-radio stopped");
    run_result
}
