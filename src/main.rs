/// Entry point: load config, set up logging and the terminal, run the
/// session loop, restore the terminal.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::File;
use std::process;

use rand::rngs::StdRng;
use rand::SeedableRng;

use config::{GameConfig, LogConfig};
use domain::ai::RngSource;
use error::GameError;
use sim::clock::SystemClock;
use sim::register::{MoveObserver, QuantumRegister};
use sim::session::Session;
use ui::gamepad::GamepadState;
use ui::input::{Controls, InputState};
use ui::renderer::Renderer;

fn main() {
    let (config, config_err) = match GameConfig::load() {
        Ok(cfg) => (cfg, None),
        Err(e) => {
            eprintln!("Warning: {e}; using default settings");
            (GameConfig::default(), Some(e))
        }
    };

    if let Err(e) = init_logging(&config.log) {
        eprintln!("Warning: {e}; logging disabled");
    }
    if let Some(e) = config_err {
        log::warn!("config ignored: {e}");
    }

    let mut rng = RngSource(match config.seed {
        Some(seed) => {
            log::info!("seeded rng: {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    });
    let mut register = QuantumRegister::bell();

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        let _ = renderer.cleanup();
        eprintln!("Terminal init failed: {e}");
        process::exit(1);
    }

    let mut keys = InputState::new();
    keys.honor_release = renderer.reports_release();
    let mut pad = GamepadState::new();
    pad.load_button_config(&config.gamepad);
    log::info!("gamepad {}", if pad.connected { "connected" } else { "not found" });
    let mut controls = Controls::new(keys, pad);
    let mut clock = SystemClock::new(config.rules.tick_rate_ms);

    let result = Session::new(
        &mut controls,
        &mut renderer,
        &mut clock,
        &mut rng,
        &mut register,
        config.rules.clone(),
    )
    .run();

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if config.register_summary {
        print!("{}", register.summary());
    }

    if let Err(e) = result {
        log::error!("{e}");
        eprintln!("Game error: {e}");
        process::exit(1);
    }
    log::info!("bye");
}

/// Install env_logger writing to the configured file. Without a file no
/// logger is installed and the log macros stay silent.
fn init_logging(cfg: &LogConfig) -> Result<(), GameError> {
    let Some(path) = &cfg.file else { return Ok(()) };
    let file = File::create(path)
        .map_err(|source| GameError::LogFile { path: path.clone(), source })?;
    env_logger::Builder::new()
        .parse_filters(&cfg.level)
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
