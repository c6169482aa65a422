/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Every key is optional; missing keys fall back to the classic values.
/// The maze itself is compiled in and not configurable.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::GameError;

// ── Public Config Structs ──

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub rules: RulesConfig,
    pub gamepad: GamepadConfig,
    pub log: LogConfig,
    pub register_summary: bool,
    pub seed: Option<u64>,
}

/// Timing and odds used by the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct RulesConfig {
    pub tick_rate_ms: u64,
    pub power_up_ms: u64,
    pub subdue_ms: u64,
    pub power_pickup_chance: f64,
    pub chase_chance: f64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            tick_rate_ms: default_tick_rate(),
            power_up_ms: default_power_up(),
            subdue_ms: default_subdue(),
            power_pickup_chance: default_power_pickup(),
            chase_chance: default_chase(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GamepadConfig {
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogConfig {
    /// No file = logging disabled (stderr would tear the alternate screen).
    pub file: Option<PathBuf>,
    pub level: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    chance: TomlChance,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    log: TomlLog,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_power_up")]
    power_up_ms: u64,
    #[serde(default = "default_subdue")]
    subdue_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlChance {
    #[serde(default = "default_power_pickup")]
    power_pickup: f64,
    #[serde(default = "default_chase")]
    chase: f64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_restart")]
    restart: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default)]
    file: Option<String>,
    #[serde(default = "default_log_level")]
    level: String,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_register_summary")]
    register_summary: bool,
    #[serde(default)]
    seed: Option<u64>,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 100 }   // 10 ticks per second
fn default_power_up() -> u64 { 5000 }
fn default_subdue() -> u64 { 5000 }
fn default_power_pickup() -> f64 { 0.05 }
fn default_chase() -> f64 { 0.5 }

fn default_pad_restart() -> Vec<String> { vec!["Start".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }
fn default_log_level() -> String { "info".into() }
fn default_register_summary() -> bool { true }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            power_up_ms: default_power_up(),
            subdue_ms: default_subdue(),
        }
    }
}

impl Default for TomlChance {
    fn default() -> Self {
        TomlChance { power_pickup: default_power_pickup(), chase: default_chase() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad { restart: default_pad_restart(), quit: default_pad_quit() }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog { file: None, level: default_log_level() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { register_summary: default_register_summary(), seed: None }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// A missing file yields defaults; an unreadable or malformed one is
    /// reported so the caller can warn and fall back.
    pub fn load() -> Result<Self, GameError> {
        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if path.exists() {
                return GameConfig::from_file(&path);
            }
        }
        Ok(GameConfig::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, GameError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| GameError::ConfigRead { path: path.to_path_buf(), source })?;
        GameConfig::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, GameError> {
        let raw: TomlConfig = toml::from_str(text)?;
        Ok(GameConfig::from_toml(raw))
    }

    fn from_toml(raw: TomlConfig) -> Self {
        GameConfig {
            rules: RulesConfig {
                tick_rate_ms: raw.timing.tick_rate_ms.max(1),
                power_up_ms: raw.timing.power_up_ms,
                subdue_ms: raw.timing.subdue_ms,
                power_pickup_chance: raw.chance.power_pickup.clamp(0.0, 1.0),
                chase_chance: raw.chance.chase.clamp(0.0, 1.0),
            },
            gamepad: GamepadConfig {
                restart: raw.gamepad.restart,
                quit: raw.gamepad.quit,
            },
            log: LogConfig {
                file: raw.log.file.map(PathBuf::from),
                level: raw.log.level,
            },
            register_summary: raw.general.register_summary,
            seed: raw.general.seed,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}
