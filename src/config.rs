use serde::{Deserialize, Serialize};
use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use clap::builder::{BoolishValueParser, FalseyValueParser};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::constants::*;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
///
/// Every field is optional so a YAML file only needs to carry what it changes;
/// the section accessors below resolve the built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General options
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    /// Only warnings and errors
    pub quiet: Option<bool>,
    pub api: Option<ApiConfig>,
    pub hardware: Option<HardwareConfig>,
    pub gpio: Option<GpioConfig>,
    /// display-specific geometry & behavior
    pub display: Option<DisplayConfig>,
    pub radio: Option<RadioConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub poll_interval_secs: Option<u64>,
    pub failure_threshold: Option<u32>,
}

impl ApiConfig {
    pub fn base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| API_BASE_URL.to_string())
    }
    pub fn timeout_ms(&self) -> u64 { self.timeout_ms.unwrap_or(API_TIMEOUT_MS) }
    pub fn connect_timeout_ms(&self) -> u64 { self.connect_timeout_ms.unwrap_or(API_CONNECT_TIMEOUT_MS) }
    pub fn poll_interval_secs(&self) -> u64 { self.poll_interval_secs.unwrap_or(SONG_POLL_SECS) }
    pub fn failure_threshold(&self) -> u32 { self.failure_threshold.unwrap_or(POLL_FAILURE_THRESHOLD) }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HardwareConfig {
    /// false runs without GPIO or the LCD (keyboard + mock display)
    pub enabled: Option<bool>,
}

/// BCM pin numbers of the five buttons
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GpioConfig {
    pub power_pin: Option<u8>,
    pub volume_up_pin: Option<u8>,
    pub volume_down_pin: Option<u8>,
    pub channel_up_pin: Option<u8>,
    pub channel_down_pin: Option<u8>,
}

impl GpioConfig {
    pub fn power_pin(&self) -> u8 { self.power_pin.unwrap_or(GPIO_POWER) }
    pub fn volume_up_pin(&self) -> u8 { self.volume_up_pin.unwrap_or(GPIO_VOLUME_UP) }
    pub fn volume_down_pin(&self) -> u8 { self.volume_down_pin.unwrap_or(GPIO_VOLUME_DOWN) }
    pub fn channel_up_pin(&self) -> u8 { self.channel_up_pin.unwrap_or(GPIO_CHANNEL_UP) }
    pub fn channel_down_pin(&self) -> u8 { self.channel_down_pin.unwrap_or(GPIO_CHANNEL_DOWN) }

    pub fn pins(&self) -> [u8; 5] {
        [
            self.power_pin(),
            self.volume_up_pin(),
            self.volume_down_pin(),
            self.channel_up_pin(),
            self.channel_down_pin(),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub enabled: Option<bool>,
    pub driver: Option<DriverKind>, // <- strongly-typed driver selection
    pub bus: Option<BusConfig>,     // <- i2c wiring
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub render_interval_ms: Option<u64>,
    pub scroll_every_ticks: Option<u32>,
    pub scroll_hold_ticks: Option<u32>,
}

impl DisplayConfig {
    pub fn enabled(&self) -> bool { self.enabled.unwrap_or(true) }
    pub fn driver(&self) -> DriverKind { self.driver.unwrap_or(DriverKind::Hd44780) }
    pub fn bus(&self) -> BusConfig { self.bus.clone().unwrap_or_default() }
    pub fn width(&self) -> usize { self.width.unwrap_or(DISPLAY_COLUMNS) }
    pub fn height(&self) -> usize { self.height.unwrap_or(DISPLAY_ROWS) }
    pub fn render_interval_ms(&self) -> u64 { self.render_interval_ms.unwrap_or(RENDER_INTERVAL_MS) }
    pub fn scroll_every_ticks(&self) -> u32 { self.scroll_every_ticks.unwrap_or(SCROLL_EVERY_TICKS) }
    pub fn scroll_hold_ticks(&self) -> u32 { self.scroll_hold_ticks.unwrap_or(0) }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BusConfig {
    pub bus: Option<String>,        // e.g. "/dev/i2c-1"
    pub address: Option<u8>,        // e.g. 0x27 (I2C addresses are 7-bit, stored in u8)
}

impl BusConfig {
    pub fn bus(&self) -> String { self.bus.clone().unwrap_or_else(|| LCD_I2C_BUS.to_string()) }
    pub fn address(&self) -> u8 { self.address.unwrap_or(LCD_I2C_ADDRESS) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// HD44780 character LCD on a PCF8574 I2C backpack
    Hd44780,
    /// Software display, logs what would be shown
    Mock,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RadioConfig {
    pub state_file: Option<PathBuf>,
    pub debounce_ms: Option<u64>,
    pub startup_volume: Option<u8>,
    pub volume_when_off: Option<bool>,
    pub volume_screen_ms: Option<u64>,
    pub channel_screen_ms: Option<u64>,
    pub error_screen_ms: Option<u64>,
}

impl RadioConfig {
    pub fn state_file(&self) -> PathBuf {
        self.state_file.clone().unwrap_or_else(|| PathBuf::from(STATE_FILE))
    }
    pub fn debounce_ms(&self) -> u64 { self.debounce_ms.unwrap_or(DEBOUNCE_MS) }
    pub fn startup_volume(&self) -> u8 { self.startup_volume.unwrap_or(STARTUP_VOLUME) }
    pub fn volume_when_off(&self) -> bool { self.volume_when_off.unwrap_or(true) }
    pub fn volume_screen_ms(&self) -> u64 { self.volume_screen_ms.unwrap_or(VOLUME_SCREEN_MS) }
    pub fn channel_screen_ms(&self) -> u64 { self.channel_screen_ms.unwrap_or(CHANNEL_SCREEN_MS) }
    pub fn error_screen_ms(&self) -> u64 { self.error_screen_ms.unwrap_or(ERROR_SCREEN_MS) }
}

impl Config {
    pub fn api(&self) -> ApiConfig { self.api.clone().unwrap_or_default() }
    pub fn gpio(&self) -> GpioConfig { self.gpio.clone().unwrap_or_default() }
    pub fn display(&self) -> DisplayConfig { self.display.clone().unwrap_or_default() }
    pub fn radio(&self) -> RadioConfig { self.radio.clone().unwrap_or_default() }

    pub fn hardware_enabled(&self) -> bool {
        self.hardware.as_ref().and_then(|h| h.enabled).unwrap_or(true)
    }

    pub fn quiet(&self) -> bool { self.quiet.unwrap_or(false) }

    /// Effective log filter: explicit level wins, quiet drops to warn
    pub fn log_filter(&self) -> String {
        match (&self.log_level, self.quiet()) {
            (Some(level), _) => level.clone(),
            (None, true) => "warn".to_string(),
            (None, false) => "info".to_string(),
        }
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "PlexRadio", about = "PlexRadio panel - LCD and buttons for a remote radio", disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// shorthand for --log-level debug
    #[arg(long, action = ArgAction::SetTrue)]
    pub debug: bool,
    /// only log warnings and errors
    #[arg(long, env = "RADIO_QUIET", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
    pub quiet: bool,
    /// radio API base url
    #[arg(long, env = "PLEX_RADIO_API_URL")]
    pub api_url: Option<String>,
    /// use the GPIO buttons and the LCD
    #[arg(long, env = "HARDWARE_MODE", value_parser = BoolishValueParser::new())]
    pub hardware_mode: Option<bool>,
    #[arg(long, value_enum)]
    pub display_driver: Option<DriverKind>,
    #[arg(long)]
    pub display_width: Option<usize>,
    #[arg(long)]
    pub display_height: Option<usize>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub state_file: Option<PathBuf>,
    /// read buttons from the keyboard as well as GPIO
    #[arg(long, action = ArgAction::SetTrue)]
    pub keyboard: bool,
    /// show "Screen Cleared", blank the display and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub clear_screen: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: read YAML, merge, apply CLI, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Built-in defaults plus CLI overrides, used when the file cannot be loaded.
/// Overrides that fail validation are dropped and the plain defaults returned.
pub fn defaults_with(cli: &Cli) -> Config {
    let mut cfg = Config::default();
    apply_cli_overrides(&mut cfg, cli);
    match validate(&cfg) {
        Ok(()) => cfg,
        Err(_) => Config::default(),
    }
}

/// Pretty YAML of effective config (nice for debugging)
pub fn dump(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/plexradio/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/plexradio/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/plexradio.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["plexradio.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    // an empty file is a valid "no changes" config
    if s.trim().is_empty() {
        return Ok(Config::default());
    }
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

macro_rules! merge_fields {
    ($dst:expr, $src:expr, $($field:ident),+) => {
        $( if $src.$field.is_some() { $dst.$field = $src.$field; } )+
    };
}

macro_rules! merge_section {
    ($dst:expr, $src:expr, $merge:ident) => {
        match (&mut $dst, $src) {
            (None, Some(c)) => $dst = Some(c),
            (Some(d), Some(s)) => $merge(d, s),
            _ => {}
        }
    };
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    // top-level
    merge_fields!(dst, src, log_level, quiet);
    merge_section!(dst.api, src.api, merge_api);
    merge_section!(dst.hardware, src.hardware, merge_hardware);
    merge_section!(dst.gpio, src.gpio, merge_gpio);
    merge_section!(dst.display, src.display, merge_display);
    merge_section!(dst.radio, src.radio, merge_radio);
}

fn merge_api(dst: &mut ApiConfig, src: ApiConfig) {
    merge_fields!(dst, src, base_url, timeout_ms, connect_timeout_ms, poll_interval_secs, failure_threshold);
}

fn merge_hardware(dst: &mut HardwareConfig, src: HardwareConfig) {
    merge_fields!(dst, src, enabled);
}

fn merge_gpio(dst: &mut GpioConfig, src: GpioConfig) {
    merge_fields!(dst, src, power_pin, volume_up_pin, volume_down_pin, channel_up_pin, channel_down_pin);
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    merge_fields!(dst, src, enabled, driver, bus, width, height, render_interval_ms, scroll_every_ticks, scroll_hold_ticks);
}

fn merge_radio(dst: &mut RadioConfig, src: RadioConfig) {
    merge_fields!(dst, src, state_file, debounce_ms, startup_volume, volume_when_off, volume_screen_ms, channel_screen_ms, error_screen_ms);
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()       { cfg.log_level = cli.log_level.clone(); }
    if cli.debug                     { cfg.log_level = Some("debug".to_string()); }
    if cli.quiet                     { cfg.quiet = Some(true); }

    if cli.api_url.is_some() {
        cfg.api.get_or_insert_with(ApiConfig::default).base_url = cli.api_url.clone();
    }
    if cli.hardware_mode.is_some() {
        cfg.hardware.get_or_insert_with(HardwareConfig::default).enabled = cli.hardware_mode;
    }
    if cli.state_file.is_some() {
        cfg.radio.get_or_insert_with(RadioConfig::default).state_file = cli.state_file.clone();
    }

    let any_display = cli.display_driver.is_some()
        || cli.display_width.is_some()
        || cli.display_height.is_some();

    if any_display && cfg.display.is_none() {
        cfg.display = Some(DisplayConfig::default());
    }
    if let Some(display) = cfg.display.as_mut() {
        if cli.display_driver.is_some()  { display.driver = cli.display_driver; }
        if cli.display_width.is_some()   { display.width = cli.display_width; }
        if cli.display_height.is_some()  { display.height = cli.display_height; }
    }
}

/// Reject geometry, timing and pin settings the panel cannot run with
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let display = cfg.display();
    if display.width() == 0 || display.height() == 0 {
        return Err(ConfigError::Validation("display width/height must be > 0".into()));
    }
    if display.render_interval_ms() == 0 {
        return Err(ConfigError::Validation("display render_interval_ms must be > 0".into()));
    }

    let mut pins = cfg.gpio().pins().to_vec();
    pins.sort_unstable();
    pins.dedup();
    if pins.len() != 5 {
        return Err(ConfigError::Validation("gpio pins must be five distinct BCM numbers".into()));
    }

    let radio = cfg.radio();
    if radio.debounce_ms() == 0 {
        return Err(ConfigError::Validation("radio debounce_ms must be > 0".into()));
    }
    if radio.startup_volume() > VOLUME_MAX {
        return Err(ConfigError::Validation("radio startup_volume must be 0..=100".into()));
    }

    let api = cfg.api();
    if api.base_url().trim().is_empty() {
        return Err(ConfigError::Validation("api base_url must not be empty".into()));
    }
    if api.timeout_ms() == 0 || api.poll_interval_secs() == 0 {
        return Err(ConfigError::Validation("api timeout_ms/poll_interval_secs must be > 0".into()));
    }
    Ok(())
}
