use std::path::PathBuf;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::ratings::MinutesUnit;
use crate::season::SeasonOptions;
use crate::srs::DEFAULT_SRS_ITERATIONS;
use crate::store::{self, SeasonSpan};
use crate::windowed::{HalfLife, WindowOptions};

const CACHE_DIR: &str = "databall";
const FALLBACK_DB_PATH: &str = "databall.sqlite";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub db_path: PathBuf,
    pub window: Option<usize>,
    pub weighted: bool,
    pub half_life: Option<f64>,
    pub srs_iterations: usize,
    pub minutes: MinutesUnit,
    pub seasons: Option<SeasonSpan>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: store::default_db_path().unwrap_or_else(|| PathBuf::from(FALLBACK_DB_PATH)),
            window: None,
            weighted: false,
            half_life: None,
            srs_iterations: DEFAULT_SRS_ITERATIONS,
            minutes: MinutesUnit::Infer,
            seasons: None,
        }
    }
}

impl Settings {
    /// Loads `.env` files, then reads `DATABALL_*` variables and the given
    /// command-line arguments (without the program name).
    pub fn load(args: &[String]) -> Result<Self, ConfigError> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        let mut settings = Self::from_lookup(|key| std::env::var(key).ok())?;
        settings.apply_args(args)?;
        Ok(settings)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut out = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get("DATABALL_DB_PATH") {
            out.db_path = PathBuf::from(path.trim());
        }
        if let Some(raw) = get("DATABALL_WINDOW") {
            out.window = Some(parse_window(&raw)?);
        }
        if let Some(raw) = get("DATABALL_SRS_ITERATIONS") {
            out.srs_iterations = parse_iterations(&raw)?;
        }
        if let Some(raw) = get("DATABALL_MINUTES_UNIT") {
            out.minutes = raw.parse()?;
        }
        if let Some(raw) = get("DATABALL_SEASONS") {
            out.seasons = Some(parse_seasons("DATABALL_SEASONS", &raw)?);
        }
        if let Some(raw) = get("DATABALL_WEIGHTED") {
            out.weighted = parse_bool("DATABALL_WEIGHTED", &raw)?;
        }
        if let Some(raw) = get("DATABALL_HALF_LIFE") {
            out.half_life = Some(parse_half_life(&raw)?);
        }
        Ok(out)
    }

    pub fn apply_args(&mut self, args: &[String]) -> Result<(), ConfigError> {
        if let Some(path) = arg_value(args, "--db") {
            self.db_path = PathBuf::from(path);
        }
        if let Some(raw) = arg_value(args, "--window") {
            self.window = Some(parse_window(&raw)?);
        }
        if let Some(raw) = arg_value(args, "--iterations") {
            self.srs_iterations = parse_iterations(&raw)?;
        }
        if let Some(raw) = arg_value(args, "--minutes") {
            self.minutes = raw.parse()?;
        }
        if let Some(raw) = arg_value(args, "--seasons") {
            self.seasons = Some(parse_seasons("--seasons", &raw)?);
        }
        if has_flag(args, "--weighted") {
            self.weighted = true;
        }
        if let Some(raw) = arg_value(args, "--half-life") {
            self.half_life = Some(parse_half_life(&raw)?);
        }
        Ok(())
    }

    pub fn window_options(&self) -> WindowOptions {
        let mut opts = WindowOptions {
            window: self.window,
            weighted: self.weighted,
            weights: None,
        };
        if self.weighted
            && let Some(half_life) = self.half_life
        {
            opts.weights = Some(Arc::new(HalfLife(half_life)));
        }
        opts
    }

    pub fn season_options(&self) -> SeasonOptions {
        SeasonOptions {
            minutes: self.minutes,
            srs_iterations: self.srs_iterations,
        }
    }
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

pub fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
            && !next.starts_with("--")
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

pub fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

pub fn positional_args(args: &[String], flags_with_values: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if flags_with_values.contains(&arg.as_str()) {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        out.push(arg.clone());
    }
    out
}

fn parse_window(raw: &str) -> Result<usize, ConfigError> {
    let n = parse_i64("window", raw)?;
    if n <= 0 {
        return Err(ConfigError::InvalidWindow(n));
    }
    Ok(n as usize)
}

fn parse_iterations(raw: &str) -> Result<usize, ConfigError> {
    let n = parse_i64("SRS iterations", raw)?;
    if n <= 0 {
        return Err(ConfigError::InvalidIterations(n));
    }
    Ok(n as usize)
}

fn parse_half_life(raw: &str) -> Result<f64, ConfigError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(invalid("half life", raw)),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, raw)),
    }
}

fn parse_seasons(key: &str, raw: &str) -> Result<SeasonSpan, ConfigError> {
    let trimmed = raw.trim();
    let parsed = match trimmed.split_once('-') {
        Some((a, b)) => a
            .trim()
            .parse::<i32>()
            .ok()
            .zip(b.trim().parse::<i32>().ok())
            .map(|(start, end)| SeasonSpan { start, end }),
        None => trimmed.parse::<i32>().ok().map(SeasonSpan::single),
    };
    match parsed {
        Some(span) if span.start <= span.end => Ok(span),
        _ => Err(invalid(key, raw)),
    }
}

fn parse_i64(key: &str, raw: &str) -> Result<i64, ConfigError> {
    raw.trim().parse::<i64>().map_err(|_| invalid(key, raw))
}

fn invalid(key: &str, raw: &str) -> ConfigError {
    ConfigError::InvalidSetting {
        key: key.to_string(),
        value: raw.to_string(),
    }
}
