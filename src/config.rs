//! Runtime settings for the sales report service.
//!
//! Settings are read once from the environment and handed to every component explicitly. Use
//! [`Settings::from_lookup`] to build them from any key/value source; tests pass a closure over a
//! map instead of touching the process environment.

use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Default CORS origins used when `ALLOWED_ORIGINS` is not set.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:8000",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:8000",
];

/// 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

pub const DEFAULT_INPUT_FILE: &str = "ventas.csv";
pub const DEFAULT_REPORT_TITLE: &str = "Sales Report";
pub const DEFAULT_FONT_FAMILY: &str = "Roboto";

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub debug: bool,
    pub allowed_origins: Vec<String>,
    pub max_file_size: u64,
    pub data_dir: PathBuf,
    pub input_file: String,
    pub reports_dir: PathBuf,
    pub fonts_dir: Option<PathBuf>,
    pub font_family: String,
    pub report_title: String,
    pub bind_addr: SocketAddr,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|origin| origin.to_string())
                .collect(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            data_dir: PathBuf::from("data"),
            input_file: DEFAULT_INPUT_FILE.to_owned(),
            reports_dir: PathBuf::from("reports"),
            fonts_dir: None,
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
            report_title: DEFAULT_REPORT_TITLE.to_owned(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary lookup function, falling back to defaults for unset or
    /// blank keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_owned())
                .filter(|raw| !raw.is_empty())
        };

        let mut settings = Self::default();

        if let Some(raw) = value("DEBUG") {
            settings.debug = parse_bool("DEBUG", &raw)?;
        }
        if let Some(raw) = value("ALLOWED_ORIGINS") {
            settings.allowed_origins = raw
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_owned)
                .collect();
        }
        if let Some(raw) = value("MAX_FILE_SIZE") {
            settings.max_file_size = raw.parse().map_err(|err| ConfigError {
                key: "MAX_FILE_SIZE",
                value: raw.clone(),
                reason: format!("expected a byte count: {err}"),
            })?;
        }
        if let Some(raw) = value("DATA_DIR") {
            settings.data_dir = PathBuf::from(raw);
        }
        if let Some(raw) = value("INPUT_FILE") {
            settings.input_file = raw;
        }
        if let Some(raw) = value("REPORTS_DIR") {
            settings.reports_dir = PathBuf::from(raw);
        }
        settings.fonts_dir = value("FONTS_DIR").map(PathBuf::from);
        if let Some(raw) = value("FONT_FAMILY") {
            settings.font_family = raw;
        }
        if let Some(raw) = value("REPORT_TITLE") {
            settings.report_title = raw;
        }
        if let Some(raw) = value("BIND_ADDR") {
            settings.bind_addr = raw.parse().map_err(|err| ConfigError {
                key: "BIND_ADDR",
                value: raw.clone(),
                reason: format!("expected host:port: {err}"),
            })?;
        }

        Ok(settings)
    }

    /// Full path of the CSV file read on every generation.
    pub fn input_path(&self) -> PathBuf {
        self.data_dir.join(&self.input_file)
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError {
            key,
            value: raw.to_owned(),
            reason: "expected true or false".to_owned(),
        }),
    }
}
