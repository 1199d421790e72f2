// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::client::gcal::GOOGLE_CALENDAR_API;
use crate::client::todoist::TODOIST_API;
use crate::context::AppContext;
use crate::storage::LocalStorage;
use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const TODOIST_TOKEN_ENV: &str = "TODOIST_API_TOKEN";
pub const DEVICE_PASSWORD_ENV: &str = "REMARKABLE_PASSWORD";

fn default_true() -> bool {
    true
}
fn default_todoist_url() -> String {
    TODOIST_API.to_string()
}
fn default_google_url() -> String {
    GOOGLE_CALENDAR_API.to_string()
}
fn default_primary_calendar() -> String {
    "primary".to_string()
}
fn default_holiday_calendar() -> String {
    "en.usa#holiday@group.v.calendar.google.com".to_string()
}
fn default_headline_marker() -> String {
    "@headline".to_string()
}
fn default_headline_label() -> String {
    "headline".to_string()
}
fn default_notes_pages() -> usize {
    10
}
fn default_week_grid_start() -> String {
    "00:00".to_string()
}
fn default_week_grid_rows() -> u32 {
    38
}
fn default_week_grid_step() -> u32 {
    30
}
fn default_day_start_hour() -> u32 {
    5
}
fn default_day_end_hour() -> u32 {
    23
}
fn default_device_folder() -> String {
    "{year} Planner".to_string()
}
fn default_ssh_host() -> String {
    "10.11.99.1".to_string()
}
fn default_ssh_port() -> u16 {
    22
}
fn default_ssh_user() -> String {
    "root".to_string()
}
fn default_remote_dir() -> String {
    "/home/root/.local/share/remarkable/xochitl".to_string()
}
fn default_restart_command() -> String {
    "systemctl restart xochitl".to_string()
}
fn default_connect_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    2
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    /// First row of the weekly time grid, "HH:MM".
    #[serde(default = "default_week_grid_start")]
    pub week_grid_start: String,
    #[serde(default = "default_week_grid_rows")]
    pub week_grid_rows: u32,
    #[serde(default = "default_week_grid_step")]
    pub week_grid_step_minutes: u32,
    #[serde(default = "default_day_start_hour")]
    pub day_start_hour: u32,
    #[serde(default = "default_day_end_hour")]
    pub day_end_hour: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            week_grid_start: default_week_grid_start(),
            week_grid_rows: default_week_grid_rows(),
            week_grid_step_minutes: default_week_grid_step(),
            day_start_hour: default_day_start_hour(),
            day_end_hour: default_day_end_hour(),
        }
    }
}

/// Direct SSH access to the device, used instead of a mounted library.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct SshConfig {
    #[serde(default = "default_ssh_host")]
    pub host: String,
    #[serde(default = "default_ssh_port")]
    pub port: u16,
    #[serde(default = "default_ssh_user")]
    pub user: String,
    /// Falls back to the SSH agent when neither a password nor a key is set.
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub key_file: Option<PathBuf>,
    /// Document library on the device.
    #[serde(default = "default_remote_dir")]
    pub remote_dir: String,
    /// Run after uploading so the device shows the new files. Empty to skip.
    #[serde(default = "default_restart_command")]
    pub restart_command: String,
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            host: default_ssh_host(),
            port: default_ssh_port(),
            user: default_ssh_user(),
            password: None,
            key_file: None,
            remote_dir: default_remote_dir(),
            restart_command: default_restart_command(),
            connect_retries: default_connect_retries(),
            retry_delay_secs: default_retry_delay(),
        }
    }
}

impl SshConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct DeviceConfig {
    /// Mounted document library of the device (e.g. an sshfs mount of
    /// `/home/root/.local/share/remarkable/xochitl`). Unused with `ssh`.
    #[serde(default)]
    pub root: PathBuf,
    /// Destination folder; `{year}` is replaced by the planner year.
    #[serde(default = "default_device_folder")]
    pub folder: String,
    /// Update documents with the same name in place (keeps annotations).
    #[serde(default = "default_true")]
    pub update_existing: bool,
    #[serde(default)]
    pub fail_on_error: bool,
    #[serde(default)]
    pub ssh: Option<SshConfig>,
}

impl DeviceConfig {
    pub fn folder_for(&self, year: i32) -> String {
        self.folder.replace("{year}", &year.to_string())
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub todoist_token: String,
    #[serde(default = "default_todoist_url")]
    pub todoist_base_url: String,
    #[serde(default = "default_google_url")]
    pub google_base_url: String,
    /// Defaults to `token.json` in the data directory.
    #[serde(default)]
    pub google_token_file: Option<PathBuf>,
    #[serde(default = "default_primary_calendar")]
    pub primary_calendar: String,
    #[serde(default = "default_holiday_calendar")]
    pub holiday_calendar: String,
    #[serde(default = "default_headline_marker")]
    pub headline_marker: String,
    #[serde(default = "default_headline_label")]
    pub headline_label: String,
    #[serde(default = "default_notes_pages")]
    pub notes_pages: usize,
    /// Defaults to `planner_<year>` in the working directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub device: Option<DeviceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            todoist_token: String::new(),
            todoist_base_url: default_todoist_url(),
            google_base_url: default_google_url(),
            google_token_file: None,
            primary_calendar: default_primary_calendar(),
            holiday_calendar: default_holiday_calendar(),
            headline_marker: default_headline_marker(),
            headline_label: default_headline_label(),
            notes_pages: default_notes_pages(),
            output_dir: None,
            layout: LayoutConfig::default(),
            device: None,
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    /// Returns a contextualized error if reading or parsing fails.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// True if `err` (or anything in its chain) means the file is missing.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>()
                && io_err.kind() == std::io::ErrorKind::NotFound
            {
                return true;
            }
        }

        false
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        LocalStorage::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            LocalStorage::atomic_write(&path, toml_str)?;
            Ok(())
        })?;
        Ok(())
    }

    /// Environment overrides, applied after loading.
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(TODOIST_TOKEN_ENV)
            && !token.trim().is_empty()
        {
            self.todoist_token = token.trim().to_string();
        }
        if let Some(ssh) = self.device.as_mut().and_then(|d| d.ssh.as_mut())
            && let Ok(password) = std::env::var(DEVICE_PASSWORD_ENV)
            && !password.is_empty()
        {
            ssh.password = Some(password);
        }
    }

    pub fn token_path(&self, ctx: &dyn AppContext) -> Result<PathBuf> {
        match &self.google_token_file {
            Some(p) => Ok(p.clone()),
            None => ctx.get_token_path(),
        }
    }

    pub fn output_dir_for(&self, year: i32) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("planner_{}", year)))
    }
}
