//! TOML configuration: clients, the shared scheduling period, logging.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use block_engine::{CalendarWindow, ClientCalendar, RecurringMeeting, SchedulePeriod};
use chrono_tz::Tz;
use serde::Deserialize;

fn default_start_time() -> f64 {
    9.0
}

fn default_end_time() -> f64 {
    18.0
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_file_level() -> String {
    "debug".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub workspace: WorkspaceConfig,
    pub time: TimeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceConfig {
    pub name: String,
    #[serde(default)]
    pub clients: Vec<ClientConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub name: String,
    pub project: String,
    pub task: String,
    /// Identifier to book against; the project name when absent.
    pub project_id: Option<String>,
    /// Identifier to book against; the task name when absent.
    pub task_id: Option<String>,
    #[serde(default = "default_start_time")]
    pub start_time: f64,
    #[serde(default = "default_end_time")]
    pub end_time: f64,
    #[serde(default)]
    pub daily_meetings: Vec<MeetingConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeetingConfig {
    pub description: String,
    pub start_time: f64,
    pub end_time: f64,
}

/// Period and lunch break shared by every client.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeConfig {
    pub year: i32,
    pub month: u32,
    pub start_day: u32,
    pub end_day: u32,
    pub lunch_start: f64,
    pub lunch_end: f64,
    /// IANA zone the wall-clock entries are expressed in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Console level.
    pub level: Option<String>,
    /// Log file; no file logging when absent.
    pub file: Option<PathBuf>,
    /// Level for the log file, independent of the console.
    #[serde(default = "default_file_level")]
    pub file_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            file: None,
            file_level: default_file_level(),
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Look up a client by name, ignoring case and surrounding whitespace.
    pub fn client(&self, name: &str) -> Option<&ClientConfig> {
        self.workspace
            .clients
            .iter()
            .find(|client| same_name(&client.name, name))
    }
}

impl TimeConfig {
    pub fn period(&self) -> SchedulePeriod {
        SchedulePeriod::new(self.year, self.month, self.start_day, self.end_day)
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid timezone: '{}'", self.timezone))
    }
}

impl ClientConfig {
    /// Build the engine calendar: work hours from the client, lunch from the
    /// shared time section.
    pub fn to_calendar(&self, time: &TimeConfig) -> block_engine::error::Result<ClientCalendar> {
        let meetings = self
            .daily_meetings
            .iter()
            .map(|m| RecurringMeeting::new(m.description.clone(), m.start_time, m.end_time))
            .collect::<block_engine::error::Result<Vec<_>>>()?;

        Ok(ClientCalendar {
            name: self.name.clone(),
            work: CalendarWindow::new(self.start_time, self.end_time)?,
            lunch: CalendarWindow::new(time.lunch_start, time.lunch_end)?,
            meetings,
            project_id: self.project_id.clone().unwrap_or_else(|| self.project.clone()),
            task_id: self.task_id.clone().unwrap_or_else(|| self.task.clone()),
        })
    }
}

pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
