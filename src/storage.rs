//! Flat key → string persistence, one JSON object per file:
//!
//! ```json
//! { "tasks": "{\"0\":[],...}", "xp": "450", "last-reset": "Mon Jan 01 2024" }
//! ```
//!
//! Each entry is decoded on its own, so one bad value only resets that value.

use crate::errors::AppError;
use crate::models::{AppData, WeekState};
use crate::rollover::Clock;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, warn};

pub const TASKS_KEY: &str = "tasks";
pub const XP_KEY: &str = "xp";
pub const LAST_RESET_KEY: &str = "last-reset";

pub type Entries = BTreeMap<String, String>;

pub fn encode_entries(data: &AppData) -> Result<Entries, AppError> {
    let mut entries = Entries::new();
    entries.insert(TASKS_KEY.to_string(), serde_json::to_string(&data.tasks)?);
    entries.insert(XP_KEY.to_string(), data.total_xp.to_string());
    entries.insert(LAST_RESET_KEY.to_string(), data.last_reset.clone());
    Ok(entries)
}

/// Rebuilds state from stored entries, defaulting whatever is missing or
/// malformed. `today` is the marker used when no reset date was stored.
pub fn decode_entries(entries: &Entries, today: &str) -> AppData {
    let tasks = match entries.get(TASKS_KEY) {
        Some(raw) => serde_json::from_str::<WeekState>(raw).unwrap_or_else(|err| {
            warn!("discarding malformed {TASKS_KEY} entry: {err}");
            WeekState::default()
        }),
        None => WeekState::default(),
    };

    let total_xp = match entries.get(XP_KEY) {
        Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|err| {
            warn!("discarding malformed {XP_KEY} entry {raw:?}: {err}");
            0
        }),
        None => 0,
    };

    let last_reset = entries
        .get(LAST_RESET_KEY)
        .filter(|raw| !raw.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| today.to_string());

    AppData {
        tasks,
        total_xp,
        last_reset,
    }
}

pub async fn load_data(path: &Path, clock: &dyn Clock) -> AppData {
    let today = clock.date_marker();
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<Entries>(&bytes) {
            Ok(entries) => decode_entries(&entries, &today),
            Err(err) => {
                error!("failed to parse data file: {err}");
                AppData::new(today)
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::new(today),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::new(today)
        }
    }
}

/// Writes a sibling temp file and renames it over `path`, so a crash mid-write
/// leaves the previous file intact.
pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(&encode_entries(data)?)?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let staging = staging_path(path);
    fs::write(&staging, payload).await?;
    fs::rename(&staging, path).await?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
