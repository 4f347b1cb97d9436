use crate::ranks::{Progress, Rank};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DAYS_OF_WEEK: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub fn day_name(day: u8) -> Option<&'static str> {
    DAYS_OF_WEEK.get(usize::from(day)).copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Basic,
    Need,
    Important,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Basic, Priority::Need, Priority::Important];

    pub fn xp(self) -> u64 {
        match self {
            Priority::Basic => 100,
            Priority::Need => 200,
            Priority::Important => 300,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Basic => "Basic",
            Priority::Need => "Need",
            Priority::Important => "Important",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Priority::Basic => "○",
            Priority::Need => "◐",
            Priority::Important => "●",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Priority::Basic => "basic",
            Priority::Need => "need",
            Priority::Important => "important",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub text: String,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Tasks bucketed by weekday, 0 = Sunday. Every day 0..=6 is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<u8, Vec<Task>>",
    into = "BTreeMap<u8, Vec<Task>>"
)]
pub struct WeekState {
    days: BTreeMap<u8, Vec<Task>>,
}

impl Default for WeekState {
    fn default() -> Self {
        Self::from(BTreeMap::new())
    }
}

impl From<BTreeMap<u8, Vec<Task>>> for WeekState {
    fn from(mut days: BTreeMap<u8, Vec<Task>>) -> Self {
        days.retain(|day, _| usize::from(*day) < DAYS_OF_WEEK.len());
        for day in 0..DAYS_OF_WEEK.len() as u8 {
            days.entry(day).or_default();
        }
        Self { days }
    }
}

impl From<WeekState> for BTreeMap<u8, Vec<Task>> {
    fn from(week: WeekState) -> Self {
        week.days
    }
}

impl WeekState {
    pub fn day(&self, day: u8) -> Option<&[Task]> {
        self.days.get(&day).map(Vec::as_slice)
    }

    pub fn day_mut(&mut self, day: u8) -> Option<&mut Vec<Task>> {
        self.days.get_mut(&day)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &[Task])> {
        self.days.iter().map(|(day, tasks)| (*day, tasks.as_slice()))
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.days.values().flatten()
    }
}

/// The whole persisted state of one tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct AppData {
    pub tasks: WeekState,
    pub total_xp: u64,
    pub last_reset: String,
}

impl AppData {
    pub fn new(last_reset: impl Into<String>) -> Self {
        Self {
            tasks: WeekState::default(),
            total_xp: 0,
            last_reset: last_reset.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewTaskRequest {
    pub text: String,
    #[serde(default)]
    pub priority: Priority,
}

#[derive(Debug, Deserialize)]
pub struct AddTaskForm {
    pub day: String,
    pub text: String,
    #[serde(default)]
    pub priority: Priority,
}

#[derive(Debug, Deserialize)]
pub struct TaskForm {
    pub day: String,
    pub id: String,
}

/// Query of the rendered page. Values stay raw so a bad one is ignored
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    pub day: Option<String>,
    pub gained: Option<String>,
    pub levelup: Option<String>,
}

impl IndexQuery {
    pub fn day(&self) -> Option<u8> {
        self.day.as_deref().and_then(parse_day)
    }

    pub fn gained(&self) -> Option<u64> {
        self.gained.as_deref().and_then(|raw| raw.trim().parse().ok())
    }

    pub fn levelup(&self) -> Option<u32> {
        self.levelup.as_deref().and_then(|raw| raw.trim().parse().ok())
    }
}

/// Day index from user input; anything that is not a small non-negative
/// number yields `None`, which every operation treats as an unknown day.
pub fn parse_day(raw: &str) -> Option<u8> {
    raw.trim().parse::<u8>().ok()
}

pub fn parse_task_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

#[derive(Debug, Serialize)]
pub struct DaySummary {
    pub day: u8,
    pub name: &'static str,
    pub completed: usize,
    pub total: usize,
    pub progress_percentage: f64,
    pub is_today: bool,
}

#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub total_xp: u64,
    pub level: Progress,
    pub today: u8,
    pub days: Vec<DaySummary>,
}

#[derive(Debug, Serialize)]
pub struct DayResponse {
    pub day: u8,
    pub name: &'static str,
    pub tasks: Vec<Task>,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct AddTaskResponse {
    pub task: Option<Task>,
    pub total_xp: u64,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub found: bool,
    pub task: Option<Task>,
    pub xp_delta: i64,
    pub total_xp: u64,
    pub level: Progress,
    pub level_up: Option<&'static Rank>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub removed: Option<Task>,
    pub total_xp: u64,
    pub level: Progress,
}
