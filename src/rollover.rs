//! Daily rollover: when the calendar date changes, the weekday that just
//! ended gets its completion flags cleared so it can be done again next week.
//! Earned XP is kept.
//!
//! Detection is polled. A ticker asks the [`Clock`] for the date every
//! period, so the reset can land up to one period after midnight.

use crate::models::AppData;
use crate::state::AppState;
use crate::storage::persist_data;
use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The user's calendar date.
    fn today(&self) -> NaiveDate;

    fn weekday(&self) -> u8 {
        weekday_index(self.today())
    }

    fn date_marker(&self) -> String {
        date_marker(self.today())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock that only moves when told to; `today` is the UTC date of `now`.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Stable calendar marker, e.g. `Mon Jan 01 2024`.
pub fn date_marker(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

pub fn previous_weekday(weekday: u8) -> u8 {
    (weekday + 6) % 7
}

impl AppData {
    /// Clears completion on the single weekday preceding `weekday` when
    /// `today` differs from the stored marker. Days skipped while nothing
    /// was running are not reset.
    pub fn rollover_if_new_day(&mut self, today: &str, weekday: u8) -> bool {
        if today == self.last_reset || weekday > 6 {
            return false;
        }

        let previous = previous_weekday(weekday);
        if let Some(tasks) = self.tasks.day_mut(previous) {
            for task in tasks.iter_mut() {
                task.completed = false;
            }
        }
        self.last_reset = today.to_string();
        true
    }
}

/// Runs one rollover check against the state's clock, persisting on change.
pub async fn check_rollover(state: &AppState) -> bool {
    let today = state.clock.date_marker();
    let weekday = state.clock.weekday();

    let mut data = state.data.lock().await;
    if !data.rollover_if_new_day(&today, weekday) {
        debug!(%today, "rollover check: same day");
        return false;
    }

    info!(%today, reset_day = previous_weekday(weekday), "new day, cleared previous day's tasks");
    if let Err(err) = persist_data(&state.data_path, &data).await {
        error!("failed to persist after rollover: {}", err.message);
    }
    true
}

/// Polls [`check_rollover`] every `period`. The first check runs immediately.
pub fn spawn_rollover_ticker(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            check_rollover(&state).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use crate::storage::load_data;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 8, 0, 0).unwrap()
    }

    fn seeded(last_reset: &str) -> AppData {
        let mut data = AppData::new(last_reset);
        for day in 0..7 {
            let task = data
                .add_task(day, "stretch", Priority::Basic, at(2024, 1, 1))
                .unwrap();
            data.toggle_task(day, task.id);
        }
        data
    }

    fn completed(data: &AppData, day: u8) -> bool {
        data.tasks.day(day).unwrap().iter().all(|task| task.completed)
    }

    #[test]
    fn marker_matches_stored_format() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(date_marker(date), "Tue Jan 02 2024");
        assert_eq!(weekday_index(date), 2);
    }

    #[test]
    fn previous_weekday_wraps_to_saturday() {
        assert_eq!(previous_weekday(0), 6);
        assert_eq!(previous_weekday(1), 0);
        assert_eq!(previous_weekday(6), 5);
    }

    #[test]
    fn same_day_is_a_no_op() {
        let mut data = seeded("Mon Jan 01 2024");
        let before = data.clone();
        assert!(!data.rollover_if_new_day("Mon Jan 01 2024", 1));
        assert_eq!(data, before);
    }

    #[test]
    fn new_day_clears_only_the_previous_weekday() {
        let mut data = seeded("Mon Jan 01 2024");
        let xp = data.total_xp;

        assert!(data.rollover_if_new_day("Tue Jan 02 2024", 2));
        assert!(!completed(&data, 1));
        for day in [0, 2, 3, 4, 5, 6] {
            assert!(completed(&data, day), "day {day} was reset");
        }
        assert_eq!(data.total_xp, xp);
        assert_eq!(data.last_reset, "Tue Jan 02 2024");
        assert!(!data.rollover_if_new_day("Tue Jan 02 2024", 2));
    }

    #[test]
    fn sunday_resets_saturday() {
        let mut data = seeded("Sat Jan 06 2024");
        assert!(data.rollover_if_new_day("Sun Jan 07 2024", 0));
        assert!(!completed(&data, 6));
        assert!(completed(&data, 5));
    }

    #[test]
    fn skipped_days_reset_only_the_immediately_preceding_one() {
        let mut data = seeded("Mon Jan 01 2024");
        assert!(data.rollover_if_new_day("Fri Jan 05 2024", 5));
        assert!(!completed(&data, 4));
        for day in [0, 1, 2, 3, 5, 6] {
            assert!(completed(&data, day));
        }
    }

    #[test]
    fn out_of_range_weekday_changes_nothing() {
        let mut data = seeded("Mon Jan 01 2024");
        let before = data.clone();
        assert!(!data.rollover_if_new_day("Tue Jan 02 2024", 7));
        assert_eq!(data, before);
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("weekflow_{name}_{}_{nanos}.json", std::process::id()))
    }

    #[tokio::test]
    async fn check_rollover_follows_the_clock_and_persists() {
        let clock = Arc::new(ManualClock::new(at(2024, 1, 1)));
        let path = temp_path("rollover");
        let state = AppState::new(path.clone(), seeded("Mon Jan 01 2024"), clock.clone());

        assert!(!check_rollover(&state).await);

        clock.advance(chrono::Duration::days(1));
        assert!(check_rollover(&state).await);
        assert!(!check_rollover(&state).await);

        let reloaded = load_data(&path, clock.as_ref()).await;
        assert_eq!(reloaded.last_reset, "Tue Jan 02 2024");
        assert!(!completed(&reloaded, 1));
        assert!(completed(&reloaded, 2));
        assert_eq!(reloaded.total_xp, 700);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_checks_every_period() {
        let clock = Arc::new(ManualClock::new(at(2024, 1, 6)));
        let path = temp_path("ticker");
        let state = AppState::new(path.clone(), seeded("Fri Jan 05 2024"), clock.clone());

        let handle = spawn_rollover_ticker(state.clone(), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(state.data.lock().await.last_reset, "Sat Jan 06 2024");

        clock.set(at(2024, 1, 7));
        tokio::time::sleep(Duration::from_secs(61)).await;
        {
            let data = state.data.lock().await;
            assert_eq!(data.last_reset, "Sun Jan 07 2024");
            assert!(!completed(&data, 6));
        }

        handle.abort();
        let _ = std::fs::remove_file(path);
    }
}
