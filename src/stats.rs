use crate::models::{day_name, AppData, DayResponse, DaySummary, StateResponse, DAYS_OF_WEEK};
use crate::ranks::level_for;

pub fn build_week_summary(data: &AppData, today: u8) -> Vec<DaySummary> {
    DAYS_OF_WEEK
        .iter()
        .copied()
        .zip(0u8..)
        .map(|(name, day)| {
            let (completed, total) = data.day_counts(day);
            DaySummary {
                day,
                name,
                completed,
                total,
                progress_percentage: completion_percentage(completed, total),
                is_today: day == today,
            }
        })
        .collect()
}

pub fn build_state(data: &AppData, today: u8) -> StateResponse {
    StateResponse {
        total_xp: data.total_xp,
        level: level_for(data.total_xp),
        today,
        days: build_week_summary(data, today),
    }
}

pub fn build_day(data: &AppData, day: u8) -> Option<DayResponse> {
    let name = day_name(day)?;
    let tasks = data.tasks.day(day)?.to_vec();
    let (completed, total) = data.day_counts(day);
    Some(DayResponse {
        day,
        name,
        tasks,
        completed,
        total,
    })
}

pub fn completion_percentage(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    }
}
