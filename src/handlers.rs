use crate::errors::AppError;
use crate::models::{
    day_name, parse_day, parse_task_id, AddTaskForm, AddTaskResponse, AppData, DayResponse,
    DeleteResponse, IndexQuery, NewTaskRequest, StateResponse, TaskForm, ToggleResponse,
};
use crate::ranks::level_for;
use crate::state::AppState;
use crate::stats::{build_day, build_state};
use crate::storage::persist_data;
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form, Json,
};
use tracing::{error, info};

pub async fn index(State(state): State<AppState>, Query(query): Query<IndexQuery>) -> Html<String> {
    let today = state.clock.weekday();
    let data = state.data.lock().await;
    Html(render_index(&data, today, &query))
}

pub async fn get_state(State(state): State<AppState>) -> Json<StateResponse> {
    let today = state.clock.weekday();
    let data = state.data.lock().await;
    Json(build_state(&data, today))
}

pub async fn get_day(
    State(state): State<AppState>,
    Path(day): Path<String>,
) -> Result<Json<DayResponse>, AppError> {
    let data = state.data.lock().await;
    parse_day(&day)
        .and_then(|day| build_day(&data, day))
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("no such day: {day}")))
}

pub async fn add_task(
    State(state): State<AppState>,
    Path(day): Path<String>,
    Json(payload): Json<NewTaskRequest>,
) -> Json<AddTaskResponse> {
    let now = state.clock.now();
    let mut data = state.data.lock().await;
    let task = parse_day(&day)
        .and_then(|day| data.add_task(day, &payload.text, payload.priority, now));
    if task.is_some() {
        save(&state, &data).await;
    }

    Json(AddTaskResponse {
        task,
        total_xp: data.total_xp,
    })
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Path((day, id)): Path<(String, String)>,
) -> Json<ToggleResponse> {
    let target = parse_day(&day).zip(parse_task_id(&id));
    let mut data = state.data.lock().await;
    let change = target.and_then(|(day, id)| data.toggle_task(day, id));
    let level_up = change.and_then(|change| change.level_up());
    if let (Some(change), Some((day, id))) = (change, target) {
        announce(day, id, change.delta, level_up.map(|rank| rank.level));
        save(&state, &data).await;
    }

    Json(ToggleResponse {
        found: change.is_some(),
        task: target.and_then(|(day, id)| data.find_task(day, id).cloned()),
        xp_delta: change.map(|change| change.delta).unwrap_or(0),
        total_xp: data.total_xp,
        level: level_for(data.total_xp),
        level_up,
    })
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path((day, id)): Path<(String, String)>,
) -> Json<DeleteResponse> {
    let target = parse_day(&day).zip(parse_task_id(&id));
    let mut data = state.data.lock().await;
    let removed = target.and_then(|(day, id)| data.delete_task(day, id));
    if removed.is_some() {
        save(&state, &data).await;
    }

    Json(DeleteResponse {
        removed,
        total_xp: data.total_xp,
        level: level_for(data.total_xp),
    })
}

pub async fn add_task_form(
    State(state): State<AppState>,
    Form(form): Form<AddTaskForm>,
) -> Redirect {
    let day = parse_day(&form.day);
    let now = state.clock.now();
    let mut data = state.data.lock().await;
    if day
        .and_then(|day| data.add_task(day, &form.text, form.priority, now))
        .is_some()
    {
        save(&state, &data).await;
    }
    Redirect::to(&index_location(day))
}

pub async fn toggle_task_form(
    State(state): State<AppState>,
    Form(form): Form<TaskForm>,
) -> Redirect {
    let Some((day, id)) = parse_day(&form.day).zip(parse_task_id(&form.id)) else {
        return Redirect::to(&index_location(parse_day(&form.day)));
    };
    let mut data = state.data.lock().await;
    let Some(change) = data.toggle_task(day, id) else {
        return Redirect::to(&index_location(Some(day)));
    };

    let level_up = change.level_up().map(|rank| rank.level);
    announce(day, id, change.delta, level_up);
    save(&state, &data).await;

    let mut location = index_location(Some(day));
    if change.completed {
        location.push_str(&format!("&gained={}", change.delta));
    }
    if let Some(level) = level_up {
        location.push_str(&format!("&levelup={level}"));
    }
    Redirect::to(&location)
}

pub async fn delete_task_form(
    State(state): State<AppState>,
    Form(form): Form<TaskForm>,
) -> Redirect {
    let day = parse_day(&form.day);
    let target = day.zip(parse_task_id(&form.id));
    let mut data = state.data.lock().await;
    if target
        .and_then(|(day, id)| data.delete_task(day, id))
        .is_some()
    {
        save(&state, &data).await;
    }
    Redirect::to(&index_location(day))
}

/// Page for `day`, or the default (today) page when the day is unknown.
fn index_location(day: Option<u8>) -> String {
    match day.filter(|day| day_name(*day).is_some()) {
        Some(day) => format!("/?day={day}"),
        None => "/".to_string(),
    }
}

fn announce(day: u8, id: i64, delta: i64, level_up: Option<u32>) {
    match level_up {
        Some(level) => info!(day, id, delta, level, "task toggled, level up"),
        None => info!(day, id, delta, "task toggled"),
    }
}

/// Writes are fire-and-forget: a failure is logged and memory stays
/// authoritative.
async fn save(state: &AppState, data: &AppData) {
    if let Err(err) = persist_data(&state.data_path, data).await {
        error!("failed to persist state: {}", err.message);
    }
}
