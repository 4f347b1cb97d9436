use crate::handlers;
use crate::state::AppState;
use axum::{routing::{delete, get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/tasks/add", post(handlers::add_task_form))
        .route("/tasks/toggle", post(handlers::toggle_task_form))
        .route("/tasks/delete", post(handlers::delete_task_form))
        .route("/api/state", get(handlers::get_state))
        .route("/api/days/:day", get(handlers::get_day))
        .route("/api/days/:day/tasks", post(handlers::add_task))
        .route("/api/days/:day/tasks/:id/toggle", post(handlers::toggle_task))
        .route("/api/days/:day/tasks/:id", delete(handlers::delete_task))
        .with_state(state)
}
