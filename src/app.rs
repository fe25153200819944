use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/goal", post(handlers::goal_form))
        .route("/task/toggle", post(handlers::toggle_form))
        .route("/mark-all", post(handlers::mark_all_form))
        .route("/complete", post(handlers::complete_form))
        .route("/api/goal", post(handlers::save_goal))
        .route("/api/tracking", get(handlers::get_tracking))
        .route("/api/toggle", post(handlers::toggle_task))
        .route("/api/mark-all", post(handlers::mark_all))
        .route("/api/complete", post(handlers::complete_goal))
        .route("/api/history", get(handlers::get_history))
        .with_state(state)
}
