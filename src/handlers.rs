use crate::dates;
use crate::engine;
use crate::errors::AppError;
use crate::models::{
    Goal, GoalForm, GoalRequest, HistoryEntry, ToggleForm, ToggleRequest, TrackingResponse,
};
use crate::state::AppState;
use crate::storage::persist_data;
use crate::ui::{render_setup, render_tracking};
use axum::{
    extract::State,
    response::{Html, Redirect},
    Form, Json,
};

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let today = dates::current_day();
    let mut data = state.data.lock().await;
    if data.active_goal().is_some() {
        // viewing backfills missed days and creates today's record
        let view = engine::tracking_view(&mut data, today)?;
        let history = engine::history_newest_first(&data);
        persist_data(&state.data_path, &data).await?;
        Ok(Html(render_tracking(&view, &history)))
    } else {
        Ok(Html(render_setup(data.goal.as_ref(), today)))
    }
}

pub async fn save_goal(
    State(state): State<AppState>,
    Json(payload): Json<GoalRequest>,
) -> Result<Json<Goal>, AppError> {
    let today = dates::current_day();
    let mut data = state.data.lock().await;
    let goal = engine::save_goal(&mut data, today, payload)?;
    persist_data(&state.data_path, &data).await?;
    Ok(Json(goal))
}

pub async fn get_tracking(
    State(state): State<AppState>,
) -> Result<Json<TrackingResponse>, AppError> {
    let today = dates::current_day();
    let mut data = state.data.lock().await;
    let view = engine::tracking_view(&mut data, today)?;
    persist_data(&state.data_path, &data).await?;
    Ok(Json(view))
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<TrackingResponse>, AppError> {
    let today = dates::current_day();
    if let Some(date) = payload.date.as_deref() {
        if date != dates::canonical_key(today) {
            return Err(AppError::bad_request("only today's record can be changed"));
        }
    }
    let mut data = state.data.lock().await;
    engine::apply_toggle(&mut data, today, payload.task_index, payload.checked)?;
    let view = engine::tracking_view(&mut data, today)?;
    persist_data(&state.data_path, &data).await?;
    Ok(Json(view))
}

pub async fn mark_all(
    State(state): State<AppState>,
) -> Result<Json<TrackingResponse>, AppError> {
    let today = dates::current_day();
    let mut data = state.data.lock().await;
    engine::apply_mark_all(&mut data, today)?;
    let view = engine::tracking_view(&mut data, today)?;
    persist_data(&state.data_path, &data).await?;
    Ok(Json(view))
}

pub async fn complete_goal(State(state): State<AppState>) -> Result<Json<Goal>, AppError> {
    let mut data = state.data.lock().await;
    let goal = engine::complete_goal(&mut data)?;
    persist_data(&state.data_path, &data).await?;
    Ok(Json(goal))
}

pub async fn get_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let data = state.data.lock().await;
    Ok(Json(engine::history_newest_first(&data)))
}

pub async fn goal_form(
    State(state): State<AppState>,
    Form(form): Form<GoalForm>,
) -> Result<Redirect, AppError> {
    let today = dates::current_day();
    let request = GoalRequest {
        title: form.title,
        tasks: form.tasks.lines().map(str::to_string).collect(),
        start_date: Some(form.start_date).filter(|value| !value.trim().is_empty()),
        deadline: form.deadline,
    };
    let mut data = state.data.lock().await;
    engine::save_goal(&mut data, today, request)?;
    persist_data(&state.data_path, &data).await?;
    Ok(Redirect::to("/"))
}

pub async fn toggle_form(
    State(state): State<AppState>,
    Form(form): Form<ToggleForm>,
) -> Result<Redirect, AppError> {
    let today = dates::current_day();
    let mut data = state.data.lock().await;
    engine::apply_toggle(&mut data, today, form.index, form.checked)?;
    persist_data(&state.data_path, &data).await?;
    Ok(Redirect::to("/"))
}

pub async fn mark_all_form(State(state): State<AppState>) -> Result<Redirect, AppError> {
    let today = dates::current_day();
    let mut data = state.data.lock().await;
    engine::apply_mark_all(&mut data, today)?;
    persist_data(&state.data_path, &data).await?;
    Ok(Redirect::to("/"))
}

pub async fn complete_form(State(state): State<AppState>) -> Result<Redirect, AppError> {
    let mut data = state.data.lock().await;
    engine::complete_goal(&mut data)?;
    persist_data(&state.data_path, &data).await?;
    Ok(Redirect::to("/"))
}
