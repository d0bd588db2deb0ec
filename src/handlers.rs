use crate::calendar::{self, YEAR};
use crate::errors::AppError;
use crate::models::{
    AnalyticsResponse, CalendarResponse, CompletionLog, Habit, NewHabitRequest, RemoveHabitQuery,
    SleepMonthQuery, SleepMonthResponse, SleepRequest, ToggleRequest, ToggleResponse,
    TrackerData, UpdateHabitRequest,
};
use crate::state::AppState;
use crate::stats::{build_analytics, month_sleep_series, monthly_sleep_average, round_to_tenth};
use crate::store::HabitStore;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;
use tracing::info;

const MAX_SLEEP_HOURS: f64 = 24.0;

pub async fn get_calendar() -> Json<CalendarResponse> {
    Json(CalendarResponse {
        year: YEAR,
        months: calendar::month_table().to_vec(),
    })
}

pub async fn list_habits(State(state): State<AppState>) -> Json<Vec<Habit>> {
    let store = state.store.lock().await;
    Json(store.habits().to_vec())
}

pub async fn get_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Habit>, AppError> {
    let store = state.store.lock().await;
    Ok(Json(store.habit(&id)?.clone()))
}

pub async fn add_habit(
    State(state): State<AppState>,
    payload: Option<Json<NewHabitRequest>>,
) -> Result<Json<Habit>, AppError> {
    let request = payload.map(|Json(request)| request).unwrap_or_default();
    let habit = mutate(&state, move |store| {
        Ok(store.add_habit(non_blank(request.name), non_blank(request.emoji))?)
    })
    .await?;
    Ok(Json(habit))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateHabitRequest>,
) -> Result<Json<Vec<Habit>>, AppError> {
    let habits = mutate(&state, move |store| {
        if store.update_habit(&id, payload.name, payload.emoji)?.is_none() {
            info!(id = %id, "update ignored for unknown habit");
        }
        Ok(store.habits().to_vec())
    })
    .await?;
    Ok(Json(habits))
}

pub async fn remove_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RemoveHabitQuery>,
) -> Result<Json<Vec<Habit>>, AppError> {
    if !query.confirm {
        return Err(AppError::conflict(
            "deleting a habit erases all its progress; repeat with confirm=true",
        ));
    }
    let habits = mutate(&state, move |store| {
        store.remove_habit(&id)?;
        Ok(store.habits().to_vec())
    })
    .await?;
    Ok(Json(habits))
}

pub async fn get_logs(State(state): State<AppState>) -> Json<CompletionLog> {
    let store = state.store.lock().await;
    Json(store.logs().clone())
}

pub async fn toggle(
    State(state): State<AppState>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, AppError> {
    calendar::parse_date_key(&payload.date)?;
    let response = mutate(&state, move |store| {
        let completed = store.toggle_completion(&payload.habit_id, &payload.date)?;
        Ok(ToggleResponse {
            habit_id: payload.habit_id,
            date: payload.date,
            completed,
        })
    })
    .await?;
    Ok(Json(response))
}

pub async fn get_sleep(
    State(state): State<AppState>,
    Query(query): Query<SleepMonthQuery>,
) -> Result<Json<SleepMonthResponse>, AppError> {
    let store = state.store.lock().await;
    Ok(Json(sleep_month(store.data(), query.month.unwrap_or(0))?))
}

pub async fn set_sleep(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(payload): Json<SleepRequest>,
) -> Result<Json<SleepMonthResponse>, AppError> {
    let (month_index, _) = calendar::parse_date_key(&date)?;
    if !payload.hours.is_finite() || !(0.0..=MAX_SLEEP_HOURS).contains(&payload.hours) {
        return Err(AppError::bad_request("hours must be between 0 and 24"));
    }

    let response = mutate(&state, move |store| {
        store.set_sleep_hours(&date, payload.hours)?;
        info!(date = %date, hours = payload.hours, "sleep logged");
        sleep_month(store.data(), month_index)
    })
    .await?;
    Ok(Json(response))
}

pub async fn get_analytics(State(state): State<AppState>) -> Json<AnalyticsResponse> {
    let store = state.store.lock().await;
    Json(build_analytics(store.data()))
}

/// Runs a store mutation on the blocking pool, since the backend may write
/// to disk.
async fn mutate<T, F>(state: &AppState, op: F) -> Result<T, AppError>
where
    F: FnOnce(&mut HabitStore) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    let mut store = Arc::clone(&state.store).lock_owned().await;
    tokio::task::spawn_blocking(move || op(&mut *store))
        .await
        .map_err(AppError::internal)?
}

fn sleep_month(data: &TrackerData, month_index: usize) -> Result<SleepMonthResponse, AppError> {
    Ok(SleepMonthResponse {
        month: month_index,
        name: calendar::month(month_index)?.name.to_string(),
        days: month_sleep_series(data, month_index)?,
        average: round_to_tenth(monthly_sleep_average(data, month_index)?),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
