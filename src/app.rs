use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/calendar", get(handlers::get_calendar))
        .route("/api/habits", get(handlers::list_habits).post(handlers::add_habit))
        .route(
            "/api/habits/:id",
            get(handlers::get_habit)
                .put(handlers::update_habit)
                .delete(handlers::remove_habit),
        )
        .route("/api/logs", get(handlers::get_logs))
        .route("/api/logs/toggle", post(handlers::toggle))
        .route("/api/sleep", get(handlers::get_sleep))
        .route("/api/sleep/:date", put(handlers::set_sleep))
        .route("/api/analytics", get(handlers::get_analytics))
        .with_state(state)
}
