use crate::handlers;
use crate::state::AppState;
use axum::{routing::{delete, get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/today", get(handlers::get_today))
        .route(
            "/api/days/:day/items",
            get(handlers::list_items)
                .post(handlers::add_item)
                .delete(handlers::clear_items),
        )
        .route("/api/days/:day/items/:id", delete(handlers::remove_item))
        .route("/api/days/:day/items/:id/toggle", post(handlers::toggle_item))
        .route("/api/days/:day/note", get(handlers::get_note).put(handlers::put_note))
        .route("/api/profile", get(handlers::get_profile).put(handlers::put_profile))
        .route("/api/history", get(handlers::get_history))
        .route("/api/history/:mode", get(handlers::get_history_mode))
        .with_state(state)
}
