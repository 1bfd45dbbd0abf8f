use crate::checklist::Session;
use crate::errors::{AppError, ChecklistError};
use crate::history::{aggregate, build_history, summarize};
use crate::models::{
    AddItemRequest, BucketsResponse, ChecklistItem, DayKey, GroupingMode, HistoryResponse,
    ItemsResponse, NoteRequest, NoteResponse, ProfileRequest, ProfileResponse, TodayResponse,
};
use crate::state::AppState;
use crate::storage::FileBackend;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{Datelike, Local, NaiveDate};

// The store does blocking file I/O, so session work runs on the blocking pool
// while the owned guard keeps it exclusive.
async fn with_session<T, F>(state: &AppState, work: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&mut Session<FileBackend>) -> Result<T, AppError> + Send + 'static,
{
    let mut session = state.session.clone().lock_owned().await;
    tokio::task::spawn_blocking(move || work(&mut session))
        .await
        .map_err(AppError::internal)?
}

pub async fn get_today(State(state): State<AppState>) -> Result<Json<TodayResponse>, AppError> {
    let today = today();
    let day = DayKey::from(today.weekday());
    let items = with_session(&state, move |session| Ok(session.checklist(day, today)?.items())).await?;

    Ok(Json(TodayResponse {
        date: today.to_string(),
        day,
        items,
    }))
}

pub async fn list_items(
    State(state): State<AppState>,
    Path(day): Path<String>,
) -> Result<Json<ItemsResponse>, AppError> {
    let day = parse_day(&day)?;
    let items = with_session(&state, move |session| {
        Ok(session.checklist(day, today())?.items())
    })
    .await?;
    Ok(Json(items_response(day, items, None)))
}

pub async fn add_item(
    State(state): State<AppState>,
    Path(day): Path<String>,
    Json(payload): Json<AddItemRequest>,
) -> Result<Json<ItemsResponse>, AppError> {
    let day = parse_day(&day)?;
    let status = format!("\"{}\" added successfully!", payload.name.trim());
    let items = with_session(&state, move |session| {
        Ok(session.checklist(day, today())?.add(&payload.name)?)
    })
    .await?;
    Ok(Json(items_response(day, items, Some(status))))
}

pub async fn toggle_item(
    State(state): State<AppState>,
    Path((day, id)): Path<(String, String)>,
) -> Result<Json<ItemsResponse>, AppError> {
    let day = parse_day(&day)?;
    let items = with_session(&state, move |session| {
        Ok(session.checklist(day, today())?.toggle(&id)?)
    })
    .await?;
    Ok(Json(items_response(day, items, None)))
}

pub async fn remove_item(
    State(state): State<AppState>,
    Path((day, id)): Path<(String, String)>,
) -> Result<Json<ItemsResponse>, AppError> {
    let day = parse_day(&day)?;
    let items = with_session(&state, move |session| {
        Ok(session.checklist(day, today())?.remove(&id)?)
    })
    .await?;
    Ok(Json(items_response(day, items, Some("Workout deleted!".to_string()))))
}

pub async fn clear_items(
    State(state): State<AppState>,
    Path(day): Path<String>,
) -> Result<Json<ItemsResponse>, AppError> {
    let day = parse_day(&day)?;
    let items = with_session(&state, move |session| {
        Ok(session.checklist(day, today())?.clear_all()?)
    })
    .await?;
    Ok(Json(items_response(day, items, Some("All workouts cleared!".to_string()))))
}

pub async fn get_note(
    State(state): State<AppState>,
    Path(day): Path<String>,
) -> Result<Json<NoteResponse>, AppError> {
    let day = parse_day(&day)?;
    let text = with_session(&state, move |session| Ok(session.store().note(day))).await?;
    Ok(Json(NoteResponse { day, text }))
}

pub async fn put_note(
    State(state): State<AppState>,
    Path(day): Path<String>,
    Json(payload): Json<NoteRequest>,
) -> Result<Json<NoteResponse>, AppError> {
    let day = parse_day(&day)?;
    let text = with_session(&state, move |session| {
        Ok(session.checklist(day, today())?.set_note(&payload.text)?)
    })
    .await?;
    Ok(Json(NoteResponse { day, text }))
}

pub async fn get_profile(State(state): State<AppState>) -> Result<Json<ProfileResponse>, AppError> {
    let name = with_session(&state, |session| Ok(session.store().user_name())).await?;
    Ok(Json(ProfileResponse { name }))
}

pub async fn put_profile(
    State(state): State<AppState>,
    Json(payload): Json<ProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let name = with_session(&state, move |session| {
        Ok(session.store_mut().set_user_name(&payload.name)?)
    })
    .await?;
    Ok(Json(ProfileResponse { name: Some(name) }))
}

pub async fn get_history(State(state): State<AppState>) -> Result<Json<HistoryResponse>, AppError> {
    let records = with_session(&state, |session| Ok(session.snapshot(today())?)).await?;
    Ok(Json(build_history(&records)))
}

pub async fn get_history_mode(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> Result<Json<BucketsResponse>, AppError> {
    let mode: GroupingMode = mode.parse().map_err(AppError::bad_request)?;
    let records = with_session(&state, |session| Ok(session.snapshot(today())?)).await?;
    let buckets = aggregate(&records, mode);
    Ok(Json(BucketsResponse {
        mode,
        summary: summarize(&buckets),
        buckets,
    }))
}

fn parse_day(value: &str) -> Result<DayKey, ChecklistError> {
    value.parse().map_err(ChecklistError::UnknownDay)
}

fn items_response(
    day: DayKey,
    items: Vec<ChecklistItem>,
    status: Option<String>,
) -> ItemsResponse {
    ItemsResponse { day, items, status }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
