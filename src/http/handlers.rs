//! Route handlers. Reads are served straight from the store; mutations run on
//! the blocking pool because they rewrite the file (and may hash a password).

use super::error::ApiError;
use super::AppState;
use crate::document::{Appointment, Service, User, UserView};
use crate::store::{RecordStore, Session};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::error;

/// `POST /auth/register` body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    name: String,
    email: String,
    password: String,
}

/// `POST /auth/login` body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

/// `POST /auth/register` reply.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    message: &'static str,
    user: UserView,
}

/// `POST /auth/login` reply: message, user and token side by side.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    message: &'static str,
    #[serde(flatten)]
    session: Session,
}

/// `GET /`
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({
        "message": "✨ Luxe Beauty Salon API is running!",
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "services": state.store.service_count(),
    }))
}

/// `GET /services`
pub async fn list_services(State(state): State<AppState>) -> Json<Vec<Service>> {
    Json(state.store.list_services())
}

/// `GET /services/:id`, matching ids loosely.
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Service>, ApiError> {
    Ok(Json(state.store.get_service(&id)?))
}

/// `GET /appointments`
pub async fn list_appointments(State(state): State<AppState>) -> Json<Vec<Appointment>> {
    Json(state.store.list_appointments())
}

/// `POST /appointments`
pub async fn create_appointment(
    State(state): State<AppState>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let Json(fields) = payload?;
    let record = blocking(&state, move |s| s.create_appointment(fields))
        .await?
        .map_err(ApiError::on_write("saving appointment"))?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /users`, passwords included.
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.store.list_users())
}

/// `POST /users`: stored verbatim, no uniqueness check.
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(fields) = payload?;
    let record = blocking(&state, move |s| s.create_user(fields))
        .await?
        .map_err(ApiError::on_write("saving user"))?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `POST /auth/register`
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(req) = payload?;
    let user = blocking(&state, move |s| {
        s.register_user(&req.name, &req.email, &req.password)
    })
    .await?
    .map_err(ApiError::on_write("registering user"))?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
            user,
        }),
    ))
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;
    let session = blocking(&state, move |s| s.authenticate(&req.email, &req.password)).await??;
    Ok(Json(LoginResponse {
        message: "Login successful",
        session,
    }))
}

/// Fallback for unknown paths and unsupported methods.
pub async fn not_found() -> ApiError {
    ApiError::route_not_found()
}

/// Run `f` against the store on the blocking pool.
async fn blocking<T, F>(state: &AppState, f: F) -> Result<crate::Result<T>, ApiError>
where
    F: FnOnce(&RecordStore) -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || f(store.as_ref()))
        .await
        .map_err(|e| {
            error!(error = %e, "store task failed");
            ApiError::internal()
        })
}
