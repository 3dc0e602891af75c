//! HTTP routes for the dashboard API.
//!
//! All endpoints live under `/api`. Store access runs on the blocking pool;
//! period windows are computed in the host's local time zone.

use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Local;
use classpulse_core::analytics::{
    dashboard, Bucket, DashboardQuery, InsightsSummary, Overview, PulseInsight, TeacherSummary,
    WeeklyCounts,
};
use classpulse_core::auth::{check_admin_login, LoginOutcome};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(status))
        .route("/api/analytics/weekly-summary", get(weekly_summary))
        .route("/api/analytics/daily-activity", get(daily_activity))
        .route("/api/analytics/insights", get(insights))
        .route("/api/analytics/overview", get(overview))
        .route("/api/analytics/ai-pulse", get(ai_pulse))
        .route("/api/teachers", get(all_teachers))
        .route("/api/teachers/{id}", get(teacher_by_id))
        .route("/api/admin/login", post(admin_login))
        .route("/api/admin/login/ping", get(ping))
        .layer(middleware::from_fn(allow_any_origin))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

// ============================================
// Middleware
// ============================================

/// Log method, path, status and latency of every request.
async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "Handled request"
    );
    response
}

/// Permissive CORS for the browser dashboard, answering preflights directly.
async fn allow_any_origin(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET,HEAD,POST,OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type"),
    );
    response
}

// ============================================
// Health
// ============================================

async fn status() -> Json<Value> {
    Json(json!({ "status": "Teacher Insights API running" }))
}

async fn ping() -> Json<Value> {
    Json(json!({ "ok": true }))
}

// ============================================
// Analytics
// ============================================

async fn weekly_summary(State(state): State<AppState>) -> ApiResult<Json<Vec<WeeklyCounts>>> {
    let weeks = state
        .blocking("Failed to fetch weekly summary", |store, _| {
            dashboard::weekly_summary(store, &Local)
        })
        .await?;
    Ok(Json(weeks))
}

async fn daily_activity(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<Vec<Bucket>>> {
    let buckets = state
        .blocking("Failed to fetch daily activity", move |store, now| {
            dashboard::daily_activity(store, &query, &Local, now)
        })
        .await?;
    Ok(Json(buckets))
}

async fn insights(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<InsightsSummary>> {
    let summary = state
        .blocking("Failed to fetch insights", move |store, now| {
            dashboard::insights(store, &query, &Local, now)
        })
        .await?;
    Ok(Json(summary))
}

/// Buckets and insights fetched concurrently.
async fn overview(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<Overview>> {
    let activity_query = query.clone();
    let (activity, insights) = tokio::try_join!(
        state.blocking("Failed to fetch overview", move |store, now| {
            dashboard::daily_activity(store, &activity_query, &Local, now)
        }),
        state.blocking("Failed to fetch overview", move |store, now| {
            dashboard::insights(store, &query, &Local, now)
        }),
    )?;
    Ok(Json(Overview { activity, insights }))
}

async fn ai_pulse(State(state): State<AppState>) -> ApiResult<Json<[PulseInsight; 3]>> {
    let pulse = state
        .blocking("Failed to fetch AI pulse", |store, _| dashboard::ai_pulse(store))
        .await?;
    Ok(Json(pulse))
}

// ============================================
// Teachers
// ============================================

async fn all_teachers(State(state): State<AppState>) -> ApiResult<Json<Vec<TeacherSummary>>> {
    let teachers = state
        .blocking("Failed to fetch teachers", |store, _| {
            dashboard::all_teachers(store, &Local)
        })
        .await?;
    Ok(Json(teachers))
}

async fn teacher_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<TeacherSummary>> {
    state
        .blocking("Failed to fetch teacher", move |store, _| {
            dashboard::teacher_by_id(store, &id, &Local)
        })
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Teacher not found"))
}

// ============================================
// Admin
// ============================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    admin_id: Option<String>,
    password: Option<String>,
}

/// A missing or malformed body is treated as blank credentials.
async fn admin_login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable login body");
            LoginRequest::default()
        }
    };

    let outcome = check_admin_login(
        &state.admin,
        request.admin_id.as_deref(),
        request.password.as_deref(),
    );

    let status = match outcome {
        LoginOutcome::Success => StatusCode::OK,
        LoginOutcome::MissingCredentials => StatusCode::BAD_REQUEST,
        LoginOutcome::InvalidCredentials => StatusCode::UNAUTHORIZED,
    };

    (
        status,
        Json(json!({ "success": outcome.is_success(), "message": outcome.message() })),
    )
}
