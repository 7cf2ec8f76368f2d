//! REST API request handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::agenda::types::hhmm;
use crate::agenda::{
    AgendaManager, Appointment, AppointmentDraft, ConflictWarning, PreDecided, Process, Slot,
};
use crate::calendar::{build_month_grid, DayCell, MonthCursor};
use crate::error::{SigeaError, StoreError};
use crate::store::DocumentStore;

/// Application state shared across handlers.
pub struct ApiState<S: DocumentStore> {
    /// Agenda manager for operations.
    pub manager: Arc<AgendaManager<S>>,
}

impl<S: DocumentStore> ApiState<S> {
    /// Create new API state.
    pub fn new(manager: Arc<AgendaManager<S>>) -> Self {
        Self { manager }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Appointment create/update request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    pub titulo: String,
    pub data_evento: NaiveDate,
    #[serde(with = "hhmm")]
    pub hora_evento: NaiveTime,
    #[serde(default)]
    pub local: Option<String>,
    #[serde(default)]
    pub descricao: Option<String>,
    /// The "yes" decision of the override policy: acknowledge a slot
    /// conflict reported by an earlier 409 and write anyway.
    #[serde(default)]
    pub confirm: bool,
}

impl AppointmentRequest {
    fn into_parts(self) -> (AppointmentDraft, bool) {
        let draft = AppointmentDraft {
            titulo: self.titulo,
            data_evento: self.data_evento,
            hora_evento: self.hora_evento,
            local: self.local,
            descricao: self.descricao,
        };
        (draft, self.confirm)
    }
}

/// Day view response: everything shown for a selected date.
#[derive(Debug, Clone, Serialize)]
pub struct DayViewResponse {
    pub date: NaiveDate,
    pub appointments: Vec<Appointment>,
    pub processes: Vec<Process>,
}

/// Month grid query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct GridQuery {
    /// Selected date to highlight; defaults to today.
    #[serde(default)]
    pub selected: Option<NaiveDate>,
    /// Override "today" for deterministic rendering; defaults to the
    /// server's current UTC date.
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

/// Month grid response.
#[derive(Debug, Clone, Serialize)]
pub struct GridResponse {
    pub year: i32,
    /// One-based calendar month.
    pub month: u32,
    pub cells: Vec<DayCell>,
}

/// Conflict probe query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ConflictQuery {
    pub date: String,
    pub time: String,
    /// Appointment id to exclude (the record being edited).
    #[serde(default)]
    pub exclude: Option<String>,
}

/// Conflict probe response.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictResponse {
    pub conflict: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Delete response.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// Error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

fn error_response(err: SigeaError) -> Response {
    let (status, code, message) = match err {
        // An unconfirmed conflict: the 409 body carries the prompt the
        // client shows before retrying with `confirm: true`.
        SigeaError::Cancelled(message) => (StatusCode::CONFLICT, "slot_conflict", message),
        SigeaError::Validation(err) => (StatusCode::BAD_REQUEST, "invalid_request", err.to_string()),
        SigeaError::Store(StoreError::NotFound(id)) => (
            StatusCode::NOT_FOUND,
            "not_found",
            format!("Document not found: {id}"),
        ),
        err => (StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string()),
    };

    (
        status,
        Json(ErrorResponse {
            error: message,
            code: code.to_string(),
        }),
    )
        .into_response()
}

fn not_found(id: &str) -> Response {
    error_response(StoreError::NotFound(id.to_string()).into())
}

// ============================================================================
// Handler Functions
// ============================================================================

/// POST /api/v1/appointments - Create an appointment.
pub async fn create_appointment_handler<S: DocumentStore>(
    State(state): State<Arc<ApiState<S>>>,
    Json(request): Json<AppointmentRequest>,
) -> Response {
    let (draft, confirm) = request.into_parts();
    let prompt = PreDecided::from_flag(confirm);

    match state.manager.create(draft, &prompt).await {
        Ok(appointment) => (StatusCode::CREATED, Json(appointment)).into_response(),
        Err(err) => error_response(err),
    }
}

/// PUT /api/v1/appointments/:id - Replace an appointment's fields.
pub async fn update_appointment_handler<S: DocumentStore>(
    State(state): State<Arc<ApiState<S>>>,
    Path(id): Path<String>,
    Json(request): Json<AppointmentRequest>,
) -> Response {
    let (draft, confirm) = request.into_parts();
    let prompt = PreDecided::from_flag(confirm);

    match state.manager.update(&id, draft, &prompt).await {
        Ok(appointment) => Json(appointment).into_response(),
        Err(err) => error_response(err),
    }
}

/// GET /api/v1/appointments/:id - Fetch one appointment.
pub async fn get_appointment_handler<S: DocumentStore>(
    State(state): State<Arc<ApiState<S>>>,
    Path(id): Path<String>,
) -> Response {
    match state.manager.get(&id).await {
        Ok(Some(appointment)) => Json(appointment).into_response(),
        Ok(None) => not_found(&id),
        Err(err) => error_response(err),
    }
}

/// DELETE /api/v1/appointments/:id - Delete an appointment.
pub async fn delete_appointment_handler<S: DocumentStore>(
    State(state): State<Arc<ApiState<S>>>,
    Path(id): Path<String>,
) -> Response {
    match state.manager.delete(&id).await {
        Ok(true) => Json(DeleteResponse { deleted: true }).into_response(),
        Ok(false) => not_found(&id),
        Err(err) => error_response(err),
    }
}

/// GET /api/v1/day/:date - Appointments and processes for a date.
pub async fn day_view_handler<S: DocumentStore>(
    State(state): State<Arc<ApiState<S>>>,
    Path(date): Path<NaiveDate>,
) -> Response {
    let appointments = match state.manager.appointments_on(date).await {
        Ok(appointments) => appointments,
        Err(err) => return error_response(err),
    };
    let processes = match state.manager.processes_on(date).await {
        Ok(processes) => processes,
        Err(err) => return error_response(err),
    };

    Json(DayViewResponse {
        date,
        appointments,
        processes,
    })
    .into_response()
}

/// GET /api/v1/grid/:year/:month - The 42-cell month grid. `month` is
/// one-based in the URL.
pub async fn grid_handler<S: DocumentStore>(
    State(state): State<Arc<ApiState<S>>>,
    Path((year, month)): Path<(i32, u32)>,
    Query(params): Query<GridQuery>,
) -> Response {
    let cursor = match month
        .checked_sub(1)
        .ok_or(crate::error::ValidationError::InvalidMonth(month))
        .and_then(|month0| MonthCursor::new(year, month0))
    {
        Ok(cursor) => cursor,
        Err(err) => return error_response(err.into()),
    };

    let event_dates = match state.manager.event_dates().await {
        Ok(dates) => dates,
        Err(err) => return error_response(err),
    };

    let today = params.today.unwrap_or_else(|| Utc::now().date_naive());
    let selected = params.selected.unwrap_or(today);
    let cells = build_month_grid(cursor, &event_dates, selected, today);

    Json(GridResponse {
        year,
        month,
        cells,
    })
    .into_response()
}

/// GET /api/v1/conflicts - Probe a slot for a collision.
pub async fn conflict_handler<S: DocumentStore>(
    State(state): State<Arc<ApiState<S>>>,
    Query(query): Query<ConflictQuery>,
) -> Response {
    let slot = match Slot::parse(&query.date, &query.time) {
        Ok(slot) => slot,
        Err(err) => return error_response(err.into()),
    };

    let editing = query.exclude.is_some();
    let conflict = state.manager.check_slot(slot, query.exclude.as_deref()).await;
    let message = conflict.then(|| {
        if editing {
            ConflictWarning::editing(slot).to_string()
        } else {
            ConflictWarning::creating(slot).to_string()
        }
    });

    Json(ConflictResponse { conflict, message }).into_response()
}

/// GET /api/v1/stats - Collection counts.
pub async fn stats_handler<S: DocumentStore>(
    State(state): State<Arc<ApiState<S>>>,
) -> Response {
    match state.manager.stats().await {
        Ok(stats) => Json(stats).into_response(),
        Err(err) => error_response(err),
    }
}
