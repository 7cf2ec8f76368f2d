//! SIGEA: Agenda Service
//!
//! A calendar/agenda service for scheduling appointments ("compromissos")
//! and tracking case records ("processos"), with slot conflict detection
//! and a month-grid calendar over a pluggable document store.

pub mod agenda;
pub mod api;
pub mod auth;
pub mod calendar;
pub mod config;
pub mod error;
pub mod store;

pub use agenda::{
    AgendaManager, Appointment, AppointmentDraft, ConflictDecision, ConflictPrompt,
    ConflictWarning, PreDecided, Process, Slot, EVENT_TAG,
};
pub use api::{create_rest_router, ApiState, RestApiConfig};
pub use auth::{AuthContext, AuthLayer, AuthMiddleware, Authenticator};
pub use calendar::{build_month_grid, DayCell, MonthCursor, GRID_CELLS};
pub use config::{AuthConfig, Config, ServerConfig, StoreBackendType, StoreConfig};
pub use error::{AuthError, ConfigError, Result, SigeaError, StoreError, ValidationError};
pub use store::{
    ChangeEvent, ChangeFeed, ChangeKind, Document, DocumentStore, JsonFileStore, MemoryStore,
    QueryFilter, StoreStats, Subscription, APPOINTMENTS, PROCESSES,
};
