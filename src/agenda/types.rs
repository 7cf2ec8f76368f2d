//! Agenda domain types.
//!
//! Wire names match the original collections (`dataEvento`, `horaEvento`,
//! `numeroProcesso`, ...) so stored documents remain compatible with the
//! hosted store this service is modeled on.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StoreError, ValidationError};
use crate::store::Document;

/// Tag stored in the `tipo` field of appointment documents. Kept as a
/// string so other compromisso subtypes can appear without a schema
/// change.
pub const EVENT_TAG: &str = "evento";

/// Serde adapter for `HH:MM` time-of-day strings.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    s.parse()
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

/// Parse an `HH:MM` time string.
pub fn parse_time(s: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(s, hhmm::FORMAT)
        .map_err(|_| ValidationError::InvalidTime(s.to_string()))
}

/// The (date, time) pair used as the soft-uniqueness key for conflict
/// checking. Duplicates are legal; the override policy is the only guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
}

impl Slot {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    /// Parse a slot from `YYYY-MM-DD` and `HH:MM` strings.
    pub fn parse(date: &str, time: &str) -> Result<Self, ValidationError> {
        Ok(Self::new(parse_date(date)?, parse_time(time)?))
    }

    /// Date in the display form used in user-facing messages
    /// (`DD/MM/YYYY`).
    pub fn date_br(&self) -> String {
        self.date.format("%d/%m/%Y").to_string()
    }

    /// Time in `HH:MM` form.
    pub fn time_hhmm(&self) -> String {
        self.time.format(hhmm::FORMAT).to_string()
    }
}

/// A scheduled appointment ("compromisso").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Store-assigned identifier, immutable after creation.
    pub id: String,
    pub titulo: String,
    pub data_evento: NaiveDate,
    #[serde(with = "hhmm")]
    pub hora_evento: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    pub tipo: String,
    /// Store-assigned creation timestamp, immutable.
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// The appointment's slot key.
    pub fn slot(&self) -> Slot {
        Slot::new(self.data_evento, self.hora_evento)
    }

    /// Rebuild an appointment from a stored document.
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let mut value = doc.data.clone();
        let obj = value.as_object_mut().ok_or_else(|| {
            StoreError::InvalidDocument(format!("document {} is not an object", doc.id))
        })?;
        obj.insert("id".to_string(), Value::String(doc.id.clone()));
        obj.insert(
            "createdAt".to_string(),
            serde_json::to_value(doc.created_at)?,
        );
        serde_json::from_value(value).map_err(StoreError::Serialization)
    }
}

/// The editable fields of an appointment, as submitted on create/edit.
/// An update is a full replace of these five fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDraft {
    pub titulo: String,
    pub data_evento: NaiveDate,
    #[serde(with = "hhmm")]
    pub hora_evento: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
}

impl AppointmentDraft {
    /// Reject drafts with an empty title. Date and time are already
    /// well-formed by construction.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.titulo.trim().is_empty() {
            return Err(ValidationError::MissingField("titulo"));
        }
        Ok(())
    }

    /// The draft's slot key.
    pub fn slot(&self) -> Slot {
        Slot::new(self.data_evento, self.hora_evento)
    }

    /// Document data for this draft, tagged as an event.
    pub fn to_document_data(&self) -> Result<Value, StoreError> {
        let mut value = serde_json::to_value(self)?;
        // to_value on a struct always yields an object
        if let Some(obj) = value.as_object_mut() {
            obj.insert("tipo".to_string(), Value::String(EVENT_TAG.to_string()));
        }
        Ok(value)
    }
}

/// An external case record ("processo"). Read-only from the agenda's
/// perspective; listed by date alongside appointments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    pub id: String,
    pub numero_processo: String,
    pub assunto: String,
    pub status: String,
    pub data_evento: NaiveDate,
}

impl Process {
    /// Rebuild a process from a stored document.
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let mut value = doc.data.clone();
        let obj = value.as_object_mut().ok_or_else(|| {
            StoreError::InvalidDocument(format!("document {} is not an object", doc.id))
        })?;
        obj.insert("id".to_string(), Value::String(doc.id.clone()));
        serde_json::from_value(value).map_err(StoreError::Serialization)
    }
}
