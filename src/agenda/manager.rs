//! Appointment and process management over a document store.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::agenda::conflict::{ConflictDecision, ConflictPrompt, ConflictWarning};
use crate::agenda::types::{Appointment, AppointmentDraft, Process, Slot};
use crate::error::{Result, SigeaError};
use crate::store::{DocumentStore, QueryFilter, StoreStats, Subscription, APPOINTMENTS, PROCESSES};

/// Manager for agenda operations, providing appointment CRUD with the
/// slot-override policy and date-keyed day views.
pub struct AgendaManager<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> AgendaManager<S> {
    /// Create a new manager over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    // ========================================================================
    // Appointment CRUD
    // ========================================================================

    /// Create an appointment.
    ///
    /// Runs the slot conflict check first; on a collision the prompt
    /// decides whether to write anyway or abort with a cancellation.
    pub async fn create(
        &self,
        draft: AppointmentDraft,
        prompt: &dyn ConflictPrompt,
    ) -> Result<Appointment> {
        draft.validate()?;
        self.apply_override_policy(ConflictWarning::creating(draft.slot()), None, prompt)
            .await?;

        let doc = self
            .store
            .add(APPOINTMENTS, draft.to_document_data()?)
            .await?;
        let appointment = Appointment::from_document(&doc)?;
        debug!(id = %appointment.id, titulo = %appointment.titulo, "appointment created");
        Ok(appointment)
    }

    /// Replace an appointment's editable fields.
    ///
    /// The conflict check excludes the appointment itself, so keeping the
    /// original slot never trips the policy.
    pub async fn update(
        &self,
        id: &str,
        draft: AppointmentDraft,
        prompt: &dyn ConflictPrompt,
    ) -> Result<Appointment> {
        draft.validate()?;
        self.apply_override_policy(ConflictWarning::editing(draft.slot()), Some(id), prompt)
            .await?;

        let doc = self
            .store
            .update(APPOINTMENTS, id, draft.to_document_data()?)
            .await?;
        let appointment = Appointment::from_document(&doc)?;
        debug!(id, titulo = %appointment.titulo, "appointment updated");
        Ok(appointment)
    }

    /// Delete an appointment by id. Returns false if it did not exist.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let removed = self.store.delete(APPOINTMENTS, id).await?;
        if removed {
            debug!(id, "appointment deleted");
        }
        Ok(removed)
    }

    /// Get an appointment by id.
    pub async fn get(&self, id: &str) -> Result<Option<Appointment>> {
        match self.store.get(APPOINTMENTS, id).await? {
            Some(doc) => Ok(Some(Appointment::from_document(&doc)?)),
            None => Ok(None),
        }
    }

    // ========================================================================
    // Day views
    // ========================================================================

    /// Appointments on a date, sorted by time of day.
    pub async fn appointments_on(&self, date: NaiveDate) -> Result<Vec<Appointment>> {
        let filter = QueryFilter::new().field_eq("dataEvento", date.to_string());
        let docs = self.store.query(APPOINTMENTS, filter).await?;

        let mut appointments: Vec<Appointment> = docs
            .iter()
            .filter_map(|doc| Appointment::from_document(doc).ok())
            .collect();
        appointments.sort_by(|a, b| a.hora_evento.cmp(&b.hora_evento));
        Ok(appointments)
    }

    /// Processes on a date, sorted by process number.
    pub async fn processes_on(&self, date: NaiveDate) -> Result<Vec<Process>> {
        let filter = QueryFilter::new().field_eq("dataEvento", date.to_string());
        let docs = self.store.query(PROCESSES, filter).await?;

        let mut processes: Vec<Process> = docs
            .iter()
            .filter_map(|doc| Process::from_document(doc).ok())
            .collect();
        processes.sort_by(|a, b| a.numero_processo.cmp(&b.numero_processo));
        Ok(processes)
    }

    /// The distinct set of dates that have at least one appointment.
    /// Feeds the calendar grid's event marking.
    pub async fn event_dates(&self) -> Result<BTreeSet<NaiveDate>> {
        let docs = self.store.list(APPOINTMENTS).await?;
        Ok(docs
            .iter()
            .filter_map(|doc| Appointment::from_document(doc).ok())
            .map(|appointment| appointment.data_evento)
            .collect())
    }

    // ========================================================================
    // Conflict check
    // ========================================================================

    /// Whether any other appointment occupies the slot.
    ///
    /// `exclude_id` skips the record being edited, so a self-match never
    /// counts. Fail-open: a store read failure reports "no conflict"
    /// rather than blocking the write path; the check is advisory.
    pub async fn check_slot(&self, slot: Slot, exclude_id: Option<&str>) -> bool {
        let mut filter = QueryFilter::new()
            .field_eq("dataEvento", slot.date.to_string())
            .field_eq("horaEvento", slot.time_hhmm());
        if let Some(id) = exclude_id {
            filter = filter.exclude(id);
        }

        match self.store.query(APPOINTMENTS, filter).await {
            Ok(matches) => !matches.is_empty(),
            Err(err) => {
                warn!(error = %err, "conflict check failed, treating as no conflict");
                false
            }
        }
    }

    /// The Unconfirmed → Confirmed/Cancelled step: no conflict writes
    /// straight through; a conflict requires an explicit decision.
    async fn apply_override_policy(
        &self,
        warning: ConflictWarning,
        exclude_id: Option<&str>,
        prompt: &dyn ConflictPrompt,
    ) -> Result<()> {
        if !self.check_slot(warning.slot, exclude_id).await {
            return Ok(());
        }
        match prompt.confirm(&warning).await {
            ConflictDecision::Proceed => Ok(()),
            ConflictDecision::Cancel => Err(SigeaError::Cancelled(warning.to_string())),
        }
    }

    // ========================================================================
    // Subscriptions and stats
    // ========================================================================

    /// Follow appointment collection changes.
    pub async fn subscribe_appointments(&self) -> Result<Subscription> {
        self.store.subscribe(APPOINTMENTS).await
    }

    /// Follow process collection changes.
    pub async fn subscribe_processes(&self) -> Result<Subscription> {
        self.store.subscribe(PROCESSES).await
    }

    /// Collection counts.
    pub async fn stats(&self) -> Result<StoreStats> {
        self.store.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agenda::conflict::PreDecided;
    use crate::agenda::types::parse_date;
    use crate::error::StoreError;
    use crate::store::{Document, MemoryStore};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    fn draft(titulo: &str, date: &str, time: &str) -> AppointmentDraft {
        let slot = Slot::parse(date, time).unwrap();
        AppointmentDraft {
            titulo: titulo.to_string(),
            data_evento: slot.date,
            hora_evento: slot.time,
            local: None,
            descricao: None,
        }
    }

    fn manager() -> AgendaManager<MemoryStore> {
        AgendaManager::new(Arc::new(MemoryStore::new()))
    }

    const PROCEED: PreDecided = PreDecided(ConflictDecision::Proceed);
    const CANCEL: PreDecided = PreDecided(ConflictDecision::Cancel);

    #[tokio::test]
    async fn test_create_and_fetch() {
        let manager = manager();
        let created = manager
            .create(draft("Audiência", "2024-03-10", "09:00"), &PROCEED)
            .await
            .unwrap();

        let fetched = manager.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let manager = manager();
        let result = manager.create(draft("", "2024-03-10", "09:00"), &PROCEED).await;
        assert!(matches!(result, Err(SigeaError::Validation(_))));
    }

    #[tokio::test]
    async fn test_conflict_true_only_for_same_slot() {
        let manager = manager();
        manager
            .create(draft("Audiência", "2024-03-10", "09:00"), &PROCEED)
            .await
            .unwrap();

        let slot = Slot::parse("2024-03-10", "09:00").unwrap();
        assert!(manager.check_slot(slot, None).await);

        let other_time = Slot::parse("2024-03-10", "10:00").unwrap();
        assert!(!manager.check_slot(other_time, None).await);

        let other_date = Slot::parse("2024-03-11", "09:00").unwrap();
        assert!(!manager.check_slot(other_date, None).await);
    }

    #[tokio::test]
    async fn test_conflict_excludes_self() {
        let manager = manager();
        let created = manager
            .create(draft("Audiência", "2024-03-10", "09:00"), &PROCEED)
            .await
            .unwrap();

        let slot = created.slot();
        assert!(manager.check_slot(slot, None).await);
        assert!(!manager.check_slot(slot, Some(&created.id)).await);
    }

    #[tokio::test]
    async fn test_cancelled_create_writes_nothing() {
        let manager = manager();
        manager
            .create(draft("Primeiro", "2024-03-10", "09:00"), &PROCEED)
            .await
            .unwrap();

        let result = manager
            .create(draft("Segundo", "2024-03-10", "09:00"), &CANCEL)
            .await;
        assert!(matches!(&result, Err(err) if err.is_cancelled()));

        let date = parse_date("2024-03-10").unwrap();
        assert_eq!(manager.appointments_on(date).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_confirmed_create_writes_duplicate_slot() {
        let manager = manager();
        manager
            .create(draft("Primeiro", "2024-03-10", "09:00"), &PROCEED)
            .await
            .unwrap();
        manager
            .create(draft("Segundo", "2024-03-10", "09:00"), &PROCEED)
            .await
            .unwrap();

        let date = parse_date("2024-03-10").unwrap();
        assert_eq!(manager.appointments_on(date).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_keeping_own_slot_needs_no_confirmation() {
        let manager = manager();
        let created = manager
            .create(draft("Audiência", "2024-03-10", "09:00"), &PROCEED)
            .await
            .unwrap();

        // CANCEL would abort if the policy asked; it must not ask.
        let updated = manager
            .update(&created.id, draft("Audiência cível", "2024-03-10", "09:00"), &CANCEL)
            .await
            .unwrap();
        assert_eq!(updated.titulo, "Audiência cível");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_into_occupied_slot_can_cancel() {
        let manager = manager();
        manager
            .create(draft("Primeiro", "2024-03-10", "09:00"), &PROCEED)
            .await
            .unwrap();
        let second = manager
            .create(draft("Segundo", "2024-03-10", "10:00"), &PROCEED)
            .await
            .unwrap();

        let result = manager
            .update(&second.id, draft("Segundo", "2024-03-10", "09:00"), &CANCEL)
            .await;
        assert!(matches!(&result, Err(err) if err.is_cancelled()));

        // The record keeps its original slot.
        let kept = manager.get(&second.id).await.unwrap().unwrap();
        assert_eq!(kept.slot(), Slot::parse("2024-03-10", "10:00").unwrap());
    }

    #[tokio::test]
    async fn test_day_view_sorted_by_time() {
        let manager = manager();
        manager
            .create(draft("Tarde", "2024-03-10", "14:00"), &PROCEED)
            .await
            .unwrap();
        manager
            .create(draft("Manhã", "2024-03-10", "08:30"), &PROCEED)
            .await
            .unwrap();
        manager
            .create(draft("Outro dia", "2024-03-11", "07:00"), &PROCEED)
            .await
            .unwrap();

        let date = parse_date("2024-03-10").unwrap();
        let day = manager.appointments_on(date).await.unwrap();
        let titles: Vec<&str> = day.iter().map(|a| a.titulo.as_str()).collect();
        assert_eq!(titles, ["Manhã", "Tarde"]);
    }

    #[tokio::test]
    async fn test_event_dates_are_distinct() {
        let manager = manager();
        manager
            .create(draft("A", "2024-03-10", "09:00"), &PROCEED)
            .await
            .unwrap();
        manager
            .create(draft("B", "2024-03-10", "10:00"), &PROCEED)
            .await
            .unwrap();
        manager
            .create(draft("C", "2024-04-01", "09:00"), &PROCEED)
            .await
            .unwrap();

        let dates = manager.event_dates().await.unwrap();
        assert_eq!(dates.len(), 2);
        assert!(dates.contains(&parse_date("2024-03-10").unwrap()));
        assert!(dates.contains(&parse_date("2024-04-01").unwrap()));
    }

    /// Store whose reads always fail, for the fail-open path.
    struct FailingStore;

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn add(&self, _collection: &str, _data: Value) -> Result<Document> {
            Err(StoreError::Query("store offline".to_string()).into())
        }

        async fn get(&self, _collection: &str, _id: &str) -> Result<Option<Document>> {
            Err(StoreError::Query("store offline".to_string()).into())
        }

        async fn update(&self, _collection: &str, _id: &str, _data: Value) -> Result<Document> {
            Err(StoreError::Query("store offline".to_string()).into())
        }

        async fn delete(&self, _collection: &str, _id: &str) -> Result<bool> {
            Err(StoreError::Query("store offline".to_string()).into())
        }

        async fn query(&self, _collection: &str, _filter: QueryFilter) -> Result<Vec<Document>> {
            Err(StoreError::Query("store offline".to_string()).into())
        }

        async fn list(&self, _collection: &str) -> Result<Vec<Document>> {
            Err(StoreError::Query("store offline".to_string()).into())
        }

        async fn subscribe(&self, _collection: &str) -> Result<Subscription> {
            Err(StoreError::Query("store offline".to_string()).into())
        }

        async fn stats(&self) -> Result<StoreStats> {
            Err(StoreError::Query("store offline".to_string()).into())
        }
    }

    #[tokio::test]
    async fn test_unreadable_store_reports_no_conflict() {
        let manager = AgendaManager::new(Arc::new(FailingStore));
        let slot = Slot::parse("2024-03-10", "09:00").unwrap();
        assert!(!manager.check_slot(slot, None).await);
    }

    #[tokio::test]
    async fn test_failed_write_after_confirmation_is_a_store_error() {
        let manager = AgendaManager::new(Arc::new(FailingStore));
        let result = manager
            .create(draft("Audiência", "2024-03-10", "09:00"), &PROCEED)
            .await;
        match result {
            Err(err) => assert!(!err.is_cancelled()),
            Ok(_) => panic!("write against an offline store must fail"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_document_still_single_conflict_source() {
        // Duplicates at a slot are legal; the checker only reports
        // presence, and the grid marks the date once.
        let manager = manager();
        manager
            .create(draft("A", "2024-03-10", "09:00"), &PROCEED)
            .await
            .unwrap();
        manager
            .create(draft("B", "2024-03-10", "09:00"), &PROCEED)
            .await
            .unwrap();

        let dates = manager.event_dates().await.unwrap();
        assert_eq!(dates.len(), 1);
    }

    #[tokio::test]
    async fn test_processes_on_sorted_by_number() {
        let store = Arc::new(MemoryStore::new());
        let manager = AgendaManager::new(store.clone());
        store
            .add(
                PROCESSES,
                json!({
                    "numeroProcesso": "0900",
                    "assunto": "B",
                    "status": "Concluído",
                    "dataEvento": "2024-03-10"
                }),
            )
            .await
            .unwrap();
        store
            .add(
                PROCESSES,
                json!({
                    "numeroProcesso": "0100",
                    "assunto": "A",
                    "status": "Em andamento",
                    "dataEvento": "2024-03-10"
                }),
            )
            .await
            .unwrap();

        let date = parse_date("2024-03-10").unwrap();
        let processes = manager.processes_on(date).await.unwrap();
        let numbers: Vec<&str> = processes.iter().map(|p| p.numero_processo.as_str()).collect();
        assert_eq!(numbers, ["0100", "0900"]);
    }
}
