//! End-to-end agenda flow over the in-memory store.

use std::sync::Arc;

use sigea::agenda::types::parse_date;
use sigea::{
    build_month_grid, AgendaManager, AppointmentDraft, ChangeKind, ConflictDecision, MemoryStore,
    MonthCursor, PreDecided, Slot, GRID_CELLS,
};

const PROCEED: PreDecided = PreDecided(ConflictDecision::Proceed);
const CANCEL: PreDecided = PreDecided(ConflictDecision::Cancel);

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

#[tokio::test]
async fn test_conflict_probe_end_to_end() {
    let manager = manager();
    manager
        .create(draft("Audiência", "2024-03-10", "09:00"), &PROCEED)
        .await
        .unwrap();

    let occupied = Slot::parse("2024-03-10", "09:00").unwrap();
    let free = Slot::parse("2024-03-10", "10:00").unwrap();
    assert!(manager.check_slot(occupied, None).await);
    assert!(!manager.check_slot(free, None).await);
}

#[tokio::test]
async fn test_create_edit_delete_lifecycle() {
    let manager = manager();

    let created = manager
        .create(draft("Audiência", "2024-03-10", "09:00"), &PROCEED)
        .await
        .unwrap();

    // A second write into the slot needs confirmation; declining keeps
    // the day view unchanged.
    let declined = manager
        .create(draft("Reunião", "2024-03-10", "09:00"), &CANCEL)
        .await;
    assert!(matches!(&declined, Err(err) if err.is_cancelled()));

    // Editing the sole holder of the slot never conflicts with itself.
    let updated = manager
        .update(&created.id, draft("Audiência cível", "2024-03-10", "09:00"), &CANCEL)
        .await
        .unwrap();
    assert_eq!(updated.titulo, "Audiência cível");
    assert_eq!(updated.id, created.id);

    assert!(manager.delete(&created.id).await.unwrap());
    let date = parse_date("2024-03-10").unwrap();
    assert!(manager.appointments_on(date).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_subscription_follows_lifecycle() {
    let manager = manager();
    let mut subscription = manager.subscribe_appointments().await.unwrap();

    let created = manager
        .create(draft("Audiência", "2024-03-10", "09:00"), &PROCEED)
        .await
        .unwrap();
    manager
        .update(&created.id, draft("Perícia", "2024-03-10", "09:00"), &PROCEED)
        .await
        .unwrap();
    manager.delete(&created.id).await.unwrap();

    let kinds = [
        subscription.next().await.unwrap().kind,
        subscription.next().await.unwrap().kind,
        subscription.next().await.unwrap().kind,
    ];
    assert_eq!(
        kinds,
        [ChangeKind::Added, ChangeKind::Updated, ChangeKind::Deleted]
    );

    subscription.unsubscribe();
}

#[tokio::test]
async fn test_grid_marks_appointment_dates() {
    let manager = manager();
    manager
        .create(draft("A", "2024-02-05", "09:00"), &PROCEED)
        .await
        .unwrap();
    manager
        .create(draft("B", "2024-02-05", "10:00"), &PROCEED)
        .await
        .unwrap();
    manager
        .create(draft("C", "2024-02-29", "09:00"), &PROCEED)
        .await
        .unwrap();

    let event_dates = manager.event_dates().await.unwrap();
    let cells = build_month_grid(
        MonthCursor::new(2024, 1).unwrap(),
        &event_dates,
        parse_date("2024-02-05").unwrap(),
        parse_date("2024-02-01").unwrap(),
    );

    assert_eq!(cells.len(), GRID_CELLS);
    let marked: Vec<u32> = cells
        .iter()
        .filter(|cell| cell.has_event)
        .filter_map(|cell| cell.day())
        .collect();
    assert_eq!(marked, [5, 29]);
}
