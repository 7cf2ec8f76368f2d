//! JSON store persistence through the agenda manager.

use std::sync::Arc;

use sigea::agenda::types::parse_date;
use sigea::{
    AgendaManager, AppointmentDraft, ConflictDecision, JsonFileStore, PreDecided, Slot,
};
use tempfile::TempDir;

const PROCEED: PreDecided = PreDecided(ConflictDecision::Proceed);

fn draft(titulo: &str, date: &str, time: &str) -> AppointmentDraft {
    let slot = Slot::parse(date, time).unwrap();
    AppointmentDraft {
        titulo: titulo.to_string(),
        data_evento: slot.date,
        hora_evento: slot.time,
        local: Some("Fórum Central".to_string()),
        descricao: None,
    }
}

#[tokio::test]
async fn test_appointments_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sigea.json");

    let manager = AgendaManager::new(Arc::new(JsonFileStore::open(&path).unwrap()));
    let created = manager
        .create(draft("Audiência", "2024-03-10", "09:00"), &PROCEED)
        .await
        .unwrap();
    drop(manager);

    let manager = AgendaManager::new(Arc::new(JsonFileStore::open(&path).unwrap()));
    let fetched = manager.get(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched, created);

    // The conflict check sees persisted slots too.
    let slot = Slot::parse("2024-03-10", "09:00").unwrap();
    assert!(manager.check_slot(slot, None).await);
    assert!(!manager.check_slot(slot, Some(&created.id)).await);
}

#[tokio::test]
async fn test_day_view_after_reopen_stays_sorted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sigea.json");

    let manager = AgendaManager::new(Arc::new(JsonFileStore::open(&path).unwrap()));
    manager
        .create(draft("Tarde", "2024-03-10", "15:00"), &PROCEED)
        .await
        .unwrap();
    manager
        .create(draft("Manhã", "2024-03-10", "08:00"), &PROCEED)
        .await
        .unwrap();
    drop(manager);

    let manager = AgendaManager::new(Arc::new(JsonFileStore::open(&path).unwrap()));
    let date = parse_date("2024-03-10").unwrap();
    let day = manager.appointments_on(date).await.unwrap();
    let titles: Vec<&str> = day.iter().map(|a| a.titulo.as_str()).collect();
    assert_eq!(titles, ["Manhã", "Tarde"]);
}
