//! CLI command implementations.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use sigea::agenda::types::{parse_date, parse_time};
use sigea::agenda::{
    AgendaManager, AppointmentDraft, ConflictDecision, ConflictPrompt, ConflictWarning,
    PreDecided, Slot,
};
use sigea::calendar::{build_month_grid, DayCell, MonthCursor};
use sigea::store::{DocumentStore, JsonFileStore, MemoryStore};
use sigea::{
    create_rest_router, AuthLayer, Authenticator, Config, RestApiConfig, StoreBackendType,
};

use crate::{Command, WatchTarget};

/// Open the configured store backend and execute a command against it.
pub async fn run(config: Config, command: Command, json: bool) -> anyhow::Result<()> {
    match config.store.backend {
        StoreBackendType::Memory => {
            execute(Arc::new(MemoryStore::new()), config, command, json).await
        }
        StoreBackendType::Json => {
            let store = JsonFileStore::open(config.store_path())
                .context("failed to open the agenda store")?;
            execute(Arc::new(store), config, command, json).await
        }
    }
}

async fn execute<S: DocumentStore + 'static>(
    store: Arc<S>,
    mut config: Config,
    command: Command,
    json: bool,
) -> anyhow::Result<()> {
    let manager = Arc::new(AgendaManager::new(store));

    match command {
        Command::Serve { bind, port } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            run_serve(manager, &config).await
        }
        Command::Add {
            titulo,
            date,
            time,
            local,
            descricao,
            yes,
        } => {
            let draft = AppointmentDraft {
                titulo,
                data_evento: parse_date(&date)?,
                hora_evento: parse_time(&time)?,
                local,
                descricao,
            };
            run_add(&manager, draft, yes, json).await
        }
        Command::List { date } => run_list(&manager, date, json).await,
        Command::Update {
            id,
            titulo,
            date,
            time,
            local,
            descricao,
            yes,
        } => {
            run_update(
                &manager, &id, titulo, date, time, local, descricao, yes, json,
            )
            .await
        }
        Command::Delete { id } => run_delete(&manager, &id, json).await,
        Command::Grid {
            year,
            month,
            selected,
        } => run_grid(&manager, year, month, selected, json).await,
        Command::Conflicts {
            date,
            time,
            exclude,
        } => run_conflicts(&manager, &date, &time, exclude, json).await,
        Command::Watch { collection } => run_watch(&manager, collection, json).await,
        Command::Stats => run_stats(&manager, json).await,
    }
}

// ============================================================================
// Serve
// ============================================================================

async fn run_serve<S: DocumentStore + 'static>(
    manager: Arc<AgendaManager<S>>,
    config: &Config,
) -> anyhow::Result<()> {
    let router = create_rest_router(manager, &RestApiConfig::default());
    let router = if config.auth.enabled {
        router.layer(AuthLayer::new(Authenticator::new(config.auth.clone())))
    } else {
        router
    };

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        %addr,
        backend = ?config.store.backend,
        auth = config.auth.enabled,
        "SIGEA server listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down");
}

// ============================================================================
// Appointment commands
// ============================================================================

/// Interactive override prompt: prints the warning and reads a y/N answer.
struct StdinPrompt;

#[async_trait]
impl ConflictPrompt for StdinPrompt {
    async fn confirm(&self, warning: &ConflictWarning) -> ConflictDecision {
        println!("{warning}");
        let answer = tokio::task::spawn_blocking(|| {
            use std::io::Write;
            print!("Proceed anyway? [y/N] ");
            let _ = std::io::stdout().flush();
            let mut line = String::new();
            let _ = std::io::stdin().read_line(&mut line);
            line
        })
        .await
        .unwrap_or_default();

        if answer.trim().eq_ignore_ascii_case("y") {
            ConflictDecision::Proceed
        } else {
            ConflictDecision::Cancel
        }
    }
}

fn prompt_for(yes: bool) -> Box<dyn ConflictPrompt> {
    if yes {
        Box::new(PreDecided(ConflictDecision::Proceed))
    } else {
        Box::new(StdinPrompt)
    }
}

async fn run_add<S: DocumentStore>(
    manager: &AgendaManager<S>,
    draft: AppointmentDraft,
    yes: bool,
    json: bool,
) -> anyhow::Result<()> {
    match manager.create(draft, prompt_for(yes).as_ref()).await {
        Ok(appointment) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&appointment)?);
            } else {
                println!("Added appointment {}", appointment.id);
            }
            Ok(())
        }
        Err(err) if err.is_cancelled() => {
            println!("Cancelled.");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_update<S: DocumentStore>(
    manager: &AgendaManager<S>,
    id: &str,
    titulo: Option<String>,
    date: Option<String>,
    time: Option<String>,
    local: Option<String>,
    descricao: Option<String>,
    yes: bool,
    json: bool,
) -> anyhow::Result<()> {
    let current = manager
        .get(id)
        .await?
        .with_context(|| format!("no appointment with id {id}"))?;

    // Full replace: unset flags keep the stored values.
    let draft = AppointmentDraft {
        titulo: titulo.unwrap_or(current.titulo),
        data_evento: match date {
            Some(date) => parse_date(&date)?,
            None => current.data_evento,
        },
        hora_evento: match time {
            Some(time) => parse_time(&time)?,
            None => current.hora_evento,
        },
        local: local.or(current.local),
        descricao: descricao.or(current.descricao),
    };

    match manager.update(id, draft, prompt_for(yes).as_ref()).await {
        Ok(appointment) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&appointment)?);
            } else {
                println!("Updated appointment {}", appointment.id);
            }
            Ok(())
        }
        Err(err) if err.is_cancelled() => {
            println!("Cancelled.");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

async fn run_delete<S: DocumentStore>(
    manager: &AgendaManager<S>,
    id: &str,
    json: bool,
) -> anyhow::Result<()> {
    let deleted = manager.delete(id).await?;
    if json {
        println!("{}", json!({ "deleted": deleted }));
    } else if deleted {
        println!("Deleted appointment {id}");
    } else {
        println!("No appointment with id {id}");
    }
    Ok(())
}

async fn run_list<S: DocumentStore>(
    manager: &AgendaManager<S>,
    date: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let date = match date {
        Some(date) => parse_date(&date)?,
        None => Utc::now().date_naive(),
    };

    let appointments = manager.appointments_on(date).await?;
    let processes = manager.processes_on(date).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "date": date,
                "appointments": appointments,
                "processes": processes,
            }))?
        );
        return Ok(());
    }

    println!("EVENTOS — {}", date.format("%d/%m/%Y"));
    if appointments.is_empty() {
        println!("  (none)");
    }
    for appointment in &appointments {
        let local = appointment.local.as_deref().unwrap_or("-");
        println!(
            "  {}  {}  [{}]  {}",
            appointment.hora_evento.format("%H:%M"),
            appointment.titulo,
            local,
            appointment.id
        );
        if let Some(descricao) = &appointment.descricao {
            println!("         {descricao}");
        }
    }

    println!("PROCESSOS — {}", date.format("%d/%m/%Y"));
    if processes.is_empty() {
        println!("  (none)");
    }
    for process in &processes {
        println!(
            "  {}  {}  ({})",
            process.numero_processo, process.assunto, process.status
        );
    }
    Ok(())
}

// ============================================================================
// Calendar commands
// ============================================================================

async fn run_grid<S: DocumentStore>(
    manager: &AgendaManager<S>,
    year: i32,
    month: u32,
    selected: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let month0 = month
        .checked_sub(1)
        .ok_or_else(|| anyhow::anyhow!("month must be 1-12"))?;
    let cursor = MonthCursor::new(year, month0)?;

    let today = Utc::now().date_naive();
    let selected = match selected {
        Some(date) => parse_date(&date)?,
        None => today,
    };

    let event_dates = manager.event_dates().await?;
    let cells = build_month_grid(cursor, &event_dates, selected, today);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "year": year,
                "month": month,
                "cells": cells,
            }))?
        );
        return Ok(());
    }

    println!("{year}-{month:02}");
    println!("  Dom  Seg  Ter  Qua  Qui  Sex  Sáb");
    for week in cells.chunks(7) {
        let row: String = week.iter().map(render_cell).collect();
        println!("{row}");
    }
    println!("  * has events   [d] selected   (d) today");
    Ok(())
}

fn render_cell(cell: &DayCell) -> String {
    match cell.day() {
        None => "     ".to_string(),
        Some(day) => {
            let marker = if cell.has_event { '*' } else { ' ' };
            let (open, close) = if cell.is_selected {
                ('[', ']')
            } else if cell.is_today {
                ('(', ')')
            } else {
                (' ', ' ')
            };
            format!("{open}{day:>2}{marker}{close}")
        }
    }
}

async fn run_conflicts<S: DocumentStore>(
    manager: &AgendaManager<S>,
    date: &str,
    time: &str,
    exclude: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let slot = Slot::parse(date, time)?;
    let conflict = manager.check_slot(slot, exclude.as_deref()).await;

    if json {
        println!("{}", json!({ "conflict": conflict }));
    } else if conflict {
        println!("{}", ConflictWarning::creating(slot));
    } else {
        println!("Slot {} {} is free.", date, time);
    }
    Ok(())
}

// ============================================================================
// Watch and stats
// ============================================================================

async fn run_watch<S: DocumentStore>(
    manager: &AgendaManager<S>,
    target: WatchTarget,
    json: bool,
) -> anyhow::Result<()> {
    let mut subscription = match target {
        WatchTarget::Appointments => manager.subscribe_appointments().await?,
        WatchTarget::Processes => manager.subscribe_processes().await?,
    };

    println!("Watching {} (ctrl-c to stop)", subscription.collection());
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = subscription.next() => match event {
                Some(event) => {
                    if json {
                        println!(
                            "{}",
                            json!({
                                "collection": event.collection,
                                "kind": event.kind,
                                "document": event.document,
                            })
                        );
                    } else {
                        println!("{:?} {} in {}", event.kind, event.document.id, event.collection);
                    }
                }
                None => break,
            },
        }
    }
    subscription.unsubscribe();
    Ok(())
}

async fn run_stats<S: DocumentStore>(
    manager: &AgendaManager<S>,
    json: bool,
) -> anyhow::Result<()> {
    let stats = manager.stats().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("appointments: {}", stats.appointments);
        println!("processes:    {}", stats.processes);
    }
    Ok(())
}
