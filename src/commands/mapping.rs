use serde_json::Value;

use crate::analysis::{attribution, csv};
use crate::commands::{lock_session, SharedSession};
use crate::models::registry::{CatalogKind, MappingRegistry, Person, PersonEntry};

#[tauri::command]
pub async fn catalog_add(
    kind: CatalogKind,
    name: String,
    session: tauri::State<'_, SharedSession>,
) -> Result<Vec<String>, String> {
    let mut state = lock_session(session.inner())?;
    state.registry.add_catalog_entry(kind, &name)?;
    Ok(state.registry.catalog(kind).to_vec())
}

#[tauri::command]
pub async fn catalog_rename(
    kind: CatalogKind,
    from: String,
    to: String,
    session: tauri::State<'_, SharedSession>,
) -> Result<Vec<String>, String> {
    let mut state = lock_session(session.inner())?;
    state.registry.rename_catalog_entry(kind, &from, &to)?;
    Ok(state.registry.catalog(kind).to_vec())
}

#[tauri::command]
pub async fn catalog_delete(
    kind: CatalogKind,
    name: String,
    session: tauri::State<'_, SharedSession>,
) -> Result<Vec<String>, String> {
    let mut state = lock_session(session.inner())?;
    state.registry.delete_catalog_entry(kind, &name);
    Ok(state.registry.catalog(kind).to_vec())
}

#[tauri::command]
pub async fn people_list(
    session: tauri::State<'_, SharedSession>,
) -> Result<Vec<Person>, String> {
    let state = lock_session(session.inner())?;
    Ok(state.registry.people.clone())
}

#[tauri::command]
pub async fn person_add(
    name: String,
    entry: PersonEntry,
    session: tauri::State<'_, SharedSession>,
) -> Result<(), String> {
    let mut state = lock_session(session.inner())?;
    state.registry.add_person(&name, entry)
}

#[tauri::command]
pub async fn person_update(
    name: String,
    entry: PersonEntry,
    session: tauri::State<'_, SharedSession>,
) -> Result<(), String> {
    let mut state = lock_session(session.inner())?;
    state.registry.update_person(&name, entry);
    Ok(())
}

#[tauri::command]
pub async fn person_delete(
    name: String,
    session: tauri::State<'_, SharedSession>,
) -> Result<(), String> {
    let mut state = lock_session(session.inner())?;
    state.registry.delete_person(&name);
    Ok(())
}

/// Total hours booked by a person, using the same substring match the
/// attribution resolver uses. Invalid hours contribute 0.
#[tauri::command]
pub async fn person_hours(
    name: String,
    session: tauri::State<'_, SharedSession>,
) -> Result<f64, String> {
    let state = lock_session(session.inner())?;
    Ok(state
        .dataset
        .records
        .iter()
        .filter(|record| record.full_name.contains(&name))
        .map(|record| record.parsed_hours())
        .sum())
}

#[tauri::command]
pub async fn mapping_export(
    session: tauri::State<'_, SharedSession>,
) -> Result<Value, String> {
    let state = lock_session(session.inner())?;
    Ok(state.registry.to_interchange())
}

#[tauri::command]
pub async fn mapping_import(
    data: Value,
    session: tauri::State<'_, SharedSession>,
) -> Result<(), String> {
    mapping_import_internal(&data, session.inner())
}

/// Replace the whole registry from the JSON interchange bundle.
pub fn mapping_import_internal(data: &Value, session: &SharedSession) -> Result<(), String> {
    let registry = MappingRegistry::from_interchange(data);
    log::info!(
        "mapping import: {} projects, {} teams, {} roles, {} people",
        registry.projects.len(),
        registry.teams.len(),
        registry.roles.len(),
        registry.people.len()
    );
    let mut state = lock_session(session)?;
    state.registry = registry;
    Ok(())
}

#[tauri::command]
pub async fn people_import_csv(
    csv_text: String,
    session: tauri::State<'_, SharedSession>,
) -> Result<usize, String> {
    people_import_csv_internal(&csv_text, session.inner())
}

/// Bootstrap people from a timesheet export: each row's short display name
/// (text before the first `-`) becomes a new person with empty attributes.
/// Existing entries are never overwritten.
pub fn people_import_csv_internal(csv_text: &str, session: &SharedSession) -> Result<usize, String> {
    let dataset = csv::parse_document(csv_text);

    let mut state = lock_session(session)?;
    let mut imported = 0;
    for record in &dataset.records {
        if record.full_name.is_empty() {
            continue;
        }
        let name = attribution::short_display_name(&record.full_name);
        if name.is_empty() || state.registry.person(name).is_some() {
            continue;
        }
        state
            .registry
            .add_person(name, PersonEntry::default())
            .map_err(|e| format!("Failed to add {name}: {e}"))?;
        imported += 1;
    }

    log::info!("imported {imported} new people from CSV");
    Ok(imported)
}
