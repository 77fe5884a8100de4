use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::analysis::{attribution, filter, filter::FilterSpec};
use crate::commands::{lock_session, SharedSession};
use crate::models::record::{SummaryStats, TimesheetRecord};

/// Which override slot a batch update writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchField {
    Team,
    Project,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub updated: usize,
    pub skipped: usize,
}

#[tauri::command]
pub async fn records_filter(
    spec: FilterSpec,
    session: tauri::State<'_, SharedSession>,
) -> Result<Vec<TimesheetRecord>, String> {
    records_filter_internal(&spec, session.inner())
}

pub fn records_filter_internal(
    spec: &FilterSpec,
    session: &SharedSession,
) -> Result<Vec<TimesheetRecord>, String> {
    let state = lock_session(session)?;
    Ok(filter::apply(&state.dataset.records, spec, &state.registry)
        .into_iter()
        .cloned()
        .collect())
}

#[tauri::command]
pub async fn records_summary(
    spec: FilterSpec,
    session: tauri::State<'_, SharedSession>,
) -> Result<SummaryStats, String> {
    records_summary_internal(&spec, session.inner())
}

pub fn records_summary_internal(
    spec: &FilterSpec,
    session: &SharedSession,
) -> Result<SummaryStats, String> {
    let state = lock_session(session)?;
    let filtered = filter::apply(&state.dataset.records, spec, &state.registry);

    let mut people = HashSet::new();
    let mut issues = HashSet::new();
    let mut total_hours = 0.0;
    for record in &filtered {
        if !record.full_name.is_empty() {
            people.insert(record.full_name.as_str());
        }
        if !record.issue_key.is_empty() {
            issues.insert(record.issue_key.as_str());
        }
        total_hours += record.parsed_hours();
    }

    Ok(SummaryStats {
        records: filtered.len(),
        total_hours,
        unique_people: people.len(),
        unique_issues: issues.len(),
    })
}

#[tauri::command]
pub async fn record_set_override(
    spec: FilterSpec,
    index: usize,
    team: Option<String>,
    project: Option<String>,
    session: tauri::State<'_, SharedSession>,
) -> Result<TimesheetRecord, String> {
    record_set_override_internal(&spec, index, team, project, session.inner())
}

/// Edit one filtered row's override pair. Blank values clear the slot. The
/// original record is located through the weak identity key.
pub fn record_set_override_internal(
    spec: &FilterSpec,
    index: usize,
    team: Option<String>,
    project: Option<String>,
    session: &SharedSession,
) -> Result<TimesheetRecord, String> {
    let mut state = lock_session(session)?;

    let target = {
        let filtered = filter::apply(&state.dataset.records, spec, &state.registry);
        filtered
            .get(index)
            .map(|r| (*r).clone())
            .ok_or_else(|| format!("No filtered record at index {index}"))?
    };

    let original = state
        .dataset
        .find_matching_index(&target)
        .ok_or_else(|| "Original record not found".to_string())?;

    let record = &mut state.dataset.records[original];
    record.overrides.team = team.filter(|t| !t.trim().is_empty());
    record.overrides.project = project.filter(|p| !p.trim().is_empty());
    Ok(record.clone())
}

#[tauri::command]
pub async fn records_batch_update(
    spec: FilterSpec,
    indices: Vec<usize>,
    field: BatchField,
    value: String,
    session: tauri::State<'_, SharedSession>,
) -> Result<BatchOutcome, String> {
    records_batch_update_internal(&spec, &indices, field, &value, session.inner())
}

/// Apply one override value to an explicit selection of filtered-row
/// indices. Indices that no longer resolve to a record are skipped, not
/// retried. When a record gets its first override, the currently resolved
/// team and project are baked in first so the untouched field keeps its
/// present resolution.
pub fn records_batch_update_internal(
    spec: &FilterSpec,
    indices: &[usize],
    field: BatchField,
    value: &str,
    session: &SharedSession,
) -> Result<BatchOutcome, String> {
    if value.trim().is_empty() {
        return Err("A value is required for batch update".to_string());
    }

    let mut state = lock_session(session)?;
    let targets: Vec<Option<TimesheetRecord>> = {
        let filtered = filter::apply(&state.dataset.records, spec, &state.registry);
        indices
            .iter()
            .map(|&idx| filtered.get(idx).map(|r| (*r).clone()))
            .collect()
    };

    let mut updated = 0;
    let mut skipped = 0;
    for target in targets {
        let Some(target) = target else {
            skipped += 1;
            continue;
        };
        let Some(original) = state.dataset.find_matching_index(&target) else {
            skipped += 1;
            continue;
        };

        let resolved = attribution::resolve_attribution(&state.dataset.records[original], &state.registry);
        let record = &mut state.dataset.records[original];
        if record.overrides.is_empty() {
            record.overrides.team = resolved.team;
            record.overrides.project = resolved.project;
        }
        match field {
            BatchField::Team => record.overrides.team = Some(value.to_string()),
            BatchField::Project => record.overrides.project = Some(value.to_string()),
        }
        updated += 1;
    }

    log::info!("batch update: {updated} updated, {skipped} skipped");
    Ok(BatchOutcome { updated, skipped })
}

#[tauri::command]
pub async fn apply_person_mapping(
    spec: FilterSpec,
    override_existing: bool,
    session: tauri::State<'_, SharedSession>,
) -> Result<BatchOutcome, String> {
    apply_person_mapping_internal(&spec, override_existing, session.inner())
}

/// Copy matched person attributes into the overrides of every filtered
/// record. Records that already carry a team or project (override or CSV
/// column) are skipped unless `override_existing` is set.
pub fn apply_person_mapping_internal(
    spec: &FilterSpec,
    override_existing: bool,
    session: &SharedSession,
) -> Result<BatchOutcome, String> {
    let mut state = lock_session(session)?;
    let targets: Vec<TimesheetRecord> = {
        let filtered = filter::apply(&state.dataset.records, spec, &state.registry);
        filtered.into_iter().cloned().collect()
    };

    let mut updated = 0;
    let mut skipped = 0;
    for target in targets {
        if target.full_name.is_empty() {
            continue;
        }

        let has_team = target.overrides.team.is_some() || !target.team.is_empty();
        let has_project = target.overrides.project.is_some() || !target.project.is_empty();
        if !override_existing && (has_team || has_project) {
            skipped += 1;
            continue;
        }

        let entry = attribution::find_person(&target.full_name, &state.registry)
            .and_then(|name| state.registry.person(name))
            .cloned();
        let Some(entry) = entry else {
            continue;
        };

        let Some(original) = state.dataset.find_matching_index(&target) else {
            skipped += 1;
            continue;
        };
        let record = &mut state.dataset.records[original];
        if let Some(team) = entry.team {
            record.overrides.team = Some(team);
        }
        if let Some(project) = entry.project {
            record.overrides.project = Some(project);
        }
        updated += 1;
    }

    log::info!("person mapping applied: {updated} updated, {skipped} skipped");
    Ok(BatchOutcome { updated, skipped })
}
