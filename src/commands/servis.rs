use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::commands::{lock_session, SharedSession};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServisEntry {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub display_name: String,
    /// How many loaded records carry this code.
    pub record_count: usize,
}

#[tauri::command]
pub async fn servis_list(
    session: tauri::State<'_, SharedSession>,
) -> Result<Vec<ServisEntry>, String> {
    servis_list_internal(session.inner())
}

/// Every service code seen in the loaded records or carrying a label,
/// sorted by code. Labels without matching records still appear so they
/// can be cleaned up.
pub fn servis_list_internal(session: &SharedSession) -> Result<Vec<ServisEntry>, String> {
    let state = lock_session(session)?;

    let mut codes: BTreeSet<&str> = state.servis.labels.keys().map(String::as_str).collect();
    for record in &state.dataset.records {
        if !record.servis.is_empty() {
            codes.insert(record.servis.as_str());
        }
    }

    Ok(codes
        .into_iter()
        .map(|code| ServisEntry {
            code: code.to_string(),
            label: state.servis.labels.get(code).cloned(),
            display_name: state.servis.display_name(code),
            record_count: state
                .dataset
                .records
                .iter()
                .filter(|record| record.servis == code)
                .count(),
        })
        .collect())
}

#[tauri::command]
pub async fn servis_set_label(
    code: String,
    label: String,
    session: tauri::State<'_, SharedSession>,
) -> Result<String, String> {
    let code = code.trim().to_string();
    if code.is_empty() {
        return Err("A service code is required".to_string());
    }
    let mut state = lock_session(session.inner())?;
    state.servis.set_label(&code, &label);
    Ok(state.servis.display_name(&code))
}

#[tauri::command]
pub async fn servis_clear_label(
    code: String,
    session: tauri::State<'_, SharedSession>,
) -> Result<(), String> {
    let mut state = lock_session(session.inner())?;
    state.servis.clear_label(&code);
    Ok(())
}
