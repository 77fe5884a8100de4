use crate::analysis::{csv, filter::FilterSpec};
use crate::commands::{lock_session, SharedSession};
use crate::models::record::ValidationReport;

/// Parse without committing, so the caller can inspect the validation
/// report (and its skipped-row diagnostics) before deciding to import.
#[tauri::command]
pub async fn timesheet_validate(csv_text: String) -> Result<ValidationReport, String> {
    Ok(csv::parse_document(&csv_text).validation)
}

#[tauri::command]
pub async fn timesheet_import(
    csv_text: String,
    session: tauri::State<'_, SharedSession>,
) -> Result<ValidationReport, String> {
    timesheet_import_internal(&csv_text, session.inner())
}

/// Parse and replace the record set with the accepted rows. Malformed rows
/// are excluded but never abort the import.
pub fn timesheet_import_internal(
    csv_text: &str,
    session: &SharedSession,
) -> Result<ValidationReport, String> {
    let dataset = csv::parse_document(csv_text);
    let report = dataset.validation.clone();

    if report.invalid_rows > 0 {
        log::warn!(
            "import skipped {} of {} rows",
            report.invalid_rows,
            report.valid_rows + report.invalid_rows
        );
    }
    log::info!("imported {} timesheet records", report.valid_rows);

    let mut state = lock_session(session)?;
    state.dataset = dataset;
    Ok(report)
}

#[tauri::command]
pub async fn timesheet_export_csv(
    spec: FilterSpec,
    session: tauri::State<'_, SharedSession>,
) -> Result<String, String> {
    timesheet_export_csv_internal(&spec, session.inner())
}

/// Export the filtered records with synthesized Team/Project columns.
pub fn timesheet_export_csv_internal(
    spec: &FilterSpec,
    session: &SharedSession,
) -> Result<String, String> {
    let state = lock_session(session)?;
    if state.dataset.records.is_empty() {
        return Err("No data to export".to_string());
    }

    let filtered: Vec<_> = crate::analysis::filter::apply(&state.dataset.records, spec, &state.registry)
        .into_iter()
        .cloned()
        .collect();
    Ok(csv::export_csv(&state.dataset.headers, &filtered, &state.registry))
}

#[tauri::command]
pub async fn timesheet_clear_all(
    session: tauri::State<'_, SharedSession>,
) -> Result<usize, String> {
    timesheet_clear_all_internal(session.inner())
}

/// Bulk-clear the whole record set and its validation report. The only way
/// records are ever destroyed; registries are untouched.
pub fn timesheet_clear_all_internal(session: &SharedSession) -> Result<usize, String> {
    let mut state = lock_session(session)?;
    let cleared = state.dataset.records.len();
    state.dataset = Default::default();
    log::info!("cleared {cleared} timesheet records");
    Ok(cleared)
}
