use crate::analysis::attribution;
use crate::models::record::TimesheetRecord;
use crate::models::registry::{MappingRegistry, ServisMapping};
use crate::models::report::{CategoryTotal, ReportType};

/// Ranked reports never show more than this many categories.
pub const TOP_CATEGORY_LIMIT: usize = 20;

/// Derive the report category key for one record. Shared between the ranked
/// report and the time series so both views decompose the same dimension.
pub fn classify(
    record: &TimesheetRecord,
    report_type: ReportType,
    registry: &MappingRegistry,
    servis: &ServisMapping,
) -> String {
    match report_type {
        ReportType::Person => attribution::find_person(&record.full_name, registry)
            .map(str::to_string)
            .or_else(|| Some(record.full_name.clone()).filter(|name| !name.is_empty()))
            .unwrap_or_else(|| "Unknown".to_string()),
        ReportType::Team => attribution::resolve_attribution(record, registry)
            .team
            .unwrap_or_else(|| "Unassigned".to_string()),
        ReportType::Project => attribution::resolve_attribution(record, registry)
            .project
            .unwrap_or_else(|| "Unassigned".to_string()),
        ReportType::Role => attribution::find_person(&record.full_name, registry)
            .and_then(|name| registry.person(name))
            .and_then(|entry| entry.role.clone())
            .unwrap_or_else(|| "Unassigned".to_string()),
        ReportType::Activity => fallback(&record.activity_name, "Unknown"),
        ReportType::Status => fallback(&record.issue_status, "Unknown"),
        ReportType::Epic => fallback(&record.epic, "No Epic"),
        ReportType::ProjectKey => fallback(&record.project_key, "Unknown"),
        ReportType::IssueKey => fallback(&record.issue_key, "Unknown"),
        ReportType::Servis => {
            if record.servis.is_empty() {
                "No Service".to_string()
            } else {
                servis.display_name(&record.servis)
            }
        }
    }
}

fn fallback(value: &str, sentinel: &str) -> String {
    if value.is_empty() {
        sentinel.to_string()
    } else {
        value.to_string()
    }
}

/// Sum hours per category over the (already filtered) records and rank the
/// categories by total, descending. Ties keep first-seen order; the list is
/// capped at the top 20.
pub fn aggregate(
    records: &[&TimesheetRecord],
    report_type: ReportType,
    registry: &MappingRegistry,
    servis: &ServisMapping,
) -> Vec<CategoryTotal> {
    // First-seen order preserved so the later stable sort breaks ties
    // deterministically.
    let mut order: Vec<String> = Vec::new();
    let mut totals: std::collections::HashMap<String, f64> = std::collections::HashMap::new();

    for record in records {
        let key = classify(record, report_type, registry, servis);
        if !totals.contains_key(&key) {
            order.push(key.clone());
        }
        *totals.entry(key).or_insert(0.0) += record.parsed_hours();
    }

    let mut ranked: Vec<CategoryTotal> = order
        .into_iter()
        .map(|label| {
            let value = totals[&label];
            CategoryTotal { label, value }
        })
        .collect();

    ranked.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(TOP_CATEGORY_LIMIT);
    ranked
}
