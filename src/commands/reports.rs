use std::collections::BTreeMap;

use crate::analysis::{aggregate, buckets, filter, filter::FilterSpec};
use crate::commands::{lock_session, SharedSession, Session};
use crate::models::report::{
    CategoryStyle, Granularity, RankedEntry, RankedReport, ReportType, TimeSeries,
};

#[tauri::command]
pub async fn report_ranked(
    spec: FilterSpec,
    report_type: ReportType,
    session: tauri::State<'_, SharedSession>,
) -> Result<RankedReport, String> {
    report_ranked_internal(&spec, report_type, session.inner())
}

/// Filter, aggregate, then merge the presentation overlay. Hidden
/// categories are dropped from the flat chart arrays but stay listed in
/// `entries` so the caller can re-show them.
pub fn report_ranked_internal(
    spec: &FilterSpec,
    report_type: ReportType,
    session: &SharedSession,
) -> Result<RankedReport, String> {
    let state = lock_session(session)?;
    Ok(build_ranked(&state, spec, report_type))
}

fn build_ranked(state: &Session, spec: &FilterSpec, report_type: ReportType) -> RankedReport {
    let filtered = filter::apply(&state.dataset.records, spec, &state.registry);
    let totals = aggregate::aggregate(&filtered, report_type, &state.registry, &state.servis);

    let mut entries: Vec<RankedEntry> = totals
        .into_iter()
        .map(|total| {
            let style = state.styles.get(&total.label);
            RankedEntry {
                display_label: style
                    .and_then(|s| s.display_label.clone())
                    .unwrap_or_else(|| total.label.clone()),
                visible: style.and_then(|s| s.visible).unwrap_or(true),
                color: style.and_then(|s| s.color.clone()),
                order: style.and_then(|s| s.order),
                label: total.label,
                value: total.value,
            }
        })
        .collect();

    // Explicit order overrides come first; the rest keep their rank.
    entries.sort_by(|a, b| match (a.order, b.order) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let labels = entries
        .iter()
        .filter(|entry| entry.visible)
        .map(|entry| entry.display_label.clone())
        .collect();
    let values = entries
        .iter()
        .filter(|entry| entry.visible)
        .map(|entry| entry.value)
        .collect();

    RankedReport {
        entries,
        labels,
        values,
    }
}

#[tauri::command]
pub async fn report_time_series(
    spec: FilterSpec,
    granularity: Granularity,
    report_type: ReportType,
    session: tauri::State<'_, SharedSession>,
) -> Result<TimeSeries, String> {
    report_time_series_internal(&spec, granularity, report_type, session.inner())
}

/// Bucket the filtered records by calendar period and pivot the breakdowns
/// into a category-by-period matrix. Categories follow the ranked report's
/// order so the two views line up.
pub fn report_time_series_internal(
    spec: &FilterSpec,
    granularity: Granularity,
    report_type: ReportType,
    session: &SharedSession,
) -> Result<TimeSeries, String> {
    let state = lock_session(session)?;

    let filtered = filter::apply(&state.dataset.records, spec, &state.registry);
    let periods = buckets::bucket(&filtered, granularity, report_type, &state.registry, &state.servis);

    let ranked = build_ranked(&state, spec, report_type);
    let categories: Vec<String> = ranked
        .entries
        .iter()
        .filter(|entry| entry.visible)
        .map(|entry| entry.label.clone())
        .collect();

    let matrix = categories
        .iter()
        .map(|category| {
            periods
                .iter()
                .map(|period| period.breakdown.get(category).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();

    Ok(TimeSeries {
        period_labels: periods
            .iter()
            .map(|period| buckets::period_label(&period.key, granularity))
            .collect(),
        periods: periods.into_iter().map(|period| period.key).collect(),
        categories,
        matrix,
    })
}

#[tauri::command]
pub async fn styles_get(
    session: tauri::State<'_, SharedSession>,
) -> Result<BTreeMap<String, CategoryStyle>, String> {
    let state = lock_session(session.inner())?;
    Ok(state.styles.clone())
}

#[tauri::command]
pub async fn style_update(
    label: String,
    style: CategoryStyle,
    session: tauri::State<'_, SharedSession>,
) -> Result<(), String> {
    style_update_internal(&label, style, session.inner())
}

/// Upsert one category's presentation overlay. An all-default style removes
/// the entry so the overlay map only holds real customizations.
pub fn style_update_internal(
    label: &str,
    style: CategoryStyle,
    session: &SharedSession,
) -> Result<(), String> {
    let mut state = lock_session(session)?;
    let is_default = style.display_label.is_none()
        && style.color.is_none()
        && style.visible.is_none()
        && style.order.is_none();
    if is_default {
        state.styles.remove(label);
    } else {
        state.styles.insert(label.to_string(), style);
    }
    Ok(())
}
