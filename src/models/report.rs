use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dimension a report is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportType {
    Person,
    Team,
    Project,
    Role,
    Activity,
    Status,
    Epic,
    ProjectKey,
    IssueKey,
    Servis,
}

/// Calendar grouping for the time series view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

/// One ranked category with its summed hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub label: String,
    pub value: f64,
}

/// Presentation-only overrides for one category, keyed by the stable label.
/// Kept outside the aggregation results so regenerating a report never
/// discards operator customizations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// Ranked entry with the style overlay merged in for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedEntry {
    pub label: String,
    pub value: f64,
    pub display_label: String,
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// Ranked-category render payload: the merged entries plus the flat
/// labels/values arrays the chart consumes directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedReport {
    pub entries: Vec<RankedEntry>,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// One calendar bucket with its per-category hour breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodBucket {
    pub key: String,
    pub total: f64,
    pub breakdown: BTreeMap<String, f64>,
}

/// Time series render payload. `matrix[c][p]` is the hours for category `c`
/// in period `p`; categories follow the ranked report's label order so
/// colors stay consistent between the two views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeries {
    pub periods: Vec<String>,
    pub period_labels: Vec<String>,
    pub categories: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
}
