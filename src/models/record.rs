use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Manual team/project assignment stored on a record. Once set it outranks
/// the CSV columns and the person registry for that record, no matter how
/// the registries change afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self.team.is_none() && self.project.is_none()
    }
}

/// One imported timesheet row. The raw fields are immutable after ingestion;
/// only `overrides` is ever mutated, and only by explicit edit or batch
/// operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimesheetRecord {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub project_key: String,
    #[serde(default)]
    pub activity_name: String,
    #[serde(default)]
    pub issue_key: String,
    #[serde(default)]
    pub issue_summary: String,
    #[serde(default)]
    pub issue_status: String,
    /// Raw text as imported; parsed on read via `hours()`.
    #[serde(default)]
    pub hours: String,
    /// `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`.
    #[serde(default)]
    pub work_date: String,
    #[serde(default)]
    pub epic: String,
    #[serde(default)]
    pub work_description: String,
    #[serde(default)]
    pub servis: String,
    /// Source-provided Team/Project columns, when the export carried them.
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub project: String,
    /// Columns outside the canonical set, keyed by their header name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Overrides::is_empty")]
    pub overrides: Overrides,
}

impl TimesheetRecord {
    /// Build a record from a parsed CSV row. Headers are matched by their
    /// literal export names; unknown columns land in `extra`. The
    /// `_overrides` bookkeeping column is an export artifact and is dropped
    /// here rather than kept as an extra column.
    pub fn from_fields(headers: &[String], values: &[String]) -> Self {
        let mut record = TimesheetRecord::default();
        for (header, value) in headers.iter().zip(values.iter()) {
            match header.as_str() {
                "Full name" => record.full_name = value.clone(),
                "Project Key" => record.project_key = value.clone(),
                "Activity Name" => record.activity_name = value.clone(),
                "Issue Key" => record.issue_key = value.clone(),
                "Issue summary" => record.issue_summary = value.clone(),
                "Issue Status" => record.issue_status = value.clone(),
                "Hours" => record.hours = value.clone(),
                "Work date" => record.work_date = value.clone(),
                "Epic" | "Epic Link" => record.epic = value.clone(),
                "Work Description" | "work description" => {
                    record.work_description = value.clone()
                }
                "Servis" => record.servis = value.clone(),
                "Team" => record.team = value.clone(),
                "Project" => record.project = value.clone(),
                "_overrides" => {}
                _ => {
                    record.extra.insert(header.clone(), value.clone());
                }
            }
        }
        record
    }

    /// Look a field up by its export header name (the inverse of
    /// `from_fields`), used when writing CSV back out in the original
    /// column order.
    pub fn field(&self, header: &str) -> Option<&str> {
        let value = match header {
            "Full name" => &self.full_name,
            "Project Key" => &self.project_key,
            "Activity Name" => &self.activity_name,
            "Issue Key" => &self.issue_key,
            "Issue summary" => &self.issue_summary,
            "Issue Status" => &self.issue_status,
            "Hours" => &self.hours,
            "Work date" => &self.work_date,
            "Epic" | "Epic Link" => &self.epic,
            "Work Description" | "work description" => &self.work_description,
            "Servis" => &self.servis,
            "Team" => &self.team,
            "Project" => &self.project,
            other => return self.extra.get(other).map(String::as_str),
        };
        Some(value)
    }

    /// Hours normalized to a non-negative float. Unparseable or negative
    /// values degrade to 0 rather than failing the pipeline.
    pub fn parsed_hours(&self) -> f64 {
        self.hours
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|h| h.is_finite() && *h >= 0.0)
            .unwrap_or(0.0)
    }

    /// Date-only part of the work date (text before the first space).
    pub fn work_date_day(&self) -> &str {
        self.work_date
            .split(' ')
            .next()
            .unwrap_or(self.work_date.as_str())
    }

    /// Weak identity used to find the original of a filtered copy. Distinct
    /// rows sharing all three fields coalesce under this key; that is a
    /// known limitation carried over from the source data model.
    pub fn same_identity(&self, other: &TimesheetRecord) -> bool {
        self.full_name == other.full_name
            && self.issue_key == other.issue_key
            && self.work_date == other.work_date
    }
}

/// One rejected CSV row with enough context to debug the source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based physical line where the logical row started.
    pub line_number: usize,
    /// Raw text, truncated to 100 characters.
    pub raw_line: String,
    /// First 5 parsed values (with a "..." marker when truncated).
    pub parsed_values: Vec<String>,
    pub expected_columns: usize,
    pub actual_columns: usize,
    pub reason: String,
}

/// Outcome of a CSV parse, returned alongside the accepted records so the
/// caller can decide whether to commit a partial import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub total_lines: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub headers: Vec<String>,
    pub skipped_rows: Vec<SkippedRow>,
}

/// The imported record set plus the header order it arrived with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub records: Vec<TimesheetRecord>,
    #[serde(default)]
    pub validation: ValidationReport,
}

impl Dataset {
    /// Weak-key lookup of the original index for a (possibly cloned)
    /// filtered record.
    pub fn find_matching_index(&self, record: &TimesheetRecord) -> Option<usize> {
        self.records.iter().position(|r| r.same_identity(record))
    }
}

/// Summary line shown above the filtered table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStats {
    pub records: usize,
    pub total_hours: f64,
    pub unique_people: usize,
    pub unique_issues: usize,
}
