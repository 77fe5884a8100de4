use serde::{Deserialize, Serialize};

use crate::analysis::attribution;
use crate::models::record::TimesheetRecord;
use crate::models::registry::MappingRegistry;

/// One set-valued filter facet. An empty value set deactivates the facet;
/// `invert` flips membership into exclusion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValueFacet {
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub invert: bool,
}

impl ValueFacet {
    fn active(&self) -> bool {
        !self.values.is_empty()
    }

    /// `(value ∈ set) XOR invert` for an active facet.
    fn passes(&self, value: Option<&str>) -> bool {
        if !self.active() {
            return true;
        }
        let in_set = value.is_some_and(|v| self.values.iter().any(|item| item == v));
        in_set != self.invert
    }
}

/// Substring facet for the issue summary, case-insensitive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextFacet {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub invert: bool,
}

/// Multi-facet filter specification. All active facets AND together; every
/// field defaults so an empty JSON object is the pass-everything spec.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub project: ValueFacet,
    pub team: ValueFacet,
    pub role: ValueFacet,
    pub person: ValueFacet,
    pub activity: ValueFacet,
    pub status: ValueFacet,
    pub project_key: ValueFacet,
    pub servis: ValueFacet,
    pub issue_summary: TextFacet,
    /// Inclusive `YYYY-MM-DD` bounds. Zero-padded ISO dates compare
    /// correctly as strings.
    pub work_date_start: Option<String>,
    pub work_date_end: Option<String>,
}

impl FilterSpec {
    fn date_bounds_active(&self) -> bool {
        self.work_date_start.as_deref().is_some_and(|d| !d.is_empty())
            || self.work_date_end.as_deref().is_some_and(|d| !d.is_empty())
    }
}

/// Decide whether one record passes the spec.
pub fn matches(record: &TimesheetRecord, spec: &FilterSpec, registry: &MappingRegistry) -> bool {
    let person_key = attribution::find_person(&record.full_name, registry);
    let person = person_key.and_then(|name| registry.person(name));
    let resolved = attribution::resolve_attribution(record, registry);

    if !spec.project.passes(resolved.project.as_deref()) {
        return false;
    }
    if !spec.team.passes(resolved.team.as_deref()) {
        return false;
    }

    // Role and person facets only apply when a person was matched; an
    // unmatched record bypasses these two checks rather than being
    // excluded.
    if let Some(entry) = person {
        if !spec.role.passes(entry.role.as_deref()) {
            return false;
        }
        if !spec.person.passes(person_key) {
            return false;
        }
    }

    if !spec.activity.passes(non_empty(&record.activity_name)) {
        return false;
    }
    if !spec.status.passes(non_empty(&record.issue_status)) {
        return false;
    }
    if !spec.project_key.passes(non_empty(&record.project_key)) {
        return false;
    }
    if !spec.servis.passes(non_empty(&record.servis)) {
        return false;
    }

    if spec.date_bounds_active() {
        if record.work_date.is_empty() {
            return false;
        }
        let day = record.work_date_day();
        if let Some(start) = spec.work_date_start.as_deref().filter(|d| !d.is_empty()) {
            if day < start {
                return false;
            }
        }
        if let Some(end) = spec.work_date_end.as_deref().filter(|d| !d.is_empty()) {
            if day > end {
                return false;
            }
        }
    }

    if !spec.issue_summary.text.is_empty() {
        let summary = record.issue_summary.to_lowercase();
        let found = summary.contains(&spec.issue_summary.text.to_lowercase());
        if found == spec.issue_summary.invert {
            return false;
        }
    }

    true
}

/// Filter without mutating, preserving input order.
pub fn apply<'a>(
    records: &'a [TimesheetRecord],
    spec: &FilterSpec,
    registry: &MappingRegistry,
) -> Vec<&'a TimesheetRecord> {
    records
        .iter()
        .filter(|record| matches(record, spec, registry))
        .collect()
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::registry::PersonEntry;

    fn record(team: &str) -> TimesheetRecord {
        TimesheetRecord {
            team: team.to_string(),
            ..Default::default()
        }
    }

    fn team_spec(values: &[&str], invert: bool) -> FilterSpec {
        FilterSpec {
            team: ValueFacet {
                values: values.iter().map(|s| s.to_string()).collect(),
                invert,
            },
            ..Default::default()
        }
    }

    #[test]
    fn set_facet_selects_and_inverts() {
        let registry = MappingRegistry::default();
        let records = vec![record("A"), record("B"), record("C")];

        let keep: Vec<_> = apply(&records, &team_spec(&["A"], false), &registry)
            .iter()
            .map(|r| r.team.clone())
            .collect();
        assert_eq!(keep, vec!["A".to_string()]);

        let drop: Vec<_> = apply(&records, &team_spec(&["A"], true), &registry)
            .iter()
            .map(|r| r.team.clone())
            .collect();
        assert_eq!(drop, vec!["B".to_string(), "C".to_string()]);
    }

    #[test]
    fn empty_spec_passes_everything_in_order() {
        let registry = MappingRegistry::default();
        let records = vec![record("A"), record("B")];
        let filtered = apply(&records, &FilterSpec::default(), &registry);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].team, "A");
    }

    #[test]
    fn role_facet_bypasses_unmatched_records() {
        let mut registry = MappingRegistry::default();
        registry
            .add_person(
                "Jane",
                PersonEntry {
                    role: Some("Dev".to_string()),
                    ..Default::default()
                },
            )
            .expect("add person");

        let spec = FilterSpec {
            role: ValueFacet {
                values: vec!["QA".to_string()],
                invert: false,
            },
            ..Default::default()
        };

        let matched = TimesheetRecord {
            full_name: "Jane Doe".to_string(),
            ..Default::default()
        };
        let unmatched = TimesheetRecord {
            full_name: "Stranger".to_string(),
            ..Default::default()
        };

        // Jane has a role and it is not QA, so she is excluded. The stranger has no
        // registry match, so the role facet does not apply.
        assert!(!matches(&matched, &spec, &registry));
        assert!(matches(&unmatched, &spec, &registry));
    }

    #[test]
    fn date_bounds_are_inclusive_and_exclude_dateless_records() {
        let registry = MappingRegistry::default();
        let spec = FilterSpec {
            work_date_start: Some("2024-01-02".to_string()),
            work_date_end: Some("2024-01-03".to_string()),
            ..Default::default()
        };

        let mut inside = TimesheetRecord::default();
        inside.work_date = "2024-01-02 10:00:00".to_string();
        let mut outside = TimesheetRecord::default();
        outside.work_date = "2024-01-04".to_string();
        let dateless = TimesheetRecord::default();

        assert!(matches(&inside, &spec, &registry));
        assert!(!matches(&outside, &spec, &registry));
        assert!(!matches(&dateless, &spec, &registry));
    }

    #[test]
    fn summary_facet_is_case_insensitive_and_invertible() {
        let registry = MappingRegistry::default();
        let mut record = TimesheetRecord::default();
        record.issue_summary = "Fix Login Bug".to_string();

        let mut spec = FilterSpec::default();
        spec.issue_summary.text = "login".to_string();
        assert!(matches(&record, &spec, &registry));

        spec.issue_summary.invert = true;
        assert!(!matches(&record, &spec, &registry));
    }
}
