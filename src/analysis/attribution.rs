use crate::models::record::TimesheetRecord;
use crate::models::registry::MappingRegistry;

/// Resolved (team, project) pair for one record. `None` means unassigned;
/// report classification maps that to the `"Unassigned"` category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attribution {
    pub team: Option<String>,
    pub project: Option<String>,
}

/// Find the registered person whose key the full name contains, scanning in
/// registry insertion order. First match wins: a short name registered
/// early shadows a longer one added later (see DESIGN.md).
pub fn find_person<'a>(full_name: &str, registry: &'a MappingRegistry) -> Option<&'a str> {
    if full_name.is_empty() {
        return None;
    }
    registry
        .people
        .iter()
        .find(|person| full_name.contains(&person.name))
        .map(|person| person.name.as_str())
}

/// Display-only short name: text before the first `-`, trimmed. Never used
/// for matching.
pub fn short_display_name(full_name: &str) -> &str {
    full_name.split('-').next().unwrap_or(full_name).trim()
}

/// Resolve team and project for a record, each independently, through the
/// precedence chain: override, then the record's own CSV column, then the
/// matched person's attribute.
pub fn resolve_attribution(record: &TimesheetRecord, registry: &MappingRegistry) -> Attribution {
    let person = find_person(&record.full_name, registry).and_then(|name| registry.person(name));

    let team = record
        .overrides
        .team
        .clone()
        .filter(|t| !t.is_empty())
        .or_else(|| Some(record.team.clone()).filter(|t| !t.is_empty()))
        .or_else(|| person.and_then(|entry| entry.team.clone()));

    let project = record
        .overrides
        .project
        .clone()
        .filter(|p| !p.is_empty())
        .or_else(|| Some(record.project.clone()).filter(|p| !p.is_empty()))
        .or_else(|| person.and_then(|entry| entry.project.clone()));

    Attribution { team, project }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::registry::PersonEntry;

    fn registry() -> MappingRegistry {
        let mut registry = MappingRegistry::default();
        registry
            .add_person(
                "Jane",
                PersonEntry {
                    team: Some("Z".to_string()),
                    project: Some("Zeus".to_string()),
                    role: Some("Dev".to_string()),
                },
            )
            .expect("add person");
        registry
    }

    fn record() -> TimesheetRecord {
        TimesheetRecord {
            full_name: "Jane Doe - Contractor".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn override_outranks_csv_column_and_person_entry() {
        let registry = registry();
        let mut record = record();
        record.team = "Y".to_string();
        record.overrides.team = Some("X".to_string());

        assert_eq!(
            resolve_attribution(&record, &registry).team.as_deref(),
            Some("X")
        );

        record.overrides.team = None;
        assert_eq!(
            resolve_attribution(&record, &registry).team.as_deref(),
            Some("Y")
        );

        record.team.clear();
        assert_eq!(
            resolve_attribution(&record, &registry).team.as_deref(),
            Some("Z")
        );
    }

    #[test]
    fn unmatched_record_resolves_to_none() {
        let registry = registry();
        let record = TimesheetRecord {
            full_name: "Nobody".to_string(),
            ..Default::default()
        };
        assert_eq!(resolve_attribution(&record, &registry), Attribution::default());
    }

    #[test]
    fn first_registered_substring_match_wins() {
        let mut registry = MappingRegistry::default();
        registry
            .add_person("Ali", PersonEntry::default())
            .expect("add");
        registry
            .add_person("Alice", PersonEntry::default())
            .expect("add");

        // "Ali" was registered first and is a substring of the full name,
        // so it shadows the exact "Alice" entry.
        assert_eq!(find_person("Alice Smith", &registry), Some("Ali"));
    }

    #[test]
    fn short_display_name_takes_text_before_dash() {
        assert_eq!(short_display_name("Jane Doe - Contractor"), "Jane Doe");
        assert_eq!(short_display_name("Jane Doe"), "Jane Doe");
    }
}
