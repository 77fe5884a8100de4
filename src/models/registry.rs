use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Attributes attached to a registered person. Any of them may be unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonEntry {
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// One named person. Stored in a Vec so registry iteration order is the
/// insertion order; name resolution is first-match and therefore order
/// sensitive (an early short name can shadow a longer one added later).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    #[serde(flatten)]
    pub entry: PersonEntry,
}

/// Projects, teams, roles and people, owned as one unit because renames and
/// deletes cascade between the catalogs and the person entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingRegistry {
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub people: Vec<Person>,
}

/// Which catalog an administrative operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Project,
    Team,
    Role,
}

impl MappingRegistry {
    fn catalog_mut(&mut self, kind: CatalogKind) -> &mut Vec<String> {
        match kind {
            CatalogKind::Project => &mut self.projects,
            CatalogKind::Team => &mut self.teams,
            CatalogKind::Role => &mut self.roles,
        }
    }

    pub fn catalog(&self, kind: CatalogKind) -> &[String] {
        match kind {
            CatalogKind::Project => &self.projects,
            CatalogKind::Team => &self.teams,
            CatalogKind::Role => &self.roles,
        }
    }

    pub fn add_catalog_entry(&mut self, kind: CatalogKind, name: &str) -> Result<(), String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        let catalog = self.catalog_mut(kind);
        if catalog.iter().any(|existing| existing == name) {
            return Err(format!("{name} already exists"));
        }
        catalog.push(name.to_string());
        catalog.sort();
        Ok(())
    }

    /// Rename a catalog entry and cascade the new name into every person
    /// referencing the old one. Record overrides keep their literal value.
    pub fn rename_catalog_entry(
        &mut self,
        kind: CatalogKind,
        from: &str,
        to: &str,
    ) -> Result<(), String> {
        let to = to.trim();
        if to.is_empty() {
            return Err("Name is required".to_string());
        }
        let catalog = self.catalog_mut(kind);
        let index = catalog
            .iter()
            .position(|existing| existing == from)
            .ok_or_else(|| format!("{from} not found"))?;
        catalog[index] = to.to_string();
        catalog.sort();

        for person in &mut self.people {
            let slot = match kind {
                CatalogKind::Project => &mut person.entry.project,
                CatalogKind::Team => &mut person.entry.team,
                CatalogKind::Role => &mut person.entry.role,
            };
            if slot.as_deref() == Some(from) {
                *slot = Some(to.to_string());
            }
        }
        Ok(())
    }

    /// Delete a catalog entry and null the attribute out on every person
    /// that referenced it.
    pub fn delete_catalog_entry(&mut self, kind: CatalogKind, name: &str) {
        self.catalog_mut(kind).retain(|existing| existing != name);
        for person in &mut self.people {
            let slot = match kind {
                CatalogKind::Project => &mut person.entry.project,
                CatalogKind::Team => &mut person.entry.team,
                CatalogKind::Role => &mut person.entry.role,
            };
            if slot.as_deref() == Some(name) {
                *slot = None;
            }
        }
    }

    pub fn person(&self, name: &str) -> Option<&PersonEntry> {
        self.people
            .iter()
            .find(|person| person.name == name)
            .map(|person| &person.entry)
    }

    pub fn add_person(&mut self, name: &str, entry: PersonEntry) -> Result<(), String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        if self.person(name).is_some() {
            return Err("Person already exists".to_string());
        }
        self.people.push(Person {
            name: name.to_string(),
            entry,
        });
        Ok(())
    }

    /// Upsert keeping the person's position in the resolution order.
    pub fn update_person(&mut self, name: &str, entry: PersonEntry) {
        match self.people.iter_mut().find(|person| person.name == name) {
            Some(person) => person.entry = entry,
            None => self.people.push(Person {
                name: name.to_string(),
                entry,
            }),
        }
    }

    pub fn delete_person(&mut self, name: &str) {
        self.people.retain(|person| person.name != name);
    }

    /// Administrative JSON interchange:
    /// `{projects, teams, roles, people: {name: {team, project, role}}}`.
    /// The `people` object keeps registration order (serde_json's
    /// `preserve_order` feature); alphabetizing it would change first-match
    /// name resolution after a round trip.
    pub fn to_interchange(&self) -> Value {
        let mut people = Map::new();
        for person in &self.people {
            people.insert(
                person.name.clone(),
                json!({
                    "team": person.entry.team,
                    "project": person.entry.project,
                    "role": person.entry.role,
                }),
            );
        }
        json!({
            "projects": self.projects,
            "teams": self.teams,
            "roles": self.roles,
            "people": people,
        })
    }

    pub fn from_interchange(value: &Value) -> MappingRegistry {
        let strings = |key: &str| -> Vec<String> {
            value
                .get(key)
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        };

        let mut people = Vec::new();
        if let Some(map) = value.get("people").and_then(Value::as_object) {
            for (name, attrs) in map {
                let pick = |key: &str| -> Option<String> {
                    attrs
                        .get(key)
                        .and_then(Value::as_str)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                };
                people.push(Person {
                    name: name.clone(),
                    entry: PersonEntry {
                        team: pick("team"),
                        project: pick("project"),
                        role: pick("role"),
                    },
                });
            }
        }

        MappingRegistry {
            projects: strings("projects"),
            teams: strings("teams"),
            roles: strings("roles"),
            people,
        }
    }
}

/// Service code → human display label. Kept separate from the mapping
/// registry; deleting a label never touches records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServisMapping {
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl ServisMapping {
    /// `"<code> - <label>"` when a label exists, else the raw code.
    pub fn display_name(&self, code: &str) -> String {
        match self.labels.get(code) {
            Some(label) => format!("{code} - {label}"),
            None => code.to_string(),
        }
    }

    /// Blank labels clear the mapping instead of storing an empty string.
    pub fn set_label(&mut self, code: &str, label: &str) {
        let label = label.trim();
        if label.is_empty() {
            self.labels.remove(code);
        } else {
            self.labels.insert(code.to_string(), label.to_string());
        }
    }

    pub fn clear_label(&mut self, code: &str) {
        self.labels.remove(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_person(team: Option<&str>) -> MappingRegistry {
        let mut registry = MappingRegistry::default();
        registry.teams = vec!["Platform".to_string()];
        registry
            .add_person(
                "Jane",
                PersonEntry {
                    team: team.map(str::to_string),
                    ..Default::default()
                },
            )
            .expect("add person");
        registry
    }

    #[test]
    fn delete_cascades_to_person_entries() {
        let mut registry = registry_with_person(Some("Platform"));
        registry.delete_catalog_entry(CatalogKind::Team, "Platform");
        assert!(registry.teams.is_empty());
        assert_eq!(registry.person("Jane").unwrap().team, None);
    }

    #[test]
    fn rename_cascades_to_person_entries() {
        let mut registry = registry_with_person(Some("Platform"));
        registry
            .rename_catalog_entry(CatalogKind::Team, "Platform", "Core Platform")
            .expect("rename");
        assert_eq!(registry.teams, vec!["Core Platform".to_string()]);
        assert_eq!(
            registry.person("Jane").unwrap().team.as_deref(),
            Some("Core Platform")
        );
    }

    #[test]
    fn add_rejects_duplicates_and_keeps_catalog_sorted() {
        let mut registry = MappingRegistry::default();
        registry
            .add_catalog_entry(CatalogKind::Project, "Zeta")
            .expect("add");
        registry
            .add_catalog_entry(CatalogKind::Project, "Alpha")
            .expect("add");
        assert!(registry.add_catalog_entry(CatalogKind::Project, "Alpha").is_err());
        assert_eq!(registry.projects, vec!["Alpha".to_string(), "Zeta".to_string()]);
    }

    #[test]
    fn interchange_round_trips_people_attributes() {
        let registry = registry_with_person(Some("Platform"));
        let exported = registry.to_interchange();
        let imported = MappingRegistry::from_interchange(&exported);
        assert_eq!(imported.person("Jane").unwrap().team.as_deref(), Some("Platform"));
        assert_eq!(imported.teams, registry.teams);
    }

    #[test]
    fn interchange_round_trip_keeps_registration_order() {
        let mut registry = MappingRegistry::default();
        registry.add_person("Zoe", PersonEntry::default()).expect("add");
        registry.add_person("Zo", PersonEntry::default()).expect("add");

        let imported = MappingRegistry::from_interchange(&registry.to_interchange());
        let names: Vec<&str> = imported.people.iter().map(|p| p.name.as_str()).collect();

        // Alphabetizing would put "Zo" first and steal Zoe's substring
        // matches from her own entry.
        assert_eq!(names, vec!["Zoe", "Zo"]);
        assert_eq!(
            crate::analysis::attribution::find_person("Zoe Smith", &imported),
            Some("Zoe")
        );
    }

    #[test]
    fn servis_display_name_includes_label_when_mapped() {
        let mut servis = ServisMapping::default();
        servis.set_label("5215", "General Efforts");
        assert_eq!(servis.display_name("5215"), "5215 - General Efforts");
        assert_eq!(servis.display_name("9999"), "9999");
        servis.set_label("5215", "  ");
        assert_eq!(servis.display_name("5215"), "5215");
    }
}
