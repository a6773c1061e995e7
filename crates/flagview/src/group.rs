//! Partitioning of a flag's definitions by project.

use serde::Serialize;

use crate::flag::{Definition, FlagRecord, Reference};

/// Definitions and references of one flag within a single project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectGroup {
    /// The grouping key, used verbatim (may be empty).
    pub project_name: String,
    /// Definitions in this project, in flag order.
    pub definitions: Vec<Definition>,
    /// References of those definitions, concatenated in definition order.
    pub references: Vec<Reference>,
}

/// Project groups of one flag, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProjectGroups {
    groups: Vec<ProjectGroup>,
}

impl ProjectGroups {
    /// Number of distinct projects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True if the flag had no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group for the given project, if any.
    #[must_use]
    pub fn get(&self, project_name: &str) -> Option<&ProjectGroup> {
        self.groups.iter().find(|g| g.project_name == project_name)
    }

    /// Iterate over groups in first-seen order.
    pub fn iter(&self) -> std::slice::Iter<'_, ProjectGroup> {
        self.groups.iter()
    }

    /// Total definitions across all groups.
    #[must_use]
    pub fn definition_count(&self) -> usize {
        self.groups.iter().map(|g| g.definitions.len()).sum()
    }

    /// Total references across all groups.
    #[must_use]
    pub fn reference_count(&self) -> usize {
        self.groups.iter().map(|g| g.references.len()).sum()
    }
}

impl<'a> IntoIterator for &'a ProjectGroups {
    type Item = &'a ProjectGroup;
    type IntoIter = std::slice::Iter<'a, ProjectGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Group a flag's definitions by project name.
///
/// Every definition lands in exactly one group. There is no fallback bucket:
/// an empty project name is a key like any other.
#[must_use]
pub fn group_by_project(flag: &FlagRecord) -> ProjectGroups {
    let mut groups: Vec<ProjectGroup> = Vec::new();

    for def in &flag.definitions {
        let slot = match groups
            .iter()
            .position(|g| g.project_name == def.project_name)
        {
            Some(slot) => slot,
            None => {
                groups.push(ProjectGroup {
                    project_name: def.project_name.clone(),
                    definitions: Vec::new(),
                    references: Vec::new(),
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[slot];
        group.references.extend(def.references.iter().cloned());
        group.definitions.push(def.clone());
    }

    ProjectGroups { groups }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(project: &str, refs: &[&str]) -> Definition {
        refs.iter().fold(
            Definition::new(project, format!("{project}/Flags.cs")),
            |d, file| d.with_reference(Reference::new(*file, format!("{project}/{file}"), "")),
        )
    }

    #[test]
    fn test_two_projects_two_groups() {
        let flag = FlagRecord::new("X")
            .with_definition(def("P1", &[]))
            .with_definition(def("P2", &[]));

        let groups = group_by_project(&flag);

        assert_eq!(groups.len(), 2);
        assert!(groups.get("P1").is_some());
        assert!(groups.get("P2").is_some());
    }

    #[test]
    fn test_grouping_is_a_partition() {
        let flag = FlagRecord::new("X")
            .with_definition(def("P1", &["a.cs"]))
            .with_definition(def("P2", &["b.cs", "c.cs"]))
            .with_definition(def("P1", &["d.cs"]))
            .with_definition(def("P3", &[]));

        let groups = group_by_project(&flag);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups.definition_count(), flag.definitions.len());
        assert_eq!(groups.reference_count(), flag.reference_count());
    }

    #[test]
    fn test_references_follow_definition_order() {
        let flag = FlagRecord::new("X")
            .with_definition(def("P1", &["a.cs", "b.cs"]))
            .with_definition(def("P2", &["x.cs"]))
            .with_definition(def("P1", &["c.cs"]));

        let groups = group_by_project(&flag);
        let p1 = groups.get("P1").unwrap();

        let files: Vec<_> = p1.references.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(files, vec!["a.cs", "b.cs", "c.cs"]);
        assert_eq!(p1.definitions.len(), 2);
        assert_eq!(p1.definitions[0].references.len(), 2);
        assert_eq!(p1.definitions[1].references.len(), 1);
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let flag = FlagRecord::new("X")
            .with_definition(def("Zeta", &[]))
            .with_definition(def("Alpha", &[]))
            .with_definition(def("Zeta", &[]));

        let names: Vec<_> = group_by_project(&flag)
            .iter()
            .map(|g| g.project_name.clone())
            .collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_empty_project_name_is_its_own_group() {
        let flag = FlagRecord::new("X")
            .with_definition(def("", &["a.cs"]))
            .with_definition(def("P1", &[]))
            .with_definition(def("", &[]));

        let groups = group_by_project(&flag);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups.get("").unwrap().definitions.len(), 2);
    }

    #[test]
    fn test_flag_without_definitions() {
        let groups = group_by_project(&FlagRecord::new("X"));

        assert!(groups.is_empty());
        assert_eq!(groups.reference_count(), 0);
    }

    #[test]
    fn test_serializes_as_ordered_list() {
        let flag = FlagRecord::new("X")
            .with_definition(def("P2", &["a.cs"]))
            .with_definition(def("P1", &[]));

        let json = serde_json::to_value(group_by_project(&flag)).unwrap();

        assert_eq!(json[0]["ProjectName"], "P2");
        assert_eq!(json[0]["References"][0]["FileName"], "a.cs");
        assert_eq!(json[1]["ProjectName"], "P1");
    }

    #[test]
    fn test_into_iterator() {
        let flag = FlagRecord::new("X").with_definition(def("P1", &[]));
        let groups = group_by_project(&flag);

        let mut seen = 0;
        for group in &groups {
            assert_eq!(group.project_name, "P1");
            seen += 1;
        }
        assert_eq!(seen, 1);
    }
}
