//! Merging of flag records that share a name.
//!
//! The extractor writes one document per scanned codebase, so the same flag
//! shows up once per document it was found in. Merging folds those copies
//! into a single record.

use std::collections::HashMap;

use crate::flag::FlagRecord;

/// Combine records with the same name into one record per name.
///
/// The first record seen for a name seeds the result. Later records append
/// their definitions to it. Output order is first-seen order, and identical
/// definitions are kept as separate entries.
#[must_use]
pub fn merge_flags(records: Vec<FlagRecord>) -> Vec<FlagRecord> {
    let mut merged: Vec<FlagRecord> = Vec::with_capacity(records.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(records.len());

    for record in records {
        if let Some(&slot) = index.get(&record.name) {
            merged[slot].definitions.extend(record.definitions);
        } else {
            index.insert(record.name.clone(), merged.len());
            merged.push(record);
        }
    }

    merged
}

/// Look up a merged flag by exact name.
#[must_use]
pub fn find_flag<'a>(flags: &'a [FlagRecord], name: &str) -> Option<&'a FlagRecord> {
    flags.iter().find(|flag| flag.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::Definition;

    fn flag(name: &str, projects: &[&str]) -> FlagRecord {
        projects.iter().fold(FlagRecord::new(name), |flag, project| {
            flag.with_definition(Definition::new(*project, format!("{project}/Flags.cs")))
        })
    }

    fn total_definitions(flags: &[FlagRecord]) -> usize {
        flags.iter().map(|f| f.definitions.len()).sum()
    }

    #[test]
    fn test_merge_same_name_across_documents() {
        let doc1 = vec![flag("X", &["P1"])];
        let doc2 = vec![flag("X", &["P2"])];

        let merged = merge_flags(doc1.into_iter().chain(doc2).collect());

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "X");
        let projects: Vec<_> = merged[0]
            .definitions
            .iter()
            .map(|d| d.project_name.as_str())
            .collect();
        assert_eq!(projects, vec!["P1", "P2"]);
    }

    #[test]
    fn test_merge_one_record_per_name() {
        let input = vec![
            flag("A", &["P1"]),
            flag("B", &["P1"]),
            flag("A", &["P2"]),
            flag("C", &[]),
            flag("B", &["P3", "P4"]),
        ];

        let merged = merge_flags(input);

        let names: Vec<_> = merged.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_merge_preserves_definition_count() {
        let input = vec![
            flag("A", &["P1", "P2"]),
            flag("B", &["P1"]),
            flag("A", &["P3"]),
            flag("B", &[]),
            flag("A", &["P1"]),
        ];
        let before = total_definitions(&input);

        let merged = merge_flags(input);

        assert_eq!(total_definitions(&merged), before);
        assert_eq!(merged[0].definitions.len(), 4);
    }

    #[test]
    fn test_merge_keeps_identical_definitions() {
        let input = vec![flag("A", &["P1"]), flag("A", &["P1"])];

        let merged = merge_flags(input);

        assert_eq!(merged[0].definitions.len(), 2);
        assert_eq!(merged[0].definitions[0], merged[0].definitions[1]);
    }

    #[test]
    fn test_merge_is_case_sensitive_on_name() {
        let merged = merge_flags(vec![flag("Flag", &["P1"]), flag("flag", &["P1"])]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merge_empty_input() {
        assert!(merge_flags(Vec::new()).is_empty());
    }

    #[test]
    fn test_find_flag() {
        let merged = merge_flags(vec![flag("A", &["P1"]), flag("B", &["P2"])]);

        assert_eq!(find_flag(&merged, "B").map(|f| f.name.as_str()), Some("B"));
        assert!(find_flag(&merged, "b").is_none());
        assert!(find_flag(&merged, "Missing").is_none());
    }
}
