//! Free-text filtering of flags.
//!
//! A flag matches when its name, or the project name of any of its
//! definitions, contains the query case-insensitively. The list page runs
//! the same predicate in the browser on every keystroke.

use crate::flag::FlagRecord;

/// Return the flags matching `query`, in input order.
///
/// An empty query matches every flag.
#[must_use]
pub fn filter_flags<'a>(flags: &'a [FlagRecord], query: &str) -> Vec<&'a FlagRecord> {
    let needle = query.to_lowercase();
    flags
        .iter()
        .filter(|flag| matches_lowercase(flag, &needle))
        .collect()
}

/// Check whether a single flag matches `query`.
#[must_use]
pub fn matches(flag: &FlagRecord, query: &str) -> bool {
    matches_lowercase(flag, &query.to_lowercase())
}

fn matches_lowercase(flag: &FlagRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    flag.name.to_lowercase().contains(needle)
        || flag
            .definitions
            .iter()
            .any(|def| def.project_name.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::Definition;

    fn flags() -> Vec<FlagRecord> {
        vec![
            FlagRecord::new("abc").with_definition(Definition::new("Billing", "a.cs")),
            FlagRecord::new("DarkMode").with_definition(Definition::new("Shop.Web", "b.cs")),
            FlagRecord::new("NewSearch")
                .with_definition(Definition::new("Catalog", "c.cs"))
                .with_definition(Definition::new("Shop.Api", "d.cs")),
            FlagRecord::new("Orphan"),
        ]
    }

    fn names<'a>(flags: &[&'a FlagRecord]) -> Vec<&'a str> {
        flags.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_empty_query_returns_everything_in_order() {
        let all = flags();
        let filtered = filter_flags(&all, "");
        assert_eq!(
            names(&filtered),
            vec!["abc", "DarkMode", "NewSearch", "Orphan"]
        );
    }

    #[test]
    fn test_case_insensitive_name_match() {
        let all = flags();
        assert_eq!(names(&filter_flags(&all, "AB")), vec!["abc"]);
        assert_eq!(names(&filter_flags(&all, "darkmode")), vec!["DarkMode"]);
    }

    #[test]
    fn test_matches_any_definition_project() {
        let all = flags();
        assert_eq!(names(&filter_flags(&all, "shop")), vec!["DarkMode", "NewSearch"]);
        assert_eq!(names(&filter_flags(&all, "API")), vec!["NewSearch"]);
    }

    #[test]
    fn test_no_match() {
        let all = flags();
        assert!(filter_flags(&all, "zzz").is_empty());
    }

    #[test]
    fn test_flag_without_definitions_matches_only_by_name() {
        let all = flags();
        assert_eq!(names(&filter_flags(&all, "orph")), vec!["Orphan"]);
    }

    #[test]
    fn test_substring_not_fuzzy() {
        let all = flags();
        assert!(filter_flags(&all, "dkmd").is_empty());
    }

    #[test]
    fn test_matches_single_flag() {
        let flag = FlagRecord::new("EnableCheckout")
            .with_definition(Definition::new("Shop.Web", "a.cs"));
        assert!(matches(&flag, "CHECKOUT"));
        assert!(matches(&flag, "web"));
        assert!(matches(&flag, ""));
        assert!(!matches(&flag, "billing"));
    }

    #[test]
    fn test_non_ascii_case_folding() {
        let flag = FlagRecord::new("ÜberFlag");
        assert!(matches(&flag, "über"));
    }
}
