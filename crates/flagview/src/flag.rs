//! Feature flag records as produced by the flag extractor.
//!
//! The extractor writes PascalCase JSON; these types mirror that layout so a
//! document decodes directly into `Vec<FlagRecord>`. Only `Name` is required.
//! Everything else falls back to an empty value, whether absent or `null`,
//! so that partially filled records still load.

use serde::{Deserialize, Deserializer, Serialize};

/// One named feature flag and every place it is defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FlagRecord {
    /// Flag identifier, unique once records are merged.
    pub name: String,

    /// Definitions in file read order, then merge order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub definitions: Vec<Definition>,
}

/// A source location where a flag is defined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Definition {
    /// Project the definition belongs to; the grouping key.
    #[serde(deserialize_with = "null_as_default")]
    pub project_name: String,

    /// File containing the definition.
    #[serde(deserialize_with = "null_as_default")]
    pub location: Location,

    /// The enclosing method or function.
    #[serde(deserialize_with = "null_as_default")]
    pub method: MethodInfo,

    /// Places where the flag is read.
    #[serde(deserialize_with = "null_as_default")]
    pub references: Vec<Reference>,
}

/// The method or function enclosing a definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MethodInfo {
    /// Method name.
    #[serde(deserialize_with = "null_as_default")]
    pub method_name: String,

    /// File containing the method.
    #[serde(deserialize_with = "null_as_default")]
    pub location: Location,

    /// Source excerpt of the method body.
    #[serde(deserialize_with = "null_as_default")]
    pub preview: String,
}

/// A source location where a flag is read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Reference {
    /// Bare file name of the referencing file.
    #[serde(deserialize_with = "null_as_default")]
    pub file_name: String,

    /// Full location of the reference.
    #[serde(deserialize_with = "null_as_default")]
    pub location: Location,

    /// Source excerpt around the reference, possibly empty.
    #[serde(deserialize_with = "null_as_default")]
    pub preview: String,
}

/// An opaque file path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Location {
    /// Path as written by the extractor.
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
}

/// Decode an explicit `null` as the type's empty value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl FlagRecord {
    /// Create a flag with no definitions.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definitions: Vec::new(),
        }
    }

    /// Builder-style helper that appends a definition.
    #[must_use]
    pub fn with_definition(mut self, definition: Definition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Total number of references across all definitions.
    #[must_use]
    pub fn reference_count(&self) -> usize {
        self.definitions.iter().map(|d| d.references.len()).sum()
    }

    /// Project names in definition order, without repeats.
    #[must_use]
    pub fn project_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for def in &self.definitions {
            if !names.contains(&def.project_name.as_str()) {
                names.push(&def.project_name);
            }
        }
        names
    }
}

impl Definition {
    /// Create a definition in the given project at the given path.
    #[must_use]
    pub fn new(project_name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            location: Location::new(path),
            ..Self::default()
        }
    }

    /// Builder-style helper that sets the enclosing method.
    #[must_use]
    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.method = method;
        self
    }

    /// Builder-style helper that appends a reference.
    #[must_use]
    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.references.push(reference);
        self
    }
}

impl MethodInfo {
    /// Create method info.
    #[must_use]
    pub fn new(
        method_name: impl Into<String>,
        path: impl Into<String>,
        preview: impl Into<String>,
    ) -> Self {
        Self {
            method_name: method_name.into(),
            location: Location::new(path),
            preview: preview.into(),
        }
    }
}

impl Reference {
    /// Create a reference.
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        path: impl Into<String>,
        preview: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            location: Location::new(path),
            preview: preview.into(),
        }
    }
}

impl Location {
    /// Create a location from a path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}
