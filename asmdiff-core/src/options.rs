//! Options controlling a comparison run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How types are paired across snapshots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKey {
    /// Simple name only; a namespace move is not a change.
    #[default]
    Name,
    /// Namespace-qualified name; a namespace move is removal plus creation.
    FullName,
}

impl TypeKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKey::Name => "name",
            TypeKey::FullName => "full_name",
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "name" => Ok(TypeKey::Name),
            "full_name" | "fullname" => Ok(TypeKey::FullName),
            _ => Err(format!(
                "Unknown type key: '{}'. Valid options: name, full-name",
                s
            )),
        }
    }
}

/// Comparison options. Every field has a default so partial config
/// sections deserialize.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Compare compiler-generated fields, methods and properties too.
    pub include_generated: bool,
    /// Report signature changes of properties that keep their identity,
    /// and compare property attributes.
    pub property_modifications: bool,
    /// Compare common type pairs on the rayon pool.
    pub parallel: bool,
    pub type_key: TypeKey,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            include_generated: false,
            property_modifications: true,
            parallel: true,
            type_key: TypeKey::Name,
        }
    }
}

impl DiffOptions {
    pub fn with_include_generated(mut self, include: bool) -> Self {
        self.include_generated = include;
        self
    }

    pub fn with_property_modifications(mut self, enabled: bool) -> Self {
        self.property_modifications = enabled;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_type_key(mut self, key: TypeKey) -> Self {
        self.type_key = key;
        self
    }
}
