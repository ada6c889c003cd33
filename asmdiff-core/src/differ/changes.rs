//! Difference records and result structures for structural diff.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{
    AssemblyReference, Attribute, AttributeArgument, FieldDecl, MethodDecl, PropertyDecl,
    TypeDecl,
};

/// Kind of change detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceKind {
    Created,
    Removed,
    Modified,
}

impl DifferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifferenceKind::Created => "created",
            DifferenceKind::Removed => "removed",
            DifferenceKind::Modified => "modified",
        }
    }
}

impl fmt::Display for DifferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of entity a difference is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    AssemblyName,
    RuntimeVersion,
    AssemblyReference,
    Type,
    Field,
    Property,
    Method,
    Attribute,
    AttributeValue,
}

impl Subject {
    pub const ALL: [Subject; 9] = [
        Subject::AssemblyName,
        Subject::RuntimeVersion,
        Subject::AssemblyReference,
        Subject::Type,
        Subject::Field,
        Subject::Property,
        Subject::Method,
        Subject::Attribute,
        Subject::AttributeValue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::AssemblyName => "assembly_name",
            Subject::RuntimeVersion => "runtime_version",
            Subject::AssemblyReference => "assembly_reference",
            Subject::Type => "type",
            Subject::Field => "field",
            Subject::Property => "property",
            Subject::Method => "method",
            Subject::Attribute => "attribute",
            Subject::AttributeValue => "attribute_value",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "reference" => return Ok(Subject::AssemblyReference),
            "value" => return Ok(Subject::AttributeValue),
            _ => {}
        }
        Subject::ALL
            .into_iter()
            .find(|subject| subject.as_str() == normalized)
            .ok_or_else(|| {
                let valid: Vec<&str> = Subject::ALL.iter().map(|s| s.as_str()).collect();
                format!("Unknown subject: '{}'. Valid options: {}", s, valid.join(", "))
            })
    }
}

/// The predicate that produced a modified record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Name,
    Version,
    Signature,
    Static,
    Visibility,
    ReadOnly,
    FieldType,
    Abstract,
    Final,
    Virtual,
    ParameterCount,
    GenericParameterCount,
    Body,
    Value,
}

impl Facet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Name => "name",
            Facet::Version => "version",
            Facet::Signature => "signature",
            Facet::Static => "static",
            Facet::Visibility => "visibility",
            Facet::ReadOnly => "read_only",
            Facet::FieldType => "field_type",
            Facet::Abstract => "abstract",
            Facet::Final => "final",
            Facet::Virtual => "virtual",
            Facet::ParameterCount => "parameter_count",
            Facet::GenericParameterCount => "generic_parameter_count",
            Facet::Body => "body",
            Facet::Value => "value",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot entity a difference was computed from, for programmatic
/// consumers that need more than the rendered values.
#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    Module { name: String, runtime_version: String },
    Reference(AssemblyReference),
    Type(TypeDecl),
    Field(FieldDecl),
    Method(MethodDecl),
    Property(PropertyDecl),
    Attribute(Attribute),
    Argument(AttributeArgument),
}

/// A single structural change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Difference {
    pub kind: DifferenceKind,

    pub subject: Subject,

    /// Which predicate fired, for modified records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet: Option<Facet>,

    /// Containing entity path (`Bar`, `Bar.Num`, `Bar.Num[Obsolete]`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Rendered old side; absent for created records
    pub old_value: Option<String>,

    /// Rendered new side; absent for removed records
    pub new_value: Option<String>,

    #[serde(skip)]
    pub old_entity: Option<Entity>,

    #[serde(skip)]
    pub new_entity: Option<Entity>,
}

impl Difference {
    fn new(kind: DifferenceKind, subject: Subject) -> Self {
        Self {
            kind,
            subject,
            facet: None,
            parent: None,
            old_value: None,
            new_value: None,
            old_entity: None,
            new_entity: None,
        }
    }

    pub fn created(subject: Subject, value: String) -> Self {
        Self {
            new_value: Some(value),
            ..Self::new(DifferenceKind::Created, subject)
        }
    }

    pub fn removed(subject: Subject, value: String) -> Self {
        Self {
            old_value: Some(value),
            ..Self::new(DifferenceKind::Removed, subject)
        }
    }

    pub fn modified(subject: Subject, facet: Facet, old: String, new: String) -> Self {
        Self {
            facet: Some(facet),
            old_value: Some(old),
            new_value: Some(new),
            ..Self::new(DifferenceKind::Modified, subject)
        }
    }

    /// Set parent path.
    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    /// Attach the entities the record was computed from.
    pub fn with_entities(mut self, old: Option<Entity>, new: Option<Entity>) -> Self {
        self.old_entity = old;
        self.new_entity = new;
        self
    }

    /// Whether consumers compiled against the old module may break.
    pub fn is_breaking(&self) -> bool {
        match self.kind {
            DifferenceKind::Created => false,
            DifferenceKind::Removed => self.subject != Subject::AttributeValue,
            DifferenceKind::Modified => match self.subject {
                Subject::Method => self.facet != Some(Facet::Body),
                Subject::Attribute | Subject::AttributeValue => false,
                _ => true,
            },
        }
    }

    /// The value that identifies the record in listings: the new side when
    /// present, else the old side.
    pub fn display_value(&self) -> &str {
        self.new_value
            .as_deref()
            .or(self.old_value.as_deref())
            .unwrap_or_default()
    }
}

/// Created/removed/modified counters for one subject group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCounts {
    pub created: u32,
    pub removed: u32,
    pub modified: u32,
}

impl ChangeCounts {
    fn record(&mut self, kind: DifferenceKind) {
        match kind {
            DifferenceKind::Created => self.created += 1,
            DifferenceKind::Removed => self.removed += 1,
            DifferenceKind::Modified => self.modified += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.created + self.removed + self.modified
    }

    fn text(&self, label: &str) -> Option<String> {
        if self.total() == 0 {
            return None;
        }
        let mut parts = Vec::new();
        if self.created > 0 {
            parts.push(format!("{} added", self.created));
        }
        if self.removed > 0 {
            parts.push(format!("{} removed", self.removed));
        }
        if self.modified > 0 {
            parts.push(format!("{} modified", self.modified));
        }
        Some(format!("{}: {}", label, parts.join(", ")))
    }
}

/// Summary statistics for a diff.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    /// Module name and runtime version
    pub assembly: ChangeCounts,
    pub references: ChangeCounts,
    pub types: ChangeCounts,
    pub fields: ChangeCounts,
    pub methods: ChangeCounts,
    pub properties: ChangeCounts,
    /// Attributes and their argument values
    pub attributes: ChangeCounts,
    pub breaking_changes: u32,
}

impl DiffSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment counter based on subject and kind.
    pub fn record(&mut self, subject: Subject, kind: DifferenceKind, is_breaking: bool) {
        let counts = match subject {
            Subject::AssemblyName | Subject::RuntimeVersion => &mut self.assembly,
            Subject::AssemblyReference => &mut self.references,
            Subject::Type => &mut self.types,
            Subject::Field => &mut self.fields,
            Subject::Method => &mut self.methods,
            Subject::Property => &mut self.properties,
            Subject::Attribute | Subject::AttributeValue => &mut self.attributes,
        };
        counts.record(kind);

        if is_breaking {
            self.breaking_changes += 1;
        }
    }

    /// Generate human-readable summary string.
    pub fn text(&self) -> String {
        let groups = [
            ("assembly", &self.assembly),
            ("references", &self.references),
            ("types", &self.types),
            ("fields", &self.fields),
            ("methods", &self.methods),
            ("properties", &self.properties),
            ("attributes", &self.attributes),
        ];

        let parts: Vec<String> = groups
            .iter()
            .filter_map(|(label, counts)| counts.text(label))
            .collect();

        if parts.is_empty() {
            "No changes".to_string()
        } else {
            parts.join("; ")
        }
    }
}

/// Complete result of a structural diff run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DiffResult {
    /// Name of the old module
    pub old_module: String,

    /// Name of the new module
    pub new_module: String,

    /// All differences, in comparison order
    pub differences: Vec<Difference>,

    /// Breaking differences only
    pub breaking_changes: Vec<Difference>,

    /// Summary statistics
    pub summary: DiffSummary,

    /// Human-readable summary text
    pub summary_text: String,

    /// Duration of diff operation in milliseconds
    pub duration_ms: f64,
}

impl DiffResult {
    pub fn new(old_module: &str, new_module: &str) -> Self {
        Self {
            old_module: old_module.to_string(),
            new_module: new_module.to_string(),
            ..Default::default()
        }
    }

    /// Add a difference and update summary.
    pub fn add_change(&mut self, difference: Difference) {
        let is_breaking = difference.is_breaking();
        self.summary
            .record(difference.subject, difference.kind, is_breaking);

        if is_breaking {
            self.breaking_changes.push(difference.clone());
        }

        self.differences.push(difference);
    }

    /// Finalize the result with timing and summary text.
    pub fn finalize(&mut self, duration_ms: f64) {
        self.duration_ms = duration_ms;
        self.summary_text = self.summary.text();
    }

    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.differences.is_empty()
    }

    /// Check if there are breaking changes.
    pub fn has_breaking_changes(&self) -> bool {
        !self.breaking_changes.is_empty()
    }

    /// Get change count.
    pub fn change_count(&self) -> usize {
        self.differences.len()
    }

    /// Filter differences by subject.
    pub fn filter_subject(&self, subject: Subject) -> Vec<Difference> {
        self.differences
            .iter()
            .filter(|d| d.subject == subject)
            .cloned()
            .collect()
    }

    /// Keep only differences whose subject is in `subjects`, and only
    /// breaking ones when `breaking_only` is set. Summary is recomputed.
    pub fn retain(&mut self, subjects: &[Subject], breaking_only: bool) {
        let differences = std::mem::take(&mut self.differences);
        self.breaking_changes.clear();
        self.summary = DiffSummary::new();

        for difference in differences {
            let subject_ok = subjects.is_empty() || subjects.contains(&difference.subject);
            if subject_ok && (!breaking_only || difference.is_breaking()) {
                self.add_change(difference);
            }
        }

        self.summary_text = self.summary.text();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_subject_as_str() {
        assert_eq!(DifferenceKind::Created.as_str(), "created");
        assert_eq!(DifferenceKind::Removed.as_str(), "removed");
        assert_eq!(DifferenceKind::Modified.as_str(), "modified");
        assert_eq!(Subject::AssemblyReference.as_str(), "assembly_reference");
        assert_eq!(Subject::AttributeValue.to_string(), "attribute_value");
    }

    #[test]
    fn test_subject_from_str() {
        assert_eq!("type".parse::<Subject>().unwrap(), Subject::Type);
        assert_eq!("Method".parse::<Subject>().unwrap(), Subject::Method);
        assert_eq!(
            "assembly-reference".parse::<Subject>().unwrap(),
            Subject::AssemblyReference
        );
        assert_eq!("reference".parse::<Subject>().unwrap(), Subject::AssemblyReference);
        assert!("module".parse::<Subject>().is_err());
    }

    #[test]
    fn test_constructors_populate_one_side() {
        let created = Difference::created(Subject::Type, "public class Bar".into());
        assert_eq!(created.old_value, None);
        assert_eq!(created.new_value.as_deref(), Some("public class Bar"));

        let removed = Difference::removed(Subject::Field, "public Int32 Num;".into());
        assert_eq!(removed.old_value.as_deref(), Some("public Int32 Num;"));
        assert_eq!(removed.new_value, None);
        assert_eq!(removed.display_value(), "public Int32 Num;");
    }

    #[test]
    fn test_is_breaking_classification() {
        let removed_method = Difference::removed(Subject::Method, "m".into());
        assert!(removed_method.is_breaking());

        let removed_value = Difference::removed(Subject::AttributeValue, "v".into());
        assert!(!removed_value.is_breaking());

        let created = Difference::created(Subject::Type, "t".into());
        assert!(!created.is_breaking());

        let body = Difference::modified(
            Subject::Method,
            Facet::Body,
            "1 instructions".into(),
            "2 instructions".into(),
        );
        assert!(!body.is_breaking());

        let virt = Difference::modified(Subject::Method, Facet::Virtual, "a".into(), "b".into());
        assert!(virt.is_breaking());

        let version = Difference::modified(
            Subject::AssemblyReference,
            Facet::Version,
            "1.0.0.0".into(),
            "2.0.0.0".into(),
        );
        assert!(version.is_breaking());

        let value = Difference::modified(
            Subject::AttributeValue,
            Facet::Value,
            "False".into(),
            "True".into(),
        );
        assert!(!value.is_breaking());
    }

    #[test]
    fn test_serialize_skips_entities() {
        let diff = Difference::created(Subject::Type, "public class Bar".into())
            .with_entities(None, Some(Entity::Type(TypeDecl::new("Bar"))));
        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(json["kind"], "created");
        assert_eq!(json["subject"], "type");
        assert!(json.get("new_entity").is_none());
        assert!(json.get("facet").is_none());
    }

    #[test]
    fn test_summary_text() {
        let mut summary = DiffSummary::new();
        assert_eq!(summary.text(), "No changes");

        summary.record(Subject::Type, DifferenceKind::Created, false);
        summary.record(Subject::Method, DifferenceKind::Removed, true);
        summary.record(Subject::Method, DifferenceKind::Removed, true);
        assert_eq!(summary.text(), "types: 1 added; methods: 2 removed");
        assert_eq!(summary.breaking_changes, 2);
    }

    #[test]
    fn test_result_collects_breaking() {
        let mut result = DiffResult::new("old.dll", "new.dll");
        result.add_change(Difference::created(Subject::Type, "t".into()));
        result.add_change(Difference::removed(Subject::Field, "f".into()));
        result.finalize(1.0);

        assert!(result.has_changes());
        assert!(result.has_breaking_changes());
        assert_eq!(result.change_count(), 2);
        assert_eq!(result.breaking_changes.len(), 1);
        assert_eq!(result.filter_subject(Subject::Field).len(), 1);
        assert_eq!(result.summary_text, "types: 1 added; fields: 1 removed");
    }

    #[test]
    fn test_result_retain() {
        let mut result = DiffResult::new("a", "b");
        result.add_change(Difference::created(Subject::Type, "t".into()));
        result.add_change(Difference::removed(Subject::Field, "f".into()));
        result.add_change(Difference::removed(Subject::Method, "m".into()));

        result.retain(&[Subject::Field, Subject::Type], true);

        assert_eq!(result.change_count(), 1);
        assert_eq!(result.differences[0].subject, Subject::Field);
        assert_eq!(result.summary.types.total(), 0);
        assert_eq!(result.summary_text, "fields: 1 removed");
    }
}
