//! Signatures command - List the canonical signature of every entity
//!
//! Renders a single snapshot the way the differ sees it, which makes it easy
//! to tell why two entities did or did not pair up.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use asmdiff_core::differ::signature::{
    attribute_signature, field_signature, method_signature, property_signature, type_signature,
};
use asmdiff_core::types::Attribute;
use asmdiff_core::{MetadataSnapshot, TypeKey};

use crate::output::{grouped_table, to_csv, OutputConfig, Report, Row};

/// Group of module-level entries.
const REFERENCES: &str = "references";

#[derive(Debug, Clone, Serialize)]
pub struct SignatureEntry {
    /// Declaring type, or [`REFERENCES`]
    #[serde(skip)]
    pub group: String,
    pub kind: String,
    pub parent: Option<String>,
    pub signature: String,
}

impl SignatureEntry {
    fn new(group: &str, kind: &str, parent: Option<String>, signature: String) -> Self {
        Self {
            group: group.to_string(),
            kind: kind.to_string(),
            parent,
            signature,
        }
    }
}

impl Row for SignatureEntry {
    const HEADERS: &'static [&'static str] = &["Kind", "Parent", "Signature"];

    fn group(&self) -> &str {
        &self.group
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.kind.clone(),
            self.parent.clone().unwrap_or_default(),
            self.signature.clone(),
        ]
    }
}

#[derive(Debug, Serialize)]
pub struct SignatureReport {
    pub module: String,
    pub runtime_version: String,
    pub entries: Vec<SignatureEntry>,
}

impl SignatureReport {
    /// Walk the snapshot in declaration order.
    pub fn from_snapshot(snapshot: &MetadataSnapshot, include_generated: bool) -> Self {
        let mut entries = Vec::new();

        for reference in &snapshot.references {
            entries.push(SignatureEntry::new(REFERENCES, "reference", None, reference.full_name()));
        }

        for ty in &snapshot.types {
            entries.push(SignatureEntry::new(&ty.name, "type", None, type_signature(ty)));

            for field in ty.fields.iter().filter(|f| include_generated || !f.is_compiler_generated) {
                entries.push(SignatureEntry::new(
                    &ty.name,
                    "field",
                    Some(ty.name.clone()),
                    field_signature(field),
                ));
                push_attributes(&mut entries, &ty.name, &field.name, &field.attributes);
            }

            for method in ty.methods.iter().filter(|m| include_generated || !m.is_compiler_generated) {
                entries.push(SignatureEntry::new(
                    &ty.name,
                    "method",
                    Some(ty.name.clone()),
                    method_signature(method),
                ));
            }

            for property in ty
                .properties
                .iter()
                .filter(|p| include_generated || !p.is_compiler_generated)
            {
                entries.push(SignatureEntry::new(
                    &ty.name,
                    "property",
                    Some(ty.name.clone()),
                    property_signature(property),
                ));
                push_attributes(&mut entries, &ty.name, &property.name, &property.attributes);
            }
        }

        Self {
            module: snapshot.name.clone(),
            runtime_version: snapshot.runtime_version.clone(),
            entries,
        }
    }
}

fn push_attributes(
    entries: &mut Vec<SignatureEntry>,
    type_name: &str,
    member: &str,
    attributes: &[Attribute],
) {
    for attribute in attributes {
        entries.push(SignatureEntry::new(
            type_name,
            "attribute",
            Some(format!("{}.{}", type_name, member)),
            attribute_signature(attribute),
        ));
    }
}

impl Report for SignatureReport {
    fn to_table(&self, config: &OutputConfig) -> String {
        let mut output = format!(
            "{} {} ({})\n\n",
            "MODULE:".cyan().bold(),
            self.module.yellow(),
            self.runtime_version
        );
        output.push_str(&grouped_table(&self.entries, config));
        output
    }

    fn to_csv(&self) -> String {
        to_csv(&self.entries)
    }
}

/// Run the signatures command
pub fn run(
    path: &Path,
    include_generated: bool,
    strict: bool,
    type_key: TypeKey,
    config: OutputConfig,
) -> anyhow::Result<()> {
    let snapshot = super::load_snapshot(path, strict, type_key)?;
    SignatureReport::from_snapshot(&snapshot, include_generated).print(&config);
    Ok(())
}
