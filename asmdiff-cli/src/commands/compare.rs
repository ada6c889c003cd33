//! Compare command - Structural diff between two metadata snapshots
//!
//! Pairs entities by identity across the old and new snapshot and lists what
//! was added, removed or modified, flagging changes that can break callers.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use asmdiff_core::differ::{DiffResult, Difference, DifferenceKind, Subject};
use asmdiff_core::{semantic_diff, DiffOptions};

use crate::output::{grouped_table, summary_table, to_csv, OutputConfig, Report, Row};

/// Flags of the compare command that adjust what is compared and shown.
#[derive(Debug, Clone, Default)]
pub struct CompareArgs {
    pub include_generated: bool,
    pub no_property_modifications: bool,
    pub sequential: bool,
    pub type_key: Option<asmdiff_core::TypeKey>,
    pub subjects: Vec<Subject>,
    pub breaking_only: bool,
    pub strict: bool,
}

impl CompareArgs {
    /// Layer command-line flags over the configured options. Flags only
    /// ever turn behavior on or away from the default, never back.
    pub fn apply(&self, mut options: DiffOptions) -> DiffOptions {
        if self.include_generated {
            options.include_generated = true;
        }
        if self.no_property_modifications {
            options.property_modifications = false;
        }
        if self.sequential {
            options.parallel = false;
        }
        if let Some(type_key) = self.type_key {
            options.type_key = type_key;
        }
        options
    }
}

/// One difference flattened for tabular output.
#[derive(Debug)]
pub struct DifferenceRow {
    /// Owning type, or the module-level bucket the record belongs to
    pub group: String,
    pub kind: String,
    pub subject: String,
    pub facet: Option<String>,
    pub parent: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub breaking: bool,
}

impl From<&Difference> for DifferenceRow {
    fn from(diff: &Difference) -> Self {
        Self {
            group: owning_group(diff),
            kind: diff.kind.to_string(),
            subject: diff.subject.to_string(),
            facet: diff.facet.map(|f| f.to_string()),
            parent: diff.parent.clone(),
            old_value: diff.old_value.clone(),
            new_value: diff.new_value.clone(),
            breaking: diff.is_breaking(),
        }
    }
}

/// Member records carry a path such as `Foo.Num[Obsolete].IsError`; the
/// owning type is its first segment.
fn owning_group(diff: &Difference) -> String {
    match (diff.subject, diff.parent.as_deref()) {
        (Subject::AssemblyName | Subject::RuntimeVersion, _) => "module".to_string(),
        (Subject::AssemblyReference, _) => "references".to_string(),
        (_, None) => "types".to_string(),
        (_, Some(path)) => path
            .split(['.', '['])
            .next()
            .unwrap_or(path)
            .to_string(),
    }
}

impl Row for DifferenceRow {
    const HEADERS: &'static [&'static str] =
        &["Kind", "Subject", "Facet", "Parent", "Old", "New", "Breaking"];

    fn group(&self) -> &str {
        &self.group
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.kind.clone(),
            self.subject.clone(),
            self.facet.clone().unwrap_or_default(),
            self.parent.clone().unwrap_or_default(),
            self.old_value.clone().unwrap_or_default(),
            self.new_value.clone().unwrap_or_default(),
            self.breaking.to_string(),
        ]
    }
}

/// Rendered result of a compare run.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct CompareReport {
    pub result: DiffResult,
}

impl CompareReport {
    fn rows(&self) -> Vec<DifferenceRow> {
        self.result.differences.iter().map(DifferenceRow::from).collect()
    }

    fn location(diff: &Difference) -> String {
        match &diff.parent {
            Some(parent) => format!(" in {}", parent),
            None => String::new(),
        }
    }

    fn push_section(
        output: &mut String,
        title: colored::ColoredString,
        changes: &[&Difference],
        render: impl Fn(&Difference) -> String,
    ) {
        if changes.is_empty() {
            return;
        }
        output.push_str(&format!("{} ({}):\n", title, changes.len()));
        for change in changes {
            output.push_str(&render(change));
        }
        output.push('\n');
    }
}

impl Report for CompareReport {
    fn to_table(&self, config: &OutputConfig) -> String {
        let result = &self.result;
        let mut output = String::new();

        output.push_str(&format!(
            "{} {} -> {}\n",
            "COMPARE:".cyan().bold(),
            result.old_module.yellow(),
            result.new_module.green()
        ));
        output.push_str(&format!(
            "Found {} changes ({} breaking) in {:.1}ms\n\n",
            result.change_count().to_string().cyan(),
            result.breaking_changes.len().to_string().red(),
            result.duration_ms
        ));

        if !result.has_changes() {
            output.push_str(&format!("{}\n", "No structural changes detected.".dimmed()));
            return output;
        }

        if config.compact {
            output.push_str(&grouped_table(&self.rows(), config));
            output.push_str(&format!("\n{}\n", result.summary_text.dimmed()));
            return output;
        }

        let of_kind = |kind: DifferenceKind| -> Vec<&Difference> {
            result
                .differences
                .iter()
                .filter(|d| d.kind == kind)
                .collect()
        };
        let marker = |diff: &Difference, normal: &'static str| {
            if diff.is_breaking() {
                "⚠"
            } else {
                normal
            }
        };

        Self::push_section(
            &mut output,
            "ADDED".green().bold(),
            &of_kind(DifferenceKind::Created),
            |d| {
                format!(
                    "  + {} [{}]{}\n",
                    d.display_value().green(),
                    d.subject,
                    Self::location(d).dimmed()
                )
            },
        );

        Self::push_section(
            &mut output,
            "MODIFIED".yellow().bold(),
            &of_kind(DifferenceKind::Modified),
            |d| {
                let facet = d.facet.map(|f| format!(" {}", f)).unwrap_or_default();
                format!(
                    "  {} [{}{}]{}\n    {} {}\n    {} {}\n",
                    marker(d, "~"),
                    d.subject,
                    facet,
                    Self::location(d).dimmed(),
                    "-".red(),
                    d.old_value.as_deref().unwrap_or_default().red(),
                    "+".green(),
                    d.new_value.as_deref().unwrap_or_default().green()
                )
            },
        );

        Self::push_section(
            &mut output,
            "REMOVED".red().bold(),
            &of_kind(DifferenceKind::Removed),
            |d| {
                format!(
                    "  {} {} [{}]{}\n",
                    marker(d, "-"),
                    d.display_value().red(),
                    d.subject,
                    Self::location(d).dimmed()
                )
            },
        );

        output.push_str(&summary_table(
            &[
                ("Summary", result.summary_text.clone()),
                ("Breaking", result.breaking_changes.len().to_string()),
            ],
            config,
        ));
        output.push('\n');
        output
    }

    fn to_csv(&self) -> String {
        to_csv(&self.rows())
    }
}

/// Run the compare command. Returns whether breaking changes remain after
/// filtering, so the caller can pick an exit code.
pub fn run(
    old: &Path,
    new: &Path,
    base_options: DiffOptions,
    args: &CompareArgs,
    config: OutputConfig,
) -> anyhow::Result<bool> {
    let options = args.apply(base_options);
    tracing::debug!(?options, "comparing snapshots");

    let old_snapshot = super::load_snapshot(old, args.strict, options.type_key)?;
    let new_snapshot = super::load_snapshot(new, args.strict, options.type_key)?;

    let mut result = semantic_diff(&old_snapshot, &new_snapshot, &options);
    if !args.subjects.is_empty() || args.breaking_only {
        result.retain(&args.subjects, args.breaking_only);
    }

    let has_breaking = result.has_breaking_changes();
    CompareReport { result }.print(&config);
    Ok(has_breaking)
}
