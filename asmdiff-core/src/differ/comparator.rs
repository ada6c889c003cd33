//! Comparator logic for diffing metadata snapshots.
//!
//! Every level returns its own `Vec<Difference>`; callers append. Ordering
//! within a level: references and types report removals before creations,
//! members and attributes report creations before removals, then common
//! pairs in old-collection order.

use rayon::prelude::*;
use std::borrow::Cow;
use std::time::Instant;

use crate::differ::changes::{DiffResult, Difference, Entity, Facet, Subject};
use crate::differ::reconcile::reconcile;
use crate::differ::signature::{
    attribute_signature, field_signature, method_identity, method_signature, property_identity,
    property_signature, type_signature,
};
use crate::options::{DiffOptions, TypeKey};
use crate::types::{
    AssemblyReference, Attribute, FieldDecl, MethodDecl, MetadataSnapshot, PropertyDecl, TypeDecl,
};

/// Members the compiler may synthesize (backing fields, accessors, closures).
trait Member {
    fn is_compiler_generated(&self) -> bool;
}

impl Member for FieldDecl {
    fn is_compiler_generated(&self) -> bool {
        self.is_compiler_generated
    }
}

impl Member for MethodDecl {
    fn is_compiler_generated(&self) -> bool {
        self.is_compiler_generated
    }
}

impl Member for PropertyDecl {
    fn is_compiler_generated(&self) -> bool {
        self.is_compiler_generated
    }
}

fn members<T: Member>(items: &[T], include_generated: bool) -> impl Iterator<Item = &T> {
    items
        .iter()
        .filter(move |m| include_generated || !m.is_compiler_generated())
}

fn type_key(ty: &TypeDecl, key: TypeKey) -> Cow<'_, str> {
    match key {
        TypeKey::Name => Cow::Borrowed(ty.name.as_str()),
        TypeKey::FullName => Cow::Owned(ty.full_name()),
    }
}

/// Values for a per-predicate record: the rebuilt signatures, or the
/// predicate's own values when both signatures render identically.
fn facet_values(
    old_sig: &str,
    new_sig: &str,
    old_fact: impl FnOnce() -> String,
    new_fact: impl FnOnce() -> String,
) -> (String, String) {
    if old_sig == new_sig {
        (old_fact(), new_fact())
    } else {
        (old_sig.to_string(), new_sig.to_string())
    }
}

/// Module name, then runtime version.
fn diff_module(old: &MetadataSnapshot, new: &MetadataSnapshot) -> Vec<Difference> {
    let mut changes = Vec::new();

    let module_entity = |s: &MetadataSnapshot| Entity::Module {
        name: s.name.clone(),
        runtime_version: s.runtime_version.clone(),
    };

    if old.name != new.name {
        changes.push(
            Difference::modified(
                Subject::AssemblyName,
                Facet::Name,
                old.name.clone(),
                new.name.clone(),
            )
            .with_entities(Some(module_entity(old)), Some(module_entity(new))),
        );
    }

    if old.runtime_version != new.runtime_version {
        changes.push(
            Difference::modified(
                Subject::RuntimeVersion,
                Facet::Version,
                old.runtime_version.clone(),
                new.runtime_version.clone(),
            )
            .with_entities(Some(module_entity(old)), Some(module_entity(new))),
        );
    }

    changes
}

/// Diff assembly references, pairing by version-independent identity.
fn diff_references(old: &[AssemblyReference], new: &[AssemblyReference]) -> Vec<Difference> {
    let mut changes = Vec::new();
    let sets = reconcile(old, new, |r| r.identity());

    for reference in sets.removed {
        changes.push(
            Difference::removed(Subject::AssemblyReference, reference.full_name())
                .with_entities(Some(Entity::Reference(reference.clone())), None),
        );
    }

    for reference in sets.created {
        changes.push(
            Difference::created(Subject::AssemblyReference, reference.full_name())
                .with_entities(None, Some(Entity::Reference(reference.clone()))),
        );
    }

    for (old_ref, new_ref) in sets.common {
        if old_ref.version != new_ref.version {
            changes.push(
                Difference::modified(
                    Subject::AssemblyReference,
                    Facet::Version,
                    old_ref.version.to_string(),
                    new_ref.version.to_string(),
                )
                .with_parent(&old_ref.name)
                .with_entities(
                    Some(Entity::Reference(old_ref.clone())),
                    Some(Entity::Reference(new_ref.clone())),
                ),
            );
        }
    }

    changes
}

/// Diff attributes attached to one member. `parent` is the member path.
fn diff_attributes(old: &[Attribute], new: &[Attribute], parent: &str) -> Vec<Difference> {
    let mut changes = Vec::new();
    let sets = reconcile(old, new, |a| a.type_name.as_str());

    for attribute in sets.created {
        changes.push(
            Difference::created(Subject::Attribute, attribute_signature(attribute))
                .with_parent(parent)
                .with_entities(None, Some(Entity::Attribute(attribute.clone()))),
        );
    }

    for attribute in sets.removed {
        changes.push(
            Difference::removed(Subject::Attribute, attribute_signature(attribute))
                .with_parent(parent)
                .with_entities(Some(Entity::Attribute(attribute.clone())), None),
        );
    }

    for (old_attr, new_attr) in sets.common {
        let attr_path = format!("{}[{}]", parent, old_attr.type_name);
        let args = reconcile(old_attr.arguments(), new_attr.arguments(), |a| {
            a.name.as_str()
        });

        for arg in args.created {
            changes.push(
                Difference::created(
                    Subject::AttributeValue,
                    format!("{}:{}", arg.name, arg.value),
                )
                .with_parent(&attr_path)
                .with_entities(None, Some(Entity::Argument(arg.clone()))),
            );
        }

        for arg in args.removed {
            changes.push(
                Difference::removed(
                    Subject::AttributeValue,
                    format!("{}:{}", arg.name, arg.value),
                )
                .with_parent(&attr_path)
                .with_entities(Some(Entity::Argument(arg.clone())), None),
            );
        }

        for (old_arg, new_arg) in args.common {
            if !old_arg.value.same_value(&new_arg.value) {
                changes.push(
                    Difference::modified(
                        Subject::AttributeValue,
                        Facet::Value,
                        old_arg.value.to_string(),
                        new_arg.value.to_string(),
                    )
                    .with_parent(&format!("{}.{}", attr_path, old_arg.name))
                    .with_entities(
                        Some(Entity::Argument(old_arg.clone())),
                        Some(Entity::Argument(new_arg.clone())),
                    ),
                );
            }
        }
    }

    changes
}

/// One record per differing field predicate, then attributes.
fn diff_field_pair(old: &FieldDecl, new: &FieldDecl, parent: &str) -> Vec<Difference> {
    let mut changes = Vec::new();
    let old_sig = field_signature(old);
    let new_sig = field_signature(new);

    let predicates = [
        (Facet::Static, old.is_static != new.is_static),
        (Facet::Visibility, old.visibility != new.visibility),
        (Facet::ReadOnly, old.is_init_only != new.is_init_only),
        (
            Facet::FieldType,
            old.field_type.full_name != new.field_type.full_name,
        ),
    ];

    for (facet, _) in predicates.iter().filter(|(_, changed)| *changed) {
        let (old_value, new_value) = facet_values(
            &old_sig,
            &new_sig,
            || old.field_type.full_name.clone(),
            || new.field_type.full_name.clone(),
        );
        changes.push(
            Difference::modified(Subject::Field, *facet, old_value, new_value)
                .with_parent(parent)
                .with_entities(
                    Some(Entity::Field(old.clone())),
                    Some(Entity::Field(new.clone())),
                ),
        );
    }

    let member_path = format!("{}.{}", parent, old.name);
    changes.extend(diff_attributes(&old.attributes, &new.attributes, &member_path));

    changes
}

fn body_differs(old: &MethodDecl, new: &MethodDecl) -> bool {
    match (&old.body, &new.body) {
        (None, None) => false,
        (Some(_), None) | (None, Some(_)) => true,
        (Some(a), Some(b)) => {
            a.instruction_count() != b.instruction_count() || a.instructions != b.instructions
        }
    }
}

fn instruction_summary(method: &MethodDecl) -> String {
    let count = method.body.as_ref().map_or(0, |b| b.instruction_count());
    format!("{} instructions", count)
}

/// Flag and arity checks, then at most one body record.
fn diff_method_pair(old: &MethodDecl, new: &MethodDecl, parent: &str) -> Vec<Difference> {
    let mut changes = Vec::new();
    let old_sig = method_signature(old);
    let new_sig = method_signature(new);

    let predicates = [
        (Facet::Static, old.is_static != new.is_static),
        (Facet::Abstract, old.is_abstract != new.is_abstract),
        (Facet::Final, old.is_final != new.is_final),
        (Facet::Virtual, old.is_virtual != new.is_virtual),
        (
            Facet::ParameterCount,
            old.parameters.len() != new.parameters.len(),
        ),
        // Generic arity is part of method_identity, so paired methods
        // always agree here; kept for identities built without it.
        (
            Facet::GenericParameterCount,
            old.generic_parameters.len() != new.generic_parameters.len(),
        ),
    ];

    for (facet, _) in predicates.iter().filter(|(_, changed)| *changed) {
        let (old_value, new_value) = facet_values(
            &old_sig,
            &new_sig,
            || format!("{} parameters", old.parameters.len()),
            || format!("{} parameters", new.parameters.len()),
        );
        changes.push(
            Difference::modified(Subject::Method, *facet, old_value, new_value)
                .with_parent(parent)
                .with_entities(
                    Some(Entity::Method(old.clone())),
                    Some(Entity::Method(new.clone())),
                ),
        );
    }

    if body_differs(old, new) {
        changes.push(
            Difference::modified(
                Subject::Method,
                Facet::Body,
                instruction_summary(old),
                instruction_summary(new),
            )
            .with_parent(&format!("{}.{}", parent, old.name))
            .with_entities(
                Some(Entity::Method(old.clone())),
                Some(Entity::Method(new.clone())),
            ),
        );
    }

    changes
}

/// Structural differ over two snapshots.
#[derive(Clone, Debug, Default)]
pub struct Differ {
    options: DiffOptions,
}

impl Differ {
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Compare two snapshots: module, references, then types.
    pub fn compare(&self, old: &MetadataSnapshot, new: &MetadataSnapshot) -> Vec<Difference> {
        tracing::debug!(old = %old.name, new = %new.name, "Comparing snapshots");

        let mut changes = diff_module(old, new);

        let reference_changes = diff_references(&old.references, &new.references);
        tracing::debug!(count = reference_changes.len(), "Compared references");
        changes.extend(reference_changes);

        changes.extend(self.diff_types(&old.types, &new.types));

        tracing::debug!(count = changes.len(), "Comparison finished");
        changes
    }

    fn diff_types(&self, old: &[TypeDecl], new: &[TypeDecl]) -> Vec<Difference> {
        let mut changes = Vec::new();
        let key = self.options.type_key;
        let sets = reconcile(old, new, |t| type_key(t, key));

        tracing::debug!(
            created = sets.created.len(),
            removed = sets.removed.len(),
            common = sets.common.len(),
            "Reconciled types"
        );

        for ty in sets.removed {
            changes.push(
                Difference::removed(Subject::Type, type_signature(ty))
                    .with_entities(Some(Entity::Type(ty.clone())), None),
            );
        }

        for ty in sets.created {
            changes.push(
                Difference::created(Subject::Type, type_signature(ty))
                    .with_entities(None, Some(Entity::Type(ty.clone()))),
            );
        }

        // Each pair yields its own vector; concatenating in pair order keeps
        // the output identical to a sequential run.
        let pair_changes: Vec<Vec<Difference>> = if self.options.parallel {
            sets.common
                .par_iter()
                .map(|(old_ty, new_ty)| self.diff_type_pair(old_ty, new_ty))
                .collect()
        } else {
            sets.common
                .iter()
                .map(|(old_ty, new_ty)| self.diff_type_pair(old_ty, new_ty))
                .collect()
        };

        for pair in pair_changes {
            changes.extend(pair);
        }

        changes
    }

    fn diff_type_pair(&self, old: &TypeDecl, new: &TypeDecl) -> Vec<Difference> {
        let mut changes = Vec::new();

        let old_sig = type_signature(old);
        let new_sig = type_signature(new);
        if old_sig != new_sig {
            changes.push(
                Difference::modified(Subject::Type, Facet::Signature, old_sig, new_sig)
                    .with_entities(
                        Some(Entity::Type(old.clone())),
                        Some(Entity::Type(new.clone())),
                    ),
            );
        }

        changes.extend(self.diff_fields(old, new));
        changes.extend(self.diff_methods(old, new));
        changes.extend(self.diff_properties(old, new));

        changes
    }

    fn diff_fields(&self, old: &TypeDecl, new: &TypeDecl) -> Vec<Difference> {
        let mut changes = Vec::new();
        let parent = old.name.as_str();
        let include = self.options.include_generated;
        let sets = reconcile(
            members(&old.fields, include),
            members(&new.fields, include),
            |f| f.name.as_str(),
        );

        for field in sets.created {
            changes.push(
                Difference::created(Subject::Field, field_signature(field))
                    .with_parent(parent)
                    .with_entities(None, Some(Entity::Field(field.clone()))),
            );
        }

        for field in sets.removed {
            changes.push(
                Difference::removed(Subject::Field, field_signature(field))
                    .with_parent(parent)
                    .with_entities(Some(Entity::Field(field.clone())), None),
            );
        }

        for (old_field, new_field) in sets.common {
            changes.extend(diff_field_pair(old_field, new_field, parent));
        }

        changes
    }

    fn diff_methods(&self, old: &TypeDecl, new: &TypeDecl) -> Vec<Difference> {
        let mut changes = Vec::new();
        let parent = old.name.as_str();
        let include = self.options.include_generated;
        let sets = reconcile(
            members(&old.methods, include),
            members(&new.methods, include),
            method_identity,
        );

        for method in sets.created {
            changes.push(
                Difference::created(Subject::Method, method_signature(method))
                    .with_parent(parent)
                    .with_entities(None, Some(Entity::Method(method.clone()))),
            );
        }

        for method in sets.removed {
            changes.push(
                Difference::removed(Subject::Method, method_signature(method))
                    .with_parent(parent)
                    .with_entities(Some(Entity::Method(method.clone())), None),
            );
        }

        for (old_method, new_method) in sets.common {
            changes.extend(diff_method_pair(old_method, new_method, parent));
        }

        changes
    }

    fn diff_properties(&self, old: &TypeDecl, new: &TypeDecl) -> Vec<Difference> {
        let mut changes = Vec::new();
        let parent = old.name.as_str();
        let include = self.options.include_generated;
        let sets = reconcile(
            members(&old.properties, include),
            members(&new.properties, include),
            property_identity,
        );

        for property in sets.created {
            changes.push(
                Difference::created(Subject::Property, property_signature(property))
                    .with_parent(parent)
                    .with_entities(None, Some(Entity::Property(property.clone()))),
            );
        }

        for property in sets.removed {
            changes.push(
                Difference::removed(Subject::Property, property_signature(property))
                    .with_parent(parent)
                    .with_entities(Some(Entity::Property(property.clone())), None),
            );
        }

        if !self.options.property_modifications {
            return changes;
        }

        for (old_prop, new_prop) in sets.common {
            let old_sig = property_signature(old_prop);
            let new_sig = property_signature(new_prop);
            if old_sig != new_sig {
                changes.push(
                    Difference::modified(Subject::Property, Facet::Signature, old_sig, new_sig)
                        .with_parent(parent)
                        .with_entities(
                            Some(Entity::Property(old_prop.clone())),
                            Some(Entity::Property(new_prop.clone())),
                        ),
                );
            }

            let member_path = format!("{}.{}", parent, old_prop.name);
            changes.extend(diff_attributes(
                &old_prop.attributes,
                &new_prop.attributes,
                &member_path,
            ));
        }

        changes
    }
}

/// Compare two snapshots with default options.
pub fn compare(old: &MetadataSnapshot, new: &MetadataSnapshot) -> Vec<Difference> {
    Differ::default().compare(old, new)
}

/// Compare two snapshots and collect the differences into a summarized,
/// timed result.
pub fn semantic_diff(
    old: &MetadataSnapshot,
    new: &MetadataSnapshot,
    options: &DiffOptions,
) -> DiffResult {
    let start = Instant::now();
    let mut result = DiffResult::new(&old.name, &new.name);

    for difference in Differ::new(options.clone()).compare(old, new) {
        result.add_change(difference);
    }

    result.finalize(start.elapsed().as_secs_f64() * 1000.0);
    result
}
