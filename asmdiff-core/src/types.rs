//! Data models for compiled-module metadata snapshots.
//!
//! These types describe the declared surface of one build of a module:
//! its assembly references, its types and their fields, methods and
//! properties. A snapshot is produced by a metadata provider and is only
//! ever borrowed by the differ.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::differ::reconcile::duplicate_keys;
use crate::differ::signature::{method_identity, property_identity};
use crate::error::{Result, SnapshotError};
use crate::options::TypeKey;

/// Four-part assembly version (`major.minor.build.revision`).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u16,
    pub minor: u16,
    pub build: u16,
    pub revision: u16,
}

impl Version {
    pub fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl FromStr for Version {
    type Err = SnapshotError;

    /// Parses one to four dot-separated components; missing ones are zero.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SnapshotError::InvalidVersion {
            value: s.to_string(),
        };

        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.is_empty() || parts.len() > 4 {
            return Err(invalid());
        }

        let mut components = [0u16; 4];
        for (slot, part) in components.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| invalid())?;
        }

        let [major, minor, build, revision] = components;
        Ok(Self::new(major, minor, build, revision))
    }
}

impl TryFrom<String> for Version {
    type Error = SnapshotError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

/// A reference from the module to an external assembly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyReference {
    pub name: String,
    pub version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_token: Option<String>,
}

impl AssemblyReference {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            culture: None,
            public_key_token: None,
        }
    }

    pub fn with_culture(mut self, culture: impl Into<String>) -> Self {
        self.culture = Some(culture.into());
        self
    }

    pub fn with_public_key_token(mut self, token: impl Into<String>) -> Self {
        self.public_key_token = Some(token.into());
        self
    }

    fn culture_str(&self) -> &str {
        self.culture.as_deref().unwrap_or("neutral")
    }

    fn token_str(&self) -> &str {
        self.public_key_token.as_deref().unwrap_or("null")
    }

    /// Display name including the version, e.g.
    /// `System.Runtime, Version=8.0.0.0, Culture=neutral, PublicKeyToken=null`.
    pub fn full_name(&self) -> String {
        format!(
            "{}, Version={}, Culture={}, PublicKeyToken={}",
            self.name,
            self.version,
            self.culture_str(),
            self.token_str()
        )
    }

    /// Version-independent part of the full name, used to pair references
    /// across snapshots so that a version bump reads as a modification.
    pub fn identity(&self) -> String {
        format!(
            "{}, Culture={}, PublicKeyToken={}",
            self.name,
            self.culture_str(),
            self.token_str()
        )
    }
}

/// A type as referenced from a declaration (field type, return type, ...).
///
/// `name` is the short display form (`Int32`, `Int32[]`), `full_name` the
/// namespace-qualified form (`System.Int32`). In JSON a plain string is
/// accepted as the full name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "TypeSigRepr")]
pub struct TypeSig {
    pub name: String,
    pub full_name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TypeSigRepr {
    FullName(String),
    Parts { name: String, full_name: String },
}

impl From<TypeSigRepr> for TypeSig {
    fn from(repr: TypeSigRepr) -> Self {
        match repr {
            TypeSigRepr::FullName(full_name) => TypeSig::new(full_name),
            TypeSigRepr::Parts { name, full_name } => TypeSig::with_name(name, full_name),
        }
    }
}

impl TypeSig {
    /// Build from a full name, deriving the short name from the last
    /// namespace or nesting segment. Generic arguments are dropped from the
    /// short name the way metadata readers report it (`List`1`).
    pub fn new(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let head_end = full_name.find('<').unwrap_or(full_name.len());
        let start = full_name[..head_end]
            .rfind(|c| c == '.' || c == '/')
            .map(|i| i + 1)
            .unwrap_or(0);
        let name = full_name[start..head_end].to_string();
        Self { name, full_name }
    }

    pub fn with_name(name: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
        }
    }

    pub fn void() -> Self {
        Self::new("System.Void")
    }
}

/// Accessibility of a field, method or property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Private,
    Public,
    Protected,
    Internal,
    ProtectedInternal,
    PrivateProtected,
}

impl Visibility {
    pub fn keyword(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Internal => "internal",
            Visibility::ProtectedInternal => "protected internal",
            Visibility::PrivateProtected => "private protected",
        }
    }
}

/// Top-level type visibility. Anything not public renders as `private`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeVisibility {
    Public,
    #[default]
    NotPublic,
}

impl TypeVisibility {
    pub fn keyword(&self) -> &'static str {
        match self {
            TypeVisibility::Public => "public",
            TypeVisibility::NotPublic => "private",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Struct,
    Enum,
    Interface,
}

impl TypeKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Enum => "enum",
            TypeKind::Interface => "interface",
        }
    }
}

/// A method or indexer parameter. The implicit receiver has an empty name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: TypeSig,
}

impl Parameter {
    pub fn new(name: impl Into<String>, param_type: TypeSig) -> Self {
        Self {
            name: name.into(),
            param_type,
        }
    }

    /// The hidden `this` parameter of an instance method.
    pub fn receiver(param_type: TypeSig) -> Self {
        Self::new("", param_type)
    }

    pub fn is_named(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Executable body, as an ordered list of instruction texts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub instructions: Vec<String>,
}

impl Body {
    pub fn new<I, S>(instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            instructions: instructions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }
}

/// Constant value of a named attribute argument.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    String(String),
    Type(String),
}

impl AttributeValue {
    /// Constant equality. Floats compare by bit pattern, so a NaN blob
    /// equals itself and `0.0` differs from `-0.0` as their renderings do.
    pub fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (AttributeValue::Float(a), AttributeValue::Float(b)) => a.to_bits() == b.to_bits(),
            (AttributeValue::Null, AttributeValue::Null) => true,
            (AttributeValue::Bool(a), AttributeValue::Bool(b)) => a == b,
            (AttributeValue::Int(a), AttributeValue::Int(b)) => a == b,
            (AttributeValue::UInt(a), AttributeValue::UInt(b)) => a == b,
            (AttributeValue::Char(a), AttributeValue::Char(b)) => a == b,
            (AttributeValue::String(a), AttributeValue::String(b))
            | (AttributeValue::Type(a), AttributeValue::Type(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        self.same_value(other)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => f.write_str("null"),
            AttributeValue::Bool(true) => f.write_str("True"),
            AttributeValue::Bool(false) => f.write_str("False"),
            AttributeValue::Int(v) => write!(f, "{}", v),
            AttributeValue::UInt(v) => write!(f, "{}", v),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::Char(c) => write!(f, "{}", c),
            AttributeValue::String(s) | AttributeValue::Type(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeArgument {
    pub name: String,
    pub value: AttributeValue,
}

impl AttributeArgument {
    pub fn new(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A custom attribute applied to a member.
///
/// Field-style and property-style named arguments are kept apart as the
/// metadata stores them, but compared as one set keyed by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub type_name: String,
    #[serde(default)]
    pub fields: Vec<AttributeArgument>,
    #[serde(default)]
    pub properties: Vec<AttributeArgument>,
}

impl Attribute {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.fields.push(AttributeArgument::new(name, value));
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.properties.push(AttributeArgument::new(name, value));
        self
    }

    /// Field-style arguments followed by property-style ones.
    pub fn arguments(&self) -> impl Iterator<Item = &AttributeArgument> {
        self.fields.iter().chain(self.properties.iter())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: TypeSig,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_init_only: bool,
    pub attributes: Vec<Attribute>,
    pub is_compiler_generated: bool,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, field_type: TypeSig) -> Self {
        Self {
            name: name.into(),
            field_type,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodDecl {
    pub name: String,
    pub return_type: TypeSig,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub parameters: Vec<Parameter>,
    pub generic_parameters: Vec<String>,
    pub body: Option<Body>,
    pub is_compiler_generated: bool,
}

impl Default for MethodDecl {
    fn default() -> Self {
        Self {
            name: String::new(),
            return_type: TypeSig::void(),
            visibility: Visibility::default(),
            is_static: false,
            is_virtual: false,
            is_final: false,
            is_abstract: false,
            parameters: Vec::new(),
            generic_parameters: Vec::new(),
            body: None,
            is_compiler_generated: false,
        }
    }
}

impl MethodDecl {
    pub fn new(name: impl Into<String>, return_type: TypeSig) -> Self {
        Self {
            name: name.into(),
            return_type,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: TypeSig,
    /// Index parameters; empty for ordinary properties.
    pub parameters: Vec<Parameter>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub has_getter: bool,
    pub has_setter: bool,
    pub attributes: Vec<Attribute>,
    pub is_compiler_generated: bool,
}

impl PropertyDecl {
    pub fn new(name: impl Into<String>, property_type: TypeSig) -> Self {
        Self {
            name: name.into(),
            property_type,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDecl {
    pub name: String,
    pub namespace: String,
    pub visibility: TypeVisibility,
    pub kind: TypeKind,
    pub is_abstract: bool,
    pub is_sealed: bool,
    pub generic_parameters: Vec<String>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub properties: Vec<PropertyDecl>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Namespace-qualified name (`Foo.Bar`), or the bare name at global scope.
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

/// Root of one build's metadata: module identity plus declared surface.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    /// Module display name, e.g. `MyLib.dll`.
    pub name: String,
    #[serde(default)]
    pub runtime_version: String,
    #[serde(default)]
    pub references: Vec<AssemblyReference>,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

impl MetadataSnapshot {
    pub fn new(name: impl Into<String>, runtime_version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            runtime_version: runtime_version.into(),
            ..Default::default()
        }
    }

    /// Reject snapshots in which two entities at the same level share an
    /// identity key. The differ itself tolerates such input (first
    /// occurrence wins); this is for callers that want a hard failure.
    ///
    /// Types are checked under `type_key`, the same key the differ pairs
    /// them by, so two namespaces declaring `Bar` collide under
    /// [`TypeKey::Name`].
    pub fn validate(&self, type_key: TypeKey) -> Result<()> {
        check_unique("assembly reference", &self.references, |r| r.identity())?;
        check_unique("type", &self.types, |t| match type_key {
            TypeKey::Name => t.name.clone(),
            TypeKey::FullName => t.full_name(),
        })?;

        for ty in &self.types {
            let scope = |kind: &str| format!("{} in {}", kind, ty.full_name());
            check_unique(&scope("field"), &ty.fields, |f| f.name.clone())?;
            check_unique(&scope("method"), &ty.methods, method_identity)?;
            check_unique(&scope("property"), &ty.properties, property_identity)?;

            let field_attrs = ty.fields.iter().map(|f| (&f.name, &f.attributes));
            let prop_attrs = ty.properties.iter().map(|p| (&p.name, &p.attributes));
            for (member, attributes) in field_attrs.chain(prop_attrs) {
                let scope = format!("attribute on {}.{}", ty.name, member);
                check_unique(&scope, attributes, |a| a.type_name.clone())?;
            }
        }

        Ok(())
    }
}

fn check_unique<T, F>(scope: &str, items: &[T], key: F) -> Result<()>
where
    F: Fn(&T) -> String,
{
    match duplicate_keys(items.iter(), key).into_iter().next() {
        Some(key) => Err(SnapshotError::DuplicateIdentity {
            scope: scope.to_string(),
            key,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse_and_display() {
        let v: Version = "1.2.3.4".parse().unwrap();
        assert_eq!(v, Version::new(1, 2, 3, 4));
        assert_eq!(v.to_string(), "1.2.3.4");

        let short: Version = "2.1".parse().unwrap();
        assert_eq!(short.to_string(), "2.1.0.0");
    }

    #[test]
    fn test_version_parse_rejects_garbage() {
        assert!("1.x".parse::<Version>().is_err());
        assert!("1.2.3.4.5".parse::<Version>().is_err());
        assert!("".parse::<Version>().is_err());
        assert!("70000.0".parse::<Version>().is_err());
    }

    #[test]
    fn test_version_ordering() {
        assert!(Version::new(1, 0, 0, 0) < Version::new(2, 0, 0, 0));
        assert!(Version::new(1, 2, 0, 0) > Version::new(1, 1, 9, 9));
    }

    #[test]
    fn test_reference_full_name_and_identity() {
        let r = AssemblyReference::new("System.Runtime", Version::new(8, 0, 0, 0))
            .with_public_key_token("b03f5f7f11d50a3a");
        assert_eq!(
            r.full_name(),
            "System.Runtime, Version=8.0.0.0, Culture=neutral, PublicKeyToken=b03f5f7f11d50a3a"
        );
        assert_eq!(
            r.identity(),
            "System.Runtime, Culture=neutral, PublicKeyToken=b03f5f7f11d50a3a"
        );
    }

    #[test]
    fn test_type_sig_short_names() {
        assert_eq!(TypeSig::new("System.Int32").name, "Int32");
        assert_eq!(TypeSig::new("System.Byte[]").name, "Byte[]");
        assert_eq!(TypeSig::new("Foo.Outer/Inner").name, "Inner");
        assert_eq!(
            TypeSig::new("System.Collections.Generic.List`1<System.Int32>").name,
            "List`1"
        );
        assert_eq!(TypeSig::new("T").name, "T");
    }

    #[test]
    fn test_type_sig_deserialize_string_or_struct() {
        let short: TypeSig = serde_json::from_str("\"System.String\"").unwrap();
        assert_eq!(short, TypeSig::new("System.String"));

        let long: TypeSig =
            serde_json::from_str(r#"{"name": "Str", "full_name": "Lib.Str"}"#).unwrap();
        assert_eq!(long.name, "Str");
        assert_eq!(long.full_name, "Lib.Str");
    }

    #[test]
    fn test_attribute_value_display() {
        assert_eq!(AttributeValue::Bool(true).to_string(), "True");
        assert_eq!(AttributeValue::Int(-3).to_string(), "-3");
        assert_eq!(AttributeValue::String("x".into()).to_string(), "x");
        assert_eq!(AttributeValue::Null.to_string(), "null");
    }

    #[test]
    fn test_type_full_name() {
        let mut ty = TypeDecl::new("Bar");
        assert_eq!(ty.full_name(), "Bar");
        ty.namespace = "Foo".into();
        assert_eq!(ty.full_name(), "Foo.Bar");
    }

    #[test]
    fn test_validate_accepts_distinct_keys() {
        let mut snapshot = MetadataSnapshot::new("lib.dll", "v4.0.30319");
        let mut ty = TypeDecl::new("Bar");
        ty.fields.push(FieldDecl::new("A", TypeSig::new("System.Int32")));
        ty.fields.push(FieldDecl::new("B", TypeSig::new("System.Int32")));
        snapshot.types.push(ty);
        assert!(snapshot.validate(TypeKey::Name).is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_field() {
        let mut snapshot = MetadataSnapshot::new("lib.dll", "v4.0.30319");
        let mut ty = TypeDecl::new("Bar");
        ty.fields.push(FieldDecl::new("A", TypeSig::new("System.Int32")));
        ty.fields.push(FieldDecl::new("A", TypeSig::new("System.Int64")));
        snapshot.types.push(ty);

        match snapshot.validate(TypeKey::Name) {
            Err(SnapshotError::DuplicateIdentity { scope, key }) => {
                assert_eq!(scope, "field in Bar");
                assert_eq!(key, "A");
            }
            other => panic!("expected duplicate identity, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_type_collision_follows_key() {
        let mut snapshot = MetadataSnapshot::new("lib.dll", "v4.0.30319");
        for namespace in ["A", "B"] {
            snapshot.types.push(TypeDecl {
                namespace: namespace.to_string(),
                ..TypeDecl::new("Bar")
            });
        }

        match snapshot.validate(TypeKey::Name) {
            Err(SnapshotError::DuplicateIdentity { scope, key }) => {
                assert_eq!(scope, "type");
                assert_eq!(key, "Bar");
            }
            other => panic!("expected duplicate identity, got {:?}", other),
        }
        assert!(snapshot.validate(TypeKey::FullName).is_ok());
    }

    #[test]
    fn test_attribute_value_nan_equals_itself() {
        let nan = AttributeValue::Float(f64::NAN);
        assert!(nan.same_value(&nan.clone()));
        assert_eq!(nan, AttributeValue::Float(f64::NAN));
        assert_ne!(AttributeValue::Float(0.0), AttributeValue::Float(-0.0));
        assert_ne!(AttributeValue::Int(1), AttributeValue::UInt(1));
        assert_ne!(
            AttributeValue::String("System.Int32".into()),
            AttributeValue::Type("System.Int32".into())
        );
    }

    #[test]
    fn test_validate_rejects_duplicate_method_overload() {
        let mut snapshot = MetadataSnapshot::new("lib.dll", "v4.0.30319");
        let mut ty = TypeDecl::new("Bar");
        ty.methods.push(MethodDecl::new("Run", TypeSig::void()));
        ty.methods.push(MethodDecl::new("Run", TypeSig::void()));
        snapshot.types.push(ty);
        assert!(snapshot.validate(TypeKey::Name).is_err());
    }
}
