//! Canonical signature rendering and identity keys.
//!
//! Signatures are the human-readable payload of every difference record.
//! Identity keys are the modifier-free forms used to pair members across
//! snapshots, so that an overload change reads as removal plus creation.

use crate::types::{Attribute, FieldDecl, MethodDecl, Parameter, PropertyDecl, TypeDecl};

/// `public abstract class Repository<T>`
pub fn type_signature(ty: &TypeDecl) -> String {
    let mut parts = vec![ty.visibility.keyword()];

    match (ty.is_abstract, ty.is_sealed) {
        (true, true) => parts.push("static"),
        (true, false) => parts.push("abstract"),
        (false, true) => parts.push("sealed"),
        (false, false) => {}
    }

    parts.push(ty.kind.keyword());

    format!(
        "{} {}{}",
        parts.join(" "),
        ty.name,
        generic_list(&ty.generic_parameters)
    )
}

/// `public static readonly Int32 Count;`
pub fn field_signature(field: &FieldDecl) -> String {
    let mut sig = String::from(field.visibility.keyword());
    sig.push(' ');
    if field.is_static {
        sig.push_str("static ");
    }
    if field.is_init_only {
        sig.push_str("readonly ");
    }
    sig.push_str(&field.field_type.name);
    sig.push(' ');
    sig.push_str(&field.name);
    sig.push(';');
    sig
}

/// `public virtual Void Run<T>(String name,Int32 count)`
pub fn method_signature(method: &MethodDecl) -> String {
    let mut sig = String::from(method.visibility.keyword());
    sig.push(' ');
    if method.is_virtual {
        sig.push_str("virtual ");
    }
    if method.is_final {
        sig.push_str("sealed ");
    }
    if method.is_abstract {
        sig.push_str("abstract ");
    }
    if method.is_static {
        sig.push_str("static ");
    }

    format!(
        "{}{} {}{}({})",
        sig,
        method.return_type.name,
        method.name,
        generic_list(&method.generic_parameters),
        parameter_list(&method.parameters)
    )
}

/// Modifier-free method key: return type, name, generic parameters and
/// parameter types, all fully qualified.
pub fn method_identity(method: &MethodDecl) -> String {
    let params: Vec<&str> = method
        .parameters
        .iter()
        .filter(|p| p.is_named())
        .map(|p| p.param_type.full_name.as_str())
        .collect();

    format!(
        "{} {}{}({})",
        method.return_type.full_name,
        method.name,
        generic_list(&method.generic_parameters),
        params.join(",")
    )
}

/// `public Int32 Count { get; }`, or `public String Item[Int32 index] { get; set; }`
/// for indexers.
pub fn property_signature(property: &PropertyDecl) -> String {
    let mut sig = String::from(property.visibility.keyword());
    sig.push(' ');
    if property.is_static {
        sig.push_str("static ");
    }
    sig.push_str(&property.property_type.name);
    sig.push(' ');
    sig.push_str(&property.name);

    if !property.parameters.is_empty() {
        sig.push('[');
        sig.push_str(&parameter_list(&property.parameters));
        sig.push(']');
    }

    sig.push_str(" { ");
    if property.has_getter {
        sig.push_str("get; ");
    }
    if property.has_setter {
        sig.push_str("set; ");
    }
    sig.push('}');
    sig
}

/// Property key: type, name and index parameter types, fully qualified.
pub fn property_identity(property: &PropertyDecl) -> String {
    let mut key = format!("{} {}", property.property_type.full_name, property.name);
    if !property.parameters.is_empty() {
        let params: Vec<&str> = property
            .parameters
            .iter()
            .map(|p| p.param_type.full_name.as_str())
            .collect();
        key.push('[');
        key.push_str(&params.join(","));
        key.push(']');
    }
    key
}

/// `[Obsolete(Message:use Bar, IsError:True)]`
pub fn attribute_signature(attribute: &Attribute) -> String {
    let mut rendered: Vec<String> = Vec::new();
    for arg in attribute.arguments() {
        let text = format!("{}:{}", arg.name, arg.value);
        if !rendered.contains(&text) {
            rendered.push(text);
        }
    }

    format!("[{}({})]", attribute.type_name, rendered.join(", "))
}

fn generic_list(params: &[String]) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!("<{}>", params.join(","))
    }
}

fn parameter_list(params: &[Parameter]) -> String {
    params
        .iter()
        .filter(|p| p.is_named())
        .map(|p| format!("{} {}", p.param_type.name, p.name))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttributeValue, TypeKind, TypeSig, TypeVisibility, Visibility};

    fn make_type(name: &str) -> TypeDecl {
        TypeDecl {
            visibility: TypeVisibility::Public,
            ..TypeDecl::new(name)
        }
    }

    fn make_method(name: &str, params: Vec<Parameter>) -> MethodDecl {
        MethodDecl {
            visibility: Visibility::Public,
            parameters: params,
            ..MethodDecl::new(name, TypeSig::void())
        }
    }

    fn param(name: &str, type_name: &str) -> Parameter {
        Parameter::new(name, TypeSig::new(type_name))
    }

    #[test]
    fn test_type_signature_plain_class() {
        assert_eq!(type_signature(&make_type("Bar")), "public class Bar");
    }

    #[test]
    fn test_type_signature_modifiers() {
        let mut ty = make_type("Util");
        ty.is_abstract = true;
        ty.is_sealed = true;
        assert_eq!(type_signature(&ty), "public static class Util");

        ty.is_sealed = false;
        assert_eq!(type_signature(&ty), "public abstract class Util");

        ty.is_abstract = false;
        ty.is_sealed = true;
        ty.kind = TypeKind::Struct;
        ty.visibility = TypeVisibility::NotPublic;
        assert_eq!(type_signature(&ty), "private sealed struct Util");
    }

    #[test]
    fn test_type_signature_generics() {
        let mut ty = make_type("Map");
        ty.kind = TypeKind::Interface;
        ty.generic_parameters = vec!["TKey".into(), "TValue".into()];
        assert_eq!(type_signature(&ty), "public interface Map<TKey,TValue>");
    }

    #[test]
    fn test_field_signature() {
        let mut field = FieldDecl::new("Num", TypeSig::new("System.Int32"));
        field.visibility = Visibility::Public;
        assert_eq!(field_signature(&field), "public Int32 Num;");

        field.is_static = true;
        field.is_init_only = true;
        field.visibility = Visibility::ProtectedInternal;
        assert_eq!(
            field_signature(&field),
            "protected internal static readonly Int32 Num;"
        );
    }

    #[test]
    fn test_method_signature_simple() {
        assert_eq!(method_signature(&make_method("Foo", vec![])), "public Void Foo()");
    }

    #[test]
    fn test_method_signature_modifiers_order() {
        let mut method = make_method("Baz", vec![]);
        method.is_virtual = true;
        assert_eq!(method_signature(&method), "public virtual Void Baz()");

        method.is_final = true;
        method.is_abstract = true;
        method.is_static = true;
        assert_eq!(
            method_signature(&method),
            "public virtual sealed abstract static Void Baz()"
        );
    }

    #[test]
    fn test_method_signature_skips_unnamed_parameters() {
        let method = make_method(
            "Run",
            vec![
                Parameter::receiver(TypeSig::new("Lib.Bar")),
                param("name", "System.String"),
                param("count", "System.Int32"),
            ],
        );
        assert_eq!(
            method_signature(&method),
            "public Void Run(String name,Int32 count)"
        );
    }

    #[test]
    fn test_method_signature_generics() {
        let mut method = make_method("Get", vec![param("key", "TKey")]);
        method.return_type = TypeSig::new("TValue");
        method.generic_parameters = vec!["TKey".into(), "TValue".into()];
        assert_eq!(
            method_signature(&method),
            "public TValue Get<TKey,TValue>(TKey key)"
        );
    }

    #[test]
    fn test_method_identity_ignores_modifiers_and_names() {
        let a = make_method("Run", vec![param("a", "System.Int32")]);
        let mut b = make_method("Run", vec![param("b", "System.Int32")]);
        b.is_static = true;
        b.visibility = Visibility::Internal;
        assert_eq!(method_identity(&a), method_identity(&b));
        assert_eq!(method_identity(&a), "System.Void Run(System.Int32)");

        let c = make_method("Run", vec![param("a", "System.Int64")]);
        assert_ne!(method_identity(&a), method_identity(&c));
    }

    #[test]
    fn test_property_signature() {
        let mut prop = PropertyDecl::new("Count", TypeSig::new("System.Int32"));
        prop.visibility = Visibility::Public;
        prop.has_getter = true;
        assert_eq!(property_signature(&prop), "public Int32 Count { get; }");

        prop.has_setter = true;
        prop.is_static = true;
        assert_eq!(
            property_signature(&prop),
            "public static Int32 Count { get; set; }"
        );
    }

    #[test]
    fn test_property_signature_indexer() {
        let mut prop = PropertyDecl::new("Item", TypeSig::new("System.String"));
        prop.visibility = Visibility::Public;
        prop.has_getter = true;
        prop.parameters = vec![param("index", "System.Int32")];
        assert_eq!(
            property_signature(&prop),
            "public String Item[Int32 index] { get; }"
        );
        assert_eq!(property_identity(&prop), "System.String Item[System.Int32]");
    }

    #[test]
    fn test_attribute_signature() {
        let attr = Attribute::new("Obsolete")
            .with_field("Message", AttributeValue::String("use Bar".into()))
            .with_property("IsError", AttributeValue::Bool(true));
        assert_eq!(
            attribute_signature(&attr),
            "[Obsolete(Message:use Bar, IsError:True)]"
        );
    }

    #[test]
    fn test_attribute_signature_dedupes_identical_arguments() {
        let attr = Attribute::new("Flag")
            .with_field("On", AttributeValue::Bool(true))
            .with_property("On", AttributeValue::Bool(true));
        assert_eq!(attribute_signature(&attr), "[Flag(On:True)]");
        assert_eq!(attribute_signature(&Attribute::new("Serializable")), "[Serializable()]");
    }

    #[test]
    fn test_signatures_are_deterministic() {
        let method = make_method("Foo", vec![param("x", "System.Int32")]);
        assert_eq!(method_signature(&method), method_signature(&method.clone()));
    }
}
