// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

//! The Java-side type model.
//!
//! The compiler never loads classes: the component library is described by
//! declarative [`ClassMeta`] records supplied through a
//! [`crate::typeregister::TypeProvider`]. Types are identified by their
//! fully qualified name (`javafx.scene.control.Button`) or a primitive
//! keyword (`int`, `boolean`, …).

use std::fmt::Display;

use itertools::Itertools;
use smol_str::SmolStr;

/// Metadata for one class of the component library.
#[derive(Debug, Clone, Default)]
pub struct ClassMeta {
    /// Fully qualified name.
    pub name: SmolStr,
    /// Fully qualified names of the direct superclass and implemented
    /// interfaces. Assignability walks this chain transitively.
    pub supers: Vec<SmolStr>,
    pub constructors: Vec<MethodMeta>,
    /// Instance and static methods, in declaration order.
    pub methods: Vec<MethodMeta>,
    /// Generic type parameter names (`T`, `S`, …); empty for non-generic
    /// classes.
    pub type_params: Vec<SmolStr>,
    pub is_enum: bool,
    /// The property that receives child elements when the markup gives none
    /// explicitly (the `@DefaultProperty` equivalent).
    pub default_property: Option<SmolStr>,
}

impl ClassMeta {
    /// Whether the class exposes the conventional string conversion member,
    /// a static `valueOf` taking a single string.
    pub fn has_string_conversion(&self) -> bool {
        self.methods.iter().any(|m| {
            m.is_static
                && m.name == "valueOf"
                && m.params.len() == 1
                && is_string(&m.params[0].ty)
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodMeta {
    pub name: SmolStr,
    pub is_static: bool,
    pub params: Vec<ParamMeta>,
    /// Fully qualified type, primitive keyword, or `void`.
    pub return_type: SmolStr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamMeta {
    /// Declared parameter name, if the metadata carries one. Within a single
    /// constructor either all parameters are named or none are.
    pub name: Option<SmolStr>,
    pub ty: SmolStr,
    /// Raw default value text for named parameters without a markup
    /// attribute.
    pub default: Option<SmolStr>,
}

impl ParamMeta {
    pub fn unnamed(ty: impl Into<SmolStr>) -> Self {
        Self { name: None, ty: ty.into(), default: None }
    }

    pub fn named(name: impl Into<SmolStr>, ty: impl Into<SmolStr>) -> Self {
        Self { name: Some(name.into()), ty: ty.into(), default: None }
    }

    pub fn named_with_default(
        name: impl Into<SmolStr>,
        ty: impl Into<SmolStr>,
        default: impl Into<SmolStr>,
    ) -> Self {
        Self { name: Some(name.into()), ty: ty.into(), default: Some(default.into()) }
    }
}

/// A possibly nested generic type argument, as recorded in the controller
/// field metadata: `Map<String, List<Person>>` is
/// `GenericType { name: "java.util.Map", args: [String, List<Person>] }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericType {
    pub name: SmolStr,
    pub args: Vec<GenericType>,
}

impl GenericType {
    pub fn plain(name: impl Into<SmolStr>) -> Self {
        Self { name: name.into(), args: Vec::new() }
    }

    pub fn with_args(name: impl Into<SmolStr>, args: Vec<GenericType>) -> Self {
        Self { name: name.into(), args }
    }
}

impl Display for GenericType {
    /// The bracketed, comma joined form, using the names exactly as stored:
    /// `Outer<Inner<Leaf>>`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "<{}>", self.args.iter().join(", "))?;
        }
        Ok(())
    }
}

#[test]
fn test_generic_type_display() {
    let ty = GenericType::with_args(
        "Outer",
        vec![GenericType::with_args("Inner", vec![GenericType::plain("Leaf")])],
    );
    assert_eq!(ty.to_string(), "Outer<Inner<Leaf>>");
    let ty = GenericType::with_args(
        "Map",
        vec![GenericType::plain("String"), GenericType::plain("Person")],
    );
    assert_eq!(ty.to_string(), "Map<String, Person>");
    assert_eq!(GenericType::plain("Leaf").to_string(), "Leaf");
}

/// The part after the last `.`, which is also the whole name for primitives
/// and unqualified names.
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

#[test]
fn test_simple_name() {
    assert_eq!(simple_name("javafx.scene.control.Button"), "Button");
    assert_eq!(simple_name("int"), "int");
    assert_eq!(simple_name("Button"), "Button");
}

/// The Java integral types and their wrappers, with the matching parse
/// method on the wrapper.
const INTEGRAL: &[(&str, &str, &str)] = &[
    ("byte", "java.lang.Byte", "parseByte"),
    ("short", "java.lang.Short", "parseShort"),
    ("int", "java.lang.Integer", "parseInt"),
    ("long", "java.lang.Long", "parseLong"),
];

const FLOATING: &[(&str, &str, &str)] = &[
    ("float", "java.lang.Float", "parseFloat"),
    ("double", "java.lang.Double", "parseDouble"),
];

fn lookup_numeric(table: &[(&str, &'static str, &'static str)], ty: &str) -> Option<(&'static str, &'static str)> {
    table
        .iter()
        .find(|(prim, wrapper, _)| *prim == ty || *wrapper == ty)
        .map(|(_, wrapper, parse)| (*wrapper, *parse))
}

pub fn is_integral(ty: &str) -> bool {
    lookup_numeric(INTEGRAL, ty).is_some()
}

pub fn is_floating(ty: &str) -> bool {
    lookup_numeric(FLOATING, ty).is_some()
}

/// Wrapper class and parse method for an integral or floating destination
/// type, e.g. `("java.lang.Integer", "parseInt")` for `int`.
pub fn numeric_parse_call(ty: &str) -> Option<(&'static str, &'static str)> {
    lookup_numeric(INTEGRAL, ty).or_else(|| lookup_numeric(FLOATING, ty))
}

pub fn is_boolean(ty: &str) -> bool {
    ty == "boolean" || ty == "java.lang.Boolean"
}

pub fn is_char(ty: &str) -> bool {
    ty == "char" || ty == "java.lang.Character"
}

pub fn is_string(ty: &str) -> bool {
    ty == "java.lang.String" || ty == "java.lang.CharSequence"
}

/// The temporal types with a dedicated parse-call form instead of the
/// generic `valueOf` conversion.
pub fn temporal_parse_member(ty: &str) -> Option<&'static str> {
    match ty {
        "java.time.LocalDate" => Some("parse"),
        "javafx.util.Duration" => Some("valueOf"),
        _ => None,
    }
}

#[test]
fn test_classification() {
    assert!(is_integral("int"));
    assert!(is_integral("java.lang.Long"));
    assert!(!is_integral("double"));
    assert!(is_floating("double"));
    assert!(is_floating("java.lang.Float"));
    assert_eq!(numeric_parse_call("int"), Some(("java.lang.Integer", "parseInt")));
    assert_eq!(numeric_parse_call("java.lang.Double"), Some(("java.lang.Double", "parseDouble")));
    assert_eq!(numeric_parse_call("java.lang.String"), None);
    assert!(is_boolean("boolean"));
    assert!(is_char("java.lang.Character"));
    assert!(is_string("java.lang.String"));
    assert_eq!(temporal_parse_member("java.time.LocalDate"), Some("parse"));
    assert_eq!(temporal_parse_member("java.util.Date"), None);
}
