// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

//! The document tree model the code generator consumes.
//!
//! The tree is produced by the markup front-end, which is a separate crate:
//! by the time a [`Node`] reaches this crate all syntax concerns are gone.
//! Attribute and complex-property order is the declaration order from the
//! document; the generator relies on it for reproducible output.

use smol_str::SmolStr;

use crate::langtype::GenericType;

/// One node of the parsed document.
#[derive(Debug, Clone)]
pub enum Node {
    /// A plain element instantiating a component class.
    Object(ObjectNode),
    /// `<Double fx:value="1.5"/>`: a value coerced to the element's type.
    Value(ValueNode),
    /// `<Color fx:constant="RED"/>`: a reference to a static constant.
    Constant(ConstantNode),
    /// `<Collections fx:factory="observableArrayList"/>`: a static
    /// factory-method call with the element's children as arguments.
    Factory(FactoryNode),
    /// `<fx:reference source="id"/>`: aliases an already built object.
    Reference(ReferenceNode),
    /// `<fx:copy source="id"/>`: builds a fresh object by repeating the
    /// referenced node's construction.
    Copy(CopyNode),
    /// `<fx:define>` wrapping an out-of-band object declaration. Defined
    /// objects populate the id map but are not added to any parent property.
    Define(Box<Node>),
    /// `<fx:include source="…"/>`: instantiates another generated unit.
    Include(IncludeNode),
    /// Markup text content; contributes a string literal, never a variable.
    Text(SmolStr),
}

impl Node {
    /// The fx:id carried by the node, for the kinds that can carry one.
    pub fn fx_id(&self) -> Option<&SmolStr> {
        match self {
            Node::Object(o) => o.fx_id.as_ref(),
            Node::Value(v) => v.fx_id.as_ref(),
            Node::Constant(c) => c.fx_id.as_ref(),
            Node::Factory(f) => f.fx_id.as_ref(),
            Node::Include(i) => i.fx_id.as_ref(),
            Node::Define(inner) => inner.fx_id(),
            Node::Reference(_) | Node::Copy(_) | Node::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObjectNode {
    /// Name of the component class, fully qualified by the front-end's
    /// import processing.
    pub type_name: SmolStr,
    pub fx_id: Option<SmolStr>,
    /// Scalar attributes in declaration order. `fx:` markers are already
    /// consumed by the front-end and do not appear here.
    pub attributes: Vec<Attribute>,
    /// Complex properties in declaration order.
    pub properties: Vec<ComplexProperty>,
    /// Out-of-band `fx:define` declarations scoped to this element.
    pub definitions: Vec<Node>,
}

/// A scalar markup attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: SmolStr,
    /// For statically scoped properties (`GridPane.rowIndex="1"`) the class
    /// owning the static setter; `None` for instance properties.
    pub source_type: Option<SmolStr>,
    /// The raw attribute text, unescaped by the coercer.
    pub value: SmolStr,
}

impl Attribute {
    pub fn new(name: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        Self { name: name.into(), source_type: None, value: value.into() }
    }

    pub fn statically_scoped(
        owner: impl Into<SmolStr>,
        name: impl Into<SmolStr>,
        value: impl Into<SmolStr>,
    ) -> Self {
        Self { name: name.into(), source_type: Some(owner.into()), value: value.into() }
    }
}

/// A property whose value is one or more child nodes rather than a scalar
/// attribute. An empty name selects the class's default property.
#[derive(Debug, Clone)]
pub struct ComplexProperty {
    pub name: SmolStr,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone)]
pub struct ValueNode {
    pub type_name: SmolStr,
    pub value: SmolStr,
    pub fx_id: Option<SmolStr>,
}

#[derive(Debug, Clone)]
pub struct ConstantNode {
    pub type_name: SmolStr,
    pub constant: SmolStr,
    pub fx_id: Option<SmolStr>,
}

#[derive(Debug, Clone)]
pub struct FactoryNode {
    pub type_name: SmolStr,
    pub method: SmolStr,
    /// Factory arguments in declaration order, each emitted before the call.
    pub arguments: Vec<Node>,
    pub fx_id: Option<SmolStr>,
}

#[derive(Debug, Clone)]
pub struct ReferenceNode {
    pub source: SmolStr,
}

#[derive(Debug, Clone)]
pub struct CopyNode {
    pub source: SmolStr,
}

#[derive(Debug, Clone)]
pub struct IncludeNode {
    /// The include's source key, matching a child of the request's
    /// [`SourceInfo`].
    pub source: SmolStr,
    pub fx_id: Option<SmolStr>,
    /// Bundle base name when the include declares its own resources.
    pub resources: Option<SmolStr>,
}

/// What the build tool extracted from the controller source, read-only
/// during emission.
#[derive(Debug, Clone, Default)]
pub struct ControllerInfo {
    /// Fully qualified controller class name.
    pub class_name: SmolStr,
    /// Event-handler methods; the value records whether the handler expects
    /// the event argument.
    pub handlers: std::collections::HashMap<SmolStr, bool>,
    /// Injectable fields by markup id.
    pub fields: std::collections::HashMap<SmolStr, ControllerField>,
    /// Whether the controller declares the lifecycle initializer method.
    pub has_initialize: bool,
}

#[derive(Debug, Clone)]
pub struct ControllerField {
    pub name: SmolStr,
    /// Generic type arguments for the field, when the controller declares a
    /// parameterized type. Empty for raw or non-generic fields.
    pub generic_args: Vec<GenericType>,
}

impl ControllerInfo {
    pub fn new(class_name: impl Into<SmolStr>) -> Self {
        Self { class_name: class_name.into(), ..Default::default() }
    }
}

/// The include graph of one input document, assembled by the build tool.
///
/// The same include may appear several times; children are ordered like the
/// includes in the document.
#[derive(Debug, Clone, Default)]
pub struct SourceInfo {
    /// Fully qualified name of the generated class for this document.
    pub generated_class: SmolStr,
    /// Fully qualified controller class, if the document declares one.
    pub controller_class: Option<SmolStr>,
    /// Identity of the input document, also the key includes refer to.
    pub source_key: SmolStr,
    pub includes: Vec<SourceInfo>,
    /// Whether this document or any of its includes performs bundle lookups;
    /// propagated upwards by the build tool.
    pub requires_bundle: bool,
}

impl SourceInfo {
    pub fn include_for(&self, source: &str) -> Option<&SourceInfo> {
        self.includes.iter().find(|i| i.source_key == source)
    }
}
