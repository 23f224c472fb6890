// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

/*! The Java code generator.

The [`generate`] function drives one request: it walks the document tree
recursively, collecting construction and wiring statements into the
[`GenerationContext`], and then wraps them into the scaffolding of the
generated class (fields, constructors, the load method, helper methods and
the controller accessor). Statement order is the traversal order of the
tree; nothing here iterates a non-deterministic collection, so identical
requests produce byte-identical output.
*/

use std::cell::Cell;

use itertools::Itertools;
use smol_str::SmolStr;

use crate::diagnostics::CompileError;
use crate::generator::{
    BundleInjection, ControllerKind, FieldInjection, GenerationContext, MethodInjection,
    TargetRelease,
};
use crate::langtype::GenericType;
use crate::literals::{self, quote, CoercionHost};
use crate::lookup::{self, ExpressionScope};
use crate::object_tree::{
    Attribute, ConstantNode, ControllerField, ControllerInfo, FactoryNode, IncludeNode, Node,
    ObjectNode, SourceInfo, ValueNode,
};
use crate::typeregister::{ArgShape, ConstructorShape, TypeRegister};
use crate::{CompilerConfiguration, GenerationRequest};

mod java_ast {

    use std::fmt::{Display, Error, Formatter};

    /// One generated compilation unit, assembled declaration by declaration
    /// and written out through [`Display`]. Indentation is left to
    /// [`super::CodeFormatter`].
    #[derive(Default, Debug)]
    pub struct File {
        pub header: Vec<String>,
        pub package: Option<String>,
        pub imports: Vec<String>,
        pub class: Class,
    }

    impl Display for File {
        fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
            for line in &self.header {
                writeln!(f, "// {line}")?;
            }
            if !self.header.is_empty() {
                writeln!(f)?;
            }
            if let Some(package) = &self.package {
                writeln!(f, "package {package};")?;
                writeln!(f)?;
            }
            for import in &self.imports {
                writeln!(f, "{import}")?;
            }
            if !self.imports.is_empty() {
                writeln!(f)?;
            }
            write!(f, "{}", self.class)
        }
    }

    #[derive(Debug, derive_more::Display)]
    pub enum Declaration {
        Var(Var),
        Function(Function),
    }

    #[derive(Default, Debug)]
    pub struct Class {
        pub name: String,
        pub members: Vec<Declaration>,
    }

    impl Display for Class {
        fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
            writeln!(f, "public final class {} {{", self.name)?;
            let mut last_was_function = false;
            for m in &self.members {
                if matches!(m, Declaration::Function(_)) || last_was_function {
                    writeln!(f)?;
                }
                last_was_function = matches!(m, Declaration::Function(_));
                write!(f, "{m}")?;
            }
            writeln!(f, "}}")
        }
    }

    #[derive(Default, Debug)]
    pub struct Function {
        pub modifiers: String,
        /// Empty for constructors.
        pub return_type: String,
        pub name: String,
        /// `(...)` including the parentheses.
        pub signature: String,
        pub statements: Vec<String>,
    }

    impl Display for Function {
        fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
            write!(f, "{} ", self.modifiers)?;
            if !self.return_type.is_empty() {
                write!(f, "{} ", self.return_type)?;
            }
            writeln!(f, "{}{} {{", self.name, self.signature)?;
            for s in &self.statements {
                writeln!(f, "{s}")?;
            }
            writeln!(f, "}}")
        }
    }

    #[derive(Default, Debug)]
    pub struct Var {
        pub modifiers: String,
        pub ty: String,
        pub name: String,
    }

    impl Display for Var {
        fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
            writeln!(f, "{} {} {};", self.modifiers, self.ty, self.name)
        }
    }
}

/// Brace-driven indentation of the flat statement stream, aware of string
/// and character literals so braces inside them do not count.
struct CodeFormatter {
    indentation: usize,
}

impl CodeFormatter {
    fn format(text: &str) -> String {
        let mut formatter = Self { indentation: 0 };
        let mut out = String::with_capacity(text.len() * 2);
        for line in text.lines() {
            formatter.push_line(line.trim(), &mut out);
        }
        out
    }

    fn push_line(&mut self, line: &str, out: &mut String) {
        if line.is_empty() {
            out.push('\n');
            return;
        }
        let mut opens: isize = 0;
        let mut leading_close = true;
        let mut closes_before = 0usize;
        let mut in_string = false;
        let mut in_char = false;
        let mut escaped = false;
        for c in line.chars() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' if in_string || in_char => escaped = true,
                '"' if !in_char => in_string = !in_string,
                '\'' if !in_string => in_char = !in_char,
                '{' if !in_string && !in_char => {
                    opens += 1;
                    leading_close = false;
                }
                '}' if !in_string && !in_char => {
                    opens -= 1;
                    if leading_close {
                        closes_before += 1;
                        leading_close = false;
                    }
                }
                c if c.is_whitespace() => {}
                _ => leading_close = false,
            }
        }
        let depth = self.indentation.saturating_sub(closes_before);
        for _ in 0..depth {
            out.push_str("    ");
        }
        out.push_str(line);
        out.push('\n');
        self.indentation = self.indentation.saturating_add_signed(opens);
    }
}

/// The value or variable a node contributed, with its declared type.
struct Emitted {
    expr: String,
    /// Fully qualified type or primitive keyword.
    ty: SmolStr,
}

/// Lets dotted expressions see the id map plus the `controller` namespace
/// entry, recording whether the controller was actually touched (which
/// defers the statement under the factory controller kind).
struct EmitterScope<'a> {
    ctx: &'a GenerationContext,
    has_controller: bool,
    used_controller: Cell<bool>,
}

impl ExpressionScope for EmitterScope<'_> {
    fn base_expr(&self, name: &str) -> Option<String> {
        if name == "controller" {
            if self.has_controller {
                self.used_controller.set(true);
                return Some("this.controller".to_owned());
            }
            return None;
        }
        self.ctx.lookup(name).map(|entry| entry.variable.to_string())
    }
}

struct JavaEmitter<'a> {
    register: &'a TypeRegister,
    config: &'a CompilerConfiguration,
    controller: Option<&'a ControllerInfo>,
    source: &'a SourceInfo,
    injection: crate::generator::InjectionConfig,
    ctx: GenerationContext,
    /// Set by value coercion when the produced expression reads the
    /// controller (bundle getter strategy).
    value_touches_controller: bool,
    used_reflection_field: bool,
    used_reflection_method: bool,
}

impl CoercionHost for JavaEmitter<'_> {
    fn bundle_expr(&mut self, key: &str) -> Result<String, CompileError> {
        match self.config.bundle {
            BundleInjection::Getter => {
                if self.controller.is_none() {
                    return Err(CompileError::NoController);
                }
                self.value_touches_controller = true;
                Ok(format!("this.controller.getResources().getString({})", quote(key)))
            }
            _ => Ok(format!("this.resources.getString({})", quote(key))),
        }
    }

    fn resource_expr(&mut self, path: &str, destination: &str) -> String {
        if destination == "javafx.scene.image.Image" && self.config.stream_image_constructor {
            let image = self.ctx.import("javafx.scene.image.Image");
            format!("new {image}(getClass().getResourceAsStream({}))", quote(path))
        } else {
            format!("getClass().getResource({}).toExternalForm()", quote(path))
        }
    }

    fn variable_for_id(&self, id: &str) -> Option<String> {
        self.ctx.lookup(id).map(|entry| entry.variable.to_string())
    }

    fn import(&mut self, qualified: &str) -> String {
        self.ctx.import(qualified)
    }

    fn register(&self) -> &TypeRegister {
        self.register
    }
}

impl<'a> JavaEmitter<'a> {
    fn scope(&self) -> EmitterScope<'_> {
        EmitterScope {
            ctx: &self.ctx,
            has_controller: self.controller.is_some(),
            used_controller: Cell::new(false),
        }
    }

    fn is_factory(&self) -> bool {
        matches!(self.injection.kind, ControllerKind::Factory)
    }

    /// A local variable declaration; the target release only changes the
    /// spelling, never the initializer semantics.
    fn local_decl(&mut self, ty_text: &str, var: &str, init: &str) -> String {
        match self.config.target {
            TargetRelease::Java8 => format!("{ty_text} {var} = {init};"),
            TargetRelease::Java11 => format!("var {var} = {init};"),
        }
    }

    /// Emit a statement that reads the controller: inline under the
    /// instance kind, deferred until after the factory ran otherwise.
    fn emit_wiring(&mut self, statement: String) {
        if self.is_factory() {
            self.ctx.defer(statement);
        } else {
            self.ctx.push(statement);
        }
    }

    fn emit_guarded(&mut self, statement: String, touches_controller: bool) {
        if touches_controller {
            self.emit_wiring(statement);
        } else {
            self.ctx.push(statement);
        }
    }

    fn format_generic(&mut self, ty: &GenericType) -> String {
        let name = self.ctx.import(&ty.name);
        if ty.args.is_empty() {
            name
        } else {
            let args = ty.args.iter().map(|arg| self.format_generic(arg)).collect::<Vec<_>>();
            format!("{name}<{}>", args.iter().join(", "))
        }
    }

    /// Register the id and run the controller-field wiring for it.
    fn register_id(
        &mut self,
        id: &SmolStr,
        variable: &SmolStr,
        declared_type: &SmolStr,
        node: Node,
    ) -> Result<(), CompileError> {
        self.ctx.register(id, variable.clone(), declared_type.clone(), node)?;
        if let Some(field) = self.controller.and_then(|info| info.fields.get(id)) {
            let field = field.clone();
            self.inject_field(&field, variable.as_str());
        }
        Ok(())
    }

    /// The per-strategy statement storing `value` into a controller field.
    ///
    /// This is the single dispatch point for the field strategies; the
    /// factory strategy writes into the pre-construction map, everything
    /// else addresses the live controller.
    fn inject_field(&mut self, field: &ControllerField, value: &str) {
        let statement = match &self.injection.fields {
            FieldInjection::Assign => {
                format!("this.controller.{} = {};", field.name, value)
            }
            FieldInjection::Factory => {
                format!("controllerFields.put({}, {});", quote(&field.name), value)
            }
            FieldInjection::Reflection => {
                self.used_reflection_field = true;
                format!("injectField(this.controller, {}, {});", quote(&field.name), value)
            }
            FieldInjection::Setters => {
                format!("this.controller.{}({});", lookup::setter_name(&field.name), value)
            }
            FieldInjection::Custom(custom) => {
                custom.field_statement("this.controller", &field.name, value)
            }
        };
        self.ctx.push(statement);
    }

    /// The handler expression passed to an event setter, per the method
    /// strategy.
    fn handler_expr(&mut self, method: &str) -> Result<String, CompileError> {
        let info = self.controller.ok_or(CompileError::NoController)?;
        let expects_event = *info.handlers.get(method).ok_or_else(|| {
            CompileError::UnresolvedHandler {
                controller: info.class_name.clone(),
                handler: method.into(),
            }
        })?;
        Ok(match &self.injection.methods {
            MethodInjection::Reference => {
                if expects_event {
                    format!("event -> this.controller.{method}(event)")
                } else {
                    format!("event -> this.controller.{method}()")
                }
            }
            MethodInjection::Reflection => {
                self.used_reflection_method = true;
                if expects_event {
                    format!("event -> invokeController({}, event)", quote(method))
                } else {
                    format!("event -> invokeController({})", quote(method))
                }
            }
            MethodInjection::Custom(custom) => {
                custom.handler_expr("this.controller", method, expects_event)
            }
        })
    }

    fn emit_node(&mut self, node: &Node) -> Result<Emitted, CompileError> {
        match node {
            Node::Text(text) => {
                Ok(Emitted { expr: quote(text), ty: "java.lang.String".into() })
            }
            Node::Object(object) => self.emit_object(object),
            Node::Value(value) => self.emit_value(value),
            Node::Constant(constant) => self.emit_constant(constant),
            Node::Factory(factory) => self.emit_factory(factory),
            Node::Include(include) => self.emit_include(include),
            Node::Define(inner) => self.emit_node(inner),
            Node::Reference(reference) => {
                let entry = self
                    .ctx
                    .lookup(&reference.source)
                    .ok_or_else(|| CompileError::UnknownId(reference.source.clone()))?;
                Ok(Emitted { expr: entry.variable.to_string(), ty: entry.declared_type.clone() })
            }
            Node::Copy(copy) => {
                let registered = self
                    .ctx
                    .lookup(&copy.source)
                    .ok_or_else(|| CompileError::UnknownId(copy.source.clone()))?
                    .node
                    .clone();
                // A fresh construction of the referenced node, not an alias:
                // replay its emission with the id stripped so it is neither
                // re-registered nor re-wired.
                self.emit_node(&strip_id(registered))
            }
        }
    }

    fn emit_value(&mut self, value: &ValueNode) -> Result<Emitted, CompileError> {
        self.register.find_class(&value.type_name)?;
        self.value_touches_controller = false;
        let expr = literals::coerce(self, &value.value, &value.type_name)?;
        let touches = self.value_touches_controller;
        match value.fx_id.as_ref() {
            Some(id) => {
                let var = self.ctx.next_variable("object");
                let ty_text = self.ctx.import(&value.type_name);
                let statement = self.local_decl(&ty_text, &var, &expr);
                self.emit_guarded(statement, touches);
                self.register_id(id, &var, &value.type_name, Node::Value(value.clone()))?;
                Ok(Emitted { expr: var.to_string(), ty: value.type_name.clone() })
            }
            None => Ok(Emitted { expr, ty: value.type_name.clone() }),
        }
    }

    fn emit_constant(&mut self, constant: &ConstantNode) -> Result<Emitted, CompileError> {
        self.register.find_class(&constant.type_name)?;
        let name = self.ctx.import(&constant.type_name);
        let expr = format!("{name}.{}", constant.constant);
        match constant.fx_id.as_ref() {
            Some(id) => {
                let var = self.ctx.next_variable("object");
                let ty_text = self.ctx.import(&constant.type_name);
                let statement = self.local_decl(&ty_text, &var, &expr);
                self.ctx.push(statement);
                self.register_id(id, &var, &constant.type_name, Node::Constant(constant.clone()))?;
                Ok(Emitted { expr: var.to_string(), ty: constant.type_name.clone() })
            }
            None => Ok(Emitted { expr, ty: constant.type_name.clone() }),
        }
    }

    fn emit_factory(&mut self, factory: &FactoryNode) -> Result<Emitted, CompileError> {
        self.register.find_class(&factory.type_name)?;
        let arguments = factory
            .arguments
            .iter()
            .map(|argument| self.emit_node(argument))
            .collect::<Result<Vec<_>, _>>()?;
        let shape: ArgShape = arguments.iter().map(|a| Some(a.ty.clone())).collect();
        let method = self.register.static_method(&factory.type_name, &factory.method, &shape)?;
        let owner = self.ctx.import(&factory.type_name);
        let call =
            format!("{owner}.{}({})", factory.method, arguments.iter().map(|a| &a.expr).join(", "));
        let var = self.ctx.next_variable("object");
        let ty = method.return_type.clone();
        let ty_text = self.ctx.import(&ty);
        let statement = self.local_decl(&ty_text, &var, &call);
        self.ctx.push(statement);
        if let Some(id) = factory.fx_id.as_ref() {
            self.register_id(id, &var, &ty, Node::Factory(factory.clone()))?;
        }
        Ok(Emitted { expr: var.to_string(), ty })
    }

    fn emit_object(&mut self, object: &ObjectNode) -> Result<Emitted, CompileError> {
        self.register.find_class(&object.type_name)?;
        let constructor = self.register.constructor_parameters(&object.type_name)?;

        // Out-of-band definitions go first so that value expressions in this
        // element can already reference their ids.
        for definition in &object.definitions {
            self.emit_node(definition)?;
        }

        let var = self.ctx.next_variable("object");
        let simple = self.ctx.import(&object.type_name);

        // A generic destination type takes the type arguments recorded in
        // the controller field metadata; without metadata it degrades to the
        // raw type.
        let mut declared = simple.clone();
        let mut construction_args = String::new();
        if self.register.is_generic(&object.type_name) {
            let field = object
                .fx_id
                .as_ref()
                .and_then(|id| self.controller.and_then(|info| info.fields.get(id)))
                .cloned();
            if let Some(field) = field {
                if field.generic_args.is_empty() {
                    log::warn!(
                        "field '{}' has no generic metadata, '{}' stays a raw type",
                        field.name,
                        object.type_name
                    );
                } else {
                    let formatted = field
                        .generic_args
                        .iter()
                        .map(|arg| self.format_generic(arg))
                        .collect::<Vec<_>>()
                        .join(", ");
                    declared = format!("{simple}<{formatted}>");
                    construction_args = match self.config.target {
                        TargetRelease::Java8 => "<>".to_owned(),
                        // `var` must not erase the arguments to Object.
                        TargetRelease::Java11 => format!("<{formatted}>"),
                    };
                }
            }
        }

        let mut consumed: Vec<SmolStr> = Vec::new();
        let construction = match &constructor {
            ConstructorShape::NoArg => format!("new {simple}{construction_args}()"),
            ConstructorShape::Named(ctor) => {
                self.value_touches_controller = false;
                let mut arguments = Vec::with_capacity(ctor.params.len());
                for param in &ctor.params {
                    let name = param.name.as_ref().expect("named constructor");
                    let attribute = object
                        .attributes
                        .iter()
                        .find(|a| a.source_type.is_none() && a.name == *name);
                    let argument = match (attribute, &param.default) {
                        (Some(attribute), _) => {
                            consumed.push(attribute.name.clone());
                            literals::coerce(self, &attribute.value, &param.ty)?
                        }
                        (None, Some(default)) => literals::coerce(self, default, &param.ty)?,
                        (None, None) => zero_value(&param.ty).to_owned(),
                    };
                    arguments.push(argument);
                }
                if self.value_touches_controller && self.is_factory() {
                    return Err(CompileError::InvalidConfiguration(
                        "a constructor argument needs the controller, which the factory \
                         strategy only creates after the object tree"
                            .into(),
                    ));
                }
                format!("new {simple}{construction_args}({})", arguments.join(", "))
            }
        };
        let statement = self.local_decl(&declared, &var, &construction);
        self.ctx.push(statement);

        for attribute in &object.attributes {
            if attribute.source_type.is_none() && consumed.contains(&attribute.name) {
                continue;
            }
            self.emit_attribute(&var, &object.type_name, attribute)?;
        }

        for property in &object.properties {
            let children = property
                .children
                .iter()
                .map(|child| self.emit_node(child))
                .collect::<Result<Vec<_>, _>>()?;
            let name = if property.name.is_empty() {
                self.register
                    .default_property(&object.type_name)
                    .ok_or_else(|| CompileError::NoDefaultProperty(object.type_name.clone()))?
            } else {
                property.name.clone()
            };
            self.emit_containment(&var, &object.type_name, &name, &children)?;
        }

        if let Some(id) = object.fx_id.as_ref() {
            self.register_id(id, &var, &object.type_name, Node::Object(object.clone()))?;
        }
        Ok(Emitted { expr: var.to_string(), ty: object.type_name.clone() })
    }

    fn emit_attribute(
        &mut self,
        var: &SmolStr,
        class: &SmolStr,
        attribute: &Attribute,
    ) -> Result<(), CompileError> {
        // Statically scoped properties (`GridPane.rowIndex`) go through the
        // owner's static setter, with this element as the first argument.
        if attribute.source_type.is_some() || attribute.name.contains('.') {
            let (owner, property) = match &attribute.source_type {
                Some(owner) => (owner.clone(), attribute.name.clone()),
                None => {
                    let (owner, property) = attribute.name.rsplit_once('.').expect("dotted");
                    (SmolStr::from(owner), SmolStr::from(property))
                }
            };
            let setter = lookup::setter_name(&property);
            let shape: ArgShape = vec![None, None];
            let method = self.register.static_method(&owner, &setter, &shape)?;
            self.value_touches_controller = false;
            let value = literals::coerce(self, &attribute.value, &method.params[1].ty)?;
            let touches = self.value_touches_controller;
            let owner_name = self.ctx.import(&owner);
            let statement = format!("{owner_name}.{setter}({var}, {value});");
            self.emit_guarded(statement, touches);
            return Ok(());
        }

        let raw = attribute.value.as_str();
        let setter = lookup::setter_name(&attribute.name);

        // `#handler`: wire the controller method per the method strategy.
        if let Some(handler) = raw.strip_prefix('#') {
            self.register.instance_method(class, &setter, &vec![None])?;
            let expr = self.handler_expr(handler)?;
            self.emit_wiring(format!("{var}.{setter}({expr});"));
            return Ok(());
        }

        // `${base.property}`: bind instead of set.
        if let Some(inner) = raw.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
            let method = self.register.instance_method(class, &setter, &vec![None])?;
            let value_ty = method.params[0].ty.clone();
            let scope = self.scope();
            let source = lookup::resolve_binding_source(&scope, inner)?;
            let touches = scope.used_controller.get();
            let binding = self.ctx.next_variable("binding");
            let declaration = match self.config.target {
                TargetRelease::Java8 => {
                    let observable = self.ctx.import("javafx.beans.value.ObservableValue");
                    let arg = self.observable_arg(&value_ty);
                    format!("{observable}<? extends {arg}> {binding} = {source};")
                }
                TargetRelease::Java11 => format!("var {binding} = {source};"),
            };
            let bind = format!(
                "{var}.{}().bind({binding});",
                lookup::property_method_name(&attribute.name)
            );
            if touches && self.is_factory() {
                self.ctx.defer(declaration);
                self.ctx.defer(bind);
            } else {
                self.ctx.push(declaration);
                self.ctx.push(bind);
            }
            return Ok(());
        }

        // `$expr`: a resolved value expression; everything else is coerced
        // against the setter's parameter type.
        let (value, argument_ty, touches) = if let Some(expr) = raw.strip_prefix('$') {
            let scope = self.scope();
            let code = lookup::resolve_value(&scope, expr)?;
            let touches = scope.used_controller.get();
            let ty = (!expr.contains('.'))
                .then(|| self.ctx.lookup(expr).map(|entry| entry.declared_type.clone()))
                .flatten();
            (code, ty, touches)
        } else {
            let method = self.register.instance_method(class, &setter, &vec![None])?;
            self.value_touches_controller = false;
            let code = literals::coerce(self, raw, &method.params[0].ty)?;
            (code, Some(method.params[0].ty.clone()), self.value_touches_controller)
        };
        let shape: ArgShape = vec![argument_ty];
        self.register.instance_method(class, &setter, &shape)?;
        let statement = format!("{var}.{setter}({value});");
        self.emit_guarded(statement, touches);
        Ok(())
    }

    /// The observable's type argument for a binding declaration: boxed for
    /// primitives, because that is what the property classes implement.
    fn observable_arg(&mut self, ty: &str) -> String {
        use crate::langtype::*;
        if is_integral(ty) || is_floating(ty) {
            "Number".to_owned()
        } else if is_boolean(ty) {
            "Boolean".to_owned()
        } else if is_char(ty) {
            "Character".to_owned()
        } else if is_string(ty) {
            "String".to_owned()
        } else {
            self.ctx.import(ty)
        }
    }

    /// Attach the children of one complex property: a single child through
    /// the property setter, several through the aggregation getter.
    fn emit_containment(
        &mut self,
        var: &SmolStr,
        class: &SmolStr,
        property: &str,
        children: &[Emitted],
    ) -> Result<(), CompileError> {
        let setter = lookup::setter_name(property);
        if let [child] = children {
            let shape: ArgShape = vec![Some(child.ty.clone())];
            if self.register.has_instance_method(class, &setter, &shape) {
                self.ctx.push(format!("{var}.{setter}({});", child.expr));
                return Ok(());
            }
        }
        let getter = lookup::getter_name(property);
        if self.register.has_instance_method(class, &getter, &Vec::new()) {
            for child in children {
                self.ctx.push(format!("{var}.{getter}().add({});", child.expr));
            }
            return Ok(());
        }
        Err(CompileError::InvalidChildren { class: class.clone(), property: property.into() })
    }

    /// Instantiate a nested generated unit and wire its root node and
    /// controller into the parent.
    fn emit_include(&mut self, include: &IncludeNode) -> Result<Emitted, CompileError> {
        let child = self
            .source
            .include_for(&include.source)
            .ok_or_else(|| CompileError::UnknownIncludeSource(include.source.clone()))?;
        let generated = self
            .config
            .generated_names
            .get(&include.source)
            .cloned()
            .unwrap_or_else(|| child.generated_class.clone());
        let class = self.ctx.import(&generated);

        // The bundle map is augmented (copy, then insert) when the include
        // declares its own bundle, so sibling includes stay unaffected.
        let bundles_expr = match (&include.resources, &child.controller_class) {
            (Some(resources), Some(controller_class)) => {
                let map = self.ctx.next_variable("bundles");
                let bundle = self.ctx.import("java.util.ResourceBundle");
                let declaration = self.map_decl(&map, "String", &bundle, "this.bundles");
                self.ctx.push(declaration);
                self.ctx.push(format!(
                    "{map}.put({}, {bundle}.getBundle({}));",
                    quote(controller_class),
                    quote(resources)
                ));
                map.to_string()
            }
            (Some(_), None) => {
                log::warn!(
                    "include '{}' declares resources but has no controller to key them by",
                    include.source
                );
                "this.bundles".to_owned()
            }
            (None, _) => "this.bundles".to_owned(),
        };

        let unit = self.ctx.next_variable("include");
        let construction = format!("new {class}(this.controllers, {bundles_expr})");
        let statement = self.local_decl(&class, &unit, &construction);
        self.ctx.push(statement);

        let var = self.ctx.next_variable("object");
        let parent_ty = SmolStr::from("javafx.scene.Parent");
        let parent = self.ctx.import(&parent_ty);
        let statement = self.local_decl(&parent, &var, &format!("{unit}.load()"));
        self.ctx.push(statement);

        if let Some(id) = &include.fx_id {
            self.register_id(id, &var, &parent_ty, Node::Include(include.clone()))?;
            // The sub-controller is injected like any instance-valued
            // controller field, through the parent's field strategy.
            if let Some(controller_class) = &child.controller_class {
                let field_name = smol_str::format_smolstr!("{id}Controller");
                if let Some(field) =
                    self.controller.and_then(|info| info.fields.get(&field_name)).cloned()
                {
                    let controller_var = self.ctx.next_variable("controller");
                    let ty_text = self.ctx.import(controller_class);
                    let statement =
                        self.local_decl(&ty_text, &controller_var, &format!("{unit}.getController()"));
                    self.ctx.push(statement);
                    self.inject_field(&field, controller_var.as_str());
                }
            }
        }
        Ok(Emitted { expr: var.to_string(), ty: parent_ty })
    }

    /// A `LinkedHashMap` declaration; the target release moves the type
    /// arguments between the declaration and the constructor.
    fn map_decl(&mut self, var: &str, key_ty: &str, value_ty: &str, init_from: &str) -> String {
        let map = self.ctx.import("java.util.Map");
        let linked = self.ctx.import("java.util.LinkedHashMap");
        match self.config.target {
            TargetRelease::Java8 => {
                format!("{map}<{key_ty}, {value_ty}> {var} = new {linked}<>({init_from});")
            }
            TargetRelease::Java11 => {
                format!("var {var} = new {linked}<{key_ty}, {value_ty}>({init_from});")
            }
        }
    }
}

fn zero_value(ty: &str) -> &'static str {
    use crate::langtype::*;
    if is_integral(ty) {
        "0"
    } else if is_floating(ty) {
        "0.0"
    } else if is_boolean(ty) {
        "false"
    } else if is_char(ty) {
        "' '"
    } else {
        "null"
    }
}

/// A clone of the node with its fx:id removed, used by `fx:copy` so the
/// repeated construction neither re-registers nor re-wires the id.
fn strip_id(node: Node) -> Node {
    match node {
        Node::Object(mut o) => {
            o.fx_id = None;
            Node::Object(o)
        }
        Node::Value(mut v) => {
            v.fx_id = None;
            Node::Value(v)
        }
        Node::Constant(mut c) => {
            c.fx_id = None;
            Node::Constant(c)
        }
        Node::Factory(mut f) => {
            f.fx_id = None;
            Node::Factory(f)
        }
        Node::Include(mut i) => {
            i.fx_id = None;
            Node::Include(i)
        }
        Node::Define(inner) => strip_id(*inner),
        other => other,
    }
}

/// Generate the Java source for one request.
pub fn generate(
    register: &TypeRegister,
    request: &GenerationRequest,
) -> Result<String, CompileError> {
    let config = &request.parameters;
    let controller = request.controller.as_ref();
    let injection = controller
        .and_then(|info| config.injection.get(&info.class_name).cloned())
        .unwrap_or_else(|| config.default_injection.clone());

    let factory_fields = matches!(injection.fields, FieldInjection::Factory);
    let factory_kind = matches!(injection.kind, ControllerKind::Factory);
    if factory_fields != factory_kind {
        return Err(CompileError::InvalidConfiguration(
            "the factory field-injection strategy and the factory controller kind \
             must be selected together"
                .into(),
        ));
    }
    if factory_kind && controller.is_none() {
        return Err(CompileError::InvalidConfiguration(
            "the factory controller kind needs a controller class".into(),
        ));
    }
    if config.bundle == BundleInjection::GlobalLoad && config.default_bundle.is_none() {
        return Err(CompileError::InvalidConfiguration(
            "the global-load bundle strategy needs a default bundle name".into(),
        ));
    }

    let mut emitter = JavaEmitter {
        register,
        config,
        controller,
        source: &request.source,
        injection,
        ctx: GenerationContext::new(),
        value_touches_controller: false,
        used_reflection_field: false,
        used_reflection_method: false,
    };

    let root = emitter.emit_node(&request.root)?;
    Ok(assemble(emitter, request, root))
}

/// Wrap the emitted statements into the class scaffolding, in fixed order:
/// fields, constructors, the load method, helper methods, the controller
/// accessor.
fn assemble(mut emitter: JavaEmitter, request: &GenerationRequest, root: Emitted) -> String {
    use java_ast::*;

    let config = emitter.config;
    let controller = emitter.controller;
    let factory = emitter.is_factory();
    let has_resources_field = config.bundle != BundleInjection::Getter;

    let map = emitter.ctx.import("java.util.Map");
    let linked = emitter.ctx.import("java.util.LinkedHashMap");
    let bundle = emitter.ctx.import("java.util.ResourceBundle");
    let controller_ty = controller.map(|info| emitter.ctx.import(&info.class_name));
    let controller_key = controller.map(|info| quote(&info.class_name));
    let root_ty = emitter.ctx.import(&root.ty);

    let (unit_package, unit_class) = match request.unit_name.rsplit_once('.') {
        Some((package, class)) => (Some(package.to_owned()), class.to_owned()),
        None => (None, request.unit_name.to_string()),
    };

    let mut members = Vec::new();

    members.push(Declaration::Var(Var {
        modifiers: "private final".into(),
        ty: format!("{map}<String, Object>"),
        name: "controllers".into(),
    }));
    members.push(Declaration::Var(Var {
        modifiers: "private final".into(),
        ty: format!("{map}<String, {bundle}>"),
        name: "bundles".into(),
    }));
    if factory {
        let function = emitter.ctx.import("java.util.function.Function");
        members.push(Declaration::Var(Var {
            modifiers: "private final".into(),
            ty: format!("{function}<{map}<String, Object>, Object>"),
            name: "controllerFactory".into(),
        }));
    }
    if let Some(ty) = &controller_ty {
        members.push(Declaration::Var(Var {
            modifiers: "private".into(),
            ty: ty.clone(),
            name: "controller".into(),
        }));
    }
    if has_resources_field {
        members.push(Declaration::Var(Var {
            modifiers: "private".into(),
            ty: bundle.clone(),
            name: "resources".into(),
        }));
    }
    members.push(Declaration::Var(Var {
        modifiers: "private".into(),
        ty: "boolean".into(),
        name: "loaded".into(),
    }));

    // The public constructor, shaped by the controller kind and the bundle
    // strategy.
    {
        let mut params = Vec::new();
        let mut statements = vec![
            format!("this.controllers = new {linked}<>();"),
            format!("this.bundles = new {linked}<>();"),
        ];
        if factory {
            let function = emitter.ctx.import("java.util.function.Function");
            params.push(format!("{function}<{map}<String, Object>, Object> controllerFactory"));
            statements.push("this.controllerFactory = controllerFactory;".into());
        } else if let Some(ty) = &controller_ty {
            params.push(format!("{ty} controller"));
            statements.push("this.controller = controller;".into());
            statements.push(format!(
                "this.controllers.put({}, controller);",
                controller_key.as_ref().unwrap()
            ));
        }
        match config.bundle {
            BundleInjection::Constructor => {
                params.push(format!("{bundle} resources"));
                statements.push("this.resources = resources;".into());
            }
            BundleInjection::ConstructorFunction => {
                let supplier = emitter.ctx.import("java.util.function.Supplier");
                params.push(format!("{supplier}<{bundle}> resources"));
                statements.push("this.resources = resources.get();".into());
            }
            BundleInjection::ConstructorName => {
                params.push("String resourceBundleName".into());
                statements
                    .push(format!("this.resources = {bundle}.getBundle(resourceBundleName);"));
            }
            BundleInjection::GlobalLoad => {
                let name = config.default_bundle.as_ref().expect("validated");
                statements.push(format!("this.resources = {bundle}.getBundle({});", quote(name)));
            }
            BundleInjection::Getter => {}
        }
        if has_resources_field {
            if let Some(key) = &controller_key {
                statements.push(format!("this.bundles.put({key}, this.resources);"));
            }
        }
        members.push(Declaration::Function(Function {
            modifiers: "public".into(),
            return_type: String::new(),
            name: unit_class.clone(),
            signature: format!("({})", params.join(", ")),
            statements,
        }));
    }

    // The pass-through constructor used by fx:include sites.
    {
        let mut statements = vec![
            "this.controllers = controllers;".into(),
            "this.bundles = bundles;".into(),
        ];
        if factory {
            statements.push("this.controllerFactory = null;".into());
        }
        if let (Some(ty), Some(key)) = (&controller_ty, &controller_key) {
            statements.push(format!("Object existing = controllers.get({key});"));
            statements.push(format!(
                "this.controller = existing != null ? ({ty}) existing : new {ty}();"
            ));
        }
        if has_resources_field {
            let fallback = match &config.default_bundle {
                Some(name) => format!("{bundle}.getBundle({})", quote(name)),
                None => "null".to_owned(),
            };
            match &controller_key {
                Some(key) => statements
                    .push(format!("this.resources = bundles.getOrDefault({key}, {fallback});")),
                None => statements.push(format!("this.resources = {fallback};")),
            }
        }
        members.push(Declaration::Function(Function {
            modifiers: String::new(),
            return_type: String::new(),
            name: unit_class.clone(),
            signature: format!("({map}<String, Object> controllers, {map}<String, {bundle}> bundles)"),
            statements,
        }));
    }

    // The load method: the whole tree emission, then the deferred
    // post-construction actions, then the lifecycle initializer.
    {
        let mut statements = Vec::new();
        if factory {
            statements.push(format!(
                "{map}<String, Object> controllerFields = new {linked}<>();"
            ));
        }
        statements.append(&mut emitter.ctx.body);
        if factory {
            statements.push("if (this.controller == null) {".into());
            statements.push("this.controller = createController(controllerFields);".into());
            statements.push("}".into());
        }
        statements.append(&mut emitter.ctx.deferred);
        if controller.is_some_and(|info| info.has_initialize) {
            statements.push("this.controller.initialize();".into());
        }
        statements.push("this.loaded = true;".into());
        statements.push(format!("return {};", root.expr));
        members.push(Declaration::Function(Function {
            modifiers: "public".into(),
            return_type: root_ty,
            name: "load".into(),
            signature: "()".into(),
            statements,
        }));
    }

    if emitter.used_reflection_field {
        members.push(Declaration::Function(Function {
            modifiers: "private static".into(),
            return_type: "void".into(),
            name: "injectField".into(),
            signature: "(Object target, String name, Object value)".into(),
            statements: vec![
                "try {".into(),
                "java.lang.reflect.Field field = target.getClass().getDeclaredField(name);".into(),
                "field.setAccessible(true);".into(),
                "field.set(target, value);".into(),
                "} catch (ReflectiveOperationException exception) {".into(),
                "throw new RuntimeException(\"Cannot inject field \" + name, exception);".into(),
                "}".into(),
            ],
        }));
    }
    if emitter.used_reflection_method {
        members.push(Declaration::Function(Function {
            modifiers: "private".into(),
            return_type: "void".into(),
            name: "invokeController".into(),
            signature: "(String name, Object... args)".into(),
            statements: vec![
                "for (java.lang.reflect.Method method : this.controller.getClass().getDeclaredMethods()) {".into(),
                "if (method.getName().equals(name) && method.getParameterCount() == args.length) {".into(),
                "try {".into(),
                "method.setAccessible(true);".into(),
                "method.invoke(this.controller, args);".into(),
                "return;".into(),
                "} catch (ReflectiveOperationException exception) {".into(),
                "throw new RuntimeException(\"Cannot invoke handler \" + name, exception);".into(),
                "}".into(),
                "}".into(),
                "}".into(),
                "throw new IllegalStateException(\"No handler \" + name + \" taking \" + args.length + \" argument(s)\");".into(),
            ],
        }));
    }
    if factory {
        let ty = controller_ty.clone().expect("validated");
        members.push(Declaration::Function(Function {
            modifiers: "private".into(),
            return_type: ty.clone(),
            name: "createController".into(),
            signature: format!("({map}<String, Object> fields)"),
            statements: vec![format!("return ({ty}) this.controllerFactory.apply(fields);")],
        }));
    }

    if let Some(ty) = &controller_ty {
        members.push(Declaration::Function(Function {
            modifiers: "public".into(),
            return_type: ty.clone(),
            name: "getController".into(),
            signature: "()".into(),
            statements: vec![
                "if (!this.loaded) {".into(),
                "throw new IllegalStateException(\"load() has not been called yet\");".into(),
                "}".into(),
                "return this.controller;".into(),
            ],
        }));
    }

    let file = File {
        header: vec![
            "Generated by the FXML compiler, do not edit.".to_owned(),
            format!("Source: {}", request.source.source_key),
        ],
        package: unit_package,
        imports: emitter.ctx.import_lines(),
        class: Class { name: unit_class, members },
    };
    CodeFormatter::format(&file.to_string())
}
