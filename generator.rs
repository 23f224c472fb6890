// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

/*!
The module responsible for the code generation.

[`GenerationContext`] is the mutable, request-scoped state threaded through
the whole tree walk: variable counters, the id map, the deferred
post-construction actions and the statement buffer. It is created per
request and never shared, so concurrent generations stay independent. The
strategy enums configuring the generated code shapes live here too.
*/

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use smol_str::{format_smolstr, SmolStr};

use crate::diagnostics::CompileError;
use crate::object_tree::Node;

pub mod java;

/// How controller fields are written by generated code.
///
/// The built-in set is closed; `Custom` is the escape hatch for an
/// externally supplied strategy. All dispatch happens in a single match per
/// use site.
#[derive(Debug, Clone)]
pub enum FieldInjection {
    /// `controller.field = value;` — fields must be accessible.
    Assign,
    /// Field values are collected into a map handed to the controller
    /// factory; anything touching the controller afterwards is deferred
    /// until the factory ran.
    Factory,
    /// `injectField(controller, "field", value);` through the generated
    /// reflection helper.
    Reflection,
    /// `controller.setField(value);`
    Setters,
    Custom(Arc<dyn FieldInjector>),
}

impl FieldInjection {
    /// The closed built-in set, in a fixed order usable for exhaustive
    /// strategy-matrix tests.
    pub fn builtin() -> [FieldInjection; 4] {
        [Self::Assign, Self::Factory, Self::Reflection, Self::Setters]
    }
}

impl std::fmt::Display for FieldInjection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Assign => write!(f, "assign"),
            Self::Factory => write!(f, "factory"),
            Self::Reflection => write!(f, "reflection"),
            Self::Setters => write!(f, "setters"),
            Self::Custom(custom) => write!(f, "{}", custom.name()),
        }
    }
}

impl std::str::FromStr for FieldInjection {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assign" => Ok(Self::Assign),
            "factory" => Ok(Self::Factory),
            "reflection" => Ok(Self::Reflection),
            "setters" => Ok(Self::Setters),
            _ => Err(format!("Unknown field-injection strategy {s}")),
        }
    }
}

/// An externally supplied field-injection strategy.
pub trait FieldInjector: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;
    /// The statement storing `value` into the controller property `field`.
    fn field_statement(&self, controller: &str, field: &str, value: &str) -> String;
}

/// How event-handler references are wired to controller methods.
#[derive(Debug, Clone)]
pub enum MethodInjection {
    /// A lambda calling the controller method directly; its arity follows
    /// the handler's expects-event flag.
    Reference,
    /// A call through the generated helper that resolves the method at run
    /// time by name and argument count.
    Reflection,
    Custom(Arc<dyn HandlerBinder>),
}

impl MethodInjection {
    pub fn builtin() -> [MethodInjection; 2] {
        [Self::Reference, Self::Reflection]
    }
}

impl std::fmt::Display for MethodInjection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reference => write!(f, "reference"),
            Self::Reflection => write!(f, "reflection"),
            Self::Custom(custom) => write!(f, "{}", custom.name()),
        }
    }
}

impl std::str::FromStr for MethodInjection {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reference" => Ok(Self::Reference),
            "reflection" => Ok(Self::Reflection),
            _ => Err(format!("Unknown method-injection strategy {s}")),
        }
    }
}

/// An externally supplied handler-wiring strategy.
pub trait HandlerBinder: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;
    /// The expression passed to the `setOn…` setter.
    fn handler_expr(&self, controller: &str, method: &str, expects_event: bool) -> String;
}

/// How the generated class obtains its resource bundle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
pub enum BundleInjection {
    /// The bundle is a constructor parameter.
    Constructor,
    /// A zero-argument callable producing the bundle is a constructor
    /// parameter.
    ConstructorFunction,
    /// The bundle base name is a constructor parameter and the bundle is
    /// loaded in the constructor.
    ConstructorName,
    /// The bundle is loaded in the constructor from the configured default
    /// base name.
    GlobalLoad,
    /// No bundle state at all: every use site re-derives the bundle from
    /// the controller's getter.
    Getter,
}

/// How the controller instance comes into existence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ControllerKind {
    /// A ready-made instance is passed to the constructor.
    Instance,
    /// A factory function is passed to the constructor and invoked in
    /// `load()` once all field values are collected.
    Factory,
}

/// Target language level; this only selects syntactic sugar, never
/// different semantics or statement order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
pub enum TargetRelease {
    /// Locals are declared with their full type.
    Java8,
    /// Locals use `var` where the initializer spells the type anyway.
    Java11,
}

/// Injection configuration for one controller class.
#[derive(Debug, Clone)]
pub struct InjectionConfig {
    pub fields: FieldInjection,
    pub methods: MethodInjection,
    pub kind: ControllerKind,
}

impl Default for InjectionConfig {
    fn default() -> Self {
        Self {
            fields: FieldInjection::Assign,
            methods: MethodInjection::Reference,
            kind: ControllerKind::Instance,
        }
    }
}

/// What [`GenerationContext::register`] records for a markup id.
#[derive(Debug, Clone)]
pub struct RegisteredId {
    pub variable: SmolStr,
    /// Fully qualified declared type of the variable.
    pub declared_type: SmolStr,
    /// The node itself, kept for `fx:copy` and dotted-expression
    /// resolution.
    pub node: Node,
}

/// The request-scoped state of one generation.
#[derive(Default)]
pub struct GenerationContext {
    counters: HashMap<SmolStr, u32>,
    ids: HashMap<SmolStr, RegisteredId>,
    /// Statements of the load method, in traversal order.
    pub body: Vec<String>,
    /// Post-construction actions: statements that must run only once the
    /// controller exists (factory controller kind).
    pub deferred: Vec<String>,
    /// simple name → qualified name of everything imported so far.
    imports: BTreeMap<SmolStr, SmolStr>,
}

impl GenerationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// `prefix0`, `prefix1`, … — strictly increasing per prefix, never
    /// reset or reused within a request.
    pub fn next_variable(&mut self, prefix: &str) -> SmolStr {
        let counter = self.counters.entry(prefix.into()).or_insert(0);
        let name = format_smolstr!("{prefix}{counter}");
        *counter += 1;
        name
    }

    /// Record the variable and declared type for a markup id. Must be
    /// called exactly once per id, before anything references it.
    pub fn register(
        &mut self,
        id: &SmolStr,
        variable: SmolStr,
        declared_type: SmolStr,
        node: Node,
    ) -> Result<(), CompileError> {
        if self.ids.contains_key(id) {
            return Err(CompileError::DuplicateId(id.clone()));
        }
        self.ids.insert(id.clone(), RegisteredId { variable, declared_type, node });
        Ok(())
    }

    pub fn lookup(&self, id: &str) -> Option<&RegisteredId> {
        self.ids.get(id)
    }

    pub fn push(&mut self, statement: String) {
        self.body.push(statement);
    }

    pub fn defer(&mut self, statement: String) {
        self.deferred.push(statement);
    }

    /// Record `qualified` for the import block and return the name to use
    /// in source: the simple name, or the qualified one on a simple-name
    /// clash. Primitives and `java.lang` types never produce an import.
    pub fn import(&mut self, qualified: &str) -> String {
        if !qualified.contains('.') {
            return qualified.to_owned();
        }
        let simple = SmolStr::from(crate::langtype::simple_name(qualified));
        if let Some(existing) = self.imports.get(&simple) {
            if existing != qualified {
                return qualified.to_owned();
            }
            return simple.to_string();
        }
        // java.lang types claim the simple name without producing an import
        // line; import_lines filters them out.
        self.imports.insert(simple.clone(), qualified.into());
        simple.to_string()
    }

    /// The import declarations, sorted by qualified name.
    pub fn import_lines(&self) -> Vec<String> {
        let mut qualified: Vec<&SmolStr> = self
            .imports
            .values()
            .filter(|q| !q.starts_with("java.lang."))
            .collect();
        qualified.sort();
        qualified.iter().map(|q| format!("import {q};")).collect()
    }
}
