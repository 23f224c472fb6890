// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

//! Type lookup against the component library metadata.
//!
//! The emitter never inspects metadata records directly: everything goes
//! through [`TypeRegister`], which answers the member/constructor/conversion
//! queries and memoizes every answer in process-wide concurrent maps. The
//! build tool runs one generation per document on its worker threads, so the
//! register is shared and the caches must take concurrent read/insert;
//! entries are pure functions of (class, query) and are never invalidated.

use std::sync::Arc;

use dashmap::DashMap;
use smol_str::SmolStr;

use crate::diagnostics::{CompileError, MemberKind};
use crate::langtype::{ClassMeta, MethodMeta};

/// An argument shape for member lookup: one entry per argument, `None` for a
/// wildcard that matches any parameter type.
pub type ArgShape = Vec<Option<SmolStr>>;

/// The declarative source of component library metadata.
///
/// The emission algorithm depends only on this interface. A build tool may
/// back it by tables extracted ahead of time (the normal case, see
/// [`MetadataBuilder`]) or by an adapter over live reflection where the host
/// supports it.
pub trait TypeProvider: Send + Sync {
    /// Look up a class by fully qualified name.
    fn class(&self, name: &str) -> Option<Arc<ClassMeta>>;

    /// Whether a value of type `from` can be passed where `to` is declared.
    ///
    /// The default implementation accepts identical names and walks the
    /// `supers` chain of `from`; `java.lang.Object` accepts every class the
    /// provider knows about.
    fn is_assignable(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }
        let Some(from_meta) = self.class(from) else { return false };
        if to == "java.lang.Object" {
            return true;
        }
        let mut pending: Vec<SmolStr> = from_meta.supers.clone();
        while let Some(name) = pending.pop() {
            if name == to {
                return true;
            }
            if let Some(meta) = self.class(&name) {
                pending.extend(meta.supers.iter().cloned());
            }
        }
        false
    }
}

/// How an element's class is constructed, as resolved from the constructor
/// metadata.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstructorShape {
    /// Plain zero-argument construction.
    NoArg,
    /// A constructor whose parameters are all named; arguments come from
    /// markup attributes matching the parameter names, falling back to the
    /// recorded defaults.
    Named(Arc<MethodMeta>),
}

/// The memoizing resolver in front of a [`TypeProvider`].
pub struct TypeRegister {
    provider: Arc<dyn TypeProvider>,
    class_cache: DashMap<SmolStr, Option<Arc<ClassMeta>>>,
    method_cache: DashMap<(SmolStr, SmolStr, ArgShape), Result<Arc<MethodMeta>, CompileError>>,
    static_method_cache:
        DashMap<(SmolStr, SmolStr, ArgShape), Result<Arc<MethodMeta>, CompileError>>,
    conversion_cache: DashMap<SmolStr, bool>,
    generic_cache: DashMap<SmolStr, bool>,
    default_property_cache: DashMap<SmolStr, Option<SmolStr>>,
    constructor_cache: DashMap<SmolStr, Result<ConstructorShape, CompileError>>,
}

impl TypeRegister {
    pub fn new(provider: Arc<dyn TypeProvider>) -> Self {
        Self {
            provider,
            class_cache: DashMap::new(),
            method_cache: DashMap::new(),
            static_method_cache: DashMap::new(),
            conversion_cache: DashMap::new(),
            generic_cache: DashMap::new(),
            default_property_cache: DashMap::new(),
            constructor_cache: DashMap::new(),
        }
    }

    pub fn provider(&self) -> &Arc<dyn TypeProvider> {
        &self.provider
    }

    fn cached_class(&self, name: &str) -> Option<Arc<ClassMeta>> {
        if let Some(hit) = self.class_cache.get(name) {
            return hit.value().clone();
        }
        log::trace!("type cache miss: {name}");
        let meta = self.provider.class(name);
        self.class_cache.insert(name.into(), meta.clone());
        meta
    }

    pub fn find_class(&self, name: &str) -> Result<Arc<ClassMeta>, CompileError> {
        self.cached_class(name).ok_or_else(|| CompileError::UnresolvedClass(name.into()))
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.cached_class(name).is_some()
    }

    pub fn is_assignable(&self, from: &str, to: &str) -> bool {
        self.provider.is_assignable(from, to)
    }

    /// Resolve an instance method, first by exact signature, then by the
    /// inexact arity/assignability search.
    pub fn instance_method(
        &self,
        class: &str,
        name: &str,
        shape: &ArgShape,
    ) -> Result<Arc<MethodMeta>, CompileError> {
        self.member(class, name, shape, false)
    }

    pub fn has_instance_method(&self, class: &str, name: &str, shape: &ArgShape) -> bool {
        self.instance_method(class, name, shape).is_ok()
    }

    /// Like [`Self::instance_method`] but over the static members.
    pub fn static_method(
        &self,
        class: &str,
        name: &str,
        shape: &ArgShape,
    ) -> Result<Arc<MethodMeta>, CompileError> {
        self.member(class, name, shape, true)
    }

    pub fn has_static_method(&self, class: &str, name: &str, shape: &ArgShape) -> bool {
        self.static_method(class, name, shape).is_ok()
    }

    fn member(
        &self,
        class: &str,
        name: &str,
        shape: &ArgShape,
        want_static: bool,
    ) -> Result<Arc<MethodMeta>, CompileError> {
        let cache = if want_static { &self.static_method_cache } else { &self.method_cache };
        let key = (SmolStr::from(class), SmolStr::from(name), shape.clone());
        if let Some(hit) = cache.get(&key) {
            return hit.value().clone();
        }
        let result = self.resolve_member(class, name, shape, want_static);
        cache.insert(key, result.clone());
        result
    }

    /// The class and its transitive supertypes, breadth first; member
    /// lookup walks this so inherited setters and getters resolve.
    fn class_chain(&self, class: &str) -> Vec<Arc<ClassMeta>> {
        let mut chain = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut pending = std::collections::VecDeque::new();
        pending.push_back(SmolStr::from(class));
        while let Some(name) = pending.pop_front() {
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some(meta) = self.cached_class(&name) {
                pending.extend(meta.supers.iter().cloned());
                chain.push(meta);
            }
        }
        chain
    }

    fn resolve_member(
        &self,
        class: &str,
        name: &str,
        shape: &ArgShape,
        want_static: bool,
    ) -> Result<Arc<MethodMeta>, CompileError> {
        self.find_class(class)?;
        let chain = self.class_chain(class);
        let methods = || {
            chain
                .iter()
                .flat_map(|meta| meta.methods.iter())
                .filter(|m| m.is_static == want_static && m.name == name)
        };

        // Exact pass: only for fully typed shapes, arity plus the very same
        // declared type for every argument. A shape with wildcards goes
        // straight to the inexact search so an ambiguity is not papered
        // over.
        if shape.iter().all(|arg| arg.is_some()) {
            if let Some(exact) = methods().find(|m| {
                m.params.len() == shape.len()
                    && m.params
                        .iter()
                        .zip(shape)
                        .all(|(p, arg)| arg.as_ref().is_some_and(|t| *t == p.ty))
            }) {
                return Ok(Arc::new(exact.clone()));
            }
        }

        // Inexact pass: same arity, every non-wildcard argument assignable.
        // An override lower in the chain shadows the identical signature
        // above it.
        let mut candidates: Vec<&MethodMeta> = Vec::new();
        for m in methods() {
            let compatible = m.params.len() == shape.len()
                && m.params
                    .iter()
                    .zip(shape)
                    .all(|(p, arg)| arg.as_ref().is_none_or(|t| self.is_assignable(t, &p.ty)));
            if compatible
                && !candidates.iter().any(|c| {
                    c.params.iter().map(|p| &p.ty).eq(m.params.iter().map(|p| &p.ty))
                })
            {
                candidates.push(m);
            }
        }

        let kind = if want_static { MemberKind::StaticMethod } else { MemberKind::Method };
        match candidates.as_slice() {
            [] => Err(CompileError::UnresolvedMember {
                class: class.into(),
                member: name.into(),
                kind,
                arity: shape.len(),
            }),
            [single] => Ok(Arc::new((*single).clone())),
            several => Err(CompileError::AmbiguousMember {
                class: class.into(),
                member: name.into(),
                kind,
                candidates: several
                    .iter()
                    .map(|m| {
                        let params: Vec<&str> = m.params.iter().map(|p| p.ty.as_str()).collect();
                        format!("({})", params.join(", "))
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    /// Whether the class exposes the conventional static string conversion.
    pub fn has_string_conversion(&self, class: &str) -> bool {
        if let Some(hit) = self.conversion_cache.get(class) {
            return *hit.value();
        }
        let result =
            self.cached_class(class).map(|meta| meta.has_string_conversion()).unwrap_or(false);
        self.conversion_cache.insert(class.into(), result);
        result
    }

    pub fn is_generic(&self, class: &str) -> bool {
        if let Some(hit) = self.generic_cache.get(class) {
            return *hit.value();
        }
        let result =
            self.cached_class(class).map(|meta| !meta.type_params.is_empty()).unwrap_or(false);
        self.generic_cache.insert(class.into(), result);
        result
    }

    /// The property receiving children declared without a property name,
    /// searched up the inheritance chain.
    pub fn default_property(&self, class: &str) -> Option<SmolStr> {
        if let Some(hit) = self.default_property_cache.get(class) {
            return hit.value().clone();
        }
        let mut result = None;
        let mut current = self.cached_class(class);
        while let Some(meta) = current {
            if meta.default_property.is_some() {
                result = meta.default_property.clone();
                break;
            }
            current = meta.supers.first().and_then(|s| self.cached_class(s));
        }
        self.default_property_cache.insert(class.into(), result.clone());
        result
    }

    /// Resolve how the class is constructed.
    ///
    /// Every constructor must name all of its parameters or none of them;
    /// mixing is a metadata error reported immediately. When several fully
    /// named constructors exist, the one with the most parameters wins (ties
    /// go to declaration order).
    pub fn constructor_parameters(&self, class: &str) -> Result<ConstructorShape, CompileError> {
        if let Some(hit) = self.constructor_cache.get(class) {
            return hit.value().clone();
        }
        let result = self.resolve_constructor(class);
        self.constructor_cache.insert(class.into(), result.clone());
        result
    }

    fn resolve_constructor(&self, class: &str) -> Result<ConstructorShape, CompileError> {
        let meta = self.find_class(class)?;
        let mut named: Option<&MethodMeta> = None;
        let mut has_no_arg = meta.constructors.is_empty();
        for ctor in &meta.constructors {
            let named_params = ctor.params.iter().filter(|p| p.name.is_some()).count();
            if named_params != 0 && named_params != ctor.params.len() {
                return Err(CompileError::MixedConstructorParameters(class.into()));
            }
            if ctor.params.is_empty() {
                has_no_arg = true;
            } else if named_params == ctor.params.len()
                && named.is_none_or(|best| ctor.params.len() > best.params.len())
            {
                named = Some(ctor);
            }
        }
        if let Some(ctor) = named {
            Ok(ConstructorShape::Named(Arc::new(ctor.clone())))
        } else if has_no_arg {
            Ok(ConstructorShape::NoArg)
        } else {
            Err(CompileError::NoConstructor(class.into()))
        }
    }
}

/// The language classes every metadata table knows without declaring them:
/// `Object` as the assignability sink, the primitive wrappers, and the
/// temporal types with dedicated parse forms. Built once per process.
static CORE_CLASSES: once_cell::sync::Lazy<std::collections::HashMap<SmolStr, Arc<ClassMeta>>> =
    once_cell::sync::Lazy::new(|| {
        let object: &[SmolStr] = &["java.lang.Object".into()];
        let number: &[SmolStr] = &["java.lang.Number".into()];
        let mut classes = std::collections::HashMap::new();
        let mut insert = |name: &str, supers: &[SmolStr]| {
            classes.insert(
                SmolStr::from(name),
                Arc::new(ClassMeta {
                    name: name.into(),
                    supers: supers.to_vec(),
                    ..Default::default()
                }),
            );
        };
        insert("java.lang.Object", &[]);
        insert("java.lang.String", object);
        insert("java.lang.Number", object);
        insert("java.lang.Boolean", object);
        insert("java.lang.Character", object);
        for wrapper in ["Byte", "Short", "Integer", "Long", "Float", "Double"] {
            insert(&format!("java.lang.{wrapper}"), number);
        }
        insert("java.time.LocalDate", object);
        insert("javafx.util.Duration", object);
        classes
    });

/// A provider backed by plain in-memory tables, assembled by
/// [`MetadataBuilder`]. Lookups fall back to the implicit core classes.
#[derive(Default)]
pub struct StaticTypeTable {
    classes: std::collections::HashMap<SmolStr, Arc<ClassMeta>>,
}

impl TypeProvider for StaticTypeTable {
    fn class(&self, name: &str) -> Option<Arc<ClassMeta>> {
        self.classes.get(name).cloned().or_else(|| CORE_CLASSES.get(name).cloned())
    }
}

/// Programmatic construction of a [`StaticTypeTable`], used by the build
/// tool's metadata extraction and by the test fixtures.
#[derive(Default)]
pub struct MetadataBuilder {
    classes: Vec<ClassMeta>,
}

impl MetadataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(&mut self, name: &str) -> ClassBuilder<'_> {
        self.classes.push(ClassMeta { name: name.into(), ..Default::default() });
        ClassBuilder { meta: self.classes.last_mut().unwrap() }
    }

    pub fn build(self) -> Arc<StaticTypeTable> {
        Arc::new(StaticTypeTable {
            classes: self
                .classes
                .into_iter()
                .map(|meta| (meta.name.clone(), Arc::new(meta)))
                .collect(),
        })
    }
}

pub struct ClassBuilder<'a> {
    meta: &'a mut ClassMeta,
}

impl ClassBuilder<'_> {
    pub fn extends(self, super_class: &str) -> Self {
        self.meta.supers.push(super_class.into());
        self
    }

    pub fn enumeration(self) -> Self {
        self.meta.is_enum = true;
        self
    }

    pub fn generic(self, type_params: &[&str]) -> Self {
        self.meta.type_params = type_params.iter().map(|p| SmolStr::from(*p)).collect();
        self
    }

    pub fn default_property(self, name: &str) -> Self {
        self.meta.default_property = Some(name.into());
        self
    }

    pub fn no_arg_ctor(self) -> Self {
        self.ctor(vec![])
    }

    pub fn ctor(self, params: Vec<crate::langtype::ParamMeta>) -> Self {
        self.meta.constructors.push(MethodMeta {
            name: "<init>".into(),
            is_static: false,
            params,
            return_type: self.meta.name.clone(),
        });
        self
    }

    pub fn method(self, name: &str, params: &[&str]) -> Self {
        self.method_returning(name, params, "void")
    }

    pub fn method_returning(self, name: &str, params: &[&str], return_type: &str) -> Self {
        self.push_method(name, params, return_type, false)
    }

    pub fn static_method(self, name: &str, params: &[&str], return_type: &str) -> Self {
        self.push_method(name, params, return_type, true)
    }

    fn push_method(self, name: &str, params: &[&str], return_type: &str, is_static: bool) -> Self {
        self.meta.methods.push(MethodMeta {
            name: name.into(),
            is_static,
            params: params.iter().map(|ty| crate::langtype::ParamMeta::unnamed(*ty)).collect(),
            return_type: return_type.into(),
        });
        self
    }
}
