// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

//! Resolution of dotted value and binding expressions.
//!
//! Expressions navigate at most one property level: `$header` aliases a
//! generated variable, `$header.text` reads a property off it, and
//! `${header.text}` is the bindable form. Deeper navigation is a fatal
//! error; the markup has to introduce an intermediate id instead.

use smol_str::SmolStr;

use crate::diagnostics::CompileError;

/// Where expression bases come from during emission: the id map plus the
/// `controller` namespace entry.
pub trait ExpressionScope {
    /// The source expression for a base name, e.g. `object3` for a markup id
    /// or `controller` for the controller entry.
    fn base_expr(&self, name: &str) -> Option<String>;
}

pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The conventional accessor names for a property.
pub fn getter_name(property: &str) -> String {
    format!("get{}", capitalize(property))
}

pub fn setter_name(property: &str) -> String {
    format!("set{}", capitalize(property))
}

pub fn property_method_name(property: &str) -> String {
    format!("{property}Property")
}

/// Split `base` or `base.property`, rejecting anything deeper.
fn split(expr: &str) -> Result<(&str, Option<&str>), CompileError> {
    let mut parts = expr.split('.');
    let base = parts.next().unwrap_or_default();
    let property = parts.next();
    if base.is_empty() || parts.next().is_some() {
        return Err(CompileError::UnsupportedExpressionDepth(SmolStr::from(expr)));
    }
    Ok((base, property))
}

/// Resolve a `$`-prefixed value expression (without the `$`) to accessor
/// code: `header` → the registered variable, `header.text` →
/// `object3.getText()`.
pub fn resolve_value(scope: &dyn ExpressionScope, expr: &str) -> Result<String, CompileError> {
    let (base, property) = split(expr)?;
    let base_code =
        scope.base_expr(base).ok_or_else(|| CompileError::UnknownId(SmolStr::from(base)))?;
    Ok(match property {
        Some(property) => format!("{base_code}.{}()", getter_name(property)),
        None => base_code,
    })
}

/// Resolve the inside of a `${…}` binding expression to the observable the
/// generated code binds to: `header.text` → `object3.textProperty()`.
///
/// A binding needs a property to observe, so the undotted form is rejected.
pub fn resolve_binding_source(
    scope: &dyn ExpressionScope,
    expr: &str,
) -> Result<String, CompileError> {
    let (base, property) = split(expr)?;
    let Some(property) = property else {
        return Err(CompileError::UnexpectedBinding(SmolStr::from(expr)));
    };
    let base_code =
        scope.base_expr(base).ok_or_else(|| CompileError::UnknownId(SmolStr::from(base)))?;
    Ok(format!("{base_code}.{}()", property_method_name(property)))
}
