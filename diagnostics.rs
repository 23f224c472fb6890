// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

//! The error taxonomy of the compiler.
//!
//! Every failure in this crate is deterministic for a given input: it is fixed
//! by correcting the markup, the controller metadata, or the configuration,
//! never by retrying. Generation aborts on the first error and produces no
//! partial output. Non-fatal conditions (for example a generic destination
//! type without generic metadata) are reported through the [`log`] crate and
//! generation continues.

use smol_str::SmolStr;

/// Error returned by [`crate::generate`].
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum CompileError {
    /// A markup element or attribute names a type the component library
    /// metadata does not know about.
    #[error("unknown type '{0}'")]
    UnresolvedClass(SmolStr),

    /// No member with a compatible signature was found.
    #[error("'{class}' has no {kind} '{member}' taking {arity} argument(s)")]
    UnresolvedMember { class: SmolStr, member: SmolStr, kind: MemberKind, arity: usize },

    /// More than one member with a compatible signature was found.
    ///
    /// The lookup does not rank candidates by specificity: either the inexact
    /// search narrows down to exactly one member, or it fails here.
    #[error("call to {kind} '{class}.{member}' is ambiguous between: {candidates}")]
    AmbiguousMember { class: SmolStr, member: SmolStr, kind: MemberKind, candidates: String },

    /// `fx:reference`, `fx:copy` or a `$` expression names an id that has not
    /// been registered yet. Forward references are an error, not a fix-up
    /// pass.
    #[error("unknown fx:id '{0}'")]
    UnknownId(SmolStr),

    /// The same fx:id was registered twice within one generated unit.
    #[error("duplicate fx:id '{0}'")]
    DuplicateId(SmolStr),

    /// Expressions may only navigate one property level (`a.b`); anything
    /// deeper must be restructured in the markup.
    #[error("expression '{0}' navigates more than one property level")]
    UnsupportedExpressionDepth(SmolStr),

    /// A binding expression where only a plain value is allowed, or a binding
    /// that does not name a property to bind to.
    #[error("binding expression '{0}' is not allowed here")]
    UnexpectedBinding(SmolStr),

    /// A constructor declares names for some of its parameters but not all of
    /// them. The metadata must name all parameters or none.
    #[error("constructor of '{0}' mixes named and unnamed parameters")]
    MixedConstructorParameters(SmolStr),

    /// The element's class has no usable constructor: neither a zero-argument
    /// one nor one with fully named parameters.
    #[error("'{0}' has no usable constructor")]
    NoConstructor(SmolStr),

    /// An event-handler reference (`#name`) does not match any handler
    /// declared by the controller.
    #[error("controller '{controller}' declares no event handler '{handler}'")]
    UnresolvedHandler { controller: SmolStr, handler: SmolStr },

    /// The markup needs a controller (handlers, `$controller`, fx:include
    /// wiring) but the request did not carry controller metadata.
    #[error("document uses a controller but none is configured")]
    NoController,

    /// An `fx:include` source that is not part of the request's include graph.
    #[error("no generated unit is known for include source '{0}'")]
    UnknownIncludeSource(SmolStr),

    /// A child list was given for a property with no setter and no mutable
    /// aggregation getter, or several children for a plain setter.
    #[error("property '{property}' of '{class}' cannot hold the given children")]
    InvalidChildren { class: SmolStr, property: SmolStr },

    /// The element has children but its class declares no default aggregation
    /// property to receive them.
    #[error("'{0}' has no default property")]
    NoDefaultProperty(SmolStr),

    /// The generation parameters contradict each other, for example a factory
    /// field-injection strategy without the factory controller kind.
    #[error("invalid generation parameters: {0}")]
    InvalidConfiguration(String),
}

/// Distinguishes the member namespaces in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MemberKind {
    #[display("method")]
    Method,
    #[display("static method")]
    StaticMethod,
    #[display("constructor")]
    Constructor,
}
