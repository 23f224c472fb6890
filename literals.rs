// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

//! Coercion of raw attribute text into Java expressions.
//!
//! Given the destination type the coercer decides between a literal, a
//! parse call on the wrapper type, an enum constant, a `valueOf` conversion,
//! or plain passthrough. The `%`/`@`/`$` attribute prefixes are resolved
//! here as well; `${…}` binding expressions are rejected because they must
//! be routed to the expression resolver before any value coercion happens.

use crate::diagnostics::CompileError;
use crate::langtype;
use crate::typeregister::TypeRegister;

/// The emitter-side services the coercer needs: bundle and resource access
/// depend on the configured strategies, variables on the generation context.
pub trait CoercionHost {
    /// Expression reading the string for `key` from the resource bundle.
    fn bundle_expr(&mut self, key: &str) -> Result<String, CompileError>;

    /// Expression for a document-relative resource path.
    fn resource_expr(&mut self, path: &str, destination: &str) -> String;

    /// The generated variable registered for a markup id.
    fn variable_for_id(&self, id: &str) -> Option<String>;

    /// Record a qualified class for import and return the name to use in
    /// generated source.
    fn import(&mut self, qualified: &str) -> String;

    fn register(&self) -> &TypeRegister;
}

/// A quote-escaped Java string literal: backslash, then quote, then the
/// line break that cannot appear raw inside a literal.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[test]
fn test_quote() {
    assert_eq!(quote("plain"), r#""plain""#);
    assert_eq!(quote(r#"say "hi""#), r#""say \"hi\"""#);
    assert_eq!(quote(r"back\slash"), r#""back\\slash""#);
    assert_eq!(quote("line\nbreak"), r#""line\nbreak""#);
}

/// Whether the text is already a syntactically valid integer literal.
fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[test]
fn test_is_integer_literal() {
    assert!(is_integer_literal("42"));
    assert!(is_integer_literal("-7"));
    assert!(is_integer_literal("+0"));
    assert!(!is_integer_literal("4.2e1"));
    assert!(!is_integer_literal("12px"));
    assert!(!is_integer_literal(""));
    assert!(!is_integer_literal("-"));
}

/// Whether the text matches the decimal-literal pattern
/// (`[+-]? digits [. digits]? [eE [+-]? digits]?`).
fn is_decimal_literal(text: &str) -> bool {
    let text = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (mantissa, exponent) = match text.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e)),
        None => (text, None),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (mantissa, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !frac_part.is_none_or(all_digits) {
        return false;
    }
    exponent.is_none_or(|e| all_digits(e.strip_prefix(['+', '-']).unwrap_or(e)))
}

#[test]
fn test_is_decimal_literal() {
    assert!(is_decimal_literal("42"));
    assert!(is_decimal_literal("4.2"));
    assert!(is_decimal_literal("4.2e1"));
    assert!(is_decimal_literal("-4.2E-10"));
    assert!(!is_decimal_literal("4."));
    assert!(!is_decimal_literal(".5"));
    assert!(!is_decimal_literal("4.2e"));
    assert!(!is_decimal_literal("1,5"));
    assert!(!is_decimal_literal(""));
}

/// Turn raw attribute text into the expression assigning it to a value of
/// type `destination`.
pub fn coerce(
    host: &mut dyn CoercionHost,
    raw: &str,
    destination: &str,
) -> Result<String, CompileError> {
    // Attribute prefixes come first; an escaped prefix (leading backslash)
    // falls through to the type-directed rules with the backslash stripped.
    if raw.starts_with("${") {
        return Err(CompileError::UnexpectedBinding(raw.into()));
    }
    if let Some(key) = raw.strip_prefix('%') {
        return host.bundle_expr(key);
    }
    if let Some(path) = raw.strip_prefix('@') {
        return Ok(host.resource_expr(path, destination));
    }
    if let Some(id) = raw.strip_prefix('$') {
        return host.variable_for_id(id).ok_or_else(|| CompileError::UnknownId(id.into()));
    }
    let raw = raw.strip_prefix('\\').unwrap_or(raw);

    if langtype::is_string(destination) {
        return Ok(quote(raw));
    }
    if langtype::is_char(destination) {
        let c = raw.chars().next().unwrap_or(' ');
        return Ok(match c {
            '\'' => "'\\''".into(),
            '\\' => "'\\\\'".into(),
            _ => format!("'{c}'"),
        });
    }
    if langtype::is_boolean(destination) {
        return Ok(raw.to_owned());
    }
    if langtype::is_integral(destination) {
        if is_integer_literal(raw) {
            return Ok(raw.to_owned());
        }
        let (wrapper, parse) = langtype::numeric_parse_call(destination).unwrap();
        let wrapper = host.import(wrapper);
        return Ok(format!("{wrapper}.{parse}({})", quote(raw)));
    }
    if langtype::is_floating(destination) {
        if is_decimal_literal(raw) {
            return Ok(raw.to_owned());
        }
        let (wrapper, parse) = langtype::numeric_parse_call(destination).unwrap();
        let wrapper = host.import(wrapper);
        return Ok(format!("{wrapper}.{parse}({})", quote(raw)));
    }
    if let Some(parse) = langtype::temporal_parse_member(destination) {
        let name = host.import(destination);
        return Ok(format!("{name}.{parse}({})", quote(raw)));
    }
    if let Ok(meta) = host.register().find_class(destination) {
        if meta.is_enum {
            let name = host.import(destination);
            return Ok(format!("{name}.{raw}"));
        }
        if host.register().has_string_conversion(destination) {
            let name = host.import(destination);
            return Ok(format!("{name}.valueOf({})", quote(raw)));
        }
    }
    // Anything else is assumed to already be a valid literal or identifier,
    // for example a previously generated variable.
    Ok(raw.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeregister::MetadataBuilder;

    struct TestHost {
        register: TypeRegister,
        imports: Vec<String>,
    }

    impl TestHost {
        fn new() -> Self {
            let mut builder = MetadataBuilder::new();
            builder.class("javafx.geometry.Pos").enumeration();
            builder
                .class("javafx.scene.paint.Color")
                .static_method("valueOf", &["java.lang.String"], "javafx.scene.paint.Color");
            builder.class("app.Opaque").no_arg_ctor();
            Self { register: TypeRegister::new(builder.build()), imports: Vec::new() }
        }
    }

    impl CoercionHost for TestHost {
        fn bundle_expr(&mut self, key: &str) -> Result<String, CompileError> {
            Ok(format!("resources.getString({})", quote(key)))
        }

        fn resource_expr(&mut self, path: &str, _destination: &str) -> String {
            format!("getClass().getResource({}).toExternalForm()", quote(path))
        }

        fn variable_for_id(&self, id: &str) -> Option<String> {
            (id == "known").then(|| "object7".to_owned())
        }

        fn import(&mut self, qualified: &str) -> String {
            self.imports.push(qualified.to_owned());
            crate::langtype::simple_name(qualified).to_owned()
        }

        fn register(&self) -> &TypeRegister {
            &self.register
        }
    }

    #[track_caller]
    fn check(raw: &str, destination: &str, expected: &str) {
        let mut host = TestHost::new();
        assert_eq!(coerce(&mut host, raw, destination).unwrap(), expected);
    }

    #[test]
    fn numeric_coercion() {
        check("42", "int", "42");
        check("-42", "java.lang.Integer", "-42");
        check("4.2e1", "int", r#"Integer.parseInt("4.2e1")"#);
        check("99", "long", "99");
        check("oops", "long", r#"Long.parseLong("oops")"#);
        check("4.2e1", "double", "4.2e1");
        check("1,5", "double", r#"Double.parseDouble("1,5")"#);
        check("1.5", "float", "1.5");
    }

    #[test]
    fn plain_coercion() {
        check("true", "boolean", "true");
        check(r#"say "hi""#, "java.lang.String", r#""say \"hi\"""#);
        check(r"\%literal", "java.lang.String", r#""%literal""#);
        check("x", "char", "'x'");
        check("2024-01-31", "java.time.LocalDate", r#"LocalDate.parse("2024-01-31")"#);
        check("200ms", "javafx.util.Duration", r#"Duration.valueOf("200ms")"#);
    }

    #[test]
    fn conversion_members() {
        check("CENTER", "javafx.geometry.Pos", "Pos.CENTER");
        check("#ff0000", "javafx.scene.paint.Color", r##"Color.valueOf("#ff0000")"##);
        // No conversion member and not a primitive: passthrough.
        check("someIdentifier", "app.Opaque", "someIdentifier");
    }

    #[test]
    fn prefixes() {
        check("%title", "java.lang.String", r#"resources.getString("title")"#);
        check(
            "@img/logo.png",
            "java.lang.String",
            r#"getClass().getResource("img/logo.png").toExternalForm()"#,
        );
        check("$known", "app.Opaque", "object7");

        let mut host = TestHost::new();
        assert_eq!(
            coerce(&mut host, "$missing", "app.Opaque"),
            Err(CompileError::UnknownId("missing".into()))
        );
        assert_eq!(
            coerce(&mut host, "${controller.name}", "java.lang.String"),
            Err(CompileError::UnexpectedBinding("${controller.name}".into()))
        );
    }
}
