// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

#![doc = include_str!("README.md")]
// It would be nice to keep the compiler free of unsafe code
#![deny(unsafe_code)]

use std::collections::HashMap;

use smol_str::SmolStr;

pub mod diagnostics;
pub mod generator;
pub mod langtype;
pub mod literals;
pub mod lookup;
pub mod object_tree;
pub mod typeregister;

use crate::diagnostics::CompileError;
use crate::generator::{BundleInjection, InjectionConfig, TargetRelease};
use crate::object_tree::{ControllerInfo, Node, SourceInfo};
use crate::typeregister::TypeRegister;

/// CompilerConfiguration allows configuring different aspects of the
/// generated code. One configuration is shared by all generations of a
/// build; everything request-specific lives in [`GenerationRequest`].
#[derive(Clone, Debug)]
pub struct CompilerConfiguration {
    /// Injection strategies per controller class. Controllers without an
    /// entry use `default_injection`.
    pub injection: HashMap<SmolStr, InjectionConfig>,
    pub default_injection: InjectionConfig,
    /// How generated classes obtain their resource bundle.
    pub bundle: BundleInjection,
    /// Bundle base name for the global-load strategy and the include
    /// fallback.
    pub default_bundle: Option<SmolStr>,
    /// Maps an include source key to the generated class name for it,
    /// overriding what the request's [`SourceInfo`] records.
    pub generated_names: HashMap<SmolStr, SmolStr>,
    /// The language level of the generated source. Only affects syntax
    /// sugar; statement shapes and order are identical across levels.
    pub target: TargetRelease,
    /// Construct images from a resource stream instead of a resource URL.
    pub stream_image_constructor: bool,
}

impl Default for CompilerConfiguration {
    fn default() -> Self {
        Self {
            injection: HashMap::new(),
            default_injection: InjectionConfig::default(),
            bundle: BundleInjection::Constructor,
            default_bundle: None,
            generated_names: HashMap::new(),
            target: TargetRelease::Java8,
            stream_image_constructor: false,
        }
    }
}

/// Everything needed to generate one unit.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    pub parameters: CompilerConfiguration,
    /// Metadata of the document's controller class, if it declares one.
    pub controller: Option<ControllerInfo>,
    /// The include graph of the document.
    pub source: SourceInfo,
    /// The parsed document tree.
    pub root: Node,
    /// Qualified name of the class to generate.
    pub unit_name: SmolStr,
}

/// Generate the Java source for one request.
///
/// On success the complete text of the generated class is returned; on
/// failure nothing is: there is no partial output. The [`TypeRegister`] is
/// shared between concurrent generations and keeps its lookup caches for
/// the lifetime of the process.
pub fn generate(
    register: &TypeRegister,
    request: &GenerationRequest,
) -> Result<String, CompileError> {
    generator::java::generate(register, request)
}
