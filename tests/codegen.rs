// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

//! End-to-end tests of the generator: fixture trees are built by hand the
//! way the front-end would produce them, generated against an in-memory
//! metadata table, and the emitted statements are compared to the expected
//! shapes for every strategy combination.

use std::sync::Arc;

use smol_str::SmolStr;
use strum::IntoEnumIterator;

use fxml_compilerlib::diagnostics::CompileError;
use fxml_compilerlib::generator::{
    BundleInjection, ControllerKind, FieldInjection, InjectionConfig, MethodInjection,
    TargetRelease,
};
use fxml_compilerlib::langtype::{GenericType, ParamMeta};
use fxml_compilerlib::object_tree::{
    Attribute, ComplexProperty, ConstantNode, ControllerField, ControllerInfo, CopyNode,
    FactoryNode, IncludeNode, Node, ObjectNode, ReferenceNode, SourceInfo, ValueNode,
};
use fxml_compilerlib::typeregister::{StaticTypeTable, MetadataBuilder, TypeRegister};
use fxml_compilerlib::{generate, CompilerConfiguration, GenerationRequest};

fn provider() -> Arc<StaticTypeTable> {
    let mut b = MetadataBuilder::new();
    b.class("javafx.event.EventHandler");
    b.class("javafx.scene.Node");
    b.class("javafx.scene.Parent").extends("javafx.scene.Node");
    b.class("javafx.scene.layout.Region").extends("javafx.scene.Parent");
    b.class("javafx.collections.ObservableList");
    b.class("javafx.geometry.Pos").enumeration();
    b.class("javafx.scene.layout.Pane")
        .extends("javafx.scene.layout.Region")
        .no_arg_ctor()
        .default_property("children")
        .method_returning("getChildren", &[], "javafx.collections.ObservableList");
    b.class("javafx.scene.layout.VBox")
        .extends("javafx.scene.layout.Pane")
        .no_arg_ctor()
        .method("setSpacing", &["double"])
        .method("setAlignment", &["javafx.geometry.Pos"]);
    b.class("javafx.scene.control.Labeled")
        .extends("javafx.scene.layout.Region")
        .method("setText", &["java.lang.String"]);
    b.class("javafx.scene.control.Button")
        .extends("javafx.scene.control.Labeled")
        .no_arg_ctor()
        .method("setOnAction", &["javafx.event.EventHandler"]);
    b.class("javafx.scene.control.Label")
        .extends("javafx.scene.control.Labeled")
        .no_arg_ctor();
    b.class("javafx.scene.control.TableView")
        .extends("javafx.scene.layout.Region")
        .generic(&["S"])
        .no_arg_ctor()
        .method("setItems", &["javafx.collections.ObservableList"]);
    b.class("javafx.scene.layout.GridPane")
        .extends("javafx.scene.layout.Pane")
        .no_arg_ctor()
        .static_method("setRowIndex", &["javafx.scene.Node", "java.lang.Integer"], "void");
    b.class("javafx.collections.FXCollections")
        .static_method("observableArrayList", &[], "javafx.collections.ObservableList");
    b.class("javafx.geometry.Insets").ctor(vec![
        ParamMeta::named("top", "double"),
        ParamMeta::named_with_default("right", "double", "0"),
    ]);
    b.class("app.Person");
    b.class("app.Chart")
        .no_arg_ctor()
        .method("setData", &["java.lang.String"])
        .method("setData", &["java.lang.Object"]);
    b.build()
}

fn register() -> TypeRegister {
    TypeRegister::new(provider())
}

fn object(
    type_name: &str,
    fx_id: Option<&str>,
    attributes: Vec<Attribute>,
    properties: Vec<ComplexProperty>,
) -> Node {
    Node::Object(ObjectNode {
        type_name: type_name.into(),
        fx_id: fx_id.map(SmolStr::from),
        attributes,
        properties,
        definitions: vec![],
    })
}

fn children(nodes: Vec<Node>) -> Vec<ComplexProperty> {
    vec![ComplexProperty { name: "".into(), children: nodes }]
}

fn main_controller() -> ControllerInfo {
    let mut info = ControllerInfo::new("com.acme.MainController");
    info.handlers.insert("onSave".into(), true);
    info.handlers.insert("onReset".into(), false);
    info.fields.insert(
        "saveButton".into(),
        ControllerField { name: "saveButton".into(), generic_args: vec![] },
    );
    info
}

fn main_source() -> SourceInfo {
    SourceInfo {
        generated_class: "com.acme.MainView".into(),
        controller_class: Some("com.acme.MainController".into()),
        source_key: "main.fxml".into(),
        includes: vec![],
        requires_bundle: true,
    }
}

/// The tree behind most tests: a VBox holding one button wired to the
/// controller.
fn main_tree() -> Node {
    object(
        "javafx.scene.layout.VBox",
        None,
        vec![Attribute::new("spacing", "4.5")],
        children(vec![object(
            "javafx.scene.control.Button",
            Some("saveButton"),
            vec![Attribute::new("text", "%save"), Attribute::new("onAction", "#onSave")],
            vec![],
        )]),
    )
}

fn main_request(parameters: CompilerConfiguration) -> GenerationRequest {
    GenerationRequest {
        parameters,
        controller: Some(main_controller()),
        source: main_source(),
        root: main_tree(),
        unit_name: "com.acme.MainView".into(),
    }
}

#[track_caller]
fn assert_contains(output: &str, needle: &str) {
    assert!(output.contains(needle), "missing `{needle}` in:\n{output}");
}

#[track_caller]
fn assert_order(output: &str, earlier: &str, later: &str) {
    let a = output.find(earlier).unwrap_or_else(|| panic!("missing `{earlier}` in:\n{output}"));
    let b = output.find(later).unwrap_or_else(|| panic!("missing `{later}` in:\n{output}"));
    assert!(a < b, "`{earlier}` must come before `{later}` in:\n{output}");
}

#[test]
fn golden_default_configuration() {
    let request = main_request(CompilerConfiguration::default());
    let output = generate(&register(), &request).unwrap();
    let expected = r#"// Generated by the FXML compiler, do not edit.
// Source: main.fxml

package com.acme;

import com.acme.MainController;
import java.util.LinkedHashMap;
import java.util.Map;
import java.util.ResourceBundle;
import javafx.scene.control.Button;
import javafx.scene.layout.VBox;

public final class MainView {
    private final Map<String, Object> controllers;
    private final Map<String, ResourceBundle> bundles;
    private MainController controller;
    private ResourceBundle resources;
    private boolean loaded;

    public MainView(MainController controller, ResourceBundle resources) {
        this.controllers = new LinkedHashMap<>();
        this.bundles = new LinkedHashMap<>();
        this.controller = controller;
        this.controllers.put("com.acme.MainController", controller);
        this.resources = resources;
        this.bundles.put("com.acme.MainController", this.resources);
    }

    MainView(Map<String, Object> controllers, Map<String, ResourceBundle> bundles) {
        this.controllers = controllers;
        this.bundles = bundles;
        Object existing = controllers.get("com.acme.MainController");
        this.controller = existing != null ? (MainController) existing : new MainController();
        this.resources = bundles.getOrDefault("com.acme.MainController", null);
    }

    public VBox load() {
        VBox object0 = new VBox();
        object0.setSpacing(4.5);
        Button object1 = new Button();
        object1.setText(this.resources.getString("save"));
        object1.setOnAction(event -> this.controller.onSave(event));
        this.controller.saveButton = object1;
        object0.getChildren().add(object1);
        this.loaded = true;
        return object0;
    }

    public MainController getController() {
        if (!this.loaded) {
            throw new IllegalStateException("load() has not been called yet");
        }
        return this.controller;
    }
}
"#;
    assert_eq!(output, expected);
}

#[test]
fn generation_is_deterministic() {
    let request = main_request(CompilerConfiguration::default());
    let reg = register();
    let first = generate(&reg, &request).unwrap();
    let second = generate(&reg, &request).unwrap();
    assert_eq!(first, second);
    // A fresh register (cold caches) must not change the output either.
    let third = generate(&register(), &request).unwrap();
    assert_eq!(first, third);
}

#[test]
fn strategy_matrix() {
    let reg = register();
    let mut combinations = 0;
    for fields in FieldInjection::builtin() {
        for methods in MethodInjection::builtin() {
            for bundle in BundleInjection::iter() {
                combinations += 1;
                let factory = matches!(fields, FieldInjection::Factory);
                let mut parameters = CompilerConfiguration::default();
                parameters.default_injection = InjectionConfig {
                    fields: fields.clone(),
                    methods: methods.clone(),
                    kind: if factory { ControllerKind::Factory } else { ControllerKind::Instance },
                };
                parameters.bundle = bundle;
                parameters.default_bundle = Some("com/acme/messages".into());
                let request = main_request(parameters);
                let output = generate(&reg, &request).unwrap();
                assert_eq!(output, generate(&reg, &request).unwrap());

                match fields {
                    FieldInjection::Assign => {
                        assert_contains(&output, "this.controller.saveButton = object1;");
                    }
                    FieldInjection::Factory => {
                        assert_contains(&output, "controllerFields.put(\"saveButton\", object1);");
                        // The controller only exists after the factory ran:
                        // every controller-touching statement follows it.
                        assert_order(
                            &output,
                            "controllerFields.put(\"saveButton\", object1);",
                            "this.controller = createController(controllerFields);",
                        );
                        assert_order(
                            &output,
                            "this.controller = createController(controllerFields);",
                            ".setOnAction(",
                        );
                    }
                    FieldInjection::Reflection => {
                        assert_contains(
                            &output,
                            "injectField(this.controller, \"saveButton\", object1);",
                        );
                        assert_contains(
                            &output,
                            "private static void injectField(Object target, String name, Object value) {",
                        );
                    }
                    FieldInjection::Setters => {
                        assert_contains(&output, "this.controller.setSaveButton(object1);");
                    }
                    FieldInjection::Custom(_) => unreachable!(),
                }

                match methods {
                    MethodInjection::Reference => {
                        assert_contains(&output, "event -> this.controller.onSave(event)");
                    }
                    MethodInjection::Reflection => {
                        assert_contains(&output, "event -> invokeController(\"onSave\", event)");
                        assert_contains(
                            &output,
                            "private void invokeController(String name, Object... args) {",
                        );
                    }
                    MethodInjection::Custom(_) => unreachable!(),
                }

                match bundle {
                    BundleInjection::Constructor => {
                        assert_contains(&output, "ResourceBundle resources)");
                        assert_contains(&output, "this.resources = resources;");
                        assert_contains(&output, "this.resources.getString(\"save\")");
                    }
                    BundleInjection::ConstructorFunction => {
                        assert_contains(&output, "Supplier<ResourceBundle> resources)");
                        assert_contains(&output, "this.resources = resources.get();");
                    }
                    BundleInjection::ConstructorName => {
                        assert_contains(&output, "String resourceBundleName)");
                        assert_contains(
                            &output,
                            "this.resources = ResourceBundle.getBundle(resourceBundleName);",
                        );
                    }
                    BundleInjection::GlobalLoad => {
                        assert_contains(
                            &output,
                            "this.resources = ResourceBundle.getBundle(\"com/acme/messages\");",
                        );
                    }
                    BundleInjection::Getter => {
                        assert_contains(
                            &output,
                            "this.controller.getResources().getString(\"save\")",
                        );
                        assert!(!output.contains("private ResourceBundle resources;"));
                    }
                }
            }
        }
    }
    assert_eq!(combinations, 40);
}

#[test]
fn variable_numbering_follows_traversal_order() {
    let tree = object(
        "javafx.scene.layout.Pane",
        None,
        vec![],
        children(vec![
            object("javafx.scene.control.Button", None, vec![], vec![]),
            object("javafx.scene.control.Button", None, vec![], vec![]),
            object(
                "javafx.scene.layout.Pane",
                None,
                vec![],
                children(vec![object("javafx.scene.control.Button", None, vec![], vec![])]),
            ),
        ]),
    );
    let request = GenerationRequest {
        parameters: CompilerConfiguration::default(),
        controller: None,
        source: main_source(),
        root: tree,
        unit_name: "com.acme.MainView".into(),
    };
    let output = generate(&register(), &request).unwrap();
    assert_order(&output, "Pane object0 = new Pane();", "Button object1 = new Button();");
    assert_order(&output, "Button object1 = new Button();", "Button object2 = new Button();");
    assert_order(&output, "Button object2 = new Button();", "Pane object3 = new Pane();");
    assert_order(&output, "Pane object3 = new Pane();", "Button object4 = new Button();");
    // The nested pane collects its own child before being collected itself.
    assert_order(&output, "object3.getChildren().add(object4);", "object0.getChildren().add(object3);");
    assert!(!output.contains("object5"));
}

#[test]
fn generic_fields_parameterize_the_construction() {
    let mut info = main_controller();
    info.fields.insert(
        "items".into(),
        ControllerField {
            name: "items".into(),
            generic_args: vec![GenericType::with_args(
                "javafx.collections.ObservableList",
                vec![GenericType::plain("app.Person")],
            )],
        },
    );
    let tree = object(
        "javafx.scene.layout.Pane",
        None,
        vec![],
        children(vec![object("javafx.scene.control.TableView", Some("items"), vec![], vec![])]),
    );
    let request = GenerationRequest {
        parameters: CompilerConfiguration::default(),
        controller: Some(info),
        source: main_source(),
        root: tree,
        unit_name: "com.acme.MainView".into(),
    };
    let output = generate(&register(), &request).unwrap();
    // Two-level nesting, comma free of trailing separators, diamond at new.
    assert_contains(
        &output,
        "TableView<ObservableList<Person>> object1 = new TableView<>();",
    );
    assert_contains(&output, "import app.Person;");
}

#[test]
fn generic_type_without_metadata_falls_back_to_raw() {
    let mut info = main_controller();
    info.fields
        .insert("items".into(), ControllerField { name: "items".into(), generic_args: vec![] });
    let tree = object(
        "javafx.scene.layout.Pane",
        None,
        vec![],
        children(vec![object("javafx.scene.control.TableView", Some("items"), vec![], vec![])]),
    );
    let request = GenerationRequest {
        parameters: CompilerConfiguration::default(),
        controller: Some(info),
        source: main_source(),
        root: tree,
        unit_name: "com.acme.MainView".into(),
    };
    let output = generate(&register(), &request).unwrap();
    assert_contains(&output, "TableView object1 = new TableView();");
}

#[test]
fn copy_builds_a_new_object_while_reference_aliases() {
    let mut root = ObjectNode {
        type_name: "javafx.scene.layout.Pane".into(),
        fx_id: None,
        attributes: vec![],
        properties: children(vec![
            Node::Reference(ReferenceNode { source: "proto".into() }),
            Node::Copy(CopyNode { source: "proto".into() }),
        ]),
        definitions: vec![],
    };
    root.definitions.push(Node::Define(Box::new(object(
        "javafx.scene.control.Button",
        Some("proto"),
        vec![Attribute::new("text", "A")],
        vec![],
    ))));
    let request = GenerationRequest {
        parameters: CompilerConfiguration::default(),
        controller: None,
        source: main_source(),
        root: Node::Object(root),
        unit_name: "com.acme.MainView".into(),
    };
    let output = generate(&register(), &request).unwrap();
    // One construction for the definition, one for the copy, none for the
    // reference.
    assert_eq!(output.matches("new Button()").count(), 2);
    assert_contains(&output, "Button object0 = new Button();");
    assert_contains(&output, "object0.setText(\"A\");");
    assert_contains(&output, "object1.getChildren().add(object0);");
    assert_contains(&output, "Button object2 = new Button();");
    assert_contains(&output, "object2.setText(\"A\");");
    assert_contains(&output, "object1.getChildren().add(object2);");
}

#[test]
fn value_constant_and_factory_nodes() {
    let tree = Node::Object(ObjectNode {
        type_name: "javafx.scene.layout.VBox".into(),
        fx_id: None,
        attributes: vec![],
        properties: vec![
            ComplexProperty {
                name: "alignment".into(),
                children: vec![Node::Constant(ConstantNode {
                    type_name: "javafx.geometry.Pos".into(),
                    constant: "CENTER".into(),
                    fx_id: None,
                })],
            },
            ComplexProperty {
                name: "items".into(),
                children: vec![Node::Factory(FactoryNode {
                    type_name: "javafx.collections.FXCollections".into(),
                    method: "observableArrayList".into(),
                    arguments: vec![],
                    fx_id: None,
                })],
            },
        ],
        definitions: vec![Node::Define(Box::new(Node::Value(ValueNode {
            type_name: "java.lang.Double".into(),
            value: "1.5".into(),
            fx_id: Some("ratio".into()),
        })))],
    });
    // "items" is not a VBox property; route the factory result through a
    // TableView instead.
    let tree = match tree {
        Node::Object(mut o) => {
            let factory_property = o.properties.pop().unwrap();
            o.properties.push(ComplexProperty {
                name: "".into(),
                children: vec![Node::Object(ObjectNode {
                    type_name: "javafx.scene.control.TableView".into(),
                    fx_id: None,
                    attributes: vec![],
                    properties: vec![factory_property],
                    definitions: vec![],
                })],
            });
            Node::Object(o)
        }
        _ => unreachable!(),
    };
    let request = GenerationRequest {
        parameters: CompilerConfiguration::default(),
        controller: None,
        source: main_source(),
        root: tree,
        unit_name: "com.acme.MainView".into(),
    };
    let output = generate(&register(), &request).unwrap();
    assert_contains(&output, "Double object0 = 1.5;");
    assert_contains(&output, "object1.setAlignment(Pos.CENTER);");
    assert_contains(
        &output,
        "ObservableList object3 = FXCollections.observableArrayList();",
    );
    assert_contains(&output, "object2.setItems(object3);");
}

#[test]
fn binding_expressions_bind_properties() {
    let tree = object(
        "javafx.scene.layout.Pane",
        None,
        vec![],
        children(vec![
            object(
                "javafx.scene.control.Label",
                Some("status"),
                vec![Attribute::new("text", "ready")],
                vec![],
            ),
            object(
                "javafx.scene.control.Label",
                None,
                vec![Attribute::new("text", "${status.text}")],
                vec![],
            ),
        ]),
    );
    let request = GenerationRequest {
        parameters: CompilerConfiguration::default(),
        controller: None,
        source: main_source(),
        root: tree,
        unit_name: "com.acme.MainView".into(),
    };
    let output = generate(&register(), &request).unwrap();
    assert_contains(
        &output,
        "ObservableValue<? extends String> binding0 = object1.textProperty();",
    );
    assert_contains(&output, "object2.textProperty().bind(binding0);");
    assert_contains(&output, "import javafx.beans.value.ObservableValue;");
}

#[test]
fn controller_values_and_initializer() {
    let mut info = main_controller();
    info.has_initialize = true;
    let tree = object(
        "javafx.scene.layout.Pane",
        None,
        vec![],
        children(vec![object(
            "javafx.scene.control.Label",
            None,
            vec![Attribute::new("text", "$controller.title")],
            vec![],
        )]),
    );
    let request = GenerationRequest {
        parameters: CompilerConfiguration::default(),
        controller: Some(info),
        source: main_source(),
        root: tree,
        unit_name: "com.acme.MainView".into(),
    };
    let output = generate(&register(), &request).unwrap();
    assert_contains(&output, "object1.setText(this.controller.getTitle());");
    assert_order(&output, "object1.setText(", "this.controller.initialize();");
    assert_order(&output, "this.controller.initialize();", "this.loaded = true;");
}

#[test]
fn statically_scoped_properties_use_the_owner_setter() {
    let tree = object(
        "javafx.scene.layout.GridPane",
        None,
        vec![],
        children(vec![object(
            "javafx.scene.control.Button",
            None,
            vec![Attribute::statically_scoped("javafx.scene.layout.GridPane", "rowIndex", "1")],
            vec![],
        )]),
    );
    let request = GenerationRequest {
        parameters: CompilerConfiguration::default(),
        controller: None,
        source: main_source(),
        root: tree,
        unit_name: "com.acme.MainView".into(),
    };
    let output = generate(&register(), &request).unwrap();
    assert_contains(&output, "GridPane.setRowIndex(object1, 1);");
}

#[test]
fn named_constructor_parameters_come_from_attributes_and_defaults() {
    let tree = object(
        "javafx.scene.layout.Pane",
        None,
        vec![],
        children(vec![object(
            "javafx.geometry.Insets",
            None,
            vec![Attribute::new("top", "8")],
            vec![],
        )]),
    );
    let request = GenerationRequest {
        parameters: CompilerConfiguration::default(),
        controller: None,
        source: main_source(),
        root: tree,
        unit_name: "com.acme.MainView".into(),
    };
    let output = generate(&register(), &request).unwrap();
    assert_contains(&output, "Insets object1 = new Insets(8, 0);");
}

#[test]
fn includes_propagate_controllers_and_bundles() {
    let mut info = main_controller();
    info.fields
        .insert("header".into(), ControllerField { name: "header".into(), generic_args: vec![] });
    info.fields.insert(
        "headerController".into(),
        ControllerField { name: "headerController".into(), generic_args: vec![] },
    );
    let mut source = main_source();
    source.includes.push(SourceInfo {
        generated_class: "com.acme.HeaderView".into(),
        controller_class: Some("com.acme.HeaderController".into()),
        source_key: "header.fxml".into(),
        includes: vec![],
        requires_bundle: true,
    });
    let tree = object(
        "javafx.scene.layout.Pane",
        None,
        vec![],
        children(vec![Node::Include(IncludeNode {
            source: "header.fxml".into(),
            fx_id: Some("header".into()),
            resources: Some("header/messages".into()),
        })]),
    );
    let request = GenerationRequest {
        parameters: CompilerConfiguration::default(),
        controller: Some(info),
        source,
        root: tree,
        unit_name: "com.acme.MainView".into(),
    };
    let output = generate(&register(), &request).unwrap();
    assert_contains(
        &output,
        "Map<String, ResourceBundle> bundles0 = new LinkedHashMap<>(this.bundles);",
    );
    assert_contains(
        &output,
        "bundles0.put(\"com.acme.HeaderController\", ResourceBundle.getBundle(\"header/messages\"));",
    );
    assert_contains(&output, "HeaderView include0 = new HeaderView(this.controllers, bundles0);");
    assert_contains(&output, "Parent object1 = include0.load();");
    assert_contains(&output, "this.controller.header = object1;");
    assert_contains(&output, "HeaderController controller0 = include0.getController();");
    assert_contains(&output, "this.controller.headerController = controller0;");
    assert_contains(&output, "object0.getChildren().add(object1);");
}

#[test]
fn java11_target_changes_spelling_only() {
    let mut parameters = CompilerConfiguration::default();
    parameters.target = TargetRelease::Java11;
    let request = main_request(parameters);
    let output = generate(&register(), &request).unwrap();
    assert_contains(&output, "var object0 = new VBox();");
    assert_contains(&output, "var object1 = new Button();");
    // Statement shapes and order stay identical to the Java 8 output.
    assert_order(&output, "object1.setText(", "object1.setOnAction(");
    assert_order(&output, "object1.setOnAction(", "this.controller.saveButton = object1;");
}

#[test]
fn error_taxonomy() {
    let reg = register();
    let base = |root: Node| GenerationRequest {
        parameters: CompilerConfiguration::default(),
        controller: Some(main_controller()),
        source: main_source(),
        root,
        unit_name: "com.acme.MainView".into(),
    };

    // Unknown class.
    let request = base(object("app.Missing", None, vec![], vec![]));
    assert_eq!(
        generate(&reg, &request),
        Err(CompileError::UnresolvedClass("app.Missing".into()))
    );

    // Unknown member.
    let request = base(object(
        "javafx.scene.layout.VBox",
        None,
        vec![Attribute::new("nope", "1")],
        vec![],
    ));
    assert!(matches!(
        generate(&reg, &request),
        Err(CompileError::UnresolvedMember { .. })
    ));

    // Ambiguous overload.
    let request = base(object("app.Chart", None, vec![Attribute::new("data", "x")], vec![]));
    assert!(matches!(
        generate(&reg, &request),
        Err(CompileError::AmbiguousMember { .. })
    ));

    // Forward reference: the id is only registered later in traversal order.
    let request = base(object(
        "javafx.scene.layout.Pane",
        None,
        vec![],
        children(vec![
            Node::Reference(ReferenceNode { source: "late".into() }),
            object("javafx.scene.control.Button", Some("late"), vec![], vec![]),
        ]),
    ));
    assert_eq!(generate(&reg, &request), Err(CompileError::UnknownId("late".into())));

    // Duplicate id.
    let request = base(object(
        "javafx.scene.layout.Pane",
        None,
        vec![],
        children(vec![
            object("javafx.scene.control.Button", Some("twice"), vec![], vec![]),
            object("javafx.scene.control.Button", Some("twice"), vec![], vec![]),
        ]),
    ));
    assert_eq!(generate(&reg, &request), Err(CompileError::DuplicateId("twice".into())));

    // Expression depth.
    let request = base(object(
        "javafx.scene.control.Label",
        None,
        vec![Attribute::new("text", "${controller.a.b}")],
        vec![],
    ));
    assert!(matches!(
        generate(&reg, &request),
        Err(CompileError::UnsupportedExpressionDepth(_))
    ));

    // Mixed named and unnamed constructor parameters.
    let mut builder = MetadataBuilder::new();
    builder.class("app.Mixed").ctor(vec![
        ParamMeta::named("top", "double"),
        ParamMeta::unnamed("double"),
    ]);
    let mixed = TypeRegister::new(builder.build());
    let request = base(object("app.Mixed", None, vec![], vec![]));
    assert_eq!(
        generate(&mixed, &request),
        Err(CompileError::MixedConstructorParameters("app.Mixed".into()))
    );

    // Unknown include source.
    let request = base(object(
        "javafx.scene.layout.Pane",
        None,
        vec![],
        children(vec![Node::Include(IncludeNode {
            source: "missing.fxml".into(),
            fx_id: None,
            resources: None,
        })]),
    ));
    assert_eq!(
        generate(&reg, &request),
        Err(CompileError::UnknownIncludeSource("missing.fxml".into()))
    );

    // Unknown handler.
    let request = base(object(
        "javafx.scene.control.Button",
        None,
        vec![Attribute::new("onAction", "#missingHandler")],
        vec![],
    ));
    assert!(matches!(
        generate(&reg, &request),
        Err(CompileError::UnresolvedHandler { .. })
    ));

    // Factory strategy and instance kind contradict each other.
    let mut parameters = CompilerConfiguration::default();
    parameters.default_injection = InjectionConfig {
        fields: FieldInjection::Factory,
        methods: MethodInjection::Reference,
        kind: ControllerKind::Instance,
    };
    let request = main_request(parameters);
    assert!(matches!(
        generate(&reg, &request),
        Err(CompileError::InvalidConfiguration(_))
    ));
}
