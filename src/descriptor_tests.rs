//! Descriptor builder tests: directive ordering, type tagging, and
//! consistency diagnostics.

use crate::classify::classify_component;
use crate::descriptor::{build_descriptor, native_type_tag, Directive};
use crate::diagnostics::{DiagnosticSink, Severity};
use crate::model::{
    ClassGraph, ComponentClassModel, FieldMarker, FieldModel, MethodMarker, MethodModel,
    ParamModel, TypeRef,
};

fn data_field(name: &str, type_ref: TypeRef) -> FieldModel {
    FieldModel {
        name: name.to_string(),
        type_ref,
        runtime_visible: true,
        markers: vec![],
    }
}

fn prop_field(name: &str, type_ref: TypeRef, required: bool, check_type: bool) -> FieldModel {
    FieldModel {
        name: name.to_string(),
        type_ref,
        runtime_visible: true,
        markers: vec![FieldMarker::Prop {
            required,
            check_type,
        }],
    }
}

fn method(name: &str, return_type: TypeRef, markers: Vec<MethodMarker>) -> MethodModel {
    MethodModel {
        name: name.to_string(),
        params: vec![],
        return_type,
        runtime_visible: true,
        markers,
        overrides: vec![],
    }
}

fn cart_component() -> ComponentClassModel {
    ComponentClassModel {
        qualified_name: "shop.cart.CartView".to_string(),
        display_name: Some("cart-view".to_string()),
        use_factory: true,
        super_class: None,
        interfaces: vec![],
        fields: vec![
            data_field("items", TypeRef::Sequence {
                element: Box::new(TypeRef::Named {
                    qualified: "shop.cart.Item".to_string(),
                }),
            }),
            data_field("total", TypeRef::Double),
            prop_field("sku", TypeRef::String, true, true),
        ],
        methods: vec![
            method(
                "getItemCount",
                TypeRef::Int,
                vec![MethodMarker::Computed { property: None }],
            ),
            method(
                "onItemsChange",
                TypeRef::Void,
                vec![MethodMarker::Watch {
                    path: "items".to_string(),
                    deep: true,
                }],
            ),
            method(
                "validateSku",
                TypeRef::Bool,
                vec![MethodMarker::PropValidator {
                    property: "sku".to_string(),
                }],
            ),
            method(
                "defaultSku",
                TypeRef::String,
                vec![MethodMarker::PropDefault {
                    property: "sku".to_string(),
                }],
            ),
            method("mounted", TypeRef::Void, vec![MethodMarker::Hook]),
            method("formatPrice", TypeRef::String, vec![]),
        ],
    }
}

fn build(class: &ComponentClassModel) -> (crate::descriptor::OptionsDescriptor, DiagnosticSink) {
    let graph = ClassGraph::new();
    let mut sink = DiagnosticSink::new();
    let members = classify_component(&graph, class, &mut sink);
    let descriptor = build_descriptor(class, &members, &mut sink);
    (descriptor, sink)
}

fn directive_tags(descriptor: &crate::descriptor::OptionsDescriptor) -> Vec<&'static str> {
    descriptor
        .directives
        .iter()
        .map(|d| match d {
            Directive::SetName(_) => "set-name",
            Directive::InitData(_) => "init-data",
            Directive::AddProp(_) => "add-prop",
            Directive::AddComputed(_) => "add-computed",
            Directive::AddWatch(_) => "add-watch",
            Directive::AddPropValidator(_) => "add-prop-validator",
            Directive::AddPropDefault(_) => "add-prop-default",
            Directive::AddHook(_) => "add-hook",
            Directive::AddMethods(_) => "add-methods",
        })
        .collect()
}

#[test]
fn test_directive_order_matches_processing_order() {
    let (descriptor, sink) = build(&cart_component());
    assert!(!sink.has_errors());

    assert_eq!(
        directive_tags(&descriptor),
        vec![
            "set-name",
            "init-data",
            "add-prop",
            "add-computed",
            "add-watch",
            "add-prop-validator",
            "add-prop-default",
            "add-hook", // mounted
            "add-methods",
            "add-hook", // lattice$created, always last
        ]
    );

    match &descriptor.directives[1] {
        Directive::InitData(d) => {
            assert!(d.use_factory);
            assert_eq!(d.fields, vec!["items", "total"]);
        }
        other => panic!("expected init-data, got {:?}", other),
    }

    match descriptor.directives.last().unwrap() {
        Directive::AddHook(d) => {
            assert_eq!(d.event, "created");
            assert_eq!(d.handler, "lattice$created");
        }
        other => panic!("expected the created hook, got {:?}", other),
    }
}

#[test]
fn test_prop_type_tag_only_when_checked() {
    let mut class = cart_component();
    class.fields.push(prop_field("label", TypeRef::String, false, false));

    let (descriptor, _) = build(&class);
    let props: Vec<_> = descriptor
        .directives
        .iter()
        .filter_map(|d| match d {
            Directive::AddProp(p) => Some(p),
            _ => None,
        })
        .collect();

    assert_eq!(props.len(), 2);
    assert_eq!(props[0].name, "sku");
    assert_eq!(props[0].type_tag.as_deref(), Some("String"));
    assert_eq!(props[1].name, "label");
    assert_eq!(props[1].type_tag, None);
}

#[test]
fn test_native_type_tags() {
    assert_eq!(native_type_tag(&TypeRef::Int), "Number");
    assert_eq!(native_type_tag(&TypeRef::Long), "Number");
    assert_eq!(native_type_tag(&TypeRef::Bool), "Boolean");
    assert_eq!(native_type_tag(&TypeRef::Char), "String");
    assert_eq!(native_type_tag(&TypeRef::String), "String");
    assert_eq!(
        native_type_tag(&TypeRef::Sequence {
            element: Box::new(TypeRef::Int)
        }),
        "Array"
    );
    assert_eq!(
        native_type_tag(&TypeRef::Named {
            qualified: "shop.cart.Item".to_string()
        }),
        "Object"
    );
}

#[test]
fn test_computed_setter_kind_from_void_return() {
    let mut class = cart_component();
    class.methods.push(MethodModel {
        name: "setItemCount".to_string(),
        params: vec![ParamModel {
            name: "value".to_string(),
            type_ref: TypeRef::Int,
        }],
        return_type: TypeRef::Void,
        runtime_visible: true,
        markers: vec![MethodMarker::Computed { property: None }],
        overrides: vec![],
    });

    let (descriptor, sink) = build(&class);
    assert!(!sink.has_errors());

    let computed: Vec<_> = descriptor
        .directives
        .iter()
        .filter_map(|d| match d {
            Directive::AddComputed(c) => Some(c),
            _ => None,
        })
        .collect();

    assert_eq!(computed.len(), 2);
    assert_eq!(computed[0].method, "getItemCount");
    assert_eq!(computed[0].kind, crate::classify::ComputedKind::Getter);
    assert_eq!(computed[1].method, "setItemCount");
    assert_eq!(computed[1].kind, crate::classify::ComputedKind::Setter);
    // Both accessors share one property.
    assert_eq!(computed[0].property, "itemCount");
    assert_eq!(computed[1].property, "itemCount");
}

#[test]
fn test_unknown_watch_root_is_a_warning_only() {
    let mut class = cart_component();
    class.methods.push(method(
        "onGhostChange",
        TypeRef::Void,
        vec![MethodMarker::Watch {
            path: "ghost.child".to_string(),
            deep: false,
        }],
    ));

    let (_, sink) = build(&class);
    assert!(!sink.is_fatal("shop.cart.CartView"));
    let warnings: Vec<_> = sink
        .diagnostics()
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("ghost.child"));
}

#[test]
fn test_validator_for_unknown_prop_is_fatal() {
    let mut class = cart_component();
    class.methods.push(method(
        "validateColor",
        TypeRef::Bool,
        vec![MethodMarker::PropValidator {
            property: "color".to_string(),
        }],
    ));

    let (_, sink) = build(&class);
    assert!(sink.is_fatal("shop.cart.CartView"));
    assert!(sink
        .diagnostics()
        .iter()
        .any(|d| d.message.contains("color") && d.member.as_deref() == Some("validateColor")));
}

#[test]
fn test_render_hook_emitted_before_created() {
    let mut class = cart_component();
    class.interfaces.push(crate::model::InterfaceModel {
        qualified_name: crate::model::HAS_RENDER_CAPABILITY.to_string(),
        methods: vec![],
    });
    class.methods.push(method(
        "render",
        TypeRef::Named {
            qualified: "lattice.core.VNode".to_string(),
        },
        vec![],
    ));

    let (descriptor, _) = build(&class);
    let hooks: Vec<_> = descriptor
        .directives
        .iter()
        .filter_map(|d| match d {
            Directive::AddHook(h) => Some((h.event.as_str(), h.handler.as_str())),
            _ => None,
        })
        .collect();

    assert_eq!(
        hooks,
        vec![
            ("mounted", "mounted"),
            ("render", "lattice$render"),
            ("created", "lattice$created"),
        ]
    );
}

#[test]
fn test_empty_sections_are_omitted() {
    let class = ComponentClassModel {
        qualified_name: "app.Empty".to_string(),
        display_name: None,
        use_factory: false,
        super_class: None,
        interfaces: vec![],
        fields: vec![],
        methods: vec![],
    };

    let (descriptor, _) = build(&class);
    // Only the created wiring hook remains.
    assert_eq!(directive_tags(&descriptor), vec!["add-hook"]);
}

#[test]
fn test_json_shape_is_stable() {
    let (descriptor, _) = build(&cart_component());
    let json = descriptor.to_json();

    assert!(json.contains("\"type\":\"set-name\""));
    assert!(json.contains("\"type\":\"add-prop-validator\""));
    assert!(json.contains("\"useFactory\":true"));
    assert!(json.contains("\"typeTag\":\"String\""));
    assert_eq!(json, descriptor.to_json());
}
