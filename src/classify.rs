//! Member classifier.
//!
//! First pass over a component class: every declared member is tagged with
//! exactly one semantic role, and the cross-cutting facts the later passes
//! need (computed shadow fields, injected members, ancestor depth) are
//! collected alongside. Diagnostics are appended to the sink, never thrown;
//! classification runs to completion even for a class that can no longer be
//! emitted.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::diagnostics::{DiagnosticSink, ERR_DUPLICATE_COMPUTED, ERR_HOOK_NOT_VISIBLE, ERR_PROP_NOT_VISIBLE};
use crate::model::{
    ClassGraph, ComponentClassModel, FieldModel, MethodModel, ParamModel, TypeRef,
    HAS_CREATED_CAPABILITY, HAS_RENDER_CAPABILITY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComputedKind {
    Getter,
    Setter,
}

/// Getter/setter pair for one computed property. Either side may be absent,
/// never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedProperty {
    pub property: String,
    pub getter: Option<MethodModel>,
    pub setter: Option<MethodModel>,
}

impl ComputedProperty {
    /// The value type of the property: the getter's return type, or the
    /// setter's first parameter type when only a setter exists.
    pub fn value_type(&self) -> Option<TypeRef> {
        if let Some(getter) = &self.getter {
            return Some(getter.return_type.clone());
        }
        self.setter
            .as_ref()
            .and_then(|s| s.params.first())
            .map(|p| p.type_ref.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatcherMember {
    pub method: MethodModel,
    pub path: String,
    pub deep: bool,
}

/// A prop validator or prop default method, with the prop it guards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropGuardMember {
    pub method: MethodModel,
    pub property: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookMember {
    pub method: MethodModel,
    /// True when the role came from overriding an interface-declared hook
    /// rather than an explicit tag.
    pub via_override: bool,
}

/// Field synthesized on the bridge so a computed property is addressable in
/// template expressions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowField {
    pub property: String,
    pub type_ref: TypeRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectedMethod {
    pub name: String,
    pub params: Vec<ParamModel>,
}

/// Role-tagged view of one component class, the product of classification.
/// Immutable once built; shared between descriptor building, bridge codegen,
/// and template scope seeding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSet {
    pub class_name: String,
    pub data_fields: Vec<FieldModel>,
    pub props: Vec<FieldModel>,
    pub computed: IndexMap<String, ComputedProperty>,
    pub watchers: Vec<WatcherMember>,
    pub prop_validators: Vec<PropGuardMember>,
    pub prop_defaults: Vec<PropGuardMember>,
    pub hooks: Vec<HookMember>,
    pub template_methods: Vec<MethodModel>,
    pub render_method: Option<MethodModel>,
    pub has_created: bool,
    pub shadow_fields: Vec<ShadowField>,
    pub injected_fields: Vec<String>,
    pub injected_methods: Vec<InjectedMethod>,
    pub ancestor_depth: usize,
}

/// Derive the property name a computed accessor exposes. An explicit marker
/// name wins; otherwise a `get`/`set`/`is` prefix is stripped and the next
/// character decapitalized (`getFullName` -> `fullName`). A method without a
/// recognizable prefix exposes its own name.
pub fn computed_property_name(method: &MethodModel, explicit: Option<&String>) -> String {
    if let Some(name) = explicit {
        if !name.is_empty() {
            return name.clone();
        }
    }

    for prefix in ["get", "set", "is"] {
        if let Some(rest) = method.name.strip_prefix(prefix) {
            let mut chars = rest.chars();
            if let Some(first) = chars.next() {
                if first.is_uppercase() {
                    let mut derived: String = first.to_lowercase().collect();
                    derived.push_str(chars.as_str());
                    return derived;
                }
            }
        }
    }

    method.name.clone()
}

/// Classify every member of `class`, tagging each with exactly one role.
pub fn classify_component(
    graph: &ClassGraph,
    class: &ComponentClassModel,
    sink: &mut DiagnosticSink,
) -> MemberSet {
    let class_name = class.qualified_name.as_str();
    let interface_hooks = collect_interface_hooks(class, sink);

    let mut members = MemberSet {
        class_name: class_name.to_string(),
        data_fields: Vec::new(),
        props: Vec::new(),
        computed: IndexMap::new(),
        watchers: Vec::new(),
        prop_validators: Vec::new(),
        prop_defaults: Vec::new(),
        hooks: Vec::new(),
        template_methods: Vec::new(),
        render_method: None,
        has_created: class.implements(HAS_CREATED_CAPABILITY),
        shadow_fields: Vec::new(),
        injected_fields: Vec::new(),
        injected_methods: Vec::new(),
        ancestor_depth: graph.ancestor_depth(class_name),
    };

    // Fields: Data unless tagged Prop. A non-visible Prop is unreachable for
    // the runtime, so the class can no longer be emitted.
    for field in &class.fields {
        if field.is_injected() {
            members.injected_fields.push(field.name.clone());
        }

        if field.is_prop() {
            if !field.runtime_visible {
                sink.error(
                    ERR_PROP_NOT_VISIBLE,
                    &format!(
                        "Prop `{}` must be runtime visible in component `{}`.",
                        field.name, class_name
                    ),
                    class_name,
                    Some(&field.name),
                );
            }
            members.props.push(field.clone());
        } else if field.runtime_visible {
            members.data_fields.push(field.clone());
        }
    }

    let has_render = class.implements(HAS_RENDER_CAPABILITY);

    for method in &class.methods {
        if method.is_injected() {
            members.injected_methods.push(InjectedMethod {
                name: method.name.clone(),
                params: method.params.clone(),
            });
        }

        if let Some(marker) = method.computed_marker() {
            let explicit = match marker {
                crate::model::MethodMarker::Computed { property } => property.as_ref(),
                _ => None,
            };
            add_computed(&mut members, method, explicit, sink);
            continue;
        }

        if let Some((path, deep)) = method.watch_marker() {
            members.watchers.push(WatcherMember {
                method: method.clone(),
                path: path.to_string(),
                deep,
            });
            continue;
        }

        if let Some(property) = method.prop_validator_marker() {
            members.prop_validators.push(PropGuardMember {
                method: method.clone(),
                property: property.to_string(),
            });
            continue;
        }

        if let Some(property) = method.prop_default_marker() {
            members.prop_defaults.push(PropGuardMember {
                method: method.clone(),
                property: property.to_string(),
            });
            continue;
        }

        if has_render && method.name == "render" {
            members.render_method = Some(method.clone());
            continue;
        }

        if let Some(via_override) = hook_role(class, method, &interface_hooks, sink) {
            members.hooks.push(HookMember {
                method: method.clone(),
                via_override,
            });
            continue;
        }

        if method.runtime_visible {
            members.template_methods.push(method.clone());
        }
    }

    members.shadow_fields = synthesize_shadow_fields(graph, class);

    members
}

/// Hook methods declared on the implemented capability interfaces. An
/// interface hook that is not runtime visible breaks the lifecycle contract
/// for every implementor, so it is fatal to the class being compiled.
fn collect_interface_hooks(
    class: &ComponentClassModel,
    sink: &mut DiagnosticSink,
) -> Vec<(String, MethodModel)> {
    let mut hooks = Vec::new();
    for interface in &class.interfaces {
        for method in &interface.methods {
            if !method.is_hook_tagged() {
                continue;
            }
            if !method.runtime_visible {
                sink.error(
                    ERR_HOOK_NOT_VISIBLE,
                    &format!(
                        "Hook method `{}` on `{}` must be runtime visible.",
                        method.name, interface.qualified_name
                    ),
                    &class.qualified_name,
                    Some(&method.name),
                );
            }
            hooks.push((interface.qualified_name.clone(), method.clone()));
        }
    }
    hooks
}

/// Returns `Some(via_override)` when `method` plays the Hook role: tagged
/// explicitly, or overriding an interface-declared hook. The override check
/// goes through the frontend-resolved override relationship, not the name.
fn hook_role(
    class: &ComponentClassModel,
    method: &MethodModel,
    interface_hooks: &[(String, MethodModel)],
    sink: &mut DiagnosticSink,
) -> Option<bool> {
    if method.is_hook_tagged() {
        if !method.runtime_visible {
            sink.error(
                ERR_HOOK_NOT_VISIBLE,
                &format!(
                    "Hook method `{}` must be runtime visible in component `{}`.",
                    method.name, class.qualified_name
                ),
                &class.qualified_name,
                Some(&method.name),
            );
        }
        return Some(false);
    }

    for (owner, hook) in interface_hooks {
        if method.overrides_method(owner, &hook.name) {
            return Some(true);
        }
    }

    None
}

fn add_computed(
    members: &mut MemberSet,
    method: &MethodModel,
    explicit: Option<&String>,
    sink: &mut DiagnosticSink,
) {
    let property = computed_property_name(method, explicit);
    let kind = if method.return_type.is_void() {
        ComputedKind::Setter
    } else {
        ComputedKind::Getter
    };

    let class_name = members.class_name.clone();
    let entry = members
        .computed
        .entry(property.clone())
        .or_insert_with(|| ComputedProperty {
            property: property.clone(),
            getter: None,
            setter: None,
        });

    let slot = match kind {
        ComputedKind::Getter => &mut entry.getter,
        ComputedKind::Setter => &mut entry.setter,
    };

    if slot.is_some() {
        let kind_name = match kind {
            ComputedKind::Getter => "getter",
            ComputedKind::Setter => "setter",
        };
        sink.error(
            ERR_DUPLICATE_COMPUTED,
            &format!(
                "Computed property `{}` already has a {} in component `{}`.",
                property, kind_name, class_name
            ),
            &class_name,
            Some(&method.name),
        );
        return;
    }

    *slot = Some(method.clone());
}

/// One shadow field per distinct computed property name across the class and
/// its whole ancestor chain. The walk starts at the class itself; an ancestor
/// that already produced a field for a property name suppresses any later
/// synthesis for it.
fn synthesize_shadow_fields(graph: &ClassGraph, class: &ComponentClassModel) -> Vec<ShadowField> {
    let mut fields = Vec::new();
    let mut already_done: HashSet<String> = HashSet::new();

    let mut levels: Vec<&ComponentClassModel> = vec![class];
    levels.extend(graph.lineage(&class.qualified_name));

    for level in levels {
        for method in &level.methods {
            let Some(marker) = method.computed_marker() else {
                continue;
            };
            let explicit = match marker {
                crate::model::MethodMarker::Computed { property } => property.as_ref(),
                _ => None,
            };
            let property = computed_property_name(method, explicit);
            if already_done.contains(&property) {
                continue;
            }

            let type_ref = if method.return_type.is_void() {
                match method.params.first() {
                    Some(p) => p.type_ref.clone(),
                    None => continue,
                }
            } else {
                method.return_type.clone()
            };

            already_done.insert(property.clone());
            fields.push(ShadowField { property, type_ref });
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldMarker, InterfaceModel, MethodMarker, MethodRef};

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

    fn field(name: &str, visible: bool, markers: Vec<FieldMarker>) -> FieldModel {
        FieldModel {
            name: name.to_string(),
            type_ref: TypeRef::Int,
            runtime_visible: visible,
            markers,
        }
    }

    fn empty_class(name: &str) -> ComponentClassModel {
        ComponentClassModel {
            qualified_name: name.to_string(),
            display_name: None,
            use_factory: false,
            super_class: None,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
        }
    }

    #[test]
    fn test_computed_property_name_derivation() {
        let m = method("getFullName", TypeRef::String, vec![]);
        assert_eq!(computed_property_name(&m, None), "fullName");

        let m = method("isActive", TypeRef::Bool, vec![]);
        assert_eq!(computed_property_name(&m, None), "active");

        let m = method("total", TypeRef::Int, vec![]);
        assert_eq!(computed_property_name(&m, None), "total");

        let m = method("getter", TypeRef::Int, vec![]);
        // No uppercase after the prefix, so the whole name is kept.
        assert_eq!(computed_property_name(&m, None), "getter");

        let explicit = "displayName".to_string();
        let m = method("getX", TypeRef::Int, vec![]);
        assert_eq!(computed_property_name(&m, Some(&explicit)), "displayName");
    }

    #[test]
    fn test_every_visible_member_gets_exactly_one_role() {
        let mut class = empty_class("app.Cart");
        class.interfaces = vec![InterfaceModel {
            qualified_name: HAS_RENDER_CAPABILITY.to_string(),
            methods: vec![],
        }];
        class.fields = vec![
            field("items", true, vec![]),
            field(
                "sku",
                true,
                vec![FieldMarker::Prop {
                    required: true,
                    check_type: false,
                }],
            ),
        ];
        class.methods = vec![
            method(
                "getTotal",
                TypeRef::Double,
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
            method("render", TypeRef::Named { qualified: "lattice.core.VNode".to_string() }, vec![]),
        ];

        let graph = ClassGraph::new();
        let mut sink = DiagnosticSink::new();
        let members = classify_component(&graph, &class, &mut sink);

        assert!(!sink.has_errors());
        assert_eq!(members.data_fields.len(), 1);
        assert_eq!(members.props.len(), 1);
        assert_eq!(members.computed.len(), 1);
        assert_eq!(members.watchers.len(), 1);
        assert_eq!(members.prop_validators.len(), 1);
        assert_eq!(members.prop_defaults.len(), 1);
        assert_eq!(members.hooks.len(), 1);
        assert_eq!(members.template_methods.len(), 1);
        assert!(members.render_method.is_some());

        // No member shows up under two roles.
        assert_eq!(members.template_methods[0].name, "formatPrice");
        assert!(members.computed.contains_key("total"));
    }

    #[test]
    fn test_prop_must_be_runtime_visible() {
        let mut class = empty_class("app.Cart");
        class.fields = vec![field(
            "sku",
            false,
            vec![FieldMarker::Prop {
                required: false,
                check_type: false,
            }],
        )];

        let graph = ClassGraph::new();
        let mut sink = DiagnosticSink::new();
        classify_component(&graph, &class, &mut sink);

        assert!(sink.is_fatal("app.Cart"));
        let diags = sink.diagnostics();
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("sku"));
        assert!(diags[0].message.contains("app.Cart"));
    }

    #[test]
    fn test_hook_via_interface_override() {
        let iface_hook = MethodModel {
            name: "onRouteEnter".to_string(),
            params: vec![],
            return_type: TypeRef::Void,
            runtime_visible: true,
            markers: vec![MethodMarker::Hook],
            overrides: vec![],
        };

        let mut class = empty_class("app.Page");
        class.interfaces = vec![InterfaceModel {
            qualified_name: "router.HasRouteEnter".to_string(),
            methods: vec![iface_hook],
        }];

        let mut implementor = method("onRouteEnter", TypeRef::Void, vec![]);
        implementor.overrides = vec![MethodRef {
            owner: "router.HasRouteEnter".to_string(),
            name: "onRouteEnter".to_string(),
        }];
        // Same name but no override relationship: stays a template method.
        let unrelated = method("onRouteEnterLog", TypeRef::Void, vec![]);
        class.methods = vec![implementor, unrelated];

        let graph = ClassGraph::new();
        let mut sink = DiagnosticSink::new();
        let members = classify_component(&graph, &class, &mut sink);

        assert_eq!(members.hooks.len(), 1);
        assert!(members.hooks[0].via_override);
        assert_eq!(members.template_methods.len(), 1);
    }

    #[test]
    fn test_shadow_fields_deduped_across_chain() {
        let mut base = empty_class("app.Base");
        base.methods = vec![method(
            "getX",
            TypeRef::Int,
            vec![MethodMarker::Computed { property: None }],
        )];

        let mut leaf = empty_class("app.Leaf");
        leaf.super_class = Some("app.Base".to_string());
        let mut setter = method("setX", TypeRef::Void, vec![MethodMarker::Computed { property: None }]);
        setter.params = vec![ParamModel {
            name: "value".to_string(),
            type_ref: TypeRef::Int,
        }];
        leaf.methods = vec![setter];

        let mut graph = ClassGraph::new();
        graph.insert(base);
        graph.insert(leaf.clone());

        let mut sink = DiagnosticSink::new();
        let members = classify_component(&graph, &leaf, &mut sink);

        let names: Vec<&str> = members
            .shadow_fields
            .iter()
            .map(|f| f.property.as_str())
            .collect();
        assert_eq!(names, vec!["x"]);
        assert_eq!(members.ancestor_depth, 1);
    }

    #[test]
    fn test_duplicate_computed_getter_is_fatal() {
        let mut class = empty_class("app.Cart");
        class.methods = vec![
            method(
                "getTotal",
                TypeRef::Double,
                vec![MethodMarker::Computed { property: Some("total".to_string()) }],
            ),
            method(
                "computeTotal",
                TypeRef::Double,
                vec![MethodMarker::Computed { property: Some("total".to_string()) }],
            ),
        ];

        let graph = ClassGraph::new();
        let mut sink = DiagnosticSink::new();
        let members = classify_component(&graph, &class, &mut sink);

        assert!(sink.is_fatal("app.Cart"));
        // The first accessor wins; the duplicate is reported and dropped.
        assert_eq!(
            members.computed.get("total").unwrap().getter.as_ref().unwrap().name,
            "getTotal"
        );
    }

    #[test]
    fn test_injected_members_collected_in_declaration_order() {
        let mut class = empty_class("app.Cart");
        class.fields = vec![
            field("cartService", true, vec![FieldMarker::Inject]),
            field("items", true, vec![]),
        ];
        let mut m1 = method("bindHandlers", TypeRef::Void, vec![MethodMarker::Inject]);
        m1.params = vec![
            ParamModel {
                name: "scheduler".to_string(),
                type_ref: TypeRef::Named { qualified: "app.Scheduler".to_string() },
            },
            ParamModel {
                name: "bus".to_string(),
                type_ref: TypeRef::Named { qualified: "app.Bus".to_string() },
            },
        ];
        let mut m2 = method("attachLogger", TypeRef::Void, vec![MethodMarker::Inject]);
        m2.params = vec![ParamModel {
            name: "logger".to_string(),
            type_ref: TypeRef::Named { qualified: "app.Logger".to_string() },
        }];
        class.methods = vec![m1, m2];

        let graph = ClassGraph::new();
        let mut sink = DiagnosticSink::new();
        let members = classify_component(&graph, &class, &mut sink);

        assert_eq!(members.injected_fields, vec!["cartService"]);
        let names: Vec<&str> = members.injected_methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["bindHandlers", "attachLogger"]);
        assert_eq!(members.injected_methods[0].params[0].name, "scheduler");
    }
}
