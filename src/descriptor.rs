//! Options descriptor builder.
//!
//! The descriptor is the canonical runtime configuration record for one
//! component: an ordered sequence of configuration directives the runtime
//! replays at registration time. Directive order is fixed by the processing
//! order below and, within one kind, by declaration order — an unchanged
//! class model always re-serializes byte-identically, which is what the
//! build cache keys on.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::classify::{ComputedKind, MemberSet};
use crate::diagnostics::{
    DiagnosticSink, ERR_UNKNOWN_PROP_REF, WARN_UNKNOWN_HOOK_EVENT, WARN_UNKNOWN_WATCH_ROOT,
};
use crate::model::{ComponentClassModel, FieldMarker, TypeRef, LIFECYCLE_EVENTS};

// ═══════════════════════════════════════════════════════════════════════════════
// DIRECTIVE TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Directive {
    SetName(SetNameDirective),
    InitData(InitDataDirective),
    AddProp(AddPropDirective),
    AddComputed(AddComputedDirective),
    AddWatch(AddWatchDirective),
    AddPropValidator(AddPropValidatorDirective),
    AddPropDefault(AddPropDefaultDirective),
    AddHook(AddHookDirective),
    AddMethods(AddMethodsDirective),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetNameDirective {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitDataDirective {
    pub use_factory: bool,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPropDirective {
    pub name: String,
    pub required: bool,
    /// Only present when the prop opted into runtime type checking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddComputedDirective {
    pub method: String,
    pub property: String,
    pub kind: ComputedKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWatchDirective {
    pub method: String,
    pub path: String,
    pub deep: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPropValidatorDirective {
    pub method: String,
    pub property: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPropDefaultDirective {
    pub method: String,
    pub property: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddHookDirective {
    pub event: String,
    pub handler: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMethodsDirective {
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsDescriptor {
    pub class_name: String,
    pub directives: Vec<Directive>,
}

impl OptionsDescriptor {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("descriptor serialization failed")
    }
}

/// Runtime type tag for a prop that opted into type checking. Anything that
/// is not a recognizable primitive or ordered sequence is an opaque object.
pub fn native_type_tag(type_ref: &TypeRef) -> &'static str {
    match type_ref {
        TypeRef::Int
        | TypeRef::Byte
        | TypeRef::Short
        | TypeRef::Long
        | TypeRef::Float
        | TypeRef::Double => "Number",
        TypeRef::Bool => "Boolean",
        TypeRef::Char | TypeRef::String => "String",
        TypeRef::Sequence { .. } => "Array",
        TypeRef::Void | TypeRef::Named { .. } => "Object",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILDER
// ═══════════════════════════════════════════════════════════════════════════════

pub fn build_descriptor(
    model: &ComponentClassModel,
    members: &MemberSet,
    sink: &mut DiagnosticSink,
) -> OptionsDescriptor {
    let class_name = members.class_name.as_str();
    let mut directives = Vec::new();

    if let Some(name) = &model.display_name {
        if !name.is_empty() {
            directives.push(Directive::SetName(SetNameDirective { name: name.clone() }));
        }
    }

    let data_fields: Vec<String> = members.data_fields.iter().map(|f| f.name.clone()).collect();
    if !data_fields.is_empty() {
        directives.push(Directive::InitData(InitDataDirective {
            use_factory: model.use_factory,
            fields: data_fields,
        }));
    }

    for prop in &members.props {
        let (required, check_type) = match prop.prop_marker() {
            Some(FieldMarker::Prop {
                required,
                check_type,
            }) => (*required, *check_type),
            _ => (false, false),
        };
        directives.push(Directive::AddProp(AddPropDirective {
            name: prop.name.clone(),
            required,
            type_tag: check_type.then(|| native_type_tag(&prop.type_ref).to_string()),
        }));
    }

    for computed in members.computed.values() {
        if let Some(getter) = &computed.getter {
            directives.push(Directive::AddComputed(AddComputedDirective {
                method: getter.name.clone(),
                property: computed.property.clone(),
                kind: ComputedKind::Getter,
            }));
        }
        if let Some(setter) = &computed.setter {
            directives.push(Directive::AddComputed(AddComputedDirective {
                method: setter.name.clone(),
                property: computed.property.clone(),
                kind: ComputedKind::Setter,
            }));
        }
    }

    let known_roots = known_watch_roots(members);
    for watcher in &members.watchers {
        let root = watch_root(&watcher.path);
        if !known_roots.contains(root) {
            sink.warning(
                WARN_UNKNOWN_WATCH_ROOT,
                &format!(
                    "Watcher `{}` observes `{}`, which is not a declared member of `{}`.",
                    watcher.method.name, watcher.path, class_name
                ),
                class_name,
                Some(&watcher.method.name),
            );
        }
        directives.push(Directive::AddWatch(AddWatchDirective {
            method: watcher.method.name.clone(),
            path: watcher.path.clone(),
            deep: watcher.deep,
        }));
    }

    let prop_names: HashSet<&str> = members.props.iter().map(|p| p.name.as_str()).collect();
    for validator in &members.prop_validators {
        check_prop_reference(&validator.property, &validator.method.name, &prop_names, class_name, sink);
        directives.push(Directive::AddPropValidator(AddPropValidatorDirective {
            method: validator.method.name.clone(),
            property: validator.property.clone(),
        }));
    }

    for default in &members.prop_defaults {
        check_prop_reference(&default.property, &default.method.name, &prop_names, class_name, sink);
        directives.push(Directive::AddPropDefault(AddPropDefaultDirective {
            method: default.method.name.clone(),
            property: default.property.clone(),
        }));
    }

    for hook in &members.hooks {
        let name = hook.method.name.as_str();
        if !hook.via_override && !LIFECYCLE_EVENTS.contains(name) {
            sink.warning(
                WARN_UNKNOWN_HOOK_EVENT,
                &format!(
                    "Hook method `{}` in `{}` does not match a runtime lifecycle event.",
                    name, class_name
                ),
                class_name,
                Some(name),
            );
        }
        directives.push(Directive::AddHook(AddHookDirective {
            event: name.to_string(),
            handler: name.to_string(),
        }));
    }

    let method_names: Vec<String> = members
        .template_methods
        .iter()
        .map(|m| m.name.clone())
        .collect();
    if !method_names.is_empty() {
        directives.push(Directive::AddMethods(AddMethodsDirective {
            methods: method_names,
        }));
    }

    // Wiring hooks resolved by bridge codegen: the render adapter when the
    // class has a custom render, then the guarded created hook, always last.
    if members.render_method.is_some() {
        directives.push(Directive::AddHook(AddHookDirective {
            event: "render".to_string(),
            handler: crate::bridge::RENDER_HOOK_NAME.to_string(),
        }));
    }
    directives.push(Directive::AddHook(AddHookDirective {
        event: "created".to_string(),
        handler: crate::bridge::CREATED_HOOK_NAME.to_string(),
    }));

    OptionsDescriptor {
        class_name: class_name.to_string(),
        directives,
    }
}

fn check_prop_reference(
    property: &str,
    method: &str,
    prop_names: &HashSet<&str>,
    class_name: &str,
    sink: &mut DiagnosticSink,
) {
    if !prop_names.contains(property) {
        sink.error(
            ERR_UNKNOWN_PROP_REF,
            &format!(
                "`{}` references prop `{}`, which is not declared in `{}`.",
                method, property, class_name
            ),
            class_name,
            Some(method),
        );
    }
}

/// Names a watched path may legally be anchored to: data fields, props,
/// computed properties, and expression-producing methods.
fn known_watch_roots(members: &MemberSet) -> HashSet<String> {
    let mut roots: HashSet<String> = HashSet::new();
    for f in &members.data_fields {
        roots.insert(f.name.clone());
    }
    for p in &members.props {
        roots.insert(p.name.clone());
    }
    for property in members.computed.keys() {
        roots.insert(property.clone());
    }
    for m in &members.template_methods {
        roots.insert(m.name.clone());
    }
    roots
}

fn watch_root(path: &str) -> &str {
    let end = path
        .find(|c| c == '.' || c == '[' || c == '(')
        .unwrap_or(path.len());
    &path[..end]
}
