//! Bridge codegen value model.
//!
//! The runtime can only address a stable public surface, so every member it
//! must reach — computed accessors, watchers, prop validators and defaults,
//! hooks, the render implementation — gets a same-named public forwarding
//! entry point on a generated bridge class. This module builds the explicit
//! value model of that class ([`BridgePlan`]); turning the plan into source
//! text is the emitter's job, which keeps the semantics testable without
//! string matching.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::classify::MemberSet;
use crate::model::{ComponentClassModel, MethodModel};
use crate::registry::RegistrationEntry;

/// Prefix for every member the compiler synthesizes onto a bridge. Keeps
/// generated names out of the user's namespace and makes recompilation
/// idempotent.
pub const GENERATED_PREFIX: &str = "lattice$";
/// Fixed suffix appended to the mangled qualified name of the bridge class.
pub const BRIDGE_SUFFIX: &str = "Bridge";
/// Global namespace the runtime polls for bridge constructors.
pub const CONSTRUCTOR_NAMESPACE: &str = "Lattice.componentConstructors";
/// Name of the generated guarded created hook.
pub const CREATED_HOOK_NAME: &str = "lattice$created";
/// Name of the generated render adapter.
pub const RENDER_HOOK_NAME: &str = "lattice$render";

/// Deterministic bridge class name: dots mangled to underscores plus the
/// fixed suffix. `shop.cart.CartView` -> `shop_cart_CartViewBridge`.
pub fn bridge_class_name(qualified_name: &str) -> String {
    format!("{}{}", qualified_name.replace('.', "_"), BRIDGE_SUFFIX)
}

/// Key under which the bridge constructor is published in the runtime
/// namespace: the mangled qualified name without the suffix.
pub fn constructor_key(qualified_name: &str) -> String {
    qualified_name.replace('.', "_")
}

/// Guard field for one ancestor-depth level. Each level of a component chain
/// owns its own flag, so creation logic runs exactly once per level even when
/// the chain re-enters the runtime's construction path.
pub fn guard_field_name(ancestor_depth: usize) -> String {
    format!("{}hrc_{}", GENERATED_PREFIX, ancestor_depth)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyMethodSpec {
    pub name: String,
    pub params: Vec<String>,
    pub returns_value: bool,
}

impl ProxyMethodSpec {
    fn for_method(method: &MethodModel) -> Self {
        ProxyMethodSpec {
            name: method.name.clone(),
            params: method.params.iter().map(|p| p.name.clone()).collect(),
            returns_value: !method.return_type.is_void(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowFieldSpec {
    pub name: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectedCall {
    pub method: String,
    /// Holder field names, in the method's parameter declaration order.
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionSpec {
    /// Provider key: the component's qualified name, resolved through the
    /// instance's options at creation time.
    pub holder_key: String,
    pub field_copies: Vec<String>,
    pub method_calls: Vec<InjectedCall>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedHookSpec {
    pub guard_field: String,
    pub injection: Option<InjectionSpec>,
    /// Whether to chain into the user's created hook after construction.
    pub call_created: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSpec {
    pub method_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgePlan {
    pub class_name: String,
    pub parent_class: String,
    pub bridge_name: String,
    pub shadow_fields: Vec<ShadowFieldSpec>,
    pub proxies: Vec<ProxyMethodSpec>,
    pub created: CreatedHookSpec,
    pub render: Option<RenderSpec>,
    pub registration: RegistrationEntry,
}

pub fn build_bridge_plan(model: &ComponentClassModel, members: &MemberSet) -> BridgePlan {
    let bridge_name = bridge_class_name(&model.qualified_name);

    let shadow_fields = members
        .shadow_fields
        .iter()
        .map(|f| ShadowFieldSpec {
            name: f.property.clone(),
            type_name: f.type_ref.type_name(),
        })
        .collect();

    BridgePlan {
        class_name: model.qualified_name.clone(),
        parent_class: model.short_name().to_string(),
        bridge_name: bridge_name.clone(),
        shadow_fields,
        proxies: collect_proxies(members),
        created: CreatedHookSpec {
            guard_field: guard_field_name(members.ancestor_depth),
            injection: injection_spec(model, members),
            call_created: members.has_created,
        },
        render: members.render_method.as_ref().map(|_| RenderSpec {
            method_name: RENDER_HOOK_NAME.to_string(),
        }),
        registration: RegistrationEntry {
            qualified_name: model.qualified_name.clone(),
            bridge_name,
        },
    }
}

/// Forwarding entry points, in the same order the descriptor lists their
/// roles. Names are deduplicated so a member reached through two paths is
/// never synthesized twice.
fn collect_proxies(members: &MemberSet) -> Vec<ProxyMethodSpec> {
    let mut proxies = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    let mut push = |method: &MethodModel, proxies: &mut Vec<ProxyMethodSpec>| {
        if seen.insert(method.name.clone()) {
            proxies.push(ProxyMethodSpec::for_method(method));
        }
    };

    for computed in members.computed.values() {
        if let Some(getter) = &computed.getter {
            push(getter, &mut proxies);
        }
        if let Some(setter) = &computed.setter {
            push(setter, &mut proxies);
        }
    }
    for watcher in &members.watchers {
        push(&watcher.method, &mut proxies);
    }
    for validator in &members.prop_validators {
        push(&validator.method, &mut proxies);
    }
    for default in &members.prop_defaults {
        push(&default.method, &mut proxies);
    }
    for hook in &members.hooks {
        push(&hook.method, &mut proxies);
    }

    proxies
}

fn injection_spec(model: &ComponentClassModel, members: &MemberSet) -> Option<InjectionSpec> {
    if members.injected_fields.is_empty() && members.injected_methods.is_empty() {
        return None;
    }

    Some(InjectionSpec {
        holder_key: model.qualified_name.clone(),
        field_copies: members.injected_fields.clone(),
        method_calls: members
            .injected_methods
            .iter()
            .map(|m| InjectedCall {
                method: m.name.clone(),
                args: m.params.iter().map(|p| p.name.clone()).collect(),
            })
            .collect(),
    })
}
