//! # Lattice Component Compiler Ground Truth
//!
//! ## Bridge Generation Invariants
//!
//! 1. **Closed classification**: every runtime-visible member of a component
//!    class maps to exactly one role in
//!    {Data, Prop, Computed, Watcher, PropValidator, PropDefault, Hook,
//!    TemplateMethod, Render}. Roles come from an explicit classification
//!    pass over supplied metadata, never from runtime reflection.
//!
//! 2. **Proxies delegate, nothing else**: a generated forwarding method has
//!    the same name and signature as the member it exposes and a single
//!    `super` call in its body. The bridge is the only path by which the
//!    runtime reaches members the host language keeps inaccessible.
//!
//! 3. **One guard per chain level**: creation logic is protected by one
//!    boolean flag per ancestor-depth level (`lattice$hrc_<n>`). Re-entrant
//!    creation — possible when a chain bottoms out in a runtime-native
//!    component — runs each level's injection and construction exactly once.
//!
//! 4. **Deterministic output**: descriptor directives follow declaration
//!    order, synthesized members are deduplicated by property name across
//!    the whole ancestor chain, and generated names are pure functions of
//!    the qualified class name. Compiling an unchanged model twice yields
//!    byte-identical output.
//!
//! 5. **Batched diagnostics**: user errors accumulate per class and never
//!    abort the pass; a fatal condition suppresses emission for that class
//!    only. Scope-stack misuse is an internal error kind, distinct from any
//!    user diagnostic.
//!
//! 6. **Two-phase registry**: bridge registrations become visible only when
//!    the ready signal fires, and the registry never mutates afterwards.

mod bridge;
mod cache;
mod classify;
mod compile;
mod descriptor;
mod diagnostics;
mod emit;
mod model;
mod registry;
mod scope;

pub use bridge::{
    bridge_class_name, build_bridge_plan, constructor_key, guard_field_name, BridgePlan,
    CreatedHookSpec, InjectedCall, InjectionSpec, ProxyMethodSpec, RenderSpec, ShadowFieldSpec,
    BRIDGE_SUFFIX, CONSTRUCTOR_NAMESPACE, CREATED_HOOK_NAME, GENERATED_PREFIX, RENDER_HOOK_NAME,
};
pub use cache::ClassificationCache;
pub use classify::{
    classify_component, computed_property_name, ComputedKind, ComputedProperty, HookMember,
    InjectedMethod, MemberSet, PropGuardMember, ShadowField, WatcherMember,
};
pub use compile::{compile_all, compile_component_internal, CompileOptions, CompileResult};
pub use descriptor::*;
pub use diagnostics::*;
pub use emit::emit_bridge;
pub use model::{
    ClassGraph, ComponentClassModel, FieldMarker, FieldModel, InterfaceModel, MethodMarker,
    MethodModel, MethodRef, ParamModel, TypeRef, HAS_CREATED_CAPABILITY, HAS_RENDER_CAPABILITY,
};
pub use registry::{global_registry, BridgeRegistry, RegistrationEntry};
pub use scope::{ScopeError, TemplateScopeResolver, VariableInfo, INSTANCE_ID_VARIABLE};

#[cfg(test)]
mod descriptor_tests;
