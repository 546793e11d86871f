//! Template scope resolver.
//!
//! During template compilation the external parser walks the node tree and
//! keeps a stack of scope layers in sync with the repeating regions it
//! enters and leaves. The root layer holds the component's full inherited
//! member surface plus the reserved instance id, and is never popped; each
//! repeating region contributes one layer of loop variables on top.
//! Lookups walk innermost to outermost, so an inner layer shadows any outer
//! binding of the same name.
//!
//! Misuse of the stack (popping past the root) is a defect in the driving
//! template compiler, not in user input — it surfaces as [`ScopeError`],
//! a kind deliberately distinct from user diagnostics.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::classify::MemberSet;
use crate::model::TypeRef;

/// Reserved identifier exposing the runtime instance id in expressions.
pub const INSTANCE_ID_VARIABLE: &str = "_uid";

lazy_static::lazy_static! {
    static ref IDENTIFIER_RE: Regex =
        Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier regex");

    /// Instance members the runtime owns. Never shadowable by template
    /// locals.
    pub static ref RESERVED_IDENTIFIERS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert(INSTANCE_ID_VARIABLE);
        s.insert("$data");
        s.insert("$el");
        s.insert("$options");
        s.insert("$parent");
        s.insert("$root");
        s.insert("$children");
        s.insert("$refs");
        s.insert("$slots");
        s
    };
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeError {
    #[error("cannot pop the root scope layer")]
    RootLayerPopped,
    #[error("`{0}` is not a valid identifier")]
    InvalidIdentifier(String),
    #[error("`{0}` is reserved and cannot be shadowed")]
    ReservedIdentifier(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableInfo {
    pub type_name: String,
    pub name: String,
}

#[derive(Debug, Default)]
struct ContextLayer {
    variables: HashMap<String, VariableInfo>,
    methods: HashSet<String>,
}

impl ContextLayer {
    fn add_variable(&mut self, type_name: &str, name: &str) {
        self.variables.insert(
            name.to_string(),
            VariableInfo {
                type_name: type_name.to_string(),
                name: name.to_string(),
            },
        );
    }
}

/// Stack-disciplined symbol table for one component's template.
pub struct TemplateScopeResolver {
    root: ContextLayer,
    layers: Vec<ContextLayer>,
    imports: HashMap<String, String>,
}

impl TemplateScopeResolver {
    /// Seed the root layer from the classified member surface: the reserved
    /// instance id, every data field, prop and computed shadow field with
    /// its type, and every method name the runtime can call.
    pub fn new(members: &MemberSet) -> Self {
        let mut root = ContextLayer::default();
        root.add_variable(&TypeRef::String.type_name(), INSTANCE_ID_VARIABLE);

        for field in &members.data_fields {
            root.add_variable(&field.type_ref.type_name(), &field.name);
        }
        for prop in &members.props {
            root.add_variable(&prop.type_ref.type_name(), &prop.name);
        }
        for shadow in &members.shadow_fields {
            root.add_variable(&shadow.type_ref.type_name(), &shadow.property);
        }

        for computed in members.computed.values() {
            if let Some(getter) = &computed.getter {
                root.methods.insert(getter.name.clone());
            }
            if let Some(setter) = &computed.setter {
                root.methods.insert(setter.name.clone());
            }
        }
        for watcher in &members.watchers {
            root.methods.insert(watcher.method.name.clone());
        }
        for validator in &members.prop_validators {
            root.methods.insert(validator.method.name.clone());
        }
        for default in &members.prop_defaults {
            root.methods.insert(default.method.name.clone());
        }
        for hook in &members.hooks {
            root.methods.insert(hook.method.name.clone());
        }
        for method in &members.template_methods {
            root.methods.insert(method.name.clone());
        }

        let mut resolver = TemplateScopeResolver {
            root,
            layers: Vec::new(),
            imports: HashMap::new(),
        };
        resolver.add_import("lattice.dom.NativeEvent");
        resolver.add_import("lattice.core.JsArray");
        resolver
    }

    /// Add a variable directly to the root layer. Used by the template
    /// compiler for surface it derives itself (e.g. ref collections).
    pub fn add_root_variable(&mut self, type_name: &str, name: &str) {
        self.root.add_variable(type_name, name);
    }

    /// Push a layer when entering a repeating template region.
    pub fn add_context_layer(&mut self) {
        self.layers.push(ContextLayer::default());
    }

    /// Pop the layer of the repeating region being left. Pops must balance
    /// pushes; popping past the root is driver misuse.
    pub fn pop_context_layer(&mut self) -> Result<(), ScopeError> {
        self.layers.pop().map(|_| ()).ok_or(ScopeError::RootLayerPopped)
    }

    /// Register a loop variable in the innermost layer only. Siblings of the
    /// region that are not its descendants never see the binding.
    pub fn add_local_variable(
        &mut self,
        type_name: &str,
        name: &str,
    ) -> Result<&VariableInfo, ScopeError> {
        if !IDENTIFIER_RE.is_match(name) {
            return Err(ScopeError::InvalidIdentifier(name.to_string()));
        }
        if RESERVED_IDENTIFIERS.contains(name) {
            return Err(ScopeError::ReservedIdentifier(name.to_string()));
        }

        let layer = self.layers.last_mut().unwrap_or(&mut self.root);
        layer.add_variable(type_name, name);
        Ok(&layer.variables[name])
    }

    /// Innermost-to-outermost search; first match wins, so inner layers
    /// shadow outer ones. `None` means the identifier is unresolved.
    pub fn find_variable(&self, name: &str) -> Option<&VariableInfo> {
        for layer in self.layers.iter().rev() {
            if let Some(info) = layer.variables.get(name) {
                return Some(info);
            }
        }
        self.root.variables.get(name)
    }

    /// Methods can only come from the component itself, never from the
    /// template, so only the root layer is consulted. Lets the expression
    /// compiler tell a method call apart from a computed-property read.
    /// Parameter matching is left to the generated code's own compiler.
    pub fn has_method(&self, name: &str) -> bool {
        self.root.methods.contains(name)
    }

    /// Number of layers currently on the stack, the root included.
    pub fn depth(&self) -> usize {
        self.layers.len() + 1
    }

    /// Map a short class name to its fully qualified name for type
    /// references inside template expressions.
    pub fn add_import(&mut self, fully_qualified: &str) {
        let short = fully_qualified
            .rsplit('.')
            .next()
            .unwrap_or(fully_qualified);
        self.imports
            .insert(short.to_string(), fully_qualified.to_string());
    }

    /// Qualified name for `class_name` when imported; otherwise the input
    /// unchanged. Final name validity is the generated code's compiler's
    /// problem, not ours.
    pub fn resolve_class_name<'a>(&'a self, class_name: &'a str) -> &'a str {
        match self.imports.get(class_name) {
            Some(qualified) => qualified.as_str(),
            None => class_name,
        }
    }

    pub fn has_import(&self, class_name: &str) -> bool {
        self.imports.contains_key(class_name)
    }
}
