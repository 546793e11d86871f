//! Class metadata input boundary for the Lattice compiler.
//!
//! Component classes never reach the compiler as source text. The build-tool
//! frontend reflects over the host language and hands us an in-memory
//! [`ComponentClassModel`] per class: declared members with their markers,
//! the declared supertype, implemented capability interfaces, and resolved
//! override relationships. Everything downstream (classification, descriptor
//! building, bridge codegen) reads this model and nothing else.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Capability interface a component implements to receive the created hook.
pub const HAS_CREATED_CAPABILITY: &str = "lattice.core.HasCreated";
/// Capability interface a component implements to provide a custom render.
pub const HAS_RENDER_CAPABILITY: &str = "lattice.core.HasRender";

lazy_static::lazy_static! {
    /// Lifecycle events the Lattice runtime fires on every component instance.
    pub static ref LIFECYCLE_EVENTS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("beforeCreate");
        s.insert("created");
        s.insert("beforeMount");
        s.insert("mounted");
        s.insert("beforeUpdate");
        s.insert("updated");
        s.insert("activated");
        s.insert("deactivated");
        s.insert("beforeDestroy");
        s.insert("destroyed");
        s
    };
}

/// A type reference as the frontend resolved it.
///
/// Closed by construction: the compiler only ever needs to distinguish the
/// host primitives, ordered sequences, and "some declared type".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TypeRef {
    Void,
    Bool,
    Int,
    Byte,
    Short,
    Long,
    Float,
    Double,
    Char,
    String,
    Sequence { element: Box<TypeRef> },
    Named { qualified: String },
}

impl TypeRef {
    /// Printable type name, used when seeding template scope layers.
    pub fn type_name(&self) -> std::string::String {
        match self {
            TypeRef::Void => "void".to_string(),
            TypeRef::Bool => "boolean".to_string(),
            TypeRef::Int => "int".to_string(),
            TypeRef::Byte => "byte".to_string(),
            TypeRef::Short => "short".to_string(),
            TypeRef::Long => "long".to_string(),
            TypeRef::Float => "float".to_string(),
            TypeRef::Double => "double".to_string(),
            TypeRef::Char => "char".to_string(),
            TypeRef::String => "String".to_string(),
            TypeRef::Sequence { element } => format!("{}[]", element.type_name()),
            TypeRef::Named { qualified } => qualified.clone(),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "marker", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FieldMarker {
    /// The field is a prop passed from the parent component.
    Prop {
        #[serde(default)]
        required: bool,
        /// When set, the runtime type-checks incoming values against the
        /// field's type tag.
        #[serde(default)]
        check_type: bool,
    },
    /// The field is populated from the dependency holder on creation.
    Inject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "marker", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MethodMarker {
    Computed {
        /// Explicit property name. When absent the name is derived from the
        /// method name (`getFullName` -> `fullName`).
        #[serde(default)]
        property: Option<String>,
    },
    Watch {
        path: String,
        #[serde(default)]
        deep: bool,
    },
    PropValidator {
        property: String,
    },
    PropDefault {
        property: String,
    },
    Hook,
    /// The method's parameters are supplied from the dependency holder.
    Inject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamModel {
    pub name: String,
    pub type_ref: TypeRef,
}

/// A resolved override target: `owner` is the qualified name of the class or
/// interface declaring the overridden method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodRef {
    pub owner: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldModel {
    pub name: String,
    pub type_ref: TypeRef,
    /// Whether the runtime can address this field on the instance.
    #[serde(default)]
    pub runtime_visible: bool,
    #[serde(default)]
    pub markers: Vec<FieldMarker>,
}

impl FieldModel {
    pub fn prop_marker(&self) -> Option<&FieldMarker> {
        self.markers
            .iter()
            .find(|m| matches!(m, FieldMarker::Prop { .. }))
    }

    pub fn is_prop(&self) -> bool {
        self.prop_marker().is_some()
    }

    pub fn is_injected(&self) -> bool {
        self.markers.iter().any(|m| matches!(m, FieldMarker::Inject))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodModel {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamModel>,
    pub return_type: TypeRef,
    #[serde(default)]
    pub runtime_visible: bool,
    #[serde(default)]
    pub markers: Vec<MethodMarker>,
    /// Override targets, resolved by the frontend through the host language's
    /// override relationship. Never reconstructed here by name matching.
    #[serde(default)]
    pub overrides: Vec<MethodRef>,
}

impl MethodModel {
    pub fn computed_marker(&self) -> Option<&MethodMarker> {
        self.markers
            .iter()
            .find(|m| matches!(m, MethodMarker::Computed { .. }))
    }

    pub fn watch_marker(&self) -> Option<(&str, bool)> {
        self.markers.iter().find_map(|m| match m {
            MethodMarker::Watch { path, deep } => Some((path.as_str(), *deep)),
            _ => None,
        })
    }

    pub fn prop_validator_marker(&self) -> Option<&str> {
        self.markers.iter().find_map(|m| match m {
            MethodMarker::PropValidator { property } => Some(property.as_str()),
            _ => None,
        })
    }

    pub fn prop_default_marker(&self) -> Option<&str> {
        self.markers.iter().find_map(|m| match m {
            MethodMarker::PropDefault { property } => Some(property.as_str()),
            _ => None,
        })
    }

    pub fn is_hook_tagged(&self) -> bool {
        self.markers.iter().any(|m| matches!(m, MethodMarker::Hook))
    }

    pub fn is_injected(&self) -> bool {
        self.markers
            .iter()
            .any(|m| matches!(m, MethodMarker::Inject))
    }

    pub fn overrides_method(&self, owner: &str, name: &str) -> bool {
        self.overrides
            .iter()
            .any(|r| r.owner == owner && r.name == name)
    }
}

/// An implemented interface, carrying its declared methods so hook contracts
/// can be honored without an explicit tag on the component class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceModel {
    pub qualified_name: String,
    #[serde(default)]
    pub methods: Vec<MethodModel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentClassModel {
    pub qualified_name: String,
    /// Component tag name registered with the runtime, when the author set
    /// one on the class marker.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Whether instance data is produced through a factory rather than a
    /// shared prototype copy.
    #[serde(default)]
    pub use_factory: bool,
    /// Declared supertype. `None` for classes extending the runtime base
    /// component directly.
    #[serde(default)]
    pub super_class: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceModel>,
    #[serde(default)]
    pub fields: Vec<FieldModel>,
    #[serde(default)]
    pub methods: Vec<MethodModel>,
}

impl ComponentClassModel {
    pub fn implements(&self, capability: &str) -> bool {
        self.interfaces
            .iter()
            .any(|i| i.qualified_name == capability)
    }

    pub fn short_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }
}

/// All component classes of a compilation, keyed by qualified name.
///
/// The ancestor chain of a class is materialized once per query as an
/// explicit ordered list (closest ancestor first) by iteratively walking the
/// declared-supertype relation. The walk stops at the first supertype that is
/// not a registered component class (i.e. the runtime base component or a
/// runtime-native component).
#[derive(Debug, Default)]
pub struct ClassGraph {
    classes: HashMap<String, ComponentClassModel>,
}

impl ClassGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, model: ComponentClassModel) {
        self.classes.insert(model.qualified_name.clone(), model);
    }

    pub fn get(&self, qualified_name: &str) -> Option<&ComponentClassModel> {
        self.classes.get(qualified_name)
    }

    /// Ordered ancestor chain for `qualified_name`, closest ancestor first.
    /// The class itself is not included. Cycles in the supertype relation are
    /// broken at the first repeated class.
    pub fn lineage(&self, qualified_name: &str) -> Vec<&ComponentClassModel> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(qualified_name.to_string());

        let mut current = self
            .get(qualified_name)
            .and_then(|c| c.super_class.as_deref());

        while let Some(super_name) = current {
            if !visited.insert(super_name.to_string()) {
                break;
            }
            match self.get(super_name) {
                Some(ancestor) => {
                    chain.push(ancestor);
                    current = ancestor.super_class.as_deref();
                }
                None => break,
            }
        }

        chain
    }

    /// Number of component ancestors. Embedded in generated guard-field names
    /// so every level of a chain owns a distinct creation guard.
    pub fn ancestor_depth(&self, qualified_name: &str) -> usize {
        self.lineage(qualified_name).len()
    }
}
