//! Per-unit compilation orchestration.
//!
//! One unit is one component class: classify, build the descriptor, build
//! the bridge plan, emit — all synchronous, no I/O. A fatal diagnostic
//! suppresses emission for that unit only. `compile_all` fans independent
//! units out over a thread pool; the classification cache is the only state
//! they share.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::bridge::build_bridge_plan;
use crate::cache::ClassificationCache;
use crate::classify::classify_component;
use crate::descriptor::{build_descriptor, OptionsDescriptor};
use crate::diagnostics::{Diagnostic, DiagnosticSink, ERR_UNKNOWN_CLASS};
use crate::emit::emit_bridge;
use crate::model::ClassGraph;
use crate::registry::{global_registry, RegistrationEntry};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    /// Record successful units in the process-wide bridge registry. Build
    /// drivers set this; analysis-only callers leave it off.
    #[serde(default)]
    pub register: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResult {
    pub class_name: String,
    pub descriptor: Option<OptionsDescriptor>,
    pub descriptor_json: Option<String>,
    pub bridge_source: Option<String>,
    pub registration: Option<RegistrationEntry>,
    pub diagnostics: Vec<Diagnostic>,
    pub has_errors: bool,
}

impl CompileResult {
    fn failed(class_name: &str, diagnostics: Vec<Diagnostic>) -> Self {
        CompileResult {
            class_name: class_name.to_string(),
            descriptor: None,
            descriptor_json: None,
            bridge_source: None,
            registration: None,
            diagnostics,
            has_errors: true,
        }
    }
}

pub fn compile_component_internal(
    graph: &ClassGraph,
    qualified_name: &str,
    cache: &ClassificationCache,
    _options: &CompileOptions,
) -> CompileResult {
    let Some(model) = graph.get(qualified_name) else {
        return CompileResult::failed(
            qualified_name,
            vec![Diagnostic::error(
                ERR_UNKNOWN_CLASS,
                &format!("Component class `{}` is not registered.", qualified_name),
                qualified_name,
                None,
            )],
        );
    };

    let mut sink = DiagnosticSink::new();

    let members = match cache.get(model) {
        Some(members) => members,
        None => {
            let members = Arc::new(classify_component(graph, model, &mut sink));
            // Only clean classifications are memoized: a cached entry cannot
            // replay the diagnostics that came with it.
            if !sink.is_fatal(qualified_name) {
                cache.insert(model, members.clone());
            }
            members
        }
    };

    let descriptor = build_descriptor(model, &members, &mut sink);
    let plan = build_bridge_plan(model, &members);

    if sink.is_fatal(qualified_name) {
        return CompileResult::failed(qualified_name, sink.into_diagnostics());
    }

    let descriptor_json = descriptor.to_json();
    let bridge_source = emit_bridge(&plan, &descriptor);

    CompileResult {
        class_name: qualified_name.to_string(),
        descriptor: Some(descriptor),
        descriptor_json: Some(descriptor_json),
        bridge_source: Some(bridge_source),
        registration: Some(plan.registration),
        diagnostics: sink.into_diagnostics(),
        has_errors: false,
    }
}

/// Compile independent units concurrently. Results come back in input order,
/// and registrations (when enabled) are recorded in input order too, so a
/// rebuild of the same graph is fully deterministic.
pub fn compile_all(
    graph: &ClassGraph,
    qualified_names: &[String],
    cache: &ClassificationCache,
    options: &CompileOptions,
) -> Vec<CompileResult> {
    let results: Vec<CompileResult> = qualified_names
        .par_iter()
        .map(|name| compile_component_internal(graph, name, cache, options))
        .collect();

    if options.register {
        let mut registry = global_registry().lock().expect("bridge registry poisoned");
        for result in &results {
            if let Some(entry) = &result.registration {
                registry.register(entry.clone());
            }
        }
    }

    results
}
