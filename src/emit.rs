//! Bridge source emission.
//!
//! Serializes a [`BridgePlan`] plus its descriptor to the JavaScript the
//! runtime loads next to the compiled component classes. Pure function of
//! its inputs — an unchanged plan always emits byte-identical source. The
//! emitted code contains exactly one branch, the creation guard check, and
//! no error handling: everything that can go wrong went wrong at compile
//! time.

use crate::bridge::{BridgePlan, CONSTRUCTOR_NAMESPACE, CREATED_HOOK_NAME, RENDER_HOOK_NAME};
use crate::descriptor::{Directive, OptionsDescriptor};

fn js_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn js_string_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| js_string(v))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn emit_bridge(plan: &BridgePlan, descriptor: &OptionsDescriptor) -> String {
    let mut out = String::new();

    out.push_str("// Generated by the Lattice compiler. Do not edit.\n");
    out.push_str(&format!(
        "class {} extends {} {{\n",
        plan.bridge_name, plan.parent_class
    ));

    for field in &plan.shadow_fields {
        out.push_str(&format!("  {}; // {}\n", field.name, field.type_name));
    }
    out.push_str(&format!("  {} = false;\n", plan.created.guard_field));
    out.push('\n');

    emit_options_method(descriptor, &mut out);

    for proxy in &plan.proxies {
        let params = proxy.params.join(", ");
        let keyword = if proxy.returns_value { "return " } else { "" };
        out.push_str(&format!(
            "  {}({}) {{\n    {}super.{}({});\n  }}\n\n",
            proxy.name, params, keyword, proxy.name, params
        ));
    }

    emit_created_hook(plan, &mut out);

    if plan.render.is_some() {
        out.push_str(&format!(
            "\n  {}(createElement) {{\n    return super.render(new Lattice.VNodeBuilder(createElement));\n  }}\n",
            RENDER_HOOK_NAME
        ));
    }

    out.push_str("}\n\n");

    out.push_str(&format!(
        "{}[{}] = {};\n",
        CONSTRUCTOR_NAMESPACE,
        js_string(&crate::bridge::constructor_key(&plan.class_name)),
        plan.bridge_name
    ));
    out.push_str(&format!(
        "Lattice.onReady(() => Lattice.register({}, () => {}));\n",
        js_string(&plan.registration.qualified_name),
        plan.bridge_name
    ));

    out
}

fn emit_created_hook(plan: &BridgePlan, out: &mut String) {
    let guard = &plan.created.guard_field;

    out.push_str(&format!("  {}() {{\n", CREATED_HOOK_NAME));
    out.push_str(&format!("    if (this.{}) return;\n", guard));
    out.push_str(&format!("    this.{} = true;\n", guard));

    if let Some(injection) = &plan.created.injection {
        out.push_str(&format!(
            "    const dependencies = this.$options.getProvider({}).get();\n",
            js_string(&injection.holder_key)
        ));
        for field in &injection.field_copies {
            out.push_str(&format!("    this.{} = dependencies.{};\n", field, field));
        }
        for call in &injection.method_calls {
            let args = call
                .args
                .iter()
                .map(|a| format!("dependencies.{}", a))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("    this.{}({});\n", call.method, args));
        }
    }

    out.push_str(&format!(
        "    Lattice.getConstructor({}).call(this);\n",
        js_string(&plan.class_name)
    ));

    if plan.created.call_created {
        out.push_str("    super.created();\n");
    }

    out.push_str("  }\n");
}

fn emit_options_method(descriptor: &OptionsDescriptor, out: &mut String) {
    out.push_str("  static lattice$options() {\n");
    out.push_str("    const options = new Lattice.ComponentOptions();\n");
    for directive in &descriptor.directives {
        out.push_str("    ");
        out.push_str(&directive_statement(directive));
        out.push('\n');
    }
    out.push_str("    return options;\n");
    out.push_str("  }\n\n");
}

fn directive_statement(directive: &Directive) -> String {
    match directive {
        Directive::SetName(d) => format!("options.setName({});", js_string(&d.name)),
        Directive::InitData(d) => format!(
            "options.initData({}, {});",
            d.use_factory,
            js_string_list(&d.fields)
        ),
        Directive::AddProp(d) => {
            let tag = match &d.type_tag {
                Some(tag) => js_string(tag),
                None => "null".to_string(),
            };
            format!(
                "options.addProp({}, {}, {});",
                js_string(&d.name),
                d.required,
                tag
            )
        }
        Directive::AddComputed(d) => {
            let kind = match d.kind {
                crate::classify::ComputedKind::Getter => "getter",
                crate::classify::ComputedKind::Setter => "setter",
            };
            format!(
                "options.addComputed({}, {}, {});",
                js_string(&d.method),
                js_string(&d.property),
                js_string(kind)
            )
        }
        Directive::AddWatch(d) => format!(
            "options.addWatch({}, {}, {});",
            js_string(&d.method),
            js_string(&d.path),
            d.deep
        ),
        Directive::AddPropValidator(d) => format!(
            "options.addPropValidator({}, {});",
            js_string(&d.method),
            js_string(&d.property)
        ),
        Directive::AddPropDefault(d) => format!(
            "options.addPropDefault({}, {});",
            js_string(&d.method),
            js_string(&d.property)
        ),
        Directive::AddHook(d) => format!(
            "options.addHook({}, {});",
            js_string(&d.event),
            js_string(&d.handler)
        ),
        Directive::AddMethods(d) => {
            format!("options.addMethods({});", js_string_list(&d.methods))
        }
    }
}
