//! Rust rendering of a synthesized [`AgentSpec`]
//!
//! The renderer is a straight walk over an `AgentSpec`: it makes no decisions of its
//! own beyond spelling, so two equal specs always render to the same text.
//!
//! Generated agents come in two halves. The `<I>Agent` handle is `Send + Sync`
//! and is shared by reference between callers; the `<I>AgentLoop<W>` owns the
//! wrapped value and runs on its own named thread. Every channel between them
//! is a `crossbeam_channel::bounded(0)` rendezvous channel.

/// Inlined lifecycle support for `-I`.
pub mod boilerplate;
/// Indentation-aware line writer.
pub mod writer;

use tracing::debug;

use self::writer::SourceWriter;
use crate::synth::{AgentSpec, ConstructorSpec, DispatchArm, MethodSpec, NormalizedField};

pub use self::writer::INDENT;

/// Where generated code finds what it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Module path of the wrapped interface, its constructors and field types.
    pub import_path: String,
    /// Module path of the runtime support types; ignored with `emit_lifecycle`.
    pub runtime_path: String,
    /// Inline the runtime support into the generated file.
    pub emit_lifecycle: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            import_path: "super".to_string(),
            runtime_path: "gadget::runtime".to_string(),
            emit_lifecycle: false,
        }
    }
}

/// Render `spec` as a Rust source file.
pub fn render_agent(spec: &AgentSpec, options: &RenderOptions) -> String {
    debug!(
        interface = %spec.interface(),
        import_path = %options.import_path,
        emit_lifecycle = options.emit_lifecycle,
        "rendering agent"
    );

    let mut w = SourceWriter::new();
    write_header(&mut w, spec);
    write_imports(&mut w, spec, options);
    if options.emit_lifecycle {
        w.blank();
        boilerplate::write_runtime_module(&mut w);
    }

    for method in &spec.layout.methods {
        write_messages(&mut w, spec, method);
    }
    write_agent_struct(&mut w, spec);
    write_loop_struct(&mut w, spec);
    write_agent_impl(&mut w, spec);
    write_lifecycle_impl(&mut w, spec);
    write_run_loop(&mut w, spec);
    for ctor in &spec.constructors {
        write_factory(&mut w, spec, ctor);
    }

    w.finish()
}

/// Render `spec` itself as pretty JSON.
pub fn render_spec_json(spec: &AgentSpec) -> serde_json::Result<String> {
    serde_json::to_string_pretty(spec)
}

fn write_header(w: &mut SourceWriter, spec: &AgentSpec) {
    w.line(format!(
        "// THIS CODE WAS GENERATED BY gadget {}",
        env!("CARGO_PKG_VERSION")
    ));
    w.line("// ANY CHANGES TO THIS FILE MAY BE OVERWRITTEN");
    w.line("//");
    w.line(format!("// agent for: {}", spec.interface()));
    w.line(format!("// schema fingerprint: {}", spec.fingerprint()));
    w.blank();
}

fn write_imports(w: &mut SourceWriter, spec: &AgentSpec, options: &RenderOptions) {
    if spec.layout.is_lifecycle_only() {
        w.line("use crossbeam_channel::select;");
    } else {
        w.line("use crossbeam_channel::{Receiver, Sender, bounded, select};");
    }

    let runtime_path = if options.emit_lifecycle {
        boilerplate::runtime_path()
    } else {
        options.runtime_path.clone()
    };
    w.line(format!(
        "use {}::{{Agent, AgentError, AgentState, Control, Lifecycle}};",
        runtime_path
    ));

    // Field types are opaque, so everything the wrapped module exports is
    // brought into scope.
    w.line(format!("use {}::*;", options.import_path));
}

fn write_messages(w: &mut SourceWriter, spec: &AgentSpec, method: &MethodSpec) {
    let shapes = [
        (&method.request, "Arguments of"),
        (&method.response, "Results of"),
    ];

    for (shape, what) in shapes {
        w.blank();
        w.line(format!("/// {} `{}::{}`.", what, spec.interface(), method.name));
        if shape.is_empty() {
            w.line(format!("pub struct {} {{}}", shape.type_name));
            continue;
        }
        w.block(format!("pub struct {} {{", shape.type_name), "}", |w| {
            for field in &shape.fields {
                w.line(format!("pub {}: {},", field.name, field.ty));
            }
        });
    }
}

fn write_agent_struct(w: &mut SourceWriter, spec: &AgentSpec) {
    let layout = &spec.layout;

    w.blank();
    w.line(format!(
        "/// Serializes every call on a `{}` through a single run loop.",
        layout.interface
    ));
    w.block(format!("pub struct {} {{", layout.agent), "}", |w| {
        w.line(format!(
            "/// Owns the `{}` channel (capacity {}) and the `{}` field (initially {}).",
            layout.signal.field, layout.signal.capacity, layout.state.field, layout.state.initial
        ));
        w.line("lifecycle: Lifecycle,");
        for method in &layout.methods {
            w.line(format!(
                "{}: Sender<{}>,",
                method.request_channel.field, method.request_channel.message
            ));
            w.line(format!(
                "{}: Receiver<{}>,",
                method.response_channel.field, method.response_channel.message
            ));
        }
    });
}

fn write_loop_struct(w: &mut SourceWriter, spec: &AgentSpec) {
    let layout = &spec.layout;

    w.blank();
    w.line(format!(
        "/// Run-loop half of `{}`; the only owner of the wrapped value.",
        layout.agent
    ));
    w.block(format!("struct {}<W> {{", layout.loop_type), "}", |w| {
        w.line(format!("{}: W,", layout.wrapped.field));
        for method in &layout.methods {
            w.line(format!(
                "{}: Receiver<{}>,",
                method.request_channel.field, method.request_channel.message
            ));
            w.line(format!(
                "{}: Sender<{}>,",
                method.response_channel.field, method.response_channel.message
            ));
        }
    });
}

fn write_agent_impl(w: &mut SourceWriter, spec: &AgentSpec) {
    let layout = &spec.layout;

    w.blank();
    w.block(format!("impl {} {{", layout.agent), "}", |w| {
        write_spawn(w, spec);
        for method in &layout.methods {
            w.blank();
            write_forwarder(w, spec, method);
        }
    });
}

fn write_spawn(w: &mut SourceWriter, spec: &AgentSpec) {
    let layout = &spec.layout;
    let wrapped = &layout.wrapped.field;

    w.line(format!(
        "/// Take exclusive ownership of `{}` and launch the run loop.",
        wrapped
    ));
    w.line(format!(
        "pub fn spawn<W>({}: W) -> Result<Self, AgentError>",
        wrapped
    ));
    w.line("where");
    w.indented(|w| w.line(format!("W: {} + Send + 'static,", layout.wrapped.bound)));
    w.block("{", "}", |w| {
        for method in &layout.methods {
            for channel in [&method.request_channel, &method.response_channel] {
                w.line(format!(
                    "let ({0}_tx, {0}_rx) = bounded({1});",
                    channel.field, channel.capacity
                ));
            }
        }
        if !layout.methods.is_empty() {
            w.blank();
        }

        w.block(format!("let agent_loop = {} {{", layout.loop_type), "};", |w| {
            w.line(format!("{},", wrapped));
            for method in &layout.methods {
                w.line(format!("{0}: {0}_rx,", method.request_channel.field));
                w.line(format!("{0}: {0}_tx,", method.response_channel.field));
            }
        });
        w.line(format!(
            "let lifecycle = Lifecycle::launch(\"{}\", move |control| agent_loop.run(control))?;",
            layout.agent
        ));
        w.blank();

        w.block("Ok(Self {", "})", |w| {
            w.line("lifecycle,");
            for method in &layout.methods {
                w.line(format!("{0}: {0}_tx,", method.request_channel.field));
                w.line(format!("{0}: {0}_rx,", method.response_channel.field));
            }
        });
    });
}

fn write_forwarder(w: &mut SourceWriter, spec: &AgentSpec, method: &MethodSpec) {
    let params = method
        .request
        .fields
        .iter()
        .map(|field| format!("{}: {}", field.name, field.ty))
        .collect::<Vec<_>>()
        .join(", ");
    let separator = if params.is_empty() { "" } else { ", " };
    let request: Vec<&str> = method.request.field_names().collect();
    let results: Vec<String> = method
        .response
        .field_names()
        .map(|name| format!("res.{}", name))
        .collect();

    w.line(format!(
        "/// Forward `{}::{}` to the run loop and wait for its results.",
        spec.interface(),
        method.name
    ));
    w.block(
        format!(
            "pub fn {}(&self{}{}) -> Result<{}, AgentError> {{",
            method.name,
            separator,
            params,
            return_type(&method.response.fields)
        ),
        "}",
        |w| {
            w.line(format!(
                "self.{}.send({}).map_err(|_| AgentError::Closed)?;",
                method.request_channel.field,
                struct_literal(&method.request.type_name, &request)
            ));
            if results.is_empty() {
                w.line(format!(
                    "self.{}.recv().map_err(|_| AgentError::Closed)?;",
                    method.response_channel.field
                ));
            } else {
                w.line(format!(
                    "let res = self.{}.recv().map_err(|_| AgentError::Closed)?;",
                    method.response_channel.field
                ));
            }
            w.line(format!("Ok({})", tuple(&results)));
        },
    );
}

fn write_lifecycle_impl(w: &mut SourceWriter, spec: &AgentSpec) {
    w.blank();
    w.block(format!("impl Agent for {} {{", spec.layout.agent), "}", |w| {
        for (i, signal) in ["start", "stop", "close"].into_iter().enumerate() {
            if i > 0 {
                w.blank();
            }
            w.block(
                format!("fn {}(&self) -> Result<(), AgentError> {{", signal),
                "}",
                |w| w.line(format!("self.lifecycle.{}()", signal)),
            );
        }
        w.blank();
        w.block("fn state(&self) -> AgentState {", "}", |w| {
            w.line("self.lifecycle.state()")
        });
    });
}

fn write_run_loop(w: &mut SourceWriter, spec: &AgentSpec) {
    let layout = &spec.layout;
    let wrapped = &layout.wrapped.field;

    w.blank();
    w.block(
        format!("impl<W: {}> {}<W> {{", layout.wrapped.bound, layout.loop_type),
        "}",
        |w| {
            w.line("/// Service one ready channel per iteration until closed.");
            w.line("///");
            w.line("/// | state | signal | next | effect |");
            w.line("/// |-------|--------|------|--------|");
            for t in &spec.run_loop.transitions {
                w.line(format!(
                    "/// | {} | {} | {} | {} |",
                    t.from,
                    t.signal,
                    t.to,
                    t.effect.as_str()
                ));
            }
            w.block("fn run(self, control: Control) {", "}", |w| {
                if layout.is_lifecycle_only() {
                    w.line(format!("let Self {{ {0}: _{0} }} = self;", wrapped));
                } else {
                    w.line("#[allow(unused_mut)]");
                    w.block("let Self {", "} = self;", |w| {
                        w.line(format!("mut {},", wrapped));
                        for method in &layout.methods {
                            w.line(format!("{},", method.request_channel.field));
                            w.line(format!("{},", method.response_channel.field));
                        }
                    });
                }
                w.blank();

                w.block("loop {", "}", |w| {
                    w.block("select! {", "}", |w| {
                        w.block("recv(control.signals()) -> signal => {", "}", |w| {
                            w.block("if control.apply(signal).is_exit() {", "}", |w| {
                                w.line("return;")
                            });
                        });
                        for arm in &spec.run_loop.arms {
                            write_arm(w, wrapped, arm);
                        }
                    });
                });
            });
        },
    );
}

fn write_arm(w: &mut SourceWriter, wrapped: &str, arm: &DispatchArm) {
    w.block(
        format!("recv({}) -> msg => {{", arm.request_channel),
        "}",
        |w| {
            if arm.arguments.is_empty() {
                w.block("if msg.is_err() {", "}", |w| w.line("return;"));
            } else {
                w.block("let Ok(msg) = msg else {", "};", |w| w.line("return;"));
            }

            let args = arm
                .arguments
                .iter()
                .map(|name| format!("msg.{}", name))
                .collect::<Vec<_>>()
                .join(", ");
            let call = format!("{}.{}({})", wrapped, arm.method, args);
            match arm.results.len() {
                0 => w.line(format!("{};", call)),
                _ => w.line(format!("let {} = {};", tuple(&arm.results), call)),
            }

            let results: Vec<&str> = arm.results.iter().map(String::as_str).collect();
            w.block(
                format!(
                    "if {}.send({}).is_err() {{",
                    arm.response_channel,
                    struct_literal(&arm.response_type, &results)
                ),
                "}",
                |w| w.line("return;"),
            );
        },
    );
}

fn write_factory(w: &mut SourceWriter, spec: &AgentSpec, ctor: &ConstructorSpec) {
    let params = ctor
        .params
        .iter()
        .map(|param| format!("{}: {}", param.name, param.ty))
        .collect::<Vec<_>>()
        .join(", ");
    let args = ctor.forwarded().collect::<Vec<_>>().join(", ");

    w.blank();
    w.line(format!(
        "/// Build a `{}` with `{}` and wrap it in a running `{}`.",
        ctor.wrapped_type, ctor.wrapped_constructor, spec.layout.agent
    ));
    w.block(
        format!(
            "pub fn {}({}) -> Result<{}, AgentError> {{",
            ctor.factory, params, spec.layout.agent
        ),
        "}",
        |w| {
            w.line(format!(
                "let {} = {}({});",
                spec.layout.wrapped.field, ctor.wrapped_constructor, args
            ));
            w.line(format!(
                "{}::spawn({})",
                spec.layout.agent, spec.layout.wrapped.field
            ));
        },
    );
}

/// `Name {}` or `Name { a, b }` using field init shorthand.
fn struct_literal(type_name: &str, fields: &[&str]) -> String {
    if fields.is_empty() {
        format!("{} {{}}", type_name)
    } else {
        format!("{} {{ {} }}", type_name, fields.join(", "))
    }
}

/// `()`, a lone value, or a parenthesized tuple.
fn tuple<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => "()".to_string(),
        [one] => one.as_ref().to_string(),
        many => format!(
            "({})",
            many.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ")
        ),
    }
}

fn return_type(fields: &[NormalizedField]) -> String {
    let types: Vec<&str> = fields.iter().map(|field| field.ty.as_str()).collect();
    tuple(&types)
}
