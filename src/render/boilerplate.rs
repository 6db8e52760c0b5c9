//! Inlined runtime support for `-I`.

use super::writer::SourceWriter;
use crate::runtime::LIFECYCLE_SOURCE;

/// Module name the inlined runtime is placed under.
pub const RUNTIME_MODULE: &str = "agent_runtime";

/// Path generated code imports the inlined runtime from.
pub fn runtime_path() -> String {
    format!("self::{}", RUNTIME_MODULE)
}

/// Write the lifecycle support module.
pub fn write_runtime_module(w: &mut SourceWriter) {
    w.line("/// Lifecycle support inlined by `gadget -I`.");
    w.line("#[allow(dead_code)]");
    w.block(format!("pub mod {} {{", RUNTIME_MODULE), "}", |w| {
        w.text(LIFECYCLE_SOURCE.trim());
    });
}
