//! Message protocol synthesis
//!
//! Each method gets its own request shape (one field per input) and response
//! shape (one field per output). Shapes are never shared between methods,
//! even when two of them are structurally identical.

use std::collections::HashMap;

use heck::ToUpperCamelCase;
use serde::Serialize;

use super::error::{SynthError, SynthResult};
use super::normalize::{NormalizedField, NormalizedSignature, normalize};
use crate::schema::InterfaceSchema;

/// A named message type carrying one field per value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageShape {
    /// Generated type name.
    pub type_name: String,
    /// Fields, in signature order.
    pub fields: Vec<NormalizedField>,
}

impl MessageShape {
    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the shape carries no data (a pure synchronization token).
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names, in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }
}

/// Request and response shapes for one method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodProtocol {
    /// Method name.
    pub method: String,
    /// Arguments sent to the run loop.
    pub request: MessageShape,
    /// Results sent back to the caller.
    pub response: MessageShape,
}

/// Build the shapes for one normalized method of `interface`.
pub fn synthesize(interface: &str, signature: &NormalizedSignature) -> MethodProtocol {
    let stem = format!("{}{}", interface, signature.name.to_upper_camel_case());

    MethodProtocol {
        method: signature.name.clone(),
        request: MessageShape {
            type_name: format!("{}Request", stem),
            fields: signature.inputs.clone(),
        },
        response: MessageShape {
            type_name: format!("{}Response", stem),
            fields: signature.outputs.clone(),
        },
    }
}

/// Normalize every method of `interface` and build its protocol, in
/// declaration order.
///
/// Fails when two methods would produce the same message type name.
pub fn synthesize_interface(interface: &InterfaceSchema) -> SynthResult<Vec<MethodProtocol>> {
    let mut protocols = Vec::with_capacity(interface.methods.len());
    let mut owners: HashMap<String, String> = HashMap::new();

    for method in &interface.methods {
        let normalized = normalize(method)?;
        let protocol = synthesize(&interface.name, &normalized);

        for type_name in [&protocol.request.type_name, &protocol.response.type_name] {
            if let Some(owner) = owners.insert(type_name.clone(), protocol.method.clone()) {
                return Err(SynthError::unsupported(
                    &interface.name,
                    format!(
                        "methods `{}` and `{}` both map to message type `{}`",
                        owner, protocol.method, type_name
                    ),
                ));
            }
        }

        protocols.push(protocol);
    }

    Ok(protocols)
}
