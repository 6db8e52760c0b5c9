//! Constructor synthesis
//!
//! A factory forwards its arguments to a wrapped-implementation constructor,
//! hands the result to the agent, and returns as soon as the run loop is
//! launched.

use heck::ToSnakeCase;
use serde::Serialize;

use super::error::{SynthError, SynthResult};
use super::normalize::{NormalizedField, is_identifier, normalize};
use crate::schema::{SchemaPool, TypeRef};

/// A factory emitted for one wrapped constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstructorSpec {
    /// Wrapped constructor to call.
    pub wrapped_constructor: String,
    /// Generated factory name.
    pub factory: String,
    /// Factory parameters, forwarded in order.
    pub params: Vec<NormalizedField>,
    /// Type the wrapped constructor returns.
    pub wrapped_type: TypeRef,
}

impl ConstructorSpec {
    /// Argument names passed through to the wrapped constructor.
    pub fn forwarded(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|param| param.name.as_str())
    }
}

/// Locate constructor `name` in `pool` and build its factory.
pub fn synthesize(pool: &SchemaPool, name: &str) -> SynthResult<ConstructorSpec> {
    let constructor = pool.constructor(name)?;
    // Pasted verbatim into the factory body as a path expression.
    if let Some(segment) = name.split("::").find(|segment| !is_identifier(segment)) {
        return Err(SynthError::unsupported(
            name,
            format!("`{}` is not a usable path segment", segment),
        ));
    }
    let normalized = normalize(constructor)?;

    let mut outputs = normalized.outputs.into_iter();
    let wrapped_type = match (outputs.next(), outputs.next()) {
        (Some(output), None) => output.ty,
        (None, _) => {
            return Err(SynthError::unsupported(
                name,
                "constructor returns nothing to wrap",
            ));
        }
        (Some(_), Some(_)) => {
            return Err(SynthError::unsupported(
                name,
                "constructor must return exactly one value",
            ));
        }
    };

    Ok(ConstructorSpec {
        wrapped_constructor: normalized.name,
        factory: format!("{}_agent", name.to_snake_case()),
        params: normalized.inputs,
        wrapped_type,
    })
}
