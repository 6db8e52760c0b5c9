//! Signature normalization
//!
//! Turns a raw signature into two ordered field lists where every field has a
//! name: declared names are kept verbatim, unnamed entries get a positional
//! `arg<N>` / `val<N>` name (1-based over the expanded list), and grouped
//! declarations expand into one field per name.

use std::collections::HashSet;

use serde::Serialize;

use super::error::{FieldRole, SynthError, SynthResult};
use crate::schema::{Parameter, Signature, TypeRef};

/// Words that cannot be used as field or method names in generated code.
const RESERVED: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait",
    "true", "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do",
    "final", "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// A field with its resolved name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedField {
    /// Declared or synthesized name, unique within its list.
    pub name: String,
    /// Declared type, untouched.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// 1-based position in the expanded list.
    pub position: usize,
}

/// A signature whose inputs and outputs all have unique names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedSignature {
    /// Function name.
    pub name: String,
    /// Parameters, expanded and named.
    pub inputs: Vec<NormalizedField>,
    /// Returns, expanded and named.
    pub outputs: Vec<NormalizedField>,
}

/// Normalize a method or constructor signature.
pub fn normalize<S: Signature + ?Sized>(signature: &S) -> SynthResult<NormalizedSignature> {
    let name = signature.name();
    let inputs = normalize_fields(name, signature.params(), FieldRole::Input)?;
    let outputs = normalize_fields(name, signature.returns(), FieldRole::Output)?;

    Ok(NormalizedSignature {
        name: name.to_string(),
        inputs,
        outputs,
    })
}

fn normalize_fields(
    signature: &str,
    list: &[Parameter],
    role: FieldRole,
) -> SynthResult<Vec<NormalizedField>> {
    let mut fields: Vec<NormalizedField> = Vec::with_capacity(list.len());

    for param in list {
        if param.ty.as_str().trim().is_empty() {
            return Err(SynthError::unsupported(
                signature,
                format!("entry {} of the {} has no type", fields.len() + 1, role),
            ));
        }

        if param.names.is_empty() {
            let position = fields.len() + 1;
            fields.push(NormalizedField {
                name: format!("{}{}", role.prefix(), position),
                ty: param.ty.clone(),
                position,
            });
            continue;
        }

        for name in &param.names {
            check_identifier(signature, name)?;
            fields.push(NormalizedField {
                name: name.clone(),
                ty: param.ty.clone(),
                position: fields.len() + 1,
            });
        }
    }

    let mut seen = HashSet::with_capacity(fields.len());
    for field in &fields {
        if !seen.insert(field.name.as_str()) {
            return Err(SynthError::DuplicateFieldName {
                signature: signature.to_string(),
                role,
                field: field.name.clone(),
            });
        }
    }

    Ok(fields)
}

/// Whether `name` can be used verbatim as an identifier in generated code.
///
/// Non-ASCII letters are accepted, as in Rust source; keywords are not.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_') {
        return false;
    }
    if name == "_" || RESERVED.contains(&name) {
        return false;
    }
    chars.all(|ch| ch.is_alphanumeric() || ch == '_')
}

pub(crate) fn check_identifier(signature: &str, name: &str) -> SynthResult<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(SynthError::unsupported(
            signature,
            format!("`{}` is not a usable identifier", name),
        ))
    }
}
