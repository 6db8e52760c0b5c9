//! Interface schemas consumed by the generator
//!
//! The external extractor hands over already-parsed interfaces and
//! constructors as JSON. These types are the only view of the source program
//! the generator ever has: names and opaque type text, in declaration order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::synth::{SynthError, SynthResult};

/// Opaque reference to a type, carried verbatim into generated code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(pub String);

impl TypeRef {
    /// Wrap type text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Type text as written in the source.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeRef {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// One declaration in a parameter or return list.
///
/// `names` is empty for an unnamed entry and holds several names for a
/// grouped declaration such as `a, b int`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Declared names, possibly none.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

/// Return values share the parameter layout.
pub type Return = Parameter;

impl Parameter {
    /// Unnamed entry of type `ty`.
    pub fn unnamed(ty: impl Into<String>) -> Self {
        Self {
            names: Vec::new(),
            ty: TypeRef::new(ty),
        }
    }

    /// Single named entry.
    pub fn named(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            ty: TypeRef::new(ty),
        }
    }

    /// Several names declared against one type.
    pub fn grouped<I, N>(names: I, ty: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            ty: TypeRef::new(ty),
        }
    }

    /// Number of fields this entry expands into.
    pub fn arity(&self) -> usize {
        self.names.len().max(1)
    }
}

/// Common view over method and constructor signatures.
pub trait Signature {
    /// Function name.
    fn name(&self) -> &str;
    /// Parameter declarations, in order.
    fn params(&self) -> &[Parameter];
    /// Return declarations, in order.
    fn returns(&self) -> &[Return];
}

/// A method declared by an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    /// Method name.
    pub name: String,
    /// Parameter declarations.
    #[serde(default)]
    pub params: Vec<Parameter>,
    /// Return declarations.
    #[serde(default)]
    pub returns: Vec<Return>,
}

impl MethodSignature {
    /// Method with no parameters and no returns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: Vec::new(),
        }
    }

    /// Append a parameter declaration.
    pub fn param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    /// Append a return declaration.
    pub fn returning(mut self, ret: Return) -> Self {
        self.returns.push(ret);
        self
    }
}

impl Signature for MethodSignature {
    fn name(&self) -> &str {
        &self.name
    }

    fn params(&self) -> &[Parameter] {
        &self.params
    }

    fn returns(&self) -> &[Return] {
        &self.returns
    }
}

/// A free function that builds a wrapped implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorSignature {
    /// Function name.
    pub name: String,
    /// Parameter declarations.
    #[serde(default)]
    pub params: Vec<Parameter>,
    /// Return declarations.
    #[serde(default)]
    pub returns: Vec<Return>,
}

impl ConstructorSignature {
    /// Constructor with no parameters and no returns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: Vec::new(),
        }
    }

    /// Append a parameter declaration.
    pub fn param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    /// Append a return declaration.
    pub fn returning(mut self, ret: Return) -> Self {
        self.returns.push(ret);
        self
    }
}

impl Signature for ConstructorSignature {
    fn name(&self) -> &str {
        &self.name
    }

    fn params(&self) -> &[Parameter] {
        &self.params
    }

    fn returns(&self) -> &[Return] {
        &self.returns
    }
}

/// An interface and its methods, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSchema {
    /// Interface (trait) name.
    pub name: String,
    /// Methods, in declaration order.
    #[serde(default)]
    pub methods: Vec<MethodSignature>,
}

impl InterfaceSchema {
    /// Interface with no methods.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    /// Append a method.
    pub fn method(mut self, method: MethodSignature) -> Self {
        self.methods.push(method);
        self
    }
}

/// Every interface and constructor supplied to one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaPool {
    /// Candidate interfaces.
    #[serde(default)]
    pub interfaces: Vec<InterfaceSchema>,
    /// Candidate constructors.
    #[serde(default)]
    pub constructors: Vec<ConstructorSignature>,
}

impl SchemaPool {
    /// Empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a pool from a JSON document.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Add an interface.
    pub fn with_interface(mut self, interface: InterfaceSchema) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Add a constructor.
    pub fn with_constructor(mut self, constructor: ConstructorSignature) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Append everything from `other`. Earlier definitions keep precedence.
    pub fn merge(&mut self, other: SchemaPool) {
        self.interfaces.extend(other.interfaces);
        self.constructors.extend(other.constructors);
    }

    /// Look up an interface by name.
    pub fn interface(&self, name: &str) -> SynthResult<&InterfaceSchema> {
        self.interfaces
            .iter()
            .find(|interface| interface.name == name)
            .ok_or_else(|| SynthError::SchemaNotFound(name.to_string()))
    }

    /// Look up a constructor by name.
    pub fn constructor(&self, name: &str) -> SynthResult<&ConstructorSignature> {
        self.constructors
            .iter()
            .find(|constructor| constructor.name == name)
            .ok_or_else(|| SynthError::ConstructorNotFound(name.to_string()))
    }
}
