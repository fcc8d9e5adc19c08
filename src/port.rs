//! Port descriptors for the node system.
//!
//! Each algorithm declares its ports via static descriptor arrays. The
//! executive uses these to validate connections at connect time and to
//! enforce cardinality at evaluation entry.

use crate::data::DataKind;

/// What a port accepts (inputs) or declares to produce (outputs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSignature {
    /// Any data object.
    Any,
    /// Any composite data object.
    AnyComposite,
    /// Exactly this variant.
    Kind(DataKind),
}

impl TypeSignature {
    /// Whether a produced object of `kind` satisfies this signature.
    pub fn accepts(self, kind: DataKind) -> bool {
        match self {
            TypeSignature::Any => true,
            TypeSignature::AnyComposite => kind.is_composite(),
            TypeSignature::Kind(k) => k == kind,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeSignature::Any => "Any",
            TypeSignature::AnyComposite => "AnyComposite",
            TypeSignature::Kind(k) => k.name(),
        }
    }
}

/// How many connections an input port takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Exactly one connection, checked at evaluation entry.
    Single,
    /// Zero or one connection.
    Optional,
    /// Zero or more connections, in connect order.
    Repeatable,
}

/// Static descriptor for an input port.
#[derive(Debug, Clone)]
pub struct InputPortDescriptor {
    pub name: &'static str,
    /// Accepted alternatives; a producer matching any one connects.
    pub types: &'static [TypeSignature],
    pub cardinality: Cardinality,
}

impl InputPortDescriptor {
    pub const fn new(
        name: &'static str,
        types: &'static [TypeSignature],
        cardinality: Cardinality,
    ) -> Self {
        Self {
            name,
            types,
            cardinality,
        }
    }

    pub fn accepts(&self, kind: DataKind) -> bool {
        self.types.iter().any(|sig| sig.accepts(kind))
    }

    /// Whether an output declaring `signature` may connect here. A producer
    /// declaring `Any` resolves its concrete type at run time, so it is
    /// accepted against every input.
    pub fn accepts_signature(&self, signature: TypeSignature) -> bool {
        match signature {
            TypeSignature::Any => true,
            TypeSignature::AnyComposite => self
                .types
                .iter()
                .any(|sig| matches!(sig, TypeSignature::Any | TypeSignature::AnyComposite)),
            TypeSignature::Kind(kind) => self.accepts(kind),
        }
    }
}

/// Static descriptor for an output port.
#[derive(Debug, Clone)]
pub struct OutputPortDescriptor {
    pub name: &'static str,
    pub signature: TypeSignature,
}

impl OutputPortDescriptor {
    pub const fn new(name: &'static str, signature: TypeSignature) -> Self {
        Self { name, signature }
    }
}
