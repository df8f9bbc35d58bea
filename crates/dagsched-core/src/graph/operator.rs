//! Operator identity and the zero-weight classification convention.

use serde::{Deserialize, Serialize};

/// The operation an instruction performs.
///
/// An operator is either ordinary (its cost comes from a schedule model's
/// weight function), context-free (no runtime cost regardless of what a
/// model would otherwise report), or structural — identified by the `@`
/// prefix convention, reserved for nodes a compiler's own passes insert
/// (e.g. parameter binders, returns, the identity nodes this crate's own
/// scheduler inserts for memory-conflict tracking).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operator {
    name: String,
    context_free: bool,
}

impl Operator {
    /// An operator priced by the schedule model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context_free: false,
        }
    }

    /// An operator known to carry no runtime cost, independent of the model.
    pub fn context_free(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context_free: true,
        }
    }

    /// A structural operator using the `@`-prefix naming convention.
    pub fn structural(name: impl Into<String>) -> Self {
        let name = name.into();
        debug_assert!(
            name.starts_with('@'),
            "structural operator names must start with '@'"
        );
        Self {
            name,
            context_free: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_context_free(&self) -> bool {
        self.context_free
    }
}

/// True if `op` is context-free.
pub fn is_context_free(op: &Operator) -> bool {
    op.is_context_free()
}

/// True if `op` uses the `@`-prefix structural naming convention.
pub fn is_structural(op: &Operator) -> bool {
    op.name().starts_with('@')
}

/// True if `op` is known zero-weight by classification alone — weight
/// accumulation never calls into the model for these.
pub fn is_zero_weight_class(op: &Operator) -> bool {
    is_context_free(op) || is_structural(op)
}
