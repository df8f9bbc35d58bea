//! Instruction nodes and their stable identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::operator::Operator;

/// Stable, opaque reference to an instruction within a [`Program`](super::Program).
///
/// Identity is preserved across relocation: moving an instruction never
/// changes its `IRef`, only its position in program order.
pub type IRef = Uuid;

/// One node of the instruction graph: an operator plus its ordered inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub(crate) id: IRef,
    pub(crate) operator: Operator,
    pub(crate) inputs: Vec<IRef>,
}

impl Instruction {
    pub(crate) fn new(operator: Operator, inputs: Vec<IRef>) -> Self {
        Self {
            id: Uuid::new_v4(),
            operator,
            inputs,
        }
    }

    pub fn id(&self) -> IRef {
        self.id
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn inputs(&self) -> &[IRef] {
        &self.inputs
    }
}
