//! The instruction graph container ("program"): an ordered, mutable list of
//! instructions with positional relocation and insertion.
//!
//! This is the container a scheduling pass needs from a compiler's IR:
//! stable references, bidirectional iteration, and the two mutation
//! primitives the scheduler drives — relocation and insertion — without
//! committing to any particular frontend's node representation.

pub mod instruction;
pub mod operator;

use std::collections::HashMap;

use thiserror::Error;

pub use instruction::{IRef, Instruction};
pub use operator::Operator;

/// Errors raised by [`Program`] mutation primitives.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgramError {
    #[error("instruction not found: {0}")]
    NotFound(IRef),
}

/// Where to place an instruction relative to the program's order.
#[derive(Debug, Clone, Copy)]
pub enum Position {
    /// The very front of the program.
    Front,
    /// Immediately before the named instruction.
    Before(IRef),
    /// The very end of the program.
    End,
}

/// An ordered, mutable list of instructions connected by data dependencies.
#[derive(Debug, Clone, Default)]
pub struct Program {
    instructions: HashMap<IRef, Instruction>,
    /// Program order, front to back.
    order: Vec<IRef>,
    /// Reverse index: instruction -> instructions that consume it.
    consumers: HashMap<IRef, Vec<IRef>>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new instruction at the end of the program.
    pub fn push(&mut self, operator: Operator, inputs: Vec<IRef>) -> Result<IRef, ProgramError> {
        self.insert_instruction(Position::End, operator, inputs)
    }

    /// Insert a new instruction at `position`, returning its fresh `IRef`.
    pub fn insert_instruction(
        &mut self,
        position: Position,
        operator: Operator,
        inputs: Vec<IRef>,
    ) -> Result<IRef, ProgramError> {
        for &i in &inputs {
            if !self.instructions.contains_key(&i) {
                return Err(ProgramError::NotFound(i));
            }
        }
        let ins = Instruction::new(operator, inputs.clone());
        let id = ins.id();
        for i in &inputs {
            self.consumers.entry(*i).or_default().push(id);
        }
        self.consumers.entry(id).or_default();
        self.instructions.insert(id, ins);
        self.place(id, position)?;
        Ok(id)
    }

    fn place(&mut self, id: IRef, position: Position) -> Result<(), ProgramError> {
        let idx = match position {
            Position::Front => 0,
            Position::End => self.order.len(),
            Position::Before(before) => self
                .position(before)
                .ok_or(ProgramError::NotFound(before))?,
        };
        self.order.insert(idx.min(self.order.len()), id);
        Ok(())
    }

    /// Relocate an existing instruction, preserving its `IRef`.
    pub fn move_instruction(&mut self, ins: IRef, position: Position) -> Result<(), ProgramError> {
        let cur = self.position(ins).ok_or(ProgramError::NotFound(ins))?;
        self.order.remove(cur);
        self.place(ins, position)
    }

    /// Move `ins` to the very front of the program.
    pub fn move_to_front(&mut self, ins: IRef) -> Result<(), ProgramError> {
        self.move_instruction(ins, Position::Front)
    }

    /// Current position of `ins` in program order, or `None` if absent.
    pub fn position(&self, ins: IRef) -> Option<usize> {
        self.order.iter().position(|&x| x == ins)
    }

    pub fn get(&self, ins: IRef) -> Option<&Instruction> {
        self.instructions.get(&ins)
    }

    pub fn inputs(&self, ins: IRef) -> &[IRef] {
        self.instructions
            .get(&ins)
            .map(|i| i.inputs())
            .unwrap_or(&[])
    }

    pub fn outputs(&self, ins: IRef) -> &[IRef] {
        self.consumers.get(&ins).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn operator(&self, ins: IRef) -> Option<&Operator> {
        self.instructions.get(&ins).map(|i| i.operator())
    }

    /// Full program order, front to back.
    pub fn order(&self) -> &[IRef] {
        &self.order
    }

    /// The last instruction in program order — the root of the DAG the
    /// scheduler walks from.
    pub fn sink(&self) -> Option<IRef> {
        self.order.last().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = IRef> + '_ {
        self.order.iter().copied()
    }
}
