//! JSON program file format: a flat, named-instruction description of a
//! compute graph, loaded into a [`dagsched_core::graph::Program`].

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use dagsched_core::graph::{IRef, Operator, Program};
use serde::{Deserialize, Serialize};

/// One instruction in a program file: a unique name, its operator, and the
/// names of the instructions that feed it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionSpec {
    pub name: String,
    pub op: String,
    #[serde(default)]
    pub context_free: bool,
    #[serde(default)]
    pub inputs: Vec<String>,
}

/// A full program file: every instruction, named, in dependency-safe order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramFile {
    pub instructions: Vec<InstructionSpec>,
}

impl ProgramFile {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("parsing program file")
    }

    /// Build a [`Program`] from this file, mapping instruction names to
    /// freshly generated [`IRef`]s in the order they appear. Every input
    /// name must already have been defined by an earlier instruction.
    pub fn build(&self) -> Result<Program> {
        let mut program = Program::new();
        let mut by_name: HashMap<&str, IRef> = HashMap::new();

        for spec in &self.instructions {
            if by_name.contains_key(spec.name.as_str()) {
                bail!("duplicate instruction name: {}", spec.name);
            }

            let mut inputs = Vec::with_capacity(spec.inputs.len());
            for dep in &spec.inputs {
                let &iref = by_name
                    .get(dep.as_str())
                    .with_context(|| format!("instruction `{}` references unknown input `{dep}`", spec.name))?;
                inputs.push(iref);
            }

            let operator = if spec.op.starts_with('@') {
                Operator::structural(spec.op.as_str())
            } else if spec.context_free {
                Operator::context_free(spec.op.as_str())
            } else {
                Operator::new(spec.op.as_str())
            };

            let id = program
                .push(operator, inputs)
                .with_context(|| format!("inserting instruction `{}`", spec.name))?;
            by_name.insert(spec.name.as_str(), id);
        }

        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_linear_chain() {
        let file = ProgramFile::from_json(
            r#"{
                "instructions": [
                    {"name": "a", "op": "load"},
                    {"name": "b", "op": "relu", "inputs": ["a"]}
                ]
            }"#,
        )
        .unwrap();

        let program = file.build().unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program.sink().map(|s| program.inputs(s).len()), Some(1));
    }

    #[test]
    fn rejects_unknown_input() {
        let file = ProgramFile::from_json(
            r#"{"instructions": [{"name": "a", "op": "relu", "inputs": ["ghost"]}]}"#,
        )
        .unwrap();
        assert!(file.build().is_err());
    }

    #[test]
    fn rejects_duplicate_name() {
        let file = ProgramFile::from_json(
            r#"{"instructions": [
                {"name": "a", "op": "load"},
                {"name": "a", "op": "load"}
            ]}"#,
        )
        .unwrap();
        assert!(file.build().is_err());
    }

    #[test]
    fn structural_op_name_is_recognized() {
        let file = ProgramFile::from_json(
            r#"{"instructions": [
                {"name": "a", "op": "load"},
                {"name": "b", "op": "@identity", "inputs": ["a"]}
            ]}"#,
        )
        .unwrap();
        let program = file.build().unwrap();
        let b = program.sink().unwrap();
        assert!(program.operator(b).unwrap().name().starts_with('@'));
    }
}
