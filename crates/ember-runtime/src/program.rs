//! Program representation
//!
//! The host harness's loaded-program form: named functions over a small op
//! set, deserialized from JSON. This stands in for the VM's real bytecode
//! pipeline, which is outside the boundary layer; it exists so the extern
//! bridge, adapters, and handle lifecycle are executable end to end.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Read;

/// One instruction of the harness interpreter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Op {
    /// Push a number literal.
    PushNumber(f64),
    /// Push a string literal.
    PushString(String),
    /// Push a fresh mutable number cell (out-parameter).
    NewRef,
    /// Pop a cell, push its current number.
    ReadRef,
    /// Pop into a local slot.
    StoreLocal(usize),
    /// Push a copy of a local slot.
    LoadLocal(usize),
    /// Invoke a registered extern adapter by symbol name.
    CallExtern(String),
    /// Invoke another program function by name.
    Call(String),
    /// Discard the top of stack.
    Pop,
    /// Finish the current function.
    Return,
}

/// A named function body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    #[serde(default)]
    pub ops: Vec<Op>,
}

/// A loaded program: the set of functions plus, derived from their op
/// lists, the set of extern symbols the program references.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub functions: Vec<Function>,
}

impl Program {
    /// Parse a program from its JSON form.
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    /// Parse a program from a reader (the CLI's program file).
    pub fn from_reader(reader: impl Read) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    /// Index of the named function, if present.
    pub fn function_index(&self, name: &str) -> Option<usize> {
        self.functions.iter().position(|f| f.name == name)
    }

    /// Every extern symbol any function references, ordered.
    pub fn referenced_externs(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for function in &self.functions {
            for op in &function.ops {
                if let Op::CallExtern(name) = op {
                    names.insert(name.clone());
                }
            }
        }
        names
    }
}
