use std::path::PathBuf;

use thiserror::Error;

use crate::config::Word;
use crate::isa::Opcode;

/// Conditions that terminate an execution or reject a memory access.
///
/// Every variant carries enough context to tell what was touched. None of
/// them are recoverable within a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// An address outside `[0, ram_size)`.
    #[error("{what} {address} not in [0, {ram_size})")]
    OutOfBounds {
        what: &'static str,
        address: i64,
        ram_size: usize,
    },

    /// A value outside `[0, max_value]`.
    #[error("{what} {value} not in [0, {max_value}]")]
    ValueOutOfRange {
        what: &'static str,
        value: i64,
        max_value: Word,
    },

    /// The fetched cell decodes to an opcode with no mnemonic.
    #[error("illegal instruction {opcode} {operand} at cell {address}")]
    IllegalInstruction {
        opcode: Opcode,
        operand: usize,
        address: usize,
    },

    /// The operation ceiling was reached.
    #[error("exceeded the number of operations {limit}")]
    OperationLimitExceeded { limit: u64 },
}

/// Reasons a program text could not be loaded into memory.
///
/// Line numbers are 1-based.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("line {line}: expected `<MNEMONIC> <OPERAND>`, got {text:?}")]
    Malformed { line: usize, text: String },

    #[error("line {line}: instruction {mnemonic} not in code list")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("line {line}: operand {text:?} is not an integer")]
    InvalidOperand {
        line: usize,
        text: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("line {line}: {source}")]
    Fault {
        line: usize,
        #[source]
        source: Fault,
    },

    #[error("program has more than {capacity} lines")]
    TooLong { capacity: usize },

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
