use std::fmt;

use crate::config::Word;

/// The observable effect of one executed instruction.
///
/// Values are the ones read or written while executing, after saturation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Noop,
    Take { cell: usize, value: Word },
    Add { cell: usize, addend: Word, acc: Word },
    Sub { cell: usize, subtrahend: Word, acc: Word },
    Save { cell: usize, acc: Word },
    Jmp { target: usize },
    /// `skipped` is true when the loaded value was zero.
    Tst { cell: usize, acc: Word, skipped: bool },
    Inc { cell: usize, acc: Word },
    Dec { cell: usize, acc: Word },
    Null { cell: usize },
}

/// One trace record: which cell was executed, as which operation, and what it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trace {
    /// Address the instruction was fetched from.
    pub address: usize,
    /// Value of the operation counter after the fetch (1-based).
    pub operation: u64,
    pub effect: Effect,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Effect::Noop => write!(f, "NOOP"),
            Effect::Take { cell, value } => {
                write!(f, "TAKE: acc <- {value} (from cell {cell})")
            }
            Effect::Add { cell, addend, acc } => {
                write!(f, " ADD: acc += {addend} (from cell {cell}), new value = {acc}")
            }
            Effect::Sub {
                cell,
                subtrahend,
                acc,
            } => {
                write!(f, " SUB: acc -= {subtrahend} (from cell {cell}), new value = {acc}")
            }
            Effect::Save { cell, acc } => write!(f, "SAVE: cell {cell} <- {acc} (from acc)"),
            Effect::Jmp { target } => write!(f, " JMP: ip <- {target}"),
            Effect::Tst {
                cell,
                acc,
                skipped: false,
            } => {
                write!(f, " TST: acc != 0 (value {acc}, loaded from cell {cell})")
            }
            Effect::Tst {
                cell, skipped: true, ..
            } => {
                write!(
                    f,
                    " TST: acc == 0 (loaded from cell {cell}), skipping next instruction"
                )
            }
            Effect::Inc { cell, acc } => write!(f, " INC: cell {cell} <- acc <- {acc}"),
            Effect::Dec { cell, acc } => write!(f, " DEC: cell {cell} <- acc <- {acc}"),
            Effect::Null { cell } => write!(f, "NULL: cell {cell} <- acc <- 0"),
        }
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:3}] {}", self.address, self.effect)
    }
}
