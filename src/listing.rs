use std::fmt::Write;

use crate::isa::Instruction;
use crate::memory::Memory;

/// Render memory from address 0 through the highest nonzero cell.
///
/// One line per cell: address, raw value, mnemonic (`?n` for unknown
/// opcodes) and operand. An all-zero memory still lists cell 0.
pub fn listing(memory: &Memory) -> String {
    let mut out = String::new();
    if memory.is_empty() {
        return out;
    }
    let ram_size = memory.config().ram_size;
    let last = memory.highest_nonzero().unwrap_or(0);

    for (address, &value) in memory.cells().iter().enumerate().take(last + 1) {
        let Instruction { opcode, operand } = Instruction::split(value, ram_size);
        let _ = writeln!(
            out,
            "[{address:3}] [{value:5}] {opcode:4} [{operand:4}]"
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load;

    #[test]
    fn test_empty_memory_lists_cell_zero() {
        let mem = Memory::default();
        assert_eq!(listing(&mem), "[  0] [    0] NOOP [   0]\n");
    }

    #[test]
    fn test_listing_stops_at_last_nonzero() {
        let mut mem = Memory::default();
        load(&mut mem, "TAKE 10\nHLT 0\n").unwrap();
        mem.set_cell(10, 41).unwrap();
        let out = listing(&mem);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "[  0] [ 1010] TAKE [  10]");
        assert_eq!(lines[1], "[  1] [10000] HLT  [   0]");
        assert_eq!(lines[10], "[ 10] [   41] NOOP [  41]");
    }

    #[test]
    fn test_listing_unknown_opcode() {
        let mut mem = Memory::default();
        mem.set_cell(0, 11005).unwrap();
        assert_eq!(listing(&mem), "[  0] [11005] ?11  [   5]\n");
    }
}
