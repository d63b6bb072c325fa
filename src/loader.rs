use std::path::Path;

use crate::error::{Fault, LoadError};
use crate::isa::{self, Opcode};
use crate::memory::Memory;

/// Assemble program text into `memory`, one line per cell from address 0.
///
/// Each line is `<MNEMONIC> <OPERAND>`, separated by whitespace. Cells past
/// the end of the program keep their contents, so data poked in beforehand
/// survives. The first bad line aborts the load; cells written before it are
/// not rolled back.
///
/// Returns the number of cells written.
pub fn load(memory: &mut Memory, source: &str) -> Result<usize, LoadError> {
    let config = *memory.config();
    let mut written = 0;

    for (index, text) in source.lines().enumerate() {
        let line = index + 1;
        let mut tokens = text.split_whitespace();
        let (Some(mnemonic), Some(operand), None) = (tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(LoadError::Malformed {
                line,
                text: text.to_string(),
            });
        };

        let opcode = mnemonic
            .parse::<Opcode>()
            .map_err(|_| LoadError::UnknownMnemonic {
                line,
                mnemonic: mnemonic.to_string(),
            })?;
        let operand = operand
            .parse::<i64>()
            .map_err(|source| LoadError::InvalidOperand {
                line,
                text: operand.to_string(),
                source,
            })?;
        if !config.is_address(operand) {
            return Err(LoadError::Fault {
                line,
                source: Fault::OutOfBounds {
                    what: "instruction operand",
                    address: operand,
                    ram_size: config.ram_size,
                },
            });
        }

        if index >= memory.len() {
            return Err(LoadError::TooLong {
                capacity: memory.len(),
            });
        }
        let code = isa::encode(&config, opcode, operand as usize)
            .and_then(|code| memory.write(index, code).map(|()| code))
            .map_err(|source| LoadError::Fault { line, source })?;
        tracing::trace!(line, code, "assembled");
        written += 1;
    }

    tracing::debug!(cells = written, "program loaded");
    Ok(written)
}

/// Read a program file and [`load`] it.
pub fn load_file(memory: &mut Memory, path: impl AsRef<Path>) -> Result<usize, LoadError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load(memory, &source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MachineConfig;
    use crate::engine::execute;

    #[test]
    fn test_load_encodes_sequentially() {
        let mut mem = Memory::default();
        let n = load(&mut mem, "TAKE 10\nINC 10\nSAVE 10\nHLT 0\n").unwrap();
        assert_eq!(n, 4);
        assert_eq!(&mem.cells()[..4], &[1010, 7010, 4010, 10000]);
    }

    #[test]
    fn test_load_keeps_data_cells() {
        let mut mem = Memory::default();
        mem.set_cell(10, 41).unwrap();
        load(&mut mem, "HLT 0").unwrap();
        assert_eq!(mem.read(10), Ok(41));
    }

    #[test]
    fn test_load_then_execute() {
        let mut mem = Memory::default();
        mem.set_cell(10, 41).unwrap();
        load(&mut mem, "TAKE 10\nINC 10\nSAVE 10\nHLT 0\n").unwrap();
        execute(&mut mem, None).unwrap();
        assert_eq!(mem.read(10), Ok(42));
    }

    #[test]
    fn test_extra_whitespace() {
        let mut mem = Memory::default();
        load(&mut mem, "  ADD\t  7  \r\n").unwrap();
        assert_eq!(mem.read(0), Ok(2007));
    }

    #[test]
    fn test_unknown_mnemonic() {
        let mut mem = Memory::default();
        let err = load(&mut mem, "NOOP 0\nMUL 3\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::UnknownMnemonic { line: 2, ref mnemonic } if mnemonic == "MUL"
        ));
    }

    #[test]
    fn test_missing_operand() {
        let mut mem = Memory::default();
        let err = load(&mut mem, "HLT\n").unwrap_err();
        assert!(matches!(err, LoadError::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_blank_line_is_malformed() {
        let mut mem = Memory::default();
        let err = load(&mut mem, "NOOP 0\n\nHLT 0\n").unwrap_err();
        assert!(matches!(err, LoadError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_too_many_tokens() {
        let mut mem = Memory::default();
        let err = load(&mut mem, "ADD 1 2").unwrap_err();
        assert!(matches!(err, LoadError::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_operand_not_integer() {
        let mut mem = Memory::default();
        let err = load(&mut mem, "TAKE ten").unwrap_err();
        assert!(matches!(err, LoadError::InvalidOperand { line: 1, .. }));
    }

    #[test]
    fn test_operand_out_of_range() {
        let mut mem = Memory::default();
        for source in ["JMP 1000", "JMP -1"] {
            let err = load(&mut mem, source).unwrap_err();
            assert!(matches!(
                err,
                LoadError::Fault {
                    line: 1,
                    source: Fault::OutOfBounds { .. }
                }
            ));
        }
    }

    #[test]
    fn test_program_longer_than_memory() {
        let mut mem = Memory::new(MachineConfig {
            ram_size: 2,
            max_value: 99,
        });
        let err = load(&mut mem, "NOOP 0\nNOOP 0\nNOOP 0\n").unwrap_err();
        assert!(matches!(err, LoadError::TooLong { capacity: 2 }));
    }

    #[test]
    fn test_encoding_above_max_value() {
        let mut mem = Memory::new(MachineConfig {
            ram_size: 10,
            max_value: 50,
        });
        // HLT 0 would be 100.
        let err = load(&mut mem, "HLT 0").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Fault {
                source: Fault::ValueOutOfRange { value: 100, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_load_file_missing() {
        let mut mem = Memory::default();
        let err = load_file(&mut mem, "/nonexistent/johnny/program.ram").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_load_file() {
        let path = std::env::temp_dir().join(format!("johnny-load-{}.ram", std::process::id()));
        std::fs::write(&path, "TAKE 3\nHLT 0\n").unwrap();
        let mut mem = Memory::default();
        let n = load_file(&mut mem, &path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(n, 2);
        assert_eq!(mem.read(0), Ok(1003));
    }
}
