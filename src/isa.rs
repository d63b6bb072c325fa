use std::fmt;
use std::str::FromStr;

use crate::config::{MachineConfig, Word};
use crate::error::Fault;

/// The Johnny instruction set.
///
/// A cell value `v` is read as an instruction by splitting it on the memory
/// size: `opcode = v / ram_size`, `operand = v % ram_size`. With the default
/// 1000 cells and a 99999 value ceiling, `TAKE 10` is stored as `1010` and
/// `HLT 0` as `10000`.
///
/// Opcodes:
/// - 0 (NOOP): no operation
/// - 1 (TAKE): acc = mem[a]
/// - 2 (ADD):  acc = min(max, acc + mem[a])
/// - 3 (SUB):  acc = max(0, acc - mem[a])
/// - 4 (SAVE): mem[a] = acc
/// - 5 (JMP):  ip = a
/// - 6 (TST):  acc = mem[a]; skip next instruction if acc == 0
/// - 7 (INC):  mem[a] = acc = min(max, mem[a] + 1)
/// - 8 (DEC):  mem[a] = acc = max(0, mem[a] - 1)
/// - 9 (NULL): mem[a] = acc = 0
/// - 10 (HLT): halt
///
/// Any other opcode decodes to [`Opcode::Unknown`], which only becomes an
/// error when executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Noop,
    Take,
    Add,
    Sub,
    Save,
    Jmp,
    Tst,
    Inc,
    Dec,
    Null,
    Hlt,
    Unknown(Word),
}

impl Opcode {
    /// All opcodes with a mnemonic, in numeric order.
    pub const DEFINED: [Opcode; 11] = [
        Opcode::Noop,
        Opcode::Take,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Save,
        Opcode::Jmp,
        Opcode::Tst,
        Opcode::Inc,
        Opcode::Dec,
        Opcode::Null,
        Opcode::Hlt,
    ];

    pub fn from_number(number: Word) -> Self {
        match number {
            0 => Opcode::Noop,
            1 => Opcode::Take,
            2 => Opcode::Add,
            3 => Opcode::Sub,
            4 => Opcode::Save,
            5 => Opcode::Jmp,
            6 => Opcode::Tst,
            7 => Opcode::Inc,
            8 => Opcode::Dec,
            9 => Opcode::Null,
            10 => Opcode::Hlt,
            n => Opcode::Unknown(n),
        }
    }

    pub fn number(self) -> Word {
        match self {
            Opcode::Noop => 0,
            Opcode::Take => 1,
            Opcode::Add => 2,
            Opcode::Sub => 3,
            Opcode::Save => 4,
            Opcode::Jmp => 5,
            Opcode::Tst => 6,
            Opcode::Inc => 7,
            Opcode::Dec => 8,
            Opcode::Null => 9,
            Opcode::Hlt => 10,
            Opcode::Unknown(n) => n,
        }
    }

    /// The mnemonic, or `None` for unknown opcodes.
    pub fn mnemonic(self) -> Option<&'static str> {
        let name = match self {
            Opcode::Noop => "NOOP",
            Opcode::Take => "TAKE",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Save => "SAVE",
            Opcode::Jmp => "JMP",
            Opcode::Tst => "TST",
            Opcode::Inc => "INC",
            Opcode::Dec => "DEC",
            Opcode::Null => "NULL",
            Opcode::Hlt => "HLT",
            Opcode::Unknown(_) => return None,
        };
        Some(name)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mnemonic() {
            Some(name) => f.pad(name),
            None => f.pad(&format!("?{}", self.number())),
        }
    }
}

/// Error from parsing a mnemonic that names no instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMnemonic(pub String);

impl FromStr for Opcode {
    type Err = UnknownMnemonic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Opcode::DEFINED
            .into_iter()
            .find(|op| op.mnemonic() == Some(s))
            .ok_or_else(|| UnknownMnemonic(s.to_string()))
    }
}

/// A decoded cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operand: usize,
}

impl Instruction {
    /// Split a cell value into opcode and operand without range checks.
    ///
    /// `ram_size` must be nonzero.
    pub fn split(code: Word, ram_size: usize) -> Self {
        let code = code as u64;
        let size = ram_size as u64;
        Self {
            opcode: Opcode::from_number((code / size) as Word),
            operand: (code % size) as usize,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.opcode, self.operand)
    }
}

/// Decode a cell value, rejecting values outside `[0, max_value]`.
pub fn decode(config: &MachineConfig, code: i64) -> Result<Instruction, Fault> {
    if !config.is_value(code) || config.ram_size == 0 {
        return Err(Fault::ValueOutOfRange {
            what: "code",
            value: code,
            max_value: config.max_value,
        });
    }
    Ok(Instruction::split(code as Word, config.ram_size))
}

/// Encode an instruction as a cell value.
pub fn encode(config: &MachineConfig, opcode: Opcode, operand: usize) -> Result<Word, Fault> {
    if let Opcode::Unknown(_) = opcode {
        return Err(Fault::IllegalInstruction {
            opcode,
            operand,
            address: 0,
        });
    }
    if operand >= config.ram_size {
        return Err(Fault::OutOfBounds {
            what: "instruction operand",
            address: operand as i64,
            ram_size: config.ram_size,
        });
    }
    let code = opcode.number() as u64 * config.ram_size as u64 + operand as u64;
    if code > config.max_value as u64 {
        return Err(Fault::ValueOutOfRange {
            what: "encoded instruction",
            value: i64::try_from(code).unwrap_or(i64::MAX),
            max_value: config.max_value,
        });
    }
    Ok(code as Word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known() {
        let config = MachineConfig::default();
        let ins = decode(&config, 1010).unwrap();
        assert_eq!(ins.opcode, Opcode::Take);
        assert_eq!(ins.operand, 10);

        let ins = decode(&config, 10000).unwrap();
        assert_eq!(ins.opcode, Opcode::Hlt);
        assert_eq!(ins.operand, 0);
    }

    #[test]
    fn test_decode_zero_is_noop() {
        let ins = decode(&MachineConfig::default(), 0).unwrap();
        assert_eq!(ins.opcode, Opcode::Noop);
        assert_eq!(ins.operand, 0);
    }

    #[test]
    fn test_decode_unknown_is_not_an_error() {
        let ins = decode(&MachineConfig::default(), 11000).unwrap();
        assert_eq!(ins.opcode, Opcode::Unknown(11));
        assert_eq!(ins.opcode.to_string(), "?11");
        assert_eq!(ins.opcode.mnemonic(), None);
    }

    #[test]
    fn test_decode_out_of_range() {
        let config = MachineConfig::default();
        assert!(matches!(
            decode(&config, 100000),
            Err(Fault::ValueOutOfRange { value: 100000, .. })
        ));
        assert!(matches!(
            decode(&config, -1),
            Err(Fault::ValueOutOfRange { value: -1, .. })
        ));
    }

    #[test]
    fn test_decode_respects_config() {
        let config = MachineConfig {
            ram_size: 100,
            max_value: 9999,
        };
        let ins = decode(&config, 742).unwrap();
        assert_eq!(ins.opcode, Opcode::Inc);
        assert_eq!(ins.operand, 42);
    }

    #[test]
    fn test_mnemonic_parse() {
        assert_eq!("TST".parse::<Opcode>(), Ok(Opcode::Tst));
        assert_eq!("NULL".parse::<Opcode>(), Ok(Opcode::Null));
        assert_eq!(
            "tst".parse::<Opcode>(),
            Err(UnknownMnemonic("tst".to_string()))
        );
    }

    #[test]
    fn test_display_pads() {
        assert_eq!(format!("{:4}", Opcode::Add), "ADD ");
        assert_eq!(format!("{:4}", Opcode::Unknown(42)), "?42 ");
    }

    #[test]
    fn test_encode() {
        let config = MachineConfig::default();
        assert_eq!(encode(&config, Opcode::Take, 10), Ok(1010));
        assert_eq!(encode(&config, Opcode::Hlt, 999), Ok(10999));
        assert!(matches!(
            encode(&config, Opcode::Save, 1000),
            Err(Fault::OutOfBounds { address: 1000, .. })
        ));
        assert!(matches!(
            encode(&config, Opcode::Unknown(12), 0),
            Err(Fault::IllegalInstruction { .. })
        ));
    }

    #[test]
    fn test_encode_exceeding_max_value() {
        let config = MachineConfig {
            ram_size: 1000,
            max_value: 5000,
        };
        assert!(matches!(
            encode(&config, Opcode::Jmp, 1),
            Err(Fault::ValueOutOfRange { value: 5001, .. })
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn decode_roundtrips_defined_opcodes(index in 0usize..11, operand in 0usize..1000) {
            let config = MachineConfig::default();
            let opcode = Opcode::DEFINED[index];
            let code = opcode.number() as i64 * 1000 + operand as i64;
            let ins = decode(&config, code).unwrap();
            prop_assert_eq!(ins.opcode, opcode);
            prop_assert_eq!(ins.operand, operand);
        }

        #[test]
        fn decode_rejects_values_above_max(code in 100000i64..10_000_000) {
            let result = decode(&MachineConfig::default(), code);
            let is_out_of_range = matches!(result, Err(Fault::ValueOutOfRange { .. }));
            prop_assert!(is_out_of_range);
        }

        #[test]
        fn decode_rejects_negative_values(code in i64::MIN..0) {
            let result = decode(&MachineConfig::default(), code);
            let is_out_of_range = matches!(result, Err(Fault::ValueOutOfRange { .. }));
            prop_assert!(is_out_of_range);
        }
    }
}
