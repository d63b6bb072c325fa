/// A machine cell value. Cells, the accumulator and encoded instructions all
/// share this type; the upper bound is enforced by [`MachineConfig::max_value`].
pub type Word = u32;

/// Default number of addressable cells.
pub const RAM_SIZE: usize = 1000;

/// Default largest value a cell may hold.
pub const MAX_VALUE: Word = 99999;

/// Bounds of a single machine.
///
/// Every [`Memory`](crate::memory::Memory) carries its own copy, so machines
/// with different bounds can coexist in one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    /// Number of cells. Addresses are valid in `[0, ram_size)`.
    pub ram_size: usize,
    /// Largest storable value. Values are valid in `[0, max_value]`.
    pub max_value: Word,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            ram_size: RAM_SIZE,
            max_value: MAX_VALUE,
        }
    }
}

impl MachineConfig {
    /// Returns true if `address` names a cell.
    pub fn is_address(&self, address: i64) -> bool {
        address >= 0 && (address as u64) < self.ram_size as u64
    }

    /// Returns true if `value` fits in a cell.
    pub fn is_value(&self, value: i64) -> bool {
        value >= 0 && value <= self.max_value as i64
    }

    /// Clamp a widened arithmetic result into `[0, max_value]`.
    pub fn saturate(&self, value: i64) -> Word {
        value.clamp(0, self.max_value as i64) as Word
    }
}
