use crate::config::{MachineConfig, Word};
use crate::error::Fault;

/// Fixed-size bounded-cell store.
///
/// Every access is checked against the machine's [`MachineConfig`]: reads and
/// writes outside `[0, ram_size)` fail with [`Fault::OutOfBounds`], writes of
/// values above `max_value` with [`Fault::ValueOutOfRange`]. The cells
/// therefore always satisfy the value invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<Word>,
    config: MachineConfig,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(MachineConfig::default())
    }
}

impl Memory {
    /// Allocate `config.ram_size` zeroed cells.
    pub fn new(config: MachineConfig) -> Self {
        Self {
            cells: vec![0; config.ram_size],
            config,
        }
    }

    /// Build a memory whose cell `i` holds `f(i)`, clamped to `max_value`.
    pub fn from_fn<F>(config: MachineConfig, f: F) -> Self
    where
        F: FnMut(usize) -> Word,
    {
        let cells = (0..config.ram_size)
            .map(f)
            .map(|v| v.min(config.max_value))
            .collect();
        Self { cells, config }
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells, in address order.
    pub fn cells(&self) -> &[Word] {
        &self.cells
    }

    pub fn read(&self, address: usize) -> Result<Word, Fault> {
        self.cells
            .get(address)
            .copied()
            .ok_or(Fault::OutOfBounds {
                what: "cell id",
                address: address as i64,
                ram_size: self.config.ram_size,
            })
    }

    pub fn write(&mut self, address: usize, value: Word) -> Result<(), Fault> {
        let config = self.config;
        let cell = self.cells.get_mut(address).ok_or(Fault::OutOfBounds {
            what: "cell id",
            address: address as i64,
            ram_size: config.ram_size,
        })?;
        if value > config.max_value {
            return Err(Fault::ValueOutOfRange {
                what: "cell value",
                value: value as i64,
                max_value: config.max_value,
            });
        }
        *cell = value;
        Ok(())
    }

    /// Overwrite a cell from untrusted input, such as a command line.
    ///
    /// Unlike [`write`](Self::write) this accepts signed arguments so that
    /// negative addresses and values are reported instead of unrepresentable.
    /// The address is checked first.
    pub fn set_cell(&mut self, address: i64, value: i64) -> Result<(), Fault> {
        if !self.config.is_address(address) {
            return Err(Fault::OutOfBounds {
                what: "cell id",
                address,
                ram_size: self.config.ram_size,
            });
        }
        if !self.config.is_value(value) {
            return Err(Fault::ValueOutOfRange {
                what: "cell desired value",
                value,
                max_value: self.config.max_value,
            });
        }
        self.write(address as usize, value as Word)
    }

    /// Address of the last nonzero cell, or `None` if every cell is zero.
    pub fn highest_nonzero(&self) -> Option<usize> {
        self.cells.iter().rposition(|&v| v != 0)
    }
}
