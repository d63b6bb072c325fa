use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::prelude::*;

use crate::config::MachineConfig;
use crate::engine::{Engine, Outcome};
use crate::error::Fault;
use crate::isa::{Opcode, encode};
use crate::memory::Memory;

/// Configuration for a sweep over random memory images.
pub struct BatchConfig {
    /// Number of independent machines.
    pub images: usize,
    /// Number of leading cells filled with random instructions.
    pub program_len: usize,
    /// Operation ceiling applied to every machine.
    pub max_operations: u64,
    pub machine: MachineConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            images: 1 << 12, // 4096
            program_len: 32,
            max_operations: 1 << 13, // 8192
            machine: MachineConfig::default(),
        }
    }
}

/// How a sweep's machines ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub halted: usize,
    pub out_of_bounds: usize,
    pub value_out_of_range: usize,
    pub illegal_instruction: usize,
    pub operation_limit: usize,
    /// Fetches summed over all machines, however they ended.
    pub operations: u64,
}

impl BatchReport {
    fn from_result(result: &Result<Outcome, Fault>, operations: u64) -> Self {
        let mut report = Self {
            operations,
            ..Self::default()
        };
        match result {
            Ok(_) => report.halted = 1,
            Err(Fault::OutOfBounds { .. }) => report.out_of_bounds = 1,
            Err(Fault::ValueOutOfRange { .. }) => report.value_out_of_range = 1,
            Err(Fault::IllegalInstruction { .. }) => report.illegal_instruction = 1,
            Err(Fault::OperationLimitExceeded { .. }) => report.operation_limit = 1,
        }
        report
    }

    fn merge(self, other: Self) -> Self {
        Self {
            halted: self.halted + other.halted,
            out_of_bounds: self.out_of_bounds + other.out_of_bounds,
            value_out_of_range: self.value_out_of_range + other.value_out_of_range,
            illegal_instruction: self.illegal_instruction + other.illegal_instruction,
            operation_limit: self.operation_limit + other.operation_limit,
            operations: self.operations + other.operations,
        }
    }

    /// Total number of machines accounted for.
    pub fn total(&self) -> usize {
        self.halted
            + self.out_of_bounds
            + self.value_out_of_range
            + self.illegal_instruction
            + self.operation_limit
    }
}

/// A population of random memory images, each run on its own machine.
pub struct Batch {
    pub images: Vec<Memory>,
    pub config: BatchConfig,
}

impl Batch {
    /// Fill `config.images` memories with random defined instructions.
    ///
    /// Instructions whose encoding exceeds the machine's value ceiling are
    /// replaced by a random in-range value.
    pub fn new(config: BatchConfig, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let machine = config.machine;
        let program_len = config.program_len.min(machine.ram_size);
        let images = (0..config.images)
            .map(|_| {
                Memory::from_fn(machine, |address| {
                    if address >= program_len {
                        return 0;
                    }
                    let opcode = Opcode::DEFINED[rng.gen_range(0..Opcode::DEFINED.len())];
                    let operand = rng.gen_range(0..machine.ram_size);
                    match encode(&machine, opcode, operand) {
                        Ok(code) => code,
                        Err(_) => rng.gen_range(0..=machine.max_value),
                    }
                })
            })
            .collect();
        Self { images, config }
    }

    /// Execute every image in parallel and tally how each one ended.
    ///
    /// Images are modified in place.
    pub fn run(&mut self) -> BatchReport {
        let limit = self.config.max_operations;
        let report = self
            .images
            .par_iter_mut()
            .map(|mem| {
                let mut engine = Engine::new(mem, Some(limit));
                let result = engine.run();
                BatchReport::from_result(&result, engine.operations())
            })
            .reduce(BatchReport::default, BatchReport::merge);
        tracing::info!(
            images = report.total(),
            halted = report.halted,
            operation_limit = report.operation_limit,
            operations = report.operations,
            "batch finished"
        );
        report
    }
}
