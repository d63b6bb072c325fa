use crate::config::Word;
use crate::error::Fault;
use crate::isa::{self, Instruction, Opcode};
use crate::memory::Memory;
use crate::trace::{Effect, Trace};

/// Where an execution stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Running,
    Halted,
    Failed(Fault),
}

/// Final machine state after a `HLT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Number of fetched instructions, including the `HLT` itself.
    pub operations: u64,
    pub accumulator: Word,
    /// Address of the `HLT` that stopped the machine.
    pub instruction_pointer: usize,
}

/// The fetch-decode-execute loop over a borrowed [`Memory`].
///
/// The engine is an iterator of trace records: every executed instruction
/// yields `Ok(Trace)`, a fault yields one `Err` and ends the sequence, and a
/// `HLT` ends it silently. Nothing is printed; presenting the trace is up to
/// the caller.
///
/// State:
/// - `ip`: instruction pointer, starts at 0
/// - `acc`: accumulator, starts at 0, always within `[0, max_value]`
/// - `operations`: fetch counter, checked against the optional ceiling
///   before the fetched instruction takes effect
pub struct Engine<'m> {
    memory: &'m mut Memory,
    max_operations: Option<u64>,
    ip: usize,
    acc: Word,
    operations: u64,
    state: State,
}

impl<'m> Engine<'m> {
    pub fn new(memory: &'m mut Memory, max_operations: Option<u64>) -> Self {
        Self {
            memory,
            max_operations,
            ip: 0,
            acc: 0,
            operations: 0,
            state: State::Running,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn accumulator(&self) -> Word {
        self.acc
    }

    pub fn instruction_pointer(&self) -> usize {
        self.ip
    }

    pub fn operations(&self) -> u64 {
        self.operations
    }

    pub fn memory(&self) -> &Memory {
        self.memory
    }

    pub fn outcome(&self) -> Outcome {
        Outcome {
            operations: self.operations,
            accumulator: self.acc,
            instruction_pointer: self.ip,
        }
    }

    /// Execute one instruction. Returns `None` once the machine has stopped.
    pub fn step(&mut self) -> Option<Result<Trace, Fault>> {
        if self.state != State::Running {
            return None;
        }
        match self.cycle() {
            Ok(Some(trace)) => Some(Ok(trace)),
            Ok(None) => {
                tracing::debug!(operations = self.operations, ip = self.ip, "halted");
                self.state = State::Halted;
                None
            }
            Err(fault) => {
                tracing::debug!(operations = self.operations, ip = self.ip, %fault, "failed");
                self.state = State::Failed(fault.clone());
                Some(Err(fault))
            }
        }
    }

    /// Run to the end, discarding the trace.
    pub fn run(&mut self) -> Result<Outcome, Fault> {
        for result in self.by_ref() {
            result?;
        }
        match &self.state {
            State::Failed(fault) => Err(fault.clone()),
            _ => Ok(self.outcome()),
        }
    }

    /// One fetch-decode-execute cycle. `Ok(None)` means `HLT`.
    fn cycle(&mut self) -> Result<Option<Trace>, Fault> {
        let config = *self.memory.config();
        let address = self.ip;
        if address >= config.ram_size {
            return Err(Fault::OutOfBounds {
                what: "instruction pointer",
                address: address as i64,
                ram_size: config.ram_size,
            });
        }

        let code = self.memory.read(address)?;
        self.operations += 1;
        if let Some(limit) = self.max_operations {
            if self.operations >= limit {
                return Err(Fault::OperationLimitExceeded { limit });
            }
        }

        let Instruction { opcode, operand } = isa::decode(&config, code as i64)?;
        let cell = operand;

        let effect = match opcode {
            Opcode::Noop => {
                self.ip += 1;
                Effect::Noop
            }
            Opcode::Take => {
                let value = self.memory.read(cell)?;
                self.acc = value;
                self.ip += 1;
                Effect::Take { cell, value }
            }
            Opcode::Add => {
                let addend = self.memory.read(cell)?;
                self.acc = config.saturate(self.acc as i64 + addend as i64);
                self.ip += 1;
                Effect::Add {
                    cell,
                    addend,
                    acc: self.acc,
                }
            }
            Opcode::Sub => {
                let subtrahend = self.memory.read(cell)?;
                self.acc = config.saturate(self.acc as i64 - subtrahend as i64);
                self.ip += 1;
                Effect::Sub {
                    cell,
                    subtrahend,
                    acc: self.acc,
                }
            }
            Opcode::Save => {
                self.memory.write(cell, self.acc)?;
                self.ip += 1;
                Effect::Save { cell, acc: self.acc }
            }
            Opcode::Jmp => {
                self.ip = operand;
                Effect::Jmp { target: operand }
            }
            Opcode::Tst => {
                self.acc = self.memory.read(cell)?;
                let skipped = self.acc == 0;
                self.ip += if skipped { 2 } else { 1 };
                Effect::Tst {
                    cell,
                    acc: self.acc,
                    skipped,
                }
            }
            Opcode::Inc => {
                let value = self.memory.read(cell)?;
                self.acc = config.saturate(value as i64 + 1);
                self.memory.write(cell, self.acc)?;
                self.ip += 1;
                Effect::Inc { cell, acc: self.acc }
            }
            Opcode::Dec => {
                let value = self.memory.read(cell)?;
                self.acc = config.saturate(value as i64 - 1);
                self.memory.write(cell, self.acc)?;
                self.ip += 1;
                Effect::Dec { cell, acc: self.acc }
            }
            Opcode::Null => {
                self.acc = 0;
                self.memory.write(cell, 0)?;
                self.ip += 1;
                Effect::Null { cell }
            }
            Opcode::Hlt => return Ok(None),
            Opcode::Unknown(_) => {
                return Err(Fault::IllegalInstruction {
                    opcode,
                    operand,
                    address,
                });
            }
        };

        Ok(Some(Trace {
            address,
            operation: self.operations,
            effect,
        }))
    }
}

impl Iterator for Engine<'_> {
    type Item = Result<Trace, Fault>;

    fn next(&mut self) -> Option<Self::Item> {
        self.step()
    }
}

/// Run the program in `memory` from address 0 until it halts or faults.
pub fn execute(memory: &mut Memory, max_operations: Option<u64>) -> Result<Outcome, Fault> {
    Engine::new(memory, max_operations).run()
}

/// Like [`execute`], handing every trace record to `on_trace` as it happens.
pub fn execute_with<F>(
    memory: &mut Memory,
    max_operations: Option<u64>,
    mut on_trace: F,
) -> Result<Outcome, Fault>
where
    F: FnMut(&Trace),
{
    let mut engine = Engine::new(memory, max_operations);
    for result in engine.by_ref() {
        on_trace(&result?);
    }
    Ok(engine.outcome())
}
