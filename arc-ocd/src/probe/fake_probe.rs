#![allow(missing_docs)] // Don't require docs for test code
use std::{
    collections::{BTreeMap, VecDeque},
    time::Duration,
};

use crate::{
    architecture::arc::registers::{
        AuxDebug, JtagStatus, Status32, AUX_DEBUG, AUX_IDENTITY, AUX_PC, AUX_STATUS32,
    },
    probe::{ArcJtagAccess, DebugProbeError},
};

/// A single access to the fake probe, in the order it was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Startup,
    ReadStatus,
    ReadIdcode,
    ReadAuxRegister { address: u32 },
    WriteAuxRegister { address: u32, value: u32 },
    SetResetLines { trst: bool, srst: bool },
    Sleep(Duration),
}

/// Selects an access which should fail once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Startup,
    Status,
    Idcode,
    ReadAux(u32),
    WriteAux(u32),
    ResetLines,
}

impl FailOn {
    fn matches(&self, operation: &Operation) -> bool {
        match (self, operation) {
            (FailOn::Startup, Operation::Startup) => true,
            (FailOn::Status, Operation::ReadStatus) => true,
            (FailOn::Idcode, Operation::ReadIdcode) => true,
            (FailOn::ReadAux(a), Operation::ReadAuxRegister { address }) => a == address,
            (FailOn::WriteAux(a), Operation::WriteAuxRegister { address, .. }) => a == address,
            (FailOn::ResetLines, Operation::SetResetLines { .. }) => true,
            _ => false,
        }
    }
}

/// This is a fake probe emulating an ARC core, which can be used for tests or for dry runs.
///
/// The core halts when the force halt bit of `DEBUG` is written and starts
/// running again when the halt bit of `STATUS32` is cleared. Every access is
/// recorded and can be inspected with [`FakeProbe::operations`].
#[derive(Debug)]
pub struct FakeProbe {
    idcode: u32,
    running: bool,
    obeys_force_halt: bool,
    scripted_status: VecDeque<u32>,
    aux_registers: BTreeMap<u32, u32>,
    failures: Vec<FailOn>,
    operations: Vec<Operation>,
}

impl Default for FakeProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeProbe {
    /// Idcode reported by default, an ARC700 TAP.
    pub const DEFAULT_IDCODE: u32 = 0x2000_04b1;

    /// Creates a fake probe attached to a running core.
    pub fn new() -> Self {
        let mut aux_registers = BTreeMap::new();
        aux_registers.insert(AUX_IDENTITY, 0x0000_0034);
        aux_registers.insert(AUX_PC, 0x0000_0000);
        aux_registers.insert(AUX_STATUS32, 0);
        aux_registers.insert(AUX_DEBUG, 0);

        Self {
            idcode: Self::DEFAULT_IDCODE,
            running: true,
            obeys_force_halt: true,
            scripted_status: VecDeque::new(),
            aux_registers,
            failures: vec![],
            operations: vec![],
        }
    }

    /// Creates a fake probe attached to a core which is already halted.
    pub fn halted() -> Self {
        let mut probe = Self::new();
        probe.set_running(false);
        probe
    }

    /// Makes the core ignore force halt requests.
    pub fn ignore_force_halt(mut self) -> Self {
        self.obeys_force_halt = false;
        self
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;

        let mut status32 = Status32(self.aux_register(AUX_STATUS32));
        status32.set_halted(!running);
        self.aux_registers.insert(AUX_STATUS32, status32.into());
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_aux_register(&mut self, address: u32, value: u32) {
        self.aux_registers.insert(address, value);
    }

    pub fn aux_register(&self, address: u32) -> u32 {
        self.aux_registers.get(&address).copied().unwrap_or(0)
    }

    /// Queues a raw status value which is returned by the next status read,
    /// instead of the value derived from the emulated core.
    pub fn queue_status(&mut self, status: u32) {
        self.scripted_status.push_back(status);
    }

    /// Makes the next access matching `failure` fail.
    pub fn fail_once(&mut self, failure: FailOn) {
        self.failures.push(failure);
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn clear_operations(&mut self) {
        self.operations.clear();
    }

    /// Returns how many recorded operations match `predicate`.
    pub fn count(&self, predicate: impl Fn(&Operation) -> bool) -> usize {
        self.operations.iter().filter(|op| predicate(op)).count()
    }

    /// Returns all aux register writes, in order.
    pub fn aux_writes(&self) -> Vec<(u32, u32)> {
        self.operations
            .iter()
            .filter_map(|op| match op {
                Operation::WriteAuxRegister { address, value } => Some((*address, *value)),
                _ => None,
            })
            .collect()
    }

    /// Returns all reset line levels which were driven, in order.
    pub fn reset_lines(&self) -> Vec<(bool, bool)> {
        self.operations
            .iter()
            .filter_map(|op| match op {
                Operation::SetResetLines { trst, srst } => Some((*trst, *srst)),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, operation: Operation) -> Result<(), DebugProbeError> {
        tracing::trace!("[fake probe] {:x?}", operation);
        self.operations.push(operation);

        if let Some(index) = self.failures.iter().position(|f| f.matches(&operation)) {
            let failure = self.failures.remove(index);
            return Err(DebugProbeError::Other(anyhow::anyhow!(
                "Injected failure for {:?}",
                failure
            )));
        }

        Ok(())
    }

    fn current_status(&self) -> u32 {
        let mut status = JtagStatus(0);
        status.set_ready(true);
        status.set_running(self.running);
        status.into()
    }
}

impl ArcJtagAccess for FakeProbe {
    fn startup(&mut self) -> Result<(), DebugProbeError> {
        self.record(Operation::Startup)
    }

    fn status(&mut self) -> Result<u32, DebugProbeError> {
        self.record(Operation::ReadStatus)?;

        Ok(self
            .scripted_status
            .pop_front()
            .unwrap_or_else(|| self.current_status()))
    }

    fn idcode(&mut self) -> Result<u32, DebugProbeError> {
        self.record(Operation::ReadIdcode)?;
        Ok(self.idcode)
    }

    fn read_aux_reg(&mut self, address: u32) -> Result<u32, DebugProbeError> {
        self.record(Operation::ReadAuxRegister { address })?;
        Ok(self.aux_register(address))
    }

    fn write_aux_reg(&mut self, address: u32, value: u32) -> Result<(), DebugProbeError> {
        self.record(Operation::WriteAuxRegister { address, value })?;

        match address {
            AUX_DEBUG => {
                let debug = AuxDebug(value);
                if debug.force_halt() && self.obeys_force_halt {
                    self.set_running(false);
                }
                // FH is an action bit and always reads back as zero.
                let mut stored = debug;
                stored.set_force_halt(false);
                self.aux_registers.insert(address, stored.into());
            }
            AUX_STATUS32 => {
                self.aux_registers.insert(address, value);
                self.running = !Status32(value).halted();
            }
            _ => {
                self.aux_registers.insert(address, value);
            }
        }

        Ok(())
    }

    fn set_reset_lines(&mut self, trst: bool, srst: bool) -> Result<(), DebugProbeError> {
        self.record(Operation::SetResetLines { trst, srst })
    }

    fn sleep(&mut self, duration: Duration) {
        self.operations.push(Operation::Sleep(duration));
    }
}
