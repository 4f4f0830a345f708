//! Registers of the ARC JTAG interface and the auxiliary registers used for run control.

use bitfield::bitfield;

/// `LP_START` aux register, start of the zero overhead loop.
pub const AUX_LP_START: u32 = 0x2;
/// `LP_END` aux register, end of the zero overhead loop.
pub const AUX_LP_END: u32 = 0x3;
/// `IDENTITY` aux register.
pub const AUX_IDENTITY: u32 = 0x4;
/// `DEBUG` aux register.
pub const AUX_DEBUG: u32 = 0x5;
/// `PC` aux register.
pub const AUX_PC: u32 = 0x6;
/// `STATUS32` aux register.
pub const AUX_STATUS32: u32 = 0xA;

/// An auxiliary register with a fixed address.
pub trait AuxRegister: Copy + From<u32> + Into<u32> {
    /// Address of the register in the aux register space.
    const ADDRESS: u32;
    /// Name of the register, as used in the ARC programmer's reference.
    const NAME: &'static str;
}

macro_rules! aux_register {
    ($name:ident, $address:expr, $register_name:expr) => {
        impl AuxRegister for $name {
            const ADDRESS: u32 = $address;
            const NAME: &'static str = $register_name;
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u32 {
            fn from(register: $name) -> Self {
                register.0
            }
        }
    };
}

bitfield! {
    /// The status register of the ARC JTAG interface.
    ///
    /// This is the only register which can be read while the core is running.
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct JtagStatus(u32);
    impl Debug;

    /// The last transaction stalled.
    pub stalled, _: 0;
    /// The last transaction failed.
    pub failure, _: 1;
    /// The interface is ready for the next transaction.
    pub ready, set_ready: 2;
    /// The PC was selected by the last transaction.
    pub pc_selected, _: 3;
    /// The core is running.
    pub running, set_running: 4;
}

impl From<u32> for JtagStatus {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<JtagStatus> for u32 {
    fn from(register: JtagStatus) -> Self {
        register.0
    }
}

bitfield! {
    /// `DEBUG` aux register.
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct AuxDebug(u32);
    impl Debug;

    /// A load is pending.
    pub load_pending, _: 31;
    /// The core halted itself with a `FLAG` instruction.
    pub self_halt, _: 30;
    /// The core halted on a breakpoint instruction.
    pub breakpoint_halt, _: 29;
    /// The core is in sleep mode.
    pub sleep_mode, _: 23;
    /// A reset was applied since the register was last read.
    pub reset_applied, _: 22;
    /// Single steps a whole instruction, together with `single_step`.
    pub instruction_step, set_instruction_step: 11;
    /// Writing `1` halts the core.
    pub force_halt, set_force_halt: 1;
    /// Executes a single step.
    pub single_step, set_single_step: 0;
}

aux_register!(AuxDebug, AUX_DEBUG, "DEBUG");

bitfield! {
    /// `IDENTITY` aux register.
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct Identity(u32);
    impl Debug;

    /// Chip identification number.
    pub u16, chip_id, _: 31, 16;
    /// Core number in a multi-core system.
    pub u8, arc_number, _: 15, 8;
    /// Basecase version of the core.
    pub u8, arc_version, _: 7, 0;
}

aux_register!(Identity, AUX_IDENTITY, "IDENTITY");

impl Identity {
    /// Name of the core family, derived from the basecase version.
    pub fn family(&self) -> &'static str {
        match self.arc_version() {
            0x20..=0x2f => "ARC600",
            0x30..=0x3f => "ARC700",
            0x40..=0x4f => "ARC EM",
            0x50..=0x5f => "ARC HS",
            _ => "unknown",
        }
    }
}

bitfield! {
    /// `STATUS32` aux register.
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct Status32(u32);
    impl Debug;

    /// Zero overhead loops are disabled.
    pub zero_overhead_loop_disabled, _: 12;
    /// Zero flag.
    pub zero, _: 11;
    /// Negative flag.
    pub negative, _: 10;
    /// Carry flag.
    pub carry, _: 9;
    /// Overflow flag.
    pub overflow, _: 8;
    /// The core runs in user mode.
    pub user_mode, _: 7;
    /// The core executes a delay slot.
    pub delay_slot, _: 6;
    /// An exception is being handled.
    pub exception_active, _: 5;
    /// Level 2 interrupt is active.
    pub a2, _: 4;
    /// Level 1 interrupt is active.
    pub a1, _: 3;
    /// Level 2 interrupts are enabled.
    pub e2, _: 2;
    /// Level 1 interrupts are enabled.
    pub e1, _: 1;
    /// The core is halted. Clearing this bit restarts the core.
    pub halted, set_halted: 0;
}

aux_register!(Status32, AUX_STATUS32, "STATUS32");

/// Identifies a register of an ARC core.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegisterId {
    /// A core register, `r0` to `r31`.
    Core(u8),
    /// An auxiliary register.
    Aux(u32),
}

/// Describes one register of the register catalog.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RegisterDescription {
    /// Name of the register as shown to the user.
    pub name: &'static str,
    /// Where the register is located.
    pub id: RegisterId,
}

const fn core(name: &'static str, number: u8) -> RegisterDescription {
    RegisterDescription {
        name,
        id: RegisterId::Core(number),
    }
}

const fn aux(name: &'static str, address: u32) -> RegisterDescription {
    RegisterDescription {
        name,
        id: RegisterId::Aux(address),
    }
}

/// All registers which are kept in the register cache of an ARC core.
pub static ARC_REGISTERS: &[RegisterDescription] = &[
    core("r0", 0),
    core("r1", 1),
    core("r2", 2),
    core("r3", 3),
    core("r4", 4),
    core("r5", 5),
    core("r6", 6),
    core("r7", 7),
    core("r8", 8),
    core("r9", 9),
    core("r10", 10),
    core("r11", 11),
    core("r12", 12),
    core("r13", 13),
    core("r14", 14),
    core("r15", 15),
    core("r16", 16),
    core("r17", 17),
    core("r18", 18),
    core("r19", 19),
    core("r20", 20),
    core("r21", 21),
    core("r22", 22),
    core("r23", 23),
    core("r24", 24),
    core("r25", 25),
    core("gp", 26),
    core("fp", 27),
    core("sp", 28),
    core("ilink1", 29),
    core("ilink2", 30),
    core("blink", 31),
    aux("lp_start", AUX_LP_START),
    aux("lp_end", AUX_LP_END),
    aux("identity", AUX_IDENTITY),
    aux("debug", AUX_DEBUG),
    aux("pc", AUX_PC),
    aux("status32", AUX_STATUS32),
];

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn jtag_status_running_bit() {
        assert!(JtagStatus(0x10).running());
        assert!(!JtagStatus(0x04).running());
        assert!(JtagStatus(0x04).ready());
    }

    #[test]
    fn identity_fields() {
        let identity = Identity(0x1234_0234);

        assert_eq!(identity.chip_id(), 0x1234);
        assert_eq!(identity.arc_number(), 0x02);
        assert_eq!(identity.arc_version(), 0x34);
        assert_eq!(identity.family(), "ARC700");
    }

    #[test]
    fn force_halt_is_bit_one() {
        let mut debug = AuxDebug(0);
        debug.set_force_halt(true);

        assert_eq!(u32::from(debug), 0x2);
    }

    #[test]
    fn catalog_has_unique_ids() {
        let mut ids: Vec<_> = ARC_REGISTERS.iter().map(|r| r.id).collect();
        ids.sort();
        ids.dedup();

        assert_eq!(ids.len(), ARC_REGISTERS.len());
    }
}
