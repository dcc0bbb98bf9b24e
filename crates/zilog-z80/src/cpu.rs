//! Z80 CPU core with table-driven dispatch.
//!
//! One call to [`Z80::step`] processes one pending signal or executes one
//! complete instruction, prefixes included. Every T-state is charged
//! through the owned bus; the core keeps no clock of its own.

#![allow(clippy::struct_excessive_bools)] // Interrupt latches and signal lines.

mod base;
mod bits;
mod dispatch;
mod extended;
mod index;
mod signals;

use emu_core::{Cpu, Observable, Value};

use crate::bus::Z80Bus;
use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF};
use crate::mode::{CpuKind, ExtMode, IndexMode};
use crate::registers::Registers;

use dispatch::OpcodeTables;

/// Z80 CPU.
///
/// The CPU owns its bus. Hosts drive it with [`Z80::step`] and the
/// `set_*` signal inputs, and reach their own devices through
/// [`Z80::bus_mut`].
pub struct Z80<B: Z80Bus> {
    regs: Registers,
    bus: B,
    kind: CpuKind,
    tables: Box<OpcodeTables<B>>,

    // === Prefix state ===
    index_mode: IndexMode,
    ext_mode: ExtMode,
    /// Last opcode was EI or a prefix: INT is not accepted before the next
    /// instruction completes.
    int_blocked: bool,

    // === Signal inputs ===
    reset_line: bool,
    nmi_line: bool,
    int_line: bool,
    /// Byte floating on the data bus during INT acknowledge.
    data_bus: u8,

    // === Debug state ===
    last_opcode_pc: u16,
    fetch_count: u64,
}

impl<B: Z80Bus> Z80<B> {
    /// Create a CMOS Z80 with power-on register contents.
    #[must_use]
    pub fn new(bus: B) -> Self {
        Self::with_kind(bus, CpuKind::default())
    }

    /// Create a Z80 of the given silicon variant.
    #[must_use]
    pub fn with_kind(bus: B, kind: CpuKind) -> Self {
        Self {
            regs: Registers::power_on(),
            bus,
            kind,
            tables: Box::new(OpcodeTables::new()),
            index_mode: IndexMode::None,
            ext_mode: ExtMode::None,
            int_blocked: false,
            reset_line: false,
            nmi_line: false,
            int_line: false,
            data_bus: 0xFF,
            last_opcode_pc: 0x00FF,
            fetch_count: 0,
        }
    }

    /// Process one signal or execute one instruction.
    ///
    /// Signals are sampled in priority RESET, NMI, INT. INT is only
    /// accepted with IFF1 set and not straight after EI or a prefix.
    pub fn step(&mut self) {
        if self.reset_line {
            self.accept_reset();
        } else if self.nmi_line {
            self.accept_nmi();
        } else if self.int_line && self.regs.iff1 && !self.int_blocked {
            self.accept_interrupt();
        } else {
            self.execute();
        }
    }

    fn execute(&mut self) {
        self.last_opcode_pc = self.regs.pc;
        let mut op = self.fetch_opcode();

        loop {
            match op {
                0xDD => self.index_mode = IndexMode::Ix,
                0xFD => self.index_mode = IndexMode::Iy,
                0xCB => {
                    self.ext_mode = ExtMode::Bit;
                    self.int_blocked = true;
                    self.execute_cb();
                    break;
                }
                0xED => {
                    self.ext_mode = ExtMode::Extended;
                    self.int_blocked = true;
                    let op = self.fetch_prefixed();
                    self.int_blocked = false;
                    let handler = self.tables.ed[usize::from(op)];
                    handler(self, op);
                    break;
                }
                _ => {
                    self.int_blocked = false;
                    let handler = if self.index_mode == IndexMode::None {
                        self.tables.base[usize::from(op)]
                    } else {
                        self.tables.index[usize::from(op)]
                    };
                    handler(self, op);
                    break;
                }
            }
            // DD or FD: fetch the next byte under the new index mode.
            self.int_blocked = true;
            op = self.fetch_prefixed();
        }

        self.index_mode = IndexMode::None;
        self.ext_mode = ExtMode::None;
    }

    fn execute_cb(&mut self) {
        if self.index_mode == IndexMode::None {
            let op = self.fetch_prefixed();
            self.int_blocked = false;
            let handler = self.tables.cb[usize::from(op)];
            handler(self, op);
        } else {
            // DD CB d op: displacement precedes the opcode and neither byte
            // gets a refresh cycle.
            let d = self.read_imm() as i8;
            self.regs.wz = self.index_reg().wrapping_add_signed(i16::from(d));
            let op = self.bus.read(self.regs.pc);
            self.bus.read_no_mreq(self.regs.pc, 2);
            self.regs.pc = self.regs.pc.wrapping_add(1);
            self.int_blocked = false;
            let handler = self.tables.index_cb[usize::from(op)];
            handler(self, op);
        }
    }

    // =========================================================================
    // Bus cycles
    // =========================================================================

    /// R increment plus one refresh T-state with IR on the address bus.
    fn refresh(&mut self, counted: bool) {
        self.regs.bump_r();
        self.bus.read_no_mreq(self.regs.ir(), 1);
        if counted {
            self.fetch_count += 1;
        }
    }

    /// M1 opcode fetch: 4T.
    fn fetch_opcode(&mut self) -> u8 {
        let op = self.bus.fetch(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        self.refresh(true);
        op
    }

    /// Opcode byte following a prefix: 4T.
    fn fetch_prefixed(&mut self) -> u8 {
        let op = self.bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        self.refresh(true);
        op
    }

    fn read(&mut self, address: u16) -> u8 {
        self.bus.read(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        self.bus.write(address, value);
    }

    /// Read the byte at PC and advance PC.
    fn read_imm(&mut self) -> u8 {
        let value = self.bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    /// Read a little-endian word at PC and advance PC past it.
    fn read_imm16(&mut self) -> u16 {
        let lo = self.read_imm();
        let hi = self.read_imm();
        u16::from_le_bytes([lo, hi])
    }

    /// Read a little-endian word.
    fn read16(&mut self, address: u16) -> u16 {
        let lo = self.bus.read(address);
        let hi = self.bus.read(address.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    fn write16(&mut self, address: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.bus.write(address, lo);
        self.bus.write(address.wrapping_add(1), hi);
    }

    /// Internal cycles with `address` on the bus.
    fn idle(&mut self, address: u16, cycles: u32) {
        self.bus.read_no_mreq(address, cycles);
    }

    /// Internal cycles with IR on the bus (the cycles that extend M1).
    fn idle_ir(&mut self, cycles: u32) {
        self.bus.read_no_mreq(self.regs.ir(), cycles);
    }

    /// Push high byte then low byte: 6T.
    fn push16(&mut self, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.bus.write(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.bus.write(self.regs.sp, lo);
    }

    /// Pop low byte then high byte: 6T.
    fn pop16(&mut self) -> u16 {
        let lo = self.bus.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = self.bus.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        u16::from_le_bytes([lo, hi])
    }

    /// Condition field: NZ Z NC C PO PE P M.
    fn condition(&self, cc: u8) -> bool {
        const MASKS: [u8; 4] = [ZF, CF, PF, SF];
        let set = self.regs.f & MASKS[usize::from(cc >> 1)] != 0;
        if cc & 1 == 0 { !set } else { set }
    }

    // =========================================================================
    // Index register selection
    // =========================================================================

    /// IX or IY, as selected by the active prefix.
    fn index_reg(&self) -> u16 {
        match self.index_mode {
            IndexMode::Ix => self.regs.ix,
            IndexMode::Iy => self.regs.iy,
            IndexMode::None => unreachable!("index register used without DD/FD prefix"),
        }
    }

    fn set_index_reg(&mut self, value: u16) {
        match self.index_mode {
            IndexMode::Ix => self.regs.ix = value,
            IndexMode::Iy => self.regs.iy = value,
            IndexMode::None => unreachable!("index register used without DD/FD prefix"),
        }
    }

    // =========================================================================
    // Host interface
    // =========================================================================

    /// Snapshot of the register file.
    #[must_use]
    pub const fn registers(&self) -> Registers {
        self.regs
    }

    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.regs.pc
    }

    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.regs.halted
    }

    #[must_use]
    pub const fn kind(&self) -> CpuKind {
        self.kind
    }

    /// Index prefix latched for the instruction in flight.
    #[must_use]
    pub const fn index_mode(&self) -> IndexMode {
        self.index_mode
    }

    /// Extended page latched for the instruction in flight.
    #[must_use]
    pub const fn ext_mode(&self) -> ExtMode {
        self.ext_mode
    }

    /// True if the last instruction was EI (or a prefix), so INT will not be
    /// accepted before the next one.
    #[must_use]
    pub const fn int_blocked(&self) -> bool {
        self.int_blocked
    }

    /// Address of the first byte of the most recently started instruction.
    #[must_use]
    pub const fn last_opcode_pc(&self) -> u16 {
        self.last_opcode_pc
    }

    /// Counted opcode fetches: M1 and prefixed fetches plus NMI acknowledge,
    /// excluding INT acknowledge. This is the counter RZX playback uses.
    #[must_use]
    pub const fn fetch_count(&self) -> u64 {
        self.fetch_count
    }

    pub fn reset_fetch_count(&mut self) {
        self.fetch_count = 0;
    }

    /// Hold or release the RESET line.
    pub fn set_reset(&mut self, asserted: bool) {
        self.reset_line = asserted;
    }

    /// Hold or release the NMI line.
    pub fn set_nmi(&mut self, asserted: bool) {
        self.nmi_line = asserted;
    }

    /// Hold or release the INT line.
    pub fn set_int(&mut self, asserted: bool) {
        self.int_line = asserted;
    }

    /// Byte a device puts on the data bus for IM 2 vectoring.
    pub fn set_data_bus(&mut self, value: u8) {
        self.data_bus = value;
    }

    #[must_use]
    pub const fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    #[must_use]
    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Mutable register access for seeding test state.
    #[cfg(feature = "test-utils")]
    pub fn regs_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    #[cfg(feature = "test-utils")]
    pub fn set_pc(&mut self, pc: u16) {
        self.regs.pc = pc;
    }

    #[cfg(feature = "test-utils")]
    pub fn set_sp(&mut self, sp: u16) {
        self.regs.sp = sp;
    }
}

impl<B: Z80Bus> Cpu for Z80<B> {
    type Registers = Registers;

    fn step(&mut self) {
        Z80::step(self);
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.regs.halted
    }

    fn set_reset(&mut self, asserted: bool) {
        self.reset_line = asserted;
    }

    fn set_nmi(&mut self, asserted: bool) {
        self.nmi_line = asserted;
    }

    fn set_int(&mut self, asserted: bool) {
        self.int_line = asserted;
    }
}

/// All query paths supported by the Z80.
const Z80_QUERY_PATHS: &[&str] = &[
    // Main registers
    "a", "f", "b", "c", "d", "e", "h", "l",
    // Register pairs
    "af", "bc", "de", "hl",
    // Alternate pairs
    "af'", "bc'", "de'", "hl'",
    // Index registers
    "ix", "iy", "ixh", "ixl", "iyh", "iyl",
    // Other registers
    "sp", "pc", "i", "r", "ir", "wz", "mh", "ml",
    // Flags
    "flags.s", "flags.z", "flags.y", "flags.h", "flags.x", "flags.p", "flags.n", "flags.c",
    // Interrupt state
    "iff1", "iff2", "im", "int_blocked",
    // Signal lines
    "lines.reset", "lines.nmi", "lines.int", "data_bus",
    // CPU state
    "halted", "index_mode", "ext_mode", "last_opcode_pc", "fetch_count",
];

impl<B: Z80Bus> Observable for Z80<B> {
    fn query(&self, path: &str) -> Option<Value> {
        let r = &self.regs;
        let value = match path {
            "a" => r.a.into(),
            "f" => r.f.into(),
            "b" => r.b.into(),
            "c" => r.c.into(),
            "d" => r.d.into(),
            "e" => r.e.into(),
            "h" => r.h.into(),
            "l" => r.l.into(),

            "af" => r.af().into(),
            "bc" => r.bc().into(),
            "de" => r.de().into(),
            "hl" => r.hl().into(),

            "af'" => r.af_alt().into(),
            "bc'" => r.bc_alt().into(),
            "de'" => r.de_alt().into(),
            "hl'" => r.hl_alt().into(),

            "ix" => r.ix.into(),
            "iy" => r.iy.into(),
            "ixh" => r.ixh().into(),
            "ixl" => r.ixl().into(),
            "iyh" => r.iyh().into(),
            "iyl" => r.iyl().into(),

            "sp" => r.sp.into(),
            "pc" => r.pc.into(),
            "i" => r.i.into(),
            "r" => r.r.into(),
            "ir" => r.ir().into(),
            "wz" => r.wz.into(),
            "mh" => r.mh().into(),
            "ml" => r.ml().into(),

            "flags.s" => (r.f & SF != 0).into(),
            "flags.z" => (r.f & ZF != 0).into(),
            "flags.y" => (r.f & YF != 0).into(),
            "flags.h" => (r.f & HF != 0).into(),
            "flags.x" => (r.f & XF != 0).into(),
            "flags.p" => (r.f & PF != 0).into(),
            "flags.n" => (r.f & NF != 0).into(),
            "flags.c" => (r.f & CF != 0).into(),

            "iff1" => r.iff1.into(),
            "iff2" => r.iff2.into(),
            "im" => r.im.into(),
            "int_blocked" => self.int_blocked.into(),

            "lines.reset" => self.reset_line.into(),
            "lines.nmi" => self.nmi_line.into(),
            "lines.int" => self.int_line.into(),
            "data_bus" => self.data_bus.into(),

            "halted" => r.halted.into(),
            "index_mode" => self.index_mode.name().into(),
            "ext_mode" => self.ext_mode.name().into(),
            "last_opcode_pc" => self.last_opcode_pc.into(),
            "fetch_count" => self.fetch_count.into(),

            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        Z80_QUERY_PATHS
    }
}
