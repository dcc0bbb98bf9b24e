//! RESET, NMI and INT acknowledgement.

use super::Z80;
use crate::bus::Z80Bus;
use crate::mode::{ExtMode, IndexMode};

impl<B: Z80Bus> Z80<B> {
    /// RESET: 3T. No instruction is fetched.
    pub(super) fn accept_reset(&mut self) {
        self.bus.reset();
        self.refresh(true);

        self.index_mode = IndexMode::None;
        self.ext_mode = ExtMode::None;
        self.int_blocked = false;
        self.regs.halted = false;
        self.regs.iff1 = false;
        self.regs.iff2 = false;
        self.regs.pc = 0;
        self.regs.set_ir(0);
        self.regs.im = 0;

        self.idle(self.regs.pc, 2);
    }

    /// NMI: 11T (5, 3, 3). Pushes PC and jumps to 0066h.
    pub(super) fn accept_nmi(&mut self) {
        self.leave_halt();

        self.bus.nmi_acknowledge(self.regs.pc, 4);
        self.refresh(true);

        self.regs.iff2 = self.regs.iff1;
        self.regs.iff1 = false;
        self.push16(self.regs.pc);
        self.regs.pc = 0x0066;
    }

    /// Maskable interrupt.
    ///
    /// IM 0 and IM 1: 13T (7, 3, 3), vector 0038h. IM 0 does not execute
    /// the byte on the data bus; it behaves as `RST 38h`.
    /// IM 2: 19T (7, 3, 3, 3, 3), vector read from `I:data_bus`.
    pub(super) fn accept_interrupt(&mut self) {
        self.leave_halt();

        self.bus.interrupt_acknowledge(self.regs.pc, 6);
        // Acknowledge cycles are not opcode fetches as far as the fetch
        // counter is concerned.
        self.refresh(false);

        self.regs.iff1 = false;
        self.regs.iff2 = false;
        self.push16(self.regs.pc);

        self.regs.wz = if self.regs.im == 2 {
            let table = u16::from(self.regs.i) << 8 | u16::from(self.data_bus);
            self.read16(table)
        } else {
            0x0038
        };
        self.regs.pc = self.regs.wz;
    }

    /// Step past the HALT that rewound PC onto itself.
    fn leave_halt(&mut self) {
        if self.regs.halted {
            self.regs.halted = false;
            self.regs.pc = self.regs.pc.wrapping_add(1);
        }
    }
}
