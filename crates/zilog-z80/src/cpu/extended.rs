//! ED-prefixed instructions.
//!
//! Timings include both fetches (8T).

use super::Z80;
use crate::bus::Z80Bus;
use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF, parity};
use crate::tables::flag_tables;

/// Direction of a block instruction.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Step {
    Up,
    Down,
}

impl Step {
    const fn apply(self, value: u16) -> u16 {
        match self {
            Self::Up => value.wrapping_add(1),
            Self::Down => value.wrapping_sub(1),
        }
    }
}

impl<B: Z80Bus> Z80<B> {
    // =========================================================================
    // I/O through C
    // =========================================================================

    /// IN r,(C): 12T. Field 6 (`IN F,(C)`) only sets flags.
    pub(super) fn op_in_r_c(&mut self, op: u8) {
        let port = self.regs.bc();
        let value = self.bus.read_io(port);
        self.regs.wz = port.wrapping_add(1);
        let r = (op >> 3) & 7;
        if r != 6 {
            self.regs.set_reg8(r, value);
        }
        self.regs.f = flag_tables().log(value) | (self.regs.f & CF);
    }

    /// OUT (C),r: 12T. Field 6 writes 0 on NMOS parts and FF on CMOS.
    pub(super) fn op_out_c_r(&mut self, op: u8) {
        let port = self.regs.bc();
        let r = (op >> 3) & 7;
        let value = if r == 6 { self.kind.out_zero_value() } else { self.regs.reg8(r) };
        self.bus.write_io(port, value);
        self.regs.wz = port.wrapping_add(1);
    }

    // =========================================================================
    // 16-bit arithmetic and loads
    // =========================================================================

    // SBC HL,ss: 15T
    pub(super) fn op_sbc_hl_rr(&mut self, op: u8) {
        self.idle_ir(7);
        self.regs.wz = self.regs.hl().wrapping_add(1);
        let value = self.regs.pair((op >> 4) & 3);
        self.regs.sbc_hl(value);
    }

    // ADC HL,ss: 15T
    pub(super) fn op_adc_hl_rr(&mut self, op: u8) {
        self.idle_ir(7);
        self.regs.wz = self.regs.hl().wrapping_add(1);
        let value = self.regs.pair((op >> 4) & 3);
        self.regs.adc_hl(value);
    }

    // LD (nn),dd: 20T
    pub(super) fn op_ld_nn_rr(&mut self, op: u8) {
        let address = self.read_imm16();
        self.regs.wz = address.wrapping_add(1);
        self.write16(address, self.regs.pair((op >> 4) & 3));
    }

    // LD dd,(nn): 20T
    pub(super) fn op_ld_rr_nn_ind(&mut self, op: u8) {
        let address = self.read_imm16();
        self.regs.wz = address.wrapping_add(1);
        let value = self.read16(address);
        self.regs.set_pair((op >> 4) & 3, value);
    }

    // =========================================================================
    // Control
    // =========================================================================

    pub(super) fn op_neg(&mut self, _op: u8) {
        self.regs.neg();
    }

    /// RETN, RETI and their mirrors: 14T. All copy IFF2 into IFF1.
    pub(super) fn op_retn(&mut self, _op: u8) {
        self.regs.iff1 = self.regs.iff2;
        self.regs.wz = self.pop16();
        self.regs.pc = self.regs.wz;
    }

    /// IM 0/1/2 and mirrors. Field values 0 and 1 both select IM 0.
    pub(super) fn op_im(&mut self, op: u8) {
        self.regs.im = match (op >> 3) & 3 {
            0 | 1 => 0,
            2 => 1,
            _ => 2,
        };
    }

    // LD I,A: 9T
    pub(super) fn op_ld_i_a(&mut self, _op: u8) {
        self.idle_ir(1);
        self.regs.i = self.regs.a;
    }

    // LD R,A: 9T. Writes all 8 bits, including the one refresh never touches.
    pub(super) fn op_ld_r_a(&mut self, _op: u8) {
        self.idle_ir(1);
        self.regs.r = self.regs.a;
    }

    // LD A,I: 9T
    pub(super) fn op_ld_a_i(&mut self, _op: u8) {
        self.idle_ir(1);
        self.regs.a = self.regs.i;
        self.set_ld_a_ir_flags();
    }

    // LD A,R: 9T
    pub(super) fn op_ld_a_r(&mut self, _op: u8) {
        self.idle_ir(1);
        self.regs.a = self.regs.r;
        self.set_ld_a_ir_flags();
    }

    /// P/V reflects IFF2, but reads 0 if an interrupt is being accepted at
    /// the same time.
    fn set_ld_a_ir_flags(&mut self) {
        let mut f = (flag_tables().log(self.regs.a) & !PF) | (self.regs.f & CF);
        if self.regs.iff2 && !(self.int_line && self.regs.iff1) {
            f |= PF;
        }
        self.regs.f = f;
    }

    // RRD: 18T
    pub(super) fn op_rrd(&mut self, _op: u8) {
        let address = self.regs.hl();
        let value = self.read(address);
        self.idle(address, 4);
        self.regs.wz = address.wrapping_add(1);
        let a = self.regs.a;
        self.write(address, (a << 4) | (value >> 4));
        self.regs.a = (a & 0xF0) | (value & 0x0F);
        self.regs.f = flag_tables().log(self.regs.a) | (self.regs.f & CF);
    }

    // RLD: 18T
    pub(super) fn op_rld(&mut self, _op: u8) {
        let address = self.regs.hl();
        let value = self.read(address);
        self.idle(address, 4);
        self.regs.wz = address.wrapping_add(1);
        let a = self.regs.a;
        self.write(address, (a & 0x0F) | (value << 4));
        self.regs.a = (a & 0xF0) | (value >> 4);
        self.regs.f = flag_tables().log(self.regs.a) | (self.regs.f & CF);
    }

    // =========================================================================
    // Block transfer and compare
    // =========================================================================

    /// Step PC back onto the ED prefix so the instruction runs again.
    fn repeat_block(&mut self) {
        self.regs.pc = self.regs.pc.wrapping_sub(1);
        self.regs.wz = self.regs.pc;
        self.regs.pc = self.regs.pc.wrapping_sub(1);
    }

    /// LDI/LDD/LDIR/LDDR: 16T, or 21T when repeating.
    fn block_load(&mut self, step: Step, repeat: bool) {
        let hl = self.regs.hl();
        let de = self.regs.de();
        let value = self.read(hl);
        self.write(de, value);
        self.bus.write_no_mreq(de, 2);

        let bc = self.regs.bc().wrapping_sub(1);
        self.regs.set_bc(bc);
        let n = value.wrapping_add(self.regs.a);
        self.regs.f = (self.regs.f & (SF | ZF | CF)) | (n & XF) | ((n << 4) & YF);
        if bc != 0 {
            self.regs.f |= PF;
            if repeat {
                self.bus.write_no_mreq(de, 5);
                self.repeat_block();
            }
        }
        self.regs.set_hl(step.apply(hl));
        self.regs.set_de(step.apply(de));
    }

    /// CPI/CPD/CPIR/CPDR: 16T, or 21T when repeating.
    fn block_compare(&mut self, step: Step, repeat: bool) {
        let hl = self.regs.hl();
        let carry = self.regs.f & CF;
        let value = self.read(hl);
        self.idle(hl, 5);

        let bc = self.regs.bc().wrapping_sub(1);
        self.regs.set_bc(bc);
        self.regs.wz = step.apply(self.regs.wz);
        self.regs.f = flag_tables().cpi(self.regs.a, value) | carry;
        if bc != 0 {
            self.regs.f |= PF;
            if repeat && self.regs.f & ZF == 0 {
                self.idle(hl, 5);
                self.repeat_block();
            }
        }
        self.regs.set_hl(step.apply(hl));
    }

    pub(super) fn op_ldi(&mut self, _op: u8) {
        self.block_load(Step::Up, false);
    }

    pub(super) fn op_ldd(&mut self, _op: u8) {
        self.block_load(Step::Down, false);
    }

    pub(super) fn op_ldir(&mut self, _op: u8) {
        self.block_load(Step::Up, true);
    }

    pub(super) fn op_lddr(&mut self, _op: u8) {
        self.block_load(Step::Down, true);
    }

    pub(super) fn op_cpi(&mut self, _op: u8) {
        self.block_compare(Step::Up, false);
    }

    pub(super) fn op_cpd(&mut self, _op: u8) {
        self.block_compare(Step::Down, false);
    }

    pub(super) fn op_cpir(&mut self, _op: u8) {
        self.block_compare(Step::Up, true);
    }

    pub(super) fn op_cpdr(&mut self, _op: u8) {
        self.block_compare(Step::Down, true);
    }

    // =========================================================================
    // Block I/O
    // =========================================================================

    /// Flags for a single INI/IND/OUTI/OUTD step. `k` is the byte added to
    /// the transferred value to form the internal carry term.
    fn block_io_flags(&mut self, value: u8, k: u8) {
        let sum = value.wrapping_add(k);
        let b = self.regs.b;
        let mut f = flag_tables().log(b) & !PF;
        if parity((sum & 0x07) ^ b) {
            f |= PF;
        }
        if sum < value {
            f |= HF | CF;
        }
        if value & 0x80 != 0 {
            f |= NF;
        }
        self.regs.f = f;
    }

    // INI / IND: 16T (4, 5, 4, 3)
    fn block_in(&mut self, step: Step) {
        self.idle_ir(1);
        let port = self.regs.bc();
        let value = self.bus.read_io(port);
        let hl = self.regs.hl();
        self.write(hl, value);
        self.regs.wz = step.apply(port);
        self.regs.set_hl(step.apply(hl));
        self.regs.b = self.regs.b.wrapping_sub(1);
        let k = match step {
            Step::Up => self.regs.c.wrapping_add(1),
            Step::Down => self.regs.c.wrapping_sub(1),
        };
        self.block_io_flags(value, k);
    }

    // OUTI / OUTD: 16T (4, 5, 3, 4)
    fn block_out(&mut self, step: Step) {
        self.idle_ir(1);
        self.regs.b = self.regs.b.wrapping_sub(1);
        let hl = self.regs.hl();
        let value = self.read(hl);
        let port = self.regs.bc();
        self.bus.write_io(port, value);
        self.regs.wz = step.apply(port);
        self.regs.set_hl(step.apply(hl));
        self.block_io_flags(value, self.regs.l);
    }

    /// INIR / INDR: 16T when B reaches 0, 21T otherwise.
    fn block_in_repeat(&mut self, step: Step) {
        self.idle_ir(1);
        let port = self.regs.bc();
        self.regs.wz = step.apply(port);
        let value = self.bus.read_io(port);
        let hl = self.regs.hl();
        self.write(hl, value);
        self.regs.b = self.regs.dec8(self.regs.b);
        if self.regs.b != 0 {
            self.bus.write_no_mreq(hl, 5);
            self.regs.pc = self.regs.pc.wrapping_sub(2);
            self.regs.f |= PF;
        } else {
            self.regs.f &= !PF;
        }
        self.regs.set_hl(step.apply(hl));
    }

    /// OTIR / OTDR: 16T when B reaches 0, 21T otherwise. C is set when L
    /// reads 0x00 after OTIR's increment or 0xFF before OTDR's decrement.
    fn block_out_repeat(&mut self, step: Step) {
        self.idle_ir(1);
        self.regs.b = self.regs.dec8(self.regs.b);
        let hl = self.regs.hl();
        let value = self.read(hl);
        let port = self.regs.bc();
        self.bus.write_io(port, value);
        let next = step.apply(hl);
        let carry = match step {
            Step::Up => next as u8 == 0x00,
            Step::Down => hl as u8 == 0xFF,
        };
        self.regs.set_hl(next);
        if self.regs.b != 0 {
            self.idle(port, 5);
            self.regs.pc = self.regs.pc.wrapping_sub(2);
            self.regs.f |= PF;
        } else {
            self.regs.f &= !PF;
        }
        self.regs.f = (self.regs.f & !CF) | if carry { CF } else { 0 };
        self.regs.wz = step.apply(self.regs.bc());
    }

    pub(super) fn op_ini(&mut self, _op: u8) {
        self.block_in(Step::Up);
    }

    pub(super) fn op_ind(&mut self, _op: u8) {
        self.block_in(Step::Down);
    }

    pub(super) fn op_outi(&mut self, _op: u8) {
        self.block_out(Step::Up);
    }

    pub(super) fn op_outd(&mut self, _op: u8) {
        self.block_out(Step::Down);
    }

    pub(super) fn op_inir(&mut self, _op: u8) {
        self.block_in_repeat(Step::Up);
    }

    pub(super) fn op_indr(&mut self, _op: u8) {
        self.block_in_repeat(Step::Down);
    }

    pub(super) fn op_otir(&mut self, _op: u8) {
        self.block_out_repeat(Step::Up);
    }

    pub(super) fn op_otdr(&mut self, _op: u8) {
        self.block_out_repeat(Step::Down);
    }
}
