//! DD/FD-prefixed instructions.
//!
//! Only opcodes that involve HL, H, L or (HL) have entries here; the rest
//! run their unprefixed handler. The active index register comes from the
//! prefix latch.

use super::Z80;
use crate::alu::ALU_OPS;
use crate::bus::Z80Bus;

impl<B: Z80Bus> Z80<B> {
    /// Register field with H and L replaced by the index register halves.
    fn reg8_xy(&self, r: u8) -> u8 {
        let [lo, hi] = self.index_reg().to_le_bytes();
        match r {
            4 => hi,
            5 => lo,
            _ => self.regs.reg8(r),
        }
    }

    fn set_reg8_xy(&mut self, r: u8, value: u8) {
        let [lo, hi] = self.index_reg().to_le_bytes();
        match r {
            4 => self.set_index_reg(u16::from_le_bytes([lo, value])),
            5 => self.set_index_reg(u16::from_le_bytes([value, hi])),
            _ => self.regs.set_reg8(r, value),
        }
    }

    /// Read d, burn 5 internal cycles and latch IX+d / IY+d into MEMPTR.
    fn indexed_address(&mut self) -> u16 {
        let d = self.read(self.regs.pc) as i8;
        self.idle(self.regs.pc, 5);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        self.regs.wz = self.index_reg().wrapping_add_signed(i16::from(d));
        self.regs.wz
    }

    // =========================================================================
    // 16-bit
    // =========================================================================

    // LD IX,nn: 14T
    pub(super) fn op_ld_xy_nn(&mut self, _op: u8) {
        let value = self.read_imm16();
        self.set_index_reg(value);
    }

    // LD (nn),IX: 20T
    pub(super) fn op_ld_nn_xy(&mut self, _op: u8) {
        let address = self.read_imm16();
        self.regs.wz = address.wrapping_add(1);
        self.write16(address, self.index_reg());
    }

    // LD IX,(nn): 20T
    pub(super) fn op_ld_xy_nn_ind(&mut self, _op: u8) {
        let address = self.read_imm16();
        self.regs.wz = address.wrapping_add(1);
        let value = self.read16(address);
        self.set_index_reg(value);
    }

    // INC IX: 10T
    pub(super) fn op_inc_xy(&mut self, _op: u8) {
        self.idle_ir(2);
        self.set_index_reg(self.index_reg().wrapping_add(1));
    }

    // DEC IX: 10T
    pub(super) fn op_dec_xy(&mut self, _op: u8) {
        self.idle_ir(2);
        self.set_index_reg(self.index_reg().wrapping_sub(1));
    }

    // ADD IX,pp: 15T. Field 2 is the index register itself.
    pub(super) fn op_add_xy_rr(&mut self, op: u8) {
        self.idle_ir(7);
        let xy = self.index_reg();
        let rhs = match (op >> 4) & 3 {
            2 => xy,
            rr => self.regs.pair(rr),
        };
        self.regs.wz = xy.wrapping_add(1);
        let result = self.regs.add16(xy, rhs);
        self.set_index_reg(result);
    }

    // PUSH IX: 15T
    pub(super) fn op_push_xy(&mut self, _op: u8) {
        self.idle_ir(1);
        self.push16(self.index_reg());
    }

    // POP IX: 14T
    pub(super) fn op_pop_xy(&mut self, _op: u8) {
        let value = self.pop16();
        self.set_index_reg(value);
    }

    // EX (SP),IX: 23T
    pub(super) fn op_ex_sp_xy(&mut self, _op: u8) {
        let value = self.ex_sp(self.index_reg());
        self.set_index_reg(value);
    }

    // JP (IX): 8T
    pub(super) fn op_jp_xy(&mut self, _op: u8) {
        self.regs.pc = self.index_reg();
    }

    // LD SP,IX: 10T
    pub(super) fn op_ld_sp_xy(&mut self, _op: u8) {
        self.idle_ir(2);
        self.regs.sp = self.index_reg();
    }

    // =========================================================================
    // Index halves (undocumented)
    // =========================================================================

    /// INC IXH / INC IXL: 8T
    pub(super) fn op_inc_xy_half(&mut self, op: u8) {
        let r = (op >> 3) & 7;
        let value = self.reg8_xy(r);
        let value = self.regs.inc8(value);
        self.set_reg8_xy(r, value);
    }

    /// DEC IXH / DEC IXL: 8T
    pub(super) fn op_dec_xy_half(&mut self, op: u8) {
        let r = (op >> 3) & 7;
        let value = self.reg8_xy(r);
        let value = self.regs.dec8(value);
        self.set_reg8_xy(r, value);
    }

    /// LD IXH,n / LD IXL,n: 11T
    pub(super) fn op_ld_xy_half_n(&mut self, op: u8) {
        let value = self.read_imm();
        self.set_reg8_xy((op >> 3) & 7, value);
    }

    /// LD r,r' where H and L mean the index halves on both sides: 8T
    pub(super) fn op_ld_r_r_xy(&mut self, op: u8) {
        let value = self.reg8_xy(op & 7);
        self.set_reg8_xy((op >> 3) & 7, value);
    }

    /// ALU A,IXH / ALU A,IXL: 8T
    pub(super) fn op_alu_xy_half(&mut self, op: u8) {
        let value = self.reg8_xy(op & 7);
        ALU_OPS[usize::from((op >> 3) & 7)](&mut self.regs, value);
    }

    // =========================================================================
    // (IX+d) forms
    // =========================================================================

    // LD r,(IX+d): 19T. H and L here are the real registers.
    pub(super) fn op_ld_r_mxy(&mut self, op: u8) {
        let address = self.indexed_address();
        let value = self.read(address);
        self.regs.set_reg8((op >> 3) & 7, value);
    }

    // LD (IX+d),r: 19T
    pub(super) fn op_ld_mxy_r(&mut self, op: u8) {
        let address = self.indexed_address();
        self.write(address, self.regs.reg8(op & 7));
    }

    // LD (IX+d),n: 19T (4, 4, 3, 5, 3)
    pub(super) fn op_ld_mxy_n(&mut self, _op: u8) {
        let d = self.read_imm() as i8;
        let value = self.read(self.regs.pc);
        self.idle(self.regs.pc, 2);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        self.regs.wz = self.index_reg().wrapping_add_signed(i16::from(d));
        self.write(self.regs.wz, value);
    }

    // ALU A,(IX+d): 19T
    pub(super) fn op_alu_mxy(&mut self, op: u8) {
        let address = self.indexed_address();
        let value = self.read(address);
        ALU_OPS[usize::from((op >> 3) & 7)](&mut self.regs, value);
    }

    // INC (IX+d): 23T
    pub(super) fn op_inc_mxy(&mut self, _op: u8) {
        let address = self.indexed_address();
        let value = self.read(address);
        self.idle(address, 1);
        let value = self.regs.inc8(value);
        self.write(address, value);
    }

    // DEC (IX+d): 23T
    pub(super) fn op_dec_mxy(&mut self, _op: u8) {
        let address = self.indexed_address();
        let value = self.read(address);
        self.idle(address, 1);
        let value = self.regs.dec8(value);
        self.write(address, value);
    }
}
