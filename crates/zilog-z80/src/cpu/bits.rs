//! CB-prefixed rotates, shifts and bit operations, plus the DD/FD CB forms.

use super::Z80;
use crate::alu::ROTATE_OPS;
use crate::bus::Z80Bus;
use crate::registers::Registers;

const fn bit_index(op: u8) -> u8 {
    (op >> 3) & 7
}

fn res(_regs: &mut Registers, value: u8, bit: u8) -> u8 {
    value & !(1 << bit)
}

fn set(_regs: &mut Registers, value: u8, bit: u8) -> u8 {
    value | (1 << bit)
}

fn rotate(regs: &mut Registers, value: u8, kind: u8) -> u8 {
    ROTATE_OPS[usize::from(kind)](regs, value)
}

impl<B: Z80Bus> Z80<B> {
    /// Read-modify-write of the byte at `address`: 3 + 1 + 3 T-states.
    fn modify_memory(
        &mut self,
        address: u16,
        arg: u8,
        f: fn(&mut Registers, u8, u8) -> u8,
    ) -> u8 {
        let value = self.read(address);
        self.idle(address, 1);
        let result = f(&mut self.regs, value, arg);
        self.write(address, result);
        result
    }

    fn modify_register(&mut self, op: u8, f: fn(&mut Registers, u8, u8) -> u8) {
        let r = op & 7;
        let value = self.regs.reg8(r);
        let result = f(&mut self.regs, value, bit_index(op));
        self.regs.set_reg8(r, result);
    }

    // =========================================================================
    // CB xx
    // =========================================================================

    // RLC..SRL r: 8T
    pub(super) fn op_rot_r(&mut self, op: u8) {
        self.modify_register(op, rotate);
    }

    // RLC..SRL (HL): 15T
    pub(super) fn op_rot_mhl(&mut self, op: u8) {
        self.modify_memory(self.regs.hl(), bit_index(op), rotate);
    }

    // BIT b,r: 8T
    pub(super) fn op_bit_r(&mut self, op: u8) {
        let value = self.regs.reg8(op & 7);
        self.regs.bit(bit_index(op), value);
    }

    // BIT b,(HL): 12T
    pub(super) fn op_bit_mhl(&mut self, op: u8) {
        let address = self.regs.hl();
        let value = self.read(address);
        self.idle(address, 1);
        self.regs.bit_mem(bit_index(op), value);
    }

    pub(super) fn op_res_r(&mut self, op: u8) {
        self.modify_register(op, res);
    }

    // RES b,(HL): 15T
    pub(super) fn op_res_mhl(&mut self, op: u8) {
        self.modify_memory(self.regs.hl(), bit_index(op), res);
    }

    pub(super) fn op_set_r(&mut self, op: u8) {
        self.modify_register(op, set);
    }

    // SET b,(HL): 15T
    pub(super) fn op_set_mhl(&mut self, op: u8) {
        self.modify_memory(self.regs.hl(), bit_index(op), set);
    }

    // =========================================================================
    // DD CB d xx / FD CB d xx
    //
    // MEMPTR already holds IX+d / IY+d. Unless the register field is 6, the
    // result is also copied into that register.
    // =========================================================================

    fn modify_indexed(&mut self, op: u8, f: fn(&mut Registers, u8, u8) -> u8) {
        let result = self.modify_memory(self.regs.wz, bit_index(op), f);
        let r = op & 7;
        if r != 6 {
            self.regs.set_reg8(r, result);
        }
    }

    // RLC..SRL (IX+d): 23T
    pub(super) fn op_rot_mxy(&mut self, op: u8) {
        self.modify_indexed(op, rotate);
    }

    // BIT b,(IX+d): 20T
    pub(super) fn op_bit_mxy(&mut self, op: u8) {
        let address = self.regs.wz;
        let value = self.read(address);
        self.idle(address, 1);
        self.regs.bit_mem(bit_index(op), value);
    }

    // RES b,(IX+d): 23T
    pub(super) fn op_res_mxy(&mut self, op: u8) {
        self.modify_indexed(op, res);
    }

    // SET b,(IX+d): 23T
    pub(super) fn op_set_mxy(&mut self, op: u8) {
        self.modify_indexed(op, set);
    }
}
