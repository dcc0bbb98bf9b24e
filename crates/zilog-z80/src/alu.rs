//! ALU operations for the Z80.
//!
//! Operations run on the register file and never touch the bus. 8-bit flag
//! results come from the shared [`FlagTables`](crate::tables::FlagTables);
//! 16-bit results are computed directly.

use crate::flags::{CF, F3F5, HF, NF, PF, SF, SZP, ZF};
use crate::registers::Registers;
use crate::tables::flag_tables;

/// Accumulator operations in opcode order: ADD ADC SUB SBC AND XOR OR CP.
pub(crate) const ALU_OPS: [fn(&mut Registers, u8); 8] = [
    Registers::add8,
    Registers::adc8,
    Registers::sub8,
    Registers::sbc8,
    Registers::and8,
    Registers::xor8,
    Registers::or8,
    Registers::cp8,
];

/// CB rotates and shifts in opcode order: RLC RRC RL RR SLA SRA SLL SRL.
pub(crate) const ROTATE_OPS: [fn(&mut Registers, u8) -> u8; 8] = [
    Registers::rlc,
    Registers::rrc,
    Registers::rl,
    Registers::rr,
    Registers::sla,
    Registers::sra,
    Registers::sll,
    Registers::srl,
];

impl Registers {
    const fn carry(&self) -> bool {
        self.f & CF != 0
    }

    pub fn add8(&mut self, value: u8) {
        self.f = flag_tables().adc(self.a, value, false);
        self.a = self.a.wrapping_add(value);
    }

    pub fn adc8(&mut self, value: u8) {
        let c = self.carry();
        self.f = flag_tables().adc(self.a, value, c);
        self.a = self.a.wrapping_add(value).wrapping_add(u8::from(c));
    }

    pub fn sub8(&mut self, value: u8) {
        self.f = flag_tables().sbc(self.a, value, false);
        self.a = self.a.wrapping_sub(value);
    }

    pub fn sbc8(&mut self, value: u8) {
        let c = self.carry();
        self.f = flag_tables().sbc(self.a, value, c);
        self.a = self.a.wrapping_sub(value).wrapping_sub(u8::from(c));
    }

    pub fn and8(&mut self, value: u8) {
        self.a &= value;
        self.f = flag_tables().log(self.a) | HF;
    }

    pub fn xor8(&mut self, value: u8) {
        self.a ^= value;
        self.f = flag_tables().log(self.a);
    }

    pub fn or8(&mut self, value: u8) {
        self.a |= value;
        self.f = flag_tables().log(self.a);
    }

    pub fn cp8(&mut self, value: u8) {
        self.f = flag_tables().cp(self.a, value);
    }

    /// INC on any byte; C is preserved.
    pub fn inc8(&mut self, value: u8) -> u8 {
        self.f = flag_tables().inc(value) | (self.f & CF);
        value.wrapping_add(1)
    }

    /// DEC on any byte; C is preserved.
    pub fn dec8(&mut self, value: u8) -> u8 {
        self.f = flag_tables().dec(value) | (self.f & CF);
        value.wrapping_sub(1)
    }

    /// 16-bit ADD for HL/IX/IY. S, Z and P/V are preserved.
    pub fn add16(&mut self, lhs: u16, rhs: u16) -> u16 {
        let sum = u32::from(lhs) + u32::from(rhs);
        let half = ((lhs & 0x0FFF) + (rhs & 0x0FFF)) >> 8;
        let result = sum as u16;
        self.f = (self.f & SZP)
            | (half as u8 & HF)
            | ((result >> 8) as u8 & F3F5)
            | if sum > 0xFFFF { CF } else { 0 };
        result
    }

    /// ADC HL,rr
    pub fn adc_hl(&mut self, value: u16) {
        let hl = self.hl();
        let c = u32::from(self.carry());
        let sum = u32::from(hl) + u32::from(value) + c;
        let half = ((u32::from(hl & 0x0FFF) + u32::from(value & 0x0FFF) + c) >> 8) as u8 & HF;
        let signed = i32::from(hl as i16) + i32::from(value as i16) + c as i32;
        let result = sum as u16;
        self.set_hl(result);
        self.f = ((result >> 8) as u8 & (SF | F3F5))
            | half
            | if result == 0 { ZF } else { 0 }
            | if (-0x8000..0x8000).contains(&signed) { 0 } else { PF }
            | if sum > 0xFFFF { CF } else { 0 };
    }

    /// SBC HL,rr
    pub fn sbc_hl(&mut self, value: u16) {
        let hl = self.hl();
        let c = u32::from(self.carry());
        let diff = u32::from(hl).wrapping_sub(u32::from(value)).wrapping_sub(c);
        let half = (u32::from(hl & 0x0FFF)
            .wrapping_sub(u32::from(value & 0x0FFF))
            .wrapping_sub(c)
            >> 8) as u8
            & HF;
        let signed = i32::from(hl as i16) - i32::from(value as i16) - c as i32;
        let result = diff as u16;
        self.set_hl(result);
        self.f = NF
            | ((result >> 8) as u8 & (SF | F3F5))
            | half
            | if result == 0 { ZF } else { 0 }
            | if (-0x8000..0x8000).contains(&signed) { 0 } else { PF }
            | if diff > 0xFFFF { CF } else { 0 };
    }

    pub fn rlc(&mut self, value: u8) -> u8 {
        self.f = flag_tables().rlc(value);
        value.rotate_left(1)
    }

    pub fn rrc(&mut self, value: u8) -> u8 {
        self.f = flag_tables().rrc(value);
        value.rotate_right(1)
    }

    pub fn rl(&mut self, value: u8) -> u8 {
        let c = self.carry();
        self.f = flag_tables().rl(value, c);
        value << 1 | u8::from(c)
    }

    pub fn rr(&mut self, value: u8) -> u8 {
        let c = self.carry();
        self.f = flag_tables().rr(value, c);
        value >> 1 | u8::from(c) << 7
    }

    pub fn sla(&mut self, value: u8) -> u8 {
        self.f = flag_tables().rl(value, false);
        value << 1
    }

    pub fn sra(&mut self, value: u8) -> u8 {
        self.f = flag_tables().sra(value);
        value >> 1 | (value & 0x80)
    }

    /// Undocumented shift left that feeds a 1 into bit 0.
    pub fn sll(&mut self, value: u8) -> u8 {
        self.f = flag_tables().rl(value, true);
        value << 1 | 1
    }

    pub fn srl(&mut self, value: u8) -> u8 {
        self.f = flag_tables().rr(value, false);
        value >> 1
    }

    /// BIT n,r: F3/F5 come from the operand.
    pub fn bit(&mut self, bit: u8, value: u8) {
        self.f = flag_tables().log(value & (1 << bit)) | HF | (self.f & CF) | (value & F3F5);
    }

    /// BIT n,(HL) and BIT n,(IX+d): F3/F5 come from MEMPTR's high byte.
    pub fn bit_mem(&mut self, bit: u8, value: u8) {
        let f = flag_tables().log(value & (1 << bit)) | HF | (self.f & CF);
        self.f = (f & !F3F5) | (self.mh() & F3F5);
    }

    pub fn rlca(&mut self) {
        self.f = flag_tables().rlca(self.a) | (self.f & SZP);
        self.a = self.a.rotate_left(1);
    }

    pub fn rrca(&mut self) {
        self.f = flag_tables().rrca(self.a) | (self.f & SZP);
        self.a = self.a.rotate_right(1);
    }

    pub fn rla(&mut self) {
        let c = self.carry();
        self.f = flag_tables().rlca(self.a) | (self.f & SZP);
        self.a = self.a << 1 | u8::from(c);
    }

    pub fn rra(&mut self) {
        let c = self.carry();
        self.f = flag_tables().rrca(self.a) | (self.f & SZP);
        self.a = self.a >> 1 | u8::from(c) << 7;
    }

    pub fn daa(&mut self) {
        let af = flag_tables().daa(self.a, self.f);
        self.set_af(af);
    }

    pub fn cpl(&mut self) {
        self.a = !self.a;
        self.f = (self.f & !F3F5) | HF | NF | (self.a & F3F5);
    }

    pub fn scf(&mut self) {
        self.f = (self.f & SZP) | (self.a & F3F5) | CF;
    }

    /// CCF: H receives the old carry.
    pub fn ccf(&mut self) {
        let h_or_c = if self.carry() { HF } else { CF };
        self.f = (self.f & SZP) | h_or_c | (self.a & F3F5);
    }

    pub fn neg(&mut self) {
        self.f = flag_tables().sbc(0, self.a, false);
        self.a = 0u8.wrapping_sub(self.a);
    }
}
