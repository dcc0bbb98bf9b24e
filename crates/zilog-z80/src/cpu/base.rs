//! Unprefixed instructions.
//!
//! Timings in the comments are T-states including the opcode fetch.

use super::Z80;
use crate::alu::ALU_OPS;
use crate::bus::Z80Bus;

impl<B: Z80Bus> Z80<B> {
    // =========================================================================
    // Control
    // =========================================================================

    pub(super) fn op_nop(&mut self, _op: u8) {}

    /// Slots with no defined instruction. Costs only the fetch cycles
    /// already charged.
    pub(super) fn op_undefined(&mut self, _op: u8) {}

    /// HALT: PC is rewound so the instruction repeats until NMI or INT.
    pub(super) fn op_halt(&mut self, _op: u8) {
        self.regs.halted = true;
        self.regs.pc = self.regs.pc.wrapping_sub(1);
    }

    pub(super) fn op_di(&mut self, _op: u8) {
        self.regs.iff1 = false;
        self.regs.iff2 = false;
    }

    /// EI: INT is held off until after the next instruction.
    pub(super) fn op_ei(&mut self, _op: u8) {
        self.regs.iff1 = true;
        self.regs.iff2 = true;
        self.int_blocked = true;
    }

    // =========================================================================
    // Exchanges
    // =========================================================================

    pub(super) fn op_ex_af_af(&mut self, _op: u8) {
        self.regs.ex_af();
    }

    pub(super) fn op_exx(&mut self, _op: u8) {
        self.regs.exx();
    }

    /// EX DE,HL is never affected by an index prefix.
    pub(super) fn op_ex_de_hl(&mut self, _op: u8) {
        let hl = self.regs.hl();
        self.regs.set_hl(self.regs.de());
        self.regs.set_de(hl);
    }

    // EX (SP),HL: 19T (4, 3, 4, 3, 5)
    pub(super) fn op_ex_sp_hl(&mut self, _op: u8) {
        let value = self.ex_sp(self.regs.hl());
        self.regs.set_hl(value);
    }

    /// Swap `value` with the word at SP; MEMPTR gets the old stack word.
    pub(super) fn ex_sp(&mut self, value: u16) -> u16 {
        let [lo, hi] = value.to_le_bytes();
        let sp = self.regs.sp;
        let sp1 = sp.wrapping_add(1);
        let old_lo = self.read(sp);
        let old_hi = self.read(sp1);
        self.idle(sp1, 1);
        self.write(sp1, hi);
        self.write(sp, lo);
        self.bus.write_no_mreq(sp, 2);
        self.regs.wz = u16::from_le_bytes([old_lo, old_hi]);
        self.regs.wz
    }

    // =========================================================================
    // Jumps, calls and returns
    // =========================================================================

    // DJNZ e: 8T / 13T
    pub(super) fn op_djnz(&mut self, _op: u8) {
        self.idle_ir(1);
        let d = self.read_imm() as i8;
        self.regs.b = self.regs.b.wrapping_sub(1);
        if self.regs.b != 0 {
            self.jump_relative(d);
        }
    }

    // JR e: 12T
    pub(super) fn op_jr(&mut self, _op: u8) {
        let d = self.read_imm() as i8;
        self.jump_relative(d);
    }

    // JR cc,e: 7T / 12T
    pub(super) fn op_jr_cc(&mut self, op: u8) {
        let d = self.read_imm() as i8;
        if self.condition((op >> 3) & 3) {
            self.jump_relative(d);
        }
    }

    fn jump_relative(&mut self, d: i8) {
        self.idle(self.regs.pc, 5);
        self.regs.wz = self.regs.pc.wrapping_add_signed(i16::from(d));
        self.regs.pc = self.regs.wz;
    }

    // JP nn: 10T
    pub(super) fn op_jp(&mut self, _op: u8) {
        self.regs.wz = self.read_imm16();
        self.regs.pc = self.regs.wz;
    }

    // JP cc,nn: 10T either way
    pub(super) fn op_jp_cc(&mut self, op: u8) {
        self.regs.wz = self.read_imm16();
        if self.condition((op >> 3) & 7) {
            self.regs.pc = self.regs.wz;
        }
    }

    /// JP (HL) is a plain register load of PC.
    pub(super) fn op_jp_hl(&mut self, _op: u8) {
        self.regs.pc = self.regs.hl();
    }

    // CALL nn: 17T (4, 3, 4, 3, 3)
    pub(super) fn op_call(&mut self, _op: u8) {
        self.call_if(true);
    }

    // CALL cc,nn: 10T / 17T
    pub(super) fn op_call_cc(&mut self, op: u8) {
        let taken = self.condition((op >> 3) & 7);
        self.call_if(taken);
    }

    fn call_if(&mut self, taken: bool) {
        let lo = self.read_imm();
        let hi = self.read(self.regs.pc);
        self.regs.wz = u16::from_le_bytes([lo, hi]);
        if taken {
            self.idle(self.regs.pc, 1);
        }
        self.regs.pc = self.regs.pc.wrapping_add(1);
        if taken {
            self.push16(self.regs.pc);
            self.regs.pc = self.regs.wz;
        }
    }

    // RET: 10T
    pub(super) fn op_ret(&mut self, _op: u8) {
        self.regs.wz = self.pop16();
        self.regs.pc = self.regs.wz;
    }

    // RET cc: 5T / 11T
    pub(super) fn op_ret_cc(&mut self, op: u8) {
        self.idle_ir(1);
        if self.condition((op >> 3) & 7) {
            self.regs.wz = self.pop16();
            self.regs.pc = self.regs.wz;
        }
    }

    // RST p: 11T
    pub(super) fn op_rst(&mut self, op: u8) {
        self.idle_ir(1);
        self.push16(self.regs.pc);
        self.regs.wz = u16::from(op & 0x38);
        self.regs.pc = self.regs.wz;
    }

    // =========================================================================
    // Stack
    // =========================================================================

    // PUSH qq: 11T
    pub(super) fn op_push(&mut self, op: u8) {
        self.idle_ir(1);
        let value = self.regs.stack_pair((op >> 4) & 3);
        self.push16(value);
    }

    // POP qq: 10T
    pub(super) fn op_pop(&mut self, op: u8) {
        let value = self.pop16();
        self.regs.set_stack_pair((op >> 4) & 3, value);
    }

    // LD SP,HL: 6T
    pub(super) fn op_ld_sp_hl(&mut self, _op: u8) {
        self.idle_ir(2);
        self.regs.sp = self.regs.hl();
    }

    // =========================================================================
    // 8-bit loads
    // =========================================================================

    pub(super) fn op_ld_r_r(&mut self, op: u8) {
        let value = self.regs.reg8(op & 7);
        self.regs.set_reg8((op >> 3) & 7, value);
    }

    // LD r,n: 7T
    pub(super) fn op_ld_r_n(&mut self, op: u8) {
        let value = self.read_imm();
        self.regs.set_reg8((op >> 3) & 7, value);
    }

    // LD r,(HL): 7T
    pub(super) fn op_ld_r_mhl(&mut self, op: u8) {
        let value = self.read(self.regs.hl());
        self.regs.set_reg8((op >> 3) & 7, value);
    }

    // LD (HL),r: 7T
    pub(super) fn op_ld_mhl_r(&mut self, op: u8) {
        let value = self.regs.reg8(op & 7);
        self.write(self.regs.hl(), value);
    }

    // LD (HL),n: 10T
    pub(super) fn op_ld_mhl_n(&mut self, _op: u8) {
        let value = self.read_imm();
        self.write(self.regs.hl(), value);
    }

    // LD A,(BC) / LD A,(DE): 7T
    pub(super) fn op_ld_a_rr(&mut self, op: u8) {
        let address = self.regs.pair((op >> 4) & 1);
        self.regs.a = self.read(address);
        self.regs.wz = address.wrapping_add(1);
    }

    // LD (BC),A / LD (DE),A: 7T
    pub(super) fn op_ld_rr_a(&mut self, op: u8) {
        let address = self.regs.pair((op >> 4) & 1);
        self.write(address, self.regs.a);
        self.regs.set_mh(self.regs.a);
        self.regs.set_ml(address.wrapping_add(1) as u8);
    }

    // LD A,(nn): 13T
    pub(super) fn op_ld_a_nn(&mut self, _op: u8) {
        let address = self.read_imm16();
        self.regs.a = self.read(address);
        self.regs.wz = address.wrapping_add(1);
    }

    // LD (nn),A: 13T
    pub(super) fn op_ld_nn_a(&mut self, _op: u8) {
        let address = self.read_imm16();
        self.write(address, self.regs.a);
        self.regs.set_mh(self.regs.a);
        self.regs.set_ml(address.wrapping_add(1) as u8);
    }

    // =========================================================================
    // 16-bit loads
    // =========================================================================

    // LD dd,nn: 10T
    pub(super) fn op_ld_rr_nn(&mut self, op: u8) {
        let value = self.read_imm16();
        self.regs.set_pair((op >> 4) & 3, value);
    }

    // LD HL,(nn): 16T
    pub(super) fn op_ld_hl_nn(&mut self, _op: u8) {
        let address = self.read_imm16();
        let value = self.read16(address);
        self.regs.wz = address.wrapping_add(1);
        self.regs.set_hl(value);
    }

    // LD (nn),HL: 16T
    pub(super) fn op_ld_nn_hl(&mut self, _op: u8) {
        let address = self.read_imm16();
        self.write16(address, self.regs.hl());
        self.regs.wz = address.wrapping_add(1);
    }

    // =========================================================================
    // Arithmetic
    // =========================================================================

    pub(super) fn op_alu_r(&mut self, op: u8) {
        let value = self.regs.reg8(op & 7);
        ALU_OPS[usize::from((op >> 3) & 7)](&mut self.regs, value);
    }

    // ALU A,(HL): 7T
    pub(super) fn op_alu_mhl(&mut self, op: u8) {
        let value = self.read(self.regs.hl());
        ALU_OPS[usize::from((op >> 3) & 7)](&mut self.regs, value);
    }

    // ALU A,n: 7T
    pub(super) fn op_alu_n(&mut self, op: u8) {
        let value = self.read_imm();
        ALU_OPS[usize::from((op >> 3) & 7)](&mut self.regs, value);
    }

    pub(super) fn op_inc_r(&mut self, op: u8) {
        let r = (op >> 3) & 7;
        let value = self.regs.inc8(self.regs.reg8(r));
        self.regs.set_reg8(r, value);
    }

    pub(super) fn op_dec_r(&mut self, op: u8) {
        let r = (op >> 3) & 7;
        let value = self.regs.dec8(self.regs.reg8(r));
        self.regs.set_reg8(r, value);
    }

    // INC (HL): 11T (4, 4, 3)
    pub(super) fn op_inc_mhl(&mut self, _op: u8) {
        let address = self.regs.hl();
        let value = self.read(address);
        self.idle(address, 1);
        let value = self.regs.inc8(value);
        self.write(address, value);
    }

    // DEC (HL): 11T (4, 4, 3)
    pub(super) fn op_dec_mhl(&mut self, _op: u8) {
        let address = self.regs.hl();
        let value = self.read(address);
        self.idle(address, 1);
        let value = self.regs.dec8(value);
        self.write(address, value);
    }

    // INC ss: 6T
    pub(super) fn op_inc_rr(&mut self, op: u8) {
        self.idle_ir(2);
        let rr = (op >> 4) & 3;
        self.regs.set_pair(rr, self.regs.pair(rr).wrapping_add(1));
    }

    // DEC ss: 6T
    pub(super) fn op_dec_rr(&mut self, op: u8) {
        self.idle_ir(2);
        let rr = (op >> 4) & 3;
        self.regs.set_pair(rr, self.regs.pair(rr).wrapping_sub(1));
    }

    // ADD HL,ss: 11T
    pub(super) fn op_add_hl_rr(&mut self, op: u8) {
        self.idle_ir(7);
        let hl = self.regs.hl();
        let rhs = self.regs.pair((op >> 4) & 3);
        self.regs.wz = hl.wrapping_add(1);
        let result = self.regs.add16(hl, rhs);
        self.regs.set_hl(result);
    }

    // =========================================================================
    // Accumulator and flag operations
    // =========================================================================

    pub(super) fn op_rlca(&mut self, _op: u8) {
        self.regs.rlca();
    }

    pub(super) fn op_rrca(&mut self, _op: u8) {
        self.regs.rrca();
    }

    pub(super) fn op_rla(&mut self, _op: u8) {
        self.regs.rla();
    }

    pub(super) fn op_rra(&mut self, _op: u8) {
        self.regs.rra();
    }

    pub(super) fn op_daa(&mut self, _op: u8) {
        self.regs.daa();
    }

    pub(super) fn op_cpl(&mut self, _op: u8) {
        self.regs.cpl();
    }

    pub(super) fn op_scf(&mut self, _op: u8) {
        self.regs.scf();
    }

    pub(super) fn op_ccf(&mut self, _op: u8) {
        self.regs.ccf();
    }

    // =========================================================================
    // I/O
    // =========================================================================

    // IN A,(n): 11T (4, 3, 4)
    pub(super) fn op_in_a_n(&mut self, _op: u8) {
        let port = u16::from(self.regs.a) << 8 | u16::from(self.read_imm());
        self.regs.a = self.bus.read_io(port);
        self.regs.wz = port.wrapping_add(1);
    }

    // OUT (n),A: 11T (4, 3, 4)
    pub(super) fn op_out_n_a(&mut self, _op: u8) {
        let port = u16::from(self.regs.a) << 8 | u16::from(self.read_imm());
        self.bus.write_io(port, self.regs.a);
        self.regs.set_mh(self.regs.a);
        self.regs.set_ml((port as u8).wrapping_add(1));
    }
}
