//! Opcode dispatch tables.
//!
//! Five 256-entry tables map an opcode to its handler: unprefixed, CB, ED,
//! DD/FD and DD/FD CB. Handlers decode register and condition fields from
//! the opcode they are called with, so one handler covers a whole group.

use super::Z80;
use crate::bus::Z80Bus;

/// An opcode handler. Receives the opcode byte that selected it.
pub(super) type Handler<B> = fn(&mut Z80<B>, u8);

pub(super) struct OpcodeTables<B: Z80Bus> {
    pub base: [Handler<B>; 256],
    pub cb: [Handler<B>; 256],
    pub ed: [Handler<B>; 256],
    pub index: [Handler<B>; 256],
    pub index_cb: [Handler<B>; 256],
}

/// Collects handlers for one table, refusing to assign a slot twice.
struct TableBuilder<B: Z80Bus> {
    name: &'static str,
    slots: [Option<Handler<B>>; 256],
}

impl<B: Z80Bus> TableBuilder<B> {
    fn new(name: &'static str) -> Self {
        Self { name, slots: [None; 256] }
    }

    fn set(&mut self, opcode: u8, handler: Handler<B>) {
        let slot = &mut self.slots[usize::from(opcode)];
        assert!(slot.is_none(), "{} opcode {opcode:02X} assigned twice", self.name);
        *slot = Some(handler);
    }

    /// Assign every opcode matching `pattern` under `mask`.
    fn set_matching(&mut self, mask: u8, pattern: u8, handler: Handler<B>) {
        for opcode in 0..=255u8 {
            if opcode & mask == pattern {
                self.set(opcode, handler);
            }
        }
    }

    /// Assign every opcode matching `pattern` under `mask` whose field at
    /// `shift` is not the `(HL)` encoding 6.
    fn set_registers(&mut self, mask: u8, pattern: u8, shift: u8, handler: Handler<B>) {
        for opcode in 0..=255u8 {
            if opcode & mask == pattern && (opcode >> shift) & 7 != 6 {
                self.set(opcode, handler);
            }
        }
    }

    fn is_set(&self, opcode: u8) -> bool {
        self.slots[usize::from(opcode)].is_some()
    }

    /// Fill unassigned slots from `fallback` and freeze the table.
    fn finish(self, fallback: impl Fn(u8) -> Handler<B>) -> [Handler<B>; 256] {
        std::array::from_fn(|i| self.slots[i].unwrap_or_else(|| fallback(i as u8)))
    }
}

impl<B: Z80Bus> OpcodeTables<B> {
    pub fn new() -> Self {
        let base = base_table();
        let index = index_table(&base);
        Self {
            base,
            cb: cb_table(),
            ed: ed_table(),
            index,
            index_cb: index_cb_table(),
        }
    }
}

fn base_table<B: Z80Bus>() -> [Handler<B>; 256] {
    let mut t = TableBuilder::new("base");

    t.set(0x00, Z80::op_nop);
    t.set(0x08, Z80::op_ex_af_af);
    t.set(0x10, Z80::op_djnz);
    t.set(0x18, Z80::op_jr);
    t.set_matching(0xE7, 0x20, Z80::op_jr_cc);

    t.set_matching(0xCF, 0x01, Z80::op_ld_rr_nn);
    t.set_matching(0xEF, 0x02, Z80::op_ld_rr_a);
    t.set_matching(0xEF, 0x0A, Z80::op_ld_a_rr);
    t.set(0x22, Z80::op_ld_nn_hl);
    t.set(0x2A, Z80::op_ld_hl_nn);
    t.set(0x32, Z80::op_ld_nn_a);
    t.set(0x3A, Z80::op_ld_a_nn);
    t.set_matching(0xCF, 0x03, Z80::op_inc_rr);
    t.set_matching(0xCF, 0x0B, Z80::op_dec_rr);
    t.set_matching(0xCF, 0x09, Z80::op_add_hl_rr);

    t.set_registers(0xC7, 0x04, 3, Z80::op_inc_r);
    t.set_registers(0xC7, 0x05, 3, Z80::op_dec_r);
    t.set_registers(0xC7, 0x06, 3, Z80::op_ld_r_n);
    t.set(0x34, Z80::op_inc_mhl);
    t.set(0x35, Z80::op_dec_mhl);
    t.set(0x36, Z80::op_ld_mhl_n);

    t.set(0x07, Z80::op_rlca);
    t.set(0x0F, Z80::op_rrca);
    t.set(0x17, Z80::op_rla);
    t.set(0x1F, Z80::op_rra);
    t.set(0x27, Z80::op_daa);
    t.set(0x2F, Z80::op_cpl);
    t.set(0x37, Z80::op_scf);
    t.set(0x3F, Z80::op_ccf);

    t.set(0x76, Z80::op_halt);
    t.set_registers(0xF8, 0x70, 0, Z80::op_ld_mhl_r);
    t.set_registers(0xC7, 0x46, 3, Z80::op_ld_r_mhl);
    for opcode in 0x40..=0x7Fu8 {
        if !t.is_set(opcode) {
            t.set(opcode, Z80::op_ld_r_r);
        }
    }

    t.set_registers(0xC0, 0x80, 0, Z80::op_alu_r);
    t.set_matching(0xC7, 0x86, Z80::op_alu_mhl);
    t.set_matching(0xC7, 0xC6, Z80::op_alu_n);

    t.set_matching(0xC7, 0xC0, Z80::op_ret_cc);
    t.set(0xC9, Z80::op_ret);
    t.set_matching(0xC7, 0xC2, Z80::op_jp_cc);
    t.set(0xC3, Z80::op_jp);
    t.set_matching(0xC7, 0xC4, Z80::op_call_cc);
    t.set(0xCD, Z80::op_call);
    t.set_matching(0xC7, 0xC7, Z80::op_rst);
    t.set_matching(0xCF, 0xC1, Z80::op_pop);
    t.set_matching(0xCF, 0xC5, Z80::op_push);

    t.set(0xD3, Z80::op_out_n_a);
    t.set(0xDB, Z80::op_in_a_n);
    t.set(0xD9, Z80::op_exx);
    t.set(0xE3, Z80::op_ex_sp_hl);
    t.set(0xE9, Z80::op_jp_hl);
    t.set(0xEB, Z80::op_ex_de_hl);
    t.set(0xF3, Z80::op_di);
    t.set(0xF9, Z80::op_ld_sp_hl);
    t.set(0xFB, Z80::op_ei);

    // CB, DD, ED and FD are consumed by the prefix loop.
    t.finish(|_| Z80::op_undefined)
}

fn cb_table<B: Z80Bus>() -> [Handler<B>; 256] {
    let mut t = TableBuilder::new("cb");
    t.set_registers(0xC0, 0x00, 0, Z80::op_rot_r);
    t.set_matching(0xC7, 0x06, Z80::op_rot_mhl);
    t.set_registers(0xC0, 0x40, 0, Z80::op_bit_r);
    t.set_matching(0xC7, 0x46, Z80::op_bit_mhl);
    t.set_registers(0xC0, 0x80, 0, Z80::op_res_r);
    t.set_matching(0xC7, 0x86, Z80::op_res_mhl);
    t.set_registers(0xC0, 0xC0, 0, Z80::op_set_r);
    t.set_matching(0xC7, 0xC6, Z80::op_set_mhl);
    t.finish(|_| Z80::op_undefined)
}

fn ed_table<B: Z80Bus>() -> [Handler<B>; 256] {
    let mut t = TableBuilder::new("ed");

    t.set_matching(0xC7, 0x40, Z80::op_in_r_c);
    t.set_matching(0xC7, 0x41, Z80::op_out_c_r);
    t.set_matching(0xCF, 0x42, Z80::op_sbc_hl_rr);
    t.set_matching(0xCF, 0x4A, Z80::op_adc_hl_rr);
    t.set_matching(0xCF, 0x43, Z80::op_ld_nn_rr);
    t.set_matching(0xCF, 0x4B, Z80::op_ld_rr_nn_ind);
    t.set_matching(0xC7, 0x44, Z80::op_neg);
    t.set_matching(0xC7, 0x45, Z80::op_retn);
    t.set_matching(0xC7, 0x46, Z80::op_im);
    t.set(0x47, Z80::op_ld_i_a);
    t.set(0x4F, Z80::op_ld_r_a);
    t.set(0x57, Z80::op_ld_a_i);
    t.set(0x5F, Z80::op_ld_a_r);
    t.set(0x67, Z80::op_rrd);
    t.set(0x6F, Z80::op_rld);

    t.set(0xA0, Z80::op_ldi);
    t.set(0xA1, Z80::op_cpi);
    t.set(0xA2, Z80::op_ini);
    t.set(0xA3, Z80::op_outi);
    t.set(0xA8, Z80::op_ldd);
    t.set(0xA9, Z80::op_cpd);
    t.set(0xAA, Z80::op_ind);
    t.set(0xAB, Z80::op_outd);
    t.set(0xB0, Z80::op_ldir);
    t.set(0xB1, Z80::op_cpir);
    t.set(0xB2, Z80::op_inir);
    t.set(0xB3, Z80::op_otir);
    t.set(0xB8, Z80::op_lddr);
    t.set(0xB9, Z80::op_cpdr);
    t.set(0xBA, Z80::op_indr);
    t.set(0xBB, Z80::op_otdr);

    // Everything else, including 77 and 7F, is a two-fetch no-op.
    t.finish(|_| Z80::op_undefined)
}

fn index_table<B: Z80Bus>(base: &[Handler<B>; 256]) -> [Handler<B>; 256] {
    let mut t = TableBuilder::new("index");

    t.set_matching(0xCF, 0x09, Z80::op_add_xy_rr);
    t.set(0x21, Z80::op_ld_xy_nn);
    t.set(0x22, Z80::op_ld_nn_xy);
    t.set(0x2A, Z80::op_ld_xy_nn_ind);
    t.set(0x23, Z80::op_inc_xy);
    t.set(0x2B, Z80::op_dec_xy);
    for opcode in [0x24, 0x2C] {
        t.set(opcode, Z80::op_inc_xy_half);
    }
    for opcode in [0x25, 0x2D] {
        t.set(opcode, Z80::op_dec_xy_half);
    }
    for opcode in [0x26, 0x2E] {
        t.set(opcode, Z80::op_ld_xy_half_n);
    }
    t.set(0x34, Z80::op_inc_mxy);
    t.set(0x35, Z80::op_dec_mxy);
    t.set(0x36, Z80::op_ld_mxy_n);

    // LD r,r' where either side is H or L becomes an index half.
    t.set_registers(0xC7, 0x46, 3, Z80::op_ld_r_mxy);
    t.set_registers(0xF8, 0x70, 0, Z80::op_ld_mxy_r);
    for opcode in 0x40..=0x7Fu8 {
        if t.is_set(opcode) || opcode == 0x76 {
            continue;
        }
        let dst = (opcode >> 3) & 7;
        let src = opcode & 7;
        if matches!(dst, 4 | 5) || matches!(src, 4 | 5) {
            t.set(opcode, Z80::op_ld_r_r_xy);
        }
    }

    for opcode in 0x80..=0xBFu8 {
        match opcode & 7 {
            4 | 5 => t.set(opcode, Z80::op_alu_xy_half),
            6 => t.set(opcode, Z80::op_alu_mxy),
            _ => {}
        }
    }

    t.set(0xE1, Z80::op_pop_xy);
    t.set(0xE3, Z80::op_ex_sp_xy);
    t.set(0xE5, Z80::op_push_xy);
    t.set(0xE9, Z80::op_jp_xy);
    t.set(0xF9, Z80::op_ld_sp_xy);

    // The prefix has no effect on instructions that do not involve HL.
    t.finish(|op| base[usize::from(op)])
}

fn index_cb_table<B: Z80Bus>() -> [Handler<B>; 256] {
    let mut t = TableBuilder::new("index_cb");
    t.set_matching(0xC0, 0x00, Z80::op_rot_mxy);
    t.set_matching(0xC0, 0x40, Z80::op_bit_mxy);
    t.set_matching(0xC0, 0x80, Z80::op_res_mxy);
    t.set_matching(0xC0, 0xC0, Z80::op_set_mxy);
    t.finish(|_| Z80::op_undefined)
}

#[cfg(test)]
mod tests {
    use emu_core::SimpleBus;

    use super::*;

    #[test]
    fn tables_build_without_conflicts() {
        let _ = OpcodeTables::<SimpleBus>::new();
    }

    #[test]
    fn index_table_falls_back_to_base() {
        let tables = OpcodeTables::<SimpleBus>::new();
        // EX DE,HL ignores the prefix; ADD IX,rr does not.
        assert!(tables.index[0xEB] as usize == tables.base[0xEB] as usize);
        assert!(tables.index[0x09] as usize != tables.base[0x09] as usize);
    }

    #[test]
    #[should_panic(expected = "assigned twice")]
    fn double_assignment_is_rejected() {
        let mut t = TableBuilder::<SimpleBus>::new("test");
        t.set(0x00, Z80::op_nop);
        t.set(0x00, Z80::op_nop);
    }
}
