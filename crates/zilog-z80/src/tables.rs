//! Precomputed flag lookup tables.
//!
//! Every flag result the ALU produces for 8-bit operands comes from one of
//! these tables. They are built once per process on first use and shared
//! read-only by every core.

use std::sync::OnceLock;

use crate::flags::{CF, F3F5, HF, NF, PF, SF, XF, YF, ZF, sz53, sz53p};

/// Flag tables indexed by operand bytes.
pub struct FlagTables {
    adc: Box<[u8]>,
    sbc: Box<[u8]>,
    cp: Box<[u8]>,
    cpi: Box<[u8]>,
    log: [u8; 256],
    inc: [u8; 256],
    dec: [u8; 256],
    rlc: [u8; 256],
    rrc: [u8; 256],
    rl0: [u8; 256],
    rl1: [u8; 256],
    rr0: [u8; 256],
    rr1: [u8; 256],
    sra: [u8; 256],
    rlca: [u8; 256],
    rrca: [u8; 256],
    daa: Box<[u16]>,
}

static TABLES: OnceLock<FlagTables> = OnceLock::new();

/// The process-wide flag tables, built on first call.
pub fn flag_tables() -> &'static FlagTables {
    TABLES.get_or_init(FlagTables::build)
}

const fn idx2(lo: u8, hi: u8) -> usize {
    lo as usize | (hi as usize) << 8
}

const fn idx3(lo: u8, hi: u8, carry: bool) -> usize {
    idx2(lo, hi) | (carry as usize) << 16
}

impl FlagTables {
    fn build() -> Self {
        let mut adc = vec![0u8; 0x20000].into_boxed_slice();
        let mut sbc = vec![0u8; 0x20000].into_boxed_slice();
        let mut cp = vec![0u8; 0x10000].into_boxed_slice();
        let mut cpi = vec![0u8; 0x10000].into_boxed_slice();

        for carry in [false, true] {
            let c = u16::from(carry);
            for a in 0..=255u8 {
                for b in 0..=255u8 {
                    // a + b + c
                    let sum = u16::from(a) + u16::from(b) + c;
                    let r = sum as u8;
                    let mut f = sz53(r);
                    if u16::from(a & 0x0F) + u16::from(b & 0x0F) + c > 0x0F {
                        f |= HF;
                    }
                    if (a ^ b) & 0x80 == 0 && (a ^ r) & 0x80 != 0 {
                        f |= PF;
                    }
                    if sum > 0xFF {
                        f |= CF;
                    }
                    adc[idx3(a, b, carry)] = f;

                    // a - b - c
                    let diff = u16::from(a).wrapping_sub(u16::from(b)).wrapping_sub(c);
                    let r = diff as u8;
                    let mut f = NF | sz53(r);
                    if u16::from(a & 0x0F) < u16::from(b & 0x0F) + c {
                        f |= HF;
                    }
                    if (a ^ b) & 0x80 != 0 && (a ^ r) & 0x80 != 0 {
                        f |= PF;
                    }
                    if diff > 0xFF {
                        f |= CF;
                    }
                    sbc[idx3(b, a, carry)] = f;

                    if !carry {
                        // CP takes F3/F5 from the operand, not the result.
                        cp[idx2(b, a)] = (f & !F3F5) | (b & F3F5);

                        let half = a & 0x0F < b & 0x0F;
                        let n = r.wrapping_sub(u8::from(half));
                        let mut g = NF | (r & SF) | (n & XF) | ((n << 4) & YF);
                        if r == 0 {
                            g |= ZF;
                        }
                        if half {
                            g |= HF;
                        }
                        cpi[idx2(b, a)] = g;
                    }
                }
            }
        }

        let mut log = [0u8; 256];
        let mut inc = [0u8; 256];
        let mut dec = [0u8; 256];
        let mut rlc = [0u8; 256];
        let mut rrc = [0u8; 256];
        let mut rl0 = [0u8; 256];
        let mut rl1 = [0u8; 256];
        let mut rr0 = [0u8; 256];
        let mut rr1 = [0u8; 256];
        let mut sra = [0u8; 256];
        let mut rlca = [0u8; 256];
        let mut rrca = [0u8; 256];

        for x in 0..=255u8 {
            let i = usize::from(x);
            let hi = x >> 7;
            let lo = x & CF;

            log[i] = sz53p(x);

            let r = x.wrapping_add(1);
            inc[i] = sz53(r)
                | if x & 0x0F == 0x0F { HF } else { 0 }
                | if x == 0x7F { PF } else { 0 };

            let r = x.wrapping_sub(1);
            dec[i] = NF
                | sz53(r)
                | if x & 0x0F == 0 { HF } else { 0 }
                | if x == 0x80 { PF } else { 0 };

            rlc[i] = sz53p(x.rotate_left(1)) | hi;
            rrc[i] = sz53p(x.rotate_right(1)) | lo;
            rl0[i] = sz53p(x << 1) | hi;
            rl1[i] = sz53p((x << 1) | 1) | hi;
            rr0[i] = sz53p(x >> 1) | lo;
            rr1[i] = sz53p((x >> 1) | 0x80) | lo;
            sra[i] = sz53p((x >> 1) | (x & 0x80)) | lo;
            rlca[i] = (x.rotate_left(1) & F3F5) | hi;
            rrca[i] = (x.rotate_right(1) & F3F5) | lo;
        }

        let mut daa = vec![0u16; 0x800].into_boxed_slice();
        for (i, slot) in daa.iter_mut().enumerate() {
            let a = i as u8;
            let carry = i & 0x100 != 0;
            let subtract = i & 0x200 != 0;
            let half = i & 0x400 != 0;
            *slot = daa_entry(a, carry, subtract, half);
        }

        Self {
            adc,
            sbc,
            cp,
            cpi,
            log,
            inc,
            dec,
            rlc,
            rrc,
            rl0,
            rl1,
            rr0,
            rr1,
            sra,
            rlca,
            rrca,
            daa,
        }
    }

    /// Flags for `a + b + carry`.
    #[must_use]
    pub fn adc(&self, a: u8, b: u8, carry: bool) -> u8 {
        self.adc[idx3(a, b, carry)]
    }

    /// Flags for `a - b - carry`.
    #[must_use]
    pub fn sbc(&self, a: u8, b: u8, carry: bool) -> u8 {
        self.sbc[idx3(b, a, carry)]
    }

    /// Flags for `CP b` with accumulator `a`.
    #[must_use]
    pub fn cp(&self, a: u8, b: u8) -> u8 {
        self.cp[idx2(b, a)]
    }

    /// Flags for one step of CPI/CPD/CPIR/CPDR, without C and P/V.
    #[must_use]
    pub fn cpi(&self, a: u8, b: u8) -> u8 {
        self.cpi[idx2(b, a)]
    }

    /// S, Z, F5, F3 and parity of a logical result.
    #[must_use]
    pub fn log(&self, x: u8) -> u8 {
        self.log[usize::from(x)]
    }

    /// Flags for incrementing `x`, without C.
    #[must_use]
    pub fn inc(&self, x: u8) -> u8 {
        self.inc[usize::from(x)]
    }

    /// Flags for decrementing `x`, without C.
    #[must_use]
    pub fn dec(&self, x: u8) -> u8 {
        self.dec[usize::from(x)]
    }

    #[must_use]
    pub fn rlc(&self, x: u8) -> u8 {
        self.rlc[usize::from(x)]
    }

    #[must_use]
    pub fn rrc(&self, x: u8) -> u8 {
        self.rrc[usize::from(x)]
    }

    /// Flags for shifting `x` left with `bit0` entering at the bottom.
    #[must_use]
    pub fn rl(&self, x: u8, bit0: bool) -> u8 {
        if bit0 { self.rl1[usize::from(x)] } else { self.rl0[usize::from(x)] }
    }

    /// Flags for shifting `x` right with `bit7` entering at the top.
    #[must_use]
    pub fn rr(&self, x: u8, bit7: bool) -> u8 {
        if bit7 { self.rr1[usize::from(x)] } else { self.rr0[usize::from(x)] }
    }

    #[must_use]
    pub fn sra(&self, x: u8) -> u8 {
        self.sra[usize::from(x)]
    }

    /// C, F5 and F3 for the accumulator rotate-left forms.
    #[must_use]
    pub fn rlca(&self, x: u8) -> u8 {
        self.rlca[usize::from(x)]
    }

    /// C, F5 and F3 for the accumulator rotate-right forms.
    #[must_use]
    pub fn rrca(&self, x: u8) -> u8 {
        self.rrca[usize::from(x)]
    }

    /// The complete AF word after DAA.
    #[must_use]
    pub fn daa(&self, a: u8, f: u8) -> u16 {
        let select = usize::from(f & (CF | NF)) | usize::from((f >> 2) & 0x04);
        self.daa[usize::from(a) | select << 8]
    }
}

fn daa_entry(a: u8, carry: bool, subtract: bool, half: bool) -> u16 {
    let mut correction = 0u8;
    let mut carry_out = carry;
    if half || a & 0x0F > 9 {
        correction |= 0x06;
    }
    if carry || a > 0x99 {
        correction |= 0x60;
        carry_out = true;
    }
    let (r, half_out) = if subtract {
        (a.wrapping_sub(correction), half && a & 0x0F < 6)
    } else {
        (a.wrapping_add(correction), a & 0x0F > 9)
    };
    let mut f = sz53p(r);
    if subtract {
        f |= NF;
    }
    if carry_out {
        f |= CF;
    }
    if half_out {
        f |= HF;
    }
    u16::from(r) << 8 | u16::from(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bit(cond: bool, flag: u8) -> u8 {
        if cond { flag } else { 0 }
    }

    #[test]
    fn adc_matches_signed_arithmetic() {
        let t = flag_tables();
        for c in [false, true] {
            for a in 0..=255u8 {
                for b in 0..=255u8 {
                    let wide = i32::from(a) + i32::from(b) + i32::from(c);
                    let signed = i32::from(a as i8) + i32::from(b as i8) + i32::from(c);
                    let r = wide as u8;
                    let expected = (r & (SF | YF | XF))
                        | bit(r == 0, ZF)
                        | bit((a & 0xF) + (b & 0xF) + u8::from(c) >= 0x10, HF)
                        | bit(!(-128..=127).contains(&signed), PF)
                        | bit(wide >= 0x100, CF);
                    assert_eq!(t.adc(a, b, c), expected, "adc {a:02X}+{b:02X}+{c}");
                }
            }
        }
    }

    #[test]
    fn sbc_matches_signed_arithmetic() {
        let t = flag_tables();
        for c in [false, true] {
            for a in 0..=255u8 {
                for b in 0..=255u8 {
                    let wide = i32::from(a) - i32::from(b) - i32::from(c);
                    let signed = i32::from(a as i8) - i32::from(b as i8) - i32::from(c);
                    let r = wide as u8;
                    let expected = NF
                        | (r & (SF | YF | XF))
                        | bit(r == 0, ZF)
                        | bit(i32::from(a & 0xF) - i32::from(b & 0xF) - i32::from(c) < 0, HF)
                        | bit(!(-128..=127).contains(&signed), PF)
                        | bit(wide < 0, CF);
                    assert_eq!(t.sbc(a, b, c), expected, "sbc {a:02X}-{b:02X}-{c}");
                }
            }
        }
    }

    #[test]
    fn cp_takes_undocumented_bits_from_operand() {
        let t = flag_tables();
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                let sub = t.sbc(a, b, false);
                assert_eq!(t.cp(a, b), (sub & !(YF | XF)) | (b & (YF | XF)));
            }
        }
    }

    #[test]
    fn cpi_undocumented_bits_come_from_result_minus_half_carry() {
        let t = flag_tables();
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                let f = t.cpi(a, b);
                let r = a.wrapping_sub(b);
                let n = r.wrapping_sub(u8::from(f & HF != 0));
                assert_eq!(f & XF != 0, n & 0x08 != 0);
                assert_eq!(f & YF != 0, n & 0x02 != 0);
                assert_eq!(f & (SF | ZF | HF | NF), t.sbc(a, b, false) & (SF | ZF | HF | NF));
                assert_eq!(f & (CF | PF), 0);
            }
        }
    }

    #[test]
    fn inc_dec_match_adc_sbc_without_carry() {
        let t = flag_tables();
        for x in 0..=255u8 {
            assert_eq!(t.inc(x), t.adc(x, 1, false) & !CF);
            assert_eq!(t.dec(x), t.sbc(x, 1, false) & !CF);
        }
    }

    /// S, Z, F5, F3 and P of `r` plus `carry` in C.
    fn shifted(r: u8, carry: bool) -> u8 {
        (r & (SF | YF | XF))
            | bit(r == 0, ZF)
            | bit(r.count_ones() % 2 == 0, PF)
            | bit(carry, CF)
    }

    #[test]
    fn rotates_and_shifts_match_bitwise_results() {
        let t = flag_tables();
        for x in 0..=255u8 {
            let top = x & 0x80 != 0;
            let bottom = x & 0x01 != 0;
            assert_eq!(t.rlc(x), shifted(x.rotate_left(1), top), "rlc {x:02X}");
            assert_eq!(t.rrc(x), shifted(x.rotate_right(1), bottom), "rrc {x:02X}");
            assert_eq!(t.rl(x, false), shifted(x << 1, top), "rl0 {x:02X}");
            assert_eq!(t.rl(x, true), shifted((x << 1) | 1, top), "rl1 {x:02X}");
            assert_eq!(t.rr(x, false), shifted(x >> 1, bottom), "rr0 {x:02X}");
            assert_eq!(t.rr(x, true), shifted((x >> 1) | 0x80, bottom), "rr1 {x:02X}");
            assert_eq!(t.sra(x), shifted(((x as i8) >> 1) as u8, bottom), "sra {x:02X}");
        }
    }

    #[test]
    fn accumulator_rotates_set_only_c_and_undocumented_bits() {
        let t = flag_tables();
        for x in 0..=255u8 {
            let left = x.rotate_left(1);
            let right = x.rotate_right(1);
            assert_eq!(t.rlca(x), (left & (YF | XF)) | bit(x & 0x80 != 0, CF), "rlca {x:02X}");
            assert_eq!(t.rrca(x), (right & (YF | XF)) | bit(x & 0x01 != 0, CF), "rrca {x:02X}");
        }
    }

    #[test]
    fn logic_flags_carry_even_parity() {
        let t = flag_tables();
        for x in 0..=255u8 {
            assert_eq!(t.log(x), shifted(x, false));
        }
    }

    #[test]
    fn daa_known_values() {
        let t = flag_tables();
        // 0x15 + 0x27 = 0x3C, adjusts to 0x42.
        assert_eq!(t.daa(0x3C, 0) >> 8, 0x42);
        // 0x99 + 0x01 = 0x9A, adjusts to 0x00 with carry.
        let af = t.daa(0x9A, 0);
        assert_eq!(af >> 8, 0x00);
        assert_eq!(af as u8 & (ZF | CF), ZF | CF);
        // 0x42 - 0x15 = 0x2D with half borrow, adjusts to 0x27.
        let af = t.daa(0x2D, NF | HF);
        assert_eq!(af >> 8, 0x27);
        assert_ne!(af as u8 & NF, 0);
    }

    /// Correction byte and carry-out for DAA, read off the nibble ranges.
    fn daa_correction(a: u8, carry: bool, half: bool) -> (u8, bool) {
        let hi = a >> 4;
        let lo = a & 0x0F;
        match (carry, hi, half, lo) {
            (false, 0..=9, false, 0..=9) => (0x00, false),
            (false, 0..=9, true, 0..=9) => (0x06, false),
            (false, 0..=8, _, 0xA..=0xF) => (0x06, false),
            (false, 0xA..=0xF, false, 0..=9) => (0x60, true),
            (true, _, false, 0..=9) => (0x60, true),
            (true, _, true, 0..=9) => (0x66, true),
            (true, _, _, 0xA..=0xF) => (0x66, true),
            (false, 9..=0xF, _, 0xA..=0xF) => (0x66, true),
            (false, 0xA..=0xF, true, 0..=9) => (0x66, true),
            _ => unreachable!("nibbles out of range"),
        }
    }

    #[test]
    fn daa_covers_every_flag_combination() {
        let t = flag_tables();
        for c in [false, true] {
            for n in [false, true] {
                for h in [false, true] {
                    let f = bit(c, CF) | bit(n, NF) | bit(h, HF);
                    for a in 0..=255u8 {
                        let (fix, carry) = daa_correction(a, c, h);
                        let lo = a & 0x0F;
                        let (r, half) = if n {
                            (a.wrapping_sub(fix), h && lo <= 5)
                        } else {
                            (a.wrapping_add(fix), lo >= 0xA)
                        };
                        let expected = u16::from(r) << 8
                            | u16::from(shifted(r, carry) | bit(n, NF) | bit(half, HF));
                        assert_eq!(t.daa(a, f), expected, "daa {a:02X} C={c} N={n} H={h}");
                    }
                }
            }
        }
    }

    #[test]
    fn daa_result_is_valid_bcd_after_bcd_subtraction() {
        let t = flag_tables();
        for x in 0..100u8 {
            for y in 0..100u8 {
                let bx = (x / 10) << 4 | (x % 10);
                let by = (y / 10) << 4 | (y % 10);
                let f = t.sbc(bx, by, false);
                let af = t.daa(bx.wrapping_sub(by), f);
                let diff = (100 + u16::from(x) - u16::from(y)) % 100;
                let expected = (diff / 10) << 4 | (diff % 10);
                assert_eq!(af >> 8, expected, "{x} - {y}");
                assert_eq!(af & u16::from(CF) != 0, x < y);
                assert_ne!(af & u16::from(NF), 0);
            }
        }
    }

    #[test]
    fn daa_result_is_valid_bcd_after_bcd_addition() {
        let t = flag_tables();
        for x in 0..100u8 {
            for y in 0..100u8 {
                let bx = (x / 10) << 4 | (x % 10);
                let by = (y / 10) << 4 | (y % 10);
                let f = t.adc(bx, by, false);
                let af = t.daa(bx.wrapping_add(by), f);
                let sum = u16::from(x) + u16::from(y);
                let expected = ((sum % 100) / 10) << 4 | (sum % 10);
                assert_eq!(af >> 8, expected, "{x} + {y}");
                assert_eq!(af & u16::from(CF) != 0, sum >= 100);
            }
        }
    }
}
