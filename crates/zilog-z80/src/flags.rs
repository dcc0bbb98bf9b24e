//! Z80 flag register bits.

/// Sign flag (bit 7) - copy of bit 7 of the result.
pub const SF: u8 = 0b1000_0000;

/// Zero flag (bit 6) - set if the result is zero.
pub const ZF: u8 = 0b0100_0000;

/// Undocumented flag (bit 5), often called F5.
pub const YF: u8 = 0b0010_0000;

/// Half-carry flag (bit 4) - carry or borrow between bits 3 and 4.
pub const HF: u8 = 0b0001_0000;

/// Undocumented flag (bit 3), often called F3.
pub const XF: u8 = 0b0000_1000;

/// Parity/Overflow flag (bit 2).
pub const PF: u8 = 0b0000_0100;

/// Add/Subtract flag (bit 1) - set if the last operation was a subtraction.
pub const NF: u8 = 0b0000_0010;

/// Carry flag (bit 0).
pub const CF: u8 = 0b0000_0001;

/// S, Z and P/V: the bits most non-arithmetic instructions preserve.
pub(crate) const SZP: u8 = SF | ZF | PF;

/// Both undocumented bits.
pub(crate) const F3F5: u8 = YF | XF;

/// True if `value` has an even number of set bits.
#[must_use]
pub const fn parity(value: u8) -> bool {
    value.count_ones().is_multiple_of(2)
}

/// S, Z, F5 and F3 for a result byte.
#[must_use]
pub const fn sz53(value: u8) -> u8 {
    let mut f = value & (SF | YF | XF);
    if value == 0 {
        f |= ZF;
    }
    f
}

/// [`sz53`] plus even parity in P/V.
#[must_use]
pub const fn sz53p(value: u8) -> u8 {
    let mut f = sz53(value);
    if parity(value) {
        f |= PF;
    }
    f
}
