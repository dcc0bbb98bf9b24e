//! Z80 register file.

/// Z80 registers, including MEMPTR and the interrupt latches.
///
/// I and R are stored separately but addressed together as IR when the
/// core puts them on the address bus (refresh, IM 2 vector).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Registers {
    // Main registers
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,

    // Alternate registers
    pub a_alt: u8,
    pub f_alt: u8,
    pub b_alt: u8,
    pub c_alt: u8,
    pub d_alt: u8,
    pub e_alt: u8,
    pub h_alt: u8,
    pub l_alt: u8,

    // Index registers
    pub ix: u16,
    pub iy: u16,

    pub sp: u16,
    pub pc: u16,
    pub i: u8,
    pub r: u8,

    /// MEMPTR. Leaks into F3/F5 through `BIT n,(HL)`.
    pub wz: u16,

    // Interrupt state
    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,

    pub halted: bool,
}

impl Registers {
    /// Power-on contents: every pair, SP, PC, IR and MEMPTR hold `0x00FF`.
    #[must_use]
    pub fn power_on() -> Self {
        let mut regs = Self::default();
        regs.set_af(0x00FF);
        regs.set_bc(0x00FF);
        regs.set_de(0x00FF);
        regs.set_hl(0x00FF);
        regs.exx();
        regs.ex_af();
        regs.set_af(0x00FF);
        regs.set_bc(0x00FF);
        regs.set_de(0x00FF);
        regs.set_hl(0x00FF);
        regs.ix = 0x00FF;
        regs.iy = 0x00FF;
        regs.sp = 0x00FF;
        regs.pc = 0x00FF;
        regs.set_ir(0x00FF);
        regs.wz = 0x00FF;
        regs
    }

    #[must_use]
    pub const fn af(&self) -> u16 {
        (self.a as u16) << 8 | self.f as u16
    }

    #[must_use]
    pub const fn bc(&self) -> u16 {
        (self.b as u16) << 8 | self.c as u16
    }

    #[must_use]
    pub const fn de(&self) -> u16 {
        (self.d as u16) << 8 | self.e as u16
    }

    #[must_use]
    pub const fn hl(&self) -> u16 {
        (self.h as u16) << 8 | self.l as u16
    }

    /// I in the high byte, R in the low byte.
    #[must_use]
    pub const fn ir(&self) -> u16 {
        (self.i as u16) << 8 | self.r as u16
    }

    #[must_use]
    pub const fn af_alt(&self) -> u16 {
        (self.a_alt as u16) << 8 | self.f_alt as u16
    }

    #[must_use]
    pub const fn bc_alt(&self) -> u16 {
        (self.b_alt as u16) << 8 | self.c_alt as u16
    }

    #[must_use]
    pub const fn de_alt(&self) -> u16 {
        (self.d_alt as u16) << 8 | self.e_alt as u16
    }

    #[must_use]
    pub const fn hl_alt(&self) -> u16 {
        (self.h_alt as u16) << 8 | self.l_alt as u16
    }

    pub fn set_af(&mut self, value: u16) {
        self.a = (value >> 8) as u8;
        self.f = value as u8;
    }

    pub fn set_bc(&mut self, value: u16) {
        self.b = (value >> 8) as u8;
        self.c = value as u8;
    }

    pub fn set_de(&mut self, value: u16) {
        self.d = (value >> 8) as u8;
        self.e = value as u8;
    }

    pub fn set_hl(&mut self, value: u16) {
        self.h = (value >> 8) as u8;
        self.l = value as u8;
    }

    pub fn set_ir(&mut self, value: u16) {
        self.i = (value >> 8) as u8;
        self.r = value as u8;
    }

    /// MEMPTR high byte.
    #[must_use]
    pub const fn mh(&self) -> u8 {
        (self.wz >> 8) as u8
    }

    /// MEMPTR low byte.
    #[must_use]
    pub const fn ml(&self) -> u8 {
        self.wz as u8
    }

    pub fn set_mh(&mut self, value: u8) {
        self.wz = (self.wz & 0x00FF) | u16::from(value) << 8;
    }

    pub fn set_ml(&mut self, value: u8) {
        self.wz = (self.wz & 0xFF00) | u16::from(value);
    }

    #[must_use]
    pub const fn ixh(&self) -> u8 {
        (self.ix >> 8) as u8
    }

    #[must_use]
    pub const fn ixl(&self) -> u8 {
        self.ix as u8
    }

    #[must_use]
    pub const fn iyh(&self) -> u8 {
        (self.iy >> 8) as u8
    }

    #[must_use]
    pub const fn iyl(&self) -> u8 {
        self.iy as u8
    }

    /// Advance the 7-bit refresh counter. Bit 7 of R is only changed by
    /// `LD R,A`.
    pub fn bump_r(&mut self) {
        self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7F);
    }

    /// EXX
    pub fn exx(&mut self) {
        std::mem::swap(&mut self.b, &mut self.b_alt);
        std::mem::swap(&mut self.c, &mut self.c_alt);
        std::mem::swap(&mut self.d, &mut self.d_alt);
        std::mem::swap(&mut self.e, &mut self.e_alt);
        std::mem::swap(&mut self.h, &mut self.h_alt);
        std::mem::swap(&mut self.l, &mut self.l_alt);
    }

    /// EX AF,AF'
    pub fn ex_af(&mut self) {
        std::mem::swap(&mut self.a, &mut self.a_alt);
        std::mem::swap(&mut self.f, &mut self.f_alt);
    }

    /// 8-bit register by opcode field: B C D E H L - A.
    ///
    /// Field 6 encodes `(HL)`, which handlers must route to memory.
    #[must_use]
    pub fn reg8(&self, index: u8) -> u8 {
        match index {
            0 => self.b,
            1 => self.c,
            2 => self.d,
            3 => self.e,
            4 => self.h,
            5 => self.l,
            7 => self.a,
            _ => unreachable!("register field {index} is not a register"),
        }
    }

    pub fn set_reg8(&mut self, index: u8, value: u8) {
        match index {
            0 => self.b = value,
            1 => self.c = value,
            2 => self.d = value,
            3 => self.e = value,
            4 => self.h = value,
            5 => self.l = value,
            7 => self.a = value,
            _ => unreachable!("register field {index} is not a register"),
        }
    }

    /// Register pair by opcode field: BC DE HL SP.
    #[must_use]
    pub fn pair(&self, index: u8) -> u16 {
        match index {
            0 => self.bc(),
            1 => self.de(),
            2 => self.hl(),
            3 => self.sp,
            _ => unreachable!("pair field {index} out of range"),
        }
    }

    pub fn set_pair(&mut self, index: u8, value: u16) {
        match index {
            0 => self.set_bc(value),
            1 => self.set_de(value),
            2 => self.set_hl(value),
            3 => self.sp = value,
            _ => unreachable!("pair field {index} out of range"),
        }
    }

    /// Register pair for PUSH/POP: BC DE HL AF.
    #[must_use]
    pub fn stack_pair(&self, index: u8) -> u16 {
        if index == 3 { self.af() } else { self.pair(index) }
    }

    pub fn set_stack_pair(&mut self, index: u8, value: u16) {
        if index == 3 {
            self.set_af(value);
        } else {
            self.set_pair(index, value);
        }
    }
}
