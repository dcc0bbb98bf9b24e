//! Prefix latches and CPU variant selection.

/// Index register selected by a DD or FD prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexMode {
    #[default]
    None,
    Ix,
    Iy,
}

impl IndexMode {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Ix => "ix",
            Self::Iy => "iy",
        }
    }
}

/// Extended opcode page selected by a CB or ED prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtMode {
    #[default]
    None,
    Bit,
    Extended,
}

impl ExtMode {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bit => "cb",
            Self::Extended => "ed",
        }
    }
}

/// Silicon variant. The only visible difference is what `OUT (C),0`
/// drives onto the data bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CpuKind {
    /// Original NMOS Z80: `OUT (C),0` writes `0x00`.
    Nmos,
    /// CMOS Z84C00: `OUT (C),0` writes `0xFF`.
    #[default]
    Cmos,
}

impl CpuKind {
    /// Byte written by the undocumented `ED 71`.
    #[must_use]
    pub const fn out_zero_value(self) -> u8 {
        match self {
            Self::Nmos => 0x00,
            Self::Cmos => 0xFF,
        }
    }
}
