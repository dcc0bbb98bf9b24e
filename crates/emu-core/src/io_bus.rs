use crate::Bus;

/// A bus that also has a separate I/O port space.
///
/// The Z80 reaches ports through IN and OUT with a full 16-bit address
/// (the high byte carries A or B depending on the instruction). Port
/// accesses may be contended like memory on some machines.
pub trait IoBus: Bus {
    /// Read a byte from the given port (4 T-states on a Z80).
    fn read_io(&mut self, port: u16) -> u8;

    /// Write a byte to the given port (4 T-states on a Z80).
    fn write_io(&mut self, port: u16, value: u8);
}
