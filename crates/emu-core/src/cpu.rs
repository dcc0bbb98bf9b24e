//! CPU core trait.

/// A CPU core bound to its bus.
///
/// The core owns the bus it was constructed with. Hosts drive it one
/// instruction at a time and steer it through level-sensitive signal lines
/// that they may change between steps.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Process one unit of work: a pending signal, or one complete
    /// instruction including every prefix byte.
    fn step(&mut self);

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU is executing HALT.
    fn is_halted(&self) -> bool;

    /// Drive the RESET line.
    fn set_reset(&mut self, asserted: bool);

    /// Drive the NMI line.
    fn set_nmi(&mut self, asserted: bool);

    /// Drive the maskable interrupt line.
    fn set_int(&mut self, asserted: bool);
}
