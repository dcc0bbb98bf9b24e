//! Cycle-exact Z80 CPU core.
//!
//! Each call to [`Z80::step`] handles one pending signal or executes one
//! complete instruction. The core charges every bus cycle through the bus
//! it owns, so the host's clock, contention and wait states stay exact.

mod alu;
mod bus;
mod cpu;
mod flags;
mod mode;
mod registers;
mod tables;

pub use bus::Z80Bus;
pub use cpu::Z80;
pub use flags::{CF, HF, NF, PF, SF, XF, YF, ZF};
pub use mode::{CpuKind, ExtMode, IndexMode};
pub use registers::Registers;
pub use tables::{FlagTables, flag_tables};
