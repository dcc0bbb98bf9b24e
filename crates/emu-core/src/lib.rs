//! Core traits and types for cycle-exact emulation.
//!
//! A CPU core owns its bus and charges every T-state through it. The bus
//! decides what each access costs, so contention and wait states stay a
//! host concern.

mod bus;
mod cpu;
mod io_bus;
mod observable;
mod simple_bus;

pub use bus::Bus;
pub use cpu::Cpu;
pub use io_bus::IoBus;
pub use observable::{Observable, Value};
pub use simple_bus::SimpleBus;
