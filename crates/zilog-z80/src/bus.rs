//! Z80-specific bus hooks.

use emu_core::{IoBus, SimpleBus};

/// Bus seen by the Z80 core.
///
/// Adds the cycles that only exist on a Z80 to the generic memory and I/O
/// bus. The defaults charge the acknowledge cycles as idle time with the
/// current PC on the address bus, which is what a host without contention
/// or an interrupt controller needs.
pub trait Z80Bus: IoBus {
    /// RESET was processed. Hosts reset their own latches here.
    fn reset(&mut self) {}

    /// NMI acknowledge M1 cycle (`cycles` T-states, refresh charged
    /// separately).
    fn nmi_acknowledge(&mut self, address: u16, cycles: u32) {
        self.read_no_mreq(address, cycles);
    }

    /// INT acknowledge M1 cycle (`cycles` T-states, refresh charged
    /// separately). The vector byte is sampled from the floating data bus
    /// set with `Z80::set_data_bus`.
    fn interrupt_acknowledge(&mut self, address: u16, cycles: u32) {
        self.read_no_mreq(address, cycles);
    }
}

impl Z80Bus for SimpleBus {}
