//! Flat 64 KiB bus for tests and simple hosts.

use std::collections::HashMap;

use crate::{Bus, IoBus};

/// Flat RAM with a T-state counter.
///
/// Charges the nominal Z80 costs: 3 T-states per memory access (including
/// M1 fetches, whose refresh T-state the CPU charges separately), 4 per
/// port access and the requested count for no-MREQ cycles. There is no
/// contention.
pub struct SimpleBus {
    ram: Box<[u8; 0x10000]>,
    ports: HashMap<u16, u8>,
    io_writes: Vec<(u16, u8)>,
    ticks: u64,
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: Box::new([0; 0x10000]),
            ports: HashMap::new(),
            io_writes: Vec::new(),
            ticks: 0,
        }
    }

    /// Copy `data` into RAM starting at `address`, wrapping at 64K.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.ram[usize::from(addr)] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    /// Read RAM without charging any time.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.ram[usize::from(address)]
    }

    /// Write RAM without charging any time.
    pub fn poke(&mut self, address: u16, value: u8) {
        self.ram[usize::from(address)] = value;
    }

    /// Value returned by `IN` from `port`. Unset ports read `0xFF`.
    pub fn set_port(&mut self, port: u16, value: u8) {
        self.ports.insert(port, value);
    }

    /// Every `OUT` seen so far, in order.
    #[must_use]
    pub fn io_writes(&self) -> &[(u16, u8)] {
        &self.io_writes
    }

    /// Drain the `OUT` log, leaving it empty.
    pub fn take_io_writes(&mut self) -> Vec<(u16, u8)> {
        std::mem::take(&mut self.io_writes)
    }

    pub fn clear_io_writes(&mut self) {
        self.io_writes.clear();
    }

    /// T-states charged since creation or the last [`SimpleBus::reset_ticks`].
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn reset_ticks(&mut self) {
        self.ticks = 0;
    }
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        self.ticks += 3;
        self.ram[usize::from(address)]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.ticks += 3;
        self.ram[usize::from(address)] = value;
    }

    fn read_no_mreq(&mut self, _address: u16, cycles: u32) {
        self.ticks += u64::from(cycles);
    }
}

impl IoBus for SimpleBus {
    fn read_io(&mut self, port: u16) -> u8 {
        self.ticks += 4;
        self.ports.get(&port).copied().unwrap_or(0xFF)
    }

    fn write_io(&mut self, port: u16, value: u8) {
        self.ticks += 4;
        self.io_writes.push((port, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_wraps_at_top_of_memory() {
        let mut bus = SimpleBus::new();
        bus.load(0xFFFF, &[0x11, 0x22]);
        assert_eq!(bus.peek(0xFFFF), 0x11);
        assert_eq!(bus.peek(0x0000), 0x22);
    }

    #[test]
    fn charges_nominal_costs() {
        let mut bus = SimpleBus::new();
        bus.fetch(0);
        bus.write(1, 2);
        bus.read_io(0xFE);
        bus.write_no_mreq(0, 5);
        assert_eq!(bus.ticks(), 3 + 3 + 4 + 5);
        assert_eq!(bus.read_io(0x1234), 0xFF);
    }

    #[test]
    fn records_port_writes() {
        let mut bus = SimpleBus::new();
        bus.write_io(0x00FE, 7);
        bus.write_io(0x7FFD, 0x10);
        assert_eq!(bus.io_writes(), &[(0x00FE, 7), (0x7FFD, 0x10)]);
    }

    #[test]
    fn port_log_can_be_drained() {
        let mut bus = SimpleBus::new();
        bus.write_io(0x00FE, 7);
        bus.write_io(0x00FE, 8);
        assert_eq!(bus.take_io_writes(), vec![(0x00FE, 7), (0x00FE, 8)]);
        assert!(bus.io_writes().is_empty());

        bus.write_io(0x7FFD, 0x10);
        bus.clear_io_writes();
        assert!(bus.io_writes().is_empty());
        assert_eq!(bus.ticks(), 12, "draining charges no time");
    }
}
