//! Memory bus interface.

/// Memory bus seen by a CPU core.
///
/// Every method advances the host's clock by the cost of the bus cycle it
/// models (plus any contention the host applies). The CPU never counts
/// T-states itself; it only decides which cycles happen and in what order.
pub trait Bus {
    /// Read a byte from memory (3 T-states on a Z80).
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to memory (3 T-states on a Z80).
    fn write(&mut self, address: u16, value: u8);

    /// Opcode fetch (M1) read.
    ///
    /// Hosts that treat M1 differently (contention pattern, ROM traps,
    /// snow) override this. The CPU charges the refresh half of the cycle
    /// separately through [`Bus::read_no_mreq`].
    fn fetch(&mut self, address: u16) -> u8 {
        self.read(address)
    }

    /// Internal cycles with `address` on the bus during a read phase and no
    /// memory request.
    fn read_no_mreq(&mut self, address: u16, cycles: u32);

    /// Internal cycles with `address` on the bus during a write phase and no
    /// memory request.
    fn write_no_mreq(&mut self, address: u16, cycles: u32) {
        self.read_no_mreq(address, cycles);
    }
}
