use crate::memory::Memory;

/// A peripheral mapped into the processor's address space.
///
/// Devices intercept the read path over the range they claim; writes are
/// not intercepted and land in raw memory, which is also where devices
/// publish their own externally visible state.
pub trait MappedDevice {
    /// Inclusive range of addresses this device claims on the read path.
    fn range(&self) -> (u16, u16);
    /// Reads one byte from a claimed address. May publish updated state
    /// into raw memory as a side effect.
    fn read(&mut self, addr: u16, mem: &mut Memory) -> u8;
    /// Delivers one byte of external input. Returns true when the device
    /// asserts its interrupt request line.
    fn input(&mut self, byte: u8, mem: &mut Memory) -> bool;
}

/// Memory-mapped keyboard.
///
/// The data port holds the most recent key code; the status port reads 1
/// while a key is pending and 0 otherwise. Reading the data port consumes
/// the pending key. A key arriving before the previous one is consumed
/// simply replaces it. Each key press raises an IRQ on the core.
pub struct Keyboard {
    addr: u16,
    key_available: bool,
    key_code: u8,
}

/// Customary location of the keyboard ports.
pub const KEYBOARD_ADDR: u16 = 0xff00;

impl Keyboard {
    pub fn new(addr: u16) -> Keyboard {
        Keyboard {
            addr,
            key_available: false,
            key_code: 0,
        }
    }
    pub fn data_address(&self) -> u16 { self.addr }
    pub fn status_address(&self) -> u16 { self.addr.wrapping_add(1) }
}

impl MappedDevice for Keyboard {
    fn range(&self) -> (u16, u16) { (self.data_address(), self.status_address()) }

    fn read(&mut self, addr: u16, mem: &mut Memory) -> u8 {
        if addr == self.data_address() {
            // the key is consumed; publish the idle status
            self.key_available = false;
            mem.write_u8(self.status_address(), 0);
            self.key_code
        } else if addr == self.status_address() {
            u8::from(self.key_available)
        } else {
            0
        }
    }

    fn input(&mut self, byte: u8, mem: &mut Memory) -> bool {
        self.key_code = byte;
        self.key_available = true;
        mem.write_u8(self.data_address(), byte);
        mem.write_u8(self.status_address(), 1);
        true
    }
}
