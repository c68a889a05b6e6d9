//! MC6809 register set helpers
use std::fmt;

/// Enumeration of the condition code register bits
#[derive(Copy, Clone)]
pub enum CCBit {
    C = 0,
    V = 1,
    Z = 2,
    N = 3,
    I = 4,
    H = 5,
    F = 6,
    E = 7,
}

/// Representation of the condition code register.
/// The flag-setting arithmetic helpers live here, so this struct
/// effectively doubles as the ALU.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct CCBits {
    pub reg: u8,
}

/// Helper struct to map metadata about condition code register bits.
pub struct CCInfo {
    mask: u8,
    short: char,
    name: &'static str,
}
macro_rules! sign_bit_8 {
    ($b:expr) => {
        (($b & 0x80) == 0x80)
    };
}
macro_rules! sign_bit_16 {
    ($w:expr) => {
        (($w & 0x8000) == 0x8000)
    };
}
/// Metadata for each condition code register bit.
#[rustfmt::skip]
static CC_TABLE: [CCInfo;8] = [
    CCInfo {mask: 0x01, short: 'C', name: "carry"},
    CCInfo {mask: 0x02, short: 'V', name: "overflow"},
    CCInfo {mask: 0x04, short: 'Z', name: "zero"},
    CCInfo {mask: 0x08, short: 'N', name: "negative"},
    CCInfo {mask: 0x10, short: 'I', name: "IRQ mask"},
    CCInfo {mask: 0x20, short: 'H', name: "half carry"},
    CCInfo {mask: 0x40, short: 'F', name: "FIRQ mask"},
    CCInfo {mask: 0x80, short: 'E', name: "entire flag"}
];

impl CCBits {
    pub fn reset(&mut self) { self.reg = 0; }
    pub fn set_from_byte(&mut self, byte: u8) { self.reg = byte; }
    pub fn as_byte(&self) -> u8 { self.reg }
    pub fn set(&mut self, bit: CCBit, val: bool) {
        let mask: u8 = 1u8 << bit as usize;
        if val {
            self.reg |= mask;
        } else {
            self.reg &= !mask;
        }
    }
    pub fn is_set(&self, bit: CCBit) -> bool { CC_TABLE[bit as usize].mask & self.reg != 0 }
    /// Full names of all currently set bits, for diagnostic dumps.
    pub fn set_bit_names(&self) -> Vec<&'static str> {
        CC_TABLE
            .iter()
            .filter(|t| self.reg & t.mask != 0)
            .map(|t| t.name)
            .collect()
    }
    pub fn set_nz8(&mut self, val: u8) {
        self.set(CCBit::N, sign_bit_8!(val));
        self.set(CCBit::Z, val == 0);
    }
    pub fn set_nz16(&mut self, val: u16) {
        self.set(CCBit::N, sign_bit_16!(val));
        self.set(CCBit::Z, val == 0);
    }
    // condition code struct doubles as ALU
    pub fn add_u8(&mut self, a: u8, b: u8) -> u8 {
        let sum = a as u16 + b as u16;
        let result = (sum & 0xff) as u8;
        // carry is bit 8 of the unmasked sum
        self.set(CCBit::C, sum & 0x100 != 0);
        // two's-complement overflow: operands agree in sign, result differs
        self.set(CCBit::V, (a ^ b) & 0x80 == 0 && (a ^ result) & 0x80 != 0);
        self.set(CCBit::H, (a ^ b ^ result) & 0x10 != 0);
        self.set_nz8(result);
        result
    }
    pub fn sub_u8(&mut self, a: u8, b: u8) -> u8 {
        let diff = (a as u16).wrapping_sub(b as u16);
        let result = (diff & 0xff) as u8;
        // borrow-as-carry convention
        self.set(CCBit::C, diff & 0x100 != 0);
        self.set(CCBit::V, (a ^ b) & 0x80 != 0 && (a ^ result) & 0x80 != 0);
        self.set_nz8(result);
        result
    }
    pub fn sub_u16(&mut self, a: u16, b: u16) -> u16 {
        let diff = (a as u32).wrapping_sub(b as u32);
        let result = (diff & 0xffff) as u16;
        self.set(CCBit::C, diff & 0x1_0000 != 0);
        self.set(CCBit::V, (a ^ b) & 0x8000 != 0 && (a ^ result) & 0x8000 != 0);
        self.set_nz16(result);
        result
    }
    pub fn cmp_u8(&mut self, val1: u8, val2: u8) { self.sub_u8(val1, val2); }
    pub fn cmp_u16(&mut self, val1: u16, val2: u16) { self.sub_u16(val1, val2); }
    pub fn mul(&mut self, a: u8, b: u8) -> u16 {
        let d: u16 = (a as u16) * (b as u16);
        // carry = bit 7 (8th bit) of result
        self.set(CCBit::C, d & 0x80 != 0);
        self.set_nz16(d);
        d
    }
}
impl fmt::Display for CCBits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, t) in CC_TABLE.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, concat!(green!("{}:"), "{}"), t.short, (self.reg & t.mask != 0) as usize)?;
        }
        Ok(())
    }
}

/// Enumeration of all registers and a placeholder, invalid register called 'Z'.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Name {
    D,
    X,
    Y,
    U,
    S,
    PC,
    A,
    B,
    CC,
    DP,
    Z, // Error case; non-existent register
}

/// Inter-register codes as used by the EXG/TFR post-byte.
/// Codes with no register behind them resolve to the placeholder Z.
#[rustfmt::skip]
static CODE_TABLE: [Name; 16] = [
    Name::D, Name::X,  Name::Y, Name::U,  // 0..3
    Name::S, Name::PC, Name::Z, Name::Z,  // 4..7
    Name::A, Name::B,  Name::CC, Name::DP, // 8..11
    Name::Z, Name::Z,  Name::Z, Name::Z,  // 12..15
];
pub fn from_code(code: u8) -> Name { CODE_TABLE[(code & 0x0f) as usize] }

/// Provides storage and helpers for the full set of 6809 registers.
/// D is not stored; it is composed from A and B on demand.
#[derive(Clone, Copy, Default)]
pub struct Set {
    pub pc: u16,    // program counter
    pub a: u8,      // accumulator
    pub b: u8,      // accumulator
    pub x: u16,     // index register
    pub y: u16,     // index register
    pub u: u16,     // user stack pointer
    pub s: u16,     // system stack pointer
    pub dp: u8,     // direct page register
    pub cc: CCBits, // condition code register
}
impl Set {
    /// Power-on register values.
    pub fn reset(&mut self) {
        self.pc = 0;
        self.a = 0;
        self.b = 0;
        self.x = 0;
        self.y = 0;
        self.s = 0xfffe;
        self.u = 0xfffe;
        self.dp = 0;
        self.cc.reset();
    }
    pub fn d(&self) -> u16 { (self.a as u16) << 8 | self.b as u16 }
    pub fn set_d(&mut self, val: u16) {
        self.a = (val >> 8) as u8;
        self.b = (val & 0xff) as u8;
    }
    /// Register contents widened to u16; the placeholder Z reads as 0.
    pub fn get(&self, reg: Name) -> u16 {
        match reg {
            Name::D => self.d(),
            Name::X => self.x,
            Name::Y => self.y,
            Name::U => self.u,
            Name::S => self.s,
            Name::PC => self.pc,
            Name::A => self.a as u16,
            Name::B => self.b as u16,
            Name::CC => self.cc.as_byte() as u16,
            Name::DP => self.dp as u16,
            Name::Z => 0,
        }
    }
    /// Stores a value masked to the register's width; Z is a no-op.
    pub fn set(&mut self, reg: Name, val: u16) {
        match reg {
            Name::D => self.set_d(val),
            Name::X => self.x = val,
            Name::Y => self.y = val,
            Name::U => self.u = val,
            Name::S => self.s = val,
            Name::PC => self.pc = val,
            Name::A => self.a = (val & 0xff) as u8,
            Name::B => self.b = (val & 0xff) as u8,
            Name::CC => self.cc.set_from_byte((val & 0xff) as u8),
            Name::DP => self.dp = (val & 0xff) as u8,
            Name::Z => {}
        }
    }
}
impl fmt::Debug for Set {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { <Set as fmt::Display>::fmt(self, f) }
}
impl fmt::Display for Set {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            concat!(
                blue!("X:"),
                "{:04x} ",
                blue!("Y:"),
                "{:04x} ",
                blue!("U:"),
                "{:04x} ",
                blue!("S:"),
                "{:04x} ",
                blue!("PC:"),
                "{:04x} ",
                blue!("A:"),
                "{:02x} ",
                blue!("B:"),
                "{:02x} ",
                blue!("DP:"),
                "{:02x} ",
                blue!("CC:"),
                "{:02x}"
            ),
            self.x, self.y, self.u, self.s, self.pc, self.a, self.b, self.dp, self.cc.reg
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_restores_power_on_values() {
        let mut reg = Set::default();
        reg.a = 0x12;
        reg.x = 0x3456;
        reg.cc.set_from_byte(0xff);
        reg.reset();
        assert_eq!(reg.pc, 0);
        assert_eq!(reg.a, 0);
        assert_eq!(reg.b, 0);
        assert_eq!(reg.x, 0);
        assert_eq!(reg.y, 0);
        assert_eq!(reg.s, 0xfffe);
        assert_eq!(reg.u, 0xfffe);
        assert_eq!(reg.dp, 0);
        assert_eq!(reg.cc.as_byte(), 0);
    }

    #[test]
    fn d_is_composed_from_a_and_b() {
        let mut reg = Set::default();
        reg.a = 0x12;
        reg.b = 0x34;
        assert_eq!(reg.d(), 0x1234);
        reg.set_d(0xbeef);
        assert_eq!(reg.a, 0xbe);
        assert_eq!(reg.b, 0xef);
    }

    #[test]
    fn add_flags() {
        let mut cc = CCBits::default();
        assert_eq!(cc.add_u8(0x05, 0x03), 0x08);
        assert!(!cc.is_set(CCBit::C));
        assert!(!cc.is_set(CCBit::V));
        assert!(!cc.is_set(CCBit::Z));
        assert!(!cc.is_set(CCBit::N));
        assert_eq!(cc.add_u8(0xff, 0x01), 0x00);
        assert!(cc.is_set(CCBit::C));
        assert!(cc.is_set(CCBit::Z));
        assert!(!cc.is_set(CCBit::V));
        // 0x7f + 0x01: signed overflow, half carry out of bit 3
        assert_eq!(cc.add_u8(0x7f, 0x01), 0x80);
        assert!(cc.is_set(CCBit::V));
        assert!(cc.is_set(CCBit::N));
        assert!(cc.is_set(CCBit::H));
        assert!(!cc.is_set(CCBit::C));
    }

    #[test]
    fn sub_flags() {
        let mut cc = CCBits::default();
        assert_eq!(cc.sub_u8(0x05, 0x03), 0x02);
        assert!(!cc.is_set(CCBit::C));
        assert!(!cc.is_set(CCBit::V));
        // borrow sets carry
        assert_eq!(cc.sub_u8(0x03, 0x05), 0xfe);
        assert!(cc.is_set(CCBit::C));
        assert!(cc.is_set(CCBit::N));
        // 0x80 - 0x01: signed overflow
        assert_eq!(cc.sub_u8(0x80, 0x01), 0x7f);
        assert!(cc.is_set(CCBit::V));
        assert!(!cc.is_set(CCBit::C));
    }

    #[test]
    fn sub_u16_flags() {
        let mut cc = CCBits::default();
        assert_eq!(cc.sub_u16(0x0001, 0x0002), 0xffff);
        assert!(cc.is_set(CCBit::C));
        assert!(cc.is_set(CCBit::N));
        cc.cmp_u16(0x1234, 0x1234);
        assert!(cc.is_set(CCBit::Z));
        assert!(!cc.is_set(CCBit::C));
    }

    #[test]
    fn mul_flags() {
        let mut cc = CCBits::default();
        assert_eq!(cc.mul(0x10, 0x18), 0x0180);
        assert!(cc.is_set(CCBit::C)); // bit 7 of product set
        assert!(!cc.is_set(CCBit::Z));
        assert_eq!(cc.mul(0x00, 0x55), 0);
        assert!(cc.is_set(CCBit::Z));
        assert!(!cc.is_set(CCBit::C));
    }

    #[test]
    fn exg_code_mapping() {
        assert_eq!(from_code(0), Name::D);
        assert_eq!(from_code(5), Name::PC);
        assert_eq!(from_code(8), Name::A);
        assert_eq!(from_code(11), Name::DP);
        // unassigned codes resolve to the neutral placeholder
        assert_eq!(from_code(6), Name::Z);
        assert_eq!(from_code(15), Name::Z);
        let mut reg = Set::default();
        reg.set(Name::Z, 0x1234);
        assert_eq!(reg.get(Name::Z), 0);
    }
}
