use crate::core::Core;
use crate::registers::{CCBit, Name};
use lazy_static::lazy_static;

/// Escape prefixes extending the opcode space to two bytes.
pub const PAGE2: u8 = 0x10;
pub const PAGE3: u8 = 0x11;
pub fn is_page_prefix(op: u8) -> bool { op == PAGE2 || op == PAGE3 }

/// Evaluation functions fetch their own operand bytes through the core's
/// fetch primitives and leave all flag updates behind them.
pub type EvalFn = fn(&mut Core, &Opcode);

/// One table entry: a (possibly page-prefixed) opcode, its display name,
/// the register the operation is focused on, and its evaluation function.
pub struct Opcode {
    pub op: u16,
    pub name: &'static str,
    pub reg: Name,
    pub eval: EvalFn,
}

// Single-byte opcodes occupy slots 0-0xff; the two prefixed pages get a
// secondary table each. Keys are formed as prefix << 8 | next byte.
fn table_index(op: u16) -> Option<usize> {
    match op & 0xff00 {
        0 => Some(op as usize),
        0x1000 => Some(0x100 + (op & 0xff) as usize),
        0x1100 => Some(0x200 + (op & 0xff) as usize),
        _ => None,
    }
}

lazy_static! {
    static ref DISPATCH: [Option<&'static Opcode>; 768] = {
        let mut table: [Option<&'static Opcode>; 768] = [None; 768];
        for opcode in OPCODES {
            let i = table_index(opcode.op).expect("opcode outside the dispatchable range");
            assert!(table[i].is_none(), "duplicate opcode {:04X}", opcode.op);
            table[i] = Some(opcode);
        }
        table
    };
}

pub fn lookup(op: u16) -> Option<&'static Opcode> { DISPATCH[table_index(op)?] }
pub fn name(op: u16) -> &'static str { lookup(op).map(|o| o.name).unwrap_or("UNKNOWN") }
pub fn count() -> usize { OPCODES.len() }

//
// instruction implementations
//
fn __nop(_: &mut Core, _: &Opcode) {}
// dedicated halt; PC stays on the halting instruction so a monitor shows
// where execution stopped, and the core stays halted until reset
fn __sync(c: &mut Core, _: &Opcode) {
    c.reg.pc = c.reg.pc.wrapping_sub(1);
    c.halted = true;
}
// wait-for-interrupt: clear the masked condition bits, then stall until
// an interrupt is serviced
fn __cwai(c: &mut Core, _: &Opcode) {
    let mask = c.fetch_byte();
    c.reg.cc.reg &= mask;
    c.wait_for_interrupt();
}
fn __ld_imm8(c: &mut Core, o: &Opcode) {
    let val = c.fetch_byte();
    c.reg.set(o.reg, val as u16);
    c.reg.cc.set_nz8(val);
}
fn __ld_imm16(c: &mut Core, o: &Opcode) {
    let val = c.fetch_word();
    c.reg.set(o.reg, val);
    c.reg.cc.set_nz16(val);
}
fn __st_direct(c: &mut Core, o: &Opcode) {
    let addr = c.direct_address();
    let val = (c.reg.get(o.reg) & 0xff) as u8;
    c.write_u8(addr, val);
    c.reg.cc.set_nz8(val);
}
fn __st_ext(c: &mut Core, o: &Opcode) {
    let addr = c.extended_address();
    let val = (c.reg.get(o.reg) & 0xff) as u8;
    c.write_u8(addr, val);
    c.reg.cc.set_nz8(val);
}
fn __add_imm(c: &mut Core, o: &Opcode) {
    let operand = c.fetch_byte();
    let acc = (c.reg.get(o.reg) & 0xff) as u8;
    let result = c.reg.cc.add_u8(acc, operand);
    c.reg.set(o.reg, result as u16);
}
fn __sub_imm(c: &mut Core, o: &Opcode) {
    let operand = c.fetch_byte();
    let acc = (c.reg.get(o.reg) & 0xff) as u8;
    let result = c.reg.cc.sub_u8(acc, operand);
    c.reg.set(o.reg, result as u16);
}
fn __cmp_imm8(c: &mut Core, o: &Opcode) {
    let operand = c.fetch_byte();
    let acc = (c.reg.get(o.reg) & 0xff) as u8;
    c.reg.cc.cmp_u8(acc, operand);
}
fn __cmp_imm16(c: &mut Core, o: &Opcode) {
    let operand = c.fetch_word();
    let val = c.reg.get(o.reg);
    c.reg.cc.cmp_u16(val, operand);
}
fn __and_imm(c: &mut Core, o: &Opcode) {
    let result = (c.reg.get(o.reg) & 0xff) as u8 & c.fetch_byte();
    c.reg.set(o.reg, result as u16);
    c.reg.cc.set_nz8(result);
}
fn __eor_imm(c: &mut Core, o: &Opcode) {
    let result = (c.reg.get(o.reg) & 0xff) as u8 ^ c.fetch_byte();
    c.reg.set(o.reg, result as u16);
    c.reg.cc.set_nz8(result);
}
fn __or_imm(c: &mut Core, o: &Opcode) {
    let result = (c.reg.get(o.reg) & 0xff) as u8 | c.fetch_byte();
    c.reg.set(o.reg, result as u16);
    c.reg.cc.set_nz8(result);
}
// note: INC and DEC do not affect the carry flag
fn __inc(c: &mut Core, o: &Opcode) {
    let result = ((c.reg.get(o.reg) & 0xff) as u8).wrapping_add(1);
    c.reg.set(o.reg, result as u16);
    c.reg.cc.set_nz8(result);
}
fn __dec(c: &mut Core, o: &Opcode) {
    let result = ((c.reg.get(o.reg) & 0xff) as u8).wrapping_sub(1);
    c.reg.set(o.reg, result as u16);
    c.reg.cc.set_nz8(result);
}
fn __clr(c: &mut Core, o: &Opcode) {
    c.reg.set(o.reg, 0);
    c.reg.cc.set_nz8(0);
}
fn __mul(c: &mut Core, _: &Opcode) {
    let d = c.reg.cc.mul(c.reg.a, c.reg.b);
    c.reg.set_d(d);
}
fn __bra(c: &mut Core, _: &Opcode) {
    let offset = c.fetch_byte() as i8;
    c.reg.pc = c.reg.pc.wrapping_add(offset as u16);
}
fn __jmp_ext(c: &mut Core, _: &Opcode) { c.reg.pc = c.extended_address(); }
fn __rts(c: &mut Core, _: &Opcode) { c.reg.pc = c.pop_word(); }
// restore order is the exact inverse of the interrupt-entry save order
fn __rti(c: &mut Core, _: &Opcode) {
    let cc = c.pop_stack();
    c.reg.cc.set_from_byte(cc);
    c.reg.a = c.pop_stack();
    c.reg.b = c.pop_stack();
    c.reg.dp = c.pop_stack();
    c.reg.x = c.pop_word();
    c.reg.y = c.pop_word();
    c.reg.u = c.pop_word();
    c.reg.pc = c.pop_word();
}
fn __psh(c: &mut Core, _: &Opcode) {
    let mask = c.fetch_byte();
    c.push_multiple(mask);
}
fn __pul(c: &mut Core, _: &Opcode) {
    let mask = c.fetch_byte();
    c.pull_multiple(mask);
}
fn __exg(c: &mut Core, _: &Opcode) {
    let pb = c.fetch_byte();
    c.exchange_registers(pb >> 4, pb & 0x0f);
}
fn __tfr(c: &mut Core, _: &Opcode) {
    let pb = c.fetch_byte();
    c.transfer_registers(pb >> 4, pb & 0x0f);
}
fn __lea(c: &mut Core, o: &Opcode) {
    let ea = c.indexed_address();
    c.reg.set(o.reg, ea);
    c.reg.cc.set(CCBit::Z, ea == 0);
}

//
// instruction table
//
#[rustfmt::skip]
pub const OPCODES: &[Opcode] = &[
    Opcode { op: 0x12,   name: "NOP",        reg: Name::Z, eval: __nop },
    Opcode { op: 0x13,   name: "SYNC",       reg: Name::Z, eval: __sync },
    Opcode { op: 0x1E,   name: "EXG",        reg: Name::Z, eval: __exg },
    Opcode { op: 0x1F,   name: "TFR",        reg: Name::Z, eval: __tfr },
    Opcode { op: 0x20,   name: "BRA",        reg: Name::Z, eval: __bra },
    Opcode { op: 0x30,   name: "LEAX",       reg: Name::X, eval: __lea },
    Opcode { op: 0x34,   name: "PSHS",       reg: Name::S, eval: __psh },
    Opcode { op: 0x35,   name: "PULS",       reg: Name::S, eval: __pul },
    Opcode { op: 0x39,   name: "RTS",        reg: Name::Z, eval: __rts },
    Opcode { op: 0x3B,   name: "RTI",        reg: Name::Z, eval: __rti },
    Opcode { op: 0x3C,   name: "CWAI",       reg: Name::Z, eval: __cwai },
    Opcode { op: 0x3D,   name: "MUL",        reg: Name::Z, eval: __mul },
    Opcode { op: 0x4A,   name: "DECA",       reg: Name::A, eval: __dec },
    Opcode { op: 0x4C,   name: "INCA",       reg: Name::A, eval: __inc },
    Opcode { op: 0x4F,   name: "CLRA",       reg: Name::A, eval: __clr },
    Opcode { op: 0x5A,   name: "DECB",       reg: Name::B, eval: __dec },
    Opcode { op: 0x5C,   name: "INCB",       reg: Name::B, eval: __inc },
    Opcode { op: 0x5F,   name: "CLRB",       reg: Name::B, eval: __clr },
    Opcode { op: 0x7E,   name: "JMP ext",    reg: Name::Z, eval: __jmp_ext },
    Opcode { op: 0x80,   name: "SUBA #",     reg: Name::A, eval: __sub_imm },
    Opcode { op: 0x81,   name: "CMPA #",     reg: Name::A, eval: __cmp_imm8 },
    Opcode { op: 0x84,   name: "ANDA #",     reg: Name::A, eval: __and_imm },
    Opcode { op: 0x86,   name: "LDA #",      reg: Name::A, eval: __ld_imm8 },
    Opcode { op: 0x88,   name: "EORA #",     reg: Name::A, eval: __eor_imm },
    Opcode { op: 0x8A,   name: "ORA #",      reg: Name::A, eval: __or_imm },
    Opcode { op: 0x8B,   name: "ADDA #",     reg: Name::A, eval: __add_imm },
    Opcode { op: 0x97,   name: "STA direct", reg: Name::A, eval: __st_direct },
    Opcode { op: 0xB7,   name: "STA ext",    reg: Name::A, eval: __st_ext },
    Opcode { op: 0xC0,   name: "SUBB #",     reg: Name::B, eval: __sub_imm },
    Opcode { op: 0xC6,   name: "LDB #",      reg: Name::B, eval: __ld_imm8 },
    Opcode { op: 0xCB,   name: "ADDB #",     reg: Name::B, eval: __add_imm },
    Opcode { op: 0xD7,   name: "STB direct", reg: Name::B, eval: __st_direct },
    Opcode { op: 0x108E, name: "LDY #",      reg: Name::Y, eval: __ld_imm16 },
    Opcode { op: 0x1183, name: "CMPU #",     reg: Name::U, eval: __cmp_imm16 },
];
