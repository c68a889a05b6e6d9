use crate::device::MappedDevice;
use crate::instructions;
use crate::memory::Memory;
use crate::registers::{self, CCBit};
use log::{debug, warn};

/// Address of the IRQ service vector.
pub const IRQ_VECTOR: u16 = 0xfff8;

/// Register selection bits of the PSHS/PULS post-byte mask.
pub mod stack_mask {
    pub const CC: u8 = 0x01;
    pub const A: u8 = 0x02;
    pub const B: u8 = 0x04;
    pub const DP: u8 = 0x08;
    pub const X: u8 = 0x10;
    pub const Y: u8 = 0x20;
    pub const U: u8 = 0x40;
    pub const PC: u8 = 0x80;
}

/// Record of the decode failure that halted the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault {
    /// the opcode that had no table entry (combined key for page opcodes)
    pub opcode: u16,
    /// the address the opcode was fetched from
    pub addr: u16,
}

// A peripheral bound to the slice of the address space it claimed when it
// was attached. The read path walks bindings in attach order.
struct Binding {
    first: u16,
    last: u16,
    dev: Box<dyn MappedDevice>,
}

/// The Core struct owns the register set and memory and implements the
/// fetch-decode-execute loop, the stack primitives, breakpoints and IRQ
/// delivery. Hosts drive it one `step()` at a time and inspect `halted`
/// and `fault()` between steps; no call on the core ever fails.
pub struct Core {
    pub reg: registers::Set, // the full set of 6809 registers
    pub mem: Memory,         // the flat 64K address space
    pub halted: bool,        // set by a halt opcode or a decode fault; cleared by reset
    devices: Vec<Binding>,
    waiting: bool,     // true while inside a wait-for-interrupt instruction
    irq_pending: bool, // a single coalescing request flag; no queue
    breakpoints: Vec<u16>,
    instructions_executed: u64,
    /* introspection for disassembly displays */
    last_post_byte: u8,
    last_effective_address: u16,
    fault: Option<Fault>,
}

impl Core {
    pub fn new() -> Core {
        let mut core = Core {
            reg: Default::default(),
            mem: Memory::new(),
            halted: false,
            devices: Vec::new(),
            waiting: false,
            irq_pending: false,
            breakpoints: Vec::new(),
            instructions_executed: 0,
            last_post_byte: 0,
            last_effective_address: 0,
            fault: None,
        };
        core.reg.reset();
        core
    }

    /// Binds a device over the address range it claims. Devices attached
    /// first win when ranges overlap. Returns a handle for `device_input`.
    pub fn attach_device(&mut self, dev: Box<dyn MappedDevice>) -> usize {
        let (first, last) = dev.range();
        self.devices.push(Binding { first, last, dev });
        self.devices.len() - 1
    }

    /// Delivers one byte of external input to an attached device and
    /// raises an IRQ if the device asserts its interrupt line.
    pub fn device_input(&mut self, handle: usize, byte: u8) {
        let irq = match self.devices.get_mut(handle) {
            Some(binding) => binding.dev.input(byte, &mut self.mem),
            None => false,
        };
        if irq {
            self.trigger_irq();
        }
    }

    /// Returns the core to its power-on state: registers, memory,
    /// breakpoints, pending interrupt, halt/wait state and counters.
    /// Attached devices stay attached.
    pub fn reset(&mut self) {
        self.reg.reset();
        self.mem.clear();
        self.halted = false;
        self.waiting = false;
        self.irq_pending = false;
        self.breakpoints.clear();
        self.instructions_executed = 0;
        self.last_post_byte = 0;
        self.last_effective_address = 0;
        self.fault = None;
    }

    //
    // address space access
    //
    /// Reads one byte; a device bound over the address intercepts the
    /// read, otherwise it comes from raw memory.
    pub fn read_u8(&mut self, addr: u16) -> u8 {
        for binding in self.devices.iter_mut() {
            if addr >= binding.first && addr <= binding.last {
                return binding.dev.read(addr, &mut self.mem);
            }
        }
        self.mem.read_u8(addr)
    }
    /// Writes always reach raw memory, even over device-claimed addresses;
    /// the devices themselves publish state through memory writes.
    pub fn write_u8(&mut self, addr: u16, val: u8) { self.mem.write_u8(addr, val); }
    pub fn read_u16(&mut self, addr: u16) -> u16 {
        let hi = self.read_u8(addr);
        let lo = self.read_u8(addr.wrapping_add(1));
        (hi as u16) << 8 | lo as u16
    }
    pub fn write_u16(&mut self, addr: u16, val: u16) {
        self.write_u8(addr, (val >> 8) as u8);
        self.write_u8(addr.wrapping_add(1), (val & 0xff) as u8);
    }
    /// Reads the byte at PC and advances PC.
    pub fn fetch_byte(&mut self) -> u8 {
        let byte = self.read_u8(self.reg.pc);
        self.reg.pc = self.reg.pc.wrapping_add(1);
        byte
    }
    pub fn fetch_word(&mut self) -> u16 {
        let hi = self.fetch_byte();
        let lo = self.fetch_byte();
        (hi as u16) << 8 | lo as u16
    }

    //
    // system stack; grows toward lower addresses
    //
    pub fn push_stack(&mut self, val: u8) {
        self.reg.s = self.reg.s.wrapping_sub(1);
        self.mem.write_u8(self.reg.s, val);
    }
    pub fn pop_stack(&mut self) -> u8 {
        let val = self.mem.read_u8(self.reg.s);
        self.reg.s = self.reg.s.wrapping_add(1);
        val
    }
    pub fn push_word(&mut self, val: u16) {
        self.push_stack((val >> 8) as u8);
        self.push_stack((val & 0xff) as u8);
    }
    pub fn pop_word(&mut self) -> u16 {
        let lo = self.pop_stack();
        let hi = self.pop_stack();
        (hi as u16) << 8 | lo as u16
    }

    //
    // execution
    //
    /// Executes at most one instruction. A halted or waiting core does
    /// nothing; a pending IRQ is serviced instead of fetching (and wakes a
    /// waiting core); a breakpoint on PC stalls the core until the host
    /// intervenes. An unmapped opcode records a Fault and halts.
    pub fn step(&mut self) {
        if self.halted {
            return;
        }
        if self.irq_pending {
            self.service_irq();
            return;
        }
        if self.waiting {
            return;
        }
        if self.breakpoints.contains(&self.reg.pc) {
            return;
        }
        self.last_post_byte = 0;
        self.last_effective_address = 0;
        let at = self.reg.pc;
        let mut op = self.fetch_byte() as u16;
        if instructions::is_page_prefix(op as u8) {
            op = op << 8 | self.fetch_byte() as u16;
        }
        match instructions::lookup(op) {
            Some(inst) => {
                (inst.eval)(self, inst);
                self.instructions_executed += 1;
            }
            None => {
                warn!("unknown opcode {:02X} at {:04X}", op, at);
                self.fault = Some(Fault { opcode: op, addr: at });
                self.halted = true;
            }
        }
    }

    /// Requests an IRQ. The request is dropped, not queued, while the
    /// interrupt mask is set; a second request before service coalesces.
    pub fn trigger_irq(&mut self) {
        if !self.reg.cc.is_set(CCBit::I) {
            self.irq_pending = true;
        }
    }

    // Interrupt entry: stack the entire machine state, mask further IRQs
    // and vector. The push order here is the save format that RTI undoes.
    fn service_irq(&mut self) {
        self.irq_pending = false;
        self.reg.cc.set(CCBit::E, true);
        self.push_word(self.reg.pc);
        self.push_word(self.reg.u);
        self.push_word(self.reg.y);
        self.push_word(self.reg.x);
        self.push_stack(self.reg.dp);
        self.push_stack(self.reg.b);
        self.push_stack(self.reg.a);
        self.push_stack(self.reg.cc.as_byte());
        self.reg.cc.set(CCBit::I, true);
        self.reg.pc = self.read_u16(IRQ_VECTOR);
        self.halted = false;
        self.waiting = false;
        debug!("IRQ serviced; vectored to {:04X}", self.reg.pc);
    }

    /// Stalls the core until the next interrupt is serviced.
    pub fn wait_for_interrupt(&mut self) { self.waiting = true; }
    pub fn waiting_for_interrupt(&self) -> bool { self.waiting }
    pub fn irq_pending(&self) -> bool { self.irq_pending }
    pub fn instructions_executed(&self) -> u64 { self.instructions_executed }
    pub fn fault(&self) -> Option<&Fault> { self.fault.as_ref() }

    //
    // breakpoints
    //
    pub fn add_breakpoint(&mut self, addr: u16) {
        if !self.breakpoints.contains(&addr) {
            self.breakpoints.push(addr);
        }
    }
    #[allow(unused)]
    pub fn remove_breakpoint(&mut self, addr: u16) { self.breakpoints.retain(|&a| a != addr); }
    pub fn breakpoints(&self) -> &[u16] { &self.breakpoints }

    //
    // multi-register save/restore (PSHS/PULS and interrupt entry share
    // the stacking order with the mask bits of stack_mask)
    //
    pub fn push_multiple(&mut self, mask: u8) {
        if mask & stack_mask::PC != 0 {
            self.push_word(self.reg.pc);
        }
        if mask & stack_mask::U != 0 {
            self.push_word(self.reg.u);
        }
        if mask & stack_mask::Y != 0 {
            self.push_word(self.reg.y);
        }
        if mask & stack_mask::X != 0 {
            self.push_word(self.reg.x);
        }
        if mask & stack_mask::DP != 0 {
            self.push_stack(self.reg.dp);
        }
        if mask & stack_mask::B != 0 {
            self.push_stack(self.reg.b);
        }
        if mask & stack_mask::A != 0 {
            self.push_stack(self.reg.a);
        }
        if mask & stack_mask::CC != 0 {
            self.push_stack(self.reg.cc.as_byte());
        }
    }
    pub fn pull_multiple(&mut self, mask: u8) {
        if mask & stack_mask::CC != 0 {
            let cc = self.pop_stack();
            self.reg.cc.set_from_byte(cc);
        }
        if mask & stack_mask::A != 0 {
            self.reg.a = self.pop_stack();
        }
        if mask & stack_mask::B != 0 {
            self.reg.b = self.pop_stack();
        }
        if mask & stack_mask::DP != 0 {
            self.reg.dp = self.pop_stack();
        }
        if mask & stack_mask::X != 0 {
            self.reg.x = self.pop_word();
        }
        if mask & stack_mask::Y != 0 {
            self.reg.y = self.pop_word();
        }
        if mask & stack_mask::U != 0 {
            self.reg.u = self.pop_word();
        }
        if mask & stack_mask::PC != 0 {
            self.reg.pc = self.pop_word();
        }
    }

    //
    // inter-register operations over EXG/TFR post-byte codes
    //
    pub fn exchange_registers(&mut self, r1: u8, r2: u8) {
        let v1 = self.reg.get(registers::from_code(r1));
        let v2 = self.reg.get(registers::from_code(r2));
        self.reg.set(registers::from_code(r1), v2);
        self.reg.set(registers::from_code(r2), v1);
    }
    pub fn transfer_registers(&mut self, src: u8, dst: u8) {
        let val = self.reg.get(registers::from_code(src));
        self.reg.set(registers::from_code(dst), val);
    }

    //
    // addressing mode helpers; each consumes its operand bytes from PC
    //
    /// DP supplies the high byte, the fetched offset the low byte.
    pub fn direct_address(&mut self) -> u16 {
        let offset = self.fetch_byte();
        (self.reg.dp as u16) << 8 | offset as u16
    }
    /// X plus a fetched signed offset byte, wrapping mod 64K.
    pub fn indexed_address(&mut self) -> u16 {
        let pb = self.fetch_byte();
        let ea = self.reg.x.wrapping_add((pb as i8) as u16);
        self.last_post_byte = pb;
        self.last_effective_address = ea;
        ea
    }
    pub fn extended_address(&mut self) -> u16 {
        let ea = self.fetch_word();
        self.last_effective_address = ea;
        ea
    }
    /// Effective address of the most recent indexed/extended instruction,
    /// zero otherwise. Exposed for disassembly displays only.
    pub fn last_effective_address(&self) -> u16 { self.last_effective_address }
    pub fn last_post_byte(&self) -> u8 { self.last_post_byte }
}

impl Default for Core {
    fn default() -> Self { Core::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader;

    #[test]
    fn reset_state() {
        let mut core = Core::new();
        core.reg.a = 0x55;
        core.mem.write_u8(0x100, 0xaa);
        core.add_breakpoint(0x200);
        core.halted = true;
        core.reset();
        assert_eq!(core.reg.pc, 0x0000);
        assert_eq!(core.reg.s, 0xfffe);
        assert_eq!(core.reg.u, 0xfffe);
        assert_eq!(core.reg.dp, 0);
        assert_eq!(core.reg.cc.as_byte(), 0);
        assert_eq!(core.reg.a, 0);
        assert_eq!(core.reg.b, 0);
        assert_eq!(core.reg.x, 0);
        assert_eq!(core.reg.y, 0);
        assert_eq!(core.mem.read_u8(0x100), 0);
        assert!(core.breakpoints().is_empty());
        assert!(!core.halted);
        assert_eq!(core.instructions_executed(), 0);
    }

    #[test]
    fn fetch_advances_and_wraps_pc() {
        let mut core = Core::new();
        core.mem.write_u8(0xffff, 0x12);
        core.mem.write_u8(0x0000, 0x34);
        core.reg.pc = 0xffff;
        assert_eq!(core.fetch_word(), 0x1234);
        assert_eq!(core.reg.pc, 0x0001);
    }

    #[test]
    fn stack_grows_down_and_round_trips() {
        let mut core = Core::new();
        core.reg.s = 0xff00;
        core.push_word(0xbeef);
        assert_eq!(core.reg.s, 0xfefe);
        core.push_stack(0x42);
        assert_eq!(core.reg.s, 0xfefd);
        assert_eq!(core.pop_stack(), 0x42);
        assert_eq!(core.pop_word(), 0xbeef);
        assert_eq!(core.reg.s, 0xff00);
    }

    #[test]
    fn push_pull_round_trips_for_every_mask() {
        for mask in 0u16..=0xff {
            let mut core = Core::new();
            core.reg.pc = 0x1234;
            core.reg.u = 0x2345;
            core.reg.y = 0x3456;
            core.reg.x = 0x4567;
            core.reg.dp = 0x56;
            core.reg.b = 0x67;
            core.reg.a = 0x78;
            core.reg.cc.set_from_byte(0x89);
            core.reg.s = 0xff80;
            let saved = core.reg;
            core.push_multiple(mask as u8);
            core.pull_multiple(mask as u8);
            assert_eq!(core.reg.pc, saved.pc, "mask {:02x}", mask);
            assert_eq!(core.reg.u, saved.u, "mask {:02x}", mask);
            assert_eq!(core.reg.y, saved.y, "mask {:02x}", mask);
            assert_eq!(core.reg.x, saved.x, "mask {:02x}", mask);
            assert_eq!(core.reg.dp, saved.dp, "mask {:02x}", mask);
            assert_eq!(core.reg.b, saved.b, "mask {:02x}", mask);
            assert_eq!(core.reg.a, saved.a, "mask {:02x}", mask);
            assert_eq!(core.reg.cc.as_byte(), saved.cc.as_byte(), "mask {:02x}", mask);
            assert_eq!(core.reg.s, saved.s, "mask {:02x}", mask);
        }
    }

    #[test]
    fn unknown_opcode_halts_and_records_fault() {
        let mut core = Core::new();
        core.reg.pc = 0x4000;
        core.mem.write_u8(0x4000, 0xff); // unmapped
        core.step();
        assert!(core.halted);
        assert_eq!(core.reg.pc, 0x4001); // only the fetched byte consumed
        let fault = core.fault().expect("fault must be recorded");
        assert_eq!(fault.opcode, 0xff);
        assert_eq!(fault.addr, 0x4000);
        // halted is terminal: further steps do nothing
        core.step();
        assert_eq!(core.reg.pc, 0x4001);
        core.reset();
        assert!(core.fault().is_none());
        assert!(!core.halted);
    }

    #[test]
    fn unknown_page_opcode_consumes_both_bytes() {
        let mut core = Core::new();
        core.reg.pc = 0x4000;
        core.mem.write_u8(0x4000, 0x10);
        core.mem.write_u8(0x4001, 0x00); // 0x1000 is unmapped
        core.step();
        assert!(core.halted);
        assert_eq!(core.reg.pc, 0x4002);
        assert_eq!(core.fault().unwrap().opcode, 0x1000);
    }

    #[test]
    fn page_opcode_executes() {
        let mut core = Core::new();
        core.reg.pc = 0x4000;
        loader::load_bytes(&mut core.mem, &[0x10, 0x8e, 0x12, 0x34], 0x4000); // LDY #$1234
        core.step();
        assert_eq!(core.reg.y, 0x1234);
        assert_eq!(core.reg.pc, 0x4004);
        assert!(!core.halted);
    }

    #[test]
    fn breakpoint_stalls_without_error() {
        let mut core = Core::new();
        core.reg.pc = 0x4000;
        core.mem.write_u8(0x4000, 0x12); // NOP
        core.add_breakpoint(0x4000);
        core.add_breakpoint(0x4000); // duplicates ignored
        assert_eq!(core.breakpoints(), &[0x4000]);
        core.step();
        assert_eq!(core.reg.pc, 0x4000); // stalled
        assert_eq!(core.instructions_executed(), 0);
        core.remove_breakpoint(0x4000);
        core.step();
        assert_eq!(core.reg.pc, 0x4001);
        assert_eq!(core.instructions_executed(), 1);
    }

    #[test]
    fn irq_is_dropped_while_masked() {
        let mut core = Core::new();
        core.reg.cc.set(CCBit::I, true);
        core.reg.pc = 0x4000;
        core.mem.write_u8(0x4000, 0x12); // NOP
        core.trigger_irq();
        assert!(!core.irq_pending());
        core.step();
        assert_eq!(core.reg.pc, 0x4001); // no interrupt path taken
    }

    #[test]
    fn irq_service_stacks_state_and_vectors() {
        let mut core = Core::new();
        core.reg.pc = 0x4000;
        core.reg.s = 0xff00;
        core.reg.u = 0x1122;
        core.reg.y = 0x3344;
        core.reg.x = 0x5566;
        core.reg.dp = 0x77;
        core.reg.b = 0x88;
        core.reg.a = 0x99;
        core.mem.write_u16(IRQ_VECTOR, 0x8000);
        core.trigger_irq();
        core.step();
        assert_eq!(core.reg.pc, 0x8000);
        // exactly 12 bytes stacked: 4 words then 4 bytes
        assert_eq!(core.reg.s, 0xff00 - 12);
        assert!(core.reg.cc.is_set(CCBit::E));
        assert!(core.reg.cc.is_set(CCBit::I));
        // each word is pushed high byte first, so the low byte lands at
        // the lower address
        assert_eq!(core.mem.read_u8(0xfeff), 0x40); // PC hi
        assert_eq!(core.mem.read_u8(0xfefe), 0x00); // PC lo
        assert_eq!(core.mem.read_u8(0xfefd), 0x11); // U hi
        assert_eq!(core.mem.read_u8(0xfefc), 0x22); // U lo
        assert_eq!(core.mem.read_u8(0xfefb), 0x33); // Y hi
        assert_eq!(core.mem.read_u8(0xfefa), 0x44); // Y lo
        assert_eq!(core.mem.read_u8(0xfef9), 0x55); // X hi
        assert_eq!(core.mem.read_u8(0xfef8), 0x66); // X lo
        assert_eq!(core.mem.read_u8(0xfef7), 0x77); // DP
        assert_eq!(core.mem.read_u8(0xfef6), 0x88); // B
        assert_eq!(core.mem.read_u8(0xfef5), 0x99); // A
        assert_eq!(core.mem.read_u8(0xfef4), 0x80); // CC: only E was set
        // servicing consumed the whole step; no instruction ran
        assert_eq!(core.instructions_executed(), 0);
    }

    #[test]
    fn rti_undoes_interrupt_entry() {
        let mut core = Core::new();
        core.reg.pc = 0x4000;
        core.reg.s = 0xff00;
        core.reg.u = 0x1111;
        core.reg.y = 0x2222;
        core.reg.x = 0x3333;
        core.reg.dp = 0x44;
        core.reg.b = 0x55;
        core.reg.a = 0x66;
        let saved = core.reg;
        core.mem.write_u16(IRQ_VECTOR, 0x8000);
        core.mem.write_u8(0x8000, 0x3b); // RTI
        core.trigger_irq();
        core.step(); // service
        core.step(); // RTI
        assert_eq!(core.reg.pc, saved.pc);
        assert_eq!(core.reg.u, saved.u);
        assert_eq!(core.reg.y, saved.y);
        assert_eq!(core.reg.x, saved.x);
        assert_eq!(core.reg.dp, saved.dp);
        assert_eq!(core.reg.b, saved.b);
        assert_eq!(core.reg.a, saved.a);
        assert_eq!(core.reg.s, saved.s);
        // the stacked CC had E set but not I
        assert!(core.reg.cc.is_set(CCBit::E));
        assert!(!core.reg.cc.is_set(CCBit::I));
    }

    #[test]
    fn cwai_waits_until_interrupt_service() {
        let mut core = Core::new();
        core.reg.pc = 0x4000;
        core.reg.s = 0xff00;
        loader::load_bytes(&mut core.mem, &[0x3c, 0xff, 0x12], 0x4000); // CWAI #$FF ; NOP
        core.mem.write_u16(IRQ_VECTOR, 0x9000);
        core.step();
        assert!(core.waiting_for_interrupt());
        let pc = core.reg.pc;
        core.step();
        core.step();
        assert_eq!(core.reg.pc, pc); // stalled
        core.trigger_irq();
        core.step();
        assert!(!core.waiting_for_interrupt());
        assert_eq!(core.reg.pc, 0x9000);
    }

    #[test]
    fn exchange_and_transfer_registers() {
        let mut core = Core::new();
        core.reg.set_d(0x1234);
        core.reg.x = 0x5678;
        core.exchange_registers(0, 1); // D <-> X
        assert_eq!(core.reg.d(), 0x5678);
        assert_eq!(core.reg.x, 0x1234);
        core.transfer_registers(9, 10); // B -> CC
        assert_eq!(core.reg.cc.as_byte(), core.reg.b);
        // unmapped codes read as zero and absorb writes
        core.transfer_registers(6, 1); // Z -> X
        assert_eq!(core.reg.x, 0);
        let x = core.reg.x;
        core.transfer_registers(1, 7); // X -> Z
        assert_eq!(core.reg.x, x);
    }

    #[test]
    fn addressing_helpers() {
        let mut core = Core::new();
        core.reg.pc = 0x4000;
        core.reg.dp = 0x12;
        core.mem.write_u8(0x4000, 0x34);
        assert_eq!(core.direct_address(), 0x1234);

        core.reg.pc = 0x4100;
        core.reg.x = 0x0010;
        core.mem.write_u8(0x4100, 0xfe); // -2
        assert_eq!(core.indexed_address(), 0x000e);
        assert_eq!(core.last_post_byte(), 0xfe);
        assert_eq!(core.last_effective_address(), 0x000e);

        core.reg.pc = 0x4200;
        core.mem.write_u16(0x4200, 0xabcd);
        assert_eq!(core.extended_address(), 0xabcd);
        assert_eq!(core.last_effective_address(), 0xabcd);
    }

    #[test]
    fn debug_fields_clear_on_non_indexed_instructions() {
        let mut core = Core::new();
        core.reg.pc = 0x4000;
        loader::load_bytes(&mut core.mem, &[0x30, 0x05, 0x12], 0x4000); // LEAX 5,X ; NOP
        core.reg.x = 0x0100;
        core.step();
        assert_eq!(core.reg.x, 0x0105);
        assert_eq!(core.last_effective_address(), 0x0105);
        assert_eq!(core.last_post_byte(), 0x05);
        core.step(); // NOP
        assert_eq!(core.last_effective_address(), 0);
        assert_eq!(core.last_post_byte(), 0);
    }

    #[test]
    fn immediate_arithmetic_flags() {
        let mut core = Core::new();
        core.reg.pc = 0x4000;
        loader::load_bytes(&mut core.mem, &[0x86, 0x05, 0x8b, 0x03, 0x86, 0xff, 0x8b, 0x01], 0x4000);
        core.step(); // LDA #$05
        assert_eq!(core.reg.a, 0x05);
        core.step(); // ADDA #$03
        assert_eq!(core.reg.a, 0x08);
        assert!(!core.reg.cc.is_set(CCBit::Z));
        assert!(!core.reg.cc.is_set(CCBit::N));
        assert!(!core.reg.cc.is_set(CCBit::C));
        assert!(!core.reg.cc.is_set(CCBit::V));
        core.step(); // LDA #$FF
        core.step(); // ADDA #$01
        assert_eq!(core.reg.a, 0x00);
        assert!(core.reg.cc.is_set(CCBit::C));
        assert!(core.reg.cc.is_set(CCBit::Z));
    }

    #[test]
    fn store_direct_uses_direct_page() {
        let mut core = Core::new();
        core.reg.pc = 0x4000;
        core.reg.dp = 0x20;
        core.reg.a = 0x99;
        loader::load_bytes(&mut core.mem, &[0x97, 0x40], 0x4000); // STA direct $40
        core.step();
        assert_eq!(core.mem.read_u8(0x2040), 0x99);
        assert!(core.reg.cc.is_set(CCBit::N));
        assert!(!core.reg.cc.is_set(CCBit::Z));
    }

    #[test]
    fn extended_addressing_instructions() {
        let mut core = Core::new();
        core.reg.pc = 0x4000;
        core.reg.a = 0x5a;
        // STA $1234 ; JMP $4000
        loader::load_bytes(&mut core.mem, &[0xb7, 0x12, 0x34, 0x7e, 0x40, 0x00], 0x4000);
        core.step();
        assert_eq!(core.mem.read_u8(0x1234), 0x5a);
        assert_eq!(core.last_effective_address(), 0x1234);
        assert_eq!(core.last_post_byte(), 0); // extended mode has no post-byte
        core.step();
        assert_eq!(core.reg.pc, 0x4000);
        assert_eq!(core.last_effective_address(), 0x4000);
    }

    #[test]
    fn branch_always_is_pc_relative() {
        let mut core = Core::new();
        core.reg.pc = 0x4000;
        loader::load_bytes(&mut core.mem, &[0x20, 0xfe], 0x4000); // BRA -2 (self)
        core.step();
        assert_eq!(core.reg.pc, 0x4000);
        assert_eq!(core.instructions_executed(), 1);
    }

    #[test]
    fn rts_returns_through_the_stack() {
        let mut core = Core::new();
        core.reg.pc = 0x4000;
        core.reg.s = 0xff00;
        core.push_word(0x1234);
        core.mem.write_u8(0x4000, 0x39); // RTS
        core.step();
        assert_eq!(core.reg.pc, 0x1234);
        assert_eq!(core.reg.s, 0xff00);
    }
}
