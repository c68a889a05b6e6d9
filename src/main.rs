//! # A MC6809 execution-core simulator and machine-language monitor.
//!
//! ## Getting Started
//! To load a raw binary image at 0x8000 and run it:
//! ```
//! cargo run -- -l 0x8000 /path/to/program.bin
//! ```
//! Programs can also be given as whitespace-separated hex bytes:
//! ```
//! sim6809 -l 0x8000 -t /path/to/program.hex
//! ```
//! ## Options
//! Help for command line options is available using -h or --help.
#[macro_use]
mod macros;
mod config;
mod core;
mod device;
mod error;
mod instructions;
mod loader;
mod memory;
mod registers;

use crate::core::Core;
use crate::device::Keyboard;
use crate::error::Error;
use std::path::Path;
use std::result::Result;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    if let Err(e) = run_file(config::ARGS.file.as_str()) {
        println!("{}", e);
        return Err(Box::new(e));
    }
    Ok(())
}

/// run_file drives the top level functionality (load, run, report) of the monitor
fn run_file(filename: &str) -> Result<(), Error> {
    log::debug!("instruction set: {} opcodes registered", instructions::count());
    let mut core = Core::new();
    let kbd = if config::ARGS.kbd_disable {
        None
    } else {
        Some(core.attach_device(Box::new(Keyboard::new(config::ARGS.kbd_addr))))
    };
    core.reset();
    loader::load_file(&mut core.mem, Path::new(filename), config::ARGS.load_addr)?;
    core.reg.pc = config::ARGS.start.unwrap_or(config::ARGS.load_addr);
    if let Some(stack) = config::ARGS.stack {
        core.reg.s = stack;
    }
    if let Some(handler) = config::ARGS.irq {
        core.write_u16(crate::core::IRQ_VECTOR, handler);
    }
    for bp in &config::ARGS.breakpoint {
        core.add_breakpoint(*bp);
    }
    let keys: Vec<u8> = config::ARGS.keys.clone().unwrap_or_default().into_bytes();
    let mut next_key = 0usize;
    let status_addr = config::ARGS.kbd_addr.wrapping_add(1);

    loop {
        if core.halted {
            break;
        }
        if core.breakpoints().contains(&core.reg.pc) {
            println!(yellow!("stopped at breakpoint {:04x}"), core.reg.pc);
            break;
        }
        if config::ARGS.max_steps > 0 && core.instructions_executed() >= config::ARGS.max_steps {
            println!(yellow!("step limit reached ({} instructions)"), config::ARGS.max_steps);
            break;
        }
        // type the next pending key once the program has consumed the last one
        if let Some(kbd) = kbd {
            if next_key < keys.len() && core.mem.read_u8(status_addr) == 0 {
                core.device_input(kbd, keys[next_key]);
                next_key += 1;
            }
        }
        if core.waiting_for_interrupt() && !core.irq_pending() {
            println!(yellow!("waiting for interrupt with no input pending"));
            break;
        }
        let temp_pc = core.reg.pc;
        let trace_op = if config::ARGS.trace {
            // peek raw memory so disassembly does not consume device ports
            let mut op = core.mem.read_u8(temp_pc) as u16;
            if instructions::is_page_prefix(op as u8) {
                op = op << 8 | core.mem.read_u8(temp_pc.wrapping_add(1)) as u16;
            }
            Some(op)
        } else {
            None
        };
        let before = core.instructions_executed();
        core.step();
        if let Some(op) = trace_op {
            if core.instructions_executed() > before {
                print!(
                    "{:04x}: {:10} [{} ({})]",
                    temp_pc,
                    instructions::name(op),
                    core.reg,
                    core.reg.cc
                );
                if core.last_effective_address() != 0 {
                    print!(" ea:{:04x} pb:{:02x}", core.last_effective_address(), core.last_post_byte());
                }
                println!();
            }
        }
    }

    if let Some(fault) = core.fault().copied() {
        return Err(runtime_err!(
            Some(core.reg),
            "unknown opcode {:02X} at {:04X}",
            fault.opcode,
            fault.addr
        ));
    }
    println!("{} ({})", core.reg, core.reg.cc);
    let names = core.reg.cc.set_bit_names();
    if !names.is_empty() {
        println!("flags set: {}", names.join(", "));
    }
    println!("executed {} instructions", core.instructions_executed());
    Ok(())
}
