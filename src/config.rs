use clap::Parser;
use clap_num::maybe_hex;
use lazy_static::lazy_static;

#[derive(Parser, Debug)]
#[command(author,version,about,long_about=None)]
pub struct Args {
    /// Binary (.bin) or hex text (.hex) program file to load and run
    pub file: String,

    /// Address at which to load the program (hex ok with '0x')
    #[arg(short, long, value_parser=maybe_hex::<u16>, default_value_t=0x0000_u16)]
    pub load_addr: u16,

    /// Override the initial program counter (defaults to the load address)
    #[arg(long, value_parser=maybe_hex::<u16>)]
    pub start: Option<u16>,

    /// Override the initial system stack pointer
    #[arg(long, value_parser=maybe_hex::<u16>)]
    pub stack: Option<u16>,

    /// Stall execution when PC reaches this address (may be repeated)
    #[arg(short, long, value_parser=maybe_hex::<u16>)]
    pub breakpoint: Vec<u16>,

    /// Disable keyboard emulation
    #[arg(long)]
    pub kbd_disable: bool,

    /// Address at which to map the keyboard data port (status port follows)
    #[arg(long, value_parser=maybe_hex::<u16>, default_value_t=crate::device::KEYBOARD_ADDR)]
    pub kbd_addr: u16,

    /// Install this address as the IRQ service vector
    #[arg(long, value_parser=maybe_hex::<u16>)]
    pub irq: Option<u16>,

    /// Feed these characters to the keyboard as the program consumes them
    #[arg(short, long)]
    pub keys: Option<String>,

    /// Stop after this many instructions (0 = no limit)
    #[arg(long, default_value_t = 0)]
    pub max_steps: u64,

    /// Trace each machine instruction as it is executed
    #[arg(short, long)]
    pub trace: bool,
}

lazy_static! {
    pub static ref ARGS: Args = if cfg!(test) {
        // manually set parameters for running tests
        Args::parse_from(["test", "test"])
    } else {
        Args::parse()
    };
}
