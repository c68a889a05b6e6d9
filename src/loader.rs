//! Program image loading.
//!
//! Loaders write straight into raw memory and never validate that an image
//! fits below the top of the address space; addresses simply wrap. Byte
//! counts are reported through the log facade so the loader stays silent
//! unless the host installs a logger.
use crate::error::{Error, ErrorKind};
use crate::memory::Memory;
use log::info;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

/// Copies bytes into memory starting at the given address.
pub fn load_bytes(mem: &mut Memory, bytes: &[u8], base: u16) -> usize {
    let mut addr = base;
    for &byte in bytes {
        mem.write_u8(addr, byte);
        addr = addr.wrapping_add(1);
    }
    info!("loaded {} bytes at {:04X}", bytes.len(), base);
    bytes.len()
}

/// Parses a whitespace-separated string of hex byte tokens and loads the
/// bytes sequentially at the given address.
pub fn load_hex_str(mem: &mut Memory, text: &str, base: u16) -> Result<usize, Error> {
    let mut bytes = Vec::new();
    for token in text.split_whitespace() {
        let byte = u8::from_str_radix(token, 16).map_err(|_| {
            Error::new(
                ErrorKind::Loader,
                None,
                format!("invalid hex byte \"{}\"", token).as_str(),
            )
        })?;
        bytes.push(byte);
    }
    Ok(load_bytes(mem, &bytes, base))
}

/// Loads a program file, dispatching on the extension:
/// `.bin` as a raw image, `.hex` as whitespace-separated hex bytes.
pub fn load_file(mem: &mut Memory, path: &Path, base: u16) -> Result<usize, Error> {
    let ext = path.extension().and_then(OsStr::to_str).unwrap_or("");
    match ext.to_ascii_lowercase().as_str() {
        "bin" => {
            let bytes = fs::read(path)?;
            Ok(load_bytes(mem, &bytes, base))
        }
        "hex" => {
            let text = fs::read_to_string(path)?;
            load_hex_str(mem, &text, base)
        }
        _ => Err(general_err!("unrecognized file type")),
    }
}
