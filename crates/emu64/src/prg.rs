//! PRG loading.
//!
//! A PRG file is a two-byte little-endian load address followed by the
//! payload. Loading writes straight into RAM; a BASIC program (load
//! address $0801) also gets the interpreter's program pointers patched
//! so `RUN` works after boot.

use crate::pla::Pla;

/// BASIC program start on a stock machine.
const BASIC_START: u16 = 0x0801;

/// Load a PRG image into RAM. Returns the load address.
pub fn load_prg(pla: &mut Pla, data: &[u8]) -> Result<u16, String> {
    if data.len() < 3 {
        return Err("PRG file too short".to_string());
    }

    let load_addr = u16::from_le_bytes([data[0], data[1]]);
    let payload = &data[2..];

    let end = usize::from(load_addr) + payload.len();
    if end > 0x10000 {
        return Err(format!(
            "PRG does not fit: ${load_addr:04X} + {} bytes runs past $FFFF",
            payload.len()
        ));
    }

    for (i, &byte) in payload.iter().enumerate() {
        pla.ram_write(load_addr + i as u16, byte);
    }

    if load_addr == BASIC_START {
        // Start-of-variables / arrays / free memory all point past the
        // program, as the Kernal's LOAD would leave them.
        let end = end as u16;
        pla.ram_write(0x002D, end as u8);
        pla.ram_write(0x002E, (end >> 8) as u8);
        pla.ram_write(0x002F, end as u8);
        pla.ram_write(0x0030, (end >> 8) as u8);
        pla.ram_write(0x0031, end as u8);
        pla.ram_write(0x0032, (end >> 8) as u8);
        // Kernal load-end pointer.
        pla.ram_write(0x00AE, end as u8);
        pla.ram_write(0x00AF, (end >> 8) as u8);
    }

    Ok(load_addr)
}
