//! Boot test against real C64 ROM images.
//!
//! Ignored by default: needs kernal/basic/chargen images on the search
//! path (see `roms::RomSet::load`). The Kernal's power-on banner is
//! printed synchronously from the reset path, so it appears in screen
//! RAM without any raster or timer interrupts.

use emu64::{C64, C64Config, RomSet};

/// Screen codes for "READY."
const READY: [u8; 6] = [18, 5, 1, 4, 25, 46];

#[test]
#[ignore] // Requires real C64 ROMs
fn boots_to_ready_prompt() {
    let roms = RomSet::load().expect("C64 ROM images on the search path");
    let mut c64 = C64::new(&C64Config::stock(roms.kernal, roms.basic, roms.chargen))
        .expect("valid ROM sizes");

    println!("reset: PC=${:04X}", c64.cpu().regs.pc);

    let max_frames = 200;
    for frame in 0..max_frames {
        c64.run_frame();
        if c64.cpu().is_halted() {
            panic!("CPU halted at ${:04X} during boot", c64.cpu().regs.pc);
        }
        if screen_contains(&c64, &READY) {
            println!("READY. after {frame} frames ({} cycles)", c64.master_clock());
            return;
        }
    }

    panic!("no READY. prompt within {max_frames} frames");
}

/// Scan screen RAM ($0400-$07E7) for a screen-code sequence.
fn screen_contains(c64: &C64, needle: &[u8]) -> bool {
    let ram = c64.dump_ram();
    ram[0x0400..0x07E8]
        .windows(needle.len())
        .any(|window| window == needle)
}
