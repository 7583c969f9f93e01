//! C64 bus: memory and I/O routing.
//!
//! Implements `emu64_core::Bus`. Every CPU access goes through the PLA;
//! when the decoder resolves into the I/O window the chip stub mapped at
//! that page is notified as well. Routing is entirely the bus's job -
//! the CPU never knows which peripheral sits where.

use emu64_core::Bus;

use crate::cia::Cia;
use crate::pla::{Pla, Target};
use crate::sid::Sid;
use crate::vic::Vic;

/// The C64 bus. Owns the PLA and all four chip stubs.
pub struct C64Bus {
    pub pla: Pla,
    pub vic: Vic,
    pub sid: Sid,
    pub cia1: Cia,
    pub cia2: Cia,
}

impl C64Bus {
    #[must_use]
    pub fn new(pla: Pla) -> Self {
        Self {
            pla,
            vic: Vic::new(),
            sid: Sid::new(),
            cia1: Cia::new("CIA1"),
            cia2: Cia::new("CIA2"),
        }
    }

    /// Advance every peripheral by one CPU cycle, in a fixed order,
    /// after the CPU's own cycle effects.
    pub fn tick_peripherals(&mut self) {
        self.vic.tick();
        self.sid.tick();
        self.cia1.tick();
        self.cia2.tick();
    }
}

impl Bus for C64Bus {
    fn read(&mut self, address: u16) -> u8 {
        let (target, _) = self.pla.decode(address);
        let value = self.pla.read(address);

        if target == Target::Io {
            match address {
                0xD000..=0xD3FF => self.vic.read_register(address, value),
                0xD400..=0xD7FF => self.sid.read_register(address, value),
                // Colour RAM and the expansion areas: plain shadow bytes.
                0xD800..=0xDBFF | 0xDE00..=0xDFFF => value,
                0xDC00..=0xDCFF => self.cia1.read_register(address, value),
                0xDD00..=0xDDFF => self.cia2.read_register(address, value),
                _ => value,
            }
        } else {
            value
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        let (target, writable) = self.pla.decode(address);
        if !writable {
            // ROM in this configuration: the write disappears.
            return;
        }

        self.pla.write(address, value);

        if target == Target::Io {
            match address {
                0xD000..=0xD3FF => self.vic.write_register(address, value),
                0xD400..=0xD7FF => self.sid.write_register(address, value),
                0xDC00..=0xDCFF => self.cia1.write_register(address, value),
                0xDD00..=0xDDFF => self.cia2.write_register(address, value),
                _ => {}
            }
        }
    }
}
