//! CIA register stub.
//!
//! The C64 carries two 6526s: CIA1 at $DC00 (keyboard, joysticks, IRQ
//! timers) and CIA2 at $DD00 (VIC bank, serial bus, NMI timers). Here
//! both are inert: sixteen register bytes in the IO shadow, trace-logged
//! by instance name on access.

/// One CIA 6526 instance.
pub struct Cia {
    name: &'static str,
    cycles: u64,
}

impl Cia {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self { name, cycles: 0 }
    }

    /// Instance name for tracing ("CIA1" / "CIA2").
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Advance one CPU cycle.
    pub fn tick(&mut self) {
        self.cycles += 1;
    }

    /// Cycles ticked so far.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Register read: the IO shadow byte passes through.
    #[must_use]
    pub fn read_register(&self, address: u16, shadow: u8) -> u8 {
        log::trace!(
            "read {} {} = ${shadow:02X}",
            self.name,
            describe(address)
        );
        shadow
    }

    /// Register write: logged; the bus stores the byte in the IO shadow.
    pub fn write_register(&mut self, address: u16, value: u8) {
        log::trace!(
            "write {} {} = ${value:02X}",
            self.name,
            describe(address)
        );
    }

    /// Symbolic register name. The sixteen registers mirror through the
    /// whole page every 16 bytes.
    #[must_use]
    pub fn register_name(address: u16) -> Option<&'static str> {
        Some(match address & 0x0F {
            0x00 => "port A data",
            0x01 => "port B data",
            0x02 => "port A direction",
            0x03 => "port B direction",
            0x04 => "timer A low",
            0x05 => "timer A high",
            0x06 => "timer B low",
            0x07 => "timer B high",
            0x08 => "TOD tenths",
            0x09 => "TOD seconds",
            0x0A => "TOD minutes",
            0x0B => "TOD hours",
            0x0C => "serial data",
            0x0D => "interrupt control",
            0x0E => "control register A",
            _ => "control register B",
        })
    }
}

fn describe(address: u16) -> String {
    match Cia::register_name(address) {
        Some(name) => format!("{name} (${address:04X})"),
        None => format!("${address:04X}"),
    }
}
