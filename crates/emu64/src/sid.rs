//! SID register stub.
//!
//! No voices, no filter: register bytes live in the IO shadow and
//! accesses are trace-logged with their names.

/// SID (6581/8580) stub.
pub struct Sid {
    cycles: u64,
}

impl Sid {
    pub const NAME: &'static str = "SID";

    #[must_use]
    pub fn new() -> Self {
        Self { cycles: 0 }
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

    /// Register read: the IO shadow byte passes through. On hardware
    /// only $19-$1C (paddles, oscillator 3, envelope 3) are readable,
    /// but the stub does not distinguish.
    #[must_use]
    pub fn read_register(&self, address: u16, shadow: u8) -> u8 {
        log::trace!(
            "read {} {} = ${shadow:02X}",
            Self::NAME,
            describe(address)
        );
        shadow
    }

    /// Register write: logged; the bus stores the byte in the IO shadow.
    pub fn write_register(&mut self, address: u16, value: u8) {
        log::trace!(
            "write {} {} = ${value:02X}",
            Self::NAME,
            describe(address)
        );
    }

    /// Symbolic name of a register. The 29 registers mirror through
    /// $D400-$D7FF every 32 bytes.
    #[must_use]
    pub fn register_name(address: u16) -> Option<&'static str> {
        let name = match address & 0x1F {
            0x00 => "voice 1 frequency low",
            0x01 => "voice 1 frequency high",
            0x02 => "voice 1 pulse width low",
            0x03 => "voice 1 pulse width high",
            0x04 => "voice 1 control",
            0x05 => "voice 1 attack/decay",
            0x06 => "voice 1 sustain/release",
            0x07 => "voice 2 frequency low",
            0x08 => "voice 2 frequency high",
            0x09 => "voice 2 pulse width low",
            0x0A => "voice 2 pulse width high",
            0x0B => "voice 2 control",
            0x0C => "voice 2 attack/decay",
            0x0D => "voice 2 sustain/release",
            0x0E => "voice 3 frequency low",
            0x0F => "voice 3 frequency high",
            0x10 => "voice 3 pulse width low",
            0x11 => "voice 3 pulse width high",
            0x12 => "voice 3 control",
            0x13 => "voice 3 attack/decay",
            0x14 => "voice 3 sustain/release",
            0x15 => "filter cutoff low",
            0x16 => "filter cutoff high",
            0x17 => "filter resonance/routing",
            0x18 => "volume and filter mode",
            0x19 => "paddle X",
            0x1A => "paddle Y",
            0x1B => "oscillator 3 readback",
            0x1C => "envelope 3 readback",
            _ => return None,
        };
        Some(name)
    }
}

impl Default for Sid {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(address: u16) -> String {
    match Sid::register_name(address) {
        Some(name) => format!("{name} (${address:04X})"),
        None => format!("${address:04X}"),
    }
}
