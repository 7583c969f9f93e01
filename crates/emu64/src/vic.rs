//! VIC-II register stub.
//!
//! Holds no video state: register bytes live in the PLA's IO shadow and
//! pass straight through. Accesses are trace-logged with the register
//! name so boot activity can be followed without a rasterizer.

/// VIC-II (6569/6567) stub.
pub struct Vic {
    /// Cycles ticked since power-on.
    cycles: u64,
}

impl Vic {
    pub const NAME: &'static str = "VIC";

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

    /// Register read: the IO shadow byte passes through.
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

    /// Symbolic name of a register, if the offset maps to one.
    ///
    /// Registers mirror through the whole $D000-$D3FF window every 64
    /// bytes.
    #[must_use]
    pub fn register_name(address: u16) -> Option<&'static str> {
        let name = match address & 0x3F {
            0x00 => "sprite 0 X position",
            0x01 => "sprite 0 Y position",
            0x02 => "sprite 1 X position",
            0x03 => "sprite 1 Y position",
            0x04 => "sprite 2 X position",
            0x05 => "sprite 2 Y position",
            0x06 => "sprite 3 X position",
            0x07 => "sprite 3 Y position",
            0x08 => "sprite 4 X position",
            0x09 => "sprite 4 Y position",
            0x0A => "sprite 5 X position",
            0x0B => "sprite 5 Y position",
            0x0C => "sprite 6 X position",
            0x0D => "sprite 6 Y position",
            0x0E => "sprite 7 X position",
            0x0F => "sprite 7 Y position",
            0x10 => "sprite X position MSBs",
            0x11 => "control register 1",
            0x12 => "raster counter",
            0x13 => "light pen X",
            0x14 => "light pen Y",
            0x15 => "sprite enable",
            0x16 => "control register 2",
            0x17 => "sprite Y expansion",
            0x18 => "memory pointers",
            0x19 => "interrupt register",
            0x1A => "interrupt enable",
            0x1B => "sprite data priority",
            0x1C => "sprite multicolour",
            0x1D => "sprite X expansion",
            0x1E => "sprite-sprite collision",
            0x1F => "sprite-data collision",
            0x20 => "border colour",
            0x21 => "background colour 0",
            0x22 => "background colour 1",
            0x23 => "background colour 2",
            0x24 => "background colour 3",
            0x25 => "sprite multicolour 0",
            0x26 => "sprite multicolour 1",
            0x27 => "sprite 0 colour",
            0x28 => "sprite 1 colour",
            0x29 => "sprite 2 colour",
            0x2A => "sprite 3 colour",
            0x2B => "sprite 4 colour",
            0x2C => "sprite 5 colour",
            0x2D => "sprite 6 colour",
            0x2E => "sprite 7 colour",
            _ => return None,
        };
        Some(name)
    }
}

impl Default for Vic {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(address: u16) -> String {
    match Vic::register_name(address) {
        Some(name) => format!("{name} (${address:04X})"),
        None => format!("${address:04X}"),
    }
}
