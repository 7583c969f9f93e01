//! C64 configuration: model timing, ROM images and cartridge pins.

/// C64 model variant.
///
/// The VIC-II derives every clock on the board from one crystal: the
/// dot clock is divided by eight to produce the CPU phi-2 clock, so the
/// two are phase-locked at a fixed 8:1 ratio on both models. What
/// differs between PAL and NTSC is the base rate and the raster
/// geometry the VIC-II walks per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum C64Model {
    /// PAL (6569 VIC-II): 985,248 Hz CPU, 312 lines x 63 cycles.
    Pal,
    /// NTSC (6567 VIC-II): 1,022,727 Hz CPU, 263 lines x 65 cycles.
    Ntsc,
}

impl C64Model {
    /// CPU phi-2 clock rate in Hz.
    #[must_use]
    pub const fn cpu_hz(self) -> u64 {
        match self {
            C64Model::Pal => 985_248,
            C64Model::Ntsc => 1_022_727,
        }
    }

    /// VIC-II dot clock in Hz: always eight pixels per CPU cycle.
    #[must_use]
    pub const fn dot_clock_hz(self) -> u64 {
        self.cpu_hz() * 8
    }

    /// Raster lines per frame.
    #[must_use]
    pub const fn raster_lines(self) -> u64 {
        match self {
            C64Model::Pal => 312,
            C64Model::Ntsc => 263,
        }
    }

    /// CPU cycles per raster line.
    #[must_use]
    pub const fn cycles_per_line(self) -> u64 {
        match self {
            C64Model::Pal => 63,
            C64Model::Ntsc => 65,
        }
    }

    /// CPU cycles in one video frame (19,656 on PAL, ~50.12 Hz).
    #[must_use]
    pub const fn cycles_per_frame(self) -> u64 {
        self.raster_lines() * self.cycles_per_line()
    }
}

/// Configuration for constructing a [`crate::C64`] instance.
pub struct C64Config {
    /// Model variant (clock rates and frame geometry).
    pub model: C64Model,
    /// Kernal ROM (8,192 bytes).
    pub kernal_rom: Vec<u8>,
    /// BASIC ROM (8,192 bytes).
    pub basic_rom: Vec<u8>,
    /// Character ROM (4,096 bytes).
    pub char_rom: Vec<u8>,
    /// GAME cartridge pin; 1 (true) with no cartridge present.
    pub game_pin: bool,
    /// EXROM cartridge pin; 1 (true) with no cartridge present.
    pub exrom_pin: bool,
    /// Optional cartridge image, loaded into the ROM shadow at $8000.
    pub cartridge_rom: Option<Vec<u8>>,
}

impl C64Config {
    /// Configuration for a stock PAL machine: the three system ROMs, no
    /// cartridge, both pins pulled high.
    #[must_use]
    pub fn stock(kernal_rom: Vec<u8>, basic_rom: Vec<u8>, char_rom: Vec<u8>) -> Self {
        Self {
            model: C64Model::Pal,
            kernal_rom,
            basic_rom,
            char_rom,
            game_pin: true,
            exrom_pin: true,
            cartridge_rom: None,
        }
    }
}
