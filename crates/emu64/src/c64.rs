//! Top-level C64 system.
//!
//! One master clock tick is one CPU cycle (985,248 Hz on PAL). Per tick:
//! the CPU performs its cycle against the bus, then every chip stub
//! ticks once, in a fixed order. Interrupt lines and injected input are
//! only sampled between instructions, so stepping is deterministic.

use emu64_core::{Bus, Cpu, Observable, StepResult, Tickable, Value};
use mos_6510::Mos6510;

use crate::bus::C64Bus;
use crate::config::{C64Config, C64Model};
use crate::input::{KEYBOARD_BUFFER, KEYBOARD_COUNT, KeyQueue};
use crate::pla::Pla;
use crate::roms::{self, RomError};

/// C64 system: CPU, bus, master clock and host-facing surface.
pub struct C64 {
    cpu: Mos6510,
    bus: C64Bus,
    /// Model variant; fixes the clock rates and frame geometry.
    model: C64Model,
    /// Master clock: counts CPU cycles.
    master_clock: u64,
    /// Stops `run` between instructions; stepping stays available.
    paused: bool,
    keys: KeyQueue,
}

impl C64 {
    /// Build a machine from the given configuration.
    ///
    /// Fails when a ROM image has the wrong size; a machine without its
    /// ROMs cannot start.
    pub fn new(config: &C64Config) -> Result<Self, RomError> {
        roms::check_size("Kernal", &config.kernal_rom, 8192)?;
        roms::check_size("BASIC", &config.basic_rom, 8192)?;
        roms::check_size("Character", &config.char_rom, 4096)?;

        let mut pla = Pla::new(
            &config.kernal_rom,
            &config.basic_rom,
            &config.char_rom,
            config.game_pin,
            config.exrom_pin,
        );
        if let Some(ref image) = config.cartridge_rom {
            pla.load_cartridge(image);
        }

        let mut c64 = Self {
            cpu: Mos6510::new(),
            bus: C64Bus::new(pla),
            model: config.model,
            master_clock: 0,
            paused: false,
            keys: KeyQueue::new(),
        };
        c64.load_reset_vector();
        Ok(c64)
    }

    /// Reset the CPU and reload PC from the vector at $FFFC/$FFFD.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.load_reset_vector();
    }

    fn load_reset_vector(&mut self) {
        let lo = self.bus.read(0xFFFC);
        let hi = self.bus.read(0xFFFD);
        self.cpu.regs.pc = u16::from(lo) | (u16::from(hi) << 8);
    }

    /// Run one full instruction (or injected interrupt sequence).
    ///
    /// Pending key injection is delivered first, then cycles are stepped
    /// until the CPU reaches the next fetch boundary.
    pub fn step_instruction(&mut self) -> StepResult {
        self.pump_input();
        loop {
            self.master_clock += 1;
            let result = self.cpu.tick(&mut self.bus);
            self.bus.tick_peripherals();
            if result == StepResult::Halted {
                return StepResult::Halted;
            }
            if self.cpu.is_instruction_complete() {
                return StepResult::Ok;
            }
        }
    }

    /// Run up to `max_instructions`, honouring the pause flag between
    /// instructions. Returns `Halted` if the CPU stopped.
    pub fn run(&mut self, max_instructions: u64) -> StepResult {
        for _ in 0..max_instructions {
            if self.paused {
                return StepResult::Ok;
            }
            if self.step_instruction() == StepResult::Halted {
                return StepResult::Halted;
            }
        }
        StepResult::Ok
    }

    /// Run one video frame's worth of cycles (instruction-granular).
    ///
    /// Returns the number of cycles actually executed.
    pub fn run_frame(&mut self) -> u64 {
        let budget = self.model.cycles_per_frame();
        let start = self.master_clock;
        while self.master_clock - start < budget {
            if self.paused || self.step_instruction() == StepResult::Halted {
                break;
            }
        }
        self.master_clock - start
    }

    /// Pause or resume `run`. Takes effect at instruction boundaries.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Inject one key the way the Kernal's interrupt handler would:
    /// the PETSCII byte lands at $0277 and the count at $00C6.
    pub fn inject_key(&mut self, petscii: u8) {
        self.bus.pla.ram_write(KEYBOARD_BUFFER, petscii);
        self.bus.pla.ram_write(KEYBOARD_COUNT, 1);
    }

    /// Queue text for injection; delivered one byte at a time whenever
    /// the Kernal has drained its buffer.
    pub fn type_text(&mut self, text: &str) {
        self.keys.push_text(text);
    }

    fn pump_input(&mut self) {
        if self.keys.is_empty() || self.bus.pla.ram_read(KEYBOARD_COUNT) != 0 {
            return;
        }
        if let Some(byte) = self.keys.pop() {
            self.inject_key(byte);
        }
    }

    /// Load a PRG image into RAM. Returns the load address.
    pub fn load_prg(&mut self, data: &[u8]) -> Result<u16, String> {
        crate::prg::load_prg(&mut self.bus.pla, data)
    }

    /// The 64 KiB RAM image (straight dump, no banking applied).
    #[must_use]
    pub fn dump_ram(&self) -> &[u8; 0x10000] {
        self.bus.pla.ram()
    }

    /// Reference to the CPU.
    #[must_use]
    pub fn cpu(&self) -> &Mos6510 {
        &self.cpu
    }

    /// Mutable reference to the CPU.
    pub fn cpu_mut(&mut self) -> &mut Mos6510 {
        &mut self.cpu
    }

    /// Reference to the bus.
    #[must_use]
    pub fn bus(&self) -> &C64Bus {
        &self.bus
    }

    /// Mutable reference to the bus.
    pub fn bus_mut(&mut self) -> &mut C64Bus {
        &mut self.bus
    }

    /// Model variant the machine was built as.
    #[must_use]
    pub fn model(&self) -> C64Model {
        self.model
    }

    /// Master clock tick count (CPU cycles).
    #[must_use]
    pub fn master_clock(&self) -> u64 {
        self.master_clock
    }

    /// Raise the IRQ line (sampled between instructions).
    pub fn interrupt(&mut self) -> bool {
        self.cpu.interrupt()
    }

    /// Raise the NMI line.
    pub fn nmi(&mut self) {
        self.cpu.nmi();
    }
}

impl Tickable for C64 {
    fn tick(&mut self) {
        self.master_clock += 1;
        let _ = self.cpu.tick(&mut self.bus);
        self.bus.tick_peripherals();
    }
}

impl Observable for C64 {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.cpu.query(rest)
        } else if let Some(rest) = path.strip_prefix("memory.") {
            let addr = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X"))
            {
                u16::from_str_radix(hex, 16).ok()
            } else if let Some(hex) = rest.strip_prefix('$') {
                u16::from_str_radix(hex, 16).ok()
            } else {
                rest.parse().ok()
            };
            addr.map(|a| Value::U8(self.bus.pla.peek(a)))
        } else {
            match path {
                "master_clock" => Some(self.master_clock.into()),
                "paused" => Some(self.paused.into()),
                "configuration" => Some(self.bus.pla.configuration().into()),
                _ => self.cpu.query(path),
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "cpu.<6510 paths>",
            "memory.<address>",
            "master_clock",
            "paused",
            "configuration",
        ]
    }
}
