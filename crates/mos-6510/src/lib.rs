//! Cycle-accurate MOS 6510 CPU emulator.
//!
//! The 6510 is the NMOS 6502 core as shipped in the Commodore 64. It
//! performs one bus access per cycle; each `tick()` advances exactly one
//! cycle, and the CPU tracks its internal state between cycles. The
//! 6510's on-chip I/O port lives at $0000/$0001 in the address space and
//! is decoded by the memory subsystem, not in here.
//!
//! Only documented opcodes are implemented. Fetching any other byte halts
//! the CPU, which from then on reports [`emu64_core::StepResult::Halted`].

mod cpu;
mod flags;
mod opcodes;
mod registers;

pub use cpu::Mos6510;
pub use flags::Status;
pub use opcodes::{AddrMode, Mnemonic, decode};
pub use registers::Registers;

pub mod flag {
    //! Status flag bit masks.
    pub use crate::flags::{B, C, D, I, N, U, V, Z};
}
