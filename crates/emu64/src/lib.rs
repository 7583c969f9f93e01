//! Cycle-driven Commodore 64 execution core.
//!
//! Covers the 6510 CPU, the PLA address decoder with its RAM/ROM/IO
//! backing stores, and inert register stubs for the VIC-II, SID and the
//! two CIAs. Video rasterization, audio and CIA timer semantics live
//! outside this crate; only their register-access contract is honoured.

mod bus;
mod c64;
mod cia;
mod config;
pub mod input;
mod pla;
pub mod prg;
pub mod roms;
mod sid;
pub mod t64;
mod vic;

pub use bus::C64Bus;
pub use c64::C64;
pub use cia::Cia;
pub use config::{C64Config, C64Model};
pub use pla::{Pla, Target};
pub use roms::{RomError, RomSet};
pub use sid::Sid;
pub use vic::Vic;
