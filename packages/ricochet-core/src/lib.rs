//! Emulator core for the Ricoh 2A03, the MOS 6502 derivative inside the NES.
//!
//! The crate models the CPU, its memory bus, and a mapper-0 cartridge -- just
//! enough hardware to run nestest in its automated, self-checking mode. There
//! is no PPU, APU, or interrupt plumbing here.

#[macro_use]
extern crate bitflags;

pub mod devices;
