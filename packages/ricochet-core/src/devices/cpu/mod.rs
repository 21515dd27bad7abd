//! Emulator for the MOS 6502
//!
//! This does not include support for Binary Coded Decimal, which was omitted
//! on the 2A03 variant used on the NES and Famicom. The decimal flag can be
//! set and cleared, but arithmetic ignores it.

mod cpu;
mod opcodes;
mod structs;
mod trace;

pub use cpu::Cpu6502;
pub use opcodes::{decode, Mnemonic, Opcode, OPCODE_TABLE};
pub use structs::{AddressingMode, CpuState, Status, POWERON_CPU_STATE};
