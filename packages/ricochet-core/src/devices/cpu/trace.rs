//! The nestest-format trace line.
//!
//! One line per instruction, rendered from the state *before* the opcode
//! fetch, in the fixed-column layout the nestest reference log uses (minus
//! its PPU and CYC columns). Everything goes through `peek` so tracing can
//! never disturb emulation.

use super::cpu::Cpu6502;
use super::opcodes::{decode, Mnemonic};
use super::structs::AddressingMode;
use crate::devices::bus::Bus;
use std::fmt::Write;

fn peek16_zp(bus: &Bus, ptr: u8) -> u16 {
    // zero-page pointers wrap at $FF
    let lo = bus.peek(u16::from(ptr));
    let hi = bus.peek(u16::from(ptr.wrapping_add(1)));
    u16::from_le_bytes([lo, hi])
}

impl Cpu6502 {
    /// Format the instruction at the current program counter as a nestest
    /// log line.
    pub fn trace(&self, bus: &Bus) -> String {
        let pc = self.state.pc;
        let row = decode(bus.peek(pc));

        let mut bytecodes = String::new();
        for i in 0..u16::from(row.len) {
            write!(bytecodes, "{:02X} ", bus.peek(pc.wrapping_add(i))).unwrap();
        }

        let name = format!(
            "{}{:?}",
            if row.illegal { '*' } else { ' ' },
            row.mnemonic
        );

        let operand = bus.peek(pc.wrapping_add(1));
        let operand16 = bus.peek16(pc.wrapping_add(1));

        let args = match row.mode {
            AddressingMode::Impl => String::new(),
            AddressingMode::Accum => String::from("A"),
            AddressingMode::Imm => format!("#${:02X}", operand),
            AddressingMode::ZP => {
                format!("${:02X} = {:02X}", operand, bus.peek(u16::from(operand)))
            }
            AddressingMode::ZPX => {
                let ea = operand.wrapping_add(self.state.x);
                format!(
                    "${:02X},X @ {:02X} = {:02X}",
                    operand,
                    ea,
                    bus.peek(u16::from(ea))
                )
            }
            AddressingMode::ZPY => {
                let ea = operand.wrapping_add(self.state.y);
                format!(
                    "${:02X},Y @ {:02X} = {:02X}",
                    operand,
                    ea,
                    bus.peek(u16::from(ea))
                )
            }
            AddressingMode::Rel => {
                // branch target: past the 2-byte instruction, plus the offset
                let target = pc.wrapping_add(2).wrapping_add(operand as i8 as u16);
                format!("${:04X}", target)
            }
            AddressingMode::Abs => {
                let is_jump =
                    row.mnemonic == Mnemonic::JMP || row.mnemonic == Mnemonic::JSR;
                if is_jump {
                    format!("${:04X}", operand16)
                } else {
                    format!("${:04X} = {:02X}", operand16, bus.peek(operand16))
                }
            }
            AddressingMode::AbsX => {
                let ea = operand16.wrapping_add(u16::from(self.state.x));
                format!(
                    "${:04X},X @ {:04X} = {:02X}",
                    operand16,
                    ea,
                    bus.peek(ea)
                )
            }
            AddressingMode::AbsY => {
                let ea = operand16.wrapping_add(u16::from(self.state.y));
                format!(
                    "${:04X},Y @ {:04X} = {:02X}",
                    operand16,
                    ea,
                    bus.peek(ea)
                )
            }
            AddressingMode::AbsInd => {
                let target = if operand16 & 0x00FF == 0x00FF {
                    let lo = bus.peek(operand16);
                    let hi = bus.peek(operand16 & 0xFF00);
                    u16::from_le_bytes([lo, hi])
                } else {
                    bus.peek16(operand16)
                };
                format!("(${:04X}) = {:04X}", operand16, target)
            }
            AddressingMode::IndX => {
                let ptr = operand.wrapping_add(self.state.x);
                let ea = peek16_zp(bus, ptr);
                format!(
                    "(${:02X},X) @ {:02X} = {:04X} = {:02X}",
                    operand,
                    ptr,
                    ea,
                    bus.peek(ea)
                )
            }
            AddressingMode::IndY => {
                let base = peek16_zp(bus, operand);
                let ea = base.wrapping_add(u16::from(self.state.y));
                format!(
                    "(${:02X}),Y = {:04X} @ {:04X} = {:02X}",
                    operand,
                    base,
                    ea,
                    bus.peek(ea)
                )
            }
        };

        format!(
            "{:04X}  {:<9}{:<4} {:<27} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X}",
            pc,
            bytecodes,
            name,
            args,
            self.state.acc,
            self.state.x,
            self.state.y,
            self.state.status.bits(),
            self.state.stack
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::cartridge::from_rom;

    fn cpu_with_program(program: &[u8]) -> (Cpu6502, Bus) {
        let mut image = vec![0u8; 16 + 0x4000 + 0x2000];
        image[0..4].copy_from_slice(b"NES\x1A");
        image[4] = 1;
        image[5] = 1;
        image[16..16 + program.len()].copy_from_slice(program);
        let cart = from_rom(&image).expect("synthetic image should parse");
        (Cpu6502::new(), Bus::new(cart))
    }

    #[test]
    fn formats_an_absolute_jump() {
        let (cpu, bus) = cpu_with_program(&[0x4C, 0xF5, 0xC5]);
        assert_eq!(
            cpu.trace(&bus),
            "C000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD"
        );
    }

    #[test]
    fn formats_an_immediate_load() {
        let (cpu, bus) = cpu_with_program(&[0xA9, 0x05]);
        assert_eq!(
            cpu.trace(&bus),
            "C000  A9 05     LDA #$05                        A:00 X:00 Y:00 P:24 SP:FD"
        );
    }

    #[test]
    fn formats_an_implied_instruction() {
        let (cpu, bus) = cpu_with_program(&[0xEA]);
        assert_eq!(
            cpu.trace(&bus),
            "C000  EA        NOP                             A:00 X:00 Y:00 P:24 SP:FD"
        );
    }

    #[test]
    fn stars_illegal_mnemonics() {
        // *NOP $A9
        let (cpu, bus) = cpu_with_program(&[0x04, 0xA9]);
        assert_eq!(
            cpu.trace(&bus),
            "C000  04 A9    *NOP $A9 = 00                    A:00 X:00 Y:00 P:24 SP:FD"
        );
    }

    #[test]
    fn zero_page_shows_the_current_memory_value() {
        let (cpu, mut bus) = cpu_with_program(&[0xA5, 0x33]);
        bus.write(0x0033, 0xAA);
        let line = cpu.trace(&bus);
        assert!(line.contains("LDA $33 = AA"), "line was: {}", line);
    }

    #[test]
    fn relative_shows_the_branch_target() {
        // BCS -2 from $C000: target = $C002 - 2
        let (cpu, bus) = cpu_with_program(&[0xB0, 0xFE]);
        let line = cpu.trace(&bus);
        assert!(line.contains("BCS $C000"), "line was: {}", line);
    }

    #[test]
    fn indirect_jmp_shows_the_bug_adjusted_target() {
        let (cpu, mut bus) = cpu_with_program(&[0x6C, 0xFF, 0x02]);
        bus.write(0x02FF, 0x34);
        bus.write(0x0200, 0x12);
        bus.write(0x0300, 0x56);
        let line = cpu.trace(&bus);
        assert!(line.contains("JMP ($02FF) = 1234"), "line was: {}", line);
    }

    #[test]
    fn indirect_y_shows_base_and_final_address() {
        let (mut cpu, mut bus) = cpu_with_program(&[0xB1, 0x80]);
        bus.write(0x0080, 0x00);
        bus.write(0x0081, 0x02);
        bus.write(0x0268, 0x77);
        cpu.state.y = 0x68;
        let line = cpu.trace(&bus);
        assert!(
            line.contains("LDA ($80),Y = 0200 @ 0268 = 77"),
            "line was: {}",
            line
        );
    }

    #[test]
    fn register_dump_starts_at_column_48() {
        let (cpu, bus) = cpu_with_program(&[0xEA]);
        let line = cpu.trace(&bus);
        assert_eq!(&line[48..50], "A:");
        assert_eq!(line.len(), 73);
    }
}
