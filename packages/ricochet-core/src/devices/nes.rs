//! A module representing the console as a whole unit.
//!
//! For this core that means the 2A03 and its address bus; there is no PPU or
//! APU to schedule against. The CPU borrows the bus mutably for each step,
//! and nothing holds a reference back the other way.

use super::bus::Bus;
use super::cartridge::{from_rom, RomError};
use super::cpu::Cpu6502;

pub struct Nes {
    cpu: Cpu6502,
    bus: Bus,
}

impl Nes {
    /// Build a console around an iNES image held in memory.
    pub fn new_from_buf(buf: &[u8]) -> Result<Nes, RomError> {
        let cart = from_rom(buf)?;
        Ok(Nes {
            cpu: Cpu6502::new(),
            bus: Bus::new(cart),
        })
    }

    /// Build a console around an iNES file on disk.
    pub fn new_from_file(path: &str) -> std::io::Result<Nes> {
        let buf = std::fs::read(path)?;
        Nes::new_from_buf(&buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Advance the emulator by one clock cycle.
    pub fn tick(&mut self) {
        self.cpu.step(&mut self.bus);
    }

    /// Run the CPU for one full instruction.
    pub fn step(&mut self) {
        while !self.cpu.is_idle() {
            self.tick();
        }
        self.tick();
        while !self.cpu.is_idle() {
            self.tick();
        }
    }

    /// Trace the next instruction, then run it to completion.
    ///
    /// This is the engine behind both the CLI's log output and the nestest
    /// comparison harness.
    pub fn step_debug(&mut self) -> String {
        while !self.cpu.is_idle() {
            self.tick();
        }
        let line = self.cpu.trace(&self.bus);
        self.step();
        line
    }

    /// Trigger a hardware reset, jumping through the vector at $FFFC.
    pub fn reset(&mut self) {
        self.cpu.reset(&mut self.bus);
    }

    //region Test automation helpers
    /// Jump the CPU program counter to the given address.
    pub fn set_pc(&mut self, addr: u16) {
        self.cpu.state.pc = addr;
    }

    /// Read from the bus at a given address.
    ///
    /// Lets callers check the result locations some comprehensive test ROMs
    /// write their verdicts to.
    pub fn read_bus(&mut self, addr: u16) -> u8 {
        self.bus.read(addr)
    }

    /// A copy of the CPU register file.
    pub fn cpu_state(&self) -> super::cpu::CpuState {
        self.cpu.state
    }
    //endregion
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_image(program: &[u8]) -> Vec<u8> {
        let mut image = vec![0u8; 16 + 0x4000 + 0x2000];
        image[0..4].copy_from_slice(b"NES\x1A");
        image[4] = 1;
        image[5] = 1;
        image[16..16 + program.len()].copy_from_slice(program);
        image
    }

    #[test]
    fn steps_one_instruction_at_a_time() {
        // LDA #$05; STA $10
        let mut nes = Nes::new_from_buf(&synthetic_image(&[0xA9, 0x05, 0x85, 0x10])).unwrap();
        nes.step();
        assert_eq!(nes.cpu_state().acc, 0x05);
        assert_eq!(nes.read_bus(0x0010), 0x00);
        nes.step();
        assert_eq!(nes.read_bus(0x0010), 0x05);
    }

    #[test]
    fn step_debug_traces_before_executing() {
        let mut nes = Nes::new_from_buf(&synthetic_image(&[0xA9, 0x05])).unwrap();
        let line = nes.step_debug();
        assert!(line.starts_with("C000  A9 05"), "line was: {}", line);
        // the dump shows A as it was before the load ran
        assert!(line.ends_with("A:00 X:00 Y:00 P:24 SP:FD"), "line was: {}", line);
        assert_eq!(nes.cpu_state().acc, 0x05);
    }

    #[test]
    fn rejects_non_ines_buffers() {
        assert!(Nes::new_from_buf(&[0u8; 64]).is_err());
    }

    #[test]
    fn set_pc_redirects_execution() {
        let mut program = vec![0xEA; 0x20];
        program[0x10] = 0xA9; // C010: LDA #$33
        program[0x11] = 0x33;
        let mut nes = Nes::new_from_buf(&synthetic_image(&program)).unwrap();
        nes.set_pc(0xC010);
        nes.step();
        assert_eq!(nes.cpu_state().acc, 0x33);
    }
}
