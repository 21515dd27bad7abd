//! Mapper 0 (NROM): 16 or 32 KiB of PRG ROM, no bank switching.

use super::{INesHeader, RomError};

pub struct NromCartridge {
    prg: Vec<u8>,
    /// 16 KiB images are mirrored across the upper 32 KiB of CPU space
    is_16k: bool,
}

impl NromCartridge {
    /// Copy the PRG banks out of an iNES image, skipping the 16-byte header.
    pub fn new(header: &INesHeader, buf: &[u8]) -> Result<NromCartridge, RomError> {
        let prg_end = 16 + 0x4000 * header.prg_size;
        if buf.len() < prg_end {
            return Err(RomError::Truncated);
        }
        Ok(NromCartridge {
            prg: buf[16..prg_end].to_vec(),
            is_16k: header.prg_size == 1,
        })
    }

    /// Read from the PRG window. Addresses are in CPU format.
    pub fn read_prg(&self, addr: u16) -> u8 {
        if addr < 0x8000 {
            return 0; // open bus
        }
        let mut index = (addr - 0x8000) as usize;
        if self.is_16k {
            index &= 0x3FFF;
        }
        self.prg[index]
    }
}
