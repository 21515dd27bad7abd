mod ines;
mod nrom;

pub use ines::{parse_ines_header, INesFlags6, INesFlags7, INesHeader};
pub use nrom::NromCartridge;

use std::error::Error;
use std::fmt;

/// Everything that can go wrong while loading a ROM image.
///
/// Load errors are terminal: the console is never constructed around a bad
/// image, so the core has no recovery paths for these.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum RomError {
    /// The image does not start with the iNES magic "NES\x1A"
    BadMagic,
    /// The mapper number is anything but 0 (NROM)
    UnsupportedMapper(u8),
    /// The image ends before the PRG data the header promises
    Truncated,
}

impl fmt::Display for RomError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RomError::BadMagic => write!(f, "not an iNES file"),
            RomError::UnsupportedMapper(mapper) => {
                write!(f, "mapper {} is not supported (only NROM)", mapper)
            }
            RomError::Truncated => write!(f, "image is shorter than its header claims"),
        }
    }
}

impl Error for RomError {}

/// Given an iNES ROM image, build the cartridge for it.
///
/// Only mapper 0 is wired up in this core; anything else is rejected at load
/// time rather than discovered mid-execution.
pub fn from_rom(buf: &[u8]) -> Result<NromCartridge, RomError> {
    let header = parse_ines_header(buf)?;
    match header.mapper {
        0 => NromCartridge::new(&header, buf),
        mapper => Err(RomError::UnsupportedMapper(mapper)),
    }
}
