//! Helpers for parsing iNES ROM files

use super::RomError;

const INES_MAGIC: [u8; 4] = [b'N', b'E', b'S', 0x1A];

/// Interface for an iNES header
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct INesHeader {
    /// The size of the PRG chunk, in 16k chunks. Will not be 0.
    pub prg_size: usize,
    /// The size of the CHR chunk, in 8k chunks. Will not be 0.
    pub chr_size: usize,
    /// The mapper number, assembled from the nibbles in flags 6 and 7
    pub mapper: u8,
    /// Mirroring, battery, trainer
    pub flags_6: INesFlags6,
    /// VS/PlayChoice, NES 2.0 indicator
    pub flags_7: INesFlags7,
}

/// Parse and validate the 16-byte header at the front of an iNES image.
pub fn parse_ines_header(bytes: &[u8]) -> Result<INesHeader, RomError> {
    if bytes.len() < 16 || bytes[0..4] != INES_MAGIC {
        return Err(RomError::BadMagic);
    }

    let flags_6 = INesFlags6::from_bits_truncate(bytes[6]);
    let flags_7 = INesFlags7::from_bits_truncate(bytes[7]);
    // Low nibble lives in the top of byte 6, high nibble in the top of byte 7
    let mapper = (bytes[6] >> 4) | (bytes[7] & 0xF0);

    Ok(INesHeader {
        prg_size: if bytes[4] == 0 { 1 } else { bytes[4] as usize },
        chr_size: if bytes[5] == 0 { 1 } else { bytes[5] as usize },
        mapper,
        flags_6,
        flags_7,
    })
}

bitflags! {
    pub struct INesFlags6: u8 {
        /// Nametable mirroring: 0 horizontal, 1 vertical. Hardware-wired on
        /// NROM, ignored by mappers that control mirroring themselves.
        const MIRRORING = 0x01;
        /// Whether this ROM contains battery-backed RAM
        const HAS_PERSISTENT_MEMORY = 0x02;
        /// Whether this ROM contains a 512-byte trainer program
        const HAS_TRAINER = 0x04;
        /// Whether to use 4-screen VRAM instead of mirroring
        const USE_FOUR_SCREEN_VRAM = 0x08;
        /// The lower nibble of the iNES mapper number
        const LOWER_MAPPER_NIBBLE = 0xF0;
    }
}

bitflags! {
    pub struct INesFlags7: u8 {
        /// Whether this ROM was developed for the VS arcade
        const VS_UNISYSTEM_ROM = 0x01;
        /// Whether this ROM was developed for the PlayChoice arcade
        const PLAYCHOICE_10 = 0x02;
        /// If equal to 2, the rest of the headers are in iNES 2.0 format
        const IS_INES_2_0 = 0x0C;
        /// The upper nibble of the iNES mapper number
        const UPPER_MAPPER_NIBBLE = 0xF0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_header() {
        let mut data = [0u8; 16];
        data[0..4].copy_from_slice(b"NES\x1A");
        data[4] = 2;
        data[5] = 1;
        data[6] = 0x01;
        let header = parse_ines_header(&data).unwrap();
        assert_eq!(header.prg_size, 2, "PRG size mismatch");
        assert_eq!(header.chr_size, 1, "CHR size mismatch");
        assert_eq!(header.mapper, 0, "mapper mismatch");
        assert!(header.flags_6.contains(INesFlags6::MIRRORING));
    }

    #[test]
    fn zero_sizes_are_bumped_to_one() {
        let mut data = [0u8; 16];
        data[0..4].copy_from_slice(b"NES\x1A");
        let header = parse_ines_header(&data).unwrap();
        assert_eq!(header.prg_size, 1);
        assert_eq!(header.chr_size, 1);
    }

    #[test]
    fn assembles_mapper_from_both_nibbles() {
        let mut data = [0u8; 16];
        data[0..4].copy_from_slice(b"NES\x1A");
        data[6] = 0x10; // low nibble = 1
        data[7] = 0x40; // high nibble = 4
        let header = parse_ines_header(&data).unwrap();
        assert_eq!(header.mapper, 0x41);
    }

    #[test]
    fn rejects_bad_magic() {
        let data = [0u8; 16];
        assert_eq!(parse_ines_header(&data), Err(RomError::BadMagic));
        assert_eq!(parse_ines_header(b"NES"), Err(RomError::BadMagic));
    }
}
