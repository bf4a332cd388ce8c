// Genesis/Megadrive layout: header 0x100..0x200, checksum word at 0x18E

use super::error::{Error, Result};
use super::header::{FieldKind, HeaderField};
use super::image::RomImage;
use super::Layout;

pub const HEADER_START: usize = 0x100;
pub const HEADER_SIZE: usize = 0x100;
pub const CHECKSUM_ADDR: usize = 0x18E;
pub const ROM_START: usize = 0x200;

pub const HEADER_LAYOUT: [HeaderField; 17] = [
    HeaderField::new("Console Name", 0x100, 16, FieldKind::Text),
    HeaderField::new("Copyright", 0x110, 16, FieldKind::Text),
    HeaderField::new("Domestic Name", 0x120, 48, FieldKind::Text),
    HeaderField::new("Overseas Name", 0x150, 48, FieldKind::Text),
    HeaderField::new("Serial Number", 0x180, 14, FieldKind::Text),
    HeaderField::new("Checksum", 0x18E, 2, FieldKind::Uint),
    HeaderField::new("IO Support", 0x190, 16, FieldKind::Text),
    HeaderField::new("ROM Begin", 0x1A0, 4, FieldKind::Uint),
    HeaderField::new("ROM End", 0x1A4, 4, FieldKind::Uint),
    HeaderField::new("RAM Begin", 0x1A8, 4, FieldKind::Uint),
    HeaderField::new("RAM End", 0x1AC, 4, FieldKind::Uint),
    // flag bytes ("RA" + type), not a console string
    HeaderField::new("SRAM Support", 0x1B0, 4, FieldKind::Raw),
    HeaderField::new("SRAM Begin", 0x1B4, 4, FieldKind::Uint),
    HeaderField::new("SRAM End", 0x1B8, 4, FieldKind::Uint),
    HeaderField::new("Modem Support", 0x1BC, 12, FieldKind::Text),
    HeaderField::new("Memo", 0x1C8, 40, FieldKind::Text),
    HeaderField::new("Country Support", 0x1F0, 16, FieldKind::Text),
];

pub const LAYOUT: Layout = Layout {
    header: &HEADER_LAYOUT,
    calculate_checksum,
    stored_checksum,
    convert_endianness,
};

/// Sums `[0x200, end)` as big-endian words, wrapping at 16 bits.
///
/// A trailing unpaired byte is dropped rather than zero-padded.
pub fn calculate_checksum(rom: &[u8]) -> u16 {
    rom.get(ROM_START..)
        .unwrap_or_default()
        .chunks_exact(2)
        .fold(0u16, |sum, word| {
            sum.wrapping_add(u16::from_be_bytes([word[0], word[1]]))
        })
}

/// Reads the checksum stored in the header.
pub fn stored_checksum(image: &RomImage) -> Result<u16> {
    let bytes = image.slice(CHECKSUM_ADDR, 2)?;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Swaps the two bytes of every 16-bit word of `source`. `destination` ends up
/// holding exactly the swapped bytes. Odd-length sources are rejected before
/// `destination` is touched.
pub fn convert_endianness(source: &RomImage, destination: &mut RomImage) -> Result<()> {
    let bytes = source.as_bytes();
    if bytes.len() % 2 != 0 {
        return Err(Error::InvalidFormat(format!(
            "ROM must have an even number of bytes, got {}",
            bytes.len()
        )));
    }

    let swapped: Vec<u8> = bytes
        .chunks_exact(2)
        .flat_map(|word| [word[1], word[0]])
        .collect();

    log::debug!("swapped {} words", swapped.len() / 2);
    destination.replace(swapped);
    Ok(())
}
