// cartridge module root
mod error;
pub mod genesis;
mod header;
mod image;

use std::cell::OnceCell;
use std::fmt;
use std::fs;
use std::path::Path;

pub use error::{Error, Result};
pub use header::{FieldKind, FieldValue, Header, HeaderField};
pub use image::RomImage;

/// Console families the tool knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum System {
    /// Sega Genesis/Megadrive
    #[value(name = "gen")]
    Genesis,
    /// Sega Master System
    #[value(name = "sms")]
    MasterSystem,
}

impl System {
    pub fn name(self) -> &'static str {
        match self {
            System::Genesis => "Genesis/Megadrive",
            System::MasterSystem => "Master System",
        }
    }

    /// Cartridge layout for this console, if one is implemented.
    pub fn layout(self) -> Result<&'static Layout> {
        match self {
            System::Genesis => Ok(&genesis::LAYOUT),
            System::MasterSystem => Err(Error::Unsupported(self)),
        }
    }
}

/// Per-console parsing table: header fields plus the checksum and byte-swap
/// routines that go with them.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub header: &'static [HeaderField],
    pub calculate_checksum: fn(&[u8]) -> u16,
    pub stored_checksum: fn(&RomImage) -> Result<u16>,
    pub convert_endianness: fn(&RomImage, &mut RomImage) -> Result<()>,
}

impl Layout {
    /// First offset past the header region.
    pub fn header_end(&self) -> usize {
        self.header
            .iter()
            .map(|field| field.offset + field.width)
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State derived from the ROM bytes. Dropped on every write through the
/// cartridge and rebuilt on next access.
#[derive(Debug, Clone)]
struct Parsed {
    header: Header,
    checksum_calculated: u16,
    checksum_in_rom: u16,
}

impl Parsed {
    fn from_image(system: System, image: &RomImage) -> Result<Self> {
        let layout = system.layout()?;
        let header = Header::parse(image, layout.header)?;
        let checksum_calculated = (layout.calculate_checksum)(image.as_bytes());
        let checksum_in_rom = (layout.stored_checksum)(image)?;

        log::trace!(
            "parsed {} header: checksum calculated 0x{:04X}, stored 0x{:04X}",
            system,
            checksum_calculated,
            checksum_in_rom
        );

        Ok(Self {
            header,
            checksum_calculated,
            checksum_in_rom,
        })
    }
}

/// A ROM image interpreted through one console's cartridge layout.
///
/// The cartridge owns its image. Header and checksums are parsed when the
/// cartridge is built.
#[derive(Debug, Clone)]
pub struct Cartridge {
    system: System,
    image: RomImage,
    parsed: OnceCell<Parsed>,
}

impl Cartridge {
    pub fn from_image(system: System, image: RomImage) -> Result<Self> {
        let header_end = system.layout()?.header_end();
        if image.size() < header_end {
            return Err(Error::Format(format!(
                "header region exceeds ROM size ({} < {} bytes)",
                image.size(),
                header_end
            )));
        }

        let parsed = Parsed::from_image(system, &image)?;
        Ok(Self {
            system,
            image,
            parsed: OnceCell::from(parsed),
        })
    }

    pub fn load(system: System, path: impl AsRef<Path>) -> Result<Self> {
        Self::from_image(system, RomImage::load(path)?)
    }

    pub fn system(&self) -> System {
        self.system
    }

    pub fn image(&self) -> &RomImage {
        &self.image
    }

    pub fn into_image(self) -> RomImage {
        self.image
    }

    fn parsed(&self) -> Result<&Parsed> {
        if let Some(parsed) = self.parsed.get() {
            return Ok(parsed);
        }
        let parsed = Parsed::from_image(self.system, &self.image)?;
        Ok(self.parsed.get_or_init(|| parsed))
    }

    pub fn header(&self) -> Result<&Header> {
        Ok(&self.parsed()?.header)
    }

    pub fn checksum_calculated(&self) -> Result<u16> {
        Ok(self.parsed()?.checksum_calculated)
    }

    pub fn checksum_in_rom(&self) -> Result<u16> {
        Ok(self.parsed()?.checksum_in_rom)
    }

    pub fn checksum_valid(&self) -> Result<bool> {
        let parsed = self.parsed()?;
        Ok(parsed.checksum_calculated == parsed.checksum_in_rom)
    }

    /// Recomputes header and checksums from the current bytes and returns the
    /// calculated checksum.
    pub fn checksum(&mut self) -> Result<u16> {
        self.reparse()?;
        self.checksum_calculated()
    }

    pub fn reparse(&mut self) -> Result<()> {
        let parsed = Parsed::from_image(self.system, &self.image)?;
        self.parsed = OnceCell::from(parsed);
        Ok(())
    }

    pub fn write(&mut self, data: &[u8], offset: Option<usize>) -> Result<()> {
        self.image.write(data, offset)?;
        self.parsed.take();
        Ok(())
    }

    /// Byte-swaps every 16-bit word of the ROM into `destination`.
    pub fn convert_endianness(&self, destination: &mut RomImage) -> Result<()> {
        (self.system.layout()?.convert_endianness)(&self.image, destination)
    }

    /// Byte-swaps the ROM into a new file. Refuses to overwrite the file the
    /// cartridge was loaded from.
    pub fn convert_endianness_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(source) = self.image.source_path() {
            let same = match (fs::canonicalize(source), fs::canonicalize(path)) {
                (Ok(a), Ok(b)) => a == b,
                _ => source == path,
            };
            if same {
                return Err(Error::InvalidFormat(format!(
                    "destination {} is the source ROM",
                    path.display()
                )));
            }
        }

        let mut swapped = RomImage::new();
        self.convert_endianness(&mut swapped)?;
        swapped.save(Some(path))
    }
}

impl fmt::Display for Cartridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .header()
            .ok()
            .and_then(|header| header.text("Domestic Name"))
            .unwrap_or_default();
        write!(
            f,
            "{}\n{}\n{} bytes",
            self.system,
            name.trim(),
            self.image.size()
        )
    }
}
