//! Inspection and conversion of classic console cartridge dumps.
//!
//! [`cart::RomImage`] owns the raw bytes. [`cart::Cartridge`] reads them
//! through one console's layout to decode the header, verify the checksum
//! and byte-swap the image.

pub mod cart;
