use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rom_tools::cart::{Cartridge, System};

#[derive(Parser, Debug)]
#[command(name = "rom-tools", version, about = "Inspect and convert cartridge ROM dumps")]
struct Args {
    /// Console the ROM belongs to
    #[arg(short, long, value_enum)]
    system: System,

    /// Input ROM file
    #[arg(short, long)]
    ifile: PathBuf,

    /// Output ROM file
    #[arg(short, long, default_value = "out.bin")]
    ofile: PathBuf,

    /// Swap the byte order of every 16-bit word and write the result to --ofile
    #[arg(long)]
    end: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let cart = Cartridge::load(args.system, &args.ifile)
        .with_context(|| format!("Failed to load ROM: {}", args.ifile.display()))?;

    for (name, value) in cart.header()?.iter() {
        log::info!("{name:<16} {value}");
    }

    println!("{cart}");
    println!("MD5:      {}", cart.image().digest_hex());

    let stored = cart.checksum_in_rom()?;
    let calculated = cart.checksum_calculated()?;
    if cart.checksum_valid()? {
        println!("Checksum: 0x{stored:04X} (ok)");
    } else {
        println!("Checksum: 0x{stored:04X} in ROM, 0x{calculated:04X} calculated (mismatch)");
    }

    if args.end {
        cart.convert_endianness_to_file(&args.ofile)
            .with_context(|| format!("Failed to write swapped ROM: {}", args.ofile.display()))?;
        println!("Byte-swapped ROM written to {}", args.ofile.display());
    }

    Ok(())
}
