//! dat-cli - Command-line interface for strikedat
//!
//! A command-line tool for inspecting and extracting DAT game archives.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use strikedat::{DatFile, DatGraphics, MemRange};

#[derive(Parser)]
#[command(name = "dat-cli")]
#[command(about = "A CLI tool for DAT game archives (list, extract, inspect)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List archive entries with packed and unpacked sizes
    List {
        /// Archive file (e.g. DESERT.DAT)
        archive: PathBuf,
    },

    /// Extract entries into a directory
    Extract {
        /// Archive file
        archive: PathBuf,

        /// Output directory (created if missing)
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Extract only the named entry
        #[arg(short, long)]
        entry: Option<String>,

        /// Force overwrite of existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Show information about one entry
    Info {
        /// Archive file
        archive: PathBuf,

        /// Entry name
        entry: String,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List { archive } => list_entries(&archive, cli.verbose),
        Commands::Extract {
            archive,
            output,
            entry,
            force,
        } => extract_entries(&archive, &output, entry.as_deref(), force, cli.quiet),
        Commands::Info { archive, entry } => show_entry_info(&archive, &entry, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn list_entries(archive: &PathBuf, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut datfile = DatFile::open(archive)?;

    println!("{} entries", datfile.len());

    for i in 0..datfile.len() {
        if verbose {
            // decompress to report the true unpacked size
            let unpacked = datfile.data(i)?;
            let entry = datfile.entry(i)?;
            println!(
                "#{i} {:8} {:>8} packed, {:>8} unpacked ({} hinted)",
                entry.name,
                entry.packed_size,
                unpacked.size(),
                entry.unpacked_size_hint
            );
        } else {
            let entry = datfile.entry(i)?;
            println!("#{i} {:8} {:>8} packed", entry.name, entry.packed_size);
        }
    }

    Ok(())
}

fn extract_entries(
    archive: &PathBuf,
    output: &PathBuf,
    entry_name: Option<&str>,
    force: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut datfile = DatFile::open(archive)?;

    fs::create_dir_all(output)?;

    let indices: Vec<usize> = match entry_name {
        Some(name) => {
            let index = (0..datfile.len())
                .find(|&i| datfile.entry(i).map(|e| e.name == name).unwrap_or(false))
                .ok_or_else(|| format!("entry '{name}' not found in archive"))?;
            vec![index]
        }
        None => (0..datfile.len()).collect(),
    };

    let progress = if !quiet && indices.len() > 1 {
        let pb = ProgressBar::new(indices.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
                )
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut extracted = 0usize;
    for i in indices {
        let name = datfile.name(i)?.to_string();
        let path = output.join(&name);

        if path.exists() && !force {
            return Err(format!(
                "Output file '{}' already exists. Use --force to overwrite",
                path.display()
            )
            .into());
        }

        if let Some(ref pb) = progress {
            pb.set_message(name.clone());
        }

        let unpacked = datfile.data(i)?;
        fs::write(&path, unpacked.data())?;
        extracted += 1;

        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message("done");
    }

    if !quiet {
        println!("✓ Extracted {extracted} entr{}", if extracted == 1 { "y" } else { "ies" });
    }

    Ok(())
}

fn show_entry_info(
    archive: &PathBuf,
    entry_name: &str,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut datfile = DatFile::open(archive)?;

    let (offset, packed_size, hint) = {
        let entry = datfile.entry_by_name(entry_name)?;
        (entry.offset, entry.packed_size, entry.unpacked_size_hint)
    };

    println!("Entry Information:");
    println!("  Archive: {}", archive.display());
    println!("  Name:    {entry_name}");
    println!("  Offset:  {offset}");
    println!("  Packed:  {packed_size} bytes");
    println!("  Hint:    {hint} bytes");

    let unpacked = datfile.data_by_name(entry_name)?;
    println!("  Unpacked: {} bytes", unpacked.size());

    // graphics entries identify themselves by tag
    match DatGraphics::parse(&unpacked) {
        Ok(graphics) => {
            println!("  Type:    graphics ({} sprites, {} colors, transparency {})",
                graphics.num_sprites(),
                graphics.palette().len(),
                if graphics.transparency() { "on" } else { "off" },
            );
            if verbose {
                for (i, sprite) in graphics.sprites().iter().enumerate() {
                    println!(
                        "    sprite #{i}: {}x{} in {}x{} frame at +{}+{}",
                        sprite.width,
                        sprite.height,
                        sprite.frame_width,
                        sprite.frame_height,
                        sprite.x_offset,
                        sprite.y_offset
                    );
                }
            }
        }
        Err(_) => println!("  Type:    raw data"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // minimal one-entry archive: pass-through compressed payload
    fn test_archive() -> Vec<u8> {
        let payload = [0x00u8, 0xDE, 0xAD, 0xBE, 0xEF];

        let mut data = Vec::new();
        data.extend_from_slice(&1u32.to_le_bytes());
        data.resize(16, 0);

        data.extend_from_slice(b"FIRST   ");
        data.extend_from_slice(&32u32.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes()); // 1 paragraph = 16 bytes

        data.extend_from_slice(&payload);
        data
    }

    #[test]
    fn test_extract() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let archive_path = dir.path().join("test.dat");
        fs::write(&archive_path, test_archive())?;

        let out_dir = dir.path().join("out");
        extract_entries(&archive_path, &out_dir, None, false, true)?;

        let extracted = fs::read(out_dir.join("FIRST"))?;
        assert_eq!(extracted, vec![0xDE, 0xAD, 0xBE, 0xEF]);

        Ok(())
    }

    #[test]
    fn test_list() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let archive_path = dir.path().join("test.dat");
        fs::write(&archive_path, test_archive())?;

        list_entries(&archive_path, true)?;

        Ok(())
    }
}
