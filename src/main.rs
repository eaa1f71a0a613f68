//! stegano - hide text in PNG, BMP, WebP and JPEG images.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::fs;
use std::path::{Path, PathBuf};
use stegano::{Extracted, Format};

/// Hide text inside images without visibly changing them
#[derive(Parser)]
#[command(name = "stegano")]
#[command(version)]
#[command(about = "Hide text in PNG, BMP, WebP (LSB) and JPEG (DCT) images")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide text in an image
    ///
    /// The result keeps the input's container format and is written next to
    /// the input as <name>_stego.<ext> unless --output is given.
    Hide {
        /// Carrier image (.png, .jpg/.jpeg/.jpe, .bmp, .webp)
        image: PathBuf,

        /// Text to hide
        #[arg(short, long, conflicts_with = "text_file", required_unless_present = "text_file")]
        text: Option<String>,

        /// Read the text to hide from a UTF-8 .txt file
        #[arg(long)]
        text_file: Option<PathBuf>,

        /// Where to write the resulting image
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Container format, overrides the file extension
        #[arg(short, long)]
        format: Option<Format>,
    },

    /// Extract hidden text from an image
    Extract {
        image: PathBuf,

        /// Print best-effort text even when no end marker was found
        #[arg(long)]
        lossy: bool,

        /// Container format, overrides the file extension
        #[arg(short, long)]
        format: Option<Format>,
    },

    /// Show how much text an image can hold
    Capacity {
        image: PathBuf,

        /// Container format, overrides the file extension
        #[arg(short, long)]
        format: Option<Format>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    SimpleLogger::new()
        .with_level(level)
        .env()
        .init()
        .context("Failed to initialise logging")?;

    match cli.command {
        Commands::Hide {
            image,
            text,
            text_file,
            output,
            format,
        } => {
            let text = match (text, text_file) {
                (Some(text), _) => text,
                (None, Some(path)) => read_text_file(&path)?,
                (None, None) => bail!("No text provided"),
            };
            let text = hidden_text(&text)?;
            let bytes = read_image(&image)?;
            let format = resolve_format(format, &image, &bytes)?;
            let stego = stegano::hide(&bytes, format, text)
                .with_context(|| format!("Failed to hide text in {}", image.display()))?;
            let output = output.unwrap_or_else(|| stego_path(&image, format));
            fs::write(&output, stego)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Text hidden successfully: {}", output.display());
        }
        Commands::Extract {
            image,
            lossy,
            format,
        } => {
            let bytes = read_image(&image)?;
            let format = resolve_format(format, &image, &bytes)?;
            let extracted = stegano::reveal(&bytes, format)
                .with_context(|| format!("Failed to extract text from {}", image.display()))?;
            match extracted {
                Extracted::Text { text, .. } => println!("{text}"),
                Extracted::NoMarkerFound { text, .. } if lossy && !text.is_empty() => {
                    println!("{text}")
                }
                Extracted::Empty | Extracted::NoMarkerFound { .. } => {
                    bail!("No hidden text found in the image")
                }
            }
        }
        Commands::Capacity { image, format } => {
            let bytes = read_image(&image)?;
            let format = resolve_format(format, &image, &bytes)?;
            let capacity = stegano::capacity(&bytes, format)?;
            println!(
                "{format}: {} bits, up to {} bytes of text",
                capacity.bits(),
                capacity.max_payload_bytes()
            );
        }
    }
    Ok(())
}

fn read_image(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_text_file(path: &Path) -> Result<String> {
    let is_txt = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
    if !is_txt {
        bail!("Only TXT files supported");
    }
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", path.display()))
}

/// Surrounding whitespace is not hidden
fn hidden_text(text: &str) -> Result<&str> {
    let text = text.trim();
    if text.is_empty() {
        bail!("No text provided");
    }
    Ok(text)
}

/// Explicit format first, then the file extension, then the magic bytes
fn resolve_format(explicit: Option<Format>, path: &Path, bytes: &[u8]) -> Result<Format> {
    if let Some(format) = explicit.or_else(|| Format::from_path(path)) {
        return Ok(format);
    }
    match Format::sniff(bytes) {
        Some(format) => {
            log::info!("{} has no known extension, detected {format}", path.display());
            Ok(format)
        }
        None => bail!(stegano::Error::UnsupportedFormat(path.display().to_string())),
    }
}

/// `<dir>/<stem>_stego.<ext>`
fn stego_path(input: &Path, format: Format) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_owned());
    input.with_file_name(format!("{stem}_stego.{}", format.extension()))
}
