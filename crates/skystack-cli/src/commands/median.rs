use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use skystack_core::color::cfa::CfaPattern;
use skystack_core::io::{load_image, save_any};

use crate::progress::BarProgress;

#[derive(Args)]
pub struct MedianArgs {
    /// Input image file
    pub file: PathBuf,

    /// Window radius (window is 2 * radius + 1 pixels square)
    #[arg(long, default_value = "1")]
    pub radius: usize,

    /// Bayer pattern of raw mosaic data (rggb, grbg, gbrg, bggr)
    #[arg(long)]
    pub cfa: Option<CfaPattern>,

    /// Output file path
    #[arg(short, long, default_value = "median.tiff")]
    pub output: PathBuf,
}

pub fn run(args: &MedianArgs) -> Result<()> {
    let image = load_image(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let bar = BarProgress::new("Median");
    let filtered = image.median_filtered(args.radius, args.cfa, &bar)?;
    bar.clear();

    save_any(&filtered, &args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;
    println!("Saved to {}", args.output.display());
    Ok(())
}
