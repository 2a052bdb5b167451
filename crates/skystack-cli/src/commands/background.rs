use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use skystack_core::calibration::BackgroundStats;
use skystack_core::io::load_image;
use skystack_core::with_image;

use crate::progress::BarProgress;
use crate::summary::print_background;

#[derive(Args)]
pub struct BackgroundArgs {
    /// Input image file
    pub file: PathBuf,

    /// Scale from sample values to 16-bit histogram levels
    #[arg(long, default_value = "1.0")]
    pub multiplier: f64,
}

pub fn run(args: &BackgroundArgs) -> Result<()> {
    let image = load_image(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let bar = BarProgress::new("Histogram");
    let stats = with_image!(&image, img => BackgroundStats::measure(img, args.multiplier, &bar))?;
    bar.clear();

    print_background(&args.file, &stats);
    Ok(())
}
