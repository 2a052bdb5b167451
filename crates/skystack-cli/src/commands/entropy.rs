use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use skystack_core::consts::DEFAULT_ENTROPY_WINDOW;
use skystack_core::io::load_image;
use skystack_core::quality::square_entropies;
use skystack_core::with_image;

use crate::progress::BarProgress;
use crate::summary::print_entropy;

#[derive(Args)]
pub struct EntropyArgs {
    /// Input image file
    pub file: PathBuf,

    /// Half width of the square tiles (tiles are 2 * window + 1 pixels)
    #[arg(long, default_value_t = DEFAULT_ENTROPY_WINDOW)]
    pub window: usize,

    /// Print every tile value
    #[arg(long)]
    pub tiles: bool,
}

pub fn run(args: &EntropyArgs) -> Result<()> {
    let image = load_image(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let bar = BarProgress::new("Entropy");
    let grid = with_image!(&image, img => square_entropies(img, args.window, &bar))?;
    bar.clear();

    print_entropy(&args.file, &grid, args.tiles);
    Ok(())
}
