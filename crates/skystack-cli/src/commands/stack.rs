use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use skystack_core::calibration::{
    BackgroundCalibration, BackgroundCalibrationMode, BackgroundStats, CalibrationInterpolation,
    RgbBackgroundMethod, SessionCalibration,
};
use skystack_core::color::cfa::CfaPattern;
use skystack_core::config::{
    CalibrationConfig, KernelPreference, MedianFilterConfig, ProcessingMethod, StackConfig,
};
use skystack_core::frame::AnyImage;
use skystack_core::io::{load_image, save_image, white_level};
use skystack_core::stack::{compose_stack, AutoAdaptiveParams, FrameStack, KappaSigmaParams};
use skystack_core::with_image;
use tracing::info;

use crate::progress::BarProgress;
use crate::summary::print_stack_summary;

#[derive(Clone, Copy, ValueEnum)]
pub enum MethodArg {
    Average,
    Median,
    KappaSigma,
    AutoAdaptive,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CalibrateArg {
    /// Each channel keeps its own background
    PerChannel,
    /// Shared background: highest channel background
    RgbMaximum,
    /// Shared background: lowest channel background
    RgbMinimum,
    /// Shared background: median channel background
    RgbMedian,
}

impl From<CalibrateArg> for BackgroundCalibrationMode {
    fn from(arg: CalibrateArg) -> Self {
        match arg {
            CalibrateArg::PerChannel => Self::PerChannel,
            CalibrateArg::RgbMaximum => Self::Rgb(RgbBackgroundMethod::Maximum),
            CalibrateArg::RgbMinimum => Self::Rgb(RgbBackgroundMethod::Minimum),
            CalibrateArg::RgbMedian => Self::Rgb(RgbBackgroundMethod::Median),
        }
    }
}

#[derive(Args)]
pub struct StackArgs {
    /// Registered input frames; the first one is the calibration reference
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Load settings from a TOML file (flags below override it)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Combination method
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,

    /// Rejection threshold for kappa-sigma
    #[arg(long)]
    pub kappa: Option<f64>,

    /// Iterations for kappa-sigma or auto-adaptive
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Background calibration against the first frame
    #[arg(long, value_enum)]
    pub calibrate: Option<CalibrateArg>,

    /// Use linear instead of rational calibration curves
    #[arg(long)]
    pub linear: bool,

    /// Median pre-filter radius
    #[arg(long)]
    pub median_radius: Option<usize>,

    /// Bayer pattern for the median pre-filter
    #[arg(long)]
    pub cfa: Option<CfaPattern>,

    /// Disable the batched lane composer
    #[arg(long)]
    pub scalar_only: bool,

    /// Output file path
    #[arg(short, long, default_value = "stacked.tiff")]
    pub output: PathBuf,
}

fn build_config(args: &StackArgs) -> Result<StackConfig> {
    let mut config = match args.config {
        Some(ref path) => super::config::load(path)?,
        None => StackConfig::default(),
    };

    if let Some(method) = args.method {
        config.composition.method = match method {
            MethodArg::Average => ProcessingMethod::Average,
            MethodArg::Median => ProcessingMethod::Median,
            MethodArg::KappaSigma => ProcessingMethod::KappaSigma(KappaSigmaParams::default()),
            MethodArg::AutoAdaptive => {
                ProcessingMethod::AutoAdaptive(AutoAdaptiveParams::default())
            }
        };
    }
    match config.composition.method {
        ProcessingMethod::KappaSigma(ref mut p) => {
            if let Some(kappa) = args.kappa {
                p.kappa = kappa;
            }
            if let Some(iterations) = args.iterations {
                p.iterations = iterations;
            }
        }
        ProcessingMethod::AutoAdaptive(ref mut p) => {
            if let Some(iterations) = args.iterations {
                p.iterations = iterations;
            }
        }
        ProcessingMethod::Average | ProcessingMethod::Median => {}
    }
    if args.scalar_only {
        config.composition.kernel = KernelPreference::ScalarOnly;
    }

    if let Some(mode) = args.calibrate {
        let cal = config.calibration.get_or_insert_with(CalibrationConfig::default);
        cal.mode = mode.into();
    }
    if args.linear {
        if let Some(ref mut cal) = config.calibration {
            cal.interpolation = CalibrationInterpolation::Linear;
        }
    }

    if let Some(radius) = args.median_radius {
        let median = config
            .median_filter
            .get_or_insert_with(MedianFilterConfig::default);
        median.radius = radius;
    }
    if let Some(cfa) = args.cfa {
        match config.median_filter {
            Some(ref mut median) => median.cfa = Some(cfa),
            None => bail!("--cfa only applies together with the median pre-filter"),
        }
    }

    config.validate()?;
    Ok(config)
}

pub fn run(args: &StackArgs) -> Result<()> {
    let config = build_config(args)?;
    print_stack_summary(&config, args.files.len(), &args.output);

    let mut frames: Vec<AnyImage> = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let frame =
            load_image(path).with_context(|| format!("Failed to load {}", path.display()))?;
        frames.push(frame);
    }
    info!(count = frames.len(), "Frames loaded");

    let bar = BarProgress::new("Stacking");

    if let Some(ref cal) = config.calibration {
        calibrate_frames(&mut frames, cal, &bar)?;
    }

    if let Some(ref median) = config.median_filter {
        for (i, frame) in frames.iter_mut().enumerate() {
            bar.set_label(&format!("Median {}/{}", i + 1, args.files.len()));
            *frame = frame.median_filtered(median.radius, median.cfa, &bar)?;
        }
    }

    let stack = FrameStack::new(frames)?;
    bar.set_label("Composing");
    let result = compose_stack(&stack, &config.composition, &bar)?;
    bar.clear();

    save_image(&result, white_level(stack.kind()), &args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;
    println!("Saved to {}", args.output.display());
    Ok(())
}

fn calibrate_frames(
    frames: &mut [AnyImage],
    cal: &CalibrationConfig,
    bar: &BarProgress,
) -> Result<()> {
    let total = frames.len();
    let Some(reference) = frames.first() else {
        return Ok(());
    };

    bar.set_label("Reference background");
    let reference_stats =
        with_image!(reference, img => BackgroundStats::measure(img, cal.multiplier, bar))?;
    let session = SessionCalibration::from_reference(&reference_stats, cal.mode);

    for (i, frame) in frames.iter_mut().enumerate() {
        bar.set_label(&format!("Calibrate {}/{}", i + 1, total));
        let stats = if i == 0 {
            reference_stats
        } else {
            with_image!(&*frame, img => BackgroundStats::measure(img, cal.multiplier, bar))?
        };
        let calibration = BackgroundCalibration::new(&stats, &session, cal.interpolation);
        with_image!(frame, img => calibration.apply(img));
    }
    Ok(())
}
