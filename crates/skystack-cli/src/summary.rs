use std::path::Path;

use console::Style;
use skystack_core::calibration::BackgroundStats;
use skystack_core::config::{ProcessingMethod, StackConfig};
use skystack_core::quality::EntropyGrid;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

const CHANNELS: [&str; 3] = ["Red", "Green", "Blue"];

fn print_title(s: &Styles, title: &str) {
    println!();
    println!("  {}", s.title.apply_to(title));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(title.chars().count())));
    println!();
}

pub fn print_stack_summary(config: &StackConfig, frames: usize, output: &Path) {
    let s = Styles::new();
    print_title(&s, "Skystack");

    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(frames)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(output.display())
    );
    println!();

    // Calibration
    if let Some(ref cal) = config.calibration {
        println!("  {}", s.header.apply_to("Background Calibration"));
        println!(
            "    {:<14}{}",
            s.label.apply_to("Mode"),
            s.method.apply_to(format!("{:?}", cal.mode))
        );
        println!(
            "    {:<14}{}",
            s.label.apply_to("Curve"),
            s.value.apply_to(format!("{:?}", cal.interpolation))
        );
        println!(
            "    {:<14}{}",
            s.label.apply_to("Multiplier"),
            s.value.apply_to(cal.multiplier)
        );
    } else {
        println!(
            "  {:<24}{}",
            s.header.apply_to("Background Calibration"),
            s.disabled.apply_to("disabled")
        );
    }
    println!();

    if let Some(ref median) = config.median_filter {
        println!("  {}", s.header.apply_to("Median Filter"));
        println!(
            "    {:<14}{}",
            s.label.apply_to("Radius"),
            s.value.apply_to(median.radius)
        );
        let cfa = median
            .cfa
            .map_or_else(|| "none".to_string(), |p| format!("{p:?}"));
        println!("    {:<14}{}", s.label.apply_to("CFA"), s.value.apply_to(cfa));
    } else {
        println!(
            "  {:<24}{}",
            s.header.apply_to("Median Filter"),
            s.disabled.apply_to("disabled")
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Composition"));
    println!(
        "    {:<14}{}",
        s.label.apply_to("Method"),
        s.method.apply_to(&config.composition.method)
    );
    match config.composition.method {
        ProcessingMethod::KappaSigma(p) => {
            println!("    {:<14}{}", s.label.apply_to("Kappa"), s.value.apply_to(p.kappa));
            println!(
                "    {:<14}{}",
                s.label.apply_to("Iterations"),
                s.value.apply_to(p.iterations)
            );
        }
        ProcessingMethod::AutoAdaptive(p) => {
            println!(
                "    {:<14}{}",
                s.label.apply_to("Iterations"),
                s.value.apply_to(p.iterations)
            );
        }
        ProcessingMethod::Average | ProcessingMethod::Median => {}
    }
    println!(
        "    {:<14}{}",
        s.label.apply_to("Kernel"),
        s.value.apply_to(format!("{:?}", config.composition.kernel))
    );
    println!();
}

pub fn print_background(path: &Path, stats: &BackgroundStats) {
    let s = Styles::new();
    print_title(&s, "Background");

    println!("  {:<14}{}", s.label.apply_to("File"), s.path.apply_to(path.display()));
    println!();
    println!(
        "    {:<10}{:>12}{:>12}",
        s.header.apply_to("Channel"),
        s.header.apply_to("Background"),
        s.header.apply_to("Maximum")
    );
    for (c, name) in CHANNELS.iter().enumerate() {
        println!(
            "    {:<10}{:>12}{:>12}",
            s.label.apply_to(name),
            s.value.apply_to(format!("{:.1}", stats.background[c])),
            s.value.apply_to(format!("{:.1}", stats.maximum[c]))
        );
    }
    println!();
}

pub fn print_entropy(path: &Path, grid: &EntropyGrid, show_tiles: bool) {
    let s = Styles::new();
    print_title(&s, "Entropy");

    println!("  {:<14}{}", s.label.apply_to("File"), s.path.apply_to(path.display()));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Tiles"),
        s.value.apply_to(format!(
            "{} x {} ({} px)",
            grid.tiles_x,
            grid.tiles_y,
            grid.tile_size()
        ))
    );
    println!();

    for (c, (name, values)) in CHANNELS
        .iter()
        .zip([&grid.red, &grid.green, &grid.blue])
        .enumerate()
    {
        let (min, max, sum) = values.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(lo, hi, sum), &v| (lo.min(v), hi.max(v), sum + v),
        );
        let mean = if values.is_empty() { 0.0 } else { sum / values.len() as f64 };
        println!(
            "    {:<10}{}  {}  {}",
            s.label.apply_to(name),
            s.value.apply_to(format!("min {min:.3}")),
            s.value.apply_to(format!("mean {mean:.3}")),
            s.value.apply_to(format!("max {max:.3}"))
        );

        if show_tiles {
            for ty in 0..grid.tiles_y {
                let row: Vec<String> = (0..grid.tiles_x)
                    .map(|tx| format!("{:6.3}", grid.entropy(tx, ty)[c]))
                    .collect();
                println!("      {}", row.join(" "));
            }
        }
    }
    println!();
}
