use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use skystack_core::config::{CalibrationConfig, MedianFilterConfig, StackConfig};

#[derive(Args)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save a full default StackConfig as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let config = StackConfig {
        calibration: Some(CalibrationConfig::default()),
        median_filter: Some(MedianFilterConfig::default()),
        ..StackConfig::default()
    };
    let toml_str = toml::to_string_pretty(&config)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}

/// Read a StackConfig from a TOML file.
pub fn load(path: &std::path::Path) -> Result<StackConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: StackConfig =
        toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))?;
    Ok(config)
}
