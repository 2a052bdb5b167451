use skystack_core::calibration::{BackgroundCalibrationMode, CalibrationInterpolation, RgbBackgroundMethod};
use skystack_core::color::cfa::CfaPattern;
use skystack_core::config::{
    CalibrationConfig, CompositionConfig, KernelPreference, MedianFilterConfig, ProcessingMethod,
    StackConfig,
};
use skystack_core::stack::{AutoAdaptiveParams, KappaSigmaParams};

fn full_config() -> StackConfig {
    StackConfig {
        calibration: Some(CalibrationConfig {
            mode: BackgroundCalibrationMode::Rgb(RgbBackgroundMethod::Minimum),
            interpolation: CalibrationInterpolation::Linear,
            multiplier: 256.0,
        }),
        median_filter: Some(MedianFilterConfig {
            radius: 2,
            cfa: Some(CfaPattern::GBRG),
        }),
        composition: CompositionConfig {
            homogenize: false,
            kernel: KernelPreference::ScalarOnly,
            method: ProcessingMethod::KappaSigma(KappaSigmaParams {
                kappa: 2.5,
                iterations: 4,
            }),
        },
        ..StackConfig::default()
    }
}

#[test]
fn test_defaults() {
    let config = StackConfig::default();
    assert!(config.calibration.is_none());
    assert!(config.median_filter.is_none());
    assert_eq!(config.entropy.window_size, 10);
    assert_eq!(config.composition.kernel, KernelPreference::Auto);
    assert_eq!(
        config.composition.method,
        ProcessingMethod::KappaSigma(KappaSigmaParams {
            kappa: 2.0,
            iterations: 5
        })
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_toml_round_trip() {
    let config = full_config();
    let text = toml::to_string_pretty(&config).unwrap();
    let parsed: StackConfig = toml::from_str(&text).unwrap();
    assert_eq!(parsed.calibration, config.calibration);
    assert_eq!(parsed.median_filter, config.median_filter);
    assert_eq!(parsed.composition, config.composition);
    assert_eq!(parsed.entropy, config.entropy);
}

#[test]
fn test_json_round_trip() {
    let mut config = full_config();
    config.composition.method = ProcessingMethod::AutoAdaptive(AutoAdaptiveParams { iterations: 7 });
    let json = serde_json::to_string(&config).unwrap();
    let parsed: StackConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.composition, config.composition);
    assert_eq!(parsed.calibration, config.calibration);
}

#[test]
fn test_partial_toml_uses_defaults() {
    let parsed: StackConfig = toml::from_str(
        r#"
[composition]
method = "Median"
"#,
    )
    .unwrap();
    assert_eq!(parsed.composition.method, ProcessingMethod::Median);
    assert!(!parsed.composition.homogenize);
    assert!(parsed.calibration.is_none());
    assert_eq!(parsed.entropy.window_size, 10);
}

#[test]
fn test_validation_errors() {
    let mut config = full_config();
    config.calibration.as_mut().unwrap().multiplier = 0.0;
    assert!(config.validate().is_err());

    let mut config = full_config();
    config.composition.method = ProcessingMethod::KappaSigma(KappaSigmaParams {
        kappa: -1.0,
        iterations: 3,
    });
    assert!(config.validate().is_err());
}
