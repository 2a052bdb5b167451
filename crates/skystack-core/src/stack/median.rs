use crate::filters::median::median;

/// Median of one pixel's samples; the mean of the two central values for
/// even counts. Reorders `values`.
pub fn median_value(values: &mut [f64]) -> f64 {
    median(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_rejects_outlier() {
        // Four at 0.5 and one outlier at 0.0
        let mut values = [0.5, 0.5, 0.0, 0.5, 0.5];
        assert!((median_value(&mut values) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn median_even_count() {
        let mut values = [0.1, 0.3, 0.7, 0.9];
        assert!((median_value(&mut values) - 0.5).abs() < 1e-12);
    }
}
