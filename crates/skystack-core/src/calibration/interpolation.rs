//! Three-point monotone curves used by background calibration.

/// Piecewise linear curve through `(x0, y0)`, `(x1, y1)`, `(x2, y2)`.
///
/// Inputs outside `[x0, x2]` are clamped to the end values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearInterpolation {
    x: [f64; 3],
    y: [f64; 3],
}

impl LinearInterpolation {
    pub fn new(x: [f64; 3], y: [f64; 3]) -> Self {
        Self { x, y }
    }

    pub fn interpolate(&self, v: f64) -> f64 {
        let [x0, x1, x2] = self.x;
        let [y0, y1, y2] = self.y;
        if v <= x0 {
            y0
        } else if v >= x2 {
            y2
        } else if v < x1 {
            segment(v, x0, x1, y0, y1)
        } else {
            segment(v, x1, x2, y1, y2)
        }
    }
}

#[inline]
fn segment(v: f64, xa: f64, xb: f64, ya: f64, yb: f64) -> f64 {
    let dx = xb - xa;
    if dx <= 0.0 {
        yb
    } else {
        ya + (v - xa) * (yb - ya) / dx
    }
}

/// Rational curve `y = (a + b*x) / (1 + c*x)` through three points.
///
/// The three control points are solved exactly once. When the system is
/// singular, or the denominator would change sign inside `[x0, x2]`, the
/// curve degrades to [`LinearInterpolation`] through the same points.
/// End points are reproduced exactly and inputs are clamped to `[x0, x2]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RationalInterpolation {
    x: [f64; 3],
    y: [f64; 3],
    coefficients: Option<(f64, f64, f64)>,
}

impl RationalInterpolation {
    pub fn new(x: [f64; 3], y: [f64; 3]) -> Self {
        Self {
            x,
            y,
            coefficients: solve_rational(x, y),
        }
    }

    /// True when the curve fell back to piecewise linear.
    pub fn is_linear(&self) -> bool {
        self.coefficients.is_none()
    }

    pub fn interpolate(&self, v: f64) -> f64 {
        let [x0, _, x2] = self.x;
        let [y0, _, y2] = self.y;
        if v <= x0 {
            return y0;
        }
        if v >= x2 {
            return y2;
        }
        match self.coefficients {
            Some((a, b, c)) => ((a + b * v) / (1.0 + c * v)).clamp(y0.min(y2), y0.max(y2)),
            None => LinearInterpolation::new(self.x, self.y).interpolate(v),
        }
    }
}

/// Solve `a + b*xi - c*xi*yi = yi` for i in 0..3 with Cramer's rule.
fn solve_rational(x: [f64; 3], y: [f64; 3]) -> Option<(f64, f64, f64)> {
    if !(x[0] < x[1] && x[1] < x[2]) {
        return None;
    }
    let m = [
        [1.0, x[0], -x[0] * y[0]],
        [1.0, x[1], -x[1] * y[1]],
        [1.0, x[2], -x[2] * y[2]],
    ];
    let det = det3(m);
    let scale = x[2].abs().max(1.0).powi(2) * y[2].abs().max(1.0);
    if det.abs() <= f64::EPSILON * scale {
        return None;
    }
    let with_column = |col: usize| {
        let mut mm = m;
        for (row, r) in mm.iter_mut().enumerate() {
            r[col] = y[row];
        }
        det3(mm) / det
    };
    let (a, b, c) = (with_column(0), with_column(1), with_column(2));
    let denominators_positive = 1.0 + c * x[0] > 0.0 && 1.0 + c * x[2] > 0.0;
    if !(a.is_finite() && b.is_finite() && c.is_finite()) || !denominators_positive {
        return None;
    }
    Some((a, b, c))
}

fn det3(m: [[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_hits_control_points() {
        let li = LinearInterpolation::new([0.0, 100.0, 1000.0], [0.0, 200.0, 1000.0]);
        assert_eq!(li.interpolate(0.0), 0.0);
        assert!((li.interpolate(100.0) - 200.0).abs() < 1e-9);
        assert_eq!(li.interpolate(1000.0), 1000.0);
        assert!((li.interpolate(50.0) - 100.0).abs() < 1e-9);
        assert_eq!(li.interpolate(5000.0), 1000.0);
    }

    #[test]
    fn rational_hits_control_points() {
        let ri = RationalInterpolation::new([0.0, 100.0, 1000.0], [0.0, 200.0, 1000.0]);
        assert!(!ri.is_linear());
        assert_eq!(ri.interpolate(0.0), 0.0);
        assert!((ri.interpolate(100.0) - 200.0).abs() < 1e-6);
        assert_eq!(ri.interpolate(1000.0), 1000.0);
    }

    #[test]
    fn rational_is_monotone() {
        let ri = RationalInterpolation::new([0.0, 300.0, 4000.0], [0.0, 120.0, 4000.0]);
        let mut prev = ri.interpolate(0.0);
        for i in 1..=400 {
            let v = ri.interpolate(i as f64 * 10.0);
            assert!(v >= prev, "not monotone at {}", i * 10);
            prev = v;
        }
    }

    #[test]
    fn identity_points_stay_identity() {
        let ri = RationalInterpolation::new([0.0, 50.0, 100.0], [0.0, 50.0, 100.0]);
        for v in [0.0, 10.0, 50.0, 75.0, 100.0] {
            assert!((ri.interpolate(v) - v).abs() < 1e-9);
        }
    }

    #[test]
    fn degenerate_points_fall_back_to_linear() {
        let ri = RationalInterpolation::new([0.0, 0.0, 100.0], [0.0, 0.0, 100.0]);
        assert!(ri.is_linear());
        assert!((ri.interpolate(40.0) - 40.0).abs() < 1e-9);
    }
}
