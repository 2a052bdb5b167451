use num_traits::{Bounded, NumCast, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

/// Storage type tag of a pixel buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleKind {
    U8,
    U16,
    U32,
    F32,
    F64,
}

impl SampleKind {
    pub fn bits(self) -> u32 {
        match self {
            Self::U8 => 8,
            Self::U16 => 16,
            Self::U32 | Self::F32 => 32,
            Self::F64 => 64,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }
}

impl std::fmt::Display for SampleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::U8 => write!(f, "8-bit integer"),
            Self::U16 => write!(f, "16-bit integer"),
            Self::U32 => write!(f, "32-bit integer"),
            Self::F32 => write!(f, "32-bit float"),
            Self::F64 => write!(f, "64-bit float"),
        }
    }
}

/// A single channel sample.
///
/// Integer samples are raw ADU values. Float samples live on the 16-bit
/// scale (`0.0..=65535.0`), which is what [`Sample::level16`] assumes.
pub trait Sample:
    Copy + PartialOrd + Send + Sync + Default + Bounded + Zero + NumCast + ToPrimitive + 'static
{
    const KIND: SampleKind;

    /// Sample as `f64`, in native units.
    #[inline]
    fn to_f64_lossy(self) -> f64 {
        self.to_f64().unwrap_or(0.0)
    }

    /// Largest representable value, as `f64`.
    #[inline]
    fn max_f64() -> f64 {
        Self::max_value().to_f64_lossy()
    }

    /// Convert back from `f64`, saturating at the type bounds.
    ///
    /// Integer conversion truncates toward zero; NaN becomes zero.
    fn from_f64_saturating(v: f64) -> Self;

    /// Sample quantized to a 16-bit intensity level.
    fn level16(self) -> u16;

    /// Total ordering used for order statistics.
    fn total_cmp_sample(&self, other: &Self) -> std::cmp::Ordering;
}

macro_rules! impl_integer_sample {
    ($t:ty, $kind:expr, $level:expr) => {
        impl Sample for $t {
            const KIND: SampleKind = $kind;

            #[inline]
            fn from_f64_saturating(v: f64) -> Self {
                // `as` saturates at the bounds and maps NaN to 0.
                v as $t
            }

            #[inline]
            fn level16(self) -> u16 {
                let f: fn($t) -> u16 = $level;
                f(self)
            }

            #[inline]
            fn total_cmp_sample(&self, other: &Self) -> std::cmp::Ordering {
                self.cmp(other)
            }
        }
    };
}

impl_integer_sample!(u8, SampleKind::U8, |v| (v as u16) << 8);
impl_integer_sample!(u16, SampleKind::U16, |v| v);
impl_integer_sample!(u32, SampleKind::U32, |v| (v >> 16) as u16);

impl Sample for f32 {
    const KIND: SampleKind = SampleKind::F32;

    #[inline]
    fn from_f64_saturating(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn level16(self) -> u16 {
        self as u16
    }

    #[inline]
    fn total_cmp_sample(&self, other: &Self) -> std::cmp::Ordering {
        self.total_cmp(other)
    }
}

impl Sample for f64 {
    const KIND: SampleKind = SampleKind::F64;

    #[inline]
    fn from_f64_saturating(v: f64) -> Self {
        v
    }

    #[inline]
    fn level16(self) -> u16 {
        self as u16
    }

    #[inline]
    fn total_cmp_sample(&self, other: &Self) -> std::cmp::Ordering {
        self.total_cmp(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_follow_bit_depth() {
        assert_eq!(0xABu8.level16(), 0xAB00);
        assert_eq!(1234u16.level16(), 1234);
        assert_eq!(0x1234_5678u32.level16(), 0x1234);
        assert_eq!(70_000.0f32.level16(), u16::MAX);
        assert_eq!((-3.0f64).level16(), 0);
    }

    #[test]
    fn integer_conversion_saturates() {
        assert_eq!(u8::from_f64_saturating(300.0), 255);
        assert_eq!(u16::from_f64_saturating(-1.0), 0);
        assert_eq!(u16::from_f64_saturating(f64::NAN), 0);
        assert_eq!(u32::from_f64_saturating(12.9), 12);
    }
}
