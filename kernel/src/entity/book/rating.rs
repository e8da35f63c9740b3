use std::fmt::Display;

use error_stack::Report;
use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::KernelError;

/// Average reader rating with four decimal places, kept as a count of
/// ten-thousandths so it stays exact.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, Fromln, AsRefln,
)]
pub struct ReaderRating(i64);

impl ReaderRating {
    pub const SCALE: i64 = 10_000;
    /// Ten integer digits, matching a `NUMERIC(14, 4)` column.
    const LIMIT: f64 = 1e10;

    pub fn new(ten_thousandths: impl Into<i64>) -> Self {
        Self(ten_thousandths.into())
    }

    /// Rounds to four decimal places.
    pub fn from_f64(value: f64) -> error_stack::Result<Self, KernelError> {
        if !value.is_finite() || value.abs() >= Self::LIMIT {
            return Err(Report::new(KernelError::Validation)
                .attach_printable(format!("reader rating {value} does not fit 14 digits")));
        }
        Ok(Self((value * Self::SCALE as f64).round() as i64))
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }
}

impl Display for ReaderRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = Self::SCALE as u64;
        write!(f, "{sign}{}.{:04}", abs / scale, abs % scale)
    }
}

#[cfg(test)]
mod test {
    use super::ReaderRating;
    use crate::KernelError;

    #[test]
    fn rounds_to_four_decimals() {
        let rating = ReaderRating::from_f64(4.123_456).unwrap();
        assert_eq!(rating, ReaderRating::new(41_235));
        assert_eq!(rating.to_string(), "4.1235");
        assert_eq!(rating.as_f64(), 4.1235);
        assert_eq!(ReaderRating::new(-5).to_string(), "-0.0005");
    }

    #[test]
    fn rejects_values_outside_the_column() {
        for value in [f64::NAN, f64::INFINITY, 1e10] {
            let error = ReaderRating::from_f64(value).unwrap_err();
            assert_eq!(error.current_context(), &KernelError::Validation);
        }
    }
}
