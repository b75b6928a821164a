//! Fitted motion model for one pointer

/// Highest polynomial degree an estimator can hold
pub const MAX_DEGREE: usize = 4;

/// Polynomial fit of position against time.
///
/// Time is in seconds relative to `time`, so coefficient 0 is the position
/// at the newest sample, 1 the velocity in px/s and 2 half the
/// acceleration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Estimator {
    /// Time of the newest sample in the fit (nanoseconds)
    pub time: i64,
    pub x_coeffs: [f32; MAX_DEGREE + 1],
    pub y_coeffs: [f32; MAX_DEGREE + 1],
    pub degree: u32,
    /// Product of the X and Y coefficients of determination
    pub confidence: f32,
}

impl Estimator {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn x_coeff(&self, i: usize) -> f32 {
        self.x_coeffs[i]
    }

    #[inline]
    pub fn y_coeff(&self, i: usize) -> f32 {
        self.y_coeffs[i]
    }

    /// Extrapolated x at `t` seconds from `time`
    pub fn estimate_x(&self, t: f32) -> f32 {
        estimate(&self.x_coeffs, self.degree, t)
    }

    /// Extrapolated y at `t` seconds from `time`
    pub fn estimate_y(&self, t: f32) -> f32 {
        estimate(&self.y_coeffs, self.degree, t)
    }
}

fn estimate(coeffs: &[f32; MAX_DEGREE + 1], degree: u32, t: f32) -> f32 {
    let mut a = 0.0;
    let mut scale = 1.0;
    for coeff in coeffs.iter().take(degree as usize + 1) {
        a += coeff * scale;
        scale *= t;
    }
    a
}
