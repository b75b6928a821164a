//! Weighted polynomial least squares
//!
//! Fits `y = b0 + b1*x + ... + b(n-1)*x^(n-1)` by Gram-Schmidt QR
//! decomposition of the weighted Vandermonde matrix followed by back
//! substitution.

use crate::estimator::MAX_DEGREE;

/// Columns whose residual norm drops below this are treated as dependent
const MIN_NORM: f32 = 0.000001;

/// Below this total variance the fit is perfect by convention
const MIN_SSTOT: f32 = 0.000001;

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(a: &[f32]) -> f32 {
    dot(a, a).sqrt()
}

/// Solve for `n` coefficients (`n <= MAX_DEGREE + 1`) over the samples
/// `(x[h], y[h])` with weights `w[h]`.
///
/// Returns the coefficients and the coefficient of determination
/// `1 - SSerr / SStot` computed with squared weights. Returns `None` when
/// the samples cannot determine `n` coefficients.
pub fn solve_least_squares(x: &[f32], y: &[f32], w: &[f32], n: usize) -> Option<([f32; MAX_DEGREE + 1], f32)> {
    let m = x.len();
    if n == 0 || n > MAX_DEGREE + 1 || m < n || y.len() != m || w.len() != m {
        return None;
    }

    // Column-major A, pre-multiplied by the weights
    let mut a = vec![vec![0.0f32; m]; n];
    for h in 0..m {
        a[0][h] = w[h];
        for i in 1..n {
            a[i][h] = a[i - 1][h] * x[h];
        }
    }

    let mut q = vec![vec![0.0f32; m]; n];
    let mut r = [[0.0f32; MAX_DEGREE + 1]; MAX_DEGREE + 1];
    for j in 0..n {
        let (done, rest) = q.split_at_mut(j);
        let qj = &mut rest[0];
        qj.copy_from_slice(&a[j]);
        for qi in done.iter() {
            let d = dot(qj, qi);
            for (v, u) in qj.iter_mut().zip(qi) {
                *v -= d * u;
            }
        }

        let length = norm(qj);
        if length < MIN_NORM {
            return None;
        }
        let inv = 1.0 / length;
        for v in qj.iter_mut() {
            *v *= inv;
        }
        for i in j..n {
            r[j][i] = dot(qj, &a[i]);
        }
    }

    // R B = Qt W Y
    let wy: Vec<f32> = y.iter().zip(w).map(|(y, w)| y * w).collect();
    let mut b = [0.0f32; MAX_DEGREE + 1];
    for i in (0..n).rev() {
        b[i] = dot(&q[i], &wy);
        for j in (i + 1..n).rev() {
            b[i] -= r[i][j] * b[j];
        }
        b[i] /= r[i][i];
    }

    let ymean = y.iter().sum::<f32>() / m as f32;
    let mut sserr = 0.0f32;
    let mut sstot = 0.0f32;
    for h in 0..m {
        let mut err = y[h] - b[0];
        let mut term = 1.0f32;
        for coeff in b.iter().take(n).skip(1) {
            term *= x[h];
            err -= term * coeff;
        }
        let w2 = w[h] * w[h];
        sserr += w2 * err * err;
        let var = y[h] - ymean;
        sstot += w2 * var * var;
    }

    let confidence = if sstot > MIN_SSTOT { 1.0 - sserr / sstot } else { 1.0 };
    Some((b, confidence))
}
