//! L2-regularised linear models used to explain features by origin.

use crate::core::error::{Result, WalsError};
use ndarray::{s, Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

const MAX_NEWTON_ITER: usize = 100;
const NEWTON_TOL: f64 = 1e-10;

/// Solve the symmetric positive-definite system `a x = b` by Cholesky
/// decomposition, or `None` if `a` is not positive definite.
pub(crate) fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }
    Some(x)
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Binary logistic regression with an L2 penalty on the coefficients.
///
/// Minimises `C * sum(log_loss) + ||w||^2 / 2`; the intercept is not
/// penalised. Fitted by Newton iterations with step halving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Inverse regularisation strength
    pub c: f64,
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl LogisticRegression {
    /// Unfitted model with inverse regularisation strength `c`.
    pub fn new(c: f64) -> Self {
        LogisticRegression {
            c,
            coefficients: None,
            intercept: 0.0,
        }
    }

    fn objective(&self, x: &Array2<f64>, y: &Array1<f64>, theta: &Array1<f64>) -> f64 {
        let p = x.ncols();
        let z = x.dot(&theta.slice(s![..p])) + theta[p];
        let loss: f64 = z
            .iter()
            .zip(y.iter())
            .map(|(&z, &t)| {
                // log(1 + e^z) - t z, computed stably
                let softplus = if z > 0.0 {
                    z + (-z).exp().ln_1p()
                } else {
                    z.exp().ln_1p()
                };
                softplus - t * z
            })
            .sum();
        let penalty = theta.slice(s![..p]).mapv(|w| w * w).sum() / 2.0;
        self.c * loss + penalty
    }

    /// Fit on a design matrix and 0/1 targets.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let (n, p) = x.dim();
        if n != y.len() {
            return Err(WalsError::dimension_mismatch(
                format!("{} targets", n),
                format!("{} targets", y.len()),
            ));
        }
        if !(self.c > 0.0) {
            return Err(WalsError::invalid_parameter(
                "C",
                self.c.to_string(),
                "must be positive",
            ));
        }

        let mut theta = Array1::<f64>::zeros(p + 1);
        let mut current = self.objective(x, y, &theta);
        for iteration in 0..MAX_NEWTON_ITER {
            let z = x.dot(&theta.slice(s![..p])) + theta[p];
            let prob = z.mapv(sigmoid);
            let residual = &prob - y;

            let mut gradient = Array1::<f64>::zeros(p + 1);
            gradient
                .slice_mut(s![..p])
                .assign(&(x.t().dot(&residual) * self.c + theta.slice(s![..p])));
            gradient[p] = self.c * residual.sum();

            let weights = prob.mapv(|q| q * (1.0 - q));
            let mut hessian = Array2::<f64>::zeros((p + 1, p + 1));
            let weighted = x * &weights.view().insert_axis(Axis(1));
            hessian
                .slice_mut(s![..p, ..p])
                .assign(&(x.t().dot(&weighted) * self.c));
            let cross = weighted.sum_axis(Axis(0)) * self.c;
            hessian.slice_mut(s![..p, p]).assign(&cross);
            hessian.slice_mut(s![p, ..p]).assign(&cross);
            hessian[[p, p]] = self.c * weights.sum();
            for i in 0..p {
                hessian[[i, i]] += 1.0;
            }

            let step = cholesky_solve(&hessian, &gradient).ok_or_else(|| {
                WalsError::numerical("logistic regression Hessian is not positive definite")
            })?;

            let mut scale = 1.0;
            let mut candidate = &theta - &(&step * scale);
            let mut value = self.objective(x, y, &candidate);
            while value > current && scale > 1e-8 {
                scale /= 2.0;
                candidate = &theta - &(&step * scale);
                value = self.objective(x, y, &candidate);
            }
            let change = step.iter().map(|v| (v * scale).abs()).fold(0.0, f64::max);
            theta = candidate;
            current = value;
            if change < NEWTON_TOL {
                log::trace!("Logistic regression converged after {} iterations", iteration + 1);
                break;
            }
        }

        self.intercept = theta[p];
        self.coefficients = Some(theta.slice(s![..p]).to_owned());
        Ok(self)
    }

    /// Probability of the positive class per row.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let w = self
            .coefficients
            .as_ref()
            .ok_or_else(|| WalsError::not_fitted("LogisticRegression"))?;
        Ok((x.dot(w) + self.intercept).mapv(sigmoid))
    }

    /// Fitted coefficients
    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    /// Fitted intercept
    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

/// Multi-output ridge regression with a centred, unpenalised intercept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RidgeRegression {
    /// L2 regularisation strength
    pub alpha: f64,
    /// One row of coefficients per output
    coefficients: Option<Array2<f64>>,
    intercepts: Option<Array1<f64>>,
}

impl Default for RidgeRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RidgeRegression {
    /// Unfitted model with penalty `alpha`.
    pub fn new(alpha: f64) -> Self {
        RidgeRegression {
            alpha,
            coefficients: None,
            intercepts: None,
        }
    }

    /// Fit every column of `y` against `x`.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array2<f64>) -> Result<&mut Self> {
        let (n, p) = x.dim();
        if n != y.nrows() {
            return Err(WalsError::dimension_mismatch(
                format!("{} target rows", n),
                format!("{} target rows", y.nrows()),
            ));
        }
        if n == 0 {
            return Err(WalsError::insufficient_data("ridge regression needs at least one row"));
        }
        if !(self.alpha > 0.0) {
            return Err(WalsError::invalid_parameter(
                "alpha",
                self.alpha.to_string(),
                "must be positive",
            ));
        }

        let x_mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(p));
        let y_mean = y.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(y.ncols()));
        let x_c = x - &x_mean.view().insert_axis(Axis(0));
        let y_c = y - &y_mean.view().insert_axis(Axis(0));

        let mut xtx = x_c.t().dot(&x_c);
        for i in 0..p {
            xtx[[i, i]] += self.alpha;
        }

        let mut coefficients = Array2::<f64>::zeros((y.ncols(), p));
        for (k, target) in y_c.axis_iter(Axis(1)).enumerate() {
            let xty = x_c.t().dot(&target);
            let w = cholesky_solve(&xtx, &xty)
                .ok_or_else(|| WalsError::numerical("ridge system is not positive definite"))?;
            coefficients.row_mut(k).assign(&w);
        }
        let intercepts = &y_mean - &coefficients.dot(&x_mean);

        self.coefficients = Some(coefficients);
        self.intercepts = Some(intercepts);
        Ok(self)
    }

    /// Predictions, one column per output.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        match (&self.coefficients, &self.intercepts) {
            (Some(w), Some(b)) => Ok(x.dot(&w.t()) + &b.view().insert_axis(Axis(0))),
            _ => Err(WalsError::not_fitted("RidgeRegression")),
        }
    }

    /// Coefficients, one row per output
    pub fn coefficients(&self) -> Option<&Array2<f64>> {
        self.coefficients.as_ref()
    }

    /// Intercept per output
    pub fn intercepts(&self) -> Option<&Array1<f64>> {
        self.intercepts.as_ref()
    }
}
