use blockade_core::{BlockadeError, Result};
use faer::dyn_stack::{MemBuffer, MemStack};
use faer::matrix_free::eigen::{partial_eigen, partial_eigen_scratch, PartialEigenParams};
use faer::prelude::*;
use nalgebra::{DMatrix, DVector};

/// Relative residual tolerance handed to the Krylov-Schur solver.
const TOLERANCE: f64 = f64::EPSILON * 128.0;

/// Largest eigenvalue of a symmetric matrix with its unit eigenvector.
#[derive(Clone, Debug)]
pub struct Eigenpair {
    pub value: f64,
    pub vector: DVector<f64>,
}

/// Leading (largest algebraic) eigenpair of the symmetric matrix `m`.
///
/// Only one eigenpair is computed. The solver ranks eigenvalues by
/// magnitude, so the matrix is first shifted by its largest absolute row
/// sum, which bounds every eigenvalue from below (Gershgorin). After the
/// shift the largest magnitude and the largest algebraic eigenvalue are the
/// same one.
pub fn leading_eigenpair(m: DMatrix<f64>) -> Result<Eigenpair> {
    if let Some(pos) = m.iter().position(|v| !v.is_finite()) {
        // column-major storage
        let rows = m.nrows().max(1);
        return Err(BlockadeError::NonFiniteMatrix {
            row: pos % rows,
            col: pos / rows,
        });
    }

    let n = m.nrows();
    if n == 0 {
        return Err(BlockadeError::EigenFailure(0));
    }
    if n == 1 {
        return Ok(Eigenpair {
            value: m[(0, 0)],
            vector: DVector::from_element(1, 1.0),
        });
    }

    let shift = m
        .row_iter()
        .map(|row| row.iter().map(|v| v.abs()).sum::<f64>())
        .fold(0.0, f64::max);
    let shifted = Mat::from_fn(n, n, |i, j| if i == j { m[(i, j)] + shift } else { m[(i, j)] });
    let op = shifted.as_ref();

    let start = Col::from_fn(n, |_| 1.0 / (n as f64).sqrt());
    let params = PartialEigenParams::default();
    let mut mem = MemBuffer::try_new(partial_eigen_scratch(&op, 1, Par::Seq, params))
        .map_err(|_| BlockadeError::EigenFailure(n))?;

    let mut vectors = Mat::<c64>::zeros(n, 1);
    let mut values = vec![c64::new(0.0, 0.0); 1];
    let info = partial_eigen(
        vectors.rb_mut(),
        &mut values,
        &op,
        start.as_ref(),
        TOLERANCE,
        Par::Seq,
        MemStack::new(&mut mem),
        params,
    );
    if info.n_converged_eigen == 0 {
        return Err(BlockadeError::EigenFailure(n));
    }

    // the solver returns complex vectors; rotate the largest component onto
    // the real axis before dropping imaginary parts
    let pivot = (0..n)
        .map(|i| vectors[(i, 0)])
        .max_by(|a, b| a.norm().total_cmp(&b.norm()))
        .unwrap_or(c64::new(1.0, 0.0));
    let phase = if pivot.norm() > 0.0 {
        pivot.conj() / pivot.norm()
    } else {
        c64::new(1.0, 0.0)
    };
    let mut vector = DVector::from_iterator(n, (0..n).map(|i| (vectors[(i, 0)] * phase).re));
    let norm = vector.norm();
    if !(norm.is_finite() && norm > 0.0) {
        return Err(BlockadeError::EigenFailure(n));
    }
    vector /= norm;

    let value = values[0].re - shift;
    if !value.is_finite() {
        return Err(BlockadeError::EigenFailure(n));
    }

    Ok(Eigenpair { value, vector })
}
