/*
    Syzygy, rendezvous guidance and control in the three-body problem
    Copyright (C) 2023-onwards The Syzygy Developers

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use crate::cosmic::Cr3bpSystem;
use crate::ctrl::{ControlError, FeedbackGain, RegulatorConfig};
use crate::dynamics::Linearization;
use crate::linalg::{DMatrix, OMatrix, Vector3, U3, U9};
use nalgebra::{Cholesky, SVD};

/// Iteration cap shared by both algebraic Riccati solvers.
pub const MAX_RICCATI_ITER: usize = 100;
/// Relative convergence criterion of the Riccati iterations.
pub const RICCATI_TOL: f64 = 1e-10;

/// Solves the continuous algebraic Riccati equation
/// `A'P + PA - P B M^-1 B' P + Q = 0` by the matrix sign function of the
/// Hamiltonian, iterated with determinantal scaling.
pub fn care(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    q: &DMatrix<f64>,
    m: &DMatrix<f64>,
) -> Result<DMatrix<f64>, ControlError> {
    let n = a.nrows();
    let m_inv = m
        .clone()
        .try_inverse()
        .ok_or(ControlError::SingularControlWeight)?;
    let g = b * m_inv * b.transpose();

    // Hamiltonian of the problem
    let mut h = DMatrix::<f64>::zeros(2 * n, 2 * n);
    h.view_mut((0, 0), (n, n)).copy_from(a);
    h.view_mut((0, n), (n, n)).copy_from(&(-&g));
    h.view_mut((n, 0), (n, n)).copy_from(&(-q));
    h.view_mut((n, n), (n, n)).copy_from(&(-a.transpose()));

    // Newton iteration on the sign of the Hamiltonian
    let mut z = h;
    for iteration in 0..MAX_RICCATI_ITER {
        let z_inv = z
            .clone()
            .try_inverse()
            .ok_or(ControlError::SingularIterate { iteration })?;
        let det = z.determinant().abs();
        if !(det > 0.0) || !det.is_finite() {
            return Err(ControlError::SingularIterate { iteration });
        }
        let c = det.powf(1.0 / (2.0 * n as f64));
        let next = 0.5 * (&z / c + c * z_inv);
        let delta = (&next - &z).norm();
        let scale = z.norm();
        z = next;
        if delta <= RICCATI_TOL * scale {
            return extract_sign_solution(&z, n);
        }
    }
    Err(ControlError::SynthesisDiverged {
        max_iter: MAX_RICCATI_ITER,
    })
}

/// Recovers P from the converged sign iterate by a least squares solve of the
/// stacked system `[Z12; Z22 + I] P = -[Z11 + I; Z21]`.
fn extract_sign_solution(z: &DMatrix<f64>, n: usize) -> Result<DMatrix<f64>, ControlError> {
    let identity = DMatrix::<f64>::identity(n, n);
    let z11 = z.view((0, 0), (n, n)).into_owned();
    let z12 = z.view((0, n), (n, n)).into_owned();
    let z21 = z.view((n, 0), (n, n)).into_owned();
    let z22 = z.view((n, n), (n, n)).into_owned();

    let mut lhs = DMatrix::<f64>::zeros(2 * n, n);
    lhs.view_mut((0, 0), (n, n)).copy_from(&z12);
    lhs.view_mut((n, 0), (n, n)).copy_from(&(z22 + &identity));
    let mut rhs = DMatrix::<f64>::zeros(2 * n, n);
    rhs.view_mut((0, 0), (n, n)).copy_from(&(-(z11 + &identity)));
    rhs.view_mut((n, 0), (n, n)).copy_from(&(-z21));

    let svd = SVD::new(lhs, true, true);
    let p = svd
        .solve(&rhs, f64::EPSILON.sqrt())
        .map_err(|_| ControlError::SolutionExtraction)?;
    // Numerical asymmetry from the least squares solve is folded back
    let p = 0.5 * (&p + p.transpose());
    if Cholesky::new(p.clone()).is_none() {
        return Err(ControlError::IndefiniteSolution);
    }
    Ok(p)
}

/// Solves the discrete algebraic Riccati equation
/// `P = A'PA - A'PB (M + B'PB)^-1 B'PA + Q` by the structure preserving
/// doubling algorithm.
pub fn dare(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    q: &DMatrix<f64>,
    m: &DMatrix<f64>,
) -> Result<DMatrix<f64>, ControlError> {
    let n = a.nrows();
    let m_inv = m
        .clone()
        .try_inverse()
        .ok_or(ControlError::SingularControlWeight)?;
    let mut a_k = a.clone();
    let mut g_k = b * m_inv * b.transpose();
    let mut h_k = q.clone();
    let identity = DMatrix::<f64>::identity(n, n);

    for iteration in 0..MAX_RICCATI_ITER {
        let w_inv = (&identity + &g_k * &h_k)
            .try_inverse()
            .ok_or(ControlError::SingularIterate { iteration })?;
        let a_w = &a_k * &w_inv;
        let a_next = &a_w * &a_k;
        let g_next = &g_k + &a_w * &g_k * a_k.transpose();
        let h_next = &h_k + a_k.transpose() * &h_k * &w_inv * &a_k;

        let delta = (&h_next - &h_k).norm();
        let scale = h_next.norm().max(1.0);
        a_k = a_next;
        g_k = g_next;
        h_k = h_next;
        if delta <= RICCATI_TOL * scale {
            let p = 0.5 * (&h_k + h_k.transpose());
            if Cholesky::new(p.clone()).is_none() {
                return Err(ControlError::IndefiniteSolution);
            }
            return Ok(p);
        }
    }
    Err(ControlError::SynthesisDiverged {
        max_iter: MAX_RICCATI_ITER,
    })
}

/// Zero order hold discretization of the pair `(A, B)` over a step of `dt`
/// nondimensional time units, via the exponential of the stacked matrix.
pub fn discretize_zoh(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    dt: f64,
) -> (DMatrix<f64>, DMatrix<f64>) {
    let n = a.nrows();
    let p = b.ncols();
    let mut stacked = DMatrix::<f64>::zeros(n + p, n + p);
    stacked.view_mut((0, 0), (n, n)).copy_from(&(a * dt));
    stacked.view_mut((0, n), (n, p)).copy_from(&(b * dt));
    let phi = stacked.exp();
    let a_d = phi.view((0, 0), (n, n)).into_owned();
    let b_d = phi.view((0, n), (n, p)).into_owned();
    (a_d, b_d)
}

/// Synthesizes the continuous Riccati gain `K = M^-1 B' P` of the augmented
/// regulator linearized at the provided target position.
pub fn continuous_gain(
    model: &Linearization,
    system: &Cr3bpSystem,
    target_position: &Vector3<f64>,
    config: &RegulatorConfig,
) -> Result<FeedbackGain, ControlError> {
    let (a, b) = augmented_pair(model, system, target_position)?;
    let q = config.q_matrix();
    let m = DMatrix::<f64>::from_iterator(3, 3, config.m_matrix().iter().cloned());
    let p = care(&a, &b, &q, &m)?;
    let m_inv = m
        .try_inverse()
        .ok_or(ControlError::SingularControlWeight)?;
    let k = m_inv * b.transpose() * p;
    Ok(gain_from_dynamic(&k))
}

/// Synthesizes the discrete Riccati gain `K = (M + Bd' P Bd)^-1 Bd' P Ad` of
/// the augmented regulator discretized over `dt` nondimensional time units.
pub fn discrete_gain(
    model: &Linearization,
    system: &Cr3bpSystem,
    target_position: &Vector3<f64>,
    config: &RegulatorConfig,
    dt: f64,
) -> Result<FeedbackGain, ControlError> {
    let (a, b) = augmented_pair(model, system, target_position)?;
    let q = config.q_matrix();
    let m = DMatrix::<f64>::from_iterator(3, 3, config.m_matrix().iter().cloned());
    let (a_d, b_d) = discretize_zoh(&a, &b, dt);
    let p = dare(&a_d, &b_d, &q, &m)?;
    let inner = (&m + b_d.transpose() * &p * &b_d)
        .try_inverse()
        .ok_or(ControlError::SingularGain)?;
    let k = inner * b_d.transpose() * p * a_d;
    Ok(gain_from_dynamic(&k))
}

/// The augmented plant pair as dynamically sized matrices.
fn augmented_pair(
    model: &Linearization,
    system: &Cr3bpSystem,
    target_position: &Vector3<f64>,
) -> Result<(DMatrix<f64>, DMatrix<f64>), ControlError> {
    let a9 = model.augmented_state_matrix(system, target_position)?;
    let b9 = Linearization::augmented_input_matrix();
    let a = DMatrix::<f64>::from_iterator(9, 9, a9.iter().cloned());
    let b = DMatrix::<f64>::from_iterator(9, 3, b9.iter().cloned());
    Ok((a, b))
}

fn gain_from_dynamic(k: &DMatrix<f64>) -> FeedbackGain {
    FeedbackGain {
        gain: OMatrix::<f64, U3, U9>::from_iterator(k.iter().cloned()),
    }
}
