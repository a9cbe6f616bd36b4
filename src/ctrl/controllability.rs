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

use crate::cosmic::{Cr3bpSystem, NominalTrajectory};
use crate::ctrl::ControlError;
use crate::dynamics::Linearization;
use crate::linalg::DMatrix;

/// Default singular value tolerance of the controllability rank decision.
pub const CONTROLLABILITY_TOL: f64 = 1e-9;

/// Builds the Kalman controllability matrix `[B AB ... A^(n-1)B]`.
pub fn controllability_matrix(a: &DMatrix<f64>, b: &DMatrix<f64>) -> DMatrix<f64> {
    let n = a.nrows();
    let p = b.ncols();
    let mut block = b.clone();
    let mut kalman = DMatrix::<f64>::zeros(n, n * p);
    for i in 0..n {
        kalman.view_mut((0, i * p), (n, p)).copy_from(&block);
        block = a * block;
    }
    kalman
}

/// Whether the pair `(A, B)` is controllable, decided by the singular value
/// rank of the Kalman matrix at the provided tolerance.
pub fn is_controllable(a: &DMatrix<f64>, b: &DMatrix<f64>, tolerance: f64) -> bool {
    let kalman = controllability_matrix(a, b);
    kalman.rank(tolerance) == a.nrows()
}

/// Evaluates the controllability of the relative plant along a nominal
/// trajectory, one verdict per sample, in sample order.
pub fn assess_trajectory(
    model: &Linearization,
    system: &Cr3bpSystem,
    trajectory: &NominalTrajectory,
    tolerance: f64,
) -> Result<Vec<bool>, ControlError> {
    let b6 = Linearization::input_matrix();
    let b = DMatrix::<f64>::from_iterator(6, 3, b6.iter().cloned());
    let mut verdicts = Vec::with_capacity(trajectory.len());
    for sample in trajectory.iter() {
        let a6 = model.state_matrix(system, &sample.position)?;
        let a = DMatrix::<f64>::from_iterator(6, 6, a6.iter().cloned());
        verdicts.push(is_controllable(&a, &b, tolerance));
    }
    Ok(verdicts)
}
