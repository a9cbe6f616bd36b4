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

use crate::cosmic::{Cr3bpSystem, LibrationPoint};
use crate::dynamics::DynamicsError;
use crate::linalg::{Matrix3, Matrix6, Matrix6x3, OMatrix, Vector3, U3, U9};
use crate::utils::tilde_matrix;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Positions closer than this to either primary are rejected as singular.
pub const MIN_PRIMARY_DISTANCE: f64 = 1e-6;

/// Distances from the provided position to both primaries, rejecting
/// positions inside the singularity guard.
pub fn primary_distances(
    system: &Cr3bpSystem,
    position: &Vector3<f64>,
) -> Result<(f64, f64), DynamicsError> {
    let d1 = (position - system.primary_position()).norm();
    let d2 = (position - system.secondary_position()).norm();
    for distance in [d1, d2] {
        if distance < MIN_PRIMARY_DISTANCE {
            return Err(DynamicsError::SingularGeometry {
                distance,
                limit: MIN_PRIMARY_DISTANCE,
            });
        }
    }
    Ok((d1, d2))
}

/// Gravity gradient of the CR3BP potential at the provided synodic position,
/// excluding the frame terms.
pub fn gravity_gradient(
    system: &Cr3bpSystem,
    position: &Vector3<f64>,
) -> Result<Matrix3<f64>, DynamicsError> {
    let (d1, d2) = primary_distances(system, position)?;
    let r1 = position - system.primary_position();
    let r2 = position - system.secondary_position();
    let mu1 = system.mu_primary();
    let mu2 = system.mu_secondary();
    let pull = mu1 / d1.powi(3) + mu2 / d2.powi(3);
    let mut sigma = -pull * Matrix3::identity();
    sigma += 3.0 * mu1 / d1.powi(5) * r1 * r1.transpose();
    sigma += 3.0 * mu2 / d2.powi(5) * r2 * r2.transpose();
    Ok(sigma)
}

/// The relative motion models available for linearizing the chaser dynamics
/// about the target.
///
/// All four share the same block structure and differ only in the gradient of
/// the effective potential: the target centered model evaluates the full
/// gravity gradient at the target position, the libration point models reduce
/// it to the diagonal second order Legendre form.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Linearization {
    /// Full gravity gradient at the instantaneous target position
    TargetCentered,
    /// Diagonal Legendre form with the coefficient frozen at a collinear point
    FixedPoint { point: LibrationPoint },
    /// Diagonal Legendre form with the coefficient re-evaluated at the
    /// instantaneous target position
    MovingPoint,
    /// Diagonal Legendre form with a caller provided coefficient
    LibrationCentered { c2: f64 },
}

impl Linearization {
    /// Gradient of the effective potential at the provided target position,
    /// centrifugal terms included. This is the lower left block of the plant.
    pub fn effective_gradient(
        &self,
        system: &Cr3bpSystem,
        target_position: &Vector3<f64>,
    ) -> Result<Matrix3<f64>, DynamicsError> {
        match self {
            Self::TargetCentered => {
                let mut sigma = gravity_gradient(system, target_position)?;
                sigma[(0, 0)] += 1.0;
                sigma[(1, 1)] += 1.0;
                Ok(sigma)
            }
            Self::FixedPoint { point } => {
                let c2 = system
                    .legendre_c2_fixed(*point)
                    .map_err(|source| DynamicsError::DynamicsAstro { source })?;
                Ok(Self::legendre_gradient(c2))
            }
            Self::MovingPoint => {
                primary_distances(system, target_position)?;
                let c2 = system.legendre_c2_moving(target_position);
                Ok(Self::legendre_gradient(c2))
            }
            Self::LibrationCentered { c2 } => Ok(Self::legendre_gradient(*c2)),
        }
    }

    /// The diagonal gradient of the second order Legendre expansion,
    /// centrifugal terms included.
    fn legendre_gradient(c2: f64) -> Matrix3<f64> {
        Matrix3::from_diagonal(&Vector3::new(1.0 + 2.0 * c2, 1.0 - c2, -c2))
    }

    /// The 6x6 plant matrix of the relative state `[dr dv]`.
    pub fn state_matrix(
        &self,
        system: &Cr3bpSystem,
        target_position: &Vector3<f64>,
    ) -> Result<Matrix6<f64>, DynamicsError> {
        let sigma = self.effective_gradient(system, target_position)?;
        let coriolis = -2.0 * tilde_matrix(&Vector3::new(0.0, 0.0, 1.0));
        let mut a = Matrix6::zeros();
        a.fixed_view_mut::<3, 3>(0, 3).copy_from(&Matrix3::identity());
        a.fixed_view_mut::<3, 3>(3, 0).copy_from(&sigma);
        a.fixed_view_mut::<3, 3>(3, 3).copy_from(&coriolis);
        Ok(a)
    }

    /// The 9x9 plant matrix of the augmented regulator state `[integral dr dv]`.
    pub fn augmented_state_matrix(
        &self,
        system: &Cr3bpSystem,
        target_position: &Vector3<f64>,
    ) -> Result<OMatrix<f64, U9, U9>, DynamicsError> {
        let sigma = self.effective_gradient(system, target_position)?;
        let coriolis = -2.0 * tilde_matrix(&Vector3::new(0.0, 0.0, 1.0));
        let mut a = OMatrix::<f64, U9, U9>::zeros();
        a.fixed_view_mut::<3, 3>(0, 3).copy_from(&Matrix3::identity());
        a.fixed_view_mut::<3, 3>(3, 6).copy_from(&Matrix3::identity());
        a.fixed_view_mut::<3, 3>(6, 3).copy_from(&sigma);
        a.fixed_view_mut::<3, 3>(6, 6).copy_from(&coriolis);
        Ok(a)
    }

    /// The 6x3 input matrix: accelerations act on the velocity sub-state.
    pub fn input_matrix() -> Matrix6x3<f64> {
        let mut b = Matrix6x3::zeros();
        b.fixed_view_mut::<3, 3>(3, 0).copy_from(&Matrix3::identity());
        b
    }

    /// The 9x3 input matrix of the augmented regulator.
    pub fn augmented_input_matrix() -> OMatrix<f64, U9, U3> {
        let mut b = OMatrix::<f64, U9, U3>::zeros();
        b.fixed_view_mut::<3, 3>(6, 0).copy_from(&Matrix3::identity());
        b
    }
}

impl fmt::Display for Linearization {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::TargetCentered => write!(f, "target centered"),
            Self::FixedPoint { point } => write!(f, "fixed {point}"),
            Self::MovingPoint => write!(f, "moving point"),
            Self::LibrationCentered { c2 } => write!(f, "libration centered (c2 = {c2:.6})"),
        }
    }
}
