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

use crate::cosmic::{Cr3bpState, Cr3bpSystem};
use crate::dynamics::{primary_distances, Dynamics, DynamicsError, Linearization};
use crate::linalg::{Matrix6, OVector, Vector3, Vector6, U42};

/// The CR3BP vector field in the nondimensional synodic frame.
///
/// Takes and returns `[x y z vx vy vz]`, derivatives per nondimensional time.
pub fn cr3bp_vector_field(
    system: &Cr3bpSystem,
    state: &Vector6<f64>,
) -> Result<Vector6<f64>, DynamicsError> {
    let position = Vector3::new(state[0], state[1], state[2]);
    let (d1, d2) = primary_distances(system, &position)?;
    let mu1 = system.mu_primary();
    let mu2 = system.mu_secondary();
    let (x, y, z) = (state[0], state[1], state[2]);
    let (vx, vy, vz) = (state[3], state[4], state[5]);
    let ax = x + 2.0 * vy
        - mu1 * (x + system.mu) / d1.powi(3)
        - mu2 * (x - 1.0 + system.mu) / d2.powi(3);
    let ay = y - 2.0 * vx - mu1 * y / d1.powi(3) - mu2 * y / d2.powi(3);
    let az = -mu1 * z / d1.powi(3) - mu2 * z / d2.powi(3);
    Ok(Vector6::new(vx, vy, vz, ax, ay, az))
}

/// Uncontrolled motion of a single spacecraft in the CR3BP, with variational
/// equations when the STM is enabled on the state.
#[derive(Copy, Clone, Debug)]
pub struct Cr3bpDynamics {
    pub system: Cr3bpSystem,
}

impl Cr3bpDynamics {
    pub fn new(system: Cr3bpSystem) -> Self {
        Self { system }
    }
}

impl Dynamics for Cr3bpDynamics {
    type StateType = Cr3bpState;

    fn eom(
        &self,
        _delta_t: f64,
        state_vec: &OVector<f64, U42>,
        state_ctx: &Cr3bpState,
    ) -> Result<OVector<f64, U42>, DynamicsError> {
        let cartesian = state_vec.fixed_rows::<6>(0).into_owned();
        // Per nondimensional time, then rescaled to per second
        let rates = cr3bp_vector_field(&self.system, &cartesian)? / self.system.time_unit_s;
        let mut derivative = OVector::<f64, U42>::zeros();
        for i in 0..6 {
            derivative[i] = rates[i];
        }
        if state_ctx.stm.is_some() {
            let position = Vector3::new(cartesian[0], cartesian[1], cartesian[2]);
            let a_matrix =
                Linearization::TargetCentered.state_matrix(&self.system, &position)?;
            let mut phi = Matrix6::zeros();
            for i in 0..6 {
                for j in 0..6 {
                    phi[(i, j)] = state_vec[6 + 6 * i + j];
                }
            }
            let dphi = a_matrix * phi / self.system.time_unit_s;
            for i in 0..6 {
                for j in 0..6 {
                    derivative[6 + 6 * i + j] = dphi[(i, j)];
                }
            }
        }
        Ok(derivative)
    }
}
