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

use crate::cosmic::{Cr3bpSystem, RendezvousState};
use crate::dynamics::{cr3bp_vector_field, Dynamics, DynamicsError, Linearization};
use crate::linalg::{Matrix6, OVector, Vector3, U51};

/// Coupled dynamics of a rendezvous: the target follows the full CR3BP vector
/// field while the chaser relative state follows the selected linearization
/// about the instantaneous target position, under a zero order hold
/// acceleration command.
///
/// The integral sub-state accumulates the relative position, feeding the
/// augmented regulator.
#[derive(Copy, Clone, Debug)]
pub struct RendezvousDynamics {
    pub system: Cr3bpSystem,
    pub model: Linearization,
    /// Commanded chaser acceleration, nondimensional synodic axes. `None`
    /// coasts.
    pub control: Option<Vector3<f64>>,
}

impl RendezvousDynamics {
    pub fn new(system: Cr3bpSystem, model: Linearization) -> Self {
        Self {
            system,
            model,
            control: None,
        }
    }

    /// Copies these dynamics with the provided acceleration command held for
    /// the upcoming step.
    pub fn with_control(&self, control: Vector3<f64>) -> Self {
        Self {
            control: Some(control),
            ..*self
        }
    }
}

impl Dynamics for RendezvousDynamics {
    type StateType = RendezvousState;

    fn eom(
        &self,
        _delta_t: f64,
        state_vec: &OVector<f64, U51>,
        state_ctx: &RendezvousState,
    ) -> Result<OVector<f64, U51>, DynamicsError> {
        let target = state_vec.fixed_rows::<6>(0).into_owned();
        let target_position = Vector3::new(target[0], target[1], target[2]);
        let relative_position = Vector3::new(state_vec[6], state_vec[7], state_vec[8]);
        let relative_velocity = Vector3::new(state_vec[9], state_vec[10], state_vec[11]);

        let target_rates = cr3bp_vector_field(&self.system, &target)?;
        let sigma = self.model.effective_gradient(&self.system, &target_position)?;
        let mut relative_accel = sigma * relative_position
            + 2.0 * Vector3::new(relative_velocity[1], -relative_velocity[0], 0.0);
        if let Some(u) = &self.control {
            relative_accel += u;
        }

        let mut derivative = OVector::<f64, U51>::zeros();
        for i in 0..6 {
            derivative[i] = target_rates[i];
        }
        for i in 0..3 {
            derivative[6 + i] = relative_velocity[i];
            derivative[9 + i] = relative_accel[i];
            // The integral sub-state accumulates the relative position
            derivative[12 + i] = relative_position[i];
        }
        if state_ctx.target.stm.is_some() {
            let a_matrix =
                Linearization::TargetCentered.state_matrix(&self.system, &target_position)?;
            let mut phi = Matrix6::zeros();
            for i in 0..6 {
                for j in 0..6 {
                    phi[(i, j)] = state_vec[15 + 6 * i + j];
                }
            }
            let dphi = a_matrix * phi;
            for i in 0..6 {
                for j in 0..6 {
                    derivative[15 + 6 * i + j] = dphi[(i, j)];
                }
            }
        }
        // Per nondimensional time, then rescaled to per second
        Ok(derivative / self.system.time_unit_s)
    }
}
